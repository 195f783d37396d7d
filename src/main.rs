use clap::{Args, Parser, Subcommand, ValueEnum};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use xcpresence_lib::constants::{
    CLIENT_ID_ENV, DEFAULT_REFRESH_INTERVAL_SECS, XCODE_APP_NAME, XCODE_BUNDLE_ID,
};
use xcpresence_lib::{Mode, RunOptions, TargetApp, WorkspacePolicy};

/// Show what you are working on in Xcode as a Discord rich presence
#[derive(Parser, Debug)]
#[command(name = "xcpresence", version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Track the editor until interrupted (default)
    Run(RunArgs),
    /// Show the tracking mode, or change it
    Mode {
        mode: Option<ModeArg>,

        /// Settings database (default: platform data directory)
        #[arg(long, value_name = "PATH")]
        database: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Discord application id
    #[arg(long, env = CLIENT_ID_ENV)]
    client_id: Option<String>,

    /// Seconds between presence refreshes
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_REFRESH_INTERVAL_SECS)]
    interval: u64,

    /// Identifier of the tracked application
    #[arg(long, default_value = XCODE_BUNDLE_ID)]
    bundle_id: String,

    /// Name the tracked application has while frontmost
    #[arg(long, default_value = XCODE_APP_NAME)]
    app_name: String,

    /// When to show the workspace while another app is frontmost
    #[arg(long, value_enum, default_value_t = PolicyArg::Always)]
    policy: PolicyArg,

    /// Settings database (default: platform data directory)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// Pause on focus loss and sleep
    Strict,
    /// Never pause
    Flaunt,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Strict => Mode::Strict,
            ModeArg::Flaunt => Mode::Flaunt,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    /// Whenever the editor is not frontmost
    Always,
    /// Only while an Xcode tool is frontmost
    AuxiliaryOnly,
}

impl From<PolicyArg> for WorkspacePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Always => WorkspacePolicy::Always,
            PolicyArg::AuxiliaryOnly => WorkspacePolicy::AuxiliaryOnly,
        }
    }
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        Self {
            client_id: args.client_id,
            refresh_interval_secs: args.interval,
            target: TargetApp {
                bundle_id: args.bundle_id,
                name: args.app_name,
                ..TargetApp::default()
            },
            policy: args.policy.into(),
            database: args.database,
        }
    }
}

#[allow(clippy::print_stdout, reason = "mode is the command's output, not a log line")]
fn print_mode(mode: Mode) {
    println!("{mode}: {}", mode.description());
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Commands::Run(cli.run)) {
        Commands::Run(args) => xcpresence_lib::run(args.into()),
        Commands::Mode {
            mode: Some(mode),
            database,
        } => xcpresence_lib::save_mode(database.as_deref(), mode.into())
            .map(|()| print_mode(mode.into())),
        Commands::Mode {
            mode: None,
            database,
        } => xcpresence_lib::load_mode(database.as_deref()).map(print_mode),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("xcpresence failed: {e}");
            ExitCode::FAILURE
        }
    }
}
