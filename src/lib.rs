pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod platform;
pub mod presence;
pub mod rpc;
#[cfg(test)]
mod test_utils;
pub mod tracker;
pub mod validation;

pub use models::{Mode, TargetApp};
pub use presence::WorkspacePolicy;

use crate::db::{migrations, Database};
use crate::error::AppError;
use crate::models::Settings;
use crate::platform::{AppProbe, NativeTracker, SignalWatcher, WatchState};
use crate::rpc::DiscordIpcClient;
use crate::tracker::dispatcher::{self, Dispatcher};
use crate::tracker::publisher::StatusPublisher;
#[cfg(unix)]
use crate::tracker::signals::SignalForwarder;
use crate::tracker::{LifecycleController, TrackerConfig};
use directories::ProjectDirs;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Error type for xcpresence start-up failures
#[derive(Debug)]
pub enum InitError {
    NoProjectDirs,
    DataDirCreation(std::io::Error),
    DatabaseOpen(rusqlite::Error),
    Migration(rusqlite::Error),
    Settings(AppError),
    InvalidOption(AppError),
    MissingClientId,
    SignalHandler(std::io::Error),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::NoProjectDirs => write!(f, "Could not determine project directories"),
            InitError::DataDirCreation(e) => write!(f, "Could not create data directory: {e}"),
            InitError::DatabaseOpen(e) => write!(f, "Failed to open database: {e}"),
            InitError::Migration(e) => write!(f, "Failed to run database migrations: {e}"),
            InitError::Settings(e) => write!(f, "Invalid settings: {e}"),
            InitError::InvalidOption(e) => write!(f, "{e}"),
            InitError::MissingClientId => write!(
                f,
                "No Discord application id given (use --client-id or {})",
                constants::CLIENT_ID_ENV
            ),
            InitError::SignalHandler(e) => write!(f, "Could not install signal handlers: {e}"),
        }
    }
}

impl std::error::Error for InitError {}

/// Everything `run` needs, as given on the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub client_id: Option<String>,
    pub refresh_interval_secs: u64,
    pub target: TargetApp,
    pub policy: WorkspacePolicy,
    pub database: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            client_id: None,
            refresh_interval_secs: constants::DEFAULT_REFRESH_INTERVAL_SECS,
            target: TargetApp::default(),
            policy: WorkspacePolicy::default(),
            database: None,
        }
    }
}

fn get_db_path() -> Result<PathBuf, InitError> {
    let proj_dirs = ProjectDirs::from("com", "xcpresence", "XcPresence")
        .ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("xcpresence.db"))
}

/// Open the settings database, the default one when `path` is `None`.
pub fn open_database(path: Option<&Path>) -> Result<Database, InitError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => get_db_path()?,
    };

    let db = Database::open(&path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    Ok(db)
}

fn stored_mode(db: &Database) -> Result<Mode, InitError> {
    Settings::load(db.connection())
        .map_err(|e| InitError::Settings(AppError::Database(e)))?
        .mode()
        .map_err(InitError::Settings)
}

/// The persisted tracking mode.
pub fn load_mode(database: Option<&Path>) -> Result<Mode, InitError> {
    let db = open_database(database)?;
    stored_mode(&db)
}

/// Persist `mode`; a running tracker picks it up on its next start.
pub fn save_mode(database: Option<&Path>, mode: Mode) -> Result<(), InitError> {
    let db = open_database(database)?;
    Settings::for_mode(mode)
        .save(db.connection())
        .map_err(|e| InitError::Settings(AppError::Database(e)))?;
    info!("Mode set to {mode}");
    Ok(())
}

/// Track the target application and publish its activity until SIGINT or
/// SIGTERM. The presence is cleared before returning.
pub fn run(options: RunOptions) -> Result<(), InitError> {
    let client_id = options.client_id.as_deref().ok_or(InitError::MissingClientId)?;
    let client_id = validation::validate_client_id(client_id).map_err(InitError::InvalidOption)?;
    let refresh_interval = validation::validate_refresh_interval_secs(options.refresh_interval_secs)
        .map_err(InitError::InvalidOption)?;
    let bundle_id = validation::validate_bundle_id(&options.target.bundle_id)
        .map_err(InitError::InvalidOption)?
        .to_string();

    let db = open_database(options.database.as_deref())?;
    let mode = stored_mode(&db)?;

    let config = TrackerConfig {
        refresh_interval,
        ..TrackerConfig::default()
    };
    let target = TargetApp {
        bundle_id: bundle_id.clone(),
        ..options.target
    };
    info!("Tracking {} ({bundle_id}) in {mode} mode", target.name);

    let probe: Arc<dyn AppProbe> = Arc::new(NativeTracker::new(target.clone()));
    let publisher = StatusPublisher::new(
        Box::new(NativeTracker::new(target.clone())),
        Box::new(DiscordIpcClient::new(client_id)),
        target,
        options.policy,
    );

    let (handle, receiver) = dispatcher::channel();
    let watcher = SignalWatcher::new(
        Arc::clone(&probe),
        &bundle_id,
        handle.sender(),
        config.watcher_config(),
    );
    #[cfg(unix)]
    let forwarder = SignalForwarder::install(handle).map_err(InitError::SignalHandler)?;
    #[cfg(unix)]
    info!("Send SIGUSR1 to start tracking, SIGUSR2 to stop, SIGINT or SIGTERM to quit");

    // Boot and the watcher share one observation so nothing slips in between
    let now = SystemTime::now();
    let running = probe.is_running(&bundle_id);
    let frontmost = running && probe.frontmost_id().as_deref() == Some(bundle_id.as_str());

    let mut controller = LifecycleController::new(publisher, mode);
    controller.boot(now, running);
    let watcher = watcher.with_initial(WatchState::seeded(running, frontmost, now));
    let watcher_thread = watcher.start();

    Dispatcher::new(controller, probe, db, config.refresh_interval, receiver).run();

    watcher.stop();
    if watcher_thread.join().is_err() {
        warn!("Signal watcher thread panicked");
    }
    #[cfg(unix)]
    if forwarder.close().is_err() {
        warn!("Signal forwarder thread panicked");
    }
    info!("xcpresence stopped");
    Ok(())
}
