//! macOS backend.
//!
//! Everything goes through `osascript`: System Events knows the frontmost
//! process, and the editor's own scripting dictionary knows the front window
//! and the active workspace document. Scripts that address the editor check
//! `is running` first so a query never launches it.

use super::window_title::file_from_title;
use super::{AppProbe, WindowInspector};
use crate::models::{ActivitySnapshot, TargetApp};
use log::debug;
use std::process::Command;

const MISSING_VALUE: &str = "missing value";

fn run_script(script: &str) -> Option<String> {
    let output = match Command::new("osascript").args(["-e", script]).output() {
        Ok(output) => output,
        Err(e) => {
            debug!("osascript could not be started: {e}");
            return None;
        }
    };

    if !output.status.success() {
        debug!(
            "osascript failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let text = text.trim();
    if text.is_empty() || text == MISSING_VALUE {
        return None;
    }
    Some(text.to_string())
}

/// String literal for an `osascript` script.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn frontmost_name() -> Option<String> {
    run_script(
        r#"tell application "System Events" to get name of first application process whose frontmost is true"#,
    )
}

pub struct MacOSTracker {
    target: TargetApp,
}

impl MacOSTracker {
    pub fn new(target: TargetApp) -> Self {
        Self { target }
    }

    fn ask_target(&self, query: &str) -> Option<String> {
        let id = quoted(&self.target.bundle_id);
        run_script(&format!(
            "if application id {id} is running then\n\
             tell application id {id} to {query}\n\
             end if"
        ))
    }

    fn front_window_name(&self) -> Option<String> {
        self.ask_target("get name of window 1")
    }

    fn active_workspace(&self) -> Option<String> {
        self.ask_target("get name of active workspace document")
    }
}

impl WindowInspector for MacOSTracker {
    fn snapshot(&self) -> ActivitySnapshot {
        let application = frontmost_name();
        let file = self
            .front_window_name()
            .and_then(|title| file_from_title(&title, &self.target.name));
        let workspace = self.active_workspace();

        ActivitySnapshot::new(application.as_deref(), file.as_deref(), workspace.as_deref())
    }
}

impl AppProbe for MacOSTracker {
    fn is_running(&self, bundle_id: &str) -> bool {
        let script = format!("return application id {} is running", quoted(bundle_id));
        run_script(&script).is_some_and(|answer| answer == "true")
    }

    fn frontmost_id(&self) -> Option<String> {
        run_script(
            r#"tell application "System Events" to get bundle identifier of first application process whose frontmost is true"#,
        )
    }
}
