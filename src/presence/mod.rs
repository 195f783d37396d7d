//! Turns one inspector snapshot into the status shown to other people.
//!
//! Rules, highest precedence last:
//! - the editor is frontmost with a file open: "Editing <file>"
//! - a companion tool is frontmost: "Using <tool>"
//! - a workspace is known: "in <workspace>" while the editor is frontmost,
//!   "Working on <workspace>" while something else is
//! - neither a file nor a workspace: "No file open"

use crate::constants::{UNKNOWN_WORKSPACE, UNTITLED_WORKSPACE};
use crate::models::{ActivitySnapshot, PresenceStatus, TargetApp};
use crate::tracker::session::TrackingSession;

/// When the "Working on <workspace>" line replaces the icons chosen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkspacePolicy {
    /// Whenever the editor itself is not frontmost.
    #[default]
    Always,
    /// Only while a companion tool is frontmost.
    AuxiliaryOnly,
}

/// Result of one status computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: PresenceStatus,
    /// Workspace the session should remember, when the editor reported one.
    pub remembered_workspace: Option<String>,
}

fn split_extension(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

/// Lower-cased text after the last dot, if there is a non-empty name before it.
pub fn file_extension(file_name: &str) -> Option<String> {
    split_extension(file_name).map(|(_, ext)| ext.to_lowercase())
}

/// Name without its last extension; names without one are returned as is.
pub fn without_extension(name: &str) -> &str {
    split_extension(name).map_or(name, |(stem, _)| stem)
}

/// Asset key of a companion tool: "Accessibility Inspector" -> "accessibilityinspector".
pub fn icon_key_for_app(application_name: &str) -> String {
    application_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

pub fn compute_status(
    snapshot: &ActivitySnapshot,
    session: &TrackingSession,
    target: &TargetApp,
    policy: WorkspacePolicy,
) -> StatusUpdate {
    let application = snapshot.application_name.as_deref();
    let file = snapshot.file_name.as_deref();
    let workspace = snapshot.workspace_name.as_deref();
    let target_frontmost = target.is_target(application);

    let mut status = PresenceStatus::new(&target.default_icon, session.effective_start());
    let mut remembered_workspace = None;
    let mut using_auxiliary = false;

    match (file, application) {
        (Some(file), _) if target_frontmost => {
            status.details = Some(format!("Editing {file}"));
            match file_extension(file).filter(|ext| target.has_icon_for(ext)) {
                Some(ext) => {
                    status.large_icon = ext;
                    status.small_icon = Some(target.app_icon.clone());
                }
                None => status.large_icon.clone_from(&target.default_icon),
            }
        }
        (_, Some(app)) if target.is_auxiliary(app) => {
            using_auxiliary = true;
            status.details = Some(format!("Using {app}"));
            status.large_icon = icon_key_for_app(app);
            status.small_icon = Some(target.app_icon.clone());
        }
        _ => {}
    }

    if let Some(workspace) = workspace {
        if target_frontmost {
            if workspace != UNTITLED_WORKSPACE {
                status.state = Some(format!("in {}", without_extension(workspace)));
                remembered_workspace = Some(workspace.to_string());
            }
        } else if policy == WorkspacePolicy::Always || using_auxiliary {
            let shown = session
                .last_known_workspace()
                .or(Some(workspace))
                .unwrap_or(UNKNOWN_WORKSPACE);
            status.small_icon = Some(target.app_icon.clone());
            status.large_icon.clone_from(&target.default_icon);
            status.state = Some(format!("Working on {}", without_extension(shown)));
        }
    }

    // editor just launched, nothing open yet
    if file.is_none() && workspace.is_none() {
        status.large_icon.clone_from(&target.app_icon);
        status.details = Some("No file open".to_string());
    }

    status.session_start = session.effective_start();
    status.session_end = None;

    StatusUpdate {
        status,
        remembered_workspace,
    }
}
