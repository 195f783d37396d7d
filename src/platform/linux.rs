use super::window_title::{file_from_title, workspace_from_title};
use super::{AppProbe, WindowInspector};
use crate::models::{ActivitySnapshot, TargetApp};
use log::warn;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};

/// `WM_CLASS` holds "instance\0Class\0"; the instance is the identifier
/// lifecycle signals carry, the class is the display name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WindowClass {
    instance: String,
    class: String,
}

fn parse_wm_class(raw: &[u8]) -> Option<WindowClass> {
    let text = String::from_utf8_lossy(raw);
    let mut parts = text.split('\0').filter(|s| !s.is_empty());
    let instance = parts.next()?.to_string();
    let class = parts.next().map_or_else(|| instance.clone(), ToString::to_string);
    Some(WindowClass { instance, class })
}

/// Snapshot for the frontmost window. File and workspace come from its title
/// only when it belongs to the target; otherwise the workspace is read from
/// `target_title`, the title of one of the target's own windows.
fn describe_window(
    target: &TargetApp,
    frontmost: Option<&WindowClass>,
    title: &str,
    target_title: impl FnOnce() -> Option<String>,
) -> ActivitySnapshot {
    let application = frontmost.map(|c| c.class.as_str());

    if frontmost.is_some_and(|c| target.matches_id(&c.instance)) {
        let file = file_from_title(title, &target.name);
        let workspace = workspace_from_title(title, &target.name);
        return ActivitySnapshot::new(application, file.as_deref(), workspace.as_deref());
    }

    let workspace = target_title().and_then(|t| workspace_from_title(&t, &target.name));
    ActivitySnapshot::new(application, None, workspace.as_deref())
}

pub struct LinuxTracker {
    conn: Option<x11rb::rust_connection::RustConnection>,
    root: Window,
    target: TargetApp,
}

impl LinuxTracker {
    pub fn new(target: TargetApp) -> Self {
        match x11rb::connect(None) {
            Ok((conn, screen_num)) => {
                let Some(root) = conn.setup().roots.get(screen_num).map(|s| s.root) else {
                    warn!(
                        "Invalid screen number {screen_num} ({} screens available). Window tracking disabled.",
                        conn.setup().roots.len()
                    );
                    return Self { conn: None, root: 0, target };
                };
                Self {
                    conn: Some(conn),
                    root,
                    target,
                }
            }
            Err(e) => {
                // Wayland-only and headless sessions end up here; report nothing instead of failing
                warn!("Failed to connect to X server: {e}. Window tracking disabled.");
                Self { conn: None, root: 0, target }
            }
        }
    }

    fn get_atom(&self, name: &str) -> Option<u32> {
        self.conn.as_ref()?
            .intern_atom(false, name.as_bytes())
            .ok()?
            .reply()
            .ok()
            .map(|r| r.atom)
    }

    fn get_raw_property(&self, window: Window, atom: u32) -> Option<Vec<u8>> {
        let reply = self.conn.as_ref()?
            .get_property(false, window, atom, AtomEnum::ANY, 0, 1024)
            .ok()?
            .reply()
            .ok()?;

        if reply.value.is_empty() {
            return None;
        }

        Some(reply.value)
    }

    fn get_window_list(&self, property: &str) -> Vec<Window> {
        let Some(atom) = self.get_atom(property) else {
            return Vec::new();
        };
        let Some(conn) = self.conn.as_ref() else {
            return Vec::new();
        };

        conn.get_property(false, self.root, atom, AtomEnum::WINDOW, 0, 4096)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .and_then(|reply| reply.value32().map(Iterator::collect))
            .unwrap_or_default()
    }

    fn get_active_window_id(&self) -> Option<Window> {
        self.get_window_list("_NET_ACTIVE_WINDOW")
            .into_iter()
            .find(|w| *w != 0)
    }

    fn get_window_class(&self, window: Window) -> Option<WindowClass> {
        let raw = self.get_raw_property(window, AtomEnum::WM_CLASS.into())?;
        parse_wm_class(&raw)
    }

    fn get_window_title(&self, window: Window) -> Option<String> {
        let name_atom = self
            .get_atom("_NET_WM_NAME")
            .unwrap_or_else(|| AtomEnum::WM_NAME.into());

        self.get_raw_property(window, name_atom)
            .or_else(|| self.get_raw_property(window, AtomEnum::WM_NAME.into()))
            .and_then(|raw| String::from_utf8(raw).ok())
    }

    /// Title of the first titled top-level window the target owns.
    fn target_window_title(&self) -> Option<String> {
        self.get_window_list("_NET_CLIENT_LIST")
            .into_iter()
            .filter(|w| {
                self.get_window_class(*w)
                    .is_some_and(|c| self.target.matches_id(&c.instance))
            })
            .find_map(|w| self.get_window_title(w).filter(|t| !t.trim().is_empty()))
    }
}

impl WindowInspector for LinuxTracker {
    fn snapshot(&self) -> ActivitySnapshot {
        let Some(window_id) = self.get_active_window_id() else {
            return ActivitySnapshot::default();
        };

        let class = self.get_window_class(window_id);
        let title = self.get_window_title(window_id).unwrap_or_default();
        describe_window(&self.target, class.as_ref(), &title, || self.target_window_title())
    }
}

impl AppProbe for LinuxTracker {
    fn is_running(&self, bundle_id: &str) -> bool {
        self.get_window_list("_NET_CLIENT_LIST")
            .into_iter()
            .filter_map(|w| self.get_window_class(w))
            .any(|c| c.instance == bundle_id)
    }

    fn frontmost_id(&self) -> Option<String> {
        let window_id = self.get_active_window_id()?;
        self.get_window_class(window_id).map(|c| c.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wm_class() {
        let class = parse_wm_class(b"code\0Code\0").unwrap();
        assert_eq!(class.instance, "code");
        assert_eq!(class.class, "Code");
    }

    #[test]
    fn test_parse_wm_class_without_class_part() {
        let class = parse_wm_class(b"xterm\0").unwrap();
        assert_eq!(class.instance, "xterm");
        assert_eq!(class.class, "xterm");
    }

    #[test]
    fn test_parse_empty_wm_class() {
        assert!(parse_wm_class(b"").is_none());
        assert!(parse_wm_class(b"\0\0").is_none());
    }

    fn vscode() -> TargetApp {
        TargetApp {
            bundle_id: "code".into(),
            name: "Visual Studio Code".into(),
            ..TargetApp::default()
        }
    }

    #[test]
    fn test_describe_target_window() {
        let class = parse_wm_class(b"code\0Code\0").unwrap();
        let snapshot = describe_window(
            &vscode(),
            Some(&class),
            "main.rs - xcpresence - Visual Studio Code",
            || panic!("frontmost target needs no lookup"),
        );

        assert_eq!(snapshot.application_name.as_deref(), Some("Code"));
        assert_eq!(snapshot.file_name.as_deref(), Some("main.rs"));
        assert_eq!(snapshot.workspace_name.as_deref(), Some("xcpresence"));
    }

    #[test]
    fn test_other_app_title_is_not_parsed() {
        let class = parse_wm_class(b"Navigator\0firefox\0").unwrap();
        let snapshot = describe_window(
            &vscode(),
            Some(&class),
            "Pull requests - GitHub - Mozilla Firefox",
            || None,
        );

        assert_eq!(snapshot.application_name.as_deref(), Some("firefox"));
        assert!(snapshot.file_name.is_none());
        assert!(snapshot.workspace_name.is_none());
    }

    #[test]
    fn test_other_app_uses_target_window_for_workspace() {
        let class = parse_wm_class(b"Navigator\0firefox\0").unwrap();
        let snapshot = describe_window(
            &vscode(),
            Some(&class),
            "Pull requests - GitHub - Mozilla Firefox",
            || Some("main.rs - xcpresence - Visual Studio Code".into()),
        );

        assert!(snapshot.file_name.is_none());
        assert_eq!(snapshot.workspace_name.as_deref(), Some("xcpresence"));
    }

    #[test]
    #[ignore] // Requires X11 display
    fn test_get_active_window() {
        let tracker = LinuxTracker::new(TargetApp::default());
        let snapshot = tracker.snapshot();
        log::info!("Active: {snapshot:?}");
    }
}
