use crate::constants::{
    FILE_ICON_KEYS, ICON_KEY_DEFAULT, ICON_KEY_XCODE, XCODE_APP_NAME, XCODE_BUNDLE_ID,
    XCODE_WINDOW_NAMES,
};

/// The editor whose activity is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetApp {
    /// Identifier carried by lifecycle signals (bundle id on macOS, `WM_CLASS` instance on X11).
    pub bundle_id: String,
    /// Name the window inspector reports while the editor is frontmost.
    pub name: String,
    /// Companion tools that count as "using" the editor.
    pub auxiliary_windows: Vec<String>,
    /// File extensions with their own asset.
    pub icon_keys: Vec<String>,
    pub app_icon: String,
    pub default_icon: String,
}

impl Default for TargetApp {
    fn default() -> Self {
        Self {
            bundle_id: XCODE_BUNDLE_ID.to_string(),
            name: XCODE_APP_NAME.to_string(),
            auxiliary_windows: XCODE_WINDOW_NAMES.iter().map(ToString::to_string).collect(),
            icon_keys: FILE_ICON_KEYS.iter().map(ToString::to_string).collect(),
            app_icon: ICON_KEY_XCODE.to_string(),
            default_icon: ICON_KEY_DEFAULT.to_string(),
        }
    }
}

impl TargetApp {
    pub fn is_target(&self, application_name: Option<&str>) -> bool {
        application_name == Some(self.name.as_str())
    }

    pub fn is_auxiliary(&self, application_name: &str) -> bool {
        self.auxiliary_windows.iter().any(|w| w == application_name)
    }

    pub fn has_icon_for(&self, extension: &str) -> bool {
        self.icon_keys.iter().any(|k| k == extension)
    }

    pub fn matches_id(&self, bundle_id: &str) -> bool {
        self.bundle_id == bundle_id
    }
}
