// src/constants.rs

/// Bundle identifier of the tracked editor
pub const XCODE_BUNDLE_ID: &str = "com.apple.dt.Xcode";

/// Foreground application name reported for the tracked editor
pub const XCODE_APP_NAME: &str = "Xcode";

/// Seconds between two presence refreshes while connected
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5;

/// Seconds between two lifecycle polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Extra wall-clock seconds between polls that count as a system sleep
pub const DEFAULT_SLEEP_GAP_SECS: u64 = 30;

/// Maximum refresh interval accepted from the command line (5 minutes)
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 5 * 60;

/// Asset key of the editor icon
pub const ICON_KEY_XCODE: &str = "xcode";

/// Asset key used when no better icon is known
pub const ICON_KEY_DEFAULT: &str = "default";

/// Workspace name Xcode reports for a document that was never saved
pub const UNTITLED_WORKSPACE: &str = "Untitled";

/// Shown in place of a workspace name when none was ever seen
pub const UNKNOWN_WORKSPACE: &str = "?";

/// Windows that belong to the Xcode tool suite but run as separate apps
pub const XCODE_WINDOW_NAMES: &[&str] = &[
    "Simulator",
    "Instruments",
    "Accessibility Inspector",
    "FileMerge",
    "Create ML",
    "Reality Composer",
];

/// File extensions that have a dedicated presence asset
pub const FILE_ICON_KEYS: &[&str] = &[
    "swift",
    "playground",
    "storyboard",
    "xib",
    "xcodeproj",
    "xcworkspace",
    "xcassets",
    "xcconfig",
    "entitlements",
    "plist",
    "metal",
    "h",
    "m",
    "mm",
    "c",
    "cpp",
    "hpp",
    "json",
    "md",
    "strings",
    "js",
    "py",
    "rb",
    "sh",
];

/// Environment variable holding the Discord application id
pub const CLIENT_ID_ENV: &str = "XCPRESENCE_CLIENT_ID";
