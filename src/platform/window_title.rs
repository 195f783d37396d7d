//! Window title parsing.
//!
//! Editors put the file, the project and sometimes their own name in the
//! title, joined by an em dash (Xcode: `MyApp — main.swift`) or a hyphen
//! (`main.rs - project - Visual Studio Code`).

use crate::presence::file_extension;

const EDITED_MARKER: &str = "Edited";

fn segments<'a>(title: &'a str, app_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    title
        .split(" — ")
        .flat_map(|part| part.split(" - "))
        .map(str::trim)
        .filter(move |s| !s.is_empty() && *s != EDITED_MARKER && *s != app_name)
}

/// The last title segment that looks like a file name.
pub fn file_from_title(title: &str, app_name: &str) -> Option<String> {
    segments(title, app_name)
        .filter(|s| file_extension(s).is_some())
        .last()
        .map(ToString::to_string)
}

/// The first title segment that is not a file name.
pub fn workspace_from_title(title: &str, app_name: &str) -> Option<String> {
    segments(title, app_name)
        .find(|s| file_extension(s).is_none())
        .map(ToString::to_string)
}
