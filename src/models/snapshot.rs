/// What the window inspector saw during one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySnapshot {
    pub application_name: Option<String>,
    pub file_name: Option<String>,
    pub workspace_name: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

impl ActivitySnapshot {
    /// Blank values are stored as absent.
    pub fn new(application_name: Option<&str>, file_name: Option<&str>, workspace_name: Option<&str>) -> Self {
        Self {
            application_name: non_blank(application_name),
            file_name: non_blank(file_name),
            workspace_name: non_blank(workspace_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.application_name.is_none() && self.file_name.is_none() && self.workspace_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_values() {
        let snapshot = ActivitySnapshot::new(Some(" Xcode "), Some("main.swift\n"), None);

        assert_eq!(snapshot.application_name.as_deref(), Some("Xcode"));
        assert_eq!(snapshot.file_name.as_deref(), Some("main.swift"));
        assert!(snapshot.workspace_name.is_none());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let snapshot = ActivitySnapshot::new(Some(""), Some("   "), Some("\t"));

        assert!(snapshot.is_empty());
        assert_eq!(snapshot, ActivitySnapshot::default());
    }
}
