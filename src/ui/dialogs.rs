//! Alert dialog descriptions

/// Button the user pressed on an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChoice {
    Positive,
    Negative,
}

/// Content of an alert dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDialog {
    pub title: String,
    pub text: String,
    pub positive_button: String,
    pub negative_button: Option<String>,
}

impl AlertDialog {
    /// Shown when the selected file does not start with the GGUF magic
    pub fn invalid_file() -> Self {
        Self {
            title: "Invalid File".to_string(),
            text: "The selected file is not a valid GGUF model. Please select a file with the .gguf format.".to_string(),
            positive_button: "OK".to_string(),
            negative_button: None,
        }
    }

    /// Shown when copying a valid model into storage failed
    pub fn copy_failed(reason: impl std::fmt::Display) -> Self {
        Self {
            title: "Import Failed".to_string(),
            text: format!("The model could not be copied into app storage: {}", reason),
            positive_button: "Retry".to_string(),
            negative_button: Some("Cancel".to_string()),
        }
    }

    /// Shown when an import failed in a way a retry would not fix
    pub fn import_failed(reason: impl std::fmt::Display) -> Self {
        Self {
            title: "Import Failed".to_string(),
            text: format!("The model could not be imported: {}", reason),
            positive_button: "OK".to_string(),
            negative_button: None,
        }
    }

    /// True if the dialog offers a second button
    pub fn has_negative_button(&self) -> bool {
        self.negative_button.is_some()
    }
}
