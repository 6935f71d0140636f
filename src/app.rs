//! Import screen flow
//!
//! Ties the importer to the host's dialogs and navigation: validate the
//! selected file, show progress while it is copied, then move on to chat.

use std::path::PathBuf;
use std::sync::Arc;

use crate::import::{ImportError, ModelImporter};
use crate::types::ModelHandle;
use crate::ui::{AlertChoice, AlertDialog, ImportUi};

/// Represents the current state of the import screen
#[derive(Clone, PartialEq, Debug)]
pub enum ImportState {
    Idle,
    Copying(String),
    Imported(PathBuf),
    Failed(String),
}

/// Drives a single import screen
pub struct ImportFlow {
    importer: Arc<ModelImporter>,
    ui: Arc<dyn ImportUi>,
    open_chat_screen: bool,
    state: ImportState,
}

impl ImportFlow {
    pub fn new(importer: Arc<ModelImporter>, ui: Arc<dyn ImportUi>) -> Self {
        Self {
            importer,
            ui,
            open_chat_screen: true,
            state: ImportState::Idle,
        }
    }

    /// Whether the chat screen is opened after a successful import
    pub fn with_open_chat_screen(mut self, open_chat_screen: bool) -> Self {
        self.open_chat_screen = open_chat_screen;
        self
    }

    pub fn state(&self) -> &ImportState {
        &self.state
    }

    /// Handle a file picked by the user.
    ///
    /// Files without the GGUF magic get the invalid-file alert and are never
    /// copied. Failures a retry might fix offer Retry, which runs the import
    /// again with the same handle, or Cancel, which leaves the screen open.
    /// Other failures, such as another import still running, get a
    /// single-button alert.
    pub async fn on_file_selected(&mut self, handle: Arc<dyn ModelHandle>) -> ImportState {
        let name = handle.display_name();

        if !self.importer.validate(handle.as_ref()) {
            self.reject_invalid(&name).await;
            return self.state.clone();
        }

        loop {
            self.state = ImportState::Copying(name.clone());
            self.ui
                .show_progress("Importing model", &format!("Copying {} into app storage", name))
                .await;
            let result = self.importer.import_file(handle.clone()).await;
            self.ui.hide_progress().await;

            match result {
                Ok(model) => {
                    self.state = ImportState::Imported(model.path);
                    self.complete().await;
                    break;
                }
                Err(ImportError::InvalidFormat { .. }) => {
                    // The file changed between the check and the copy
                    self.reject_invalid(&name).await;
                    break;
                }
                Err(e) if !e.is_retryable() => {
                    tracing::warn!("Import of {} not started: {}", name, e);
                    self.ui.show_alert(AlertDialog::import_failed(&e)).await;
                    self.state = ImportState::Failed(e.to_string());
                    break;
                }
                Err(e) => {
                    tracing::error!("Import of {} failed: {}", name, e);
                    let choice = self.ui.show_alert(AlertDialog::copy_failed(&e)).await;
                    if choice == AlertChoice::Positive {
                        tracing::info!("Retrying import of {}", name);
                        continue;
                    }
                    self.state = ImportState::Failed(e.to_string());
                    break;
                }
            }
        }

        self.state.clone()
    }

    async fn reject_invalid(&mut self, name: &str) {
        tracing::warn!("Rejected {}: not a GGUF file", name);
        self.ui.show_alert(AlertDialog::invalid_file()).await;
        self.state = ImportState::Failed(format!("{} is not a GGUF model file", name));
    }

    async fn complete(&self) {
        if self.open_chat_screen {
            self.ui.open_chat_screen().await;
        }
        self.ui.finish().await;
    }
}
