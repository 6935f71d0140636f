//! UI collaborators
//!
//! The import screen drives dialogs, a progress indicator and navigation
//! that are owned by the host application. This module defines that
//! boundary; a console implementation is provided for the command line.

pub mod console;
pub mod dialogs;

use async_trait::async_trait;

pub use console::ConsoleUi;
pub use dialogs::{AlertChoice, AlertDialog};

/// Operations the import screen needs from its host
#[async_trait]
pub trait ImportUi: Send + Sync {
    /// Show a blocking alert and wait for the user's choice
    async fn show_alert(&self, dialog: AlertDialog) -> AlertChoice;

    /// Show a modal progress indicator
    async fn show_progress(&self, title: &str, text: &str);

    /// Dismiss the progress indicator
    async fn hide_progress(&self);

    /// Enter the chat screen
    async fn open_chat_screen(&self);

    /// Close the import screen
    async fn finish(&self);
}
