//! Console host for the import flow

use std::io::{self, BufRead};

use async_trait::async_trait;

use crate::ui::{AlertChoice, AlertDialog, ImportUi};

/// Prints dialogs to stderr and reads alert choices from stdin
#[derive(Debug, Clone, Default)]
pub struct ConsoleUi {
    /// When false, alerts with two buttons resolve to the negative choice
    /// without prompting
    pub interactive: bool,
}

impl ConsoleUi {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }
}

/// Map a line typed by the user to a button; "r"/"retry"/"y"/"yes" pick the
/// positive button
pub fn parse_choice(line: &str) -> AlertChoice {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "retry" | "y" | "yes" => AlertChoice::Positive,
        _ => AlertChoice::Negative,
    }
}

/// Read one line from `reader` and map it with [`parse_choice`].
///
/// Anything buffered past the line stays in `reader` for the next alert.
pub fn read_choice<R: BufRead>(reader: &mut R) -> io::Result<AlertChoice> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(parse_choice(&line))
}

#[async_trait]
impl ImportUi for ConsoleUi {
    async fn show_alert(&self, dialog: AlertDialog) -> AlertChoice {
        eprintln!("\n{}\n{}", dialog.title, dialog.text);

        let Some(negative) = dialog.negative_button.as_deref() else {
            eprintln!("[{}]", dialog.positive_button);
            return AlertChoice::Positive;
        };

        if !self.interactive {
            eprintln!("[{}] / [{}] -> {}", dialog.positive_button, negative, negative);
            return AlertChoice::Negative;
        }

        eprint!("[{}] / [{}]: ", dialog.positive_button, negative);
        // std's stdin buffer is process-wide, so typed-ahead lines survive
        // between alerts
        let choice = tokio::task::spawn_blocking(|| read_choice(&mut io::stdin().lock())).await;
        match choice {
            Ok(Ok(choice)) => choice,
            Ok(Err(e)) => {
                tracing::warn!("Failed to read choice from stdin: {}", e);
                AlertChoice::Negative
            }
            Err(e) => {
                tracing::warn!("Stdin reader task failed: {}", e);
                AlertChoice::Negative
            }
        }
    }

    async fn show_progress(&self, title: &str, text: &str) {
        eprintln!("{}: {}", title, text);
    }

    async fn hide_progress(&self) {
        tracing::debug!("Progress dismissed");
    }

    async fn open_chat_screen(&self) {
        eprintln!("Opening chat...");
    }

    async fn finish(&self) {
        tracing::debug!("Import screen closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("r\n"), AlertChoice::Positive);
        assert_eq!(parse_choice("  Retry "), AlertChoice::Positive);
        assert_eq!(parse_choice("yes"), AlertChoice::Positive);
        assert_eq!(parse_choice(""), AlertChoice::Negative);
        assert_eq!(parse_choice("c"), AlertChoice::Negative);
    }

    #[test]
    fn test_read_choice_keeps_buffered_lines() {
        let mut input = Cursor::new("r\ncancel\n");
        assert_eq!(read_choice(&mut input).unwrap(), AlertChoice::Positive);
        assert_eq!(read_choice(&mut input).unwrap(), AlertChoice::Negative);
        assert_eq!(read_choice(&mut input).unwrap(), AlertChoice::Negative);
    }

    #[tokio::test]
    async fn test_non_interactive_alerts_resolve_without_input() {
        let ui = ConsoleUi::new(false);
        assert_eq!(ui.show_alert(AlertDialog::invalid_file()).await, AlertChoice::Positive);
        assert_eq!(ui.show_alert(AlertDialog::copy_failed("disk full")).await, AlertChoice::Negative);
    }
}
