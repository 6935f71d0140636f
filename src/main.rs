//! gguf-import - Model import tool
//!
//! Validates a GGUF model file, copies it into app storage and hands off to chat.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gguf_import::app::{ImportFlow, ImportState};
use gguf_import::import::ModelImporter;
use gguf_import::storage::registry::ModelRegistry;
use gguf_import::storage::{self, models::format_size, settings};
use gguf_import::types::FileHandle;
use gguf_import::ui::ConsoleUi;

const USAGE: &str = "usage: gguf-import <model-file> [--no-chat]";

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing subscriber for logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gguf_import=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("Starting gguf-import v{}", env!("CARGO_PKG_VERSION"));

    let mut path = None;
    let mut open_chat = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-chat" => open_chat = Some(false),
            "-h" | "--help" => {
                println!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            _ if path.is_none() => path = Some(arg),
            _ => {
                eprintln!("{}", USAGE);
                return ExitCode::from(2);
            }
        }
    }
    let Some(path) = path else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    if let Err(e) = storage::init_storage() {
        error!("Failed to initialize storage: {}", e);
        return ExitCode::FAILURE;
    }

    let settings = settings::load_settings();
    let registry = match storage::default_registry_path().and_then(|path| ModelRegistry::open(path)) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to open model registry: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let importer = Arc::new(ModelImporter::from_settings(&settings, registry));
    let ui = Arc::new(ConsoleUi::new(std::io::stdin().is_terminal()));
    let mut flow = ImportFlow::new(importer, ui)
        .with_open_chat_screen(open_chat.unwrap_or(settings.open_chat_screen));

    match flow.on_file_selected(Arc::new(FileHandle::new(path))).await {
        ImportState::Imported(dest) => {
            let size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
            println!("{} ({})", dest.display(), format_size(size));
            ExitCode::SUCCESS
        }
        state => {
            info!("Import did not complete: {:?}", state);
            ExitCode::FAILURE
        }
    }
}
