mod editor;
mod errors;
mod gateway;
mod models;
mod state;
mod store;

pub use editor::{EditorFlow, AUTOSAVE_IDLE};
pub use errors::{AppError, AppResult};
pub use gateway::{validate_title, GatewayRequest, GatewayResponse, NoteGateway};
pub use models::{format_last_edit, CreateNoteOutcome, NoteInfo, SelectedNote};
pub use state::{NoteState, SelectionState};
pub use store::{
    default_root_dir, DialogService, NoteStore, APP_DIR_NAME, NOTE_EXTENSION,
    WELCOME_NOTE_FILENAME,
};

use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Builds the full stack for the desktop shell: store in the per-user notes
/// directory, gateway on top, state container initialized from disk.
pub async fn bootstrap(dialogs: Arc<dyn DialogService>) -> AppResult<Arc<NoteState>> {
    let store = NoteStore::in_home_dir(dialogs)?;
    let gateway = Arc::new(NoteGateway::new(store));
    NoteState::initialize(gateway).await
}

pub fn init_tracing(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "notemark.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
