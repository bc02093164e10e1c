use crate::errors::{AppError, AppResult};
use crate::models::{CreateNoteOutcome, NoteInfo};
use crate::store::NoteStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only channel through which the unprivileged UI layer reaches the note
/// store: five named operations, validated arguments, nothing else. The
/// gateway adds no business logic beyond dispatch and marshalling.
pub struct NoteGateway {
    store: NoteStore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum GatewayRequest {
    ListNotes,
    ReadNote { title: String },
    WriteNote { title: String, content: String },
    CreateNote,
    DeleteNote { title: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GatewayResponse {
    Notes { notes: Vec<NoteInfo> },
    Content { content: String },
    Written,
    Created { outcome: CreateNoteOutcome },
    Deleted { deleted: bool },
}

impl NoteGateway {
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }

    pub async fn list_notes(&self) -> AppResult<Vec<NoteInfo>> {
        self.store.list_notes()
    }

    pub async fn read_note(&self, title: &str) -> AppResult<String> {
        validate_title(title)?;
        self.store.read_note(title)
    }

    pub async fn write_note(&self, title: &str, content: &str) -> AppResult<()> {
        validate_title(title)?;
        self.store.write_note(title, content)
    }

    pub async fn create_note(&self) -> AppResult<CreateNoteOutcome> {
        self.store.create_note()
    }

    pub async fn delete_note(&self, title: &str) -> AppResult<bool> {
        validate_title(title)?;
        self.store.delete_note(title)
    }

    pub async fn dispatch(&self, request: GatewayRequest) -> AppResult<GatewayResponse> {
        match request {
            GatewayRequest::ListNotes => Ok(GatewayResponse::Notes {
                notes: self.list_notes().await?,
            }),
            GatewayRequest::ReadNote { title } => Ok(GatewayResponse::Content {
                content: self.read_note(&title).await?,
            }),
            GatewayRequest::WriteNote { title, content } => {
                self.write_note(&title, &content).await?;
                Ok(GatewayResponse::Written)
            }
            GatewayRequest::CreateNote => Ok(GatewayResponse::Created {
                outcome: self.create_note().await?,
            }),
            GatewayRequest::DeleteNote { title } => Ok(GatewayResponse::Deleted {
                deleted: self.delete_note(&title).await?,
            }),
        }
    }

    /// Wire-level entry point for the process boundary: JSON in, JSON out,
    /// failures flattened to client-facing strings.
    pub async fn dispatch_json(&self, request: Value) -> Result<Value, String> {
        let request: GatewayRequest = serde_json::from_value(request).map_err(to_client_error)?;
        let response = self.dispatch(request).await.map_err(to_client_error)?;
        serde_json::to_value(response).map_err(to_client_error)
    }
}

/// A title must be a single path component so the unprivileged surface can
/// never address files outside the root directory.
pub fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "note title cannot be empty".to_string(),
        ));
    }
    if title.contains('/') || title.contains('\\') || title == "." || title == ".." {
        return Err(AppError::InvalidArgument(format!(
            "note title '{}' must be a bare file name",
            title
        )));
    }
    if title.chars().any(char::is_control) {
        return Err(AppError::InvalidArgument(
            "note title contains control characters".to_string(),
        ));
    }
    if title.to_ascii_lowercase().ends_with(".md") {
        return Err(AppError::InvalidArgument(format!(
            "note title '{}' must not carry the .md extension",
            title
        )));
    }
    Ok(())
}

fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
