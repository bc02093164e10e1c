use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Lightweight note metadata, recomputed from disk on every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    pub title: String,
    /// Milliseconds since epoch, derived from the file's modification time.
    pub last_edit_time: i64,
}

/// A note opened for editing: metadata plus its full Markdown content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedNote {
    pub title: String,
    pub last_edit_time: i64,
    pub content: String,
}

impl SelectedNote {
    /// Empty default shown before any selection has resolved.
    pub fn placeholder() -> Self {
        Self {
            title: String::new(),
            last_edit_time: now_millis(),
            content: String::new(),
        }
    }
}

/// Result of the interactive create flow. Cancellation is a value, not an
/// error: the user backing out of the dialog is an expected outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CreateNoteOutcome {
    Created { title: String },
    Cancelled,
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Short local-time label for a note's last edit, for list rows.
pub fn format_last_edit(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(instant) => instant
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_info_uses_camel_case_wire_names() {
        let info = NoteInfo {
            title: "Groceries".to_string(),
            last_edit_time: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&info).expect("serialize note info");
        assert_eq!(value["title"], "Groceries");
        assert_eq!(value["lastEditTime"], 1_700_000_000_000_i64);
    }

    #[test]
    fn create_outcome_is_tagged() {
        let created = CreateNoteOutcome::Created {
            title: "Untitled".to_string(),
        };
        let value = serde_json::to_value(&created).expect("serialize outcome");
        assert_eq!(value["outcome"], "created");
        assert_eq!(value["title"], "Untitled");

        let cancelled: CreateNoteOutcome =
            serde_json::from_value(serde_json::json!({"outcome": "cancelled"}))
                .expect("deserialize cancelled");
        assert_eq!(cancelled, CreateNoteOutcome::Cancelled);
    }

    #[test]
    fn format_last_edit_handles_out_of_range_timestamps() {
        assert_eq!(format_last_edit(i64::MAX), "unknown");
        assert!(!format_last_edit(now_millis()).is_empty());
    }
}
