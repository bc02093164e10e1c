use crate::errors::{AppError, AppResult};
use crate::models::{CreateNoteOutcome, NoteInfo};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const APP_DIR_NAME: &str = "NoteMark";
pub const NOTE_EXTENSION: &str = "md";
pub const WELCOME_NOTE_FILENAME: &str = "Welcome.md";

const WELCOME_NOTE_CONTENT: &str = include_str!("../resources/welcome.md");

/// Native dialog collaborator. The store never assumes a concrete dialog
/// implementation; it issues a request and acts on the explicit answer.
pub trait DialogService: Send + Sync {
    /// Ask where a new note should be created. `default_path` points inside
    /// the notes directory with a `.md` filter. `None` means the user
    /// cancelled.
    fn pick_note_destination(&self, default_path: &Path) -> Option<PathBuf>;

    /// Ask the user to confirm deleting the named note.
    fn confirm_delete(&self, title: &str) -> bool;

    /// Surface an error message to the user.
    fn show_error(&self, title: &str, message: &str);
}

/// Sole owner of the on-disk note representation: one flat directory, one
/// `.md` file per note, filename stem as the title.
pub struct NoteStore {
    root: PathBuf,
    dialogs: Arc<dyn DialogService>,
}

/// The per-user notes directory: home joined with the application folder.
pub fn default_root_dir() -> AppResult<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .ok_or_else(|| AppError::Internal("no home directory in environment".to_string()))?;
    Ok(home.join(APP_DIR_NAME))
}

impl NoteStore {
    pub fn new(root: PathBuf, dialogs: Arc<dyn DialogService>) -> Self {
        Self { root, dialogs }
    }

    pub fn in_home_dir(dialogs: Arc<dyn DialogService>) -> AppResult<Self> {
        Ok(Self::new(default_root_dir()?, dialogs))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_root(&self) -> AppResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|error| AppError::Io(error.to_string()))?;
        }
        Ok(())
    }

    fn note_path(&self, title: &str) -> PathBuf {
        self.root.join(format!("{}.{}", title, NOTE_EXTENSION))
    }

    /// Lists `.md` files in the root directory. An empty directory is seeded
    /// with the bundled welcome note; the seed is a regular file afterwards,
    /// so repeated listings never duplicate it.
    pub fn list_notes(&self) -> AppResult<Vec<NoteInfo>> {
        self.ensure_root()?;

        let mut notes = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|error| AppError::Io(error.to_string()))? {
            let entry = entry.map_err(|error| AppError::Io(error.to_string()))?;
            let path = entry.path();
            if !path.is_file()
                || path.extension().and_then(|value| value.to_str()) != Some(NOTE_EXTENSION)
            {
                continue;
            }
            match note_info_from_path(&path) {
                Ok(info) => notes.push(info),
                Err(error) => {
                    tracing::warn!(path = %path.to_string_lossy(), error = %error, "skipping unreadable note file");
                }
            }
        }

        if notes.is_empty() {
            tracing::info!("no notes found, creating the welcome note");
            let path = self.root.join(WELCOME_NOTE_FILENAME);
            fs::write(&path, WELCOME_NOTE_CONTENT)
                .map_err(|error| AppError::Io(error.to_string()))?;
            notes.push(note_info_from_path(&path)?);
        }

        Ok(notes)
    }

    pub fn read_note(&self, title: &str) -> AppResult<String> {
        match fs::read_to_string(self.note_path(title)) {
            Ok(content) => Ok(content),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Note '{}' not found", title)))
            }
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    /// Fully replaces the note's content. No merge, no append.
    pub fn write_note(&self, title: &str, content: &str) -> AppResult<()> {
        self.ensure_root()?;
        tracing::info!(title = %title, "writing note");
        fs::write(self.note_path(title), content).map_err(|error| AppError::Io(error.to_string()))
    }

    /// Interactive create. The destination comes from the save dialog; a
    /// destination outside the root directory is rejected with a user-facing
    /// error and reported as a cancellation, never as a failure.
    pub fn create_note(&self) -> AppResult<CreateNoteOutcome> {
        self.ensure_root()?;

        let default_path = self.root.join(format!("Untitled.{}", NOTE_EXTENSION));
        let Some(destination) = self.dialogs.pick_note_destination(&default_path) else {
            tracing::info!("note creation cancelled");
            return Ok(CreateNoteOutcome::Cancelled);
        };

        let title = match self.validate_destination(&destination) {
            Ok(title) => title,
            Err(error) => {
                tracing::warn!(destination = %destination.to_string_lossy(), error = %error, "rejecting note destination");
                self.dialogs.show_error(
                    "Creation failed",
                    &format!("All notes must live in {}", self.root.to_string_lossy()),
                );
                return Ok(CreateNoteOutcome::Cancelled);
            }
        };

        tracing::info!(title = %title, "creating note");
        fs::write(self.note_path(&title), "").map_err(|error| AppError::Io(error.to_string()))?;
        Ok(CreateNoteOutcome::Created { title })
    }

    fn validate_destination(&self, destination: &Path) -> AppResult<String> {
        if destination.parent() != Some(self.root.as_path()) {
            return Err(AppError::InvalidLocation(format!(
                "'{}' is outside the notes directory",
                destination.to_string_lossy()
            )));
        }
        destination
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                AppError::InvalidLocation(format!(
                    "'{}' has no usable file name",
                    destination.to_string_lossy()
                ))
            })
    }

    /// Confirmation-gated delete. A declined confirmation leaves the file in
    /// place and returns `false`.
    pub fn delete_note(&self, title: &str) -> AppResult<bool> {
        if !self.dialogs.confirm_delete(title) {
            tracing::info!(title = %title, "note deletion cancelled");
            return Ok(false);
        }

        tracing::info!(title = %title, "deleting note");
        fs::remove_file(self.note_path(title)).map_err(|error| AppError::Io(error.to_string()))?;
        Ok(true)
    }
}

fn note_info_from_path(path: &Path) -> AppResult<NoteInfo> {
    let metadata = fs::metadata(path).map_err(|error| AppError::Io(error.to_string()))?;
    let modified = metadata
        .modified()
        .map_err(|error| AppError::Io(error.to_string()))?;
    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(NoteInfo {
        title,
        last_edit_time: DateTime::<Utc>::from(modified).timestamp_millis(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DialogService;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Scripted stand-in for the native dialogs: one queued destination for
    /// the save dialog, a fixed confirm answer, and a record of error popups.
    #[derive(Default)]
    pub(crate) struct ScriptedDialogs {
        destination: Mutex<Option<PathBuf>>,
        confirm: AtomicBool,
        pub errors: Mutex<Vec<String>>,
    }

    impl ScriptedDialogs {
        pub fn cancelling() -> Self {
            Self::default()
        }

        pub fn picking(destination: PathBuf) -> Self {
            let dialogs = Self::default();
            *dialogs.destination.lock().expect("scripted destination lock") = Some(destination);
            dialogs
        }

        pub fn confirming(answer: bool) -> Self {
            let dialogs = Self::default();
            dialogs.confirm.store(answer, Ordering::SeqCst);
            dialogs
        }
    }

    impl DialogService for ScriptedDialogs {
        fn pick_note_destination(&self, _default_path: &Path) -> Option<PathBuf> {
            self.destination
                .lock()
                .expect("scripted destination lock")
                .take()
        }

        fn confirm_delete(&self, _title: &str) -> bool {
            self.confirm.load(Ordering::SeqCst)
        }

        fn show_error(&self, _title: &str, message: &str) {
            self.errors
                .lock()
                .expect("scripted errors lock")
                .push(message.to_string());
        }
    }
}
