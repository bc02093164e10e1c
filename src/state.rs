use crate::errors::AppResult;
use crate::gateway::NoteGateway;
use crate::models::{now_millis, NoteInfo, SelectedNote};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Lifecycle of the current selection. `Resolving` covers the window where
/// the content read is still in flight; consumers must tolerate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    Resolving,
    Ready(SelectedNote),
}

struct StateInner {
    notes: Vec<NoteInfo>,
    selected_index: Option<usize>,
    selection: SelectionState,
    /// Bumped on every selection-affecting change; a resolution only lands
    /// if its epoch is still current, so the latest selection always wins.
    epoch: u64,
}

/// The reactive note state: the notes collection, the selection index, and
/// the derived selected note. Owned by the application root and mutated only
/// through the operations below; every change bumps the revision feed.
pub struct NoteState {
    gateway: Arc<NoteGateway>,
    inner: Mutex<StateInner>,
    changed: watch::Sender<u64>,
}

impl NoteState {
    /// Loads the collection once, sorted by last edit descending. It is not
    /// re-polled from disk afterwards; mutators keep it consistent.
    pub async fn initialize(gateway: Arc<NoteGateway>) -> AppResult<Arc<Self>> {
        let mut notes = gateway.list_notes().await?;
        notes.sort_by(|a, b| b.last_edit_time.cmp(&a.last_edit_time));
        tracing::debug!(count = notes.len(), "note state initialized");

        let (changed, _) = watch::channel(0);
        Ok(Arc::new(Self {
            gateway,
            inner: Mutex::new(StateInner {
                notes,
                selected_index: None,
                selection: SelectionState::Idle,
                epoch: 0,
            }),
            changed,
        }))
    }

    pub fn notes(&self) -> Vec<NoteInfo> {
        self.lock().notes.clone()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.lock().selected_index
    }

    pub fn selection(&self) -> SelectionState {
        self.lock().selection.clone()
    }

    pub fn selected_note(&self) -> Option<SelectedNote> {
        match self.selection() {
            SelectionState::Ready(note) => Some(note),
            _ => None,
        }
    }

    /// Resolved selection, or the empty placeholder while nothing is ready.
    pub fn selected_or_placeholder(&self) -> SelectedNote {
        self.selected_note().unwrap_or_else(SelectedNote::placeholder)
    }

    /// Revision feed for re-rendering: the value changes after every state
    /// mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    /// Selects a note by its index in the collection and resolves its
    /// content. An out-of-range index resolves to `Idle`, never an error.
    pub async fn select(&self, index: usize) -> AppResult<()> {
        let (epoch, target) = {
            let mut inner = self.lock();
            inner.selected_index = Some(index);
            inner.epoch += 1;
            let target = inner.notes.get(index).cloned();
            inner.selection = if target.is_some() {
                SelectionState::Resolving
            } else {
                SelectionState::Idle
            };
            (inner.epoch, target)
        };
        self.notify();

        match target {
            Some(info) => self.resolve(epoch, info).await,
            None => Ok(()),
        }
    }

    pub fn deselect(&self) {
        {
            let mut inner = self.lock();
            inner.selected_index = None;
            inner.epoch += 1;
            inner.selection = SelectionState::Idle;
        }
        self.notify();
    }

    /// Persists `content` for the selected note, then patches that entry's
    /// `lastEditTime`. The collection is not re-sorted here; the next full
    /// reload re-derives the order. No-op when nothing is selected.
    pub async fn save(&self, content: &str) -> AppResult<()> {
        let Some(title) = self.selected_title() else {
            return Ok(());
        };

        self.gateway.write_note(&title, content).await?;

        {
            let mut inner = self.lock();
            let now = now_millis();
            if let Some(entry) = inner.notes.iter_mut().find(|note| note.title == title) {
                entry.last_edit_time = now;
            }
        }
        self.notify();
        Ok(())
    }

    /// Runs the interactive create flow. On success the new note is
    /// prepended (evicting any stale entry with the same title) and becomes
    /// the selection; on cancellation nothing changes.
    pub async fn create_empty(&self) -> AppResult<Option<String>> {
        let title = match self.gateway.create_note().await? {
            crate::models::CreateNoteOutcome::Cancelled => return Ok(None),
            crate::models::CreateNoteOutcome::Created { title } => title,
        };

        let info = NoteInfo {
            title: title.clone(),
            last_edit_time: now_millis(),
        };
        let epoch = {
            let mut inner = self.lock();
            inner.notes.retain(|note| note.title != title);
            inner.notes.insert(0, info.clone());
            inner.selected_index = Some(0);
            inner.selection = SelectionState::Resolving;
            inner.epoch += 1;
            inner.epoch
        };
        self.notify();

        self.resolve(epoch, info).await?;
        Ok(Some(title))
    }

    /// Deletes the selected note behind the confirmation dialog. Declined
    /// confirmation leaves everything untouched and returns `false`.
    pub async fn delete_selected(&self) -> AppResult<bool> {
        let Some(title) = self.selected_title() else {
            return Ok(false);
        };

        if !self.gateway.delete_note(&title).await? {
            return Ok(false);
        }

        {
            let mut inner = self.lock();
            inner.notes.retain(|note| note.title != title);
            inner.selected_index = None;
            inner.epoch += 1;
            inner.selection = SelectionState::Idle;
        }
        self.notify();
        Ok(true)
    }

    async fn resolve(&self, epoch: u64, info: NoteInfo) -> AppResult<()> {
        let content = match self.gateway.read_note(&info.title).await {
            Ok(content) => content,
            Err(error) => {
                let mut inner = self.lock();
                if inner.epoch == epoch {
                    inner.selection = SelectionState::Idle;
                }
                drop(inner);
                self.notify();
                return Err(error);
            }
        };

        {
            let mut inner = self.lock();
            if inner.epoch != epoch {
                // a newer selection superseded this resolution
                return Ok(());
            }
            inner.selection = SelectionState::Ready(SelectedNote {
                title: info.title,
                last_edit_time: info.last_edit_time,
                content,
            });
        }
        self.notify();
        Ok(())
    }

    fn selected_title(&self) -> Option<String> {
        let inner = self.lock();
        let index = inner.selected_index?;
        inner.notes.get(index).map(|note| note.title.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StateInner> {
        self.inner.lock().expect("note state lock")
    }

    fn notify(&self) {
        self.changed.send_modify(|revision| *revision += 1);
    }
}
