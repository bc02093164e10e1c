use crate::errors::AppResult;
use crate::state::NoteState;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Idle window after the last keystroke before the pending edit is saved.
pub const AUTOSAVE_IDLE: Duration = Duration::from_millis(3000);

#[derive(Default)]
struct PendingSlot {
    content: Option<String>,
    /// Bumped on every edit and every flush; an armed timer only fires if
    /// its generation is still current.
    generation: u64,
}

/// Wires the editor widget into the note state: edits land in a single
/// pending-save slot that is flushed either by timer expiry or by an
/// explicit flush (blur, selection change), so at most one save is in
/// flight per idle period and the final edit is never lost.
pub struct EditorFlow {
    state: Arc<NoteState>,
    idle: Duration,
    slot: Arc<Mutex<PendingSlot>>,
}

impl EditorFlow {
    pub fn new(state: Arc<NoteState>) -> Self {
        Self::with_idle_window(state, AUTOSAVE_IDLE)
    }

    pub fn with_idle_window(state: Arc<NoteState>, idle: Duration) -> Self {
        Self {
            state,
            idle,
            slot: Arc::new(Mutex::new(PendingSlot::default())),
        }
    }

    /// Records an edit and arms the trailing autosave timer. Further edits
    /// within the idle window overwrite the slot and re-arm the timer, so a
    /// burst of typing collapses into one save. Must be called on a Tokio
    /// runtime.
    pub fn on_edit(&self, content: String) {
        let generation = {
            let mut slot = self.slot.lock().expect("autosave slot lock");
            slot.content = Some(content);
            slot.generation += 1;
            slot.generation
        };

        let state = self.state.clone();
        let slot = self.slot.clone();
        let idle = self.idle;
        tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            let content = {
                let mut guard = slot.lock().expect("autosave slot lock");
                if guard.generation != generation {
                    // superseded by a later edit or an explicit flush
                    return;
                }
                guard.content.take()
            };
            if let Some(content) = content {
                tracing::info!("autosaving note");
                if let Err(error) = state.save(&content).await {
                    tracing::warn!(error = %error, "autosave failed");
                }
            }
        });
    }

    /// Disarms the timer and saves the pending edit, if any. Returns whether
    /// a save happened.
    pub async fn flush(&self) -> AppResult<bool> {
        match self.disarm() {
            Some(content) => {
                self.state.save(&content).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Disarms the timer and immediately saves `content`. This is the blur
    /// path, which carries the editor's latest text.
    pub async fn flush_with(&self, content: &str) -> AppResult<()> {
        self.disarm();
        self.state.save(content).await
    }

    /// Selects a note, flushing the pending edit of the previous one first
    /// so it can never land under the newly selected title.
    pub async fn select(&self, index: usize) -> AppResult<()> {
        self.flush().await?;
        self.state.select(index).await
    }

    pub async fn deselect(&self) -> AppResult<()> {
        self.flush().await?;
        self.state.deselect();
        Ok(())
    }

    fn disarm(&self) -> Option<String> {
        let mut slot = self.slot.lock().expect("autosave slot lock");
        slot.generation += 1;
        slot.content.take()
    }
}
