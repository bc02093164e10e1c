use notemark::{
    CreateNoteOutcome, DialogService, EditorFlow, NoteGateway, NoteState, NoteStore,
    SelectionState,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted dialogs for the end-to-end run: answers are set per step.
#[derive(Default)]
struct StagedDialogs {
    destination: Mutex<Option<PathBuf>>,
    confirm: AtomicBool,
}

impl StagedDialogs {
    fn stage_destination(&self, path: PathBuf) {
        *self.destination.lock().expect("staged destination lock") = Some(path);
    }

    fn stage_confirm(&self, answer: bool) {
        self.confirm.store(answer, Ordering::SeqCst);
    }
}

impl DialogService for StagedDialogs {
    fn pick_note_destination(&self, _default_path: &Path) -> Option<PathBuf> {
        self.destination
            .lock()
            .expect("staged destination lock")
            .take()
    }

    fn confirm_delete(&self, _title: &str) -> bool {
        self.confirm.load(Ordering::SeqCst)
    }

    fn show_error(&self, _title: &str, _message: &str) {}
}

#[tokio::test]
async fn full_note_lifecycle_against_an_empty_directory() {
    let root = tempfile::tempdir().expect("temp notes root");
    let dialogs = Arc::new(StagedDialogs::default());
    let gateway = Arc::new(NoteGateway::new(NoteStore::new(
        root.path().to_path_buf(),
        dialogs.clone(),
    )));

    // An empty directory materializes exactly the seed note.
    let state = NoteState::initialize(gateway.clone())
        .await
        .expect("state init");
    let notes = state.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Welcome");
    let seeded_at = notes[0].last_edit_time;

    // Open it, edit it through the flow, and flush on blur.
    let flow = EditorFlow::with_idle_window(state.clone(), Duration::from_millis(150));
    flow.select(0).await.expect("select welcome note");
    let opened = state.selected_note().expect("welcome note resolved");
    assert!(opened.content.contains("Welcome"));

    std::thread::sleep(Duration::from_millis(20));
    flow.on_edit("# Welcome\n\nedited on the way out\n".to_string());
    flow.flush().await.expect("flush on blur");

    let content = gateway
        .read_note("Welcome")
        .await
        .expect("read saved note");
    assert_eq!(content, "# Welcome\n\nedited on the way out\n");
    assert!(state.notes()[0].last_edit_time > seeded_at);

    // Create a new note; it lands at the front and becomes the selection.
    dialogs.stage_destination(root.path().join("Untitled.md"));
    let created = state.create_empty().await.expect("create note");
    assert_eq!(created.as_deref(), Some("Untitled"));

    let titles: Vec<String> = state.notes().into_iter().map(|note| note.title).collect();
    assert_eq!(titles, vec!["Untitled".to_string(), "Welcome".to_string()]);
    assert_eq!(state.selected_index(), Some(0));
    assert_eq!(
        state.selected_note().expect("new note resolved").content,
        ""
    );

    // Delete it with confirmation; the collection and selection reset.
    dialogs.stage_confirm(true);
    let deleted = state.delete_selected().await.expect("delete note");
    assert!(deleted);

    let titles: Vec<String> = state.notes().into_iter().map(|note| note.title).collect();
    assert_eq!(titles, vec!["Welcome".to_string()]);
    assert_eq!(state.selected_index(), None);
    assert_eq!(state.selection(), SelectionState::Idle);
    assert!(!root.path().join("Untitled.md").exists());
    assert!(root.path().join("Welcome.md").exists());
}

#[tokio::test]
async fn cancelled_and_declined_flows_leave_the_directory_untouched() {
    let root = tempfile::tempdir().expect("temp notes root");
    let dialogs = Arc::new(StagedDialogs::default());
    let store = NoteStore::new(root.path().to_path_buf(), dialogs.clone());

    // Cancelled save dialog.
    assert_eq!(
        store.create_note().expect("create"),
        CreateNoteOutcome::Cancelled
    );

    // Destination outside the root directory.
    let elsewhere = tempfile::tempdir().expect("foreign dir");
    dialogs.stage_destination(elsewhere.path().join("Escape.md"));
    assert_eq!(
        store.create_note().expect("create"),
        CreateNoteOutcome::Cancelled
    );
    assert!(!elsewhere.path().join("Escape.md").exists());

    // Declined delete confirmation.
    store.write_note("Held", "kept").expect("write");
    dialogs.stage_confirm(false);
    assert!(!store.delete_note("Held").expect("delete"));
    assert_eq!(store.read_note("Held").expect("read"), "kept");
}
