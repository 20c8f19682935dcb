//! Sessions over the on-disk store.

use jotterapp::config::SessionTimings;
use jotterapp::session::{DocumentRequest, EditorSession};
use jotterapp::store::fs::FileStore;
use jotterapp::store::{BlockStore, DocumentFilter, DocumentStore};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test(start_paused = true)]
async fn session_writes_expected_files() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()));

    let session = EditorSession::open_in(
        Arc::clone(&store),
        DocumentRequest::New,
        SessionTimings::default(),
    )
    .await
    .unwrap();
    let id = session.document_id();
    session.set_title("On disk");
    session.set_content("Body text");
    session.add_checklist(&["one"]).await.unwrap();
    session.close().await.unwrap();

    let raw = fs::read_to_string(dir.path().join(format!("note-{}.txt", id))).unwrap();
    assert!(raw.starts_with("Body text\n⟦block:TODO:"));

    let index = fs::read_to_string(dir.path().join("data.json")).unwrap();
    assert!(index.contains("\"On disk\""));
    assert!(dir.path().join("blocks.json").exists());
}

#[tokio::test(start_paused = true)]
async fn second_process_sees_first_process_writes() {
    let dir = tempdir().unwrap();
    let id = {
        let store = Arc::new(FileStore::open(dir.path()));
        let session = EditorSession::open_in(store, DocumentRequest::New, SessionTimings::default())
            .await
            .unwrap();
        session.set_content("persisted");
        session.save_now().await.unwrap();
        let id = session.document_id();
        session.close().await.unwrap();
        id
    };

    let store = Arc::new(FileStore::open(dir.path()));
    let session = EditorSession::open_in(
        Arc::clone(&store),
        DocumentRequest::Existing(id),
        SessionTimings::default(),
    )
    .await
    .unwrap();
    assert_eq!(session.content(), "persisted");

    session.delete().await.unwrap();
    assert_eq!(store.list(DocumentFilter::Trashed).await.unwrap().len(), 1);
    assert_eq!(store.empty_trash().await.unwrap(), 1);
    assert!(store.snapshot(id).await.unwrap().is_empty());
    assert!(!dir.path().join(format!("note-{}.txt", id)).exists());
}
