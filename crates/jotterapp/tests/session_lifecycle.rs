//! End-to-end session behavior against the in-memory store, on virtual time.

use jotterapp::config::SessionTimings;
use jotterapp::markers::{self, Node};
use jotterapp::model::FormatType;
use jotterapp::session::{
    DeleteOutcome, DocumentRequest, EditorSession, SaveOutcome, SessionPhase,
};
use jotterapp::store::memory::InMemoryStore;
use jotterapp::store::{BlockStore, DocumentFilter, DocumentStore};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

type Session = EditorSession<InMemoryStore, InMemoryStore>;

fn timings() -> SessionTimings {
    SessionTimings {
        debounce: Duration::from_millis(500),
        block_settle: Duration::from_millis(150),
        delete_grace: Duration::from_millis(300),
    }
}

async fn open(store: &Arc<InMemoryStore>, request: DocumentRequest) -> Session {
    EditorSession::open_in(Arc::clone(store), request, timings())
        .await
        .unwrap()
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn blank_document_is_never_stored() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;

    session.set_title("   ");
    session.set_content("\n\t");
    advance(1_000).await;

    assert_eq!(session.save_now().await.unwrap(), SaveOutcome::SkippedBlank);
    assert_eq!(session.phase(), SessionPhase::NewUnsaved);
    assert!(store.list(DocumentFilter::All).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn one_character_produces_exactly_one_record() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;

    session.set_content("x");
    advance(600).await;

    let all = store.list(DocumentFilter::All).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id(), session.document_id());
    assert_eq!(all[0].content, "x");
    assert_eq!(session.phase(), SessionPhase::Persisted);
    assert!(session.last_saved_at().is_some());
}

#[tokio::test(start_paused = true)]
async fn typing_burst_is_coalesced_into_one_save() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    for text in ["H", "He", "Hel", "Hell", "Hello"] {
        session.set_content(text);
        advance(200).await;
        assert_eq!(store.get_by_id(id).await.unwrap(), None);
    }

    advance(400).await;
    let stored = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.content, "Hello");
    assert!(!session.has_pending_save());
}

#[tokio::test(start_paused = true)]
async fn reopening_restores_logical_content_and_formats() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    session.set_title("Groceries");
    session.set_content("Shopping");
    session.apply_format(0, 4, FormatType::Bold);
    session.add_tag("home").unwrap();
    session.add_checklist(&["milk", "eggs"]).await.unwrap();
    session.close().await.unwrap();

    let stored = store.get_by_id(id).await.unwrap().unwrap();
    assert!(stored.content.starts_with("Shopping\n⟦block:TODO:"));

    let reopened = open(&store, DocumentRequest::Existing(id)).await;
    assert_eq!(reopened.phase(), SessionPhase::Persisted);
    assert_eq!(reopened.document_id(), id);
    assert_eq!(reopened.title(), "Groceries");
    assert_eq!(reopened.content(), "Shopping");
    assert_eq!(reopened.formats(), stored.metadata.formats);
    assert_eq!(reopened.tags(), vec!["home"]);
}

#[tokio::test(start_paused = true)]
async fn missing_id_falls_back_to_a_new_document() {
    let store = Arc::new(InMemoryStore::new());
    let missing = Uuid::new_v4();
    let session = open(&store, DocumentRequest::Existing(missing)).await;

    assert_eq!(session.phase(), SessionPhase::NewUnsaved);
    assert_ne!(session.document_id(), missing);
    assert!(session.title().is_empty());
}

#[tokio::test(start_paused = true)]
async fn first_block_persists_a_blank_placeholder() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    let block = session.add_checklist(&["milk"]).await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Persisted);

    let placeholder = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(placeholder.metadata.title, "");
    assert_eq!(store.snapshot(id).await.unwrap(), vec![block]);
}

#[tokio::test(start_paused = true)]
async fn block_insert_is_followed_by_a_settled_save() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    session.set_content("Todo");
    let block = session.add_checklist(&["a"]).await.unwrap();
    let marker = markers::create_marker(block.block_type(), &block.id);

    // Placeholder was written before the block existed.
    let early = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(early.content, "Todo");

    advance(200).await;
    let settled = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(settled.content, format!("Todo\n{}", marker));
    assert_eq!(session.blocks(), vec![block]);
}

#[tokio::test(start_paused = true)]
async fn deleting_the_last_item_removes_the_marker() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    session.set_content("List");
    let block = session.add_checklist(&["only"]).await.unwrap();
    advance(200).await;

    let item = block.as_checklist().unwrap().items[0].id.clone();
    session.delete_item(&block.id, &item).await.unwrap();
    advance(200).await;

    let stored = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.content, "List");
    assert!(session.blocks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stored_raw_content_parses_back_to_nodes() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    session.set_content("Shopping");
    session.add_checklist(&["milk"]).await.unwrap();
    session.add_checklist(&["bread"]).await.unwrap();
    session.save_now().await.unwrap();

    let stored = store.get_by_id(id).await.unwrap().unwrap();
    let nodes = markers::parse(&stored.content);
    assert_eq!(markers::text_of(&nodes), "Shopping");
    let ids: Vec<_> = nodes
        .iter()
        .filter_map(|n| match n {
            Node::Block { block_id, .. } => Some(block_id.clone()),
            Node::Text { .. } => None,
        })
        .collect();
    let in_creation_order: Vec<_> = store
        .snapshot(id)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids, in_creation_order);
}

#[tokio::test(start_paused = true)]
async fn delete_of_unsaved_content_saves_then_trashes() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    session.set_title("Short lived");
    assert_eq!(session.delete().await.unwrap(), DeleteOutcome::Trashed);
    assert_eq!(session.phase(), SessionPhase::Deleting);

    let stored = store.get_by_id(id).await.unwrap().unwrap();
    assert!(stored.metadata.is_trashed);
    assert_eq!(stored.metadata.title, "Short lived");
}

#[tokio::test(start_paused = true)]
async fn delete_of_blank_unsaved_document_is_a_discard() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;

    assert_eq!(session.delete().await.unwrap(), DeleteOutcome::Discarded);
    assert!(store.list(DocumentFilter::All).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stale_debounced_save_cannot_untrash() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    session.set_title("Keep me trashed");
    session.save_now().await.unwrap();

    session.set_content("one more edit");
    assert!(session.has_pending_save());
    session.delete().await.unwrap();

    // Edits after the delete request are not scheduled either.
    session.set_content("and another");
    assert!(!session.has_pending_save());
    advance(2_000).await;

    let stored = store.get_by_id(id).await.unwrap().unwrap();
    assert!(stored.metadata.is_trashed);
    assert_eq!(session.save_now().await.unwrap(), SaveOutcome::SkippedDeleting);
    assert!(store.get_by_id(id).await.unwrap().unwrap().metadata.is_trashed);
}

#[tokio::test(start_paused = true)]
async fn trash_waits_for_the_grace_period() {
    let store = Arc::new(InMemoryStore::new());
    let session = Arc::new(open(&store, DocumentRequest::New).await);
    let id = session.document_id();
    session.set_title("Pending");
    session.save_now().await.unwrap();

    let deleting = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.delete().await })
    };

    advance(100).await;
    assert!(!store.get_by_id(id).await.unwrap().unwrap().metadata.is_trashed);

    assert_eq!(deleting.await.unwrap().unwrap(), DeleteOutcome::Trashed);
    assert!(store.get_by_id(id).await.unwrap().unwrap().metadata.is_trashed);
}

#[tokio::test(start_paused = true)]
async fn background_save_failure_is_not_fatal() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();

    store.set_simulate_write_error(true);
    session.set_title("Retry me");
    advance(600).await;
    assert_eq!(session.phase(), SessionPhase::NewUnsaved);

    store.set_simulate_write_error(false);
    session.set_content("later");
    advance(600).await;
    assert_eq!(store.get_by_id(id).await.unwrap().unwrap().metadata.title, "Retry me");
}

#[tokio::test(start_paused = true)]
async fn failed_delete_leaves_the_session_editable() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();
    session.set_title("Keep");
    assert_eq!(session.save_now().await.unwrap(), SaveOutcome::Inserted);

    store.set_simulate_write_error(true);
    assert!(session.delete().await.is_err());
    store.set_simulate_write_error(false);
    assert_eq!(session.phase(), SessionPhase::Persisted);

    session.set_title("Keep, edited");
    assert_eq!(session.save_now().await.unwrap(), SaveOutcome::Updated);
    let stored = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.metadata.title, "Keep, edited");
    assert!(!stored.metadata.is_trashed);

    assert_eq!(session.delete().await.unwrap(), DeleteOutcome::Trashed);
    assert!(store.get_by_id(id).await.unwrap().unwrap().metadata.is_trashed);
}

#[tokio::test(start_paused = true)]
async fn failed_forced_save_during_delete_can_be_retried() {
    let store = Arc::new(InMemoryStore::new());
    let session = open(&store, DocumentRequest::New).await;
    let id = session.document_id();
    session.set_content("unsaved text");

    store.set_simulate_write_error(true);
    assert!(session.delete().await.is_err());
    assert_eq!(session.phase(), SessionPhase::NewUnsaved);
    store.set_simulate_write_error(false);

    assert_eq!(session.delete().await.unwrap(), DeleteOutcome::Trashed);
    let stored = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.content, "unsaved text");
    assert!(stored.metadata.is_trashed);
}
