use super::mem_backend::MemBackend;
use super::note_store::NoteStore;

pub type InMemoryStore = NoteStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        NoteStore::with_backend(MemBackend::new())
    }

    /// Makes every subsequent backend write fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.backend.set_simulate_write_error(simulate);
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{BlockRef, Document};
    use crate::store::{BlockStore, DocumentStore};
    use chrono::Utc;
    use std::sync::Arc;
    use uuid::Uuid;

    pub struct StoreFixture {
        pub store: Arc<InMemoryStore>,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: Arc::new(InMemoryStore::new()),
            }
        }

        pub async fn with_documents(self, count: usize) -> Self {
            for i in 0..count {
                let document = Document::new(
                    Uuid::new_v4(),
                    format!("Test Note {}", i + 1),
                    format!("Content for note {}", i + 1),
                );
                self.insert(document).await;
            }
            self
        }

        pub async fn with_document(self, title: &str, content: &str) -> Self {
            self.insert(Document::new(
                Uuid::new_v4(),
                title.to_string(),
                content.to_string(),
            ))
            .await;
            self
        }

        pub async fn with_pinned_document(self, title: &str) -> Self {
            let mut document =
                Document::new(Uuid::new_v4(), title.to_string(), "Pinned".to_string());
            document.metadata.is_pinned = true;
            document.metadata.pinned_at = Some(Utc::now());
            self.insert(document).await;
            self
        }

        pub async fn with_archived_document(self, title: &str) -> Self {
            let mut document =
                Document::new(Uuid::new_v4(), title.to_string(), "Archived".to_string());
            document.metadata.is_archived = true;
            document.metadata.archived_at = Some(Utc::now());
            self.insert(document).await;
            self
        }

        pub async fn with_trashed_document(self, title: &str) -> Self {
            let document =
                Document::new(Uuid::new_v4(), title.to_string(), "Trashed".to_string());
            let id = document.id();
            self.insert(document).await;
            self.store.move_to_trash(id).await.unwrap();
            self
        }

        /// Inserts a document holding one checklist block.
        pub async fn with_checklist_document(
            self,
            title: &str,
            items: &[&str],
        ) -> (Self, Uuid, BlockRef) {
            let document = Document::new(Uuid::new_v4(), title.to_string(), title.to_string());
            let id = document.id();
            self.insert(document).await;
            let block = BlockRef::checklist(id, items.iter().copied());
            self.store.insert_block(block.clone()).await.unwrap();
            (self, id, block)
        }

        async fn insert(&self, document: Document) {
            self.store.insert(document).await.unwrap();
        }
    }
}
