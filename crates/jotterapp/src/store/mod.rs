//! # Storage Layer
//!
//! Two stores back an editing session and must stay consistent with each other:
//!
//! 1. **Document store** ([`DocumentStore`]): one row per document holding the
//!    metadata (title, format ranges, tags, flags) and the raw content.
//! 2. **Block store** ([`BlockStore`]): the embedded blocks (checklists) owned by
//!    documents, with a push-based subscription per document.
//!
//! Both are async traits so a session never blocks its editing surface on I/O.
//!
//! ## Referential Constraint
//!
//! The block store refuses a block whose `document_id` has no document row
//! ([`crate::error::JotterError::MissingParent`]). Sessions therefore persist a
//! placeholder document before inserting the first block of a new document.
//!
//! ## Deletion Lifecycle
//!
//! - **Soft Delete**: [`DocumentStore::move_to_trash`] sets `is_trashed`. Content
//!   and blocks remain, and [`DocumentStore::restore_from_trash`] undoes it.
//! - **Purge**: [`DocumentStore::delete_permanently`] and
//!   [`DocumentStore::empty_trash`] remove the row, its content and its blocks.
//!
//! ## Implementations
//!
//! [`note_store::NoteStore`] implements both traits over a raw
//! [`backend::StorageBackend`]:
//! - [`fs::FileStore`]: JSON index + content files on disk.
//! - [`memory::InMemoryStore`]: For testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── data.json            # Document metadata index
//! ├── blocks.json          # All blocks
//! └── note-{uuid}.txt      # Raw content, one file per document
//! ```

use crate::error::Result;
use crate::model::{BlockId, BlockRef, Document};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod note_store;

/// Which documents a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFilter {
    /// Neither archived nor trashed.
    #[default]
    Active,
    /// Archived but not trashed.
    Archived,
    Trashed,
    All,
}

impl DocumentFilter {
    pub fn matches(self, document: &Document) -> bool {
        let meta = &document.metadata;
        match self {
            DocumentFilter::Active => !meta.is_archived && !meta.is_trashed,
            DocumentFilter::Archived => meta.is_archived && !meta.is_trashed,
            DocumentFilter::Trashed => meta.is_trashed,
            DocumentFilter::All => true,
        }
    }
}

/// Stream of block snapshots for one document. Yields the current list first.
pub type BlockStream = WatchStream<Vec<BlockRef>>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Document>>;

    /// Fails with `DocumentExists` if the id already has a row.
    async fn insert(&self, document: Document) -> Result<()>;

    /// Fails with `DocumentNotFound` if the id has no row.
    async fn update(&self, document: Document) -> Result<()>;

    async fn move_to_trash(&self, id: Uuid) -> Result<()>;

    async fn restore_from_trash(&self, id: Uuid) -> Result<()>;

    /// Irreversibly removes the document, its content and its blocks.
    async fn delete_permanently(&self, id: Uuid) -> Result<()>;

    /// Pinned first, then most recently updated.
    async fn list(&self, filter: DocumentFilter) -> Result<Vec<Document>>;

    /// Purges every trashed document. Returns how many were removed.
    async fn empty_trash(&self) -> Result<usize>;
}

#[async_trait]
pub trait BlockStore: Send + Sync {
    async fn subscribe(&self, document_id: Uuid) -> Result<BlockStream>;

    /// Fails with `MissingParent` if the owning document has no row.
    async fn insert_block(&self, block: BlockRef) -> Result<()>;

    async fn update_block(&self, block: BlockRef) -> Result<()>;

    async fn delete_block(&self, block_id: &BlockId) -> Result<()>;

    /// The document's blocks in creation order.
    async fn snapshot(&self, document_id: Uuid) -> Result<Vec<BlockRef>>;
}

/// Locks `mutex`, recovering the data if a panicking thread poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
