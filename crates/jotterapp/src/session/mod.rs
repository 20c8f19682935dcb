//! # Editor Sessions
//!
//! An [`EditorSession`] owns the editing state of one open document and keeps
//! the document store and the block store consistent with it.
//!
//! ## Lifecycle
//!
//! ```text
//!  open(New) ─────────────┐
//!  open(Existing, missing)┴─► NewUnsaved ──first save / ensure_persisted──► Persisted
//!  open(Existing, found) ──────────────────────────────────────────────────► Persisted
//!                                  │                                          │
//!                                  └──────────────── delete() ───────────────►┴─► Deleting
//! ```
//!
//! The document id is allocated when the session opens, before anything is
//! written, so blocks can be attached to a document that has no row yet. The
//! block store refuses such blocks, which is why every block insert first runs
//! [`EditorSession::ensure_persisted`]. It writes a placeholder row even for a
//! blank document.
//!
//! ## Saving
//!
//! Edits schedule a trailing-edge debounced save ([`SessionTimings::debounce`]).
//! A save:
//!
//! 1. Does nothing if both title and content are blank.
//! 2. Re-reads the blocks from the block store. The subscription cache may lag
//!    behind a block mutation that was scheduled concurrently.
//! 3. Builds the raw content from the logical content and those blocks.
//! 4. Inserts the document if it was never persisted, otherwise updates it.
//! 5. Records the save time.
//!
//! Block inserts and deletes change the raw content, so they schedule the same
//! save after [`SessionTimings::block_settle`] instead. That delay lets the block
//! subscription catch up; it is an ordering assumption, not a guarantee.
//!
//! ## Deleting
//!
//! [`EditorSession::delete`] raises a flag that every later save checks, so a
//! debounced save that fires afterwards cannot write `is_trashed = false` back
//! over the trash operation. An unsaved document with content is saved first,
//! so the trash operation has a row to act on. If either write fails the flag
//! is lowered again and the session goes back to its previous phase.

mod debounce;
mod styles;

pub use styles::ActiveStyles;

use crate::blocks::{BlockCoordinator, ItemRemoval};
use crate::config::SessionTimings;
use crate::error::{JotterError, Result};
use crate::formatting::{
    add_format, adjust_formats_for_text_change, apply_styles_to_insertion, char_len,
    has_format, inserted_span, remove_format,
};
use crate::markers::build_raw_content;
use crate::model::{BlockId, BlockRef, ChecklistItem, Document, FormatRange, FormatType, Metadata};
use crate::store::{lock, BlockStore, DocumentStore};
use crate::tags;
use chrono::{DateTime, Utc};
use debounce::Debouncer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which document a session should edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRequest {
    New,
    Existing(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The id exists only in memory.
    NewUnsaved,
    Persisted,
    Deleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Updated,
    /// Title and content were both blank.
    SkippedBlank,
    /// A delete is in progress.
    SkippedDeleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The document was moved to the trash.
    Trashed,
    /// The document was blank and never written, so there was nothing to trash.
    Discarded,
}

struct SessionState {
    metadata: Metadata,
    /// Logical content.
    content: String,
    persisted: bool,
    styles: ActiveStyles,
    last_saved_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn is_blank(&self) -> bool {
        self.metadata.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

struct SessionInner<D: DocumentStore, B: BlockStore> {
    documents: Arc<D>,
    blocks: BlockCoordinator<B>,
    state: Mutex<SessionState>,
    block_cache: Arc<Mutex<Vec<BlockRef>>>,
    /// Serializes writes of the document row.
    save_lock: tokio::sync::Mutex<()>,
    debouncer: Mutex<Debouncer>,
    deleting: AtomicBool,
    timings: SessionTimings,
}

impl<D: DocumentStore + 'static, B: BlockStore + 'static> SessionInner<D, B> {
    fn document_id(&self) -> Uuid {
        self.blocks.document_id()
    }

    fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::SeqCst)
    }

    /// The save routine behind both debounced and immediate saves.
    async fn save(&self) -> Result<SaveOutcome> {
        let _guard = self.save_lock.lock().await;
        if self.is_deleting() {
            debug!(document = %self.document_id(), "save skipped, delete in progress");
            return Ok(SaveOutcome::SkippedDeleting);
        }
        self.write_locked(false).await
    }

    /// Writes the document row. Callers hold `save_lock`.
    async fn write_locked(&self, allow_blank: bool) -> Result<SaveOutcome> {
        let (mut metadata, content, persisted) = {
            let state = lock(&self.state);
            if !allow_blank && state.is_blank() {
                debug!(document = %self.document_id(), "save skipped, document is blank");
                return Ok(SaveOutcome::SkippedBlank);
            }
            (state.metadata.clone(), state.content.clone(), state.persisted)
        };

        let blocks = self.blocks.snapshot().await?;
        let now = Utc::now();
        metadata.updated_at = now;
        let document = Document {
            metadata,
            content: build_raw_content(&content, &blocks),
        };

        let outcome = if persisted {
            self.documents.update(document).await?;
            SaveOutcome::Updated
        } else {
            self.documents.insert(document).await?;
            info!(document = %self.document_id(), "document persisted");
            SaveOutcome::Inserted
        };

        let mut state = lock(&self.state);
        state.persisted = true;
        state.metadata.updated_at = now;
        state.last_saved_at = Some(now);
        Ok(outcome)
    }

    fn schedule_save(self: &Arc<Self>, delay: Duration) {
        if self.is_deleting() {
            return;
        }
        let inner = Arc::clone(self);
        debug!(document = %self.document_id(), delay_ms = delay.as_millis() as u64, "save scheduled");
        lock(&self.debouncer).schedule(delay, async move {
            if let Err(e) = inner.save().await {
                warn!(document = %inner.document_id(), error = %e, "debounced save failed");
            }
        });
    }
}

/// The per-document editing state machine.
pub struct EditorSession<D: DocumentStore + 'static, B: BlockStore + 'static> {
    inner: Arc<SessionInner<D, B>>,
    subscription: Option<JoinHandle<()>>,
}

impl<S> EditorSession<S, S>
where
    S: DocumentStore + BlockStore + 'static,
{
    /// Opens a session over a store that holds both documents and blocks.
    pub async fn open_in(
        store: Arc<S>,
        request: DocumentRequest,
        timings: SessionTimings,
    ) -> Result<Self> {
        Self::open(Arc::clone(&store), store, request, timings).await
    }
}

impl<D: DocumentStore + 'static, B: BlockStore + 'static> EditorSession<D, B> {
    /// Resolves `request` and subscribes to the document's blocks.
    ///
    /// An `Existing` id that the store does not know starts a new document with
    /// a fresh id.
    pub async fn open(
        documents: Arc<D>,
        blocks: Arc<B>,
        request: DocumentRequest,
        timings: SessionTimings,
    ) -> Result<Self> {
        let existing = match request {
            DocumentRequest::New => None,
            DocumentRequest::Existing(id) => {
                let found = documents.get_by_id(id).await?;
                if found.is_none() {
                    info!(requested = %id, "document not found, starting a new one");
                }
                found
            }
        };

        let state = match existing {
            Some(document) => SessionState {
                content: document.logical_content().to_string(),
                metadata: document.metadata,
                persisted: true,
                styles: ActiveStyles::default(),
                last_saved_at: None,
            },
            None => SessionState {
                metadata: Metadata::new(Uuid::new_v4(), String::new()),
                content: String::new(),
                persisted: false,
                styles: ActiveStyles::default(),
                last_saved_at: None,
            },
        };
        let document_id = state.metadata.id;
        let persisted = state.persisted;

        let coordinator = BlockCoordinator::new(blocks, document_id);
        let mut stream = coordinator.subscribe().await?;
        let block_cache = Arc::new(Mutex::new(Vec::new()));
        let subscription = {
            let cache = Arc::clone(&block_cache);
            tokio::spawn(async move {
                while let Some(blocks) = stream.next().await {
                    *lock(&cache) = blocks;
                }
            })
        };

        let session = Self {
            inner: Arc::new(SessionInner {
                documents,
                blocks: coordinator,
                state: Mutex::new(state),
                block_cache,
                save_lock: tokio::sync::Mutex::new(()),
                debouncer: Mutex::new(Debouncer::default()),
                deleting: AtomicBool::new(false),
                timings,
            }),
            subscription: Some(subscription),
        };
        info!(document = %document_id, phase = ?session.phase(), existing = persisted, "session opened");
        Ok(session)
    }

    // --- Read access ---

    pub fn document_id(&self) -> Uuid {
        self.inner.document_id()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.inner.is_deleting() {
            SessionPhase::Deleting
        } else if self.state().persisted {
            SessionPhase::Persisted
        } else {
            SessionPhase::NewUnsaved
        }
    }

    pub fn title(&self) -> String {
        self.state().metadata.title.clone()
    }

    /// The logical content.
    pub fn content(&self) -> String {
        self.state().content.clone()
    }

    pub fn formats(&self) -> Vec<FormatRange> {
        self.state().metadata.formats.clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.state().metadata.tags.clone()
    }

    pub fn metadata(&self) -> Metadata {
        self.state().metadata.clone()
    }

    pub fn active_styles(&self) -> ActiveStyles {
        self.state().styles
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.state().last_saved_at
    }

    /// Blocks as last pushed by the block subscription.
    pub fn blocks(&self) -> Vec<BlockRef> {
        lock(&self.inner.block_cache).clone()
    }

    pub fn has_pending_save(&self) -> bool {
        lock(&self.inner.debouncer).is_pending()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        lock(&self.inner.state)
    }

    /// Applies `edit` to the state and schedules a debounced save.
    fn edit<T>(&self, edit: impl FnOnce(&mut SessionState) -> T) -> T {
        let result = {
            let mut state = self.state();
            edit(&mut *state)
        };
        self.inner.schedule_save(self.inner.timings.debounce);
        result
    }

    // --- Editing ---

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.edit(|state| state.metadata.title = title);
    }

    /// Replaces the logical content, re-indexing the format ranges and styling
    /// any inserted text with the active toggles.
    pub fn set_content(&self, content: impl Into<String>) {
        let content = content.into();
        self.edit(|state| {
            if state.content == content {
                return;
            }
            let mut formats =
                adjust_formats_for_text_change(&state.metadata.formats, &state.content, &content);
            if let Some((position, length)) = inserted_span(&state.content, &content) {
                formats =
                    apply_styles_to_insertion(&formats, position, length, &state.styles.styles());
            }
            state.metadata.formats = formats;
            state.content = content;
        });
    }

    pub fn add_tag(&self, tag: &str) -> Result<bool> {
        let added = tags::add_tag(&mut self.state().metadata.tags, tag)?;
        if added {
            self.inner.schedule_save(self.inner.timings.debounce);
        }
        Ok(added)
    }

    pub fn remove_tag(&self, tag: &str) -> bool {
        let removed = tags::remove_tag(&mut self.state().metadata.tags, tag);
        if removed {
            self.inner.schedule_save(self.inner.timings.debounce);
        }
        removed
    }

    /// Flips a typing toggle. Toggles are not persisted.
    pub fn toggle_style(&self, kind: FormatType) -> bool {
        self.state().styles.toggle(kind)
    }

    /// Toggles `kind` over the selection `[start, end)`: removes it if the
    /// selection is already fully covered, applies it otherwise.
    ///
    /// Returns whether the style is now on. Empty or out-of-bounds selections
    /// change nothing and return `false`.
    pub fn apply_format(&self, start: usize, end: usize, kind: FormatType) -> bool {
        {
            let state = self.state();
            if start >= end || end > char_len(&state.content) {
                return false;
            }
        }
        self.edit(|state| {
            let formats = &state.metadata.formats;
            if has_format(formats, start, end, kind) {
                state.metadata.formats = remove_format(formats, start, end, kind);
                false
            } else {
                state.metadata.formats = add_format(formats, start, end, kind);
                true
            }
        })
    }

    pub fn set_pinned(&self, pinned: bool) {
        self.edit(|state| {
            state.metadata.is_pinned = pinned;
            state.metadata.pinned_at = pinned.then(Utc::now);
        });
    }

    pub fn set_archived(&self, archived: bool) {
        self.edit(|state| {
            state.metadata.is_archived = archived;
            state.metadata.archived_at = archived.then(Utc::now);
        });
    }

    pub fn set_folder(&self, folder_id: Option<Uuid>) {
        self.edit(|state| state.metadata.folder_id = folder_id);
    }

    // --- Persistence ---

    /// Cancels the debounce timer and saves immediately.
    pub async fn save_now(&self) -> Result<SaveOutcome> {
        lock(&self.inner.debouncer).cancel();
        self.inner.save().await
    }

    /// Makes sure the document has a row, writing a placeholder (blank or not)
    /// if it was never saved. Returns whether a row was written.
    pub async fn ensure_persisted(&self) -> Result<bool> {
        let _guard = self.inner.save_lock.lock().await;
        if self.state().persisted || self.inner.is_deleting() {
            return Ok(false);
        }
        self.inner.write_locked(true).await?;
        Ok(true)
    }

    /// Soft-deletes the document after the grace period.
    ///
    /// If the forced save or the trash write fails, the session leaves the
    /// deleting phase again so later edits are saved and the delete can be
    /// retried.
    pub async fn delete(&self) -> Result<DeleteOutcome> {
        let id = self.document_id();
        if self.inner.deleting.swap(true, Ordering::SeqCst) {
            return Err(JotterError::Store(format!(
                "Delete already in progress for document {}",
                id
            )));
        }
        lock(&self.inner.debouncer).cancel();

        let result = self.trash(id).await;
        if let Err(e) = &result {
            self.inner.deleting.store(false, Ordering::SeqCst);
            warn!(document = %id, error = %e, "delete failed, document kept");
        }
        result
    }

    async fn trash(&self, id: Uuid) -> Result<DeleteOutcome> {
        {
            // Waits out a save that passed the flag check before it was raised.
            let _guard = self.inner.save_lock.lock().await;
            let (persisted, blank) = {
                let state = self.state();
                (state.persisted, state.is_blank())
            };
            if !persisted {
                if blank {
                    info!(document = %id, "blank unsaved document discarded");
                    return Ok(DeleteOutcome::Discarded);
                }
                self.inner.write_locked(false).await?;
            }
        }

        tokio::time::sleep(self.inner.timings.delete_grace).await;
        self.inner.documents.move_to_trash(id).await?;
        {
            let mut state = self.state();
            state.metadata.is_trashed = true;
            state.metadata.trashed_at = Some(Utc::now());
        }
        info!(document = %id, "document moved to trash");
        Ok(DeleteOutcome::Trashed)
    }

    /// Flushes a pending save (unless deleting) and ends the block subscription.
    pub async fn close(mut self) -> Result<()> {
        let pending = {
            let mut debouncer = lock(&self.inner.debouncer);
            let pending = debouncer.is_pending();
            debouncer.cancel();
            pending
        };
        let result = if pending && !self.inner.is_deleting() {
            self.inner.save().await.map(|_| ())
        } else {
            Ok(())
        };
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
        debug!(document = %self.document_id(), "session closed");
        result
    }

    // --- Blocks ---

    pub fn block_coordinator(&self) -> &BlockCoordinator<B> {
        &self.inner.blocks
    }

    /// Inserts a checklist, persisting the document first if needed.
    pub async fn add_checklist<T: AsRef<str>>(&self, items: &[T]) -> Result<BlockRef> {
        self.ensure_persisted().await?;
        let block = self.inner.blocks.add_checklist(items).await?;
        self.inner.schedule_save(self.inner.timings.block_settle);
        Ok(block)
    }

    pub async fn delete_block(&self, block_id: &BlockId) -> Result<()> {
        self.inner.blocks.delete_block(block_id).await?;
        self.inner.schedule_save(self.inner.timings.block_settle);
        Ok(())
    }

    pub async fn toggle_item(&self, block_id: &BlockId, item_id: &str) -> Result<bool> {
        self.inner.blocks.toggle_item(block_id, item_id).await
    }

    pub async fn add_item(&self, block_id: &BlockId, text: &str) -> Result<ChecklistItem> {
        self.inner.blocks.add_item(block_id, text).await
    }

    pub async fn edit_item(&self, block_id: &BlockId, item_id: &str, text: &str) -> Result<()> {
        self.inner.blocks.edit_item(block_id, item_id, text).await
    }

    pub async fn delete_item(&self, block_id: &BlockId, item_id: &str) -> Result<ItemRemoval> {
        let removal = self.inner.blocks.delete_item(block_id, item_id).await?;
        if removal == ItemRemoval::BlockDeleted {
            self.inner.schedule_save(self.inner.timings.block_settle);
        }
        Ok(removal)
    }
}

impl<D: DocumentStore + 'static, B: BlockStore + 'static> Drop for EditorSession<D, B> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
    }
}
