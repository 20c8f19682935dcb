use super::backend::StorageBackend;
use super::{lock, BlockStore, BlockStream, DocumentFilter, DocumentStore};
use crate::error::{JotterError, Result};
use crate::model::{sort_blocks, BlockId, BlockRef, Document, Metadata};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

/// Implements both [`DocumentStore`] and [`BlockStore`] over a raw backend.
///
/// Every read-modify-write of the index or the block list happens under one
/// write lock, so single-record writes are atomic with respect to each other.
pub struct NoteStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    write_lock: Mutex<()>,
    channels: Mutex<HashMap<Uuid, watch::Sender<Vec<BlockRef>>>>,
}

impl<B: StorageBackend> NoteStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
            channels: Mutex::new(HashMap::new()),
        }
    }

    pub fn content_path(&self, id: &Uuid) -> PathBuf {
        self.backend.content_path(id)
    }

    #[cfg(test)]
    pub(crate) fn channel_count(&self) -> usize {
        lock(&self.channels).len()
    }

    fn blocks_for(all: &[BlockRef], document_id: Uuid) -> Vec<BlockRef> {
        let mut blocks: Vec<BlockRef> = all
            .iter()
            .filter(|b| b.document_id == document_id)
            .cloned()
            .collect();
        sort_blocks(&mut blocks);
        blocks
    }

    /// Pushes the document's current blocks to its subscribers, dropping the
    /// channel once nobody listens.
    fn publish(&self, document_id: Uuid, all: &[BlockRef]) {
        let mut channels = lock(&self.channels);
        if let Some(sender) = channels.get(&document_id) {
            if sender.receiver_count() == 0 {
                channels.remove(&document_id);
                return;
            }
            sender.send_replace(Self::blocks_for(all, document_id));
        }
    }

    fn assemble(&self, metadata: Metadata) -> Result<Document> {
        // Missing content reads as empty rather than failing the whole row.
        let content = self.backend.read_content(&metadata.id)?.unwrap_or_default();
        Ok(Document { metadata, content })
    }

    fn write_document(&self, document: &Document, must_exist: bool) -> Result<()> {
        let _guard = lock(&self.write_lock);
        let id = document.id();
        let mut index = self.backend.load_index()?;
        match (index.contains_key(&id), must_exist) {
            (true, false) => return Err(JotterError::DocumentExists(id)),
            (false, true) => return Err(JotterError::DocumentNotFound(id)),
            _ => {}
        }

        // Content first: a crash before the index write leaves an orphan file,
        // never an index entry without content.
        self.backend.write_content(&id, &document.content)?;
        index.insert(id, document.metadata.clone());
        self.backend.save_index(&index)
    }

    fn set_trashed(&self, id: Uuid, trashed: bool) -> Result<()> {
        let _guard = lock(&self.write_lock);
        let mut index = self.backend.load_index()?;
        let meta = index
            .get_mut(&id)
            .ok_or(JotterError::DocumentNotFound(id))?;
        meta.is_trashed = trashed;
        meta.trashed_at = if trashed { Some(Utc::now()) } else { None };
        self.backend.save_index(&index)
    }

    /// Removes documents, their content and their blocks. Caller holds the write lock.
    fn purge_locked(&self, ids: &[Uuid]) -> Result<()> {
        let mut index = self.backend.load_index()?;
        for id in ids {
            if index.remove(id).is_none() {
                return Err(JotterError::DocumentNotFound(*id));
            }
        }
        self.backend.save_index(&index)?;

        for id in ids {
            self.backend.delete_content(id)?;
        }

        let mut blocks = self.backend.load_blocks()?;
        let before = blocks.len();
        blocks.retain(|b| !ids.contains(&b.document_id));
        if blocks.len() != before {
            self.backend.save_blocks(&blocks)?;
        }
        for id in ids {
            self.publish(*id, &blocks);
        }
        Ok(())
    }
}

#[async_trait]
impl<B: StorageBackend> DocumentStore for NoteStore<B> {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        let index = self.backend.load_index()?;
        match index.get(&id) {
            Some(meta) => self.assemble(meta.clone()).map(Some),
            None => Ok(None),
        }
    }

    async fn insert(&self, document: Document) -> Result<()> {
        self.write_document(&document, false)
    }

    async fn update(&self, document: Document) -> Result<()> {
        self.write_document(&document, true)
    }

    async fn move_to_trash(&self, id: Uuid) -> Result<()> {
        self.set_trashed(id, true)
    }

    async fn restore_from_trash(&self, id: Uuid) -> Result<()> {
        self.set_trashed(id, false)
    }

    async fn delete_permanently(&self, id: Uuid) -> Result<()> {
        let _guard = lock(&self.write_lock);
        self.purge_locked(&[id])
    }

    async fn list(&self, filter: DocumentFilter) -> Result<Vec<Document>> {
        let index = self.backend.load_index()?;
        let mut documents = Vec::new();
        for meta in index.into_values() {
            let document = self.assemble(meta)?;
            if filter.matches(&document) {
                documents.push(document);
            }
        }
        documents.sort_by(|a, b| {
            b.metadata
                .is_pinned
                .cmp(&a.metadata.is_pinned)
                .then_with(|| b.metadata.updated_at.cmp(&a.metadata.updated_at))
        });
        Ok(documents)
    }

    async fn empty_trash(&self) -> Result<usize> {
        let _guard = lock(&self.write_lock);
        let trashed: Vec<Uuid> = self
            .backend
            .load_index()?
            .values()
            .filter(|meta| meta.is_trashed)
            .map(|meta| meta.id)
            .collect();
        if !trashed.is_empty() {
            self.purge_locked(&trashed)?;
        }
        Ok(trashed.len())
    }
}

#[async_trait]
impl<B: StorageBackend> BlockStore for NoteStore<B> {
    async fn subscribe(&self, document_id: Uuid) -> Result<BlockStream> {
        let current = Self::blocks_for(&self.backend.load_blocks()?, document_id);
        let mut channels = lock(&self.channels);
        // Sessions that closed without a later write leave senders behind.
        channels.retain(|_, sender| sender.receiver_count() > 0);
        let receiver = match channels.get(&document_id) {
            Some(sender) => {
                sender.send_replace(current);
                sender.subscribe()
            }
            None => {
                let (sender, receiver) = watch::channel(current);
                channels.insert(document_id, sender);
                receiver
            }
        };
        Ok(WatchStream::new(receiver))
    }

    async fn insert_block(&self, block: BlockRef) -> Result<()> {
        let _guard = lock(&self.write_lock);
        if !self.backend.load_index()?.contains_key(&block.document_id) {
            return Err(JotterError::MissingParent {
                block: block.id.clone(),
                document: block.document_id,
            });
        }

        let mut blocks = self.backend.load_blocks()?;
        if blocks.iter().any(|b| b.id == block.id) {
            return Err(JotterError::Store(format!(
                "Block already exists: {}",
                block.id
            )));
        }
        let document_id = block.document_id;
        blocks.push(block);
        self.backend.save_blocks(&blocks)?;
        self.publish(document_id, &blocks);
        Ok(())
    }

    async fn update_block(&self, block: BlockRef) -> Result<()> {
        let _guard = lock(&self.write_lock);
        let mut blocks = self.backend.load_blocks()?;
        let slot = blocks
            .iter_mut()
            .find(|b| b.id == block.id)
            .ok_or_else(|| JotterError::BlockNotFound(block.id.clone()))?;
        let document_id = block.document_id;
        *slot = block;
        self.backend.save_blocks(&blocks)?;
        self.publish(document_id, &blocks);
        Ok(())
    }

    async fn delete_block(&self, block_id: &BlockId) -> Result<()> {
        let _guard = lock(&self.write_lock);
        let mut blocks = self.backend.load_blocks()?;
        let position = blocks
            .iter()
            .position(|b| &b.id == block_id)
            .ok_or_else(|| JotterError::BlockNotFound(block_id.clone()))?;
        let removed = blocks.remove(position);
        self.backend.save_blocks(&blocks)?;
        self.publish(removed.document_id, &blocks);
        Ok(())
    }

    async fn snapshot(&self, document_id: Uuid) -> Result<Vec<BlockRef>> {
        Ok(Self::blocks_for(&self.backend.load_blocks()?, document_id))
    }
}
