//! # Block Lifecycle
//!
//! [`BlockCoordinator`] manages the embedded blocks of one document on top of a
//! [`BlockStore`]. Every mutation is a read-modify-write against the latest
//! stored copy of the affected block: the block is re-read, changed in memory
//! and written back whole. No partial updates reach the store.
//!
//! ## Checklist Operations
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`BlockCoordinator::toggle_item`] | flips `checked` |
//! | [`BlockCoordinator::add_item`] | appends with `sort_order = max + 1` |
//! | [`BlockCoordinator::edit_item`] | replaces the text |
//! | [`BlockCoordinator::delete_item`] | removes the item, or the whole block if it was the last one |
//!
//! The coordinator does not persist the owning document. Callers that insert a
//! block for a document that may not have a row yet go through the session,
//! which runs its ensure-persisted guard first.

use crate::error::{JotterError, Result};
use crate::model::{BlockId, BlockRef, ChecklistItem};
use crate::store::{BlockStore, BlockStream};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// What [`BlockCoordinator::delete_item`] ended up removing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRemoval {
    ItemDeleted,
    /// The item was the last one, so the block went with it.
    BlockDeleted,
}

pub struct BlockCoordinator<B: BlockStore + ?Sized> {
    store: Arc<B>,
    document_id: Uuid,
}

impl<B: BlockStore + ?Sized> Clone for BlockCoordinator<B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            document_id: self.document_id,
        }
    }
}

impl<B: BlockStore + ?Sized> BlockCoordinator<B> {
    pub fn new(store: Arc<B>, document_id: Uuid) -> Self {
        Self { store, document_id }
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub async fn subscribe(&self) -> Result<BlockStream> {
        self.store.subscribe(self.document_id).await
    }

    /// A one-shot read of the document's blocks, in creation order.
    pub async fn snapshot(&self) -> Result<Vec<BlockRef>> {
        self.store.snapshot(self.document_id).await
    }

    /// Creates a checklist block with one item per text.
    pub async fn add_checklist<S: AsRef<str>>(&self, items: &[S]) -> Result<BlockRef> {
        let block = BlockRef::checklist(self.document_id, items.iter().map(|s| s.as_ref()));
        self.store.insert_block(block.clone()).await?;
        debug!(block = %block.id, document = %self.document_id, "checklist inserted");
        Ok(block)
    }

    /// Writes back a modified block. The block must belong to this document.
    pub async fn update(&self, block: BlockRef) -> Result<()> {
        if block.document_id != self.document_id {
            return Err(JotterError::Store(format!(
                "Block {} belongs to document {}, not {}",
                block.id, block.document_id, self.document_id
            )));
        }
        let block_id = block.id.clone();
        self.store.update_block(block).await?;
        debug!(block = %block_id, document = %self.document_id, "block updated");
        Ok(())
    }

    pub async fn delete_block(&self, block_id: &BlockId) -> Result<()> {
        self.store.delete_block(block_id).await?;
        debug!(block = %block_id, document = %self.document_id, "block deleted");
        Ok(())
    }

    pub async fn toggle_item(&self, block_id: &BlockId, item_id: &str) -> Result<bool> {
        let mut block = self.fetch(block_id).await?;
        let item = Self::item_mut(&mut block, item_id)?;
        item.checked = !item.checked;
        let checked = item.checked;
        self.update(block).await?;
        Ok(checked)
    }

    pub async fn add_item(&self, block_id: &BlockId, text: &str) -> Result<ChecklistItem> {
        let mut block = self.fetch(block_id).await?;
        let list = block
            .as_checklist_mut()
            .ok_or_else(|| JotterError::BlockNotFound(block_id.clone()))?;
        let item = ChecklistItem::new(text, list.next_sort_order());
        list.items.push(item.clone());
        self.update(block).await?;
        Ok(item)
    }

    pub async fn edit_item(&self, block_id: &BlockId, item_id: &str, text: &str) -> Result<()> {
        let mut block = self.fetch(block_id).await?;
        Self::item_mut(&mut block, item_id)?.text = text.to_string();
        self.update(block).await
    }

    pub async fn delete_item(&self, block_id: &BlockId, item_id: &str) -> Result<ItemRemoval> {
        let mut block = self.fetch(block_id).await?;
        let list = block
            .as_checklist_mut()
            .ok_or_else(|| JotterError::BlockNotFound(block_id.clone()))?;
        let position = list
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| JotterError::ChecklistItemNotFound {
                block: block_id.clone(),
                item: item_id.to_string(),
            })?;

        if list.items.len() == 1 {
            self.delete_block(block_id).await?;
            return Ok(ItemRemoval::BlockDeleted);
        }

        list.items.remove(position);
        self.update(block).await?;
        Ok(ItemRemoval::ItemDeleted)
    }

    async fn fetch(&self, block_id: &BlockId) -> Result<BlockRef> {
        self.snapshot()
            .await?
            .into_iter()
            .find(|block| &block.id == block_id)
            .ok_or_else(|| JotterError::BlockNotFound(block_id.clone()))
    }

    fn item_mut<'a>(block: &'a mut BlockRef, item_id: &str) -> Result<&'a mut ChecklistItem> {
        let block_id = block.id.clone();
        block
            .as_checklist_mut()
            .and_then(|list| list.item_mut(item_id))
            .ok_or_else(|| JotterError::ChecklistItemNotFound {
                block: block_id,
                item: item_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::store::memory::InMemoryStore;
    use crate::store::DocumentStore;

    async fn coordinator() -> BlockCoordinator<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        let document = Document::new(Uuid::new_v4(), "List".into(), String::new());
        let id = document.id();
        store.insert(document).await.unwrap();
        BlockCoordinator::new(store, id)
    }

    fn item_ids(block: &BlockRef) -> Vec<String> {
        block
            .as_checklist()
            .unwrap()
            .sorted_items()
            .into_iter()
            .map(|item| item.id.clone())
            .collect()
    }

    #[tokio::test]
    async fn add_checklist_is_visible_in_snapshot() {
        let blocks = coordinator().await;
        let block = blocks.add_checklist(&["milk", "eggs"]).await.unwrap();
        let snapshot = blocks.snapshot().await.unwrap();
        assert_eq!(snapshot, vec![block]);
    }

    #[tokio::test]
    async fn add_checklist_without_parent_fails() {
        let store = Arc::new(InMemoryStore::new());
        let blocks = BlockCoordinator::new(store, Uuid::new_v4());
        assert!(matches!(
            blocks.add_checklist(&["x"]).await,
            Err(JotterError::MissingParent { .. })
        ));
    }

    #[tokio::test]
    async fn toggle_flips_and_persists() {
        let blocks = coordinator().await;
        let block = blocks.add_checklist(&["milk"]).await.unwrap();
        let item = item_ids(&block).remove(0);

        assert!(blocks.toggle_item(&block.id, &item).await.unwrap());
        assert!(!blocks.toggle_item(&block.id, &item).await.unwrap());
        assert!(blocks.toggle_item(&block.id, &item).await.unwrap());

        let stored = blocks.snapshot().await.unwrap().remove(0);
        assert!(stored.as_checklist().unwrap().items[0].checked);
    }

    #[tokio::test]
    async fn add_item_uses_next_sort_order() {
        let blocks = coordinator().await;
        let block = blocks.add_checklist(&["a", "b"]).await.unwrap();
        let item = blocks.add_item(&block.id, "c").await.unwrap();
        assert_eq!(item.sort_order, 2);

        let stored = blocks.snapshot().await.unwrap().remove(0);
        let texts: Vec<&str> = stored
            .as_checklist()
            .unwrap()
            .sorted_items()
            .into_iter()
            .map(|i| i.text.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn add_item_after_deleting_a_middle_item_still_appends() {
        let blocks = coordinator().await;
        let block = blocks.add_checklist(&["a", "b", "c"]).await.unwrap();
        let ids = item_ids(&block);
        blocks.delete_item(&block.id, &ids[1]).await.unwrap();
        let item = blocks.add_item(&block.id, "d").await.unwrap();
        assert_eq!(item.sort_order, 3);
    }

    #[tokio::test]
    async fn edit_item_replaces_text() {
        let blocks = coordinator().await;
        let block = blocks.add_checklist(&["mlik"]).await.unwrap();
        let item = item_ids(&block).remove(0);
        blocks.edit_item(&block.id, &item, "milk").await.unwrap();
        let stored = blocks.snapshot().await.unwrap().remove(0);
        assert_eq!(stored.as_checklist().unwrap().items[0].text, "milk");
    }

    #[tokio::test]
    async fn delete_item_keeps_block_while_items_remain() {
        let blocks = coordinator().await;
        let block = blocks.add_checklist(&["a", "b"]).await.unwrap();
        let ids = item_ids(&block);

        assert_eq!(
            blocks.delete_item(&block.id, &ids[0]).await.unwrap(),
            ItemRemoval::ItemDeleted
        );
        let stored = blocks.snapshot().await.unwrap().remove(0);
        assert_eq!(item_ids(&stored), vec![ids[1].clone()]);
    }

    #[tokio::test]
    async fn deleting_the_last_item_deletes_the_block() {
        let blocks = coordinator().await;
        let block = blocks.add_checklist(&["only"]).await.unwrap();
        let item = item_ids(&block).remove(0);

        assert_eq!(
            blocks.delete_item(&block.id, &item).await.unwrap(),
            ItemRemoval::BlockDeleted
        );
        assert!(blocks.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_writes_back_a_modified_block() {
        let coordinator = coordinator().await;
        let mut block = coordinator.add_checklist(&["draft"]).await.unwrap();
        block.as_checklist_mut().unwrap().items[0].text = "final".into();
        coordinator.update(block.clone()).await.unwrap();
        assert_eq!(coordinator.snapshot().await.unwrap(), vec![block]);
    }

    #[tokio::test]
    async fn update_rejects_a_block_of_another_document() {
        let coordinator = coordinator().await;
        let block = coordinator.add_checklist(&["mine"]).await.unwrap();
        let mut foreign = block.clone();
        foreign.document_id = Uuid::new_v4();
        let err = coordinator.update(foreign).await.unwrap_err();
        assert!(matches!(err, JotterError::Store(_)));
        assert_eq!(coordinator.snapshot().await.unwrap(), vec![block]);
    }

    #[tokio::test]
    async fn unknown_ids_are_reported() {
        let blocks = coordinator().await;
        let block = blocks.add_checklist(&["a"]).await.unwrap();

        assert!(matches!(
            blocks.toggle_item(&BlockId::from("ffff"), "x").await,
            Err(JotterError::BlockNotFound(_))
        ));
        match blocks.edit_item(&block.id, "nope", "x").await {
            Err(JotterError::ChecklistItemNotFound { block: b, item }) => {
                assert_eq!(b, block.id);
                assert_eq!(item, "nope");
            }
            other => panic!("Expected ChecklistItemNotFound, got {:?}", other),
        }
        assert!(matches!(
            blocks.delete_item(&block.id, "nope").await,
            Err(JotterError::ChecklistItemNotFound { .. })
        ));
    }
}
