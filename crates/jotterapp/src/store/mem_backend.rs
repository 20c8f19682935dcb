use super::backend::StorageBackend;
use super::lock;
use crate::error::{JotterError, Result};
use crate::model::{BlockRef, Metadata};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory storage backend for testing.
///
/// Sessions save from background tasks, so state sits behind `Mutex`es rather
/// than `RefCell`s.
#[derive(Default)]
pub struct MemBackend {
    index: Mutex<HashMap<Uuid, Metadata>>,
    content: Mutex<HashMap<Uuid, String>>,
    blocks: Mutex<Vec<BlockRef>>,
    simulate_write_error: AtomicBool,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(JotterError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn load_index(&self) -> Result<HashMap<Uuid, Metadata>> {
        Ok(lock(&self.index).clone())
    }

    fn save_index(&self, index: &HashMap<Uuid, Metadata>) -> Result<()> {
        self.check_writable()?;
        *lock(&self.index) = index.clone();
        Ok(())
    }

    fn read_content(&self, id: &Uuid) -> Result<Option<String>> {
        Ok(lock(&self.content).get(id).cloned())
    }

    fn write_content(&self, id: &Uuid, content: &str) -> Result<()> {
        self.check_writable()?;
        lock(&self.content).insert(*id, content.to_string());
        Ok(())
    }

    fn delete_content(&self, id: &Uuid) -> Result<()> {
        lock(&self.content).remove(id);
        Ok(())
    }

    fn load_blocks(&self) -> Result<Vec<BlockRef>> {
        Ok(lock(&self.blocks).clone())
    }

    fn save_blocks(&self, blocks: &[BlockRef]) -> Result<()> {
        self.check_writable()?;
        *lock(&self.blocks) = blocks.to_vec();
        Ok(())
    }

    fn content_path(&self, id: &Uuid) -> PathBuf {
        PathBuf::from(format!("memory://note-{}", id))
    }
}
