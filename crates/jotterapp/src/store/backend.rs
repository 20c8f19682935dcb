use crate::error::Result;
use crate::model::{BlockRef, Metadata};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while NoteStore handles the "what" (referential rules, subscriptions).
pub trait StorageBackend: Send + Sync {
    // --- Index Operations ---

    /// Load the document metadata index (data.json)
    fn load_index(&self) -> Result<HashMap<Uuid, Metadata>>;

    /// Save the document metadata index
    fn save_index(&self, index: &HashMap<Uuid, Metadata>) -> Result<()>;

    // --- Content Operations ---

    /// Read the raw content of a document.
    /// Returns Ok(None) if nothing was written for this id.
    fn read_content(&self, id: &Uuid) -> Result<Option<String>>;

    /// Write raw content. MUST be atomic to avoid partial writes.
    fn write_content(&self, id: &Uuid, content: &str) -> Result<()>;

    fn delete_content(&self, id: &Uuid) -> Result<()>;

    // --- Block Operations ---

    /// Load every block of every document (blocks.json)
    fn load_blocks(&self) -> Result<Vec<BlockRef>>;

    fn save_blocks(&self, blocks: &[BlockRef]) -> Result<()>;

    // --- Paths ---

    /// Where the content of a document lives. Virtual for in-memory backends.
    fn content_path(&self, id: &Uuid) -> PathBuf;
}
