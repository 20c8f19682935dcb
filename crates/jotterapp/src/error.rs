use crate::model::BlockId;
use crate::tags::TagError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JotterError {
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    #[error("Document already exists: {0}")]
    DocumentExists(Uuid),

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Checklist item {item} not found in block {block}")]
    ChecklistItemNotFound { block: BlockId, item: String },

    /// The block store refuses blocks whose owning document has no row yet.
    #[error("Block {block} references document {document}, which has not been saved")]
    MissingParent { block: BlockId, document: Uuid },

    #[error("Invalid tag: {0}")]
    Tag(#[from] TagError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, JotterError>;
