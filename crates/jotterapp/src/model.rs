//! # Domain Model: Documents, Format Ranges and Blocks
//!
//! This module defines the data that flows between the editing engine and the
//! stores: [`Document`] (with its [`Metadata`]), [`FormatRange`], and the
//! embedded [`BlockRef`] units.
//!
//! ## Two Views of the Same Text
//!
//! A document's body exists in two forms:
//!
//! ```text
//! logical content   "Shopping"                          <-- what the user edits
//! raw content       "Shopping\n⟦block:TODO:a⟧"           <-- what the store keeps
//! ```
//!
//! The logical content is the source of truth while editing. Format ranges index
//! it (in `char`s, never bytes) and are persisted next to the raw content rather
//! than being encoded inside it. The raw content is derived at save time by
//! [`crate::markers::build_raw_content`] and is never edited directly.
//!
//! ## Blocks
//!
//! Blocks (currently only checklists) live in their own store and are referenced
//! from raw content by marker tokens. A block belongs to exactly one document and
//! the block store refuses to hold blocks for a document that has no row.
//! Serialization order is creation time, not the order blocks were added in memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A style that can be applied to a span of logical content.
///
/// `H1`..`H3` are heading sizes; at most one of them is active while typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatType {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    H1,
    H2,
    H3,
}

impl FormatType {
    pub const ALL: [FormatType; 7] = [
        FormatType::Bold,
        FormatType::Italic,
        FormatType::Underline,
        FormatType::Strikethrough,
        FormatType::H1,
        FormatType::H2,
        FormatType::H3,
    ];

    pub fn is_heading(self) -> bool {
        matches!(self, FormatType::H1 | FormatType::H2 | FormatType::H3)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatType::Bold => "bold",
            FormatType::Italic => "italic",
            FormatType::Underline => "underline",
            FormatType::Strikethrough => "strikethrough",
            FormatType::H1 => "h1",
            FormatType::H2 => "h2",
            FormatType::H3 => "h3",
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        FormatType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("unknown style '{}'", s))
    }
}

/// A style applied to `[start, end)` of the logical content, in `char` offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatRange {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: FormatType,
}

impl FormatRange {
    pub fn new(start: usize, end: usize, kind: FormatType) -> Self {
        Self { start, end, kind }
    }

    /// Half-open intersection with `[start, end)`.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }

    /// Whether this range fully contains `[start, end]`.
    pub fn covers(&self, start: usize, end: usize) -> bool {
        self.start <= start && self.end >= end
    }

    pub fn is_valid_for(&self, text_len: usize) -> bool {
        self.start < self.end && self.end <= text_len
    }
}

/// Identifier of an embedded block. Rendered inside marker tokens, so it must
/// stay within hex digits and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Block kinds the engine knows how to reference from raw content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Checklist,
}

impl BlockType {
    /// The uppercase tag used for this type inside marker tokens.
    pub fn tag(self) -> &'static str {
        match self {
            BlockType::Checklist => "TODO",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "TODO" => Some(BlockType::Checklist),
            _ => None,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub checked: bool,
    pub sort_order: i64,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            checked: false,
            sort_order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| ChecklistItem::new(text, i as i64))
            .collect();
        Self { items }
    }

    /// Sort order for an appended item: one past the current maximum.
    pub fn next_sort_order(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.sort_order)
            .max()
            .map_or(0, |max| max + 1)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut ChecklistItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    /// Items in display order.
    pub fn sorted_items(&self) -> Vec<&ChecklistItem> {
        let mut items: Vec<&ChecklistItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.sort_order);
        items
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum BlockPayload {
    Checklist(Checklist),
}

/// An embedded block owned by a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub id: BlockId,
    pub document_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub payload: BlockPayload,
}

impl BlockRef {
    pub fn checklist<I, S>(document_id: Uuid, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: BlockId::generate(),
            document_id,
            created_at: Utc::now(),
            payload: BlockPayload::Checklist(Checklist::from_texts(texts)),
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self.payload {
            BlockPayload::Checklist(_) => BlockType::Checklist,
        }
    }

    pub fn as_checklist(&self) -> Option<&Checklist> {
        match &self.payload {
            BlockPayload::Checklist(list) => Some(list),
        }
    }

    pub fn as_checklist_mut(&mut self) -> Option<&mut Checklist> {
        match &mut self.payload {
            BlockPayload::Checklist(list) => Some(list),
        }
    }
}

/// Sorts blocks into serialization order: creation time, then id.
pub fn sort_blocks(blocks: &mut [BlockRef]) {
    blocks.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub formats: Vec<FormatRange>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub pinned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_trashed: bool,
    #[serde(default)]
    pub trashed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

impl Metadata {
    pub fn new(id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            title,
            formats: Vec::new(),
            tags: Vec::new(),
            is_pinned: false,
            pinned_at: None,
            is_archived: false,
            archived_at: None,
            is_trashed: false,
            trashed_at: None,
            folder_id: None,
        }
    }
}

/// A persisted document: metadata plus its raw content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: Metadata,
    pub content: String,
}

impl Document {
    pub fn new(id: Uuid, title: String, content: String) -> Self {
        Self {
            metadata: Metadata::new(id, title),
            content,
        }
    }

    pub fn id(&self) -> Uuid {
        self.metadata.id
    }

    /// The marker-free text the user edits.
    pub fn logical_content(&self) -> &str {
        crate::markers::extract_logical_content(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn block_at(id: &str, millis: i64) -> BlockRef {
        BlockRef {
            id: BlockId::from(id),
            document_id: Uuid::nil(),
            created_at: Utc.timestamp_millis_opt(millis).unwrap(),
            payload: BlockPayload::Checklist(Checklist::default()),
        }
    }

    #[test]
    fn format_type_parses_case_insensitively() {
        assert_eq!("Bold".parse::<FormatType>(), Ok(FormatType::Bold));
        assert_eq!("h2".parse::<FormatType>(), Ok(FormatType::H2));
        assert!("huge".parse::<FormatType>().is_err());
    }

    #[test]
    fn format_range_serializes_with_type_key() {
        let range = FormatRange::new(0, 5, FormatType::Bold);
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#"{"start":0,"end":5,"type":"BOLD"}"#);
    }

    #[test]
    fn overlap_is_half_open() {
        let range = FormatRange::new(2, 5, FormatType::Italic);
        assert!(range.overlaps(4, 8));
        assert!(!range.overlaps(5, 8));
        assert!(!range.overlaps(0, 2));
    }

    #[test]
    fn next_sort_order_follows_max() {
        let mut list = Checklist::from_texts(["a", "b"]);
        assert_eq!(list.next_sort_order(), 2);
        list.items[0].sort_order = 9;
        assert_eq!(list.next_sort_order(), 10);
        assert_eq!(Checklist::default().next_sort_order(), 0);
    }

    #[test]
    fn sort_blocks_uses_creation_time_then_id() {
        let mut blocks = vec![block_at("c", 2), block_at("b", 1), block_at("a", 2)];
        sort_blocks(&mut blocks);
        let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn metadata_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "title": "Old"
        }"#;
        let meta: Metadata = serde_json::from_str(json).unwrap();
        assert!(meta.formats.is_empty());
        assert!(!meta.is_trashed);
        assert_eq!(meta.folder_id, None);
    }
}
