//! # Raw Content Markers
//!
//! Raw content is the logical text followed by one marker token per embedded
//! block, each on its own line:
//!
//! ```text
//! Shopping
//! ⟦block:TODO:3f2a9c1e-...⟧
//! ⟦block:TODO:77b0e4d2-...⟧
//! ```
//!
//! ## Grammar
//!
//! ```text
//! marker := "⟦block:" TYPE ":" ID "⟧"
//! TYPE   := [A-Z]+
//! ID     := [0-9A-Fa-f-]+
//! ```
//!
//! The delimiters are chosen to be very unlikely in prose, but nothing escapes
//! them. Two consequences are kept deliberately:
//!
//! - [`extract_logical_content`] cuts at the first [`MARKER_PREFIX`] without
//!   checking that a well-formed marker follows, so user text containing the
//!   prefix loses everything from that point on.
//! - [`parse`] skips markers whose TYPE is not a known [`BlockType`]; the span
//!   produces no node at all.
//!
//! Offsets in [`Node`] are UTF-8 byte offsets into the raw string. They are not
//! interchangeable with format range offsets, which count `char`s of the
//! logical content.

use crate::model::{sort_blocks, BlockId, BlockRef, BlockType};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MARKER_PREFIX: &str = "⟦block:";
pub const MARKER_SUFFIX: &str = "⟧";

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"⟦block:([A-Z]+):([0-9A-Fa-f-]+)⟧").expect("marker pattern is valid")
});

/// A segment of raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text {
        content: String,
        raw_start: usize,
        raw_end: usize,
    },
    Block {
        block_id: BlockId,
        block_type: BlockType,
        raw_start: usize,
        raw_end: usize,
    },
}

impl Node {
    pub fn raw_span(&self) -> (usize, usize) {
        match self {
            Node::Text {
                raw_start, raw_end, ..
            }
            | Node::Block {
                raw_start, raw_end, ..
            } => (*raw_start, *raw_end),
        }
    }
}

pub fn create_marker(block_type: BlockType, id: &BlockId) -> String {
    format!(
        "{}{}:{}{}",
        MARKER_PREFIX,
        block_type.tag(),
        id.as_str(),
        MARKER_SUFFIX
    )
}

/// The text before the first marker prefix, right-trimmed. Returns the input
/// untouched when it holds no prefix at all.
pub fn extract_logical_content(raw: &str) -> &str {
    match raw.find(MARKER_PREFIX) {
        Some(index) => raw[..index].trim_end(),
        None => raw,
    }
}

/// Appends a newline and a marker for each block, in creation order.
pub fn build_raw_content(logical: &str, blocks: &[BlockRef]) -> String {
    if blocks.is_empty() {
        return logical.to_string();
    }

    let mut ordered = blocks.to_vec();
    sort_blocks(&mut ordered);

    let mut raw = String::from(logical);
    for block in &ordered {
        raw.push('\n');
        raw.push_str(&create_marker(block.block_type(), &block.id));
    }
    raw
}

/// Splits raw content into text and block nodes.
///
/// The single newline that joins a text segment to the marker after it is a
/// separator written by [`build_raw_content`] and is not part of the text node.
/// The result is never empty: blank input yields one empty text node.
pub fn parse(raw: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut cursor = 0;

    for caps in MARKER_RE.captures_iter(raw) {
        let (Some(whole), Some(kind), Some(id)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };

        let text_end = if raw[cursor..whole.start()].ends_with('\n') {
            whole.start() - 1
        } else {
            whole.start()
        };
        push_text(&mut nodes, raw, cursor, text_end);

        if let Some(block_type) = BlockType::from_tag(kind.as_str()) {
            nodes.push(Node::Block {
                block_id: BlockId::from(id.as_str()),
                block_type,
                raw_start: whole.start(),
                raw_end: whole.end(),
            });
        }
        cursor = whole.end();
    }

    push_text(&mut nodes, raw, cursor, raw.len());

    if nodes.is_empty() {
        nodes.push(Node::Text {
            content: String::new(),
            raw_start: 0,
            raw_end: 0,
        });
    }
    nodes
}

fn push_text(nodes: &mut Vec<Node>, raw: &str, start: usize, end: usize) {
    if start < end {
        nodes.push(Node::Text {
            content: raw[start..end].to_string(),
            raw_start: start,
            raw_end: end,
        });
    }
}

/// Concatenation of every text node, i.e. the logical text a raw string encodes.
pub fn text_of(nodes: &[Node]) -> String {
    nodes
        .iter()
        .filter_map(|node| match node {
            Node::Text { content, .. } => Some(content.as_str()),
            Node::Block { .. } => None,
        })
        .collect()
}
