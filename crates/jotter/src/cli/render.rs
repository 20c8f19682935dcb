//! # Rendering
//!
//! Pure functions from library types to printable strings. Styling goes
//! through `console`, which drops escape codes when stdout is not a terminal.

use super::styles;
use chrono::{DateTime, Local, Utc};
use jotterapp::config::JotterConfig;
use jotterapp::markers::{self, Node};
use jotterapp::model::{BlockId, BlockRef, Document, FormatRange, FormatType};
use std::fmt::Write;
use std::path::Path;

pub const PIN_MARKER: &str = "⚲";
const SHORT_ID_LEN: usize = 8;
const TITLE_WIDTH: usize = 40;

/// A checklist item as numbered by `jotter show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub block_id: BlockId,
    pub item_id: String,
}

/// Numbers checklist items across all blocks, in block creation order and
/// item sort order. Numbers start at 1.
pub fn number_items(blocks: &[BlockRef]) -> Vec<ItemRef> {
    blocks
        .iter()
        .flat_map(|block| {
            block
                .as_checklist()
                .map(|list| list.sorted_items())
                .unwrap_or_default()
                .into_iter()
                .map(move |item| ItemRef {
                    block_id: block.id.clone(),
                    item_id: item.id.clone(),
                })
        })
        .collect()
}

pub fn short_id(document: &Document) -> String {
    document.id().to_string()[..SHORT_ID_LEN].to_string()
}

/// The title, or the first line of the body for untitled notes.
pub fn display_title(document: &Document) -> String {
    let title = document.metadata.title.trim();
    let fallback = document.logical_content().lines().next().unwrap_or("").trim();
    let text = match (title.is_empty(), fallback.is_empty()) {
        (false, _) => title,
        (true, false) => fallback,
        (true, true) => "(untitled)",
    };
    truncate(text, TITLE_WIDTH)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_list(documents: &[Document], empty_message: &str) -> String {
    if documents.is_empty() {
        return format!("{}\n", empty_message);
    }
    let mut out = String::new();
    for document in documents {
        let meta = &document.metadata;
        let pin = if meta.is_pinned { PIN_MARKER } else { " " };
        let mut line = format!(
            "{} {} {:<width$}  {}",
            styles::PIN.apply_to(pin),
            styles::ID.apply_to(short_id(document)),
            display_title(document),
            styles::TIME.apply_to(format_time(meta.updated_at)),
            width = TITLE_WIDTH
        );
        if !meta.tags.is_empty() {
            let _ = write!(line, "  {}", styles::TAG.apply_to(tag_list(&meta.tags)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn tag_list(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full view of one note: header, styled body, then its checklists.
pub fn render_document(document: &Document, blocks: &[BlockRef]) -> String {
    let meta = &document.metadata;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}  {}",
        styles::TITLE.apply_to(display_title(document)),
        styles::ID.apply_to(document.id())
    );

    let mut flags = Vec::new();
    if meta.is_pinned {
        flags.push("pinned");
    }
    if meta.is_archived {
        flags.push("archived");
    }
    if meta.is_trashed {
        flags.push("trashed");
    }
    if !flags.is_empty() {
        let _ = writeln!(out, "{}", styles::FLAG.apply_to(flags.join(", ")));
    }
    if !meta.tags.is_empty() {
        let _ = writeln!(out, "{}", styles::TAG.apply_to(tag_list(&meta.tags)));
    }
    let _ = writeln!(out, "{}", styles::TIME.apply_to(format_time(meta.updated_at)));
    out.push('\n');

    let logical = document.logical_content();
    if !logical.is_empty() {
        out.push_str(&styled_text(logical, &meta.formats));
        out.push('\n');
    }

    let numbering = number_items(blocks);
    for node in markers::parse(&document.content) {
        let Node::Block { block_id, .. } = node else {
            continue;
        };
        out.push('\n');
        match blocks.iter().find(|b| b.id == block_id) {
            Some(block) => render_checklist(&mut out, block, &numbering),
            None => {
                let _ = writeln!(out, "  (missing checklist {})", block_id);
            }
        }
    }
    out
}

fn render_checklist(out: &mut String, block: &BlockRef, numbering: &[ItemRef]) {
    let Some(list) = block.as_checklist() else {
        return;
    };
    for item in list.sorted_items() {
        let number = numbering
            .iter()
            .position(|r| r.block_id == block.id && r.item_id == item.id)
            .map_or(0, |i| i + 1);
        let line = if item.checked {
            styles::CHECKED.apply_to(format!("[x] {}", item.text)).to_string()
        } else {
            format!("[ ] {}", item.text)
        };
        let _ = writeln!(out, "{:>4}. {}", number, line);
    }
}

/// Applies format ranges to `text` as terminal styles, one run per distinct
/// set of active formats.
pub fn styled_text(text: &str, formats: &[FormatRange]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut start = 0;
    while start < chars.len() {
        let active = formats_at(formats, start);
        let mut end = start + 1;
        while end < chars.len() && formats_at(formats, end) == active {
            end += 1;
        }
        let run: String = chars[start..end].iter().collect();
        if active.is_empty() {
            out.push_str(&run);
        } else {
            let _ = write!(out, "{}", styles::for_formats(&active).apply_to(run));
        }
        start = end;
    }
    out
}

fn formats_at(formats: &[FormatRange], position: usize) -> Vec<FormatType> {
    let mut kinds: Vec<FormatType> = formats
        .iter()
        .filter(|r| r.start <= position && position < r.end)
        .map(|r| r.kind)
        .collect();
    kinds.sort();
    kinds.dedup();
    kinds
}

pub fn render_config(config: &JotterConfig, data_dir: &Path, config_file: Option<&Path>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "debounce_ms     = {}", config.debounce_ms);
    let _ = writeln!(out, "block_settle_ms = {}", config.block_settle_ms);
    let _ = writeln!(out, "delete_grace_ms = {}", config.delete_grace_ms);
    let _ = writeln!(out, "data_dir        = {}", data_dir.display());
    match config_file {
        Some(path) => {
            let _ = writeln!(out, "config file     = {}", path.display());
        }
        None => out.push_str("config file     = (none)\n"),
    }
    out
}

pub fn success(message: &str) -> String {
    format!("{}\n", styles::SUCCESS.apply_to(message))
}
