//! # Format Ranges
//!
//! Pure functions over a list of [`FormatRange`]s. No I/O, no state: callers
//! pass the current ranges in and store what comes back.
//!
//! ## Applying and Removing
//!
//! - [`add_format`] drops every same-type range that overlaps the span, then
//!   appends exactly one range for the span. Abutting same-type ranges are *not*
//!   merged, so repeated styling near a boundary can leave a visually contiguous
//!   style stored as several ranges.
//! - [`remove_format`] drops every same-type range overlapping the span.
//! - [`has_format`] is a "covers" test, not an "intersects" test. Toolbar toggles
//!   use it to decide whether a selection is already styled.
//!
//! ## Re-indexing Under Edits
//!
//! [`adjust_formats_for_text_change`] locates an edit by the longest common
//! prefix of the old and new text. This is a position heuristic, not a diff:
//! an edit whose changed region repeats further into the text is located at the
//! first difference, and ranges after it may shift incorrectly.
//!
//! ```text
//! old: "Hello world"     new: "Hello"      change_pos = 5, diff = -6
//! [0, 11) BOLD  ──straddles──►  [0, 5) BOLD
//! ```
//!
//! All offsets count `char`s of the logical content.

use crate::model::{FormatRange, FormatType};

/// Number of `char`s in `text`; the unit every format offset uses.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Length in `char`s of the longest common prefix of `a` and `b`.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

pub fn add_format(
    ranges: &[FormatRange],
    start: usize,
    end: usize,
    kind: FormatType,
) -> Vec<FormatRange> {
    let mut result = remove_format(ranges, start, end, kind);
    result.push(FormatRange::new(start, end, kind));
    result
}

pub fn remove_format(
    ranges: &[FormatRange],
    start: usize,
    end: usize,
    kind: FormatType,
) -> Vec<FormatRange> {
    ranges
        .iter()
        .filter(|r| !(r.kind == kind && r.overlaps(start, end)))
        .copied()
        .collect()
}

pub fn has_format(ranges: &[FormatRange], start: usize, end: usize, kind: FormatType) -> bool {
    ranges
        .iter()
        .any(|r| r.kind == kind && r.covers(start, end))
}

/// Re-indexes `ranges` so they keep pointing at the same text after
/// `old_text` became `new_text`.
pub fn adjust_formats_for_text_change(
    ranges: &[FormatRange],
    old_text: &str,
    new_text: &str,
) -> Vec<FormatRange> {
    let old_len = char_len(old_text) as i64;
    let new_len = char_len(new_text) as i64;
    let length_diff = new_len - old_len;
    if length_diff == 0 {
        return ranges.to_vec();
    }

    let change_pos = common_prefix_len(old_text, new_text) as i64;

    ranges
        .iter()
        .filter_map(|range| {
            let start = range.start as i64;
            let end = range.end as i64;

            let (new_start, new_end) = if end <= change_pos {
                (start, end)
            } else if start >= change_pos {
                let shifted_start = (start + length_diff).max(0);
                let shifted_end = (end + length_diff).max(shifted_start + 1);
                (shifted_start, shifted_end)
            } else if start < change_pos && change_pos < end {
                (start, (end + length_diff).max(start + 1))
            } else {
                return None;
            };

            if new_start >= new_len || new_end > new_len || new_start >= new_end {
                return None;
            }
            Some(FormatRange::new(
                new_start as usize,
                new_end as usize,
                range.kind,
            ))
        })
        .collect()
}

/// The span `new_text` gained relative to `old_text`, as `(position, length)`.
///
/// Uses the same common-prefix heuristic as [`adjust_formats_for_text_change`];
/// returns `None` when nothing was inserted.
pub fn inserted_span(old_text: &str, new_text: &str) -> Option<(usize, usize)> {
    let old_len = char_len(old_text);
    let new_len = char_len(new_text);
    if new_len <= old_len {
        return None;
    }
    Some((common_prefix_len(old_text, new_text), new_len - old_len))
}

/// Styles freshly typed text with every active style.
pub fn apply_styles_to_insertion(
    ranges: &[FormatRange],
    position: usize,
    length: usize,
    styles: &[FormatType],
) -> Vec<FormatRange> {
    if length == 0 {
        return ranges.to_vec();
    }
    styles.iter().fold(ranges.to_vec(), |acc, kind| {
        add_format(&acc, position, position + length, *kind)
    })
}
