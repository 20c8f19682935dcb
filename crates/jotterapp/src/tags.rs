//! Tag rules for documents.
//!
//! A document carries an insertion-ordered set of tags:
//! - At most [`MAX_TAGS`] tags
//! - Surrounding whitespace is trimmed; blank tags are rejected
//! - Duplicates are ignored (adding an existing tag is a no-op)

pub const MAX_TAGS: usize = 5;

/// Adds `raw` to `tags`, trimming it first.
///
/// Returns `Ok(true)` when the tag was added, `Ok(false)` when it was already
/// present.
///
/// # Examples
/// ```
/// use jotterapp::tags::{add_tag, TagError};
///
/// let mut tags = Vec::new();
/// assert_eq!(add_tag(&mut tags, " work "), Ok(true));
/// assert_eq!(add_tag(&mut tags, "work"), Ok(false));
/// assert_eq!(add_tag(&mut tags, "   "), Err(TagError::Blank));
/// assert_eq!(tags, vec!["work".to_string()]);
/// ```
pub fn add_tag(tags: &mut Vec<String>, raw: &str) -> Result<bool, TagError> {
    let tag = raw.trim();
    if tag.is_empty() {
        return Err(TagError::Blank);
    }
    if tags.iter().any(|existing| existing == tag) {
        return Ok(false);
    }
    if tags.len() >= MAX_TAGS {
        return Err(TagError::LimitReached(MAX_TAGS));
    }
    tags.push(tag.to_string());
    Ok(true)
}

/// Removes `raw` (trimmed) from `tags`. Returns whether anything was removed.
pub fn remove_tag(tags: &mut Vec<String>, raw: &str) -> bool {
    let tag = raw.trim();
    let before = tags.len();
    tags.retain(|existing| existing != tag);
    tags.len() != before
}

/// Error type for rejected tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// Tag is empty or whitespace only
    Blank,
    /// Document already has the maximum number of tags
    LimitReached(usize),
}

impl std::fmt::Display for TagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagError::Blank => write!(f, "tag cannot be blank"),
            TagError::LimitReached(max) => {
                write!(f, "a document can have at most {} tags", max)
            }
        }
    }
}

impl std::error::Error for TagError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut tags = Vec::new();
        for t in ["zeta", "alpha", "mid"] {
            add_tag(&mut tags, t).unwrap();
        }
        assert_eq!(tags, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn trims_before_comparing() {
        let mut tags = vec!["work".to_string()];
        assert_eq!(add_tag(&mut tags, "  work\t"), Ok(false));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn rejects_sixth_tag() {
        let mut tags = Vec::new();
        for i in 0..MAX_TAGS {
            add_tag(&mut tags, &format!("t{}", i)).unwrap();
        }
        assert_eq!(add_tag(&mut tags, "extra"), Err(TagError::LimitReached(5)));
        assert_eq!(tags.len(), MAX_TAGS);
    }

    #[test]
    fn duplicate_at_limit_is_not_an_error() {
        let mut tags: Vec<String> = (0..MAX_TAGS).map(|i| format!("t{}", i)).collect();
        assert_eq!(add_tag(&mut tags, "t3"), Ok(false));
    }

    #[test]
    fn remove_reports_change() {
        let mut tags = vec!["a".to_string(), "b".to_string()];
        assert!(remove_tag(&mut tags, " a "));
        assert!(!remove_tag(&mut tags, "a"));
        assert_eq!(tags, vec!["b"]);
    }

    #[test]
    fn error_display() {
        assert_eq!(TagError::Blank.to_string(), "tag cannot be blank");
        assert_eq!(
            TagError::LimitReached(5).to_string(),
            "a document can have at most 5 tags"
        );
    }
}
