use crate::model::FormatType;

/// Toolbar toggles that style text as it is typed.
///
/// The four inline styles are independent. Heading sizes are single-select:
/// turning one on replaces any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveStyles {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub heading: Option<FormatType>,
}

impl ActiveStyles {
    /// Flips `kind` and returns whether it is now active.
    pub fn toggle(&mut self, kind: FormatType) -> bool {
        let flag = match kind {
            FormatType::Bold => &mut self.bold,
            FormatType::Italic => &mut self.italic,
            FormatType::Underline => &mut self.underline,
            FormatType::Strikethrough => &mut self.strikethrough,
            FormatType::H1 | FormatType::H2 | FormatType::H3 => {
                self.heading = if self.heading == Some(kind) {
                    None
                } else {
                    Some(kind)
                };
                return self.heading.is_some();
            }
        };
        *flag = !*flag;
        *flag
    }

    pub fn is_active(&self, kind: FormatType) -> bool {
        match kind {
            FormatType::Bold => self.bold,
            FormatType::Italic => self.italic,
            FormatType::Underline => self.underline,
            FormatType::Strikethrough => self.strikethrough,
            FormatType::H1 | FormatType::H2 | FormatType::H3 => self.heading == Some(kind),
        }
    }

    /// The active styles, inline ones first.
    pub fn styles(&self) -> Vec<FormatType> {
        FormatType::ALL
            .iter()
            .copied()
            .filter(|kind| self.is_active(*kind))
            .collect()
    }
}
