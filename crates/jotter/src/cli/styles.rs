use console::Style;
use jotterapp::model::FormatType;
use once_cell::sync::Lazy;

pub static ID: Lazy<Style> = Lazy::new(|| Style::new().dim());
pub static TITLE: Lazy<Style> = Lazy::new(|| Style::new().bold());
pub static PIN: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static TAG: Lazy<Style> = Lazy::new(|| Style::new().cyan());
pub static TIME: Lazy<Style> = Lazy::new(|| Style::new().color256(246).italic());
pub static FLAG: Lazy<Style> = Lazy::new(|| Style::new().red());
pub static CHECKED: Lazy<Style> = Lazy::new(|| Style::new().green());
pub static SUCCESS: Lazy<Style> = Lazy::new(|| Style::new().green());

/// Terminal style for a run of text carrying `kinds`.
pub fn for_formats(kinds: &[FormatType]) -> Style {
    kinds.iter().fold(Style::new(), |style, kind| match kind {
        FormatType::Bold => style.bold(),
        FormatType::Italic => style.italic(),
        FormatType::Underline => style.underlined(),
        FormatType::Strikethrough => style.strikethrough(),
        FormatType::H1 | FormatType::H2 | FormatType::H3 => style.bold().magenta(),
    })
}
