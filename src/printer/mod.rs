//! Printers: coloured text, aligned table rows, and markdown (termimad).

use owo_colors::OwoColorize;
use termimad::MadSkin;
use unicode_width::UnicodeWidthStr;

pub struct TextPrinter {
    pub color: Option<String>,
}

impl TextPrinter {
    pub fn paint(&self, text: &str) -> String {
        match self.color.as_deref() {
            Some("green") => text.green().to_string(),
            Some("cyan") => text.cyan().to_string(),
            Some("magenta") => text.magenta().to_string(),
            Some("yellow") => text.yellow().to_string(),
            Some("red") => text.red().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Pad `text` with spaces to `width` terminal columns.
pub fn pad(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    if w >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - w))
    }
}

/// Column widths for a set of rows, measured in terminal columns.
pub fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let w = UnicodeWidthStr::width(cell.as_str());
            if i >= widths.len() {
                widths.push(w);
            } else if w > widths[i] {
                widths[i] = w;
            }
        }
    }
    widths
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) { self.skin.print_text(text); println!(); }
}
