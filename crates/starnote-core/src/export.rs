//! Note export as JSON or Markdown.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::Note;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Serializable note representation used in JSON and Markdown exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNote {
    pub id: String,
    pub name: String,
    pub content: String,
    pub timestamp: i64,
    pub tags: Vec<String>,
}

/// Convert a note into an export record with stable tag ordering.
#[must_use]
pub fn note_to_export_item(note: &Note) -> ExportNote {
    let mut tags = note.tags.clone();
    tags.sort();

    ExportNote {
        id: note.id.to_string(),
        name: note.name.clone(),
        content: note.content.clone(),
        timestamp: note.timestamp,
        tags,
    }
}

pub fn render_json_export(notes: &[Note]) -> serde_json::Result<String> {
    let items = notes
        .iter()
        .map(note_to_export_item)
        .collect::<Vec<ExportNote>>();
    serde_json::to_string_pretty(&items)
}

/// One frontmatter block per note followed by its body
#[must_use]
pub fn render_markdown_export(notes: &[Note]) -> String {
    let mut output = String::new();

    for (index, note) in notes.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let export_note = note_to_export_item(note);
        let _ = writeln!(output, "---");
        let _ = writeln!(output, "id: {}", export_note.id);
        let _ = writeln!(output, "name: {}", yaml_scalar(&export_note.name));
        let _ = writeln!(output, "timestamp: {}", export_note.timestamp);
        if export_note.tags.is_empty() {
            let _ = writeln!(output, "tags: []");
        } else {
            let _ = writeln!(output, "tags:");
            for tag in export_note.tags {
                let _ = writeln!(output, "  - {}", yaml_scalar(&tag));
            }
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        output.push_str(&export_note.content);
        output.push('\n');
    }

    output
}

const YAML_KEYWORDS: [&str; 12] = [
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~", ".inf", ".nan",
];

/// Quote a frontmatter value when it would not survive as a plain string scalar
fn yaml_scalar(value: &str) -> String {
    let plain = !value.is_empty()
        && value.trim() == value
        && !value.contains(char::is_control)
        && !value.starts_with(['-', '#', '[', '{', '"', '\'', '!', '&', '*', '?', '|', '>', '@', '%'])
        && !value.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '.')
        && !value.ends_with(':')
        && !value.contains(": ")
        && !value.contains(" #")
        && !YAML_KEYWORDS
            .iter()
            .any(|keyword| value.eq_ignore_ascii_case(keyword))
        && value.parse::<f64>().is_err();
    if plain {
        value.to_string()
    } else {
        serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
    }
}

pub fn render_notes_export(notes: &[Note], format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(notes),
        ExportFormat::Markdown => Ok(render_markdown_export(notes)),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("starnote-export-{timestamp_ms}.{}", format.extension())
}
