use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use starnote_core::{AppContext, Note, NoteId};

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub name: String,
    pub preview: String,
    pub content: String,
    pub timestamp: i64,
    pub relative_time: String,
    pub tags: Vec<String>,
    pub is_deleted: bool,
}

/// Find an active note by full id or unique id prefix
pub fn resolve_note(context: &AppContext, note_query: &str) -> Result<Note, CliError> {
    let note_query = normalize_note_identifier(note_query)?;
    if let Ok(note_id) = note_query.parse::<NoteId>() {
        if let Some(note) = context.notes().get(&note_id)? {
            return Ok(note);
        }
    }

    let mut matching = context
        .notes()
        .list()?
        .into_iter()
        .filter(|note| note.id.as_str().starts_with(&note_query))
        .collect::<Vec<_>>();

    match matching.len() {
        0 => Err(CliError::NoteNotFound(note_query)),
        1 => Ok(matching.remove(0)),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|note| short_id(&note.id))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{note_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &NoteId) -> String {
    id.as_str().chars().take(13).collect()
}

/// Newest first, optionally capped
pub fn newest_first(mut notes: Vec<Note>, limit: Option<usize>) -> Vec<Note> {
    notes.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    if let Some(limit) = limit {
        notes.truncate(limit);
    }
    notes
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let short_id = short_id(&note.id);
            let preview = note_preview(note, 40);
            let when = format_timestamp(note.timestamp);
            let relative_time = format_relative_time(note.timestamp, now_ms);
            let tags = render_tags(note);
            let deleted = if note.is_deleted { "  (deleted)" } else { "" };

            if tags.is_empty() {
                format!("{short_id:<13}  {preview:<40}  {when}  {relative_time}{deleted}")
            } else {
                format!(
                    "{short_id:<13}  {preview:<40}  {when}  {relative_time:<10}  {tags}{deleted}"
                )
            }
        })
        .collect()
}

pub fn format_note_detail(note: &Note) -> String {
    let mut lines = vec![
        format!("id:    {}", note.id),
        format!("name:  {}", note.name),
        format!("time:  {}", format_timestamp(note.timestamp)),
    ];
    let tags = render_tags(note);
    if !tags.is_empty() {
        lines.push(format!("tags:  {tags}"));
    }
    if note.is_deleted {
        lines.push("state: deleted".to_string());
    }
    if !note.content.is_empty() {
        lines.push(String::new());
        lines.push(note.content.clone());
    }
    lines.join("\n")
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    let mut tags = note.tags.clone();
    tags.sort();

    NoteListItem {
        id: note.id.to_string(),
        name: note.name.clone(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        timestamp: note.timestamp,
        relative_time: format_relative_time(note.timestamp, now_ms),
        tags,
        is_deleted: note.is_deleted,
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let title = note.title_preview(usize::MAX);
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn render_tags(note: &Note) -> String {
    let mut tags = note.tags.clone();
    tags.sort();
    tags.into_iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < 0 {
        "upcoming".to_string()
    } else if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Parse RFC 3339, a bare `YYYY-MM-DD` (UTC midnight), or Unix milliseconds
pub fn parse_time(input: &str) -> Result<i64, CliError> {
    let trimmed = input.trim();
    if let Ok(millis) = trimmed.parse::<i64>() {
        return Ok(millis);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date_time.timestamp_millis());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().timestamp_millis());
    }
    Err(CliError::InvalidTime(trimmed.to_string()))
}

pub fn parse_optional_time(input: Option<&str>) -> Result<Option<i64>, CliError> {
    input.map(parse_time).transpose()
}

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // EDITOR may carry arguments, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("starnote-{}-{now}.md", std::process::id()))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
