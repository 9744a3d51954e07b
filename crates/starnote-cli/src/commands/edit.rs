use starnote_core::AppContext;

use crate::commands::common::{
    capture_editor_input_with_initial, parse_optional_time, resolve_note,
};
use crate::error::CliError;

#[derive(Debug, Default)]
pub struct NoteChanges {
    pub name: Option<String>,
    pub body: Option<String>,
    pub tags: Vec<String>,
    pub at: Option<String>,
}

impl NoteChanges {
    const fn is_empty(&self) -> bool {
        self.name.is_none() && self.body.is_none() && self.tags.is_empty() && self.at.is_none()
    }
}

pub fn run_edit(context: &AppContext, id: &str, changes: NoteChanges) -> Result<(), CliError> {
    let note = resolve_note(context, id)?;
    let mut edited = note.clone();

    if changes.is_empty() {
        let Some(content) = capture_editor_input_with_initial(&note.content)? else {
            return Err(CliError::EmptyEditedContent);
        };
        edited.content = content;
    } else {
        if let Some(name) = changes.name {
            edited.name = name.trim().to_string();
        }
        if let Some(body) = changes.body {
            edited.content = body;
        }
        if !changes.tags.is_empty() {
            edited = edited.with_tags(&changes.tags);
        }
        if let Some(timestamp) = parse_optional_time(changes.at.as_deref())? {
            edited.timestamp = timestamp;
        }
    }

    if edited.is_empty() {
        return Err(CliError::EmptyEditedContent);
    }
    if edited == note {
        println!("{}", note.id);
        return Ok(());
    }

    let updated = context.notes().upsert(&edited)?;
    println!("{}", updated.id);
    Ok(())
}
