use starnote_core::{AppContext, Note};

use crate::commands::common::{
    format_note_lines, newest_first, note_to_list_item, parse_optional_time, print_json,
    NoteListItem,
};
use crate::error::CliError;

pub struct ListFilter<'a> {
    pub tag: Option<&'a str>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub include_deleted: bool,
    pub limit: Option<usize>,
}

pub fn list_notes(context: &AppContext, filter: &ListFilter<'_>) -> Result<Vec<Note>, CliError> {
    let from = parse_optional_time(filter.from)?;
    let to = parse_optional_time(filter.to)?;
    let notes = context.notes();

    let mut selected = if from.is_some() || to.is_some() {
        let mut in_range =
            notes.list_in_range(from.unwrap_or(i64::MIN), to.unwrap_or(i64::MAX))?;
        if let Some(tag) = filter.tag {
            in_range.retain(|note| note.has_tag(tag.trim()));
        }
        in_range
    } else if let Some(tag) = filter.tag {
        notes.list_by_tag(tag)?
    } else if filter.include_deleted {
        notes.list_all()?
    } else {
        notes.list()?
    };

    selected = newest_first(selected, filter.limit);
    Ok(selected)
}

pub fn run_list(
    context: &AppContext,
    filter: &ListFilter<'_>,
    as_json: bool,
) -> Result<(), CliError> {
    let notes = list_notes(context, filter)?;

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        print_json(&json_items)?;
    } else if notes.is_empty() {
        println!("No notes.");
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}
