use starnote_core::AppContext;

use crate::commands::common::{
    format_note_lines, newest_first, normalize_search_query, note_to_list_item, print_json,
    NoteListItem,
};
use crate::error::CliError;

pub fn run_search(
    context: &AppContext,
    query: &str,
    limit: Option<usize>,
    as_json: bool,
) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let notes = newest_first(context.notes().search(&normalized_query)?, limit);

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        print_json(&json_items)?;
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}
