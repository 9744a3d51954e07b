use starnote_core::AppContext;

use crate::commands::common::{format_note_detail, note_to_list_item, print_json, resolve_note};
use crate::error::CliError;

pub fn run_show(context: &AppContext, id: &str, as_json: bool) -> Result<(), CliError> {
    let note = resolve_note(context, id)?;
    if as_json {
        print_json(&note_to_list_item(&note))
    } else {
        println!("{}", format_note_detail(&note));
        Ok(())
    }
}
