use starnote_core::AppContext;

use crate::commands::common::resolve_note;
use crate::error::CliError;

pub fn run_delete(context: &AppContext, id: &str) -> Result<(), CliError> {
    let note = resolve_note(context, id)?;
    context.notes().delete(&note.id)?;
    println!("{}", note.id);
    Ok(())
}

pub fn run_purge(context: &AppContext) -> Result<(), CliError> {
    let purged = context.notes().purge_deleted()?;
    println!("Purged {purged} deleted note(s)");
    Ok(())
}
