use std::collections::BTreeMap;

use serde::Serialize;
use starnote_core::AppContext;

use crate::cli::TagCommands;
use crate::commands::common::print_json;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub notes: usize,
}

/// Every known tag with how many active notes carry it
pub fn tag_counts(context: &AppContext) -> Result<Vec<TagCount>, CliError> {
    let mut counts = context
        .notes()
        .list_tags()?
        .into_iter()
        .map(|tag| (tag, 0usize))
        .collect::<BTreeMap<_, _>>();
    for note in context.notes().list()? {
        for tag in note.tags {
            *counts.entry(tag).or_default() += 1;
        }
    }
    Ok(counts
        .into_iter()
        .map(|(tag, notes)| TagCount { tag, notes })
        .collect())
}

pub fn run_tags(context: &AppContext, command: TagCommands) -> Result<(), CliError> {
    let notes = context.notes();
    match command {
        TagCommands::List { json } => {
            let counts = tag_counts(context)?;
            if json {
                return print_json(&counts);
            }
            if counts.is_empty() {
                println!("No tags.");
            }
            for TagCount { tag, notes } in counts {
                println!("#{tag:<24} {notes}");
            }
        }
        TagCommands::Add { tag } => {
            if notes.add_tag(&tag)? {
                println!("Added #{}", tag.trim());
            } else {
                println!("#{} already exists", tag.trim());
            }
        }
        TagCommands::Rename { from, to } => {
            let changed = notes.rename_tag(&from, &to)?;
            println!("Renamed #{} to #{} on {changed} note(s)", from.trim(), to.trim());
        }
        TagCommands::Delete { tag } => {
            let changed = notes.delete_tag(&tag)?;
            println!("Removed #{} from {changed} note(s)", tag.trim());
        }
    }
    Ok(())
}
