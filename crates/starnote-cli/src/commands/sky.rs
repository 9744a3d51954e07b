use starnote_core::constellations::canonical_name;
use starnote_core::AppContext;

use crate::cli::SkyCommands;
use crate::commands::common::print_json;
use crate::error::CliError;

pub fn run_sky(context: &AppContext, command: SkyCommands) -> Result<(), CliError> {
    let log = context.constellations();
    match command {
        SkyCommands::List {
            observed,
            remaining,
            json,
        } => {
            let entries = log
                .list()?
                .into_iter()
                .filter(|entry| (!observed || entry.observed) && (!remaining || !entry.observed))
                .collect::<Vec<_>>();
            if json {
                return print_json(&entries);
            }
            for entry in entries {
                let mark = if entry.observed { "x" } else { " " };
                println!("[{mark}] {}", entry.name);
            }
        }
        SkyCommands::Mark { name } => {
            let name = name.join(" ");
            let display = canonical_name(&name).unwrap_or(name.as_str());
            if log.mark(&name)? {
                println!("Observed {display}");
            } else {
                println!("{display} was already observed");
            }
        }
        SkyCommands::Unmark { name } => {
            let name = name.join(" ");
            let display = canonical_name(&name).unwrap_or(name.as_str());
            if log.unmark(&name)? {
                println!("Cleared {display}");
            } else {
                println!("{display} was not observed");
            }
        }
        SkyCommands::Progress => {
            let progress = log.progress()?;
            println!(
                "{}/{} constellations observed ({:.0}%)",
                progress.observed,
                progress.total,
                progress.percent()
            );
        }
    }
    Ok(())
}
