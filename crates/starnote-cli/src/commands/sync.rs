use starnote_core::AppContext;

use crate::cli::SyncCommands;
use crate::commands::common::{format_timestamp, resolve_note};
use crate::error::CliError;

pub async fn run_sync(context: &AppContext) -> Result<(), CliError> {
    let report = context.sync().await?;
    let received = report
        .received
        .map_or_else(|| "kept local notes".to_string(), |count| format!("received {count}"));
    println!(
        "Sync completed: sent {} note(s) and {} deletion(s), {received}",
        report.sent, report.deleted_sent
    );
    if let Some(message) = report.message {
        println!("Server: {message}");
    }
    Ok(())
}

pub async fn run_sync_command(
    context: &AppContext,
    command: SyncCommands,
) -> Result<(), CliError> {
    match command {
        SyncCommands::Push { id } => {
            let note = resolve_note(context, &id)?;
            context.push_note(&note.id).await?;
            println!("{}", note.id);
        }
        SyncCommands::Remove { id } => {
            let note = resolve_note(context, &id)?;
            context.delete_remote_note(&note.id).await?;
            println!("{}", note.id);
        }
        SyncCommands::Status => {
            match context.notes().last_synced_at()? {
                Some(at) => println!("Last sync: {}", format_timestamp(at)),
                None => println!("Never synced."),
            }
            let pending = context.notes().deleted_ids()?.len();
            if pending > 0 {
                println!("{pending} deletion(s) waiting for the next sync");
            }
        }
    }
    Ok(())
}
