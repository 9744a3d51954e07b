//! Starnote CLI - stargazing diary from the terminal
//!
//! Quick capture, tags, the constellation checklist, and server sync.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use std::path::Path;

use clap::{CommandFactory, Parser};
use starnote_core::config::AppConfig;
use starnote_core::AppContext;

use crate::cli::{Cli, Commands};
use crate::commands::account::run_account;
use crate::commands::add::run_add;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::{run_delete, run_purge};
use crate::commands::edit::{run_edit, NoteChanges};
use crate::commands::export::run_export;
use crate::commands::list::{run_list, ListFilter};
use crate::commands::search::run_search;
use crate::commands::show::run_show;
use crate::commands::sky::run_sky;
use crate::commands::sync::{run_sync, run_sync_command};
use crate::commands::tags::run_tags;
use crate::commands::user::run_user;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "starnote=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.data_dir.as_deref());

    let command = match cli.command {
        Some(Commands::Completions { shell, output }) => {
            return run_completions(shell, output.as_deref());
        }
        Some(Commands::Config { command }) => {
            return run_config(command, config, cli.config.as_deref());
        }
        other => other,
    };

    let context = AppContext::open(config?)?;
    if let Some(dir) = context.data_dir() {
        tracing::debug!("Using data directory {}", dir.display());
    }
    dispatch(&context, command, &cli.note).await
}

fn load_config(
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::resolve(config_path)?;
    if let Some(dir) = data_dir {
        config.data_dir = Some(dir.to_path_buf());
    }
    Ok(config)
}

async fn dispatch(
    context: &AppContext,
    command: Option<Commands>,
    quick_note: &[String],
) -> Result<(), CliError> {
    match command {
        Some(Commands::Add {
            name,
            tags,
            at,
            body,
        }) => run_add(context, name.as_deref(), &tags, at.as_deref(), &body)?,
        Some(Commands::List {
            tag,
            from,
            to,
            all,
            limit,
            json,
        }) => {
            let filter = ListFilter {
                tag: tag.as_deref(),
                from: from.as_deref(),
                to: to.as_deref(),
                include_deleted: all,
                limit,
            };
            run_list(context, &filter, json)?;
        }
        Some(Commands::Show { id, json }) => run_show(context, &id, json)?,
        Some(Commands::Edit {
            id,
            name,
            body,
            tags,
            at,
        }) => run_edit(
            context,
            &id,
            NoteChanges {
                name,
                body,
                tags,
                at,
            },
        )?,
        Some(Commands::Delete { id }) => run_delete(context, &id)?,
        Some(Commands::Purge) => run_purge(context)?,
        Some(Commands::Search { query, limit, json }) => {
            run_search(context, &query, limit, json)?;
        }
        Some(Commands::Tags { command }) => run_tags(context, command)?,
        Some(Commands::User { command }) => run_user(context, command)?,
        Some(Commands::Account { command }) => run_account(context, command).await?,
        Some(Commands::Sync { command: None }) => run_sync(context).await?,
        Some(Commands::Sync {
            command: Some(command),
        }) => run_sync_command(context, command).await?,
        Some(Commands::Sky { command }) => run_sky(context, command)?,
        Some(Commands::Export { format, output }) => {
            run_export(context, format, output.as_deref())?;
        }
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        Some(Commands::Config { .. }) => {
            return Err(CliError::Config(
                "config commands run before the data directory is opened".into(),
            ));
        }
        None => {
            // Quick capture mode: starnote "saw the ISS"
            if quick_note.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                run_add(context, None, &[], None, quick_note)?;
            }
        }
    }

    Ok(())
}
