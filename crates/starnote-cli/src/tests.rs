use clap::Parser;
use pretty_assertions::assert_eq;
use starnote_core::config::AppConfig;
use starnote_core::models::AuthSession;
use starnote_core::store::NoteDraft;
use starnote_core::{AppContext, Note};
use tempfile::tempdir;

use crate::cli::{
    AccountCommands, Cli, Commands, CompletionShell, ConfigCommands, ExportFormat, TagCommands,
};
use crate::commands::common::{
    default_editor, format_relative_time, format_timestamp, newest_first, normalize_content,
    normalize_note_identifier, normalize_search_query, note_preview, parse_time, resolve_note,
};
use crate::commands::completions::render_completions;
use crate::commands::config::{normalize_api_url, run_config};
use crate::commands::delete::{run_delete, run_purge};
use crate::commands::edit::{run_edit, NoteChanges};
use crate::commands::export::run_export;
use crate::commands::list::{list_notes, ListFilter};
use crate::commands::tags::{run_tags, tag_counts};
use crate::error::CliError;

fn add(context: &AppContext, name: &str, tags: &[&str], timestamp: i64) -> Note {
    context
        .notes()
        .create(NoteDraft {
            name: name.to_string(),
            content: String::new(),
            tags: tags.iter().map(ToString::to_string).collect(),
            timestamp: Some(timestamp),
        })
        .unwrap()
}

const fn all_active() -> ListFilter<'static> {
    ListFilter {
        tag: None,
        from: None,
        to: None,
        include_deleted: false,
        limit: None,
    }
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now + 60_000, now), "upcoming");
}

#[test]
fn format_timestamp_returns_utc_label() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00 UTC");
}

#[test]
fn parse_time_accepts_millis_dates_and_rfc3339() {
    assert_eq!(parse_time("1700000000000").unwrap(), 1_700_000_000_000);
    assert_eq!(parse_time("1970-01-02").unwrap(), 86_400_000);
    assert_eq!(parse_time("1970-01-01T00:00:01Z").unwrap(), 1_000);
    assert!(matches!(parse_time("last tuesday"), Err(CliError::InvalidTime(_))));
}

#[test]
fn note_preview_prefers_name_and_truncates() {
    let note = Note::new("A very long observation title for the log", "body");
    assert_eq!(note_preview(&note, 20), "A very long obser...");

    let untitled = Note::new("", "first line\nsecond line");
    assert_eq!(note_preview(&untitled, 40), "first line");
}

#[test]
fn normalize_search_query_and_identifier_reject_blank() {
    assert!(normalize_search_query(" \n\t ").is_err());
    assert_eq!(normalize_search_query("  m31  ").unwrap(), "m31");
    assert!(matches!(
        normalize_note_identifier(" \n "),
        Err(CliError::EmptyNoteId)
    ));
}

#[test]
fn resolve_note_supports_exact_and_prefix_id() {
    let context = AppContext::open_in_memory();
    let first = add(&context, "Andromeda galaxy", &[], 1);
    let second = add(&context, "Pleiades", &[], 2);

    assert_eq!(
        resolve_note(&context, first.id.as_str()).unwrap().id,
        first.id
    );

    let unique_prefix = (1..=first.id.as_str().len())
        .map(|len| &first.id.as_str()[..len])
        .find(|prefix| !second.id.as_str().starts_with(prefix))
        .unwrap();
    assert_eq!(resolve_note(&context, unique_prefix).unwrap().id, first.id);

    assert!(matches!(
        resolve_note(&context, "zzzz"),
        Err(CliError::NoteNotFound(_))
    ));
}

#[test]
fn resolve_note_reports_ambiguous_prefix() {
    let context = AppContext::open_in_memory();
    let first = add(&context, "one", &[], 1);
    add(&context, "two", &[], 2);

    // UUID v7 ids lead with the creation time, so fresh ids share a prefix
    let shared = first.id.as_str()[..4].to_string();
    let result = resolve_note(&context, &shared);
    assert!(matches!(result, Err(CliError::AmbiguousNoteId(_))));
}

#[test]
fn list_notes_filters_by_range_tag_and_deleted_state() {
    let context = AppContext::open_in_memory();
    let early = add(&context, "early", &["moon"], 1_000);
    let middle = add(&context, "middle", &["planets"], 2_000);
    let late = add(&context, "late", &["moon"], 3_000);
    context.notes().delete(&middle.id).unwrap();

    let active = list_notes(&context, &all_active()).unwrap();
    assert_eq!(
        active.iter().map(|note| note.id.clone()).collect::<Vec<_>>(),
        vec![late.id.clone(), early.id.clone()]
    );

    let ranged = list_notes(
        &context,
        &ListFilter {
            from: Some("1000"),
            to: Some("3000"),
            ..all_active()
        },
    )
    .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].id, early.id);

    let moon = list_notes(
        &context,
        &ListFilter {
            tag: Some("moon"),
            limit: Some(1),
            ..all_active()
        },
    )
    .unwrap();
    assert_eq!(moon.len(), 1);
    assert_eq!(moon[0].id, late.id);

    let everything = list_notes(
        &context,
        &ListFilter {
            include_deleted: true,
            ..all_active()
        },
    )
    .unwrap();
    assert_eq!(everything.len(), 3);
    assert!(everything.iter().any(|note| note.is_deleted));
}

#[test]
fn newest_first_sorts_and_limits() {
    let notes = vec![
        Note::new("a", "").at(1),
        Note::new("c", "").at(3),
        Note::new("b", "").at(2),
    ];
    let sorted = newest_first(notes, Some(2));
    assert_eq!(
        sorted.iter().map(|note| note.name.as_str()).collect::<Vec<_>>(),
        vec!["c", "b"]
    );
}

#[test]
fn delete_then_purge_erases_note() {
    let context = AppContext::open_in_memory();
    let note = add(&context, "meteor", &[], 5);

    run_delete(&context, note.id.as_str()).unwrap();
    assert!(context.notes().list().unwrap().is_empty());
    assert_eq!(context.notes().list_all().unwrap().len(), 1);

    run_purge(&context).unwrap();
    assert!(context.notes().list_all().unwrap().is_empty());
    assert_eq!(context.notes().deleted_ids().unwrap(), vec![note.id]);
}

#[test]
fn edit_with_flags_updates_fields() {
    let context = AppContext::open_in_memory();
    let note = add(&context, "draft", &["old"], 5);

    run_edit(
        &context,
        note.id.as_str(),
        NoteChanges {
            name: Some(" Saturn rings ".to_string()),
            body: Some("Cassini division visible".to_string()),
            tags: vec!["planets".to_string()],
            at: Some("1970-01-01".to_string()),
        },
    )
    .unwrap();

    let edited = context.notes().get(&note.id).unwrap().unwrap();
    assert_eq!(edited.name, "Saturn rings");
    assert_eq!(edited.content, "Cassini division visible");
    assert_eq!(edited.tags, vec!["planets"]);
    assert_eq!(edited.timestamp, 0);
}

#[test]
fn tag_commands_rename_and_count() {
    let context = AppContext::open_in_memory();
    add(&context, "one", &["moon"], 1);
    add(&context, "two", &["moon", "luna"], 2);

    run_tags(&context, TagCommands::Add { tag: "comets".into() }).unwrap();
    run_tags(
        &context,
        TagCommands::Rename {
            from: "luna".into(),
            to: "moon".into(),
        },
    )
    .unwrap();

    let counts = tag_counts(&context)
        .unwrap()
        .into_iter()
        .map(|count| (count.tag, count.notes))
        .collect::<Vec<_>>();
    assert_eq!(
        counts,
        vec![("comets".to_string(), 0), ("moon".to_string(), 2)]
    );
}

#[test]
fn export_writes_markdown_file() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("export.md");
    let context = AppContext::open_in_memory();
    add(&context, "Orion nebula", &["deep-sky"], 42);

    run_export(&context, ExportFormat::Markdown, Some(&output)).unwrap();

    let rendered = std::fs::read_to_string(&output).unwrap();
    assert!(rendered.contains("name: Orion nebula"));
    assert!(rendered.contains("timestamp: 42"));
    assert!(rendered.contains("  - deep-sky"));
}

#[tokio::test]
async fn sync_without_session_is_rejected() {
    let context = AppContext::open_in_memory();
    let error = crate::commands::sync::run_sync(&context).await.unwrap_err();
    assert!(error.to_string().contains("Not signed in"));
}

#[tokio::test]
async fn account_logout_clears_session_without_server() {
    let context = AppContext::open_in_memory();
    context
        .session()
        .save_session(&AuthSession {
            token: "tok".to_string(),
            user_id: "u1".to_string(),
            username: "hubble".to_string(),
            email: None,
        })
        .unwrap();

    crate::commands::account::run_account(&context, AccountCommands::Logout)
        .await
        .unwrap();

    assert!(context.current_session().unwrap().is_none());
}

#[test]
fn normalize_api_url_validates_scheme() {
    assert_eq!(
        normalize_api_url("https://sync.example.com/".to_string()).unwrap(),
        Some("https://sync.example.com".to_string())
    );
    assert_eq!(normalize_api_url("  ".to_string()).unwrap(), None);
    assert!(normalize_api_url("sync.example.com".to_string()).is_err());
}

#[test]
fn config_init_writes_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    run_config(
        ConfigCommands::Init {
            api_base_url: Some("http://localhost:8080/".to_string()),
            data_dir: Some(dir.path().join("data")),
        },
        Ok(AppConfig::default()),
        Some(&path),
    )
    .unwrap();

    let saved = AppConfig::load_from_path(&path).unwrap();
    assert_eq!(saved.api_base_url.as_deref(), Some("http://localhost:8080"));
    assert_eq!(saved.data_dir, Some(dir.path().join("data")));
}

#[test]
fn cli_parses_repeated_tags_and_global_flags() {
    let cli = Cli::try_parse_from([
        "starnote",
        "--data-dir",
        "/tmp/sn",
        "add",
        "--name",
        "Vega",
        "-t",
        "stars",
        "--tag",
        "summer",
        "bright",
        "and",
        "blue",
    ])
    .unwrap();

    assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/sn")));
    match cli.command {
        Some(Commands::Add {
            name, tags, body, ..
        }) => {
            assert_eq!(name.as_deref(), Some("Vega"));
            assert_eq!(tags, vec!["stars", "summer"]);
            assert_eq!(body, vec!["bright", "and", "blue"]);
        }
        _ => panic!("expected add command"),
    }
}

#[test]
fn cli_rejects_all_with_range() {
    assert!(Cli::try_parse_from(["starnote", "list", "--all", "--from", "2024-01-01"]).is_err());
}

#[test]
fn completions_mention_binary_and_subcommands() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("starnote"));
    assert!(script.contains("sky"));
}

#[test]
fn sky_mark_joins_multi_word_names() {
    let context = AppContext::open_in_memory();
    let cli = Cli::try_parse_from(["starnote", "sky", "mark", "ursa", "major"]).unwrap();
    let Some(Commands::Sky { command }) = cli.command else {
        panic!("expected sky command");
    };
    crate::commands::sky::run_sky(&context, command).unwrap();

    let observed = context
        .constellations()
        .list()
        .unwrap()
        .into_iter()
        .filter(|entry| entry.observed)
        .map(|entry| entry.name)
        .collect::<Vec<_>>();
    assert_eq!(observed, vec!["Ursa Major"]);
}
