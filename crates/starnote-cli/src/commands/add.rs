use starnote_core::store::NoteDraft;
use starnote_core::AppContext;

use crate::commands::common::{normalize_content, parse_optional_time, resolve_note_content};
use crate::error::CliError;

pub fn run_add(
    context: &AppContext,
    name: Option<&str>,
    tags: &[String],
    at: Option<&str>,
    body_parts: &[String],
) -> Result<(), CliError> {
    let timestamp = parse_optional_time(at)?;
    let name = name.and_then(normalize_content).unwrap_or_default();

    // A titled note may have an empty body; only prompt when there is no title
    let content = if name.is_empty() {
        resolve_note_content(body_parts)?
    } else {
        normalize_content(&body_parts.join(" ")).unwrap_or_default()
    };

    let note = context.notes().create(NoteDraft {
        name,
        content,
        tags: tags.to_vec(),
        timestamp,
    })?;

    println!("{}", note.id);
    Ok(())
}
