use std::path::Path;

use starnote_core::export::render_notes_export;
use starnote_core::AppContext;

use crate::cli::ExportFormat;
use crate::error::CliError;

pub fn run_export(
    context: &AppContext,
    format: ExportFormat,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let notes = context.notes().list()?;
    let rendered = render_notes_export(&notes, format.into())?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
