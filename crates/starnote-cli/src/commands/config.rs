use std::path::{Path, PathBuf};

use starnote_core::config::{default_config_path, AppConfig};
use starnote_core::util::{is_http_url, non_blank};

use crate::cli::ConfigCommands;
use crate::commands::common::print_json;
use crate::error::CliError;

pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, CliError> {
    explicit
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .ok_or_else(|| CliError::Config("Could not determine a config directory".into()))
}

pub fn normalize_api_url(url: String) -> Result<Option<String>, CliError> {
    let Some(url) = non_blank(Some(url)) else {
        return Ok(None);
    };
    if !is_http_url(&url) {
        return Err(CliError::Config(format!(
            "api_base_url '{url}' must include http:// or https://"
        )));
    }
    Ok(Some(url.trim_end_matches('/').to_string()))
}

/// `config` runs before the context is opened so a broken config can be fixed
pub fn run_config(
    command: ConfigCommands,
    effective: Result<AppConfig, CliError>,
    explicit_path: Option<&Path>,
) -> Result<(), CliError> {
    let path = config_path(explicit_path)?;
    match command {
        ConfigCommands::Show => {
            println!("# {}", path.display());
            print_json(&effective?)
        }
        ConfigCommands::Init {
            api_base_url,
            data_dir,
        } => {
            let mut config = AppConfig::load_from_path(&path)?;
            if let Some(url) = api_base_url {
                config.api_base_url = normalize_api_url(url)?;
            }
            if let Some(dir) = data_dir {
                config.data_dir = Some(dir);
            }
            config.save_to_path(&path)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
