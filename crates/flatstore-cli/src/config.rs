//! Layered settings: TOML file, then environment, then flags.

use std::fs;
use std::path::{Path, PathBuf};

use flatstore_core::CatalogPaths;
use flatstore_error::{FlatError, Result};
use serde::Deserialize;

use crate::cli::Cli;

pub const ENV_APP_FILE: &str = "CSV_FILE_PATH";
pub const ENV_REVIEW_FILE: &str = "REVIEW_FILE_PATH";
pub const ENV_DEBUG: &str = "DEBUG";
pub const ENV_DEVELOPMENT: &str = "IS_DEVELOPMENT";

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub app_file: PathBuf,
    pub review_file: PathBuf,
    pub debug: bool,
    /// Human-readable logs instead of JSON.
    pub development: bool,
}

impl Settings {
    #[must_use]
    pub fn catalog_paths(&self) -> CatalogPaths {
        CatalogPaths {
            app_file: self.app_file.clone(),
            review_file: self.review_file.clone(),
        }
    }
}

/// Shape of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    app_file: Option<PathBuf>,
    review_file: Option<PathBuf>,
    debug: Option<bool>,
    development: Option<bool>,
}

fn load_file(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path).map_err(|err| FlatError::io(path, err))?;
    toml::from_str(&text)
        .map_err(|err| FlatError::config(format!("{}: {err}", path.display())))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(FlatError::config(format!("{name} must be a boolean, got {raw:?}"))),
    }
}

/// Resolve settings for `cli`. `env` looks up one environment variable.
pub fn resolve<F>(cli: &Cli, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match &cli.config {
        Some(path) => load_file(path)?,
        None => FileConfig::default(),
    };

    let mut app_file = file.app_file;
    let mut review_file = file.review_file;
    let mut debug = file.debug.unwrap_or(false);
    let mut development = file.development.unwrap_or(false);

    if let Some(value) = env(ENV_APP_FILE).filter(|v| !v.trim().is_empty()) {
        app_file = Some(PathBuf::from(value));
    }
    if let Some(value) = env(ENV_REVIEW_FILE).filter(|v| !v.trim().is_empty()) {
        review_file = Some(PathBuf::from(value));
    }
    if let Some(value) = env(ENV_DEBUG) {
        debug = parse_bool(ENV_DEBUG, &value)?;
    }
    if let Some(value) = env(ENV_DEVELOPMENT) {
        development = parse_bool(ENV_DEVELOPMENT, &value)?;
    }

    if let Some(path) = &cli.app_file {
        app_file = Some(path.clone());
    }
    if let Some(path) = &cli.review_file {
        review_file = Some(path.clone());
    }
    debug |= cli.debug;

    let app_file = app_file.ok_or_else(|| {
        FlatError::config(format!("no app file: pass --app-file or set {ENV_APP_FILE}"))
    })?;
    let review_file = review_file.ok_or_else(|| {
        FlatError::config(format!(
            "no review file: pass --review-file or set {ENV_REVIEW_FILE}"
        ))
    })?;

    Ok(Settings {
        app_file,
        review_file,
        debug,
        development,
    })
}
