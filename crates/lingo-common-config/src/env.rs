//! Environment variable handling.

use crate::types::LingoConfig;
use lingo_common_i18n::Locale;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("required environment variable not set: {var}")]
    NotSet { var: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const LINGO_CONFIG_PATH: &str = "LINGO_CONFIG_PATH";
    pub const LINGO_TRANSLATIONS_DIR: &str = "LINGO_TRANSLATIONS_DIR";
    pub const LINGO_LOCALE: &str = "LINGO_LOCALE";
    pub const LINGO_LOG_MISSES: &str = "LINGO_LOG_MISSES";

    // Development
    pub const LINGO_ENV: &str = "LINGO_ENV";
}

/// Environment configuration.
pub struct Environment {
    _guard: (), // Prevent construction outside module
}

impl Environment {
    /// Initialize environment from .env files in the working directory.
    pub fn init() -> Result<Self, EnvError> {
        Self::init_in(env::current_dir().unwrap_or_default())
    }

    /// Initialize environment from .env files in `dir`. Variables already
    /// set in the process are kept.
    pub fn init_in(dir: impl AsRef<Path>) -> Result<Self, EnvError> {
        let dir = dir.as_ref();

        // Load .env files in order (earlier wins, since set vars are kept)
        let mut files: Vec<PathBuf> = Vec::new();
        if let Ok(mode) = env::var(vars::LINGO_ENV) {
            files.push(dir.join(format!(".env.{}", mode)));
        }
        files.push(dir.join(".env.local"));
        files.push(dir.join(".env"));

        for file in files {
            match dotenvy::from_path(&file) {
                Ok(()) => {}
                Err(e) if e.not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self { _guard: () })
    }

    /// Get a required string variable.
    pub fn require(var: &str) -> Result<String, EnvError> {
        env::var(var).map_err(|_| EnvError::NotSet { var: var.to_string() })
    }

    /// Get an optional string variable. Empty values count as unset.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    pub fn get_or(var: &str, default: &str) -> String {
        Self::get(var).unwrap_or_else(|| default.to_string())
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        Self::get(var).map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
    }

    /// Locale requested through `LINGO_LOCALE`.
    pub fn locale() -> Result<Option<Locale>, EnvError> {
        match Self::get(vars::LINGO_LOCALE) {
            Some(value) => Locale::parse(&value)
                .map(Some)
                .ok_or_else(|| EnvError::InvalidValue {
                    var: vars::LINGO_LOCALE.to_string(),
                    message: format!("not a locale: {value}"),
                }),
            None => Ok(None),
        }
    }

    /// Apply `LINGO_*` overrides on top of file configuration.
    pub fn apply_overrides(config: &mut LingoConfig) -> Result<(), EnvError> {
        if let Some(dir) = Self::get(vars::LINGO_TRANSLATIONS_DIR) {
            config.translations_dir = PathBuf::from(dir);
        }
        if let Some(locale) = Self::locale()? {
            config.default_locale = Some(locale.code());
        }
        if let Some(log_misses) = Self::get_bool(vars::LINGO_LOG_MISSES) {
            config.lookup.log_misses = log_misses;
        }
        Ok(())
    }
}
