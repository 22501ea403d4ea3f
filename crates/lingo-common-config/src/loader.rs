//! Configuration file loading and parsing.

use crate::env::{EnvError, Environment};
use crate::types::LingoConfig;
use lingo_common_i18n::Locale;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Config file location relative to the project directory.
pub const CONFIG_FILE: &str = ".lingo/config.yaml";

/// Catalog extensions the loader can read.
const KNOWN_EXTENSIONS: &[&str] = &["ts"];

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_FILE)
    }

    /// Load configuration from `.lingo/config.yaml`, falling back to
    /// defaults when the file does not exist.
    pub fn load(&self) -> Result<LingoConfig, ConfigError> {
        let config = self.read_default()?;
        self.finish(config)
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LingoConfig, ConfigError> {
        let config = self.read(path.as_ref())?;
        self.finish(config)
    }

    /// Load `.env` files from the project directory, then the config file
    /// (or `LINGO_CONFIG_PATH`), then apply `LINGO_*` overrides. Validation
    /// runs once, on the overridden values.
    pub fn load_with_env(&self) -> Result<LingoConfig, ConfigError> {
        Environment::init_in(&self.base_path)?;
        let mut config = match Environment::get(crate::env::vars::LINGO_CONFIG_PATH) {
            Some(path) => self.read(&self.base_path.join(path))?,
            None => self.read_default()?,
        };
        Environment::apply_overrides(&mut config)?;
        self.finish(config)
    }

    fn read_default(&self) -> Result<LingoConfig, ConfigError> {
        let config_path = self.config_path();
        if !config_path.exists() {
            debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(LingoConfig::default());
        }
        self.read(&config_path)
    }

    /// Parse a config file without resolving or validating it.
    fn read(&self, path: &Path) -> Result<LingoConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&contents)?;

        let config = if expanded.trim().is_empty() {
            LingoConfig::default()
        } else {
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    fn finish(&self, mut config: LingoConfig) -> Result<LingoConfig, ConfigError> {
        if config.translations_dir.is_relative() {
            config.translations_dir = self.base_path.join(&config.translations_dir);
        }
        self.validate(&config)?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self, config: &LingoConfig) -> Result<(), ConfigError> {
        if config.file_prefix.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "file_prefix must not be empty".to_string(),
            });
        }

        if config.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError {
                message: "file_prefix must not contain path separators".to_string(),
            });
        }

        if !KNOWN_EXTENSIONS.contains(&config.extension.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!("unsupported catalog extension: {}", config.extension),
            });
        }

        if let Some(locale) = &config.default_locale {
            if Locale::parse(locale).is_none() {
                return Err(ConfigError::ValidationError {
                    message: format!("default_locale is not a locale: {locale}"),
                });
            }
        }

        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &LingoConfig) -> Result<(), ConfigError> {
        let config_path = self.config_path();
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(config_path, yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| {
        ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        }
    })?;

    let mut result = String::with_capacity(content.len());
    let mut last = 0;
    for cap in re.captures_iter(content) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result.push_str(&content[last..full_match.start()]);
        result.push_str(&value);
        last = full_match.end();
    }
    result.push_str(&content[last..]);

    Ok(result)
}
