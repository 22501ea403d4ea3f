//! Configuration types.

use lingo_common_i18n::{detect_locale_with_override, LoaderConfig, Locale, LookupOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LingoConfig {
    /// Directory holding the `.ts` catalogs. Relative paths are resolved
    /// against the project directory.
    pub translations_dir: PathBuf,
    /// Catalog file name prefix; `RedPandaIDE` gives `RedPandaIDE_zh_CN.ts`.
    pub file_prefix: String,
    /// Catalog file extension without the dot.
    pub extension: String,
    /// Locale to start in. Detected from the environment when unset.
    pub default_locale: Option<String>,
    /// Lookup behaviour.
    pub lookup: LookupOptions,
}

impl Default for LingoConfig {
    fn default() -> Self {
        let loader = LoaderConfig::default();
        Self {
            translations_dir: loader.locale_dir,
            file_prefix: loader.domain,
            extension: loader.extension,
            default_locale: None,
            lookup: LookupOptions::default(),
        }
    }
}

impl LingoConfig {
    /// Where and how catalog files are found.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            locale_dir: self.translations_dir.clone(),
            domain: self.file_prefix.clone(),
            extension: self.extension.clone(),
        }
    }

    pub fn lookup_options(&self) -> LookupOptions {
        self.lookup
    }

    /// Configured locale, or the one detected from the environment.
    pub fn initial_locale(&self) -> Locale {
        detect_locale_with_override(self.default_locale.as_deref())
    }
}
