//! Catalog file resolution and loading.

use lingo_common_log::spans::{catalog_span, record_error, Timer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::TranslationCatalog;
use crate::detect::locale_fallback_chain;
use crate::error::I18nError;
use crate::reader::load_catalog_file;
use crate::Locale;

/// Where catalogs live and how they are named.
///
/// A catalog for `zh_CN` is looked up as `{locale_dir}/{domain}_zh_CN.{extension}`,
/// then `{domain}_zh.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Directory containing catalog files.
    pub locale_dir: PathBuf,
    /// File name prefix (e.g., "RedPandaIDE").
    pub domain: String,
    /// File extension without the dot.
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            locale_dir: PathBuf::from("translations"),
            domain: "lingo".to_string(),
            extension: "ts".to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn new(locale_dir: impl Into<PathBuf>, domain: impl Into<String>) -> Self {
        Self {
            locale_dir: locale_dir.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Path of the catalog file for exactly this locale.
    pub fn path_for(&self, locale: &Locale) -> PathBuf {
        self.locale_dir
            .join(format!("{}_{}.{}", self.domain, locale.code(), self.extension))
    }

    /// Candidate files in the order they are tried.
    pub fn candidate_paths(&self, locale: &Locale) -> Vec<PathBuf> {
        locale_fallback_chain(locale)
            .iter()
            .map(|l| self.path_for(l))
            .collect()
    }

    /// First existing catalog file for the locale.
    pub fn resolve(&self, locale: &Locale) -> Result<PathBuf, I18nError> {
        let candidates = self.candidate_paths(locale);
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(I18nError::NotFound {
                locale: locale.code(),
                searched: candidates,
            }),
        }
    }

    /// Locales with a catalog file in `locale_dir`, sorted by code.
    pub fn available_locales(&self) -> Result<Vec<Locale>, I18nError> {
        let entries = fs::read_dir(&self.locale_dir).map_err(|source| I18nError::Io {
            path: self.locale_dir.clone(),
            source,
        })?;

        let prefix = format!("{}_", self.domain);
        let suffix = format!(".{}", self.extension);
        let mut locales: Vec<Locale> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| {
                let code = name.strip_prefix(&prefix)?.strip_suffix(&suffix)?;
                Locale::parse(code)
            })
            .collect();
        locales.sort_by_key(Locale::code);
        locales.dedup();
        Ok(locales)
    }
}

/// Load the catalog for a locale, following the fallback chain.
pub fn load_catalog(config: &LoaderConfig, locale: &Locale) -> Result<TranslationCatalog, I18nError> {
    let path = config.resolve(locale)?;
    load_path(&path)
}

pub(crate) fn load_path(path: &Path) -> Result<TranslationCatalog, I18nError> {
    let span = catalog_span("read", &path.display().to_string());
    let _guard = span.enter();

    debug!("loading translation catalog");
    let timer = Timer::start("load_catalog");
    let catalog = load_catalog_file(path).map_err(|e| {
        record_error(&e);
        e
    })?;
    timer.finish();
    debug!(contexts = catalog.contexts.len(), "parsed translation catalog");
    Ok(catalog)
}
