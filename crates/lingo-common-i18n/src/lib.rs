//! Qt translation catalogs for Lingo.
//!
//! Reads Qt Linguist `.ts` documents, indexes them for lookup and swaps the
//! active catalog when the display language changes.

pub mod catalog;
pub mod detect;
pub mod error;
pub mod loader;
pub mod plural;
pub mod reader;
pub mod service;
pub mod translator;
pub mod writer;

use std::fmt;
use std::str::FromStr;

use plural::PluralRule;

/// A locale identifier such as `zh_CN` or `en`.
///
/// Parsing accepts POSIX (`zh_CN.UTF-8@euro`) and BCP 47 (`zh-Hans-CN`)
/// spellings and normalises them to `language[_TERRITORY]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    territory: Option<String>,
}

impl Locale {
    /// Parse from a locale string (e.g., "en-US", "zh_CN.UTF-8").
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.split(['.', '@']).next()?;
        let mut parts = s.split(['_', '-']);

        let language = parts.next()?;
        if !(2..=3).contains(&language.len()) || !language.bytes().all(|b| b.is_ascii_alphabetic()) {
            return None;
        }

        let mut territory = None;
        for part in parts {
            let is_region = (part.len() == 2 && part.bytes().all(|b| b.is_ascii_alphabetic()))
                || (part.len() == 3 && part.bytes().all(|b| b.is_ascii_digit()));
            let is_script = part.len() == 4 && part.bytes().all(|b| b.is_ascii_alphabetic());
            if is_region {
                territory = Some(part.to_ascii_uppercase());
                break;
            } else if !is_script {
                return None;
            }
        }

        Some(Self {
            language: language.to_ascii_lowercase(),
            territory,
        })
    }

    /// Locale for a bare language code.
    pub fn language_only(language: &str) -> Option<Self> {
        Self::parse(language).map(|l| Self {
            territory: None,
            ..l
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn territory(&self) -> Option<&str> {
        self.territory.as_deref()
    }

    /// Get the code in Qt's file-name form (`zh_CN`).
    pub fn code(&self) -> String {
        match &self.territory {
            Some(territory) => format!("{}_{}", self.language, territory),
            None => self.language.clone(),
        }
    }

    /// Native display name for common UI languages.
    pub fn display_name(&self) -> Option<&'static str> {
        let name = match (self.language.as_str(), self.territory.as_deref()) {
            ("zh", Some("TW" | "HK" | "MO")) => "中文(繁體)",
            ("zh", _) => "中文(简体)",
            ("en", _) => "English",
            ("es", _) => "Español",
            ("fr", _) => "Français",
            ("de", _) => "Deutsch",
            ("ja", _) => "日本語",
            ("ko", _) => "한국어",
            ("pt", Some("BR")) => "Português (Brasil)",
            ("pt", _) => "Português",
            ("ru", _) => "Русский",
            _ => return None,
        };
        Some(name)
    }

    /// Plural rule for this locale.
    pub fn plural_rule(&self) -> PluralRule {
        PluralRule::for_language(&self.language, self.territory.as_deref())
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            territory: None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| I18nError::InvalidLocale(s.to_string()))
    }
}

/// Translation macro.
///
/// ```ignore
/// let label = tr!(service, "AboutDialog", "About");
/// let entry = tr!(service, "MainWindow", "Open", comment = "menu");
/// let count = tr!(service, "MainWindow", "%n file(s)", n = 3);
/// ```
#[macro_export]
macro_rules! tr {
    ($service:expr, $context:expr, $source:expr) => {
        $service.lookup($context, $source, None, None)
    };
    ($service:expr, $context:expr, $source:expr, comment = $comment:expr) => {
        $service.lookup($context, $source, Some($comment), None)
    };
    ($service:expr, $context:expr, $source:expr, n = $count:expr) => {
        $service.lookup($context, $source, None, Some(i64::from($count)))
    };
    ($service:expr, $context:expr, $source:expr, comment = $comment:expr, n = $count:expr) => {
        $service.lookup($context, $source, Some($comment), Some(i64::from($count)))
    };
}

pub use catalog::{CatalogStats, Context, Location, Message, TranslationCatalog, TranslationStatus};
pub use detect::{detect_locale, detect_locale_with_override, locale_fallback_chain};
pub use error::{FormatError, FormatErrorKind, I18nError};
pub use loader::{load_catalog, LoaderConfig};
pub use reader::{load_catalog_file, parse_catalog};
pub use service::{LocaleService, SubscriptionId};
pub use translator::{LookupOptions, MessageKey, Translator};
pub use writer::{save_catalog_file, write_catalog};
