//! In-memory model of a Qt `.ts` translation catalog.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FormatError;

/// Format version written by current Qt tooling.
pub const DEFAULT_VERSION: &str = "2.1";

/// Translation status carried by the `type` attribute of `<translation>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    /// No `type` attribute: the translator signed the entry off.
    #[default]
    Finished,
    /// `type="unfinished"`: empty or still under review.
    Unfinished,
    /// `type="vanished"`: the source string left the application.
    Vanished,
    /// `type="obsolete"`: legacy spelling of vanished.
    Obsolete,
}

impl TranslationStatus {
    /// Parse the `type` attribute value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(Self::Finished),
            "unfinished" => Some(Self::Unfinished),
            "vanished" => Some(Self::Vanished),
            "obsolete" => Some(Self::Obsolete),
            _ => None,
        }
    }

    /// The `type` attribute value, or `None` for finished entries.
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
            Self::Obsolete => Some("obsolete"),
        }
    }

    /// Whether the entry is kept for translator history only.
    pub fn is_retired(&self) -> bool {
        matches!(self, Self::Vanished | Self::Obsolete)
    }
}

/// Where a message appears in the application sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: Option<u32>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// One translatable unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<String>,
    pub source: String,
    pub old_source: Option<String>,
    /// Disambiguation; empty when the message has none.
    pub comment: String,
    pub old_comment: Option<String>,
    pub extra_comment: Option<String>,
    pub translator_comment: Option<String>,
    pub numerus: bool,
    pub translation: String,
    pub numerus_forms: Vec<String>,
    pub status: TranslationStatus,
    pub locations: Vec<Location>,
}

impl Message {
    /// Create a finished message.
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            ..Self::default()
        }
    }

    /// Set the disambiguation comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Set the translation status.
    pub fn with_status(mut self, status: TranslationStatus) -> Self {
        self.status = status;
        self
    }

    /// Turn this into a plural message with the given forms.
    pub fn with_numerus_forms<I, S>(mut self, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numerus = true;
        self.numerus_forms = forms.into_iter().map(Into::into).collect();
        self
    }

    /// Add a provenance marker.
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.locations.push(Location::new(file, Some(line)));
        self
    }

    /// Whether any translated text is present.
    pub fn has_translation(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().any(|f| !f.is_empty())
        } else {
            !self.translation.is_empty()
        }
    }
}

/// A named group of messages, usually one UI class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Builder form of [`Context::push`].
    pub fn with_message(mut self, message: Message) -> Self {
        self.push(message);
        self
    }
}

/// A parsed `.ts` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationCatalog {
    pub version: String,
    pub target_language: Option<String>,
    pub source_language: Option<String>,
    pub contexts: Vec<Context>,
}

impl TranslationCatalog {
    /// Create an empty catalog for a target language.
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            target_language: Some(target_language.into()),
            source_language: None,
            contexts: Vec::new(),
        }
    }

    /// Append a context.
    pub fn push(&mut self, context: Context) {
        self.contexts.push(context);
    }

    /// Builder form of [`TranslationCatalog::push`].
    pub fn with_context(mut self, context: Context) -> Self {
        self.push(context);
        self
    }

    /// First context with the given name.
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Iterate over every message together with its context name.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    /// Count messages by status.
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            contexts: self.contexts.len(),
            ..CatalogStats::default()
        };
        for (_, message) in self.messages() {
            stats.messages += 1;
            match message.status {
                TranslationStatus::Vanished => stats.vanished += 1,
                TranslationStatus::Obsolete => stats.obsolete += 1,
                _ if !message.has_translation() => stats.untranslated += 1,
                TranslationStatus::Unfinished => stats.unfinished += 1,
                TranslationStatus::Finished => stats.finished += 1,
            }
        }
        stats
    }
}

impl Default for TranslationCatalog {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            target_language: None,
            source_language: None,
            contexts: Vec::new(),
        }
    }
}

impl FromStr for TranslationCatalog {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::reader::parse_catalog(s.as_bytes())
    }
}

/// Message counts of a catalog, in the spirit of `lrelease`'s summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub contexts: usize,
    pub messages: usize,
    pub finished: usize,
    /// Non-empty translations still marked unfinished.
    pub unfinished: usize,
    /// Live messages with no translated text.
    pub untranslated: usize,
    pub vanished: usize,
    pub obsolete: usize,
}
