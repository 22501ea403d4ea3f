//! Immutable lookup index built from a catalog.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::trace;

use crate::catalog::{CatalogStats, TranslationCatalog, TranslationStatus};
use crate::plural::PluralRule;
use crate::Locale;

/// Composite lookup key. An empty `comment` means no disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    pub comment: String,
}

impl MessageKey {
    pub fn new(context: &str, source: &str, comment: Option<&str>) -> Self {
        Self {
            context: context.to_string(),
            source: source.to_string(),
            comment: comment.unwrap_or_default().to_string(),
        }
    }
}

/// Knobs for building and querying a [`Translator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupOptions {
    /// Serve non-empty translations still marked unfinished.
    pub include_unfinished: bool,
    /// Retry a miss with a comment against the entry without one.
    pub comment_fallback: bool,
    /// Emit a trace event for every lookup miss.
    pub log_misses: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            include_unfinished: true,
            comment_fallback: false,
            log_misses: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Singular(String),
    Plural(Vec<String>),
}

/// Read-only translation table for one locale.
///
/// Only servable messages are indexed: vanished and obsolete entries never
/// make it in, so they cannot shadow a live message. When a context holds the
/// same `(source, comment)` twice, the last servable occurrence wins.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Option<Locale>,
    rule: PluralRule,
    options: LookupOptions,
    entries: HashMap<MessageKey, Entry>,
    stats: CatalogStats,
}

impl Translator {
    /// A translator with no catalog: every lookup falls back to the source.
    pub fn identity() -> Self {
        Self {
            locale: None,
            rule: PluralRule::default(),
            options: LookupOptions::default(),
            entries: HashMap::new(),
            stats: CatalogStats::default(),
        }
    }

    /// Index a catalog with default options.
    pub fn new(catalog: &TranslationCatalog) -> Self {
        Self::with_options(catalog, LookupOptions::default())
    }

    /// Index a catalog.
    pub fn with_options(catalog: &TranslationCatalog, options: LookupOptions) -> Self {
        let locale = catalog.target_language.as_deref().and_then(Locale::parse);
        let rule = locale
            .as_ref()
            .map(Locale::plural_rule)
            .unwrap_or_default();

        let mut entries = HashMap::new();
        for (context, message) in catalog.messages() {
            let servable = match message.status {
                TranslationStatus::Vanished | TranslationStatus::Obsolete => false,
                TranslationStatus::Unfinished => options.include_unfinished,
                TranslationStatus::Finished => true,
            };
            if !servable || !message.has_translation() {
                continue;
            }
            let entry = if message.numerus && !message.numerus_forms.is_empty() {
                Entry::Plural(message.numerus_forms.clone())
            } else {
                Entry::Singular(message.translation.clone())
            };
            let key = MessageKey::new(context, &message.source, Some(&message.comment));
            entries.insert(key, entry);
        }

        Self {
            locale,
            rule,
            options,
            entries,
            stats: catalog.stats(),
        }
    }

    /// Target locale declared by the catalog, if any.
    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn plural_rule(&self) -> PluralRule {
        self.rule
    }

    pub fn options(&self) -> LookupOptions {
        self.options
    }

    /// Counts of the catalog this translator was built from.
    pub fn stats(&self) -> &CatalogStats {
        &self.stats
    }

    /// Number of servable entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a servable translation exists for the key.
    pub fn contains(&self, context: &str, source: &str, comment: Option<&str>) -> bool {
        self.entry(context, source, comment).is_some()
    }

    /// The translated text for the key, without fallback or `%n` expansion.
    pub fn find(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        count: Option<i64>,
    ) -> Option<&str> {
        let text = match self.entry(context, source, comment)? {
            Entry::Singular(text) => text.as_str(),
            Entry::Plural(forms) => {
                let index = count.map_or(0, |n| self.rule.index(n));
                let form = forms.get(index).or_else(|| forms.last())?;
                form.as_str()
            }
        };
        (!text.is_empty()).then_some(text)
    }

    /// Display string for a UI text; never fails.
    ///
    /// Falls back to `source` when nothing servable exists. With a `count`,
    /// the plural form is chosen by the locale's rule and `%n` is replaced
    /// by the count, in the fallback as well.
    pub fn lookup<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
        count: Option<i64>,
    ) -> Cow<'a, str> {
        let text = match self.find(context, source, comment, count) {
            Some(text) => text,
            None => {
                if self.options.log_misses {
                    trace!(context, source, comment, "LookupMiss");
                }
                source
            }
        };
        match count {
            Some(n) if text.contains("%n") => Cow::Owned(text.replace("%n", &n.to_string())),
            _ => Cow::Borrowed(text),
        }
    }

    /// Shorthand for a singular lookup without disambiguation.
    pub fn tr<'a>(&'a self, context: &str, source: &'a str) -> Cow<'a, str> {
        self.lookup(context, source, None, None)
    }

    fn entry(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Entry> {
        let key = MessageKey::new(context, source, comment);
        if let Some(entry) = self.entries.get(&key) {
            return Some(entry);
        }
        if self.options.comment_fallback && !key.comment.is_empty() {
            let bare = MessageKey {
                comment: String::new(),
                ..key
            };
            return self.entries.get(&bare);
        }
        None
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Context, Message};

    fn catalog() -> TranslationCatalog {
        TranslationCatalog::new("zh_CN")
            .with_context(
                Context::new("AboutDialog")
                    .with_message(Message::new("About", "关于"))
                    .with_message(
                        Message::new("Version: ", "版本：")
                            .with_status(TranslationStatus::Unfinished),
                    ),
            )
            .with_context(
                Context::new("CompilerAutolinkWidget").with_message(
                    Message::new("Save failed.", "").with_status(TranslationStatus::Unfinished),
                ),
            )
            .with_context(
                Context::new("MainWindow")
                    .with_message(
                        Message::new("All files (*.*)", "...所有文件 (*.*)")
                            .with_status(TranslationStatus::Vanished),
                    )
                    .with_message(Message::new("Open", "打开").with_comment("menu"))
                    .with_message(Message::new("Open", "开启"))
                    .with_message(
                        Message::new("%n file(s) changed", "")
                            .with_numerus_forms(["已修改 %n 个文件"]),
                    ),
            )
    }

    #[test]
    fn test_finished_translation_is_served() {
        let tr = Translator::new(&catalog());
        assert_eq!(tr.lookup("AboutDialog", "About", None, None), "关于");
        assert_eq!(tr.tr("AboutDialog", "About"), "关于");
    }

    #[test]
    fn test_empty_translation_falls_back() {
        let tr = Translator::new(&catalog());
        assert_eq!(
            tr.lookup("CompilerAutolinkWidget", "Save failed.", None, None),
            "Save failed."
        );
    }

    #[test]
    fn test_vanished_translation_is_never_served() {
        let tr = Translator::new(&catalog());
        assert_eq!(tr.tr("MainWindow", "All files (*.*)"), "All files (*.*)");
        assert!(!tr.contains("MainWindow", "All files (*.*)", None));
    }

    #[test]
    fn test_missing_context_is_identity() {
        let tr = Translator::new(&catalog());
        assert_eq!(tr.tr("NoSuchContext", "Hello"), "Hello");
        assert!(matches!(tr.tr("NoSuchContext", "Hello"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unfinished_translation_respects_option() {
        let tr = Translator::new(&catalog());
        assert_eq!(tr.tr("AboutDialog", "Version: "), "版本：");

        let strict = Translator::with_options(
            &catalog(),
            LookupOptions {
                include_unfinished: false,
                ..LookupOptions::default()
            },
        );
        assert_eq!(strict.tr("AboutDialog", "Version: "), "Version: ");
        assert_eq!(strict.tr("AboutDialog", "About"), "关于");
    }

    #[test]
    fn test_comment_disambiguates() {
        let tr = Translator::new(&catalog());
        assert_eq!(tr.lookup("MainWindow", "Open", Some("menu"), None), "打开");
        assert_eq!(tr.lookup("MainWindow", "Open", None, None), "开启");
        assert_eq!(tr.lookup("MainWindow", "Open", Some(""), None), "开启");
        assert_eq!(tr.lookup("MainWindow", "Open", Some("toolbar"), None), "Open");
    }

    #[test]
    fn test_comment_fallback_option() {
        let tr = Translator::with_options(
            &catalog(),
            LookupOptions {
                comment_fallback: true,
                ..LookupOptions::default()
            },
        );
        assert_eq!(tr.lookup("MainWindow", "Open", Some("toolbar"), None), "开启");
        assert_eq!(tr.lookup("MainWindow", "Open", Some("menu"), None), "打开");
    }

    #[test]
    fn test_numerus_lookup_substitutes_count() {
        let tr = Translator::new(&catalog());
        assert_eq!(tr.plural_rule(), PluralRule::One);
        assert_eq!(
            tr.lookup("MainWindow", "%n file(s) changed", None, Some(3)),
            "已修改 3 个文件"
        );
        assert_eq!(
            tr.lookup("MainWindow", "%n file(s) changed", None, Some(1)),
            "已修改 1 个文件"
        );
        // without a count the first form is served verbatim
        assert_eq!(
            tr.lookup("MainWindow", "%n file(s) changed", None, None),
            "已修改 %n 个文件"
        );
    }

    #[test]
    fn test_count_is_substituted_into_fallback() {
        let tr = Translator::new(&catalog());
        assert_eq!(tr.lookup("Nowhere", "%n item(s)", None, Some(7)), "7 item(s)");
        assert_eq!(tr.lookup("Nowhere", "%n item(s)", None, None), "%n item(s)");
    }

    #[test]
    fn test_english_plural_forms_selected_by_rule() {
        let catalog = TranslationCatalog::new("en_GB").with_context(
            Context::new("FilesModel").with_message(
                Message::new("%n file(s)", "").with_numerus_forms(["%n file", "%n files"]),
            ),
        );
        let tr = Translator::new(&catalog);
        assert_eq!(tr.lookup("FilesModel", "%n file(s)", None, Some(1)), "1 file");
        assert_eq!(tr.lookup("FilesModel", "%n file(s)", None, Some(0)), "0 files");
        assert_eq!(tr.lookup("FilesModel", "%n file(s)", None, Some(2)), "2 files");
    }

    #[test]
    fn test_missing_plural_form_clamps_to_last() {
        let catalog = TranslationCatalog::new("ru").with_context(
            Context::new("C").with_message(
                Message::new("%n day(s)", "").with_numerus_forms(["%n день", "%n дня"]),
            ),
        );
        let tr = Translator::new(&catalog);
        // the rule asks for form 2, which the translator did not provide
        assert_eq!(tr.lookup("C", "%n day(s)", None, Some(5)), "5 дня");
    }

    #[test]
    fn test_empty_plural_form_falls_back() {
        let catalog = TranslationCatalog::new("en").with_context(
            Context::new("C").with_message(
                Message::new("%n dog(s)", "").with_numerus_forms(["%n dog", ""]),
            ),
        );
        let tr = Translator::new(&catalog);
        assert_eq!(tr.lookup("C", "%n dog(s)", None, Some(1)), "1 dog");
        assert_eq!(tr.lookup("C", "%n dog(s)", None, Some(4)), "4 dog(s)");
    }

    #[test]
    fn test_duplicates_last_servable_wins() {
        let catalog = TranslationCatalog::new("zh_CN").with_context(
            Context::new("C")
                .with_message(Message::new("Run", "运行"))
                .with_message(Message::new("Run", "执行"))
                .with_message(Message::new("Run", "跑").with_status(TranslationStatus::Vanished)),
        );
        let tr = Translator::new(&catalog);
        assert_eq!(tr.tr("C", "Run"), "执行");
        assert_eq!(tr.len(), 1);
    }

    #[test]
    fn test_identity_translator() {
        let tr = Translator::identity();
        assert!(tr.is_empty());
        assert!(tr.locale().is_none());
        assert_eq!(tr.tr("AboutDialog", "About"), "About");
    }

    #[test]
    fn test_translator_carries_locale_and_stats() {
        let tr = Translator::new(&catalog());
        assert_eq!(tr.locale().map(Locale::code), Some("zh_CN".to_string()));
        assert_eq!(tr.stats().vanished, 1);
        assert_eq!(tr.len(), 5);
    }
}
