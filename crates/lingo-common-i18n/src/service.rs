//! Active-catalog ownership and language switching.

use lingo_common_log::spans::{locale_span, record_error};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::TranslationCatalog;
use crate::error::I18nError;
use crate::loader::{self, LoaderConfig};
use crate::translator::{LookupOptions, Translator};
use crate::Locale;

type Listener = Arc<dyn Fn(&Locale) + Send + Sync>;

/// Handle returned by [`LocaleService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
struct Active {
    locale: Locale,
    translator: Arc<Translator>,
}

/// Owns the translator the UI reads from and replaces it wholesale when the
/// display language changes.
///
/// Catalogs are parsed before the write lock is taken; the lock only guards
/// the pointer swap, so readers always see a complete translator. A failed
/// switch leaves the previous translator in place.
pub struct LocaleService {
    config: LoaderConfig,
    options: LookupOptions,
    source_locale: Locale,
    active: RwLock<Active>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl LocaleService {
    /// Create a service that starts untranslated, in English.
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_options(config, LookupOptions::default())
    }

    pub fn with_options(config: LoaderConfig, options: LookupOptions) -> Self {
        let source_locale = Locale::default();
        Self {
            config,
            options,
            active: RwLock::new(Active {
                locale: source_locale.clone(),
                translator: Arc::new(Translator::identity()),
            }),
            source_locale,
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Language the application's strings are written in. Switching to it
    /// needs no catalog.
    pub fn with_source_locale(mut self, locale: Locale) -> Self {
        self.active.get_mut().locale = locale.clone();
        self.source_locale = locale;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn options(&self) -> LookupOptions {
        self.options
    }

    pub fn current_locale(&self) -> Locale {
        self.active.read().locale.clone()
    }

    /// The active translator. Holding the snapshot keeps it alive across a
    /// concurrent switch.
    pub fn snapshot(&self) -> Arc<Translator> {
        Arc::clone(&self.active.read().translator)
    }

    /// Display string for a UI text; never fails.
    pub fn lookup(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        count: Option<i64>,
    ) -> String {
        self.snapshot()
            .lookup(context, source, comment, count)
            .into_owned()
    }

    /// Load the catalog for `locale` and make it active.
    ///
    /// Switching to the source language without a catalog on disk activates
    /// the identity translator.
    pub fn switch_locale(&self, locale: &Locale) -> Result<Arc<Translator>, I18nError> {
        let span = locale_span(&locale.code());
        let _guard = span.enter();

        match loader::load_catalog(&self.config, locale) {
            Ok(catalog) => Ok(self.install(locale.clone(), &catalog)),
            Err(I18nError::NotFound { .. })
                if locale.language() == self.source_locale.language() =>
            {
                Ok(self.activate(locale.clone(), Translator::identity()))
            }
            Err(err) => {
                record_error(&err);
                warn!(locale = %locale, error = %err, "keeping previous catalog");
                Err(err)
            }
        }
    }

    /// Load a specific catalog file and make it active.
    ///
    /// The locale is taken from the catalog's `language` attribute.
    pub fn switch_to_file(&self, path: impl AsRef<Path>) -> Result<Arc<Translator>, I18nError> {
        let path = path.as_ref();
        let loaded = loader::load_path(path).and_then(|catalog| {
            let language = catalog.target_language.as_deref().unwrap_or_default();
            let locale = Locale::parse(language)
                .ok_or_else(|| I18nError::InvalidLocale(language.to_string()))?;
            Ok((locale, catalog))
        });
        match loaded {
            Ok((locale, catalog)) => Ok(self.install(locale, &catalog)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "keeping previous catalog");
                Err(err)
            }
        }
    }

    /// Make an already parsed catalog active.
    pub fn install(&self, locale: Locale, catalog: &TranslationCatalog) -> Arc<Translator> {
        let translator = Translator::with_options(catalog, self.options);
        let stats = translator.stats();
        info!(
            locale = %locale,
            entries = translator.len(),
            finished = stats.finished,
            unfinished = stats.unfinished,
            untranslated = stats.untranslated,
            vanished = stats.vanished + stats.obsolete,
            "activated translation catalog"
        );
        self.activate(locale, translator)
    }

    /// Drop the active catalog and show source strings.
    pub fn reset(&self) {
        self.activate(self.source_locale.clone(), Translator::identity());
    }

    fn activate(&self, locale: Locale, translator: Translator) -> Arc<Translator> {
        let translator = Arc::new(translator);
        *self.active.write() = Active {
            locale: locale.clone(),
            translator: Arc::clone(&translator),
        };
        self.notify(&locale);
        translator
    }

    /// Register a callback run after every successful switch, so UI owners
    /// can re-query their strings.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Locale) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn notify(&self, locale: &Locale) {
        // callbacks may subscribe or look strings up, so run them unlocked
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(locale);
        }
    }

    /// Locales with a catalog on disk.
    pub fn available_locales(&self) -> Result<Vec<Locale>, I18nError> {
        self.config.available_locales()
    }
}

impl std::fmt::Debug for LocaleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleService")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("locale", &self.current_locale())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Context, Message};
    use std::sync::atomic::AtomicUsize;

    fn locale(s: &str) -> Locale {
        Locale::parse(s).unwrap()
    }

    fn about_catalog(translation: &str) -> TranslationCatalog {
        TranslationCatalog::new("zh_CN").with_context(
            Context::new("AboutDialog").with_message(Message::new("About", translation)),
        )
    }

    #[test]
    fn test_starts_untranslated() {
        let service = LocaleService::new(LoaderConfig::default());
        assert_eq!(service.current_locale(), Locale::default());
        assert_eq!(service.lookup("AboutDialog", "About", None, None), "About");
        assert!(service.snapshot().is_empty());
    }

    #[test]
    fn test_install_and_reset() {
        let service = LocaleService::new(LoaderConfig::default());
        service.install(locale("zh_CN"), &about_catalog("关于"));
        assert_eq!(service.current_locale(), locale("zh_CN"));
        assert_eq!(service.lookup("AboutDialog", "About", None, None), "关于");

        service.reset();
        assert_eq!(service.current_locale(), Locale::default());
        assert_eq!(service.lookup("AboutDialog", "About", None, None), "About");
    }

    #[test]
    fn test_snapshot_survives_switch() {
        let service = LocaleService::new(LoaderConfig::default());
        service.install(locale("zh_CN"), &about_catalog("关于"));
        let old = service.snapshot();

        service.install(locale("zh_CN"), &about_catalog("关于本软件"));
        assert_eq!(old.tr("AboutDialog", "About"), "关于");
        assert_eq!(service.lookup("AboutDialog", "About", None, None), "关于本软件");
    }

    #[test]
    fn test_failed_switch_keeps_previous_catalog() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app_fr.ts"), "<TS><context>").unwrap();
        let service = LocaleService::new(LoaderConfig::new(dir.path(), "app"));
        service.install(locale("zh_CN"), &about_catalog("关于"));

        assert!(matches!(
            service.switch_locale(&locale("fr")),
            Err(I18nError::Format { .. })
        ));
        assert!(matches!(
            service.switch_locale(&locale("de")),
            Err(I18nError::NotFound { .. })
        ));
        assert_eq!(service.current_locale(), locale("zh_CN"));
        assert_eq!(service.lookup("AboutDialog", "About", None, None), "关于");
    }

    #[test]
    fn test_switch_to_source_language_needs_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = LocaleService::new(LoaderConfig::new(dir.path(), "app"));
        service.install(locale("zh_CN"), &about_catalog("关于"));

        let translator = service.switch_locale(&locale("en_US")).unwrap();
        assert!(translator.is_empty());
        assert_eq!(service.current_locale(), locale("en_US"));
        assert_eq!(service.lookup("AboutDialog", "About", None, None), "About");
    }

    #[test]
    fn test_custom_source_locale() {
        let service =
            LocaleService::new(LoaderConfig::default()).with_source_locale(locale("zh_CN"));
        assert_eq!(service.current_locale(), locale("zh_CN"));
    }

    #[test]
    fn test_switch_to_file_uses_catalog_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.ts");
        crate::writer::save_catalog_file(&about_catalog("关于"), &path).unwrap();

        let service = LocaleService::new(LoaderConfig::default());
        service.switch_to_file(&path).unwrap();
        assert_eq!(service.current_locale(), locale("zh_CN"));
        assert_eq!(service.lookup("AboutDialog", "About", None, None), "关于");
    }

    #[test]
    fn test_switch_to_file_without_language_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nolang.ts");
        std::fs::write(&path, "<TS version=\"2.1\"></TS>").unwrap();

        let service = LocaleService::new(LoaderConfig::default());
        assert!(matches!(
            service.switch_to_file(&path),
            Err(I18nError::InvalidLocale(_))
        ));
        assert_eq!(service.current_locale(), Locale::default());
    }

    #[test]
    fn test_subscribers_notified_on_switch_only() {
        let service = LocaleService::new(LoaderConfig::new("/nonexistent/lingo", "app"));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let id = {
            let calls = Arc::clone(&calls);
            let seen = Arc::clone(&seen);
            service.subscribe(move |locale| {
                calls.fetch_add(1, Ordering::SeqCst);
                seen.lock().push(locale.code());
            })
        };

        service.install(locale("zh_CN"), &about_catalog("关于"));
        assert!(service.switch_locale(&locale("ja")).is_err());
        service.reset();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*seen.lock(), vec!["zh_CN".to_string(), "en".to_string()]);

        assert!(service.unsubscribe(id));
        assert!(!service.unsubscribe(id));
        service.install(locale("zh_CN"), &about_catalog("关于"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_can_query_service() {
        let service = Arc::new(LocaleService::new(LoaderConfig::default()));
        let label = Arc::new(Mutex::new(String::new()));
        {
            let weak = Arc::downgrade(&service);
            let label = Arc::clone(&label);
            service.subscribe(move |_| {
                if let Some(service) = weak.upgrade() {
                    *label.lock() = service.lookup("AboutDialog", "About", None, None);
                }
            });
        }

        service.install(locale("zh_CN"), &about_catalog("关于"));
        assert_eq!(*label.lock(), "关于");
    }

    #[test]
    fn test_concurrent_readers_see_complete_translators() {
        let service = Arc::new(LocaleService::new(LoaderConfig::default()));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let text = service.lookup("AboutDialog", "About", None, None);
                        assert!(text == "About" || text == "关于" || text == "关于本软件");
                    }
                })
            })
            .collect();

        for i in 0..100 {
            let translation = if i % 2 == 0 { "关于" } else { "关于本软件" };
            service.install(locale("zh_CN"), &about_catalog(translation));
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
