//! Simple example demonstrating catalog loading and language switching.

use lingo_common_i18n::{tr, LoaderConfig, Locale, LocaleService};

fn main() {
    println!("=== Lingo i18n Example ===");

    let dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/test-data").to_string());
    let service = LocaleService::new(LoaderConfig::new(&dir, "RedPandaIDE"));
    service.subscribe(|locale| println!("-> switched to {locale}"));

    println!("Current locale: {}", service.current_locale());
    println!("Untranslated: '{}'", tr!(service, "AboutDialog", "About"));

    match service.available_locales() {
        Ok(locales) => {
            for locale in locales {
                println!(
                    "Available: {} ({})",
                    locale,
                    locale.display_name().unwrap_or("unknown")
                );
            }
        }
        Err(e) => println!("Cannot list catalogs: {e}"),
    }

    // Switch to Simplified Chinese
    let zh = Locale::parse("zh_CN").unwrap_or_default();
    match service.switch_locale(&zh) {
        Ok(translator) => println!("Loaded {} entries", translator.len()),
        Err(e) => println!("Switch failed: {e}"),
    }

    println!("Translation: '{}'", tr!(service, "AboutDialog", "About"));
    println!("Disambiguated: '{}'", tr!(service, "MainWindow", "Open", comment = "menu"));
    println!("Plural: '{}'", tr!(service, "MainWindow", "%n file(s) modified", n = 3));
    println!("Unfinished: '{}'", tr!(service, "AboutDialog", "Save failed."));
    println!("Vanished: '{}'", tr!(service, "MainWindow", "All files (*.*)"));

    // A missing catalog keeps the current one
    let fr = Locale::parse("fr").unwrap_or_default();
    if let Err(e) = service.switch_locale(&fr) {
        println!("Switch failed: {e}");
    }
    println!("Still: '{}'", tr!(service, "AboutDialog", "About"));

    println!("\n=== Locale Parsing Examples ===");
    for input in ["en-US", "zh_CN.UTF-8", "zh-Hans-CN", "de_DE@euro", "C", "invalid"] {
        match Locale::parse(input) {
            Some(locale) => println!("'{}' -> {} ({:?})", input, locale, locale.plural_rule()),
            None => println!("'{}' -> not a locale", input),
        }
    }
}
