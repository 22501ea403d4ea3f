//! Automatic locale detection.

use super::Locale;
use std::env;

/// Environment variable that overrides every other locale source.
pub const LOCALE_ENV: &str = "LINGO_LOCALE";

/// Detect the system locale with optional user override.
pub fn detect_locale_with_override(user_locale: Option<&str>) -> Locale {
    // User preference has highest priority
    if let Some(locale) = user_locale.and_then(Locale::parse) {
        return locale;
    }

    detect_locale()
}

/// Detect the system locale.
pub fn detect_locale() -> Locale {
    // Priority: explicit env var > LC_ALL > LC_MESSAGES > LANG > default
    [LOCALE_ENV, "LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .find_map(from_env)
        .unwrap_or_default()
}

/// Parse locale from environment variable. `C` and `POSIX` yield nothing.
fn from_env(var: &str) -> Option<Locale> {
    env::var(var).ok().and_then(|v| Locale::parse(&v))
}

/// Locales to try, most specific first: `zh_CN` then `zh`.
pub fn locale_fallback_chain(locale: &Locale) -> Vec<Locale> {
    let mut chain = vec![locale.clone()];
    if locale.territory().is_some() {
        if let Some(language) = Locale::language_only(locale.language()) {
            chain.push(language);
        }
    }
    chain
}
