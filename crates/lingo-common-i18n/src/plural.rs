//! Plural-form selection for numerus messages.
//!
//! Each rule maps a count to the index of the `<numerusform>` to show. The
//! groupings follow the rule families Qt Linguist assigns to languages.

use serde::{Deserialize, Serialize};

/// Plural rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluralRule {
    /// A single form for every count (Chinese, Japanese, Korean, ...).
    One,
    /// Singular for 1, plural otherwise.
    English,
    /// Singular for 0 and 1, plural otherwise.
    French,
    /// Russian, Ukrainian, Belarusian, Serbian, Croatian, Bosnian.
    SlavicEast,
    /// Czech and Slovak.
    Czech,
    Polish,
    Lithuanian,
    Latvian,
    Romanian,
    Slovenian,
    Irish,
    Arabic,
}

impl PluralRule {
    /// Rule for an ISO 639 language code, optionally refined by territory.
    pub fn for_language(language: &str, territory: Option<&str>) -> Self {
        match language.to_ascii_lowercase().as_str() {
            "zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms" | "tr" | "fa" | "hu" | "my" | "bo"
            | "dz" | "jv" | "su" | "tt" | "yo" | "za" | "fj" | "gn" | "bi" | "na" => Self::One,
            "fr" | "oc" | "br" | "hy" | "ti" | "wa" | "ln" => Self::French,
            "pt" if territory.is_some_and(|t| t.eq_ignore_ascii_case("BR")) => Self::French,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::SlavicEast,
            "cs" | "sk" => Self::Czech,
            "pl" => Self::Polish,
            "lt" => Self::Lithuanian,
            "lv" => Self::Latvian,
            "ro" | "mo" => Self::Romanian,
            "sl" => Self::Slovenian,
            "ga" => Self::Irish,
            "ar" => Self::Arabic,
            _ => Self::English,
        }
    }

    /// Number of `<numerusform>` entries a translation should carry.
    pub fn form_count(&self) -> usize {
        match self {
            Self::One => 1,
            Self::English | Self::French => 2,
            Self::SlavicEast
            | Self::Czech
            | Self::Polish
            | Self::Lithuanian
            | Self::Latvian
            | Self::Romanian
            | Self::Irish => 3,
            Self::Slovenian => 4,
            Self::Arabic => 6,
        }
    }

    /// Index of the form to use for `n`.
    pub fn index(&self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let n10 = n % 10;
        let n100 = n % 100;
        match self {
            Self::One => 0,
            Self::English => usize::from(n != 1),
            Self::French => usize::from(n > 1),
            Self::SlavicEast => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&n10) && !(12..=14).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Lithuanian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n10 >= 2 && !(10..=19).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Latvian => {
                if n10 == 1 && n100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&n100) {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match n100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Arabic => {
                if n == 0 {
                    0
                } else if n == 1 {
                    1
                } else if n == 2 {
                    2
                } else if (3..=10).contains(&n100) {
                    3
                } else if n100 >= 11 {
                    4
                } else {
                    5
                }
            }
        }
    }
}

impl Default for PluralRule {
    fn default() -> Self {
        Self::English
    }
}
