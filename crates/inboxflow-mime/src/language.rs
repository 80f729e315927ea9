//! Best-effort language identification.
//!
//! Only a handful of languages are distinguished, using Unicode script
//! ranges and language-specific diacritics. Anything else is reported as
//! [`Language::English`].

use std::fmt;

/// Number of leading characters inspected.
const SAMPLE_CHARS: usize = 500;

/// Languages the detector can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Language {
    /// English, and the fallback for unrecognized scripts.
    #[default]
    English,
    /// Chinese (Han ideographs without kana).
    Chinese,
    /// Japanese (hiragana or katakana present).
    Japanese,
    /// Korean (Hangul syllables).
    Korean,
    /// French.
    French,
    /// German.
    German,
    /// Spanish.
    Spanish,
    /// Russian (Cyrillic).
    Russian,
}

impl Language {
    /// Parse from the lowercase name. Unknown names map to English.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "chinese" | "zh" => Self::Chinese,
            "japanese" | "ja" => Self::Japanese,
            "korean" | "ko" => Self::Korean,
            "french" | "fr" => Self::French,
            "german" | "de" => Self::German,
            "spanish" | "es" => Self::Spanish,
            "russian" | "ru" => Self::Russian,
            _ => Self::English,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Chinese => "chinese",
            Self::Japanese => "japanese",
            Self::Korean => "korean",
            Self::French => "french",
            Self::German => "german",
            Self::Spanish => "spanish",
            Self::Russian => "russian",
        }
    }

    /// Human-readable name, used in prompts.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Chinese => "Chinese",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::French => "French",
            Self::German => "German",
            Self::Spanish => "Spanish",
            Self::Russian => "Russian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

const fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309f}' | '\u{30a0}'..='\u{30ff}')
}

const fn is_han(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}')
}

const fn is_hangul(c: char) -> bool {
    matches!(c, '\u{ac00}'..='\u{d7a3}')
}

const fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0430}'..='\u{044f}' | '\u{0410}'..='\u{042f}' | 'ё' | 'Ё')
}

fn has_any(sample: &str, marks: &str) -> bool {
    sample.chars().any(|c| marks.contains(c))
}

/// Detects the language of `text` from its first 500 characters.
///
/// Checks run in a fixed order: kana, Han, French diacritics, German
/// diacritics, Spanish diacritics, Cyrillic, Hangul. The first match wins.
#[must_use]
pub fn detect_language(text: &str) -> Language {
    let sample: String = text.chars().take(SAMPLE_CHARS).collect::<String>().to_lowercase();

    if sample.chars().any(is_kana) {
        Language::Japanese
    } else if sample.chars().any(is_han) {
        Language::Chinese
    } else if has_any(&sample, "àâçéèêëîïôûùüÿœæ") {
        Language::French
    } else if has_any(&sample, "äöüß") {
        Language::German
    } else if has_any(&sample, "áéíóúñ¿¡") {
        Language::Spanish
    } else if sample.chars().any(is_cyrillic) {
        Language::Russian
    } else if sample.chars().any(is_hangul) {
        Language::Korean
    } else {
        Language::English
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detect_scripts() {
        assert_eq!(detect_language("お疲れ様です。進捗を報告します"), Language::Japanese);
        assert_eq!(detect_language("您好，请查看附件"), Language::Chinese);
        assert_eq!(detect_language("안녕하세요"), Language::Korean);
        assert_eq!(detect_language("Здравствуйте, коллеги"), Language::Russian);
    }

    #[test]
    fn test_detect_diacritics() {
        assert_eq!(
            detect_language("Proposition de partenariat stratégique"),
            Language::French
        );
        assert_eq!(detect_language("Mit freundlichen Grüßen"), Language::French);
        assert_eq!(detect_language("Straße gesperrt"), Language::German);
        assert_eq!(detect_language("¿Podemos hablar mañana?"), Language::Spanish);
    }

    #[test]
    fn test_detect_uppercase_diacritics() {
        assert_eq!(detect_language("ÄRGER IM BÜRO"), Language::French);
        assert_eq!(detect_language("STRASSE Ö"), Language::German);
    }

    #[test]
    fn test_detect_only_looks_at_sample() {
        let text = format!("{}日本語", "a".repeat(SAMPLE_CHARS));
        assert_eq!(detect_language(&text), Language::English);
    }

    #[test]
    fn test_detect_fallback() {
        assert_eq!(detect_language(""), Language::English);
        assert_eq!(detect_language("Hello team, the build is green."), Language::English);
    }

    #[test]
    fn test_language_roundtrip() {
        for language in [
            Language::English,
            Language::Chinese,
            Language::Japanese,
            Language::Korean,
            Language::French,
            Language::German,
            Language::Spanish,
            Language::Russian,
        ] {
            assert_eq!(Language::parse(language.as_str()), language);
        }
    }

    proptest! {
        #[test]
        fn prop_ascii_is_english(text in "[ -~]{0,600}") {
            prop_assert_eq!(detect_language(&text), Language::English);
        }
    }
}
