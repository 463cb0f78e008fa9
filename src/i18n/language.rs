//! Language type: one entry of a client's language preferences.
//!
//! A `Language` is what the negotiator extracts from an `Accept-Language`
//! header or a referer URL. It is a plain value and never changes after
//! construction.

use std::cmp::Ordering;

/// Country placeholder used when a preference names no country.
pub const ANY_COUNTRY: &str = "*";

/// Preference weight given to the synthetic default-locale fallback.
pub const FALLBACK_QUALITY: f32 = 0.1;

/// A language preference: locale, country and quality weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    /// 2-letter language code, lower-cased (e.g., "en", "fr")
    locale: String,

    /// 2-letter country code as sent by the client, or "*"
    country: String,

    /// Preference weight in [0, 1]
    q: f32,
}

impl Language {
    /// Create a language preference.
    ///
    /// # Arguments
    /// * `locale` - The language code (lower-cased on construction)
    /// * `country` - Optional country code, defaults to `"*"`
    /// * `q` - Optional preference weight, defaults to 1 and is clamped to [0, 1]
    pub fn new(locale: &str, country: Option<&str>, q: Option<f32>) -> Self {
        Self {
            locale: locale.to_ascii_lowercase(),
            country: country.unwrap_or(ANY_COUNTRY).to_string(),
            q: q.map(|q| q.clamp(0.0, 1.0)).unwrap_or(1.0),
        }
    }

    /// The fallback preference for `locale`, with weight 0.1.
    pub fn fallback(locale: &str) -> Self {
        Self::new(locale, None, Some(FALLBACK_QUALITY))
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    /// Ranking comparator: higher weight first.
    ///
    /// Use with a stable sort so equally weighted languages keep their order.
    pub fn by_preference(a: &Language, b: &Language) -> Ordering {
        b.q.partial_cmp(&a.q).unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Construction Tests ====================

    #[test]
    fn test_defaults() {
        let language = Language::new("da", None, None);
        assert_eq!(language.locale(), "da");
        assert_eq!(language.country(), "*");
        assert_eq!(language.q(), 1.0);
    }

    #[test]
    fn test_explicit_fields() {
        let language = Language::new("en", Some("gb"), Some(0.8));
        assert_eq!(language.locale(), "en");
        assert_eq!(language.country(), "gb");
        assert_eq!(language.q(), 0.8);
    }

    #[test]
    fn test_locale_is_lowercased_country_kept() {
        let language = Language::new("EN", Some("GB"), None);
        assert_eq!(language.locale(), "en");
        assert_eq!(language.country(), "GB");
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(Language::new("en", None, Some(3.0)).q(), 1.0);
        assert_eq!(Language::new("en", None, Some(-1.0)).q(), 0.0);
    }

    #[test]
    fn test_fallback() {
        let language = Language::fallback("en");
        assert_eq!(language, Language::new("en", None, Some(0.1)));
    }

    // ==================== Ranking Tests ====================

    #[test]
    fn test_by_preference_sorts_descending_and_stable() {
        let mut languages = vec![
            Language::new("de", None, Some(0.5)),
            Language::new("fr", None, Some(0.9)),
            Language::new("en", None, Some(0.5)),
            Language::new("da", None, None),
        ];
        languages.sort_by(Language::by_preference);

        let locales: Vec<&str> = languages.iter().map(|l| l.locale()).collect();
        assert_eq!(locales, vec!["da", "fr", "de", "en"]);
    }
}
