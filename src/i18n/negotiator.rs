//! Locale negotiation from request metadata.
//!
//! Candidate locales come from the `Accept-Language` header and, for routes
//! reached by client-side navigation, from the referer URL. Negotiation never
//! fails: missing or malformed input degrades to an empty result or to the
//! default-locale fallback.

use crate::config::Settings;
use crate::error::ConfigError;
use crate::i18n::Language;
use crate::request::RequestContext;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Placeholder marking the locale segment in a referer locale pattern.
pub const LOCALE_PLACEHOLDER: &str = ":locale";

const LOCALE_CAPTURE: &str = r"([\w]{2})";

// Captures the locale, the optional country and the optional quality weight
static LANGUAGES_REGEX: OnceLock<Regex> = OnceLock::new();

fn languages_regex() -> &'static Regex {
    LANGUAGES_REGEX.get_or_init(|| {
        Regex::new(r"([[:alnum:]_]{2})(?:-([[:alnum:]_]{2}))?(?:;q=([01](?:\.[0-9]{1,3})?))?")
            .expect("Invalid languages regex")
    })
}

/// Extract the language preferences of the `Accept-Language` header, in header order.
///
/// Fragments that do not look like `lang[-COUNTRY][;q=W]` are skipped; an
/// absent or empty header yields an empty list.
pub fn languages_from_header<R: RequestContext + ?Sized>(request: &R) -> Vec<Language> {
    let Some(header) = request.header("accept-language") else {
        return Vec::new();
    };

    languages_regex()
        .captures_iter(header)
        .filter_map(|caps| {
            let locale = caps.get(1)?.as_str();
            let country = caps.get(2).map(|m| m.as_str());
            let q = caps.get(3).and_then(|m| m.as_str().parse::<f32>().ok());
            Some(Language::new(locale, country, q))
        })
        .collect()
}

/// Extract the locale of the referer URL with `pattern`, whose first group captures it.
///
/// # Returns
/// * `Some(Language)` with wildcard country and weight 1 on a match
/// * `None` if the referer header is absent or empty, or does not match
pub fn language_from_referer<R: RequestContext + ?Sized>(
    request: &R,
    pattern: &Regex,
) -> Option<Language> {
    let referer = request.header("referer").filter(|r| !r.is_empty())?;
    let locale = pattern.captures(referer)?.get(1)?.as_str();
    Some(Language::new(locale, None, Some(1.0)))
}

/// Compile a referer locale pattern such as `/:locale/item/`.
///
/// The pattern is a regular expression in which `:locale` stands for a
/// 2-character locale capture.
///
/// # Returns
/// * `Err(ConfigError::MissingLocalePlaceholder)` if `:locale` is absent
/// * `Err(ConfigError::InvalidRefererPattern)` if the result does not compile
pub fn compile_referer_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    if !pattern.contains(LOCALE_PLACEHOLDER) {
        return Err(ConfigError::MissingLocalePlaceholder(pattern.to_string()));
    }

    let source = pattern.replacen(LOCALE_PLACEHOLDER, LOCALE_CAPTURE, 1);
    Regex::new(&source).map_err(|source| ConfigError::InvalidRefererPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Chooses the best supported locale for a request.
#[derive(Debug, Clone)]
pub struct LocaleNegotiator {
    settings: Arc<Settings>,
}

impl LocaleNegotiator {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The highest-weighted header language whose locale is supported.
    ///
    /// Falls back to the default locale with weight 0.1 when the client
    /// accepts no supported locale.
    pub fn best_supported<R: RequestContext + ?Sized>(&self, request: &R) -> Language {
        let mut languages = languages_from_header(request);
        languages.sort_by(Language::by_preference);

        match languages
            .into_iter()
            .find(|language| self.settings.is_supported(language.locale()))
        {
            Some(language) => {
                debug!(locale = language.locale(), q = language.q(), "Negotiated locale");
                language
            }
            None => {
                debug!(
                    locale = self.settings.default_locale(),
                    "No accepted locale is supported, using default"
                );
                Language::fallback(self.settings.default_locale())
            }
        }
    }

    /// The referer locale if present, otherwise the best supported header locale.
    ///
    /// The referer locale is taken as-is; it is not checked against the
    /// supported locales.
    pub fn referer_or_best<R: RequestContext + ?Sized>(
        &self,
        request: &R,
        pattern: &Regex,
    ) -> Language {
        language_from_referer(request, pattern).unwrap_or_else(|| self.best_supported(request))
    }
}
