//! Translation token substitution.
//!
//! Templates reference translations with `__{key}` or, with parameters,
//! `__{key%%param1%%param2%%}`. A translation value refers to its parameters
//! as `__{1}` or `__{1:comment}` (1-indexed). Unknown keys render as
//! `???key???`.
//!
//! Substitution resolves one token at a time: the first token found is
//! resolved and every occurrence of its exact text is replaced, then the
//! content is scanned again. A resolved value may itself introduce new
//! tokens, which are expanded on a later pass.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

/// Token replaced by the locale code.
pub const LOCALE_TOKEN: &str = "__{locale}";

/// Token replaced by the canonical URL of the page.
pub const CANONICAL_URL_TOKEN: &str = "__{canonicalUrl}";

/// Upper bound on substitution passes for one template.
pub const MAX_SUBSTITUTION_PASSES: usize = 1024;

/// Upper bound on the size of a localized template, in bytes.
pub const MAX_CONTENT_BYTES: usize = 4 * 1024 * 1024;

const TOKEN_START: &str = "__{";
const PARAMETER_SEPARATOR: &str = "%%";
const PARAMETERS_END: &str = "%%}";

// Captures the 1-based index of `__{N}` / `__{N:comment}`
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"__\{([1-9][0-9]*)(?::[^}]*)?\}").expect("Invalid placeholder regex")
    })
}

/// Flat key to text mapping loaded from a `{template}_{locale}.json` resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    entries: HashMap<String, String>,
}

impl Translations {
    /// Parse a JSON object. String values are kept verbatim, other values
    /// are stringified.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_str(content.trim())?;
        let entries = object
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Translations {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A translation token found in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    /// Full token text, e.g. `__{hello%%World%%}`
    text: &'a str,
    key: &'a str,
    /// Raw parameter blob between the first `%%` and the closing `%%}`
    parameters: Option<&'a str>,
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Parse a token starting exactly at `content[start..]`, which begins with `__{`.
fn token_at(content: &str, start: usize) -> Option<Token<'_>> {
    let key_start = start + TOKEN_START.len();
    let rest = &content[key_start..];
    let key_len = rest.find(|c: char| !is_key_char(c)).unwrap_or(rest.len());
    if key_len == 0 {
        return None;
    }
    let key = &rest[..key_len];
    let after_key = &rest[key_len..];

    if after_key.starts_with('}') {
        let end = key_start + key_len + 1;
        return Some(Token {
            text: &content[start..end],
            key,
            parameters: None,
        });
    }

    let blob_and_rest = after_key.strip_prefix(PARAMETER_SEPARATOR)?;
    // The parameter blob never spans lines
    let line = blob_and_rest.split('\n').next().unwrap_or("");
    let blob_len = line.find(PARAMETERS_END)?;
    let end = key_start + key_len + PARAMETER_SEPARATOR.len() + blob_len + PARAMETERS_END.len();
    Some(Token {
        text: &content[start..end],
        key,
        parameters: Some(&blob_and_rest[..blob_len]),
    })
}

/// First well-formed token in `content`.
fn next_token(content: &str) -> Option<Token<'_>> {
    content
        .match_indices(TOKEN_START)
        .find_map(|(start, _)| token_at(content, start))
}

/// Substitute `__{N}` / `__{N:comment}` placeholders of `text` with the
/// `%%`-separated values of `parameters`. Placeholders without a matching
/// parameter are kept.
fn merge_parameters(text: &str, parameters: &str) -> String {
    let values: Vec<&str> = parameters.split(PARAMETER_SEPARATOR).collect();
    placeholder_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| values.get(index - 1))
                .map_or_else(|| caps[0].to_string(), |value| value.to_string())
        })
        .into_owned()
}

fn resolve(token: &Token<'_>, translations: &Translations) -> String {
    match translations.get(token.key) {
        Some(text) => match token.parameters {
            Some(parameters) => merge_parameters(text, parameters),
            None => text.to_string(),
        },
        None => {
            warn!(key = token.key, "Missing translation key");
            format!("???{}???", token.key)
        }
    }
}

/// Replace every translation token of `content` with its resolved text.
///
/// Content without tokens is returned unchanged.
pub fn substitute_tokens(content: &str, translations: &Translations) -> String {
    let mut content = content.to_string();

    for pass in 0.. {
        let Some(token) = next_token(&content) else {
            break;
        };
        if pass == MAX_SUBSTITUTION_PASSES {
            warn!(
                passes = MAX_SUBSTITUTION_PASSES,
                token = token.text,
                "Translation substitution did not converge, leaving remaining tokens"
            );
            break;
        }

        let text = token.text.to_string();
        let value = resolve(&token, translations);

        let occurrences = content.matches(text.as_str()).count();
        let projected = content.len() - occurrences * text.len() + occurrences * value.len();
        if projected > MAX_CONTENT_BYTES {
            warn!(
                bytes = projected,
                limit = MAX_CONTENT_BYTES,
                token = %text,
                "Translation substitution exceeds the content size limit, leaving remaining tokens"
            );
            break;
        }

        content = content.replace(&text, &value);
    }

    content
}

/// Localize a template: fill the locale and canonical URL tokens, then the
/// translation tokens.
pub fn localize(
    template: &str,
    translations: &Translations,
    locale: &str,
    canonical_url: &str,
) -> String {
    let content = template
        .replace(LOCALE_TOKEN, locale)
        .replace(CANONICAL_URL_TOKEN, canonical_url);
    substitute_tokens(&content, translations)
}
