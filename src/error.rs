//! Error types for configuration, route patterns and page rendering.
//!
//! Negotiation never fails (it degrades to the default locale), so it has no
//! error type here.

use std::path::PathBuf;
use thiserror::Error;

/// Misconfiguration detected while building settings or registering routes.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one supported locale is required")]
    NoSupportedLocales,

    #[error("locale code '{0}' must be exactly 2 alphanumeric characters")]
    InvalidLocale(String),

    #[error("default locale '{0}' is not one of the supported locales")]
    UnsupportedDefault(String),

    #[error(
        "refererLocalePattern must be a string containing \":locale\" defining where the locale \
         will be extracted from the referer URL (got '{0}')"
    )]
    MissingLocalePlaceholder(String),

    #[error("referer locale pattern '{pattern}' is not a valid regular expression: {source}")]
    InvalidRefererPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Errors raised while compiling or rebuilding a route pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("route pattern '{pattern}' has a variable without a name at offset {offset}")]
    EmptyVariableName { pattern: String, offset: usize },

    #[error("route pattern '{pattern}' has an unterminated group for variable '{name}'")]
    UnterminatedGroup { pattern: String, name: String },

    #[error("route pattern '{pattern}' does not compile: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("route pattern '{pattern}' uses unsupported modifier '{modifier}' at offset {offset}")]
    UnsupportedModifier {
        pattern: String,
        modifier: char,
        offset: usize,
    },

    #[error("no value bound for variable '{name}' of route pattern '{pattern}'")]
    MissingBinding { pattern: String, name: String },
}

/// Per-request rendering failures. The `Display` text is the 500 response body.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot read template file {}: {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read translations resource file {}: {source}", .path.display())]
    ResourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse translations resource file {}: {reason}", .path.display())]
    ResourceParse { path: PathBuf, reason: String },
}
