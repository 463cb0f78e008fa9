//! Language preferences and locale negotiation.
//!
//! # Architecture
//!
//! - `language`: the `Language` value type and its ranking comparator
//! - `negotiator`: extraction from `Accept-Language` and referer headers,
//!   and selection of the best supported locale
//!
//! # Example
//!
//! ```rust,ignore
//! use locale_router::i18n::LocaleNegotiator;
//!
//! let negotiator = LocaleNegotiator::new(settings);
//! let language = negotiator.best_supported(&request);
//! ```

mod language;
mod negotiator;

pub use language::{Language, ANY_COUNTRY, FALLBACK_QUALITY};
pub use negotiator::{
    compile_referer_pattern, language_from_referer, languages_from_header, LocaleNegotiator,
    LOCALE_PLACEHOLDER,
};
