//! Template loading and translation substitution.
//!
//! - `store`: the `TextStore` storage capability and its filesystem implementation
//! - `substitution`: the `__{key%%params%%}` token rewriting engine
//! - `render`: `TemplateLocalizer`, which ties both together into a page response

mod render;
mod store;
mod substitution;

pub use render::{strip_trailing_slash, TemplateLocalizer};
pub use store::{FsStore, MemoryStore, TextStore};
pub use substitution::{
    localize, substitute_tokens, Translations, CANONICAL_URL_TOKEN, LOCALE_TOKEN, MAX_CONTENT_BYTES,
    MAX_SUBSTITUTION_PASSES,
};
