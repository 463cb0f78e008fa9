//! Locale-aware route registration and dispatch.
//!
//! - `pattern`: route path patterns with named variables
//! - `table`: the `RouteRegistry` capability, `RouteTable` and its axum adapter
//! - `localizer`: `RouteLocalizer`, which compiles a canonical route and its
//!   suffix aliases into redirect and render registrations

mod localizer;
mod pattern;
mod table;

pub use localizer::{NotFoundPage, RouteLocalizer, LOCALE_PREFIX, LOCALE_VARIABLE};
pub use pattern::{Bindings, CompiledPattern};
pub use table::{Handler, RouteHandler, RouteRegistry, RouteTable};
