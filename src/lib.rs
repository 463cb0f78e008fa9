//! Locale negotiation, localized routing and template localization for
//! server-rendered pages.

pub mod config;
pub mod error;
pub mod i18n;
pub mod request;
pub mod response;
pub mod routing;
pub mod template;

pub use config::Settings;
pub use error::{ConfigError, PatternError, RenderError};
pub use request::{PageRequest, RequestContext};
pub use response::PageResponse;
pub use routing::{RouteLocalizer, RouteTable};
