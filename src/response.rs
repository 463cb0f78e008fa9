use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

/// Result of handling a localized route: a redirect or a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    Redirect { status: StatusCode, location: String },
    Page { status: StatusCode, body: String },
}

impl PageResponse {
    /// Temporary redirect (302).
    pub fn found(location: impl Into<String>) -> Self {
        Self::Redirect {
            status: StatusCode::FOUND,
            location: location.into(),
        }
    }

    /// Permanent redirect (301).
    pub fn moved_permanently(location: impl Into<String>) -> Self {
        Self::Redirect {
            status: StatusCode::MOVED_PERMANENTLY,
            location: location.into(),
        }
    }

    pub fn page(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Page {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Redirect { status, .. } | Self::Page { status, .. } => *status,
        }
    }

    /// Redirect target, if this is a redirect.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location, .. } => Some(location),
            Self::Page { .. } => None,
        }
    }

    /// Page body, if this is a rendered page.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Page { body, .. } => Some(body),
            Self::Redirect { .. } => None,
        }
    }
}

impl IntoResponse for PageResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect { status, location } => {
                (status, [(header::LOCATION, location)]).into_response()
            }
            Self::Page { status, body } => (status, Html(body)).into_response(),
        }
    }
}
