//! Request capability consumed by negotiation and route handling.
//!
//! Handlers only need two things from the host framework: header lookup and
//! the request path relative to the router mount point.

use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue};

/// What a localized route needs to know about an incoming request.
pub trait RequestContext {
    /// Value of the header `name` (case-insensitive), if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Request path inside the router, without the query string.
    fn path(&self) -> &str;
}

impl RequestContext for Parts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn path(&self) -> &str {
        self.uri.path()
    }
}

/// Owned request snapshot: headers plus router-relative path.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    headers: HeaderMap,
    path: String,
}

impl PageRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            headers: HeaderMap::new(),
            path: path.into(),
        }
    }

    /// Add a header. Names or values that are not valid HTTP tokens are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }
}

impl RequestContext for PageRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_page_request_header_lookup_is_case_insensitive() {
        let request = PageRequest::new("/en/home").with_header("Accept-Language", "fr");
        assert_eq!(request.header("accept-language"), Some("fr"));
        assert_eq!(request.header("referer"), None);
        assert_eq!(request.path(), "/en/home");
    }

    #[test]
    fn test_parts_path_drops_query() {
        let (parts, _) = Request::builder()
            .uri("/en/home?utm=1")
            .header("referer", "http://localhost/fr/item/1")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(parts.path(), "/en/home");
        assert_eq!(parts.header("Referer"), Some("http://localhost/fr/item/1"));
    }
}
