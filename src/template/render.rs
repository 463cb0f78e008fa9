//! Template localization: load, substitute, respond.

use crate::config::Settings;
use crate::error::RenderError;
use crate::response::PageResponse;
use crate::template::store::TextStore;
use crate::template::substitution::{localize, Translations};
use axum::http::StatusCode;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

/// Renders templates of the views directory with per-locale translations.
///
/// Templates and resources are read from the store on every call.
#[derive(Clone)]
pub struct TemplateLocalizer {
    settings: Arc<Settings>,
    store: Arc<dyn TextStore>,
}

impl TemplateLocalizer {
    pub fn new(settings: Arc<Settings>, store: Arc<dyn TextStore>) -> Self {
        Self { settings, store }
    }

    /// Path of a template: `{views}/{template}`.
    pub fn template_path(&self, template: &str) -> PathBuf {
        self.settings.views_directory().join(template)
    }

    /// Path of a translation resource: `{views}/{template}_{locale}.json`.
    pub fn resource_path(&self, template: &str, locale: &str) -> PathBuf {
        self.settings
            .views_directory()
            .join(format!("{template}_{locale}.json"))
    }

    /// Load and localize `template` for `locale`.
    ///
    /// # Arguments
    /// * `template` - Template file name inside the views directory
    /// * `route_base_url` - Mount URL of the router; one trailing slash is dropped
    /// * `canonical_url` - Router-relative canonical URL of the page
    /// * `locale` - Locale whose translation resource is used
    pub async fn localize(
        &self,
        template: &str,
        route_base_url: &str,
        canonical_url: &str,
        locale: &str,
    ) -> Result<String, RenderError> {
        let template_path = self.template_path(template);
        let content = self
            .store
            .read_text(&template_path)
            .await
            .map_err(|source| RenderError::TemplateRead {
                path: template_path,
                source,
            })?;

        let resource_path = self.resource_path(template, locale);
        let resource = self
            .store
            .read_text(&resource_path)
            .await
            .map_err(|source| RenderError::ResourceRead {
                path: resource_path.clone(),
                source,
            })?;
        let translations =
            Translations::from_json(&resource).map_err(|e| RenderError::ResourceParse {
                path: resource_path,
                reason: e.to_string(),
            })?;

        let canonical = format!("{}{}", strip_trailing_slash(route_base_url), canonical_url);
        debug!(template, locale, canonical = %canonical, "Localizing template");
        Ok(localize(&content, &translations, locale, &canonical))
    }

    /// Render `template` as a page with `status`, or a 500 page carrying the
    /// diagnostic when a file cannot be read or parsed.
    pub async fn render(
        &self,
        template: &str,
        route_base_url: &str,
        canonical_url: &str,
        locale: &str,
        status: StatusCode,
    ) -> PageResponse {
        match self
            .localize(template, route_base_url, canonical_url, locale)
            .await
        {
            Ok(body) => PageResponse::page(status, body),
            Err(e) => {
                error!(error = %e, template, locale, "Failed to render template");
                PageResponse::page(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

/// Drop one trailing `/` for concatenation with a path.
pub fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}
