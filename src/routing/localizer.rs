//! Localized route registration.
//!
//! A canonical route such as `/item/:id` is served under a locale prefix,
//! `/{locale}/item/:id`. For the canonical route and each suffix alias two
//! routes are registered:
//!
//! - the bare route (`/item/:id/join`) redirects to the canonical localized
//!   URL of the negotiated locale
//! - the localized route (`/:locale/item/:id/join`) renders the page when it
//!   is the canonical shape with a supported locale, and redirects to the
//!   canonical localized URL otherwise
//!
//! Path variables are carried across redirects by name, so an alias must
//! reuse the variable names of its canonical route.

use crate::config::Settings;
use crate::error::ConfigError;
use crate::i18n::{compile_referer_pattern, LocaleNegotiator};
use crate::request::RequestContext;
use crate::response::PageResponse;
use crate::routing::pattern::CompiledPattern;
use crate::routing::table::{Handler, RouteRegistry};
use crate::template::{strip_trailing_slash, TemplateLocalizer, TextStore};
use async_trait::async_trait;
use axum::http::StatusCode;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, error};

/// Name of the locale variable of localized patterns.
pub const LOCALE_VARIABLE: &str = "locale";

/// Pattern prefix matching a 2-character locale segment.
pub const LOCALE_PREFIX: &str = r"/:locale([\w]{2})";

/// Registers localized routes and builds their handlers.
#[derive(Clone)]
pub struct RouteLocalizer {
    negotiator: LocaleNegotiator,
    templates: TemplateLocalizer,
}

impl RouteLocalizer {
    pub fn new(settings: Arc<Settings>, store: Arc<dyn TextStore>) -> Self {
        Self {
            negotiator: LocaleNegotiator::new(Arc::clone(&settings)),
            templates: TemplateLocalizer::new(settings, store),
        }
    }

    pub fn negotiator(&self) -> &LocaleNegotiator {
        &self.negotiator
    }

    pub fn templates(&self) -> &TemplateLocalizer {
        &self.templates
    }

    /// Register `template` on `canonical_route` and its suffix aliases.
    ///
    /// # Arguments
    /// * `router` - Registry receiving the routes
    /// * `template` - Template file name inside the views directory
    /// * `route_base_url` - URL the router is mounted at (e.g. "/" or "/app/")
    /// * `canonical_route` - Canonical route pattern without locale (e.g. "/item/:id")
    /// * `suffixes` - Alias suffixes appended to `canonical_route`; the empty
    ///   suffix is prepended when missing
    ///
    /// # Returns
    /// * `Err(ConfigError::Pattern)` if a route pattern does not compile
    pub fn localize_routes<R: RouteRegistry + ?Sized>(
        &self,
        router: &mut R,
        template: &str,
        route_base_url: &str,
        canonical_route: &str,
        suffixes: &[&str],
    ) -> Result<(), ConfigError> {
        let mut all_suffixes: Vec<&str> = suffixes.to_vec();
        if !all_suffixes.contains(&"") {
            all_suffixes.insert(0, "");
        }

        let canonical = Arc::new(CanonicalRoute {
            template: template.to_string(),
            route_base_url: route_base_url.to_string(),
            route: CompiledPattern::compile(canonical_route)?,
            localized: CompiledPattern::compile(&format!("{LOCALE_PREFIX}{canonical_route}"))?,
        });

        for suffix in all_suffixes {
            let bare = CompiledPattern::compile(&format!("{canonical_route}{suffix}"))?;
            router.register_get(
                bare.clone(),
                Arc::new(BareRouteRedirect {
                    localizer: self.clone(),
                    canonical: Arc::clone(&canonical),
                    route: bare,
                }),
            );

            let localized =
                CompiledPattern::compile(&format!("{LOCALE_PREFIX}{canonical_route}{suffix}"))?;
            router.register_get(
                localized.clone(),
                Arc::new(LocalizedRoute {
                    localizer: self.clone(),
                    canonical: Arc::clone(&canonical),
                    route: localized,
                }),
            );
        }

        Ok(())
    }

    /// Register `template` on `route`, localized with the locale of the referer URL.
    ///
    /// # Arguments
    /// * `referer_locale_pattern` - Regular expression in which `:locale`
    ///   marks the locale segment of the referer URL (e.g. "/:locale/item/")
    ///
    /// # Returns
    /// * `Err(ConfigError::MissingLocalePlaceholder)` if the pattern lacks `:locale`
    pub fn localize_referer_route<R: RouteRegistry + ?Sized>(
        &self,
        router: &mut R,
        template: &str,
        route_base_url: &str,
        route: &str,
        referer_locale_pattern: &str,
    ) -> Result<(), ConfigError> {
        let referer_locale = compile_referer_pattern(referer_locale_pattern)?;
        let pattern = CompiledPattern::compile(route)?;

        router.register_get(
            pattern,
            Arc::new(RefererRoute {
                localizer: self.clone(),
                template: template.to_string(),
                route_base_url: route_base_url.to_string(),
                route: route.to_string(),
                referer_locale,
            }),
        );
        Ok(())
    }

    /// A handler rendering `template` with status 404 in the negotiated locale.
    ///
    /// `route_base_url` is the URL the router is mounted at; it prefixes the
    /// request path in the page's canonical URL.
    pub fn not_found(&self, template: &str, route_base_url: &str) -> Arc<NotFoundPage> {
        Arc::new(NotFoundPage {
            localizer: self.clone(),
            template: template.to_string(),
            route_base_url: route_base_url.to_string(),
        })
    }
}

/// Shared data of every route registered for one canonical route.
struct CanonicalRoute {
    template: String,
    route_base_url: String,
    /// Canonical route without locale
    route: CompiledPattern,
    /// Canonical route with the locale prefix
    localized: CompiledPattern,
}

impl CanonicalRoute {
    /// `{base}/{locale}{canonical route}` with variables taken from `path`
    /// matched against `route`.
    fn location(&self, locale: &str, route: &CompiledPattern, path: &str) -> PageResponse {
        let base = strip_trailing_slash(&self.route_base_url);
        let bindings = route.captures(path).unwrap_or_default();
        match self.route.build(&bindings) {
            Ok(canonical_path) => PageResponse::found(format!("{base}/{locale}{canonical_path}")),
            Err(e) => {
                error!(error = %e, path, "Cannot rebuild canonical route");
                PageResponse::page(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

/// Redirects a route without locale to the canonical localized route.
struct BareRouteRedirect {
    localizer: RouteLocalizer,
    canonical: Arc<CanonicalRoute>,
    route: CompiledPattern,
}

#[async_trait]
impl Handler for BareRouteRedirect {
    async fn handle(&self, request: &(dyn RequestContext + Sync)) -> PageResponse {
        let language = self.localizer.negotiator.best_supported(request);
        let locale = language.locale();

        let response = if self.route.variables().is_empty() {
            PageResponse::found(format!(
                "{}/{}{}",
                strip_trailing_slash(&self.canonical.route_base_url),
                locale,
                self.canonical.route.source()
            ))
        } else {
            self.canonical.location(locale, &self.route, request.path())
        };

        debug!(path = request.path(), location = ?response.location(), "Redirecting to localized route");
        response
    }
}

/// Renders the canonical localized route, redirects locale-prefixed aliases.
struct LocalizedRoute {
    localizer: RouteLocalizer,
    canonical: Arc<CanonicalRoute>,
    route: CompiledPattern,
}

#[async_trait]
impl Handler for LocalizedRoute {
    async fn handle(&self, request: &(dyn RequestContext + Sync)) -> PageResponse {
        let path = request.path();
        let Some(bindings) = self.route.captures(path) else {
            return PageResponse::page(StatusCode::NOT_FOUND, "Not Found");
        };
        let locale = bindings.get(LOCALE_VARIABLE).unwrap_or_default();
        let is_supported = self.localizer.negotiator.settings().is_supported(locale);
        let base = strip_trailing_slash(&self.canonical.route_base_url);

        if self.canonical.localized.is_match(path) {
            if is_supported {
                return self
                    .localizer
                    .templates
                    .render(
                        &self.canonical.template,
                        &self.canonical.route_base_url,
                        path,
                        locale,
                        StatusCode::OK,
                    )
                    .await;
            }

            // Same page in the best supported locale
            let best = self.localizer.negotiator.best_supported(request);
            let rest = &path[1 + locale.len()..];
            let location = format!("{base}/{}{rest}", best.locale());
            debug!(path, location = %location, "Unsupported locale, redirecting");
            return PageResponse::found(location);
        }

        let target_locale = if is_supported {
            locale.to_string()
        } else {
            self.localizer
                .negotiator
                .best_supported(request)
                .locale()
                .to_string()
        };

        let response = if self.canonical.localized.variables().len() < 2 {
            PageResponse::moved_permanently(format!(
                "{base}/{target_locale}{}",
                self.canonical.route.source()
            ))
        } else {
            self.canonical.location(&target_locale, &self.route, path)
        };

        debug!(path, location = ?response.location(), "Redirecting alias to canonical route");
        response
    }
}

/// Renders a route in the locale of the referer URL.
struct RefererRoute {
    localizer: RouteLocalizer,
    template: String,
    route_base_url: String,
    route: String,
    referer_locale: Regex,
}

#[async_trait]
impl Handler for RefererRoute {
    async fn handle(&self, request: &(dyn RequestContext + Sync)) -> PageResponse {
        let language = self
            .localizer
            .negotiator
            .referer_or_best(request, &self.referer_locale);

        self.localizer
            .templates
            .render(
                &self.template,
                &self.route_base_url,
                &self.route,
                language.locale(),
                StatusCode::OK,
            )
            .await
    }
}

/// Renders a template with status 404 in the negotiated locale.
pub struct NotFoundPage {
    localizer: RouteLocalizer,
    template: String,
    route_base_url: String,
}

#[async_trait]
impl Handler for NotFoundPage {
    async fn handle(&self, request: &(dyn RequestContext + Sync)) -> PageResponse {
        let language = self.localizer.negotiator.best_supported(request);
        self.localizer
            .templates
            .render(
                &self.template,
                &self.route_base_url,
                request.path(),
                language.locale(),
                StatusCode::NOT_FOUND,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PageRequest;
    use crate::routing::table::RouteTable;
    use crate::template::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_file("views/home.html", "<h1>__{title}</h1>")
            .with_file("views/home.html_en.json", r#"{"title": "Home"}"#)
            .with_file("views/home.html_fr.json", r#"{"title": "Accueil"}"#)
            .with_file("views/item.html", "<h1>__{title}</h1><a href=\"__{canonicalUrl}\"></a>")
            .with_file("views/item.html_en.json", r#"{"title": "Item"}"#)
            .with_file("views/item.html_fr.json", r#"{"title": "Objet"}"#)
            .with_file("views/404.html", "__{gone}")
            .with_file("views/404.html_fr.json", r#"{"gone": "Introuvable"}"#)
    }

    fn localizer() -> RouteLocalizer {
        let settings = Settings::new(["en", "fr"], "en", "views").unwrap();
        RouteLocalizer::new(Arc::new(settings), Arc::new(store()))
    }

    fn request(path: &str, languages: &str) -> PageRequest {
        PageRequest::new(path).with_header("accept-language", languages)
    }

    async fn get(table: &RouteTable, request: &PageRequest) -> PageResponse {
        table.dispatch(request).await.expect("Route should match")
    }

    // ==================== Registration Tests ====================

    #[test]
    fn test_canonical_route_registers_two_routes() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "home.html", "/", "/home", &[])
            .unwrap();
        assert_eq!(table.patterns(), vec!["/home", r"/:locale([\w]{2})/home"]);
    }

    #[test]
    fn test_suffixes_register_pairs_with_empty_suffix_first() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "home.html", "/", "/", &["index", "index.html"])
            .unwrap();
        assert_eq!(
            table.patterns(),
            vec![
                "/",
                r"/:locale([\w]{2})/",
                "/index",
                r"/:locale([\w]{2})/index",
                "/index.html",
                r"/:locale([\w]{2})/index.html",
            ]
        );
    }

    #[test]
    fn test_empty_suffix_not_duplicated() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "home.html", "/", "/home", &["/", ""])
            .unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.patterns()[0], "/home/");
    }

    #[test]
    fn test_invalid_route_pattern() {
        let mut table = RouteTable::new();
        let result = localizer().localize_routes(&mut table, "home.html", "/", "/item/:", &[]);
        assert!(matches!(result, Err(ConfigError::Pattern(_))));
    }

    // ==================== Bare Route Tests ====================

    #[tokio::test]
    async fn test_bare_route_redirects_to_negotiated_locale() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "home.html", "/", "/home", &[])
            .unwrap();

        let response = get(&table, &request("/home", "fr-fr,en;q=0.5")).await;
        assert_eq!(response, PageResponse::found("/fr/home"));

        let response = get(&table, &request("/home", "da")).await;
        assert_eq!(response, PageResponse::found("/en/home"));
    }

    #[tokio::test]
    async fn test_bare_alias_with_variables_keeps_values() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "item.html", "/app/", "/item/:id", &["/join"])
            .unwrap();

        let response = get(&table, &request("/item/42/join", "fr")).await;
        assert_eq!(response, PageResponse::found("/app/fr/item/42"));
    }

    // ==================== Localized Route Tests ====================

    #[tokio::test]
    async fn test_localized_canonical_renders() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "item.html", "/app/", "/item/:id", &[])
            .unwrap();

        let response = get(&table, &request("/fr/item/42", "en")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.body(),
            Some("<h1>Objet</h1><a href=\"/app/fr/item/42\"></a>")
        );
    }

    #[tokio::test]
    async fn test_localized_unsupported_locale_redirects() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "item.html", "/", "/item/:id", &[])
            .unwrap();

        let response = get(&table, &request("/jp/item/42", "fr;q=0.9,en;q=0.8")).await;
        assert_eq!(response, PageResponse::found("/fr/item/42"));
    }

    #[tokio::test]
    async fn test_localized_alias_without_variables_moves_permanently() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "home.html", "/", "/", &["index", "index.html"])
            .unwrap();

        let response = get(&table, &request("/fr/index.html", "en")).await;
        assert_eq!(response, PageResponse::moved_permanently("/fr/"));

        let response = get(&table, &request("/de/index", "da")).await;
        assert_eq!(response, PageResponse::moved_permanently("/en/"));
    }

    #[tokio::test]
    async fn test_localized_alias_with_variables() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "item.html", "/", "/item/:id", &["/join/:code"])
            .unwrap();

        let response = get(&table, &request("/fr/item/42/join/xyz", "en")).await;
        assert_eq!(response, PageResponse::found("/fr/item/42"));

        let response = get(&table, &request("/xx/item/42/join/xyz", "da")).await;
        assert_eq!(response, PageResponse::found("/en/item/42"));
    }

    #[tokio::test]
    async fn test_alias_redirect_chain_ends_on_canonical() {
        let mut table = RouteTable::new();
        localizer()
            .localize_routes(&mut table, "item.html", "/", "/item/:id", &["/join"])
            .unwrap();

        let first = get(&table, &request("/item/7/join", "")).await;
        assert_eq!(first, PageResponse::found("/en/item/7"));

        let second = get(&table, &request(first.location().unwrap(), "")).await;
        assert_eq!(second.status(), StatusCode::OK);
    }

    // ==================== Referer Route Tests ====================

    #[tokio::test]
    async fn test_referer_route_uses_referer_locale() {
        let mut table = RouteTable::new();
        localizer()
            .localize_referer_route(&mut table, "home.html", "/", "/partials/home", "/:locale/item/")
            .unwrap();

        let request = request("/partials/home", "en")
            .with_header("referer", "http://localhost:3000/fr/item/55293af2206f5d540ec87495#/join");
        let response = get(&table, &request).await;
        assert_eq!(response.body(), Some("<h1>Accueil</h1>"));
    }

    #[tokio::test]
    async fn test_referer_route_falls_back_to_header() {
        let mut table = RouteTable::new();
        localizer()
            .localize_referer_route(&mut table, "home.html", "/", "/partials/home", "/:locale/item/")
            .unwrap();

        let response = get(&table, &request("/partials/home", "fr")).await;
        assert_eq!(response.body(), Some("<h1>Accueil</h1>"));
    }

    #[test]
    fn test_referer_route_requires_placeholder() {
        let mut table = RouteTable::new();
        let result =
            localizer().localize_referer_route(&mut table, "home.html", "/", "/partials/home", "/item/");
        assert!(matches!(result, Err(ConfigError::MissingLocalePlaceholder(_))));
        assert!(table.is_empty());
    }

    // ==================== Not Found Tests ====================

    #[tokio::test]
    async fn test_not_found_page() {
        let mut table = RouteTable::new();
        let localizer = localizer();
        table.set_not_found(localizer.not_found("404.html", "/"));

        let response = get(&table, &request("/nowhere", "fr")).await;
        assert_eq!(response, PageResponse::page(StatusCode::NOT_FOUND, "Introuvable"));
    }

    #[tokio::test]
    async fn test_not_found_canonical_url_keeps_mount() {
        let store = MemoryStore::new()
            .with_file("views/404.html", "__{canonicalUrl}")
            .with_file("views/404.html_en.json", "{}");
        let settings = Settings::new(["en"], "en", "views").unwrap();
        let localizer = RouteLocalizer::new(Arc::new(settings), Arc::new(store));

        let mut table = RouteTable::new();
        table.set_not_found(localizer.not_found("404.html", "/app/"));

        let response = get(&table, &request("/nowhere", "en")).await;
        assert_eq!(response, PageResponse::page(StatusCode::NOT_FOUND, "/app/nowhere"));
    }
}
