use anyhow::{Context, Result};
use axum::Router;
use locale_router::config::Config;
use locale_router::routing::{RouteLocalizer, RouteTable};
use locale_router::template::FsStore;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_router=info".parse()?),
        )
        .init();

    info!("Starting locale router");

    let config = Config::from_env()?;
    info!(
        "Serving {} with locales {:?} (default: {})",
        config.settings.views_directory().display(),
        config.settings.supported_locales(),
        config.settings.default_locale()
    );

    let settings = Arc::new(config.settings.clone());
    let localizer = RouteLocalizer::new(settings, Arc::new(FsStore));

    // Landing page, reachable from its index aliases
    let mut routes = RouteTable::new();
    localizer
        .localize_routes(
            &mut routes,
            "index.html",
            &config.route_base_url,
            "/",
            &["index", "index.html"],
        )
        .context("Failed to register landing page routes")?;

    if let Some(template) = &config.not_found_template {
        info!("Using {} as the 404 page", template);
        routes.set_not_found(localizer.not_found(template, &config.route_base_url));
    }

    let mount = config.route_base_url.trim_end_matches('/');
    let app = if mount.is_empty() {
        routes.into_router()
    } else {
        Router::new().nest_service(mount, routes.into_router())
    };
    let app = app.layer(
        tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            },
        ),
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("✓ Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Locale router shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
