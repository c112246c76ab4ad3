use dotenvy::dotenv;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use convoflow_backend::api::dialer::{DialerClient, DialerConfig};
use convoflow_backend::api::lead_intake::LeadIntakeConfig;
use convoflow_backend::{app, validate_env, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let _sentry_guard = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,convoflow_backend=debug"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    validate_env();

    let dialer = DialerClient::new(DialerConfig::from_env());
    let lead_intake = LeadIntakeConfig::from_env();
    if lead_intake.is_none() {
        tracing::warn!("SMTP is not configured, contact leads will only be logged");
    }
    let state = Arc::new(AppState::new(dialer, lead_intake));

    let frontend_url =
        std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_origin(AllowOrigin::exact(
            frontend_url.parse().expect("Invalid FRONTEND_URL"),
        ))
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::ORIGIN,
        ])
        // Cookie-based cooldown needs credentials on the demo-call request.
        .allow_credentials(true);

    let app = app(state)
        // Prebuilt marketing bundle (landing page, privacy policy, terms).
        .fallback_service(ServeDir::new("static"))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let port = match std::env::var("ENVIRONMENT").as_deref() {
        Ok("staging") => 3100,
        _ => 3000,
    };
    tracing::info!("Starting server on port {}", port);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
