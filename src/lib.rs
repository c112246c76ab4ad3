use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, RateLimiter};

pub mod handlers {
    pub mod contact_handlers;
    pub mod demo_call_handlers;
    pub mod site_dtos;
}
pub mod api {
    pub mod dialer;
    pub mod lead_intake;
}
pub mod utils {
    pub mod cooldown;
    pub mod validation;
}

use api::dialer::DialerClient;
use api::lead_intake::LeadIntakeConfig;
use handlers::{contact_handlers, demo_call_handlers};

pub type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

pub struct AppState {
    pub dialer: DialerClient,
    pub lead_intake: Option<LeadIntakeConfig>,
    // Server-side backstops for the cookie cooldown, keyed per canonical
    // phone number / lowercased email.
    pub demo_call_limiter: DashMap<String, KeyedLimiter>,
    pub contact_limiter: DashMap<String, KeyedLimiter>,
}

impl AppState {
    pub fn new(dialer: DialerClient, lead_intake: Option<LeadIntakeConfig>) -> Self {
        Self {
            dialer,
            lead_intake,
            demo_call_limiter: DashMap::new(),
            contact_limiter: DashMap::new(),
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// Routes consumed by the marketing site. Layers (CORS, tracing, static
/// files) are added in main so tests can drive the bare router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/industries", get(contact_handlers::list_industries))
        .route("/api/demo-call", post(demo_call_handlers::request_demo_call))
        .route("/api/contact", post(contact_handlers::submit_contact))
        .with_state(state)
}

pub fn validate_env() {
    let required_vars = ["ENVIRONMENT", "FRONTEND_URL", "DIALER_API_URL", "DIALER_API_KEY"];
    for var in required_vars.iter() {
        std::env::var(var).unwrap_or_else(|_| panic!("{} must be set", var));
    }
}
