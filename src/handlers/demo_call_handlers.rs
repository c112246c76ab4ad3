use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use chrono::Utc;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde_json::json;

use crate::handlers::site_dtos::{DemoCallRequest, DemoCallResponse};
use crate::utils::cooldown::{self, CooldownState, CooldownStore};
use crate::utils::validation::canonical_uae_phone;
use crate::AppState;

/// Cooldown store backed by the visitor's cookies: reads the incoming
/// `Cookie` header, collects `Set-Cookie` values to attach to the response.
pub struct CookieCooldownStore {
    cookie_header: String,
    secure: bool,
    pending: Vec<String>,
}

impl CookieCooldownStore {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookie_header = headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        // Don't use Secure flag in development (HTTP), only in production (HTTPS).
        let secure = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string())
            != "development";
        Self {
            cookie_header,
            secure,
            pending: Vec::new(),
        }
    }

    pub fn pending_cookies(&self) -> &[String] {
        &self.pending
    }
}

impl CooldownStore for CookieCooldownStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cookie_header.split(';').find_map(|c| {
            c.trim()
                .strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|v| v.to_string())
        })
    }

    fn set(&mut self, key: &str, value: String, ttl: std::time::Duration) {
        let options = if self.secure {
            "; HttpOnly; Secure; SameSite=Lax; Path=/"
        } else {
            "; HttpOnly; SameSite=Lax; Path=/"
        };
        self.pending
            .push(format!("{}={}{}; Max-Age={}", key, value, options, ttl.as_secs()));
    }
}

pub async fn request_demo_call(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<DemoCallRequest>,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let Some(canonical_phone) = canonical_uae_phone(&request.phone_number) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Please enter a valid UAE phone number"})),
        ));
    };

    let mut store = CookieCooldownStore::from_headers(&headers);
    let now = Utc::now();
    if let CooldownState::Throttled { retry_after } = cooldown::check(&store, now) {
        tracing::info!(
            "Demo call throttled, {}s left of the cooldown",
            retry_after.num_seconds()
        );
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"success": false, "error": "You can only request one demo call per hour"})),
        ));
    }

    // Server-side backstop keyed by canonical number: the cookie is
    // client-clearable. The slot is consumed even when the dialer call
    // then fails; a failed attempt still counts against the hour.
    // Scoped so the map guard is released before the dialer await.
    {
        let quota = Quota::per_hour(nonzero!(1u32));
        let entry = state
            .demo_call_limiter
            .entry(canonical_phone.clone())
            .or_insert_with(|| RateLimiter::keyed(quota));
        let limiter = entry.value();
        if limiter.check_key(&canonical_phone).is_err() {
            tracing::info!("Demo call rejected by the per-number backstop");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"success": false, "error": "You can only request one demo call per hour"})),
            ));
        }
    }

    if let Err(e) = state
        .dialer
        .place_demo_call(&canonical_phone, request.industry.as_deref())
        .await
    {
        tracing::error!("Failed to initiate demo call: {}", e);
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "Service temporarily unavailable. Please try again later."
            })),
        ));
    }

    if let Some(industry) = request.industry.as_deref() {
        tracing::info!("Demo call queued for industry: {}", industry);
    }

    cooldown::record(&mut store, now);

    let body = serde_json::to_string(&DemoCallResponse {
        success: true,
        error: None,
    })
    .map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": "Service temporarily unavailable. Please try again later."})),
        )
    })?;

    let mut response = Response::new(Body::from(body));
    for cookie in store.pending_cookies() {
        response.headers_mut().append(
            "Set-Cookie",
            cookie.parse().map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"success": false, "error": "Service temporarily unavailable. Please try again later."})),
                )
            })?,
        );
    }
    response
        .headers_mut()
        .insert("Content-Type", "application/json".parse().unwrap());
    Ok(response)
}
