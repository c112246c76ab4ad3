use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde_json::{json, Map, Value};

use crate::handlers::site_dtos::{ContactRequest, KNOWN_INDUSTRIES};
use crate::utils::validation::{is_valid_email, is_valid_uae_phone};
use crate::AppState;

pub async fn list_industries() -> Json<Value> {
    Json(json!({ "industries": KNOWN_INDUSTRIES }))
}

fn validate(request: &ContactRequest) -> Map<String, Value> {
    let mut errors = Map::new();
    if request.first_name.trim().is_empty() {
        errors.insert("firstName".into(), "First name is required".into());
    }
    if request.last_name.trim().is_empty() {
        errors.insert("lastName".into(), "Last name is required".into());
    }
    if request.email.trim().is_empty() {
        errors.insert("email".into(), "Email is required".into());
    } else if !is_valid_email(&request.email) {
        errors.insert("email".into(), "Please enter a valid email address".into());
    }
    if request.phone.trim().is_empty() {
        errors.insert("phone".into(), "Phone number is required".into());
    } else if !is_valid_uae_phone(&request.phone) {
        errors.insert("phone".into(), "Please enter a valid UAE phone number".into());
    }
    if request.company.trim().is_empty() {
        errors.insert("company".into(), "Company name is required".into());
    }
    if request.industry.trim().is_empty() {
        errors.insert("industry".into(), "Please select your industry".into());
    }
    errors
}

pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let errors = validate(&request);
    if !errors.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "errors": errors})),
        ));
    }

    // 3 submissions per hour per email address.
    let quota = Quota::per_hour(nonzero!(3u32));
    let limiter_key = request.email.trim().to_lowercase();
    let entry = state
        .contact_limiter
        .entry(limiter_key.clone())
        .or_insert_with(|| RateLimiter::keyed(quota));
    let limiter = entry.value();
    if limiter.check_key(&limiter_key).is_err() {
        tracing::info!("Contact form rate limit exceeded");
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "success": false,
                "message": "Something went wrong. Please try again later."
            })),
        ));
    }

    match state.lead_intake.clone() {
        Some(config) => {
            // Don't hold the HTTP response on SMTP.
            let lead = request.clone();
            tokio::spawn(async move {
                if let Err(e) = crate::api::lead_intake::send_lead_notification(&config, &lead) {
                    tracing::error!("Failed to forward lead from {}: {}", lead.email, e);
                }
            });
        }
        None => {
            tracing::info!(
                "Lead intake not configured; lead from {} at {} ({}) logged only",
                request.email,
                request.company,
                request.industry
            );
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Thank you! We'll be in touch with you shortly."
    })))
}
