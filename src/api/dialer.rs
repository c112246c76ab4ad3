use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Client for the calling system that places the outbound demo call.
/// One POST per request, no automatic retry; a rejected or unreachable
/// dialer surfaces to the visitor as "temporarily unavailable".
#[derive(Clone)]
pub struct DialerClient {
    client: Client,
    config: DialerConfig,
}

#[derive(Clone)]
pub struct DialerConfig {
    pub base_url: String,
    pub api_key: String,
}

impl DialerConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("DIALER_API_URL").expect("DIALER_API_URL must be set"),
            api_key: std::env::var("DIALER_API_KEY").expect("DIALER_API_KEY must be set"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DialerError {
    #[error("dialer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("dialer rejected the call ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl DialerClient {
    pub fn new(config: DialerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build dialer HTTP client");
        Self { client, config }
    }

    /// Queue an outbound demo call. The industry tag selects the call
    /// script the agent opens with.
    pub async fn place_demo_call(
        &self,
        phone_number: &str,
        industry: Option<&str>,
    ) -> Result<(), DialerError> {
        let call_script = industry
            .map(|i| format!("{}-intro", i))
            .unwrap_or_else(|| "introduction".to_string());

        let response = self
            .client
            .post(format!("{}/demo-call", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "phoneNumber": phone_number,
                "industry": industry,
                "callType": "demo",
                "callScript": call_script,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DialerError::Api { status, body });
        }

        Ok(())
    }
}
