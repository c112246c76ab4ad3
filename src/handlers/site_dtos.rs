use serde::{Deserialize, Serialize};

/// Industries the site offers in its contact-form dropdown. The field is
/// still free text so the demo widget can pass its own tags.
pub const KNOWN_INDUSTRIES: [&str; 6] = [
    "Real Estate",
    "Healthcare",
    "Recruitment",
    "Hospitality",
    "Business Setup",
    "Other",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoCallRequest {
    pub phone_number: String,
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DemoCallResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub industry: String,
    #[serde(default)]
    pub message: Option<String>,
}
