use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::handlers::site_dtos::ContactRequest;

/// SMTP handoff for contact-form leads. All four variables must be present
/// for the mailer to be enabled; otherwise leads are only logged.
#[derive(Clone)]
pub struct LeadIntakeConfig {
    pub smtp_server: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub leads_inbox: String,
}

impl LeadIntakeConfig {
    pub fn from_env() -> Option<Self> {
        Some(Self {
            smtp_server: std::env::var("SMTP_SERVER").ok()?,
            smtp_username: std::env::var("SMTP_USERNAME").ok()?,
            smtp_password: std::env::var("SMTP_PASSWORD").ok()?,
            leads_inbox: std::env::var("LEADS_INBOX").ok()?,
        })
    }
}

pub fn send_lead_notification(
    config: &LeadIntakeConfig,
    lead: &ContactRequest,
) -> anyhow::Result<()> {
    let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
    let mailer = SmtpTransport::starttls_relay(&config.smtp_server)?
        .port(587)
        .credentials(creds)
        .build();

    let body = format!(
        "New lead from the website\n\n\
         Name: {} {}\n\
         Email: {}\n\
         Phone: {}\n\
         Company: {}\n\
         Industry: {}\n\n\
         {}",
        lead.first_name,
        lead.last_name,
        lead.email,
        lead.phone,
        lead.company,
        lead.industry,
        lead.message.as_deref().unwrap_or("(no message)"),
    );

    let email = Message::builder()
        .from(config.smtp_username.parse()?)
        .reply_to(lead.email.parse()?)
        .to(config.leads_inbox.parse()?)
        .subject(format!("New lead: {} ({})", lead.company, lead.industry))
        .body(body)?;

    mailer.send(&email)?;
    tracing::info!("Lead from {} forwarded to {}", lead.email, config.leads_inbox);
    Ok(())
}
