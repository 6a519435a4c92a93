//! Twilio WhatsApp transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use super::MessageTransport;
use crate::config::MessagingConfig;
use crate::{Result, TripPlannerError};

/// Error body returned by the Twilio REST API
#[derive(Debug, Deserialize)]
struct TwilioError {
    code: Option<u32>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

/// Sends WhatsApp messages through the Twilio Messages resource
pub struct TwilioWhatsAppClient {
    client: Client,
    base_url: String,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl TwilioWhatsAppClient {
    pub fn new(config: &MessagingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("tripplanner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from: config.from.clone(),
            to: config.to.clone(),
        })
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| TripPlannerError::config(format!("{name} is not set")))
}

/// Twilio routes to WhatsApp only for `whatsapp:`-prefixed addresses
fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

#[async_trait]
impl MessageTransport for TwilioWhatsAppClient {
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    async fn send(&self, body: &str) -> Result<()> {
        let account_sid = required(&self.account_sid, "TWILIO_ACCOUNT_SID")?;
        let auth_token = required(&self.auth_token, "TWILIO_AUTH_TOKEN")?;
        let from = whatsapp_address(required(&self.from, "TWILIO_WHATSAPP_NUMBER")?);
        let to = whatsapp_address(required(&self.to, "USER_WHATSAPP_NUMBER")?);

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, account_sid
        );
        let response = self
            .client
            .post(&url)
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| TripPlannerError::messaging(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TwilioError>(&text) {
                Ok(TwilioError {
                    code: Some(code),
                    message,
                }) => format!("HTTP {status}: Unable to create record: {message} (code {code})"),
                Ok(TwilioError { message, .. }) => format!("HTTP {status}: {message}"),
                Err(_) => format!("HTTP {status}: {text}"),
            };
            error!("Twilio rejected message: {}", message);
            return Err(TripPlannerError::messaging(message));
        }

        match response.json::<TwilioMessage>().await {
            Ok(created) => info!("Queued WhatsApp message {}", created.sid),
            Err(e) => debug!("Message accepted but response was unreadable: {}", e),
        }
        Ok(())
    }
}
