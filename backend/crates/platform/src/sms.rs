//! Outbound SMS
//!
//! [`SmsSender`] is the delivery port; [`TwilioSms`] posts to the Twilio
//! Messages REST endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use crate::mail::DeliveryError;

pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// SMS delivery port
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub api_base: String,
}

impl TwilioConfig {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            account_sid,
            auth_token,
            from_number,
            api_base: TWILIO_API_BASE.to_string(),
        }
    }
}

pub struct TwilioSms {
    client: reqwest::Client,
    config: TwilioConfig,
}

#[derive(Deserialize)]
struct MessageResource {
    sid: String,
}

impl TwilioSms {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSms {
    async fn send(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Transport(format!(
                "SMS API returned {}: {}",
                status, detail
            )));
        }

        let message: MessageResource = response
            .json()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        tracing::info!(to = %to, sid = %message.sid, "SMS sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let mut config = TwilioConfig::new("AC123".into(), "tok".into(), "+15550000".into());
        config.api_base = "http://localhost:9999/".to_string();
        let sms = TwilioSms::new(config);
        assert_eq!(
            sms.messages_url(),
            "http://localhost:9999/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}
