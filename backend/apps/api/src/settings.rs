//! Environment Settings
//!
//! Reads process environment into the typed configs each crate expects.
//! A collaborator whose settings are missing is replaced by its disabled
//! stand-in and the fact is logged once at startup.

use std::env;
use std::sync::Arc;

use auth::domain::directory::{DirectoryBinder, DisabledDirectory};
use auth::{AuthConfig, LdapConfig, LdapDirectory};
use base64::Engine;
use base64::engine::general_purpose;
use blog::{BlogConfig, ContentGenerator, DisabledGenerator, GeminiClient, GeminiConfig};
use platform::mail::{DisabledMailer, Mailer, SmtpConfig, SmtpMailer};
use platform::sms::{SmsSender, TwilioConfig, TwilioSms};

const DEFAULT_SMTP_PORT: u16 = 587;

/// Non-empty value of `key`
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `true`, `1`, `yes` and `on` enable a flag; anything else disables it
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn flag(key: &str) -> Option<bool> {
    var(key).map(|v| parse_flag(&v))
}

fn decode_secret(encoded: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD.decode(encoded.trim())?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes, got {}", b.len()))
}

pub fn database_url() -> anyhow::Result<String> {
    var("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set in environment"))
}

pub fn bind_addr() -> String {
    var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:31113".to_string())
}

pub fn frontend_origins() -> String {
    var("FRONTEND_ORIGINS")
        .unwrap_or_else(|| "http://localhost:40922,http://127.0.0.1:40922".to_string())
}

/// Session, cookie and verification settings
///
/// Debug builds start from [`AuthConfig::development`] when no secret is
/// provided; release builds refuse to start without one.
pub fn auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match var("SESSION_SECRET") {
        Some(encoded) => AuthConfig {
            session_secret: decode_secret(&encoded)?,
            ..AuthConfig::default()
        },
        None if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SECRET not set, using a random development secret");
            AuthConfig::development()
        }
        None => anyhow::bail!("SESSION_SECRET must be set in production"),
    };

    if let Some(pepper) = var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }
    if let Some(secure) = flag("COOKIE_SECURE") {
        config.cookie_secure = secure;
    }
    config.mobile_verification_enabled = flag("MOBILE_VERIFICATION_ENABLED").unwrap_or(false);

    Ok(config)
}

pub fn blog_config() -> BlogConfig {
    BlogConfig::default()
}

pub fn mailer() -> Arc<dyn Mailer> {
    let (Some(host), Some(username), Some(password), Some(from)) = (
        var("SMTP_HOST"),
        var("SMTP_USERNAME"),
        var("SMTP_PASSWORD"),
        var("EMAIL_FROM"),
    ) else {
        tracing::warn!("SMTP not configured, outbound mail is disabled");
        return Arc::new(DisabledMailer);
    };

    let port = var("SMTP_PORT")
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_SMTP_PORT);

    match SmtpMailer::new(SmtpConfig {
        host: host.clone(),
        port,
        username,
        password,
        from,
    }) {
        Ok(mailer) => {
            tracing::info!(host = %host, port, "SMTP mailer configured");
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::warn!(error = %e, "SMTP setup failed, outbound mail is disabled");
            Arc::new(DisabledMailer)
        }
    }
}

pub fn sms() -> Option<Arc<dyn SmsSender>> {
    let (Some(sid), Some(token), Some(from)) = (
        var("TWILIO_ACCOUNT_SID"),
        var("TWILIO_AUTH_TOKEN"),
        var("TWILIO_FROM_NUMBER"),
    ) else {
        tracing::warn!("Twilio not configured, SMS delivery is disabled");
        return None;
    };

    tracing::info!("Twilio SMS configured");
    Some(Arc::new(TwilioSms::new(TwilioConfig::new(sid, token, from))))
}

pub fn directory() -> Arc<dyn DirectoryBinder> {
    let Some(url) = var("LDAP_URL") else {
        tracing::warn!("LDAP_URL not set, directory login is disabled");
        return Arc::new(DisabledDirectory);
    };

    let mut config = LdapConfig::new(url);
    if let Some(template) = var("LDAP_BIND_DN_TEMPLATE") {
        config.bind_dn_template = template;
    }
    tracing::info!(url = %config.url, "LDAP directory configured");
    Arc::new(LdapDirectory::new(config))
}

pub fn generator() -> Arc<dyn ContentGenerator> {
    let Some(key) = var("GEMINI_API_KEY") else {
        tracing::warn!("GEMINI_API_KEY not set, content generation is disabled");
        return Arc::new(DisabledGenerator);
    };

    let mut config = GeminiConfig::new(key);
    if let Some(url) = var("GEMINI_API_URL") {
        config.api_url = url;
    }
    Arc::new(GeminiClient::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" ON "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("enabled"));
    }

    #[test]
    fn test_decode_secret_requires_32_bytes() {
        let good = general_purpose::STANDARD.encode([7u8; 32]);
        assert_eq!(decode_secret(&good).unwrap(), [7u8; 32]);

        let short = general_purpose::STANDARD.encode([7u8; 16]);
        assert!(decode_secret(&short).is_err());
        assert!(decode_secret("not base64!").is_err());
    }
}
