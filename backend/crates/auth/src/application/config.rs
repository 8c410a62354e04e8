//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;

use crate::domain::value_object::otp::OtpPurpose;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Absolute session lifetime (7 days)
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Email verification code window (15 minutes)
    pub email_otp_ttl: Duration,
    /// Mobile verification code window (15 minutes)
    pub mobile_otp_ttl: Duration,
    /// Password reset code window (60 minutes)
    pub reset_otp_ttl: Duration,
    /// Startup capability flag for the SMS verification flow
    pub mobile_verification_enabled: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "peanutButter".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(7 * 24 * 3600),
            cookie_secure: true,
            cookie_same_site: SameSite::None,
            password_pepper: None,
            email_otp_ttl: Duration::from_secs(15 * 60),
            mobile_otp_ttl: Duration::from_secs(15 * 60),
            reset_otp_ttl: Duration::from_secs(60 * 60),
            mobile_verification_enabled: false,
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
            ..Self::with_random_secret()
        }
    }

    /// Validity window for a purpose
    pub fn otp_window(&self, purpose: OtpPurpose) -> chrono::Duration {
        let ttl = match purpose {
            OtpPurpose::EmailVerify => self.email_otp_ttl,
            OtpPurpose::MobileVerify => self.mobile_otp_ttl,
            OtpPurpose::PasswordReset => self.reset_otp_ttl,
        };
        chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::minutes(15))
    }

    /// Session lifetime as a chrono duration
    pub fn session_lifetime(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or(chrono::Duration::days(7))
    }

    /// Cookie settings for the session cookie
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs() as i64),
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_windows() {
        let config = AuthConfig::default();
        assert_eq!(config.otp_window(OtpPurpose::EmailVerify).num_minutes(), 15);
        assert_eq!(config.otp_window(OtpPurpose::MobileVerify).num_minutes(), 15);
        assert_eq!(config.otp_window(OtpPurpose::PasswordReset).num_minutes(), 60);
    }

    #[test]
    fn test_session_cookie() {
        let cookie = AuthConfig::default().session_cookie().build_set_cookie("tok");
        assert!(cookie.starts_with("peanutButter=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn test_random_secret_differs() {
        assert_ne!(
            AuthConfig::with_random_secret().session_secret,
            AuthConfig::with_random_secret().session_secret
        );
    }
}
