//! Outbound collaborators and message templates
//!
//! Mail is always fire-and-forget. SMS is awaited by the mobile OTP
//! request, where delivery is the whole point of the call.

use std::sync::Arc;

use platform::mail::{DisabledMailer, Mailer, OutboundEmail};
use platform::sms::SmsSender;

use crate::application::config::AuthConfig;
use crate::domain::directory::{DirectoryBinder, DisabledDirectory};
use crate::domain::value_object::{otp::OtpCode, user_name::UserName};

/// External delivery and directory collaborators
#[derive(Clone)]
pub struct Outbound {
    pub mailer: Arc<dyn Mailer>,
    /// `None` when no SMS provider is configured
    pub sms: Option<Arc<dyn SmsSender>>,
    pub directory: Arc<dyn DirectoryBinder>,
}

impl Outbound {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        sms: Option<Arc<dyn SmsSender>>,
        directory: Arc<dyn DirectoryBinder>,
    ) -> Self {
        Self {
            mailer,
            sms,
            directory,
        }
    }

    /// Every collaborator refuses
    pub fn disabled() -> Self {
        Self {
            mailer: Arc::new(DisabledMailer),
            sms: None,
            directory: Arc::new(DisabledDirectory),
        }
    }

    /// SMS is usable only when the flag is on and a sender exists
    pub fn sms_enabled(&self, config: &AuthConfig) -> bool {
        config.mobile_verification_enabled && self.sms.is_some()
    }

    /// Queue an email on a detached task
    pub fn dispatch_email(&self, email: OutboundEmail) {
        platform::mail::dispatch(self.mailer.clone(), email);
    }
}

const SIGNATURE: &str = "Best regards,\nThe Blog Service Team";

pub fn verification_email(to: &str, username: &UserName, code: &OtpCode) -> OutboundEmail {
    OutboundEmail::new(
        to,
        "Verify Your Blog Service Email",
        format!(
            "Hello {},\n\n\
             Please verify your email using the following OTP code:\n\n\
             Your OTP: {}\n\n\
             This code will expire in 15 minutes.\n\n{}",
            username,
            code.as_str(),
            SIGNATURE
        ),
    )
}

pub fn password_reset_email(to: &str, username: &UserName, code: &OtpCode) -> OutboundEmail {
    OutboundEmail::new(
        to,
        "Reset Your Blog Service Password",
        format!(
            "Hello {},\n\n\
             You have requested to reset your password for the Blog Service.\n\n\
             Please use the following OTP code to reset your password:\n\n\
             Your OTP: {}\n\n\
             This code will expire in 1 hour.\n\n\
             If you did not request a password reset, please ignore this email.\n\n{}",
            username,
            code.as_str(),
            SIGNATURE
        ),
    )
}

pub fn verification_sms(username: &UserName, code: &OtpCode) -> String {
    format!(
        "Hello {}, your Blog Service verification code is: {}. This code will expire in 15 minutes.",
        username,
        code.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_code() {
        let name = UserName::from_db("alice");
        let code = OtpCode::parse("004211").unwrap();

        let email = verification_email("a@example.com", &name, &code);
        assert_eq!(email.subject, "Verify Your Blog Service Email");
        assert!(email.body.contains("Your OTP: 004211"));
        assert!(email.body.contains("15 minutes"));

        let reset = password_reset_email("a@example.com", &name, &code);
        assert!(reset.body.contains("1 hour"));

        assert_eq!(
            verification_sms(&name, &code),
            "Hello alice, your Blog Service verification code is: 004211. This code will expire in 15 minutes."
        );
    }

    #[test]
    fn test_sms_enabled_needs_flag_and_sender() {
        let outbound = Outbound::disabled();
        let mut config = AuthConfig::default();
        assert!(!outbound.sms_enabled(&config));
        config.mobile_verification_enabled = true;
        assert!(!outbound.sms_enabled(&config));
    }
}
