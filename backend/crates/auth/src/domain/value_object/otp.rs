//! One-Time Code Value Objects
//!
//! Six fixed-width digits. Only the SHA-256 digest is ever stored.

use std::fmt;

use rand::Rng;

/// Number of digits in a code
pub const OTP_LENGTH: usize = 6;

/// Which flow a code belongs to; each has its own window and its own slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtpPurpose {
    EmailVerify,
    MobileVerify,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::EmailVerify => "email_verify",
            OtpPurpose::MobileVerify => "mobile_verify",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "email_verify" => Some(OtpPurpose::EmailVerify),
            "mobile_verify" => Some(OtpPurpose::MobileVerify),
            "password_reset" => Some(OtpPurpose::PasswordReset),
            _ => None,
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clear-text code, alive only between issue and delivery (or between
/// request parsing and lookup)
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Uniform over 000000..=999999; leading zeros are significant
    pub fn generate() -> Self {
        let n: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("{:06}", n))
    }

    /// Accept exactly six ASCII digits after trimming
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.len() == OTP_LENGTH && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookup key stored in place of the code
    pub fn digest(&self) -> [u8; 32] {
        platform::crypto::sha256(self.0.as_bytes())
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OtpCode").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_fixed_width_digits() {
        for _ in 0..200 {
            let code = OtpCode::generate();
            assert_eq!(code.as_str().len(), OTP_LENGTH);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_leading_zeros_are_significant() {
        let padded = OtpCode::parse("007123").unwrap();
        assert!(OtpCode::parse("7123").is_none());
        assert_ne!(padded.digest(), platform::crypto::sha256(b"7123"));
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert!(OtpCode::parse("12a456").is_none());
        assert!(OtpCode::parse("1234567").is_none());
        assert!(OtpCode::parse(" 123456 ").is_some());
    }

    #[test]
    fn test_purpose_codes() {
        for p in [
            OtpPurpose::EmailVerify,
            OtpPurpose::MobileVerify,
            OtpPurpose::PasswordReset,
        ] {
            assert_eq!(OtpPurpose::from_db(p.as_str()), Some(p));
        }
    }

    #[test]
    fn test_debug_redaction() {
        let code = OtpCode::parse("123456").unwrap();
        assert!(!format!("{:?}", code).contains("123456"));
    }
}
