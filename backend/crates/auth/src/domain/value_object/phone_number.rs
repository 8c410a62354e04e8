//! Phone Number Value Object (E.164)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// E.164 allows at most 15 digits after the '+'
const MAX_DIGITS: usize = 15;
const MIN_DIGITS: usize = 2;

/// Phone number in E.164 form, e.g. `+15551234567`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: &str) -> AuthResult<Self> {
        let trimmed = raw.trim();
        let valid = trimmed
            .strip_prefix('+')
            .map(|digits| {
                (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len())
                    && digits.chars().all(|c| c.is_ascii_digit())
            })
            .unwrap_or(false);

        if !valid {
            return Err(AuthError::Validation(
                "Phone number must be in E.164 format (e.g., +1234567890)".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_valid() {
        assert_eq!(PhoneNumber::new(" +15551234567 ").unwrap().as_str(), "+15551234567");
        assert!(PhoneNumber::new("+44").is_ok());
    }

    #[test]
    fn test_phone_invalid() {
        assert!(PhoneNumber::new("15551234567").is_err());
        assert!(PhoneNumber::new("+1").is_err());
        assert!(PhoneNumber::new("+1555-123-4567").is_err());
        assert!(PhoneNumber::new("+1234567890123456").is_err());
        assert!(PhoneNumber::new("").is_err());
    }
}
