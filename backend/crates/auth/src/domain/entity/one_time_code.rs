//! One-Time Code Entity

use chrono::{DateTime, Duration, Utc};
use kernel::id::AccountId;

use crate::domain::value_object::otp::{OtpCode, OtpPurpose};

/// A stored code. Only the digest is kept.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub account_id: AccountId,
    pub purpose: OtpPurpose,
    pub code_digest: [u8; 32],
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl OneTimeCode {
    pub fn new(account_id: AccountId, purpose: OtpPurpose, code: &OtpCode, window: Duration) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            purpose,
            code_digest: code.digest(),
            created_at: now,
            expires_at: now + window,
            consumed_at: None,
        }
    }

    /// Unconsumed and strictly before expiry
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness() {
        let code = OtpCode::parse("123456").unwrap();
        let mut row = OneTimeCode::new(
            AccountId::new(1),
            OtpPurpose::EmailVerify,
            &code,
            Duration::minutes(15),
        );
        let now = Utc::now();
        assert!(row.is_live(now));
        assert!(!row.is_live(row.expires_at));

        row.consumed_at = Some(now);
        assert!(!row.is_live(now));
    }
}
