//! Session Entity
//!
//! Server-side session referenced by the signed cookie token.

use chrono::{DateTime, Duration, Utc};
use kernel::id::AccountId;
use uuid::Uuid;

use crate::domain::value_object::{credential_kind::CredentialKind, user_name::UserName};

/// Session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (UUID v4)
    pub session_id: Uuid,
    pub account_id: AccountId,
    pub username: UserName,
    pub credential_kind: CredentialKind,
    /// Absolute expiry; activity never extends it
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(
        account_id: AccountId,
        username: UserName,
        credential_kind: CredentialKind,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            account_id,
            username,
            credential_kind,
            expires_at: now + ttl,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let live = Session::new(
            AccountId::new(1),
            UserName::from_db("alice"),
            CredentialKind::Local,
            Duration::days(7),
        );
        assert!(!live.is_expired());

        let dead = Session::new(
            AccountId::new(1),
            UserName::from_db("alice"),
            CredentialKind::Local,
            Duration::seconds(-1),
        );
        assert!(dead.is_expired());
    }
}
