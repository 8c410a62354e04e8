//! Account Entity
//!
//! A registered or directory-provisioned user. Password material lives in
//! a separate credential row and never appears here.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;

use crate::domain::value_object::{
    credential_kind::CredentialKind, email::Email, phone_number::PhoneNumber, user_name::UserName,
};

/// Account entity
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: UserName,
    pub email: Option<Email>,
    pub phone: Option<PhoneNumber>,
    pub credential_kind: CredentialKind,
    pub email_verified: bool,
    pub mobile_verified: bool,
    /// Becomes `email` once an email-verify code is consumed
    pub pending_email: Option<Email>,
    /// Becomes `phone` once a mobile-verify code is consumed
    pub pending_phone: Option<PhoneNumber>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Either channel counts
    pub fn is_verified(&self) -> bool {
        self.email_verified || self.mobile_verified
    }

    /// Where an email-verify code goes: the pending address if any
    pub fn email_target(&self) -> Option<&Email> {
        self.pending_email.as_ref().or(self.email.as_ref())
    }

    /// Where a mobile-verify code goes: the pending number if any
    pub fn phone_target(&self) -> Option<&PhoneNumber> {
        self.pending_phone.as_ref().or(self.phone.as_ref())
    }
}

/// Input for creating an account
#[derive(Debug)]
pub struct NewAccount {
    pub username: UserName,
    pub email: Option<Email>,
    pub credential_kind: CredentialKind,
    /// Present for local accounts only
    pub password_hash: Option<HashedPassword>,
}

impl NewAccount {
    pub fn local(username: UserName, email: Email, password_hash: HashedPassword) -> Self {
        Self {
            username,
            email: Some(email),
            credential_kind: CredentialKind::Local,
            password_hash: Some(password_hash),
        }
    }

    pub fn directory(username: UserName) -> Self {
        Self {
            username,
            email: None,
            credential_kind: CredentialKind::Ldap,
            password_hash: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(1),
            username: UserName::from_db("alice"),
            email: Some(Email::from_db("alice@example.com")),
            phone: None,
            credential_kind: CredentialKind::Local,
            email_verified: false,
            mobile_verified: false,
            pending_email: None,
            pending_phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_verified_is_either_channel() {
        let mut a = account();
        assert!(!a.is_verified());
        a.mobile_verified = true;
        assert!(a.is_verified());
        a.mobile_verified = false;
        a.email_verified = true;
        assert!(a.is_verified());
    }

    #[test]
    fn test_pending_value_is_the_target() {
        let mut a = account();
        assert_eq!(a.email_target().map(Email::as_str), Some("alice@example.com"));
        a.pending_email = Some(Email::from_db("new@example.com"));
        assert_eq!(a.email_target().map(Email::as_str), Some("new@example.com"));

        assert!(a.phone_target().is_none());
        a.pending_phone = Some(PhoneNumber::from_db("+15550001111"));
        assert_eq!(a.phone_target().map(PhoneNumber::as_str), Some("+15550001111"));
    }
}
