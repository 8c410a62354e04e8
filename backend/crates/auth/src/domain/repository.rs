//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::password::HashedPassword;
use uuid::Uuid;

use crate::domain::entity::{
    account::{Account, NewAccount},
    notification_preference::{NotificationPreference, Recipient},
    one_time_code::OneTimeCode,
    session::Session,
};
use crate::domain::value_object::{
    email::Email, otp::OtpPurpose, phone_number::PhoneNumber, user_name::UserName,
};
use crate::error::AuthResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert an account (and its credential row when a hash is given).
    /// A duplicate username or email is `AuthError::Conflict`.
    async fn create_account(&self, account: &NewAccount) -> AuthResult<Account>;

    async fn find_account(&self, id: AccountId) -> AuthResult<Option<Account>>;

    async fn find_account_by_username(&self, username: &UserName) -> AuthResult<Option<Account>>;

    /// Match on the confirmed address only, not pending ones
    async fn find_account_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    async fn find_account_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<Account>>;

    /// Stored hash for a local account
    async fn password_hash(&self, id: AccountId) -> AuthResult<Option<HashedPassword>>;

    /// Return the account for a directory user, creating it on first bind
    async fn provision_directory_account(&self, username: &UserName) -> AuthResult<Account>;

    async fn set_pending_email(&self, id: AccountId, email: &Email) -> AuthResult<()>;

    async fn set_pending_phone(&self, id: AccountId, phone: &PhoneNumber) -> AuthResult<()>;

    async fn list_accounts(&self, limit: i64, offset: i64) -> AuthResult<Vec<Account>>;
}

/// How a submitted code is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSelector {
    /// Verification flows name the account
    ForAccount(AccountId, [u8; 32]),
    /// Password reset only has the code
    Bare([u8; 32]),
}

impl CodeSelector {
    pub fn digest(&self) -> &[u8; 32] {
        match self {
            CodeSelector::ForAccount(_, digest) | CodeSelector::Bare(digest) => digest,
        }
    }

    pub fn account(&self) -> Option<AccountId> {
        match self {
            CodeSelector::ForAccount(id, _) => Some(*id),
            CodeSelector::Bare(_) => None,
        }
    }
}

/// Mutation applied in the same transaction that burns a code
#[derive(Debug, Clone)]
pub enum ConsumeEffect {
    /// Promote any pending email and mark email verified
    VerifyEmail,
    /// Promote any pending phone and mark mobile verified
    VerifyMobile,
    /// Replace the local password hash
    ReplacePassword(HashedPassword),
}

impl ConsumeEffect {
    pub fn purpose(&self) -> OtpPurpose {
        match self {
            ConsumeEffect::VerifyEmail => OtpPurpose::EmailVerify,
            ConsumeEffect::VerifyMobile => OtpPurpose::MobileVerify,
            ConsumeEffect::ReplacePassword(_) => OtpPurpose::PasswordReset,
        }
    }
}

/// One-time code repository trait
#[trait_variant::make(OtpRepository: Send)]
pub trait LocalOtpRepository {
    /// Store a code, replacing any earlier one for (account, purpose)
    async fn store_code(&self, code: &OneTimeCode) -> AuthResult<()>;

    /// Burn a live matching code and apply the effect, atomically.
    /// `None` when no live code matches; nothing is written in that case.
    async fn consume_code(
        &self,
        selector: &CodeSelector,
        effect: &ConsumeEffect,
    ) -> AuthResult<Option<Account>>;

    /// Owner of a live matching code, without burning it
    async fn peek_code(
        &self,
        selector: &CodeSelector,
        purpose: OtpPurpose,
    ) -> AuthResult<Option<Account>>;

    /// Delete codes that expired before the cutoff
    async fn purge_stale_codes(&self, older_than: DateTime<Utc>) -> AuthResult<u64>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn create_session(&self, session: &Session) -> AuthResult<()>;

    async fn find_session(&self, session_id: Uuid) -> AuthResult<Option<Session>>;

    /// Update last activity
    async fn touch_session(&self, session_id: Uuid) -> AuthResult<()>;

    async fn delete_session(&self, session_id: Uuid) -> AuthResult<()>;

    /// Revoke every session of an account
    async fn delete_sessions_for(&self, account_id: AccountId) -> AuthResult<u64>;

    async fn purge_expired_sessions(&self) -> AuthResult<u64>;
}

/// Notification preference repository trait
#[trait_variant::make(PreferenceRepository: Send)]
pub trait LocalPreferenceRepository {
    /// Stored preferences, or the defaults when none were saved
    async fn preferences(&self, account_id: AccountId) -> AuthResult<NotificationPreference>;

    async fn update_preferences(
        &self,
        account_id: AccountId,
        preferences: NotificationPreference,
    ) -> AuthResult<()>;

    /// Accounts with an email that opted into new-blog mail, minus `except`
    async fn blog_subscribers(&self, except: AccountId) -> AuthResult<Vec<Recipient>>;

    /// The account as a comment-mail recipient, if it has an email and opted in
    async fn comment_subscriber(&self, account_id: AccountId) -> AuthResult<Option<Recipient>>;
}

/// Resource types that have an owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Blog,
    Comment,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Blog => "Blog",
            ResourceKind::Comment => "Comment",
        }
    }
}

/// Owner lookup for the ownership guard
#[trait_variant::make(OwnershipRepository: Send)]
pub trait LocalOwnershipRepository {
    async fn owner_of(&self, kind: ResourceKind, id: i64) -> AuthResult<Option<AccountId>>;
}

/// Ownership source for stores that hold no owned resources
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOwnedResources;

impl OwnershipRepository for NoOwnedResources {
    async fn owner_of(&self, _kind: ResourceKind, _id: i64) -> AuthResult<Option<AccountId>> {
        Ok(None)
    }
}

/// Everything the auth routes need from one store
pub trait AuthStore:
    AccountRepository
    + OtpRepository
    + SessionRepository
    + PreferenceRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: AccountRepository
        + OtpRepository
        + SessionRepository
        + PreferenceRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
