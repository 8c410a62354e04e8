//! Profile Use Case
//!
//! Public user listing plus the signed-in user's own contact details and
//! notification preferences.

use std::sync::Arc;

use kernel::id::AccountId;
use platform::sanitize::sanitize_text;

use crate::application::check_session::Identity;
use crate::application::config::AuthConfig;
use crate::application::mobile_verification::ensure_phone_free;
use crate::application::otp_ledger::OtpLedger;
use crate::application::outbound::{Outbound, verification_email, verification_sms};
use crate::domain::entity::{account::Account, notification_preference::NotificationPreference};
use crate::domain::repository::{AccountRepository, OtpRepository, PreferenceRepository};
use crate::domain::value_object::{email::Email, otp::OtpPurpose, phone_number::PhoneNumber};
use crate::error::{AuthError, AuthResult};

/// Page size when the caller does not give one
pub const DEFAULT_LIMIT: i64 = 20;

pub struct ProfileUseCase<R>
where
    R: AccountRepository + OtpRepository + PreferenceRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    outbound: Outbound,
}

impl<R> ProfileUseCase<R>
where
    R: AccountRepository + OtpRepository + PreferenceRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, outbound: Outbound) -> Self {
        Self {
            repo,
            config,
            outbound,
        }
    }

    pub async fn list_users(&self, limit: Option<i64>, offset: Option<i64>) -> AuthResult<Vec<Account>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100);
        let offset = offset.unwrap_or(0).max(0);
        self.repo.list_accounts(limit, offset).await
    }

    pub async fn get_user(&self, id: AccountId) -> AuthResult<Account> {
        self.repo
            .find_account(id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))
    }

    /// The signed-in account, freshly loaded
    pub async fn current(&self, identity: &Identity) -> AuthResult<Account> {
        self.get_user(identity.account_id).await
    }

    /// Store a new address as pending and mail a code to it
    pub async fn change_email(&self, identity: &Identity, raw: &str) -> AuthResult<Account> {
        let raw = sanitize_text(raw);
        if raw.is_empty() {
            return Err(AuthError::Validation(
                "Email is required after sanitization".to_string(),
            ));
        }
        let email = Email::new(raw)?;

        if let Some(other) = self.repo.find_account_by_email(&email).await? {
            if other.id != identity.account_id {
                return Err(AuthError::Conflict(
                    "Email address is already in use by another account".to_string(),
                ));
            }
        }

        let mut account = self.current(identity).await?;
        self.repo.set_pending_email(account.id, &email).await?;
        account.pending_email = Some(email.clone());

        let ledger = OtpLedger::new(self.repo.clone(), self.config.clone());
        let code = ledger.issue(account.id, OtpPurpose::EmailVerify).await?;
        self.outbound
            .dispatch_email(verification_email(email.as_str(), &account.username, &code));

        tracing::info!(account_id = %account.id, "Email change pending verification");
        Ok(account)
    }

    /// Store a new number as pending, issue a code and text it when SMS is
    /// available. Returns whether the text went out.
    pub async fn change_phone(&self, identity: &Identity, raw: &str) -> AuthResult<(Account, bool)> {
        let raw = sanitize_text(raw);
        if raw.is_empty() {
            return Err(AuthError::Validation(
                "Phone number is required after sanitization".to_string(),
            ));
        }
        let phone = PhoneNumber::new(&raw)?;

        let mut account = self.current(identity).await?;
        ensure_phone_free(self.repo.as_ref(), &account, &phone).await?;
        self.repo.set_pending_phone(account.id, &phone).await?;
        account.pending_phone = Some(phone.clone());

        let ledger = OtpLedger::new(self.repo.clone(), self.config.clone());
        let code = ledger.issue(account.id, OtpPurpose::MobileVerify).await?;

        let sms_sent = match (&self.outbound.sms, self.outbound.sms_enabled(&self.config)) {
            (Some(sms), true) => {
                match sms
                    .send(phone.as_str(), &verification_sms(&account.username, &code))
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(account_id = %account.id, error = %e, "Verification SMS failed");
                        false
                    }
                }
            }
            _ => false,
        };

        tracing::info!(account_id = %account.id, sms_sent, "Phone change pending verification");
        Ok((account, sms_sent))
    }

    pub async fn preferences(&self, identity: &Identity) -> AuthResult<NotificationPreference> {
        self.repo.preferences(identity.account_id).await
    }

    pub async fn update_preferences(
        &self,
        identity: &Identity,
        preferences: NotificationPreference,
    ) -> AuthResult<NotificationPreference> {
        self.repo
            .update_preferences(identity.account_id, preferences)
            .await?;
        Ok(preferences)
    }
}
