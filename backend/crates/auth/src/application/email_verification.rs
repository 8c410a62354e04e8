//! Email Verification Use Case
//!
//! Codes go to the pending address when one is waiting, else to the
//! current one. Consuming a code promotes the pending address.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::application::check_session::Identity;
use crate::application::config::AuthConfig;
use crate::application::otp_ledger::OtpLedger;
use crate::application::outbound::{Outbound, verification_email};
use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, ConsumeEffect, OtpRepository};
use crate::domain::value_object::otp::OtpPurpose;
use crate::error::{AuthError, AuthResult};

/// Pick the account an OTP request is about: an explicit id wins,
/// otherwise the session's account.
pub(crate) async fn target_account<R>(
    repo: &R,
    explicit: Option<AccountId>,
    identity: Option<&Identity>,
) -> AuthResult<Account>
where
    R: AccountRepository,
{
    let account_id = match (explicit, identity) {
        (Some(id), _) => id,
        (None, Some(identity)) => identity.account_id,
        (None, None) => return Err(AuthError::Unauthenticated),
    };

    repo.find_account(account_id)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))
}

pub struct EmailVerificationUseCase<R>
where
    R: AccountRepository + OtpRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    outbound: Outbound,
}

impl<R> EmailVerificationUseCase<R>
where
    R: AccountRepository + OtpRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, outbound: Outbound) -> Self {
        Self {
            repo,
            config,
            outbound,
        }
    }

    /// Issue a code and mail it
    pub async fn request(
        &self,
        explicit: Option<AccountId>,
        identity: Option<&Identity>,
    ) -> AuthResult<()> {
        let account = target_account(self.repo.as_ref(), explicit, identity).await?;

        let target = account.email_target().cloned().ok_or_else(|| {
            AuthError::Validation("Please add an email address first".to_string())
        })?;

        if account.pending_email.is_none() && account.email_verified {
            return Err(AuthError::Validation("Email is already verified".to_string()));
        }

        let ledger = OtpLedger::new(self.repo.clone(), self.config.clone());
        let code = ledger.issue(account.id, OtpPurpose::EmailVerify).await?;
        self.outbound
            .dispatch_email(verification_email(target.as_str(), &account.username, &code));

        Ok(())
    }

    /// Consume a code for the account; no session needed
    pub async fn verify(&self, account_id: AccountId, otp: &str) -> AuthResult<Account> {
        OtpLedger::new(self.repo.clone(), self.config.clone())
            .consume_for(account_id, otp, ConsumeEffect::VerifyEmail)
            .await
    }
}
