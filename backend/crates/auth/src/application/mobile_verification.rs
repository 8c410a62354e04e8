//! Mobile Verification Use Case
//!
//! Available only when mobile verification is switched on at startup.
//! Unlike email, the SMS send is awaited: its outcome is the response.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::application::check_session::Identity;
use crate::application::config::AuthConfig;
use crate::application::email_verification::target_account;
use crate::application::otp_ledger::OtpLedger;
use crate::application::outbound::{Outbound, verification_sms};
use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, ConsumeEffect, OtpRepository};
use crate::domain::value_object::{otp::OtpPurpose, phone_number::PhoneNumber};
use crate::error::{AuthError, AuthResult};

pub struct MobileOtpRequest {
    pub explicit: Option<AccountId>,
    /// Becomes the pending phone before the code is sent
    pub phone: Option<String>,
}

pub struct MobileVerificationUseCase<R>
where
    R: AccountRepository + OtpRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    outbound: Outbound,
}

impl<R> MobileVerificationUseCase<R>
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

    fn ensure_enabled(&self) -> AuthResult<()> {
        if self.config.mobile_verification_enabled {
            Ok(())
        } else {
            Err(AuthError::MobileVerificationDisabled)
        }
    }

    /// Issue a code and text it
    pub async fn request(
        &self,
        input: MobileOtpRequest,
        identity: Option<&Identity>,
    ) -> AuthResult<()> {
        self.ensure_enabled()?;

        let sms = self.outbound.sms.clone().ok_or_else(|| {
            AuthError::Validation("SMS functionality is not enabled on the server".to_string())
        })?;

        let mut account = target_account(self.repo.as_ref(), input.explicit, identity).await?;

        let mut new_pending = None;
        if let Some(raw) = input.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            let phone = PhoneNumber::new(raw)?;
            if account.phone.as_ref() != Some(&phone) {
                ensure_phone_free(self.repo.as_ref(), &account, &phone).await?;
                account.pending_phone = Some(phone.clone());
                new_pending = Some(phone);
            }
        }

        let target = account.phone_target().cloned().ok_or_else(|| {
            AuthError::Validation("Please add a phone number first".to_string())
        })?;

        if account.pending_phone.is_none() && account.mobile_verified {
            return Err(AuthError::Validation("Phone is already verified".to_string()));
        }

        // Nothing is stored until every check has passed
        if let Some(phone) = &new_pending {
            self.repo.set_pending_phone(account.id, phone).await?;
        }

        let ledger = OtpLedger::new(self.repo.clone(), self.config.clone());
        let code = ledger.issue(account.id, OtpPurpose::MobileVerify).await?;

        if let Err(e) = sms
            .send(target.as_str(), &verification_sms(&account.username, &code))
            .await
        {
            tracing::error!(account_id = %account.id, error = %e, "Verification SMS failed");
            return Err(AuthError::Delivery(
                "Failed to send SMS. Please try again or contact support.".to_string(),
            ));
        }

        Ok(())
    }

    /// Consume a code for the account; no session needed
    pub async fn verify(&self, account_id: AccountId, otp: &str) -> AuthResult<Account> {
        self.ensure_enabled()?;

        OtpLedger::new(self.repo.clone(), self.config.clone())
            .consume_for(account_id, otp, ConsumeEffect::VerifyMobile)
            .await
    }
}

/// Reject a number already confirmed on another account
pub(crate) async fn ensure_phone_free<R>(
    repo: &R,
    account: &Account,
    phone: &PhoneNumber,
) -> AuthResult<()>
where
    R: AccountRepository,
{
    match repo.find_account_by_phone(phone).await? {
        Some(other) if other.id != account.id => Err(AuthError::Conflict(
            "Phone number is already in use by another account".to_string(),
        )),
        _ => Ok(()),
    }
}
