//! OTP Ledger
//!
//! Issues and consumes one-time codes. Every way a code can fail to
//! match collapses into `AuthError::InvalidOrExpiredCode`.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::application::config::AuthConfig;
use crate::domain::entity::{account::Account, one_time_code::OneTimeCode};
use crate::domain::repository::{CodeSelector, ConsumeEffect, OtpRepository};
use crate::domain::value_object::otp::{OtpCode, OtpPurpose};
use crate::error::{AuthError, AuthResult};

pub struct OtpLedger<R>
where
    R: OtpRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> OtpLedger<R>
where
    R: OtpRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Generate and store a fresh code, superseding any earlier one for
    /// the same (account, purpose). The clear code goes to delivery only.
    pub async fn issue(&self, account_id: AccountId, purpose: OtpPurpose) -> AuthResult<OtpCode> {
        let code = OtpCode::generate();
        let row = OneTimeCode::new(account_id, purpose, &code, self.config.otp_window(purpose));
        self.repo.store_code(&row).await?;

        tracing::info!(account_id = %account_id, purpose = %purpose, "One-time code issued");
        Ok(code)
    }

    /// Consume a code tied to a known account
    pub async fn consume_for(
        &self,
        account_id: AccountId,
        raw_code: &str,
        effect: ConsumeEffect,
    ) -> AuthResult<Account> {
        let code = Self::parse(raw_code)?;
        self.consume(CodeSelector::ForAccount(account_id, code.digest()), effect)
            .await
    }

    /// Consume a code found by value alone
    pub async fn consume_bare(&self, raw_code: &str, effect: ConsumeEffect) -> AuthResult<Account> {
        let code = Self::parse(raw_code)?;
        self.consume(CodeSelector::Bare(code.digest()), effect).await
    }

    async fn consume(&self, selector: CodeSelector, effect: ConsumeEffect) -> AuthResult<Account> {
        let purpose = effect.purpose();
        let account = self
            .repo
            .consume_code(&selector, &effect)
            .await?
            .ok_or(AuthError::InvalidOrExpiredCode)?;

        tracing::info!(account_id = %account.id, purpose = %purpose, "One-time code consumed");
        Ok(account)
    }

    /// Check a bare code without consuming it
    pub async fn peek(&self, raw_code: &str, purpose: OtpPurpose) -> AuthResult<Account> {
        let code = Self::parse(raw_code)?;
        self.repo
            .peek_code(&CodeSelector::Bare(code.digest()), purpose)
            .await?
            .ok_or(AuthError::InvalidOrExpiredCode)
    }

    fn parse(raw_code: &str) -> AuthResult<OtpCode> {
        OtpCode::parse(raw_code).ok_or(AuthError::InvalidOrExpiredCode)
    }
}
