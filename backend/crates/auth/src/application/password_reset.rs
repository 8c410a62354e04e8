//! Password Reset Use Case
//!
//! Request always looks successful to the caller, so the endpoint cannot
//! be used to probe which addresses are registered.

use std::sync::Arc;

use platform::password::ClearTextPassword;
use platform::sanitize::sanitize_text;

use crate::application::config::AuthConfig;
use crate::application::otp_ledger::OtpLedger;
use crate::application::outbound::{Outbound, password_reset_email};
use crate::domain::entity::account::Account;
use crate::domain::repository::{
    AccountRepository, ConsumeEffect, OtpRepository, SessionRepository,
};
use crate::domain::value_object::{credential_kind::CredentialKind, email::Email, otp::OtpPurpose};
use crate::error::{AuthError, AuthResult};

pub struct PasswordResetUseCase<R>
where
    R: AccountRepository + OtpRepository + SessionRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    outbound: Outbound,
}

impl<R> PasswordResetUseCase<R>
where
    R: AccountRepository + OtpRepository + SessionRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>, outbound: Outbound) -> Self {
        Self {
            repo,
            config,
            outbound,
        }
    }

    /// Mail a reset code when a local account owns the address.
    /// Only input-format errors reach the caller.
    pub async fn request(&self, email: &str) -> AuthResult<()> {
        let email = sanitize_text(email);
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        let email = Email::new(email)?;

        if let Err(e) = self.issue_reset(&email).await {
            tracing::warn!(error = %e, "Password reset request failed");
        }

        Ok(())
    }

    async fn issue_reset(&self, email: &Email) -> AuthResult<()> {
        let Some(account) = self.repo.find_account_by_email(email).await? else {
            return Ok(());
        };
        if account.credential_kind != CredentialKind::Local {
            tracing::debug!(account_id = %account.id, "Reset requested for directory account");
            return Ok(());
        }

        let ledger = OtpLedger::new(self.repo.clone(), self.config.clone());
        let code = ledger.issue(account.id, OtpPurpose::PasswordReset).await?;
        self.outbound
            .dispatch_email(password_reset_email(email.as_str(), &account.username, &code));

        Ok(())
    }

    /// Look up a reset code without spending it
    pub async fn verify_code(&self, otp: &str) -> AuthResult<Account> {
        let otp = sanitize_text(otp);
        if otp.is_empty() {
            return Err(AuthError::Validation("Reset OTP is required".to_string()));
        }

        OtpLedger::new(self.repo.clone(), self.config.clone())
            .peek(&otp, OtpPurpose::PasswordReset)
            .await
    }

    /// Spend the code and replace the password in one step, then revoke
    /// the account's sessions
    pub async fn complete(&self, otp: &str, password: String) -> AuthResult<()> {
        let otp = sanitize_text(otp);
        if otp.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Reset OTP and new password are required".to_string(),
            ));
        }

        let password = ClearTextPassword::new(password)?;
        let hash = password.hash(self.config.pepper())?;

        let account = OtpLedger::new(self.repo.clone(), self.config.clone())
            .consume_bare(&otp, ConsumeEffect::ReplacePassword(hash))
            .await?;

        let revoked = self.repo.delete_sessions_for(account.id).await?;
        tracing::info!(account_id = %account.id, revoked, "Password reset completed");

        Ok(())
    }
}
