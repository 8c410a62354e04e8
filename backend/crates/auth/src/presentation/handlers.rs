//! HTTP Handlers

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use kernel::id::AccountId;
use kernel::response::{ApiJson, ApiPath, ApiQuery, Message, Success};
use serde::de::DeserializeOwned;

use crate::application::config::AuthConfig;
use crate::application::mobile_verification::MobileOtpRequest;
use crate::application::{
    AccessGate, EmailVerificationUseCase, Guard, MobileVerificationUseCase, Outbound,
    PasswordResetUseCase, ProfileUseCase, SignInInput, SignInUseCase, SignOutUseCase,
    SignUpInput, SignUpUseCase,
};
use crate::domain::entity::{account::Account, notification_preference::NotificationPreference};
use crate::domain::repository::{AccountRepository, AuthStore, NoOwnedResources};
use crate::domain::value_object::credential_kind::CredentialKind;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangeEmailRequest, ChangePhoneRequest, ContactChangeResponse, ForgotPasswordRequest,
    LoginRequest, PageQuery, PreferencesResponse, ProfileResponse, ProfileSummary, PublicUser,
    RegisterRequest, RegisterResponse, RequestMobileOtpRequest, RequestOtpRequest,
    ResetPasswordRequest, UsersResponse, VerifyOtpRequest, VerifyResetRequest,
    VerifyResetResponse,
};
use crate::presentation::middleware::ResolvedIdentity;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub outbound: Outbound,
}

impl<R> AuthAppState<R>
where
    R: AuthStore,
{
    fn gate(&self) -> AccessGate<R, NoOwnedResources> {
        AccessGate::new(self.repo.clone(), Arc::new(NoOwnedResources))
    }

    fn summary(&self, account: &Account) -> ProfileSummary {
        ProfileSummary::from_account(account, self.outbound.sms_enabled(&self.config))
    }
}

// ============================================================================
// Register / Login / Logout
// ============================================================================

/// POST /auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let use_case =
        SignUpUseCase::new(state.repo.clone(), state.config.clone(), state.outbound.clone());

    let output = use_case
        .execute(SignUpInput {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Success::created(RegisterResponse {
        message: "User registered successfully. Check your email for verification OTP.",
        user_id: output.account_id.get(),
        username: output.username.to_string(),
        email: output.email.into_db(),
    }))
}

/// POST /auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let use_case =
        SignInUseCase::new(state.repo.clone(), state.config.clone(), state.outbound.clone());

    let output = use_case
        .execute(SignInInput {
            username: req.username,
            password: req.password,
            kind: CredentialKind::from_login_type(req.kind.as_deref()),
        })
        .await?;

    let cookie = state
        .config
        .session_cookie()
        .build_set_cookie(output.session_token.as_str());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Success::ok(ProfileResponse {
            message: "Login successful",
            token: Some("session_based"),
            profile: state.summary(&output.account),
        }),
    ))
}

/// GET /auth/login
pub async fn who_am_i<R>(
    State(state): State<AuthAppState<R>>,
    identity: ResolvedIdentity,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let identity = identity.identity().ok_or(AuthError::Unauthenticated)?;
    let account = state
        .repo
        .find_account(identity.account_id)
        .await?
        .ok_or(AuthError::Unauthenticated)?;

    Ok(Success::ok(ProfileResponse {
        message: "Authenticated",
        token: None,
        profile: state.summary(&account),
    }))
}

/// POST /auth/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    identity: ResolvedIdentity,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let admitted = state
        .gate()
        .check(identity.identity(), &[Guard::Authenticated])
        .await?;

    SignOutUseCase::new(state.repo.clone())
        .execute(&admitted.identity)
        .await?;

    let cookie = state.config.session_cookie().build_delete_cookie();

    Ok((
        [(header::SET_COOKIE, cookie)],
        Success::ok(Message::new("Logout successful")),
    ))
}

// ============================================================================
// Email / Mobile OTP
// ============================================================================

/// POST /auth/request-otp
pub async fn request_otp<R>(
    State(state): State<AuthAppState<R>>,
    identity: ResolvedIdentity,
    body: Bytes,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let req: RequestOtpRequest = optional_json(&body)?;

    EmailVerificationUseCase::new(state.repo.clone(), state.config.clone(), state.outbound.clone())
        .request(req.user_id.map(AccountId::new), identity.identity())
        .await?;

    Ok(Success::ok(Message::new("Verification OTP sent to email")))
}

/// POST /auth/verify-otp
pub async fn verify_otp<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<VerifyOtpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    EmailVerificationUseCase::new(state.repo.clone(), state.config.clone(), state.outbound.clone())
        .verify(AccountId::new(req.user_id), &req.otp)
        .await?;

    Ok(Success::ok(Message::new("Email verified successfully")))
}

/// POST /auth/request-mobile-otp
pub async fn request_mobile_otp<R>(
    State(state): State<AuthAppState<R>>,
    identity: ResolvedIdentity,
    body: Bytes,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let req: RequestMobileOtpRequest = optional_json(&body)?;

    MobileVerificationUseCase::new(state.repo.clone(), state.config.clone(), state.outbound.clone())
        .request(
            MobileOtpRequest {
                explicit: req.user_id.map(AccountId::new),
                phone: req.phone,
            },
            identity.identity(),
        )
        .await?;

    Ok(Success::ok(Message::new("Verification OTP sent to phone")))
}

/// POST /auth/verify-mobile-otp
pub async fn verify_mobile_otp<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<VerifyOtpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    MobileVerificationUseCase::new(state.repo.clone(), state.config.clone(), state.outbound.clone())
        .verify(AccountId::new(req.user_id), &req.otp)
        .await?;

    Ok(Success::ok(Message::new("Phone number verified successfully")))
}

// ============================================================================
// Password reset
// ============================================================================

fn password_reset<R>(state: &AuthAppState<R>) -> PasswordResetUseCase<R>
where
    R: AuthStore,
{
    PasswordResetUseCase::new(state.repo.clone(), state.config.clone(), state.outbound.clone())
}

/// POST /auth/forgot-password
pub async fn forgot_password<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<ForgotPasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    password_reset(&state).request(&req.email).await?;

    Ok(Success::ok(Message::new(
        "If an account with that email exists, a password reset OTP has been sent.",
    )))
}

/// POST /auth/verify-reset-otp
pub async fn verify_reset_otp<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<VerifyResetRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let account = password_reset(&state).verify_code(&req.otp).await?;

    Ok(Success::ok(VerifyResetResponse {
        message: "Valid reset OTP",
        username: account.username.to_string(),
        user_id: account.id.get(),
    }))
}

/// POST /auth/reset-password
pub async fn reset_password<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    password_reset(&state)
        .complete(&req.otp, req.password)
        .await?;

    Ok(Success::ok(Message::new(
        "Password has been reset successfully. You can now log in with your new password.",
    )))
}

// ============================================================================
// Users
// ============================================================================

fn profile<R>(state: &AuthAppState<R>) -> ProfileUseCase<R>
where
    R: AuthStore,
{
    ProfileUseCase::new(state.repo.clone(), state.config.clone(), state.outbound.clone())
}

/// GET /users
pub async fn list_users<R>(
    State(state): State<AuthAppState<R>>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let accounts = profile(&state).list_users(query.limit, query.offset).await?;

    Ok(Success::ok(UsersResponse {
        users: accounts.iter().map(PublicUser::from).collect(),
    }))
}

/// GET /users-api/{userId}
pub async fn get_user<R>(
    State(state): State<AuthAppState<R>>,
    ApiPath(user_id): ApiPath<i64>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let account = profile(&state).get_user(AccountId::new(user_id)).await?;
    Ok(Success::ok(PublicUser::from(&account)))
}

/// PUT /users/email
pub async fn change_email<R>(
    State(state): State<AuthAppState<R>>,
    identity: ResolvedIdentity,
    ApiJson(req): ApiJson<ChangeEmailRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let admitted = state
        .gate()
        .check(identity.identity(), &[Guard::Authenticated])
        .await?;

    let account = profile(&state)
        .change_email(&admitted.identity, &req.email)
        .await?;

    Ok(Success::ok(contact_change(
        &state,
        &account,
        "Verification OTP sent to the new email address",
        None,
    )))
}

/// PUT /users/phone
pub async fn change_phone<R>(
    State(state): State<AuthAppState<R>>,
    identity: ResolvedIdentity,
    ApiJson(req): ApiJson<ChangePhoneRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let admitted = state
        .gate()
        .check(identity.identity(), &[Guard::Authenticated])
        .await?;

    let (account, sms_sent) = profile(&state)
        .change_phone(&admitted.identity, &req.phone)
        .await?;

    Ok(Success::ok(contact_change(
        &state,
        &account,
        "Phone number saved pending verification",
        Some(sms_sent),
    )))
}

fn contact_change<R>(
    state: &AuthAppState<R>,
    account: &Account,
    message: &'static str,
    sms_sent: Option<bool>,
) -> ContactChangeResponse
where
    R: AuthStore,
{
    ContactChangeResponse {
        message,
        profile: state.summary(account),
        pending_email: account.pending_email.as_ref().map(|e| e.to_string()),
        pending_phone: account.pending_phone.as_ref().map(|p| p.to_string()),
        sms_sent,
    }
}

/// GET /users/notification-preferences
pub async fn get_preferences<R>(
    State(state): State<AuthAppState<R>>,
    identity: ResolvedIdentity,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let admitted = state
        .gate()
        .check(identity.identity(), &[Guard::Authenticated])
        .await?;

    let preferences = profile(&state).preferences(&admitted.identity).await?;
    Ok(Success::ok(PreferencesResponse { preferences }))
}

/// PUT /users/notification-preferences
pub async fn put_preferences<R>(
    State(state): State<AuthAppState<R>>,
    identity: ResolvedIdentity,
    ApiJson(req): ApiJson<NotificationPreference>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
{
    let admitted = state
        .gate()
        .check(identity.identity(), &[Guard::Authenticated])
        .await?;

    let preferences = profile(&state)
        .update_preferences(&admitted.identity, req)
        .await?;
    Ok(Success::ok(PreferencesResponse { preferences }))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a body that may be absent; an empty body yields the default
fn optional_json<T>(body: &[u8]) -> AuthResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| AuthError::Validation(format!("Invalid JSON body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_json() {
        let empty: RequestOtpRequest = optional_json(b"").unwrap();
        assert!(empty.user_id.is_none());

        let given: RequestOtpRequest = optional_json(br#"{"userId": 4}"#).unwrap();
        assert_eq!(given.user_id, Some(4));

        assert!(optional_json::<RequestOtpRequest>(b"{nope").is_err());
    }
}
