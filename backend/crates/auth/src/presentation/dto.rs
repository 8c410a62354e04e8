//! API DTOs (Data Transfer Objects)
//!
//! Every response is wrapped in `kernel::response::Success`, which adds
//! `"status": "success"` next to these fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{account::Account, notification_preference::NotificationPreference};

// ============================================================================
// Register
// ============================================================================

/// Missing fields deserialize as empty and fail the emptiness check
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

// ============================================================================
// Login / session
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// "local" or "ldap"; absent means ldap
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// What the client learns about the signed-in account. Never carries
/// hash material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub verified: bool,
    pub mobile_verified: bool,
    pub has_email: bool,
    pub has_phone: bool,
    pub sms_enabled: bool,
    pub user_type: String,
}

impl ProfileSummary {
    pub fn from_account(account: &Account, sms_enabled: bool) -> Self {
        Self {
            user_id: account.id.get(),
            username: account.username.to_string(),
            email: account.email.as_ref().map(|e| e.to_string()),
            phone_number: account.phone.as_ref().map(|p| p.to_string()),
            verified: account.email_verified,
            mobile_verified: account.mobile_verified,
            has_email: account.email.is_some(),
            has_phone: account.phone.is_some(),
            sms_enabled,
            user_type: account.credential_kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'static str>,
    #[serde(flatten)]
    pub profile: ProfileSummary,
}

// ============================================================================
// OTP flows
// ============================================================================

/// Body is optional; without `userId` the session decides
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpRequest {
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMobileOtpRequest {
    pub user_id: Option<i64>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_id: i64,
    pub otp: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResetRequest {
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResetResponse {
    pub message: &'static str,
    pub username: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Publicly visible account fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub user_id: i64,
    pub username: String,
    pub user_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for PublicUser {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.id.get(),
            username: account.username.to_string(),
            user_type: account.credential_kind.to_string(),
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<PublicUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEmailRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePhoneRequest {
    #[serde(default)]
    pub phone: String,
}

/// The account after a contact change; the new value is still pending
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactChangeResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub profile: ProfileSummary,
    pub pending_email: Option<String>,
    pub pending_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_sent: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    #[serde(flatten)]
    pub preferences: NotificationPreference,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        credential_kind::CredentialKind, email::Email, user_name::UserName,
    };
    use kernel::id::AccountId;

    #[test]
    fn test_profile_summary_shape() {
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(9),
            username: UserName::from_db("alice"),
            email: Some(Email::from_db("alice@example.com")),
            phone: None,
            credential_kind: CredentialKind::Local,
            email_verified: true,
            mobile_verified: false,
            pending_email: None,
            pending_phone: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(ProfileResponse {
            message: "Login successful",
            token: Some("session_based"),
            profile: ProfileSummary::from_account(&account, false),
        })
        .unwrap();

        assert_eq!(json["token"], "session_based");
        assert_eq!(json["userId"], 9);
        assert_eq!(json["hasEmail"], true);
        assert_eq!(json["hasPhone"], false);
        assert_eq!(json["phoneNumber"], serde_json::Value::Null);
        assert_eq!(json["userType"], "local");
    }

    #[test]
    fn test_login_type_is_optional() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"a","password":"b"}"#).unwrap();
        assert!(req.kind.is_none());
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"a","password":"b","type":"local"}"#).unwrap();
        assert_eq!(req.kind.as_deref(), Some("local"));
    }
}
