//! Application Layer
//!
//! Use cases and application services.

pub mod access_gate;
pub mod check_session;
pub mod config;
pub mod email_verification;
pub mod mobile_verification;
pub mod otp_ledger;
pub mod outbound;
pub mod password_reset;
pub mod profile;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use access_gate::{AccessGate, Admitted, Guard};
pub use check_session::{CheckSessionUseCase, Identity};
pub use email_verification::EmailVerificationUseCase;
pub use mobile_verification::{MobileOtpRequest, MobileVerificationUseCase};
pub use otp_ledger::OtpLedger;
pub use outbound::Outbound;
pub use password_reset::PasswordResetUseCase;
pub use profile::ProfileUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
