//! Value Object Module

pub mod credential_kind;
pub mod email;
pub mod otp;
pub mod phone_number;
pub mod session_token;
pub mod user_name;
