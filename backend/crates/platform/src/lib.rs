//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, Base64url)
//! - Password policy and hashing (Argon2id with pepper)
//! - Cookie management
//! - HTML sanitization for user-authored content
//! - Outbound email (SMTP) and SMS (HTTPS) transports

pub mod cookie;
pub mod crypto;
pub mod mail;
pub mod password;
pub mod sanitize;
pub mod sms;
