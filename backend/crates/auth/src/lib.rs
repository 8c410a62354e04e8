//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database, in-memory and LDAP implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Local accounts (username + email + password) and LDAP directory login
//! - Server-side sessions carried in a signed cookie, valid for seven days
//! - Six-digit one-time codes for email verification, mobile verification
//!   and password reset
//! - An access gate other crates use to admit requests
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - One-time codes stored as SHA-256 digests and consumed at most once
//! - Every code failure reports the same error

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::access_gate::VERIFIED;
pub use application::config::AuthConfig;
pub use application::{AccessGate, Admitted, Guard, Identity, Outbound};
pub use domain::entity::notification_preference::{NotificationPreference, Recipient};
pub use domain::repository::{
    AccountRepository, AuthStore, NoOwnedResources, OwnershipRepository, PreferenceRepository,
    ResourceKind,
};
pub use error::{AuthError, AuthResult};
pub use infra::ldap::{LdapConfig, LdapDirectory};
pub use infra::memory::InMemoryAuthStore;
pub use infra::postgres::PgAuthRepository;
pub use presentation::{ResolvedIdentity, SessionResolver, auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
