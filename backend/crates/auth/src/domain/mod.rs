//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod directory;
pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{account::Account, session::Session};
pub use repository::{
    AccountRepository, AuthStore, OtpRepository, OwnershipRepository, PreferenceRepository,
    ResourceKind, SessionRepository,
};
