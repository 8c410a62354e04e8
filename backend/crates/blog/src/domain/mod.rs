//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the generator port.

pub mod entity;
pub mod generator;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{blog::Blog, comment::Comment};
pub use generator::{ContentGenerator, GenerationError};
pub use repository::{BlogRepository, BlogStore, CommentRepository};
