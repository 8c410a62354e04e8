//! Blog Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, generator port
//! - `application/` - Use cases, notification fan-out
//! - `infra/` - PostgreSQL, in-memory and Gemini implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! Every mutating route runs the auth crate's access gate before touching
//! the store. Notification mail goes out on detached tasks and never fails
//! the request that triggered it.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{BlogConfig, BlogOutbound};
pub use domain::generator::{ContentGenerator, DisabledGenerator, GenerationError};
pub use error::{BlogError, BlogResult};
pub use infra::gemini::{GeminiClient, GeminiConfig};
pub use infra::memory::InMemoryBlogStore;
pub use infra::postgres::PgBlogRepository;
pub use presentation::{blog_router, blog_router_generic};

#[cfg(test)]
mod tests;
