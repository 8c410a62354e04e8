//! Application Layer
//!
//! Use cases and application services.

pub mod blog_posts;
pub mod comments;
pub mod config;
pub mod generate;
pub mod notifier;
pub mod outbound;

// Re-exports
pub use blog_posts::{BlogInput, BlogUseCase};
pub use comments::CommentUseCase;
pub use config::BlogConfig;
pub use generate::{GenerateInput, GenerateMode, GenerateUseCase};
pub use notifier::Notifier;
pub use outbound::BlogOutbound;
