//! Content Generator
//!
//! Text generation is delegated to an external model behind this port.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Content generation is not configured")]
    NotConfigured,

    /// The model answered without any candidate text
    #[error("Failed to generate content")]
    Empty,

    #[error("Error calling generation API: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generator used when no API key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGenerator;

#[async_trait]
impl ContentGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}
