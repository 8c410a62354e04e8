//! AI text generation proxy

use std::sync::Arc;

use auth::{AccessGate, AuthStore, Identity, NoOwnedResources, VERIFIED};

use crate::domain::generator::ContentGenerator;
use crate::error::{BlogError, BlogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateMode {
    /// Write new content from the prompt
    Generate,
    /// Rework supplied content following the prompt
    Enhance,
}

impl GenerateMode {
    /// Anything other than `enhance` generates
    pub fn from_request(mode: Option<&str>) -> Self {
        match mode {
            Some("enhance") => GenerateMode::Enhance,
            _ => GenerateMode::Generate,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateInput {
    pub prompt: Option<String>,
    pub mode: Option<String>,
    pub content: Option<String>,
}

/// Build the text sent to the model
pub fn compose_prompt(mode: GenerateMode, prompt: &str, content: &str) -> String {
    match mode {
        GenerateMode::Generate => prompt.to_string(),
        GenerateMode::Enhance => format!(
            "Improve this blog content while preserving the main ideas: {}\n\n\
             Enhancement instructions: {}",
            content, prompt
        ),
    }
}

pub struct GenerateUseCase<A>
where
    A: AuthStore,
{
    accounts: Arc<A>,
    generator: Arc<dyn ContentGenerator>,
}

impl<A> GenerateUseCase<A>
where
    A: AuthStore,
{
    pub fn new(accounts: Arc<A>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            accounts,
            generator,
        }
    }

    pub async fn execute(&self, identity: Option<&Identity>, input: GenerateInput) -> BlogResult<String> {
        let admitted = AccessGate::new(self.accounts.clone(), Arc::new(NoOwnedResources))
            .check(identity, VERIFIED)
            .await?;

        let prompt = input
            .prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| BlogError::Validation("Prompt is required".to_string()))?;

        let mode = GenerateMode::from_request(input.mode.as_deref());
        let content = input.content.unwrap_or_default();
        if mode == GenerateMode::Enhance && content.trim().is_empty() {
            return Err(BlogError::Validation(
                "Content is required when mode is enhance".to_string(),
            ));
        }

        let text = self
            .generator
            .generate(&compose_prompt(mode, &prompt, &content))
            .await
            .map_err(|e| BlogError::Generation(e.to_string()))?;

        tracing::info!(
            account_id = %admitted.identity.account_id,
            mode = ?mode,
            chars = text.len(),
            "Content generated"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_generate() {
        assert_eq!(GenerateMode::from_request(None), GenerateMode::Generate);
        assert_eq!(GenerateMode::from_request(Some("generate")), GenerateMode::Generate);
        assert_eq!(GenerateMode::from_request(Some("enhance")), GenerateMode::Enhance);
        assert_eq!(GenerateMode::from_request(Some("other")), GenerateMode::Generate);
    }

    #[test]
    fn test_enhance_prompt_wraps_content() {
        let text = compose_prompt(GenerateMode::Enhance, "shorter", "Long draft");
        assert_eq!(
            text,
            "Improve this blog content while preserving the main ideas: Long draft\n\n\
             Enhancement instructions: shorter"
        );
        assert_eq!(compose_prompt(GenerateMode::Generate, "a poem", ""), "a poem");
    }
}
