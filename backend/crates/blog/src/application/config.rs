//! Blog application configuration

/// Blog application configuration
#[derive(Debug, Clone)]
pub struct BlogConfig {
    /// Characters of the body quoted in new-post mail
    pub excerpt_chars: usize,
    /// Master switch for new-post, comment and reply mail
    pub notifications_enabled: bool,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            excerpt_chars: 200,
            notifications_enabled: true,
        }
    }
}
