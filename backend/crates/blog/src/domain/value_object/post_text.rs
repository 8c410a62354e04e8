//! Sanitized post text
//!
//! Both types are only constructible from sanitized input, so a store
//! never receives raw client markup.

use platform::sanitize::{sanitize_html, sanitize_text};

/// Plain-text title, markup stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// `None` when nothing is left after sanitization
    pub fn sanitize(raw: &str) -> Option<Self> {
        let clean = sanitize_text(raw);
        (!clean.is_empty()).then_some(Self(clean))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body text cleaned to the formatting whitelist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText(String);

impl RichText {
    /// `None` when nothing is left after sanitization
    pub fn sanitize(raw: &str) -> Option<Self> {
        let clean = sanitize_html(raw);
        (!clean.is_empty()).then_some(Self(clean))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_strips_markup() {
        let title = Title::sanitize("<b>Hello</b> world").unwrap();
        assert_eq!(title.as_str(), "Hello world");
        assert!(Title::sanitize("<script>x</script>").is_none());
        assert!(Title::sanitize("   ").is_none());
    }

    #[test]
    fn test_rich_text_keeps_whitelist() {
        let body = RichText::sanitize("<p>Hi <strong>there</strong><script>alert(1)</script></p>")
            .unwrap();
        assert_eq!(body.as_str(), "<p>Hi <strong>there</strong></p>");
        assert!(RichText::sanitize("<script>alert(1)</script>").is_none());
    }
}
