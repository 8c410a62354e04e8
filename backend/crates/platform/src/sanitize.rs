//! HTML sanitization for user-authored content
//!
//! Rich bodies (blog content, comments) keep a small formatting whitelist;
//! plain fields (titles, usernames, emails, codes) lose all markup.

use std::collections::{HashMap, HashSet};

use ammonia::Builder;

const RICH_TAGS: &[&str] = &[
    "p",
    "br",
    "strong",
    "em",
    "u",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "code",
    "ul",
    "ol",
    "li",
    "a",
    "img",
];

/// Clean a rich-text body down to the formatting whitelist.
///
/// `script` and `style` are dropped together with their content; any other
/// disallowed tag is stripped and its text kept.
pub fn sanitize_html(input: &str) -> String {
    let tags: HashSet<&str> = RICH_TAGS.iter().copied().collect();
    let tag_attributes = HashMap::from([
        ("a", HashSet::from(["href", "title"])),
        ("img", HashSet::from(["src", "alt"])),
    ]);

    Builder::default()
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        .link_rel(None)
        .clean(input)
        .to_string()
        .trim()
        .to_string()
}

/// Strip every tag, keeping only text.
pub fn sanitize_text(input: &str) -> String {
    Builder::default()
        .tags(HashSet::new())
        .tag_attributes(HashMap::new())
        .generic_attributes(HashSet::new())
        .clean(input)
        .to_string()
        .trim()
        .to_string()
}
