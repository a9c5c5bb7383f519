//! HTML allow-list cleaning for rich-text fields.

use std::collections::HashSet;

use crate::config::SanitizerConfig;

/// Tags whose content ammonia always strips; they cannot also be allowed.
const CONTENT_STRIPPED_TAGS: &[&str] = &["script", "style"];

/// Attributes ammonia manages itself on links.
const MANAGED_ATTRIBUTES: &[&str] = &["rel"];

/// Cleans user-supplied HTML down to a configured set of tags and
/// attributes. Markdown passes through as plain text.
///
/// Text comes back HTML-escaped (`&lt;`, `&amp;`) except for `>`, which is
/// restored so markdown blockquotes keep working. A bare `>` cannot open a
/// tag, and ammonia never escapes it inside attribute values.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    tags: Vec<String>,
    attributes: Vec<String>,
}

impl Sanitizer {
    /// Build from the configured allow-lists.
    pub fn new(config: &SanitizerConfig) -> Self {
        let tags = config
            .allowed_tags
            .iter()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty() && !CONTENT_STRIPPED_TAGS.contains(&t.as_str()))
            .collect();
        let attributes = config
            .allowed_attributes
            .iter()
            .map(|a| a.trim().to_ascii_lowercase())
            .filter(|a| !a.is_empty() && !MANAGED_ATTRIBUTES.contains(&a.as_str()))
            .collect();
        Self { tags, attributes }
    }

    /// Strip everything outside the allow-list from `html`.
    pub fn clean(&self, html: &str) -> String {
        let tags: HashSet<&str> = self.tags.iter().map(String::as_str).collect();
        let attributes: HashSet<&str> = self.attributes.iter().map(String::as_str).collect();
        ammonia::Builder::default()
            .tags(tags)
            .generic_attributes(attributes)
            .clean(html)
            .to_string()
            .replace("&gt;", ">")
    }
}
