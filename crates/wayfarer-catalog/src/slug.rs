//! Storage keys derived from attraction names.

/// Slug used when a name has no alphanumeric characters at all.
pub const FALLBACK_SLUG: &str = "attraction";

/// Upper bound on slug length, in characters.
pub const MAX_SLUG_CHARS: usize = 64;

/// Lowercase `name`, keep Unicode letters and digits, and collapse every
/// other run of characters into a single `-`. Never returns an empty
/// string.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.extend(ch.to_lowercase());
        } else {
            gap = true;
        }
    }

    if let Some((cut, _)) = slug.char_indices().nth(MAX_SLUG_CHARS) {
        slug.truncate(cut);
        let trimmed = slug.trim_end_matches('-').len();
        slug.truncate(trimmed);
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}
