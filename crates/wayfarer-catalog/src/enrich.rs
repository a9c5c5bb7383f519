//! Rewrites storage-relative asset references into absolute URLs.
//!
//! Attractions keep their image references relative to their storage
//! directory. On the way out, every reference is rooted at
//! `{base_url}/static/attractions/{dir_name}/`:
//!
//! - `image_url`, unless it already carries a URL scheme
//! - every markdown image `![alt](path)` in `description` and
//!   `description_en` whose path is not already `http://` or `https://`
//!
//! Enrichment is a pure function of the attraction and the base URL, and
//! applying it twice gives the same result as applying it once.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;
use wayfarer_types::Attraction;

/// URL path prefix under which attraction directories are served.
pub const STATIC_PREFIX: &str = "/static/attractions";

#[allow(clippy::expect_used)]
static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").expect("markdown image pattern is valid")
});

/// The absolute URL prefix for assets of the attraction stored in
/// `dir_name`. Always ends with `/`.
pub fn asset_base(base_url: &str, dir_name: &str) -> String {
    format!(
        "{}{STATIC_PREFIX}/{dir_name}/",
        base_url.trim_end_matches('/')
    )
}

/// Whether `value` already points somewhere on its own (has a scheme or is
/// protocol-relative).
pub fn is_absolute_url(value: &str) -> bool {
    value.starts_with("//") || Url::parse(value).is_ok()
}

fn is_web_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Prefix every relative markdown image path in `text` with `base`.
///
/// Alt text and everything around the images is kept byte for byte.
pub fn rewrite_markdown_images(text: &str, base: &str) -> String {
    MARKDOWN_IMAGE
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let alt = caps.get(1).map_or("", |m| m.as_str());
            let path = caps.get(2).map_or("", |m| m.as_str());
            if is_web_url(path) {
                whole.to_owned()
            } else {
                format!("![{alt}]({base}{path})")
            }
        })
        .into_owned()
}

/// Turn every asset reference of `attraction` into an absolute URL.
pub fn enrich_attraction(mut attraction: Attraction, base_url: &str) -> Attraction {
    let base = asset_base(base_url, &attraction.dir_name);

    if let Some(image) = attraction.image_url.as_mut() {
        if !image.is_empty() && !is_absolute_url(image) {
            *image = format!("{base}{image}");
        }
    }

    for field in [&mut attraction.description, &mut attraction.description_en] {
        if let Some(text) = field.as_mut() {
            *text = rewrite_markdown_images(text, &base);
        }
    }

    attraction
}
