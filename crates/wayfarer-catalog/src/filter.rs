//! Keyword, area and theme filtering over attraction collections.

use serde::Deserialize;
use wayfarer_types::Attraction;

/// Optional filters combined with AND. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AttractionFilter {
    /// Case-insensitive substring of the name or the description.
    #[serde(default)]
    pub keyword: Option<String>,
    /// Exact area.
    #[serde(default)]
    pub area: Option<String>,
    /// A tag the attraction's themes must contain.
    #[serde(default)]
    pub theme: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl AttractionFilter {
    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        present(self.keyword.as_ref()).is_none()
            && present(self.area.as_ref()).is_none()
            && present(self.theme.as_ref()).is_none()
    }

    /// Whether `attraction` passes every filter that is set.
    pub fn matches(&self, attraction: &Attraction) -> bool {
        let keyword_ok = present(self.keyword.as_ref()).is_none_or(|keyword| {
            let needle = keyword.to_lowercase();
            attraction.name.to_lowercase().contains(&needle)
                || attraction
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        });
        let area_ok = present(self.area.as_ref())
            .is_none_or(|area| attraction.area.as_deref() == Some(area));
        let theme_ok =
            present(self.theme.as_ref()).is_none_or(|theme| attraction.has_theme(theme));

        keyword_ok && area_ok && theme_ok
    }

    /// Keep the attractions that match, in their original order.
    pub fn apply(&self, attractions: Vec<Attraction>) -> Vec<Attraction> {
        if self.is_empty() {
            return attractions;
        }
        attractions.into_iter().filter(|a| self.matches(a)).collect()
    }
}
