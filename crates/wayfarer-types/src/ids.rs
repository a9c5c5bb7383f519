//! Type-safe integer identifier wrappers.
//!
//! Attractions and routes each have their own id space. Ids are assigned
//! by the catalog one past the highest id the collection ever issued and
//! are never reused, so gaps are normal. The newtypes keep the two spaces from being mixed at compile
//! time while serializing as plain JSON numbers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(#[ts(type = "number")] pub u64);

        impl $name {
            /// Wrap a raw numeric identifier.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner numeric value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an attraction in the catalog.
    AttractionId
}

define_id! {
    /// Unique identifier for a curated route.
    RouteId
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&AttractionId::new(42)).unwrap();
        assert_eq!(json, "42");

        let back: RouteId = serde_json::from_str("7").unwrap();
        assert_eq!(back, RouteId::new(7));
    }

    #[test]
    fn parse_from_path_segment() {
        let id: AttractionId = "15".parse().unwrap();
        assert_eq!(id.into_inner(), 15);
        assert!("abc".parse::<RouteId>().is_err());
    }
}
