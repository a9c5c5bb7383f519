//! Document storage for the Wayfarer catalog.
//!
//! Three interchangeable backends implement [`DocumentStore`]:
//!
//! - [`DirectoryStore`] -- one directory per document, holding `data.json`
//!   and any assets (attraction images)
//! - [`ArrayFileStore`] -- every document is an element of one JSON array
//!   file (routes)
//! - [`MemoryStore`] -- a locked map, used by tests and ephemeral setups
//!
//! File-backed collections also persist the highest id they ever issued,
//! so a deleted id is never handed out again.
//!
//! Reads of a whole collection skip corrupt documents with a warning
//! instead of failing, so one bad file never hides the rest of the catalog.

pub mod array_file;
pub mod directory;
pub mod document;
pub mod error;
pub mod memory;

mod fs_util;
mod sequence;

pub use array_file::ArrayFileStore;
pub use directory::{DOCUMENT_FILE, DirectoryStore, SEQUENCE_FILE};
pub use document::{AssetStore, DocumentStore, StoredDocument, validate_key};
pub use error::StoreError;
pub use memory::MemoryStore;
