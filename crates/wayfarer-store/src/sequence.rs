//! Persisted id high-water mark.
//!
//! Deleting the document with the highest id must not hand that id out
//! again, so each file-backed collection keeps the largest id it ever
//! issued in a small JSON file next to its data:
//!
//! ```json
//! { "last_issued_id": 7 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::fs_util::{read_optional, write_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Sequence {
    last_issued_id: u64,
}

/// The recorded mark, or `0` if the file is missing or unreadable.
///
/// An unreadable mark is not fatal: the caller still allocates above the
/// highest id it can see.
pub(crate) fn read_mark(path: &Path) -> Result<u64, StoreError> {
    let Some(bytes) = read_optional(path)? else {
        return Ok(0);
    };
    match serde_json::from_slice::<Sequence>(&bytes) {
        Ok(sequence) => Ok(sequence.last_issued_id),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "ignoring corrupt id sequence");
            Ok(0)
        }
    }
}

/// Raise the mark to `id`. A lower `id` leaves the file untouched.
pub(crate) fn raise_mark(path: &Path, id: u64) -> Result<(), StoreError> {
    if read_mark(path)? >= id {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let bytes = serde_json::to_vec_pretty(&Sequence { last_issued_id: id })
        .map_err(StoreError::Encode)?;
    write_atomic(path, &bytes)?;
    debug!(file = %path.display(), id, "id sequence raised");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_mark_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(read_mark(&tmp.path().join("seq.json")).unwrap(), 0);
    }

    #[test]
    fn mark_only_moves_up() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("seq.json");

        raise_mark(&path, 5).unwrap();
        raise_mark(&path, 3).unwrap();
        assert_eq!(read_mark(&path).unwrap(), 5);

        raise_mark(&path, 9).unwrap();
        assert_eq!(read_mark(&path).unwrap(), 9);
    }

    #[test]
    fn corrupt_mark_reads_as_zero() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seq.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(read_mark(&path).unwrap(), 0);
        raise_mark(&path, 2).unwrap();
        assert_eq!(read_mark(&path).unwrap(), 2);
    }
}
