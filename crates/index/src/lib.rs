//! # UACAP Index
//!
//! Binary store for a compiled user-agent catalog: one file, two sections,
//! both addressed through small header tables.
//!
//! ## Core Features
//!
//! - **Two-pass writer**: [`IndexWriter`] writes the header tables with empty
//!   `(offset, count)` slots, streams the blocks, and back-patches each slot
//!   by seeking. Only the bucket being written is held in memory.
//! - **Header-only loading**: [`IndexReader`] keeps the subkey tables in
//!   memory and reads blocks on demand, so the footprint stays small no
//!   matter how large the catalog is.
//! - **Pluggable storage**: the reader pulls bytes through the
//!   [`IndexStorage`] trait. [`FileStorage`] uses positioned reads on a
//!   shared file handle; [`InMemoryStorage`] serves tests and embedded use.
//! - **Bounds checks**: header slots and block length prefixes are checked
//!   against the storage size; inconsistencies surface as
//!   [`IndexError::Corrupt`] instead of garbage reads.
//!
//! ## Example Usage
//!
//! ```
//! use index::{Buckets, ContentRecord, IndexReader, IndexWriter, InMemoryStorage};
//! use std::io::Cursor;
//!
//! let mut buckets = Buckets::default();
//! buckets.content.insert(
//!     "d4".to_string(),
//!     vec![ContentRecord {
//!         hash: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
//!         literal_length: 7,
//!         patterns: vec![".*crawler.*".to_string()],
//!     }],
//! );
//!
//! let (cursor, _summary) = IndexWriter::new(Cursor::new(Vec::new()))
//!     .write(&buckets)
//!     .unwrap();
//! let reader = IndexReader::from_storage(Box::new(InMemoryStorage::new(cursor.into_inner())))
//!     .unwrap();
//! let blocks = reader.content_blocks("d4").unwrap().unwrap();
//! assert_eq!(blocks.len(), 1);
//! ```

mod format;
mod reader;
mod storage;
mod writer;

pub use crate::format::{
    Buckets, ContentRecord, ContentRecordRef, DetailRecord, DetailRecordRef,
    CONTENT_SUBKEY_WIDTH, DETAIL_SUBKEY_WIDTH, FIELD_SEPARATOR, LENGTH_PREFIX_WIDTH,
    LOCATION_WIDTH, PROPERTY_SEPARATOR,
};
pub use crate::reader::{Blocks, BucketLocation, IndexReader, IndexStats};
pub use crate::storage::{FileStorage, InMemoryStorage, IndexStorage};
pub use crate::writer::{write_index_file, IndexWriter, WriteSummary};

use thiserror::Error;

/// Errors raised while writing or reading an index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The index has not been built yet.
    #[error("index file {path} does not exist; compile the catalog first")]
    MissingIndex { path: String },
    /// Header tables or blocks are inconsistent with the file.
    #[error("corrupt index: {0}")]
    Corrupt(String),
    /// A bucket subkey does not have the width the format requires.
    #[error("bucket subkey {subkey:?} must be {expected} bytes")]
    InvalidSubkey { subkey: String, expected: usize },
    /// An offset, count or length does not fit the 32-bit format.
    #[error("index too large: {0}")]
    TooLarge(String),
    #[error("index I/O error: {0}")]
    Io(String),
}

impl IndexError {
    pub fn corrupt<M: Into<String>>(msg: M) -> Self {
        Self::Corrupt(msg.into())
    }
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        IndexError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_round_trip_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.bin");

        let mut buckets = Buckets::default();
        buckets.details.insert(
            "e4d".into(),
            vec![DetailRecord {
                hash: "e4d909c290d0fb1ca068ffaddf22cbd0".into(),
                properties: vec![("Crawler".into(), "false".into())],
            }],
        );
        write_index_file(&buckets, &path).unwrap();

        let reader = IndexReader::open(&path).unwrap();
        let blocks = reader.detail_blocks("e4d").unwrap().unwrap();
        let record = DetailRecordRef::parse(&blocks[0]);
        assert_eq!(record.hash, "e4d909c290d0fb1ca068ffaddf22cbd0");
        assert_eq!(record.properties().collect::<Vec<_>>(), vec![("Crawler", "false")]);
    }

    #[test]
    fn opening_missing_file_reports_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexReader::open(dir.path().join("nope.bin")).unwrap_err();
        assert!(matches!(err, IndexError::MissingIndex { .. }));
        assert!(err.to_string().contains("compile the catalog first"));
    }
}
