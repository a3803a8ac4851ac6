//! Header loader and bounds-checked block reads.
//!
//! Opening an index reads the two header tables and nothing else. Pattern and
//! property blocks stay on storage and are streamed per lookup through
//! [`Blocks`], which checks every length prefix against the storage size
//! before trusting it.

use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use hashbrown::HashMap;
use tracing::debug;

use crate::format::{
    CONTENT_SUBKEY_WIDTH, DETAIL_SUBKEY_WIDTH, LENGTH_PREFIX_WIDTH, LOCATION_WIDTH,
};
use crate::storage::{FileStorage, IndexStorage};
use crate::IndexError;

/// Where a bucket's blocks live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketLocation {
    pub offset: u32,
    pub count: u32,
}

/// Diagnostics about a loaded index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub content_buckets: usize,
    pub content_blocks: u64,
    pub detail_buckets: usize,
    pub detail_blocks: u64,
    pub file_size: u64,
}

/// Read-only handle over a compiled index.
///
/// Holds the header tables in memory and the storage handle; safe to share
/// across threads behind an `Arc`.
pub struct IndexReader {
    storage: Box<dyn IndexStorage>,
    content: HashMap<String, BucketLocation>,
    details: HashMap<String, BucketLocation>,
}

impl IndexReader {
    /// Open the index file at `path` and load its header tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let storage = FileStorage::open(path.as_ref())?;
        let reader = Self::from_storage(Box::new(storage))?;
        debug!(path = %path.as_ref().display(), "index_opened");
        Ok(reader)
    }

    /// Load the header tables from an arbitrary storage.
    pub fn from_storage(storage: Box<dyn IndexStorage>) -> Result<Self, IndexError> {
        let mut cursor = HeaderCursor {
            storage: storage.as_ref(),
            pos: 0,
        };
        let content = cursor.read_table(CONTENT_SUBKEY_WIDTH)?;
        let details = cursor.read_table(DETAIL_SUBKEY_WIDTH)?;

        let reader = Self {
            storage,
            content,
            details,
        };
        debug!(
            content_buckets = reader.content.len(),
            detail_buckets = reader.details.len(),
            header_bytes = header_len(&reader),
            "index_header_loaded"
        );
        Ok(reader)
    }

    /// Location of a content bucket, if the index has one for `subkey`.
    pub fn content_location(&self, subkey: &str) -> Option<BucketLocation> {
        self.content.get(subkey).copied()
    }

    /// Location of a detail bucket, if the index has one for `subkey`.
    pub fn detail_location(&self, subkey: &str) -> Option<BucketLocation> {
        self.details.get(subkey).copied()
    }

    /// Lazily stream the blocks of a bucket.
    pub fn blocks(&self, location: BucketLocation) -> Blocks<'_> {
        Blocks {
            storage: self.storage.as_ref(),
            pos: u64::from(location.offset),
            remaining: location.count,
        }
    }

    /// Read all blocks of a bucket at once.
    pub fn read_blocks(&self, location: BucketLocation) -> Result<Vec<String>, IndexError> {
        self.blocks(location).collect()
    }

    /// All blocks of the content bucket `subkey`; `None` when absent.
    pub fn content_blocks(&self, subkey: &str) -> Result<Option<Vec<String>>, IndexError> {
        self.content_location(subkey)
            .map(|location| self.read_blocks(location))
            .transpose()
    }

    /// All blocks of the detail bucket `subkey`; `None` when absent.
    pub fn detail_blocks(&self, subkey: &str) -> Result<Option<Vec<String>>, IndexError> {
        self.detail_location(subkey)
            .map(|location| self.read_blocks(location))
            .transpose()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            content_buckets: self.content.len(),
            content_blocks: self.content.values().map(|l| u64::from(l.count)).sum(),
            detail_buckets: self.details.len(),
            detail_blocks: self.details.values().map(|l| u64::from(l.count)).sum(),
            file_size: self.storage.len(),
        }
    }
}

impl std::fmt::Debug for IndexReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexReader")
            .field("content_buckets", &self.content.len())
            .field("detail_buckets", &self.details.len())
            .field("file_size", &self.storage.len())
            .finish()
    }
}

fn header_len(reader: &IndexReader) -> usize {
    2 * 4
        + reader.content.len() * (CONTENT_SUBKEY_WIDTH + LOCATION_WIDTH)
        + reader.details.len() * (DETAIL_SUBKEY_WIDTH + LOCATION_WIDTH)
}

struct HeaderCursor<'a> {
    storage: &'a dyn IndexStorage,
    pos: u64,
}

impl HeaderCursor<'_> {
    fn read_table(
        &mut self,
        subkey_width: usize,
    ) -> Result<HashMap<String, BucketLocation>, IndexError> {
        let count = self.read_u32("bucket count")?;
        let entry_width = (subkey_width + LOCATION_WIDTH) as u64;
        let needed = u64::from(count) * entry_width;
        if self.pos + needed > self.storage.len() {
            return Err(IndexError::corrupt(format!(
                "header declares {count} buckets but only {} bytes remain",
                self.storage.len().saturating_sub(self.pos)
            )));
        }

        let mut table = HashMap::with_capacity(count as usize);
        let mut entry = vec![0u8; subkey_width + LOCATION_WIDTH];
        for _ in 0..count {
            self.storage.read_exact_at(self.pos, &mut entry)?;
            self.pos += entry_width;

            let subkey = std::str::from_utf8(&entry[..subkey_width])
                .map_err(|_| IndexError::corrupt("bucket subkey is not UTF-8"))?
                .to_string();
            let location = BucketLocation {
                offset: BigEndian::read_u32(&entry[subkey_width..subkey_width + 4]),
                count: BigEndian::read_u32(&entry[subkey_width + 4..]),
            };
            self.check_location(&subkey, location)?;
            table.insert(subkey, location);
        }
        Ok(table)
    }

    fn read_u32(&mut self, what: &str) -> Result<u32, IndexError> {
        let mut buf = [0u8; 4];
        if self.pos + 4 > self.storage.len() {
            return Err(IndexError::corrupt(format!(
                "truncated header: missing {what} at byte {}",
                self.pos
            )));
        }
        self.storage.read_exact_at(self.pos, &mut buf)?;
        self.pos += 4;
        Ok(BigEndian::read_u32(&buf))
    }

    /// Every block is at least a length prefix, so `count` blocks need at
    /// least `4 * count` bytes after `offset`.
    fn check_location(&self, subkey: &str, location: BucketLocation) -> Result<(), IndexError> {
        let min_end = u64::from(location.offset)
            + u64::from(location.count) * LENGTH_PREFIX_WIDTH as u64;
        if min_end > self.storage.len() {
            return Err(IndexError::corrupt(format!(
                "bucket {subkey:?} at offset {} with {} blocks exceeds {}-byte index",
                location.offset,
                location.count,
                self.storage.len()
            )));
        }
        Ok(())
    }
}

/// Iterator over the length-prefixed blocks of one bucket.
///
/// Stops after the first error.
pub struct Blocks<'a> {
    storage: &'a dyn IndexStorage,
    pos: u64,
    remaining: u32,
}

impl Blocks<'_> {
    fn read_block(&mut self) -> Result<String, IndexError> {
        let len = self.storage.len();
        if self.pos + LENGTH_PREFIX_WIDTH as u64 > len {
            return Err(IndexError::corrupt(format!(
                "block length prefix at {} past end of {len}-byte index",
                self.pos
            )));
        }
        let mut prefix = [0u8; LENGTH_PREFIX_WIDTH];
        self.storage.read_exact_at(self.pos, &mut prefix)?;
        let block_len = BigEndian::read_u32(&prefix);
        let body_start = self.pos + LENGTH_PREFIX_WIDTH as u64;
        if body_start + u64::from(block_len) > len {
            return Err(IndexError::corrupt(format!(
                "block of {block_len} bytes at {} runs past end of {len}-byte index",
                self.pos
            )));
        }

        let mut body = vec![0u8; block_len as usize];
        self.storage.read_exact_at(body_start, &mut body)?;
        self.pos = body_start + u64::from(block_len);
        String::from_utf8(body)
            .map_err(|_| IndexError::corrupt(format!("block at {body_start} is not UTF-8")))
    }
}

impl Iterator for Blocks<'_> {
    type Item = Result<String, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let block = self.read_block();
        if block.is_err() {
            self.remaining = 0;
        }
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}
