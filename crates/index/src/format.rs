//! On-disk layout of the compiled index.
//!
//! All integers are big-endian `u32`.
//!
//! ```text
//! u32 content_bucket_count
//! repeat: [2-byte subkey][u32 offset][u32 count]
//! u32 detail_bucket_count
//! repeat: [3-byte subkey][u32 offset][u32 count]
//! content blocks: u32 length, then "<hash>\t<literal_length>\t<p1>\t...\t<pN>"
//! detail blocks:  u32 length, then "<hash>\t<key1>=<val1>\n<key2>=<val2>..."
//! ```
//!
//! `offset` points at the first length prefix of the bucket, `count` is the
//! number of blocks that follow back to back.

use std::collections::BTreeMap;

use crate::IndexError;

/// Width of a content bucket subkey in the header.
pub const CONTENT_SUBKEY_WIDTH: usize = 2;

/// Width of a detail bucket subkey in the header.
pub const DETAIL_SUBKEY_WIDTH: usize = 3;

/// Size of the `(offset, count)` pair following each subkey.
pub const LOCATION_WIDTH: usize = 8;

/// Size of a block length prefix.
pub const LENGTH_PREFIX_WIDTH: usize = 4;

/// Separator between the fields of a block.
pub const FIELD_SEPARATOR: char = '\t';

/// Separator between `key=value` pairs in a detail block.
pub const PROPERTY_SEPARATOR: char = '\n';

/// A batch of alternative patterns sharing one prefix hash and literal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub hash: String,
    pub literal_length: usize,
    pub patterns: Vec<String>,
}

impl ContentRecord {
    pub fn encode(&self) -> String {
        let mut out = format!("{}{FIELD_SEPARATOR}{}", self.hash, self.literal_length);
        for pattern in &self.patterns {
            out.push(FIELD_SEPARATOR);
            out.push_str(pattern);
        }
        out
    }
}

/// Borrowed view over an encoded content block.
///
/// Only the hash and the length are split eagerly, so scanning past
/// records of another hash group costs no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRecordRef<'a> {
    pub hash: &'a str,
    pub literal_length: usize,
    patterns: &'a str,
}

impl<'a> ContentRecordRef<'a> {
    pub fn parse(block: &'a str) -> Result<Self, IndexError> {
        let mut fields = block.splitn(3, FIELD_SEPARATOR);
        let hash = fields.next().unwrap_or_default();
        let literal_length = fields
            .next()
            .and_then(|len| len.parse::<usize>().ok())
            .ok_or_else(|| IndexError::corrupt(format!("content block without length: {block:?}")))?;
        let patterns = fields.next().unwrap_or_default();
        Ok(Self {
            hash,
            literal_length,
            patterns,
        })
    }

    /// The raw tab-joined pattern list.
    pub fn pattern_list(&self) -> &'a str {
        self.patterns
    }

    pub fn patterns(&self) -> impl Iterator<Item = &'a str> {
        self.patterns
            .split(FIELD_SEPARATOR)
            .filter(|pattern| !pattern.is_empty())
    }
}

/// Raw property text of one catalog section, keyed by the hash of its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub hash: String,
    pub properties: Vec<(String, String)>,
}

impl DetailRecord {
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.hash.len() + 16 * self.properties.len());
        out.push_str(&self.hash);
        out.push(FIELD_SEPARATOR);
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                out.push(PROPERTY_SEPARATOR);
            }
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}

/// Borrowed view over an encoded detail block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRecordRef<'a> {
    pub hash: &'a str,
    body: &'a str,
}

impl<'a> DetailRecordRef<'a> {
    pub fn parse(block: &'a str) -> Self {
        let (hash, body) = block.split_once(FIELD_SEPARATOR).unwrap_or((block, ""));
        Self { hash, body }
    }

    /// `key=value` pairs in stored order. Lines without `=` are ignored and
    /// values keep any further `=` they contain.
    pub fn properties(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.body
            .split(PROPERTY_SEPARATOR)
            .filter_map(|line| line.split_once('='))
    }
}

/// Everything the writer serializes, keyed by bucket subkey.
///
/// `BTreeMap` keeps bucket order independent of insertion order, which is
/// what makes repeated builds byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub content: BTreeMap<String, Vec<ContentRecord>>,
    pub details: BTreeMap<String, Vec<DetailRecord>>,
}

impl Buckets {
    pub fn content_records(&self) -> usize {
        self.content.values().map(Vec::len).sum()
    }

    pub fn detail_records(&self) -> usize {
        self.details.values().map(Vec::len).sum()
    }
}
