//! Candidate pattern groups for one user agent.
//!
//! Hashes are probed most specific first: every shortening of the agent's
//! leading literal run, then the empty prefix, then the fallback bucket.
//! Buckets are read from storage only when their hash comes up, so a
//! lookup that matches early never touches the rest of the index.

use std::iter::FusedIterator;

use index::{Blocks, ContentRecordRef, IndexReader};
use pattern::{content_subkey, prefix_hash_variants, FALLBACK_HASH};

use crate::MatchError;

/// Lazy, single-pass sequence of tab-joined pattern groups.
///
/// After the last real group an empty string is yielded, meaning "no
/// fallback matched either". The iterator is fused after that sentinel or
/// after the first error.
pub struct Candidates<'a> {
    reader: &'a IndexReader,
    ua_len: usize,
    hashes: std::vec::IntoIter<String>,
    scan: Option<BucketScan<'a>>,
    done: bool,
}

struct BucketScan<'a> {
    hash: String,
    blocks: Blocks<'a>,
    found: bool,
}

impl<'a> Candidates<'a> {
    /// `user_agent` must already be lowercased.
    pub fn new(reader: &'a IndexReader, user_agent: &str) -> Self {
        let mut hashes = prefix_hash_variants(user_agent);
        hashes.push(FALLBACK_HASH.to_string());
        Self {
            reader,
            ua_len: user_agent.len(),
            hashes: hashes.into_iter(),
            scan: None,
            done: false,
        }
    }

    fn next_group(&mut self) -> Option<Result<String, MatchError>> {
        loop {
            if let Some(scan) = self.scan.as_mut() {
                let block = match scan.blocks.next() {
                    Some(Ok(block)) => block,
                    Some(Err(err)) => return Some(Err(err.into())),
                    None => {
                        self.scan = None;
                        continue;
                    }
                };
                let record = match ContentRecordRef::parse(&block) {
                    Ok(record) => record,
                    Err(err) => return Some(Err(err.into())),
                };
                if record.hash == scan.hash {
                    scan.found = true;
                    if record.literal_length <= self.ua_len {
                        return Some(Ok(record.pattern_list().to_string()));
                    }
                } else if scan.found {
                    // Records of one hash are contiguous; the group is over.
                    self.scan = None;
                }
                continue;
            }

            let hash = self.hashes.next()?;
            if let Some(location) = self.reader.content_location(content_subkey(&hash)) {
                self.scan = Some(BucketScan {
                    blocks: self.reader.blocks(location),
                    hash,
                    found: false,
                });
            }
        }
    }
}

impl Iterator for Candidates<'_> {
    type Item = Result<String, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_group() {
            Some(Ok(group)) => Some(Ok(group)),
            Some(Err(err)) => {
                self.done = true;
                Some(Err(err))
            }
            None => {
                self.done = true;
                Some(Ok(String::new()))
            }
        }
    }
}

impl FusedIterator for Candidates<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use index::{Buckets, ContentRecord, IndexWriter, InMemoryStorage};
    use pattern::md5_hex;
    use std::io::Cursor;

    fn reader_for(records: Vec<ContentRecord>) -> IndexReader {
        let mut buckets = Buckets::default();
        for record in records {
            buckets
                .content
                .entry(content_subkey(&record.hash).to_string())
                .or_default()
                .push(record);
        }
        let (cursor, _) = IndexWriter::new(Cursor::new(Vec::new()))
            .write(&buckets)
            .unwrap();
        IndexReader::from_storage(Box::new(InMemoryStorage::new(cursor.into_inner()))).unwrap()
    }

    fn record(prefix: &str, literal_length: usize, patterns: &[&str]) -> ContentRecord {
        let hash = if prefix == "zz" {
            FALLBACK_HASH.to_string()
        } else {
            md5_hex(prefix.as_bytes())
        };
        ContentRecord {
            hash,
            literal_length,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn most_specific_prefix_first_then_fallback() {
        let reader = reader_for(vec![
            record("ab", 3, &["ab.*c"]),
            record("abc", 4, &["abc.*d"]),
            record("zz", 0, &[".*"]),
        ]);
        let groups: Vec<String> = Candidates::new(&reader, "abcdef")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(groups, vec!["abc.*d", "ab.*c", ".*", ""]);
    }

    #[test]
    fn skips_groups_longer_than_agent() {
        let reader = reader_for(vec![
            record("abc", 10, &["abc.*long"]),
            record("abc", 3, &["abc.*"]),
        ]);
        let groups: Vec<String> = Candidates::new(&reader, "abcde")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(groups, vec!["abc.*", ""]);
    }

    #[test]
    fn sentinel_only_when_nothing_stored() {
        let reader = reader_for(Vec::new());
        let mut candidates = Candidates::new(&reader, "anything");
        assert_eq!(candidates.next(), Some(Ok(String::new())));
        assert_eq!(candidates.next(), None);
        assert_eq!(candidates.next(), None);
    }

    #[test]
    fn empty_prefix_bucket_is_probed() {
        let reader = reader_for(vec![record("", 3, &[".*foo"])]);
        let groups: Vec<String> = Candidates::new(&reader, "xfoo")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(groups, vec![".*foo", ""]);
    }
}
