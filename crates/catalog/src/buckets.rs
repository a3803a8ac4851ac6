//! Folding normalized patterns and raw properties into index buckets.

use std::collections::BTreeMap;

use index::{ContentRecord, DetailRecord};
use pattern::{content_subkey, detail_subkey, pattern_hash};

use crate::{Catalog, PatternTable};

/// Content records grouped by the 2-character subkey of their prefix hash.
///
/// Records of one hash stay contiguous and ordered by literal length,
/// longest first, so the lookup side can stop scanning once the hash group
/// ends. Groups larger than `batch_size` are split into several records.
pub fn build_content_buckets(
    table: &PatternTable,
    batch_size: usize,
) -> BTreeMap<String, Vec<ContentRecord>> {
    let batch_size = batch_size.max(1);
    let mut buckets: BTreeMap<String, Vec<ContentRecord>> = BTreeMap::new();

    for (hash, groups) in table {
        let bucket = buckets.entry(content_subkey(hash).to_string()).or_default();
        for (length, fragments) in groups {
            for chunk in fragments.chunks(batch_size) {
                bucket.push(ContentRecord {
                    hash: hash.clone(),
                    literal_length: length.0,
                    patterns: chunk.to_vec(),
                });
            }
        }
    }

    buckets
}

/// Detail records grouped by the 3-character subkey of the section hash.
///
/// Every section is stored, including group headers and the version
/// section, since any of them may be named as a `Parent`.
pub fn build_detail_buckets(catalog: &Catalog) -> BTreeMap<String, Vec<DetailRecord>> {
    let mut buckets: BTreeMap<String, Vec<DetailRecord>> = BTreeMap::new();

    for section in &catalog.sections {
        let hash = pattern_hash(&section.name);
        buckets
            .entry(detail_subkey(&hash).to_string())
            .or_default()
            .push(DetailRecord {
                hash,
                properties: section.properties.clone(),
            });
    }

    buckets
}
