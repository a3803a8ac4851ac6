//! Property lookup and `Parent` inheritance.

use std::collections::BTreeMap;

use index::{DetailRecordRef, IndexReader};
use pattern::{detail_subkey, pattern_hash, unquote};
use tracing::debug;

use crate::MatchError;

const PARENT: &str = "Parent";

/// Resolves a pattern to its merged property map.
///
/// A pattern with no stored record resolves to an empty map; the same holds
/// for a missing ancestor, which simply contributes nothing.
#[derive(Debug, Clone, Copy)]
pub struct DetailResolver<'a> {
    reader: &'a IndexReader,
    max_parent_depth: usize,
}

impl<'a> DetailResolver<'a> {
    pub fn new(reader: &'a IndexReader, max_parent_depth: usize) -> Self {
        Self {
            reader,
            max_parent_depth,
        }
    }

    /// Resolve a regex-quoted fragment (as matched) by undoing the quoting.
    pub fn resolve_quoted(&self, quoted: &str) -> Result<BTreeMap<String, String>, MatchError> {
        self.resolve_literal(&unquote(quoted))
    }

    /// Resolve a literal wildcard pattern such as a `Parent` value.
    ///
    /// Ancestors are merged first and overridden by descendants. `Parent`
    /// itself never appears in the result.
    pub fn resolve_literal(&self, literal: &str) -> Result<BTreeMap<String, String>, MatchError> {
        self.resolve_at(literal, 0)
    }

    fn resolve_at(
        &self,
        literal: &str,
        depth: usize,
    ) -> Result<BTreeMap<String, String>, MatchError> {
        let Some(mut own) = self.lookup(literal)? else {
            debug!(pattern = literal, depth, "detail_miss");
            return Ok(BTreeMap::new());
        };
        let Some(parent) = own.remove(PARENT) else {
            return Ok(own);
        };
        if depth >= self.max_parent_depth {
            return Err(MatchError::ParentChainTooDeep {
                pattern: literal.to_string(),
                depth: self.max_parent_depth,
            });
        }

        let mut merged = self.resolve_at(&parent, depth + 1)?;
        merged.extend(own);
        Ok(merged)
    }

    fn lookup(&self, literal: &str) -> Result<Option<BTreeMap<String, String>>, MatchError> {
        let hash = pattern_hash(literal);
        let Some(location) = self.reader.detail_location(detail_subkey(&hash)) else {
            return Ok(None);
        };
        for block in self.reader.blocks(location) {
            let block = block?;
            let record = DetailRecordRef::parse(&block);
            if record.hash == hash {
                let properties = record
                    .properties()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect();
                return Ok(Some(properties));
            }
        }
        Ok(None)
    }
}
