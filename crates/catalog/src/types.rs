//! Data carried between the compile stages.
//!
//! The flow is linear: text becomes a [`Catalog`], the catalog's section
//! names become a [`PatternTable`], and both are folded into
//! [`index::Buckets`] inside a [`CompiledCatalog`].

use std::cmp::Reverse;
use std::collections::BTreeMap;

use index::Buckets;
use serde::{Deserialize, Serialize};

/// One `[name]` block of the catalog and the properties listed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section name exactly as written, wildcards included.
    pub name: String,
    /// `key=value` pairs in file order, quotes already stripped.
    pub properties: Vec<(String, String)>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.iter().any(|(k, _)| k == key)
    }

    /// First value stored under `key`.
    pub fn property_text(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the name is a wildcard pattern rather than a plain label.
    pub fn is_wildcard(&self) -> bool {
        self.name.contains(['*', '?'])
    }
}

/// Counters collected while reading catalog text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub lines: usize,
    pub sections: usize,
    pub properties: usize,
    /// Malformed lines plus property lines that appeared before any section.
    pub skipped_lines: usize,
}

/// Parsed catalog, sections in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub sections: Vec<Section>,
    pub stats: CatalogStats,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// First section whose name equals `name` exactly.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Normalized patterns grouped by prefix hash (ascending) and then by literal
/// length (descending). Each group holds deduplicated quoted fragments in the
/// order they were first seen.
pub type PatternTable = BTreeMap<String, BTreeMap<Reverse<usize>, Vec<String>>>;

/// Counters for a full compile run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileStats {
    pub catalog: CatalogStats,
    /// Section names that qualified as patterns.
    pub patterns: usize,
    /// Fragments stored after compression and deduplication.
    pub stored_patterns: usize,
    /// Patterns containing a tab, which the record format cannot carry.
    pub rejected_patterns: usize,
    pub content_buckets: usize,
    pub content_records: usize,
    pub detail_buckets: usize,
    pub detail_records: usize,
}

/// Output of [`compile`](crate::compile), ready for [`index::IndexWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCatalog {
    pub buckets: Buckets,
    pub stats: CompileStats,
}
