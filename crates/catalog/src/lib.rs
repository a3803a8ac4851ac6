//! Catalog compiler
//!
//! Turns a browscap-style catalog (INI sections whose names are user-agent
//! wildcard patterns) into the bucket tables that `index` serializes.
//!
//! ## Stages
//!
//! - **Parse** - read `[section]` headers and `key=value` lines, skipping
//!   comments and counting anything malformed
//! - **Extract** - keep the section names that act as patterns, longest first
//! - **Normalize** - lowercase, prefix-hash, quote into regex form and
//!   compress version digits, deduplicating within each `(hash, length)` group
//! - **Bucket** - batch pattern groups into content records and store every
//!   section's raw properties as a detail record
//!
//! Output is a pure function of the input text and [`CompileOptions`], so
//! compiling the same catalog twice yields byte-identical index files.
//!
//! ## Example
//!
//! ```
//! use catalog::{compile, CompileOptions};
//!
//! let text = "[Mozilla/5.0 (*Linux*) Firefox/*]\nBrowser=\"Firefox\"\n";
//! let compiled = compile(text, &CompileOptions::default()).unwrap();
//!
//! assert_eq!(compiled.stats.patterns, 1);
//! assert_eq!(compiled.buckets.detail_records(), 1);
//! ```
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;

use index::Buckets;
use tracing::{info, warn, Level};

mod buckets;
mod config;
mod error;
mod normalize;
mod parse;
mod types;

pub use crate::buckets::{build_content_buckets, build_detail_buckets};
pub use crate::config::{CompileOptions, DEFAULT_BATCH_SIZE, DEFAULT_VERSION_SECTION};
pub use crate::error::CatalogError;
pub use crate::normalize::{extract_patterns, normalize, Normalized};
pub use crate::parse::parse_catalog;
pub use crate::types::{
    Catalog, CatalogStats, CompileStats, CompiledCatalog, PatternTable, Section,
};

/// Compile catalog text into index buckets.
pub fn compile(text: &str, options: &CompileOptions) -> Result<CompiledCatalog, CatalogError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "catalog.compile",
        input_bytes = text.len(),
        batch_size = options.batch_size
    );
    let _guard = span.enter();

    match compile_inner(text, options) {
        Ok(compiled) => {
            let elapsed_micros = start.elapsed().as_micros();
            let stats = &compiled.stats;
            info!(
                sections = stats.catalog.sections,
                skipped_lines = stats.catalog.skipped_lines,
                patterns = stats.patterns,
                stored_patterns = stats.stored_patterns,
                content_buckets = stats.content_buckets,
                detail_buckets = stats.detail_buckets,
                elapsed_micros,
                "catalog_compiled"
            );
            Ok(compiled)
        }
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(error = %err, elapsed_micros, "catalog_compile_failure");
            Err(err)
        }
    }
}

/// Read a catalog file and [`compile`] it.
///
/// Bytes that are not valid UTF-8 become U+FFFD instead of failing the
/// read; they usually sit in comments, and a pattern carrying one can never
/// match a user agent.
pub fn compile_file(
    path: impl AsRef<Path>,
    options: &CompileOptions,
) -> Result<CompiledCatalog, CatalogError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| CatalogError::Read {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        warn!(path = %path.display(), "catalog_invalid_utf8_replaced");
    }
    compile(&text, options)
}

fn compile_inner(text: &str, options: &CompileOptions) -> Result<CompiledCatalog, CatalogError> {
    options.validate()?;

    let catalog = parse_catalog(text);
    if catalog.is_empty() {
        return Err(CatalogError::NoSections {
            skipped_lines: catalog.stats.skipped_lines,
        });
    }

    let patterns = extract_patterns(&catalog, options);
    let normalized = normalize(&patterns);

    let buckets = Buckets {
        content: build_content_buckets(&normalized.table, options.batch_size),
        details: build_detail_buckets(&catalog),
    };

    let stats = CompileStats {
        catalog: catalog.stats,
        patterns: patterns.len(),
        stored_patterns: normalized.stored,
        rejected_patterns: normalized.rejected,
        content_buckets: buckets.content.len(),
        content_records: buckets.content_records(),
        detail_buckets: buckets.details.len(),
        detail_records: buckets.detail_records(),
    };

    Ok(CompiledCatalog { buckets, stats })
}
