//! Workspace umbrella crate for the user-agent capability index (UACAP).
//!
//! Compile a browscap-style catalog once with [`build`], then answer
//! "what browser is this?" for any number of user agents with a
//! [`Classifier`] opened by [`open`].
//!
//! ```no_run
//! let summary = uacap::build("browscap.ini", "browscap.bin")?;
//! println!("{} patterns stored", summary.compile.stored_patterns);
//!
//! let classifier = uacap::open("browscap.bin")?;
//! let info = classifier.classify("Mozilla/5.0 (X11; Linux x86_64) Firefox/99.0")?;
//! # Ok::<(), uacap::UacapError>(())
//! ```

pub mod config;

pub use catalog::{
    Catalog, CatalogError, CatalogStats, CompileOptions, CompileStats, CompiledCatalog, Section,
    compile, compile_file, parse_catalog,
};
pub use index::{IndexError, IndexReader, IndexStats, WriteSummary, write_index_file};
pub use matcher::{
    BrowserInfo, Classifier, ClassifierConfig, MatchError, MatchMetrics, MatchOutcome,
    PropertyValue, set_match_metrics,
};

pub use crate::config::{ConfigLoadError, UacapConfig};

use std::error::Error;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

/// Errors surfaced by the umbrella API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UacapError {
    Catalog(CatalogError),
    Index(IndexError),
    Match(MatchError),
}

impl fmt::Display for UacapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UacapError::Catalog(err) => write!(f, "catalog compilation failed: {err}"),
            UacapError::Index(err) => write!(f, "index failure: {err}"),
            UacapError::Match(err) => write!(f, "classification failed: {err}"),
        }
    }
}

impl Error for UacapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UacapError::Catalog(err) => Some(err),
            UacapError::Index(err) => Some(err),
            UacapError::Match(err) => Some(err),
        }
    }
}

impl From<CatalogError> for UacapError {
    fn from(value: CatalogError) -> Self {
        UacapError::Catalog(value)
    }
}

impl From<IndexError> for UacapError {
    fn from(value: IndexError) -> Self {
        UacapError::Index(value)
    }
}

impl From<MatchError> for UacapError {
    fn from(value: MatchError) -> Self {
        UacapError::Match(value)
    }
}

/// What a [`build`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub compile: CompileStats,
    pub bytes_written: u64,
}

/// Compile the catalog at `catalog_path` into an index at `output_path`
/// with default options.
///
/// Malformed catalog lines are skipped and counted, never fatal. The index
/// file is replaced atomically.
pub fn build<C, O>(catalog_path: C, output_path: O) -> Result<BuildSummary, UacapError>
where
    C: AsRef<Path>,
    O: AsRef<Path>,
{
    build_with_options(catalog_path, output_path, &CompileOptions::default())
}

/// [`build`] with explicit compile options.
pub fn build_with_options<C, O>(
    catalog_path: C,
    output_path: O,
    options: &CompileOptions,
) -> Result<BuildSummary, UacapError>
where
    C: AsRef<Path>,
    O: AsRef<Path>,
{
    let start = Instant::now();
    let compiled = compile_file(catalog_path.as_ref(), options)?;
    let written = write_index_file(&compiled.buckets, output_path.as_ref())?;

    info!(
        catalog = %catalog_path.as_ref().display(),
        output = %output_path.as_ref().display(),
        bytes = written.bytes_written,
        elapsed_micros = start.elapsed().as_micros(),
        "build_complete"
    );

    Ok(BuildSummary {
        compile: compiled.stats,
        bytes_written: written.bytes_written,
    })
}

/// Open a compiled index with the default classifier settings.
pub fn open<P: AsRef<Path>>(index_path: P) -> Result<Classifier, UacapError> {
    Ok(Classifier::open(index_path, ClassifierConfig::default())?)
}

/// Open the index named by a loaded configuration.
pub fn open_with_config(config: &UacapConfig) -> Result<Classifier, UacapError> {
    Ok(Classifier::open(
        &config.index_path,
        config.classifier_config(),
    )?)
}
