//! # UACAP Matcher (`matcher`)
//!
//! Query side of the user-agent capability index. Given a compiled index
//! file, [`Classifier::classify`] maps a user-agent string to the merged
//! properties of the first catalog pattern that matches it.
//!
//! ## Lookup pipeline
//!
//! 1. The agent is lowercased and its leading literal run is hashed at every
//!    length, longest first, followed by the empty prefix and the reserved
//!    fallback bucket ([`Candidates`]).
//! 2. Each candidate group of up to 50 patterns is tested with one combined
//!    expression; only a group hit costs per-pattern work. Compiled
//!    expressions are cached on the classifier ([`RegexCache`]).
//! 3. The matching pattern's version digits are restored from the agent and
//!    its properties are looked up, following `Parent` links
//!    ([`DetailResolver`]).
//!
//! The first non-empty property set wins.
//!
//! ## Example Usage
//!
//! ```no_run
//! use matcher::{Classifier, ClassifierConfig};
//!
//! let classifier = Classifier::open("browscap.bin", ClassifierConfig::default())?;
//! if let Some(info) = classifier.classify("Mozilla/5.0 (X11; Linux x86_64) Firefox/99.0")? {
//!     println!("{:?} on {:?}", info.browser(), info.platform());
//! }
//! # Ok::<(), matcher::MatchError>(())
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to record
//! per-classification latency and outcome.

mod batch;
mod candidates;
pub mod engine;
pub mod metrics;
mod resolver;
pub mod types;

pub use crate::batch::{concrete_match, group_matches, RegexCache};
pub use crate::candidates::Candidates;
pub use crate::engine::Classifier;
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::resolver::DetailResolver;
pub use crate::types::{
    BrowserInfo, ClassifierConfig, MatchError, MatchOutcome, PropertyValue,
    DEFAULT_MAX_PARENT_DEPTH, DEFAULT_REGEX_CACHE_CAPACITY,
};
