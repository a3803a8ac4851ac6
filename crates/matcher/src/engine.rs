use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use index::IndexReader;
use pattern::unquote;
use tracing::{debug, warn};

use crate::batch::{concrete_match, group_matches, RegexCache};
use crate::candidates::Candidates;
use crate::metrics::metrics_recorder;
use crate::resolver::DetailResolver;
use crate::types::{BrowserInfo, ClassifierConfig, MatchError, MatchOutcome};

#[cfg(test)]
mod tests;

/// User-agent classifier over a compiled index.
///
/// Only the index header is held in memory; bucket bodies are read on
/// demand. Cheap to clone and safe to share between threads; clones share
/// one regex cache.
#[derive(Debug, Clone)]
pub struct Classifier {
    index: Arc<IndexReader>,
    config: ClassifierConfig,
    regexes: Arc<RegexCache>,
}

impl Classifier {
    /// Construct a classifier that owns `index`.
    pub fn new(index: IndexReader, config: ClassifierConfig) -> Self {
        Self::with_index_arc(Arc::new(index), config)
    }

    /// Construct a classifier from a shared index handle.
    pub fn with_index_arc(index: Arc<IndexReader>, config: ClassifierConfig) -> Self {
        let regexes = Arc::new(RegexCache::new(config.regex_cache_capacity));
        Self {
            index,
            config,
            regexes,
        }
    }

    /// Open the index file at `path`.
    ///
    /// Fails with [`IndexError::MissingIndex`](index::IndexError::MissingIndex)
    /// when the catalog has not been compiled yet.
    pub fn open<P: AsRef<Path>>(path: P, config: ClassifierConfig) -> Result<Self, MatchError> {
        config.validate()?;
        let index = IndexReader::open(path)?;
        Ok(Self::new(index, config))
    }

    pub fn index(&self) -> &IndexReader {
        &self.index
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn regex_cache(&self) -> &RegexCache {
        &self.regexes
    }

    /// Candidate pattern groups for an already lowercased user agent.
    pub fn candidates<'a>(&'a self, user_agent: &str) -> Candidates<'a> {
        Candidates::new(&self.index, user_agent)
    }

    pub fn resolver(&self) -> DetailResolver<'_> {
        DetailResolver::new(&self.index, self.config.max_parent_depth)
    }

    /// Classify a user agent.
    ///
    /// Returns `Ok(None)` when nothing matched, not even the catch-all
    /// pattern. The first pattern whose resolved properties are non-empty
    /// wins; there is no scoring between matches.
    pub fn classify(&self, user_agent: &str) -> Result<Option<BrowserInfo>, MatchError> {
        let start = Instant::now();
        let lowered = user_agent.to_ascii_lowercase();
        let result = self.classify_inner(&lowered);
        let latency = start.elapsed();

        let outcome = match &result {
            Ok(Some(info)) => {
                debug!(
                    pattern = %info.pattern,
                    latency_micros = latency.as_micros(),
                    "classify_hit"
                );
                MatchOutcome::Hit
            }
            Ok(None) => {
                debug!(latency_micros = latency.as_micros(), "classify_miss");
                MatchOutcome::Miss
            }
            Err(err) => {
                warn!(error = %err, latency_micros = latency.as_micros(), "classify_failure");
                MatchOutcome::Error
            }
        };
        if let Some(recorder) = metrics_recorder() {
            recorder.record_classification(outcome, latency);
        }

        result
    }

    fn classify_inner(&self, user_agent: &str) -> Result<Option<BrowserInfo>, MatchError> {
        let resolver = self.resolver();

        for group in self.candidates(user_agent) {
            let group = group?;
            let patterns: Vec<&str> = group.split('\t').filter(|p| !p.is_empty()).collect();
            if patterns.is_empty() || !group_matches(&self.regexes, &patterns, user_agent) {
                continue;
            }

            for fragment in patterns {
                let Some(concrete) = concrete_match(&self.regexes, fragment, user_agent) else {
                    continue;
                };
                let literal = unquote(&concrete);
                let properties = resolver.resolve_literal(&literal)?;
                if !properties.is_empty() {
                    return Ok(Some(BrowserInfo::from_raw(literal, properties)));
                }
            }
        }

        Ok(None)
    }
}
