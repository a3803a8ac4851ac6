//! Regex evaluation of candidate groups.
//!
//! A whole group is rejected with one alternation before any pattern is
//! tried on its own. Only on a group hit are patterns tested one by one,
//! with digit placeholders turned into capture groups so the concrete
//! section name can be rebuilt from what the agent carried.
//!
//! Compiled expressions live in a [`RegexCache`] owned by the classifier, so
//! a group is compiled once per process rather than once per lookup.

use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use pattern::{expand_placeholders, placeholder_count, reinsert_digits};
use regex::{Regex, RegexBuilder};
use tracing::warn;

type Compiled = Result<Arc<Regex>, regex::Error>;

/// Compiled anchored expressions, keyed by their source.
///
/// Sources that fail to compile are kept as well, so each one is reported
/// once. The map is cleared when it reaches `capacity`; a capacity of zero
/// turns caching off.
#[derive(Debug)]
pub struct RegexCache {
    capacity: usize,
    entries: RwLock<HashMap<String, Compiled>>,
}

impl RegexCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached expressions, valid or not.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `^(?:body)$`, case-insensitive. The flag is `true` when the
    /// expression was compiled by this call.
    fn anchored(&self, body: &str) -> (Compiled, bool) {
        let source = format!("^(?:{body})$");
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&source)
        {
            return (hit.clone(), false);
        }

        let compiled = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map(Arc::new);
        if self.capacity > 0 {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if entries.len() >= self.capacity {
                entries.clear();
            }
            entries.insert(source, compiled.clone());
        }
        (compiled, true)
    }
}

/// Whether any pattern of the group could match `user_agent`.
///
/// If the combined expression cannot be built the group is passed through,
/// and each pattern gets its own chance in [`concrete_match`].
pub fn group_matches(cache: &RegexCache, patterns: &[&str], user_agent: &str) -> bool {
    let body = patterns
        .iter()
        .map(|p| format!("(?:{p})"))
        .collect::<Vec<_>>()
        .join("|");
    match cache.anchored(&body) {
        (Ok(re), _) => re.is_match(user_agent),
        (Err(err), fresh) => {
            if fresh {
                warn!(error = %err, patterns = patterns.len(), "group_regex_invalid");
            }
            true
        }
    }
}

/// The stored fragment with its placeholders replaced by the digits found
/// in `user_agent`, or `None` if the fragment does not match.
///
/// A fragment that is not a valid expression is logged and treated as a
/// non-match.
pub fn concrete_match(cache: &RegexCache, fragment: &str, user_agent: &str) -> Option<String> {
    let expanded = if placeholder_count(fragment) == 0 {
        None
    } else {
        Some(expand_placeholders(fragment))
    };
    let re = match cache.anchored(expanded.as_deref().unwrap_or(fragment)) {
        (Ok(re), _) => re,
        (Err(err), fresh) => {
            if fresh {
                warn!(error = %err, fragment, "pattern_regex_invalid");
            }
            return None;
        }
    };

    if expanded.is_none() {
        return re.is_match(user_agent).then(|| fragment.to_string());
    }
    let captures = re.captures(user_agent)?;
    let digits = captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str());
    Some(reinsert_digits(fragment, digits))
}
