use std::collections::BTreeMap;

use index::IndexError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on `Parent` hops followed while resolving properties.
pub const DEFAULT_MAX_PARENT_DEPTH: usize = 16;

/// Default number of compiled expressions a classifier keeps.
pub const DEFAULT_REGEX_CACHE_CAPACITY: usize = 4096;

/// Single property value of a classification.
///
/// The catalog stores everything as text; `"true"` and `"false"` are lifted
/// to booleans, everything else (numbers included) stays text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
}

impl PropertyValue {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => PropertyValue::Bool(true),
            "false" => PropertyValue::Bool(false),
            other => PropertyValue::Text(other.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            PropertyValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(flag) => Some(*flag),
            PropertyValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(flag) => write!(f, "{flag}"),
            PropertyValue::Text(text) => f.write_str(text),
        }
    }
}

/// Capabilities of a classified user agent.
///
/// `properties` is the merged view of the matched section and all of its
/// ancestors, with `Parent` removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserInfo {
    /// Literal catalog pattern that matched, lowercased, digits filled in.
    pub pattern: String,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl BrowserInfo {
    /// Build from raw resolver output.
    pub fn from_raw(pattern: impl Into<String>, raw: BTreeMap<String, String>) -> Self {
        Self {
            pattern: pattern.into(),
            properties: raw
                .into_iter()
                .map(|(key, value)| {
                    let value = PropertyValue::parse(&value);
                    (key, value)
                })
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropertyValue::as_str)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(PropertyValue::as_bool)
    }

    pub fn version(&self) -> Option<&str> {
        self.text("Version")
    }

    pub fn browser(&self) -> Option<&str> {
        self.text("Browser")
    }

    pub fn browser_maker(&self) -> Option<&str> {
        self.text("Browser_Maker")
    }

    pub fn major_version(&self) -> Option<&str> {
        self.text("MajorVer")
    }

    pub fn minor_version(&self) -> Option<&str> {
        self.text("MinorVer")
    }

    pub fn platform(&self) -> Option<&str> {
        self.text("Platform")
    }

    pub fn is_mobile_device(&self) -> Option<bool> {
        self.flag("isMobileDevice")
    }

    pub fn is_tablet(&self) -> Option<bool> {
        self.flag("isTablet")
    }

    pub fn crawler(&self) -> Option<bool> {
        self.flag("Crawler")
    }

    pub fn device_type(&self) -> Option<&str> {
        self.text("Device_Type")
    }

    pub fn device_pointing_method(&self) -> Option<&str> {
        self.text("Device_Pointing_Method")
    }
}

/// Settings for a [`Classifier`](crate::Classifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Maximum `Parent` hops before resolution fails. Guards against cycles.
    #[serde(default = "ClassifierConfig::default_max_parent_depth")]
    pub max_parent_depth: usize,
    /// Compiled group and pattern expressions kept between lookups. Zero
    /// compiles every expression afresh.
    #[serde(default = "ClassifierConfig::default_regex_cache_capacity")]
    pub regex_cache_capacity: usize,
}

impl ClassifierConfig {
    pub(crate) fn default_max_parent_depth() -> usize {
        DEFAULT_MAX_PARENT_DEPTH
    }

    pub(crate) fn default_regex_cache_capacity() -> usize {
        DEFAULT_REGEX_CACHE_CAPACITY
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_parent_depth == 0 {
            return Err(MatchError::InvalidConfig(
                "max_parent_depth must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
            regex_cache_capacity: DEFAULT_REGEX_CACHE_CAPACITY,
        }
    }
}

/// Outcome reported to metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Hit,
    Miss,
    Error,
}

/// Errors produced by the matching layer.
///
/// Not finding a match is not an error; `classify` returns `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("invalid classifier config: {0}")]
    InvalidConfig(String),
    /// Index read failed or the index is missing or corrupt.
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    /// `Parent` links go deeper than allowed, usually a cycle.
    #[error("parent chain of {pattern:?} exceeds {depth} levels")]
    ParentChainTooDeep { pattern: String, depth: usize },
}
