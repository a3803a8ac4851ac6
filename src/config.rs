//! YAML configuration file support.
//!
//! One file describes both halves of the system: where the catalog and the
//! compiled index live, how the compiler batches patterns, and how far the
//! classifier follows `Parent` links. CLI flags override what is loaded here.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! catalog_path: "data/browscap.ini"
//! index_path: "data/browscap.bin"
//! log_level: "info"
//!
//! compile:
//!   batch_size: 50
//!   version_section: "GJK_Browscap_Version"
//!
//! matcher:
//!   max_parent_depth: 16
//!   regex_cache_capacity: 4096
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use catalog::{CompileOptions, DEFAULT_BATCH_SIZE, DEFAULT_VERSION_SECTION};
use matcher::{ClassifierConfig, DEFAULT_MAX_PARENT_DEPTH, DEFAULT_REGEX_CACHE_CAPACITY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UacapConfig {
    /// Configuration format version
    pub version: String,

    /// Catalog text consumed by `build`
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Compiled index written by `build` and read by the classifier
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub compile: CompileYamlConfig,

    #[serde(default)]
    pub matcher: MatcherYamlConfig,
}

impl UacapConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: UacapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.index_path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "index_path must not be empty".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "log_level must not be empty".to_string(),
            ));
        }

        self.compile.validate()?;
        self.matcher.validate()?;

        Ok(())
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            batch_size: self.compile.batch_size,
            version_section: self.compile.version_section.clone(),
        }
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            max_parent_depth: self.matcher.max_parent_depth,
            regex_cache_capacity: self.matcher.regex_cache_capacity,
        }
    }
}

impl Default for UacapConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            catalog_path: default_catalog_path(),
            index_path: default_index_path(),
            log_level: default_log_level(),
            compile: CompileYamlConfig::default(),
            matcher: MatcherYamlConfig::default(),
        }
    }
}

/// Compiler YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileYamlConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_version_section")]
    pub version_section: String,
}

impl CompileYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.batch_size == 0 {
            return Err(ConfigLoadError::Validation(
                "compile.batch_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CompileYamlConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            version_section: DEFAULT_VERSION_SECTION.to_string(),
        }
    }
}

/// Classifier YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherYamlConfig {
    #[serde(default = "default_max_parent_depth")]
    pub max_parent_depth: usize,

    #[serde(default = "default_regex_cache_capacity")]
    pub regex_cache_capacity: usize,
}

impl MatcherYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_parent_depth == 0 {
            return Err(ConfigLoadError::Validation(
                "matcher.max_parent_depth must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MatcherYamlConfig {
    fn default() -> Self {
        Self {
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
            regex_cache_capacity: DEFAULT_REGEX_CACHE_CAPACITY,
        }
    }
}

// Helper functions for serde defaults
fn default_catalog_path() -> PathBuf {
    PathBuf::from("browscap.ini")
}

fn default_index_path() -> PathBuf {
    PathBuf::from("browscap.bin")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_version_section() -> String {
    DEFAULT_VERSION_SECTION.to_string()
}

fn default_max_parent_depth() -> usize {
    DEFAULT_MAX_PARENT_DEPTH
}

fn default_regex_cache_capacity() -> usize {
    DEFAULT_REGEX_CACHE_CAPACITY
}
