//! Compile-time knobs.

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Section name of the catalog's version marker. It carries release
/// metadata, never a user-agent pattern.
pub const DEFAULT_VERSION_SECTION: &str = "GJK_Browscap_Version";

/// Upper bound on alternatives per content record, which bounds the size of
/// one combined regex at lookup time.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Options for [`compile`](crate::compile).
///
/// ```rust
/// use catalog::CompileOptions;
///
/// let options = CompileOptions::default();
/// assert_eq!(options.batch_size, 50);
/// options.validate().expect("defaults are valid");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Maximum number of patterns joined into one content record.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Section dropped from the pattern list.
    #[serde(default = "default_version_section")]
    pub version_section: String,
}

impl CompileOptions {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.batch_size == 0 {
            return Err(CatalogError::InvalidOptions(
                "batch_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            version_section: DEFAULT_VERSION_SECTION.to_string(),
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_version_section() -> String {
    DEFAULT_VERSION_SECTION.to_string()
}
