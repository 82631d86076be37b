use std::path::Path;

use mbi_types::{AtomicMode, BundleMode, FlushMode, ImportStrategy, MergeMode, PreheatIdentifier};
use serde::{Deserialize, Serialize};

use crate::error::{BundleError, BundleResult};

/// Settings for one import.
///
/// Every field has a default, so a TOML file only needs the settings it
/// changes:
///
/// ```toml
/// import_strategy = "CREATE"
/// atomic_mode = "OBJECT"
/// skip_audit = true
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub import_strategy: ImportStrategy,
    pub atomic_mode: AtomicMode,
    pub merge_mode: MergeMode,
    pub flush_mode: FlushMode,
    /// COMMIT, or VALIDATE to stop after validation.
    pub bundle_mode: BundleMode,
    pub preheat_identifier: PreheatIdentifier,
    /// Keep stored sharing on update.
    pub skip_sharing: bool,
    /// Skip the validation gate. Honoured for superusers only.
    pub skip_validation: bool,
    /// Emit no audit records.
    pub skip_audit: bool,
}

impl ImportConfig {
    pub fn from_toml_str(s: &str) -> BundleResult<Self> {
        toml::from_str(s).map_err(|e| BundleError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> BundleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> BundleResult<String> {
        toml::to_string(self).map_err(|e| BundleError::Config(e.to_string()))
    }

    /// Whether the bundle stops after validation.
    pub fn is_validate_only(&self) -> bool {
        self.bundle_mode == BundleMode::Validate
    }
}
