//! Audit configuration
//!
//! Plain serde structs with defaults, loadable from TOML:
//!
//! ```toml
//! min_changes = 1
//!
//! [formatter]
//! exclude_fields = ["internalNotes"]
//! meaningful_changes_only = true
//! max_depth = 3
//!
//! [cascade]
//! allow_cascading = true
//! max_cascade_depth = 2
//! ```
//!
//! Fields listed in `formatter.exclude_fields` are added to
//! [`SYSTEM_FIELDS`]. Set `formatter.replace_system_fields = true` to use the
//! listed set on its own.

use crate::diff::formatter::DEFAULT_MIN_CHANGES;
use crate::errors::{AuditError, ExError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Fields the host platform maintains itself; never meaningful to audit.
pub const SYSTEM_FIELDS: &[&str] = &[
    "id",
    "_id",
    "__v",
    "createdAt",
    "updatedAt",
    "hash",
    "salt",
    "sessions",
    "loginAttempts",
    "lockUntil",
    "resetPasswordToken",
    "resetPasswordExpiration",
];

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_EQUALITY_MAX_DEPTH: usize = 10;
pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 1;

/// The system field set as owned strings.
pub fn system_fields() -> BTreeSet<String> {
    SYSTEM_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Exclusion and depth rules for the change formatter.
///
/// The formatter treats `exclude_fields` as authoritative; keeping the
/// system fields in it is the loader's job, not the differ's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFormatterConfig {
    pub exclude_fields: BTreeSet<String>,
    pub meaningful_changes_only: bool,
    /// Depth past which a changed subtree is reported as one replacement
    pub max_depth: usize,
    /// Recursion cap of the structural equality check
    pub equality_max_depth: usize,
}

impl Default for ChangeFormatterConfig {
    fn default() -> Self {
        Self {
            exclude_fields: system_fields(),
            meaningful_changes_only: true,
            max_depth: DEFAULT_MAX_DEPTH,
            equality_max_depth: DEFAULT_EQUALITY_MAX_DEPTH,
        }
    }
}

impl ChangeFormatterConfig {
    /// Config excluding exactly `fields`, with default depths.
    pub fn excluding<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude_fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_equality_max_depth(mut self, equality_max_depth: usize) -> Self {
        self.equality_max_depth = equality_max_depth;
        self
    }

    pub fn with_meaningful_changes_only(mut self, enabled: bool) -> Self {
        self.meaningful_changes_only = enabled;
        self
    }
}

/// Whether (and how many) side-effect mutations are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CascadeConfig {
    pub allow_cascading: bool,
    /// Unset means [`DEFAULT_MAX_CASCADE_DEPTH`]
    pub max_cascade_depth: Option<usize>,
}

impl CascadeConfig {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn allowing(max_cascade_depth: usize) -> Self {
        Self {
            allow_cascading: true,
            max_cascade_depth: Some(max_cascade_depth),
        }
    }

    /// Effective depth budget.
    pub fn max_depth(&self) -> usize {
        self.max_cascade_depth.unwrap_or(DEFAULT_MAX_CASCADE_DEPTH)
    }
}

/// Everything the audit hooks need, supplied once at setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditConfig {
    pub formatter: ChangeFormatterConfig,
    pub cascade: CascadeConfig,
    /// Minimum changed fields for an update to be recorded
    pub min_changes: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            formatter: ChangeFormatterConfig::default(),
            cascade: CascadeConfig::default(),
            min_changes: DEFAULT_MIN_CHANGES,
        }
    }
}

// On-disk shape: every field optional, merged onto the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAuditConfig {
    #[serde(default)]
    formatter: RawFormatterConfig,
    cascade: Option<CascadeConfig>,
    min_changes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFormatterConfig {
    #[serde(default)]
    exclude_fields: Vec<String>,
    #[serde(default)]
    replace_system_fields: bool,
    meaningful_changes_only: Option<bool>,
    max_depth: Option<usize>,
    equality_max_depth: Option<usize>,
}

impl AuditConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the text is not valid TOML for this schema, or
    ///   `formatter.max_depth` is zero
    pub fn from_toml_str(text: &str) -> Result<Self, ExError> {
        let raw: RawAuditConfig = toml::from_str(text).map_err(AuditError::from)?;
        let config = Self::from_raw(raw);
        config.validate()?;
        tracing::debug!(
            excluded = config.formatter.exclude_fields.len(),
            max_depth = config.formatter.max_depth,
            allow_cascading = config.cascade.allow_cascading,
            "loaded audit config"
        );
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// - `Io` if the file cannot be read
    /// - `InvalidConfig` as for [`AuditConfig::from_toml_str`]
    pub fn from_path(path: &Path) -> Result<Self, ExError> {
        let text = std::fs::read_to_string(path).map_err(|e| AuditError::ConfigRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    fn from_raw(raw: RawAuditConfig) -> Self {
        let defaults = ChangeFormatterConfig::default();
        let mut exclude_fields = if raw.formatter.replace_system_fields {
            BTreeSet::new()
        } else {
            defaults.exclude_fields
        };
        exclude_fields.extend(raw.formatter.exclude_fields);

        Self {
            formatter: ChangeFormatterConfig {
                exclude_fields,
                meaningful_changes_only: raw
                    .formatter
                    .meaningful_changes_only
                    .unwrap_or(defaults.meaningful_changes_only),
                max_depth: raw.formatter.max_depth.unwrap_or(defaults.max_depth),
                equality_max_depth: raw
                    .formatter
                    .equality_max_depth
                    .unwrap_or(defaults.equality_max_depth),
            },
            cascade: raw.cascade.unwrap_or_default(),
            min_changes: raw.min_changes.unwrap_or(DEFAULT_MIN_CHANGES),
        }
    }

    fn validate(&self) -> Result<(), AuditError> {
        if self.formatter.max_depth == 0 {
            return Err(AuditError::InvalidConfigValue {
                field: "formatter.max_depth".to_string(),
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }
}
