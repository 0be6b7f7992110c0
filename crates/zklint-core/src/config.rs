//! Validator configuration
//!
//! The configuration file is JSON. A user config may be partial; present
//! fields replace the built-in defaults section by section, field by field.
//! Any config that fails to parse, carries unknown keys, or declares an
//! unsupported version is ignored with a warning in favor of the defaults —
//! a bad config never fails a run.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Supported configuration schema version.
pub const CONFIG_VERSION: &str = "1.0";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = ".frontmatter-config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub version: String,
    pub scan: ScanConfig,
    pub validation: ValidationConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Root directories scanned for documents, in order
    pub directories: Vec<PathBuf>,
    /// Glob patterns; matching files are invisible to discovery and validation
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub required_fields: Vec<String>,
    pub validate_cross_references: bool,
    pub title_must_match_h1: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub ttl_seconds: Option<u64>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            scan: ScanConfig {
                directories: vec![PathBuf::from(".ai"), PathBuf::from("docs")],
                exclude_patterns: vec![
                    "**/templates/**".to_string(),
                    "**/artifacts/**".to_string(),
                ],
            },
            validation: ValidationConfig {
                required_fields: vec![
                    "id".to_string(),
                    "title".to_string(),
                    "status".to_string(),
                    "date".to_string(),
                    "author".to_string(),
                ],
                validate_cross_references: true,
                title_must_match_h1: true,
            },
            cache: CacheConfig {
                enabled: false,
                path: PathBuf::from("./data/.uuid-cache.json"),
                ttl_seconds: None,
            },
        }
    }
}

/// Partial mirror of [`ValidatorConfig`] for user-supplied files.
///
/// Unknown keys are rejected at parse time so a typo cannot silently merge
/// into the effective configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    version: Option<String>,
    scan: Option<PartialScan>,
    validation: Option<PartialValidation>,
    cache: Option<PartialCache>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialScan {
    directories: Option<Vec<PathBuf>>,
    exclude_patterns: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialValidation {
    required_fields: Option<Vec<String>>,
    validate_cross_references: Option<bool>,
    title_must_match_h1: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialCache {
    enabled: Option<bool>,
    path: Option<PathBuf>,
    // Distinguishes "key absent" (keep default) from an explicit null
    #[serde(default, with = "serde_option_option")]
    ttl_seconds: Option<Option<u64>>,
}

mod serde_option_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<u64>::deserialize(deserializer).map(Some)
    }
}

impl PartialConfig {
    fn merge_into(self, mut base: ValidatorConfig) -> ValidatorConfig {
        if let Some(version) = self.version {
            base.version = version;
        }
        if let Some(scan) = self.scan {
            if let Some(directories) = scan.directories {
                base.scan.directories = directories;
            }
            if let Some(exclude_patterns) = scan.exclude_patterns {
                base.scan.exclude_patterns = exclude_patterns;
            }
        }
        if let Some(validation) = self.validation {
            if let Some(required_fields) = validation.required_fields {
                base.validation.required_fields = required_fields;
            }
            if let Some(validate_cross_references) = validation.validate_cross_references {
                base.validation.validate_cross_references = validate_cross_references;
            }
            if let Some(title_must_match_h1) = validation.title_must_match_h1 {
                base.validation.title_must_match_h1 = title_must_match_h1;
            }
        }
        if let Some(cache) = self.cache {
            if let Some(enabled) = cache.enabled {
                base.cache.enabled = enabled;
            }
            if let Some(path) = cache.path {
                base.cache.path = path;
            }
            if let Some(ttl_seconds) = cache.ttl_seconds {
                base.cache.ttl_seconds = ttl_seconds;
            }
        }
        base
    }
}

impl ValidatorConfig {
    /// Load configuration from `path`, merged over the built-in defaults.
    ///
    /// A missing file is not an error. A file that cannot be parsed or whose
    /// merged result declares an unsupported version falls back to pure
    /// defaults with a warning.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("failed to read config at {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };

        let partial: PartialConfig = match serde_json::from_str(&content) {
            Ok(partial) => partial,
            Err(e) => {
                warn!("failed to parse config at {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };

        let merged = partial.merge_into(Self::default());
        if merged.version != CONFIG_VERSION {
            warn!(
                "unsupported config version {:?} at {} (expected {:?}); using defaults",
                merged.version,
                path.display(),
                CONFIG_VERSION
            );
            return Self::default();
        }

        merged
    }

    /// Fingerprint of the settings that affect scanning and validation.
    ///
    /// Cache settings never participate, so toggling the cache on or off
    /// cannot invalidate the cache itself. SHA-256 over the canonical JSON
    /// serialization, hex, truncated to 12 chars.
    pub fn fingerprint(&self) -> String {
        #[derive(Serialize)]
        struct Fingerprinted<'a> {
            scan: &'a ScanConfig,
            validation: &'a ValidationConfig,
        }

        let canonical = serde_json::to_string(&Fingerprinted {
            scan: &self.scan,
            validation: &self.validation,
        })
        .expect("BUG: config serialization cannot fail");

        let digest = Sha256::digest(canonical.as_bytes());
        let hex = format!("{digest:x}");
        hex[..12].to_string()
    }
}
