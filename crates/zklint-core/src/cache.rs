//! Corpus identifier cache
//!
//! A cache record is a wholesale snapshot of the corpus identifier map keyed
//! by a fingerprint of the scan and validation settings. It is trusted in
//! full or discarded in full; there is no partial reuse and no incremental
//! update. A discarded cache triggers a full rescan, never an error, and a
//! failed save never affects the outcome of validation.

use crate::config::ValidatorConfig;
use crate::index::{self, CorpusIndex};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Supported cache schema version.
pub const CACHE_VERSION: &str = "1.0";

/// On-disk cache snapshot.
///
/// `uuids` and `file_mtimes` are derived together and written in one record;
/// `timestamp` (Unix seconds) drives TTL arithmetic while `created` is for
/// humans reading the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub version: String,
    pub created: DateTime<Utc>,
    pub timestamp: u64,
    pub config_hash: String,
    pub file_count: usize,
    pub file_mtimes: HashMap<String, f64>,
    pub uuids: HashMap<String, String>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn mtime_seconds(path: &Path) -> Option<f64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs_f64())
}

/// Load the cached corpus identifier map, if it can be trusted.
///
/// Returns `None` when the cache is disabled, missing, unparseable, or stale
/// — never an error. On a hit the map is reconstructed from the record with
/// no file reads.
pub fn load(config: &ValidatorConfig) -> Option<CorpusIndex> {
    if !config.cache.enabled {
        return None;
    }

    let path = &config.cache.path;
    if !path.exists() {
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("cache unreadable at {}: {e}", path.display());
            return None;
        }
    };

    let record: CacheRecord = match serde_json::from_str(&content) {
        Ok(record) => record,
        Err(e) => {
            debug!("cache corrupt at {}: {e}", path.display());
            return None;
        }
    };

    if !is_fresh(&record, config) {
        return None;
    }

    Some(
        record
            .uuids
            .into_iter()
            .map(|(id, file)| (id, PathBuf::from(file)))
            .collect(),
    )
}

/// Freshness checks, in order, short-circuiting on the first failure.
fn is_fresh(record: &CacheRecord, config: &ValidatorConfig) -> bool {
    if record.version != CACHE_VERSION {
        debug!(
            "cache stale: version {:?} (expected {:?})",
            record.version, CACHE_VERSION
        );
        return false;
    }

    let current_hash = config.fingerprint();
    if record.config_hash != current_hash {
        debug!(
            "cache stale: config fingerprint {} (expected {})",
            record.config_hash, current_hash
        );
        return false;
    }

    let current_count = index::count_documents(config);
    if record.file_count != current_count {
        debug!(
            "cache stale: file count {} (corpus has {})",
            record.file_count, current_count
        );
        return false;
    }

    for (file, cached_mtime) in &record.file_mtimes {
        let path = Path::new(file);
        let Some(current_mtime) = mtime_seconds(path) else {
            debug!("cache stale: {file} missing or unstatable");
            return false;
        };
        if current_mtime > *cached_mtime {
            debug!("cache stale: {file} modified");
            return false;
        }
    }

    if let Some(ttl) = config.cache.ttl_seconds {
        let age = now_secs().saturating_sub(record.timestamp);
        if age > ttl {
            debug!("cache stale: age {age}s exceeds ttl {ttl}s");
            return false;
        }
    }

    true
}

/// Persist the corpus identifier map. Best-effort: every failure is
/// swallowed, because a failed cache write must never fail validation.
pub fn save(config: &ValidatorConfig, index: &CorpusIndex) {
    if !config.cache.enabled {
        return;
    }

    let mut file_mtimes = HashMap::new();
    let mut uuids = HashMap::new();
    for (id, path) in index.iter() {
        let file = path.to_string_lossy().into_owned();
        uuids.insert(id.clone(), file.clone());
        if let Some(mtime) = mtime_seconds(path) {
            file_mtimes.insert(file, mtime);
        }
    }

    let record = CacheRecord {
        version: CACHE_VERSION.to_string(),
        created: Utc::now(),
        timestamp: now_secs(),
        config_hash: config.fingerprint(),
        file_count: index.len(),
        file_mtimes,
        uuids,
    };

    if let Err(e) = write_record(&config.cache.path, &record) {
        debug!("cache save failed (ignored): {e:#}");
    }
}

fn write_record(path: &Path, record: &CacheRecord) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(record).context("serializing cache record")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
