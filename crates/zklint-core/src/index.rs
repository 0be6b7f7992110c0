//! Corpus identifier discovery
//!
//! The corpus identifier map is the sole authority for duplicate detection
//! and reference resolution. It spans every document under the configured
//! scan roots regardless of which files were requested for validation, so a
//! single-file run still sees the whole corpus.

use crate::config::ValidatorConfig;
use crate::regex_util::static_regex;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

static_regex!(pub(crate) fn uuid_pattern, r"^[A-F0-9]{8}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{12}$");

/// How many leading lines the lightweight probe reads. Frontmatter sits at
/// the top of a document; anything past this window is body.
const PROBE_LINE_LIMIT: usize = 31;

/// Mapping identifier -> owning document path for the whole corpus.
#[derive(Debug, Default, Clone)]
pub struct CorpusIndex {
    ids: HashMap<String, PathBuf>,
}

impl CorpusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: String, path: PathBuf) {
        self.ids.insert(id, path);
    }

    pub fn get(&self, id: &str) -> Option<&Path> {
        self.ids.get(id).map(PathBuf::as_path)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathBuf)> {
        self.ids.iter()
    }
}

impl FromIterator<(String, PathBuf)> for CorpusIndex {
    fn from_iter<T: IntoIterator<Item = (String, PathBuf)>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Outcome of probing one file for its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdProbe {
    /// An `id:` field was found inside a closed frontmatter block
    Found(String),
    /// No frontmatter, no closing marker in the window, or no `id:` field
    NotFound,
    /// The file could not be read
    Unreadable,
}

/// Extract just the `id:` value from the top of a file.
///
/// Reads at most [`PROBE_LINE_LIMIT`] lines and does minimal line-oriented
/// parsing; full field parsing is deferred to deep validation. The value is
/// returned as written — format checking is the caller's concern.
pub fn probe_id(path: &Path) -> IdProbe {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(_) => return IdProbe::Unreadable,
    };
    if metadata.file_type().is_symlink() || !metadata.is_file() {
        return IdProbe::Unreadable;
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return IdProbe::Unreadable,
    };

    let mut lines = Vec::with_capacity(PROBE_LINE_LIMIT);
    for line in BufReader::new(file).lines().take(PROBE_LINE_LIMIT) {
        match line {
            Ok(l) => lines.push(l),
            Err(_) => return IdProbe::Unreadable,
        }
    }

    probe_lines(&lines)
}

fn probe_lines(lines: &[String]) -> IdProbe {
    let mut start = 0;
    while start < lines.len() && lines[start].trim().is_empty() {
        start += 1;
    }
    if start >= lines.len() || lines[start].trim_end() != "---" {
        return IdProbe::NotFound;
    }

    let Some(close) = lines[start + 1..]
        .iter()
        .position(|l| l.trim_end() == "---")
    else {
        return IdProbe::NotFound;
    };

    for line in &lines[start + 1..start + 1 + close] {
        if let Some(rest) = line.trim().strip_prefix("id:") {
            return IdProbe::Found(rest.trim().to_string());
        }
    }

    IdProbe::NotFound
}

/// Compile exclude patterns once per run. Invalid patterns are skipped with
/// a warning rather than aborting the scan.
pub(crate) fn compile_excludes(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("ignoring invalid exclude pattern {p:?}: {e}");
                None
            }
        })
        .collect()
}

pub(crate) fn is_excluded(path: &Path, excludes: &[glob::Pattern]) -> bool {
    let path_str = path.to_string_lossy();
    excludes.iter().any(|p| p.matches(&path_str))
}

fn walk_documents<'a>(
    config: &'a ValidatorConfig,
    excludes: &'a [glob::Pattern],
) -> impl Iterator<Item = PathBuf> + 'a {
    config.scan.directories.iter().flat_map(move |root| {
        WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
            .filter(move |path| !is_excluded(path, excludes))
    })
}

/// Full scan: build the corpus identifier map from scratch.
///
/// Documents without a frontmatter marker, without an `id:` field, or with a
/// malformed identifier are excluded from the map — that is not an error,
/// they may simply lack metadata. Unreadable files are skipped.
pub fn discover(config: &ValidatorConfig) -> CorpusIndex {
    let excludes = compile_excludes(&config.scan.exclude_patterns);
    let mut index = CorpusIndex::new();

    for path in walk_documents(config, &excludes) {
        match probe_id(&path) {
            IdProbe::Found(id) if uuid_pattern().is_match(&id) => {
                index.insert(id, path);
            }
            IdProbe::Found(_) | IdProbe::NotFound => {}
            IdProbe::Unreadable => {
                debug!("skipping unreadable file during discovery: {}", path.display());
            }
        }
    }

    index
}

/// Count matching documents under the scan roots. No content reads; used by
/// the cache freshness check.
pub fn count_documents(config: &ValidatorConfig) -> usize {
    let excludes = compile_excludes(&config.scan.exclude_patterns);
    walk_documents(config, &excludes).count()
}
