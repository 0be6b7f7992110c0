//! # zklint-core
//!
//! Core validation engine for frontmatter in markdown knowledge bases.
//!
//! Validates:
//! - Frontmatter shape and required fields
//! - Identifier format and corpus-wide uniqueness
//! - Date format and title/H1 consistency
//! - Cross-document references (`related`, `children`)
//!
//! The corpus identifier map is built once per run — from the cache when it
//! is fresh, otherwise from a full scan — so validating a single file still
//! checks it against the whole corpus.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod file_utils;
pub mod index;
pub mod parsers;
pub mod rules;

mod regex_util;

use std::path::{Path, PathBuf};

pub use config::ValidatorConfig;
pub use diagnostics::{Diagnostic, DiagnosticLevel, ValidateError, ValidateResult};
pub use index::CorpusIndex;
pub use rules::RunContext;

/// Outcome of a validation run.
#[derive(Debug)]
pub struct RunReport {
    /// Requested files that were actually validated
    pub validated: usize,
    /// How many of them passed
    pub passed: usize,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.validated - self.passed
    }

    /// A run is clean when it produced no errors; warnings are permitted.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Build the corpus identifier map: cache hit, or full scan followed by a
/// best-effort cache save.
pub fn prepare_index(config: &ValidatorConfig) -> CorpusIndex {
    if let Some(index) = cache::load(config) {
        return index;
    }

    let index = index::discover(config);
    cache::save(config, &index);
    index
}

/// Validate the requested files against the whole corpus.
///
/// Requested paths that do not exist or are not markdown are skipped, as are
/// duplicates of work already done: the run always attempts every remaining
/// file and the full cross-reference pass before reporting, so one file's
/// failure never suppresses another's report.
pub fn run(files: &[PathBuf], config: &ValidatorConfig) -> RunReport {
    let mut ctx = RunContext::new(prepare_index(config));

    let mut validated = 0;
    let mut passed = 0;
    for file in files {
        if !is_markdown(file) || !file.exists() {
            continue;
        }
        validated += 1;
        if rules::document::validate_document(file, config, &mut ctx) {
            passed += 1;
        }
    }

    rules::references::check_references(config, &mut ctx);

    let RunContext {
        mut errors,
        mut warnings,
        ..
    } = ctx;
    sort_diagnostics(&mut errors);
    sort_diagnostics(&mut warnings);

    RunReport {
        validated,
        passed,
        errors,
        warnings,
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// Deterministic output order regardless of filesystem iteration order.
fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.rule.cmp(&b.rule))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ID_A: &str = "15754957-34F7-418C-8E2A-319175C225C3";
    const ID_B: &str = "A0E3BC2D-9C87-4A07-B1D7-2E4C1F60A951";
    const ID_MISSING: &str = "00000000-0000-4000-8000-000000000000";

    fn valid_doc(id: &str, title: &str) -> String {
        format!(
            "---\nid: {id}\ntitle: {title}\nstatus: active\ndate: 2025-01-01\nauthor: someone\n---\n# {title}\n"
        )
    }

    fn corpus_config(temp: &TempDir) -> ValidatorConfig {
        let mut config = ValidatorConfig::default();
        config.scan.directories = vec![temp.path().join("docs")];
        config
    }

    #[test]
    fn test_clean_run() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        let a = temp.path().join("docs/a.md");
        std::fs::write(&a, valid_doc(ID_A, "A")).unwrap();

        let report = run(&[a], &corpus_config(&temp));
        assert_eq!(report.validated, 1);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed(), 0);
        assert!(report.is_clean());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_single_file_run_sees_whole_corpus() {
        // b.md is never requested, but its dangling reference is still found
        // and a.md's duplicate of b.md's id would be too.
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        let a = temp.path().join("docs/a.md");
        std::fs::write(&a, valid_doc(ID_A, "A")).unwrap();
        std::fs::write(
            temp.path().join("docs/b.md"),
            format!(
                "---\nid: {ID_B}\ntitle: B\nstatus: active\ndate: 2025-01-01\nauthor: someone\nrelated:\n- {ID_MISSING}\n---\n# B\n"
            ),
        )
        .unwrap();

        let report = run(&[a], &corpus_config(&temp));
        assert_eq!(report.validated, 1);
        assert!(!report.is_clean());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].rule, "refs::dangling");
    }

    #[test]
    fn test_duplicate_between_requested_and_corpus() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        std::fs::write(temp.path().join("docs/original.md"), valid_doc(ID_A, "Original")).unwrap();
        // The copy lives outside the scan roots; only the explicit request finds it
        let copy = temp.path().join("copy.md");
        std::fs::write(&copy, valid_doc(ID_A, "Copy")).unwrap();

        let report = run(&[copy], &corpus_config(&temp));
        assert_eq!(report.validated, 1);
        assert_eq!(report.passed, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].rule, "frontmatter::id_duplicate");
    }

    #[test]
    fn test_explicit_file_participates_in_references() {
        // An explicitly requested file outside the scan roots registers its
        // id, so corpus documents referencing it resolve.
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        std::fs::write(
            temp.path().join("docs/a.md"),
            format!(
                "---\nid: {ID_A}\ntitle: A\nstatus: active\ndate: 2025-01-01\nauthor: someone\nrelated:\n- {ID_B}\n---\n# A\n"
            ),
        )
        .unwrap();
        let outside = temp.path().join("outside.md");
        std::fs::write(&outside, valid_doc(ID_B, "Outside")).unwrap();

        let report = run(&[outside], &corpus_config(&temp));
        assert!(report.is_clean(), "errors: {:?}", report.errors);
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        let bad = temp.path().join("docs/bad.md");
        let good = temp.path().join("docs/good.md");
        std::fs::write(&bad, "no frontmatter\n").unwrap();
        std::fs::write(&good, valid_doc(ID_A, "Good")).unwrap();

        let report = run(&[bad.clone(), good.clone()], &corpus_config(&temp));
        assert_eq!(report.validated, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_non_markdown_and_missing_files_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        let txt = temp.path().join("docs/notes.txt");
        std::fs::write(&txt, "text").unwrap();

        let report = run(
            &[txt, temp.path().join("docs/ghost.md")],
            &corpus_config(&temp),
        );
        assert_eq!(report.validated, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_cache_fidelity_with_run() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        let a = temp.path().join("docs/a.md");
        std::fs::write(&a, valid_doc(ID_A, "A")).unwrap();
        std::fs::write(temp.path().join("docs/b.md"), valid_doc(ID_B, "B")).unwrap();

        let mut config = corpus_config(&temp);
        config.cache.enabled = true;
        config.cache.path = temp.path().join("data/.uuid-cache.json");

        // First run performs the scan and writes the cache
        let first = run(&[a.clone()], &config);
        assert!(first.is_clean());
        assert!(config.cache.path.exists());

        // Second run loads the same map from cache
        let cached = cache::load(&config).expect("fresh cache expected");
        let scanned = index::discover(&config);
        assert_eq!(cached.len(), scanned.len());
        for (id, path) in scanned.iter() {
            assert_eq!(cached.get(id), Some(path.as_path()));
        }

        let second = run(&[a], &config);
        assert!(second.is_clean());
        assert_eq!(second.validated, 1);
    }

    #[test]
    fn test_diagnostics_sorted_by_file() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        let z = temp.path().join("docs/z.md");
        let a = temp.path().join("docs/a.md");
        std::fs::write(&z, "no frontmatter\n").unwrap();
        std::fs::write(&a, "no frontmatter\n").unwrap();

        let report = run(&[z, a], &corpus_config(&temp));
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].file < report.errors[1].file);
    }
}
