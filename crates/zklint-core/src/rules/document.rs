//! Per-document frontmatter validation

use crate::config::ValidatorConfig;
use crate::file_utils;
use crate::index::uuid_pattern;
use crate::parsers::frontmatter::{parse_fields, split_frontmatter};
use crate::regex_util::static_regex;
use crate::rules::RunContext;
use crate::diagnostics::Diagnostic;
use regex::Regex;
use std::path::Path;

static_regex!(fn date_pattern, r"^\d{4}-\d{2}-\d{2}$");
static_regex!(fn h1_pattern, r"^#\s+(.+)$");

/// Validate one document against the schema, the shared corpus index, and
/// its own body. Returns whether the document passed.
///
/// Checks run in a fixed order and stop at the first error; the title/H1
/// comparison is a warning and never fails the document. On success the
/// document's identifier is registered in the shared index (idempotent when
/// it was already self-registered by discovery).
pub fn validate_document(path: &Path, config: &ValidatorConfig, ctx: &mut RunContext) -> bool {
    let content = match file_utils::safe_read_file(path) {
        Ok(content) => content,
        Err(e) => {
            ctx.errors.push(Diagnostic::error(
                path.to_path_buf(),
                0,
                "file::read",
                e.to_string(),
            ));
            return false;
        }
    };

    let parts = split_frontmatter(&content);
    if !parts.has_frontmatter {
        ctx.errors.push(Diagnostic::error(
            path.to_path_buf(),
            1,
            "frontmatter::missing",
            "no frontmatter block found".to_string(),
        ));
        return false;
    }
    if !parts.has_closing {
        ctx.errors.push(Diagnostic::error(
            path.to_path_buf(),
            parts.frontmatter_line.saturating_sub(1),
            "frontmatter::unterminated",
            "frontmatter block is never closed".to_string(),
        ));
        return false;
    }

    let table = parse_fields(&parts.frontmatter, parts.frontmatter_line);

    let missing: Vec<&str> = config
        .validation
        .required_fields
        .iter()
        .map(String::as_str)
        .filter(|field| !table.contains(field))
        .collect();
    if !missing.is_empty() {
        ctx.errors.push(Diagnostic::error(
            path.to_path_buf(),
            parts.frontmatter_line.saturating_sub(1),
            "frontmatter::missing_fields",
            format!("missing required fields: {}", missing.join(", ")),
        ));
        return false;
    }

    let id = table.scalar("id").unwrap_or_default();
    if !uuid_pattern().is_match(id) {
        ctx.errors.push(
            Diagnostic::error(
                path.to_path_buf(),
                table.line("id"),
                "frontmatter::id_format",
                format!("invalid identifier format: {id:?}"),
            )
            .with_suggestion(
                "expected 8-4-4-4-12 uppercase hex groups, e.g. 15754957-34F7-418C-8E2A-319175C225C3"
                    .to_string(),
            ),
        );
        return false;
    }

    match ctx.index.get(id) {
        Some(existing) if !same_file(existing, path) => {
            let existing = existing.to_path_buf();
            ctx.errors.push(Diagnostic::error(
                path.to_path_buf(),
                table.line("id"),
                "frontmatter::id_duplicate",
                format!("duplicate identifier {id} (also in {})", existing.display()),
            ));
            return false;
        }
        Some(_) => {}
        None => {
            ctx.index.insert(id.to_string(), path.to_path_buf());
        }
    }

    let date = table.scalar("date").unwrap_or_default();
    if !date_pattern().is_match(date) {
        ctx.errors.push(
            Diagnostic::error(
                path.to_path_buf(),
                table.line("date"),
                "frontmatter::date_format",
                format!("invalid date format: {date:?}"),
            )
            .with_suggestion("expected YYYY-MM-DD".to_string()),
        );
        return false;
    }

    if config.validation.title_must_match_h1 {
        if let (Some(title), Some((heading, line))) =
            (table.scalar("title"), first_h1(&parts.body, parts.body_line))
        {
            if heading != title {
                ctx.warnings.push(Diagnostic::warning(
                    path.to_path_buf(),
                    line,
                    "frontmatter::title_mismatch",
                    format!("title {title:?} does not match H1 {heading:?}"),
                ));
            }
        }
    }

    true
}

/// First level-1 heading in the body, with its document-absolute line.
fn first_h1(body: &str, body_line: usize) -> Option<(&str, usize)> {
    for (i, line) in body.lines().enumerate() {
        if let Some(captures) = h1_pattern().captures(line) {
            let heading = captures.get(1).map_or("", |m| m.as_str());
            return Some((heading, body_line + i));
        }
    }
    None
}

/// Path-normalized equality: the same file reached via two spellings is not
/// a duplicate. Falls back to lexical comparison when canonicalization fails.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CorpusIndex;
    use tempfile::TempDir;

    const ID_A: &str = "15754957-34F7-418C-8E2A-319175C225C3";
    const ID_B: &str = "A0E3BC2D-9C87-4A07-B1D7-2E4C1F60A951";

    fn valid_doc(id: &str, title: &str) -> String {
        format!(
            "---\nid: {id}\ntitle: {title}\nstatus: active\ndate: 2025-01-01\nauthor: someone\n---\n# {title}\n\nBody text.\n"
        )
    }

    fn validate_str(content: &str) -> (bool, RunContext) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.md");
        std::fs::write(&path, content).unwrap();

        let config = ValidatorConfig::default();
        let mut ctx = RunContext::default();
        let passed = validate_document(&path, &config, &mut ctx);
        (passed, ctx)
    }

    #[test]
    fn test_valid_document_round_trip() {
        let (passed, ctx) = validate_str(&valid_doc(ID_A, "X"));
        assert!(passed);
        assert!(ctx.errors.is_empty());
        assert!(ctx.warnings.is_empty());
        assert!(ctx.index.contains(ID_A));
    }

    #[test]
    fn test_no_frontmatter() {
        let (passed, ctx) = validate_str("# Just a document\n");
        assert!(!passed);
        assert_eq!(ctx.errors.len(), 1);
        assert_eq!(ctx.errors[0].rule, "frontmatter::missing");
    }

    #[test]
    fn test_unterminated_frontmatter() {
        let (passed, ctx) = validate_str("---\nid: whatever\n");
        assert!(!passed);
        assert_eq!(ctx.errors[0].rule, "frontmatter::unterminated");
    }

    #[test]
    fn test_missing_fields_named() {
        let (passed, ctx) =
            validate_str(&format!("---\nid: {ID_A}\ntitle: X\n---\n# X\n"));
        assert!(!passed);
        assert_eq!(ctx.errors[0].rule, "frontmatter::missing_fields");
        assert!(ctx.errors[0].message.contains("status"));
        assert!(ctx.errors[0].message.contains("date"));
        assert!(ctx.errors[0].message.contains("author"));
        assert!(!ctx.errors[0].message.contains("id"));
    }

    #[test]
    fn test_invalid_identifier_format() {
        let (passed, ctx) = validate_str(&valid_doc("not-a-uuid", "X"));
        assert!(!passed);
        assert_eq!(ctx.errors.len(), 1);
        assert_eq!(ctx.errors[0].rule, "frontmatter::id_format");
    }

    #[test]
    fn test_lowercase_identifier_rejected() {
        let (passed, ctx) = validate_str(&valid_doc(&ID_A.to_lowercase(), "X"));
        assert!(!passed);
        assert_eq!(ctx.errors[0].rule, "frontmatter::id_format");
    }

    #[test]
    fn test_invalid_date_format() {
        let content = format!(
            "---\nid: {ID_A}\ntitle: X\nstatus: active\ndate: 01-01-2025\nauthor: someone\n---\n# X\n"
        );
        let (passed, ctx) = validate_str(&content);
        assert!(!passed);
        assert_eq!(ctx.errors.len(), 1);
        assert_eq!(ctx.errors[0].rule, "frontmatter::date_format");
    }

    #[test]
    fn test_duplicate_identifier_across_files() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.md");
        let second = temp.path().join("second.md");
        std::fs::write(&first, valid_doc(ID_A, "First")).unwrap();
        std::fs::write(&second, valid_doc(ID_A, "Second")).unwrap();

        let config = ValidatorConfig::default();
        let mut ctx = RunContext::default();
        assert!(validate_document(&first, &config, &mut ctx));
        assert!(!validate_document(&second, &config, &mut ctx));

        assert_eq!(ctx.errors.len(), 1);
        assert_eq!(ctx.errors[0].rule, "frontmatter::id_duplicate");
        assert!(ctx.errors[0].message.contains("first.md"));
        // The original owner keeps the registration
        assert_eq!(ctx.index.get(ID_A), Some(first.as_path()));
    }

    #[test]
    fn test_revalidation_is_not_a_duplicate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.md");
        std::fs::write(&path, valid_doc(ID_A, "X")).unwrap();

        let config = ValidatorConfig::default();
        let mut ctx = RunContext::default();
        assert!(validate_document(&path, &config, &mut ctx));
        assert!(validate_document(&path, &config, &mut ctx));
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn test_self_match_through_different_spelling() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.md");
        std::fs::write(&path, valid_doc(ID_A, "X")).unwrap();

        // Discovery registered the file under a dot-relative spelling
        let mut index = CorpusIndex::new();
        index.insert(
            ID_A.to_string(),
            temp.path().join(".").join("doc.md"),
        );

        let config = ValidatorConfig::default();
        let mut ctx = RunContext::new(index);
        assert!(validate_document(&path, &config, &mut ctx));
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn test_title_mismatch_is_warning_only() {
        let content = format!(
            "---\nid: {ID_A}\ntitle: Foo\nstatus: active\ndate: 2025-01-01\nauthor: someone\n---\n# Bar\n"
        );
        let (passed, ctx) = validate_str(&content);
        assert!(passed);
        assert!(ctx.errors.is_empty());
        assert_eq!(ctx.warnings.len(), 1);
        assert_eq!(ctx.warnings[0].rule, "frontmatter::title_mismatch");
        assert!(ctx.warnings[0].message.contains("Foo"));
        assert!(ctx.warnings[0].message.contains("Bar"));
    }

    #[test]
    fn test_title_check_disabled() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.md");
        let content = format!(
            "---\nid: {ID_A}\ntitle: Foo\nstatus: active\ndate: 2025-01-01\nauthor: someone\n---\n# Bar\n"
        );
        std::fs::write(&path, content).unwrap();

        let mut config = ValidatorConfig::default();
        config.validation.title_must_match_h1 = false;
        let mut ctx = RunContext::default();
        assert!(validate_document(&path, &config, &mut ctx));
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_document_without_h1_passes() {
        let content = format!(
            "---\nid: {ID_A}\ntitle: X\nstatus: active\ndate: 2025-01-01\nauthor: someone\n---\nNo heading here.\n"
        );
        let (passed, ctx) = validate_str(&content);
        assert!(passed);
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_unreadable_file_collected_as_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.md");

        let config = ValidatorConfig::default();
        let mut ctx = RunContext::default();
        assert!(!validate_document(&path, &config, &mut ctx));
        assert_eq!(ctx.errors.len(), 1);
        assert_eq!(ctx.errors[0].rule, "file::read");
    }

    #[test]
    fn test_custom_required_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.md");
        std::fs::write(
            &path,
            format!("---\nid: {ID_B}\ntitle: X\nstatus: active\ndate: 2025-01-01\nauthor: me\nreviewer: them\n---\n# X\n"),
        )
        .unwrap();

        let mut config = ValidatorConfig::default();
        config.validation.required_fields.push("reviewer".to_string());
        let mut ctx = RunContext::default();
        assert!(validate_document(&path, &config, &mut ctx));
    }

    #[test]
    fn test_list_valued_id_is_invalid_format() {
        let content =
            "---\nid:\n- AAA\ntitle: X\nstatus: active\ndate: 2025-01-01\nauthor: me\n---\n# X\n";
        let (passed, ctx) = validate_str(content);
        assert!(!passed);
        // A list under `id` never parses as a scalar identifier
        assert!(
            ctx.errors[0].rule == "frontmatter::id_format"
                || ctx.errors[0].rule == "frontmatter::missing_fields"
        );
    }
}
