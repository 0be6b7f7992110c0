//! Cross-document reference validation

use crate::config::ValidatorConfig;
use crate::diagnostics::Diagnostic;
use crate::file_utils;
use crate::parsers::frontmatter::{parse_fields, split_frontmatter};
use crate::rules::RunContext;
use tracing::debug;

const REFERENCE_FIELDS: [&str; 2] = ["related", "children"];

/// Verify that every outbound reference in every indexed document resolves
/// to a known identifier.
///
/// Corpus-wide by construction: every document in the index is re-read and
/// re-parsed, independent of which files were requested for validation. A
/// file that vanished or lost its frontmatter since discovery is skipped.
pub fn check_references(config: &ValidatorConfig, ctx: &mut RunContext) {
    if !config.validation.validate_cross_references {
        return;
    }

    let RunContext { index, errors, .. } = ctx;

    for (_, path) in index.iter() {
        let content = match file_utils::safe_read_file(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("skipping indexed file during reference check: {e}");
                continue;
            }
        };

        let parts = split_frontmatter(&content);
        if !parts.has_frontmatter || !parts.has_closing {
            continue;
        }
        let table = parse_fields(&parts.frontmatter, parts.frontmatter_line);

        for field in REFERENCE_FIELDS {
            let Some(items) = table.list(field) else {
                continue;
            };
            for item in items {
                if !item.is_empty() && !index.contains(item) {
                    errors.push(Diagnostic::error(
                        path.clone(),
                        table.line(field),
                        "refs::dangling",
                        format!("unresolved {field} reference: {item}"),
                    ));
                }
            }
        }
    }
}
