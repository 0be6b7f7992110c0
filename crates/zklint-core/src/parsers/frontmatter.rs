//! Frontmatter extraction and field parsing
//!
//! Frontmatter is the block between a leading `---` marker line and the next
//! `---` marker line. Only a restricted field syntax is supported: scalar
//! fields (`key: value`) and single-level ordered lists (`key:` followed by
//! `- item` lines). This is deliberately not a YAML parser.

/// Result of splitting a document into frontmatter and body.
///
/// Line numbers are 1-based. `frontmatter_line` is the first line after the
/// opening marker; `body_line` is the first line after the closing marker.
#[derive(Debug, Clone)]
pub struct FrontmatterParts {
    pub has_frontmatter: bool,
    pub has_closing: bool,
    pub frontmatter: String,
    pub body: String,
    pub frontmatter_line: usize,
    pub body_line: usize,
}

/// Split frontmatter and body from document content.
///
/// Leading blank lines before the opening marker are tolerated. A document
/// whose first non-blank line is not `---` has no frontmatter and is all body.
pub fn split_frontmatter(content: &str) -> FrontmatterParts {
    let lines: Vec<&str> = content.lines().collect();

    let mut open = None;
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if line.trim_end() == "---" {
            open = Some(i);
        }
        break;
    }

    let Some(open) = open else {
        return FrontmatterParts {
            has_frontmatter: false,
            has_closing: false,
            frontmatter: String::new(),
            body: content.to_string(),
            frontmatter_line: 0,
            body_line: 1,
        };
    };

    let close = lines[open + 1..]
        .iter()
        .position(|l| l.trim_end() == "---")
        .map(|p| open + 1 + p);

    match close {
        Some(close) => FrontmatterParts {
            has_frontmatter: true,
            has_closing: true,
            frontmatter: lines[open + 1..close].join("\n"),
            body: lines[close + 1..].join("\n"),
            frontmatter_line: open + 2,
            body_line: close + 2,
        },
        None => FrontmatterParts {
            has_frontmatter: true,
            has_closing: false,
            frontmatter: String::new(),
            body: lines[open + 1..].join("\n"),
            frontmatter_line: open + 2,
            body_line: open + 2,
        },
    }
}

/// A parsed frontmatter field value: scalar or single-level ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

/// A named field with the line it was declared on.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
    pub line: usize,
}

/// Malformed shapes the parser recognized and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeIssueKind {
    /// `- item` line with no open list key above it
    DanglingListItem,
    /// `key:` with neither an inline value nor any list items
    EmptyKey,
    /// Line that is neither a field, a list item, nor a comment
    Unrecognized,
}

#[derive(Debug, Clone)]
pub struct ShapeIssue {
    pub kind: ShapeIssueKind,
    pub line: usize,
}

/// Ordered table of parsed fields. Duplicate keys keep the last occurrence.
#[derive(Debug, Default)]
pub struct FieldTable {
    fields: Vec<Field>,
    issues: Vec<ShapeIssue>,
}

impl FieldTable {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.get(name) {
            Some(FieldValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Line the field was declared on, or 0 when absent.
    pub fn line(&self, name: &str) -> usize {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map_or(0, |f| f.line)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn issues(&self) -> &[ShapeIssue] {
        &self.issues
    }

    fn insert(&mut self, name: String, value: FieldValue, line: usize) {
        self.fields.retain(|f| f.name != name);
        self.fields.push(Field { name, value, line });
    }
}

enum LineKind<'a> {
    Blank,
    Comment,
    Entry { key: &'a str, value: &'a str },
    OpenKey { key: &'a str },
    Item { value: String },
    Other,
}

fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Comment;
    }
    if let Some(rest) = trimmed.strip_prefix('-') {
        // List items may carry a trailing inline comment
        let value = rest.trim().split('#').next().unwrap_or("").trim().to_string();
        return LineKind::Item { value };
    }
    match trimmed.split_once(':') {
        Some((key, value)) => {
            let key = key.trim();
            let value = value.trim();
            if value.is_empty() {
                LineKind::OpenKey { key }
            } else {
                LineKind::Entry { key, value }
            }
        }
        None => LineKind::Other,
    }
}

/// Parse frontmatter text into a typed field table.
///
/// Two passes: classify each line, then fold list items under their opening
/// key. `first_line` is the 1-based document line of the first frontmatter
/// line, so field lines come out document-absolute.
pub fn parse_fields(fm_text: &str, first_line: usize) -> FieldTable {
    let mut table = FieldTable::default();
    let mut open: Option<(String, usize, Vec<String>)> = None;

    let classified: Vec<(usize, LineKind)> = fm_text
        .lines()
        .enumerate()
        .map(|(i, l)| (first_line + i, classify(l)))
        .collect();

    for (line_no, kind) in classified {
        match kind {
            LineKind::Blank | LineKind::Comment => {}
            LineKind::Entry { key, value } => {
                flush_open(&mut table, &mut open);
                table.insert(key.to_string(), FieldValue::Scalar(value.to_string()), line_no);
            }
            LineKind::OpenKey { key } => {
                flush_open(&mut table, &mut open);
                open = Some((key.to_string(), line_no, Vec::new()));
            }
            LineKind::Item { value } => match open.as_mut() {
                Some((_, _, items)) => items.push(value),
                None => table.issues.push(ShapeIssue {
                    kind: ShapeIssueKind::DanglingListItem,
                    line: line_no,
                }),
            },
            LineKind::Other => table.issues.push(ShapeIssue {
                kind: ShapeIssueKind::Unrecognized,
                line: line_no,
            }),
        }
    }
    flush_open(&mut table, &mut open);

    table
}

fn flush_open(table: &mut FieldTable, open: &mut Option<(String, usize, Vec<String>)>) {
    if let Some((key, line, items)) = open.take() {
        if items.is_empty() {
            table.issues.push(ShapeIssue {
                kind: ShapeIssueKind::EmptyKey,
                line,
            });
        } else {
            table.insert(key, FieldValue::List(items), line);
        }
    }
}
