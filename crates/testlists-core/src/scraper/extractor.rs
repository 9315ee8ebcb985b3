//! Line scanning for classnames and test declarations.

use std::path::Path;

use super::patterns::{Patterns, BLOCK_COMMENT_CLOSE, BLOCK_COMMENT_OPEN};
use crate::diagnostics::SourceLocation;

/// A declaration found while scanning one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// An `It` clause with a literal description.
    Test { key: String, location: SourceLocation },
    /// An `It` clause whose description is computed at runtime.
    Unresolved { location: SourceLocation },
}

/// Extract the classname declared in a file.
///
/// The last `InitTesting` or `RunSpecs*` call in the file wins.
pub fn extract_classname(content: &str, patterns: &Patterns) -> Option<String> {
    let mut classname = None;

    for line in content.lines().map(str::trim) {
        let caps = patterns
            .init_testing
            .captures(line)
            .or_else(|| patterns.run_specs.captures(line));
        if let Some(name) = caps.and_then(|c| c.name("classname")) {
            classname = Some(name.as_str().to_string());
        }
    }

    classname
}

/// Extract `It` declarations from a file, in line order.
///
/// Comment handling works a line at a time: `//` comments are cut off, and
/// every line from the one containing `/*` up to and including the one
/// containing `*/` is skipped, even when both markers share a line.
/// `Describe` calls are not nested; each one replaces the current suite.
pub fn extract_declarations(
    content: &str,
    file: &Path,
    classname: &str,
    patterns: &Patterns,
) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut in_comment = false;
    let mut suite = String::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = patterns.line_comment.replace(raw.trim(), "");
        let line = line.as_ref();

        if line.contains(BLOCK_COMMENT_OPEN) {
            in_comment = true;
        }
        if in_comment {
            if line.contains(BLOCK_COMMENT_CLOSE) {
                in_comment = false;
            }
            continue;
        }

        if let Some(desc) = patterns.describe.captures(line).and_then(|c| c.name("desc")) {
            suite = desc.as_str().to_string();
        }

        let location = || SourceLocation {
            file: file.to_path_buf(),
            line: idx + 1,
            text: line.to_string(),
        };

        if let Some(it) = patterns.it.captures(line).and_then(|c| c.name("it")) {
            declarations.push(Declaration::Test {
                key: definition_key(classname, &suite, it.as_str()),
                location: location(),
            });
        } else if patterns.it_any.is_match(line) {
            declarations.push(Declaration::Unresolved { location: location() });
        }
    }

    declarations
}

/// Build the fully qualified identifier of a test.
pub fn definition_key(classname: &str, suite: &str, case: &str) -> String {
    format!("{classname}.{suite} {case}").replace('\\', "")
}
