//! Warnings and notes raised while scraping and resolving.
//!
//! Every diagnostic is logged when recorded and kept so callers can print a
//! summary once the run finishes.

use std::fmt;
use std::path::PathBuf;

/// A position in a scraped source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// 1-based.
    pub line: usize,
    /// Trimmed line text with trailing comments removed.
    pub text: String,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.text)
    }
}

/// How much attention a diagnostic deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Note,
    Warning,
}

/// Something worth reporting that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Two declarations produced the same test identifier. The first one is kept.
    DuplicateDefinition {
        key: String,
        first: SourceLocation,
        duplicate: SourceLocation,
    },

    /// A test declaration whose description is not a string literal.
    UnresolvedDeclaration { location: SourceLocation },

    /// A plan shares its name with an explicit profile; the explicit list is used.
    ExplicitProfileShadowsPlan { profile: String },

    /// A macro profile replaced a profile of the same name.
    MacroShadowsProfile { profile: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::DuplicateDefinition { .. } | Diagnostic::UnresolvedDeclaration { .. } => {
                Severity::Warning
            }
            Diagnostic::ExplicitProfileShadowsPlan { .. } | Diagnostic::MacroShadowsProfile { .. } => {
                Severity::Note
            }
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateDefinition {
                key,
                first,
                duplicate,
            } => write!(
                f,
                "duplicate definition {key}\n  first: {first}\n  again: {duplicate}"
            ),
            Diagnostic::UnresolvedDeclaration { location } => {
                write!(f, "unresolved test declaration\n  {location}")
            }
            Diagnostic::ExplicitProfileShadowsPlan { profile } => write!(
                f,
                "profile {profile} is defined explicitly, plan {profile} is not used to derive it"
            ),
            Diagnostic::MacroShadowsProfile { profile } => {
                write!(f, "macro profile {profile} replaces a profile of the same name")
            }
        }
    }
}

/// Accumulates diagnostics for a single run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!("{diagnostic}"),
            Severity::Note => tracing::info!("{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    /// Take over diagnostics recorded elsewhere. They were logged already.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(other);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_warning())
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
