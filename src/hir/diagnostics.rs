//! Diagnostics: reported problems in qualified names and imports.
//!
//! Nothing here is fatal: the resolver reports a diagnostic and keeps going
//! with whatever prefix it did resolve.

use smol_str::SmolStr;

use crate::base::{FileId, LineCol, LineIndex, TextRange};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// What went wrong. The `Display` text is the user-facing message.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("unresolved reference: '{name}'")]
    UnresolvedReference { name: SmolStr },

    #[error("cannot access '{name}': it is {visibility}")]
    InvisibleReference { name: SmolStr, visibility: &'static str },

    #[error("ambiguous reference: '{name}' matches {candidates} declarations")]
    AmbiguousReferenceTarget { name: SmolStr, candidates: usize },

    #[error("cannot import '{name}': only classifiers, top-level and static members can be imported")]
    CannotBeImported { name: SmolStr },

    #[error("packages cannot be imported")]
    PackageCannotBeImported,

    #[error("cannot import all members of singleton '{name}'")]
    CannotImportFromSingletonWildcard { name: SmolStr },

    #[error("safe call is not allowed in a qualifier")]
    SafeCallInQualifier,
}

impl DiagnosticKind {
    /// Stable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedReference { .. } => codes::UNRESOLVED_REFERENCE,
            DiagnosticKind::InvisibleReference { .. } => codes::INVISIBLE_REFERENCE,
            DiagnosticKind::AmbiguousReferenceTarget { .. } => codes::AMBIGUOUS_REFERENCE,
            DiagnosticKind::CannotBeImported { .. } => codes::CANNOT_BE_IMPORTED,
            DiagnosticKind::PackageCannotBeImported => codes::PACKAGE_CANNOT_BE_IMPORTED,
            DiagnosticKind::CannotImportFromSingletonWildcard { .. } => codes::SINGLETON_WILDCARD,
            DiagnosticKind::SafeCallInQualifier => codes::SAFE_CALL_IN_QUALIFIER,
        }
    }
}

/// A diagnostic with its location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: FileId,
    pub range: TextRange,
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn error(file: FileId, range: TextRange, kind: DiagnosticKind) -> Self {
        Self {
            file,
            range,
            severity: Severity::Error,
            kind,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Start position of the diagnostic in the unit indexed by `index`.
    pub fn start(&self, index: &LineIndex) -> LineCol {
        index.line_col(self.range.start())
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
pub mod codes {
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    pub const AMBIGUOUS_REFERENCE: &str = "E0002";
    pub const INVISIBLE_REFERENCE: &str = "E0010";
    pub const CANNOT_BE_IMPORTED: &str = "E0011";
    pub const PACKAGE_CANNOT_BE_IMPORTED: &str = "E0012";
    pub const SINGLETON_WILDCARD: &str = "E0013";
    pub const SAFE_CALL_IN_QUALIFIER: &str = "E0014";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics for one resolution pass.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    /// Diagnostics with the given code, in report order.
    pub fn with_code(&self, code: &str) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.code() == code).collect()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
