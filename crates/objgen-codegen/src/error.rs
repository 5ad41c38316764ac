//! Error types and diagnostic collection for code generation
//!
//! Hard failures are [`CodegenError`]s. Everything the emitter works around
//! (skipped members, advisory returns, entities without a host layout) is
//! recorded as a [`Diagnostic`] so a run can report all of them together.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Unknown class: {0:?}")]
    UnknownEntity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Where a diagnostic was raised
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLocation {
    /// Entity source name (e.g. "NSAlert")
    pub entity: Option<String>,
    /// Member name (e.g. "addButtonWithTitle:")
    pub member: Option<String>,
}

impl ErrorLocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.entity, &self.member) {
            (Some(e), Some(m)) => write!(f, "{}.{}", e, m),
            (Some(e), None) => write!(f, "{}", e),
            (None, Some(m)) => write!(f, "{}", m),
            (None, None) => write!(f, "<unknown location>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCategory {
    /// A type has no Go spelling
    UnrepresentableType,
    /// A Go spelling exists but no cast across the bridge
    MissingCast,
    /// The entity kind has no Go layout (unions)
    NoHostLayout,
    /// Same Go name emitted twice
    Duplicate,
    /// Member kind the emitter does not translate
    Unsupported,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::UnrepresentableType => write!(f, "UNREPRESENTABLE_TYPE"),
            ErrorCategory::MissingCast => write!(f, "MISSING_CAST"),
            ErrorCategory::NoHostLayout => write!(f, "NO_HOST_LAYOUT"),
            ErrorCategory::Duplicate => write!(f, "DUPLICATE"),
            ErrorCategory::Unsupported => write!(f, "UNSUPPORTED"),
        }
    }
}

/// One soft degradation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: ErrorCategory,
    pub location: ErrorLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            location: ErrorLocation::new(),
            message: message.into(),
        }
    }

    pub fn at(mut self, location: ErrorLocation) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] at {}: {}", self.category, self.location, self.message)
    }
}

/// Collector for diagnostics raised during one generation run
///
/// The current entity is tracked as context and applied to every entry
/// that does not name one itself.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    entity_context: Option<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entity_context(&mut self, entity: impl Into<String>) {
        self.entity_context = Some(entity.into());
    }

    pub fn clear_context(&mut self) {
        self.entity_context = None;
    }

    pub fn add(&mut self, mut entry: Diagnostic) {
        if entry.location.entity.is_none() {
            entry.location.entity = self.entity_context.clone();
        }
        self.entries.push(entry);
    }

    /// Record a diagnostic for a member of the current entity.
    pub fn add_member(
        &mut self,
        category: ErrorCategory,
        member: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.add(Diagnostic::new(category, message).at(ErrorLocation::new().in_member(member)));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn by_category(&self, category: ErrorCategory) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.entity_context = None;
    }

    /// Report grouped by category, at most ten entries per group.
    pub fn format_summary(&self) -> String {
        if self.entries.is_empty() {
            return "No diagnostics".to_string();
        }

        let mut by_category: BTreeMap<ErrorCategory, Vec<&Diagnostic>> = BTreeMap::new();
        for entry in &self.entries {
            by_category.entry(entry.category).or_default().push(entry);
        }

        let mut lines = Vec::new();
        lines.push(format!("Found {} diagnostic(s):", self.entries.len()));
        lines.push(String::new());

        for (category, entries) in by_category {
            lines.push(format!("## {} ({}):", category, entries.len()));
            for entry in entries.iter().take(10) {
                lines.push(format!("  - {}", entry));
            }
            if entries.len() > 10 {
                lines.push(format!("  ... and {} more", entries.len() - 10));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}
