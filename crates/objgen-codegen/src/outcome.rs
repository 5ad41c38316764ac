//! Per-member and per-run generation outcomes

use serde::Serialize;
use std::fmt::{self, Write};

/// What happened to one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum MemberOutcome {
    Emitted,
    /// Emitted with a comment-only return annotation
    Advisory(String),
    /// Nothing was written
    Skipped(String),
}

impl MemberOutcome {
    pub fn is_emitted(&self) -> bool {
        !matches!(self, MemberOutcome::Skipped(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: MemberOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub name: String,
    pub kind: String,
    /// Set when the whole entity produced no output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    pub members: Vec<MemberReport>,
}

impl EntitySummary {
    pub fn new(name: impl Into<String>, kind: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            kind: kind.to_string(),
            skipped: None,
            members: Vec::new(),
        }
    }

    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skipped = Some(reason.into());
        self
    }

    pub fn record(&mut self, name: impl Into<String>, outcome: MemberOutcome) {
        self.members.push(MemberReport {
            name: name.into(),
            outcome,
        });
    }

    pub fn emitted(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Emitted))
    }

    pub fn advisory(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Advisory(_)))
    }

    pub fn skipped_members(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&MemberOutcome) -> bool) -> usize {
        self.members.iter().filter(|m| pred(&m.outcome)).count()
    }
}

/// Totals across a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub entities: usize,
    pub skipped_entities: usize,
    pub emitted: usize,
    pub advisory: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub entities: Vec<EntitySummary>,
    pub functions: Vec<MemberReport>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(&self, name: &str) -> Option<&EntitySummary> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn totals(&self) -> Totals {
        let mut t = Totals::default();
        for e in &self.entities {
            t.entities += 1;
            if e.skipped.is_some() {
                t.skipped_entities += 1;
            }
            t.emitted += e.emitted();
            t.advisory += e.advisory();
            t.skipped += e.skipped_members();
        }
        for f in &self.functions {
            match f.outcome {
                MemberOutcome::Emitted => t.emitted += 1,
                MemberOutcome::Advisory(_) => t.advisory += 1,
                MemberOutcome::Skipped(_) => t.skipped += 1,
            }
        }
        t
    }

    /// Plain-text table, one row per entity plus a totals row.
    pub fn render_table(&self) -> Result<String, fmt::Error> {
        let width = self
            .entities
            .iter()
            .map(|e| e.name.len())
            .chain(["free functions".len(), "ENTITY".len()])
            .max()
            .unwrap_or(0);
        let mut out = String::new();
        writeln!(
            out,
            "{:<width$}  {:<8}  {:>7}  {:>8}  {:>7}",
            "ENTITY", "KIND", "EMITTED", "ADVISORY", "SKIPPED"
        )?;
        for e in &self.entities {
            match &e.skipped {
                Some(reason) => writeln!(out, "{:<width$}  {:<8}  skipped: {}", e.name, e.kind, reason)?,
                None => writeln!(
                    out,
                    "{:<width$}  {:<8}  {:>7}  {:>8}  {:>7}",
                    e.name,
                    e.kind,
                    e.emitted(),
                    e.advisory(),
                    e.skipped_members()
                )?,
            }
        }
        if !self.functions.is_empty() {
            let emitted = self.functions.iter().filter(|f| f.outcome == MemberOutcome::Emitted).count();
            let skipped = self.functions.len() - emitted;
            writeln!(
                out,
                "{:<width$}  {:<8}  {:>7}  {:>8}  {:>7}",
                "free functions", "func", emitted, 0, skipped
            )?;
        }
        let t = self.totals();
        writeln!(
            out,
            "{:<width$}  {:<8}  {:>7}  {:>8}  {:>7}",
            "TOTAL", t.entities, t.emitted, t.advisory, t.skipped
        )?;
        Ok(out)
    }
}
