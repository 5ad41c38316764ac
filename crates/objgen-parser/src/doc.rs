//! Documentation index model
//!
//! Mirrors the Doxygen compound layout: an index of entries, each of which
//! decodes into a [`CompoundDef`] holding member sections. Readers implement
//! [`DocIndex`]; [`MemoryIndex`] serves tests and embedders.

use crate::error::ParserError;
use objgen_core::{LineRange, Location, Protection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Source of documentation entries
pub trait DocIndex {
    /// Entries in index order.
    fn entries(&self) -> &[IndexEntry];

    /// Decode the compound definition behind an entry.
    fn decode(&self, entry: &IndexEntry) -> Result<CompoundDef, ParserError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundKind {
    Struct,
    Class,
    Interface,
    Protocol,
    Union,
    File,
    Other,
}

impl FromStr for CompoundKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "struct" => CompoundKind::Struct,
            "class" => CompoundKind::Class,
            "interface" => CompoundKind::Interface,
            "protocol" => CompoundKind::Protocol,
            "union" => CompoundKind::Union,
            "file" => CompoundKind::File,
            _ => CompoundKind::Other,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub refid: String,
    pub name: String,
    pub kind: String,
}

impl IndexEntry {
    pub fn new(refid: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            refid: refid.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }

    pub fn compound_kind(&self) -> CompoundKind {
        let Ok(kind) = self.kind.parse();
        kind
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompoundDef {
    pub prot: Protection,
    pub language: String,
    pub location: Option<LocationDef>,
    pub sections: Vec<SectionDef>,
}

/// Raw location as the extractor writes it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationDef {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub bodyfile: String,
    pub bodystart: i64,
    pub bodyend: i64,
}

impl LocationDef {
    pub fn location(&self) -> Option<Location> {
        if self.file.is_empty() {
            return None;
        }
        Some(Location {
            file: self.file.clone(),
            line: self.line,
            column: self.column,
        })
    }

    pub fn line_range(&self) -> Option<LineRange> {
        if self.bodyfile.is_empty() {
            return None;
        }
        // the extractor writes -1 for declarations without a body
        Some(LineRange {
            file: self.bodyfile.clone(),
            start_line: u32::try_from(self.bodystart).ok()?,
            end_line: u32::try_from(self.bodyend).ok()?,
        })
    }
}

/// Convenience for optional locations.
pub(crate) fn location_of(def: Option<&LocationDef>) -> (Option<Location>, Option<LineRange>) {
    match def {
        Some(l) => (l.location(), l.line_range()),
        None => (None, None),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionDef {
    pub kind: String,
    pub members: Vec<MemberDef>,
}

/// Section semantics selected by the section kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Attributes { prot: Protection, is_static: bool },
    Properties,
    Functions { is_static: bool },
    Other,
}

impl SectionDef {
    pub fn new(kind: impl Into<String>, members: Vec<MemberDef>) -> Self {
        Self {
            kind: kind.into(),
            members,
        }
    }

    pub fn section_kind(&self) -> SectionKind {
        match self.kind.as_str() {
            "property" => return SectionKind::Properties,
            "func" | "public-func" => return SectionKind::Functions { is_static: false },
            "public-static-func" => return SectionKind::Functions { is_static: true },
            _ => {}
        }
        let Some(rest) = self.kind.strip_suffix("-attrib") else {
            return SectionKind::Other;
        };
        let (prot, is_static) = match rest.strip_suffix("-static") {
            Some(prot) => (prot, true),
            None => (rest, false),
        };
        let prot = match prot {
            "public" => Protection::Public,
            "protected" => Protection::Protected,
            "private" => Protection::Private,
            "package" => Protection::Package,
            _ => return SectionKind::Other,
        };
        SectionKind::Attributes { prot, is_static }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberDef {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub prot: Protection,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub location: Option<LocationDef>,
    #[serde(rename = "type")]
    pub ty: Option<LinkedText>,
    pub argsstring: String,
    /// Qualified definition, e.g. `(void) NSAlert::layout`
    pub definition: String,
    pub readable: bool,
    pub writable: bool,
    pub params: Vec<ParamDef>,
}

/// Type text with embedded cross-reference tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedText {
    pub text: String,
    pub refs: Vec<RefText>,
}

impl LinkedText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            refs: Vec::new(),
        }
    }

    pub fn reference(refid: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            refs: vec![RefText {
                refid: refid.into(),
                text: text.clone(),
            }],
            text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefText {
    pub refid: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamDef {
    pub declname: String,
    #[serde(rename = "type")]
    pub ty: Option<LinkedText>,
    /// Array suffix such as `[16]`
    pub array: String,
}

/// Index held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    entries: Vec<IndexEntry>,
    compounds: HashMap<String, CompoundDef>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: IndexEntry, def: CompoundDef) {
        self.compounds.insert(entry.refid.clone(), def);
        self.entries.push(entry);
    }

    pub fn with(mut self, entry: IndexEntry, def: CompoundDef) -> Self {
        self.push(entry, def);
        self
    }
}

impl DocIndex for MemoryIndex {
    fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    fn decode(&self, entry: &IndexEntry) -> Result<CompoundDef, ParserError> {
        self.compounds
            .get(&entry.refid)
            .cloned()
            .ok_or_else(|| ParserError::UnknownCompound(entry.refid.clone()))
    }
}
