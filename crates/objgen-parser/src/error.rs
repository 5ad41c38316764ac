use objgen_core::{CoreError, EntityKind};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Member category an entity may or may not host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Attributes,
    Properties,
    Methods,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Attributes => write!(f, "attributes"),
            Capability::Properties => write!(f, "properties"),
            Capability::Methods => write!(f, "methods"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Malformed signature {signature:?}: {reason}")]
    MalformedSignature { signature: String, reason: String },

    #[error("{kind} {entity:?} cannot host {capability} (section {section:?})")]
    UnsupportedSection {
        entity: String,
        kind: EntityKind,
        capability: Capability,
        section: String,
    },

    #[error("Cannot open documentation index {path}: {source}")]
    IndexOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown compound: {0}")]
    UnknownCompound(String),
}

impl ParserError {
    pub(crate) fn malformed(signature: &str, reason: impl Into<String>) -> Self {
        ParserError::MalformedSignature {
            signature: signature.to_string(),
            reason: reason.into(),
        }
    }
}
