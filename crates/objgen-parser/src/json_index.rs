//! On-disk JSON documentation index
//!
//! Layout of an index directory:
//!
//! ```text
//! <dir>/index.json     {"compounds": [{"refid": ..., "name": ..., "kind": ...}, ...]}
//! <dir>/<refid>.json   one CompoundDef per entry
//! ```

use crate::doc::{CompoundDef, DocIndex, IndexEntry};
use crate::error::ParserError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    compounds: Vec<IndexEntry>,
}

#[derive(Debug)]
pub struct JsonDocIndex {
    dir: PathBuf,
    entries: Vec<IndexEntry>,
}

impl JsonDocIndex {
    /// Read `index.json` from `dir`. Compounds are decoded lazily.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ParserError> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(INDEX_FILE);
        let content = fs::read_to_string(&path).map_err(|source| ParserError::IndexOpen {
            path: path.clone(),
            source,
        })?;
        let index: IndexFile = serde_json::from_str(&content)
            .map_err(|source| ParserError::Decode { path, source })?;
        debug!(
            "opened index {} with {} compounds",
            dir.display(),
            index.compounds.len()
        );
        Ok(Self {
            dir,
            entries: index.compounds,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn compound_path(&self, refid: &str) -> PathBuf {
        self.dir.join(format!("{}.json", refid))
    }
}

impl DocIndex for JsonDocIndex {
    fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    fn decode(&self, entry: &IndexEntry) -> Result<CompoundDef, ParserError> {
        let path = self.compound_path(&entry.refid);
        let content = fs::read_to_string(&path).map_err(|source| ParserError::IndexOpen {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ParserError::Decode { path, source })
    }
}
