//! Documentation index model, signature resolver and entity loader

pub mod doc;
pub mod error;
pub mod json_index;
pub mod loader;
pub mod signature;

pub use doc::{CompoundDef, DocIndex, IndexEntry, MemoryIndex};
pub use error::ParserError;
pub use json_index::JsonDocIndex;
pub use loader::{LoadStats, Loader};
pub use signature::{parse_signature, SignatureResolver};
