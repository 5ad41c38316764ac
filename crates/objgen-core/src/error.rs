use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Duplicate definition for reference id '{0}'")]
    DuplicateDefinition(String),

    #[error("Duplicate file definition for reference id '{0}'")]
    DuplicateFile(String),
}
