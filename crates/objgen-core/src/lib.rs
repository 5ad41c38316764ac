//! Core type algebra and entity model for objgen

pub mod entity;
pub mod error;
pub mod naming;
pub mod store;
pub mod types;

pub use entity::{
    Attribute, AttributeHost, BaseNode, EntityKind, Function, LineRange, Location, MethodHost,
    Property, PropertyHost, Protection, ProtocolType, StructType, TypeDefinition, UnionType,
};
pub use error::CoreError;
pub use store::{EntityId, EntityStore};
pub use types::{FuncArg, FuncType, HostName, Type, Unrepresentable};
