//! Entity model: classes, protocols, unions and functions
//!
//! Entities host members through three capability traits. A concrete kind
//! implements only the ones it supports and exposes them through
//! [`TypeDefinition`]; the loader asks for a capability instead of matching
//! on the kind.

use crate::naming::to_host_ident;
use crate::types::{FuncType, HostName, Type, Unrepresentable};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::OnceCell;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protection {
    #[default]
    Public,
    Protected,
    Private,
    Package,
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protection::Public => write!(f, "public"),
            Protection::Protected => write!(f, "protected"),
            Protection::Private => write!(f, "private"),
            Protection::Package => write!(f, "package"),
        }
    }
}

/// Declaration position in a header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.column <= 1 {
            write!(f, "{}:{}", self.file, self.line)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// Body extent of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// Fields shared by every entity
#[derive(Debug, Clone, Default)]
pub struct BaseNode {
    pub refid: String,
    pub name: String,
    pub prot: Protection,
    pub location: Option<Location>,
    pub range: Option<LineRange>,
    host: OnceCell<String>,
}

impl BaseNode {
    pub fn new(refid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            refid: refid.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Node known only by its reference id.
    pub fn placeholder(refid: impl Into<String>) -> Self {
        Self::new(refid, String::new())
    }

    pub fn with_protection(mut self, prot: Protection) -> Self {
        self.prot = prot;
        self
    }

    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn with_range(mut self, range: Option<LineRange>) -> Self {
        self.range = range;
        self
    }

    /// Go-safe name, computed once. `None` while the source name is unknown.
    pub fn host_name(&self) -> Option<&str> {
        if self.name.is_empty() {
            return None;
        }
        Some(self.host.get_or_init(|| to_host_ident(&self.name)))
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.host = OnceCell::new();
    }

    fn host_result(&self) -> HostName {
        match self.host_name() {
            Some(name) => Ok(name.to_string()),
            None => Err(Unrepresentable::new(format!(
                "{} /* unresolved {} */",
                crate::types::ANY_TYPE,
                self.refid
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub ty: Type,
    pub prot: Protection,
    pub is_static: bool,
    pub location: Option<Location>,
    pub range: Option<LineRange>,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub ty: Type,
    pub readable: bool,
    pub writable: bool,
    pub location: Option<Location>,
    pub range: Option<LineRange>,
}

/// Free function or method
#[derive(Debug, Clone)]
pub struct Function {
    pub base: BaseNode,
    pub ty: FuncType,
    /// Source name of the owning entity; empty for free functions
    pub receiver: String,
    pub is_extern: bool,
    /// Class method (`+` selector)
    pub is_static: bool,
}

impl Function {
    pub fn new(base: BaseNode) -> Self {
        Self {
            base,
            ty: FuncType::default(),
            receiver: String::new(),
            is_extern: false,
            is_static: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn is_free(&self) -> bool {
        self.receiver.is_empty()
    }
}

pub trait AttributeHost {
    fn add_attribute(&mut self, attr: Attribute);
    fn attributes(&self) -> &[Attribute];
}

pub trait PropertyHost {
    fn add_property(&mut self, prop: Property);
    fn properties(&self) -> &[Property];
}

pub trait MethodHost {
    /// Returns `false` when a method with the same name already exists; the
    /// first declaration is kept.
    fn add_method(&mut self, method: Function) -> bool;
    fn methods(&self) -> &[Function];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Struct,
    Class,
    Protocol,
    Union,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Struct => write!(f, "struct"),
            EntityKind::Class => write!(f, "class"),
            EntityKind::Protocol => write!(f, "protocol"),
            EntityKind::Union => write!(f, "union"),
        }
    }
}

/// A named type definition stored in the [`EntityStore`](crate::EntityStore).
pub trait TypeDefinition: fmt::Debug + Any {
    fn base(&self) -> &BaseNode;

    fn kind(&self) -> EntityKind;

    fn host_name(&self) -> HostName {
        self.base().host_result()
    }

    fn cast_to_native(&self, exp: &str) -> Option<String>;

    fn cast_to_host(&self, exp: &str) -> Option<String>;

    fn attribute_host(&mut self) -> Option<&mut dyn AttributeHost> {
        None
    }

    fn property_host(&mut self) -> Option<&mut dyn PropertyHost> {
        None
    }

    fn method_host(&mut self) -> Option<&mut dyn MethodHost> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

fn push_method(owner: &str, methods: &mut Vec<Function>, method: Function) -> bool {
    if methods.iter().any(|m| m.name() == method.name()) {
        warn!("redeclaration of {:?}.{:?}, keeping the first", owner, method.name());
        return false;
    }
    methods.push(method);
    true
}

/// Class, interface or C struct
#[derive(Debug, Clone, Default)]
pub struct StructType {
    pub base: BaseNode,
    pub is_class: bool,
    pub attributes: Vec<Attribute>,
    pub properties: Vec<Property>,
    pub methods: Vec<Function>,
}

impl StructType {
    pub fn new(base: BaseNode, is_class: bool) -> Self {
        Self {
            base,
            is_class,
            ..Default::default()
        }
    }

    pub fn placeholder(refid: impl Into<String>) -> Self {
        Self::new(BaseNode::placeholder(refid), false)
    }
}

impl TypeDefinition for StructType {
    fn base(&self) -> &BaseNode {
        &self.base
    }

    fn kind(&self) -> EntityKind {
        if self.is_class {
            EntityKind::Class
        } else {
            EntityKind::Struct
        }
    }

    fn cast_to_native(&self, exp: &str) -> Option<String> {
        // wrappers embed objc.Object
        self.base.host_name().map(|_| exp.to_string())
    }

    fn cast_to_host(&self, exp: &str) -> Option<String> {
        self.base
            .host_name()
            .map(|name| format!("As{}({})", name, exp))
    }

    fn attribute_host(&mut self) -> Option<&mut dyn AttributeHost> {
        Some(self)
    }

    fn property_host(&mut self) -> Option<&mut dyn PropertyHost> {
        Some(self)
    }

    fn method_host(&mut self) -> Option<&mut dyn MethodHost> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl AttributeHost for StructType {
    fn add_attribute(&mut self, attr: Attribute) {
        self.attributes.push(attr);
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl PropertyHost for StructType {
    fn add_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }
}

impl MethodHost for StructType {
    fn add_method(&mut self, method: Function) -> bool {
        push_method(&self.base.name, &mut self.methods, method)
    }

    fn methods(&self) -> &[Function] {
        &self.methods
    }
}

/// Objective-C protocol: a contract the Go side can implement
#[derive(Debug, Clone, Default)]
pub struct ProtocolType {
    pub base: BaseNode,
    pub properties: Vec<Property>,
    pub methods: Vec<Function>,
}

impl ProtocolType {
    pub fn new(base: BaseNode) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }
}

impl TypeDefinition for ProtocolType {
    fn base(&self) -> &BaseNode {
        &self.base
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Protocol
    }

    fn cast_to_native(&self, exp: &str) -> Option<String> {
        self.base.host_name().map(|_| exp.to_string())
    }

    fn cast_to_host(&self, exp: &str) -> Option<String> {
        self.base.host_name().map(|_| exp.to_string())
    }

    fn property_host(&mut self) -> Option<&mut dyn PropertyHost> {
        Some(self)
    }

    fn method_host(&mut self) -> Option<&mut dyn MethodHost> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PropertyHost for ProtocolType {
    fn add_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }
}

impl MethodHost for ProtocolType {
    fn add_method(&mut self, method: Function) -> bool {
        push_method(&self.base.name, &mut self.methods, method)
    }

    fn methods(&self) -> &[Function] {
        &self.methods
    }
}

/// C union. Fields only; values never cross the bridge.
#[derive(Debug, Clone, Default)]
pub struct UnionType {
    pub base: BaseNode,
    pub attributes: Vec<Attribute>,
}

impl UnionType {
    pub fn new(base: BaseNode) -> Self {
        Self {
            base,
            attributes: Vec::new(),
        }
    }
}

impl TypeDefinition for UnionType {
    fn base(&self) -> &BaseNode {
        &self.base
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Union
    }

    fn cast_to_native(&self, _exp: &str) -> Option<String> {
        None
    }

    fn cast_to_host(&self, _exp: &str) -> Option<String> {
        None
    }

    fn attribute_host(&mut self) -> Option<&mut dyn AttributeHost> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl AttributeHost for UnionType {
    fn add_attribute(&mut self, attr: Attribute) {
        self.attributes.push(attr);
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}
