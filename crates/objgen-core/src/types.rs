//! Type algebra for native signatures
//!
//! Each [`Type`] knows three things about itself: the Go type name it maps
//! to, how to turn a Go value of that type into something the runtime bridge
//! accepts, and how to turn a bridge value back into the Go type. Any of the
//! three may be unavailable, in which case the emitter degrades instead of
//! failing.

use crate::naming::to_local_name;
use crate::store::{EntityId, EntityStore};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Go type used when nothing better is known.
pub const ANY_TYPE: &str = "interface{}";

/// A type that has no Go spelling yet.
///
/// `partial` holds the best-effort rendering, used in advisory comments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("type cannot be represented yet: {partial}")]
pub struct Unrepresentable {
    pub partial: String,
}

impl Unrepresentable {
    pub fn new(partial: impl Into<String>) -> Self {
        Self {
            partial: partial.into(),
        }
    }
}

pub type HostName = Result<String, Unrepresentable>;

/// Native type expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Type {
    /// Builtin Go type, already spelled in Go (`int32`, `bool`, `uintptr`)
    Primitive { name: String },
    /// Reference by name that no entity has claimed
    Named { name: String },
    /// `NSString *`, mapped to Go `string`
    String,
    Pointer(Box<Type>),
    /// Fixed or open array; `size` is kept as literal text
    Array { elem: Box<Type>, size: String },
    Const(Box<Type>),
    /// Ownership qualifier (`__strong`, `__weak`)
    Strong(Box<Type>),
    Nullable { elem: Box<Type>, nullable: bool },
    /// Symbol visibility macro; stripped by the loader
    Extern(Box<Type>),
    Function(FuncType),
    /// Anything the resolver did not understand
    Unknown { raw: String, comment: String },
    /// Class, protocol or union in the entity store
    Entity(EntityId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FuncType {
    /// `None` for `void`
    pub ret: Option<Box<Type>>,
    pub args: Vec<FuncArg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncArg {
    pub name: String,
    pub ty: Type,
}

impl Type {
    pub fn primitive(name: impl Into<String>) -> Self {
        Type::Primitive { name: name.into() }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Type::Named { name: name.into() }
    }

    pub fn pointer(elem: Type) -> Self {
        Type::Pointer(Box::new(elem))
    }

    pub fn array(elem: Type, size: impl Into<String>) -> Self {
        Type::Array {
            elem: Box::new(elem),
            size: size.into(),
        }
    }

    /// Unknown type whose comment is the raw text itself.
    pub fn unknown(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Type::Unknown {
            comment: raw.clone(),
            raw,
        }
    }

    /// Unknown type with a separate diagnostic comment.
    pub fn unknown_with_comment(raw: impl Into<String>, comment: impl Into<String>) -> Self {
        Type::Unknown {
            raw: raw.into(),
            comment: comment.into(),
        }
    }

    /// Nested element of a composite variant.
    pub fn elem(&self) -> Option<&Type> {
        match self {
            Type::Pointer(e) | Type::Const(e) | Type::Strong(e) | Type::Extern(e) => Some(e),
            Type::Array { elem, .. } | Type::Nullable { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Drop qualifiers that do not affect the Go type name.
    pub fn strip_qualifiers(&self) -> &Type {
        match self {
            Type::Const(e) | Type::Strong(e) | Type::Extern(e) => e.strip_qualifiers(),
            Type::Nullable { elem, .. } => elem.strip_qualifiers(),
            other => other,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown { .. })
    }

    /// Go type name.
    pub fn host_name(&self, store: &EntityStore) -> HostName {
        match self {
            Type::Primitive { name } | Type::Named { name } => Ok(name.clone()),
            Type::String => Ok("string".to_string()),
            Type::Pointer(elem) => match elem.host_name(store) {
                Ok(name) => Ok(format!("*{}", name)),
                Err(e) => Err(Unrepresentable::new(format!("*{}", e.partial))),
            },
            Type::Array { elem, size } => match elem.host_name(store) {
                Ok(name) => Ok(format!("[{}]{}", size, name)),
                Err(e) => Err(Unrepresentable::new(format!("[{}]{}", size, e.partial))),
            },
            Type::Const(elem) | Type::Strong(elem) | Type::Extern(elem) => elem.host_name(store),
            Type::Nullable { elem, .. } => elem.host_name(store),
            Type::Function(f) => match f.render_signature(store) {
                Ok(sig) => Ok(format!("func{}", sig)),
                Err(e) => Err(Unrepresentable::new(format!("func{}", e.partial))),
            },
            Type::Unknown { comment, .. } => {
                let mut partial = ANY_TYPE.to_string();
                if !comment.is_empty() {
                    partial.push_str(&format!(" /* {} */", comment));
                }
                Err(Unrepresentable::new(partial))
            }
            Type::Entity(id) => match store.get(*id) {
                Some(def) => def.host_name(),
                None => Err(Unrepresentable::new(format!("{} /* {} */", ANY_TYPE, id))),
            },
        }
    }

    /// Cast a Go expression of [`Type::host_name`] to what the bridge expects.
    pub fn cast_to_native(&self, exp: &str, store: &EntityStore) -> Option<String> {
        match self {
            Type::Primitive { .. } => Some(exp.to_string()),
            Type::String => Some(format!("foundation.NSStringFromString({})", exp)),
            Type::Named { .. } | Type::Unknown { .. } => None,
            // closures need cgo trampolines
            Type::Function(_) => None,
            Type::Entity(id) => store.get(*id)?.cast_to_native(exp),
            composite => composite.elem()?.cast_to_native(exp, store),
        }
    }

    /// Cast a bridge value (`objc.Object`) to the Go type.
    pub fn cast_to_host(&self, exp: &str, store: &EntityStore) -> Option<String> {
        match self {
            Type::Primitive { name } => primitive_to_host(name, exp),
            Type::String => Some(format!("{}.String()", exp)),
            Type::Named { .. } | Type::Unknown { .. } | Type::Function(_) => None,
            Type::Entity(id) => store.get(*id)?.cast_to_host(exp),
            composite => composite.elem()?.cast_to_host(exp, store),
        }
    }
}

fn primitive_to_host(name: &str, exp: &str) -> Option<String> {
    let cast = match name {
        "bool" => format!("{}.Bool()", exp),
        "int64" => format!("{}.Int()", exp),
        "int" | "int8" | "int16" | "int32" => format!("{}({}.Int())", name, exp),
        "uint64" => format!("{}.Uint()", exp),
        "uint" | "uint8" | "uint16" | "uint32" | "byte" => format!("{}({}.Uint())", name, exp),
        "float64" => format!("{}.Float()", exp),
        "float32" => format!("float32({}.Float())", exp),
        "uintptr" => format!("{}.Pointer()", exp),
        _ => return None,
    };
    Some(cast)
}

impl FuncType {
    /// Go parameter list and result, e.g. `(a int32, b string) bool`.
    ///
    /// Unnamed arguments get `argN` names when any other argument is named.
    pub fn render_signature(&self, store: &EntityStore) -> HostName {
        let has_names = self.args.iter().any(|a| !a.name.is_empty());
        let mut ok = true;
        let mut out = String::from("(");
        for (i, arg) in self.args.iter().enumerate() {
            if i != 0 {
                out.push_str(", ");
            }
            let name = match arg.name.as_str() {
                "" if has_names => format!("arg{}", i),
                name => to_local_name(name),
            };
            if !name.is_empty() {
                out.push_str(&name);
                out.push(' ');
            }
            match arg.ty.host_name(store) {
                Ok(t) => out.push_str(&t),
                Err(e) => {
                    ok = false;
                    out.push_str(&e.partial);
                }
            }
        }
        out.push(')');
        if let Some(ret) = &self.ret {
            out.push(' ');
            match ret.host_name(store) {
                Ok(t) => out.push_str(&t),
                Err(e) => {
                    ok = false;
                    out.push_str(&e.partial);
                }
            }
        }
        if ok {
            Ok(out)
        } else {
            Err(Unrepresentable::new(out))
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive { name } => write!(f, "{}", name),
            Type::Named { name } => write!(f, "named {}", name),
            Type::String => write!(f, "NSString"),
            Type::Pointer(e) => write!(f, "pointer to {}", e),
            Type::Array { elem, size } => write!(f, "array[{}] of {}", size, elem),
            Type::Const(e) => write!(f, "const {}", e),
            Type::Strong(e) => write!(f, "strong {}", e),
            Type::Nullable { elem, nullable } => {
                if *nullable {
                    write!(f, "nullable {}", elem)
                } else {
                    write!(f, "nonnull {}", elem)
                }
            }
            Type::Extern(e) => write!(f, "extern {}", e),
            Type::Function(func) => {
                write!(f, "function(")?;
                for (i, a) in func.args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a.ty)?;
                }
                write!(f, ")")?;
                if let Some(ret) = &func.ret {
                    write!(f, " -> {}", ret)?;
                }
                Ok(())
            }
            Type::Unknown { raw, .. } => write!(f, "unknown {:?}", raw),
            Type::Entity(id) => write!(f, "entity {}", id),
        }
    }
}
