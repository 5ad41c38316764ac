//! Signature resolution
//!
//! Turns the textual type signatures found in documentation entries into
//! [`Type`] values. The grammar is a fixed-priority list of rules; the first
//! rule that matches wins and recurses on whatever remains:
//!
//! 1. exact overrides (after whitespace normalization), with `void` meaning
//!    no type at all
//! 2. function pointers and blocks, `ret (*)(args)` / `ret (^)(args)`
//! 3. qualifier wrappers, one per step (see [`WRAPPERS`])
//! 4. fixed array suffixes `[N]`
//! 5. primitive names
//! 6. bare identifiers
//! 7. anything else is kept verbatim as [`Type::Unknown`]

use crate::doc::{LinkedText, MemberDef};
use crate::error::ParserError;
use objgen_core::types::ANY_TYPE;
use objgen_core::{EntityStore, FuncArg, FuncType, Type};
use tracing::{trace, warn};

/// Function pointer and block markers between the return type and arguments.
const FUNCTION_MARKERS: &[&str] = &["(* )(", "(*)(", "(^)(", "(^ )("];

/// Trailing tokens that are qualifiers, never parameter names.
const QUALIFIER_TOKENS: &[&str] = &[
    "const",
    "_Nullable",
    "__nullable",
    "_Nonnull",
    "__nonnull",
    "_Null_unspecified",
    "__null_unspecified",
];

#[derive(Debug, Clone, Copy)]
enum Affix {
    Prefix(&'static str),
    Suffix(&'static str),
}

impl Affix {
    fn strip(self, sig: &str) -> Option<&str> {
        match self {
            Affix::Prefix(p) => sig.strip_prefix(p),
            Affix::Suffix(s) => {
                let rest = sig.strip_suffix(s)?;
                let needs_boundary = s.starts_with(is_ident_char);
                if needs_boundary && rest.chars().next_back().map_or(true, is_ident_char) {
                    return None;
                }
                Some(rest)
            }
        }
    }
}

struct Wrapper {
    affix: Affix,
    wrap: fn(Type) -> Type,
}

fn extern_type(t: Type) -> Type {
    Type::Extern(Box::new(t))
}

fn nullable(t: Type) -> Type {
    Type::Nullable {
        elem: Box::new(t),
        nullable: true,
    }
}

fn nonnull(t: Type) -> Type {
    Type::Nullable {
        elem: Box::new(t),
        nullable: false,
    }
}

fn const_type(t: Type) -> Type {
    Type::Const(Box::new(t))
}

fn strong(t: Type) -> Type {
    Type::Strong(Box::new(t))
}

fn pointer(t: Type) -> Type {
    Type::pointer(t)
}

fn unspecified(t: Type) -> Type {
    t
}

/// Qualifier wrappers in priority order.
const WRAPPERS: &[Wrapper] = &[
    Wrapper { affix: Affix::Prefix("APPKIT_EXTERN "), wrap: extern_type },
    Wrapper { affix: Affix::Prefix("FOUNDATION_EXPORT "), wrap: extern_type },
    Wrapper { affix: Affix::Prefix("extern "), wrap: extern_type },
    Wrapper { affix: Affix::Prefix("__nullable "), wrap: nullable },
    Wrapper { affix: Affix::Prefix("nullable "), wrap: nullable },
    Wrapper { affix: Affix::Prefix("_Nullable "), wrap: nullable },
    Wrapper { affix: Affix::Suffix("_Nullable"), wrap: nullable },
    Wrapper { affix: Affix::Suffix("__nullable"), wrap: nullable },
    Wrapper { affix: Affix::Prefix("const "), wrap: const_type },
    Wrapper { affix: Affix::Prefix("__strong "), wrap: strong },
    Wrapper { affix: Affix::Prefix("__weak "), wrap: strong },
    Wrapper { affix: Affix::Prefix("__unsafe_unretained "), wrap: strong },
    Wrapper { affix: Affix::Suffix("*"), wrap: pointer },
    Wrapper { affix: Affix::Suffix("__nonnull"), wrap: nonnull },
    Wrapper { affix: Affix::Suffix("_Nonnull"), wrap: nonnull },
    Wrapper { affix: Affix::Suffix("const"), wrap: const_type },
    Wrapper { affix: Affix::Prefix("__null_unspecified "), wrap: unspecified },
    Wrapper { affix: Affix::Suffix("__null_unspecified"), wrap: unspecified },
    Wrapper { affix: Affix::Suffix("_Null_unspecified"), wrap: unspecified },
];

fn override_type(sig: &str) -> Option<Type> {
    let t = match sig {
        "" | "id" | "instancetype" => Type::primitive(ANY_TYPE),
        "void *" | "__strong void *" | "const void *" => Type::primitive("uintptr"),
        "char *" => Type::array(Type::primitive("byte"), ""),
        "NSString *" => Type::String,
        "NSInteger" => Type::primitive("int"),
        "NSUInteger" => Type::primitive("uint"),
        "CGFloat" => Type::primitive("float64"),
        _ => return None,
    };
    Some(t)
}

/// Go spelling of a C primitive, assuming a 64-bit target.
fn primitive_name(sig: &str) -> Option<&'static str> {
    let name = match sig {
        "BOOL" | "bool" => "bool",
        "char" => "byte",
        "signed char" | "int8_t" => "int8",
        "unsigned char" | "uint8_t" => "uint8",
        "short" | "int16_t" => "int16",
        "unsigned short" | "uint16_t" => "uint16",
        "int32_t" => "int32",
        "uint32_t" => "uint32",
        "int64_t" => "int64",
        "uint64_t" => "uint64",
        "int" | "signed int" | "signed" => "int",
        "unsigned" | "unsigned int" => "uint",
        "long" | "long long" | "signed long" => "int64",
        "unsigned long" | "unsigned long long" | "size_t" => "uint64",
        "float" => "float32",
        "double" => "float64",
        "uintptr_t" => "uintptr",
        _ => return None,
    };
    Some(name)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_identifier(sig: &str) -> bool {
    !sig.is_empty() && sig.chars().all(is_ident_char)
}

fn check_balanced(sig: &str) -> Result<(), ParserError> {
    let mut parens = 0i32;
    let mut brackets = 0i32;
    for c in sig.chars() {
        match c {
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
        if parens < 0 {
            return Err(ParserError::malformed(sig, "unbalanced parentheses"));
        }
        if brackets < 0 {
            return Err(ParserError::malformed(sig, "unbalanced brackets"));
        }
    }
    if parens != 0 {
        return Err(ParserError::malformed(sig, "unbalanced parentheses"));
    }
    if brackets != 0 {
        return Err(ParserError::malformed(sig, "unbalanced brackets"));
    }
    Ok(())
}

/// Parse a textual signature. `Ok(None)` means `void`.
///
/// # Examples
/// ```
/// use objgen_core::Type;
/// use objgen_parser::parse_signature;
///
/// assert_eq!(parse_signature("NSString *").unwrap(), Some(Type::String));
/// assert_eq!(parse_signature("void").unwrap(), None);
/// assert_eq!(
///     parse_signature("uint32_t[4]").unwrap(),
///     Some(Type::array(Type::primitive("uint32"), "4"))
/// );
/// ```
pub fn parse_signature(sig: &str) -> Result<Option<Type>, ParserError> {
    let sig = sig.trim();
    let normalized = sig.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized == "void" {
        return Ok(None);
    }
    if let Some(t) = override_type(&normalized) {
        return Ok(Some(t));
    }
    check_balanced(sig)?;

    if let Some(func) = parse_function(sig)? {
        return Ok(Some(Type::Function(func)));
    }

    for w in WRAPPERS {
        if let Some(rest) = w.affix.strip(sig) {
            let elem = parse_signature(rest)?.unwrap_or_else(|| Type::unknown("void"));
            return Ok(Some((w.wrap)(elem)));
        }
    }

    if let Some(inner) = sig.strip_suffix(']') {
        // balanced, so the opening bracket exists
        let open = inner
            .rfind('[')
            .ok_or_else(|| ParserError::malformed(sig, "unbalanced brackets"))?;
        let size = inner[open + 1..].trim();
        let elem = parse_signature(&inner[..open])?.unwrap_or_else(|| Type::unknown("void"));
        return Ok(Some(Type::array(elem, size)));
    }

    if let Some(name) = primitive_name(&normalized) {
        return Ok(Some(Type::primitive(name)));
    }
    if is_identifier(sig) {
        return Ok(Some(Type::named(sig)));
    }
    trace!("unrecognized signature {:?}", sig);
    Ok(Some(Type::unknown(sig)))
}

/// Position and marker of a function pointer split at nesting depth zero.
fn find_function_marker(sig: &str) -> Option<(usize, &'static str)> {
    let mut depth = 0i32;
    for (i, c) in sig.char_indices() {
        if depth == 0 {
            let rest = &sig[i..];
            if let Some(marker) = FUNCTION_MARKERS.iter().find(|m| rest.starts_with(**m)) {
                return Some((i, marker));
            }
        }
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn parse_function(sig: &str) -> Result<Option<FuncType>, ParserError> {
    if !sig.ends_with(')') {
        return Ok(None);
    }
    let Some((at, marker)) = find_function_marker(sig) else {
        return Ok(None);
    };
    let args_start = at + marker.len();
    if args_start > sig.len() - 1 {
        return Ok(None);
    }
    let ret = parse_signature(&sig[..at])?;
    let args_text = &sig[args_start..sig.len() - 1];

    let segments = split_args(args_text);
    let mut args = Vec::with_capacity(segments.len());
    let lone_void = segments.len() == 1 && segments[0] == "void";
    if !lone_void {
        for segment in segments {
            args.push(parse_arg(segment)?);
        }
    }
    Ok(Some(FuncType {
        ret: ret.map(Box::new),
        args,
    }))
}

/// Split on top-level commas, dropping empty segments.
fn split_args(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                out.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(text[start..].trim());
    out.retain(|s| !s.is_empty());
    out
}

fn parse_arg(segment: &str) -> Result<FuncArg, ParserError> {
    let (body, suffix) = match segment.strip_suffix("[]") {
        Some(body) => (body.trim_end(), "[]"),
        None => (segment, ""),
    };
    let (name, type_text) = split_arg_name(body);
    let ty = parse_signature(&format!("{}{}", type_text, suffix))?
        .unwrap_or_else(|| Type::unknown("void"));
    Ok(FuncArg {
        name: name.to_string(),
        ty,
    })
}

/// Split `NSInteger count` into (`count`, `NSInteger`).
fn split_arg_name(segment: &str) -> (&str, &str) {
    let normalized = segment.split_whitespace().collect::<Vec<_>>().join(" ");
    if primitive_name(&normalized).is_some() || override_type(&normalized).is_some() {
        return ("", segment);
    }
    let Some((idx, c)) = segment.char_indices().rev().find(|(_, c)| !is_ident_char(*c)) else {
        return ("", segment);
    };
    let tail = &segment[idx + c.len_utf8()..];
    let head = segment[..idx + c.len_utf8()].trim();
    if tail.is_empty() || head.is_empty() || QUALIFIER_TOKENS.contains(&tail) {
        return ("", segment);
    }
    (tail, head)
}

/// Resolves signatures against a run's [`EntityStore`].
///
/// A single cross-reference token bypasses the grammar and yields the
/// referenced entity, creating a placeholder when it was not seen yet.
pub struct SignatureResolver<'s> {
    store: &'s mut EntityStore,
}

impl<'s> SignatureResolver<'s> {
    pub fn new(store: &'s mut EntityStore) -> Self {
        Self { store }
    }

    /// Resolve a linked-text type. A missing type is [`Type::Unknown`].
    pub fn resolve_linked(
        &mut self,
        linked: Option<&LinkedText>,
    ) -> Result<Option<Type>, ParserError> {
        self.resolve_with_suffix(linked, "")
    }

    /// Resolve a member's declared type together with its argsstring, so
    /// array suffixes stay attached.
    pub fn resolve_member(&mut self, member: &MemberDef) -> Result<Option<Type>, ParserError> {
        self.resolve_with_suffix(member.ty.as_ref(), &member.argsstring)
    }

    fn resolve_with_suffix(
        &mut self,
        linked: Option<&LinkedText>,
        suffix: &str,
    ) -> Result<Option<Type>, ParserError> {
        let Some(linked) = linked else {
            return Ok(Some(Type::unknown("")));
        };
        match linked.refs.as_slice() {
            [] => parse_signature(&format!("{} {}", linked.text, suffix)),
            [single] => Ok(Some(Type::Entity(self.store.get_or_create(&single.refid)))),
            refs => {
                let ids: Vec<&str> = refs.iter().map(|r| r.refid.as_str()).collect();
                warn!("mixed reference tokens in {:?}: {:?}", linked.text, ids);
                Ok(Some(Type::unknown_with_comment(
                    linked.text.clone(),
                    "ref type",
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::RefText;
    use pretty_assertions::assert_eq;

    fn parse(sig: &str) -> Type {
        parse_signature(sig)
            .expect("parse")
            .expect("non-void type")
    }

    #[test]
    fn test_overrides() {
        assert_eq!(parse(""), Type::primitive(ANY_TYPE));
        assert_eq!(parse("void *"), Type::primitive("uintptr"));
        assert_eq!(parse("__strong void *"), Type::primitive("uintptr"));
        assert_eq!(parse("char *"), Type::array(Type::primitive("byte"), ""));
        assert_eq!(parse("  NSString   * "), Type::String);
        assert_eq!(parse("NSInteger"), Type::primitive("int"));
        assert_eq!(parse_signature(" void ").expect("parse"), None);
    }

    #[test]
    fn test_primitives_and_names() {
        assert_eq!(parse("BOOL"), Type::primitive("bool"));
        assert_eq!(parse("unsigned long long"), Type::primitive("uint64"));
        assert_eq!(parse("double"), Type::primitive("float64"));
        assert_eq!(parse("NSRect"), Type::named("NSRect"));
        assert_eq!(parse("struct CGPoint"), Type::unknown("struct CGPoint"));
        assert_eq!(parse("NSArray<id>"), Type::unknown("NSArray<id>"));
    }

    #[test]
    fn test_wrapper_priority() {
        // the nullable suffix is peeled before the pointer
        assert_eq!(
            parse("NSWindow * _Nullable"),
            Type::Nullable {
                elem: Box::new(Type::pointer(Type::named("NSWindow"))),
                nullable: true
            }
        );
        assert_eq!(
            parse("const uint8_t *"),
            Type::Const(Box::new(Type::pointer(Type::primitive("uint8"))))
        );
        assert_eq!(
            parse("NSString *const"),
            Type::Const(Box::new(Type::String))
        );
        assert_eq!(
            parse("APPKIT_EXTERN NSString *"),
            Type::Extern(Box::new(Type::String))
        );
        assert_eq!(
            parse("__weak id"),
            Type::Strong(Box::new(Type::primitive(ANY_TYPE)))
        );
        assert_eq!(
            parse("NSString * _Null_unspecified"),
            Type::String
        );
    }

    #[test]
    fn test_suffix_needs_boundary() {
        assert_eq!(parse("Myconst"), Type::named("Myconst"));
        assert_eq!(parse("id_Nullable"), Type::named("id_Nullable"));
    }

    #[test]
    fn test_void_under_wrapper() {
        assert_eq!(
            parse("const void"),
            Type::Const(Box::new(Type::unknown("void")))
        );
        assert_eq!(parse("void **"), Type::pointer(Type::primitive("uintptr")));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            parse("unichar [16]"),
            Type::array(Type::named("unichar"), "16")
        );
        assert_eq!(
            parse("char [2][3]"),
            Type::array(Type::array(Type::primitive("byte"), "2"), "3")
        );
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            parse_signature("int ]"),
            Err(ParserError::MalformedSignature { .. })
        ));
        assert!(matches!(
            parse_signature("void (*)(int"),
            Err(ParserError::MalformedSignature { .. })
        ));
    }

    #[test]
    fn test_function_pointer() {
        let t = parse("void(* )(NSInteger count, const char *name)");
        let Type::Function(f) = t else {
            panic!("expected function, got {:?}", t);
        };
        assert_eq!(f.ret, None);
        assert_eq!(f.args.len(), 2);
        assert_eq!(f.args[0].name, "count");
        assert_eq!(f.args[0].ty, Type::primitive("int"));
        assert_eq!(f.args[1].name, "name");
        assert_eq!(
            f.args[1].ty,
            Type::Const(Box::new(Type::array(Type::primitive("byte"), "")))
        );
    }

    #[test]
    fn test_block_arguments() {
        let t = parse("void (^)(BOOL finished, unsigned int, NSString * _Nullable)");
        let Type::Function(f) = t else {
            panic!("expected function, got {:?}", t);
        };
        let names: Vec<&str> = f.args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["finished", "", ""]);
        assert_eq!(f.args[1].ty, Type::primitive("uint"));
        assert!(matches!(f.args[2].ty, Type::Nullable { nullable: true, .. }));
    }

    #[test]
    fn test_function_void_args_and_array_args() {
        let Type::Function(f) = parse("int (*)(void)") else {
            panic!("expected function");
        };
        assert!(f.args.is_empty());
        assert_eq!(f.ret.as_deref(), Some(&Type::primitive("int")));

        let Type::Function(f) = parse("int (*)(char *argv[])") else {
            panic!("expected function");
        };
        assert_eq!(f.args[0].name, "argv");
        assert_eq!(
            f.args[0].ty,
            Type::array(Type::array(Type::primitive("byte"), ""), "")
        );
    }

    #[test]
    fn test_resolver_reference_tokens() -> Result<(), ParserError> {
        let mut store = EntityStore::new();
        let mut resolver = SignatureResolver::new(&mut store);

        let single = LinkedText::reference("interface_n_s_alert", "NSAlert");
        let t = resolver.resolve_linked(Some(&single))?;
        let mixed = LinkedText {
            text: "NSArray< NSView * > *".to_string(),
            refs: vec![
                RefText {
                    refid: "interface_n_s_array".to_string(),
                    text: "NSArray".to_string(),
                },
                RefText {
                    refid: "interface_n_s_view".to_string(),
                    text: "NSView".to_string(),
                },
            ],
        };
        let m = resolver.resolve_linked(Some(&mixed))?;
        let absent = resolver.resolve_linked(None)?;

        let id = store.lookup("interface_n_s_alert").expect("placeholder");
        assert_eq!(t, Some(Type::Entity(id)));
        assert!(matches!(m, Some(Type::Unknown { ref comment, .. }) if comment == "ref type"));
        assert_eq!(absent, Some(Type::unknown("")));
        assert!(store.lookup("interface_n_s_view").is_none());
        Ok(())
    }

    #[test]
    fn test_member_argsstring_is_appended() -> Result<(), ParserError> {
        let mut store = EntityStore::new();
        let member = MemberDef {
            kind: "variable".to_string(),
            name: "buffer".to_string(),
            ty: Some(LinkedText::plain("unichar")),
            argsstring: "[8]".to_string(),
            ..Default::default()
        };
        let t = SignatureResolver::new(&mut store).resolve_member(&member)?;
        assert_eq!(t, Some(Type::array(Type::named("unichar"), "8")));
        Ok(())
    }
}
