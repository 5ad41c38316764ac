//! Resolver properties over generated inputs

use objgen_core::types::ANY_TYPE;
use objgen_core::{EntityStore, Type};
use objgen_parser::parse_signature;
use proptest::prelude::*;

const OVERRIDES: &[&str] = &["void *", "__strong void *", "char *", "NSString *", "id", ""];

fn padding() -> impl Strategy<Value = String> {
    "[ \t]{0,4}"
}

fn primitive_sig() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop::sample::select(vec![
        ("int32_t", "int32"),
        ("uint8_t", "uint8"),
        ("BOOL", "bool"),
        ("double", "float64"),
        ("unsigned int", "uint"),
        ("NSUInteger", "uint"),
    ])
}

proptest! {
    #[test]
    fn overrides_ignore_surrounding_whitespace(
        idx in 0..OVERRIDES.len(),
        left in padding(),
        right in padding(),
    ) {
        let sig = OVERRIDES[idx];
        let padded = format!("{}{}{}", left, sig, right);
        prop_assert_eq!(parse_signature(&padded)?, parse_signature(sig)?);
    }

    #[test]
    fn const_pointer_is_transparent((sig, go) in primitive_sig()) {
        let store = EntityStore::new();
        let t = parse_signature(&format!("const {} *", sig))?.expect("type");
        let elem = Type::primitive(go);
        prop_assert_eq!(&t, &Type::Const(Box::new(Type::pointer(elem.clone()))));
        prop_assert_eq!(t.host_name(&store), Ok(format!("*{}", go)));
        prop_assert_eq!(t.cast_to_native("v", &store), elem.cast_to_native("v", &store));
        prop_assert_eq!(t.cast_to_host("v", &store), elem.cast_to_host("v", &store));
    }

    #[test]
    fn fixed_arrays_keep_their_size((sig, go) in primitive_sig(), size in 1u32..512) {
        let t = parse_signature(&format!("{} [{}]", sig, size))?.expect("type");
        prop_assert_eq!(t, Type::array(Type::primitive(go), size.to_string()));
    }

    #[test]
    fn identifiers_resolve_to_named(name in "NS[A-Z][a-zA-Z]{0,12}") {
        prop_assume!(name != "NSString" && name != "NSInteger" && name != "NSUInteger");
        prop_assert_eq!(parse_signature(&name)?, Some(Type::named(name.clone())));
    }
}

#[test]
fn test_string_and_pointer_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let store = EntityStore::new();
    let s = parse_signature("NSString *")?.ok_or("void")?;
    assert_eq!(s, Type::String);
    assert_eq!(
        s.cast_to_native("v", &store).as_deref(),
        Some("foundation.NSStringFromString(v)")
    );
    assert_eq!(s.cast_to_host("v", &store).as_deref(), Some("v.String()"));

    let p = parse_signature("void *")?.ok_or("void")?;
    assert_eq!(p, Type::primitive("uintptr"));
    assert_eq!(parse_signature("")?, Some(Type::primitive(ANY_TYPE)));
    Ok(())
}

#[test]
fn test_unknown_keeps_raw_text() -> Result<(), Box<dyn std::error::Error>> {
    let store = EntityStore::new();
    let t = parse_signature("struct _NSModalSession")?.ok_or("void")?;
    assert!(t.is_unknown());
    let partial = t.host_name(&store).unwrap_err().partial;
    assert_eq!(partial, "interface{} /* struct _NSModalSession */");
    Ok(())
}
