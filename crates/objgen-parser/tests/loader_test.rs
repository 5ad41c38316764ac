//! Loader behaviour over in-memory documentation indexes

use objgen_core::{EntityKind, EntityStore, MethodHost, StructType, Type};
use objgen_parser::doc::{LinkedText, MemberDef, ParamDef, SectionDef};
use objgen_parser::error::Capability;
use objgen_parser::{CompoundDef, IndexEntry, Loader, MemoryIndex, ParserError};
use pretty_assertions::assert_eq;

fn compound(sections: Vec<SectionDef>) -> CompoundDef {
    CompoundDef {
        language: "Objective-C".to_string(),
        sections,
        ..Default::default()
    }
}

fn method(owner: &str, name: &str, ret: LinkedText, params: Vec<ParamDef>) -> MemberDef {
    let definition = format!("({}) {}::{}", ret.text, owner, name);
    MemberDef {
        id: format!("{}_{}", owner, name),
        kind: "function".to_string(),
        name: name.to_string(),
        ty: Some(ret),
        definition,
        params,
        ..Default::default()
    }
}

fn param(name: &str, ty: LinkedText) -> ParamDef {
    ParamDef {
        declname: name.to_string(),
        ty: Some(ty),
        array: String::new(),
    }
}

fn property(name: &str, ty: LinkedText, writable: bool) -> MemberDef {
    MemberDef {
        kind: "property".to_string(),
        name: name.to_string(),
        ty: Some(ty),
        readable: true,
        writable,
        ..Default::default()
    }
}

fn methods_of(store: &EntityStore, name: &str) -> Vec<String> {
    let id = store.find_by_name(name).expect("entity");
    let def = store.get(id).expect("slot");
    let s = def.as_any().downcast_ref::<StructType>().expect("struct");
    s.methods().iter().map(|m| m.name().to_string()).collect()
}

#[test]
fn test_class_members_are_loaded() -> Result<(), Box<dyn std::error::Error>> {
    let index = MemoryIndex::new().with(
        IndexEntry::new("interface_n_s_alert", "NSAlert", "interface"),
        compound(vec![
            SectionDef::new(
                "property",
                vec![property("messageText", LinkedText::plain("NSString *"), true)],
            ),
            SectionDef::new(
                "public-func",
                vec![
                    method("NSAlert", "layout", LinkedText::plain("void"), vec![]),
                    method(
                        "NSAlert",
                        "addButtonWithTitle:",
                        LinkedText::reference("interface_n_s_button", "NSButton"),
                        vec![param("title", LinkedText::plain("NSString *"))],
                    ),
                ],
            ),
            SectionDef::new(
                "public-static-func",
                vec![method("NSAlert", "alertWithError:", LinkedText::plain("id"), vec![])],
            ),
        ]),
    );

    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    loader.load_index(&index)?;
    let stats = loader.finish();

    assert_eq!(stats.structs, 1);
    assert_eq!(stats.methods, 3);
    assert_eq!(stats.deferred, 0);

    let id = store.find_by_name("NSAlert").ok_or("missing NSAlert")?;
    let def = store.get(id).ok_or("slot")?;
    assert_eq!(def.kind(), EntityKind::Struct);
    let s = def.as_any().downcast_ref::<StructType>().ok_or("not a struct")?;
    assert_eq!(s.properties.len(), 1);
    assert_eq!(s.properties[0].ty, Type::String);
    assert!(s.properties[0].writable);

    let add = &s.methods[1];
    assert_eq!(add.receiver, "NSAlert");
    assert_eq!(add.ty.args[0].name, "title");
    assert_eq!(add.ty.args[0].ty, Type::String);
    let button = store.lookup("interface_n_s_button").ok_or("placeholder")?;
    assert_eq!(add.ty.ret.as_deref(), Some(&Type::Entity(button)));
    assert!(!store.is_defined(button));

    assert!(s.methods[2].is_static);
    assert_eq!(s.methods[0].ty.ret, None);
    Ok(())
}

#[test]
fn test_protocol_marker_is_trimmed() -> Result<(), Box<dyn std::error::Error>> {
    let mut m = method(
        "NSAlertDelegate -p",
        "alertShowHelp:",
        LinkedText::plain("BOOL"),
        vec![param("alert", LinkedText::plain("NSAlert *"))],
    );
    m.definition = "(BOOL) NSAlertDelegate -p::alertShowHelp:".to_string();
    let index = MemoryIndex::new().with(
        IndexEntry::new("protocol_n_s_alert_delegate-p", "NSAlertDelegate -p", "protocol"),
        compound(vec![SectionDef::new("public-func", vec![m])]),
    );

    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    loader.load_index(&index)?;
    let stats = loader.finish();

    assert_eq!(stats.protocols, 1);
    assert_eq!(stats.methods, 1);
    let id = store.find_by_name("NSAlertDelegate").ok_or("protocol")?;
    assert_eq!(store.get(id).ok_or("slot")?.kind(), EntityKind::Protocol);
    Ok(())
}

#[test]
fn test_category_methods_attach_in_second_pass() -> Result<(), Box<dyn std::error::Error>> {
    // the category entry precedes the class it extends
    let index = MemoryIndex::new()
        .with(
            IndexEntry::new("category_n_s_view_layout", "NSView(Layout)", "category"),
            compound(vec![]),
        )
        .with(
            IndexEntry::new("file_n_s_view_h", "NSView.h", "file"),
            compound(vec![SectionDef::new(
                "func",
                vec![
                    method("NSView", "layoutSubtreeIfNeeded", LinkedText::plain("void"), vec![]),
                    MemberDef {
                        kind: "function".to_string(),
                        name: "NSBeep".to_string(),
                        ty: Some(LinkedText::plain("APPKIT_EXTERN void")),
                        definition: "APPKIT_EXTERN void NSBeep".to_string(),
                        ..Default::default()
                    },
                    MemberDef {
                        kind: "define".to_string(),
                        name: "NS_VIEW_MACRO".to_string(),
                        ..Default::default()
                    },
                ],
            )]),
        )
        .with(
            IndexEntry::new("interface_n_s_view", "NSView", "interface"),
            compound(vec![SectionDef::new(
                "public-func",
                vec![method("NSView", "layout", LinkedText::plain("void"), vec![])],
            )]),
        );

    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    loader.load_index(&index)?;
    assert_eq!(loader.pending().len(), 1);
    let stats = loader.finish();

    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.files, 1);
    assert_eq!(stats.deferred, 1);
    assert_eq!(stats.attached, 1);
    assert_eq!(stats.unattached, 0);
    assert_eq!(stats.free_functions, 1);
    assert_eq!(methods_of(&store, "NSView"), vec!["layout", "layoutSubtreeIfNeeded"]);

    let beep = &store.functions()[0];
    assert_eq!(beep.name(), "NSBeep");
    assert!(beep.is_extern);
    assert_eq!(beep.ty.ret, None);
    Ok(())
}

#[test]
fn test_unknown_receiver_is_counted() -> Result<(), Box<dyn std::error::Error>> {
    let index = MemoryIndex::new().with(
        IndexEntry::new("file_x", "NSGhost.h", "file"),
        compound(vec![SectionDef::new(
            "func",
            vec![method("NSGhost", "boo", LinkedText::plain("void"), vec![])],
        )]),
    );
    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    loader.load_index(&index)?;
    let stats = loader.finish();
    assert_eq!(stats.unattached, 1);
    assert_eq!(stats.attached, 0);
    Ok(())
}

#[test]
fn test_duplicate_methods_keep_first() -> Result<(), Box<dyn std::error::Error>> {
    let first = method(
        "NSAlert",
        "runModal",
        LinkedText::plain("NSInteger"),
        vec![],
    );
    let second = method("NSAlert", "runModal", LinkedText::plain("BOOL"), vec![]);
    let index = MemoryIndex::new().with(
        IndexEntry::new("interface_n_s_alert", "NSAlert", "interface"),
        compound(vec![SectionDef::new("public-func", vec![first, second])]),
    );
    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    loader.load_index(&index)?;
    let stats = loader.finish();

    assert_eq!(stats.duplicate_methods, 1);
    let id = store.find_by_name("NSAlert").ok_or("missing")?;
    let s = store
        .get(id)
        .and_then(|d| d.as_any().downcast_ref::<StructType>())
        .ok_or("not a struct")?;
    assert_eq!(s.methods.len(), 1);
    assert_eq!(s.methods[0].ty.ret.as_deref(), Some(&Type::primitive("int")));
    Ok(())
}

#[test]
fn test_union_cannot_host_methods() {
    let attr = MemberDef {
        kind: "variable".to_string(),
        name: "bits".to_string(),
        ty: Some(LinkedText::plain("uint32_t")),
        ..Default::default()
    };
    let index = MemoryIndex::new().with(
        IndexEntry::new("union_fast", "NSFastUnion", "union"),
        compound(vec![
            SectionDef::new("protected-static-attrib", vec![attr]),
            SectionDef::new(
                "public-func",
                vec![method("NSFastUnion", "reset", LinkedText::plain("void"), vec![])],
            ),
        ]),
    );
    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    let err = loader.load_index(&index).unwrap_err();
    match &err {
        ParserError::UnsupportedSection {
            entity,
            kind,
            capability,
            section,
        } => {
            assert_eq!(entity, "NSFastUnion");
            assert_eq!(*kind, EntityKind::Union);
            assert_eq!(*capability, Capability::Methods);
            assert_eq!(section, "public-func");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.to_string().contains("cannot host methods"));
}

#[test]
fn test_protocol_cannot_host_attributes() {
    let index = MemoryIndex::new().with(
        IndexEntry::new("protocol_p", "NSCopying -p", "protocol"),
        compound(vec![SectionDef::new("public-attrib", vec![])]),
    );
    let mut store = EntityStore::new();
    let err = Loader::new(&mut store).load_index(&index).unwrap_err();
    assert!(matches!(
        err,
        ParserError::UnsupportedSection {
            capability: Capability::Attributes,
            ..
        }
    ));
}

#[test]
fn test_duplicate_definition_is_fatal() {
    let entry = IndexEntry::new("interface_a", "NSA", "interface");
    let index = MemoryIndex::new()
        .with(entry.clone(), compound(vec![]))
        .with(entry, compound(vec![]));
    let mut store = EntityStore::new();
    let err = Loader::new(&mut store).load_index(&index).unwrap_err();
    assert!(matches!(err, ParserError::Core(_)));
}

#[test]
fn test_attribute_arrays_and_params() -> Result<(), Box<dyn std::error::Error>> {
    let attr = MemberDef {
        kind: "variable".to_string(),
        name: "_reserved".to_string(),
        ty: Some(LinkedText::plain("unsigned int")),
        argsstring: "[4]".to_string(),
        ..Default::default()
    };
    let mut m = method("NSColor", "getComponents:", LinkedText::plain("void"), vec![]);
    m.params.push(ParamDef {
        declname: "components".to_string(),
        ty: Some(LinkedText::plain("CGFloat")),
        array: "[4]".to_string(),
    });
    let index = MemoryIndex::new().with(
        IndexEntry::new("interface_n_s_color", "NSColor", "class"),
        compound(vec![
            SectionDef::new("private-attrib", vec![attr]),
            SectionDef::new("public-func", vec![m]),
        ]),
    );
    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    loader.load_index(&index)?;
    loader.finish();

    let id = store.find_by_name("NSColor").ok_or("missing")?;
    let def = store.get(id).ok_or("slot")?;
    assert_eq!(def.kind(), EntityKind::Class);
    let s = def.as_any().downcast_ref::<StructType>().ok_or("not a struct")?;
    assert_eq!(
        s.attributes[0].ty,
        Type::array(Type::primitive("uint"), "4")
    );
    assert_eq!(
        s.methods[0].ty.args[0].ty,
        Type::array(Type::primitive("float64"), "4")
    );
    Ok(())
}

#[test]
fn test_cyclic_references_in_either_order() -> Result<(), Box<dyn std::error::Error>> {
    let window = || {
        (
            IndexEntry::new("interface_n_s_window", "NSWindow", "interface"),
            compound(vec![SectionDef::new(
                "property",
                vec![property(
                    "contentView",
                    LinkedText::reference("interface_n_s_view", "NSView"),
                    true,
                )],
            )]),
        )
    };
    let view = || {
        (
            IndexEntry::new("interface_n_s_view", "NSView", "interface"),
            compound(vec![SectionDef::new(
                "property",
                vec![property(
                    "window",
                    LinkedText::reference("interface_n_s_window", "NSWindow"),
                    false,
                )],
            )]),
        )
    };

    for forward in [true, false] {
        let (a, b) = if forward { (window(), view()) } else { (view(), window()) };
        let index = MemoryIndex::new().with(a.0, a.1).with(b.0, b.1);
        let mut store = EntityStore::new();
        let mut loader = Loader::new(&mut store);
        loader.load_index(&index)?;
        loader.finish();

        assert!(store.unresolved().is_empty());
        let w = store.find_by_name("NSWindow").ok_or("window")?;
        let v = store.find_by_name("NSView").ok_or("view")?;
        let ws = store
            .get(w)
            .and_then(|d| d.as_any().downcast_ref::<StructType>())
            .ok_or("window struct")?;
        assert_eq!(ws.properties[0].ty, Type::Entity(v));
        assert_eq!(
            ws.properties[0].ty.host_name(&store),
            Ok("NSView".to_string())
        );
    }
    Ok(())
}

#[test]
fn test_malformed_signatures_degrade_to_unknown() -> Result<(), Box<dyn std::error::Error>> {
    let index = MemoryIndex::new()
        .with(
            IndexEntry::new("interface_n_s_x", "NSX", "interface"),
            compound(vec![
                SectionDef::new(
                    "property",
                    vec![
                        property("weird", LinkedText::plain("int ]"), false),
                        property("ok", LinkedText::plain("int"), false),
                    ],
                ),
                SectionDef::new(
                    "public-func",
                    vec![method(
                        "NSX",
                        "setFrame:",
                        LinkedText::plain("void"),
                        vec![param("frame", LinkedText::plain("(NSRect"))],
                    )],
                ),
            ]),
        )
        .with(
            IndexEntry::new("interface_n_s_button", "NSButton", "interface"),
            compound(vec![]),
        );

    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    loader.load_index(&index)?;
    let stats = loader.finish();

    assert_eq!(stats.structs, 2);
    assert_eq!(stats.malformed, 2);

    let id = store.find_by_name("NSX").ok_or("missing NSX")?;
    let s = store
        .get(id)
        .ok_or("slot")?
        .as_any()
        .downcast_ref::<StructType>()
        .ok_or("not a struct")?;
    assert_eq!(
        s.properties[0].ty,
        Type::unknown_with_comment("int ]", "malformed")
    );
    assert_eq!(s.properties[1].ty, Type::primitive("int"));
    assert!(matches!(
        s.methods[0].ty.args[0].ty,
        Type::Unknown { ref comment, .. } if comment == "malformed"
    ));
    assert!(store.find_by_name("NSButton").is_some());
    Ok(())
}
