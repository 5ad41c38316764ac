//! Shared naming utilities for turning native names into Go identifiers.
//!
//! Every function here is idempotent: feeding an already converted name back
//! in returns it unchanged. Entity names are memoized on [`BaseNode`] so the
//! conversion runs once per entity.
//!
//! [`BaseNode`]: crate::entity::BaseNode

/// Go keywords that cannot be used as identifiers.
const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Replace every character that cannot appear in a Go identifier with `_`.
///
/// # Examples
/// ```
/// use objgen_core::naming::to_host_ident;
/// assert_eq!(to_host_ident("NSAlert"), "NSAlert");
/// assert_eq!(to_host_ident("initWithFrame:"), "initWithFrame_");
/// assert_eq!(to_host_ident("NSView(Layout)"), "NSView_Layout_");
/// ```
pub fn to_host_ident(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Convert a native member name into an exported (upper case) Go name.
///
/// # Examples
/// ```
/// use objgen_core::naming::to_exported_name;
/// assert_eq!(to_exported_name("title"), "Title");
/// assert_eq!(to_exported_name("setTitle:"), "SetTitle_");
/// ```
pub fn to_exported_name(name: &str) -> String {
    to_go_name(name, true)
}

/// Convert a native name into an unexported Go name, avoiding keywords.
///
/// # Examples
/// ```
/// use objgen_core::naming::to_local_name;
/// assert_eq!(to_local_name("Frame"), "frame");
/// assert_eq!(to_local_name("type"), "typ");
/// assert_eq!(to_local_name("func"), "func_");
/// ```
pub fn to_local_name(name: &str) -> String {
    to_go_name(name, false)
}

fn to_go_name(name: &str, exported: bool) -> String {
    if name.is_empty() {
        return String::new();
    }
    let name = to_host_ident(name);
    let mut chars = name.chars();
    let name = match chars.next() {
        None => return String::new(),
        Some(first) if exported => first.to_uppercase().collect::<String>() + chars.as_str(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    };
    match name.as_str() {
        "type" => "typ".to_string(),
        "select" => "sel".to_string(),
        "range" => "rng".to_string(),
        kw if GO_KEYWORDS.contains(&kw) => format!("{}_", kw),
        _ => name,
    }
}

/// Go method name for an instance method selector.
///
/// A trailing `:` becomes a trailing `_`, so `title` and `title:` never
/// collide.
///
/// # Examples
/// ```
/// use objgen_core::naming::method_name;
/// assert_eq!(method_name("addButtonWithTitle:"), "AddButtonWithTitle_");
/// assert_eq!(method_name("beginSheetModalForWindow:completionHandler:"), "BeginSheetModalForWindow_completionHandler_");
/// assert_eq!(method_name("layout"), "Layout");
/// ```
pub fn method_name(selector: &str) -> String {
    to_exported_name(selector)
}

/// Go method name for a protocol requirement: the trailing `:` is dropped.
///
/// # Examples
/// ```
/// use objgen_core::naming::protocol_method_name;
/// assert_eq!(protocol_method_name("alertShowHelp:"), "AlertShowHelp");
/// assert_eq!(protocol_method_name("alert:didEnd:"), "Alert_didEnd");
/// ```
pub fn protocol_method_name(selector: &str) -> String {
    to_exported_name(selector.strip_suffix(':').unwrap_or(selector))
}

/// Objective-C setter selector for a property: `title` -> `setTitle:`.
pub fn setter_selector(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => format!("set{}{}:", first.to_uppercase(), chars.as_str()),
    }
}
