//! Go wrapper generator
//!
//! Emits one Go source file for a loaded [`EntityStore`]: a wrapper type per
//! class, an interface plus registered implementation per protocol, and
//! stubs for free functions. Output goes through the runtime bridge
//! (`objc.GetClass`, `SendMsg`, `objc.NewClass`).
//!
//! Generation is best-effort per member. A member whose arguments cannot be
//! spelled or cast is left out; a member whose return alone is the problem
//! is emitted with a comment-only return annotation. Both cases land in
//! [`Diagnostics`] and the [`RunSummary`].

mod function;
mod object;
mod protocol;

use crate::error::{CodegenError, Diagnostic, Diagnostics, ErrorCategory};
use crate::outcome::{EntitySummary, MemberOutcome, RunSummary};
use crate::Codegen;
use objgen_core::naming::to_local_name;
use objgen_core::{
    BaseNode, EntityId, EntityStore, FuncType, ProtocolType, StructType, Type, TypeDefinition,
};
use std::fmt::Write;
use tracing::{debug, info, trace};

pub const DEFAULT_PACKAGE: &str = "appkit";
pub const DEFAULT_RUNTIME_IMPORT: &str = "github.com/mkrautz/objc";
pub const DEFAULT_FOUNDATION_IMPORT: &str = "github.com/mkrautz/objc/Foundation";

/// Configuration for Go code generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoCodegenConfig {
    /// Go package name of the generated file
    pub package: String,
    /// Import path of the runtime bridge (package `objc`)
    pub runtime_import: String,
    /// Import path of the bridge's Foundation package (package `foundation`)
    pub foundation_import: String,
    /// Source names of the entities to emit; empty means everything
    pub classes: Vec<String>,
}

impl Default for GoCodegenConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            runtime_import: DEFAULT_RUNTIME_IMPORT.to_string(),
            foundation_import: DEFAULT_FOUNDATION_IMPORT.to_string(),
            classes: Vec::new(),
        }
    }
}

/// Go code generator
#[derive(Debug, Default)]
pub struct GoCodegen {
    config: GoCodegenConfig,
    diagnostics: Diagnostics,
    summary: RunSummary,
}

impl GoCodegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: GoCodegenConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GoCodegenConfig {
        &self.config
    }

    /// Diagnostics of the last [`Codegen::generate`] call.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Outcome summary of the last [`Codegen::generate`] call.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    fn select<'a>(
        &self,
        store: &'a EntityStore,
    ) -> Result<Vec<(EntityId, &'a dyn TypeDefinition)>, CodegenError> {
        let all = store.iter_sorted();
        if self.config.classes.is_empty() {
            return Ok(all);
        }
        let mut wanted = Vec::with_capacity(self.config.classes.len());
        for name in &self.config.classes {
            let id = store
                .find_by_name(name)
                .ok_or_else(|| CodegenError::UnknownEntity(name.clone()))?;
            wanted.push(id);
        }
        Ok(all
            .into_iter()
            .filter(|(id, _)| wanted.contains(id))
            .collect())
    }

    fn write_header(&self, out: &mut String) -> Result<(), CodegenError> {
        writeln!(out, "package {}", self.config.package)?;
        writeln!(out)?;
        writeln!(out, "import (")?;
        writeln!(out, "\t{}", go_quote(&self.config.runtime_import))?;
        writeln!(out, "\t{}", go_quote(&self.config.foundation_import))?;
        writeln!(out, ")")?;
        writeln!(out)?;
        writeln!(out, "var _ objc.Object")?;
        writeln!(out, "var _ = foundation.NSStringFromString")?;
        Ok(())
    }

    fn skip_member(&mut self, summary: &mut EntitySummary, member: &str, skip: Skip) {
        trace!("skipping {:?}: {}", member, skip.reason);
        self.diagnostics
            .add_member(skip.category, member, skip.reason.clone());
        summary.record(member, MemberOutcome::Skipped(skip.reason));
    }

    fn record_return(&mut self, summary: &mut EntitySummary, member: &str, ret: &Return<'_>) {
        let (category, reason) = match ret {
            Return::Void | Return::Typed { .. } => {
                summary.record(member, MemberOutcome::Emitted);
                return;
            }
            Return::Untyped { go_type } => (
                ErrorCategory::MissingCast,
                format!("return type {} has no bridge cast", go_type),
            ),
            Return::Unrepresentable { partial } => (
                ErrorCategory::UnrepresentableType,
                format!("return type {} has no Go spelling", partial),
            ),
        };
        trace!("advisory for {:?}: {}", member, reason);
        self.diagnostics.add_member(category, member, reason.clone());
        summary.record(member, MemberOutcome::Advisory(reason));
    }
}

impl Codegen for GoCodegen {
    fn generate(&mut self, store: &EntityStore) -> Result<String, CodegenError> {
        self.diagnostics.clear();
        self.summary = RunSummary::new();

        let selected = self.select(store)?;
        let mut output = String::new();
        self.write_header(&mut output)?;

        for (id, def) in selected {
            self.diagnostics.set_entity_context(def.base().name.clone());
            let any = def.as_any();
            let summary = if let Some(s) = any.downcast_ref::<StructType>() {
                self.emit_struct(&mut output, s, store)?
            } else if let Some(p) = any.downcast_ref::<ProtocolType>() {
                self.emit_protocol(&mut output, p, store)?
            } else {
                let reason = format!("{} has no Go layout", def.kind());
                self.diagnostics
                    .add(Diagnostic::new(ErrorCategory::NoHostLayout, reason.clone()));
                EntitySummary::new(def.base().name.clone(), def.kind()).skip(reason)
            };
            debug!(
                "{} {:?} ({}): {} emitted, {} advisory, {} skipped",
                summary.kind,
                summary.name,
                id,
                summary.emitted(),
                summary.advisory(),
                summary.skipped_members()
            );
            self.summary.entities.push(summary);
        }
        self.diagnostics.clear_context();

        // free functions only in unfiltered runs
        if self.config.classes.is_empty() {
            self.emit_functions(&mut output, store)?;
        }

        let totals = self.summary.totals();
        info!(
            "generated {} entities ({} skipped): {} members emitted, {} advisory, {} skipped",
            totals.entities,
            totals.skipped_entities,
            totals.emitted,
            totals.advisory,
            totals.skipped
        );
        Ok(output)
    }
}

/// Why a member produced no output
#[derive(Debug, Clone)]
pub(crate) struct Skip {
    pub category: ErrorCategory,
    pub reason: String,
}

impl Skip {
    pub fn new(category: ErrorCategory, reason: impl Into<String>) -> Self {
        Self {
            category,
            reason: reason.into(),
        }
    }
}

/// Which way values cross the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Go calls into the runtime: arguments go native, the result comes back
    Call,
    /// The runtime calls into Go: arguments come in, the result goes native
    Callback,
}

#[derive(Debug)]
pub(crate) struct Param {
    pub name: String,
    pub go_type: String,
    /// Argument expression after the bridge cast
    pub pass: String,
}

#[derive(Debug)]
pub(crate) enum Return<'t> {
    Void,
    Typed { go_type: String, ty: &'t Type },
    /// Spelled, but nothing casts it across the bridge
    Untyped { go_type: String },
    Unrepresentable { partial: String },
}

#[derive(Debug)]
pub(crate) struct Signature<'t> {
    pub params: Vec<Param>,
    pub ret: Return<'t>,
}

impl Signature<'_> {
    /// `name type, name type`
    pub fn param_list(&self) -> String {
        self.params
            .iter()
            .map(|p| format!("{} {}", p.name, p.go_type))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn param_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        return format!("arg{}", index);
    }
    let local = to_local_name(name);
    // `o` is the receiver of every generated method
    if local == "o" {
        format!("{}_", local)
    } else {
        local
    }
}

/// Work out how a function crosses the bridge in `direction`.
pub(crate) fn analyze<'t>(
    func: &'t FuncType,
    store: &EntityStore,
    direction: Direction,
) -> Result<Signature<'t>, Skip> {
    let mut params = Vec::with_capacity(func.args.len());
    for (i, arg) in func.args.iter().enumerate() {
        let name = param_name(&arg.name, i);
        let go_type = arg.ty.host_name(store).map_err(|e| {
            Skip::new(
                ErrorCategory::UnrepresentableType,
                format!("argument {} has no Go spelling: {}", name, e.partial),
            )
        })?;
        let native = arg.ty.cast_to_native(&name, store).ok_or_else(|| {
            Skip::new(
                ErrorCategory::MissingCast,
                format!("argument {} of type {} has no bridge cast", name, go_type),
            )
        })?;
        let pass = match direction {
            Direction::Call => native,
            // no host cast hands the raw object through
            Direction::Callback => arg
                .ty
                .cast_to_host(&name, store)
                .unwrap_or_else(|| name.clone()),
        };
        params.push(Param {
            name,
            go_type,
            pass,
        });
    }

    let ret = match func.ret.as_deref() {
        None => Return::Void,
        Some(ty) => match ty.host_name(store) {
            Err(e) => Return::Unrepresentable { partial: e.partial },
            Ok(go_type) => {
                let castable = match direction {
                    Direction::Call => ty.cast_to_host("v", store).is_some(),
                    Direction::Callback => ty.cast_to_native("v", store).is_some(),
                };
                if castable {
                    Return::Typed { go_type, ty }
                } else {
                    Return::Untyped { go_type }
                }
            }
        },
    };
    Ok(Signature { params, ret })
}

/// `// Name (file:line)`
pub(crate) fn write_entity_comment(out: &mut String, base: &BaseNode) -> std::fmt::Result {
    match &base.location {
        Some(loc) => writeln!(out, "// {} ({})", base.name, loc),
        None => writeln!(out, "// {}", base.name),
    }
}

/// Go interpreted string literal.
pub(crate) fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
