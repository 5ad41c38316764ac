//! Class wrappers

use super::{analyze, go_quote, write_entity_comment, Direction, GoCodegen, Return, Skip};
use crate::error::{CodegenError, ErrorCategory};
use crate::outcome::{EntitySummary, MemberOutcome};
use objgen_core::naming::{method_name, setter_selector, to_exported_name};
use objgen_core::{EntityStore, Function, Property, StructType, TypeDefinition};
use std::fmt::Write;

impl GoCodegen {
    /// Wrapper struct, constructors, setters and message sends for a class.
    pub(crate) fn emit_struct(
        &mut self,
        out: &mut String,
        s: &StructType,
        store: &EntityStore,
    ) -> Result<EntitySummary, CodegenError> {
        let Some(name) = s.base.host_name() else {
            return Ok(EntitySummary::new(s.base.refid.clone(), s.kind())
                .skip("referenced but never defined"));
        };
        let mut summary = EntitySummary::new(s.base.name.clone(), s.kind());

        writeln!(out)?;
        write_entity_comment(out, &s.base)?;
        writeln!(out, "type {} struct {{", name)?;
        writeln!(out, "\tobjc.Object")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "func New{0}() {0} {{", name)?;
        writeln!(
            out,
            "\treturn As{}(objc.GetClass({}).SendMsg(\"alloc\").SendMsg(\"init\"))",
            name,
            go_quote(&s.base.name)
        )?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "func As{0}(v objc.Object) {0} {{", name)?;
        writeln!(out, "\treturn {}{{v}}", name)?;
        writeln!(out, "}}")?;

        for prop in s.properties.iter().filter(|p| p.writable) {
            self.emit_setter(out, name, prop, store, &mut summary)?;
        }
        for method in &s.methods {
            self.emit_method(out, name, &s.base.name, method, store, &mut summary)?;
        }
        Ok(summary)
    }

    fn emit_setter(
        &mut self,
        out: &mut String,
        receiver: &str,
        prop: &Property,
        store: &EntityStore,
        summary: &mut EntitySummary,
    ) -> Result<(), CodegenError> {
        let selector = setter_selector(&prop.name);
        let go_type = match prop.ty.host_name(store) {
            Ok(t) => t,
            Err(e) => {
                let skip = Skip::new(
                    ErrorCategory::UnrepresentableType,
                    format!("property type has no Go spelling: {}", e.partial),
                );
                self.skip_member(summary, &selector, skip);
                return Ok(());
            }
        };
        let Some(cast) = prop.ty.cast_to_native("v", store) else {
            let skip = Skip::new(
                ErrorCategory::MissingCast,
                format!("property type {} has no bridge cast", go_type),
            );
            self.skip_member(summary, &selector, skip);
            return Ok(());
        };

        writeln!(out)?;
        writeln!(
            out,
            "func (o {}) Set{}(v {}) {{",
            receiver,
            to_exported_name(&prop.name),
            go_type
        )?;
        writeln!(out, "\to.SendMsg({}, {})", go_quote(&selector), cast)?;
        writeln!(out, "}}")?;
        summary.record(selector, MemberOutcome::Emitted);
        Ok(())
    }

    fn emit_method(
        &mut self,
        out: &mut String,
        receiver: &str,
        class_name: &str,
        method: &Function,
        store: &EntityStore,
        summary: &mut EntitySummary,
    ) -> Result<(), CodegenError> {
        let sig = match analyze(&method.ty, store, Direction::Call) {
            Ok(sig) => sig,
            Err(skip) => {
                self.skip_member(summary, method.name(), skip);
                return Ok(());
            }
        };

        let args: String = sig
            .params
            .iter()
            .map(|p| format!(", {}", p.pass))
            .collect();
        // class methods become package functions prefixed with the class
        let (decl, target) = if method.is_static {
            (
                format!("func {}{}", receiver, method_name(method.name())),
                format!("objc.GetClass({})", go_quote(class_name)),
            )
        } else {
            (
                format!("func (o {}) {}", receiver, method_name(method.name())),
                "o".to_string(),
            )
        };
        let call = format!("{}.SendMsg({}{})", target, go_quote(method.name()), args);

        writeln!(out)?;
        write!(out, "{}({})", decl, sig.param_list())?;
        match &sig.ret {
            Return::Void => {
                writeln!(out, " {{")?;
                writeln!(out, "\t{}", call)?;
            }
            Return::Typed { go_type, ty } => {
                let body = match ty.cast_to_host(&call, store) {
                    Some(cast) => format!("return {}", cast),
                    None => call,
                };
                writeln!(out, " {} {{", go_type)?;
                writeln!(out, "\t{}", body)?;
            }
            Return::Untyped { go_type } => {
                writeln!(out, " /* TODO: {} */ {{", go_type)?;
                writeln!(out, "\t{}", call)?;
            }
            Return::Unrepresentable { partial } => {
                writeln!(out, " {{")?;
                writeln!(out, "\t{}", call)?;
                writeln!(out, "\t// FIXME: return {}", partial)?;
            }
        }
        writeln!(out, "}}")?;
        self.record_return(summary, method.name(), &sig.ret);
        Ok(())
    }
}
