//! Protocols: a Go interface, a registered runtime class that forwards
//! every selector to a Go value implementing it, and the `init` hook that
//! registers that class.

use super::{analyze, go_quote, write_entity_comment, Direction, GoCodegen, Return, Signature, Skip};
use crate::error::{CodegenError, ErrorCategory};
use crate::outcome::EntitySummary;
use objgen_core::naming::protocol_method_name;
use objgen_core::{EntityStore, Function, ProtocolType, TypeDefinition};
use std::fmt::Write;

impl GoCodegen {
    pub(crate) fn emit_protocol(
        &mut self,
        out: &mut String,
        p: &ProtocolType,
        store: &EntityStore,
    ) -> Result<EntitySummary, CodegenError> {
        let Some(name) = p.base.host_name() else {
            return Ok(EntitySummary::new(p.base.refid.clone(), p.kind())
                .skip("referenced but never defined"));
        };
        let mut summary = EntitySummary::new(p.base.name.clone(), p.kind());

        let mut accepted: Vec<(&Function, Signature<'_>)> = Vec::with_capacity(p.methods.len());
        for method in &p.methods {
            if method.is_static {
                let skip = Skip::new(
                    ErrorCategory::Unsupported,
                    "class methods cannot be implemented by a Go value",
                );
                self.skip_member(&mut summary, method.name(), skip);
                continue;
            }
            match analyze(&method.ty, store, Direction::Callback) {
                Ok(sig) => {
                    self.record_return(&mut summary, method.name(), &sig.ret);
                    accepted.push((method, sig));
                }
                Err(skip) => self.skip_member(&mut summary, method.name(), skip),
            }
        }

        writeln!(out)?;
        write_entity_comment(out, &p.base)?;
        writeln!(out, "type {} interface {{", name)?;
        writeln!(out, "\tobjc.Object")?;
        writeln!(out, "\tSetObjcRef(v objc.Object)")?;
        if !accepted.is_empty() {
            writeln!(out)?;
        }
        for (method, sig) in &accepted {
            let go_name = protocol_method_name(method.name());
            let params = sig.param_list();
            match &sig.ret {
                Return::Void => writeln!(out, "\t{}({})", go_name, params)?,
                Return::Typed { go_type, .. } => {
                    writeln!(out, "\t{}({}) {}", go_name, params, go_type)?
                }
                Return::Untyped { go_type } => {
                    writeln!(out, "\t{}({}) /* TODO: {} */", go_name, params, go_type)?
                }
                Return::Unrepresentable { partial } => {
                    writeln!(out, "\t// FIXME: return {}", partial)?;
                    writeln!(out, "\t{}({})", go_name, params)?;
                }
            }
        }
        writeln!(out, "}}")?;

        writeln!(out)?;
        writeln!(out, "type go{} struct {{", name)?;
        writeln!(out, "\tobjc.Object `objc:\"go{} : {}\"`", name, p.base.name)?;
        writeln!(out, "\tv {}", name)?;
        writeln!(out, "}}")?;

        for (method, sig) in &accepted {
            let go_name = protocol_method_name(method.name());
            let params = sig
                .params
                .iter()
                .map(|p| format!("{} objc.Object", p.name))
                .collect::<Vec<_>>()
                .join(", ");
            let args = sig
                .params
                .iter()
                .map(|p| p.pass.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let call = format!("o.v.{}({})", go_name, args);

            writeln!(out)?;
            match &sig.ret {
                Return::Typed { go_type, ty } => {
                    let ret = ty.cast_to_native(&call, store).unwrap_or_else(|| call.clone());
                    // a converted value is handed back as a plain object
                    let ret_type = if ret == call { go_type.as_str() } else { "objc.Object" };
                    writeln!(out, "func (o go{}) {}({}) {} {{", name, go_name, params, ret_type)?;
                    writeln!(out, "\treturn {}", ret)?;
                }
                _ => {
                    writeln!(out, "func (o go{}) {}({}) {{", name, go_name, params)?;
                    writeln!(out, "\t{}", call)?;
                }
            }
            writeln!(out, "}}")?;
        }

        writeln!(out)?;
        writeln!(out, "func init() {{")?;
        writeln!(out, "\tc := objc.NewClass(go{}{{}})", name)?;
        for (method, _) in &accepted {
            writeln!(
                out,
                "\tc.AddMethod({}, go{}.{})",
                go_quote(method.name()),
                name,
                protocol_method_name(method.name())
            )?;
        }
        writeln!(out, "\tobjc.RegisterClass(c)")?;
        writeln!(out, "}}")?;
        Ok(summary)
    }
}
