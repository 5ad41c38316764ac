//! Free function stubs

use super::GoCodegen;
use crate::error::{CodegenError, ErrorCategory};
use crate::outcome::{MemberOutcome, MemberReport};
use objgen_core::naming::to_exported_name;
use objgen_core::{EntityStore, Function};
use std::collections::HashSet;
use std::fmt::Write;
use tracing::trace;

impl GoCodegen {
    /// One stub per free function, in name order. Only fully representable
    /// signatures are written; calling through cgo is left to the user.
    pub(crate) fn emit_functions(
        &mut self,
        out: &mut String,
        store: &EntityStore,
    ) -> Result<(), CodegenError> {
        let mut functions: Vec<&Function> = store.functions().iter().collect();
        functions.sort_by(|a, b| a.name().cmp(b.name()));

        let mut seen = HashSet::new();
        for function in functions {
            let go_name = to_exported_name(function.name());
            if !seen.insert(go_name.clone()) {
                self.skip_function(
                    function,
                    ErrorCategory::Duplicate,
                    format!("{} is already declared", go_name),
                );
                continue;
            }
            let sig = match function.ty.render_signature(store) {
                Ok(sig) => sig,
                Err(e) => {
                    self.skip_function(
                        function,
                        ErrorCategory::UnrepresentableType,
                        format!("signature has no Go spelling: {}", e.partial),
                    );
                    continue;
                }
            };

            writeln!(out)?;
            match &function.base.location {
                Some(loc) => writeln!(out, "// {} ({})", function.name(), loc)?,
                None => writeln!(out, "// {}", function.name())?,
            }
            writeln!(out, "func {}{} {{", go_name, sig)?;
            writeln!(out, "\tpanic(\"not implemented\")")?;
            writeln!(out, "}}")?;
            self.summary.functions.push(MemberReport {
                name: function.name().to_string(),
                outcome: MemberOutcome::Emitted,
            });
        }
        Ok(())
    }

    fn skip_function(&mut self, function: &Function, category: ErrorCategory, reason: String) {
        trace!("skipping function {:?}: {}", function.name(), reason);
        self.diagnostics
            .add_member(category, function.name(), reason.clone());
        self.summary.functions.push(MemberReport {
            name: function.name().to_string(),
            outcome: MemberOutcome::Skipped(reason),
        });
    }
}
