// src/sema/analyzer/declarations.rs
//
// Variable declarations and function bodies.

use std::rc::Rc;

use crate::errors::{InternalError, SemanticError};
use crate::frontend::*;
use crate::sema::analyze_info::{FuncTemplate, NodeInfo, VarDeclElemInfo};
use crate::sema::scope::{FuncContext, ReturnType};
use crate::sema::types::TypeValue;

use super::{AnalyzeResult, Checker, recover};

impl Checker<'_> {
    /// Analyze `decl`, recording its elements under `node`. An element that
    /// fails is reported and skipped; the rest are still declared.
    pub(super) fn analyze_var_decl(&mut self, node: NodeId, decl: &VarDecl) -> AnalyzeResult<()> {
        let declared = self.type_exp(&decl.ty)?;
        let mut elems = Vec::with_capacity(decl.elems.len());
        for elem in &decl.elems {
            if let Some(info) = recover(self.analyze_var_elem(node, &declared, elem))? {
                elems.push(info);
            }
        }
        self.record(node, NodeInfo::VarDecl { elems })?;
        Ok(())
    }

    fn analyze_var_elem(
        &mut self,
        node: NodeId,
        declared: &TypeValue,
        elem: &VarDeclElement,
    ) -> AnalyzeResult<VarDeclElemInfo> {
        let ty = match (declared, &elem.init) {
            (TypeValue::Var, None) => {
                return self.fail(
                    SemanticError::CannotInferVar {
                        name: elem.name.clone(),
                        span: elem.span.into(),
                    },
                    node,
                    elem.span,
                );
            }
            (TypeValue::Var, Some(init)) => self.analyze_value(init, None)?,
            (TypeValue::Void, _) => {
                return self.fail(SemanticError::VoidValueUsed { span: elem.span.into() }, node, elem.span);
            }
            (declared, None) => declared.clone(),
            (declared, Some(init)) => {
                // A bad initializer still declares the name, so later uses don't cascade
                if let Some(found) = recover(self.analyze_value(init, Some(declared)))? {
                    self.check_assignable(declared, &found, init)?;
                }
                declared.clone()
            }
        };

        let storage = self.declare_var(&elem.name, ty.clone());
        tracing::trace!(name = %elem.name, ty = %ty, ?storage, "declared");
        Ok(VarDeclElemInfo {
            name: Rc::from(elem.name.as_str()),
            storage,
            ty,
        })
    }

    /// Analyze the body of a script function against its registered signature.
    pub(super) fn analyze_func_decl(&mut self, decl: &FuncDecl) -> Result<(), InternalError> {
        let id = self.metadata.current().item_id(&decl.name, decl.type_params.len());
        // Missing when the signature failed; duplicates are analyzed once
        let Some(info) = self.metadata.get_func_info(&id) else {
            return Ok(());
        };
        if !self.analyzed_funcs.insert(id.clone()) {
            return Ok(());
        }
        if info.is_sequence && !self.allow_sequence_funcs {
            let error = SemanticError::Unsupported {
                feature: "sequence functions".to_string(),
                span: decl.span.into(),
            };
            self.add_error(error, decl.id, decl.span);
            return Ok(());
        }

        let _span = tracing::debug_span!("func", %id).entered();
        let ctx = FuncContext::new(id.clone(), ReturnType::Declared(info.ret_type.clone()), info.is_sequence);
        let (result, ctx) = self.in_func_context(ctx, |this| {
            for (param, ty) in decl.params.iter().zip(&info.param_types) {
                this.ctx.add_local(&param.name, ty.clone());
            }
            this.analyze_stmt(&decl.body)
        });
        result?;

        self.info.add_template(FuncTemplate {
            id,
            local_var_count: ctx.local_count(),
            ret_type: Some(info.ret_type.clone()),
            is_this_call: false,
            is_sequence: info.is_sequence,
            body: decl.body.id,
        });
        Ok(())
    }
}
