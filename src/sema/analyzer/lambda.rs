// src/sema/analyzer/lambda.rs
//
// Lambdas and capture planning. A lambda body is analyzed as its own
// function: captured variables take the first local slots, parameters follow.

use std::rc::Rc;

use crate::errors::SemanticError;
use crate::frontend::*;
use crate::sema::analyze_info::{CaptureInfo, CapturedVar, FuncTemplate, NodeInfo, StorageInfo};
use crate::sema::capture::{CaptureAnalyzer, CaptureResult};
use crate::sema::scope::{FuncContext, ReturnType};
use crate::sema::types::TypeValue;

use super::identifier::{Lookup, Resolved};
use super::{Abort, AnalyzeResult, Checker, recover};

impl Checker<'_> {
    /// Map capture candidates onto storage in the current function. Only
    /// locals need capturing; globals, functions and types stay reachable,
    /// and unresolved names are reported when the body is analyzed.
    pub(super) fn plan_captures(
        &mut self,
        captures: &CaptureResult,
        node: NodeId,
        span: Span,
    ) -> AnalyzeResult<CaptureInfo> {
        let mut info = CaptureInfo::default();
        let mut failed = false;
        for (name, kind) in captures.iter() {
            match self.lookup_identifier(name, &[]) {
                Lookup::Found(Resolved::Var {
                    storage: storage @ StorageInfo::Local(_),
                    ty,
                }) => {
                    tracing::trace!(name, ?kind, ?storage, "capture");
                    info.captures.push(CapturedVar {
                        name: Rc::from(name),
                        kind,
                        storage,
                        ty,
                    });
                }
                Lookup::Found(Resolved::Var {
                    storage: StorageInfo::StaticMember { .. } | StorageInfo::InstanceMember { .. },
                    ..
                }) => {
                    self.add_error(
                        SemanticError::CaptureUnsupported {
                            name: name.to_string(),
                            span: span.into(),
                        },
                        node,
                        span,
                    );
                    failed = true;
                }
                _ => {}
            }
        }
        if failed {
            return Err(Abort::Reported);
        }
        Ok(info)
    }

    pub(super) fn analyze_lambda(&mut self, exp: &Exp, lambda: &LambdaExp) -> AnalyzeResult<TypeValue> {
        let mut param_types = Vec::with_capacity(lambda.params.len());
        let mut failed = false;
        for param in &lambda.params {
            let ty = match &param.ty {
                Some(type_exp) => recover(self.type_exp(type_exp))?,
                None => Some(TypeValue::Var),
            };
            match ty {
                Some(TypeValue::Var) => {
                    self.add_error(
                        SemanticError::CannotInferLambdaParam {
                            name: param.name.clone(),
                            span: param.span.into(),
                        },
                        exp.id,
                        param.span,
                    );
                    failed = true;
                }
                Some(ty) => param_types.push(ty),
                // Type expression already reported
                None => failed = true,
            }
        }
        if failed {
            return Err(Abort::Reported);
        }

        let param_names: Vec<&str> = lambda.params.iter().map(|param| param.name.as_str()).collect();
        let captures = CaptureAnalyzer::analyze(&param_names, &lambda.body);
        let capture = self.plan_captures(&captures, exp.id, exp.span)?;

        let func_id = self.ctx.new_lambda_id();
        let _span = tracing::debug_span!("lambda", id = %func_id).entered();
        let ctx = FuncContext::new(func_id.clone(), ReturnType::Unset, false);
        let (result, ctx) = self.in_func_context(ctx, |this| {
            for captured in &capture.captures {
                this.ctx.add_local(&captured.name, captured.ty.clone());
            }
            for (param, ty) in lambda.params.iter().zip(&param_types) {
                this.ctx.add_local(&param.name, ty.clone());
            }
            this.analyze_stmt(&lambda.body)
        });
        result?;

        let ret = ctx.ret().fixed().cloned().unwrap_or(TypeValue::Void);
        self.info.add_template(FuncTemplate {
            id: func_id.clone(),
            local_var_count: ctx.local_count(),
            ret_type: Some(ret.clone()),
            is_this_call: capture.captures_this,
            is_sequence: false,
            body: lambda.body.id,
        });

        let ty = TypeValue::func(ret, param_types);
        self.record(
            exp.id,
            NodeInfo::Lambda {
                func_id,
                capture,
                ty: ty.clone(),
            },
        )?;
        Ok(ty)
    }
}
