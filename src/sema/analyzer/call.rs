// src/sema/analyzer/call.rs

use crate::errors::SemanticError;
use crate::frontend::*;
use crate::sema::analyze_info::{Callee, NodeInfo};
use crate::sema::types::TypeValue;

use super::member::MemberResolution;
use super::{Abort, AnalyzeResult, Checker, recover};

impl Checker<'_> {
    /// Check `args` against `params`. A count mismatch aborts the call; a bad
    /// argument is reported and the call keeps its result type.
    pub(super) fn check_args(
        &mut self,
        node: NodeId,
        span: Span,
        params: &[TypeValue],
        args: &[Exp],
    ) -> AnalyzeResult<Vec<TypeValue>> {
        if params.len() != args.len() {
            self.add_error(
                SemanticError::WrongArgumentCount {
                    expected: params.len(),
                    found: args.len(),
                    span: span.into(),
                },
                node,
                span,
            );
            for arg in args {
                recover(self.analyze_value(arg, None))?;
            }
            return Err(Abort::Reported);
        }

        let mut arg_types = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(params) {
            match recover(self.analyze_value(arg, Some(param)))? {
                Some(ty) => {
                    self.check_assignable(param, &ty, arg)?;
                    arg_types.push(ty);
                }
                None => arg_types.push(param.clone()),
            }
        }
        Ok(arg_types)
    }

    fn not_callable<T>(&mut self, ty: &TypeValue, exp: &Exp) -> AnalyzeResult<T> {
        self.fail(
            SemanticError::NotCallable {
                ty: ty.to_string(),
                span: exp.span.into(),
            },
            exp.id,
            exp.span,
        )
    }

    /// `f(args)`. A callee naming a function or enum element is called
    /// directly; anything else must evaluate to a function value.
    pub(super) fn analyze_call(&mut self, exp: &Exp, callable: &Exp, args: &[Exp]) -> AnalyzeResult<TypeValue> {
        let callee_ty = self.analyze_value(callable, None)?;
        let TypeValue::Func { ret, params } = &callee_ty else {
            return self.not_callable(&callee_ty, callable);
        };
        let arg_types = self.check_args(exp.id, exp.span, params, args)?;

        let callee = match self.info.get(callable.id) {
            Some(NodeInfo::Func { func, .. }) => Callee::Func(func.clone()),
            Some(NodeInfo::EnumElem { enum_type, name, .. }) => Callee::EnumElem {
                enum_type: enum_type.clone(),
                name: name.clone(),
            },
            _ => Callee::Value(callable.id),
        };
        let ret = (**ret).clone();
        self.record(
            exp.id,
            NodeInfo::Call {
                callee,
                arg_types,
                ret: ret.clone(),
            },
        )?;
        Ok(ret)
    }

    /// `a.f(args)`: a static call when `a` names a type, a method call otherwise.
    pub(super) fn analyze_member_call(
        &mut self,
        exp: &Exp,
        object: &Exp,
        member_name: &str,
        type_args: &[TypeExp],
        args: &[Exp],
    ) -> AnalyzeResult<TypeValue> {
        let type_args = self.type_args(type_args)?;
        let (object_node, resolution) = match self.try_type_of(object)? {
            Some(ty) => (
                None,
                self.resolve_static_member(&ty, member_name, &type_args, exp.id, exp.span)?,
            ),
            None => {
                let object_ty = self.analyze_value(object, None)?;
                let resolution =
                    self.resolve_instance_member(object, &object_ty, member_name, &type_args, exp.id, exp.span)?;
                (Some(object.id), resolution)
            }
        };

        match resolution {
            MemberResolution::Func {
                func,
                ty: TypeValue::Func { ret, params },
            }
            | MemberResolution::Method {
                func,
                ty: TypeValue::Func { ret, params },
            } => {
                let arg_types = self.check_args(exp.id, exp.span, &params, args)?;
                self.record(
                    exp.id,
                    NodeInfo::MemberCall {
                        object: object_node,
                        func,
                        arg_types,
                        ret: (*ret).clone(),
                    },
                )?;
                Ok(*ret)
            }
            MemberResolution::EnumElem {
                enum_type,
                name,
                ty: TypeValue::Func { ret, params },
            } => {
                let arg_types = self.check_args(exp.id, exp.span, &params, args)?;
                self.record(
                    exp.id,
                    NodeInfo::Call {
                        callee: Callee::EnumElem { enum_type, name },
                        arg_types,
                        ret: (*ret).clone(),
                    },
                )?;
                Ok(*ret)
            }
            MemberResolution::Var {
                ty: TypeValue::Func { .. },
                ..
            } => self.unsupported("calls through member variables", exp.id, exp.span),
            MemberResolution::Func { ty, .. }
            | MemberResolution::Method { ty, .. }
            | MemberResolution::EnumElem { ty, .. }
            | MemberResolution::Var { ty, .. } => self.not_callable(&ty, exp),
        }
    }
}
