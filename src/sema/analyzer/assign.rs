// src/sema/analyzer/assign.rs

use crate::errors::SemanticError;
use crate::frontend::*;
use crate::sema::analyze_info::{AssignTarget, NodeInfo};
use crate::sema::types::TypeValue;

use super::identifier::Resolved;
use super::member::MemberResolution;
use super::{AnalyzeResult, Checker, recover};

impl Checker<'_> {
    pub(super) fn analyze_assign(&mut self, exp: &Exp, target: &Exp, value: &Exp) -> AnalyzeResult<TypeValue> {
        let (target, ty) = self.analyze_assign_target(target)?;
        if let Some(found) = recover(self.analyze_value(value, Some(&ty)))? {
            self.check_assignable(&ty, &found, value)?;
        }
        self.record(exp.id, NodeInfo::Assign { target, ty: ty.clone() })?;
        Ok(ty)
    }

    fn invalid_target<T>(&mut self, target: &Exp) -> AnalyzeResult<T> {
        self.fail(
            SemanticError::InvalidAssignTarget {
                span: target.span.into(),
            },
            target.id,
            target.span,
        )
    }

    /// Resolve a written location and its declared type. Narrowing never
    /// applies to writes.
    pub(super) fn analyze_assign_target(&mut self, target: &Exp) -> AnalyzeResult<(AssignTarget, TypeValue)> {
        match &target.kind {
            ExpKind::Identifier { name, type_args } => {
                let type_args = self.type_args(type_args)?;
                match self.resolve_identifier(target.id, target.span, name, &type_args)? {
                    Resolved::Var { storage, ty } => {
                        self.record(
                            target.id,
                            NodeInfo::Var {
                                storage: storage.clone(),
                                ty: ty.clone(),
                            },
                        )?;
                        Ok((AssignTarget::Direct(storage), ty))
                    }
                    Resolved::Func(_) | Resolved::Type(_) => self.invalid_target(target),
                }
            }
            ExpKind::Member {
                parent,
                member_name,
                type_args,
            } => {
                let type_args = self.type_args(type_args)?;
                match self.resolve_member(parent, member_name, &type_args, target.id, target.span)? {
                    MemberResolution::Var { storage, ty } => {
                        self.record(
                            target.id,
                            NodeInfo::Var {
                                storage: storage.clone(),
                                ty: ty.clone(),
                            },
                        )?;
                        Ok((AssignTarget::Direct(storage), ty))
                    }
                    _ => self.invalid_target(target),
                }
            }
            ExpKind::Indexer { object, index } => {
                let object_ty = self.analyze_value(object, None)?;
                let (getter, setter) = self.indexer_accessors(&object_ty, true, target.id, target.span)?;
                let Some(setter) = setter else {
                    return self.invalid_target(target);
                };
                let ty = self.check_indexer_arg(&getter, index, target.id, target.span)?;
                self.record(
                    target.id,
                    NodeInfo::Indexer {
                        getter: getter.clone(),
                        ty: ty.clone(),
                    },
                )?;
                Ok((
                    AssignTarget::Call {
                        object: object.id,
                        object_type: object_ty,
                        getter,
                        setter,
                        args: vec![index.id],
                    },
                    ty,
                ))
            }
            _ => self.invalid_target(target),
        }
    }
}
