// src/sema/analyzer/expr.rs
//
// Expression dispatch, literals and the built-in operators.

use crate::errors::SemanticError;
use crate::frontend::*;
use crate::sema::analyze_info::{NodeInfo, OperandKind};
use crate::sema::types::TypeValue;

use super::{Abort, AnalyzeResult, Checker, recover};

impl Checker<'_> {
    /// Analyze `exp` and return its type. `hint` is the type the context
    /// expects, used only to type otherwise uninferable list literals.
    pub(super) fn analyze_exp(&mut self, exp: &Exp, hint: Option<&TypeValue>) -> AnalyzeResult<TypeValue> {
        match &exp.kind {
            ExpKind::Identifier { name, type_args } => self.analyze_identifier(exp, name, type_args),
            ExpKind::String(string) => {
                self.analyze_string(string)?;
                self.literal(exp, self.well_known.string_type())
            }
            ExpKind::IntLiteral(_) => self.literal(exp, self.well_known.int_type()),
            ExpKind::BoolLiteral(_) => self.literal(exp, self.well_known.bool_type()),
            ExpKind::BinaryOp {
                op: BinaryOpKind::Assign,
                operand0,
                operand1,
            } => self.analyze_assign(exp, operand0, operand1),
            ExpKind::BinaryOp { op, operand0, operand1 } => self.analyze_binary(exp, *op, operand0, operand1),
            ExpKind::UnaryOp { op, operand } => self.analyze_unary(exp, *op, operand),
            ExpKind::Call { callable, args } => self.analyze_call(exp, callable, args),
            ExpKind::Lambda(lambda) => self.analyze_lambda(exp, lambda),
            ExpKind::Indexer { object, index } => self.analyze_indexer(exp, object, index),
            ExpKind::MemberCall {
                object,
                member_name,
                type_args,
                args,
            } => self.analyze_member_call(exp, object, member_name, type_args, args),
            ExpKind::Member {
                parent,
                member_name,
                type_args,
            } => self.analyze_member(exp, parent, member_name, type_args),
            ExpKind::List { elem_type, elems } => self.analyze_list(exp, elem_type.as_ref(), elems, hint),
        }
    }

    /// Like `analyze_exp`, for positions that need a value.
    pub(super) fn analyze_value(&mut self, exp: &Exp, hint: Option<&TypeValue>) -> AnalyzeResult<TypeValue> {
        let ty = self.analyze_exp(exp, hint)?;
        if ty.is_void() {
            return self.fail(SemanticError::VoidValueUsed { span: exp.span.into() }, exp.id, exp.span);
        }
        Ok(ty)
    }

    fn literal(&mut self, exp: &Exp, ty: TypeValue) -> AnalyzeResult<TypeValue> {
        self.record(exp.id, NodeInfo::Literal { ty: ty.clone() })?;
        Ok(ty)
    }

    /// Interpolated parts must be int, bool or string. Every part is checked.
    pub(super) fn analyze_string(&mut self, string: &StringExp) -> AnalyzeResult<()> {
        let mut failed = false;
        for element in &string.elements {
            let StringExpElement::Exp(exp) = element else {
                continue;
            };
            let Some(ty) = recover(self.analyze_value(exp, None))? else {
                failed = true;
                continue;
            };
            if self.operand_kind(&ty).is_none() {
                self.add_error(
                    SemanticError::TypeMismatch {
                        expected: "int, bool or string".to_string(),
                        found: ty.to_string(),
                        span: exp.span.into(),
                    },
                    exp.id,
                    exp.span,
                );
                failed = true;
            }
        }
        if failed {
            return Err(Abort::Reported);
        }
        Ok(())
    }

    fn operand_kind(&self, ty: &TypeValue) -> Option<OperandKind> {
        if self.well_known.is_int(ty) {
            Some(OperandKind::Int)
        } else if self.well_known.is_bool(ty) {
            Some(OperandKind::Bool)
        } else if self.well_known.is_string(ty) {
            Some(OperandKind::String)
        } else {
            None
        }
    }

    fn analyze_binary(&mut self, exp: &Exp, op: BinaryOpKind, lhs: &Exp, rhs: &Exp) -> AnalyzeResult<TypeValue> {
        let lhs_ty = recover(self.analyze_value(lhs, None))?;
        let rhs_ty = recover(self.analyze_value(rhs, None))?;
        let (Some(lhs_ty), Some(rhs_ty)) = (lhs_ty, rhs_ty) else {
            return Err(Abort::Reported);
        };

        let operand = self.operand_kind(&lhs_ty).filter(|_| lhs_ty == rhs_ty);
        let ty = match (op, operand) {
            (
                BinaryOpKind::Multiply | BinaryOpKind::Divide | BinaryOpKind::Modulo | BinaryOpKind::Subtract,
                Some(OperandKind::Int),
            ) => Some(self.well_known.int_type()),
            (BinaryOpKind::Add, Some(OperandKind::Int)) => Some(self.well_known.int_type()),
            (BinaryOpKind::Add, Some(OperandKind::String)) => Some(self.well_known.string_type()),
            (
                BinaryOpKind::LessThan
                | BinaryOpKind::GreaterThan
                | BinaryOpKind::LessThanOrEqual
                | BinaryOpKind::GreaterThanOrEqual,
                Some(OperandKind::Int | OperandKind::String),
            ) => Some(self.well_known.bool_type()),
            (BinaryOpKind::Equal | BinaryOpKind::NotEqual, Some(_)) => Some(self.well_known.bool_type()),
            _ => None,
        };

        match (ty, operand) {
            (Some(ty), Some(operand)) => {
                self.record(exp.id, NodeInfo::BinaryOp { op, operand, ty: ty.clone() })?;
                Ok(ty)
            }
            _ => self.fail(
                SemanticError::InvalidOperands {
                    op: op.as_str().to_string(),
                    operands: format!("'{lhs_ty}' and '{rhs_ty}'"),
                    span: exp.span.into(),
                },
                exp.id,
                exp.span,
            ),
        }
    }

    fn analyze_unary(&mut self, exp: &Exp, op: UnaryOpKind, operand: &Exp) -> AnalyzeResult<TypeValue> {
        if op.is_mutating() {
            let (target, ty) = self.analyze_assign_target(operand)?;
            if !self.well_known.is_int(&ty) {
                return self.invalid_unary(exp, op, &ty);
            }
            self.record(
                exp.id,
                NodeInfo::UnaryOp {
                    op,
                    target: Some(target),
                    ty: ty.clone(),
                },
            )?;
            return Ok(ty);
        }

        let ty = self.analyze_value(operand, None)?;
        let valid = match op {
            UnaryOpKind::LogicalNot => self.well_known.is_bool(&ty),
            _ => self.well_known.is_int(&ty),
        };
        if !valid {
            return self.invalid_unary(exp, op, &ty);
        }
        self.record(
            exp.id,
            NodeInfo::UnaryOp {
                op,
                target: None,
                ty: ty.clone(),
            },
        )?;
        Ok(ty)
    }

    fn invalid_unary(&mut self, exp: &Exp, op: UnaryOpKind, ty: &TypeValue) -> AnalyzeResult<TypeValue> {
        self.fail(
            SemanticError::InvalidOperands {
                op: op.as_str().to_string(),
                operands: format!("'{ty}'"),
                span: exp.span.into(),
            },
            exp.id,
            exp.span,
        )
    }

    /// Element type comes from the explicit annotation, else the first
    /// element, else a `List<T>` the context expects.
    fn analyze_list(
        &mut self,
        exp: &Exp,
        elem_type: Option<&TypeExp>,
        elems: &[Exp],
        hint: Option<&TypeValue>,
    ) -> AnalyzeResult<TypeValue> {
        let mut rest = elems;
        let elem_ty = match elem_type {
            Some(type_exp) => self.type_exp(type_exp)?,
            None => match elems.split_first() {
                Some((first, tail)) => {
                    rest = tail;
                    self.analyze_value(first, None)?
                }
                None => {
                    let hinted = hint
                        .and_then(|hint| hint.as_normal())
                        .filter(|normal| normal.type_id == self.well_known.list)
                        .and_then(|normal| normal.type_args.first().cloned());
                    match hinted {
                        Some(ty) => ty,
                        None => {
                            return self.fail(
                                SemanticError::CannotInferVar {
                                    name: "[]".to_string(),
                                    span: exp.span.into(),
                                },
                                exp.id,
                                exp.span,
                            );
                        }
                    }
                }
            },
        };

        for elem in rest {
            if let Some(ty) = recover(self.analyze_value(elem, Some(&elem_ty)))? {
                self.check_assignable(&elem_ty, &ty, elem)?;
            }
        }

        self.record(exp.id, NodeInfo::List { elem_type: elem_ty.clone() })?;
        Ok(self.well_known.list_of(elem_ty))
    }
}
