// src/sema/analyzer/identifier.rs
//
// Identifier resolution. Candidates are searched in order: local variables
// of the current function, members of the enclosing instance, private
// globals of the script, then module-level variables, functions and types
// across the current and referenced modules. The first tier that produces
// anything wins; more than one match within the module tier is ambiguous.

use crate::errors::SemanticError;
use crate::frontend::{Exp, NodeId, Span, TypeExp};
use crate::sema::analyze_info::{NodeInfo, StorageInfo};
use crate::sema::types::{FuncValue, TypeValue};

use super::{AnalyzeResult, Checker};

#[derive(Debug, Clone)]
pub(super) enum Resolved {
    Var { storage: StorageInfo, ty: TypeValue },
    Func(FuncValue),
    Type(TypeValue),
}

#[derive(Debug, Clone)]
pub(super) enum Lookup {
    Found(Resolved),
    NotFound,
    Ambiguous(usize),
}

impl Checker<'_> {
    /// Resolve `name` without reporting. Variable types are the declared
    /// ones; narrowing is applied by readers.
    pub(super) fn lookup_identifier(&self, name: &str, type_args: &[TypeValue]) -> Lookup {
        if type_args.is_empty() {
            if let Some(local) = self.ctx.get_local(name) {
                return Lookup::Found(Resolved::Var {
                    storage: StorageInfo::Local(local.index),
                    ty: local.ty.clone(),
                });
            }
        }

        if let Some(resolved) = self.lookup_this_member(name) {
            return Lookup::Found(resolved);
        }

        if type_args.is_empty() {
            if let Some(global) = self.globals.get(name) {
                return Lookup::Found(Resolved::Var {
                    storage: StorageInfo::PrivateGlobal(global.index),
                    ty: global.ty.clone(),
                });
            }
        }

        self.lookup_module_level(name, type_args)
    }

    /// Scripts have no enclosing instance, so member lookup through an
    /// implicit `this` never matches.
    fn lookup_this_member(&self, _name: &str) -> Option<Resolved> {
        None
    }

    fn lookup_module_level(&self, name: &str, type_args: &[TypeValue]) -> Lookup {
        let count = type_args.len();
        let mut candidates = Vec::new();

        for var in self.metadata.lookup_vars_by_name(name, count) {
            candidates.push(Resolved::Var {
                storage: StorageInfo::ModuleGlobal(var.id.clone()),
                ty: var.type_value.clone(),
            });
        }
        for func in self.metadata.lookup_funcs_by_name(name, count) {
            candidates.push(Resolved::Func(FuncValue::new(None, func.id.clone(), type_args.to_vec())));
        }
        for ty in self.metadata.lookup_types_by_name(name, count) {
            candidates.push(Resolved::Type(TypeValue::normal(None, ty.id.clone(), type_args.to_vec())));
        }

        match candidates.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(candidates.remove(0)),
            n => Lookup::Ambiguous(n),
        }
    }

    /// Resolve `name`, reporting when nothing or more than one thing matches.
    pub(super) fn resolve_identifier(
        &mut self,
        node: NodeId,
        span: Span,
        name: &str,
        type_args: &[TypeValue],
    ) -> AnalyzeResult<Resolved> {
        match self.lookup_identifier(name, type_args) {
            Lookup::Found(resolved) => Ok(resolved),
            Lookup::NotFound => self.fail(
                SemanticError::UndefinedVariable {
                    name: name.to_string(),
                    span: span.into(),
                },
                node,
                span,
            ),
            Lookup::Ambiguous(candidates) => self.fail(
                SemanticError::AmbiguousIdentifier {
                    name: name.to_string(),
                    candidates,
                    span: span.into(),
                },
                node,
                span,
            ),
        }
    }

    /// Type of a variable read, after any `if (x is T)` narrowing in scope.
    pub(super) fn narrowed_type(&self, name: &str, storage: &StorageInfo, declared: TypeValue) -> TypeValue {
        match storage {
            StorageInfo::Local(_) | StorageInfo::PrivateGlobal(_) => {
                self.ctx.get_override(name).cloned().unwrap_or(declared)
            }
            _ => declared,
        }
    }

    pub(super) fn analyze_identifier(
        &mut self,
        exp: &Exp,
        name: &str,
        type_args: &[TypeExp],
    ) -> AnalyzeResult<TypeValue> {
        let type_args = self.type_args(type_args)?;
        match self.resolve_identifier(exp.id, exp.span, name, &type_args)? {
            Resolved::Var { storage, ty } => {
                let ty = self.narrowed_type(name, &storage, ty);
                self.record(exp.id, NodeInfo::Var { storage, ty: ty.clone() })?;
                Ok(ty)
            }
            Resolved::Func(func) => {
                let ty = self.func_type(&func)?;
                self.record(exp.id, NodeInfo::Func { func, ty: ty.clone() })?;
                Ok(ty)
            }
            Resolved::Type(_) => self.fail(
                SemanticError::NotAValue {
                    name: name.to_string(),
                    span: exp.span.into(),
                },
                exp.id,
                exp.span,
            ),
        }
    }
}
