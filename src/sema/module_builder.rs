// src/sema/module_builder.rs
//
// Turn skeletons plus evaluated type expressions into the full ModuleInfo of
// the script being analyzed: function signatures and enum element fields.

use std::rc::Rc;

use crate::errors::{InternalError, SemanticError};
use crate::frontend::{EnumDecl, FuncDecl, FuncKind, Script, ScriptElement, TypeExp};
use crate::sema::diagnostics::Diagnostics;
use crate::sema::module_info::{EnumElemInfo, FuncInfo, ModuleInfo, TypeInfo, TypeKind};
use crate::sema::skeleton::SkeletonRepository;
use crate::sema::type_expr::TypeExpInfo;
use crate::sema::types::TypeValue;

pub struct ModuleBuilder<'a> {
    skeletons: &'a SkeletonRepository,
    type_exps: &'a TypeExpInfo,
    diagnostics: &'a mut Diagnostics,
    module: ModuleInfo,
}

impl<'a> ModuleBuilder<'a> {
    pub fn new(
        skeletons: &'a SkeletonRepository,
        type_exps: &'a TypeExpInfo,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            skeletons,
            type_exps,
            diagnostics,
            module: ModuleInfo::new(skeletons.module().clone()),
        }
    }

    pub fn build(mut self, script: &Script) -> Result<ModuleInfo, InternalError> {
        for element in &script.elements {
            match element {
                ScriptElement::Func(decl) => self.add_func(decl)?,
                ScriptElement::Enum(decl) => self.add_enum(decl)?,
                ScriptElement::Stmt(_) => {}
            }
        }
        Ok(self.module)
    }

    /// A declared (non-inferred) type, or `None` when it failed or is `var`.
    fn declared_type(&mut self, type_exp: &TypeExp, name: &str) -> Result<Option<TypeValue>, InternalError> {
        match self.type_exps.lookup(type_exp.id)? {
            Some(TypeValue::Var) => {
                self.diagnostics.add(
                    SemanticError::CannotInferVar {
                        name: name.to_string(),
                        span: type_exp.span.into(),
                    },
                    type_exp.id,
                    type_exp.span,
                );
                Ok(None)
            }
            Some(ty) => Ok(Some(ty.clone())),
            None => Ok(None),
        }
    }

    fn add_func(&mut self, decl: &FuncDecl) -> Result<(), InternalError> {
        let id = self.skeletons.item_id(&decl.name, decl.type_params.len());
        if !self.skeletons.owns(&id, decl.id) {
            return Ok(());
        }

        let ret_type = self.declared_type(&decl.ret_type, &decl.name)?;
        let mut param_types = Vec::with_capacity(decl.params.len());
        let mut complete = true;
        for param in &decl.params {
            match self.declared_type(&param.ty, &param.name)? {
                Some(ty) => param_types.push(ty),
                None => complete = false,
            }
        }
        let Some(ret_type) = ret_type else {
            return Ok(());
        };
        if !complete {
            return Ok(());
        }

        let type_params: Vec<&str> = decl.type_params.iter().map(String::as_str).collect();
        let mut info = FuncInfo::new(id, ret_type, param_types).with_type_params(&type_params);
        if decl.kind == FuncKind::Sequence {
            info = info.sequence();
        }
        tracing::trace!(id = %info.id, "function signature");
        self.module.add_func(info);
        Ok(())
    }

    fn add_enum(&mut self, decl: &EnumDecl) -> Result<(), InternalError> {
        let id = self.skeletons.item_id(&decl.name, decl.type_params.len());
        if !self.skeletons.owns(&id, decl.id) {
            return Ok(());
        }

        let mut elems = Vec::with_capacity(decl.elems.len());
        for elem in &decl.elems {
            let mut fields = Vec::with_capacity(elem.params.len());
            for param in &elem.params {
                if let Some(ty) = self.declared_type(&param.ty, &param.name)? {
                    fields.push((Rc::from(param.name.as_str()), ty));
                }
            }
            elems.push(EnumElemInfo::new(&elem.name, fields));
        }

        let type_params: Vec<&str> = decl.type_params.iter().map(String::as_str).collect();
        self.module
            .add_type(TypeInfo::new(id, &type_params, TypeKind::Enum(elems)));
        Ok(())
    }
}
