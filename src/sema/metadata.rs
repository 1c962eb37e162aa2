// src/sema/metadata.rs
//
// Read-only view over the module being analyzed plus every module it
// references. All name searches cover the current module first, then the
// referenced modules in order.

use std::iter;
use std::rc::Rc;

use crate::errors::InternalError;
use crate::identity::MetaItemId;
use crate::sema::module_info::{FuncInfo, ModuleInfo, TypeInfo, VarInfo};
use crate::sema::type_env::{apply_type_env_normal, make_type_env};
use crate::sema::types::NormalTypeValue;

#[derive(Clone, Copy)]
pub struct MetadataService<'a> {
    current: &'a ModuleInfo,
    referenced: &'a [ModuleInfo],
}

impl<'a> MetadataService<'a> {
    pub fn new(current: &'a ModuleInfo, referenced: &'a [ModuleInfo]) -> Self {
        Self {
            current,
            referenced,
        }
    }

    pub fn current(&self) -> &'a ModuleInfo {
        self.current
    }

    fn modules(&self) -> impl Iterator<Item = &'a ModuleInfo> {
        iter::once(self.current).chain(self.referenced.iter())
    }

    fn module_of(&self, id: &MetaItemId) -> Option<&'a ModuleInfo> {
        self.modules().find(|module| module.name() == id.module())
    }

    pub fn lookup_types_by_name(&self, name: &str, type_param_count: usize) -> Vec<&'a TypeInfo> {
        self.modules()
            .filter_map(|module| module.type_info(&module.item_id(name, type_param_count)))
            .collect()
    }

    pub fn lookup_funcs_by_name(&self, name: &str, type_param_count: usize) -> Vec<&'a FuncInfo> {
        self.modules()
            .filter_map(|module| module.func_info(&module.item_id(name, type_param_count)))
            .collect()
    }

    pub fn lookup_vars_by_name(&self, name: &str, type_param_count: usize) -> Vec<&'a VarInfo> {
        self.modules()
            .filter_map(|module| module.var_info(&module.item_id(name, type_param_count)))
            .collect()
    }

    pub fn get_type_info(&self, id: &MetaItemId) -> Option<&'a TypeInfo> {
        self.module_of(id)?.type_info(id)
    }

    pub fn get_func_info(&self, id: &MetaItemId) -> Option<&'a FuncInfo> {
        self.module_of(id)?.func_info(id)
    }

    pub fn get_var_info(&self, id: &MetaItemId) -> Option<&'a VarInfo> {
        self.module_of(id)?.var_info(id)
    }

    /// Like `get_type_info`, for ids that earlier stages already resolved.
    pub fn expect_type_info(&self, id: &MetaItemId) -> Result<&'a TypeInfo, InternalError> {
        self.get_type_info(id)
            .ok_or_else(|| InternalError::MissingItem(id.clone()))
    }

    pub fn expect_func_info(&self, id: &MetaItemId) -> Result<&'a FuncInfo, InternalError> {
        self.get_func_info(id)
            .ok_or_else(|| InternalError::MissingItem(id.clone()))
    }

    pub fn get_member_type_id(
        &self,
        type_id: &MetaItemId,
        name: &str,
        type_param_count: usize,
    ) -> Option<MetaItemId> {
        let id = type_id.child(name, type_param_count);
        self.get_type_info(&id).map(|_| id)
    }

    pub fn get_member_func_id(
        &self,
        type_id: &MetaItemId,
        name: &str,
        type_param_count: usize,
    ) -> Option<MetaItemId> {
        let id = type_id.child(name, type_param_count);
        self.get_func_info(&id).map(|_| id)
    }

    pub fn get_member_var_id(&self, type_id: &MetaItemId, name: &str) -> Option<MetaItemId> {
        let id = type_id.child(name, 0);
        self.get_var_info(&id).map(|_| id)
    }

    /// Type parameter names declared directly by a type or function.
    pub fn get_type_params(&self, id: &MetaItemId) -> Result<&'a [Rc<str>], InternalError> {
        if let Some(info) = self.get_type_info(id) {
            return Ok(&info.type_params);
        }
        if let Some(info) = self.get_func_info(id) {
            return Ok(&info.type_params);
        }
        Err(InternalError::MissingItem(id.clone()))
    }

    /// The base type of `ty`, with `ty`'s type arguments applied.
    pub fn get_base_type_value(
        &self,
        ty: &NormalTypeValue,
    ) -> Result<Option<NormalTypeValue>, InternalError> {
        let info = self.expect_type_info(&ty.type_id)?;
        let Some(base) = &info.base_type else {
            return Ok(None);
        };
        let env = make_type_env(self, ty)?;
        Ok(Some(apply_type_env_normal(base, &env)))
    }
}
