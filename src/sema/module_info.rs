// src/sema/module_info.rs
//
// Declarations exported by a module: types, functions and variables keyed by
// their MetaItemId. Members live in the same flat maps under ids nested below
// their declaring type.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::identity::{MetaItemId, ModuleName};
use crate::sema::types::{NormalTypeValue, TypeValue};

#[derive(Debug, Clone, PartialEq)]
pub struct EnumElemInfo {
    pub name: Rc<str>,
    /// Field types, expressed over the enum's own type variables
    pub fields: Vec<(Rc<str>, TypeValue)>,
}

impl EnumElemInfo {
    pub fn new(name: &str, fields: Vec<(Rc<str>, TypeValue)>) -> Self {
        Self {
            name: Rc::from(name),
            fields,
        }
    }

    pub fn field_type(&self, name: &str) -> Option<&TypeValue> {
        self.fields
            .iter()
            .find(|(field, _)| &**field == name)
            .map(|(_, ty)| ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Class,
    Struct,
    Enum(Vec<EnumElemInfo>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub id: MetaItemId,
    pub type_params: Vec<Rc<str>>,
    /// Declared base, expressed over this type's own type variables
    pub base_type: Option<NormalTypeValue>,
    pub kind: TypeKind,
}

impl TypeInfo {
    pub fn new(id: MetaItemId, type_params: &[&str], kind: TypeKind) -> Self {
        Self {
            id,
            type_params: type_params.iter().map(|p| Rc::from(*p)).collect(),
            base_type: None,
            kind,
        }
    }

    pub fn with_base(mut self, base: NormalTypeValue) -> Self {
        self.base_type = Some(base);
        self
    }

    pub fn enum_elems(&self) -> Option<&[EnumElemInfo]> {
        match &self.kind {
            TypeKind::Enum(elems) => Some(elems),
            _ => None,
        }
    }

    pub fn enum_elem(&self, name: &str) -> Option<&EnumElemInfo> {
        self.enum_elems()?.iter().find(|elem| &*elem.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncInfo {
    pub id: MetaItemId,
    /// Sequence functions yield `ret_type` elements; callers see `Enumerable<ret_type>`
    pub is_sequence: bool,
    pub is_instance: bool,
    pub type_params: Vec<Rc<str>>,
    pub ret_type: TypeValue,
    pub param_types: Vec<TypeValue>,
}

impl FuncInfo {
    pub fn new(id: MetaItemId, ret_type: TypeValue, param_types: Vec<TypeValue>) -> Self {
        Self {
            id,
            is_sequence: false,
            is_instance: false,
            type_params: Vec::new(),
            ret_type,
            param_types,
        }
    }

    pub fn instance(mut self) -> Self {
        self.is_instance = true;
        self
    }

    pub fn sequence(mut self) -> Self {
        self.is_sequence = true;
        self
    }

    pub fn with_type_params(mut self, type_params: &[&str]) -> Self {
        self.type_params = type_params.iter().map(|p| Rc::from(*p)).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub id: MetaItemId,
    pub is_static: bool,
    pub type_value: TypeValue,
}

impl VarInfo {
    pub fn new(id: MetaItemId, is_static: bool, type_value: TypeValue) -> Self {
        Self {
            id,
            is_static,
            type_value,
        }
    }
}

/// Everything a module exposes to the analyzer.
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    name: ModuleName,
    pub(crate) types: FxHashMap<MetaItemId, TypeInfo>,
    pub(crate) funcs: FxHashMap<MetaItemId, FuncInfo>,
    pub(crate) vars: FxHashMap<MetaItemId, VarInfo>,
}

impl ModuleInfo {
    pub fn new(name: ModuleName) -> Self {
        Self {
            name,
            types: FxHashMap::default(),
            funcs: FxHashMap::default(),
            vars: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    /// Id of a top-level item of this module.
    pub fn item_id(&self, name: &str, type_param_count: usize) -> MetaItemId {
        MetaItemId::new(self.name.clone(), name, type_param_count)
    }

    pub fn add_type(&mut self, info: TypeInfo) {
        self.types.insert(info.id.clone(), info);
    }

    pub fn add_func(&mut self, info: FuncInfo) {
        self.funcs.insert(info.id.clone(), info);
    }

    pub fn add_var(&mut self, info: VarInfo) {
        self.vars.insert(info.id.clone(), info);
    }

    pub fn type_info(&self, id: &MetaItemId) -> Option<&TypeInfo> {
        self.types.get(id)
    }

    pub fn func_info(&self, id: &MetaItemId) -> Option<&FuncInfo> {
        self.funcs.get(id)
    }

    pub fn var_info(&self, id: &MetaItemId) -> Option<&VarInfo> {
        self.vars.get(id)
    }
}
