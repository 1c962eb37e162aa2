// src/sema/well_known.rs
//
// The built-in runtime module and cached ids for the types the analyzer
// reasons about directly (literals, operators, list literals, foreach).

use crate::identity::{MetaItemId, ModuleName};
use crate::sema::module_info::{FuncInfo, ModuleInfo, TypeInfo, TypeKind, VarInfo};
use crate::sema::types::TypeValue;

pub const RUNTIME_MODULE: &str = "System.Runtime";

/// Reserved member names used for `obj[index]` reads and writes.
pub const INDEXER_GET: &str = "$Indexer_Get";
pub const INDEXER_SET: &str = "$Indexer_Set";

/// Ids of the runtime types, valid whenever the runtime module is referenced.
#[derive(Debug, Clone)]
pub struct WellKnownTypes {
    pub int: MetaItemId,
    pub bool: MetaItemId,
    pub string: MetaItemId,
    pub list: MetaItemId,
    pub enumerable: MetaItemId,
}

impl Default for WellKnownTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl WellKnownTypes {
    pub fn new() -> Self {
        let module = ModuleName::new(RUNTIME_MODULE);
        Self {
            int: MetaItemId::new(module.clone(), "int", 0),
            bool: MetaItemId::new(module.clone(), "bool", 0),
            string: MetaItemId::new(module.clone(), "string", 0),
            list: MetaItemId::new(module.clone(), "List", 1),
            enumerable: MetaItemId::new(module, "Enumerable", 1),
        }
    }

    pub fn int_type(&self) -> TypeValue {
        TypeValue::normal(None, self.int.clone(), vec![])
    }

    pub fn bool_type(&self) -> TypeValue {
        TypeValue::normal(None, self.bool.clone(), vec![])
    }

    pub fn string_type(&self) -> TypeValue {
        TypeValue::normal(None, self.string.clone(), vec![])
    }

    pub fn list_of(&self, elem: TypeValue) -> TypeValue {
        TypeValue::normal(None, self.list.clone(), vec![elem])
    }

    pub fn enumerable_of(&self, elem: TypeValue) -> TypeValue {
        TypeValue::normal(None, self.enumerable.clone(), vec![elem])
    }

    pub fn is_int(&self, ty: &TypeValue) -> bool {
        self.is_plain(ty, &self.int)
    }

    pub fn is_bool(&self, ty: &TypeValue) -> bool {
        self.is_plain(ty, &self.bool)
    }

    pub fn is_string(&self, ty: &TypeValue) -> bool {
        self.is_plain(ty, &self.string)
    }

    fn is_plain(&self, ty: &TypeValue, id: &MetaItemId) -> bool {
        matches!(ty, TypeValue::Normal(normal) if normal.outer.is_none() && &normal.type_id == id)
    }

    /// Element type of a `List<T>` or `Enumerable<T>`, the two iterable shapes.
    pub fn iterable_elem<'t>(&self, ty: &'t TypeValue) -> Option<&'t TypeValue> {
        let normal = ty.as_normal()?;
        if normal.type_id == self.list || normal.type_id == self.enumerable {
            normal.type_args.first()
        } else {
            None
        }
    }
}

/// `System.Runtime`: the primitive types, `List<T>` and `Enumerable<T>`.
pub fn runtime_module() -> ModuleInfo {
    let well_known = WellKnownTypes::new();
    let mut module = ModuleInfo::new(ModuleName::new(RUNTIME_MODULE));

    module.add_type(TypeInfo::new(well_known.int.clone(), &[], TypeKind::Struct));
    module.add_type(TypeInfo::new(well_known.bool.clone(), &[], TypeKind::Struct));
    module.add_type(TypeInfo::new(well_known.string.clone(), &[], TypeKind::Class));
    module.add_type(TypeInfo::new(well_known.enumerable.clone(), &["T"], TypeKind::Class));

    let list = well_known.list.clone();
    let elem = TypeValue::type_var(list.clone(), "T");
    module.add_type(TypeInfo::new(list.clone(), &["T"], TypeKind::Class));
    module.add_func(
        FuncInfo::new(list.child(INDEXER_GET, 0), elem.clone(), vec![well_known.int_type()]).instance(),
    );
    module.add_func(
        FuncInfo::new(
            list.child(INDEXER_SET, 0),
            TypeValue::Void,
            vec![well_known.int_type(), elem.clone()],
        )
        .instance(),
    );
    module.add_func(FuncInfo::new(list.child("Add", 0), TypeValue::Void, vec![elem]).instance());
    module.add_var(VarInfo::new(list.child("Count", 0), false, well_known.int_type()));

    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::metadata::MetadataService;

    #[test]
    fn runtime_exposes_list_members() {
        let runtime = runtime_module();
        let well_known = WellKnownTypes::new();
        let current = ModuleInfo::new(ModuleName::new("Script"));
        let referenced = [runtime];
        let metadata = MetadataService::new(&current, &referenced);

        assert_eq!(metadata.lookup_types_by_name("int", 0).len(), 1);
        assert!(metadata.get_member_func_id(&well_known.list, INDEXER_GET, 0).is_some());
        assert!(metadata.get_member_func_id(&well_known.list, INDEXER_SET, 0).is_some());
        assert!(metadata.get_member_var_id(&well_known.list, "Count").is_some());
    }

    #[test]
    fn iterable_elem_accepts_list_and_enumerable() {
        let well_known = WellKnownTypes::new();
        let int = well_known.int_type();
        assert_eq!(well_known.iterable_elem(&well_known.list_of(int.clone())), Some(&int));
        assert_eq!(well_known.iterable_elem(&well_known.enumerable_of(int.clone())), Some(&int));
        assert_eq!(well_known.iterable_elem(&int), None);
    }
}
