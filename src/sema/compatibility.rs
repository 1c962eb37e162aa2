// src/sema/compatibility.rs
//
// Assignability between resolved types.

use rustc_hash::FxHashSet;

use crate::errors::InternalError;
use crate::sema::metadata::MetadataService;
use crate::sema::types::{NormalTypeValue, TypeValue};

/// Whether a value of type `from` can be stored where `to` is expected.
///
/// Walks `from`'s single-inheritance base chain, comparing structurally at
/// each step. An enum element is accepted wherever its enum is.
pub fn is_assignable(
    metadata: &MetadataService<'_>,
    to: &TypeValue,
    from: &TypeValue,
) -> Result<bool, InternalError> {
    if to == from {
        return Ok(true);
    }
    let TypeValue::Normal(target) = to else {
        return Ok(false);
    };
    let start = match from {
        TypeValue::Normal(normal) => normal,
        TypeValue::EnumElem { enum_type, .. } => enum_type,
        _ => return Ok(false),
    };
    derives_from(metadata, target, start)
}

fn derives_from(
    metadata: &MetadataService<'_>,
    target: &NormalTypeValue,
    start: &NormalTypeValue,
) -> Result<bool, InternalError> {
    let mut visited = FxHashSet::default();
    let mut current = start.clone();
    loop {
        if current == *target {
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            return Ok(false);
        }
        match metadata.get_base_type_value(&current)? {
            Some(base) => current = base,
            None => return Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ModuleName;
    use crate::sema::module_info::{ModuleInfo, TypeInfo, TypeKind};

    // class A; class B : A; class D : B
    fn chain() -> (ModuleInfo, TypeValue, TypeValue, TypeValue) {
        let mut module = ModuleInfo::new(ModuleName::new("M"));
        let a = module.item_id("A", 0);
        let b = module.item_id("B", 0);
        let d = module.item_id("D", 0);
        let a_value = NormalTypeValue::new(None, a.clone(), vec![]);
        let b_value = NormalTypeValue::new(None, b.clone(), vec![]);
        module.add_type(TypeInfo::new(a, &[], TypeKind::Class));
        module.add_type(TypeInfo::new(b, &[], TypeKind::Class).with_base(a_value.clone()));
        module.add_type(TypeInfo::new(d.clone(), &[], TypeKind::Class).with_base(b_value.clone()));
        (
            module,
            TypeValue::Normal(a_value),
            TypeValue::Normal(b_value),
            TypeValue::normal(None, d, vec![]),
        )
    }

    #[test]
    fn assignability_is_reflexive() {
        let (module, a, b, d) = chain();
        let metadata = MetadataService::new(&module, &[]);
        for ty in [a, b, d, TypeValue::Void, TypeValue::func(TypeValue::Void, vec![])] {
            assert!(is_assignable(&metadata, &ty, &ty).unwrap());
        }
    }

    #[test]
    fn derived_assigns_to_base_but_not_back() {
        let (module, a, b, d) = chain();
        let metadata = MetadataService::new(&module, &[]);
        assert!(is_assignable(&metadata, &a, &d).unwrap());
        assert!(is_assignable(&metadata, &b, &d).unwrap());
        assert!(!is_assignable(&metadata, &d, &a).unwrap());
    }

    #[test]
    fn enum_element_assigns_to_its_enum() {
        let mut module = ModuleInfo::new(ModuleName::new("M"));
        let color = module.item_id("Color", 0);
        module.add_type(TypeInfo::new(color.clone(), &[], TypeKind::Enum(vec![])));
        let metadata = MetadataService::new(&module, &[]);
        let color_value = NormalTypeValue::new(None, color, vec![]);
        let red = TypeValue::enum_elem(color_value.clone(), "Red");
        let color_value = TypeValue::Normal(color_value);

        assert!(is_assignable(&metadata, &color_value, &red).unwrap());
        assert!(!is_assignable(&metadata, &red, &color_value).unwrap());
    }
}
