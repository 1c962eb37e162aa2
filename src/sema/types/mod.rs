// src/sema/types/mod.rs
//
// Resolved type representations.
//
// This module is organized into submodules by category:
// - `nominal` - NormalTypeValue (nominal, possibly nested generic types) and TypeArgumentList
// - `values` - FuncValue / VarValue (resolved references to functions and variables)

pub mod nominal;
pub mod values;

pub use nominal::{NormalTypeValue, TypeArgumentList};
pub use values::{FuncValue, VarValue};

use std::fmt;
use std::rc::Rc;

use crate::identity::MetaItemId;

/// The resolved form of a type.
///
/// Values are immutable once built, and equality/hashing is structural: two
/// independently constructed `List<int>` values compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeValue {
    /// Inference placeholder (`var`); only legal where no explicit type is given
    Var,
    /// A generic parameter, bound to the declaration that introduced it
    TypeVar { parent: MetaItemId, name: Rc<str> },
    /// A concrete or partially applied nominal type
    Normal(NormalTypeValue),
    Void,
    /// Function signature
    Func {
        ret: Box<TypeValue>,
        params: Vec<TypeValue>,
    },
    /// A single element of an enum, e.g. the narrowed type inside `if (x is Option<int>.Some)`
    EnumElem {
        enum_type: NormalTypeValue,
        name: Rc<str>,
    },
}

impl TypeValue {
    pub fn type_var(parent: MetaItemId, name: &str) -> Self {
        TypeValue::TypeVar {
            parent,
            name: Rc::from(name),
        }
    }

    /// A top-level or nested nominal type.
    pub fn normal(outer: Option<NormalTypeValue>, type_id: MetaItemId, type_args: Vec<TypeValue>) -> Self {
        TypeValue::Normal(NormalTypeValue::new(outer, type_id, type_args))
    }

    pub fn func(ret: TypeValue, params: Vec<TypeValue>) -> Self {
        TypeValue::Func {
            ret: Box::new(ret),
            params,
        }
    }

    pub fn enum_elem(enum_type: NormalTypeValue, name: &str) -> Self {
        TypeValue::EnumElem {
            enum_type,
            name: Rc::from(name),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeValue::Void)
    }

    pub fn as_normal(&self) -> Option<&NormalTypeValue> {
        match self {
            TypeValue::Normal(normal) => Some(normal),
            _ => None,
        }
    }
}

impl fmt::Display for TypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeValue::Var => f.write_str("var"),
            TypeValue::TypeVar { name, .. } => f.write_str(name),
            TypeValue::Normal(normal) => write!(f, "{}", normal),
            TypeValue::Void => f.write_str("void"),
            TypeValue::Func { ret, params } => {
                f.write_str("(")?;
                write_comma_separated(f, params)?;
                write!(f, ") => {}", ret)
            }
            TypeValue::EnumElem { enum_type, name } => write!(f, "{}.{}", enum_type, name),
        }
    }
}

pub(crate) fn write_comma_separated(f: &mut fmt::Formatter<'_>, types: &[TypeValue]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ModuleName;

    fn list_of(elem: TypeValue) -> TypeValue {
        let list = MetaItemId::new(ModuleName::new("System.Runtime"), "List", 1);
        TypeValue::normal(None, list, vec![elem])
    }

    fn int() -> TypeValue {
        TypeValue::normal(None, MetaItemId::new(ModuleName::new("System.Runtime"), "int", 0), vec![])
    }

    #[test]
    fn independently_built_values_are_equal() {
        let a = list_of(int());
        let b = list_of(int());
        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test]
    fn equality_is_transitive_across_shapes() {
        let f1 = TypeValue::func(list_of(int()), vec![int()]);
        let f2 = TypeValue::func(list_of(int()), vec![int()]);
        let f3 = f2.clone();
        assert_eq!(f1, f2);
        assert_eq!(f2, f3);
        assert_eq!(f1, f3);
    }

    #[test]
    fn type_vars_compare_by_owner_and_name() {
        let owner = MetaItemId::new(ModuleName::new("M"), "X", 1);
        let other = MetaItemId::new(ModuleName::new("M"), "Z", 1);
        assert_eq!(TypeValue::type_var(owner.clone(), "T"), TypeValue::type_var(owner.clone(), "T"));
        assert_ne!(TypeValue::type_var(owner, "T"), TypeValue::type_var(other, "T"));
    }

    #[test]
    fn display_formats() {
        assert_eq!(list_of(int()).to_string(), "List<int>");
        assert_eq!(TypeValue::func(TypeValue::Void, vec![int(), int()]).to_string(), "(int, int) => void");
    }
}
