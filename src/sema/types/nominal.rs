// src/sema/types/nominal.rs
//
// Nominal types and outer-chained type argument lists.

use std::fmt;

use crate::identity::MetaItemId;

use super::{TypeValue, write_comma_separated};

/// A nominal type instantiated with type arguments.
///
/// `outer` mirrors the nominal nesting of `type_id`: for `X<int>.Y<string>`
/// the value for `Y` carries `X<int>` as its outer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalTypeValue {
    pub outer: Option<Box<NormalTypeValue>>,
    pub type_id: MetaItemId,
    pub type_args: Vec<TypeValue>,
}

impl NormalTypeValue {
    pub fn new(outer: Option<NormalTypeValue>, type_id: MetaItemId, type_args: Vec<TypeValue>) -> Self {
        Self {
            outer: outer.map(Box::new),
            type_id,
            type_args,
        }
    }

    /// The full argument list, outermost level first.
    pub fn type_arg_list(&self) -> TypeArgumentList {
        TypeArgumentList::new(
            self.outer.as_ref().map(|outer| outer.type_arg_list()),
            self.type_args.clone(),
        )
    }
}

impl fmt::Display for NormalTypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(outer) = &self.outer {
            write!(f, "{}.", outer)?;
        }
        f.write_str(self.type_id.name())?;
        if !self.type_args.is_empty() {
            f.write_str("<")?;
            write_comma_separated(f, &self.type_args)?;
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Type arguments for every nesting level of a generic item: `args` binds the
/// item's own type parameters, `outer` those of the enclosing declarations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeArgumentList {
    pub outer: Option<Box<TypeArgumentList>>,
    pub args: Vec<TypeValue>,
}

impl TypeArgumentList {
    pub fn new(outer: Option<TypeArgumentList>, args: Vec<TypeValue>) -> Self {
        Self {
            outer: outer.map(Box::new),
            args,
        }
    }

    /// Number of nesting levels covered by this list.
    pub fn depth(&self) -> usize {
        1 + self.outer.as_ref().map_or(0, |outer| outer.depth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ModuleName;

    fn id(path: &[(&str, usize)]) -> MetaItemId {
        let mut id = MetaItemId::new(ModuleName::new("M"), path[0].0, path[0].1);
        for (name, count) in &path[1..] {
            id = id.child(name, *count);
        }
        id
    }

    #[test]
    fn nested_arg_list_mirrors_outer_chain() {
        let int = TypeValue::normal(None, id(&[("int", 0)]), vec![]);
        let string = TypeValue::normal(None, id(&[("string", 0)]), vec![]);
        let x = NormalTypeValue::new(None, id(&[("X", 1)]), vec![int.clone()]);
        let y = NormalTypeValue::new(Some(x), id(&[("X", 1), ("Y", 1)]), vec![string.clone()]);

        let list = y.type_arg_list();
        assert_eq!(list.depth(), 2);
        assert_eq!(list.args, vec![string]);
        assert_eq!(list.outer.as_ref().map(|o| o.args.clone()), Some(vec![int]));
        assert_eq!(y.to_string(), "X<int>.Y<string>");
    }
}
