// src/sema/types/values.rs
//
// Resolved references to functions and variables, with the type arguments
// that instantiate them.

use std::fmt;

use crate::identity::MetaItemId;

use super::{NormalTypeValue, TypeArgumentList, TypeValue, write_comma_separated};

/// A function resolved at analysis time: its declaration id, the (applied)
/// type it is a member of, and its own type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncValue {
    pub outer: Option<NormalTypeValue>,
    pub func_id: MetaItemId,
    pub type_args: Vec<TypeValue>,
}

impl FuncValue {
    pub fn new(outer: Option<NormalTypeValue>, func_id: MetaItemId, type_args: Vec<TypeValue>) -> Self {
        Self {
            outer,
            func_id,
            type_args,
        }
    }

    pub fn type_arg_list(&self) -> TypeArgumentList {
        TypeArgumentList::new(
            self.outer.as_ref().map(NormalTypeValue::type_arg_list),
            self.type_args.clone(),
        )
    }
}

impl fmt::Display for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(outer) = &self.outer {
            write!(f, "{}.", outer)?;
        }
        f.write_str(self.func_id.name())?;
        if !self.type_args.is_empty() {
            f.write_str("<")?;
            write_comma_separated(f, &self.type_args)?;
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// A member variable resolved against its (applied) declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarValue {
    pub outer: NormalTypeValue,
    pub var_id: MetaItemId,
}

impl VarValue {
    pub fn new(outer: NormalTypeValue, var_id: MetaItemId) -> Self {
        Self { outer, var_id }
    }
}
