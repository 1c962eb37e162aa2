// src/sema/scope.rs
//
// Per-function analysis state: local variable slots, block scoping via
// snapshots, the fixed return type and narrowing overrides. Script-private
// globals live in their own table shared by the whole script.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::identity::MetaItemId;
use crate::sema::types::TypeValue;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVarInfo {
    pub index: usize,
    pub ty: TypeValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    /// Fixed by the first `return` encountered
    Unset,
    Declared(TypeValue),
    Inferred(TypeValue),
}

impl ReturnType {
    pub fn fixed(&self) -> Option<&TypeValue> {
        match self {
            ReturnType::Unset => None,
            ReturnType::Declared(ty) | ReturnType::Inferred(ty) => Some(ty),
        }
    }
}

/// Names visible at some point in a function; restoring one hides every
/// name declared after it was taken.
#[derive(Debug, Clone)]
pub struct ScopeSnapshot {
    names: FxHashMap<Rc<str>, LocalVarInfo>,
    overrides: FxHashMap<Rc<str>, TypeValue>,
}

#[derive(Debug)]
pub struct FuncContext {
    id: MetaItemId,
    ret: ReturnType,
    is_sequence: bool,
    lambda_count: usize,
    names: FxHashMap<Rc<str>, LocalVarInfo>,
    /// Slots are handed out monotonically and never reused
    local_count: usize,
    overrides: FxHashMap<Rc<str>, TypeValue>,
}

impl FuncContext {
    pub fn new(id: MetaItemId, ret: ReturnType, is_sequence: bool) -> Self {
        Self {
            id,
            ret,
            is_sequence,
            lambda_count: 0,
            names: FxHashMap::default(),
            local_count: 0,
            overrides: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> &MetaItemId {
        &self.id
    }

    pub fn ret(&self) -> &ReturnType {
        &self.ret
    }

    pub fn infer_ret(&mut self, ty: TypeValue) {
        self.ret = ReturnType::Inferred(ty);
    }

    pub fn is_sequence(&self) -> bool {
        self.is_sequence
    }

    pub fn local_count(&self) -> usize {
        self.local_count
    }

    /// Register a local in the innermost scope and return its slot.
    pub fn add_local(&mut self, name: &str, ty: TypeValue) -> usize {
        let index = self.local_count;
        self.local_count += 1;
        let name: Rc<str> = Rc::from(name);
        self.overrides.remove(&name);
        self.names.insert(name, LocalVarInfo { index, ty });
        index
    }

    pub fn get_local(&self, name: &str) -> Option<&LocalVarInfo> {
        self.names.get(name)
    }

    pub fn set_override(&mut self, name: &str, ty: TypeValue) {
        self.overrides.insert(Rc::from(name), ty);
    }

    pub fn get_override(&self, name: &str) -> Option<&TypeValue> {
        self.overrides.get(name)
    }

    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            names: self.names.clone(),
            overrides: self.overrides.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: ScopeSnapshot) {
        self.names = snapshot.names;
        self.overrides = snapshot.overrides;
    }

    /// Id for the next lambda nested directly in this function.
    pub fn new_lambda_id(&mut self) -> MetaItemId {
        let name = format!("$lambda{}", self.lambda_count);
        self.lambda_count += 1;
        self.id.child(&name, 0)
    }
}

/// Script-level variables visible to every function of the script but not
/// exported from its module.
#[derive(Debug, Default)]
pub struct PrivateGlobalTable {
    names: FxHashMap<Rc<str>, LocalVarInfo>,
    count: usize,
}

impl PrivateGlobalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, ty: TypeValue) -> usize {
        let index = self.count;
        self.count += 1;
        self.names.insert(Rc::from(name), LocalVarInfo { index, ty });
        index
    }

    pub fn get(&self, name: &str) -> Option<&LocalVarInfo> {
        self.names.get(name)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ModuleName;

    fn ctx() -> FuncContext {
        let id = MetaItemId::new(ModuleName::new("Script"), "f", 0);
        FuncContext::new(id, ReturnType::Unset, false)
    }

    #[test]
    fn restore_hides_names_but_keeps_slots_reserved() {
        let mut ctx = ctx();
        ctx.add_local("a", TypeValue::Void);
        let snapshot = ctx.snapshot();
        assert_eq!(ctx.add_local("b", TypeValue::Void), 1);
        ctx.restore(snapshot);

        assert!(ctx.get_local("b").is_none());
        assert!(ctx.get_local("a").is_some());
        assert_eq!(ctx.add_local("c", TypeValue::Void), 2);
        assert_eq!(ctx.local_count(), 3);
    }

    #[test]
    fn redeclaring_clears_narrowing() {
        let mut ctx = ctx();
        ctx.add_local("x", TypeValue::Void);
        ctx.set_override("x", TypeValue::Var);
        assert_eq!(ctx.get_override("x"), Some(&TypeValue::Var));
        ctx.add_local("x", TypeValue::Void);
        assert!(ctx.get_override("x").is_none());
    }

    #[test]
    fn lambda_ids_are_distinct_children() {
        let mut ctx = ctx();
        let first = ctx.new_lambda_id();
        let second = ctx.new_lambda_id();
        assert_ne!(first, second);
        assert_eq!(first.parent().as_ref(), Some(ctx.id()));
    }
}
