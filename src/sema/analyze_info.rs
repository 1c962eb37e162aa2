// src/sema/analyze_info.rs
//
// The analysis result handed to the evaluator: one info record per analyzed
// node, the private-global count and a template per function body.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::errors::InternalError;
use crate::frontend::{BinaryOpKind, NodeId, UnaryOpKind};
use crate::identity::MetaItemId;
use crate::sema::capture::CaptureKind;
use crate::sema::types::{FuncValue, NormalTypeValue, TypeValue, VarValue};

/// Where a resolved variable lives.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageInfo {
    Local(usize),
    PrivateGlobal(usize),
    ModuleGlobal(MetaItemId),
    /// `object` is set when a static member was reached through a value
    StaticMember {
        object: Option<NodeId>,
        var: VarValue,
    },
    InstanceMember {
        object: NodeId,
        object_type: TypeValue,
        name: Rc<str>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedVar {
    pub name: Rc<str>,
    pub kind: CaptureKind,
    /// Storage in the enclosing function
    pub storage: StorageInfo,
    pub ty: TypeValue,
}

/// Capture plan for one closure boundary. In a lambda, captured variable
/// `i` occupies local slot `i`; parameters follow the captures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureInfo {
    pub captures_this: bool,
    pub captures: Vec<CapturedVar>,
}

/// Built-in operand type an operator was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Int,
    Bool,
    String,
}

/// A location that can be written: either a plain storage slot or a
/// getter/setter pair (indexers).
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Direct(StorageInfo),
    Call {
        object: NodeId,
        object_type: TypeValue,
        getter: FuncValue,
        setter: FuncValue,
        args: Vec<NodeId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclElemInfo {
    pub name: Rc<str>,
    pub storage: StorageInfo,
    pub ty: TypeValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    /// Statically known function
    Func(FuncValue),
    /// First-class function value produced by the callee expression
    Value(NodeId),
    EnumElem { enum_type: NormalTypeValue, name: Rc<str> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeInfo {
    VarDecl {
        elems: Vec<VarDeclElemInfo>,
    },
    /// Identifier or member access naming a variable
    Var {
        storage: StorageInfo,
        ty: TypeValue,
    },
    /// Identifier or member access naming a function, used as a value
    Func {
        func: FuncValue,
        ty: TypeValue,
    },
    /// `E.A`: a fieldless element value, or an element constructor
    EnumElem {
        enum_type: NormalTypeValue,
        name: Rc<str>,
        ty: TypeValue,
    },
    Literal {
        ty: TypeValue,
    },
    Call {
        callee: Callee,
        arg_types: Vec<TypeValue>,
        ret: TypeValue,
    },
    MemberCall {
        /// `None` for static calls
        object: Option<NodeId>,
        func: FuncValue,
        arg_types: Vec<TypeValue>,
        ret: TypeValue,
    },
    Indexer {
        getter: FuncValue,
        ty: TypeValue,
    },
    BinaryOp {
        op: BinaryOpKind,
        operand: OperandKind,
        ty: TypeValue,
    },
    Assign {
        target: AssignTarget,
        ty: TypeValue,
    },
    UnaryOp {
        op: UnaryOpKind,
        /// Set for increment/decrement
        target: Option<AssignTarget>,
        ty: TypeValue,
    },
    Lambda {
        func_id: MetaItemId,
        capture: CaptureInfo,
        ty: TypeValue,
    },
    List {
        elem_type: TypeValue,
    },
    /// task/await/async block
    Capture {
        capture: CaptureInfo,
    },
    Foreach {
        elem_type: TypeValue,
        storage: StorageInfo,
    },
    IfTest {
        test_type: TypeValue,
        /// Variable narrowed inside the then-branch
        narrowed: Option<StorageInfo>,
    },
}

/// An analyzed function or lambda body.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncTemplate {
    pub id: MetaItemId,
    pub local_var_count: usize,
    pub ret_type: Option<TypeValue>,
    pub is_this_call: bool,
    pub is_sequence: bool,
    pub body: NodeId,
}

#[derive(Debug, Default)]
pub struct AnalyzeInfo {
    infos: FxHashMap<NodeId, NodeInfo>,
    templates: FxHashMap<MetaItemId, FuncTemplate>,
    pub private_global_count: usize,
    pub top_level_local_var_count: usize,
}

impl AnalyzeInfo {
    pub fn get(&self, node: NodeId) -> Option<&NodeInfo> {
        self.infos.get(&node)
    }

    pub fn template(&self, id: &MetaItemId) -> Option<&FuncTemplate> {
        self.templates.get(id)
    }

    pub fn templates(&self) -> impl Iterator<Item = &FuncTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub(crate) fn insert(&mut self, node: NodeId, info: NodeInfo) -> Result<(), InternalError> {
        if self.infos.insert(node, info).is_some() {
            return Err(InternalError::DuplicateNodeInfo(node));
        }
        Ok(())
    }

    pub(crate) fn add_template(&mut self, template: FuncTemplate) {
        tracing::debug!(id = %template.id, locals = template.local_var_count, "template");
        self.templates.insert(template.id.clone(), template);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_info_is_write_once() {
        let mut info = AnalyzeInfo::default();
        let node = NodeId(7);
        info.insert(node, NodeInfo::List { elem_type: TypeValue::Void }).unwrap();
        assert_eq!(
            info.insert(node, NodeInfo::List { elem_type: TypeValue::Void }),
            Err(InternalError::DuplicateNodeInfo(node))
        );
        assert_eq!(info.len(), 1);
    }
}
