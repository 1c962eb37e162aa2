// src/sema/skeleton.rs
//
// First pass over a script: record the identity of every declared function
// and enum before any type expression is resolved, so declarations can refer
// to each other regardless of order.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::errors::SemanticError;
use crate::frontend::{EnumDecl, FuncDecl, FuncKind, NodeId, Script, ScriptElement, Span};
use crate::identity::{MetaItemId, ModuleName};
use crate::sema::diagnostics::Diagnostics;
use crate::sema::module_info::{EnumElemInfo, ModuleInfo, TypeInfo, TypeKind};

#[derive(Debug, Clone, PartialEq)]
pub enum SkeletonKind {
    Func { is_sequence: bool },
    Enum { elems: Vec<Rc<str>> },
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: MetaItemId,
    pub node: NodeId,
    pub type_params: Vec<Rc<str>>,
    pub kind: SkeletonKind,
}

#[derive(Debug)]
pub struct SkeletonRepository {
    module: ModuleName,
    items: FxHashMap<MetaItemId, Skeleton>,
    order: Vec<MetaItemId>,
}

impl SkeletonRepository {
    pub fn collect(module: &ModuleName, script: &Script, diagnostics: &mut Diagnostics) -> Self {
        let mut repo = Self {
            module: module.clone(),
            items: FxHashMap::default(),
            order: Vec::new(),
        };
        for element in &script.elements {
            match element {
                ScriptElement::Func(decl) => repo.add_func(decl, diagnostics),
                ScriptElement::Enum(decl) => repo.add_enum(decl, diagnostics),
                ScriptElement::Stmt(_) => {}
            }
        }
        repo
    }

    pub fn module(&self) -> &ModuleName {
        &self.module
    }

    /// Id a declaration with this name and arity gets in the current module.
    pub fn item_id(&self, name: &str, type_param_count: usize) -> MetaItemId {
        MetaItemId::new(self.module.clone(), name, type_param_count)
    }

    fn add_func(&mut self, decl: &FuncDecl, diagnostics: &mut Diagnostics) {
        let skeleton = Skeleton {
            id: self.item_id(&decl.name, decl.type_params.len()),
            node: decl.id,
            type_params: decl.type_params.iter().map(|p| Rc::from(p.as_str())).collect(),
            kind: SkeletonKind::Func {
                is_sequence: decl.kind == FuncKind::Sequence,
            },
        };
        self.insert(skeleton, &decl.name, decl.span, diagnostics);
    }

    fn add_enum(&mut self, decl: &EnumDecl, diagnostics: &mut Diagnostics) {
        let skeleton = Skeleton {
            id: self.item_id(&decl.name, decl.type_params.len()),
            node: decl.id,
            type_params: decl.type_params.iter().map(|p| Rc::from(p.as_str())).collect(),
            kind: SkeletonKind::Enum {
                elems: decl.elems.iter().map(|e| Rc::from(e.name.as_str())).collect(),
            },
        };
        self.insert(skeleton, &decl.name, decl.span, diagnostics);
    }

    fn insert(
        &mut self,
        skeleton: Skeleton,
        name: &str,
        span: Span,
        diagnostics: &mut Diagnostics,
    ) {
        if self.items.contains_key(&skeleton.id) {
            diagnostics.add(
                SemanticError::DuplicateItem {
                    name: name.to_string(),
                    span: span.into(),
                },
                skeleton.node,
                span,
            );
            return;
        }
        tracing::trace!(id = %skeleton.id, "skeleton");
        self.order.push(skeleton.id.clone());
        self.items.insert(skeleton.id.clone(), skeleton);
    }

    /// Whether `decl` is the declaration that owns its id (duplicates are not).
    pub fn owns(&self, id: &MetaItemId, node: NodeId) -> bool {
        self.items.get(id).is_some_and(|skeleton| skeleton.node == node)
    }

    /// Skeletons in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Skeleton> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// A module view carrying only type identities, for resolving type
    /// expressions before any signature is known.
    pub fn to_module_info(&self) -> ModuleInfo {
        let mut module = ModuleInfo::new(self.module.clone());
        for skeleton in self.iter() {
            if let SkeletonKind::Enum { elems } = &skeleton.kind {
                let elems = elems.iter().map(|name| EnumElemInfo::new(name, Vec::new())).collect();
                module.add_type(TypeInfo {
                    id: skeleton.id.clone(),
                    type_params: skeleton.type_params.clone(),
                    base_type: None,
                    kind: TypeKind::Enum(elems),
                });
            }
        }
        module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::AstBuilder;

    #[test]
    fn duplicate_declarations_are_reported() {
        let b = AstBuilder::new();
        let script = b.script(vec![
            b.func(b.ty("void"), "f", &[], vec![], vec![]),
            b.func(b.ty("void"), "f", &[], vec![], vec![]),
            b.func(b.ty("void"), "f", &["T"], vec![], vec![]),
        ]);
        let mut diagnostics = Diagnostics::new();
        let repo = SkeletonRepository::collect(&ModuleName::new("Script"), &script, &mut diagnostics);

        assert_eq!(diagnostics.errors().len(), 1);
        assert!(matches!(
            diagnostics.errors()[0].error,
            SemanticError::DuplicateItem { .. }
        ));
        // `f` and `f<T>` differ by arity
        assert_eq!(repo.iter().count(), 2);
    }

    #[test]
    fn enum_skeleton_lists_elements() {
        let b = AstBuilder::new();
        let script = b.script(vec![b.enum_decl(
            "Option",
            &["T"],
            vec![("None", vec![]), ("Some", vec![b.param(b.ty("T"), "value")])],
        )]);
        let mut diagnostics = Diagnostics::new();
        let repo = SkeletonRepository::collect(&ModuleName::new("Script"), &script, &mut diagnostics);
        let module = repo.to_module_info();

        let info = module.type_info(&repo.item_id("Option", 1)).unwrap();
        assert!(info.enum_elem("Some").is_some());
        assert!(info.enum_elem("Other").is_none());
    }
}
