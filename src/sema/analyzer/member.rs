// src/sema/analyzer/member.rs
//
// `a.b` and `a[i]`. Whether `a` denotes a type (static access) or a value
// (instance access) is not visible from syntax, so the parent is first tried
// as a type name and only then analyzed as an expression.

use std::rc::Rc;

use crate::errors::{InternalError, SemanticError};
use crate::frontend::*;
use crate::identity::MetaItemId;
use crate::sema::analyze_info::{NodeInfo, StorageInfo};
use crate::sema::type_env::{apply_type_env, make_type_env};
use crate::sema::types::{FuncValue, NormalTypeValue, TypeValue, VarValue};
use crate::sema::well_known::{INDEXER_GET, INDEXER_SET};

use super::identifier::{Lookup, Resolved};
use super::{AnalyzeResult, Checker};

/// A member as declared on one type of a base chain.
enum FoundMember {
    Var(MetaItemId),
    Func(MetaItemId),
    /// Both a variable and a function carry the name
    Ambiguous,
}

pub(super) enum MemberResolution {
    Var {
        storage: StorageInfo,
        ty: TypeValue,
    },
    /// Function callable without an object
    Func {
        func: FuncValue,
        ty: TypeValue,
    },
    /// Function reached through an object
    Method {
        func: FuncValue,
        ty: TypeValue,
    },
    EnumElem {
        enum_type: NormalTypeValue,
        name: Rc<str>,
        ty: TypeValue,
    },
}

impl Checker<'_> {
    /// The type `exp` names, if it is a (possibly nested) type name rather
    /// than a value. Reports nothing.
    pub(super) fn try_type_of(&self, exp: &Exp) -> AnalyzeResult<Option<TypeValue>> {
        match &exp.kind {
            ExpKind::Identifier { name, type_args } => {
                let type_args = self.type_args(type_args)?;
                match self.lookup_identifier(name, &type_args) {
                    Lookup::Found(Resolved::Type(ty)) => Ok(Some(ty)),
                    _ => Ok(None),
                }
            }
            ExpKind::Member {
                parent,
                member_name,
                type_args,
            } => {
                let Some(TypeValue::Normal(outer)) = self.try_type_of(parent)? else {
                    return Ok(None);
                };
                let type_args = self.type_args(type_args)?;
                let id = self
                    .metadata
                    .get_member_type_id(&outer.type_id, member_name, type_args.len());
                Ok(id.map(|id| TypeValue::normal(Some(outer), id, type_args)))
            }
            _ => Ok(None),
        }
    }

    /// Find `name` on `ty` or the nearest base declaring it. Returns the
    /// declaring type with `ty`'s type arguments carried down the chain.
    fn find_member(
        &self,
        ty: &NormalTypeValue,
        name: &str,
        type_param_count: usize,
    ) -> Result<Option<(NormalTypeValue, FoundMember)>, InternalError> {
        let mut current = ty.clone();
        loop {
            let var = if type_param_count == 0 {
                self.metadata.get_member_var_id(&current.type_id, name)
            } else {
                None
            };
            let func = self
                .metadata
                .get_member_func_id(&current.type_id, name, type_param_count);
            let found = match (var, func) {
                (Some(_), Some(_)) => Some(FoundMember::Ambiguous),
                (Some(var), None) => Some(FoundMember::Var(var)),
                (None, Some(func)) => Some(FoundMember::Func(func)),
                (None, None) => None,
            };
            if let Some(found) = found {
                return Ok(Some((current, found)));
            }
            match self.metadata.get_base_type_value(&current)? {
                Some(base) => current = base,
                None => return Ok(None),
            }
        }
    }

    fn ambiguous_member<T>(&mut self, ty: &TypeValue, member: &str, node: NodeId, span: Span) -> AnalyzeResult<T> {
        self.fail(
            SemanticError::AmbiguousMember {
                ty: ty.to_string(),
                member: member.to_string(),
                span: span.into(),
            },
            node,
            span,
        )
    }

    fn static_instance_mismatch<T>(&mut self, detail: String, node: NodeId, span: Span) -> AnalyzeResult<T> {
        self.fail(SemanticError::StaticInstanceMismatch { detail, span: span.into() }, node, span)
    }

    /// `Type.name`: an enum element, a static variable or a static function.
    pub(super) fn resolve_static_member(
        &mut self,
        ty: &TypeValue,
        name: &str,
        type_args: &[TypeValue],
        node: NodeId,
        span: Span,
    ) -> AnalyzeResult<MemberResolution> {
        let TypeValue::Normal(normal) = ty else {
            return self.unknown_member(ty, name, node, span);
        };

        if type_args.is_empty() {
            let info = self.metadata.expect_type_info(&normal.type_id)?;
            if let Some(elem) = info.enum_elem(name) {
                let env = make_type_env(&self.metadata, normal)?;
                let enum_value = TypeValue::Normal(normal.clone());
                let elem_ty = if elem.fields.is_empty() {
                    enum_value
                } else {
                    let params = elem.fields.iter().map(|(_, field)| apply_type_env(field, &env)).collect();
                    TypeValue::func(enum_value, params)
                };
                return Ok(MemberResolution::EnumElem {
                    enum_type: normal.clone(),
                    name: elem.name.clone(),
                    ty: elem_ty,
                });
            }
        }

        match self.find_member(normal, name, type_args.len())? {
            Some((owner, FoundMember::Var(id))) => {
                let info = self.metadata.get_var_info(&id).ok_or(InternalError::MissingItem(id.clone()))?;
                if !info.is_static {
                    return self.static_instance_mismatch(
                        format!("'{name}' is an instance member of '{ty}' and needs an object"),
                        node,
                        span,
                    );
                }
                let env = make_type_env(&self.metadata, &owner)?;
                let var_ty = apply_type_env(&info.type_value, &env);
                Ok(MemberResolution::Var {
                    storage: StorageInfo::StaticMember {
                        object: None,
                        var: VarValue::new(owner, id),
                    },
                    ty: var_ty,
                })
            }
            Some((owner, FoundMember::Func(id))) => {
                let info = self.metadata.expect_func_info(&id)?;
                if info.is_instance {
                    return self.static_instance_mismatch(
                        format!("'{name}' is an instance method of '{ty}' and needs an object"),
                        node,
                        span,
                    );
                }
                let func = FuncValue::new(Some(owner), id, type_args.to_vec());
                let func_ty = self.func_type(&func)?;
                Ok(MemberResolution::Func { func, ty: func_ty })
            }
            Some((_, FoundMember::Ambiguous)) => self.ambiguous_member(ty, name, node, span),
            None => self.unknown_member(ty, name, node, span),
        }
    }

    /// `value.name` where `object` has already been analyzed to `object_ty`.
    pub(super) fn resolve_instance_member(
        &mut self,
        object: &Exp,
        object_ty: &TypeValue,
        name: &str,
        type_args: &[TypeValue],
        node: NodeId,
        span: Span,
    ) -> AnalyzeResult<MemberResolution> {
        let normal = match object_ty {
            TypeValue::Normal(normal) => normal,
            // Fields of a narrowed enum element
            TypeValue::EnumElem { enum_type, name: elem } if type_args.is_empty() => {
                let info = self.metadata.expect_type_info(&enum_type.type_id)?;
                let field = info.enum_elem(elem).and_then(|elem| elem.field_type(name));
                let Some(field) = field else {
                    return self.unknown_member(object_ty, name, node, span);
                };
                let env = make_type_env(&self.metadata, enum_type)?;
                return Ok(MemberResolution::Var {
                    storage: StorageInfo::InstanceMember {
                        object: object.id,
                        object_type: object_ty.clone(),
                        name: Rc::from(name),
                    },
                    ty: apply_type_env(field, &env),
                });
            }
            _ => return self.unknown_member(object_ty, name, node, span),
        };

        match self.find_member(normal, name, type_args.len())? {
            Some((owner, FoundMember::Var(id))) => {
                let info = self.metadata.get_var_info(&id).ok_or(InternalError::MissingItem(id.clone()))?;
                let env = make_type_env(&self.metadata, &owner)?;
                let var_ty = apply_type_env(&info.type_value, &env);
                let storage = if info.is_static {
                    StorageInfo::StaticMember {
                        object: Some(object.id),
                        var: VarValue::new(owner, id),
                    }
                } else {
                    StorageInfo::InstanceMember {
                        object: object.id,
                        object_type: object_ty.clone(),
                        name: Rc::from(name),
                    }
                };
                Ok(MemberResolution::Var { storage, ty: var_ty })
            }
            Some((owner, FoundMember::Func(id))) => {
                let func = FuncValue::new(Some(owner), id, type_args.to_vec());
                let func_ty = self.func_type(&func)?;
                Ok(MemberResolution::Method { func, ty: func_ty })
            }
            Some((_, FoundMember::Ambiguous)) => self.ambiguous_member(object_ty, name, node, span),
            None => self.unknown_member(object_ty, name, node, span),
        }
    }

    /// Resolve `parent.name`, analyzing `parent` as a value when it is not a type.
    pub(super) fn resolve_member(
        &mut self,
        parent: &Exp,
        name: &str,
        type_args: &[TypeValue],
        node: NodeId,
        span: Span,
    ) -> AnalyzeResult<MemberResolution> {
        if let Some(ty) = self.try_type_of(parent)? {
            return self.resolve_static_member(&ty, name, type_args, node, span);
        }
        let object_ty = self.analyze_value(parent, None)?;
        self.resolve_instance_member(parent, &object_ty, name, type_args, node, span)
    }

    pub(super) fn analyze_member(
        &mut self,
        exp: &Exp,
        parent: &Exp,
        member_name: &str,
        type_args: &[TypeExp],
    ) -> AnalyzeResult<TypeValue> {
        let type_args = self.type_args(type_args)?;
        match self.resolve_member(parent, member_name, &type_args, exp.id, exp.span)? {
            MemberResolution::Var { storage, ty } => {
                self.record(exp.id, NodeInfo::Var { storage, ty: ty.clone() })?;
                Ok(ty)
            }
            MemberResolution::Func { func, ty } => {
                self.record(exp.id, NodeInfo::Func { func, ty: ty.clone() })?;
                Ok(ty)
            }
            MemberResolution::Method { .. } => self.unsupported("methods as values", exp.id, exp.span),
            MemberResolution::EnumElem { enum_type, name, ty } => {
                self.record(
                    exp.id,
                    NodeInfo::EnumElem {
                        enum_type,
                        name,
                        ty: ty.clone(),
                    },
                )?;
                Ok(ty)
            }
        }
    }

    /// Getter, and setter when `need_setter`, for `object_ty[...]`.
    pub(super) fn indexer_accessors(
        &mut self,
        object_ty: &TypeValue,
        need_setter: bool,
        node: NodeId,
        span: Span,
    ) -> AnalyzeResult<(FuncValue, Option<FuncValue>)> {
        let Some(normal) = object_ty.as_normal() else {
            return self.unknown_member(object_ty, "[]", node, span);
        };
        let getter = match self.find_member(normal, INDEXER_GET, 0)? {
            Some((owner, FoundMember::Func(id))) => FuncValue::new(Some(owner), id, vec![]),
            _ => return self.unknown_member(object_ty, "[]", node, span),
        };
        if !need_setter {
            return Ok((getter, None));
        }
        match self.find_member(normal, INDEXER_SET, 0)? {
            Some((owner, FoundMember::Func(id))) => Ok((getter, Some(FuncValue::new(Some(owner), id, vec![])))),
            _ => self.fail(SemanticError::InvalidAssignTarget { span: span.into() }, node, span),
        }
    }

    /// Check `index` against the getter's single parameter; returns the element type.
    pub(super) fn check_indexer_arg(
        &mut self,
        getter: &FuncValue,
        index: &Exp,
        node: NodeId,
        span: Span,
    ) -> AnalyzeResult<TypeValue> {
        let (ret, params) = self.func_signature(getter)?;
        self.check_args(node, span, &params, std::slice::from_ref(index))?;
        Ok(ret)
    }

    pub(super) fn analyze_indexer(&mut self, exp: &Exp, object: &Exp, index: &Exp) -> AnalyzeResult<TypeValue> {
        let object_ty = self.analyze_value(object, None)?;
        let (getter, _) = self.indexer_accessors(&object_ty, false, exp.id, exp.span)?;
        let ty = self.check_indexer_arg(&getter, index, exp.id, exp.span)?;
        self.record(exp.id, NodeInfo::Indexer { getter, ty: ty.clone() })?;
        Ok(ty)
    }
}
