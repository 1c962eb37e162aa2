// src/sema/type_env.rs
//
// Generic substitution. A TypeEnv binds `(owner, param)` pairs to concrete
// type values; it is built from a nominal type's outer chain (or a function
// value's outer type plus its own arguments) and applied structurally to any
// TypeValue declared in terms of those parameters.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::errors::InternalError;
use crate::identity::MetaItemId;
use crate::sema::metadata::MetadataService;
use crate::sema::types::{FuncValue, NormalTypeValue, TypeArgumentList, TypeValue};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeEnv {
    bindings: FxHashMap<(MetaItemId, Rc<str>), TypeValue>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, owner: MetaItemId, param: Rc<str>, value: TypeValue) {
        self.bindings.insert((owner, param), value);
    }

    pub fn get(&self, owner: &MetaItemId, param: &str) -> Option<&TypeValue> {
        self.bindings.get(&(owner.clone(), Rc::from(param)))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Bind every type parameter along `ty`'s outer chain, outermost first.
pub fn make_type_env(
    metadata: &MetadataService<'_>,
    ty: &NormalTypeValue,
) -> Result<TypeEnv, InternalError> {
    let mut env = TypeEnv::new();
    bind_arg_list(metadata, &ty.type_id, &ty.type_arg_list(), &mut env)?;
    Ok(env)
}

/// Bind the declaring type's parameters, then the function's own.
pub fn make_func_type_env(
    metadata: &MetadataService<'_>,
    func: &FuncValue,
) -> Result<TypeEnv, InternalError> {
    let mut env = TypeEnv::new();
    bind_arg_list(metadata, &func.func_id, &func.type_arg_list(), &mut env)?;
    Ok(env)
}

/// Each outer level of `list` belongs to the next enclosing item of `owner`.
fn bind_arg_list(
    metadata: &MetadataService<'_>,
    owner: &MetaItemId,
    list: &TypeArgumentList,
    env: &mut TypeEnv,
) -> Result<(), InternalError> {
    if let Some(outer) = &list.outer {
        let Some(parent) = owner.parent() else {
            return Err(InternalError::ArgListDepth {
                item: owner.clone(),
                depth: list.depth(),
            });
        };
        bind_arg_list(metadata, &parent, outer, env)?;
    }
    bind_args(metadata, owner, &list.args, env)
}

fn bind_args(
    metadata: &MetadataService<'_>,
    owner: &MetaItemId,
    args: &[TypeValue],
    env: &mut TypeEnv,
) -> Result<(), InternalError> {
    let params = metadata.get_type_params(owner)?;
    if params.len() != args.len() {
        return Err(InternalError::TypeArgArity {
            item: owner.clone(),
            expected: params.len(),
            found: args.len(),
        });
    }
    for (param, arg) in params.iter().zip(args) {
        env.bind(owner.clone(), param.clone(), arg.clone());
    }
    Ok(())
}

/// Substitute every bound type variable in `ty`. Unbound variables stay open.
pub fn apply_type_env(ty: &TypeValue, env: &TypeEnv) -> TypeValue {
    if env.is_empty() {
        return ty.clone();
    }
    match ty {
        TypeValue::TypeVar { parent, name } => env
            .get(parent, name)
            .cloned()
            .unwrap_or_else(|| ty.clone()),
        TypeValue::Normal(normal) => TypeValue::Normal(apply_type_env_normal(normal, env)),
        TypeValue::Func { ret, params } => TypeValue::Func {
            ret: Box::new(apply_type_env(ret, env)),
            params: params.iter().map(|p| apply_type_env(p, env)).collect(),
        },
        TypeValue::EnumElem { enum_type, name } => TypeValue::EnumElem {
            enum_type: apply_type_env_normal(enum_type, env),
            name: name.clone(),
        },
        TypeValue::Var | TypeValue::Void => ty.clone(),
    }
}

pub fn apply_type_env_normal(ty: &NormalTypeValue, env: &TypeEnv) -> NormalTypeValue {
    NormalTypeValue {
        outer: ty
            .outer
            .as_ref()
            .map(|outer| Box::new(apply_type_env_normal(outer, env))),
        type_id: ty.type_id.clone(),
        type_args: ty
            .type_args
            .iter()
            .map(|arg| apply_type_env(arg, env))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ModuleName;
    use crate::sema::module_info::{FuncInfo, ModuleInfo, TypeInfo, TypeKind};

    struct Fixture {
        module: ModuleInfo,
        int: TypeValue,
        string: TypeValue,
        x: MetaItemId,
        y: MetaItemId,
    }

    // class X<T> { class Y<U> { } }
    fn fixture() -> Fixture {
        let mut module = ModuleInfo::new(ModuleName::new("M"));
        let int_id = module.item_id("int", 0);
        let string_id = module.item_id("string", 0);
        let x = module.item_id("X", 1);
        let y = x.child("Y", 1);
        module.add_type(TypeInfo::new(int_id.clone(), &[], TypeKind::Struct));
        module.add_type(TypeInfo::new(string_id.clone(), &[], TypeKind::Class));
        module.add_type(TypeInfo::new(x.clone(), &["T"], TypeKind::Class));
        module.add_type(TypeInfo::new(y.clone(), &["U"], TypeKind::Class));
        Fixture {
            module,
            int: TypeValue::normal(None, int_id, vec![]),
            string: TypeValue::normal(None, string_id, vec![]),
            x,
            y,
        }
    }

    #[test]
    fn empty_env_is_identity_for_every_shape() {
        let f = fixture();
        let x_int = NormalTypeValue::new(None, f.x.clone(), vec![f.int.clone()]);
        let shapes = vec![
            TypeValue::Var,
            TypeValue::Void,
            TypeValue::type_var(f.x.clone(), "T"),
            f.int.clone(),
            TypeValue::normal(Some(x_int.clone()), f.y.clone(), vec![TypeValue::type_var(f.y.clone(), "U")]),
            TypeValue::func(f.string.clone(), vec![f.int.clone(), TypeValue::type_var(f.x.clone(), "T")]),
            TypeValue::enum_elem(x_int, "A"),
        ];
        let env = TypeEnv::new();
        for shape in shapes {
            assert_eq!(apply_type_env(&shape, &env), shape);
        }
    }

    #[test]
    fn nested_generic_binds_outer_and_inner_params() {
        let f = fixture();
        let metadata = MetadataService::new(&f.module, &[]);
        let x_int = NormalTypeValue::new(None, f.x.clone(), vec![f.int.clone()]);
        let y_string = NormalTypeValue::new(Some(x_int), f.y.clone(), vec![f.string.clone()]);

        let env = make_type_env(&metadata, &y_string).unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(apply_type_env(&TypeValue::type_var(f.x.clone(), "T"), &env), f.int);
        assert_eq!(apply_type_env(&TypeValue::type_var(f.y.clone(), "U"), &env), f.string);
    }

    #[test]
    fn substitution_recurses_into_function_signatures() {
        let f = fixture();
        let metadata = MetadataService::new(&f.module, &[]);
        let x_int = NormalTypeValue::new(None, f.x.clone(), vec![f.int.clone()]);
        let env = make_type_env(&metadata, &x_int).unwrap();

        let t = TypeValue::type_var(f.x.clone(), "T");
        let sig = TypeValue::func(t.clone(), vec![TypeValue::normal(None, f.x.clone(), vec![t])]);
        let applied = apply_type_env(&sig, &env);
        assert_eq!(
            applied,
            TypeValue::func(f.int.clone(), vec![TypeValue::Normal(x_int)])
        );
    }

    #[test]
    fn unbound_type_var_stays_open() {
        let f = fixture();
        let metadata = MetadataService::new(&f.module, &[]);
        let x_int = NormalTypeValue::new(None, f.x.clone(), vec![f.int.clone()]);
        let env = make_type_env(&metadata, &x_int).unwrap();
        let open = TypeValue::type_var(f.y.clone(), "U");
        assert_eq!(apply_type_env(&open, &env), open);
    }

    #[test]
    fn arity_mismatch_is_internal_error() {
        let f = fixture();
        let metadata = MetadataService::new(&f.module, &[]);
        let bad = NormalTypeValue::new(None, f.x.clone(), vec![]);
        assert_eq!(
            make_type_env(&metadata, &bad),
            Err(InternalError::TypeArgArity {
                item: f.x.clone(),
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn func_env_binds_outer_type_and_own_params() {
        let mut f = fixture();
        // X<T>.Map<V>(T, V) -> V
        let map = f.x.child("Map", 1);
        f.module.add_func(
            FuncInfo::new(map.clone(), TypeValue::type_var(map.clone(), "V"), vec![])
                .with_type_params(&["V"]),
        );
        let metadata = MetadataService::new(&f.module, &[]);
        let x_int = NormalTypeValue::new(None, f.x.clone(), vec![f.int.clone()]);
        let value = FuncValue::new(Some(x_int), map.clone(), vec![f.string.clone()]);

        let env = make_func_type_env(&metadata, &value).unwrap();
        assert_eq!(apply_type_env(&TypeValue::type_var(f.x.clone(), "T"), &env), f.int);
        assert_eq!(apply_type_env(&TypeValue::type_var(map, "V"), &env), f.string);
    }

    #[test]
    fn arg_list_deeper_than_item_nesting_is_internal_error() {
        let f = fixture();
        let metadata = MetadataService::new(&f.module, &[]);
        let x_int = NormalTypeValue::new(None, f.x.clone(), vec![f.int.clone()]);
        // `X` is top level, so it has no enclosing item to take the outer level
        let bad = NormalTypeValue::new(Some(x_int), f.x.clone(), vec![f.string.clone()]);
        assert_eq!(
            make_type_env(&metadata, &bad),
            Err(InternalError::ArgListDepth {
                item: f.x.clone(),
                depth: 2
            })
        );
    }
}
