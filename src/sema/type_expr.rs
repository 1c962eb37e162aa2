// src/sema/type_expr.rs
//
// Resolve every syntactic type expression in a script to a TypeValue.
//
// Generic parameters of the enclosing declarations shadow everything else.
// Other names are looked up by `(name, type argument count)` across the
// current module's skeletons and every referenced module; exactly one match
// must exist. A node that fails is reported once and recorded as failed, so
// later stages know the diagnostic already exists.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{InternalError, SemanticError};
use crate::frontend::*;
use crate::identity::MetaItemId;
use crate::sema::diagnostics::Diagnostics;
use crate::sema::metadata::MetadataService;
use crate::sema::skeleton::SkeletonRepository;
use crate::sema::types::{NormalTypeValue, TypeValue};

/// Evaluated type expressions, keyed by type-expression node.
#[derive(Debug, Default)]
pub struct TypeExpInfo {
    values: FxHashMap<NodeId, TypeValue>,
    failed: FxHashSet<NodeId>,
}

impl TypeExpInfo {
    pub fn get(&self, id: NodeId) -> Option<&TypeValue> {
        self.values.get(&id)
    }

    /// `Ok(None)` when evaluation failed and was reported; an error when the
    /// node was never evaluated at all.
    pub fn lookup(&self, id: NodeId) -> Result<Option<&TypeValue>, InternalError> {
        if let Some(value) = self.values.get(&id) {
            return Ok(Some(value));
        }
        if self.failed.contains(&id) {
            return Ok(None);
        }
        Err(InternalError::MissingTypeExp(id))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub struct TypeExpEvaluator<'a> {
    metadata: MetadataService<'a>,
    skeletons: &'a SkeletonRepository,
    diagnostics: &'a mut Diagnostics,
    /// Type parameters in scope, innermost declaration last
    type_vars: Vec<(MetaItemId, Vec<Rc<str>>)>,
    info: TypeExpInfo,
}

impl<'a> TypeExpEvaluator<'a> {
    pub fn new(
        metadata: MetadataService<'a>,
        skeletons: &'a SkeletonRepository,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            metadata,
            skeletons,
            diagnostics,
            type_vars: Vec::new(),
            info: TypeExpInfo::default(),
        }
    }

    pub fn evaluate(mut self, script: &Script) -> TypeExpInfo {
        for element in &script.elements {
            match element {
                ScriptElement::Func(decl) => self.visit_func(decl),
                ScriptElement::Enum(decl) => self.visit_enum(decl),
                ScriptElement::Stmt(stmt) => self.visit_stmt(stmt),
            }
        }
        tracing::debug!(count = self.info.len(), failed = self.info.failed.len(), "type expressions evaluated");
        self.info
    }

    fn with_type_params(&mut self, owner: MetaItemId, params: &[String], f: impl FnOnce(&mut Self)) {
        let params = params.iter().map(|p| Rc::from(p.as_str())).collect();
        self.type_vars.push((owner, params));
        f(self);
        self.type_vars.pop();
    }

    fn visit_func(&mut self, decl: &FuncDecl) {
        let owner = self.skeletons.item_id(&decl.name, decl.type_params.len());
        self.with_type_params(owner, &decl.type_params, |this| {
            this.eval(&decl.ret_type);
            for param in &decl.params {
                this.eval(&param.ty);
            }
            this.visit_stmt(&decl.body);
        });
    }

    fn visit_enum(&mut self, decl: &EnumDecl) {
        let owner = self.skeletons.item_id(&decl.name, decl.type_params.len());
        self.with_type_params(owner, &decl.type_params, |this| {
            for elem in &decl.elems {
                for param in &elem.params {
                    this.eval(&param.ty);
                }
            }
        });
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Command(commands) => {
                for command in commands {
                    self.visit_string(command);
                }
            }
            StmtKind::VarDecl(decl) => self.visit_var_decl(decl),
            StmtKind::If(if_stmt) => {
                self.visit_exp(&if_stmt.cond);
                self.visit_stmt(&if_stmt.body);
                if let Some(else_body) = &if_stmt.else_body {
                    self.visit_stmt(else_body);
                }
            }
            StmtKind::IfTest(test) => {
                self.visit_exp(&test.target);
                self.eval(&test.test_type);
                self.visit_stmt(&test.body);
                if let Some(else_body) = &test.else_body {
                    self.visit_stmt(else_body);
                }
            }
            StmtKind::For(for_stmt) => {
                match &for_stmt.init {
                    Some(ForInitializer::VarDecl(decl)) => self.visit_var_decl(decl),
                    Some(ForInitializer::Exp(exp)) => self.visit_exp(exp),
                    None => {}
                }
                if let Some(cond) = &for_stmt.cond {
                    self.visit_exp(cond);
                }
                if let Some(cont) = &for_stmt.cont {
                    self.visit_exp(cont);
                }
                self.visit_stmt(&for_stmt.body);
            }
            StmtKind::Foreach(foreach) => {
                self.eval(&foreach.ty);
                self.visit_exp(&foreach.iterator);
                self.visit_stmt(&foreach.body);
            }
            StmtKind::Return(Some(exp)) | StmtKind::Exp(exp) | StmtKind::Yield(exp) => {
                self.visit_exp(exp)
            }
            StmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.visit_stmt(stmt);
                }
            }
            StmtKind::Task(body) | StmtKind::Await(body) | StmtKind::Async(body) => {
                self.visit_stmt(body)
            }
            StmtKind::Return(None) | StmtKind::Continue | StmtKind::Break | StmtKind::Blank => {}
        }
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        self.eval(&decl.ty);
        for elem in &decl.elems {
            if let Some(init) = &elem.init {
                self.visit_exp(init);
            }
        }
    }

    fn visit_string(&mut self, string: &StringExp) {
        for element in &string.elements {
            if let StringExpElement::Exp(exp) = element {
                self.visit_exp(exp);
            }
        }
    }

    fn visit_exp(&mut self, exp: &Exp) {
        match &exp.kind {
            ExpKind::Identifier { type_args, .. } => self.eval_all(type_args),
            ExpKind::String(string) => self.visit_string(string),
            ExpKind::IntLiteral(_) | ExpKind::BoolLiteral(_) => {}
            ExpKind::BinaryOp {
                operand0, operand1, ..
            } => {
                self.visit_exp(operand0);
                self.visit_exp(operand1);
            }
            ExpKind::UnaryOp { operand, .. } => self.visit_exp(operand),
            ExpKind::Call { callable, args } => {
                self.visit_exp(callable);
                for arg in args {
                    self.visit_exp(arg);
                }
            }
            ExpKind::Lambda(lambda) => {
                for param in &lambda.params {
                    if let Some(ty) = &param.ty {
                        self.eval(ty);
                    }
                }
                self.visit_stmt(&lambda.body);
            }
            ExpKind::Indexer { object, index } => {
                self.visit_exp(object);
                self.visit_exp(index);
            }
            ExpKind::MemberCall {
                object,
                type_args,
                args,
                ..
            } => {
                self.visit_exp(object);
                self.eval_all(type_args);
                for arg in args {
                    self.visit_exp(arg);
                }
            }
            ExpKind::Member {
                parent, type_args, ..
            } => {
                self.visit_exp(parent);
                self.eval_all(type_args);
            }
            ExpKind::List { elem_type, elems } => {
                if let Some(elem_type) = elem_type {
                    self.eval(elem_type);
                }
                for elem in elems {
                    self.visit_exp(elem);
                }
            }
        }
    }

    fn eval_all(&mut self, type_exps: &[TypeExp]) {
        for type_exp in type_exps {
            self.eval(type_exp);
        }
    }

    /// Evaluate and record one type expression.
    fn eval(&mut self, type_exp: &TypeExp) -> Option<TypeValue> {
        let value = self.resolve(type_exp);
        match &value {
            Some(value) => {
                tracing::trace!(node = %type_exp.id, ty = %value, "type expression");
                self.info.values.insert(type_exp.id, value.clone());
            }
            None => {
                self.info.failed.insert(type_exp.id);
            }
        }
        value
    }

    /// Evaluate every argument so each failure is reported, then combine.
    fn eval_args(&mut self, type_args: &[TypeExp]) -> Option<Vec<TypeValue>> {
        let values: Vec<Option<TypeValue>> = type_args.iter().map(|arg| self.eval(arg)).collect();
        values.into_iter().collect()
    }

    fn find_type_var(&self, name: &str) -> Option<MetaItemId> {
        self.type_vars.iter().rev().find_map(|(owner, params)| {
            params
                .iter()
                .any(|param| &**param == name)
                .then(|| owner.clone())
        })
    }

    fn resolve(&mut self, type_exp: &TypeExp) -> Option<TypeValue> {
        match &type_exp.kind {
            TypeExpKind::Id { name, type_args } => self.resolve_id(type_exp, name, type_args),
            TypeExpKind::Member {
                parent,
                member_name,
                type_args,
            } => self.resolve_member(type_exp, parent, member_name, type_args),
        }
    }

    fn resolve_id(&mut self, type_exp: &TypeExp, name: &str, type_args: &[TypeExp]) -> Option<TypeValue> {
        if matches!(name, "var" | "void") {
            if !type_args.is_empty() {
                self.report(
                    SemanticError::WrongTypeArgCount {
                        expected: 0,
                        found: type_args.len(),
                        span: type_exp.span.into(),
                    },
                    type_exp,
                );
                return None;
            }
            return Some(if name == "var" { TypeValue::Var } else { TypeValue::Void });
        }

        if type_args.is_empty() {
            if let Some(owner) = self.find_type_var(name) {
                return Some(TypeValue::type_var(owner, name));
            }
        }

        let args = self.eval_args(type_args)?;
        let candidates = self.metadata.lookup_types_by_name(name, args.len());
        match candidates.as_slice() {
            [info] => Some(TypeValue::normal(None, info.id.clone(), args)),
            [] => {
                tracing::debug!(name, arity = args.len(), "type not found");
                self.report(
                    SemanticError::UnknownType {
                        name: name.to_string(),
                        span: type_exp.span.into(),
                    },
                    type_exp,
                );
                None
            }
            _ => {
                tracing::debug!(name, candidates = candidates.len(), "ambiguous type");
                self.report(
                    SemanticError::AmbiguousType {
                        name: name.to_string(),
                        candidates: candidates.len(),
                        span: type_exp.span.into(),
                    },
                    type_exp,
                );
                None
            }
        }
    }

    fn resolve_member(
        &mut self,
        type_exp: &TypeExp,
        parent: &TypeExp,
        member_name: &str,
        type_args: &[TypeExp],
    ) -> Option<TypeValue> {
        // A failed parent has already been reported on its own node
        let parent_value = self.eval(parent)?;
        let args = self.eval_args(type_args)?;

        let parent_normal = match parent_value {
            TypeValue::Normal(normal) => normal,
            other => {
                self.report_unknown_member(type_exp, &other, member_name);
                return None;
            }
        };

        if let Some(id) = self
            .metadata
            .get_member_type_id(&parent_normal.type_id, member_name, args.len())
        {
            return Some(TypeValue::normal(Some(parent_normal), id, args));
        }

        if args.is_empty() && self.is_enum_elem(&parent_normal, member_name) {
            return Some(TypeValue::enum_elem(parent_normal, member_name));
        }

        self.report_unknown_member(type_exp, &TypeValue::Normal(parent_normal), member_name);
        None
    }

    fn is_enum_elem(&self, parent: &NormalTypeValue, name: &str) -> bool {
        self.metadata
            .get_type_info(&parent.type_id)
            .and_then(|info| info.enum_elem(name))
            .is_some()
    }

    fn report_unknown_member(&mut self, type_exp: &TypeExp, parent: &TypeValue, member_name: &str) {
        self.report(
            SemanticError::UnknownMember {
                ty: parent.to_string(),
                member: member_name.to_string(),
                span: type_exp.span.into(),
            },
            type_exp,
        );
    }

    fn report(&mut self, error: SemanticError, type_exp: &TypeExp) {
        self.diagnostics.add(error, type_exp.id, type_exp.span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ModuleName;
    use crate::sema::module_info::{ModuleInfo, TypeInfo, TypeKind};

    struct Run {
        info: TypeExpInfo,
        diagnostics: Diagnostics,
    }

    fn run(script: &Script, referenced: &[ModuleInfo]) -> Run {
        let mut diagnostics = Diagnostics::new();
        let skeletons = SkeletonRepository::collect(&ModuleName::new("Script"), script, &mut diagnostics);
        let current = skeletons.to_module_info();
        let metadata = MetadataService::new(&current, referenced);
        let info = TypeExpEvaluator::new(metadata, &skeletons, &mut diagnostics).evaluate(script);
        Run { info, diagnostics }
    }

    fn module(name: &str, types: &[(&str, &[&str])]) -> ModuleInfo {
        let mut module = ModuleInfo::new(ModuleName::new(name));
        for (ty, params) in types {
            let id = module.item_id(ty, params.len());
            module.add_type(TypeInfo::new(id, params, TypeKind::Class));
        }
        module
    }

    #[test]
    fn generic_param_shadows_module_type() {
        let b = AstBuilder::new();
        let param_ty = b.ty("T");
        let param_id = param_ty.id;
        let script = b.script(vec![b.func(
            b.ty("void"),
            "f",
            &["T"],
            vec![b.param(param_ty, "x")],
            vec![],
        )]);
        let referenced = [module("Lib", &[("T", &[])])];
        let run = run(&script, &referenced);

        let owner = MetaItemId::new(ModuleName::new("Script"), "f", 1);
        assert_eq!(run.info.get(param_id), Some(&TypeValue::type_var(owner, "T")));
        assert!(!run.diagnostics.has_error());
    }

    #[test]
    fn unknown_and_ambiguous_types_are_reported() {
        let b = AstBuilder::new();
        let unknown = b.ty("Nope");
        let ambiguous = b.ty("Shared");
        let (unknown_id, ambiguous_id) = (unknown.id, ambiguous.id);
        let script = b.script_of_stmts(vec![
            b.var_decl(unknown, vec![("a", None)]),
            b.var_decl(ambiguous, vec![("b", None)]),
        ]);
        let referenced = [module("M1", &[("Shared", &[])]), module("M2", &[("Shared", &[])])];
        let run = run(&script, &referenced);

        let errors = run.diagnostics.errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0].error, SemanticError::UnknownType { .. }));
        assert!(matches!(errors[1].error, SemanticError::AmbiguousType { candidates: 2, .. }));
        assert_eq!(run.info.lookup(unknown_id), Ok(None));
        assert_eq!(run.info.lookup(ambiguous_id), Ok(None));
    }

    #[test]
    fn nested_member_type_carries_outer() {
        let b = AstBuilder::new();
        let x_int = b.ty_args("X", vec![b.ty("int")]);
        let y = b.ty_member(x_int, "Y", vec![b.ty("string")]);
        let y_id = y.id;
        let script = b.script_of_stmts(vec![b.var_decl(y, vec![("v", None)])]);

        let mut lib = module("Lib", &[("int", &[]), ("string", &[]), ("X", &["T"])]);
        let x = lib.item_id("X", 1);
        lib.add_type(TypeInfo::new(x.child("Y", 1), &["U"], TypeKind::Class));
        let int = TypeValue::normal(None, lib.item_id("int", 0), vec![]);
        let string = TypeValue::normal(None, lib.item_id("string", 0), vec![]);
        let referenced = [lib];
        let run = run(&script, &referenced);

        let expected = TypeValue::normal(
            Some(NormalTypeValue::new(None, x.clone(), vec![int])),
            x.child("Y", 1),
            vec![string],
        );
        assert_eq!(run.info.get(y_id), Some(&expected));
    }

    #[test]
    fn enum_element_type_and_single_report_for_failed_parent() {
        let b = AstBuilder::new();
        let some = b.ty_member(b.ty("Color"), "Red", vec![]);
        let some_id = some.id;
        let broken = b.ty_member(b.ty("Missing"), "Red", vec![]);
        let script = b.script(vec![
            b.enum_decl("Color", &[], vec![("Red", vec![]), ("Blue", vec![])]),
            ScriptElement::Stmt(b.var_decl(some, vec![("c", None)])),
            ScriptElement::Stmt(b.var_decl(broken, vec![("d", None)])),
        ]);
        let run = run(&script, &[]);

        let color = NormalTypeValue::new(None, MetaItemId::new(ModuleName::new("Script"), "Color", 0), vec![]);
        assert_eq!(run.info.get(some_id), Some(&TypeValue::enum_elem(color, "Red")));
        // Only the unknown parent is reported, not the member on top of it
        assert_eq!(run.diagnostics.errors().len(), 1);
        assert!(matches!(run.diagnostics.errors()[0].error, SemanticError::UnknownType { .. }));
    }

    #[test]
    fn reserved_names_resolve_without_lookup() {
        let b = AstBuilder::new();
        let var_ty = b.ty("var");
        let var_id = var_ty.id;
        let script = b.script_of_stmts(vec![b.var_decl(var_ty, vec![("x", Some(b.int(1)))])]);
        let run = run(&script, &[]);
        assert_eq!(run.info.get(var_id), Some(&TypeValue::Var));
    }
}
