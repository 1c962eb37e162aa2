// src/sema/analyzer/mod.rs

mod assign;
mod call;
mod declarations;
mod errors;
mod expr;
mod identifier;
mod lambda;
mod member;
mod stmt;


use std::mem;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::errors::InternalError;
use crate::frontend::*;
use crate::identity::{MetaItemId, ModuleName};
use crate::sema::analyze_info::{AnalyzeInfo, NodeInfo, StorageInfo};
use crate::sema::compatibility;
use crate::sema::diagnostics::{Diagnostics, TypeError};
use crate::sema::metadata::MetadataService;
use crate::sema::module_builder::ModuleBuilder;
use crate::sema::module_info::ModuleInfo;
use crate::sema::scope::{FuncContext, PrivateGlobalTable, ReturnType};
use crate::sema::skeleton::SkeletonRepository;
use crate::sema::type_env::{apply_type_env, make_func_type_env};
use crate::sema::type_expr::{TypeExpEvaluator, TypeExpInfo};
use crate::sema::types::{FuncValue, TypeValue};
use crate::sema::well_known::{WellKnownTypes, runtime_module};

/// Why analysis of one statement or expression stopped early.
#[derive(Debug)]
pub(crate) enum Abort {
    /// A diagnostic was recorded; siblings continue
    Reported,
    /// Fatal for the whole pass
    Internal(InternalError),
}

impl From<InternalError> for Abort {
    fn from(error: InternalError) -> Self {
        Abort::Internal(error)
    }
}

pub(crate) type AnalyzeResult<T> = Result<T, Abort>;

/// Turn a local abort into `None`, keeping internal errors fatal.
fn recover<T>(result: AnalyzeResult<T>) -> Result<Option<T>, InternalError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Abort::Reported) => Ok(None),
        Err(Abort::Internal(error)) => Err(error),
    }
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Every diagnostic recorded during the pass, in report order
    #[error("analysis failed with {} error(s)", .0.len())]
    Diagnostics(Vec<TypeError>),
    #[error("internal analyzer error: {0}")]
    Internal(#[from] InternalError),
}

/// Configures one analysis run.
pub struct AnalyzerBuilder {
    module_name: ModuleName,
    referenced: Vec<ModuleInfo>,
    include_runtime: bool,
    allow_sequence_funcs: bool,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            module_name: ModuleName::new("Script"),
            referenced: Vec::new(),
            include_runtime: true,
            allow_sequence_funcs: true,
        }
    }

    pub fn module_name(mut self, name: &str) -> Self {
        self.module_name = ModuleName::new(name);
        self
    }

    /// Add a referenced module; searched after the runtime, in call order.
    pub fn reference(mut self, module: ModuleInfo) -> Self {
        self.referenced.push(module);
        self
    }

    pub fn include_runtime(mut self, include: bool) -> Self {
        self.include_runtime = include;
        self
    }

    pub fn allow_sequence_funcs(mut self, allow: bool) -> Self {
        self.allow_sequence_funcs = allow;
        self
    }

    pub fn build(self) -> Analyzer {
        let mut referenced = Vec::with_capacity(self.referenced.len() + 1);
        if self.include_runtime {
            referenced.push(runtime_module());
        }
        referenced.extend(self.referenced);
        Analyzer {
            module_name: self.module_name,
            referenced,
            allow_sequence_funcs: self.allow_sequence_funcs,
        }
    }
}

pub struct Analyzer {
    module_name: ModuleName,
    referenced: Vec<ModuleInfo>,
    allow_sequence_funcs: bool,
}

impl Analyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Run every stage over `script`. Fails with all accumulated diagnostics
    /// if any were recorded.
    pub fn analyze(&self, script: &Script) -> Result<AnalyzeInfo, AnalyzeError> {
        let _span = tracing::info_span!("analyze", module = %self.module_name).entered();
        let mut diagnostics = Diagnostics::new();

        let skeletons = SkeletonRepository::collect(&self.module_name, script, &mut diagnostics);
        let skeleton_module = skeletons.to_module_info();
        let type_exps = TypeExpEvaluator::new(
            MetadataService::new(&skeleton_module, &self.referenced),
            &skeletons,
            &mut diagnostics,
        )
        .evaluate(script);
        let module = ModuleBuilder::new(&skeletons, &type_exps, &mut diagnostics).build(script)?;

        let checker = Checker::new(
            MetadataService::new(&module, &self.referenced),
            &type_exps,
            diagnostics,
            self.allow_sequence_funcs,
        );
        let (info, diagnostics) = checker.run(script)?;

        if diagnostics.has_error() {
            let errors = diagnostics.into_errors();
            tracing::debug!(count = errors.len(), "analysis failed");
            return Err(AnalyzeError::Diagnostics(errors));
        }
        Ok(info)
    }
}

/// State of the semantic pass proper.
pub(crate) struct Checker<'a> {
    metadata: MetadataService<'a>,
    type_exps: &'a TypeExpInfo,
    well_known: WellKnownTypes,
    diagnostics: Diagnostics,
    info: AnalyzeInfo,
    ctx: FuncContext,
    globals: PrivateGlobalTable,
    /// True only directly at script top level, where declarations become private globals
    global_scope: bool,
    loop_depth: usize,
    allow_sequence_funcs: bool,
    analyzed_funcs: FxHashSet<MetaItemId>,
}

impl<'a> Checker<'a> {
    fn new(
        metadata: MetadataService<'a>,
        type_exps: &'a TypeExpInfo,
        diagnostics: Diagnostics,
        allow_sequence_funcs: bool,
    ) -> Self {
        let top_id = metadata.current().item_id("$top", 0);
        Self {
            metadata,
            type_exps,
            well_known: WellKnownTypes::new(),
            diagnostics,
            info: AnalyzeInfo::default(),
            ctx: FuncContext::new(top_id, ReturnType::Unset, false),
            globals: PrivateGlobalTable::new(),
            global_scope: true,
            loop_depth: 0,
            allow_sequence_funcs,
            analyzed_funcs: FxHashSet::default(),
        }
    }

    fn run(mut self, script: &Script) -> Result<(AnalyzeInfo, Diagnostics), InternalError> {
        // Top-level statements first, so every function sees every private global
        for element in &script.elements {
            if let ScriptElement::Stmt(stmt) = element {
                self.analyze_stmt(stmt)?;
            }
        }
        self.info.top_level_local_var_count = self.ctx.local_count();
        self.info.private_global_count = self.globals.count();

        for element in &script.elements {
            if let ScriptElement::Func(decl) = element {
                self.analyze_func_decl(decl)?;
            }
        }
        Ok((self.info, self.diagnostics))
    }

    /// Run `f` in a nested block scope; names declared inside are hidden afterwards.
    fn in_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.ctx.snapshot();
        let was_global = mem::replace(&mut self.global_scope, false);
        let result = f(self);
        self.global_scope = was_global;
        self.ctx.restore(snapshot);
        result
    }

    fn in_loop<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.loop_depth += 1;
        let result = f(self);
        self.loop_depth -= 1;
        result
    }

    /// Body of a task/await/async block: same function, fresh loop nesting.
    fn in_closure_block<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let depth = mem::replace(&mut self.loop_depth, 0);
        let result = self.in_scope(f);
        self.loop_depth = depth;
        result
    }

    /// Run `f` with `ctx` as the current function; returns it afterwards.
    fn in_func_context<T>(
        &mut self,
        ctx: FuncContext,
        f: impl FnOnce(&mut Self) -> T,
    ) -> (T, FuncContext) {
        let outer = mem::replace(&mut self.ctx, ctx);
        let was_global = mem::replace(&mut self.global_scope, false);
        let depth = mem::replace(&mut self.loop_depth, 0);
        let result = f(self);
        self.loop_depth = depth;
        self.global_scope = was_global;
        let inner = mem::replace(&mut self.ctx, outer);
        (result, inner)
    }

    fn record(&mut self, node: NodeId, info: NodeInfo) -> Result<(), InternalError> {
        self.info.insert(node, info)
    }

    fn declare_var(&mut self, name: &str, ty: TypeValue) -> StorageInfo {
        if self.global_scope {
            StorageInfo::PrivateGlobal(self.globals.add(name, ty))
        } else {
            StorageInfo::Local(self.ctx.add_local(name, ty))
        }
    }

    fn type_exp(&self, type_exp: &TypeExp) -> AnalyzeResult<TypeValue> {
        match self.type_exps.lookup(type_exp.id)? {
            Some(ty) => Ok(ty.clone()),
            None => Err(Abort::Reported),
        }
    }

    fn type_args(&self, type_args: &[TypeExp]) -> AnalyzeResult<Vec<TypeValue>> {
        type_args.iter().map(|arg| self.type_exp(arg)).collect()
    }

    fn is_assignable(&self, to: &TypeValue, from: &TypeValue) -> Result<bool, InternalError> {
        compatibility::is_assignable(&self.metadata, to, from)
    }

    /// Return and parameter types of `func` with its type arguments applied.
    /// Sequence functions return `Enumerable` of their element type.
    fn func_signature(&self, func: &FuncValue) -> Result<(TypeValue, Vec<TypeValue>), InternalError> {
        let info = self.metadata.expect_func_info(&func.func_id)?;
        let env = make_func_type_env(&self.metadata, func)?;
        let mut ret = apply_type_env(&info.ret_type, &env);
        if info.is_sequence {
            ret = self.well_known.enumerable_of(ret);
        }
        let params = info
            .param_types
            .iter()
            .map(|param| apply_type_env(param, &env))
            .collect();
        Ok((ret, params))
    }

    fn func_type(&self, func: &FuncValue) -> Result<TypeValue, InternalError> {
        let (ret, params) = self.func_signature(func)?;
        Ok(TypeValue::func(ret, params))
    }
}
