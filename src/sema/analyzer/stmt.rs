// src/sema/analyzer/stmt.rs

use crate::errors::{InternalError, SemanticError};
use crate::frontend::*;
use crate::sema::analyze_info::{NodeInfo, StorageInfo};
use crate::sema::capture::CaptureAnalyzer;
use crate::sema::scope::ReturnType;
use crate::sema::types::TypeValue;

use super::identifier::{Lookup, Resolved};
use super::{AnalyzeResult, Checker, recover};

impl Checker<'_> {
    /// Analyze one statement. Reported errors stop only this statement.
    pub(super) fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), InternalError> {
        recover(self.check_stmt(stmt)).map(|_| ())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> AnalyzeResult<()> {
        match &stmt.kind {
            StmtKind::Command(commands) => {
                for command in commands {
                    recover(self.analyze_string(command))?;
                }
                Ok(())
            }
            StmtKind::VarDecl(decl) => self.analyze_var_decl(stmt.id, decl),
            StmtKind::If(if_stmt) => self.analyze_if(if_stmt),
            StmtKind::IfTest(test) => self.analyze_if_test(stmt, test),
            StmtKind::For(for_stmt) => self.analyze_for(stmt, for_stmt),
            StmtKind::Foreach(foreach) => self.analyze_foreach(stmt, foreach),
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    return self.fail(SemanticError::InvalidContinue { span: stmt.span.into() }, stmt.id, stmt.span);
                }
                Ok(())
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    return self.fail(SemanticError::InvalidBreak { span: stmt.span.into() }, stmt.id, stmt.span);
                }
                Ok(())
            }
            StmtKind::Return(value) => self.analyze_return(stmt, value.as_ref()),
            StmtKind::Yield(value) => self.analyze_yield(stmt, value),
            StmtKind::Block(stmts) => self.in_scope(|this| -> AnalyzeResult<()> {
                for stmt in stmts {
                    this.analyze_stmt(stmt)?;
                }
                Ok(())
            }),
            StmtKind::Blank => Ok(()),
            StmtKind::Exp(exp) => self.analyze_exp(exp, None).map(|_| ()),
            StmtKind::Task(body) | StmtKind::Await(body) | StmtKind::Async(body) => {
                self.analyze_closure_block(stmt, body)
            }
        }
    }

    pub(super) fn analyze_condition(&mut self, cond: &Exp) -> AnalyzeResult<()> {
        let ty = self.analyze_value(cond, None)?;
        if !self.well_known.is_bool(&ty) {
            return self.fail(
                SemanticError::ConditionNotBool {
                    found: ty.to_string(),
                    span: cond.span.into(),
                },
                cond.id,
                cond.span,
            );
        }
        Ok(())
    }

    fn analyze_if(&mut self, if_stmt: &IfStmt) -> AnalyzeResult<()> {
        recover(self.analyze_condition(&if_stmt.cond))?;
        self.in_scope(|this| this.analyze_stmt(&if_stmt.body))?;
        if let Some(else_body) = &if_stmt.else_body {
            self.in_scope(|this| this.analyze_stmt(else_body))?;
        }
        Ok(())
    }

    /// `if (x is T)`: when `x` names a variable, it reads as `T` inside the
    /// then-branch. Both branches are checked even when the test itself fails.
    fn analyze_if_test(&mut self, stmt: &Stmt, test: &IfTestStmt) -> AnalyzeResult<()> {
        let target_ty = recover(self.analyze_value(&test.target, None))?;
        let test_ty = match recover(self.type_exp(&test.test_type))? {
            Some(ty @ (TypeValue::Normal(_) | TypeValue::EnumElem { .. })) => Some(ty),
            Some(ty) => {
                recover(self.unsupported::<()>(
                    &format!("type test against '{ty}'"),
                    test.test_type.id,
                    test.test_type.span,
                ))?;
                None
            }
            None => None,
        };

        let mut narrowed = None;
        if let (Some(target_ty), Some(test_ty)) = (&target_ty, &test_ty) {
            if !self.is_assignable(target_ty, test_ty)? {
                self.type_mismatch(target_ty, test_ty, test.test_type.id, test.test_type.span);
            }
            narrowed = self.narrowable_var(&test.target);
            self.record(
                stmt.id,
                NodeInfo::IfTest {
                    test_type: test_ty.clone(),
                    narrowed: narrowed.as_ref().map(|(_, storage)| storage.clone()),
                },
            )?;
        }

        self.in_scope(|this| {
            if let (Some((name, _)), Some(test_ty)) = (&narrowed, &test_ty) {
                this.ctx.set_override(name, test_ty.clone());
            }
            this.analyze_stmt(&test.body)
        })?;
        if let Some(else_body) = &test.else_body {
            self.in_scope(|this| this.analyze_stmt(else_body))?;
        }
        Ok(())
    }

    /// A bare identifier naming a local or private global.
    fn narrowable_var<'e>(&self, target: &'e Exp) -> Option<(&'e str, StorageInfo)> {
        let ExpKind::Identifier { name, type_args } = &target.kind else {
            return None;
        };
        if !type_args.is_empty() {
            return None;
        }
        match self.lookup_identifier(name, &[]) {
            Lookup::Found(Resolved::Var { storage, .. })
                if matches!(storage, StorageInfo::Local(_) | StorageInfo::PrivateGlobal(_)) =>
            {
                Some((name.as_str(), storage))
            }
            _ => None,
        }
    }

    fn analyze_for(&mut self, stmt: &Stmt, for_stmt: &ForStmt) -> AnalyzeResult<()> {
        self.in_scope(|this| -> AnalyzeResult<()> {
            match &for_stmt.init {
                // Keyed by the loop, which has no other info of its own
                Some(ForInitializer::VarDecl(decl)) => {
                    recover(this.analyze_var_decl(stmt.id, decl))?;
                }
                Some(ForInitializer::Exp(exp)) => {
                    recover(this.analyze_exp(exp, None))?;
                }
                None => {}
            }
            if let Some(cond) = &for_stmt.cond {
                recover(this.analyze_condition(cond))?;
            }
            if let Some(cont) = &for_stmt.cont {
                recover(this.analyze_exp(cont, None))?;
            }
            this.in_loop(|this| this.analyze_stmt(&for_stmt.body))?;
            Ok(())
        })
    }

    fn analyze_foreach(&mut self, stmt: &Stmt, foreach: &ForeachStmt) -> AnalyzeResult<()> {
        let iterator_ty = self.analyze_value(&foreach.iterator, None)?;
        let Some(elem_ty) = self.well_known.iterable_elem(&iterator_ty).cloned() else {
            return self.fail(
                SemanticError::NotIterable {
                    ty: iterator_ty.to_string(),
                    span: foreach.iterator.span.into(),
                },
                foreach.iterator.id,
                foreach.iterator.span,
            );
        };

        // A bad declared type is already reported; the body still reads the element type
        let declared = recover(self.type_exp(&foreach.ty))?.unwrap_or(TypeValue::Var);
        let var_ty = match declared {
            TypeValue::Var => elem_ty.clone(),
            declared => {
                if !self.is_assignable(&declared, &elem_ty)? {
                    self.type_mismatch(&declared, &elem_ty, foreach.ty.id, foreach.ty.span);
                }
                declared
            }
        };

        self.in_scope(|this| -> AnalyzeResult<()> {
            let storage = this.declare_var(&foreach.var_name, var_ty);
            this.record(
                stmt.id,
                NodeInfo::Foreach {
                    elem_type: elem_ty,
                    storage,
                },
            )?;
            this.in_loop(|this| this.analyze_stmt(&foreach.body))?;
            Ok(())
        })
    }

    fn analyze_return(&mut self, stmt: &Stmt, value: Option<&Exp>) -> AnalyzeResult<()> {
        if self.ctx.is_sequence() {
            if let Some(value) = value {
                return self.fail(
                    SemanticError::ReturnValueInSequence { span: value.span.into() },
                    value.id,
                    value.span,
                );
            }
            return Ok(());
        }

        let hint = self.ctx.ret().fixed().cloned();
        let (ty, node, span) = match value {
            Some(value) => (self.analyze_value(value, hint.as_ref())?, value.id, value.span),
            None => (TypeValue::Void, stmt.id, stmt.span),
        };

        match self.ctx.ret().clone() {
            ReturnType::Unset => self.ctx.infer_ret(ty),
            ReturnType::Declared(expected) => {
                if !self.is_assignable(&expected, &ty)? {
                    self.type_mismatch(&expected, &ty, node, span);
                }
            }
            // Every return of an inferred function must agree exactly
            ReturnType::Inferred(expected) => {
                if expected != ty {
                    self.type_mismatch(&expected, &ty, node, span);
                }
            }
        }
        Ok(())
    }

    fn analyze_yield(&mut self, stmt: &Stmt, value: &Exp) -> AnalyzeResult<()> {
        if !self.ctx.is_sequence() {
            return self.fail(SemanticError::YieldOutsideSequence { span: stmt.span.into() }, stmt.id, stmt.span);
        }
        let elem_ty = self.ctx.ret().fixed().cloned();
        let ty = self.analyze_value(value, elem_ty.as_ref())?;
        if let Some(elem_ty) = elem_ty {
            self.check_assignable(&elem_ty, &ty, value)?;
        }
        Ok(())
    }

    /// task/await/async: the body runs in the same function but may outlive
    /// the current frame, so it gets a capture plan like a lambda.
    fn analyze_closure_block(&mut self, stmt: &Stmt, body: &Stmt) -> AnalyzeResult<()> {
        let captures = CaptureAnalyzer::analyze(&[], body);
        let capture = self.plan_captures(&captures, stmt.id, stmt.span)?;
        self.record(stmt.id, NodeInfo::Capture { capture })?;
        self.in_closure_block(|this| this.analyze_stmt(body))?;
        Ok(())
    }
}
