// src/sema/capture.rs
//
// Free-variable analysis for closure bodies (lambdas and task/await/async
// blocks). Walks the body with a stack of names bound inside it; any plain
// identifier not bound there is a capture candidate. Assignment targets and
// increment/decrement operands need a live alias (`Ref`), everything else a
// snapshot (`Copy`). Nested closures share the same tracking, so what an
// inner closure needs also surfaces at the outer boundary.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::frontend::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    Copy,
    Ref,
}

/// Capture candidates in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureResult {
    entries: Vec<(Rc<str>, CaptureKind)>,
    index: FxHashMap<Rc<str>, usize>,
}

impl CaptureResult {
    fn add(&mut self, name: &str, kind: CaptureKind) {
        if let Some(&i) = self.index.get(name) {
            if kind == CaptureKind::Ref {
                self.entries[i].1 = CaptureKind::Ref;
            }
            return;
        }
        let name: Rc<str> = Rc::from(name);
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, kind));
    }

    pub fn get(&self, name: &str) -> Option<CaptureKind> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CaptureKind)> {
        self.entries.iter().map(|(name, kind)| (&**name, *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct CaptureAnalyzer {
    bound: Vec<Rc<str>>,
    result: CaptureResult,
}

impl CaptureAnalyzer {
    /// Free variables of `body`, with `params` already bound at the boundary.
    pub fn analyze(params: &[&str], body: &Stmt) -> CaptureResult {
        let mut analyzer = Self {
            bound: params.iter().map(|p| Rc::from(*p)).collect(),
            result: CaptureResult::default(),
        };
        analyzer.stmt(body);
        analyzer.result
    }

    fn scoped(&mut self, f: impl FnOnce(&mut Self)) {
        let mark = self.bound.len();
        f(self);
        self.bound.truncate(mark);
    }

    fn bind(&mut self, name: &str) {
        self.bound.push(Rc::from(name));
    }

    fn reference(&mut self, name: &str, kind: CaptureKind) {
        if !self.bound.iter().any(|bound| &**bound == name) {
            self.result.add(name, kind);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Command(commands) => {
                for command in commands {
                    self.string(command);
                }
            }
            StmtKind::VarDecl(decl) => self.var_decl(decl),
            StmtKind::If(if_stmt) => {
                self.exp(&if_stmt.cond);
                self.scoped(|this| this.stmt(&if_stmt.body));
                if let Some(else_body) = &if_stmt.else_body {
                    self.scoped(|this| this.stmt(else_body));
                }
            }
            StmtKind::IfTest(test) => {
                self.exp(&test.target);
                self.scoped(|this| this.stmt(&test.body));
                if let Some(else_body) = &test.else_body {
                    self.scoped(|this| this.stmt(else_body));
                }
            }
            StmtKind::For(for_stmt) => self.scoped(|this| {
                match &for_stmt.init {
                    Some(ForInitializer::VarDecl(decl)) => this.var_decl(decl),
                    Some(ForInitializer::Exp(exp)) => this.exp(exp),
                    None => {}
                }
                if let Some(cond) = &for_stmt.cond {
                    this.exp(cond);
                }
                if let Some(cont) = &for_stmt.cont {
                    this.exp(cont);
                }
                this.scoped(|this| this.stmt(&for_stmt.body));
            }),
            StmtKind::Foreach(foreach) => {
                self.exp(&foreach.iterator);
                self.scoped(|this| {
                    this.bind(&foreach.var_name);
                    this.stmt(&foreach.body);
                });
            }
            StmtKind::Block(stmts) => self.scoped(|this| {
                for stmt in stmts {
                    this.stmt(stmt);
                }
            }),
            StmtKind::Return(Some(exp)) | StmtKind::Exp(exp) | StmtKind::Yield(exp) => self.exp(exp),
            StmtKind::Task(body) | StmtKind::Await(body) | StmtKind::Async(body) => {
                self.scoped(|this| this.stmt(body))
            }
            StmtKind::Return(None) | StmtKind::Continue | StmtKind::Break | StmtKind::Blank => {}
        }
    }

    fn var_decl(&mut self, decl: &VarDecl) {
        for elem in &decl.elems {
            if let Some(init) = &elem.init {
                self.exp(init);
            }
            self.bind(&elem.name);
        }
    }

    fn string(&mut self, string: &StringExp) {
        for element in &string.elements {
            if let StringExpElement::Exp(exp) = element {
                self.exp(exp);
            }
        }
    }

    fn exp(&mut self, exp: &Exp) {
        match &exp.kind {
            // Locals are never generic, so only bare names can be captures
            ExpKind::Identifier { name, type_args } => {
                if type_args.is_empty() {
                    self.reference(name, CaptureKind::Copy);
                }
            }
            ExpKind::String(string) => self.string(string),
            ExpKind::IntLiteral(_) | ExpKind::BoolLiteral(_) => {}
            ExpKind::BinaryOp {
                op: BinaryOpKind::Assign,
                operand0,
                operand1,
            } => {
                self.target(operand0);
                self.exp(operand1);
            }
            ExpKind::BinaryOp {
                operand0, operand1, ..
            } => {
                self.exp(operand0);
                self.exp(operand1);
            }
            ExpKind::UnaryOp { op, operand } => {
                if op.is_mutating() {
                    self.target(operand);
                } else {
                    self.exp(operand);
                }
            }
            ExpKind::Call { callable, args } => {
                self.exp(callable);
                for arg in args {
                    self.exp(arg);
                }
            }
            ExpKind::Lambda(lambda) => self.scoped(|this| {
                for param in &lambda.params {
                    this.bind(&param.name);
                }
                this.stmt(&lambda.body);
            }),
            ExpKind::Indexer { object, index } => {
                self.exp(object);
                self.exp(index);
            }
            ExpKind::MemberCall { object, args, .. } => {
                self.exp(object);
                for arg in args {
                    self.exp(arg);
                }
            }
            ExpKind::Member { parent, .. } => self.exp(parent),
            ExpKind::List { elems, .. } => {
                for elem in elems {
                    self.exp(elem);
                }
            }
        }
    }

    /// An expression written to. Only a bare identifier is written through;
    /// member and indexer targets write into the object they read.
    fn target(&mut self, exp: &Exp) {
        match &exp.kind {
            ExpKind::Identifier { name, type_args } if type_args.is_empty() => {
                self.reference(name, CaptureKind::Ref)
            }
            _ => self.exp(exp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captures(result: &CaptureResult) -> Vec<(String, CaptureKind)> {
        result.iter().map(|(name, kind)| (name.to_string(), kind)).collect()
    }

    #[test]
    fn read_is_copy() {
        let b = AstBuilder::new();
        // () => x + 1
        let body = b.ret(Some(b.binary(BinaryOpKind::Add, b.ident("x"), b.int(1))));
        let result = CaptureAnalyzer::analyze(&[], &body);
        assert_eq!(captures(&result), vec![("x".to_string(), CaptureKind::Copy)]);
    }

    #[test]
    fn write_is_ref_and_dominates_read() {
        let b = AstBuilder::new();
        // { x = x + 1; y++; }
        let body = b.block(vec![
            b.exp_stmt(b.assign(b.ident("x"), b.binary(BinaryOpKind::Add, b.ident("x"), b.int(1)))),
            b.exp_stmt(b.unary(UnaryOpKind::PostfixInc, b.ident("y"))),
        ]);
        let result = CaptureAnalyzer::analyze(&[], &body);
        assert_eq!(result.get("x"), Some(CaptureKind::Ref));
        assert_eq!(result.get("y"), Some(CaptureKind::Ref));
    }

    #[test]
    fn params_and_inner_declarations_are_not_captured() {
        let b = AstBuilder::new();
        // (p) => { int local = p; local = outer; }
        let body = b.block(vec![
            b.var("int", "local", Some(b.ident("p"))),
            b.exp_stmt(b.assign(b.ident("local"), b.ident("outer"))),
        ]);
        let result = CaptureAnalyzer::analyze(&["p"], &body);
        assert_eq!(captures(&result), vec![("outer".to_string(), CaptureKind::Copy)]);
    }

    #[test]
    fn block_scoped_names_revert_on_exit() {
        let b = AstBuilder::new();
        // { { int a = 0; } a = 1; }
        let body = b.block(vec![
            b.block(vec![b.var("int", "a", Some(b.int(0)))]),
            b.exp_stmt(b.assign(b.ident("a"), b.int(1))),
        ]);
        let result = CaptureAnalyzer::analyze(&[], &body);
        assert_eq!(result.get("a"), Some(CaptureKind::Ref));
    }

    #[test]
    fn nested_lambda_requirements_surface() {
        let b = AstBuilder::new();
        // () => { var g = (int q) => { counter = q; }; }
        let inner = b.lambda(
            vec![b.lambda_param(Some(b.ty("int")), "q")],
            b.block(vec![b.exp_stmt(b.assign(b.ident("counter"), b.ident("q")))]),
        );
        let body = b.block(vec![b.var("var", "g", Some(inner))]);
        let result = CaptureAnalyzer::analyze(&[], &body);
        assert_eq!(captures(&result), vec![("counter".to_string(), CaptureKind::Ref)]);
    }

    #[test]
    fn foreach_variable_is_bound_in_body() {
        let b = AstBuilder::new();
        // foreach (int i in items) { task { total = i; } }
        let body = b.foreach(
            b.ty("int"),
            "i",
            b.ident("items"),
            b.block(vec![b.task(b.block(vec![b.exp_stmt(b.assign(b.ident("total"), b.ident("i")))]))]),
        );
        let result = CaptureAnalyzer::analyze(&[], &body);
        assert_eq!(
            captures(&result),
            vec![
                ("items".to_string(), CaptureKind::Copy),
                ("total".to_string(), CaptureKind::Ref)
            ]
        );
    }

    #[test]
    fn member_and_indexer_targets_read_their_object() {
        let b = AstBuilder::new();
        // { list[0] = 1; obj.field = 2; }
        let body = b.block(vec![
            b.exp_stmt(b.assign(b.indexer(b.ident("list"), b.int(0)), b.int(1))),
            b.exp_stmt(b.assign(b.member(b.ident("obj"), "field"), b.int(2))),
        ]);
        let result = CaptureAnalyzer::analyze(&[], &body);
        assert_eq!(result.get("list"), Some(CaptureKind::Copy));
        assert_eq!(result.get("obj"), Some(CaptureKind::Copy));
    }
}
