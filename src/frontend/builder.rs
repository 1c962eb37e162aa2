// src/frontend/builder.rs
//
// Node construction with monotonically assigned NodeIds. The parser builds
// every node through this type; tests use it to assemble scripts directly.

use std::cell::Cell;

use super::Span;
use super::ast::*;

/// Hands out `NodeId`s in construction order and builds AST nodes.
///
/// Methods take `&self` so nested construction such as
/// `b.exp_stmt(b.call(b.ident("f"), vec![b.int(1)]))` reads naturally.
#[derive(Debug, Default)]
pub struct AstBuilder {
    next_id: Cell<u32>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next node id.
    pub fn next_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    /// Number of ids handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    // ---------------------------------------------------------------------
    // Type expressions
    // ---------------------------------------------------------------------

    pub fn ty(&self, name: &str) -> TypeExp {
        self.ty_args(name, Vec::new())
    }

    pub fn ty_args(&self, name: &str, type_args: Vec<TypeExp>) -> TypeExp {
        TypeExp {
            id: self.next_id(),
            kind: TypeExpKind::Id {
                name: name.to_string(),
                type_args,
            },
            span: Span::default(),
        }
    }

    pub fn ty_member(&self, parent: TypeExp, member_name: &str, type_args: Vec<TypeExp>) -> TypeExp {
        TypeExp {
            id: self.next_id(),
            kind: TypeExpKind::Member {
                parent: Box::new(parent),
                member_name: member_name.to_string(),
                type_args,
            },
            span: Span::default(),
        }
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn exp(&self, kind: ExpKind) -> Exp {
        Exp {
            id: self.next_id(),
            kind,
            span: Span::default(),
        }
    }

    pub fn ident(&self, name: &str) -> Exp {
        self.ident_args(name, Vec::new())
    }

    pub fn ident_args(&self, name: &str, type_args: Vec<TypeExp>) -> Exp {
        self.exp(ExpKind::Identifier {
            name: name.to_string(),
            type_args,
        })
    }

    pub fn int(&self, value: i64) -> Exp {
        self.exp(ExpKind::IntLiteral(value))
    }

    pub fn bool(&self, value: bool) -> Exp {
        self.exp(ExpKind::BoolLiteral(value))
    }

    pub fn text(&self, text: &str) -> Exp {
        self.exp(ExpKind::String(StringExp {
            elements: vec![StringExpElement::Text(text.to_string())],
        }))
    }

    pub fn string(&self, elements: Vec<StringExpElement>) -> Exp {
        self.exp(ExpKind::String(StringExp { elements }))
    }

    pub fn binary(&self, op: BinaryOpKind, operand0: Exp, operand1: Exp) -> Exp {
        self.exp(ExpKind::BinaryOp {
            op,
            operand0: Box::new(operand0),
            operand1: Box::new(operand1),
        })
    }

    pub fn assign(&self, target: Exp, value: Exp) -> Exp {
        self.binary(BinaryOpKind::Assign, target, value)
    }

    pub fn unary(&self, op: UnaryOpKind, operand: Exp) -> Exp {
        self.exp(ExpKind::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn call(&self, callable: Exp, args: Vec<Exp>) -> Exp {
        self.exp(ExpKind::Call {
            callable: Box::new(callable),
            args,
        })
    }

    pub fn lambda(&self, params: Vec<LambdaExpParam>, body: Stmt) -> Exp {
        self.exp(ExpKind::Lambda(LambdaExp {
            params,
            body: Box::new(body),
        }))
    }

    pub fn lambda_param(&self, ty: Option<TypeExp>, name: &str) -> LambdaExpParam {
        LambdaExpParam {
            ty,
            name: name.to_string(),
            span: Span::default(),
        }
    }

    pub fn indexer(&self, object: Exp, index: Exp) -> Exp {
        self.exp(ExpKind::Indexer {
            object: Box::new(object),
            index: Box::new(index),
        })
    }

    pub fn member(&self, parent: Exp, member_name: &str) -> Exp {
        self.exp(ExpKind::Member {
            parent: Box::new(parent),
            member_name: member_name.to_string(),
            type_args: Vec::new(),
        })
    }

    pub fn member_call(&self, object: Exp, member_name: &str, args: Vec<Exp>) -> Exp {
        self.member_call_args(object, member_name, Vec::new(), args)
    }

    pub fn member_call_args(
        &self,
        object: Exp,
        member_name: &str,
        type_args: Vec<TypeExp>,
        args: Vec<Exp>,
    ) -> Exp {
        self.exp(ExpKind::MemberCall {
            object: Box::new(object),
            member_name: member_name.to_string(),
            type_args,
            args,
        })
    }

    pub fn list(&self, elem_type: Option<TypeExp>, elems: Vec<Exp>) -> Exp {
        self.exp(ExpKind::List { elem_type, elems })
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn stmt(&self, kind: StmtKind) -> Stmt {
        Stmt {
            id: self.next_id(),
            kind,
            span: Span::default(),
        }
    }

    pub fn var_decl(&self, ty: TypeExp, elems: Vec<(&str, Option<Exp>)>) -> Stmt {
        self.stmt(StmtKind::VarDecl(self.var_decl_node(ty, elems)))
    }

    /// Single-element declaration: `ty name = init;`
    pub fn var(&self, ty: &str, name: &str, init: Option<Exp>) -> Stmt {
        self.var_decl(self.ty(ty), vec![(name, init)])
    }

    pub fn var_decl_node(&self, ty: TypeExp, elems: Vec<(&str, Option<Exp>)>) -> VarDecl {
        VarDecl {
            ty,
            elems: elems
                .into_iter()
                .map(|(name, init)| VarDeclElement {
                    name: name.to_string(),
                    init,
                    span: Span::default(),
                })
                .collect(),
        }
    }

    pub fn exp_stmt(&self, exp: Exp) -> Stmt {
        self.stmt(StmtKind::Exp(exp))
    }

    pub fn block(&self, stmts: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn if_stmt(&self, cond: Exp, body: Stmt, else_body: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::If(IfStmt {
            cond,
            body: Box::new(body),
            else_body: else_body.map(Box::new),
        }))
    }

    pub fn if_test(&self, target: Exp, test_type: TypeExp, body: Stmt, else_body: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::IfTest(IfTestStmt {
            target,
            test_type,
            body: Box::new(body),
            else_body: else_body.map(Box::new),
        }))
    }

    pub fn for_stmt(
        &self,
        init: Option<ForInitializer>,
        cond: Option<Exp>,
        cont: Option<Exp>,
        body: Stmt,
    ) -> Stmt {
        self.stmt(StmtKind::For(ForStmt {
            init,
            cond,
            cont,
            body: Box::new(body),
        }))
    }

    pub fn foreach(&self, ty: TypeExp, var_name: &str, iterator: Exp, body: Stmt) -> Stmt {
        self.stmt(StmtKind::Foreach(ForeachStmt {
            ty,
            var_name: var_name.to_string(),
            iterator,
            body: Box::new(body),
        }))
    }

    pub fn ret(&self, value: Option<Exp>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn yield_stmt(&self, value: Exp) -> Stmt {
        self.stmt(StmtKind::Yield(value))
    }

    pub fn brk(&self) -> Stmt {
        self.stmt(StmtKind::Break)
    }

    pub fn cont(&self) -> Stmt {
        self.stmt(StmtKind::Continue)
    }

    pub fn blank(&self) -> Stmt {
        self.stmt(StmtKind::Blank)
    }

    pub fn task(&self, body: Stmt) -> Stmt {
        self.stmt(StmtKind::Task(Box::new(body)))
    }

    pub fn await_stmt(&self, body: Stmt) -> Stmt {
        self.stmt(StmtKind::Await(Box::new(body)))
    }

    pub fn async_stmt(&self, body: Stmt) -> Stmt {
        self.stmt(StmtKind::Async(Box::new(body)))
    }

    pub fn command(&self, commands: Vec<StringExp>) -> Stmt {
        self.stmt(StmtKind::Command(commands))
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    pub fn param(&self, ty: TypeExp, name: &str) -> TypeAndName {
        TypeAndName {
            ty,
            name: name.to_string(),
        }
    }

    pub fn func(
        &self,
        ret_type: TypeExp,
        name: &str,
        type_params: &[&str],
        params: Vec<TypeAndName>,
        body: Vec<Stmt>,
    ) -> ScriptElement {
        self.func_decl(FuncKind::Normal, ret_type, name, type_params, params, body)
    }

    pub fn seq_func(
        &self,
        elem_type: TypeExp,
        name: &str,
        params: Vec<TypeAndName>,
        body: Vec<Stmt>,
    ) -> ScriptElement {
        self.func_decl(FuncKind::Sequence, elem_type, name, &[], params, body)
    }

    fn func_decl(
        &self,
        kind: FuncKind,
        ret_type: TypeExp,
        name: &str,
        type_params: &[&str],
        params: Vec<TypeAndName>,
        body: Vec<Stmt>,
    ) -> ScriptElement {
        let body = self.block(body);
        ScriptElement::Func(FuncDecl {
            id: self.next_id(),
            kind,
            ret_type,
            name: name.to_string(),
            type_params: type_params.iter().map(|s| s.to_string()).collect(),
            params,
            body: Box::new(body),
            span: Span::default(),
        })
    }

    pub fn enum_decl(
        &self,
        name: &str,
        type_params: &[&str],
        elems: Vec<(&str, Vec<TypeAndName>)>,
    ) -> ScriptElement {
        ScriptElement::Enum(EnumDecl {
            id: self.next_id(),
            name: name.to_string(),
            type_params: type_params.iter().map(|s| s.to_string()).collect(),
            elems: elems
                .into_iter()
                .map(|(name, params)| EnumDeclElement {
                    name: name.to_string(),
                    params,
                })
                .collect(),
            span: Span::default(),
        })
    }

    /// Wrap statements and declarations into a script, in order.
    pub fn script(&self, elements: Vec<ScriptElement>) -> Script {
        Script { elements }
    }

    /// Convenience for scripts made only of top-level statements.
    pub fn script_of_stmts(&self, stmts: Vec<Stmt>) -> Script {
        Script {
            elements: stmts.into_iter().map(ScriptElement::Stmt).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_monotonic() {
        let b = AstBuilder::new();
        let x = b.ident("x");
        let one = b.int(1);
        let assign = b.assign(x, one);
        let ExpKind::BinaryOp { operand0, operand1, .. } = &assign.kind else {
            panic!("expected binary op");
        };
        assert!(operand0.id < operand1.id);
        assert!(operand1.id < assign.id);
        assert_eq!(b.node_count(), 3);
    }
}
