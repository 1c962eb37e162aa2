// src/frontend/ast.rs
//
// Abstract syntax tree for Lark scripts, as produced by the parser.
// Every node that analysis attaches information to carries a `NodeId`.

use crate::frontend::Span;

/// Unique identifier for AST nodes (expressions, statements, declarations)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A complete script
#[derive(Debug, Clone)]
pub struct Script {
    pub elements: Vec<ScriptElement>,
}

/// Top-level script elements
#[derive(Debug, Clone)]
pub enum ScriptElement {
    Stmt(Stmt),
    Func(FuncDecl),
    Enum(EnumDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncKind {
    Normal,
    /// Suspends at `yield` points; callers receive an `Enumerable<T>`
    Sequence,
}

/// `Type name` pair, used for function and enum-element parameters
#[derive(Debug, Clone)]
pub struct TypeAndName {
    pub ty: TypeExp,
    pub name: String,
}

/// Function declaration
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub id: NodeId,
    pub kind: FuncKind,
    pub ret_type: TypeExp,
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<TypeAndName>,
    /// Block statement
    pub body: Box<Stmt>,
    pub span: Span,
}

/// Enum declaration: `enum Option<T> { None, Some(T value) }`
#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub id: NodeId,
    pub name: String,
    pub type_params: Vec<String>,
    pub elems: Vec<EnumDeclElement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDeclElement {
    pub name: String,
    pub params: Vec<TypeAndName>,
}

/// Type expression
#[derive(Debug, Clone)]
pub struct TypeExp {
    pub id: NodeId,
    pub kind: TypeExpKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeExpKind {
    /// `List<int>`, `T`, `var`, `void`
    Id { name: String, type_args: Vec<TypeExp> },
    /// `X<int>.Y<string>`
    Member {
        parent: Box<TypeExp>,
        member_name: String,
        type_args: Vec<TypeExp>,
    },
}

/// Statements
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `@echo ${x}` lines
    Command(Vec<StringExp>),
    VarDecl(VarDecl),
    If(IfStmt),
    IfTest(IfTestStmt),
    For(ForStmt),
    Continue,
    Break,
    Return(Option<Exp>),
    Block(Vec<Stmt>),
    Blank,
    Exp(Exp),
    Task(Box<Stmt>),
    Await(Box<Stmt>),
    Async(Box<Stmt>),
    Foreach(ForeachStmt),
    Yield(Exp),
}

/// `int x = 1, y;` / `var z = f();`
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: TypeExp,
    pub elems: Vec<VarDeclElement>,
}

#[derive(Debug, Clone)]
pub struct VarDeclElement {
    pub name: String,
    pub init: Option<Exp>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Exp,
    pub body: Box<Stmt>,
    pub else_body: Option<Box<Stmt>>,
}

/// `if (x is T) { ... } else { ... }`
#[derive(Debug, Clone)]
pub struct IfTestStmt {
    pub target: Exp,
    pub test_type: TypeExp,
    pub body: Box<Stmt>,
    pub else_body: Option<Box<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum ForInitializer {
    VarDecl(VarDecl),
    Exp(Exp),
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<ForInitializer>,
    pub cond: Option<Exp>,
    pub cont: Option<Exp>,
    pub body: Box<Stmt>,
}

/// `foreach (T x in e) body`
#[derive(Debug, Clone)]
pub struct ForeachStmt {
    pub ty: TypeExp,
    pub var_name: String,
    pub iterator: Exp,
    pub body: Box<Stmt>,
}

/// Expressions
#[derive(Debug, Clone)]
pub struct Exp {
    pub id: NodeId,
    pub kind: ExpKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExpKind {
    Identifier {
        name: String,
        type_args: Vec<TypeExp>,
    },
    String(StringExp),
    IntLiteral(i64),
    BoolLiteral(bool),
    BinaryOp {
        op: BinaryOpKind,
        operand0: Box<Exp>,
        operand1: Box<Exp>,
    },
    UnaryOp {
        op: UnaryOpKind,
        operand: Box<Exp>,
    },
    Call {
        callable: Box<Exp>,
        args: Vec<Exp>,
    },
    Lambda(LambdaExp),
    Indexer {
        object: Box<Exp>,
        index: Box<Exp>,
    },
    MemberCall {
        object: Box<Exp>,
        member_name: String,
        type_args: Vec<TypeExp>,
        args: Vec<Exp>,
    },
    Member {
        parent: Box<Exp>,
        member_name: String,
        type_args: Vec<TypeExp>,
    },
    /// `[1, 2, 3]` or `[]<int>`
    List {
        elem_type: Option<TypeExp>,
        elems: Vec<Exp>,
    },
}

/// Interpolated string: `"hello ${name}"`
#[derive(Debug, Clone, Default)]
pub struct StringExp {
    pub elements: Vec<StringExpElement>,
}

#[derive(Debug, Clone)]
pub enum StringExpElement {
    Text(String),
    Exp(Exp),
}

#[derive(Debug, Clone)]
pub struct LambdaExp {
    pub params: Vec<LambdaExpParam>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone)]
pub struct LambdaExpParam {
    /// Lambda parameters must be typed; `None` is diagnosed during analysis
    pub ty: Option<TypeExp>,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOpKind {
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    Assign,
}

impl BinaryOpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOpKind::Multiply => "*",
            BinaryOpKind::Divide => "/",
            BinaryOpKind::Modulo => "%",
            BinaryOpKind::Add => "+",
            BinaryOpKind::Subtract => "-",
            BinaryOpKind::LessThan => "<",
            BinaryOpKind::GreaterThan => ">",
            BinaryOpKind::LessThanOrEqual => "<=",
            BinaryOpKind::GreaterThanOrEqual => ">=",
            BinaryOpKind::Equal => "==",
            BinaryOpKind::NotEqual => "!=",
            BinaryOpKind::Assign => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOpKind {
    LogicalNot,
    Minus,
    PrefixInc,
    PrefixDec,
    PostfixInc,
    PostfixDec,
}

impl UnaryOpKind {
    /// Increment/decrement operators write back to their operand
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            UnaryOpKind::PrefixInc
                | UnaryOpKind::PrefixDec
                | UnaryOpKind::PostfixInc
                | UnaryOpKind::PostfixDec
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOpKind::LogicalNot => "!",
            UnaryOpKind::Minus => "-",
            UnaryOpKind::PrefixInc | UnaryOpKind::PostfixInc => "++",
            UnaryOpKind::PrefixDec | UnaryOpKind::PostfixDec => "--",
        }
    }
}
