// src/errors/sema.rs
//! Semantic analysis errors (E2xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum SemanticError {
    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(E2001))]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("undefined variable '{name}'")]
    #[diagnostic(code(E2002))]
    UndefinedVariable {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("'{name}' is ambiguous")]
    #[diagnostic(
        code(E2003),
        help("{candidates} candidates match; refer to a single declaration")
    )]
    AmbiguousIdentifier {
        name: String,
        candidates: usize,
        #[label("ambiguous reference")]
        span: SourceSpan,
    },

    #[error("cannot infer type of '{name}'")]
    #[diagnostic(code(E2004), help("give '{name}' an explicit type or an initializer"))]
    CannotInferVar {
        name: String,
        #[label("type cannot be inferred")]
        span: SourceSpan,
    },

    #[error("'{name}' is already declared in this module")]
    #[diagnostic(code(E2005))]
    DuplicateItem {
        name: String,
        #[label("duplicate declaration")]
        span: SourceSpan,
    },

    #[error("break outside of loop")]
    #[diagnostic(code(E2008))]
    InvalidBreak {
        #[label("not inside a loop")]
        span: SourceSpan,
    },

    #[error("continue outside of loop")]
    #[diagnostic(code(E2009))]
    InvalidContinue {
        #[label("not inside a loop")]
        span: SourceSpan,
    },

    #[error("expected {expected} arguments, found {found}")]
    #[diagnostic(code(E2012))]
    WrongArgumentCount {
        expected: usize,
        found: usize,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("expected {expected} type arguments, found {found}")]
    #[diagnostic(code(E2013))]
    WrongTypeArgCount {
        expected: usize,
        found: usize,
        #[label("wrong number of type arguments")]
        span: SourceSpan,
    },

    #[error("unknown type '{name}'")]
    #[diagnostic(code(E2020))]
    UnknownType {
        name: String,
        #[label("no type with this name and arity")]
        span: SourceSpan,
    },

    #[error("type '{name}' is ambiguous")]
    #[diagnostic(
        code(E2021),
        help("{candidates} modules declare a matching type")
    )]
    AmbiguousType {
        name: String,
        candidates: usize,
        #[label("ambiguous type")]
        span: SourceSpan,
    },

    #[error("unknown member '{member}' on type '{ty}'")]
    #[diagnostic(code(E2023))]
    UnknownMember {
        ty: String,
        member: String,
        #[label("no such member")]
        span: SourceSpan,
    },

    #[error("member '{member}' on type '{ty}' is ambiguous")]
    #[diagnostic(code(E2024))]
    AmbiguousMember {
        ty: String,
        member: String,
        #[label("ambiguous member")]
        span: SourceSpan,
    },

    #[error("{detail}")]
    #[diagnostic(code(E2025))]
    StaticInstanceMismatch {
        detail: String,
        #[label("static/instance mismatch")]
        span: SourceSpan,
    },

    #[error("condition must be boolean, found {found}")]
    #[diagnostic(code(E2027))]
    ConditionNotBool {
        found: String,
        #[label("expected bool")]
        span: SourceSpan,
    },

    #[error("operator '{op}' cannot be applied to {operands}")]
    #[diagnostic(code(E2028))]
    InvalidOperands {
        op: String,
        operands: String,
        #[label("invalid operands")]
        span: SourceSpan,
    },

    #[error("cannot assign to this expression")]
    #[diagnostic(
        code(E2029),
        help("only variables, members and indexers can be assigned")
    )]
    InvalidAssignTarget {
        #[label("not assignable")]
        span: SourceSpan,
    },

    #[error("cannot use a void value")]
    #[diagnostic(code(E2040), help("void functions don't return a usable value"))]
    VoidValueUsed {
        #[label("void value used here")]
        span: SourceSpan,
    },

    #[error("cannot infer type of lambda parameter '{name}'")]
    #[diagnostic(code(E2043), help("add a type annotation: (Type {name}) => ..."))]
    CannotInferLambdaParam {
        name: String,
        #[label("type cannot be inferred")]
        span: SourceSpan,
    },

    #[error("cannot call non-function type '{ty}'")]
    #[diagnostic(code(E2044))]
    NotCallable {
        ty: String,
        #[label("not a function")]
        span: SourceSpan,
    },

    #[error("'{name}' is a type, not a value")]
    #[diagnostic(code(E2045))]
    NotAValue {
        name: String,
        #[label("expected a value")]
        span: SourceSpan,
    },

    #[error("cannot iterate over '{ty}'")]
    #[diagnostic(code(E2046), help("foreach requires a List<T> or Enumerable<T>"))]
    NotIterable {
        ty: String,
        #[label("not iterable")]
        span: SourceSpan,
    },

    #[error("yield outside of a sequence function")]
    #[diagnostic(code(E2050))]
    YieldOutsideSequence {
        #[label("not inside a sequence function")]
        span: SourceSpan,
    },

    #[error("sequence functions cannot return a value")]
    #[diagnostic(code(E2051), help("use 'yield' to produce elements"))]
    ReturnValueInSequence {
        #[label("value returned here")]
        span: SourceSpan,
    },

    #[error("cannot capture '{name}' in a closure")]
    #[diagnostic(code(E2060), help("only local variables can be captured"))]
    CaptureUnsupported {
        name: String,
        #[label("capture not supported")]
        span: SourceSpan,
    },

    #[error("{feature} is not supported")]
    #[diagnostic(code(E2099))]
    Unsupported {
        feature: String,
        #[label("unsupported")]
        span: SourceSpan,
    },
}
