// src/frontend/mod.rs
//
// Parser-facing interface: the AST consumed by semantic analysis.

pub mod ast;
pub mod builder;
pub mod span;

pub use ast::*;
pub use builder::AstBuilder;
pub use span::Span;
