// src/errors/mod.rs
//! Structured error reporting for the Lark analyzer.
//!
//! This module provides error types using miette for fancy diagnostics.

pub mod internal;
pub mod report;
pub mod sema;

pub use internal::InternalError;
pub use report::{render_to_string, render_type_errors};
pub use sema::SemanticError;
