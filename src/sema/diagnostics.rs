// src/sema/diagnostics.rs
//
// Accumulating diagnostic sink shared by every analysis stage.

use crate::errors::SemanticError;
use crate::frontend::{NodeId, Span};

/// A type error wrapping a miette-enabled SemanticError, attributed to the
/// node that reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub error: SemanticError,
    pub node: NodeId,
    pub span: Span,
}

impl TypeError {
    pub fn new(error: SemanticError, node: NodeId, span: Span) -> Self {
        Self { error, node, span }
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<TypeError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: SemanticError, node: NodeId, span: Span) {
        tracing::debug!(%node, error = %error, "diagnostic");
        self.errors.push(TypeError::new(error, node, span));
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<TypeError> {
        self.errors
    }
}
