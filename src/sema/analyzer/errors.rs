// src/sema/analyzer/errors.rs
//
// Diagnostic helpers shared by the analyzer passes.

use crate::errors::{InternalError, SemanticError};
use crate::frontend::{Exp, NodeId, Span};
use crate::sema::types::TypeValue;

use super::{Abort, AnalyzeResult, Checker};

impl Checker<'_> {
    pub(super) fn add_error(&mut self, error: SemanticError, node: NodeId, span: Span) {
        self.diagnostics.add(error, node, span);
    }

    /// Record `error` and abort the current statement or expression.
    pub(super) fn fail<T>(&mut self, error: SemanticError, node: NodeId, span: Span) -> AnalyzeResult<T> {
        self.add_error(error, node, span);
        Err(Abort::Reported)
    }

    pub(super) fn type_mismatch(&mut self, expected: &TypeValue, found: &TypeValue, node: NodeId, span: Span) {
        self.add_error(
            SemanticError::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
                span: span.into(),
            },
            node,
            span,
        );
    }

    /// Report a mismatch unless `found` can be stored where `expected` is
    /// required. Does not abort; returns whether the check passed.
    pub(super) fn check_assignable(
        &mut self,
        expected: &TypeValue,
        found: &TypeValue,
        exp: &Exp,
    ) -> Result<bool, InternalError> {
        if self.is_assignable(expected, found)? {
            return Ok(true);
        }
        self.type_mismatch(expected, found, exp.id, exp.span);
        Ok(false)
    }

    pub(super) fn unknown_member<T>(
        &mut self,
        ty: &TypeValue,
        member: &str,
        node: NodeId,
        span: Span,
    ) -> AnalyzeResult<T> {
        self.fail(
            SemanticError::UnknownMember {
                ty: ty.to_string(),
                member: member.to_string(),
                span: span.into(),
            },
            node,
            span,
        )
    }

    pub(super) fn unsupported<T>(&mut self, feature: &str, node: NodeId, span: Span) -> AnalyzeResult<T> {
        self.fail(
            SemanticError::Unsupported {
                feature: feature.to_string(),
                span: span.into(),
            },
            node,
            span,
        )
    }
}
