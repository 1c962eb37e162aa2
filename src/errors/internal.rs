// src/errors/internal.rs
//! Internal-consistency violations.
//!
//! These indicate a bug earlier in the analysis pipeline rather than a problem
//! in the analyzed script, and end the whole analysis pass.

use thiserror::Error;

use crate::frontend::NodeId;
use crate::identity::MetaItemId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    #[error("'{item}' declares {expected} type parameters but {found} type arguments were supplied")]
    TypeArgArity {
        item: MetaItemId,
        expected: usize,
        found: usize,
    },

    #[error("no metadata for resolved item '{0}'")]
    MissingItem(MetaItemId),

    #[error("type arguments for '{item}' span {depth} nesting levels, more than the item has")]
    ArgListDepth { item: MetaItemId, depth: usize },

    #[error("analysis info for {0} was written twice")]
    DuplicateNodeInfo(NodeId),

    #[error("type expression {0} was never evaluated")]
    MissingTypeExp(NodeId),
}
