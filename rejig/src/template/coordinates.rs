//! Splice coordinates: where and how a generated fragment lands.

use crate::tree::NodeId;

/// The edit semantics of a splice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateMode {
    /// Replace the target node, keeping its leading trivia.
    Replace,
    /// Add an annotation before the target declaration's existing ones.
    AddAnnotation,
    /// Insert as the first statement of the target block.
    FirstStatement,
    /// Insert as the last statement of the target block.
    LastStatement,
    /// Insert before the statement at this index of the target block.
    StatementAt(usize),
    /// Replace the argument list of the target invocation.
    ReplaceArguments,
}

/// A typed descriptor of where a generated fragment should be spliced:
/// the target node (by stable identity) and the intended edit semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    /// The node the edit is anchored to.
    pub target: NodeId,
    /// What the edit means relative to the target.
    pub mode: CoordinateMode,
}

impl Coordinates {
    /// Replace the node itself.
    #[must_use]
    pub fn replace(target: NodeId) -> Self {
        Self {
            target,
            mode: CoordinateMode::Replace,
        }
    }

    /// Add an annotation to the declaration.
    #[must_use]
    pub fn add_annotation(target: NodeId) -> Self {
        Self {
            target,
            mode: CoordinateMode::AddAnnotation,
        }
    }

    /// Insert at the start of the block.
    #[must_use]
    pub fn first_statement(target: NodeId) -> Self {
        Self {
            target,
            mode: CoordinateMode::FirstStatement,
        }
    }

    /// Append at the end of the block.
    #[must_use]
    pub fn last_statement(target: NodeId) -> Self {
        Self {
            target,
            mode: CoordinateMode::LastStatement,
        }
    }

    /// Insert before the statement at `index`.
    #[must_use]
    pub fn statement_at(target: NodeId, index: usize) -> Self {
        Self {
            target,
            mode: CoordinateMode::StatementAt(index),
        }
    }

    /// Replace the invocation's arguments.
    #[must_use]
    pub fn replace_arguments(target: NodeId) -> Self {
        Self {
            target,
            mode: CoordinateMode::ReplaceArguments,
        }
    }
}
