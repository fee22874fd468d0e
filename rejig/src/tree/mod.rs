//! The lossless tree model.
//!
//! Nodes preserve every byte of the original source: leading trivia lives
//! in [`Space`] prefixes, delimiter spacing in padded wrappers, and
//! everything else in the nodes themselves. Printing an unmodified tree
//! reproduces its source exactly.

pub mod decl;
pub mod expr;
pub mod marker;
pub mod padding;
pub mod printer;
pub mod space;
pub mod stmt;

use serde::{Deserialize, Serialize};

pub use decl::{
    Annotation, ClassDecl, ClassKeyword, CompilationUnit, Import, MethodDecl, Modifier,
    ModifierKind, NamedVariable, Package, VariableDecls,
};
pub use expr::{
    Assignment, Binary, BinaryOp, Empty, Expression, FieldAccess, Identifier, Literal,
    LiteralValue, MethodInvocation, NewClass, ParameterizedType, Parentheses, Unary, UnaryOp,
};
pub use marker::{Marker, Markers};
pub use padding::{remove_padded, Container, LeftPadded, RightPadded};
pub use printer::print;
pub use space::{Comment, CommentStyle, Space};
pub use stmt::{Block, ControlParens, Else, If, Return, Statement, Throw, While};

/// Stable node identity: assigned at construction, never recomputed, and
/// carried unchanged through transformations. Identity comparison is how
/// scope containment is decided; it is distinct from structural equality.
pub type NodeId = uuid::Uuid;

/// A parse or attribution problem surfaced at the tree root. The engine
/// does not fail a pass for these by default; individual visitors may
/// choose to skip nodes with missing information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Human-readable description of the problem.
    pub message: String,
    /// 1-indexed source line, or 0 when no position is known.
    pub line: usize,
    /// 1-indexed source column, or 0 when no position is known.
    pub column: usize,
}

impl Diagnostic {
    /// A diagnostic without a source position, e.g. from attribution.
    #[must_use]
    pub fn unpositioned(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            column: 0,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}:{}: {}", self.line, self.column, self.message)
        }
    }
}
