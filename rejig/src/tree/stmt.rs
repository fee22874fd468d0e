//! Statement nodes and the statement union.

use std::sync::Arc;

use super::decl::{ClassDecl, MethodDecl, VariableDecls};
use super::expr::{Empty, Expression};
use super::marker::Markers;
use super::padding::RightPadded;
use super::space::Space;
use super::NodeId;

/// A `{ ... }` block. Also serves as a class body, whose statements are
/// member declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Statements in source order; each `after` captures the space before
    /// the statement's terminator, when it has one.
    pub statements: Vec<RightPadded<Statement>>,
    /// Space before the closing `}`.
    pub end: Space,
}

impl Block {
    /// Builds a detached empty block.
    #[must_use]
    pub fn build() -> Self {
        Self {
            id: NodeId::new_v4(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            statements: Vec::new(),
            end: Space::EMPTY,
        }
    }
}

/// A parenthesized control expression, e.g. the condition of `if`/`while`.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlParens {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia (before the `(`).
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The wrapped expression; `after` captures the space before `)`.
    pub tree: RightPadded<Expression>,
}

/// `if (condition) then else ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The parenthesized condition.
    pub condition: ControlParens,
    /// The then-branch; `after` captures space before its terminator.
    pub then_part: RightPadded<Statement>,
    /// The optional else-branch.
    pub else_part: Option<Else>,
}

/// The `else` arm of an [`If`].
#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia (before the `else` keyword).
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The else body; `after` captures space before its terminator.
    pub body: RightPadded<Statement>,
}

/// `while (condition) body`.
#[derive(Debug, Clone, PartialEq)]
pub struct While {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The parenthesized condition.
    pub condition: ControlParens,
    /// The loop body; `after` captures space before its terminator.
    pub body: RightPadded<Statement>,
}

/// `return expression?`.
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The returned expression, absent for bare `return`.
    pub expression: Option<Expression>,
}

/// `throw exception`.
#[derive(Debug, Clone, PartialEq)]
pub struct Throw {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The thrown expression.
    pub exception: Expression,
}

/// The closed union of statement kinds. Class members (methods, fields,
/// nested classes) appear as statements of the class body block.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A `{ ... }` block.
    Block(Arc<Block>),
    /// A class declaration (top-level or nested).
    ClassDecl(Arc<ClassDecl>),
    /// An empty statement (bare `;`) or list placeholder.
    Empty(Arc<Empty>),
    /// An expression in statement position.
    Expression(Expression),
    /// An `if` statement.
    If(Arc<If>),
    /// A method declaration (class member).
    MethodDecl(Arc<MethodDecl>),
    /// A `return` statement.
    Return(Arc<Return>),
    /// A `throw` statement.
    Throw(Arc<Throw>),
    /// A (possibly multi-) variable declaration.
    VariableDecls(Arc<VariableDecls>),
    /// A `while` loop.
    While(Arc<While>),
}

impl Statement {
    /// Stable identity of the underlying node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Block(n) => n.id,
            Self::ClassDecl(n) => n.id,
            Self::Empty(n) => n.id,
            Self::Expression(e) => e.id(),
            Self::If(n) => n.id,
            Self::MethodDecl(n) => n.id,
            Self::Return(n) => n.id,
            Self::Throw(n) => n.id,
            Self::VariableDecls(n) => n.id,
            Self::While(n) => n.id,
        }
    }

    /// Leading trivia of the underlying node.
    #[must_use]
    pub fn prefix(&self) -> &Space {
        match self {
            Self::Block(n) => &n.prefix,
            Self::ClassDecl(n) => &n.prefix,
            Self::Empty(n) => &n.prefix,
            Self::Expression(e) => e.prefix(),
            Self::If(n) => &n.prefix,
            Self::MethodDecl(n) => &n.prefix,
            Self::Return(n) => &n.prefix,
            Self::Throw(n) => &n.prefix,
            Self::VariableDecls(n) => &n.prefix,
            Self::While(n) => &n.prefix,
        }
    }

    /// Returns a copy with the prefix replaced. The node identity is kept.
    #[must_use]
    pub fn with_prefix(self, prefix: Space) -> Self {
        match self {
            Self::Block(n) => Self::Block(Arc::new(Block {
                prefix,
                ..(*n).clone()
            })),
            Self::ClassDecl(n) => Self::ClassDecl(Arc::new(ClassDecl {
                prefix,
                ..(*n).clone()
            })),
            Self::Empty(n) => Self::Empty(Arc::new(Empty {
                prefix,
                ..(*n).clone()
            })),
            Self::Expression(e) => Self::Expression(e.with_prefix(prefix)),
            Self::If(n) => Self::If(Arc::new(If {
                prefix,
                ..(*n).clone()
            })),
            Self::MethodDecl(n) => Self::MethodDecl(Arc::new(MethodDecl {
                prefix,
                ..(*n).clone()
            })),
            Self::Return(n) => Self::Return(Arc::new(Return {
                prefix,
                ..(*n).clone()
            })),
            Self::Throw(n) => Self::Throw(Arc::new(Throw {
                prefix,
                ..(*n).clone()
            })),
            Self::VariableDecls(n) => Self::VariableDecls(Arc::new(VariableDecls {
                prefix,
                ..(*n).clone()
            })),
            Self::While(n) => Self::While(Arc::new(While {
                prefix,
                ..(*n).clone()
            })),
        }
    }

    /// Side-channel metadata of the underlying node.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        match self {
            Self::Block(n) => &n.markers,
            Self::ClassDecl(n) => &n.markers,
            Self::Empty(n) => &n.markers,
            Self::Expression(e) => e.markers(),
            Self::If(n) => &n.markers,
            Self::MethodDecl(n) => &n.markers,
            Self::Return(n) => &n.markers,
            Self::Throw(n) => &n.markers,
            Self::VariableDecls(n) => &n.markers,
            Self::While(n) => &n.markers,
        }
    }

    /// Returns a copy with the marker set replaced.
    #[must_use]
    pub fn with_markers(self, markers: Markers) -> Self {
        match self {
            Self::Block(n) => Self::Block(Arc::new(Block {
                markers,
                ..(*n).clone()
            })),
            Self::ClassDecl(n) => Self::ClassDecl(Arc::new(ClassDecl {
                markers,
                ..(*n).clone()
            })),
            Self::Empty(n) => Self::Empty(Arc::new(Empty {
                markers,
                ..(*n).clone()
            })),
            Self::Expression(e) => Self::Expression(e.with_markers(markers)),
            Self::If(n) => Self::If(Arc::new(If {
                markers,
                ..(*n).clone()
            })),
            Self::MethodDecl(n) => Self::MethodDecl(Arc::new(MethodDecl {
                markers,
                ..(*n).clone()
            })),
            Self::Return(n) => Self::Return(Arc::new(Return {
                markers,
                ..(*n).clone()
            })),
            Self::Throw(n) => Self::Throw(Arc::new(Throw {
                markers,
                ..(*n).clone()
            })),
            Self::VariableDecls(n) => Self::VariableDecls(Arc::new(VariableDecls {
                markers,
                ..(*n).clone()
            })),
            Self::While(n) => Self::While(Arc::new(While {
                markers,
                ..(*n).clone()
            })),
        }
    }

    /// True when both sides share the same underlying allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Block(a), Self::Block(b)) => Arc::ptr_eq(a, b),
            (Self::ClassDecl(a), Self::ClassDecl(b)) => Arc::ptr_eq(a, b),
            (Self::Empty(a), Self::Empty(b)) => Arc::ptr_eq(a, b),
            (Self::Expression(a), Self::Expression(b)) => a.ptr_eq(b),
            (Self::If(a), Self::If(b)) => Arc::ptr_eq(a, b),
            (Self::MethodDecl(a), Self::MethodDecl(b)) => Arc::ptr_eq(a, b),
            (Self::Return(a), Self::Return(b)) => Arc::ptr_eq(a, b),
            (Self::Throw(a), Self::Throw(b)) => Arc::ptr_eq(a, b),
            (Self::VariableDecls(a), Self::VariableDecls(b)) => Arc::ptr_eq(a, b),
            (Self::While(a), Self::While(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Whether this statement is terminated by a semicolon in statement
    /// position. Block-shaped statements are not; a method declaration is
    /// only when it has no body (abstract/interface methods).
    #[must_use]
    pub fn needs_terminator(&self) -> bool {
        match self {
            Self::Block(_) | Self::ClassDecl(_) | Self::If(_) | Self::While(_) => false,
            Self::MethodDecl(m) => m.body.is_none(),
            Self::Empty(_)
            | Self::Expression(_)
            | Self::Return(_)
            | Self::Throw(_)
            | Self::VariableDecls(_) => true,
        }
    }
}
