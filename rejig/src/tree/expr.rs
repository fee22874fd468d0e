//! Expression nodes.
//!
//! Every payload struct carries the stable node identity, its leading
//! trivia, and its marker set. Payloads live behind `Arc` so that visitors
//! returning an unchanged child preserve pointer identity, which is how
//! structural sharing is observed (and tested).

use std::sync::Arc;

use compact_str::CompactString;

use super::marker::Markers;
use super::padding::{Container, LeftPadded, RightPadded};
use super::space::Space;
use super::NodeId;
use crate::semantic::{MethodId, TyId, VarId};

/// A name, either a variable reference, a type reference, or the name part
/// of a field access / method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The identifier text.
    pub simple_name: CompactString,
    /// Resolved type of the expression, when attribution succeeded.
    pub type_ref: Option<TyId>,
    /// Resolved variable this identifier refers to, when it names one.
    pub variable: Option<VarId>,
}

impl Identifier {
    /// Builds a detached identifier with a fresh id and no trivia.
    #[must_use]
    pub fn build(name: impl Into<CompactString>) -> Self {
        Self {
            id: NodeId::new_v4(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            simple_name: name.into(),
            type_ref: None,
            variable: None,
        }
    }
}

/// A literal value with its exact source spelling preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The parsed value.
    pub value: LiteralValue,
    /// The exact source text, printed verbatim (`0x1F`, `"a\nb"`, ...).
    pub value_source: String,
    /// Resolved type, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

/// The parsed value of a [`Literal`].
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// The `null` literal.
    Null,
    /// `true` or `false`.
    Boolean(bool),
    /// An integral literal.
    Integer(i64),
    /// A floating-point literal.
    Double(f64),
    /// A character literal, unescaped.
    Char(char),
    /// A string literal, unescaped.
    String(String),
}

/// `target.name`: field access or package/type qualification.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The qualifier expression.
    pub target: Expression,
    /// The accessed name; `before` captures the space before the dot.
    pub name: LeftPadded<Identifier>,
    /// Resolved type of the whole access, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

/// `select.name(arguments)`: a method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvocation {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Receiver expression; `after` captures the space before the dot.
    /// `None` for unqualified calls.
    pub select: Option<RightPadded<Expression>>,
    /// The invoked method name.
    pub name: Identifier,
    /// Argument list, including the parenthesis spacing.
    pub arguments: Container<Expression>,
    /// Resolved method signature, when attribution succeeded.
    pub method: Option<MethodId>,
    /// Resolved return type, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

/// A binary operator expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Left operand.
    pub left: Expression,
    /// Operator; `before` captures the space before the operator token.
    pub operator: LeftPadded<BinaryOp>,
    /// Right operand.
    pub right: Expression,
    /// Resolved result type, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

/// Binary operator kinds for the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Addition,
    /// `-`
    Subtraction,
    /// `*`
    Multiplication,
    /// `/`
    Division,
    /// `%`
    Modulo,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessThanOrEqual,
    /// `>=`
    GreaterThanOrEqual,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// The operator's source token.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Addition => "+",
            Self::Subtraction => "-",
            Self::Multiplication => "*",
            Self::Division => "/",
            Self::Modulo => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// A prefix unary operator expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Operator kind.
    pub operator: UnaryOp,
    /// The operand.
    pub expression: Expression,
    /// Resolved result type, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

/// Unary operator kinds for the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Negative,
}

impl UnaryOp {
    /// The operator's source token.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Negative => "-",
        }
    }
}

/// `variable = assignment`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Assignment target.
    pub variable: Expression,
    /// Assigned value; `before` captures the space before the `=`.
    pub assignment: LeftPadded<Expression>,
    /// Resolved type, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Parentheses {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The wrapped expression; `after` captures the space before `)`.
    pub tree: RightPadded<Expression>,
}

/// `new Clazz(arguments)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The constructed type tree; its prefix is the space after `new`.
    pub clazz: Expression,
    /// Constructor arguments.
    pub arguments: Container<Expression>,
    /// Resolved constructed type, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

/// `Clazz<TypeArg, ...>`: a parameterized type tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedType {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The raw type tree (identifier or field access).
    pub clazz: Expression,
    /// Type arguments, including the angle-bracket spacing.
    pub type_parameters: Container<Expression>,
    /// Resolved parameterized type, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

/// A node that prints nothing except its prefix. Used for empty list
/// slots (e.g. `()` parameter lists) and as a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Empty {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
}

impl Empty {
    /// Builds a detached empty node.
    #[must_use]
    pub fn build() -> Self {
        Self {
            id: NodeId::new_v4(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
        }
    }
}

/// The closed union of expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A name.
    Identifier(Arc<Identifier>),
    /// A literal.
    Literal(Arc<Literal>),
    /// `target.name`.
    FieldAccess(Arc<FieldAccess>),
    /// A method invocation.
    MethodInvocation(Arc<MethodInvocation>),
    /// A binary operation.
    Binary(Arc<Binary>),
    /// A prefix unary operation.
    Unary(Arc<Unary>),
    /// An assignment.
    Assignment(Arc<Assignment>),
    /// A parenthesized expression.
    Parentheses(Arc<Parentheses>),
    /// An object construction.
    NewClass(Arc<NewClass>),
    /// A parameterized type tree.
    ParameterizedType(Arc<ParameterizedType>),
    /// An empty placeholder.
    Empty(Arc<Empty>),
}

impl Expression {
    /// Stable identity of the underlying node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Identifier(n) => n.id,
            Self::Literal(n) => n.id,
            Self::FieldAccess(n) => n.id,
            Self::MethodInvocation(n) => n.id,
            Self::Binary(n) => n.id,
            Self::Unary(n) => n.id,
            Self::Assignment(n) => n.id,
            Self::Parentheses(n) => n.id,
            Self::NewClass(n) => n.id,
            Self::ParameterizedType(n) => n.id,
            Self::Empty(n) => n.id,
        }
    }

    /// Leading trivia of the underlying node.
    #[must_use]
    pub fn prefix(&self) -> &Space {
        match self {
            Self::Identifier(n) => &n.prefix,
            Self::Literal(n) => &n.prefix,
            Self::FieldAccess(n) => &n.prefix,
            Self::MethodInvocation(n) => &n.prefix,
            Self::Binary(n) => &n.prefix,
            Self::Unary(n) => &n.prefix,
            Self::Assignment(n) => &n.prefix,
            Self::Parentheses(n) => &n.prefix,
            Self::NewClass(n) => &n.prefix,
            Self::ParameterizedType(n) => &n.prefix,
            Self::Empty(n) => &n.prefix,
        }
    }

    /// Returns a copy with the prefix replaced. The node identity is kept.
    #[must_use]
    pub fn with_prefix(self, prefix: Space) -> Self {
        match self {
            Self::Identifier(n) => Self::Identifier(Arc::new(Identifier {
                prefix,
                ..(*n).clone()
            })),
            Self::Literal(n) => Self::Literal(Arc::new(Literal {
                prefix,
                ..(*n).clone()
            })),
            Self::FieldAccess(n) => Self::FieldAccess(Arc::new(FieldAccess {
                prefix,
                ..(*n).clone()
            })),
            Self::MethodInvocation(n) => Self::MethodInvocation(Arc::new(MethodInvocation {
                prefix,
                ..(*n).clone()
            })),
            Self::Binary(n) => Self::Binary(Arc::new(Binary {
                prefix,
                ..(*n).clone()
            })),
            Self::Unary(n) => Self::Unary(Arc::new(Unary {
                prefix,
                ..(*n).clone()
            })),
            Self::Assignment(n) => Self::Assignment(Arc::new(Assignment {
                prefix,
                ..(*n).clone()
            })),
            Self::Parentheses(n) => Self::Parentheses(Arc::new(Parentheses {
                prefix,
                ..(*n).clone()
            })),
            Self::NewClass(n) => Self::NewClass(Arc::new(NewClass {
                prefix,
                ..(*n).clone()
            })),
            Self::ParameterizedType(n) => Self::ParameterizedType(Arc::new(ParameterizedType {
                prefix,
                ..(*n).clone()
            })),
            Self::Empty(n) => Self::Empty(Arc::new(Empty {
                prefix,
                ..(*n).clone()
            })),
        }
    }

    /// Side-channel metadata of the underlying node.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        match self {
            Self::Identifier(n) => &n.markers,
            Self::Literal(n) => &n.markers,
            Self::FieldAccess(n) => &n.markers,
            Self::MethodInvocation(n) => &n.markers,
            Self::Binary(n) => &n.markers,
            Self::Unary(n) => &n.markers,
            Self::Assignment(n) => &n.markers,
            Self::Parentheses(n) => &n.markers,
            Self::NewClass(n) => &n.markers,
            Self::ParameterizedType(n) => &n.markers,
            Self::Empty(n) => &n.markers,
        }
    }

    /// Returns a copy with the marker set replaced.
    #[must_use]
    pub fn with_markers(self, markers: Markers) -> Self {
        match self {
            Self::Identifier(n) => Self::Identifier(Arc::new(Identifier {
                markers,
                ..(*n).clone()
            })),
            Self::Literal(n) => Self::Literal(Arc::new(Literal {
                markers,
                ..(*n).clone()
            })),
            Self::FieldAccess(n) => Self::FieldAccess(Arc::new(FieldAccess {
                markers,
                ..(*n).clone()
            })),
            Self::MethodInvocation(n) => Self::MethodInvocation(Arc::new(MethodInvocation {
                markers,
                ..(*n).clone()
            })),
            Self::Binary(n) => Self::Binary(Arc::new(Binary {
                markers,
                ..(*n).clone()
            })),
            Self::Unary(n) => Self::Unary(Arc::new(Unary {
                markers,
                ..(*n).clone()
            })),
            Self::Assignment(n) => Self::Assignment(Arc::new(Assignment {
                markers,
                ..(*n).clone()
            })),
            Self::Parentheses(n) => Self::Parentheses(Arc::new(Parentheses {
                markers,
                ..(*n).clone()
            })),
            Self::NewClass(n) => Self::NewClass(Arc::new(NewClass {
                markers,
                ..(*n).clone()
            })),
            Self::ParameterizedType(n) => Self::ParameterizedType(Arc::new(ParameterizedType {
                markers,
                ..(*n).clone()
            })),
            Self::Empty(n) => Self::Empty(Arc::new(Empty {
                markers,
                ..(*n).clone()
            })),
        }
    }

    /// Resolved static type of the expression, when attribution succeeded.
    #[must_use]
    pub fn type_ref(&self) -> Option<TyId> {
        match self {
            Self::Identifier(n) => n.type_ref,
            Self::Literal(n) => n.type_ref,
            Self::FieldAccess(n) => n.type_ref,
            Self::MethodInvocation(n) => n.type_ref,
            Self::Binary(n) => n.type_ref,
            Self::Unary(n) => n.type_ref,
            Self::Assignment(n) => n.type_ref,
            Self::Parentheses(n) => n.tree.element.type_ref(),
            Self::NewClass(n) => n.type_ref,
            Self::ParameterizedType(n) => n.type_ref,
            Self::Empty(_) => None,
        }
    }

    /// True when both sides share the same underlying allocation. Used to
    /// detect unchanged children after a visit without deep comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Identifier(a), Self::Identifier(b)) => Arc::ptr_eq(a, b),
            (Self::Literal(a), Self::Literal(b)) => Arc::ptr_eq(a, b),
            (Self::FieldAccess(a), Self::FieldAccess(b)) => Arc::ptr_eq(a, b),
            (Self::MethodInvocation(a), Self::MethodInvocation(b)) => Arc::ptr_eq(a, b),
            (Self::Binary(a), Self::Binary(b)) => Arc::ptr_eq(a, b),
            (Self::Unary(a), Self::Unary(b)) => Arc::ptr_eq(a, b),
            (Self::Assignment(a), Self::Assignment(b)) => Arc::ptr_eq(a, b),
            (Self::Parentheses(a), Self::Parentheses(b)) => Arc::ptr_eq(a, b),
            (Self::NewClass(a), Self::NewClass(b)) => Arc::ptr_eq(a, b),
            (Self::ParameterizedType(a), Self::ParameterizedType(b)) => Arc::ptr_eq(a, b),
            (Self::Empty(a), Self::Empty(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Flattens an identifier / field-access chain into its dotted source
    /// name, without any captured spacing. Returns `None` for expression
    /// kinds that do not form a name.
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Self::Identifier(n) => Some(n.simple_name.to_string()),
            Self::FieldAccess(n) => {
                let target = n.target.qualified_name()?;
                Some(format!("{target}.{}", n.name.element.simple_name))
            }
            Self::ParameterizedType(n) => n.clazz.qualified_name(),
            _ => None,
        }
    }

    /// The rightmost simple name of an identifier / field-access chain.
    #[must_use]
    pub fn simple_name(&self) -> Option<CompactString> {
        match self {
            Self::Identifier(n) => Some(n.simple_name.clone()),
            Self::FieldAccess(n) => Some(n.name.element.simple_name.clone()),
            Self::ParameterizedType(n) => n.clazz.simple_name(),
            _ => None,
        }
    }
}
