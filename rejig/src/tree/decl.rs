//! Declaration nodes: compilation unit, package, imports, classes,
//! methods, fields, annotations, modifiers.

use std::path::PathBuf;
use std::sync::Arc;

use compact_str::CompactString;

use super::expr::{Expression, Identifier};
use super::marker::Markers;
use super::padding::{Container, LeftPadded, RightPadded};
use super::space::Space;
use super::stmt::{Block, Statement};
use super::{Diagnostic, NodeId};
use crate::semantic::{MethodId, TyId, VarId};

/// The root of a parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia of the whole file.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Path of the source file this tree was parsed from.
    pub source_path: PathBuf,
    /// The package declaration; `after` captures space before its `;`.
    pub package: Option<RightPadded<Package>>,
    /// Imports in source order; each `after` captures space before `;`.
    pub imports: Vec<RightPadded<Import>>,
    /// Top-level type declarations.
    pub classes: Vec<Arc<ClassDecl>>,
    /// Trivia between the last construct and end of file.
    pub eof: Space,
    /// Parse and attribution diagnostics surfaced at the root. Visitors
    /// may consult these to skip nodes with missing information.
    pub diagnostics: Vec<Diagnostic>,
}

/// `package com.example`.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The dotted package name expression.
    pub expression: Expression,
}

impl Package {
    /// The dotted package name without spacing.
    #[must_use]
    pub fn name(&self) -> String {
        self.expression.qualified_name().unwrap_or_default()
    }
}

/// `import [static] com.example.Type` or `import com.example.*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Space before the `static` keyword, present only for static imports.
    pub statik: Option<Space>,
    /// The imported qualified name (ending in `*` for star imports).
    pub qualid: Expression,
}

impl Import {
    /// The dotted imported name without spacing, e.g. `java.util.List`
    /// or `java.util.*`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.qualid.qualified_name().unwrap_or_default()
    }

    /// True for `import com.example.*` style imports.
    #[must_use]
    pub fn is_star(&self) -> bool {
        self.qualid
            .simple_name()
            .is_some_and(|n| n == "*")
    }

    /// The imported simple name (`List` for `java.util.List`).
    #[must_use]
    pub fn simple_name(&self) -> CompactString {
        self.qualid.simple_name().unwrap_or_default()
    }

    /// The package portion of the imported name (`java.util` for
    /// `java.util.List` and for `java.util.*`).
    #[must_use]
    pub fn package_name(&self) -> String {
        let full = self.qualified_name();
        match full.rfind('.') {
            Some(pos) => full[..pos].to_owned(),
            None => String::new(),
        }
    }
}

/// A declaration modifier keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The modifier kind.
    pub kind: ModifierKind,
}

/// Modifier keyword kinds for the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
    /// `static`
    Static,
    /// `final`
    Final,
    /// `abstract`
    Abstract,
}

impl ModifierKind {
    /// The modifier's source keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Static => "static",
            Self::Final => "final",
            Self::Abstract => "abstract",
        }
    }
}

/// `@Type` or `@Type(arguments)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The annotation type tree (identifier or field access).
    pub annotation_type: Expression,
    /// Optional argument list, `None` for marker annotations.
    pub arguments: Option<Container<Expression>>,
}

impl Annotation {
    /// The annotation's simple name as written.
    #[must_use]
    pub fn simple_name(&self) -> CompactString {
        self.annotation_type.simple_name().unwrap_or_default()
    }
}

/// The declaration keyword of a [`ClassDecl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKeyword {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `@interface`
    AnnotationType,
}

impl ClassKeyword {
    /// The keyword's source text.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::AnnotationType => "@interface",
        }
    }
}

/// A class, interface, enum, or annotation-type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Annotations preceding the declaration.
    pub leading_annotations: Vec<Annotation>,
    /// Modifier keywords in source order.
    pub modifiers: Vec<Modifier>,
    /// The declaration keyword; `before` captures space preceding it.
    pub kind: LeftPadded<ClassKeyword>,
    /// The declared name.
    pub name: Identifier,
    /// The `extends` clause; `before` captures space before the keyword.
    pub extends: Option<LeftPadded<Expression>>,
    /// The `implements` clause; the container's `before` captures space
    /// before the keyword.
    pub implements: Option<Container<Expression>>,
    /// The class body. Members are statements of this block.
    pub body: Block,
    /// Resolved type of the declared class, when attribution succeeded.
    pub type_ref: Option<TyId>,
}

impl ClassDecl {
    /// The declared simple name.
    #[must_use]
    pub fn simple_name(&self) -> CompactString {
        self.name.simple_name.clone()
    }

    /// Iterates over the method declarations directly in this class body.
    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodDecl>> {
        self.body.statements.iter().filter_map(|s| match &s.element {
            Statement::MethodDecl(m) => Some(m),
            _ => None,
        })
    }
}

/// A method (or constructor) declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Annotations preceding the declaration.
    pub leading_annotations: Vec<Annotation>,
    /// Modifier keywords in source order.
    pub modifiers: Vec<Modifier>,
    /// The return type tree; `None` for constructors.
    pub return_type: Option<Expression>,
    /// The declared name.
    pub name: Identifier,
    /// Parameter declarations. A single [`Statement::Empty`] element
    /// stands for an empty `()` list so its interior space is kept.
    pub parameters: Container<Statement>,
    /// The `throws` clause; the container's `before` captures space before
    /// the keyword.
    pub throws: Option<Container<Expression>>,
    /// The method body, absent for abstract/interface methods.
    pub body: Option<Block>,
    /// Resolved method signature, when attribution succeeded.
    pub method: Option<MethodId>,
}

impl MethodDecl {
    /// The declared simple name.
    #[must_use]
    pub fn simple_name(&self) -> CompactString {
        self.name.simple_name.clone()
    }

    /// True when any leading annotation has the given simple name.
    #[must_use]
    pub fn has_annotation_named(&self, simple_name: &str) -> bool {
        self.leading_annotations
            .iter()
            .any(|a| a.simple_name() == simple_name)
    }
}

/// A variable declaration statement, possibly declaring several names:
/// `final int a = 1, b = 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecls {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// Annotations preceding the declaration.
    pub leading_annotations: Vec<Annotation>,
    /// Modifier keywords in source order.
    pub modifiers: Vec<Modifier>,
    /// The declared type tree, shared by all variables in the statement.
    pub type_expr: Option<Expression>,
    /// Space before `...` for a variadic parameter, `None` otherwise.
    pub varargs: Option<Space>,
    /// The declared names; each `after` captures space before `,` or the
    /// statement terminator.
    pub vars: Vec<RightPadded<NamedVariable>>,
}

impl VariableDecls {
    /// The first declared name, which is the only one for parameters.
    #[must_use]
    pub fn first_name(&self) -> Option<&Identifier> {
        self.vars.first().map(|v| &v.element.name)
    }
}

/// One declared name inside a [`VariableDecls`].
#[derive(Debug, Clone, PartialEq)]
pub struct NamedVariable {
    /// Stable node identity.
    pub id: NodeId,
    /// Leading trivia.
    pub prefix: Space,
    /// Side-channel metadata.
    pub markers: Markers,
    /// The declared name.
    pub name: Identifier,
    /// The initializer; `before` captures space preceding the `=`.
    pub initializer: Option<LeftPadded<Expression>>,
    /// Resolved variable signature, when attribution succeeded.
    pub variable: Option<VarId>,
}
