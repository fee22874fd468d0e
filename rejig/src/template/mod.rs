//! Template-based mutation: parse a snippet of source in the context of a
//! cursor position, substitute placeholders, and splice the result into
//! the tree at a coordinate.
//!
//! Snippets are parsed inside a synthesized copy of the enclosing scope
//! (package, imports, enclosing class fields, enclosing method
//! parameters) so that names only resolvable in context still parse and
//! attribute. The returned fragments carry no type handles: handles are
//! arena-specific, so callers that need semantic information afterwards
//! re-attribute the whole file. A snippet that fails to parse in context
//! fails the mutation; a partially applied template would corrupt the
//! round-trip invariant, so there is no recovery.

pub mod coordinates;

pub use coordinates::{CoordinateMode, Coordinates};

use std::sync::Arc;

use thiserror::Error;

use crate::parser;
use crate::semantic::TypeArena;
use crate::tree::{
    printer, Annotation, Block, Container, Expression, Marker, MethodDecl, MethodInvocation,
    RightPadded, Space, Statement,
};
use crate::visitor::cursor::Cursor;
use crate::visitor::{TraversalContext, TreeVisitor, VisitResult};

/// A template mutation failure. Fatal for the mutation that raised it.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The snippet (after substitution) failed to parse in context.
    #[error("snippet {snippet:?} failed to parse at {location}: {message}")]
    Parse {
        /// The substituted snippet text.
        snippet: String,
        /// Human-readable description of the cursor position.
        location: String,
        /// The underlying syntax error.
        message: String,
    },
    /// The snippet parsed but did not produce the expected fragment kind.
    #[error("snippet {snippet:?} did not produce {expected} at {location}")]
    WrongShape {
        /// The substituted snippet text.
        snippet: String,
        /// What the caller asked for.
        expected: &'static str,
        /// Human-readable description of the cursor position.
        location: String,
    },
    /// Placeholder count does not match the supplied parameters.
    #[error("snippet has {expected} placeholder(s) but {supplied} parameter(s) were supplied")]
    PlaceholderMismatch {
        /// Placeholders in the snippet.
        expected: usize,
        /// Parameters supplied by the caller.
        supplied: usize,
    },
    /// The coordinates do not point at a usable splice position.
    #[error("bad splice coordinates: {detail}")]
    BadCoordinates {
        /// What was wrong.
        detail: String,
    },
}

/// The name of the synthetic method snippets are parsed inside of.
const FRAGMENT_METHOD: &str = "__fragment__";

/// A reusable source template with positional `#{}` placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    code: String,
    imports: Vec<String>,
}

impl Template {
    /// Creates a template from snippet source. `#{}` placeholders are
    /// substituted positionally with caller-supplied fragments.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            imports: Vec::new(),
        }
    }

    /// Declares the imports the snippet's code relies on. Imports not
    /// already present at the cursor's compilation unit are reported back
    /// as needed; deciding where they land in the import list is the
    /// import-management visitors' job, not the template's.
    #[must_use]
    pub fn imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports = imports.into_iter().map(Into::into).collect();
        self
    }

    /// Substitutes placeholders with the printed text of the supplied
    /// fragments, reusing them verbatim.
    fn expand(&self, params: &[Expression]) -> Result<String, TemplateError> {
        let expected = self.code.matches("#{}").count();
        if expected != params.len() {
            return Err(TemplateError::PlaceholderMismatch {
                expected,
                supplied: params.len(),
            });
        }
        let mut out = String::with_capacity(self.code.len());
        let mut rest = self.code.as_str();
        for param in params {
            let Some(pos) = rest.find("#{}") else { break };
            out.push_str(&rest[..pos]);
            out.push_str(printer::print_expression(param).trim());
            rest = &rest[pos + 3..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Parses the snippet as an expression in the cursor's scope.
    pub fn apply_expression(
        &self,
        cursor: &Cursor,
        params: &[Expression],
    ) -> Result<(Expression, Vec<String>), TemplateError> {
        let snippet = self.expand(params)?;
        let location = describe(cursor);
        let source = self.context_source(cursor, &format!("return {snippet};"), "");
        let parsed = parser::parse(&source, "template.java").map_err(|e| TemplateError::Parse {
            snippet: snippet.clone(),
            location: location.clone(),
            message: e.to_string(),
        })?;
        let body = fragment_body(&parsed.cu).ok_or_else(|| TemplateError::WrongShape {
            snippet: snippet.clone(),
            expected: "an expression",
            location: location.clone(),
        })?;
        let expression = body.statements.iter().find_map(|s| match &s.element {
            Statement::Return(ret) => ret.expression.clone(),
            _ => None,
        });
        let Some(expression) = expression else {
            return Err(TemplateError::WrongShape {
                snippet,
                expected: "an expression",
                location,
            });
        };
        let expression = strip_expression(expression);
        Ok((expression, self.missing_imports(cursor)))
    }

    /// Parses the snippet as a statement list in the cursor's scope.
    pub fn apply_statements(
        &self,
        cursor: &Cursor,
        params: &[Expression],
    ) -> Result<(Vec<Statement>, Vec<String>), TemplateError> {
        let snippet = self.expand(params)?;
        let location = describe(cursor);
        let source = self.context_source(cursor, &snippet, "");
        let parsed = parser::parse(&source, "template.java").map_err(|e| TemplateError::Parse {
            snippet: snippet.clone(),
            location: location.clone(),
            message: e.to_string(),
        })?;
        let body = fragment_body(&parsed.cu).ok_or_else(|| TemplateError::WrongShape {
            snippet: snippet.clone(),
            expected: "statements",
            location,
        })?;
        let statements = body
            .statements
            .iter()
            .map(|s| strip_statement(s.element.clone()))
            .collect();
        Ok((statements, self.missing_imports(cursor)))
    }

    /// Parses the snippet as a single annotation in the cursor's scope.
    pub fn apply_annotation(
        &self,
        cursor: &Cursor,
        params: &[Expression],
    ) -> Result<(Annotation, Vec<String>), TemplateError> {
        let snippet = self.expand(params)?;
        let location = describe(cursor);
        let source = self.context_source(cursor, "", &snippet);
        let parsed = parser::parse(&source, "template.java").map_err(|e| TemplateError::Parse {
            snippet: snippet.clone(),
            location: location.clone(),
            message: e.to_string(),
        })?;
        let annotation = fragment_method(&parsed.cu)
            .and_then(|m| m.leading_annotations.first().cloned());
        let Some(annotation) = annotation else {
            return Err(TemplateError::WrongShape {
                snippet,
                expected: "an annotation",
                location,
            });
        };
        let annotation = strip_annotation(annotation);
        Ok((annotation, self.missing_imports(cursor)))
    }

    /// Synthesizes a compilable wrapper around the snippet: the package,
    /// the imports in scope plus the template's own, the enclosing class
    /// fields, and the enclosing method's parameters.
    fn context_source(&self, cursor: &Cursor, body: &str, method_annotations: &str) -> String {
        let mut out = String::new();
        if let Some(unit) = cursor.unit() {
            if let Some(package) = &unit.package {
                out.push_str(&format!("package {package};\n"));
            }
            for import in &unit.imports {
                let statik = if import.is_static { "static " } else { "" };
                out.push_str(&format!("import {statik}{};\n", import.qualified));
            }
        }
        for import in &self.imports {
            out.push_str(&format!("import {import};\n"));
        }

        let class_name = cursor
            .enclosing_class()
            .map_or_else(|| "__Context__".to_owned(), |c| c.simple_name().to_string());
        out.push_str(&format!("class {class_name} {{\n"));
        if let Some(class) = cursor.enclosing_class() {
            for statement in &class.body.statements {
                if let Statement::VariableDecls(_) = &statement.element {
                    out.push_str(&printer::print_statement(&statement.element));
                    out.push_str(";\n");
                }
            }
        }
        let params = cursor.enclosing_method().map_or_else(String::new, |m| {
            m.parameters
                .iter()
                .filter(|p| !matches!(p, Statement::Empty(_)))
                .map(|p| printer::print_statement(p).trim().to_owned())
                .collect::<Vec<_>>()
                .join(", ")
        });
        out.push_str(&format!(
            "{method_annotations} Object {FRAGMENT_METHOD}({params}) {{\n{body}\n}}\n}}\n"
        ));
        out
    }

    /// The declared imports not already satisfied at the cursor's unit.
    fn missing_imports(&self, cursor: &Cursor) -> Vec<String> {
        let Some(unit) = cursor.unit() else {
            return self.imports.clone();
        };
        self.imports
            .iter()
            .filter(|wanted| {
                let covered = unit.imports.iter().any(|have| {
                    if have.is_star {
                        wanted
                            .rsplit_once('.')
                            .is_some_and(|(package, _)| {
                                have.qualified.strip_suffix(".*") == Some(package)
                            })
                    } else {
                        have.qualified == **wanted
                    }
                });
                !covered
            })
            .cloned()
            .collect()
    }
}

fn describe(cursor: &Cursor) -> String {
    let class = cursor
        .enclosing_class()
        .map(|c| c.simple_name().to_string());
    let method = cursor
        .enclosing_method()
        .map(|m| m.simple_name().to_string());
    match (class, method) {
        (Some(c), Some(m)) => format!("{c}.{m}"),
        (Some(c), None) => c,
        _ => "top level".to_owned(),
    }
}

fn fragment_method(cu: &crate::tree::CompilationUnit) -> Option<Arc<MethodDecl>> {
    cu.classes.iter().find_map(|class| {
        class
            .methods()
            .find(|m| m.simple_name() == FRAGMENT_METHOD)
            .cloned()
    })
}

fn fragment_body(cu: &crate::tree::CompilationUnit) -> Option<Block> {
    fragment_method(cu).and_then(|m| m.body.clone())
}

// ----------------------------------------------------------------------
// Type stripping: handles are only valid within the arena they came
// from, so fragments leave the template without any.
// ----------------------------------------------------------------------

struct StripTypes;

impl TreeVisitor for StripTypes {
    fn visit_identifier(
        &mut self,
        node: Arc<crate::tree::Identifier>,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<crate::tree::Identifier>> {
        Ok(Arc::new(crate::tree::Identifier {
            type_ref: None,
            variable: None,
            ..(*node).clone()
        }))
    }

    fn visit_literal(
        &mut self,
        node: Arc<crate::tree::Literal>,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<crate::tree::Literal>> {
        Ok(Arc::new(crate::tree::Literal {
            type_ref: None,
            ..(*node).clone()
        }))
    }

    fn visit_field_access(
        &mut self,
        node: Arc<crate::tree::FieldAccess>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<crate::tree::FieldAccess>> {
        let node = crate::visitor::walk_field_access(self, node, ctx)?;
        Ok(Arc::new(crate::tree::FieldAccess {
            type_ref: None,
            ..(*node).clone()
        }))
    }

    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodInvocation>> {
        let node = crate::visitor::walk_method_invocation(self, node, ctx)?;
        Ok(Arc::new(MethodInvocation {
            method: None,
            type_ref: None,
            ..(*node).clone()
        }))
    }

    fn visit_binary(
        &mut self,
        node: Arc<crate::tree::Binary>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<crate::tree::Binary>> {
        let node = crate::visitor::walk_binary(self, node, ctx)?;
        Ok(Arc::new(crate::tree::Binary {
            type_ref: None,
            ..(*node).clone()
        }))
    }

    fn visit_unary(
        &mut self,
        node: Arc<crate::tree::Unary>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<crate::tree::Unary>> {
        let node = crate::visitor::walk_unary(self, node, ctx)?;
        Ok(Arc::new(crate::tree::Unary {
            type_ref: None,
            ..(*node).clone()
        }))
    }

    fn visit_assignment(
        &mut self,
        node: Arc<crate::tree::Assignment>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<crate::tree::Assignment>> {
        let node = crate::visitor::walk_assignment(self, node, ctx)?;
        Ok(Arc::new(crate::tree::Assignment {
            type_ref: None,
            ..(*node).clone()
        }))
    }

    fn visit_new_class(
        &mut self,
        node: Arc<crate::tree::NewClass>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<crate::tree::NewClass>> {
        let node = crate::visitor::walk_new_class(self, node, ctx)?;
        Ok(Arc::new(crate::tree::NewClass {
            type_ref: None,
            ..(*node).clone()
        }))
    }

    fn visit_parameterized_type(
        &mut self,
        node: Arc<crate::tree::ParameterizedType>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<crate::tree::ParameterizedType>> {
        let node = crate::visitor::walk_parameterized_type(self, node, ctx)?;
        Ok(Arc::new(crate::tree::ParameterizedType {
            type_ref: None,
            ..(*node).clone()
        }))
    }

    fn visit_named_variable(
        &mut self,
        var: crate::tree::NamedVariable,
        ctx: &mut TraversalContext,
    ) -> VisitResult<crate::tree::NamedVariable> {
        let var = crate::visitor::walk_named_variable(self, var, ctx)?;
        Ok(crate::tree::NamedVariable {
            name: crate::tree::Identifier {
                type_ref: None,
                variable: None,
                ..var.name.clone()
            },
            variable: None,
            ..var
        })
    }
}

fn strip_ctx() -> TraversalContext {
    TraversalContext::new(Arc::new(TypeArena::new()))
}

fn strip_expression(expression: Expression) -> Expression {
    StripTypes
        .visit_expression(expression.clone(), &mut strip_ctx())
        .unwrap_or(expression)
}

fn strip_statement(statement: Statement) -> Statement {
    StripTypes
        .visit_statement(statement.clone(), &mut strip_ctx())
        .unwrap_or(statement)
}

fn strip_annotation(annotation: Annotation) -> Annotation {
    StripTypes
        .visit_annotation(annotation.clone(), &mut strip_ctx())
        .unwrap_or(annotation)
}

// ----------------------------------------------------------------------
// Splicing
// ----------------------------------------------------------------------

fn modified(statement: Statement) -> Statement {
    let markers = statement.markers().with(Marker::modified());
    statement.with_markers(markers)
}

/// Replaces an expression node with a generated one, preserving the
/// original's leading trivia and marking the result as modified.
#[must_use]
pub fn replace_expression(original: &Expression, generated: Expression) -> Expression {
    let markers = generated.markers().with(Marker::modified());
    generated
        .with_prefix(original.prefix().clone())
        .with_markers(markers)
}

/// Splices generated statements into a block at the position the
/// coordinates imply. Inserted statements land on their own lines and are
/// marked for the auto-format pass.
pub fn splice_statements(
    block: Block,
    coords: &Coordinates,
    generated: Vec<Statement>,
) -> Result<Block, TemplateError> {
    let on_own_line = |statement: Statement| {
        let statement = if statement.prefix().has_newline() {
            statement
        } else {
            statement.with_prefix(Space::of("\n"))
        };
        modified(statement)
    };

    let mut statements = block.statements;
    match coords.mode {
        CoordinateMode::FirstStatement => {
            for statement in generated.into_iter().rev() {
                statements.insert(0, RightPadded::new(on_own_line(statement)));
            }
        }
        CoordinateMode::LastStatement => {
            for statement in generated {
                statements.push(RightPadded::new(on_own_line(statement)));
            }
        }
        CoordinateMode::StatementAt(index) => {
            if index > statements.len() {
                return Err(TemplateError::BadCoordinates {
                    detail: format!(
                        "statement index {index} out of range for block of {}",
                        statements.len()
                    ),
                });
            }
            for statement in generated.into_iter().rev() {
                statements.insert(index, RightPadded::new(on_own_line(statement)));
            }
        }
        CoordinateMode::Replace => {
            let Some(position) = statements
                .iter()
                .position(|s| s.element.id() == coords.target)
            else {
                return Err(TemplateError::BadCoordinates {
                    detail: "replace target is not a statement of this block".to_owned(),
                });
            };
            let original = statements.remove(position);
            let prefix = original.element.prefix().clone();
            let last_index = generated.len().saturating_sub(1);
            for (i, statement) in generated.into_iter().enumerate().rev() {
                // The first replacement takes over the original's leading
                // trivia; the last one its terminator spacing.
                let statement = if i == 0 {
                    modified(statement.with_prefix(prefix.clone()))
                } else {
                    on_own_line(statement)
                };
                let after = if i == last_index {
                    original.after.clone()
                } else {
                    Space::EMPTY
                };
                statements.insert(position, RightPadded::with_after(statement, after));
            }
        }
        CoordinateMode::AddAnnotation | CoordinateMode::ReplaceArguments => {
            return Err(TemplateError::BadCoordinates {
                detail: "coordinate mode does not apply to a block".to_owned(),
            });
        }
    }
    Ok(Block { statements, ..block })
}

/// Adds an annotation before a method's existing annotations, pushing the
/// rest of the declaration onto a new line for the auto-format pass.
#[must_use]
pub fn add_annotation_to_method(method: &Arc<MethodDecl>, annotation: Annotation) -> Arc<MethodDecl> {
    let mut new = (**method).clone();
    let annotation = Annotation {
        prefix: Space::EMPTY,
        ..annotation
    };
    if let Some(first) = new.leading_annotations.first_mut() {
        if !first.prefix.has_newline() {
            first.prefix = Space::of("\n");
        }
    } else if let Some(first) = new.modifiers.first_mut() {
        if !first.prefix.has_newline() {
            first.prefix = Space::of("\n");
        }
    } else if let Some(return_type) = new.return_type.take() {
        new.return_type = Some(return_type.with_prefix(Space::of("\n")));
    } else if !new.name.prefix.has_newline() {
        new.name.prefix = Space::of("\n");
    }
    new.leading_annotations.insert(0, annotation);
    new.markers = new.markers.with(Marker::modified());
    Arc::new(new)
}

/// Replaces an invocation's argument list with generated expressions,
/// keeping the parenthesis spacing.
#[must_use]
pub fn replace_arguments(
    invocation: &Arc<MethodInvocation>,
    arguments: Vec<Expression>,
) -> Arc<MethodInvocation> {
    let elements: Vec<RightPadded<Expression>> = if arguments.is_empty() {
        vec![RightPadded::new(Expression::Empty(Arc::new(
            crate::tree::Empty::build(),
        )))]
    } else {
        arguments
            .into_iter()
            .enumerate()
            .map(|(i, argument)| {
                let argument = if i == 0 {
                    argument.with_prefix(Space::EMPTY)
                } else if argument.prefix().is_empty() {
                    argument.with_prefix(Space::single_space())
                } else {
                    argument
                };
                RightPadded::new(argument)
            })
            .collect()
    };
    let arguments = Container {
        elements,
        ..invocation.arguments.clone()
    };
    Arc::new(MethodInvocation {
        arguments,
        method: None,
        type_ref: None,
        markers: invocation.markers.with(Marker::modified()),
        ..(**invocation).clone()
    })
}
