//! Printing trees back to source text.
//!
//! Printing is a pure function of the tree: prefix + tokens + captured
//! padding, nothing else. An unmodified tree prints byte-identically to
//! the source it was parsed from.

use super::decl::{
    Annotation, ClassDecl, CompilationUnit, Import, MethodDecl, Modifier, NamedVariable,
    VariableDecls,
};
use super::expr::{Expression, Identifier};
use super::padding::{Container, RightPadded};
use super::stmt::{Block, ControlParens, Statement};

/// Renders a compilation unit back to UTF-8 source text.
#[must_use]
pub fn print(cu: &CompilationUnit) -> String {
    let mut p = Printer::default();
    p.compilation_unit(cu);
    p.out
}

/// Renders a single statement (without any terminator).
#[must_use]
pub fn print_statement(statement: &Statement) -> String {
    let mut p = Printer::default();
    p.statement(statement);
    p.out
}

/// Renders a single expression.
#[must_use]
pub fn print_expression(expression: &Expression) -> String {
    let mut p = Printer::default();
    p.expression(expression);
    p.out
}

/// Renders a single annotation.
#[must_use]
pub fn print_annotation(annotation: &Annotation) -> String {
    let mut p = Printer::default();
    p.annotation(annotation);
    p.out
}

#[derive(Default)]
struct Printer {
    out: String,
}

impl Printer {
    fn compilation_unit(&mut self, cu: &CompilationUnit) {
        self.out.push_str(&cu.prefix.print());
        if let Some(package) = &cu.package {
            self.out.push_str(&package.element.prefix.print());
            self.out.push_str("package");
            self.expression(&package.element.expression);
            self.out.push_str(&package.after.print());
            self.out.push(';');
        }
        for import in &cu.imports {
            self.import(&import.element);
            self.out.push_str(&import.after.print());
            self.out.push(';');
        }
        for class in &cu.classes {
            self.class_decl(class);
        }
        self.out.push_str(&cu.eof.print());
    }

    fn import(&mut self, import: &Import) {
        self.out.push_str(&import.prefix.print());
        self.out.push_str("import");
        if let Some(space) = &import.statik {
            self.out.push_str(&space.print());
            self.out.push_str("static");
        }
        self.expression(&import.qualid);
    }

    fn class_decl(&mut self, class: &ClassDecl) {
        self.out.push_str(&class.prefix.print());
        for annotation in &class.leading_annotations {
            self.annotation(annotation);
        }
        for modifier in &class.modifiers {
            self.modifier(modifier);
        }
        self.out.push_str(&class.kind.before.print());
        self.out.push_str(class.kind.element.keyword());
        self.identifier(&class.name);
        if let Some(extends) = &class.extends {
            self.out.push_str(&extends.before.print());
            self.out.push_str("extends");
            self.expression(&extends.element);
        }
        if let Some(implements) = &class.implements {
            self.out.push_str(&implements.before.print());
            self.out.push_str("implements");
            self.separated(&implements.elements, Self::expression);
        }
        self.block(&class.body);
    }

    fn annotation(&mut self, annotation: &Annotation) {
        self.out.push_str(&annotation.prefix.print());
        self.out.push('@');
        self.expression(&annotation.annotation_type);
        if let Some(arguments) = &annotation.arguments {
            self.parenthesized(arguments);
        }
    }

    fn modifier(&mut self, modifier: &Modifier) {
        self.out.push_str(&modifier.prefix.print());
        self.out.push_str(modifier.kind.keyword());
    }

    fn method_decl(&mut self, method: &MethodDecl) {
        self.out.push_str(&method.prefix.print());
        for annotation in &method.leading_annotations {
            self.annotation(annotation);
        }
        for modifier in &method.modifiers {
            self.modifier(modifier);
        }
        if let Some(return_type) = &method.return_type {
            self.expression(return_type);
        }
        self.identifier(&method.name);
        self.out.push_str(&method.parameters.before.print());
        self.out.push('(');
        self.separated(&method.parameters.elements, Self::statement);
        self.out.push(')');
        if let Some(throws) = &method.throws {
            self.out.push_str(&throws.before.print());
            self.out.push_str("throws");
            self.separated(&throws.elements, Self::expression);
        }
        if let Some(body) = &method.body {
            self.block(body);
        }
    }

    fn variable_decls(&mut self, decls: &VariableDecls) {
        self.out.push_str(&decls.prefix.print());
        for annotation in &decls.leading_annotations {
            self.annotation(annotation);
        }
        for modifier in &decls.modifiers {
            self.modifier(modifier);
        }
        if let Some(type_expr) = &decls.type_expr {
            self.expression(type_expr);
        }
        if let Some(varargs) = &decls.varargs {
            self.out.push_str(&varargs.print());
            self.out.push_str("...");
        }
        self.separated(&decls.vars, Self::named_variable);
    }

    fn named_variable(&mut self, var: &NamedVariable) {
        self.out.push_str(&var.prefix.print());
        self.identifier(&var.name);
        if let Some(initializer) = &var.initializer {
            self.out.push_str(&initializer.before.print());
            self.out.push('=');
            self.expression(&initializer.element);
        }
    }

    fn block(&mut self, block: &Block) {
        self.out.push_str(&block.prefix.print());
        self.out.push('{');
        for statement in &block.statements {
            self.terminated(statement);
        }
        self.out.push_str(&block.end.print());
        self.out.push('}');
    }

    /// Prints a statement together with its padding and terminator.
    fn terminated(&mut self, padded: &RightPadded<Statement>) {
        self.statement(&padded.element);
        self.out.push_str(&padded.after.print());
        if padded.element.needs_terminator() {
            self.out.push(';');
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Block(block) => self.block(block),
            Statement::ClassDecl(class) => self.class_decl(class),
            Statement::Empty(empty) => self.out.push_str(&empty.prefix.print()),
            Statement::Expression(expression) => self.expression(expression),
            Statement::If(node) => {
                self.out.push_str(&node.prefix.print());
                self.out.push_str("if");
                self.control_parens(&node.condition);
                self.terminated(&node.then_part);
                if let Some(else_part) = &node.else_part {
                    self.out.push_str(&else_part.prefix.print());
                    self.out.push_str("else");
                    self.terminated(&else_part.body);
                }
            }
            Statement::MethodDecl(method) => self.method_decl(method),
            Statement::Return(node) => {
                self.out.push_str(&node.prefix.print());
                self.out.push_str("return");
                if let Some(expression) = &node.expression {
                    self.expression(expression);
                }
            }
            Statement::Throw(node) => {
                self.out.push_str(&node.prefix.print());
                self.out.push_str("throw");
                self.expression(&node.exception);
            }
            Statement::VariableDecls(decls) => self.variable_decls(decls),
            Statement::While(node) => {
                self.out.push_str(&node.prefix.print());
                self.out.push_str("while");
                self.control_parens(&node.condition);
                self.terminated(&node.body);
            }
        }
    }

    fn control_parens(&mut self, parens: &ControlParens) {
        self.out.push_str(&parens.prefix.print());
        self.out.push('(');
        self.expression(&parens.tree.element);
        self.out.push_str(&parens.tree.after.print());
        self.out.push(')');
    }

    fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Identifier(node) => self.identifier(node),
            Expression::Literal(node) => {
                self.out.push_str(&node.prefix.print());
                self.out.push_str(&node.value_source);
            }
            Expression::FieldAccess(node) => {
                self.out.push_str(&node.prefix.print());
                self.expression(&node.target);
                self.out.push_str(&node.name.before.print());
                self.out.push('.');
                self.identifier(&node.name.element);
            }
            Expression::MethodInvocation(node) => {
                self.out.push_str(&node.prefix.print());
                if let Some(select) = &node.select {
                    self.expression(&select.element);
                    self.out.push_str(&select.after.print());
                    self.out.push('.');
                }
                self.identifier(&node.name);
                self.parenthesized(&node.arguments);
            }
            Expression::Binary(node) => {
                self.out.push_str(&node.prefix.print());
                self.expression(&node.left);
                self.out.push_str(&node.operator.before.print());
                self.out.push_str(node.operator.element.token());
                self.expression(&node.right);
            }
            Expression::Unary(node) => {
                self.out.push_str(&node.prefix.print());
                self.out.push_str(node.operator.token());
                self.expression(&node.expression);
            }
            Expression::Assignment(node) => {
                self.out.push_str(&node.prefix.print());
                self.expression(&node.variable);
                self.out.push_str(&node.assignment.before.print());
                self.out.push('=');
                self.expression(&node.assignment.element);
            }
            Expression::Parentheses(node) => {
                self.out.push_str(&node.prefix.print());
                self.out.push('(');
                self.expression(&node.tree.element);
                self.out.push_str(&node.tree.after.print());
                self.out.push(')');
            }
            Expression::NewClass(node) => {
                self.out.push_str(&node.prefix.print());
                self.out.push_str("new");
                self.expression(&node.clazz);
                self.parenthesized(&node.arguments);
            }
            Expression::ParameterizedType(node) => {
                self.out.push_str(&node.prefix.print());
                self.expression(&node.clazz);
                self.out.push_str(&node.type_parameters.before.print());
                self.out.push('<');
                self.separated(&node.type_parameters.elements, Self::expression);
                self.out.push('>');
            }
            Expression::Empty(node) => self.out.push_str(&node.prefix.print()),
        }
    }

    fn identifier(&mut self, identifier: &Identifier) {
        self.out.push_str(&identifier.prefix.print());
        self.out.push_str(&identifier.simple_name);
    }

    /// Prints a container's elements with its captured parenthesis space.
    fn parenthesized(&mut self, container: &Container<Expression>) {
        self.out.push_str(&container.before.print());
        self.out.push('(');
        self.separated(&container.elements, Self::expression);
        self.out.push(')');
    }

    /// Prints comma-separated right-padded elements. Each element's
    /// `after` is the space before its separator (or closing delimiter).
    fn separated<T>(&mut self, elements: &[RightPadded<T>], mut each: impl FnMut(&mut Self, &T)) {
        let last = elements.len().saturating_sub(1);
        for (i, element) in elements.iter().enumerate() {
            each(self, &element.element);
            self.out.push_str(&element.after.print());
            if i != last {
                self.out.push(',');
            }
        }
    }
}
