//! The visitor and traversal framework.
//!
//! A visitor overrides `visit_*` for the node kinds it cares about; every
//! other kind falls through to the `walk_*` default, which recurses into
//! children depth-first in source order and rebuilds only what changed.
//! Unchanged children keep their allocation, so untouched subtrees keep
//! pointer identity across a pass.
//!
//! The traversal context owns the cursor (the live ancestor path) and the
//! deferred-visitor queue; both are scoped to a single traversal and never
//! shared across threads.

pub mod cursor;
pub mod pass;
pub mod type_visitor;

use std::sync::Arc;

pub use cursor::{Cursor, CursorValue, ImportRecord, NodeKind, UnitInfo};
pub use pass::{run, run_recipe_visitors, PassError, SourceFile};

use crate::semantic::TypeArena;
use crate::tree::{
    Annotation, Assignment, Binary, Block, ClassDecl, CompilationUnit, Container, ControlParens,
    Else, Empty, Expression, FieldAccess, Identifier, If, Import, Literal, MethodDecl,
    MethodInvocation, Modifier, NamedVariable, NewClass, Package, ParameterizedType, Parentheses,
    Return, Statement, Throw, Unary, VariableDecls, While,
};

/// The result of a visit: the (possibly rebuilt) node, or a hard failure
/// that aborts the whole pass.
pub type VisitResult<T> = Result<T, PassError>;

/// Traversal-scoped state passed to every visit: the cursor, the shared
/// read-only type arena, and the deferred-visitor queue.
pub struct TraversalContext {
    /// The live ancestor path and message channel.
    pub cursor: Cursor,
    arena: Arc<TypeArena>,
    deferred: Vec<Box<dyn TreeVisitor + Send>>,
}

impl TraversalContext {
    /// Creates a fresh context for one traversal.
    #[must_use]
    pub fn new(arena: Arc<TypeArena>) -> Self {
        Self {
            cursor: Cursor::new(),
            arena,
            deferred: Vec::new(),
        }
    }

    /// The attributed type graph, shared read-only.
    #[must_use]
    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    /// A clone of the arena handle, for visitors that need to keep one.
    #[must_use]
    pub fn arena_handle(&self) -> Arc<TypeArena> {
        Arc::clone(&self.arena)
    }

    /// Schedules a visitor to run after the current pass completes on the
    /// whole tree. Deferred visitors run in scheduling order, each seeing
    /// the output of the previous one.
    pub fn schedule_after(&mut self, visitor: Box<dyn TreeVisitor + Send>) {
        self.deferred.push(visitor);
    }

    /// Drains the deferred queue. Used by the pass driver.
    #[must_use]
    pub fn take_deferred(&mut self) -> Vec<Box<dyn TreeVisitor + Send>> {
        std::mem::take(&mut self.deferred)
    }
}

/// A tree visitor. Every method defaults to recursing into children and
/// rebuilding; override the kinds you care about. Overrides that still
/// need the children visited call the matching `walk_*` themselves.
#[allow(missing_docs)]
pub trait TreeVisitor {
    fn visit_compilation_unit(
        &mut self,
        cu: CompilationUnit,
        ctx: &mut TraversalContext,
    ) -> VisitResult<CompilationUnit> {
        walk_compilation_unit(self, cu, ctx)
    }

    fn visit_package(&mut self, pkg: Package, _ctx: &mut TraversalContext) -> VisitResult<Package> {
        Ok(pkg)
    }

    fn visit_import(&mut self, import: Import, ctx: &mut TraversalContext) -> VisitResult<Import> {
        walk_import(self, import, ctx)
    }

    fn visit_class_decl(
        &mut self,
        class: Arc<ClassDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<ClassDecl>> {
        walk_class_decl(self, class, ctx)
    }

    fn visit_method_decl(
        &mut self,
        method: Arc<MethodDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodDecl>> {
        walk_method_decl(self, method, ctx)
    }

    fn visit_variable_decls(
        &mut self,
        decls: Arc<VariableDecls>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<VariableDecls>> {
        walk_variable_decls(self, decls, ctx)
    }

    fn visit_named_variable(
        &mut self,
        var: NamedVariable,
        ctx: &mut TraversalContext,
    ) -> VisitResult<NamedVariable> {
        walk_named_variable(self, var, ctx)
    }

    fn visit_annotation(
        &mut self,
        annotation: Annotation,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Annotation> {
        walk_annotation(self, annotation, ctx)
    }

    fn visit_modifier(
        &mut self,
        modifier: Modifier,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<Modifier> {
        Ok(modifier)
    }

    fn visit_block(&mut self, block: Block, ctx: &mut TraversalContext) -> VisitResult<Block> {
        walk_block(self, block, ctx)
    }

    fn visit_statement(
        &mut self,
        statement: Statement,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Statement> {
        walk_statement(self, statement, ctx)
    }

    fn visit_if(&mut self, node: Arc<If>, ctx: &mut TraversalContext) -> VisitResult<Arc<If>> {
        walk_if(self, node, ctx)
    }

    fn visit_while(
        &mut self,
        node: Arc<While>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<While>> {
        walk_while(self, node, ctx)
    }

    fn visit_return(
        &mut self,
        node: Arc<Return>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Return>> {
        walk_return(self, node, ctx)
    }

    fn visit_throw(
        &mut self,
        node: Arc<Throw>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Throw>> {
        walk_throw(self, node, ctx)
    }

    fn visit_empty(
        &mut self,
        node: Arc<Empty>,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Empty>> {
        Ok(node)
    }

    fn visit_control_parens(
        &mut self,
        parens: ControlParens,
        ctx: &mut TraversalContext,
    ) -> VisitResult<ControlParens> {
        walk_control_parens(self, parens, ctx)
    }

    fn visit_expression(
        &mut self,
        expression: Expression,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Expression> {
        walk_expression(self, expression, ctx)
    }

    fn visit_identifier(
        &mut self,
        node: Arc<Identifier>,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Identifier>> {
        Ok(node)
    }

    fn visit_literal(
        &mut self,
        node: Arc<Literal>,
        _ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Literal>> {
        Ok(node)
    }

    fn visit_field_access(
        &mut self,
        node: Arc<FieldAccess>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<FieldAccess>> {
        walk_field_access(self, node, ctx)
    }

    fn visit_method_invocation(
        &mut self,
        node: Arc<MethodInvocation>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodInvocation>> {
        walk_method_invocation(self, node, ctx)
    }

    fn visit_binary(
        &mut self,
        node: Arc<Binary>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Binary>> {
        walk_binary(self, node, ctx)
    }

    fn visit_unary(
        &mut self,
        node: Arc<Unary>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Unary>> {
        walk_unary(self, node, ctx)
    }

    fn visit_assignment(
        &mut self,
        node: Arc<Assignment>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Assignment>> {
        walk_assignment(self, node, ctx)
    }

    fn visit_parentheses(
        &mut self,
        node: Arc<Parentheses>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<Parentheses>> {
        walk_parentheses(self, node, ctx)
    }

    fn visit_new_class(
        &mut self,
        node: Arc<NewClass>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<NewClass>> {
        walk_new_class(self, node, ctx)
    }

    fn visit_parameterized_type(
        &mut self,
        node: Arc<ParameterizedType>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<ParameterizedType>> {
        walk_parameterized_type(self, node, ctx)
    }
}

/// Shallow block comparison: same identity, same trivia, and every
/// statement sharing its allocation with the counterpart. Used by parents
/// to decide whether a visited body actually changed.
#[must_use]
pub fn same_block(a: &Block, b: &Block) -> bool {
    a.id == b.id
        && a.prefix == b.prefix
        && a.end == b.end
        && a.statements.len() == b.statements.len()
        && a.statements.iter().zip(&b.statements).all(|(x, y)| {
            x.after == y.after && x.markers == y.markers && x.element.ptr_eq(&y.element)
        })
}

fn map_expr_container<V: TreeVisitor + ?Sized>(
    v: &mut V,
    container: Container<Expression>,
    ctx: &mut TraversalContext,
    changed: &mut bool,
) -> VisitResult<Container<Expression>> {
    let mut elements = Vec::with_capacity(container.elements.len());
    for padded in container.elements {
        let original = padded.element.clone();
        let visited = padded.map(|e| v.visit_expression(e, ctx))?;
        *changed |= !visited.element.ptr_eq(&original);
        elements.push(visited);
    }
    Ok(Container {
        before: container.before,
        elements,
        markers: container.markers,
    })
}

fn map_annotations<V: TreeVisitor + ?Sized>(
    v: &mut V,
    annotations: Vec<Annotation>,
    ctx: &mut TraversalContext,
    changed: &mut bool,
) -> VisitResult<Vec<Annotation>> {
    let mut out = Vec::with_capacity(annotations.len());
    for annotation in annotations {
        let original = annotation.clone();
        let visited = v.visit_annotation(annotation, ctx)?;
        *changed |= visited != original;
        out.push(visited);
    }
    Ok(out)
}

/// Default traversal of a compilation unit.
pub fn walk_compilation_unit<V: TreeVisitor + ?Sized>(
    v: &mut V,
    cu: CompilationUnit,
    ctx: &mut TraversalContext,
) -> VisitResult<CompilationUnit> {
    ctx.cursor.push(CursorValue::Unit(UnitInfo::of(&cu)));
    let mut changed = false;

    let package = match cu.package.clone() {
        Some(padded) => {
            let original = padded.element.clone();
            let visited = padded.map(|p| v.visit_package(p, ctx))?;
            changed |= visited.element != original;
            Some(visited)
        }
        None => None,
    };

    let mut imports = Vec::with_capacity(cu.imports.len());
    for padded in cu.imports.clone() {
        let original = padded.element.clone();
        let visited = padded.map(|i| v.visit_import(i, ctx))?;
        changed |= visited.element != original;
        imports.push(visited);
    }

    let mut classes = Vec::with_capacity(cu.classes.len());
    for class in cu.classes.clone() {
        let original = Arc::clone(&class);
        ctx.cursor.push(CursorValue::Class(Arc::clone(&class)));
        let visited = v.visit_class_decl(class, ctx)?;
        ctx.cursor.pop();
        changed |= !Arc::ptr_eq(&original, &visited);
        classes.push(visited);
    }

    ctx.cursor.pop();
    if changed {
        Ok(CompilationUnit {
            package,
            imports,
            classes,
            ..cu
        })
    } else {
        Ok(cu)
    }
}

/// Default traversal of an import: visits the qualified name expression.
pub fn walk_import<V: TreeVisitor + ?Sized>(
    v: &mut V,
    import: Import,
    ctx: &mut TraversalContext,
) -> VisitResult<Import> {
    let original = import.qualid.clone();
    let qualid = v.visit_expression(original.clone(), ctx)?;
    if qualid.ptr_eq(&original) {
        Ok(import)
    } else {
        Ok(Import { qualid, ..import })
    }
}

/// Default traversal of a class declaration.
pub fn walk_class_decl<V: TreeVisitor + ?Sized>(
    v: &mut V,
    class: Arc<ClassDecl>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<ClassDecl>> {
    let mut changed = false;

    let leading_annotations =
        map_annotations(v, class.leading_annotations.clone(), ctx, &mut changed)?;

    let extends = match class.extends.clone() {
        Some(padded) => {
            let original = padded.element.clone();
            let visited = padded.map(|e| v.visit_expression(e, ctx))?;
            changed |= !visited.element.ptr_eq(&original);
            Some(visited)
        }
        None => None,
    };

    let implements = match class.implements.clone() {
        Some(container) => Some(map_expr_container(v, container, ctx, &mut changed)?),
        None => None,
    };

    let body = v.visit_block(class.body.clone(), ctx)?;
    changed |= !same_block(&class.body, &body);

    if changed {
        Ok(Arc::new(ClassDecl {
            leading_annotations,
            extends,
            implements,
            body,
            ..(*class).clone()
        }))
    } else {
        Ok(class)
    }
}

/// Default traversal of a method declaration.
pub fn walk_method_decl<V: TreeVisitor + ?Sized>(
    v: &mut V,
    method: Arc<MethodDecl>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<MethodDecl>> {
    let mut changed = false;

    let leading_annotations =
        map_annotations(v, method.leading_annotations.clone(), ctx, &mut changed)?;

    let return_type = match method.return_type.clone() {
        Some(expression) => {
            let visited = v.visit_expression(expression.clone(), ctx)?;
            changed |= !visited.ptr_eq(&expression);
            Some(visited)
        }
        None => None,
    };

    let mut parameters = method.parameters.clone();
    let mut elements = Vec::with_capacity(parameters.elements.len());
    for padded in parameters.elements {
        let original = padded.element.clone();
        let visited = padded.map(|s| v.visit_statement(s, ctx))?;
        changed |= !visited.element.ptr_eq(&original);
        elements.push(visited);
    }
    parameters.elements = elements;

    let throws = match method.throws.clone() {
        Some(container) => Some(map_expr_container(v, container, ctx, &mut changed)?),
        None => None,
    };

    let body = match method.body.clone() {
        Some(block) => {
            let visited = v.visit_block(block, ctx)?;
            if let Some(original) = method.body.as_ref() {
                changed |= !same_block(original, &visited);
            }
            Some(visited)
        }
        None => None,
    };

    if changed {
        Ok(Arc::new(MethodDecl {
            leading_annotations,
            return_type,
            parameters,
            throws,
            body,
            ..(*method).clone()
        }))
    } else {
        Ok(method)
    }
}

/// Default traversal of a variable declaration statement.
pub fn walk_variable_decls<V: TreeVisitor + ?Sized>(
    v: &mut V,
    decls: Arc<VariableDecls>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<VariableDecls>> {
    let mut changed = false;

    let leading_annotations =
        map_annotations(v, decls.leading_annotations.clone(), ctx, &mut changed)?;

    let type_expr = match decls.type_expr.clone() {
        Some(expression) => {
            let visited = v.visit_expression(expression.clone(), ctx)?;
            changed |= !visited.ptr_eq(&expression);
            Some(visited)
        }
        None => None,
    };

    let mut vars = Vec::with_capacity(decls.vars.len());
    for padded in decls.vars.clone() {
        let original = padded.element.clone();
        let visited = padded.map(|nv| v.visit_named_variable(nv, ctx))?;
        changed |= visited.element != original;
        vars.push(visited);
    }

    if changed {
        Ok(Arc::new(VariableDecls {
            leading_annotations,
            type_expr,
            vars,
            ..(*decls).clone()
        }))
    } else {
        Ok(decls)
    }
}

/// Default traversal of one declared variable: visits its initializer.
pub fn walk_named_variable<V: TreeVisitor + ?Sized>(
    v: &mut V,
    var: NamedVariable,
    ctx: &mut TraversalContext,
) -> VisitResult<NamedVariable> {
    match var.initializer.clone() {
        Some(padded) => {
            let original = padded.element.clone();
            let visited = padded.map(|e| v.visit_expression(e, ctx))?;
            if visited.element.ptr_eq(&original) {
                Ok(var)
            } else {
                Ok(NamedVariable {
                    initializer: Some(visited),
                    ..var
                })
            }
        }
        None => Ok(var),
    }
}

/// Default traversal of an annotation: visits its type and arguments.
pub fn walk_annotation<V: TreeVisitor + ?Sized>(
    v: &mut V,
    annotation: Annotation,
    ctx: &mut TraversalContext,
) -> VisitResult<Annotation> {
    let mut changed = false;
    let original_type = annotation.annotation_type.clone();
    let annotation_type = v.visit_expression(original_type.clone(), ctx)?;
    changed |= !annotation_type.ptr_eq(&original_type);

    let arguments = match annotation.arguments.clone() {
        Some(container) => Some(map_expr_container(v, container, ctx, &mut changed)?),
        None => None,
    };

    if changed {
        Ok(Annotation {
            annotation_type,
            arguments,
            ..annotation
        })
    } else {
        Ok(annotation)
    }
}

/// Default traversal of a block, pushing one indentation scope.
pub fn walk_block<V: TreeVisitor + ?Sized>(
    v: &mut V,
    block: Block,
    ctx: &mut TraversalContext,
) -> VisitResult<Block> {
    ctx.cursor.push(CursorValue::Node {
        id: block.id,
        kind: NodeKind::Block,
    });
    let mut statements = Vec::with_capacity(block.statements.len());
    for padded in block.statements {
        let visited = padded.map(|s| v.visit_statement(s, ctx))?;
        statements.push(visited);
    }
    ctx.cursor.pop();
    Ok(Block { statements, ..block })
}

/// Default dispatch over statement kinds, in source order. Scope-bearing
/// statements (classes, methods) put their node on the cursor for the
/// duration of their visit, including any override's own code.
pub fn walk_statement<V: TreeVisitor + ?Sized>(
    v: &mut V,
    statement: Statement,
    ctx: &mut TraversalContext,
) -> VisitResult<Statement> {
    let entry = match &statement {
        Statement::ClassDecl(class) => CursorValue::Class(Arc::clone(class)),
        Statement::MethodDecl(method) => CursorValue::Method(Arc::clone(method)),
        other => CursorValue::Node {
            id: other.id(),
            kind: NodeKind::Statement,
        },
    };
    ctx.cursor.push(entry);
    let out = match statement {
        Statement::Block(block) => {
            let visited = v.visit_block((*block).clone(), ctx)?;
            if same_block(&block, &visited) {
                Statement::Block(block)
            } else {
                Statement::Block(Arc::new(visited))
            }
        }
        Statement::ClassDecl(class) => Statement::ClassDecl(v.visit_class_decl(class, ctx)?),
        Statement::Empty(empty) => Statement::Empty(v.visit_empty(empty, ctx)?),
        Statement::Expression(expression) => {
            Statement::Expression(v.visit_expression(expression, ctx)?)
        }
        Statement::If(node) => Statement::If(v.visit_if(node, ctx)?),
        Statement::MethodDecl(method) => Statement::MethodDecl(v.visit_method_decl(method, ctx)?),
        Statement::Return(node) => Statement::Return(v.visit_return(node, ctx)?),
        Statement::Throw(node) => Statement::Throw(v.visit_throw(node, ctx)?),
        Statement::VariableDecls(decls) => {
            Statement::VariableDecls(v.visit_variable_decls(decls, ctx)?)
        }
        Statement::While(node) => Statement::While(v.visit_while(node, ctx)?),
    };
    ctx.cursor.pop();
    Ok(out)
}

/// Default traversal of an `if` statement.
pub fn walk_if<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<If>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<If>> {
    let mut changed = false;

    let original_cond = node.condition.clone();
    let condition = v.visit_control_parens(original_cond.clone(), ctx)?;
    changed |= condition != original_cond;

    let original_then = node.then_part.element.clone();
    let then_part = node
        .then_part
        .clone()
        .map(|s| v.visit_statement(s, ctx))?;
    changed |= !then_part.element.ptr_eq(&original_then);

    let else_part = match node.else_part.clone() {
        Some(else_part) => {
            let original = else_part.body.element.clone();
            let body = else_part.body.map(|s| v.visit_statement(s, ctx))?;
            changed |= !body.element.ptr_eq(&original);
            Some(Else { body, ..else_part })
        }
        None => None,
    };

    if changed {
        Ok(Arc::new(If {
            condition,
            then_part,
            else_part,
            ..(*node).clone()
        }))
    } else {
        Ok(node)
    }
}

/// Default traversal of a `while` statement.
pub fn walk_while<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<While>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<While>> {
    let mut changed = false;

    let original_cond = node.condition.clone();
    let condition = v.visit_control_parens(original_cond.clone(), ctx)?;
    changed |= condition != original_cond;

    let original_body = node.body.element.clone();
    let body = node.body.clone().map(|s| v.visit_statement(s, ctx))?;
    changed |= !body.element.ptr_eq(&original_body);

    if changed {
        Ok(Arc::new(While {
            condition,
            body,
            ..(*node).clone()
        }))
    } else {
        Ok(node)
    }
}

/// Default traversal of a `return` statement.
pub fn walk_return<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<Return>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<Return>> {
    match node.expression.clone() {
        Some(expression) => {
            let visited = v.visit_expression(expression.clone(), ctx)?;
            if visited.ptr_eq(&expression) {
                Ok(node)
            } else {
                Ok(Arc::new(Return {
                    expression: Some(visited),
                    ..(*node).clone()
                }))
            }
        }
        None => Ok(node),
    }
}

/// Default traversal of a `throw` statement.
pub fn walk_throw<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<Throw>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<Throw>> {
    let original = node.exception.clone();
    let exception = v.visit_expression(original.clone(), ctx)?;
    if exception.ptr_eq(&original) {
        Ok(node)
    } else {
        Ok(Arc::new(Throw {
            exception,
            ..(*node).clone()
        }))
    }
}

/// Default traversal of a parenthesized control expression.
pub fn walk_control_parens<V: TreeVisitor + ?Sized>(
    v: &mut V,
    parens: ControlParens,
    ctx: &mut TraversalContext,
) -> VisitResult<ControlParens> {
    let tree = parens.tree.map(|e| v.visit_expression(e, ctx))?;
    Ok(ControlParens { tree, ..parens })
}

/// Default dispatch over expression kinds, in source order.
pub fn walk_expression<V: TreeVisitor + ?Sized>(
    v: &mut V,
    expression: Expression,
    ctx: &mut TraversalContext,
) -> VisitResult<Expression> {
    ctx.cursor.push(CursorValue::Node {
        id: expression.id(),
        kind: NodeKind::Expression,
    });
    let out = match expression {
        Expression::Identifier(node) => Expression::Identifier(v.visit_identifier(node, ctx)?),
        Expression::Literal(node) => Expression::Literal(v.visit_literal(node, ctx)?),
        Expression::FieldAccess(node) => Expression::FieldAccess(v.visit_field_access(node, ctx)?),
        Expression::MethodInvocation(node) => {
            Expression::MethodInvocation(v.visit_method_invocation(node, ctx)?)
        }
        Expression::Binary(node) => Expression::Binary(v.visit_binary(node, ctx)?),
        Expression::Unary(node) => Expression::Unary(v.visit_unary(node, ctx)?),
        Expression::Assignment(node) => Expression::Assignment(v.visit_assignment(node, ctx)?),
        Expression::Parentheses(node) => Expression::Parentheses(v.visit_parentheses(node, ctx)?),
        Expression::NewClass(node) => Expression::NewClass(v.visit_new_class(node, ctx)?),
        Expression::ParameterizedType(node) => {
            Expression::ParameterizedType(v.visit_parameterized_type(node, ctx)?)
        }
        Expression::Empty(node) => Expression::Empty(v.visit_empty(node, ctx)?),
    };
    ctx.cursor.pop();
    Ok(out)
}

/// Default traversal of a field access.
pub fn walk_field_access<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<FieldAccess>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<FieldAccess>> {
    let original = node.target.clone();
    let target = v.visit_expression(original.clone(), ctx)?;
    let original_name = Arc::new(node.name.element.clone());
    let name_elem = v.visit_identifier(Arc::clone(&original_name), ctx)?;
    if target.ptr_eq(&original) && Arc::ptr_eq(&original_name, &name_elem) {
        Ok(node)
    } else {
        let name = node.name.clone().with_element((*name_elem).clone());
        Ok(Arc::new(FieldAccess {
            target,
            name,
            ..(*node).clone()
        }))
    }
}

/// Default traversal of a method invocation.
pub fn walk_method_invocation<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<MethodInvocation>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<MethodInvocation>> {
    let mut changed = false;

    let select = match node.select.clone() {
        Some(padded) => {
            let original = padded.element.clone();
            let visited = padded.map(|e| v.visit_expression(e, ctx))?;
            changed |= !visited.element.ptr_eq(&original);
            Some(visited)
        }
        None => None,
    };

    let arguments = map_expr_container(v, node.arguments.clone(), ctx, &mut changed)?;

    if changed {
        Ok(Arc::new(MethodInvocation {
            select,
            arguments,
            ..(*node).clone()
        }))
    } else {
        Ok(node)
    }
}

/// Default traversal of a binary expression.
pub fn walk_binary<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<Binary>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<Binary>> {
    let left = v.visit_expression(node.left.clone(), ctx)?;
    let right = v.visit_expression(node.right.clone(), ctx)?;
    if left.ptr_eq(&node.left) && right.ptr_eq(&node.right) {
        Ok(node)
    } else {
        Ok(Arc::new(Binary {
            left,
            right,
            ..(*node).clone()
        }))
    }
}

/// Default traversal of a unary expression.
pub fn walk_unary<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<Unary>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<Unary>> {
    let expression = v.visit_expression(node.expression.clone(), ctx)?;
    if expression.ptr_eq(&node.expression) {
        Ok(node)
    } else {
        Ok(Arc::new(Unary {
            expression,
            ..(*node).clone()
        }))
    }
}

/// Default traversal of an assignment.
pub fn walk_assignment<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<Assignment>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<Assignment>> {
    let variable = v.visit_expression(node.variable.clone(), ctx)?;
    let original = node.assignment.element.clone();
    let assignment = node.assignment.clone().map(|e| v.visit_expression(e, ctx))?;
    if variable.ptr_eq(&node.variable) && assignment.element.ptr_eq(&original) {
        Ok(node)
    } else {
        Ok(Arc::new(Assignment {
            variable,
            assignment,
            ..(*node).clone()
        }))
    }
}

/// Default traversal of a parenthesized expression.
pub fn walk_parentheses<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<Parentheses>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<Parentheses>> {
    let original = node.tree.element.clone();
    let tree = node.tree.clone().map(|e| v.visit_expression(e, ctx))?;
    if tree.element.ptr_eq(&original) {
        Ok(node)
    } else {
        Ok(Arc::new(Parentheses {
            tree,
            ..(*node).clone()
        }))
    }
}

/// Default traversal of an object construction.
pub fn walk_new_class<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<NewClass>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<NewClass>> {
    let mut changed = false;
    let original = node.clazz.clone();
    let clazz = v.visit_expression(original.clone(), ctx)?;
    changed |= !clazz.ptr_eq(&original);

    let arguments = map_expr_container(v, node.arguments.clone(), ctx, &mut changed)?;

    if changed {
        Ok(Arc::new(NewClass {
            clazz,
            arguments,
            ..(*node).clone()
        }))
    } else {
        Ok(node)
    }
}

/// Default traversal of a parameterized type tree.
pub fn walk_parameterized_type<V: TreeVisitor + ?Sized>(
    v: &mut V,
    node: Arc<ParameterizedType>,
    ctx: &mut TraversalContext,
) -> VisitResult<Arc<ParameterizedType>> {
    let mut changed = false;
    let original = node.clazz.clone();
    let clazz = v.visit_expression(original.clone(), ctx)?;
    changed |= !clazz.ptr_eq(&original);

    let type_parameters = map_expr_container(v, node.type_parameters.clone(), ctx, &mut changed)?;

    if changed {
        Ok(Arc::new(ParameterizedType {
            clazz,
            type_parameters,
            ..(*node).clone()
        }))
    } else {
        Ok(node)
    }
}
