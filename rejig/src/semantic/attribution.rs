//! Type attribution: the oracle that fills syntax nodes with references
//! into the type graph.
//!
//! Attribution is best-effort. Names it cannot resolve are left without a
//! type reference; visitors that need types may choose to skip such nodes.
//! The pass rebuilds the tree once, right after parsing, and produces the
//! arena that is then shared read-only.

use std::sync::Arc;

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{ClassKind, MethodId, MethodSig, PrimitiveKind, TyId, TypeArena, VarId, VariableSig};
use crate::tree::{
    Annotation, Assignment, Binary, BinaryOp, Block, ClassDecl, ClassKeyword, CompilationUnit,
    Container, ControlParens, Else, Expression, FieldAccess, Identifier, If, LiteralValue,
    MethodDecl, MethodInvocation, ModifierKind, NamedVariable, NewClass, NodeId,
    ParameterizedType, Return, RightPadded, Statement, Throw, VariableDecls, While,
};

/// One lexical scope of variables (class fields, parameters, or locals).
#[derive(Debug, Default)]
struct Scope {
    vars: FxHashMap<CompactString, (VarId, TyId)>,
}

/// Attributes a freshly parsed compilation unit, returning the rebuilt
/// tree and the arena its nodes reference.
#[must_use]
pub fn attribute(cu: CompilationUnit) -> (CompilationUnit, TypeArena) {
    let mut attributor = Attributor::new(&cu);
    attributor.prescan(&cu);
    let mut cu = attributor.unit(cu);
    cu.diagnostics.extend(attributor.diagnostics);
    (cu, attributor.arena)
}

struct Attributor {
    arena: TypeArena,
    package: Option<String>,
    /// Explicitly imported simple name -> fully qualified name.
    import_map: FxHashMap<CompactString, String>,
    /// Packages covered by star imports.
    star_packages: Vec<String>,
    /// Simple names of classes declared in this file -> fully qualified.
    file_classes: FxHashMap<CompactString, String>,
    /// Class declaration node -> its interned type.
    class_ids: FxHashMap<NodeId, TyId>,
    /// Method declaration node -> its registered signature.
    method_ids: FxHashMap<NodeId, MethodId>,
    /// Declared methods per class, for invocation resolution.
    methods_by_class: FxHashMap<TyId, Vec<MethodId>>,
    /// Declared fields: (class, name) -> variable.
    fields: FxHashMap<(TyId, CompactString), (VarId, TyId)>,
    scopes: SmallVec<[Scope; 8]>,
    class_stack: Vec<TyId>,
    diagnostics: Vec<crate::tree::Diagnostic>,
}

impl Attributor {
    fn new(cu: &CompilationUnit) -> Self {
        let package = cu.package.as_ref().map(|p| p.element.name());
        let mut import_map = FxHashMap::default();
        let mut star_packages = Vec::new();
        for import in &cu.imports {
            let import = &import.element;
            if import.statik.is_some() {
                continue;
            }
            if import.is_star() {
                star_packages.push(import.package_name());
            } else {
                import_map.insert(import.simple_name(), import.qualified_name());
            }
        }
        Self {
            arena: TypeArena::new(),
            package,
            import_map,
            star_packages,
            file_classes: FxHashMap::default(),
            class_ids: FxHashMap::default(),
            method_ids: FxHashMap::default(),
            methods_by_class: FxHashMap::default(),
            fields: FxHashMap::default(),
            scopes: SmallVec::new(),
            class_stack: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Pre-scan: intern declared classes, then their members.
    // ------------------------------------------------------------------

    fn prescan(&mut self, cu: &CompilationUnit) {
        for class in &cu.classes {
            self.intern_declared_class(class, None);
        }
        // Hierarchy links second: extends/implements may reference classes
        // declared later in the file.
        for class in &cu.classes {
            self.link_declared_class(class);
        }
        for class in &cu.classes {
            self.prescan_members(class);
        }
    }

    fn declared_fqn(&self, class: &ClassDecl, outer: Option<&str>) -> String {
        match outer {
            Some(outer) => format!("{outer}.{}", class.simple_name()),
            None => match &self.package {
                Some(package) => format!("{package}.{}", class.simple_name()),
                None => class.simple_name().to_string(),
            },
        }
    }

    fn intern_declared_class(&mut self, class: &Arc<ClassDecl>, outer: Option<&str>) {
        let fqn = self.declared_fqn(class, outer);
        let kind = match class.kind.element {
            ClassKeyword::Class | ClassKeyword::Enum => ClassKind::Class,
            ClassKeyword::Interface => ClassKind::Interface,
            ClassKeyword::AnnotationType => ClassKind::Annotation,
        };
        let id = self.arena.intern_class(&fqn, kind, None, vec![]);
        self.class_ids.insert(class.id, id);
        self.file_classes.insert(class.simple_name(), fqn.clone());
        for statement in &class.body.statements {
            if let Statement::ClassDecl(nested) = &statement.element {
                self.intern_declared_class(nested, Some(&fqn));
            }
        }
    }

    fn link_declared_class(&mut self, class: &Arc<ClassDecl>) {
        if let Some(&id) = self.class_ids.get(&class.id) {
            let supertype = class
                .extends
                .as_ref()
                .and_then(|e| self.resolve_type_tree_readonly(&e.element))
                .or_else(|| self.arena.find_class("java.lang.Object"));
            let interfaces = class
                .implements
                .as_ref()
                .map(|c| {
                    c.iter()
                        .filter_map(|e| self.resolve_type_tree_readonly(e))
                        .collect()
                })
                .unwrap_or_default();
            self.arena.set_class_hierarchy(id, supertype, interfaces);
        }
        for statement in &class.body.statements {
            if let Statement::ClassDecl(nested) = &statement.element {
                self.link_declared_class(nested);
            }
        }
    }

    fn prescan_members(&mut self, class: &Arc<ClassDecl>) {
        let Some(&class_ty) = self.class_ids.get(&class.id) else {
            return;
        };
        for statement in &class.body.statements {
            match &statement.element {
                Statement::VariableDecls(decls) => {
                    let ty = decls
                        .type_expr
                        .as_ref()
                        .and_then(|t| self.resolve_type_tree(t))
                        .unwrap_or(self.arena.unknown());
                    for var in &decls.vars {
                        let name = var.element.name.simple_name.clone();
                        let var_id = self.arena.variable(VariableSig {
                            owner: Some(class_ty),
                            name: name.clone(),
                            ty,
                        });
                        self.fields.insert((class_ty, name), (var_id, ty));
                    }
                }
                Statement::MethodDecl(method) => {
                    let sig = self.declared_method_sig(class_ty, method);
                    let id = self.arena.method(sig);
                    self.method_ids.insert(method.id, id);
                    self.methods_by_class.entry(class_ty).or_default().push(id);
                }
                Statement::ClassDecl(nested) => self.prescan_members(nested),
                _ => {}
            }
        }
    }

    fn declared_method_sig(&mut self, declaring: TyId, method: &MethodDecl) -> MethodSig {
        let return_ty = method
            .return_type
            .as_ref()
            .and_then(|t| self.resolve_type_tree(t))
            .unwrap_or(declaring);
        let mut parameter_types = Vec::new();
        let mut varargs = false;
        for parameter in parameter_decls(method) {
            varargs = parameter.varargs.is_some();
            let ty = parameter
                .type_expr
                .as_ref()
                .and_then(|t| self.resolve_type_tree(t))
                .unwrap_or(self.arena.unknown());
            parameter_types.push(ty);
        }
        let is_static = method
            .modifiers
            .iter()
            .any(|m| m.kind == ModifierKind::Static);
        let thrown = method
            .throws
            .as_ref()
            .map(|c| c.iter().filter_map(|t| self.resolve_type_tree(t)).collect())
            .unwrap_or_default();
        MethodSig {
            declaring,
            name: method.simple_name(),
            return_ty,
            parameter_types,
            varargs,
            is_static,
            thrown,
        }
    }

    // ------------------------------------------------------------------
    // Name resolution
    // ------------------------------------------------------------------

    fn resolve_class_name(&mut self, simple: &str) -> Option<TyId> {
        if let Some(fqn) = self.file_classes.get(simple).cloned() {
            return self.arena.find_class(&fqn);
        }
        if let Some(fqn) = self.import_map.get(simple).cloned() {
            return Some(
                self.arena
                    .intern_class(&fqn, ClassKind::Class, None, vec![]),
            );
        }
        for package in self.star_packages.clone() {
            let candidate = format!("{package}.{simple}");
            if let Some(id) = self.arena.find_class(&candidate) {
                return Some(id);
            }
        }
        self.arena.find_class(&format!("java.lang.{simple}"))
    }

    fn primitive_for(&mut self, name: &str) -> Option<TyId> {
        let kind = match name {
            "boolean" => PrimitiveKind::Boolean,
            "char" => PrimitiveKind::Char,
            "int" | "short" | "byte" => PrimitiveKind::Int,
            "long" => PrimitiveKind::Long,
            "double" | "float" => PrimitiveKind::Double,
            "void" => PrimitiveKind::Void,
            _ => return None,
        };
        Some(self.arena.primitive(kind))
    }

    /// Resolves a type tree, interning fully written names on the fly.
    fn resolve_type_tree(&mut self, expr: &Expression) -> Option<TyId> {
        match expr {
            Expression::Identifier(ident) => self
                .primitive_for(&ident.simple_name)
                .or_else(|| self.resolve_class_name(&ident.simple_name)),
            Expression::FieldAccess(_) => {
                let fqn = expr.qualified_name()?;
                Some(
                    self.arena
                        .intern_class(&fqn, ClassKind::Class, None, vec![]),
                )
            }
            Expression::ParameterizedType(node) => {
                let base = self.resolve_type_tree(&node.clazz)?;
                let args: Vec<TyId> = node
                    .type_parameters
                    .iter()
                    .filter(|e| !matches!(e, Expression::Empty(_)))
                    .map(|e| self.resolve_type_tree(e).unwrap_or(self.arena.unknown()))
                    .collect();
                Some(self.arena.parameterized(base, args))
            }
            _ => None,
        }
    }

    /// Like [`Self::resolve_type_tree`] but never interns new entries;
    /// used while hierarchy links are still being established.
    fn resolve_type_tree_readonly(&self, expr: &Expression) -> Option<TyId> {
        match expr {
            Expression::Identifier(ident) => {
                if let Some(fqn) = self.file_classes.get(ident.simple_name.as_str()) {
                    return self.arena.find_class(fqn);
                }
                if let Some(fqn) = self.import_map.get(ident.simple_name.as_str()) {
                    return self.arena.find_class(fqn);
                }
                self.arena
                    .find_class(&format!("java.lang.{}", ident.simple_name))
            }
            Expression::FieldAccess(_) => {
                let fqn = expr.qualified_name()?;
                self.arena.find_class(&fqn)
            }
            Expression::ParameterizedType(node) => self.resolve_type_tree_readonly(&node.clazz),
            _ => None,
        }
    }

    fn lookup_variable(&self, name: &str) -> Option<(VarId, TyId)> {
        for scope in self.scopes.iter().rev() {
            if let Some(found) = scope.vars.get(name) {
                return Some(*found);
            }
        }
        // Fields of the enclosing classes, innermost first.
        for class_ty in self.class_stack.iter().rev() {
            if let Some(found) = self.fields.get(&(*class_ty, CompactString::from(name))) {
                return Some(*found);
            }
        }
        None
    }

    /// Finds a declared method by name on a class or its supertypes. The
    /// resolved declaring type is the type that actually declares the
    /// method, which may differ from the receiver's static type.
    fn find_declared_method(&self, receiver: TyId, name: &str, argc: usize) -> Option<MethodId> {
        for candidate_ty in self.arena.self_and_supertypes(receiver) {
            if let Some(methods) = self.methods_by_class.get(&candidate_ty) {
                for &method in methods {
                    let sig = self.arena.method_sig(method);
                    if sig.name == name
                        && (sig.parameter_types.len() == argc
                            || (sig.varargs && argc >= sig.parameter_types.len().saturating_sub(1)))
                    {
                        return Some(method);
                    }
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Tree rebuild
    // ------------------------------------------------------------------

    fn unit(&mut self, cu: CompilationUnit) -> CompilationUnit {
        let classes = cu
            .classes
            .into_iter()
            .map(|c| self.class(&c))
            .collect();
        CompilationUnit { classes, ..cu }
    }

    fn class(&mut self, class: &Arc<ClassDecl>) -> Arc<ClassDecl> {
        let class_ty = self.class_ids.get(&class.id).copied();
        if let Some(ty) = class_ty {
            self.class_stack.push(ty);
        }
        self.scopes.push(Scope::default());

        let leading_annotations = class
            .leading_annotations
            .iter()
            .map(|a| self.annotation(a.clone()))
            .collect();
        let extends = class.extends.clone().map(|padded| {
            let element = self.type_position(padded.element.clone());
            padded.with_element(element)
        });
        let implements = class.implements.clone().map(|container| {
            let elements = container
                .elements
                .into_iter()
                .map(|p| {
                    let element = self.type_position(p.element.clone());
                    p.with_element(element)
                })
                .collect();
            Container {
                elements,
                ..container
            }
        });
        let body = self.block(class.body.clone());

        self.scopes.pop();
        if class_ty.is_some() {
            self.class_stack.pop();
        }

        Arc::new(ClassDecl {
            leading_annotations,
            extends,
            implements,
            body,
            type_ref: class_ty,
            ..(**class).clone()
        })
    }

    fn block(&mut self, block: Block) -> Block {
        self.scopes.push(Scope::default());
        let statements = block
            .statements
            .into_iter()
            .map(|padded| {
                let element = self.statement(padded.element.clone());
                padded.with_element(element)
            })
            .collect();
        self.scopes.pop();
        Block { statements, ..block }
    }

    fn statement(&mut self, statement: Statement) -> Statement {
        match statement {
            Statement::Block(block) => Statement::Block(Arc::new(self.block((*block).clone()))),
            Statement::ClassDecl(class) => Statement::ClassDecl(self.class(&class)),
            Statement::Empty(empty) => Statement::Empty(empty),
            Statement::Expression(expression) => {
                Statement::Expression(self.expression(expression))
            }
            Statement::If(node) => {
                let condition = self.control_parens(node.condition.clone());
                let then_part = self.padded_statement(node.then_part.clone());
                let else_part = node.else_part.clone().map(|else_part| Else {
                    body: self.padded_statement(else_part.body.clone()),
                    ..else_part
                });
                Statement::If(Arc::new(If {
                    condition,
                    then_part,
                    else_part,
                    ..(*node).clone()
                }))
            }
            Statement::MethodDecl(method) => Statement::MethodDecl(self.method(&method)),
            Statement::Return(node) => {
                let expression = node.expression.clone().map(|e| self.expression(e));
                Statement::Return(Arc::new(Return {
                    expression,
                    ..(*node).clone()
                }))
            }
            Statement::Throw(node) => {
                let exception = self.expression(node.exception.clone());
                Statement::Throw(Arc::new(Throw {
                    exception,
                    ..(*node).clone()
                }))
            }
            Statement::VariableDecls(decls) => {
                Statement::VariableDecls(self.variable_decls(&decls, None))
            }
            Statement::While(node) => {
                let condition = self.control_parens(node.condition.clone());
                let body = self.padded_statement(node.body.clone());
                Statement::While(Arc::new(While {
                    condition,
                    body,
                    ..(*node).clone()
                }))
            }
        }
    }

    fn padded_statement(&mut self, padded: RightPadded<Statement>) -> RightPadded<Statement> {
        let element = self.statement(padded.element.clone());
        padded.with_element(element)
    }

    fn control_parens(&mut self, parens: ControlParens) -> ControlParens {
        let element = self.expression(parens.tree.element.clone());
        ControlParens {
            tree: parens.tree.with_element(element),
            ..parens
        }
    }

    fn method(&mut self, method: &Arc<MethodDecl>) -> Arc<MethodDecl> {
        let method_id = self.method_ids.get(&method.id).copied();
        self.scopes.push(Scope::default());

        let leading_annotations = method
            .leading_annotations
            .iter()
            .map(|a| self.annotation(a.clone()))
            .collect();
        let return_type = method
            .return_type
            .clone()
            .map(|t| self.type_position(t));

        let parameters = {
            let elements = method
                .parameters
                .elements
                .clone()
                .into_iter()
                .map(|p| {
                    let element = match p.element.clone() {
                        Statement::VariableDecls(decls) => {
                            Statement::VariableDecls(self.variable_decls(&decls, None))
                        }
                        other => other,
                    };
                    p.with_element(element)
                })
                .collect();
            Container {
                elements,
                ..method.parameters.clone()
            }
        };

        let throws = method.throws.clone().map(|container| {
            let elements = container
                .elements
                .into_iter()
                .map(|p| {
                    let element = self.type_position(p.element.clone());
                    p.with_element(element)
                })
                .collect();
            Container {
                elements,
                ..container
            }
        });

        let body = method.body.clone().map(|b| self.block(b));

        self.scopes.pop();
        Arc::new(MethodDecl {
            leading_annotations,
            return_type,
            parameters,
            throws,
            body,
            method: method_id,
            ..(**method).clone()
        })
    }

    fn variable_decls(
        &mut self,
        decls: &Arc<VariableDecls>,
        owner: Option<TyId>,
    ) -> Arc<VariableDecls> {
        let leading_annotations = decls
            .leading_annotations
            .iter()
            .map(|a| self.annotation(a.clone()))
            .collect();
        let ty = decls
            .type_expr
            .as_ref()
            .and_then(|t| self.resolve_type_tree(t))
            .unwrap_or(self.arena.unknown());
        let type_expr = decls.type_expr.clone().map(|t| self.type_position(t));

        let vars = decls
            .vars
            .clone()
            .into_iter()
            .map(|padded| {
                let var = padded.element.clone();
                let initializer = var
                    .initializer
                    .clone()
                    .map(|init| {
                        let element = self.expression(init.element.clone());
                        init.with_element(element)
                    });
                let name = var.name.simple_name.clone();
                let var_id = self.arena.variable(VariableSig {
                    owner,
                    name: name.clone(),
                    ty,
                });
                if let Some(scope) = self.scopes.last_mut() {
                    scope.vars.insert(name, (var_id, ty));
                }
                let mut ident = var.name.clone();
                ident.type_ref = Some(ty);
                ident.variable = Some(var_id);
                padded.with_element(NamedVariable {
                    name: ident,
                    initializer,
                    variable: Some(var_id),
                    ..var
                })
            })
            .collect();

        Arc::new(VariableDecls {
            leading_annotations,
            type_expr,
            vars,
            ..(**decls).clone()
        })
    }

    fn annotation(&mut self, annotation: Annotation) -> Annotation {
        let annotation_type = self.type_position(annotation.annotation_type.clone());
        if annotation_type.type_ref().is_none() {
            let name = annotation_type
                .qualified_name()
                .unwrap_or_else(|| "<unknown>".to_owned());
            self.diagnostics.push(crate::tree::Diagnostic::unpositioned(
                format!("unresolved annotation type `{name}`"),
            ));
        }
        let arguments = annotation.arguments.clone().map(|container| {
            let elements = container
                .elements
                .into_iter()
                .map(|p| {
                    let element = self.expression(p.element.clone());
                    p.with_element(element)
                })
                .collect();
            Container {
                elements,
                ..container
            }
        });
        Annotation {
            annotation_type,
            arguments,
            ..annotation
        }
    }

    /// Attributes a type tree in type position, attaching the resolved
    /// type to the outermost node.
    fn type_position(&mut self, expr: Expression) -> Expression {
        let resolved = self.resolve_type_tree(&expr);
        match expr {
            Expression::Identifier(ident) => Expression::Identifier(Arc::new(Identifier {
                type_ref: resolved,
                ..(*ident).clone()
            })),
            Expression::FieldAccess(node) => Expression::FieldAccess(Arc::new(FieldAccess {
                type_ref: resolved,
                ..(*node).clone()
            })),
            Expression::ParameterizedType(node) => {
                let clazz = self.type_position(node.clazz.clone());
                let type_parameters = {
                    let elements = node
                        .type_parameters
                        .elements
                        .clone()
                        .into_iter()
                        .map(|p| {
                            let element = match p.element.clone() {
                                e @ (Expression::Identifier(_)
                                | Expression::FieldAccess(_)
                                | Expression::ParameterizedType(_)) => self.type_position(e),
                                other => other,
                            };
                            p.with_element(element)
                        })
                        .collect();
                    Container {
                        elements,
                        ..node.type_parameters.clone()
                    }
                };
                Expression::ParameterizedType(Arc::new(ParameterizedType {
                    clazz,
                    type_parameters,
                    type_ref: resolved,
                    ..(*node).clone()
                }))
            }
            other => other,
        }
    }

    fn expression(&mut self, expression: Expression) -> Expression {
        match expression {
            Expression::Identifier(ident) => {
                if let Some((var_id, ty)) = self.lookup_variable(&ident.simple_name) {
                    Expression::Identifier(Arc::new(Identifier {
                        type_ref: Some(ty),
                        variable: Some(var_id),
                        ..(*ident).clone()
                    }))
                } else if let Some(ty) = self.resolve_class_name(&ident.simple_name) {
                    Expression::Identifier(Arc::new(Identifier {
                        type_ref: Some(ty),
                        ..(*ident).clone()
                    }))
                } else {
                    Expression::Identifier(ident)
                }
            }
            Expression::Literal(lit) => {
                let ty = match &lit.value {
                    LiteralValue::Null => self.arena.primitive(PrimitiveKind::Null),
                    LiteralValue::Boolean(_) => self.arena.primitive(PrimitiveKind::Boolean),
                    LiteralValue::Integer(_) => self.arena.primitive(PrimitiveKind::Int),
                    LiteralValue::Double(_) => self.arena.primitive(PrimitiveKind::Double),
                    LiteralValue::Char(_) => self.arena.primitive(PrimitiveKind::Char),
                    LiteralValue::String(_) => self
                        .arena
                        .find_class("java.lang.String")
                        .unwrap_or(self.arena.unknown()),
                };
                Expression::Literal(Arc::new(crate::tree::Literal {
                    type_ref: Some(ty),
                    ..(*lit).clone()
                }))
            }
            Expression::FieldAccess(node) => {
                let target = self.expression(node.target.clone());
                // A dotted chain that names a type (e.g. a fully qualified
                // reference) resolves as one.
                let as_type = Expression::FieldAccess(Arc::clone(&node))
                    .qualified_name()
                    .and_then(|fqn| self.arena.find_class(&fqn));
                let type_ref = as_type.or_else(|| {
                    self.well_known_field(&target, &node.name.element.simple_name)
                });
                Expression::FieldAccess(Arc::new(FieldAccess {
                    target,
                    type_ref,
                    ..(*node).clone()
                }))
            }
            Expression::MethodInvocation(node) => self.invocation(&node),
            Expression::Binary(node) => {
                let left = self.expression(node.left.clone());
                let right = self.expression(node.right.clone());
                let type_ref = match node.operator.element {
                    BinaryOp::Equal
                    | BinaryOp::NotEqual
                    | BinaryOp::LessThan
                    | BinaryOp::GreaterThan
                    | BinaryOp::LessThanOrEqual
                    | BinaryOp::GreaterThanOrEqual
                    | BinaryOp::And
                    | BinaryOp::Or => Some(self.arena.primitive(PrimitiveKind::Boolean)),
                    _ => left.type_ref(),
                };
                Expression::Binary(Arc::new(Binary {
                    left,
                    right,
                    type_ref,
                    ..(*node).clone()
                }))
            }
            Expression::Unary(node) => {
                let inner = self.expression(node.expression.clone());
                let type_ref = inner.type_ref();
                Expression::Unary(Arc::new(crate::tree::Unary {
                    expression: inner,
                    type_ref,
                    ..(*node).clone()
                }))
            }
            Expression::Assignment(node) => {
                let variable = self.expression(node.variable.clone());
                let value = self.expression(node.assignment.element.clone());
                let type_ref = variable.type_ref();
                Expression::Assignment(Arc::new(Assignment {
                    variable: variable.clone(),
                    assignment: node.assignment.clone().with_element(value),
                    type_ref,
                    ..(*node).clone()
                }))
            }
            Expression::Parentheses(node) => {
                let inner = self.expression(node.tree.element.clone());
                Expression::Parentheses(Arc::new(crate::tree::Parentheses {
                    tree: node.tree.clone().with_element(inner),
                    ..(*node).clone()
                }))
            }
            Expression::NewClass(node) => {
                let clazz = self.type_position(node.clazz.clone());
                let type_ref = clazz.type_ref();
                let arguments = self.arguments(node.arguments.clone());
                Expression::NewClass(Arc::new(NewClass {
                    clazz,
                    arguments,
                    type_ref,
                    ..(*node).clone()
                }))
            }
            Expression::ParameterizedType(_) => self.type_position(expression),
            Expression::Empty(empty) => Expression::Empty(empty),
        }
    }

    fn arguments(&mut self, container: Container<Expression>) -> Container<Expression> {
        let elements = container
            .elements
            .into_iter()
            .map(|p| {
                let element = self.expression(p.element.clone());
                p.with_element(element)
            })
            .collect();
        Container {
            elements,
            ..container
        }
    }

    fn invocation(&mut self, node: &Arc<MethodInvocation>) -> Expression {
        let select = node.select.clone().map(|padded| {
            let element = self.expression(padded.element.clone());
            padded.with_element(element)
        });
        let arguments = self.arguments(node.arguments.clone());

        let arg_types: Vec<TyId> = arguments
            .iter()
            .filter(|e| !matches!(e, Expression::Empty(_)))
            .map(|e| e.type_ref().unwrap_or(self.arena.unknown()))
            .collect();

        let receiver = match &select {
            Some(padded) => padded.element.type_ref(),
            None => self.class_stack.last().copied(),
        };

        let method = receiver.and_then(|receiver_ty| {
            let declared =
                self.find_declared_method(receiver_ty, &node.name.simple_name, arg_types.len());
            match declared {
                Some(found) => {
                    let sig = self.arena.method_sig(found).clone();
                    if sig.varargs && arg_types.len() != sig.parameter_types.len() {
                        // Variadic call sites carry one resolved type per
                        // argument, anchored to the resolved declaring type.
                        Some(self.arena.method(MethodSig {
                            parameter_types: arg_types.clone(),
                            ..sig
                        }))
                    } else {
                        Some(found)
                    }
                }
                None => {
                    // Library method: synthesize a signature from the call
                    // site, declared on the receiver's resolved type.
                    Some(self.arena.method(MethodSig {
                        declaring: receiver_ty,
                        name: node.name.simple_name.clone(),
                        return_ty: self.arena.unknown(),
                        parameter_types: arg_types.clone(),
                        varargs: false,
                        is_static: false,
                        thrown: vec![],
                    }))
                }
            }
        });

        let type_ref = method.map(|m| self.arena.method_sig(m).return_ty);

        Expression::MethodInvocation(Arc::new(MethodInvocation {
            select,
            arguments,
            method,
            type_ref,
            ..(**node).clone()
        }))
    }

    /// The handful of library fields the oracle knows about.
    fn well_known_field(&mut self, target: &Expression, name: &str) -> Option<TyId> {
        let target_ty = target.type_ref()?;
        let target_name = self.arena.full_name(target_ty);
        match (target_name.as_str(), name) {
            ("java.lang.System", "out" | "err") => self.arena.find_class("java.io.PrintStream"),
            _ => None,
        }
    }
}

/// The parameter declarations of a method, skipping the empty-list
/// placeholder.
fn parameter_decls(method: &MethodDecl) -> impl Iterator<Item = &Arc<VariableDecls>> {
    method.parameters.iter().filter_map(|s| match s {
        Statement::VariableDecls(decls) => Some(decls),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::tree::{Expression, Statement};

    #[test]
    fn unresolved_annotation_type_surfaces_a_diagnostic() {
        let parsed = parse("@Mystery\nclass A {\n}\n", "A.java").expect("parses");
        assert!(parsed
            .cu
            .diagnostics
            .iter()
            .any(|d| d.message.contains("Mystery")));
    }

    #[test]
    fn known_annotation_types_leave_no_diagnostics() {
        let parsed = parse("@Deprecated\nclass A {\n}\n", "A.java").expect("parses");
        assert!(parsed.cu.diagnostics.is_empty());
    }

    #[test]
    fn locals_shadow_nothing_and_resolve_to_their_declared_type() {
        let source = "import java.util.List;

class A {
    void m(List incoming) {
        List local = incoming;
        use(local);
    }

    void use(List l) {
    }
}
";
        let parsed = parse(source, "A.java").expect("parses");
        let Statement::MethodDecl(method) = &parsed.cu.classes[0].body.statements[0].element
        else {
            panic!("expected method");
        };
        let body = method.body.as_ref().expect("body");
        let Statement::VariableDecls(decls) = &body.statements[0].element else {
            panic!("expected local declaration");
        };
        let ty = decls.vars[0].element.name.type_ref.expect("attributed");
        assert_eq!(parsed.arena.full_name(ty), "java.util.List");
    }

    #[test]
    fn unqualified_calls_resolve_to_the_enclosing_class() {
        let source = "package com.x;

class A {
    void a() {
        b();
    }

    void b() {
    }
}
";
        let parsed = parse(source, "A.java").expect("parses");
        let Statement::MethodDecl(method) = &parsed.cu.classes[0].body.statements[0].element
        else {
            panic!("expected method");
        };
        let body = method.body.as_ref().expect("body");
        let Statement::Expression(Expression::MethodInvocation(call)) =
            &body.statements[0].element
        else {
            panic!("expected invocation");
        };
        let sig = parsed.arena.method_sig(call.method.expect("attributed"));
        assert_eq!(parsed.arena.full_name(sig.declaring), "com.x.A");
        assert_eq!(sig.name, "b");
    }
}
