//! Template engine tests: placeholder substitution, in-context parsing,
//! splicing, and failure semantics.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rejig::parser::{parse, parse_expression_fragment};
use rejig::template::{
    replace_expression, splice_statements, Coordinates, Template, TemplateError,
};
use rejig::tree::{printer, MethodDecl, NamedVariable, Statement};
use rejig::visitor::{pass, TraversalContext, TreeVisitor, VisitResult};

const SOURCE: &str = "package com.example;

public class Counter {
    private int count = 0;

    public void bump(int amount) {
        count = count + amount;
    }
}
";

/// Applies a statement template at the end of the method named in
/// `target`, exercising the cursor-context path end to end.
struct AppendStatement {
    target: &'static str,
    template: Template,
    needed_imports: Vec<String>,
}

impl TreeVisitor for AppendStatement {
    fn visit_method_decl(
        &mut self,
        method: Arc<MethodDecl>,
        ctx: &mut TraversalContext,
    ) -> VisitResult<Arc<MethodDecl>> {
        let method = rejig::visitor::walk_method_decl(self, method, ctx)?;
        if method.simple_name() != self.target {
            return Ok(method);
        }
        let (statements, needs) = self.template.apply_statements(&ctx.cursor, &[])?;
        self.needed_imports = needs;
        let body = method.body.clone().ok_or_else(|| {
            rejig::visitor::PassError::corrupt("method body expected")
        })?;
        let coords = Coordinates::last_statement(body.id);
        let body = splice_statements(body, &coords, statements)?;
        Ok(Arc::new(MethodDecl {
            body: Some(body),
            ..(*method).clone()
        }))
    }
}

#[test]
fn statements_splice_at_the_end_of_a_block() {
    let parsed = parse(SOURCE, "Counter.java").unwrap();
    let mut visitor = AppendStatement {
        target: "bump",
        template: Template::new("System.out.println(count);"),
        needed_imports: Vec::new(),
    };
    let cu = pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap();
    let printed = printer::print(&cu);
    assert!(printed.contains("System.out.println(count);"));
    // The original statement is still ahead of the inserted one.
    let bump_body = printed.find("count = count + amount;").unwrap();
    let inserted = printed.find("System.out.println(count);").unwrap();
    assert!(bump_body < inserted);
}

#[test]
fn placeholders_substitute_positionally() {
    let parsed = parse(SOURCE, "Counter.java").unwrap();
    let amount = parse_expression_fragment("amount * 2").unwrap();

    struct WithParam {
        template: Template,
        param: rejig::tree::Expression,
    }
    impl TreeVisitor for WithParam {
        fn visit_method_decl(
            &mut self,
            method: Arc<MethodDecl>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodDecl>> {
            let method = rejig::visitor::walk_method_decl(self, method, ctx)?;
            if method.simple_name() != "bump" {
                return Ok(method);
            }
            let (statements, _) = self
                .template
                .apply_statements(&ctx.cursor, &[self.param.clone()])?;
            let body = method.body.clone().unwrap();
            let coords = Coordinates::last_statement(body.id);
            let body = splice_statements(body, &coords, statements)?;
            Ok(Arc::new(MethodDecl {
                body: Some(body),
                ..(*method).clone()
            }))
        }
    }

    let mut visitor = WithParam {
        template: Template::new("count = count + #{};"),
        param: amount,
    };
    let cu = pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap();
    assert!(printer::print(&cu).contains("count = count + amount * 2;"));
}

#[test]
fn placeholder_count_mismatch_fails() {
    let template = Template::new("foo(#{}, #{})");
    let cursor = rejig::visitor::Cursor::new();
    let err = template.apply_expression(&cursor, &[]).unwrap_err();
    assert!(matches!(
        err,
        TemplateError::PlaceholderMismatch {
            expected: 2,
            supplied: 0
        }
    ));
}

#[test]
fn unparsable_snippet_aborts_the_pass() {
    let parsed = parse(SOURCE, "Counter.java").unwrap();
    let mut visitor = AppendStatement {
        target: "bump",
        template: Template::new("this is ] not java"),
        needed_imports: Vec::new(),
    };
    let err = pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("template error"), "got: {message}");
    assert!(message.contains("Counter.bump"), "got: {message}");
}

#[test]
fn declared_imports_are_reported_not_placed() {
    let parsed = parse(SOURCE, "Counter.java").unwrap();
    let mut visitor = AppendStatement {
        target: "bump",
        template: Template::new("List seen = new ArrayList();")
            .imports(["java.util.List", "java.util.ArrayList"]),
        needed_imports: Vec::new(),
    };
    let cu = pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap();
    assert_eq!(
        visitor.needed_imports,
        vec!["java.util.List".to_owned(), "java.util.ArrayList".to_owned()]
    );
    // The template itself never touches the import list.
    assert!(cu.imports.is_empty());
}

#[test]
fn already_present_imports_are_not_reported() {
    let source = "package com.example;

import java.util.List;
import java.util.*;

public class A {
    public void m() {
    }
}
";
    let parsed = parse(source, "A.java").unwrap();
    let mut visitor = AppendStatement {
        target: "m",
        template: Template::new("List seen = new ArrayList();")
            .imports(["java.util.List", "java.util.ArrayList"]),
        needed_imports: Vec::new(),
    };
    pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap();
    // The explicit import covers List; the star import covers ArrayList.
    assert!(visitor.needed_imports.is_empty());
}

#[test]
fn replace_expression_keeps_original_trivia() {
    let parsed = parse(SOURCE, "Counter.java").unwrap();

    struct ReplaceInitializer;
    impl TreeVisitor for ReplaceInitializer {
        fn visit_named_variable(
            &mut self,
            var: NamedVariable,
            ctx: &mut TraversalContext,
        ) -> VisitResult<NamedVariable> {
            let var = rejig::visitor::walk_named_variable(self, var, ctx)?;
            let Some(initializer) = var.initializer.clone() else {
                return Ok(var);
            };
            let template = Template::new("42");
            let (expression, _) = template.apply_expression(&ctx.cursor, &[])?;
            let replaced = replace_expression(&initializer.element, expression);
            Ok(NamedVariable {
                initializer: Some(initializer.with_element(replaced)),
                ..var
            })
        }
    }

    let mut visitor = ReplaceInitializer;
    let cu = pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap();
    let printed = printer::print(&cu);
    // The space before the initializer came from the original `0`.
    assert!(printed.contains("private int count = 42;"));
    assert!(!printed.contains("= 0;"));
}

#[test]
fn replace_coordinates_swap_a_statement_in_place() {
    let parsed = parse(SOURCE, "Counter.java").unwrap();

    struct SwapFirst;
    impl TreeVisitor for SwapFirst {
        fn visit_method_decl(
            &mut self,
            method: Arc<MethodDecl>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodDecl>> {
            let method = rejig::visitor::walk_method_decl(self, method, ctx)?;
            if method.simple_name() != "bump" {
                return Ok(method);
            }
            let body = method.body.clone().unwrap();
            let target = body.statements[0].element.id();
            let template = Template::new("count = count - amount;");
            let (statements, _) = template.apply_statements(&ctx.cursor, &[])?;
            let body = splice_statements(body, &Coordinates::replace(target), statements)?;
            Ok(Arc::new(MethodDecl {
                body: Some(body),
                ..(*method).clone()
            }))
        }
    }

    let mut visitor = SwapFirst;
    let cu = pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap();
    let printed = printer::print(&cu);
    assert!(printed.contains("count = count - amount;"));
    assert!(!printed.contains("count = count + amount;"));
}

#[test]
fn replace_arguments_swaps_the_argument_list() {
    let source = "class A {
    void m() {
        target(1, 2);
    }
}
";
    let parsed = parse(source, "A.java").unwrap();

    struct Swap;
    impl TreeVisitor for Swap {
        fn visit_method_invocation(
            &mut self,
            node: std::sync::Arc<rejig::tree::MethodInvocation>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<std::sync::Arc<rejig::tree::MethodInvocation>> {
            let node = rejig::visitor::walk_method_invocation(self, node, ctx)?;
            if node.name.simple_name != "target" {
                return Ok(node);
            }
            let replacement = parse_expression_fragment("other").unwrap();
            Ok(rejig::template::replace_arguments(&node, vec![replacement]))
        }
    }

    let mut visitor = Swap;
    let cu = pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap();
    let printed = printer::print(&cu);
    assert!(printed.contains("target(other);"), "got: {printed}");
}

#[test]
fn bad_statement_index_is_a_coordinate_error() {
    let parsed = parse(SOURCE, "Counter.java").unwrap();
    let Statement::MethodDecl(method) = &parsed.cu.classes[0].body.statements[1].element else {
        panic!("expected method");
    };
    let body = method.body.clone().unwrap();
    let coords = Coordinates::statement_at(body.id, 99);
    let err = splice_statements(body, &coords, vec![]).unwrap_err();
    assert!(matches!(err, TemplateError::BadCoordinates { .. }));
}
