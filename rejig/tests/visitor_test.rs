//! Tests for the visitor framework: traversal order, no-op identity,
//! structural sharing, cursor state, and the deferred visitor queue.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rejig::parser::parse;
use rejig::recipes::AddImportVisitor;
use rejig::tree::{printer, Identifier, MethodDecl, MethodInvocation, Statement};
use rejig::visitor::{pass, TraversalContext, TreeVisitor, VisitResult};

const SOURCE: &str = "package com.example;

public class Pair {
    int first = 1;
    int second = 2;

    int sum() {
        return first + second;
    }

    int difference() {
        return first - second;
    }
}
";

struct Noop;
impl TreeVisitor for Noop {}

#[test]
fn noop_visitor_leaves_output_identical() {
    let parsed = parse(SOURCE, "Pair.java").unwrap();
    let mut noop = Noop;
    let cu = pass::run(parsed.cu, &parsed.arena, &mut noop).unwrap();
    assert_eq!(printer::print(&cu), SOURCE);
}

#[test]
fn traversal_visits_identifiers_in_source_order() {
    struct Collect {
        names: Vec<String>,
    }
    impl TreeVisitor for Collect {
        fn visit_identifier(
            &mut self,
            node: Arc<Identifier>,
            _ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<Identifier>> {
            self.names.push(node.simple_name.to_string());
            Ok(node)
        }
    }

    let parsed = parse(SOURCE, "Pair.java").unwrap();
    let mut collect = Collect { names: Vec::new() };
    pass::run(parsed.cu, &parsed.arena, &mut collect).unwrap();
    // Depth-first, left to right: each member's type tree before its
    // body, each operand left before right.
    assert_eq!(
        collect.names,
        vec!["int", "int", "int", "first", "second", "int", "first", "second"]
    );
}

#[test]
fn changing_one_method_keeps_sibling_subtree_identity() {
    struct RenameSum;
    impl TreeVisitor for RenameSum {
        fn visit_method_decl(
            &mut self,
            method: Arc<MethodDecl>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodDecl>> {
            let method = rejig::visitor::walk_method_decl(self, method, ctx)?;
            if method.simple_name() == "sum" {
                let mut renamed = (*method).clone();
                renamed.name.simple_name = "total".into();
                Ok(Arc::new(renamed))
            } else {
                Ok(method)
            }
        }
    }

    let parsed = parse(SOURCE, "Pair.java").unwrap();
    let before = parsed.cu.clone();
    let mut rename = RenameSum;
    let after = pass::run(parsed.cu, &parsed.arena, &mut rename).unwrap();

    let methods = |cu: &rejig::tree::CompilationUnit| -> Vec<Arc<MethodDecl>> {
        cu.classes[0].methods().cloned().collect()
    };
    let old = methods(&before);
    let new = methods(&after);
    assert_eq!(old.len(), 2);
    assert_eq!(new[0].simple_name(), "total");
    // The changed method is a new allocation; its sibling is the same one.
    assert!(!Arc::ptr_eq(&old[0], &new[0]));
    assert!(Arc::ptr_eq(&old[1], &new[1]));
    // The class that contains them was necessarily rebuilt.
    assert!(!Arc::ptr_eq(&before.classes[0], &after.classes[0]));
}

#[test]
fn cursor_tracks_enclosing_scopes_and_depth() {
    struct Probe {
        saw: Vec<(String, String, usize)>,
    }
    impl TreeVisitor for Probe {
        fn visit_method_invocation(
            &mut self,
            node: Arc<MethodInvocation>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodInvocation>> {
            let class = ctx
                .cursor
                .enclosing_class()
                .map(|c| c.simple_name().to_string())
                .unwrap_or_default();
            let method = ctx
                .cursor
                .enclosing_method()
                .map(|m| m.simple_name().to_string())
                .unwrap_or_default();
            self.saw.push((
                class,
                method,
                ctx.cursor.block_depth(),
            ));
            rejig::visitor::walk_method_invocation(self, node, ctx)
        }
    }

    let source = "class Outer {
    void caller() {
        if (true) {
            helper();
        }
    }

    void helper() {
    }
}
";
    let parsed = parse(source, "Outer.java").unwrap();
    let mut probe = Probe { saw: Vec::new() };
    pass::run(parsed.cu, &parsed.arena, &mut probe).unwrap();
    // helper() sits inside class body, method body, and the if-block.
    assert_eq!(probe.saw, vec![("Outer".to_owned(), "caller".to_owned(), 3)]);
}

#[test]
fn cursor_is_scope_sees_ancestors_only() {
    struct ScopeProbe {
        inside: Option<bool>,
        other: Option<bool>,
    }
    impl TreeVisitor for ScopeProbe {
        fn visit_method_invocation(
            &mut self,
            node: Arc<MethodInvocation>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodInvocation>> {
            let enclosing = ctx.cursor.enclosing_method().unwrap().id;
            self.inside = Some(ctx.cursor.is_scope(enclosing));
            self.other = Some(ctx.cursor.is_scope(rejig::tree::NodeId::new_v4()));
            rejig::visitor::walk_method_invocation(self, node, ctx)
        }
    }

    let source = "class A { void m() { System.out.println(1); } }\n";
    let parsed = parse(source, "A.java").unwrap();
    let mut probe = ScopeProbe {
        inside: None,
        other: None,
    };
    pass::run(parsed.cu, &parsed.arena, &mut probe).unwrap();
    assert_eq!(probe.inside, Some(true));
    assert_eq!(probe.other, Some(false));
}

#[test]
fn cursor_messages_flow_between_visits() {
    struct Messenger {
        delivered: Vec<String>,
    }
    impl TreeVisitor for Messenger {
        fn visit_method_decl(
            &mut self,
            method: Arc<MethodDecl>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodDecl>> {
            ctx.cursor
                .put_message("method-name", method.simple_name().to_string());
            let out = rejig::visitor::walk_method_decl(self, method, ctx)?;
            if let Some(message) = ctx.cursor.poll_message::<String>("method-name") {
                self.delivered.push(message);
            }
            Ok(out)
        }

        fn visit_method_invocation(
            &mut self,
            node: Arc<MethodInvocation>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodInvocation>> {
            // A descendant rewrites the ancestor's message.
            let seen = ctx.cursor.peek_message::<String>("method-name").cloned();
            if let Some(seen) = seen {
                ctx.cursor
                    .put_message("method-name", format!("{seen}!{}", node.name.simple_name));
            }
            rejig::visitor::walk_method_invocation(self, node, ctx)
        }
    }

    let source = "class A { void m() { ping(); } void ping() { } }\n";
    let parsed = parse(source, "A.java").unwrap();
    let mut messenger = Messenger { delivered: Vec::new() };
    pass::run(parsed.cu, &parsed.arena, &mut messenger).unwrap();
    // The descendant's rewrite reached the ancestor; the second method
    // had no invocations, so its message came back untouched.
    assert_eq!(messenger.delivered, vec!["m!ping".to_owned(), "ping".to_owned()]);
}

#[test]
fn deferred_visitors_run_in_scheduling_order_after_the_pass() {
    struct ScheduleImports;
    impl TreeVisitor for ScheduleImports {
        fn visit_compilation_unit(
            &mut self,
            cu: rejig::tree::CompilationUnit,
            ctx: &mut TraversalContext,
        ) -> VisitResult<rejig::tree::CompilationUnit> {
            let cu = rejig::visitor::walk_compilation_unit(self, cu, ctx)?;
            // Nothing is added during this pass; both run strictly after.
            ctx.schedule_after(Box::new(AddImportVisitor::new("com.alpha.First")));
            ctx.schedule_after(Box::new(AddImportVisitor::new("com.beta.Second")));
            assert!(cu.imports.is_empty());
            Ok(cu)
        }
    }

    let source = "package com.example;

class A {
}
";
    let parsed = parse(source, "A.java").unwrap();
    let mut scheduler = ScheduleImports;
    let cu = pass::run(parsed.cu, &parsed.arena, &mut scheduler).unwrap();
    let imports: Vec<String> = cu
        .imports
        .iter()
        .map(|i| i.element.qualified_name())
        .collect();
    assert_eq!(imports, vec!["com.alpha.First", "com.beta.Second"]);
    let printed = printer::print(&cu);
    assert!(printed.contains("import com.alpha.First;"));
    assert!(printed.contains("import com.beta.Second;"));
}

#[test]
fn corrupt_tree_reports_fail_fast_errors() {
    struct FailFast;
    impl TreeVisitor for FailFast {
        fn visit_method_decl(
            &mut self,
            method: Arc<MethodDecl>,
            _ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodDecl>> {
            if method.body.is_none() {
                return Err(pass::PassError::corrupt("method body expected"));
            }
            Ok(method)
        }
    }

    let source = "abstract class A { abstract void m(); }\n";
    let parsed = parse(source, "A.java").unwrap();
    let mut visitor = FailFast;
    let err = pass::run(parsed.cu, &parsed.arena, &mut visitor).unwrap_err();
    assert!(err.to_string().contains("corrupt tree"));
}

#[test]
fn statement_list_preserved_through_rebuild() {
    // A visitor that touches nothing still yields a tree printing the
    // same statements in the same order.
    let source = "class A { void m() { int a = 1; int b = 2; a = b; } }\n";
    let parsed = parse(source, "A.java").unwrap();
    let mut noop = Noop;
    let cu = pass::run(parsed.cu, &parsed.arena, &mut noop).unwrap();
    let Statement::MethodDecl(method) = &cu.classes[0].body.statements[0].element else {
        panic!("expected method");
    };
    assert_eq!(method.body.as_ref().unwrap().statements.len(), 3);
}
