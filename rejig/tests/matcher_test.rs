//! End-to-end matcher tests over parsed, attributed sources.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rejig::matcher::{AnnotationMatcher, MethodMatcher, TypeMatcher};
use rejig::parser::parse;
use rejig::tree::{MethodInvocation, Statement};
use rejig::visitor::{pass, TraversalContext, TreeVisitor, VisitResult};

/// Collects every method invocation in source order.
fn invocations(source: &str) -> (Vec<Arc<MethodInvocation>>, Arc<rejig::semantic::TypeArena>) {
    struct Collect {
        found: Vec<Arc<MethodInvocation>>,
    }
    impl TreeVisitor for Collect {
        fn visit_method_invocation(
            &mut self,
            node: Arc<MethodInvocation>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodInvocation>> {
            self.found.push(Arc::clone(&node));
            rejig::visitor::walk_method_invocation(self, node, ctx)
        }
    }
    let parsed = parse(source, "Test.java").unwrap();
    let arena = Arc::clone(&parsed.arena);
    let mut collect = Collect { found: Vec::new() };
    pass::run(parsed.cu, &parsed.arena, &mut collect).unwrap();
    (collect.found, arena)
}

const CALLS: &str = "package com.foo;

import java.util.List;

public class Bar {
    public void doThing(int a, String b) {
    }

    public void caller(List list) {
        list.add(\"x\");
        list.add(\"x\", \"y\");
        doThing(1, \"s\");
    }
}
";

#[test]
fn list_add_matches_any_arguments() {
    let (calls, arena) = invocations(CALLS);
    let matcher = MethodMatcher::new("java.util.List add(..)").unwrap();
    let hits: Vec<bool> = calls
        .iter()
        .map(|c| matcher.matches_invocation(c, &arena))
        .collect();
    assert_eq!(hits, vec![true, true, false]);
}

#[test]
fn parameter_order_matters_at_call_sites() {
    let (calls, arena) = invocations(CALLS);
    let right = MethodMatcher::new("com.foo.Bar doThing(int, String)").unwrap();
    let swapped = MethodMatcher::new("com.foo.Bar doThing(String, int)").unwrap();
    let do_thing = calls.last().unwrap();
    assert!(right.matches_invocation(do_thing, &arena));
    assert!(!swapped.matches_invocation(do_thing, &arena));
}

#[test]
fn target_wildcards_respect_package_boundaries() {
    let (calls, arena) = invocations(CALLS);
    let do_thing = calls.last().unwrap();
    let single = MethodMatcher::new("com.foo.* doThing(..)").unwrap();
    let deep = MethodMatcher::new("com.foo..* doThing(..)").unwrap();
    let other = MethodMatcher::new("com.other.* doThing(..)").unwrap();
    assert!(single.matches_invocation(do_thing, &arena));
    assert!(deep.matches_invocation(do_thing, &arena));
    assert!(!other.matches_invocation(do_thing, &arena));
}

#[test]
fn declaration_matching_uses_resolved_signature() {
    let parsed = parse(CALLS, "Bar.java").unwrap();
    let class = &parsed.cu.classes[0];
    let do_thing = class
        .methods()
        .find(|m| m.simple_name() == "doThing")
        .unwrap();
    let matcher = MethodMatcher::new("com.foo.Bar doThing(int, String)").unwrap();
    assert!(matcher.matches_declaration(do_thing, &parsed.arena));
    let narrower = MethodMatcher::new("com.foo.Bar doThing(int)").unwrap();
    assert!(!narrower.matches_declaration(do_thing, &parsed.arena));
}

#[test]
fn varargs_pattern_matches_longer_call_sites() {
    let source = "package com.foo;

public class Util {
    public static String join(String... parts) {
        return \"\";
    }
}

class Caller {
    void go() {
        Util.join(\"a\", \"b\", \"c\");
        Util.join(\"only\");
    }
}
";
    let (calls, arena) = invocations(source);
    let matcher = MethodMatcher::new("com.foo.Util join(String)").unwrap();
    assert_eq!(calls.len(), 2);
    assert!(matcher.matches_invocation(&calls[0], &arena));
    assert!(matcher.matches_invocation(&calls[1], &arena));
}

#[test]
fn annotation_matcher_checks_type_then_arguments() {
    let source = "package com.foo;

public class A {
    @SuppressWarnings(\"deprecation\")
    public void a() {
    }

    @SuppressWarnings(\"unchecked\")
    public void b() {
    }

    @SuppressWarnings
    public void c() {
    }
}
";
    let parsed = parse(source, "A.java").unwrap();
    let annotations: Vec<_> = parsed.cu.classes[0]
        .methods()
        .map(|m| m.leading_annotations[0].clone())
        .collect();
    let matcher = AnnotationMatcher::new("@java.lang.SuppressWarnings(\"deprecation\")").unwrap();
    assert!(matcher.matches(&annotations[0], &parsed.arena));
    assert!(!matcher.matches(&annotations[1], &parsed.arena));
    assert!(!matcher.matches(&annotations[2], &parsed.arena));

    // Without an argument list the pattern matches the type alone.
    let bare = AnnotationMatcher::new("@java.lang.SuppressWarnings").unwrap();
    assert!(annotations.iter().all(|a| bare.matches(a, &parsed.arena)));
}

#[test]
fn annotation_matcher_handles_named_and_class_arguments() {
    let source = "package com.foo;

import com.util.Uses;
import com.util.Helper;

public class A {
    @Uses(value = Helper.class)
    public void helped() {
    }
}
";
    let parsed = parse(source, "A.java").unwrap();
    let annotation = parsed.cu.classes[0]
        .methods()
        .next()
        .unwrap()
        .leading_annotations[0]
        .clone();
    let by_class = AnnotationMatcher::new("@com.util.Uses(com.util.Helper.class)").unwrap();
    assert!(by_class.matches(&annotation, &parsed.arena));
    let wrong = AnnotationMatcher::new("@com.util.Uses(com.util.Other.class)").unwrap();
    assert!(!wrong.matches(&annotation, &parsed.arena));
}

#[test]
fn type_matcher_is_semantic_not_syntactic() {
    let source = "import java.util.List;

class A {
    List items;
}
";
    let parsed = parse(source, "A.java").unwrap();
    let class = &parsed.cu.classes[0];
    let Statement::VariableDecls(field) = &class.body.statements[0].element else {
        panic!("expected field");
    };
    let ty = field.type_expr.as_ref().unwrap().type_ref().unwrap();
    // The source says `List`; the matcher sees `java.util.List`.
    let matcher = TypeMatcher::new("java.util.List").unwrap();
    assert!(matcher.matches(ty, &parsed.arena));
}

#[test]
fn pattern_compile_failures_are_immediate() {
    assert!(MethodMatcher::new("java.util.List add(").is_err());
    assert!(MethodMatcher::new("java.util..  add(..)").is_err());
    assert!(AnnotationMatcher::new("SuppressWarnings").is_err());
    assert!(TypeMatcher::new("com..").is_err());
}
