//! End-to-end recipe tests: rename, change type, add/remove annotation,
//! search, and idempotence of re-running.
#![allow(clippy::unwrap_used)]

use rejig::parser::parse;
use rejig::recipes::{
    count_search_results, AddAnnotation, ChangeType, FindMethodUses, Recipe, RemoveAnnotation,
    RenameMethod,
};
use rejig::tree::printer;
use rejig::visitor::pass;

/// Runs a recipe the way the batch driver does: the recipe pass (with
/// its deferred visitors), then auto-format.
fn run_recipe(source: &str, recipe: &dyn Recipe) -> String {
    let parsed = parse(source, "Test.java").unwrap();
    let mut visitor = recipe.visitor();
    let cu = pass::run(parsed.cu, &parsed.arena, visitor.as_mut()).unwrap();
    let mut format = rejig::format::AutoFormatVisitor::new(rejig::style::IndentStyle::default());
    let cu = pass::run(cu, &parsed.arena, &mut format).unwrap();
    printer::print(&cu)
}

#[test]
fn rename_method_updates_declaration_and_call_sites() {
    let source = "package com.foo;

public class Bar {
    public void doThing(int a, String b) {
    }

    public void caller() {
        doThing(1, \"x\");
        doThing(2, \"y\");
    }
}
";
    let recipe = RenameMethod::new("com.foo.Bar doThing(int, String)", "doSomething").unwrap();
    let printed = run_recipe(source, &recipe);
    assert!(!printed.contains("doThing"));
    assert_eq!(printed.matches("doSomething").count(), 3);
}

#[test]
fn rename_method_leaves_other_overloads_alone() {
    let source = "package com.foo;

public class Bar {
    public void doThing(int a, String b) {
    }

    public void doThing(String only) {
    }

    public void caller() {
        doThing(\"solo\");
    }
}
";
    let recipe = RenameMethod::new("com.foo.Bar doThing(int, String)", "doSomething").unwrap();
    let printed = run_recipe(source, &recipe);
    assert!(printed.contains("public void doSomething(int a, String b)"));
    assert!(printed.contains("public void doThing(String only)"));
    assert!(printed.contains("doThing(\"solo\");"));
}

#[test]
fn rename_is_idempotent_across_reruns() {
    let source = "package com.foo;

public class Bar {
    public void doThing(int a, String b) {
    }
}
";
    let recipe = RenameMethod::new("com.foo.Bar doThing(int, String)", "doSomething").unwrap();
    let once = run_recipe(source, &recipe);
    let twice = run_recipe(&once, &recipe);
    assert_eq!(once, twice);
    assert!(recipe.idempotent());
}

#[test]
fn change_type_rewrites_references_and_imports() {
    let source = "package com.example;

import java.util.ArrayList;

public class Holder {
    private ArrayList items = new ArrayList();
}
";
    let recipe = ChangeType::new("java.util.ArrayList", "java.util.LinkedList");
    let printed = run_recipe(source, &recipe);
    assert!(printed.contains("private LinkedList items = new LinkedList();"));
    assert!(printed.contains("import java.util.LinkedList;"));
    assert!(!printed.contains("ArrayList"));
}

#[test]
fn change_type_rewrites_fully_qualified_references() {
    let source = "package com.example;

public class Holder {
    private java.util.ArrayList items;
}
";
    let recipe = ChangeType::new("java.util.ArrayList", "java.util.LinkedList");
    let printed = run_recipe(source, &recipe);
    assert!(printed.contains("private java.util.LinkedList items;"));
}

#[test]
fn change_type_is_noop_without_references() {
    let source = "package com.example;

public class Holder {
    private int count;
}
";
    let recipe = ChangeType::new("java.util.ArrayList", "java.util.LinkedList");
    let printed = run_recipe(source, &recipe);
    assert_eq!(printed, source);
}

#[test]
fn add_annotation_targets_matched_methods_only() {
    let source = "package com.foo;

public class Bar {
    public void legacy(int a) {
    }

    public void fresh() {
    }
}
";
    let recipe = AddAnnotation::new(
        "com.foo.Bar legacy(..)",
        "@Deprecated",
        "java.lang.Deprecated",
    )
    .unwrap();
    let printed = run_recipe(source, &recipe);
    assert_eq!(printed.matches("@Deprecated").count(), 1);
    assert!(
        printed.contains("@Deprecated\n    public void legacy(int a)"),
        "got: {printed}"
    );
    assert!(printed.contains("public void fresh()"));
}

#[test]
fn add_annotation_is_idempotent_across_reruns() {
    let source = "package com.foo;

public class Bar {
    public void legacy(int a) {
    }
}
";
    let recipe = AddAnnotation::new(
        "com.foo.Bar legacy(..)",
        "@Deprecated",
        "java.lang.Deprecated",
    )
    .unwrap();
    let once = run_recipe(source, &recipe);
    let twice = run_recipe(&once, &recipe);
    assert_eq!(once, twice);
    assert_eq!(once.matches("@Deprecated").count(), 1);
}

#[test]
fn remove_annotation_strips_matches_and_keeps_others() {
    let source = "package com.foo;

public class Bar {
    @Deprecated
    @SuppressWarnings(\"deprecation\")
    public void legacy() {
    }
}
";
    let recipe = RemoveAnnotation::new("@java.lang.Deprecated").unwrap();
    let printed = run_recipe(source, &recipe);
    assert!(!printed.contains("@Deprecated"), "got: {printed}");
    assert!(printed.contains("@SuppressWarnings(\"deprecation\")"));
    assert!(printed.contains("public void legacy()"));
}

#[test]
fn find_method_marks_matches_without_changing_text() {
    let source = "package com.foo;

import java.util.List;

public class Bar {
    void caller(List list) {
        list.add(\"x\");
        list.size();
    }
}
";
    let parsed = parse(source, "Bar.java").unwrap();
    let recipe = FindMethodUses::new("java.util.List add(..)").unwrap();
    let mut visitor = recipe.visitor();
    let cu = pass::run(parsed.cu, &parsed.arena, visitor.as_mut()).unwrap();
    assert_eq!(count_search_results(&cu), 1);
    assert_eq!(printer::print(&cu), source);
}

#[test]
fn malformed_recipe_patterns_fail_at_construction() {
    assert!(RenameMethod::new("doThing(int)", "other").is_err());
    assert!(FindMethodUses::new("com.foo.Bar doThing(").is_err());
    assert!(RemoveAnnotation::new("Deprecated").is_err());
    assert!(AddAnnotation::new("com.foo.Bar m(..)", "@X", "com .bad").is_err());
}
