//! Import management tests: removal safety, ordering, star folding.
#![allow(clippy::unwrap_used)]

use rejig::parser::parse;
use rejig::recipes::{OrderImports, Recipe, RemoveUnusedImports};
use rejig::style::ImportLayoutStyle;
use rejig::tree::printer;
use rejig::visitor::pass;

fn run_recipe(source: &str, recipe: &dyn Recipe) -> String {
    let parsed = parse(source, "Test.java").unwrap();
    let mut visitor = recipe.visitor();
    let cu = pass::run(parsed.cu, &parsed.arena, visitor.as_mut()).unwrap();
    printer::print(&cu)
}

#[test]
fn unused_import_is_removed() {
    let source = "package com.example;

import java.util.List;
import java.util.Map;

public class A {
    private Map<String, String> index;
}
";
    let printed = run_recipe(source, &RemoveUnusedImports);
    assert!(!printed.contains("import java.util.List;"));
    assert!(printed.contains("import java.util.Map;"));
}

#[test]
fn import_used_as_generic_type_argument_is_retained() {
    let source = "package com.example;

import java.util.List;
import java.util.Map;

public class A {
    private Map<String, List> index;
}
";
    let printed = run_recipe(source, &RemoveUnusedImports);
    assert!(printed.contains("import java.util.List;"));
    assert!(printed.contains("import java.util.Map;"));
}

#[test]
fn import_used_as_annotation_argument_is_retained() {
    let source = "package com.example;

import com.util.Helper;
import com.util.Unrelated;
import com.util.Uses;

public class A {
    @Uses(Helper.class)
    public void helped() {
    }
}
";
    let printed = run_recipe(source, &RemoveUnusedImports);
    assert!(printed.contains("import com.util.Helper;"));
    assert!(printed.contains("import com.util.Uses;"));
    assert!(!printed.contains("import com.util.Unrelated;"));
}

#[test]
fn static_imports_are_always_retained() {
    let source = "package com.example;

import static java.util.Arrays.asList;

public class A {
}
";
    let printed = run_recipe(source, &RemoveUnusedImports);
    assert!(printed.contains("import static java.util.Arrays.asList;"));
}

#[test]
fn removing_the_first_import_does_not_leave_a_blank_line() {
    let source = "import java.util.List;
import java.util.Map;

class A {
    Map index;
}
";
    let printed = run_recipe(source, &RemoveUnusedImports);
    assert!(printed.starts_with("import java.util.Map;"), "got: {printed}");
}

#[test]
fn imports_are_grouped_and_sorted() {
    let source = "package com.example;

import com.zeta.Z;
import java.util.List;
import com.alpha.A;
import java.io.File;

public class Holder {
    File file;
    List items;
    A a;
    Z z;
}
";
    let printed = run_recipe(source, &OrderImports::new(ImportLayoutStyle::default()));
    let expected = "import java.io.File;
import java.util.List;

import com.alpha.A;
import com.zeta.Z;";
    assert!(printed.contains(expected), "got: {printed}");
}

#[test]
fn imports_fold_into_a_star_past_the_threshold() {
    let source = "package com.example;

import java.util.ArrayList;
import java.util.HashMap;
import java.util.List;
import java.util.Map;
import java.util.Set;

public class Holder {
}
";
    let style = ImportLayoutStyle {
        star_import_threshold: 5,
        ..ImportLayoutStyle::default()
    };
    let printed = run_recipe(source, &OrderImports::new(style));
    assert!(printed.contains("import java.util.*;"), "got: {printed}");
    assert!(!printed.contains("import java.util.List;"));
}

#[test]
fn below_threshold_imports_stay_explicit() {
    let source = "package com.example;

import java.util.List;
import java.util.Map;

public class Holder {
    List items;
    Map index;
}
";
    let printed = run_recipe(source, &OrderImports::new(ImportLayoutStyle::default()));
    assert!(printed.contains("import java.util.List;"));
    assert!(printed.contains("import java.util.Map;"));
    assert!(!printed.contains("import java.util.*;"));
}

#[test]
fn order_imports_declares_itself_order_sensitive() {
    let recipe = OrderImports::new(ImportLayoutStyle::default());
    assert!(!recipe.idempotent());
    assert!(RemoveUnusedImports.idempotent());
}
