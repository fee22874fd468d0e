//! Auto-format tests: indent inference from unmodified lines, re-indent
//! of modified scopes by nesting depth, and idempotence.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rejig::format::AutoFormatVisitor;
use rejig::parser::parse;
use rejig::style::IndentStyle;
use rejig::template::{splice_statements, Coordinates, Template};
use rejig::tree::{printer, MethodDecl};
use rejig::visitor::{pass, TraversalContext, TreeVisitor, VisitResult};

/// Appends a statement to the named method, then auto-formats.
fn insert_and_format(source: &str, method_name: &'static str, snippet: &'static str) -> String {
    struct Append {
        method_name: &'static str,
        snippet: &'static str,
    }
    impl TreeVisitor for Append {
        fn visit_method_decl(
            &mut self,
            method: Arc<MethodDecl>,
            ctx: &mut TraversalContext,
        ) -> VisitResult<Arc<MethodDecl>> {
            let method = rejig::visitor::walk_method_decl(self, method, ctx)?;
            if method.simple_name() != self.method_name {
                return Ok(method);
            }
            let template = Template::new(self.snippet.to_owned());
            let (statements, _) = template.apply_statements(&ctx.cursor, &[])?;
            let body = method.body.clone().unwrap();
            let coords = Coordinates::last_statement(body.id);
            let body = splice_statements(body, &coords, statements)?;
            Ok(Arc::new(MethodDecl {
                body: Some(body),
                ..(*method).clone()
            }))
        }
    }

    let parsed = parse(source, "Test.java").unwrap();
    let mut append = Append {
        method_name,
        snippet,
    };
    let cu = pass::run(parsed.cu, &parsed.arena, &mut append).unwrap();
    let mut format = AutoFormatVisitor::new(IndentStyle::default());
    let cu = pass::run(cu, &parsed.arena, &mut format).unwrap();
    printer::print(&cu)
}

#[test]
fn inserted_statement_gets_inferred_space_indent() {
    let source = "public class A {
    public void m() {
        int a = 1;
    }
}
";
    let printed = insert_and_format(source, "m", "int b = 2;");
    // Method body statements sit two levels deep in a 4-space file.
    assert!(printed.contains("\n        int b = 2;"), "got: {printed}");
}

#[test]
fn inserted_statement_follows_two_space_files() {
    let source = "public class A {
  public void m() {
    int a = 1;
  }
}
";
    let printed = insert_and_format(source, "m", "int b = 2;");
    assert!(printed.contains("\n    int b = 2;"), "got: {printed}");
}

#[test]
fn inserted_statement_follows_tab_files() {
    let source = "public class A {\n\tpublic void m() {\n\t\tint a = 1;\n\t}\n}\n";
    let printed = insert_and_format(source, "m", "int b = 2;");
    assert!(printed.contains("\n\t\tint b = 2;"), "got: {printed}");
}

#[test]
fn depth_tracks_nested_blocks() {
    let source = "public class A {
    public void m(boolean go) {
        if (go) {
            int a = 1;
        }
    }
}
";
    // Insert into the method body (depth 2), not the if body.
    let printed = insert_and_format(source, "m", "int b = 2;");
    assert!(printed.contains("\n        int b = 2;"), "got: {printed}");
}

#[test]
fn empty_file_sample_falls_back_to_configured_style() {
    // A single-line method gives no indentation votes at all.
    let source = "class A { void m() { } }\n";
    let printed = insert_and_format(source, "m", "int b = 2;");
    assert!(printed.contains("\n        int b = 2;"), "got: {printed}");
}

#[test]
fn auto_format_twice_is_a_noop() {
    let source = "public class A {
    public void m() {
        int a = 1;
    }
}
";
    let once = insert_and_format(source, "m", "int b = 2;");
    // A second full format pass over the already-formatted output.
    let parsed = parse(&once, "Test.java").unwrap();
    let mut format = AutoFormatVisitor::new(IndentStyle::default());
    let cu = pass::run(parsed.cu, &parsed.arena, &mut format).unwrap();
    assert_eq!(printer::print(&cu), once);
}

#[test]
fn unmodified_files_are_untouched() {
    let oddly_formatted = "class A {
      void m() {
   int a = 1;
      }
}
";
    let parsed = parse(oddly_formatted, "Test.java").unwrap();
    let mut format = AutoFormatVisitor::new(IndentStyle::default());
    let cu = pass::run(parsed.cu, &parsed.arena, &mut format).unwrap();
    // No modified markers anywhere: nothing to re-indent.
    assert_eq!(printer::print(&cu), oddly_formatted);
}
