//! Round-trip tests: printing an unmodified tree reproduces the source
//! byte for byte.
#![allow(clippy::unwrap_used)]

use rejig::parser::parse;
use rejig::tree::printer;

fn assert_round_trip(source: &str) {
    let parsed = parse(source, "Test.java").unwrap();
    assert_eq!(printer::print(&parsed.cu), source);
}

#[test]
fn minimal_class() {
    assert_round_trip("class A {}\n");
}

#[test]
fn package_imports_and_class() {
    assert_round_trip(
        "package com.example;

import java.util.List;
import java.util.Map;

public class Foo {
}
",
    );
}

#[test]
fn fields_methods_and_statements() {
    assert_round_trip(
        "package com.example;

public class Counter {
    private int count = 0;

    public int add(int amount) {
        count = count + amount;
        return count;
    }

    public void reset() {
        count = 0;
    }
}
",
    );
}

#[test]
fn comments_are_preserved_exactly() {
    assert_round_trip(
        "// file header
package com.example;

/* block
   comment */
public class Foo {
    // counts things
    private int count = 0; // trailing-ish

    /* before method */
    public void touch() {
        // inside
        count = count + 1;
    }
}
",
    );
}

#[test]
fn control_flow_round_trips() {
    assert_round_trip(
        "class Flow {
    int pick(int a, int b) {
        if (a > b) {
            return a;
        } else if (a == b) {
            return b;
        } else {
            return b - a;
        }
    }

    void spin(int n) {
        while (n > 0) {
            n = n - 1;
        }
    }

    void fail(String message) {
        throw new IllegalArgumentException(message);
    }
}
",
    );
}

#[test]
fn annotations_round_trip() {
    assert_round_trip(
        "package com.example;

@Deprecated
public class Old {
    @SuppressWarnings(\"deprecation\")
    public void useOld() {
    }

    @SuppressWarnings(value = \"unchecked\")
    void other() {
    }
}
",
    );
}

#[test]
fn generics_and_constructors() {
    assert_round_trip(
        "package com.example;

import java.util.ArrayList;
import java.util.List;
import java.util.Map;

public class Box {
    private List<String> names = new ArrayList<String>();
    private Map<String, List<String>> index;

    public Box(List<String> names) {
        this.populate(names);
    }

    void populate(List<String> incoming) {
        names = incoming;
    }
}
",
    );
}

#[test]
fn varargs_and_static_imports() {
    assert_round_trip(
        "package com.example;

import static java.util.Arrays.asList;

public class Util {
    public static String join(String... parts) {
        return \"\";
    }
}
",
    );
}

#[test]
fn odd_whitespace_is_kept() {
    assert_round_trip(
        "class  Weird   {\n\tint  x =  1 ;\n\n\n\tvoid   m( )  {\n\t\tx  =  x+1 ;\n\t}\n}\n",
    );
}

#[test]
fn string_and_char_literals() {
    assert_round_trip(
        "class Lit {
    String s = \"a\\\"b\\n\";
    char c = 'x';
    char esc = '\\n';
    int hex = 0x1F;
    long big = 10L;
    double d = 3.5;
    boolean flag = true;
    Object nothing = null;
}
",
    );
}

#[test]
fn nested_classes_and_interfaces() {
    assert_round_trip(
        "package com.example;

public interface Shape {
    double area();

    class Circle {
        double radius;

        public double area() {
            return 3.14 * radius * radius;
        }
    }
}
",
    );
}

#[test]
fn expression_soup() {
    assert_round_trip(
        "class Expr {
    boolean test(int a, int b) {
        return !(a > b) && (a + b) * 2 <= 10 || a != b;
    }

    void calls() {
        System.out.println(test(1, 2));
        String s = String.valueOf(1).trim();
    }
}
",
    );
}

#[test]
fn star_import_round_trips() {
    assert_round_trip(
        "import java.util.*;

class Uses {
    List items;
}
",
    );
}

#[test]
fn empty_statements_and_bodiless_methods() {
    assert_round_trip(
        "abstract class Partial {
    ;
    abstract int size();

    void noop() {
        ;
    }
}
",
    );
}

#[test]
fn file_without_trailing_newline() {
    assert_round_trip("class A { }");
}
