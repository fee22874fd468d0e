//! Passive style records.
//!
//! Styles are plain data supplied by configuration; the engine looks up
//! "the style of kind X, or its default" and never parses any style
//! syntax of its own.

use serde::Deserialize;

/// Indentation style: the unit the auto-format pass falls back to when a
/// file yields no inference sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IndentStyle {
    /// Indent with tabs instead of spaces.
    #[serde(default)]
    pub use_tabs: bool,
    /// Spaces per indent level (ignored for tabs).
    #[serde(default = "default_indent_width")]
    pub width: usize,
}

fn default_indent_width() -> usize {
    4
}

impl Default for IndentStyle {
    fn default() -> Self {
        Self {
            use_tabs: false,
            width: default_indent_width(),
        }
    }
}

impl IndentStyle {
    /// Renders the leading whitespace for the given nesting depth.
    #[must_use]
    pub fn indent_for(&self, depth: usize) -> String {
        if self.use_tabs {
            "\t".repeat(depth)
        } else {
            " ".repeat(self.width * depth)
        }
    }
}

/// Import layout style: group ordering and the star-import threshold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportLayoutStyle {
    /// Package prefixes in the order their groups appear; imports not
    /// matching any prefix sort after the listed groups.
    #[serde(default = "default_import_groups")]
    pub groups: Vec<String>,
    /// Fold imports from one package into a star import once this many
    /// name the same package.
    #[serde(default = "default_star_threshold")]
    pub star_import_threshold: usize,
}

fn default_import_groups() -> Vec<String> {
    vec!["java".to_owned(), "javax".to_owned()]
}

fn default_star_threshold() -> usize {
    5
}

impl Default for ImportLayoutStyle {
    fn default() -> Self {
        Self {
            groups: default_import_groups(),
            star_import_threshold: default_star_threshold(),
        }
    }
}

/// The style records for one run. Each accessor answers "this style, or
/// its default" so callers never handle absence themselves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleSet {
    /// Indentation overrides.
    #[serde(default)]
    pub indentation: Option<IndentStyle>,
    /// Import layout overrides.
    #[serde(default)]
    pub imports: Option<ImportLayoutStyle>,
}

impl StyleSet {
    /// The indentation style, or the default.
    #[must_use]
    pub fn indent_style(&self) -> IndentStyle {
        self.indentation.unwrap_or_default()
    }

    /// The import layout style, or the default.
    #[must_use]
    pub fn import_style(&self) -> ImportLayoutStyle {
        self.imports.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let styles = StyleSet::default();
        assert_eq!(styles.indent_style().width, 4);
        assert!(!styles.indent_style().use_tabs);
        assert_eq!(styles.import_style().star_import_threshold, 5);
    }

    #[test]
    fn deserializes_partial_overrides() {
        let styles: StyleSet = toml::from_str(
            "[indentation]\nuse_tabs = true\n\n[imports]\nstar_import_threshold = 3\n",
        )
        .expect("parses");
        assert!(styles.indent_style().use_tabs);
        assert_eq!(styles.import_style().star_import_threshold, 3);
        // Unlisted keys still default.
        assert_eq!(styles.import_style().groups, vec!["java", "javax"]);
    }

    #[test]
    fn indent_for_scales_with_depth() {
        let spaces = IndentStyle::default();
        assert_eq!(spaces.indent_for(2), "        ");
        let tabs = IndentStyle {
            use_tabs: true,
            width: 4,
        };
        assert_eq!(tabs.indent_for(3), "\t\t\t");
    }
}
