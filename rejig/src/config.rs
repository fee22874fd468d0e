//! Configuration loading from `.rejig.toml`.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::style::StyleSet;

/// The configuration file name looked up in the project root.
pub const CONFIG_FILENAME: &str = ".rejig.toml";

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section.
    pub rejig: RejigConfig,
    #[serde(default)]
    /// Style records consumed by formatting and import ordering.
    pub style: StyleSet,
    /// The path this configuration was loaded from. `None` when defaults
    /// or programmatic configuration are in use.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Options for a run: which recipes, over which files.
pub struct RejigConfig {
    /// Recipe ids to run, in order.
    pub recipes: Option<Vec<String>>,
    /// Folders to exclude from discovery.
    pub exclude_folders: Option<Vec<String>>,
    /// Options for the rename-method recipe.
    pub rename_method: Option<RenameMethodConfig>,
    /// Options for the add-annotation recipe.
    pub add_annotation: Option<AddAnnotationConfig>,
    /// Options for the remove-annotation recipe.
    pub remove_annotation: Option<RemoveAnnotationConfig>,
    /// Options for the change-type recipe.
    pub change_type: Option<ChangeTypeConfig>,
    /// Options for the find-method recipe.
    pub find_method: Option<FindMethodConfig>,
}

#[derive(Debug, Deserialize, Clone)]
/// `[rejig.rename_method]` options.
pub struct RenameMethodConfig {
    /// The method pattern to match.
    pub pattern: String,
    /// The replacement method name.
    pub new_name: String,
}

#[derive(Debug, Deserialize, Clone)]
/// `[rejig.add_annotation]` options.
pub struct AddAnnotationConfig {
    /// The method pattern selecting the declarations to annotate.
    pub method_pattern: String,
    /// The annotation as it should appear in source, e.g. `@Deprecated`.
    pub annotation: String,
    /// The fully qualified annotation type, for imports and idempotence.
    pub annotation_type: String,
}

#[derive(Debug, Deserialize, Clone)]
/// `[rejig.remove_annotation]` options.
pub struct RemoveAnnotationConfig {
    /// The annotation pattern to match.
    pub pattern: String,
}

#[derive(Debug, Deserialize, Clone)]
/// `[rejig.change_type]` options.
pub struct ChangeTypeConfig {
    /// The fully qualified type to replace.
    pub old_type: String,
    /// The fully qualified replacement type.
    pub new_type: String,
}

#[derive(Debug, Deserialize, Clone)]
/// `[rejig.find_method]` options.
pub struct FindMethodConfig {
    /// The method pattern to search for.
    pub pattern: String,
}

impl Config {
    /// Loads configuration from `.rejig.toml` under the given root, or
    /// returns defaults when the file does not exist.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        let path = root.join(CONFIG_FILENAME);
        Self::load_from_path(&path).unwrap_or_default()
    }

    /// Loads configuration from an explicit path.
    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.config_file_path = Some(path.to_path_buf());
                Some(config)
            }
            Err(err) => {
                eprintln!("warning: ignoring malformed {}: {err}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_defaults() {
        let config: Config = toml::from_str("").expect("parses");
        assert!(config.rejig.recipes.is_none());
        assert_eq!(config.style.indent_style().width, 4);
    }

    #[test]
    fn full_config_round_trips() {
        let config: Config = toml::from_str(
            r#"
[rejig]
recipes = ["rename-method", "order-imports"]
exclude_folders = ["build"]

[rejig.rename_method]
pattern = "com.foo.Bar doThing(int, String)"
new_name = "doSomething"

[style.indentation]
width = 2
"#,
        )
        .expect("parses");
        assert_eq!(
            config.rejig.recipes.as_deref(),
            Some(&["rename-method".to_owned(), "order-imports".to_owned()][..])
        );
        let rename = config.rejig.rename_method.expect("present");
        assert_eq!(rename.new_name, "doSomething");
        assert_eq!(config.style.indent_style().width, 2);
    }
}
