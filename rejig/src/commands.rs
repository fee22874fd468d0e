//! Command execution: wiring configuration, recipes, and the batch
//! driver together.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::batch::{self, BatchOptions};
use crate::cli::{ListArgs, RunArgs};
use crate::config::Config;
use crate::output;
use crate::recipes::{
    builtin_descriptions, AddAnnotation, ChangeType, FindMethodUses, OrderImports, Recipe,
    RemoveAnnotation, RemoveUnusedImports, RenameMethod,
};

/// Builds recipe instances for the requested ids. Pattern compilation
/// happens here, so a malformed pattern fails the run before any file is
/// touched.
fn build_recipes(config: &Config, ids: &[String]) -> Result<Vec<Box<dyn Recipe>>> {
    let mut recipes: Vec<Box<dyn Recipe>> = Vec::with_capacity(ids.len());
    for id in ids {
        match id.as_str() {
            "rename-method" => {
                let options = config
                    .rejig
                    .rename_method
                    .as_ref()
                    .context("rename-method requires [rejig.rename_method] configuration")?;
                let recipe = RenameMethod::new(&options.pattern, options.new_name.as_str())
                    .with_context(|| format!("invalid pattern for {id}"))?;
                recipes.push(Box::new(recipe));
            }
            "add-annotation" => {
                let options = config
                    .rejig
                    .add_annotation
                    .as_ref()
                    .context("add-annotation requires [rejig.add_annotation] configuration")?;
                let recipe = AddAnnotation::new(
                    &options.method_pattern,
                    options.annotation.clone(),
                    options.annotation_type.clone(),
                )
                .with_context(|| format!("invalid pattern for {id}"))?;
                recipes.push(Box::new(recipe));
            }
            "remove-annotation" => {
                let options = config
                    .rejig
                    .remove_annotation
                    .as_ref()
                    .context("remove-annotation requires [rejig.remove_annotation] configuration")?;
                let recipe = RemoveAnnotation::new(&options.pattern)
                    .with_context(|| format!("invalid pattern for {id}"))?;
                recipes.push(Box::new(recipe));
            }
            "change-type" => {
                let options = config
                    .rejig
                    .change_type
                    .as_ref()
                    .context("change-type requires [rejig.change_type] configuration")?;
                recipes.push(Box::new(ChangeType::new(
                    options.old_type.clone(),
                    options.new_type.clone(),
                )));
            }
            "order-imports" => {
                recipes.push(Box::new(OrderImports::new(config.style.import_style())));
            }
            "remove-unused-imports" => {
                recipes.push(Box::new(RemoveUnusedImports));
            }
            "find-method" => {
                let options = config
                    .rejig
                    .find_method
                    .as_ref()
                    .context("find-method requires [rejig.find_method] configuration")?;
                let recipe = FindMethodUses::new(&options.pattern)
                    .with_context(|| format!("invalid pattern for {id}"))?;
                recipes.push(Box::new(recipe));
            }
            other => bail!("unknown recipe id {other:?}; see `rejig list`"),
        }
    }
    Ok(recipes)
}

/// Executes `rejig run`. Returns the process exit code.
pub fn run(args: &RunArgs) -> Result<i32> {
    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("cannot load configuration from {}", path.display()))?,
        None => {
            let root = paths
                .first()
                .map(|p| if p.is_dir() { p.clone() } else { PathBuf::from(".") })
                .unwrap_or_else(|| PathBuf::from("."));
            Config::load(&root)
        }
    };

    let ids: Vec<String> = if args.recipes.is_empty() {
        config.rejig.recipes.clone().unwrap_or_default()
    } else {
        args.recipes.clone()
    };
    if ids.is_empty() {
        bail!("no recipes selected; pass --recipe or set [rejig] recipes in .rejig.toml");
    }
    let recipes = build_recipes(&config, &ids)?;

    let exclude = config.rejig.exclude_folders.clone().unwrap_or_default();
    let files = batch::collect_files(&paths, &exclude);
    if files.is_empty() {
        println!("no source files found");
        return Ok(0);
    }

    let bar = output::progress_bar(files.len() as u64, args.output.json);
    let options = BatchOptions {
        dry_run: args.dry_run,
        with_diff: args.output.diff || args.output.json,
    };
    let outcomes = batch::process_files(&files, &recipes, &config.style, options, || {
        bar.inc(1);
    });
    bar.finish_and_clear();

    let changed = outcomes.iter().filter(|o| o.changed).count();
    let errors = outcomes.iter().filter(|o| o.error.is_some()).count();

    if args.output.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            output::print_outcome(outcome, args.output.verbose);
            if args.output.diff {
                if let Some(diff) = &outcome.diff {
                    print!("{diff}");
                }
            }
        }
        output::print_summary(outcomes.len(), changed, errors, args.dry_run);
    }

    if errors > 0 || (args.dry_run && changed > 0) {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Executes `rejig list`. Returns the process exit code.
pub fn list(args: &ListArgs) -> Result<i32> {
    let rows = builtin_descriptions();
    if args.json {
        let as_json: Vec<serde_json::Value> = rows
            .iter()
            .map(|(id, category, description)| {
                serde_json::json!({
                    "id": id,
                    "category": category,
                    "description": description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&as_json)?);
    } else {
        println!("{}", output::recipe_table(&rows));
    }
    Ok(0)
}
