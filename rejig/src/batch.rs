//! Batch processing: file discovery, parallel per-file passes, and
//! failure isolation.
//!
//! Parallelism lives here, at the file level, and only here: each file's
//! traversal is single-threaded, and a failed mutation on one file never
//! prevents the others from being processed.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;

use crate::format::AutoFormatVisitor;
use crate::parser;
use crate::recipes::{count_search_results, Recipe};
use crate::style::StyleSet;
use crate::tree::printer;
use crate::visitor::pass;

/// A suppression comment: files containing it are left untouched.
pub const SKIP_PRAGMA: &str = "rejig: skip-file";

/// The result of processing one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// The file processed.
    pub path: PathBuf,
    /// Whether the printed output differs from the input.
    pub changed: bool,
    /// Whether the file was skipped via the suppression pragma.
    pub skipped: bool,
    /// Search-result matches found by search-only recipes.
    pub search_hits: usize,
    /// The error that stopped this file, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The diff of the change, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl FileOutcome {
    fn clean(path: PathBuf) -> Self {
        Self {
            path,
            changed: false,
            skipped: false,
            search_hits: 0,
            error: None,
            diff: None,
        }
    }
}

/// Discovers source files under the given paths, honoring ignore files
/// and the configured exclude folders.
#[must_use]
pub fn collect_files(paths: &[PathBuf], exclude_folders: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        let mut builder = WalkBuilder::new(path);
        builder.standard_filters(true);
        for entry in builder.build().flatten() {
            let entry_path = entry.path();
            if entry_path.extension().is_some_and(|e| e == "java")
                && entry.file_type().is_some_and(|t| t.is_file())
                && !is_excluded(entry_path, exclude_folders)
            {
                files.push(entry_path.to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

fn is_excluded(path: &Path, exclude_folders: &[String]) -> bool {
    path.components().any(|component| {
        let name = component.as_os_str().to_string_lossy();
        exclude_folders.iter().any(|excluded| *excluded == name)
    })
}

/// Options for one batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Do not write changes back; report what would change.
    pub dry_run: bool,
    /// Produce diffs for changed files.
    pub with_diff: bool,
}

/// Runs the recipes over every file in parallel. Ordering of the result
/// matches the input file order.
#[must_use]
pub fn process_files(
    files: &[PathBuf],
    recipes: &[Box<dyn Recipe>],
    styles: &StyleSet,
    options: BatchOptions,
    on_done: impl Fn() + Sync,
) -> Vec<FileOutcome> {
    files
        .par_iter()
        .map(|path| {
            let outcome = process_one(path, recipes, styles, options);
            on_done();
            outcome
        })
        .collect()
}

/// Runs the recipes over one file. Each recipe pass (with its deferred
/// visitors) is followed by auto-format and a re-parse, so later recipes
/// always see a fully attributed tree.
fn process_one(
    path: &Path,
    recipes: &[Box<dyn Recipe>],
    styles: &StyleSet,
    options: BatchOptions,
) -> FileOutcome {
    let mut outcome = FileOutcome::clean(path.to_path_buf());

    let original = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            outcome.error = Some(format!("cannot read: {err}"));
            return outcome;
        }
    };
    if original.contains(SKIP_PRAGMA) {
        outcome.skipped = true;
        return outcome;
    }

    let mut current = original.clone();
    for recipe in recipes {
        let source_file = match parser::parse(&current, path) {
            Ok(parsed) => parsed,
            Err(err) => {
                outcome.error = Some(format!("parse error: {err}"));
                return outcome;
            }
        };
        let mut visitor = recipe.visitor();
        let cu = match pass::run(source_file.cu, &source_file.arena, visitor.as_mut()) {
            Ok(cu) => cu,
            Err(err) => {
                outcome.error = Some(format!("recipe {}: {err}", recipe.id()));
                return outcome;
            }
        };
        let mut format = AutoFormatVisitor::new(styles.indent_style());
        let cu = match pass::run(cu, &source_file.arena, &mut format) {
            Ok(cu) => cu,
            Err(err) => {
                outcome.error = Some(format!("auto-format: {err}"));
                return outcome;
            }
        };
        outcome.search_hits += count_search_results(&cu);
        current = printer::print(&cu);
    }

    if current != original {
        outcome.changed = true;
        if options.with_diff {
            outcome.diff = Some(crate::output::unified_diff(&original, &current));
        }
        if !options.dry_run {
            if let Err(err) = fs::write(path, &current) {
                outcome.error = Some(format!("cannot write: {err}"));
            }
        }
    }
    outcome
}
