//! Rich CLI output: colored status lines, progress, tables, and diffs.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::FileOutcome;

/// A progress bar for a batch run, or a hidden one in quiet/JSON mode.
#[must_use]
pub fn progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Prints one file outcome as a colored status line.
pub fn print_outcome(outcome: &FileOutcome, verbose: bool) {
    let path = outcome.path.display();
    if let Some(error) = &outcome.error {
        println!("{} {path}: {error}", "error".red().bold());
    } else if outcome.skipped {
        if verbose {
            println!("{} {path}", "skip".yellow());
        }
    } else if outcome.changed {
        println!("{} {path}", "fix".green().bold());
    } else if verbose {
        println!("{} {path}", "ok".dimmed());
    }
    if outcome.search_hits > 0 {
        println!(
            "{} {path}: {} match(es)",
            "found".cyan().bold(),
            outcome.search_hits
        );
    }
}

/// Prints the end-of-run summary line.
pub fn print_summary(total: usize, changed: usize, errors: usize, dry_run: bool) {
    let verb = if dry_run { "would change" } else { "changed" };
    let mut line = format!("{total} file(s) scanned, {changed} {verb}");
    if errors > 0 {
        line.push_str(&format!(", {errors} error(s)"));
    }
    if errors > 0 {
        println!("{}", line.red());
    } else if changed > 0 {
        println!("{}", line.green());
    } else {
        println!("{}", line.dimmed());
    }
}

/// Renders the recipe listing table.
#[must_use]
pub fn recipe_table(rows: &[(&str, &str, &str)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["id", "category", "description"]);
    for (id, category, description) in rows {
        table.add_row(vec![Cell::new(id), Cell::new(category), Cell::new(description)]);
    }
    table
}

/// A minimal line diff: common prefix and suffix are elided, the changed
/// middle is shown as removals then additions with a little context.
#[must_use]
pub fn unified_diff(old: &str, new: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let common_prefix = old_lines
        .iter()
        .zip(&new_lines)
        .take_while(|(a, b)| a == b)
        .count();
    let max_suffix = old_lines.len().min(new_lines.len()) - common_prefix;
    let common_suffix = old_lines
        .iter()
        .rev()
        .zip(new_lines.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
        .min(max_suffix);

    let mut out = String::new();
    let context_start = common_prefix.saturating_sub(2);
    for line in &old_lines[context_start..common_prefix] {
        out.push_str(&format!("  {line}\n"));
    }
    for line in &old_lines[common_prefix..old_lines.len() - common_suffix] {
        out.push_str(&format!("{}\n", format!("- {line}").red()));
    }
    for line in &new_lines[common_prefix..new_lines.len() - common_suffix] {
        out.push_str(&format!("{}\n", format!("+ {line}").green()));
    }
    let context_end = (old_lines.len() - common_suffix + 2).min(old_lines.len());
    for line in &old_lines[old_lines.len() - common_suffix..context_end] {
        out.push_str(&format!("  {line}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_shows_only_changed_middle() {
        colored::control::set_override(false);
        let old = "a\nb\nc\nd\n";
        let new = "a\nB\nc\nd\n";
        let diff = unified_diff(old, new);
        assert!(diff.contains("- b"));
        assert!(diff.contains("+ B"));
        assert!(!diff.contains("- a"));
        colored::control::unset_override();
    }

    #[test]
    fn identical_inputs_produce_no_markers() {
        colored::control::set_override(false);
        let diff = unified_diff("same\n", "same\n");
        assert!(!diff.contains('-'));
        assert!(!diff.contains('+'));
        colored::control::unset_override();
    }
}
