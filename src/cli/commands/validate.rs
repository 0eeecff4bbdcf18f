//! `codex validate` command - Validate records against their schema

use console::style;
use miette::Result;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::loader::write_value;
use crate::core::{Config, Project, SchemaVersion};
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::Validator;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate (default: the records directory)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Validate against this schema version instead of detecting it
    #[arg(long, short = 's')]
    pub schema: Option<SchemaVersion>,

    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Continue validation after first error
    #[arg(long)]
    pub keep_going: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,

    /// Write declared defaults into records that omit them
    #[arg(long)]
    pub fix: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
    files_fixed: usize,
    legacy_files: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let registry = SchemaRegistry::default();
    let validator = Validator::new(&registry);

    let (files_to_validate, config) = if args.paths.is_empty() {
        let project =
            Project::open(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load_for(Some(&project));
        (expand_paths(&[project.records_dir(&config)]), config)
    } else {
        (expand_paths(&args.paths), load_config(global))
    };

    let mut stats = ValidationStats::default();
    let mut had_error = false;

    if !global.quiet {
        println!(
            "{} Validating {} file(s) in collection '{}'...\n",
            style("→").blue(),
            files_to_validate.len(),
            validator.collection()
        );
    }

    for path in &files_to_validate {
        stats.files_checked += 1;

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                if !args.summary {
                    println!("{} {} - {}", style("✗").red(), path.display(), e);
                }
                stats.files_failed += 1;
                stats.total_errors += 1;
                had_error = true;
                if !args.keep_going {
                    break;
                }
                continue;
            }
        };

        let filename = path.display().to_string();
        let version = args.schema.unwrap_or_else(|| {
            serde_json::from_str::<JsonValue>(&content)
                .ok()
                .and_then(|v| SchemaVersion::detect(&v))
                .unwrap_or_else(|| config.schema_version())
        });
        if version != SchemaVersion::current() {
            stats.legacy_files += 1;
        }

        match validator.iter_errors(&content, &filename, version) {
            Ok(result) => {
                if args.fix {
                    fix_defaults(&validator, &content, path, version, &mut stats)?;
                }

                if result.warnings.is_empty() {
                    stats.files_passed += 1;
                    if !args.summary {
                        println!(
                            "{} {} ({})",
                            style("✓").green(),
                            path.display(),
                            version
                        );
                    }
                } else {
                    stats.total_warnings += result.warnings.len();
                    if !args.summary {
                        println!(
                            "{} {} - {} warning(s)",
                            style("!").yellow(),
                            path.display(),
                            result.warnings.len()
                        );
                        for issue in &result.warnings {
                            println!("    {}", style(issue).yellow());
                        }
                    }
                    if args.strict {
                        stats.files_failed += 1;
                        had_error = true;
                    } else {
                        stats.files_passed += 1;
                    }
                }
            }
            Err(e) => {
                stats.files_failed += 1;
                stats.total_errors += e.violation_count();
                had_error = true;

                if !args.summary {
                    println!(
                        "{} {} - {} error(s)",
                        style("✗").red(),
                        path.display(),
                        e.violation_count()
                    );

                    // Print detailed error using miette
                    let report = miette::Report::new(e);
                    println!("{:?}", report);
                }

                if !args.keep_going {
                    break;
                }
            }
        }
    }

    if !global.quiet {
        println!();
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", style("Validation Summary").bold());
        println!("{}", style("─".repeat(60)).dim());
        println!("  Files checked:  {}", style(stats.files_checked).cyan());
        println!("  Files passed:   {}", style(stats.files_passed).green());
        println!("  Files failed:   {}", style(stats.files_failed).red());
        println!("  Total errors:   {}", style(stats.total_errors).red());

        if stats.total_warnings > 0 {
            println!("  Total warnings: {}", style(stats.total_warnings).yellow());
        }

        if stats.legacy_files > 0 {
            println!(
                "  Legacy records: {} (run {} to upgrade)",
                style(stats.legacy_files).yellow(),
                style("codex migrate").yellow()
            );
        }

        if stats.files_fixed > 0 {
            println!("  Files fixed:    {}", style(stats.files_fixed).cyan());
        }

        println!();
    }

    if had_error {
        if stats.files_failed == 1 {
            Err(miette::miette!("Validation failed: 1 file has errors"))
        } else {
            Err(miette::miette!(
                "Validation failed: {} files have errors",
                stats.files_failed
            ))
        }
    } else {
        if !global.quiet {
            println!("{} All files passed validation!", style("✓").green().bold());
        }
        Ok(())
    }
}

/// Rewrite a valid record with its declared defaults filled in
fn fix_defaults(
    validator: &Validator,
    content: &str,
    path: &Path,
    version: SchemaVersion,
    stats: &mut ValidationStats,
) -> Result<()> {
    let original: JsonValue = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(_) => return Ok(()), // Already reported by schema validation
    };

    let mut resolved = original.clone();
    validator.apply_defaults(&mut resolved, version);

    if resolved != original {
        write_value(path, &resolved)
            .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "wrote resolved defaults");
        stats.files_fixed += 1;
    }

    Ok(())
}

/// Expand paths - if a directory is given, find all .json files in it
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| {
                    let name = e.file_name().to_string_lossy();
                    !name.starts_with('.') || e.depth() == 0
                })
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                if entry.path().extension().map_or(false, |e| e == "json") {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if path.exists() {
            files.push(path.clone());
        }
    }

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_expand_paths_walks_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("nested/b.json"), "{}").unwrap();
        fs::write(dir.path().join(".hidden/c.json"), "{}").unwrap();
        fs::write(dir.path().join("readme.md"), "").unwrap();

        let files = expand_paths(&[dir.path().to_path_buf()]);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_fix_defaults_writes_image_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.json");
        let content = r#"{"id": "a", "characterName": "Yi Sang"}"#;
        fs::write(&path, content).unwrap();

        let validator = Validator::default();
        let mut stats = ValidationStats::default();
        fix_defaults(&validator, content, &path, SchemaVersion::V2, &mut stats).unwrap();

        assert_eq!(stats.files_fixed, 1);
        let written: JsonValue = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["imagePosition"], "center");
        assert_eq!(written["characterName"], "Yi Sang");
    }
}
