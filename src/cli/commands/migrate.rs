//! `codex migrate` command - Rewrite legacy records in the current schema

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, open_project};
use crate::cli::GlobalOpts;
use crate::core::loader::{record_files, write_record, RecordLoader};
use crate::core::SchemaVersion;
use crate::entities::migrate::MigrationOptions;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::Validator;

#[derive(clap::Args, Debug)]
pub struct MigrateArgs {
    /// Record files to migrate (default: every record in the project)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Grade written into migrated records
    #[arg(long, default_value_t = 1)]
    pub grade: u64,

    /// Release date written into migrated records (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    pub release_date: String,
}

pub fn run(args: MigrateArgs, global: &GlobalOpts) -> Result<()> {
    let (files, config) = if args.paths.is_empty() {
        let (project, config) = open_project(global)?;
        (record_files(&project.records_dir(&config)), config)
    } else {
        (args.paths.clone(), load_config(global))
    };

    let registry = SchemaRegistry::default();
    let validator = Validator::new(&registry);
    let options = MigrationOptions {
        grade: args.grade,
        release_date: args.release_date.clone(),
        default_affiliation: config.default_affiliation(),
    };
    let loader = RecordLoader::new(&validator)
        .with_options(options)
        .with_fallback(config.schema_version());

    let mut migrated = 0;
    let mut current = 0;
    let mut failed = 0;

    for path in &files {
        let record = match loader.load(path) {
            Ok(r) => r,
            Err(e) => {
                failed += 1;
                println!("{} {} - cannot migrate", style("✗").red(), path.display());
                println!("{:?}", miette::Report::new(e));
                continue;
            }
        };

        if !record.is_legacy() {
            current += 1;
            if !global.quiet {
                println!(
                    "{} {} already {}",
                    style("·").dim(),
                    path.display(),
                    record.version
                );
            }
            continue;
        }

        // Placeholders must still satisfy the current schema before anything is written
        let value = serde_json::to_value(&record.character)
            .map_err(|e| miette::miette!("Failed to serialize {}: {}", path.display(), e))?;
        let filename = path.display().to_string();
        if let Err(e) = validator.validate_value(&value, &filename, SchemaVersion::current()) {
            failed += 1;
            println!("{} {} - migrated record is invalid", style("✗").red(), path.display());
            println!("{:?}", miette::Report::new(e));
            continue;
        }

        if args.dry_run {
            println!(
                "{} would migrate {} ({} → {})",
                style("→").blue(),
                path.display(),
                record.version,
                SchemaVersion::current()
            );
        } else {
            write_record(path, &record.character)
                .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e))?;
            tracing::info!(path = %path.display(), "migrated record");
            println!(
                "{} Migrated {} ({})",
                style("✓").green(),
                path.display(),
                style(record.character.display_name()).cyan()
            );
        }
        migrated += 1;
    }

    println!();
    let verb = if args.dry_run { "Would migrate" } else { "Migrated" };
    println!(
        "{} {} record(s), {} already current, {} failed",
        verb,
        style(migrated).green(),
        style(current).dim(),
        style(failed).red()
    );

    if failed > 0 {
        Err(miette::miette!("{} record(s) could not be migrated", failed))
    } else {
        Ok(())
    }
}
