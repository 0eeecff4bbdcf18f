//! `codex list` command - List records

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_tsv, open_project, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::loader::{LoadedRecord, RecordLoader};
use crate::entities::migrate::MigrationOptions;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::Validator;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only records with this affiliation
    #[arg(long, short = 'a')]
    pub affiliation: Option<String>,

    /// Only records with this keyword
    #[arg(long, short = 'k')]
    pub keyword: Option<String>,

    /// Only base identities
    #[arg(long = "default")]
    pub default_only: bool,

    /// Only records still in a legacy schema version
    #[arg(long)]
    pub legacy: bool,
}

impl ListArgs {
    fn matches(&self, record: &LoadedRecord) -> bool {
        let c = &record.character;
        if let Some(affiliation) = &self.affiliation {
            if !c.affiliation.iter().any(|a| a == affiliation) {
                return false;
            }
        }
        if let Some(keyword) = &self.keyword {
            if !c.keywords.iter().any(|k| k == keyword) {
                return false;
            }
        }
        if self.default_only && !c.is_default {
            return false;
        }
        if self.legacy && !record.is_legacy() {
            return false;
        }
        true
    }
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project(global)?;

    let registry = SchemaRegistry::default();
    let validator = Validator::new(&registry);
    let loader = RecordLoader::new(&validator)
        .with_options(MigrationOptions {
            default_affiliation: config.default_affiliation(),
            ..Default::default()
        })
        .with_fallback(config.schema_version());

    let (loaded, failed) = loader.load_dir(&project.records_dir(&config));
    for (path, e) in &failed {
        eprintln!(
            "{} Skipping {}: {}",
            style("!").yellow(),
            path.display(),
            e
        );
    }

    let records: Vec<LoadedRecord> = loaded.into_iter().filter(|r| args.matches(r)).collect();

    if records.is_empty() {
        match global.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Id => {}
            _ => {
                println!("No records found.");
                println!();
                println!("Create one with: {}", style("codex new").yellow());
            }
        }
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            let characters: Vec<_> = records.iter().map(|r| &r.character).collect();
            let json = serde_json::to_string_pretty(&characters).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Tsv => {
            println!("id\tcharacterName\tidentityName\tgrade\treleaseDate\taffiliation\tversion");
            for record in &records {
                let c = &record.character;
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    c.id,
                    escape_tsv(&c.character_name),
                    escape_tsv(&c.identity_name),
                    c.grade,
                    c.release_date,
                    escape_tsv(&c.affiliation.join(", ")),
                    record.version
                );
            }
        }
        OutputFormat::Id => {
            for record in &records {
                println!("{}", record.character.id);
            }
        }
        OutputFormat::Auto | OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["ID", "Name", "Grade", "Released", "Keywords", "Affiliation", "Ver"]);

            for record in &records {
                let c = &record.character;
                let version = if record.is_legacy() {
                    format!("{}*", record.version)
                } else {
                    record.version.to_string()
                };
                builder.push_record([
                    c.id.clone(),
                    truncate_str(&c.display_name(), 36),
                    c.grade.to_string(),
                    c.release_date.clone(),
                    truncate_str(&c.keywords.join(", "), 24),
                    truncate_str(&c.affiliation.join(", "), 24),
                    version,
                ]);
            }
            println!("{}", builder.build().with(Style::psql()));

            println!();
            println!("{} record(s) found", style(records.len()).cyan());
            if records.iter().any(|r| r.is_legacy()) {
                println!(
                    "{} marks legacy records; run {} to upgrade them",
                    style("*").yellow(),
                    style("codex migrate").yellow()
                );
            }
        }
    }

    Ok(())
}
