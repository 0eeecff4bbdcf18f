//! `codex dupes` command - Find byte-identical images

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::open_project;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::Catalog;

#[derive(clap::Args, Debug)]
pub struct DupesArgs {
    /// Compare images in this directory against the catalog instead of the catalog against itself
    #[arg()]
    pub dir: Option<PathBuf>,
}

pub fn run(args: DupesArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project(global)?;
    let catalog = Catalog::for_project(&project, &config);

    if let Some(dir) = &args.dir {
        if !dir.is_dir() {
            return Err(miette::miette!("Not a directory: {}", dir.display()));
        }
    }

    let groups = catalog
        .duplicates(args.dir.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Json => {
            let json: Vec<_> = groups
                .iter()
                .map(|g| {
                    serde_json::json!({
                        "hash": g.hash,
                        "original": g.original,
                        "duplicates": g.duplicates,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Tsv | OutputFormat::Id => {
            for group in &groups {
                for dup in &group.duplicates {
                    println!("{}\t{}", dup.display(), group.original.display());
                }
            }
        }
        _ => {
            if groups.is_empty() {
                println!("{} No duplicate images", style("✓").green());
                return Ok(());
            }
            for group in &groups {
                println!(
                    "{} {}",
                    style(&group.hash[..12.min(group.hash.len())]).dim(),
                    style(group.original.display()).cyan()
                );
                for dup in &group.duplicates {
                    println!("    {} {}", style("=").yellow(), dup.display());
                }
            }
            let count: usize = groups.iter().map(|g| g.duplicates.len()).sum();
            println!();
            println!("{} duplicate image(s) found", style(count).yellow());
        }
    }

    Ok(())
}
