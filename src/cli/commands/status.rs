//! `codex status` / `codex next` commands - Catalog progress

use console::style;
use miette::Result;

use crate::cli::helpers::open_project;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::catalog::Catalog;

pub fn run_status(global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project(global)?;
    let catalog = Catalog::for_project(&project, &config);
    let status = catalog.status().map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "total_images": status.total_images,
                "with_records": status.with_records,
                "pending": status.pending(),
                "resume_index": status.resume_index,
                "orphan_records": status.orphan_records,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Tsv => {
            println!(
                "{}\t{}\t{}\t{}",
                status.total_images, status.with_records, status.resume_index, status.orphan_records
            );
        }
        _ => {
            let width = 48;
            println!("{}", style("Character Catalog").bold().underlined());
            println!("{}", "═".repeat(width));
            println!("  Images:         {}", style(status.total_images).cyan());
            println!("  With records:   {}", style(status.with_records).green());
            println!("  Pending:        {}", style(status.pending()).yellow());
            if status.orphan_records > 0 {
                println!(
                    "  Orphan records: {} (run {})",
                    style(status.orphan_records).red(),
                    style("codex cleanup").yellow()
                );
            }
            println!();

            if status.is_complete() {
                println!("{} Every image has a record", style("✓").green().bold());
            } else {
                println!(
                    "Resume at image {} of {} ({})",
                    style(status.resume_index + 1).cyan(),
                    status.total_images,
                    style("codex next").yellow()
                );
            }
        }
    }

    Ok(())
}

pub fn run_next(global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project(global)?;
    let catalog = Catalog::for_project(&project, &config);
    let total = catalog.images().map_err(|e| miette::miette!("{}", e))?.len();

    match catalog.next_pending().map_err(|e| miette::miette!("{}", e))? {
        Some(pending) => match global.format {
            OutputFormat::Id => println!("{}", pending.id),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "index": pending.index,
                    "id": pending.id,
                    "path": pending.path,
                    "image_url": format!(
                        "{}{}",
                        config.image_url_prefix(),
                        pending.path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
                    ),
                });
                println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
            }
            _ => {
                println!(
                    "[{}/{}] {} {}",
                    pending.index + 1,
                    total,
                    style(&pending.id).cyan(),
                    style(pending.path.display()).dim()
                );
            }
        },
        None => {
            if !global.quiet {
                println!("{} Every image has a record", style("✓").green());
            }
        }
    }

    Ok(())
}
