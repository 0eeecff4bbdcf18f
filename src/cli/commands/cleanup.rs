//! `codex cleanup` command - Delete records whose image is gone

use console::style;
use miette::Result;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::catalog::Catalog;

#[derive(clap::Args, Debug)]
pub struct CleanupArgs {
    /// List orphan records without deleting them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: CleanupArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project(global)?;
    let catalog = Catalog::for_project(&project, &config);

    let removed = catalog
        .cleanup(args.dry_run)
        .map_err(|e| miette::miette!("{}", e))?;

    if removed.is_empty() {
        if !global.quiet {
            println!("{} No orphan records", style("✓").green());
        }
        return Ok(());
    }

    for id in &removed {
        if args.dry_run {
            println!("{} would remove {}", style("→").blue(), style(id).cyan());
        } else {
            println!("{} Removed {}", style("✓").green(), style(id).cyan());
        }
    }

    println!();
    if args.dry_run {
        println!(
            "{} orphan record(s); run without {} to delete",
            style(removed.len()).yellow(),
            style("--dry-run").yellow()
        );
    } else {
        println!("Removed {} orphan record(s)", style(removed.len()).green());
    }

    Ok(())
}
