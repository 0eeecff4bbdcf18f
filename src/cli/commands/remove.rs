//! `codex remove` command - Delete an image and its record

use console::style;
use miette::Result;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::catalog::Catalog;

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Record id (the image file stem)
    pub id: String,
}

pub fn run(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project(global)?;
    let catalog = Catalog::for_project(&project, &config);

    let removed = catalog
        .remove(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;

    for image in &removed.images {
        println!("{} Deleted {}", style("✓").green(), image.display());
    }
    match &removed.record {
        Some(record) => println!("{} Deleted {}", style("✓").green(), record.display()),
        None => println!("{} {} had no record", style("!").yellow(), style(&args.id).cyan()),
    }

    Ok(())
}
