//! `codex init` command - Initialize a new codex project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::config::{Config, DEFAULT_CONTENT_DIR, DEFAULT_IMAGE_DIR};
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .codex/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            let config = Config::default();
            println!(
                "{} Initialized codex project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            println!("  .codex/config.yaml");
            println!("  {}/", DEFAULT_CONTENT_DIR);
            println!("  {}/", DEFAULT_IMAGE_DIR);
            println!();
            println!("Next steps:");
            println!(
                "  Copy character images into {}",
                style(project.images_dir(&config).display()).cyan()
            );
            println!("  {} Show what still needs a record", style("codex status").yellow());
            println!("  {} Validate records", style("codex validate").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} codex project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("codex init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
