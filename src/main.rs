use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use codex::cli::commands;
use codex::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head` or `grep -q` causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Validate(args) => commands::validate::run(args, &global),
        Commands::Migrate(args) => commands::migrate::run(args, &global),
        Commands::New(args) => commands::new::run(args, &global),
        Commands::List(args) => commands::list::run(args, &global),
        Commands::Status => commands::status::run_status(&global),
        Commands::Next => commands::status::run_next(&global),
        Commands::Cleanup(args) => commands::cleanup::run(args, &global),
        Commands::Dupes(args) => commands::dupes::run(args, &global),
        Commands::Remove(args) => commands::remove::run(args, &global),
        Commands::Schema(cmd) => commands::schema::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Logs go to stderr so stdout stays pipeable. `CODEX_LOG` overrides the level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "codex=debug" } else { "codex=warn" };
    let filter = EnvFilter::try_from_env("CODEX_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
