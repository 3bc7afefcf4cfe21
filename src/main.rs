use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use animap::cli::{Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
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
    init_tracing(&global);

    match cli.command {
        Commands::Lookup(args) => animap::cli::commands::lookup::run(args, &global),
        Commands::Dupes(args) => animap::cli::commands::dupes::run(args, &global),
        Commands::Analyze(args) => animap::cli::commands::analyze::run(args, &global),
        Commands::Db(cmd) => animap::cli::commands::db::run(cmd, &global),
        Commands::Config(cmd) => animap::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => animap::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `ANIMAP_LOG` overrides the level picked from -v/-q
fn init_tracing(global: &GlobalOpts) {
    let default = if global.verbose {
        "animap=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("ANIMAP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
