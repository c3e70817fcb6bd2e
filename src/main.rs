use clap::Parser;
use miette::Result;
use sigbar::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
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

    // diagnostics go to stderr, controlled by RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary(args) => sigbar::cli::commands::summary::run(args),
        Commands::Run(args) => sigbar::cli::commands::run::run(args),
        Commands::Letters(args) => sigbar::cli::commands::letters::run(args),
        Commands::Annotate(args) => sigbar::cli::commands::annotate::run(args),
    }
}
