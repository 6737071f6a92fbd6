use clap::Parser;
use crmkit::cli::{Cli, Commands};
use miette::Result;

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

    match cli.command {
        Commands::Contact(cmd) => crmkit::cli::commands::contact::run(cmd, &global),
        Commands::Company(cmd) => crmkit::cli::commands::company::run(cmd, &global),
        Commands::Opp(cmd) => crmkit::cli::commands::opp::run(cmd, &global),
        Commands::Activity(cmd) => crmkit::cli::commands::activity::run(cmd, &global),
        Commands::Expense(cmd) => crmkit::cli::commands::expense::run(cmd, &global),
        Commands::Competitor(cmd) => crmkit::cli::commands::competitor::run(cmd, &global),
        Commands::Lead(cmd) => crmkit::cli::commands::lead::run(cmd, &global),
        Commands::Import(args) => crmkit::cli::commands::import::run(args, &global),
        Commands::Stats(args) => crmkit::cli::commands::stats::run(args, &global),
        Commands::Completions(args) => crmkit::cli::commands::completions::run(args),
    }
}
