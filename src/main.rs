use clap::Parser;
use gearkit::cli::{Cli, Commands};
use gearkit::cli::commands;
use miette::Result;

fn main() -> Result<()> {
    // Terminate silently on broken pipes (`gear item list | head`)
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
    gearkit::core::logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &global),
        Commands::Item(cmd) => commands::item::run(cmd, &global),
        Commands::Tag(cmd) => commands::tag::run(cmd, &global),
        Commands::Pack(cmd) => commands::pack::run(cmd, &global),
        Commands::Brand(args) => commands::brand::run(args, &global),
        Commands::Check(args) => commands::check::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
