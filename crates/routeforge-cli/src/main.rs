// RouteForge CLI entry point

use clap::Parser;
use routeforge_cli::{output, run, Cli, CliError};

fn main() {
    if let Err(err) = try_main() {
        let message = match err.downcast_ref::<CliError>() {
            Some(cli_error) => cli_error.user_message(),
            None => format!("{:#}", err),
        };
        output::print_error(&message);
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(&cli)?;
    Ok(())
}
