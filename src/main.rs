use std::process::ExitCode;

use anyhow::Result;
use atpoint::{
    cli::{AppContext, Cli, Commands},
    core::AtPointError,
    infra::logging,
};
use clap::Parser;

fn run(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Root(args) => atpoint::cli_ext::root_cmd::run(args, ctx),
        Commands::Request(args) => atpoint::cli_ext::request_cmd::run(args, ctx),
        Commands::Pick(args) => atpoint::cli_ext::pick_cmd::run(args, ctx),
        Commands::Nearest(args) => atpoint::cli_ext::request_cmd::run_nearest(args, ctx),
        Commands::Init(args) => atpoint::infra::config::init(args, ctx),
        Commands::Completions(args) => atpoint::completion::run(args, ctx),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.no_color);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    match run(cli.command, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast::<AtPointError>() {
            Ok(diag) => {
                let code = diag.exit_code();
                eprintln!("{:?}", miette::Report::new(diag));
                ExitCode::from(code as u8)
            }
            Err(other) => {
                eprintln!("Error: {other:#}");
                ExitCode::FAILURE
            }
        },
    }
}
