//! `atp completions`: shell completion scripts for the `atp` binary.

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate, generate_to};

use crate::cli::{AppContext, Cli, CompletionsArgs};

const BIN_NAME: &str = "atp";

/// Where a script goes; stdout unless a directory was named
#[derive(Debug, PartialEq, Eq)]
enum Destination {
    Stdout,
    Dir(PathBuf),
}

impl From<&CompletionsArgs> for Destination {
    fn from(args: &CompletionsArgs) -> Self {
        match &args.out_dir {
            Some(dir) => Destination::Dir(dir.clone()),
            None => Destination::Stdout,
        }
    }
}

/// Render the script for `shell` into `out`
pub fn write_script(shell: Shell, out: &mut dyn Write) {
    generate(shell, &mut Cli::command(), BIN_NAME, out);
}

pub fn run(args: CompletionsArgs, ctx: &AppContext) -> Result<()> {
    match Destination::from(&args) {
        Destination::Stdout => {
            let mut out = io::stdout().lock();
            write_script(args.shell, &mut out);
            out.flush().context("Failed to write completion script")?;
        }
        Destination::Dir(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = generate_to(args.shell, &mut Cli::command(), BIN_NAME, &dir)
                .with_context(|| format!("Failed to write {} completions", args.shell))?;
            if !ctx.quiet {
                eprintln!("Wrote {} completions to {}", args.shell, path.display());
            }
        }
    }
    Ok(())
}
