//! CLI handler for `atp root`.

use anyhow::Result;

use crate::{
    cli::{AppContext, RootArgs},
    core::{dispatch::Dispatcher, dispatch::Strategies},
    infra::config::load_config,
};

pub fn run(args: RootArgs, _ctx: &AppContext) -> Result<()> {
    let cfg = load_config()?;
    let dispatcher = Dispatcher::new(Strategies::from_config(&cfg));
    let root = dispatcher.resolve_root(args.file.as_deref());
    println!("{}", root.display());
    Ok(())
}
