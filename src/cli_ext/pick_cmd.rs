//! CLI handler for `atp pick`: apply a preselect key to candidate lines.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use serde_json::json;

use crate::{
    cli::{AppContext, OutputFormat, PickArgs},
    core::preselect::PreselectKey,
};

/// First candidate (1-based index, text) the key selects; the whole
/// list is read first, the way a picker receives it
pub fn pick_from<R: BufRead>(
    key: &PreselectKey,
    input: R,
) -> Result<Option<(usize, String)>>
{
    let candidates = input
        .lines()
        .enumerate()
        .map(|(i, line)| line.with_context(|| format!("Failed to read candidate {}", i + 1)))
        .collect::<Result<Vec<String>>>()?;

    let hit = key.find_in(candidates.iter().map(String::as_str));
    Ok(hit.map(|i| (i + 1, candidates[i].clone())))
}

pub fn run(args: PickArgs, _ctx: &AppContext) -> Result<()> {
    let key = PreselectKey::new(args.key);
    let hit = pick_from(&key, io::stdin().lock())?;

    match args.format {
        OutputFormat::Json => {
            let output = match &hit {
                Some((index, candidate)) => json!({ "index": index, "candidate": candidate }),
                None => json!(null),
            };
            println!("{output}");
        }
        OutputFormat::Text => {
            if let Some((index, candidate)) = hit {
                println!("{index}\t{candidate}");
            }
        }
    }

    Ok(())
}
