//! CLI handlers for `atp request` and `atp nearest`.
//!
//! The binary never runs a search tool. `request` goes through the same
//! dispatch path an editor integration would, with a provider that only
//! asks the picker once, and prints what the picker would have received.

use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::json;
use tracing::instrument;

use crate::{
    cli::{AppContext, CursorArgs, NearestArgs, OutputFormat, RequestArgs},
    core::{
        backend::Backend,
        dispatch::{Dispatcher, JsonlSymbols, NoSymbols, SearchProvider, SearchRequest, Strategies, SymbolSource},
        editor::EditorState,
        nearest::{flatten, load_index, select_nearest_entry},
        picker::{PickerEntry, PickerOptions},
        preselect::PreselectKey,
    },
    infra::config::load_config,
};

/// Provider that hands its caller options to the picker and nothing else
struct PlanProvider;

impl SearchProvider for PlanProvider
{
    fn search(
        &mut self,
        request: &SearchRequest,
        picker: &mut PickerEntry<'_>,
    ) -> Result<Option<String>>
    {
        let opts = PickerOptions {
            prompt: Some(format!("{}: ", request.backend)),
            initial_input: (!request
                .seed_text
                .is_empty())
            .then(|| {
                request
                    .seed_text
                    .clone()
            }),
            caller: Some(format!("atp-{}", request.backend)),
            preselect: None,
        };
        picker.read(&[], opts)
    }
}

/// Byte offset for the cursor flags; no flags means the buffer start
pub fn cursor_offset(
    text: &str,
    cursor: &CursorArgs,
) -> Result<usize>
{
    if let Some(offset) = cursor.offset
    {
        return Ok(offset);
    }

    match cursor.line
    {
        Some(line) => EditorState::offset_of(text, line, cursor.column.unwrap_or(0))
            .ok_or_else(|| anyhow::anyhow!("line {line} is outside the buffer")),
        None => Ok(0),
    }
}

fn read_buffer(file: Option<&Path>) -> Result<String>
{
    match file
    {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read buffer file: {}", path.display())),
        None => io::read_to_string(io::stdin()).context("Failed to read buffer from stdin"),
    }
}

fn label(
    ctx: &AppContext,
    name: &str,
) -> String
{
    let name = format!("{name}:");
    if ctx.no_color
    {
        name
    }
    else
    {
        name.bold()
            .to_string()
    }
}

#[instrument(skip_all, fields(backend = %args.backend))]
pub fn run(
    args: RequestArgs,
    ctx: &AppContext,
) -> Result<()>
{
    // Unknown names abort before any file is read
    let backend: Backend = args
        .backend
        .parse()?;

    let mut cfg = load_config()?;
    if let Some(thing) = args.thing
    {
        cfg.seed
            .thing = thing;
    }
    if let Some(precedence) = args.precedence
    {
        cfg.picker
            .precedence = precedence;
    }

    let text = read_buffer(
        args.file
            .as_deref(),
    )?;
    let cursor = cursor_offset(&text, &args.cursor)?;

    let mut state = EditorState::new(text, cursor);
    state.file = args.file;
    state.selection = args.selection;

    let symbols: Box<dyn SymbolSource> = match args.index
    {
        Some(path) => Box::new(JsonlSymbols(path)),
        None => Box::new(NoSymbols),
    };

    let dispatcher = Dispatcher::new(Strategies::from_config(&cfg));
    let mut seen: Option<PickerOptions> = None;
    let outcome = {
        let mut entry = PickerEntry::new(|_: &[String], opts: &PickerOptions| -> Result<Option<String>> {
            seen = Some(opts.clone());
            Ok(None)
        });
        dispatcher.run(backend, &mut state, symbols.as_ref(), &mut PlanProvider, &mut entry)?
    };
    let picker = seen.unwrap_or_default();

    // Regex form of the key for pickers that cannot do a prefix compare
    let pattern = outcome
        .request
        .preselect_key
        .clone()
        .map(|k| PreselectKey::new(k).anchored_pattern());

    match args.format
    {
        OutputFormat::Json =>
        {
            let output = json!({
                "request": outcome.request,
                "picker": picker,
                "preselect_pattern": pattern,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text =>
        {
            let req = &outcome.request;
            println!("{} {}", label(ctx, "backend"), req.backend);
            println!("{} {}", label(ctx, "root"), req.root_path.display());
            println!("{} {}", label(ctx, "seed"), req.seed_text);
            println!(
                "{} {}",
                label(ctx, "preselect"),
                req.preselect_key
                    .as_deref()
                    .unwrap_or("")
            );
            if !ctx.quiet
            {
                println!("{} {}", label(ctx, "pattern"), pattern.as_deref().unwrap_or(""));
                println!(
                    "{} {}",
                    label(ctx, "picker"),
                    serde_json::to_string(&picker)?
                );
            }
        }
    }

    Ok(())
}

#[instrument(skip_all)]
pub fn run_nearest(
    args: NearestArgs,
    _ctx: &AppContext,
) -> Result<()>
{
    let text = read_buffer(Some(&args.file))?;
    let cursor = cursor_offset(&text, &args.cursor)?;
    let state = EditorState::new(text, cursor).with_file(&args.file);
    state.validate()?;

    let entries = flatten(&load_index(&args.index)?);
    if let Some(label) = select_nearest_entry(&entries, &state)
    {
        println!("{label}");
    }

    Ok(())
}
