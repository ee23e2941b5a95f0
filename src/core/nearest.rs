//! Nearest symbol-index entry at or before the cursor line.

use std::{
    cell::Cell,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::core::{dispatch::AtPointError, editor::EditorState};

/// A live document position that moves as the buffer is edited
#[derive(Debug, Clone, Default)]
pub struct DocMarker(Rc<Cell<usize>>);

impl DocMarker
{
    pub fn new(offset: usize) -> Self
    {
        Self(Rc::new(Cell::new(offset)))
    }

    pub fn offset(&self) -> usize
    {
        self.0
            .get()
    }

    /// Move the marker; every clone sees the new offset
    pub fn set(
        &self,
        offset: usize,
    )
    {
        self.0
            .set(offset);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryPosition
{
    Offset(usize),
    #[serde(skip)]
    Marker(DocMarker),
}

impl EntryPosition
{
    /// Plain byte offset, reading markers at call time
    pub fn resolve(&self) -> usize
    {
        match self
        {
            EntryPosition::Offset(o) => *o,
            EntryPosition::Marker(m) => m.offset(),
        }
    }
}

impl From<usize> for EntryPosition
{
    fn from(offset: usize) -> Self
    {
        EntryPosition::Offset(offset)
    }
}

impl From<DocMarker> for EntryPosition
{
    fn from(marker: DocMarker) -> Self
    {
        EntryPosition::Marker(marker)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry
{
    pub label: String,
    pub position: EntryPosition,
}

impl IndexEntry
{
    pub fn new(
        label: impl Into<String>,
        position: impl Into<EntryPosition>,
    ) -> Self
    {
        Self { label: label.into(), position: position.into() }
    }
}

/// Symbol index as hosts hand it over: entries, possibly grouped
/// ("Functions", "Types", ...) and nested
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexNode
{
    Group
    {
        label: String,
        children: Vec<IndexNode>,
    },
    Entry(IndexEntry),
}

/// Flatten groups into `"Group: label"` entries, preserving order
pub fn flatten(nodes: &[IndexNode]) -> Vec<IndexEntry>
{
    fn walk(
        nodes: &[IndexNode],
        prefix: Option<&str>,
        out: &mut Vec<IndexEntry>,
    )
    {
        for node in nodes
        {
            match node
            {
                IndexNode::Entry(e) =>
                {
                    let label = match prefix
                    {
                        Some(p) => format!("{p}: {}", e.label),
                        None => e
                            .label
                            .clone(),
                    };
                    out.push(IndexEntry { label, position: e.position.clone() });
                }
                IndexNode::Group { label, children } =>
                {
                    let nested = match prefix
                    {
                        Some(p) => format!("{p}: {label}"),
                        None => label.clone(),
                    };
                    walk(children, Some(&nested), out);
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(nodes, None, &mut out);
    out
}

/// Entry with the greatest position strictly below `boundary`.
///
/// Entries are scanned in the given order, not assumed sorted. Among
/// entries sharing the winning position the first one seen is kept.
pub fn nearest_entry(
    entries: &[IndexEntry],
    boundary: usize,
) -> Option<&IndexEntry>
{
    let mut best: Option<(&IndexEntry, usize)> = None;

    for entry in entries
    {
        let pos = entry
            .position
            .resolve();
        if pos < boundary && best.is_none_or(|(_, b)| pos > b)
        {
            best = Some((entry, pos));
        }
    }

    best.map(|(e, _)| e)
}

/// Label of the nearest entry for the cursor's line. The boundary is the
/// start of the following line, so symbols anchored a few characters into
/// the cursor's own line still count.
pub fn select_nearest_entry(
    entries: &[IndexEntry],
    state: &EditorState,
) -> Option<String>
{
    let boundary = state
        .line_index()
        .next_line_start(state.cursor);

    nearest_entry(entries, boundary).map(|e| {
        e.label
            .clone()
    })
}

/// Load an index from JSON lines, one [`IndexNode`] per line
pub fn load_index(path: &Path) -> Result<Vec<IndexNode>, AtPointError>
{
    let fail = |message: String| AtPointError::SymbolIndex { path: path.to_path_buf(), message };

    let f = File::open(path).map_err(|e| fail(e.to_string()))?;
    let reader = BufReader::new(f);
    let mut nodes = Vec::new();

    for (i, line) in reader
        .lines()
        .enumerate()
    {
        let line = line.map_err(|e| fail(format!("line {}: {e}", i + 1)))?;
        if line
            .trim()
            .is_empty()
        {
            continue;
        }
        let node: IndexNode =
            serde_json::from_str(&line).map_err(|e| fail(format!("line {}: {e}", i + 1)))?;
        nodes.push(node);
    }

    Ok(nodes)
}
