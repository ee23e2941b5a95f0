//! Read-mostly snapshot of the editor the commands run against.
//!
//! Offsets are byte offsets into `text`. The snapshot is owned by one
//! command invocation; the only mutation a command performs on it is
//! collapsing the selection once its text has been taken as the seed.

use std::{ops::Range, path::PathBuf};

use crate::{core::dispatch::AtPointError, infra::line_index::NewlineIndex};

/// An active selection; `start..end` in bytes, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection
{
    pub start: usize,
    pub end: usize,
}

impl Selection
{
    /// Build from two marks in either order
    pub fn between(
        a: usize,
        b: usize,
    ) -> Self
    {
        Self { start: a.min(b), end: a.max(b) }
    }

    pub fn is_empty(&self) -> bool
    {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize>
    {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorState
{
    /// Backing file; None for scratch or unsaved buffers
    pub file: Option<PathBuf>,

    /// Full document text, including any part hidden by narrowing
    pub text: String,

    /// Cursor byte offset from the document start
    pub cursor: usize,

    /// Active selection, if any
    pub selection: Option<Selection>,

    /// Visible sub-range when the host has narrowed the view
    pub narrowing: Option<Range<usize>>,
}

impl EditorState
{
    pub fn new(
        text: impl Into<String>,
        cursor: usize,
    ) -> Self
    {
        Self { text: text.into(), cursor, ..Self::default() }
    }

    pub fn with_file(
        mut self,
        file: impl Into<PathBuf>,
    ) -> Self
    {
        self.file = Some(file.into());
        self
    }

    pub fn with_selection(
        mut self,
        selection: Selection,
    ) -> Self
    {
        self.selection = Some(selection);
        self
    }

    pub fn with_narrowing(
        mut self,
        range: Range<usize>,
    ) -> Self
    {
        self.narrowing = Some(range);
        self
    }

    /// Check every offset lands on a char boundary inside `text`
    pub fn validate(&self) -> Result<(), AtPointError>
    {
        let len = self
            .text
            .len();

        if !self
            .text
            .is_char_boundary(self.cursor)
        {
            return Err(AtPointError::InvalidCursor { offset: self.cursor, len });
        }

        if let Some(sel) = self.selection
            && (!self
                .text
                .is_char_boundary(sel.start)
                || !self
                    .text
                    .is_char_boundary(sel.end)
                || sel.start > sel.end)
        {
            return Err(AtPointError::InvalidSelection { start: sel.start, end: sel.end, len });
        }

        Ok(())
    }

    /// The selection when it spans at least one byte
    pub fn active_selection(&self) -> Option<Selection>
    {
        self.selection
            .filter(|s| !s.is_empty())
    }

    /// Raw substring access; None when the range is out of bounds or
    /// splits a character
    pub fn slice(
        &self,
        range: Range<usize>,
    ) -> Option<&str>
    {
        self.text
            .get(range)
    }

    /// Drop the selection, leaving the cursor where it was
    pub fn collapse_selection(&mut self)
    {
        self.selection = None;
    }

    /// Newline index over the whole document, narrowing ignored
    pub fn line_index(&self) -> NewlineIndex
    {
        NewlineIndex::build(
            self.text
                .as_bytes(),
        )
    }

    /// Cursor offset for a 1-based line and 0-based byte column; the
    /// column clamps to the end of the line
    pub fn offset_of(
        text: &str,
        line1: usize,
        column: usize,
    ) -> Option<usize>
    {
        let bytes = text.as_bytes();
        let idx = NewlineIndex::build(bytes);
        let start = idx.start_byte_of_line(line1)?;
        let end = idx.end_byte_of_line(line1, bytes)?;
        Some(start
            .saturating_add(column)
            .min(end))
    }
}
