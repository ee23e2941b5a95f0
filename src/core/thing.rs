//! Thing-at-point extractors: what text "is under" the cursor.
//!
//! Extractors are plain strategy objects; closures work too, so hosts can
//! plug in their own notion of a symbol without touching this crate.

use serde::{Deserialize, Serialize};

use crate::core::editor::EditorState;

/// Pluggable "thing at point" strategy
pub trait ThingAtPoint
{
    /// The thing under or adjacent to the cursor; None over whitespace
    fn thing_at_point(
        &self,
        state: &EditorState,
    ) -> Option<String>;
}

impl<F> ThingAtPoint for F
where
    F: Fn(&EditorState) -> Option<String>,
{
    fn thing_at_point(
        &self,
        state: &EditorState,
    ) -> Option<String>
    {
        self(state)
    }
}

/// Built-in extractors selectable from configuration
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ThingKind
{
    /// Identifier characters (alphanumerics and `_`)
    #[default]
    Symbol,
    /// Any run of non-whitespace
    Word,
    /// Path-like run (identifier chars plus `./-~+@%`)
    Filename,
    /// The whole current line, trimmed
    Line,
    /// Never seed anything
    None,
}

impl ThingAtPoint for ThingKind
{
    fn thing_at_point(
        &self,
        state: &EditorState,
    ) -> Option<String>
    {
        let text = state
            .text
            .as_str();
        let cursor = state.cursor;

        match self
        {
            ThingKind::Symbol => run_around(text, cursor, is_symbol_char),
            ThingKind::Word => run_around(text, cursor, |c| !c.is_whitespace()),
            ThingKind::Filename => run_around(text, cursor, is_filename_char),
            ThingKind::Line => current_line(state),
            ThingKind::None => None,
        }
    }
}

fn is_symbol_char(c: char) -> bool
{
    c.is_alphanumeric() || c == '_'
}

fn is_filename_char(c: char) -> bool
{
    is_symbol_char(c) || matches!(c, '.' | '/' | '-' | '~' | '+' | '@' | '%')
}

/// Maximal run of `pred` chars touching `cursor` from either side
fn run_around(
    text: &str,
    cursor: usize,
    pred: impl Fn(char) -> bool,
) -> Option<String>
{
    let before = text.get(..cursor)?;
    let after = text.get(cursor..)?;

    let left: usize = before
        .chars()
        .rev()
        .take_while(|&c| pred(c))
        .map(char::len_utf8)
        .sum();
    let right: usize = after
        .chars()
        .take_while(|&c| pred(c))
        .map(char::len_utf8)
        .sum();

    if left + right == 0
    {
        return None;
    }

    Some(text[cursor - left..cursor + right].to_string())
}

fn current_line(state: &EditorState) -> Option<String>
{
    let text = state
        .text
        .as_str();
    let bytes = text.as_bytes();
    let idx = state.line_index();
    let line = idx.line_of_byte(state.cursor);
    let start = idx.start_byte_of_line(line)?;
    let end = idx.end_byte_of_line(line, bytes)?;

    let trimmed = text
        .get(start..end)?
        .trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn at(
        kind: ThingKind,
        text: &str,
        cursor: usize,
    ) -> Option<String>
    {
        kind.thing_at_point(&EditorState::new(text, cursor))
    }

    #[test]
    fn symbol_under_cursor()
    {
        assert_eq!(at(ThingKind::Symbol, "let foo_bar = 1;", 6).as_deref(), Some("foo_bar"));
    }

    #[test]
    fn symbol_adjacent_on_either_side()
    {
        // Cursor just past the identifier
        assert_eq!(at(ThingKind::Symbol, "foo  bar", 3).as_deref(), Some("foo"));
        // Cursor just before the identifier
        assert_eq!(at(ThingKind::Symbol, "foo  bar", 5).as_deref(), Some("bar"));
    }

    #[test]
    fn whitespace_yields_nothing()
    {
        assert_eq!(at(ThingKind::Symbol, "foo   bar", 4), None);
        assert_eq!(at(ThingKind::Line, "a\n   \nb", 3), None);
    }

    #[test]
    fn filename_keeps_path_punctuation()
    {
        let text = "see src/core/thing.rs:12 for details";
        assert_eq!(at(ThingKind::Filename, text, 8).as_deref(), Some("src/core/thing.rs"));
        assert_eq!(at(ThingKind::Word, text, 8).as_deref(), Some("src/core/thing.rs:12"));
    }

    #[test]
    fn line_is_trimmed()
    {
        assert_eq!(at(ThingKind::Line, "x\n  fn main() {}  \ny", 5).as_deref(), Some("fn main() {}"));
    }

    #[test]
    fn none_never_extracts()
    {
        assert_eq!(at(ThingKind::None, "foo", 1), None);
    }

    #[test]
    fn closures_are_extractors()
    {
        let fixed = |_: &EditorState| Some("fixed".to_string());
        assert_eq!(fixed.thing_at_point(&EditorState::new("", 0)).as_deref(), Some("fixed"));
    }

    #[test]
    fn multibyte_identifiers()
    {
        assert_eq!(at(ThingKind::Symbol, "x = größe;", 6).as_deref(), Some("größe"));
    }
}
