//! Seed text and cursor line derived from the editor snapshot.

use tracing::trace;

use crate::{
    core::{backend::Backend, editor::EditorState, thing::ThingAtPoint},
    infra::utils::TextUtils,
};

/// Seed text as extracted, plus the form handed to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedText
{
    /// Visible characters, styling stripped
    pub raw: String,

    /// What the backend receives: regex-quoted for regex backends
    pub query: String,
}

pub struct ContextExtractor;

impl ContextExtractor
{
    /// The seed for a search.
    ///
    /// A non-empty selection wins and is collapsed once taken; otherwise
    /// the thing at point, or "" when there is nothing under the cursor.
    pub fn seed_text(
        state: &mut EditorState,
        thing: &dyn ThingAtPoint,
    ) -> String
    {
        if let Some(sel) = state.active_selection()
            && let Some(text) = state.slice(sel.range())
        {
            let seed = TextUtils::strip_styling(text);
            state.collapse_selection();
            trace!(len = seed.len(), "seed from selection");
            return seed;
        }

        let seed = thing
            .thing_at_point(state)
            .map(|t| TextUtils::strip_styling(&t))
            .unwrap_or_default();
        trace!(seed = %seed, "seed from thing at point");
        seed
    }

    /// Quote `raw` for the backend: regex backends get a literal pattern
    /// in their own dialect, the rest get the text untouched
    pub fn seed_query(
        raw: &str,
        backend: Backend,
    ) -> String
    {
        match backend.dialect()
        {
            Some(dialect) => TextUtils::escape_for(raw, dialect),
            None => raw.to_string(),
        }
    }

    /// Extract and quote in one step
    pub fn seed(
        state: &mut EditorState,
        thing: &dyn ThingAtPoint,
        backend: Backend,
    ) -> SeedText
    {
        let raw = Self::seed_text(state, thing);
        let query = Self::seed_query(&raw, backend);
        SeedText { raw, query }
    }

    /// 1-based cursor line counted from the document start; narrowing
    /// does not shift it
    pub fn current_line(state: &EditorState) -> usize
    {
        state
            .line_index()
            .line_of_byte(state.cursor)
    }
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;
    use regex::Regex;

    use super::*;
    use crate::core::{editor::Selection, thing::ThingKind};

    #[test]
    fn selection_wins_and_is_collapsed()
    {
        let mut state =
            EditorState::new("call foo.bar(x) now", 2).with_selection(Selection::between(5, 15));
        let seed = ContextExtractor::seed_text(&mut state, &ThingKind::Symbol);
        assert_eq!(seed, "foo.bar(x)");
        assert_eq!(state.selection, None);
    }

    #[test]
    fn styled_selection_is_stripped()
    {
        let text = "x \x1b[33mhot\x1b[0m y";
        let end = text.len() - 2;
        let mut state = EditorState::new(text, 0).with_selection(Selection::between(2, end));
        assert_eq!(ContextExtractor::seed_text(&mut state, &ThingKind::Symbol), "hot");
        assert!(state.active_selection().is_none());
    }

    #[test]
    fn empty_selection_falls_through_to_thing_at_point()
    {
        let mut state = EditorState::new("alpha beta", 7).with_selection(Selection::between(7, 7));
        assert_eq!(ContextExtractor::seed_text(&mut state, &ThingKind::Symbol), "beta");
    }

    #[test]
    fn whitespace_seeds_empty_string()
    {
        let mut state = EditorState::new("a   b", 2);
        assert_eq!(ContextExtractor::seed_text(&mut state, &ThingKind::Symbol), "");
    }

    /// The literal a POSIX basic regex matches, or None when it still
    /// contains an operator
    fn bre_literal(pattern: &str) -> Option<String>
    {
        let mut out = String::new();
        let mut chars = pattern.chars();
        while let Some(c) = chars.next()
        {
            match c
            {
                '\\' => match chars.next()?
                {
                    q @ ('\\' | '.' | '*' | '[' | '^' | '$') => out.push(q),
                    _ => return None,
                },
                '.' | '*' | '[' | '^' | '$' => return None,
                _ => out.push(c),
            }
        }
        Some(out)
    }

    #[test]
    fn only_regex_backends_are_quoted()
    {
        assert_eq!(ContextExtractor::seed_query("a.b*c", Backend::Ripgrep), r"a\.b\*c");
        assert_eq!(ContextExtractor::seed_query("a.b*c", Backend::Fzf), "a.b*c");
        assert_eq!(ContextExtractor::seed_query("a.b*c", Backend::Imenu), "a.b*c");
    }

    #[test]
    fn grep_family_keeps_bre_operators_literal()
    {
        for b in [Backend::GitGrep, Backend::Grep]
        {
            assert_eq!(ContextExtractor::seed_query("foo(bar)", b), "foo(bar)");
            assert_eq!(ContextExtractor::seed_query("a|b", b), "a|b");
            assert_eq!(ContextExtractor::seed_query("a.b*c", b), r"a\.b\*c");
        }
        assert_eq!(ContextExtractor::seed_query("foo(bar)", Backend::Ripgrep), r"foo\(bar\)");
    }

    #[test]
    fn git_grep_matches_quoted_seed_literally() -> anyhow::Result<()>
    {
        let tmp = tempfile::TempDir::new()?;
        std::fs::write(
            tmp.path()
                .join("f.txt"),
            "call foo(bar) here\nfoobar\na|b\nx.y*z[1]\n",
        )?;

        for (raw, line) in [
            ("foo(bar)", "call foo(bar) here"),
            ("a|b", "a|b"),
            ("x.y*z[1]", "x.y*z[1]"),
        ]
        {
            let query = ContextExtractor::seed_query(raw, Backend::GitGrep);
            let Ok(out) = std::process::Command::new("git")
                .args(["grep", "--no-index", "-h", "-e", query.as_str(), "--", "f.txt"])
                .current_dir(tmp.path())
                .output()
            else
            {
                eprintln!("git unavailable; skipping");
                return Ok(());
            };

            let stdout = String::from_utf8_lossy(&out.stdout);
            assert_eq!(stdout.lines().collect::<Vec<_>>(), vec![line], "query {query}");
        }
        Ok(())
    }

    #[test]
    fn line_ignores_narrowing()
    {
        let text = "one\ntwo\nthree\nfour\n";
        let state = EditorState::new(text, 10).with_narrowing(8..14);
        assert_eq!(ContextExtractor::current_line(&state), 3);
    }

    proptest! {
        #[test]
        fn extended_seed_matches_itself_literally(raw in r"[ -~]{0,40}")
        {
            for b in [Backend::Ripgrep, Backend::SilverSearcher]
            {
                let pattern = format!("^{}$", ContextExtractor::seed_query(&raw, b));
                let re = Regex::new(&pattern).unwrap();
                prop_assert!(re.is_match(&raw));
            }
        }

        #[test]
        fn basic_seed_reads_back_as_the_same_literal(raw in r"[ -~]{0,40}")
        {
            for b in [Backend::GitGrep, Backend::Grep]
            {
                let query = ContextExtractor::seed_query(&raw, b);
                prop_assert_eq!(bre_literal(&query), Some(raw.clone()));
            }
        }

        #[test]
        fn current_line_counts_preceding_newlines(text in "[a-c\n]{0,60}", cursor in 0usize..61)
        {
            let cursor = cursor.min(text.len());
            let state = EditorState::new(text.clone(), cursor).with_narrowing(cursor..cursor);
            let expected = 1 + text[..cursor].matches('\n').count();
            prop_assert_eq!(ContextExtractor::current_line(&state), expected);
        }
    }
}
