//! Utility helpers organized by small, focused structs.
//! All functions are associated fns to keep call sites
//! ergonomic, testable, and discoverable.

use std::{
    path::{Component, Path},
    sync::LazyLock,
};

use regex::Regex;

use crate::core::backend::RegexDialect;

/// ANSI SGR sequences (`ESC [ ... m`) plus OSC-8 hyperlinks, which is how
/// styled text reaches us from terminal-hosted editors.
static STYLING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;:]*m|\x1b\]8;[^\x07\x1b]*(?:\x07|\x1b\\)")
        .expect("styling regex is valid")
});

/// Text helpers shared by the context extractor and preselect builder
pub struct TextUtils;

impl TextUtils
{
    /// Remove rendering metadata, leaving only the visible characters
    pub fn strip_styling(text: &str) -> String
    {
        // Avoid the regex pass for the common plain-text case
        if !text.contains('\x1b')
        {
            return text.to_string();
        }

        STYLING_RE
            .replace_all(text, "")
            .into_owned()
    }

    /// Quote `text` so a Rust-regex or PCRE engine matches it literally
    pub fn escape_literal(text: &str) -> String
    {
        regex::escape(text)
    }

    /// Quote `text` for a POSIX basic regex. Only `\ . * [ ^ $` are
    /// special there; backslashing anything else (`\(`, `\|`, `\+`)
    /// would turn a literal into an operator.
    pub fn escape_basic(text: &str) -> String
    {
        let mut out = String::with_capacity(text.len() + 8);
        for c in text.chars()
        {
            if matches!(c, '\\' | '.' | '*' | '[' | '^' | '$')
            {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    /// Quote `text` for `dialect`
    pub fn escape_for(
        text: &str,
        dialect: RegexDialect,
    ) -> String
    {
        match dialect
        {
            RegexDialect::Extended => Self::escape_literal(text),
            RegexDialect::Basic => Self::escape_basic(text),
        }
    }
}

/// Path helpers producing picker-friendly strings
pub struct PathUtils;

impl PathUtils
{
    /// Render a path with '/' separators regardless of platform, the
    /// way grep-style backends print candidate paths
    pub fn to_slash(path: &Path) -> String
    {
        let mut lead = String::new();
        let mut parts: Vec<String> = Vec::new();

        for comp in path.components()
        {
            match comp
            {
                Component::Prefix(p) => lead.push_str(&p.as_os_str().to_string_lossy()),
                Component::RootDir => lead.push('/'),
                Component::CurDir => {}
                Component::ParentDir => parts.push("..".to_string()),
                Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            }
        }

        lead + &parts.join("/")
    }

    /// `file` relative to `root`, as a '/'-separated string.
    ///
    /// Tries a lexical prefix strip first (works for paths that do not
    /// exist yet), then again on canonical forms so symlinked roots and
    /// `..` hops still line up. Returns None when `file` does not
    /// live under `root`.
    pub fn relative_to(
        file: &Path,
        root: &Path,
    ) -> Option<String>
    {
        if let Ok(rel) = file.strip_prefix(root)
        {
            return Some(Self::to_slash(rel));
        }

        let file_c = dunce::canonicalize(file).ok()?;
        let root_c = dunce::canonicalize(root).ok()?;

        file_c
            .strip_prefix(&root_c)
            .ok()
            .map(Self::to_slash)
    }
}
