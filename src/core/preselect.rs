//! Preselect keys: the hint telling a picker which candidate to
//! highlight first.
//!
//! A key is an optimistic prefix. Nothing guarantees a candidate starts
//! with it; a picker that finds none keeps its own default selection.

use std::{fmt, path::Path};

use serde::Serialize;
use tracing::debug;

use crate::{
    core::backend::{Backend, SearchKind},
    infra::utils::{PathUtils, TextUtils},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PreselectKey(String);

impl PreselectKey
{
    pub fn new(key: impl Into<String>) -> Self
    {
        Self(key.into())
    }

    pub fn into_string(self) -> String
    {
        self.0
    }

    /// Prefix equality, never substring: `a.txt:1:` must not select the
    /// candidate for line 10 of some other file that contains it
    pub fn matches(
        &self,
        candidate: &str,
    ) -> bool
    {
        candidate.starts_with(&self.0)
    }

    /// Escaped, start-anchored regex form for pickers that only take
    /// patterns
    pub fn anchored_pattern(&self) -> String
    {
        format!("^{}", TextUtils::escape_literal(&self.0))
    }

    /// Index of the first candidate the key selects
    pub fn find_in<'a, I>(
        &self,
        candidates: I,
    ) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .position(|c| self.matches(c))
    }
}

impl fmt::Display for PreselectKey
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.write_str(&self.0)
    }
}

/// Build the key a backend's candidate for `file:line` would start with.
///
/// - buffer-local grep: `"<line>:"`
/// - other content search: `"<path-relative-to-root>:<line>:"`
/// - file listing: `"<path-relative-to-root>"`
/// - symbol index: None (see the nearest-entry selector)
///
/// None whenever the file or root is unknown, or the file lies outside
/// the root.
pub fn build_preselect_key(
    backend: Backend,
    file: Option<&Path>,
    root: Option<&Path>,
    line: usize,
) -> Option<PreselectKey>
{
    let (file, root) = (file?, root?);

    if backend.is_buffer_local()
    {
        return Some(PreselectKey(format!("{line}:")));
    }

    let rel = || {
        let rel = PathUtils::relative_to(file, root);
        if rel.is_none()
        {
            debug!(file = %file.display(), root = %root.display(), "file outside root; no preselect");
        }
        rel
    };

    match backend.kind()
    {
        SearchKind::Content => rel().map(|r| PreselectKey(format!("{r}:{line}:"))),
        SearchKind::File => rel().map(PreselectKey),
        SearchKind::Symbol => None,
    }
}
