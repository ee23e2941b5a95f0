//! The closed set of external search backends a command can target.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::core::dispatch::AtPointError;

/// What a backend searches, which decides the preselect key shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind
{
    /// Grep-style content search; candidates look like `path:line:text`
    Content,
    /// File listing; candidates are root-relative paths
    File,
    /// Symbol index; candidates are symbol labels
    Symbol,
}

/// Regex syntax families the content backends parse their query in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegexDialect
{
    /// Rust regex / PCRE style (`rg`, `ag`): a backslash before any
    /// punctuation is a literal
    Extended,
    /// POSIX basic regex (`git grep`, `grep` defaults): `\(`, `\|`, `\{`,
    /// `\+` and `\?` are operators, so only `\ . * [ ^ $` may be quoted
    Basic,
}

/// Serialized by its command-line name, aliases accepted on input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Backend
{
    /// ripgrep-style project content search
    Ripgrep,
    /// silver-searcher-style project content search
    SilverSearcher,
    /// `git grep`-style content search over tracked files
    GitGrep,
    /// Plain grep over the current file only; candidates are `line:text`
    Grep,
    /// Jump to a file anywhere under the root
    FileJump,
    /// Browse-and-open file finder
    FindFile,
    /// Fuzzy file finder
    Fzf,
    /// Symbol index of the current buffer
    Imenu,
}

impl Backend
{
    pub const ALL: [Backend; 8] = [
        Backend::Ripgrep,
        Backend::SilverSearcher,
        Backend::GitGrep,
        Backend::Grep,
        Backend::FileJump,
        Backend::FindFile,
        Backend::Fzf,
        Backend::Imenu,
    ];

    /// Canonical command-line name
    pub fn name(self) -> &'static str
    {
        match self
        {
            Backend::Ripgrep => "rg",
            Backend::SilverSearcher => "ag",
            Backend::GitGrep => "git-grep",
            Backend::Grep => "grep",
            Backend::FileJump => "file-jump",
            Backend::FindFile => "find-file",
            Backend::Fzf => "fzf",
            Backend::Imenu => "imenu",
        }
    }

    fn aliases(self) -> &'static [&'static str]
    {
        match self
        {
            Backend::Ripgrep => &["ripgrep"],
            Backend::SilverSearcher => &["silver-searcher"],
            Backend::GitGrep => &["vcs-grep"],
            Backend::Grep => &["swiper"],
            Backend::FileJump => &["jump"],
            Backend::FindFile => &["find"],
            Backend::Fzf => &["fuzzy"],
            Backend::Imenu => &["symbols"],
        }
    }

    pub fn kind(self) -> SearchKind
    {
        match self
        {
            Backend::Ripgrep | Backend::SilverSearcher | Backend::GitGrep | Backend::Grep =>
            {
                SearchKind::Content
            }
            Backend::FileJump | Backend::FindFile | Backend::Fzf => SearchKind::File,
            Backend::Imenu => SearchKind::Symbol,
        }
    }

    /// Pattern syntax the seed text is read in; None when the backend
    /// filters candidates as plain text
    pub fn dialect(self) -> Option<RegexDialect>
    {
        match self
        {
            Backend::Ripgrep | Backend::SilverSearcher => Some(RegexDialect::Extended),
            Backend::GitGrep | Backend::Grep => Some(RegexDialect::Basic),
            Backend::FileJump | Backend::FindFile | Backend::Fzf | Backend::Imenu => None,
        }
    }

    /// Whether the seed text is fed to a regex engine
    pub fn is_regex_based(self) -> bool
    {
        self.dialect()
            .is_some()
    }

    /// Content search over the current buffer only; its candidates carry
    /// no path
    pub fn is_buffer_local(self) -> bool
    {
        self == Backend::Grep
    }

    /// Comma-separated canonical names, for help texts
    pub fn valid_names() -> String
    {
        Self::ALL
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Backend
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

impl From<Backend> for String
{
    fn from(backend: Backend) -> Self
    {
        backend
            .name()
            .to_string()
    }
}

impl TryFrom<String> for Backend
{
    type Error = AtPointError;

    fn try_from(s: String) -> Result<Self, Self::Error>
    {
        s.parse()
    }
}

impl FromStr for Backend
{
    type Err = AtPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let wanted = s
            .trim()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|b| {
                b.name() == wanted
                    || b.aliases()
                        .contains(&wanted.as_str())
            })
            .ok_or_else(|| AtPointError::UnknownBackend {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}
