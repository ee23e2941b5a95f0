//! Project root resolution.
//!
//! A [`ResolverChain`] tries each registered [`RootResolver`] in order and
//! takes the first non-empty answer. Resolvers never fail loudly: a file
//! outside any repository, a missing `git` binary or an unreadable
//! directory all mean "no answer" and the chain moves on. When nobody
//! answers, the working directory is the root.

use std::{
    fmt,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, instrument, trace};

use crate::infra::config::RootConfig;

/// One strategy for finding a project root
pub trait RootResolver
{
    /// Short name used in logs
    fn name(&self) -> &str
    {
        "custom"
    }

    /// A root for `file`, or None to let the next resolver try
    fn resolve(
        &self,
        file: Option<&Path>,
    ) -> Option<PathBuf>;
}

impl<F> RootResolver for F
where
    F: Fn(Option<&Path>) -> Option<PathBuf>,
{
    fn resolve(
        &self,
        file: Option<&Path>,
    ) -> Option<PathBuf>
    {
        self(file)
    }
}

/// Directory to start ascending from: the file's parent, or the file
/// itself when it already names a directory
fn start_dir(file: &Path) -> Option<&Path>
{
    if file.is_dir()
    {
        return Some(file);
    }
    file.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .or(Some(Path::new(".")))
}

fn canonical(dir: &Path) -> PathBuf
{
    dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Ascend from the file looking for any of a set of marker names
#[derive(Debug, Clone)]
pub struct MarkerResolver
{
    markers: Vec<String>,
}

impl MarkerResolver
{
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

impl RootResolver for MarkerResolver
{
    fn name(&self) -> &str
    {
        "markers"
    }

    fn resolve(
        &self,
        file: Option<&Path>,
    ) -> Option<PathBuf>
    {
        if self
            .markers
            .is_empty()
        {
            return None;
        }

        let start = canonical(start_dir(file?)?);
        start
            .ancestors()
            .find(|dir| {
                self.markers
                    .iter()
                    .any(|m| dir.join(m).exists())
            })
            .map(Path::to_path_buf)
    }
}

/// Version-control toplevel: `git rev-parse`, then an ascent looking
/// for `.git` (directory or worktree file), `.hg` or `.svn`
#[derive(Debug, Clone, Default)]
pub struct VcsResolver;

impl VcsResolver
{
    const MARKERS: [&'static str; 3] = [".git", ".hg", ".svn"];

    fn git_toplevel(dir: &Path) -> Option<PathBuf>
    {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(dir)
            .output()
            .ok()?;

        if !output
            .status
            .success()
        {
            trace!(dir = %dir.display(), "git rev-parse declined");
            return None;
        }

        let s = String::from_utf8_lossy(&output.stdout)
            .trim()
            .to_string();
        (!s.is_empty()).then(|| canonical(Path::new(&s)))
    }
}

impl RootResolver for VcsResolver
{
    fn name(&self) -> &str
    {
        "vcs"
    }

    fn resolve(
        &self,
        file: Option<&Path>,
    ) -> Option<PathBuf>
    {
        let start = canonical(start_dir(file?)?);

        if let Some(top) = Self::git_toplevel(&start)
        {
            return Some(top);
        }

        start
            .ancestors()
            .find(|dir| {
                Self::MARKERS
                    .iter()
                    .any(|m| dir.join(m).exists())
            })
            .map(Path::to_path_buf)
    }
}

/// Ordered resolvers with a working-directory fallback
#[derive(Default)]
pub struct ResolverChain
{
    resolvers: Vec<Box<dyn RootResolver>>,
}

impl fmt::Debug for ResolverChain
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.debug_list()
            .entries(
                self.resolvers
                    .iter()
                    .map(|r| r.name()),
            )
            .finish()
    }
}

impl ResolverChain
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Markers first, then VCS, as configured
    pub fn from_config(cfg: &RootConfig) -> Self
    {
        let mut chain = Self::new();
        if !cfg
            .markers
            .is_empty()
        {
            chain = chain.with(MarkerResolver::new(
                cfg.markers
                    .iter()
                    .cloned(),
            ));
        }
        if cfg.vcs
        {
            chain = chain.with(VcsResolver);
        }
        chain
    }

    /// Append a resolver at the lowest priority so far
    pub fn with(
        mut self,
        resolver: impl RootResolver + 'static,
    ) -> Self
    {
        self.resolvers
            .push(Box::new(resolver));
        self
    }

    pub fn is_empty(&self) -> bool
    {
        self.resolvers
            .is_empty()
    }

    /// First resolver answer, if any
    pub fn try_resolve(
        &self,
        file: Option<&Path>,
    ) -> Option<PathBuf>
    {
        self.resolvers
            .iter()
            .find_map(|r| {
                let hit = r
                    .resolve(file)
                    .filter(|p| !p.as_os_str().is_empty());
                trace!(resolver = r.name(), hit = ?hit, "root resolver");
                hit
            })
    }

    /// Project root for `file`; never empty
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(
        &self,
        file: Option<&Path>,
    ) -> PathBuf
    {
        if let Some(root) = self.try_resolve(file)
        {
            return root;
        }

        let cwd = std::env::current_dir().map_or_else(|_| PathBuf::from("."), |d| canonical(&d));
        debug!(
            cwd = %cwd.display(),
            configured = !self.is_empty(),
            "no resolver answered; using working directory"
        );
        cwd
    }
}
