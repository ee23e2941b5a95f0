//! Commands: one (context, backend) pair each.
//!
//! A command snapshots the editor, resolves the root, derives the seed
//! and preselect key, then hands a [`SearchRequest`] to the external
//! [`SearchProvider`] with the preselect injected into its picker calls.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    core::{
        backend::{Backend, RegexDialect, SearchKind},
        context::ContextExtractor,
        editor::EditorState,
        nearest::{IndexNode, flatten, load_index, select_nearest_entry},
        picker::{PickerEntry, PickerOptions, Precedence, with_preselect},
        preselect::build_preselect_key,
        root::ResolverChain,
        thing::ThingAtPoint,
    },
    infra::config::Config,
};

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum AtPointError
{
    #[error("unknown backend `{name}`")]
    #[diagnostic(code(atpoint::unknown_backend), help("valid backends: {valid}"))]
    UnknownBackend
    {
        name: String,
        valid: String,
    },

    #[error("cursor offset {offset} is not a character boundary in a {len}-byte buffer")]
    #[diagnostic(code(atpoint::invalid_cursor))]
    InvalidCursor
    {
        offset: usize,
        len: usize,
    },

    #[error("selection {start}..{end} does not fit a {len}-byte buffer")]
    #[diagnostic(code(atpoint::invalid_selection))]
    InvalidSelection
    {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("symbol index {}: {message}", path.display())]
    #[diagnostic(code(atpoint::symbol_index))]
    SymbolIndex
    {
        path: PathBuf,
        message: String,
    },

    #[error("search provider failed")]
    #[diagnostic(code(atpoint::provider))]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl AtPointError
{
    /// Process exit code for the binary
    pub fn exit_code(&self) -> i32
    {
        match self
        {
            AtPointError::UnknownBackend { .. } => 2,
            _ => 1,
        }
    }
}

/// Parameters for one external search; built per command, then dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest
{
    pub backend: Backend,

    /// Initial query, already quoted for regex backends
    pub seed_text: String,

    /// Regex syntax `seed_text` is quoted for; None means plain text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<RegexDialect>,

    pub root_path: PathBuf,

    /// Prefix of the candidate to highlight first, if one can be guessed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preselect_key: Option<String>,
}

/// The external search: renders candidates through the picker entry and
/// returns the user's choice
pub trait SearchProvider
{
    fn search(
        &mut self,
        request: &SearchRequest,
        picker: &mut PickerEntry<'_>,
    ) -> anyhow::Result<Option<String>>;
}

/// Where the symbol index for the imenu backend comes from
pub trait SymbolSource
{
    fn symbols(
        &self,
        state: &EditorState,
    ) -> Result<Vec<IndexNode>, AtPointError>;
}

impl SymbolSource for Vec<IndexNode>
{
    fn symbols(
        &self,
        _state: &EditorState,
    ) -> Result<Vec<IndexNode>, AtPointError>
    {
        Ok(self.clone())
    }
}

/// No index available; the picker keeps its default selection
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolSource for NoSymbols
{
    fn symbols(
        &self,
        _state: &EditorState,
    ) -> Result<Vec<IndexNode>, AtPointError>
    {
        Ok(Vec::new())
    }
}

/// JSON-lines index file, read on demand
#[derive(Debug, Clone)]
pub struct JsonlSymbols(pub PathBuf);

impl SymbolSource for JsonlSymbols
{
    fn symbols(
        &self,
        _state: &EditorState,
    ) -> Result<Vec<IndexNode>, AtPointError>
    {
        load_index(&self.0)
    }
}

/// Strategy objects a command reads; built once by the host
pub struct Strategies
{
    pub resolver: ResolverChain,
    pub thing: Box<dyn ThingAtPoint>,
    pub precedence: Precedence,
}

impl Strategies
{
    pub fn from_config(cfg: &Config) -> Self
    {
        Self {
            resolver: ResolverChain::from_config(&cfg.root),
            thing: Box::new(cfg.seed.thing),
            precedence: cfg.picker.precedence,
        }
    }

    pub fn with_resolver(
        mut self,
        resolver: ResolverChain,
    ) -> Self
    {
        self.resolver = resolver;
        self
    }

    pub fn with_thing(
        mut self,
        thing: impl ThingAtPoint + 'static,
    ) -> Self
    {
        self.thing = Box::new(thing);
        self
    }
}

impl Default for Strategies
{
    fn default() -> Self
    {
        Self::from_config(&Config::default())
    }
}

/// Result of a dispatched command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome
{
    pub request: SearchRequest,
    pub choice: Option<String>,
}

pub struct Dispatcher
{
    strategies: Strategies,
}

impl Dispatcher
{
    pub fn new(strategies: Strategies) -> Self
    {
        Self { strategies }
    }

    /// Project root for a file, with the working-directory fallback
    pub fn resolve_root(
        &self,
        file: Option<&Path>,
    ) -> PathBuf
    {
        self.strategies
            .resolver
            .resolve(file)
    }

    /// Build the request for `backend`. Collapses the selection when it
    /// was used as the seed.
    #[instrument(level = "debug", skip_all, fields(%backend))]
    pub fn prepare(
        &self,
        backend: Backend,
        state: &mut EditorState,
        symbols: &dyn SymbolSource,
    ) -> Result<SearchRequest, AtPointError>
    {
        state.validate()?;

        // Load the index up front so a bad index fails before the
        // selection is consumed
        let entries = match backend.kind()
        {
            SearchKind::Symbol => flatten(&symbols.symbols(state)?),
            SearchKind::Content | SearchKind::File => Vec::new(),
        };

        let root = self.resolve_root(
            state
                .file
                .as_deref(),
        );
        let seed = ContextExtractor::seed(state, &*self.strategies.thing, backend);
        let line = ContextExtractor::current_line(state);

        let preselect_key = match backend.kind()
        {
            SearchKind::Symbol => select_nearest_entry(&entries, state),
            SearchKind::Content | SearchKind::File => build_preselect_key(
                backend,
                state
                    .file
                    .as_deref(),
                Some(root.as_path()),
                line,
            )
            .map(|k| k.into_string()),
        };

        debug!(
            root = %root.display(),
            seed = %seed.raw,
            line,
            preselect = ?preselect_key,
            "request prepared"
        );

        Ok(SearchRequest {
            backend,
            seed_text: seed.query,
            dialect: backend.dialect(),
            root_path: root,
            preselect_key,
        })
    }

    /// Prepare and run the search, injecting the preselect key into the
    /// provider's picker calls for the duration of the call only
    pub fn run(
        &self,
        backend: Backend,
        state: &mut EditorState,
        symbols: &dyn SymbolSource,
        provider: &mut dyn SearchProvider,
        picker: &mut PickerEntry<'_>,
    ) -> Result<SearchOutcome, AtPointError>
    {
        let request = self.prepare(backend, state, symbols)?;

        let extra = PickerOptions {
            preselect: request
                .preselect_key
                .clone(),
            ..PickerOptions::default()
        };

        let choice = with_preselect(picker, extra, self.strategies.precedence, |p| {
            provider.search(&request, p)
        })
        .map_err(|e| AtPointError::Provider(e.into()))?;

        info!(%backend, chosen = choice.is_some(), "search finished");
        Ok(SearchOutcome { request, choice })
    }

    /// Like [`Dispatcher::run`] for a backend named by an untyped string;
    /// an unknown name fails before anything is touched
    pub fn run_named(
        &self,
        backend: &str,
        state: &mut EditorState,
        symbols: &dyn SymbolSource,
        provider: &mut dyn SearchProvider,
        picker: &mut PickerEntry<'_>,
    ) -> Result<SearchOutcome, AtPointError>
    {
        let backend: Backend = backend.parse()?;
        self.run(backend, state, symbols, provider, picker)
    }
}

#[cfg(test)]
mod tests
{
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::core::{editor::Selection, nearest::IndexEntry, thing::ThingKind};

    type Log = Rc<RefCell<Vec<PickerOptions>>>;

    /// Provider that asks the picker once with its own caller options
    struct OnePick
    {
        fail: bool,
    }

    impl SearchProvider for OnePick
    {
        fn search(
            &mut self,
            request: &SearchRequest,
            picker: &mut PickerEntry<'_>,
        ) -> anyhow::Result<Option<String>>
        {
            let opts = PickerOptions {
                initial_input: Some(
                    request
                        .seed_text
                        .clone(),
                ),
                caller: Some(
                    request
                        .backend
                        .to_string(),
                ),
                ..PickerOptions::default()
            };
            let choice = picker.read(&["a.rs:1:x".to_string()], opts)?;
            if self.fail
            {
                anyhow::bail!("backend crashed");
            }
            Ok(choice)
        }
    }

    fn recording_entry() -> (Log, PickerEntry<'static>)
    {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let entry =
            PickerEntry::new(move |c: &[String], o: &PickerOptions| -> anyhow::Result<Option<String>> {
                sink.borrow_mut()
                    .push(o.clone());
                Ok(c.first()
                    .cloned())
            });
        (log, entry)
    }

    fn fixed_root(root: &'static str) -> Strategies
    {
        Strategies::default()
            .with_resolver(ResolverChain::new().with(move |_: Option<&Path>| Some(PathBuf::from(root))))
    }

    #[test]
    fn content_request_uses_relative_path_key()
    {
        let d = Dispatcher::new(fixed_root("/proj"));
        let mut state = EditorState::new("one\ntwo foo\n", 8).with_file("/proj/src/x.rs");

        let req = d
            .prepare(Backend::Ripgrep, &mut state, &NoSymbols)
            .unwrap();
        assert_eq!(req.root_path, PathBuf::from("/proj"));
        assert_eq!(req.seed_text, "foo");
        assert_eq!(req.preselect_key.as_deref(), Some("src/x.rs:2:"));
    }

    #[test]
    fn scratch_buffer_has_no_preselect()
    {
        let d = Dispatcher::new(fixed_root("/proj"));
        let mut state = EditorState::new("foo", 1);
        let req = d
            .prepare(Backend::GitGrep, &mut state, &NoSymbols)
            .unwrap();
        assert_eq!(req.preselect_key, None);
        assert_eq!(req.seed_text, "foo");
    }

    #[test]
    fn git_grep_seed_is_quoted_as_basic_regex()
    {
        let d = Dispatcher::new(fixed_root("/proj"));
        let mut state =
            EditorState::new("call foo(bar).x", 0).with_selection(Selection::between(5, 15));
        let req = d
            .prepare(Backend::GitGrep, &mut state, &NoSymbols)
            .unwrap();
        assert_eq!(req.seed_text, r"foo(bar)\.x");
        assert_eq!(req.dialect, Some(RegexDialect::Basic));

        let mut plain = EditorState::new("a.b", 0).with_selection(Selection::between(0, 3));
        let req = d
            .prepare(Backend::Fzf, &mut plain, &NoSymbols)
            .unwrap();
        assert_eq!(req.seed_text, "a.b");
        assert_eq!(req.dialect, None);
    }

    #[test]
    fn imenu_preselects_nearest_symbol()
    {
        let d = Dispatcher::new(fixed_root("/proj"));
        let text = "fn a() {}\nfn b() {}\n    let x = 1;\n";
        let mut state = EditorState::new(text, 24).with_file("/proj/m.rs");
        let index = vec![
            IndexNode::Entry(IndexEntry::new("a", 3)),
            IndexNode::Entry(IndexEntry::new("b", 13)),
        ];

        let req = d
            .prepare(Backend::Imenu, &mut state, &index)
            .unwrap();
        assert_eq!(req.preselect_key.as_deref(), Some("b"));
    }

    #[test]
    fn run_injects_preselect_and_tears_down()
    {
        let d = Dispatcher::new(fixed_root("/proj"));
        let (log, mut entry) = recording_entry();
        let mut state = EditorState::new("a.b\n", 0)
            .with_file("/proj/a.rs")
            .with_selection(Selection::between(0, 3));

        let out = d
            .run(Backend::Ripgrep, &mut state, &NoSymbols, &mut OnePick { fail: false }, &mut entry)
            .unwrap();

        assert_eq!(out.choice.as_deref(), Some("a.rs:1:x"));
        let seen = log.borrow();
        assert_eq!(seen[0].preselect.as_deref(), Some("a.rs:1:"));
        assert_eq!(seen[0].initial_input.as_deref(), Some(r"a\.b"));
        assert_eq!(seen[0].caller.as_deref(), Some("rg"));
        assert!(state.selection.is_none());
        assert!(!entry.is_augmented());
    }

    #[test]
    fn provider_failure_leaves_no_stale_state()
    {
        let d = Dispatcher::new(fixed_root("/proj"));
        let (log, mut entry) = recording_entry();
        let mut state = EditorState::new("x\n", 0).with_file("/proj/a.rs");

        let err = d
            .run(Backend::Ripgrep, &mut state, &NoSymbols, &mut OnePick { fail: true }, &mut entry)
            .unwrap_err();
        assert!(matches!(err, AtPointError::Provider(_)));
        assert!(!entry.is_augmented());

        // Later unrelated provider call sees no preselect
        entry
            .read(&[], PickerOptions::default())
            .unwrap();
        assert_eq!(log.borrow()[1].preselect, None);
    }

    #[test]
    fn unknown_backend_aborts_before_touching_state()
    {
        let d = Dispatcher::new(fixed_root("/proj"));
        let (log, mut entry) = recording_entry();
        let mut state = EditorState::new("abc", 0).with_selection(Selection::between(0, 2));

        let err = d
            .run_named("ack", &mut state, &NoSymbols, &mut OnePick { fail: false }, &mut entry)
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(state.selection.is_some());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn caller_precedence_is_honoured()
    {
        struct OwnKey;
        impl SearchProvider for OwnKey
        {
            fn search(
                &mut self,
                _request: &SearchRequest,
                picker: &mut PickerEntry<'_>,
            ) -> anyhow::Result<Option<String>>
            {
                picker.read(&[], PickerOptions::preselect("own"))
            }
        }

        let mut strategies = fixed_root("/proj");
        strategies.precedence = Precedence::Caller;
        let d = Dispatcher::new(strategies.with_thing(ThingKind::None));
        let (log, mut entry) = recording_entry();
        let mut state = EditorState::new("x\n", 0).with_file("/proj/a.rs");

        d.run(Backend::Ripgrep, &mut state, &NoSymbols, &mut OwnKey, &mut entry)
            .unwrap();
        assert_eq!(log.borrow()[0].preselect.as_deref(), Some("own"));
    }
}
