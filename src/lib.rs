//! **atpoint** - Search parameters from editor cursor state
//!
//! Derives a project root, a seed query and a preselect key from an editor
//! snapshot, and injects the preselect into one call of an external search
//! picker with guaranteed teardown. The search itself is someone else's job.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Command handlers that print results for the CLI
pub mod cli_ext {
    /// `atp request` and `atp nearest`
    pub mod request_cmd;

    /// `atp pick`
    pub mod pick_cmd;

    /// `atp root`
    pub mod root_cmd;
}

/// Domain logic - everything a command derives from the editor snapshot
pub mod core {
    /// Read-mostly editor snapshot (text, cursor, selection, narrowing)
    pub mod editor;
    pub use editor::{EditorState, Selection};

    /// Pluggable thing-at-point extractors
    pub mod thing;
    pub use thing::{ThingAtPoint, ThingKind};

    /// Project root resolver chain with working-directory fallback
    pub mod root;
    pub use root::{MarkerResolver, ResolverChain, RootResolver, VcsResolver};

    /// Seed text and cursor line extraction
    pub mod context;
    pub use context::{ContextExtractor, SeedText};

    /// Closed set of search backends
    pub mod backend;
    pub use backend::{Backend, RegexDialect, SearchKind};

    /// Preselect key construction and prefix matching
    pub mod preselect;
    pub use preselect::{PreselectKey, build_preselect_key};

    /// Nearest symbol-index entry for the cursor line
    pub mod nearest;
    pub use nearest::{DocMarker, EntryPosition, IndexEntry, IndexNode, nearest_entry};

    /// One-shot picker interception with guaranteed teardown
    pub mod picker;
    pub use picker::{Picker, PickerEntry, PickerOptions, Precedence, with_preselect};

    /// Request building and provider dispatch
    pub mod dispatch;
    pub use dispatch::{AtPointError, Dispatcher, SearchProvider, SearchRequest, Strategies};
}

/// Infrastructure - Configuration, logging, and utilities
pub mod infra {
    /// Configuration management with TOML support and env overrides
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Tracing subscriber setup for the binary
    pub mod logging;

    /// LF/CRLF-robust newline index for byte→line mapping
    pub mod line_index;
    pub use line_index::NewlineIndex;

    /// Text and path helpers
    pub mod utils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use infra::{Config, load_config};

// Core types for external consumers
pub use core::{
    AtPointError, Backend, Dispatcher, EditorState, PickerEntry, PickerOptions, SearchProvider,
    SearchRequest, Strategies,
};
