use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cli::{AppContext, InitArgs},
    core::{picker::Precedence, thing::ThingKind},
};

/// Prefix of the environment overrides
const ENV_PREFIX: &str = "ATPOINT";

/// Config file names, tried in order; the first one found wins
const CONFIG_FILES: [&str; 4] = ["atpoint.toml", ".atpoint.toml", "atpoint.yaml", "atpoint.json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config
{
    /// Project root resolution
    pub root: RootConfig,

    /// Seed text extraction
    pub seed: SeedConfig,

    /// Picker option merging
    pub picker: PickerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RootConfig
{
    /// Marker files/dirs that identify a project root, tried before VCS
    pub markers: Vec<String>,

    /// Fall back to the version-control toplevel
    pub vcs: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeedConfig
{
    /// Which thing-at-point extractor seeds the query
    pub thing: ThingKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PickerConfig
{
    /// Who wins when caller and injected picker options overlap
    pub precedence: Precedence,
}

impl Default for RootConfig
{
    fn default() -> Self
    {
        Self {
            markers: vec![".project-root".to_string(), ".projectile".to_string()],
            vcs: true,
        }
    }
}

/// Load configuration from the current directory and environment
pub fn load_config() -> Result<Config>
{
    load_config_from(Path::new("."))
}

/// Load configuration layering the first config file found in `dir`
/// under `ATPOINT_*` environment variables (`ATPOINT_ROOT__VCS=false`,
/// `ATPOINT_ROOT__MARKERS=.project-root,BUILD`).
pub fn load_config_from(dir: &Path) -> Result<Config>
{
    load_layers(dir, None)
}

/// Environment source; `vars` replaces the process environment when set
fn environment(vars: Option<config::Map<String, String>>) -> config::Environment
{
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("root.markers")
        .source(vars)
}

fn load_layers(
    dir: &Path,
    vars: Option<config::Map<String, String>>,
) -> Result<Config>
{
    let mut builder = config::Config::builder();

    if let Some(path) = CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
    {
        debug!(path = %path.display(), "loading config file");
        builder = builder.add_source(config::File::from(path));
    }

    let cfg = builder
        .add_source(environment(vars))
        .build()
        .context("Failed to load configuration")?;

    cfg.try_deserialize()
        .context("Failed to parse configuration")
}

/// Text `atp init` writes: the defaults under a header naming the
/// environment overrides
pub fn render_default() -> Result<String>
{
    let body =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")?;
    Ok(format!("{INIT_HEADER}\n{body}"))
}

const INIT_HEADER: &str = "\
# atpoint configuration
#
# Any key can be overridden from the environment:
#   ATPOINT_ROOT__VCS=false
#   ATPOINT_ROOT__MARKERS=.project-root,BUILD
#   ATPOINT_SEED__THING=word
#   ATPOINT_PICKER__PRECEDENCE=caller
";

/// Write a default `atpoint.toml` into `args.path`. An existing file is
/// only replaced with `--force`; without it creation is exclusive.
pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let text = render_default()?;
    fs::create_dir_all(&args.path)
        .with_context(|| format!("Failed to create {}", args.path.display()))?;

    let path = args
        .path
        .join(CONFIG_FILES[0]);

    let mut options = OpenOptions::new();
    options.write(true);
    if args.force
    {
        options
            .create(true)
            .truncate(true);
    }
    else
    {
        options.create_new(true);
    }

    let mut file = match options.open(&path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists =>
        {
            anyhow::bail!("{} already exists; pass --force to replace it", path.display())
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to create {}", path.display())),
    };
    file.write_all(text.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!(path = %path.display(), force = args.force, "default config written");
    if !ctx.quiet
    {
        println!("Created {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use assert_fs::prelude::*;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>>
    {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_apply_without_a_file() -> Result<()>
    {
        let tmp = assert_fs::TempDir::new()?;
        let cfg = load_layers(tmp.path(), env(&[]))?;
        assert_eq!(cfg, Config::default());
        Ok(())
    }

    #[test]
    fn partial_file_keeps_other_defaults() -> Result<()>
    {
        let tmp = assert_fs::TempDir::new()?;
        tmp.child("atpoint.toml")
            .write_str("[seed]\nthing = \"word\"\n\n[root]\nmarkers = [\"Cargo.toml\"]\n")?;

        let cfg = load_layers(tmp.path(), env(&[]))?;
        assert_eq!(cfg.seed.thing, ThingKind::Word);
        assert_eq!(cfg.root.markers, vec!["Cargo.toml".to_string()]);
        assert!(cfg.root.vcs);
        assert_eq!(cfg.picker.precedence, Precedence::Injected);
        Ok(())
    }

    #[test]
    fn env_overrides_a_boolean() -> Result<()>
    {
        let tmp = assert_fs::TempDir::new()?;
        let cfg = load_layers(tmp.path(), env(&[("ATPOINT_ROOT__VCS", "false")]))?;
        assert!(!cfg.root.vcs);
        assert_eq!(cfg.root.markers, RootConfig::default().markers);
        Ok(())
    }

    #[test]
    fn env_markers_split_on_commas() -> Result<()>
    {
        let tmp = assert_fs::TempDir::new()?;
        let cfg = load_layers(
            tmp.path(),
            env(&[("ATPOINT_ROOT__MARKERS", "BUILD,WORKSPACE")]),
        )?;
        assert_eq!(cfg.root.markers, vec!["BUILD".to_string(), "WORKSPACE".to_string()]);
        Ok(())
    }

    #[test]
    fn env_marker_layers_over_file_without_losing_it() -> Result<()>
    {
        let tmp = assert_fs::TempDir::new()?;
        tmp.child("atpoint.toml")
            .write_str("[seed]\nthing = \"word\"\n")?;

        let cfg = load_layers(
            tmp.path(),
            env(&[("ATPOINT_ROOT__MARKERS", "BUILD"), ("ATPOINT_PICKER__PRECEDENCE", "caller")]),
        )?;
        assert_eq!(cfg.seed.thing, ThingKind::Word);
        assert_eq!(cfg.root.markers, vec!["BUILD".to_string()]);
        assert_eq!(cfg.picker.precedence, Precedence::Caller);
        Ok(())
    }

    #[test]
    fn rendered_default_parses_back_to_defaults() -> Result<()>
    {
        let text = render_default()?;
        assert!(text.starts_with("# atpoint configuration"));
        assert!(text.contains("ATPOINT_ROOT__MARKERS"));
        let back: Config = toml::from_str(&text)?;
        assert_eq!(back, Config::default());
        Ok(())
    }

    #[test]
    fn init_refuses_to_clobber_without_force() -> Result<()>
    {
        let tmp = assert_fs::TempDir::new()?;
        let ctx = AppContext { quiet: true, no_color: true };
        let args = |force| InitArgs { path: tmp.path().to_path_buf(), force };

        init(args(false), &ctx)?;
        tmp.child("atpoint.toml")
            .write_str("[seed]\nthing = \"word\"\n")?;

        let err = init(args(false), &ctx).unwrap_err();
        assert!(err.to_string().contains("--force"));
        tmp.child("atpoint.toml")
            .assert(predicates::str::contains("word"));

        init(args(true), &ctx)?;
        tmp.child("atpoint.toml")
            .assert(predicates::str::contains("ATPOINT_ROOT__VCS"));
        Ok(())
    }
}
