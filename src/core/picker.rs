//! One-shot picker interception with guaranteed teardown.
//!
//! Search providers call the picker through a [`PickerEntry`]. While a
//! [`PreselectGuard`] is alive, every call through that entry gets extra
//! options (normally the preselect key) merged into whatever the provider
//! asked for. Dropping the guard restores the previous state, whether the
//! wrapped body returned, failed or panicked.

use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Which side wins when caller and injected options set the same field
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Precedence
{
    /// Injected options override the provider's own
    #[default]
    Injected,
    /// The provider's own options are kept; injected ones only fill gaps
    Caller,
}

/// Options a picker understands. Unset fields mean "picker default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerOptions
{
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_input: Option<String>,

    /// Literal, unescaped prefix of the candidate to highlight first.
    /// Pickers compare it with `starts_with`; ones that only take a
    /// pattern use `PreselectKey::anchored_pattern` instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preselect: Option<String>,

    /// Name of the command driving the picker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
}

impl PickerOptions
{
    pub fn preselect(key: impl Into<String>) -> Self
    {
        Self { preselect: Some(key.into()), ..Self::default() }
    }

    /// Field-wise merge. The winning side's set fields are kept; the
    /// other side only fills fields the winner left unset.
    pub fn merge(
        caller: PickerOptions,
        injected: PickerOptions,
        precedence: Precedence,
    ) -> PickerOptions
    {
        let (win, lose) = match precedence
        {
            Precedence::Injected => (injected, caller),
            Precedence::Caller => (caller, injected),
        };

        PickerOptions {
            prompt: win
                .prompt
                .or(lose.prompt),
            initial_input: win
                .initial_input
                .or(lose.initial_input),
            preselect: win
                .preselect
                .or(lose.preselect),
            caller: win
                .caller
                .or(lose.caller),
        }
    }

    pub fn is_empty(&self) -> bool
    {
        *self == Self::default()
    }
}

/// The external picker: shows candidates, returns the user's choice
pub trait Picker
{
    fn read(
        &mut self,
        candidates: &[String],
        options: &PickerOptions,
    ) -> Result<Option<String>>;
}

impl<F> Picker for F
where
    F: FnMut(&[String], &PickerOptions) -> Result<Option<String>>,
{
    fn read(
        &mut self,
        candidates: &[String],
        options: &PickerOptions,
    ) -> Result<Option<String>>
    {
        self(candidates, options)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Augmentation
{
    options: PickerOptions,
    precedence: Precedence,
}

/// The picker entry point providers call through
pub struct PickerEntry<'p>
{
    picker: Box<dyn Picker + 'p>,
    augmentation: Option<Augmentation>,
}

impl fmt::Debug for PickerEntry<'_>
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.debug_struct("PickerEntry")
            .field("augmentation", &self.augmentation)
            .finish_non_exhaustive()
    }
}

impl<'p> PickerEntry<'p>
{
    pub fn new(picker: impl Picker + 'p) -> Self
    {
        Self { picker: Box::new(picker), augmentation: None }
    }

    /// Call the picker, merging any active augmentation into `options`
    pub fn read(
        &mut self,
        candidates: &[String],
        options: PickerOptions,
    ) -> Result<Option<String>>
    {
        let merged = match &self.augmentation
        {
            Some(aug) => PickerOptions::merge(options, aug.options.clone(), aug.precedence),
            None => options,
        };
        trace!(?merged, candidates = candidates.len(), "picker read");

        self.picker
            .read(candidates, &merged)
    }

    /// Whether a guard is currently injecting options
    pub fn is_augmented(&self) -> bool
    {
        self.augmentation
            .is_some()
    }

    /// Options the active guard injects, if any
    pub fn injected(&self) -> Option<&PickerOptions>
    {
        self.augmentation
            .as_ref()
            .map(|a| &a.options)
    }

    /// Install `extra` until the returned guard drops. Guards nest: the
    /// innermost one is active and dropping it reinstates the outer one.
    pub fn install(
        &mut self,
        extra: PickerOptions,
        precedence: Precedence,
    ) -> PreselectGuard<'_, 'p>
    {
        let previous = self
            .augmentation
            .replace(Augmentation { options: extra, precedence });
        PreselectGuard { entry: self, previous }
    }
}

/// Scope of one augmentation; derefs to the entry it augments
pub struct PreselectGuard<'e, 'p>
{
    entry: &'e mut PickerEntry<'p>,
    previous: Option<Augmentation>,
}

impl<'p> Deref for PreselectGuard<'_, 'p>
{
    type Target = PickerEntry<'p>;

    fn deref(&self) -> &Self::Target
    {
        &*self.entry
    }
}

impl DerefMut for PreselectGuard<'_, '_>
{
    fn deref_mut(&mut self) -> &mut Self::Target
    {
        &mut *self.entry
    }
}

impl Drop for PreselectGuard<'_, '_>
{
    fn drop(&mut self)
    {
        let previous = self
            .previous
            .take();
        self.entry
            .augmentation = previous;
        trace!(restored = self.entry.is_augmented(), "picker augmentation removed");
    }
}

/// Run `body` with `extra` merged into every picker call it makes
/// through `entry`; the augmentation is gone once this returns, on
/// success, on error and during unwinding.
#[instrument(level = "debug", skip(entry, body), fields(preselect = ?extra.preselect))]
pub fn with_preselect<'p, T, E>(
    entry: &mut PickerEntry<'p>,
    extra: PickerOptions,
    precedence: Precedence,
    body: impl FnOnce(&mut PickerEntry<'p>) -> Result<T, E>,
) -> Result<T, E>
{
    let mut guard = entry.install(extra, precedence);
    let out = body(&mut *guard);
    if out.is_err()
    {
        debug!("wrapped picker call failed; tearing down augmentation");
    }
    out
}
