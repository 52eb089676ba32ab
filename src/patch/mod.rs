// Allow must_use_candidate since patcher accessors usually feed assertions
#![allow(clippy::must_use_candidate)]

//! Structured monkey-patching: paired install/restore over named bindings.
//!
//! Overwriting a binding by hand and hoping to remember the cleanup is the
//! classic source of cross-test leakage. A [`Patcher`] makes the replacement
//! a stateful pair: `install` captures the original value before writing the
//! substitute, `restore` puts the original back exactly. A [`PatchSet`] lets
//! a harness track every patcher a test opened and force-restore them after
//! the test body, pass or fail.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::patch::{BindingTable, Bindings, Patcher};
//!
//! let utils: BindingTable<&str> = BindingTable::new();
//! utils.set("mode", "real");
//!
//! let patcher = Patcher::new(utils.clone(), "mode");
//! patcher.install("mocked").unwrap();
//! assert_eq!(utils.binding("mode"), Some("mocked"));
//!
//! patcher.restore().unwrap();
//! assert_eq!(utils.binding("mode"), Some("real"));
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// A surface whose named bindings can be read and replaced.
///
/// This is the seam a [`Patcher`] operates on. [`BindingTable`] is the stock
/// implementation; test fixtures with their own storage can implement the
/// trait directly.
pub trait Bindings<V> {
    /// Look up the binding with the given name.
    fn binding(&self, name: &str) -> Option<V>;

    /// Replace the binding with the given name, returning the previous value.
    ///
    /// `None` removes the binding, mirroring the absent-binding state a
    /// lookup reports as `None`.
    fn replace(&self, name: &str, value: Option<V>) -> Option<V>;
}

/// A shared table of named bindings.
///
/// `Clone` shares the underlying storage, so the system under test and the
/// patcher see the same table. Use [`same_table`](Self::same_table) to assert
/// that two handles refer to one table.
pub struct BindingTable<V> {
    entries: Arc<Mutex<HashMap<String, V>>>,
}

impl<V: Clone> BindingTable<V> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Set a binding, replacing any previous value.
    pub fn set(&self, name: impl Into<String>, value: V) {
        self.entries.lock().insert(name.into(), value);
    }

    /// Whether a binding with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().contains_key(name)
    }

    /// The number of bindings.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the table has no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Whether two handles share the same underlying table.
    pub fn same_table(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<V: Clone> Bindings<V> for BindingTable<V> {
    fn binding(&self, name: &str) -> Option<V> {
        self.entries.lock().get(name).cloned()
    }

    fn replace(&self, name: &str, value: Option<V>) -> Option<V> {
        let mut entries = self.entries.lock();
        match value {
            Some(value) => entries.insert(name.to_owned(), value),
            None => entries.remove(name),
        }
    }
}

impl<V: Clone> Default for BindingTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for BindingTable<V> {
    fn clone(&self) -> Self {
        // Clones share storage; this is what makes patching observable
        // through every handle to the table.
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V: Debug> Debug for BindingTable<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingTable")
            .field("entries", &*self.entries.lock())
            .finish()
    }
}

struct PatcherState<B, V> {
    target: B,
    property: String,
    original: Option<V>,
    installed: bool,
}

/// A paired install/restore unit over one named binding.
///
/// While installed, the target's binding is the substitute; `restore` puts
/// the captured original back exactly, including removing a binding that was
/// absent before `install`. Restoring an uninstalled patcher fails with
/// [`Error::NotInstalled`], deterministically, every time.
///
/// `Clone` shares the install state, which is how a [`PatchSet`] can
/// force-restore a patcher the test still holds.
pub struct Patcher<B, V> {
    state: Arc<Mutex<PatcherState<B, V>>>,
}

impl<B: Bindings<V>, V> Patcher<B, V> {
    /// Create a patcher for the given binding on the given target.
    ///
    /// Nothing is touched until [`install`](Self::install).
    pub fn new(target: B, property: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PatcherState {
                target,
                property: property.into(),
                original: None,
                installed: false,
            })),
        }
    }

    /// Capture the current binding and write `substitute` over it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInstalled`] if this patcher is already
    /// installed. Reinstalling requires a `restore` in between.
    pub fn install(&self, substitute: V) -> Result<()> {
        let mut state = self.state.lock();
        if state.installed {
            return Err(Error::already_installed(state.property.clone()));
        }
        state.original = state.target.replace(&state.property, Some(substitute));
        state.installed = true;
        Ok(())
    }

    /// Put the captured original back and mark the patcher uninstalled.
    ///
    /// A binding that was absent before `install` is removed again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInstalled`] if the patcher is not installed; a
    /// second restore in a row fails the same way.
    pub fn restore(&self) -> Result<()> {
        let mut state = self.state.lock();
        if !state.installed {
            return Err(Error::not_installed(state.property.clone()));
        }
        let original = state.original.take();
        state.target.replace(&state.property, original);
        state.installed = false;
        Ok(())
    }

    /// Whether the substitute is currently in place.
    pub fn is_installed(&self) -> bool {
        self.state.lock().installed
    }

    /// The name of the binding this patcher manages.
    pub fn property(&self) -> String {
        self.state.lock().property.clone()
    }
}

impl<B, V> Clone for Patcher<B, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<B, V> Debug for Patcher<B, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Patcher")
            .field("property", &state.property)
            .field("installed", &state.installed)
            .finish()
    }
}

/// Type-erased view of a tracked patcher, so one set can hold patchers over
/// different target and value types.
trait OpenPatch {
    fn property(&self) -> String;
    fn is_installed(&self) -> bool;
    fn force_restore(&self) -> Result<()>;
}

impl<B: Bindings<V> + 'static, V: 'static> OpenPatch for Patcher<B, V> {
    fn property(&self) -> String {
        self.property()
    }

    fn is_installed(&self) -> bool {
        self.is_installed()
    }

    fn force_restore(&self) -> Result<()> {
        self.restore()
    }
}

/// A collection of tracked patchers for harness-driven cleanup.
///
/// A test harness creates one set per test, routes patcher creation through
/// it, and calls [`restore_all`](Self::restore_all) after the test body
/// regardless of outcome.
///
/// # Example
///
/// ```rust
/// use testkit_mock::patch::{BindingTable, Bindings, PatchSet};
///
/// let utils: BindingTable<i32> = BindingTable::new();
/// utils.set("answer", 42);
///
/// let patches = PatchSet::new();
/// let patcher = patches.patcher(utils.clone(), "answer");
/// patcher.install(0).unwrap();
///
/// assert_eq!(patches.open_patchers(), vec!["answer".to_string()]);
///
/// assert_eq!(patches.restore_all(), 1);
/// assert_eq!(utils.binding("answer"), Some(42));
/// assert!(patches.open_patchers().is_empty());
/// ```
#[derive(Default)]
pub struct PatchSet {
    tracked: Mutex<Vec<Box<dyn OpenPatch>>>,
}

impl PatchSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            tracked: Mutex::new(Vec::new()),
        }
    }

    /// Create a patcher for the given binding and track it.
    pub fn patcher<B, V>(&self, target: B, property: impl Into<String>) -> Patcher<B, V>
    where
        B: Bindings<V> + 'static,
        V: 'static,
    {
        let patcher = Patcher::new(target, property);
        self.track(&patcher);
        patcher
    }

    /// Track an existing patcher.
    pub fn track<B, V>(&self, patcher: &Patcher<B, V>)
    where
        B: Bindings<V> + 'static,
        V: 'static,
    {
        self.tracked.lock().push(Box::new(patcher.clone()));
    }

    /// The binding names of every tracked patcher that is still installed.
    pub fn open_patchers(&self) -> Vec<String> {
        self.tracked
            .lock()
            .iter()
            .filter(|patch| patch.is_installed())
            .map(|patch| patch.property())
            .collect()
    }

    /// Restore every tracked patcher that is still installed.
    ///
    /// Patchers the test already restored are skipped. Returns how many were
    /// restored by this call.
    pub fn restore_all(&self) -> usize {
        let tracked = self.tracked.lock();
        let mut restored = 0;
        for patch in tracked.iter() {
            if patch.is_installed() && patch.force_restore().is_ok() {
                restored += 1;
            }
        }
        restored
    }

    /// The number of tracked patchers, installed or not.
    pub fn len(&self) -> usize {
        self.tracked.lock().len()
    }

    /// Whether the set tracks no patchers.
    pub fn is_empty(&self) -> bool {
        self.tracked.lock().is_empty()
    }
}

impl Debug for PatchSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchSet")
            .field("tracked", &self.len())
            .field("open", &self.open_patchers())
            .finish()
    }
}
