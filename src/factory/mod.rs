// Allow must_use_candidate since scope accessors usually feed assertions
#![allow(clippy::must_use_candidate)]

//! Full-module substitution at the resolution boundary.
//!
//! Patching bindings works only when the target surface can be mutated after
//! the fact. When bindings are fixed, the replacement has to happen where an
//! identifier is mapped to a module surface instead. [`ModuleMocks`] sits at
//! that boundary: registered identifiers resolve to a factory-built mock
//! surface, everything else falls through to the real [`Resolver`]. The real
//! module is never touched.
//!
//! The scope has an explicit lifecycle. Each test registers what it needs and
//! calls [`unregister_all`](ModuleMocks::unregister_all) when done; leaking
//! registrations into the next test is the hazard this design exists to
//! prevent.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::factory::{ModuleMocks, Resolver};
//!
//! let mocks: ModuleMocks<&str> = ModuleMocks::new();
//! let real = |_identifier: &str| "real surface";
//!
//! mocks.register("utils", || "mock surface").unwrap();
//!
//! assert_eq!(mocks.resolve("utils", &real), "mock surface");
//! assert_eq!(mocks.resolve("other", &real), "real surface");
//!
//! mocks.unregister_all();
//! assert_eq!(mocks.resolve("utils", &real), "real surface");
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// The real module-resolution mechanism, as seen by [`ModuleMocks`].
///
/// Any `Fn(&str) -> S` closure is a resolver.
pub trait Resolver<S> {
    /// Map an identifier to its real module surface.
    fn resolve(&self, identifier: &str) -> S;
}

impl<S, F> Resolver<S> for F
where
    F: Fn(&str) -> S,
{
    fn resolve(&self, identifier: &str) -> S {
        self(identifier)
    }
}

type SurfaceFactory<S> = Box<dyn FnOnce() -> S + Send>;

/// One registration: the factory, not yet run, or the surface it built.
///
/// The factory runs at most once; after that every resolve in the scope gets
/// a clone of the same memoized surface.
struct Registration<S> {
    factory: Option<SurfaceFactory<S>>,
    surface: Option<S>,
}

/// A scope of module mock registrations.
///
/// `Clone` shares the scope, so the resolution shim and the test can hold
/// separate handles. Parallel test workers must each build their own scope;
/// the type makes no cross-scope guarantees.
///
/// Per identifier the scope moves through
/// `Unregistered -> Registered -> (Resolved)* -> Unregistered`; repeated
/// resolves stay `Registered` and return the cached surface.
pub struct ModuleMocks<S> {
    scope: Arc<Mutex<HashMap<String, Registration<S>>>>,
}

impl<S: Clone> ModuleMocks<S> {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self {
            scope: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a factory for the given identifier.
    ///
    /// The factory is not run here; it runs on the first
    /// [`resolve`](Self::resolve) of the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRegistration`] if the identifier is already
    /// registered in this scope.
    pub fn register<F>(&self, identifier: impl Into<String>, factory: F) -> Result<()>
    where
        F: FnOnce() -> S + Send + 'static,
    {
        let identifier = identifier.into();
        let mut scope = self.scope.lock();
        if scope.contains_key(&identifier) {
            return Err(Error::duplicate_registration(identifier));
        }
        scope.insert(
            identifier,
            Registration {
                factory: Some(Box::new(factory)),
                surface: None,
            },
        );
        Ok(())
    }

    /// Resolve an identifier, preferring a registered mock.
    ///
    /// For a registered identifier the factory runs on the first resolve and
    /// never again; every resolve in the scope returns the same memoized
    /// surface. Unregistered identifiers delegate to `real`.
    pub fn resolve<R>(&self, identifier: &str, real: &R) -> S
    where
        R: Resolver<S>,
    {
        {
            let mut scope = self.scope.lock();
            if let Some(registration) = scope.get_mut(identifier) {
                if let Some(factory) = registration.factory.take() {
                    registration.surface = Some(factory());
                }
                if let Some(surface) = &registration.surface {
                    return surface.clone();
                }
            }
        }
        real.resolve(identifier)
    }

    /// The memoized mock surface for an identifier, without resolving.
    ///
    /// `None` if the identifier is unregistered or its factory has not run
    /// yet.
    pub fn mocked(&self, identifier: &str) -> Option<S> {
        self.scope
            .lock()
            .get(identifier)
            .and_then(|registration| registration.surface.clone())
    }

    /// Whether the identifier is registered in this scope.
    pub fn is_registered(&self, identifier: &str) -> bool {
        self.scope.lock().contains_key(identifier)
    }

    /// The number of registered identifiers.
    pub fn registered_count(&self) -> usize {
        self.scope.lock().len()
    }

    /// Clear every registration and memoized surface.
    ///
    /// Subsequent resolves fall back to real resolution. Call this between
    /// tests.
    pub fn unregister_all(&self) {
        self.scope.lock().clear();
    }
}

impl<S: Clone> Default for ModuleMocks<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for ModuleMocks<S> {
    fn clone(&self) -> Self {
        // Clones share the scope.
        Self {
            scope: Arc::clone(&self.scope),
        }
    }
}

impl<S> Debug for ModuleMocks<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = self.scope.lock();
        let mut identifiers: Vec<&String> = scope.keys().collect();
        identifiers.sort();
        f.debug_struct("ModuleMocks")
            .field("registered", &identifiers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn real(identifier: &str) -> String {
        format!("real:{identifier}")
    }

    #[test]
    fn test_unregistered_falls_through_to_real() {
        let mocks: ModuleMocks<String> = ModuleMocks::new();

        assert_eq!(mocks.resolve("utils", &real), "real:utils");
    }

    #[test]
    fn test_registered_resolves_to_mock() {
        let mocks: ModuleMocks<String> = ModuleMocks::new();
        mocks.register("utils", || "mock:utils".to_string()).unwrap();

        assert_eq!(mocks.resolve("utils", &real), "mock:utils");
        // other identifiers are unaffected
        assert_eq!(mocks.resolve("net", &real), "real:net");
    }

    #[test]
    fn test_factory_runs_exactly_once() {
        static RUNS: AtomicUsize = AtomicUsize::new(0);

        let mocks: ModuleMocks<Arc<String>> = ModuleMocks::new();
        mocks
            .register("utils", || {
                RUNS.fetch_add(1, Ordering::SeqCst);
                Arc::new("mock".to_string())
            })
            .unwrap();

        let real = |identifier: &str| Arc::new(format!("real:{identifier}"));
        let first = mocks.resolve("utils", &real);
        let second = mocks.resolve("utils", &real);

        assert_eq!(RUNS.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_register_before_resolve_defers_factory() {
        let mocks: ModuleMocks<String> = ModuleMocks::new();
        mocks.register("utils", || "mock".to_string()).unwrap();

        assert!(mocks.is_registered("utils"));
        assert_eq!(mocks.mocked("utils"), None);

        mocks.resolve("utils", &real);
        assert_eq!(mocks.mocked("utils"), Some("mock".to_string()));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mocks: ModuleMocks<String> = ModuleMocks::new();
        mocks.register("utils", || "first".to_string()).unwrap();

        assert_eq!(
            mocks.register("utils", || "second".to_string()),
            Err(Error::duplicate_registration("utils")),
        );
        // the original registration is intact
        assert_eq!(mocks.resolve("utils", &real), "first");
    }

    #[test]
    fn test_unregister_all_restores_real_resolution() {
        let mocks: ModuleMocks<String> = ModuleMocks::new();
        mocks.register("utils", || "mock".to_string()).unwrap();
        assert_eq!(mocks.resolve("utils", &real), "mock");

        mocks.unregister_all();

        assert!(!mocks.is_registered("utils"));
        assert_eq!(mocks.registered_count(), 0);
        assert_eq!(mocks.resolve("utils", &real), "real:utils");
    }

    #[test]
    fn test_reregister_after_unregister_all() {
        let mocks: ModuleMocks<String> = ModuleMocks::new();
        mocks.register("utils", || "first".to_string()).unwrap();
        mocks.unregister_all();

        mocks.register("utils", || "second".to_string()).unwrap();
        assert_eq!(mocks.resolve("utils", &real), "second");
    }

    #[test]
    fn test_clone_shares_scope() {
        let mocks: ModuleMocks<String> = ModuleMocks::new();
        let handle = mocks.clone();

        mocks.register("utils", || "mock".to_string()).unwrap();
        assert_eq!(handle.resolve("utils", &real), "mock");

        handle.unregister_all();
        assert!(!mocks.is_registered("utils"));
    }

    #[test]
    fn test_debug_lists_identifiers() {
        let mocks: ModuleMocks<String> = ModuleMocks::new();
        mocks.register("utils", String::new).unwrap();

        let debug = format!("{mocks:?}");
        assert!(debug.contains("utils"));
    }
}
