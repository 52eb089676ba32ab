// Allow must_use_candidate since substitute accessors often back assertions
#![allow(clippy::must_use_candidate)]

//! Substitute callables: the stand-ins a test installs over real dependencies.
//!
//! A [`Substitute`] wraps an optional, swappable implementation and records
//! every call through a shared [`CallRecorder`]. Calls are recorded whether
//! or not an implementation is set, and whether or not it fails.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::substitute::Substitute;
//!
//! // Controlled behavior: always double the input.
//! let substitute: Substitute<i32, i32> = Substitute::with_implementation(|x| Ok(x * 2));
//!
//! assert_eq!(substitute.call(5).unwrap(), Some(10));
//! assert_eq!(substitute.call_count(), 1);
//! assert_eq!(substitute.nth_call(1).unwrap().args, 5);
//! ```
//!
//! A substitute without an implementation still records:
//!
//! ```rust
//! use testkit_mock::substitute::Substitute;
//!
//! let substitute: Substitute<&str, i32> = Substitute::new();
//!
//! assert_eq!(substitute.call("ping").unwrap(), None);
//! assert!(substitute.was_called());
//! ```

use std::convert::Infallible;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::matcher::Matcher;
use crate::record::{CallOutcome, CallRecorder, Invocation, MatchedCalls};

type Implementation<A, R, E> = Box<dyn Fn(A) -> std::result::Result<R, E> + Send>;

/// A callable test double backed by a [`CallRecorder`].
///
/// `Clone` shares both the implementation slot and the call history, so the
/// system under test can own one handle while the test asserts through
/// another.
///
/// # Type Parameters
///
/// - `A` - The argument type (a tuple for multi-argument callables)
/// - `R` - The return type
/// - `E` - The error type of fallible implementations; defaults to
///   [`Infallible`] for implementations that cannot fail
pub struct Substitute<A, R, E = Infallible> {
    implementation: Arc<Mutex<Option<Implementation<A, R, E>>>>,
    recorder: CallRecorder<A, R, E>,
}

impl<A, R, E> Substitute<A, R, E>
where
    A: Clone,
    R: Clone,
    E: Clone,
{
    /// Create a substitute with no implementation.
    ///
    /// Calls are recorded with [`CallOutcome::NoValue`] and return
    /// `Ok(None)`.
    pub fn new() -> Self {
        Self {
            implementation: Arc::new(Mutex::new(None)),
            recorder: CallRecorder::new(),
        }
    }

    /// Create a substitute with the given implementation.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_mock::substitute::Substitute;
    ///
    /// let substitute: Substitute<(String, String), String> =
    ///     Substitute::with_implementation(|(p1, _p2)| Ok(p1));
    ///
    /// let winner = substitute.call(("A".into(), "B".into())).unwrap();
    /// assert_eq!(winner.as_deref(), Some("A"));
    /// ```
    pub fn with_implementation<F>(implementation: F) -> Self
    where
        F: Fn(A) -> std::result::Result<R, E> + Send + 'static,
    {
        Self {
            implementation: Arc::new(Mutex::new(Some(Box::new(implementation)))),
            recorder: CallRecorder::new(),
        }
    }

    /// Create a substitute that returns a fixed value on every call.
    pub fn returning(value: R) -> Self
    where
        R: Send + 'static,
    {
        Self::with_implementation(move |_args| Ok(value.clone()))
    }

    /// Create a substitute that forwards to a captured original function.
    ///
    /// This is the spy configuration: behavior is unchanged, calls are still
    /// recorded.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_mock::substitute::Substitute;
    ///
    /// fn add_one(x: i32) -> i32 { x + 1 }
    ///
    /// let spy: Substitute<i32, i32> = Substitute::passthrough(add_one);
    ///
    /// assert_eq!(spy.call(4).unwrap(), Some(5));
    /// assert_eq!(spy.call_count(), 1);
    /// ```
    pub fn passthrough<F>(original: F) -> Self
    where
        F: Fn(A) -> R + Send + 'static,
    {
        Self::with_implementation(move |args| Ok(original(args)))
    }

    /// Call the substitute.
    ///
    /// The call is recorded before anything is returned, so failed calls are
    /// visible to observers:
    ///
    /// - implementation returns `Ok(value)`: records
    ///   [`CallOutcome::Returned`], returns `Ok(Some(value))`
    /// - implementation returns `Err(err)`: records [`CallOutcome::Failed`],
    ///   then returns `Err(err)` unchanged
    /// - no implementation: records [`CallOutcome::NoValue`], returns
    ///   `Ok(None)`
    ///
    /// # Errors
    ///
    /// Propagates whatever error the implementation produced. The substitute
    /// never fails on its own.
    pub fn call(&self, args: A) -> std::result::Result<Option<R>, E> {
        let implementation = self.implementation.lock();
        match implementation.as_ref() {
            Some(f) => match f(args.clone()) {
                Ok(value) => {
                    self.recorder
                        .record(args, CallOutcome::Returned(value.clone()));
                    Ok(Some(value))
                }
                Err(err) => {
                    self.recorder.record(args, CallOutcome::Failed(err.clone()));
                    Err(err)
                }
            },
            None => {
                self.recorder.record(args, CallOutcome::NoValue);
                Ok(None)
            }
        }
    }

    /// Replace the implementation. Takes effect for subsequent calls only;
    /// already-recorded calls are untouched.
    pub fn set_implementation<F>(&self, implementation: F)
    where
        F: Fn(A) -> std::result::Result<R, E> + Send + 'static,
    {
        *self.implementation.lock() = Some(Box::new(implementation));
    }

    /// Remove the implementation. Subsequent calls record
    /// [`CallOutcome::NoValue`] and return `Ok(None)`.
    pub fn clear_implementation(&self) {
        *self.implementation.lock() = None;
    }

    /// Whether an implementation is currently set.
    pub fn has_implementation(&self) -> bool {
        self.implementation.lock().is_some()
    }

    /// Get a handle to the backing recorder.
    pub fn recorder(&self) -> CallRecorder<A, R, E> {
        self.recorder.clone()
    }

    /// Get the number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.recorder.call_count()
    }

    /// Check if the substitute was called at least once.
    pub fn was_called(&self) -> bool {
        self.recorder.was_called()
    }

    /// Check if the substitute was called exactly N times.
    pub fn was_called_times(&self, n: usize) -> bool {
        self.recorder.was_called_times(n)
    }

    /// Get a snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<Invocation<A, R, E>> {
        self.recorder.calls()
    }

    /// Get the calls whose arguments satisfy `matcher`.
    pub fn calls_with<M: Matcher<A>>(&self, matcher: M) -> MatchedCalls<A, R, E, M> {
        self.recorder.calls_with(matcher)
    }

    /// Get the nth call (1-indexed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`](crate::Error::OutOfRange) when `n` is
    /// zero or exceeds [`call_count`](Self::call_count).
    pub fn nth_call(&self, n: usize) -> Result<Invocation<A, R, E>> {
        self.recorder.nth_call(n)
    }

    /// Get the most recent call.
    pub fn last_call(&self) -> Option<Invocation<A, R, E>> {
        self.recorder.last_call()
    }

    /// Clear the call history. The implementation stays in place.
    pub fn reset(&self) {
        self.recorder.reset();
    }
}

impl<A: Clone, R: Clone, E: Clone> Default for Substitute<A, R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R, E> Clone for Substitute<A, R, E> {
    fn clone(&self) -> Self {
        // Clones share the implementation slot and the call history.
        Self {
            implementation: Arc::clone(&self.implementation),
            recorder: self.recorder.clone(),
        }
    }
}

impl<A: Debug, R: Debug, E: Debug> Debug for Substitute<A, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Substitute")
            .field("has_implementation", &self.implementation.lock().is_some())
            .field("recorder", &self.recorder)
            .finish()
    }
}
