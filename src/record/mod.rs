// Allow must_use_candidate since recorder accessors are often called for their
// side of an assertion rather than their value
#![allow(clippy::must_use_candidate)]

//! Call recording for test doubles.
//!
//! This module provides [`CallRecorder`], the observation half of every test
//! double in this crate. A recorder owns an ordered history of
//! [`Invocation`]s; insertion order is call order. The recorder is normally
//! driven by a [`Substitute`](crate::substitute::Substitute), while tests hold
//! a cloned handle and assert against the shared history.
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::record::{CallOutcome, CallRecorder};
//!
//! let recorder: CallRecorder<i32, i32, String> = CallRecorder::new();
//!
//! recorder.record(2, CallOutcome::Returned(4));
//! recorder.record(3, CallOutcome::Returned(9));
//!
//! assert_eq!(recorder.call_count(), 2);
//! assert_eq!(recorder.nth_call(1).unwrap().args, 2);
//! assert_eq!(recorder.nth_call(2).unwrap().args, 3);
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::matcher::Matcher;

/// What a recorded call produced.
///
/// A substitute without an implementation records [`CallOutcome::NoValue`].
/// A failing implementation records [`CallOutcome::Failed`] before the error
/// is returned to the caller, so observers see failed calls too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<R, E> {
    /// The implementation returned a value.
    Returned(R),
    /// No implementation was set; the call produced no value.
    NoValue,
    /// The implementation failed with an error.
    Failed(E),
}

impl<R, E> CallOutcome<R, E> {
    /// The returned value, if the call returned one.
    pub fn returned(&self) -> Option<&R> {
        match self {
            Self::Returned(value) => Some(value),
            _ => None,
        }
    }

    /// The error, if the call failed.
    pub fn failed(&self) -> Option<&E> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the call failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Whether the call produced no value (no implementation was set).
    pub fn is_no_value(&self) -> bool {
        matches!(self, Self::NoValue)
    }
}

/// A record of a single call. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<A, R, E> {
    /// The arguments passed to the call.
    pub args: A,
    /// What the call produced.
    pub outcome: CallOutcome<R, E>,
    /// Zero-based position of this call in the recorder's history.
    pub sequence: usize,
}

/// Ordered history of calls made through a test double.
///
/// `Clone` shares the underlying history, so a test can keep one handle while
/// the substitute it backs holds another.
///
/// # Type Parameters
///
/// - `A` - The argument type (must be `Clone` for recording)
/// - `R` - The return type
/// - `E` - The error type of fallible implementations
pub struct CallRecorder<A, R, E> {
    calls: Arc<Mutex<Vec<Invocation<A, R, E>>>>,
}

impl<A, R, E> CallRecorder<A, R, E>
where
    A: Clone,
    R: Clone,
    E: Clone,
{
    /// Create a new, empty recorder.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a call to the history.
    ///
    /// The invocation's `sequence` is the history length at the time of the
    /// call. O(1), never fails.
    pub fn record(&self, args: A, outcome: CallOutcome<R, E>) {
        let mut calls = self.calls.lock();
        let sequence = calls.len();
        calls.push(Invocation {
            args,
            outcome,
            sequence,
        });
    }

    /// Get the number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Check if at least one call was recorded.
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Check if exactly N calls were recorded.
    pub fn was_called_times(&self, n: usize) -> bool {
        self.call_count() == n
    }

    /// Get a snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<Invocation<A, R, E>> {
        self.calls.lock().clone()
    }

    /// Get the calls whose arguments satisfy `matcher`.
    ///
    /// The result is a finite sequence over a snapshot of the history;
    /// matching is lazy and [`MatchedCalls::iter`] can be restarted.
    ///
    /// # Example
    ///
    /// ```rust
    /// use testkit_mock::matcher::eq;
    /// use testkit_mock::record::{CallOutcome, CallRecorder};
    ///
    /// let recorder: CallRecorder<i32, (), ()> = CallRecorder::new();
    /// recorder.record(1, CallOutcome::NoValue);
    /// recorder.record(2, CallOutcome::NoValue);
    /// recorder.record(1, CallOutcome::NoValue);
    ///
    /// let ones = recorder.calls_with(eq(1));
    /// assert_eq!(ones.count(), 2);
    /// assert_eq!(ones.iter().map(|call| call.sequence).collect::<Vec<_>>(), vec![0, 2]);
    /// ```
    pub fn calls_with<M: Matcher<A>>(&self, matcher: M) -> MatchedCalls<A, R, E, M> {
        MatchedCalls {
            snapshot: self.calls(),
            matcher,
        }
    }

    /// Get the nth call, 1-indexed to match conventional call-order
    /// assertions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] when `n` is zero or exceeds
    /// [`call_count`](Self::call_count).
    pub fn nth_call(&self, n: usize) -> Result<Invocation<A, R, E>> {
        let calls = self.calls.lock();
        if n == 0 || n > calls.len() {
            return Err(Error::OutOfRange {
                index: n,
                count: calls.len(),
            });
        }
        Ok(calls[n - 1].clone())
    }

    /// Get the most recent call.
    pub fn last_call(&self) -> Option<Invocation<A, R, E>> {
        self.calls.lock().last().cloned()
    }

    /// Clear the call history.
    ///
    /// Only the history is affected; any patcher referencing a substitute
    /// backed by this recorder keeps its installed state.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl<A: Clone, R: Clone, E: Clone> Default for CallRecorder<A, R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R, E> Clone for CallRecorder<A, R, E> {
    fn clone(&self) -> Self {
        // Clones share the history; use CallRecorder::new for independent state.
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<A: Debug, R: Debug, E: Debug> Debug for CallRecorder<A, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallRecorder")
            .field("calls", &*self.calls.lock())
            .finish()
    }
}

/// The calls whose arguments satisfied a matcher.
///
/// Produced by [`CallRecorder::calls_with`]. Holds a snapshot of the history
/// taken at construction time; [`iter`](Self::iter) starts a fresh lazy pass
/// over that snapshot each time it is called.
pub struct MatchedCalls<A, R, E, M> {
    snapshot: Vec<Invocation<A, R, E>>,
    matcher: M,
}

impl<A, R, E, M: Matcher<A>> MatchedCalls<A, R, E, M> {
    /// Iterate over the matching calls, lazily, in call order.
    pub fn iter(&self) -> impl Iterator<Item = &Invocation<A, R, E>> + '_ {
        self.snapshot
            .iter()
            .filter(move |invocation| self.matcher.matches(&invocation.args))
    }

    /// The number of matching calls.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Whether no call matched.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
