//! # testkit-mock 🎭
//!
//! > Test doubles for Rust: substitutes, spies, patchers, and module mocks
//!
//! **testkit-mock** provides the mock/spy core a test suite builds on:
//! substitute callables with recorded call histories, structured
//! install/restore patching over named bindings, and full-module substitution
//! at the resolution boundary.
//!
//! ## Quick Start
//!
//! ```rust
//! use testkit_mock::prelude::*;
//!
//! // A substitute with controlled behavior.
//! let get_winner: Substitute<(String, String), String> =
//!     Substitute::with_implementation(|(p1, _p2)| Ok(p1));
//!
//! // The system under test calls it through its normal reference.
//! let winner = get_winner.call(("A".into(), "B".into())).unwrap();
//! assert_eq!(winner.as_deref(), Some("A"));
//!
//! // Assertions inspect the recorded history.
//! assert_eq!(get_winner.call_count(), 1);
//! assert_eq!(get_winner.nth_call(1).unwrap().args.0, "A");
//! ```
//!
//! ## Features
//!
//! - 🎭 **Substitutes** - Callable stand-ins with swappable implementations
//! - 🔍 **Call Recording** - Ordered, matcher-queryable call histories
//! - 🩹 **Binding Patchers** - Paired install/restore, no forgotten cleanup
//! - 📦 **Module Mocks** - Factory-built surfaces at the resolution boundary
//!
//! ## Execution model
//!
//! Single-threaded, synchronous test execution is assumed. Shared handles use
//! interior mutability for convenience, not as a concurrency-safety claim;
//! parallel test workers need their own scope objects.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod factory;
pub mod matcher;
pub mod patch;
pub mod record;
pub mod substitute;

/// Prelude for convenient imports
///
/// ```rust
/// use testkit_mock::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::factory::{ModuleMocks, Resolver};
    pub use crate::matcher::{any, eq, not, satisfies, Matcher};
    pub use crate::patch::{BindingTable, Bindings, PatchSet, Patcher};
    pub use crate::record::{CallOutcome, CallRecorder, Invocation, MatchedCalls};
    pub use crate::substitute::Substitute;
}

// Re-exports
pub use error::{Error, Result};
