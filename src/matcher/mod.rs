// Allow must_use_candidate for matcher factory functions since returning the matcher
// without using it is the common pattern for test setup
#![allow(clippy::must_use_candidate)]

//! Argument matchers for call assertions.
//!
//! Matchers describe which recorded calls a test is interested in. They are
//! consumed by [`CallRecorder::calls_with`](crate::record::CallRecorder::calls_with)
//! and by the [`assert_that!`](crate::assert_that) macro.
//!
//! - [`Matcher`] trait for custom matchers
//! - Built-in matchers: [`eq`], [`any`], [`satisfies`]
//! - Combinator: [`not`]
//!
//! # Example
//!
//! ```rust
//! use testkit_mock::matcher::{eq, not, satisfies, Matcher};
//!
//! let m = eq(("A".to_string(), "B".to_string()));
//! assert!(m.matches(&("A".to_string(), "B".to_string())));
//!
//! let m = satisfies("is even", |x: &i32| x % 2 == 0);
//! assert!(m.matches(&4));
//!
//! let m = not(eq(0));
//! assert!(m.matches(&1));
//! ```

use std::fmt::Debug;

/// A matcher for testing recorded arguments.
///
/// # Implementing Custom Matchers
///
/// ```rust
/// use testkit_mock::matcher::Matcher;
///
/// struct StartsWith(&'static str);
///
/// impl Matcher<String> for StartsWith {
///     fn matches(&self, value: &String) -> bool {
///         value.starts_with(self.0)
///     }
///
///     fn describe(&self) -> String {
///         format!("starts with {:?}", self.0)
///     }
///
///     fn describe_mismatch(&self, value: &String) -> String {
///         format!("{:?} does not start with {:?}", value, self.0)
///     }
/// }
///
/// let m = StartsWith("Kent");
/// assert!(m.matches(&"Kent C. Dodds".to_string()));
/// ```
pub trait Matcher<T: ?Sized> {
    /// Check if the value matches.
    fn matches(&self, value: &T) -> bool;

    /// Describe what this matcher expects.
    fn describe(&self) -> String;

    /// Describe why a value didn't match.
    fn describe_mismatch(&self, value: &T) -> String;
}

/// Assert that a value matches a matcher.
///
/// # Panics
///
/// Panics with a descriptive message if the value doesn't match.
///
/// # Example
///
/// ```rust
/// use testkit_mock::{assert_that, matcher::eq};
///
/// assert_that!(42, eq(42));
/// ```
#[macro_export]
macro_rules! assert_that {
    ($value:expr, $matcher:expr) => {{
        let value = &$value;
        let matcher = &$matcher;
        if !$crate::matcher::Matcher::matches(matcher, value) {
            panic!(
                "assertion failed: {}\n  expected: {}\n  got: {:?}",
                $crate::matcher::Matcher::describe_mismatch(matcher, value),
                $crate::matcher::Matcher::describe(matcher),
                value
            );
        }
    }};
    ($value:expr, $matcher:expr, $($arg:tt)+) => {{
        let value = &$value;
        let matcher = &$matcher;
        if !$crate::matcher::Matcher::matches(matcher, value) {
            panic!(
                "assertion failed: {}\n  expected: {}\n  got: {:?}\n  message: {}",
                $crate::matcher::Matcher::describe_mismatch(matcher, value),
                $crate::matcher::Matcher::describe(matcher),
                value,
                format_args!($($arg)+)
            );
        }
    }};
}

/// Create an equality matcher.
///
/// # Example
///
/// ```rust
/// use testkit_mock::matcher::{eq, Matcher};
///
/// let m = eq(42);
/// assert!(m.matches(&42));
/// assert!(!m.matches(&0));
/// ```
pub fn eq<T: PartialEq + Debug>(expected: T) -> EqMatcher<T> {
    EqMatcher { expected }
}

/// Matcher for equality.
pub struct EqMatcher<T> {
    expected: T,
}

impl<T: PartialEq + Debug> Matcher<T> for EqMatcher<T> {
    fn matches(&self, value: &T) -> bool {
        value == &self.expected
    }

    fn describe(&self) -> String {
        format!("equals {:?}", self.expected)
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} does not equal {:?}", value, self.expected)
    }
}

/// Create a matcher that accepts every value.
///
/// Useful with `calls_with` when a test wants the full matching sequence
/// machinery without filtering anything out.
pub fn any<T>() -> AnyMatcher<T> {
    AnyMatcher {
        _marker: std::marker::PhantomData,
    }
}

/// Matcher that accepts every value.
pub struct AnyMatcher<T> {
    _marker: std::marker::PhantomData<fn(&T)>,
}

impl<T: Debug> Matcher<T> for AnyMatcher<T> {
    fn matches(&self, _value: &T) -> bool {
        true
    }

    fn describe(&self) -> String {
        "anything".to_string()
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{value:?} unexpectedly rejected")
    }
}

/// Create a matcher from a named predicate.
///
/// # Example
///
/// ```rust
/// use testkit_mock::matcher::{satisfies, Matcher};
///
/// let m = satisfies("is short", |s: &String| s.len() < 4);
/// assert!(m.matches(&"abc".to_string()));
/// assert!(!m.matches(&"abcdef".to_string()));
/// ```
pub fn satisfies<T, F>(description: &str, predicate: F) -> PredicateMatcher<F>
where
    F: Fn(&T) -> bool,
{
    PredicateMatcher {
        description: description.to_string(),
        predicate,
    }
}

/// Matcher backed by a predicate function.
pub struct PredicateMatcher<F> {
    description: String,
    predicate: F,
}

impl<T: Debug, F: Fn(&T) -> bool> Matcher<T> for PredicateMatcher<F> {
    fn matches(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    fn describe_mismatch(&self, value: &T) -> String {
        format!("{:?} does not satisfy: {}", value, self.description)
    }
}

/// Negate a matcher.
///
/// # Example
///
/// ```rust
/// use testkit_mock::matcher::{eq, not, Matcher};
///
/// let m = not(eq(0));
/// assert!(m.matches(&1));
/// assert!(!m.matches(&0));
/// ```
pub fn not<M>(inner: M) -> NotMatcher<M> {
    NotMatcher { inner }
}

/// Matcher negating another matcher.
pub struct NotMatcher<M> {
    inner: M,
}

impl<T, M: Matcher<T>> Matcher<T> for NotMatcher<M> {
    fn matches(&self, value: &T) -> bool {
        !self.inner.matches(value)
    }

    fn describe(&self) -> String {
        format!("not ({})", self.inner.describe())
    }

    fn describe_mismatch(&self, _value: &T) -> String {
        format!("unexpectedly matched: {}", self.inner.describe())
    }
}
