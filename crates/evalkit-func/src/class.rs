//! Function class trait.
//!
//! A function class is the immutable, process-wide descriptor of one named
//! SQL function. It validates candidate argument lists and carries the
//! evaluation rule that every call site bound to it runs.
//!
//! # Send + Sync
//!
//! Classes live in the shared [`FunctionRegistry`](crate::FunctionRegistry)
//! as `Arc<dyn FunctionClass>` and are read concurrently by independent
//! executions. They hold no per-call state; anything mutable (the random
//! source, warnings) lives on the [`EvalContext`](evalkit_types::EvalContext)
//! reached through [`Args::ctx`].
#![allow(clippy::unnecessary_literal_bound)]

use std::fmt;

use evalkit_error::{EvalError, Result};
use evalkit_types::Datum;

use crate::args::Args;
use crate::expr::Expression;

/// Accepted argument count of a function: `min..=max`, or unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    /// Exactly `n` arguments.
    pub const fn exact(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// Between `min` and `max` arguments, inclusive.
    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// `min` or more arguments.
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub const fn min(self) -> usize {
        self.min
    }

    pub const fn max(self) -> Option<usize> {
        self.max
    }

    pub const fn accepts(self, count: usize) -> bool {
        if count < self.min {
            return false;
        }
        match self.max {
            Some(max) => count <= max,
            None => true,
        }
    }

    /// Fail with [`EvalError::InvalidArgumentCount`] unless `actual` fits.
    pub fn check(self, function: &str, actual: usize) -> Result<()> {
        if self.accepts(actual) {
            return Ok(());
        }
        Err(EvalError::InvalidArgumentCount {
            function: function.to_owned(),
            expected: self.to_string(),
            actual,
        })
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{} to {max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// A named SQL scalar function.
///
/// # Error Handling
///
/// - Conversion failures from [`Args::float`] / [`Args::int`] propagate with
///   `?`; they already name the function.
/// - Mathematically undefined inputs (e.g. `log(0)`) return
///   [`Datum::Null`], never an error.
pub trait FunctionClass: Send + Sync {
    /// The function name, used for lookup and in error messages.
    fn name(&self) -> &str;

    /// The accepted argument counts.
    fn arity(&self) -> Arity;

    /// Whether this function is deterministic (same inputs, same output).
    ///
    /// Only deterministic calls are eligible for constant folding.
    /// Defaults to `true`.
    fn is_deterministic(&self) -> bool {
        true
    }

    /// Check that `args` is an acceptable argument list before a call site
    /// is built. The default checks the argument count.
    fn validate(&self, args: &[Expression]) -> Result<()> {
        self.arity().check(self.name(), args.len())
    }

    /// Compute the result from already-evaluated argument values.
    fn invoke(&self, args: &Args<'_>) -> Result<Datum>;
}
