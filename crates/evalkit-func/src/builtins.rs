//! Null-aware multi-argument built-ins and full catalog registration.
//!
//! `coalesce`, `ifnull` and `isnull` look at NULL-ness only and never coerce.
//! `greatest` and `least` are NULL-poisoned: one NULL anywhere makes the
//! result NULL. Otherwise all arguments compare in one representation: as
//! DOUBLE when numbers and text are mixed, else with [`Datum::compare`]
//! (numbers numerically, text lexically).
#![allow(clippy::unnecessary_literal_bound)]

use std::cmp::Ordering;

use evalkit_error::Result;
use evalkit_types::{Datum, float_cmp};

use crate::lock::register_lock_builtins;
use crate::math::register_math_builtins;
use crate::{Args, Arity, FunctionClass, FunctionRegistry};

// ── Helpers ───────────────────────────────────────────────────────────────

/// Keep the first argument that orders as `keep` against the running best.
///
/// One representation is chosen for the whole call so the ordering stays
/// transitive: if numbers and text are mixed, every argument is compared as
/// DOUBLE; otherwise arguments compare natively (numbers numerically, text
/// and bytes by byte).
fn extremum(args: &Args<'_>, keep: Ordering) -> Result<Datum> {
    if args.any_null() {
        return Ok(Datum::Null);
    }
    let values = args.values();
    let has_numeric = values.iter().any(|v| v.kind().is_numeric());
    let has_text = values.iter().any(|v| !v.kind().is_numeric());
    if has_numeric && has_text {
        return extremum_as_double(args, keep);
    }
    let mut best = &values[0];
    for candidate in &values[1..] {
        let ord = candidate
            .compare(best, args.ctx())
            .map_err(|err| err.in_function(args.function()))?;
        if ord == keep {
            best = candidate;
        }
    }
    Ok(best.clone())
}

/// Each argument converts to DOUBLE exactly once; the winning argument is
/// returned in its original form.
fn extremum_as_double(args: &Args<'_>, keep: Ordering) -> Result<Datum> {
    let mut best = 0;
    let mut best_key = f64::NAN;
    for i in 0..args.len() {
        let Some(key) = args.float(i)? else {
            return Ok(Datum::Null);
        };
        if i == 0 || float_cmp(key, best_key) == keep {
            best = i;
            best_key = key;
        }
    }
    Ok(args.get(best).clone())
}

// ── coalesce(X, Y, ...) ─────────────────────────────────────────────────

pub struct CoalesceFunc;

impl FunctionClass for CoalesceFunc {
    fn name(&self) -> &str {
        "coalesce"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        Ok(args
            .values()
            .iter()
            .find(|v| !v.is_null())
            .cloned()
            .unwrap_or(Datum::Null))
    }
}

// ── greatest(X, Y, ...) / least(X, Y, ...) ──────────────────────────────

pub struct GreatestFunc;

impl FunctionClass for GreatestFunc {
    fn name(&self) -> &str {
        "greatest"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        extremum(args, Ordering::Greater)
    }
}

pub struct LeastFunc;

impl FunctionClass for LeastFunc {
    fn name(&self) -> &str {
        "least"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        extremum(args, Ordering::Less)
    }
}

// ── isnull(X) ───────────────────────────────────────────────────────────

pub struct IsNullFunc;

impl FunctionClass for IsNullFunc {
    fn name(&self) -> &str {
        "isnull"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        Ok(Datum::Int64(i64::from(args.get(0).is_null())))
    }
}

// ── ifnull(X, Y) ────────────────────────────────────────────────────────

pub struct IfNullFunc;

impl FunctionClass for IfNullFunc {
    fn name(&self) -> &str {
        "ifnull"
    }

    fn arity(&self) -> Arity {
        Arity::exact(2)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        let first = args.get(0);
        if first.is_null() {
            Ok(args.get(1).clone())
        } else {
            Ok(first.clone())
        }
    }
}

// ── nullif(X, Y) ────────────────────────────────────────────────────────

pub struct NullIfFunc;

impl FunctionClass for NullIfFunc {
    fn name(&self) -> &str {
        "nullif"
    }

    fn arity(&self) -> Arity {
        Arity::exact(2)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        let (first, second) = (args.get(0), args.get(1));
        // NULL never compares equal to anything.
        if first.is_null() || second.is_null() {
            return Ok(first.clone());
        }
        let ord = first
            .compare(second, args.ctx())
            .map_err(|err| err.in_function(args.function()))?;
        if ord == Ordering::Equal {
            Ok(Datum::Null)
        } else {
            Ok(first.clone())
        }
    }
}

// ── Register all built-ins ──────────────────────────────────────────────

/// Register every built-in function into the given registry.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    register_math_builtins(registry);

    // Conditional
    registry.register(CoalesceFunc);
    registry.register(IfNullFunc);
    registry.register(NullIfFunc);
    registry.register(IsNullFunc);

    // Multi-value
    registry.register(GreatestFunc);
    registry.register(LeastFunc);

    register_lock_builtins(registry);
}
