//! Numeric built-ins: abs, ceil, floor, log, log2, log10, pow, round, rand.
//!
//! # NULL and domain semantics
//! - A NULL argument yields NULL.
//! - Inputs outside a logarithm's domain yield NULL, not an error.
//! - Text arguments convert under the statement's conversion policy; a
//!   failed conversion is an error.
//! - NaN and infinities from `pow` pass through as DOUBLE values.
#![allow(
    clippy::unnecessary_literal_bound,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp,
    clippy::unnecessary_wraps,
    clippy::items_after_statements
)]

use evalkit_error::Result;
use evalkit_types::Datum;

use crate::{Args, Arity, FunctionClass, FunctionRegistry};

// ── Helpers ───────────────────────────────────────────────────────────────

/// One-arg DOUBLE function that returns NULL unless `domain` holds.
fn unary_domain(args: &Args<'_>, domain: fn(f64) -> bool, f: fn(f64) -> f64) -> Result<Datum> {
    let Some(x) = args.float(0)? else {
        return Ok(Datum::Null);
    };
    if !domain(x) {
        return Ok(Datum::Null);
    }
    Ok(Datum::Float64(f(x)))
}

fn positive(x: f64) -> bool {
    x > 0.0
}

/// Integral arguments are already whole; everything else goes through DOUBLE.
fn integral_or_float(args: &Args<'_>, f: fn(f64) -> f64) -> Result<Datum> {
    match args.get(0) {
        v @ (Datum::Null | Datum::Int64(_) | Datum::Uint64(_)) => Ok(v.clone()),
        _ => Ok(args.float(0)?.map_or(Datum::Null, |x| Datum::Float64(f(x)))),
    }
}

/// Round `x` half away from zero to `dec` decimal places. Negative `dec`
/// rounds to the left of the decimal point.
pub fn round_to(x: f64, dec: i64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    // 10^330 is already infinite in f64.
    let places = dec.clamp(-330, 330) as i32;
    if places >= 0 {
        let shift = 10_f64.powi(places);
        let scaled = x * shift;
        if !scaled.is_finite() {
            return x;
        }
        scaled.round() / shift
    } else {
        let shift = 10_f64.powi(-places);
        if !shift.is_finite() {
            return 0.0;
        }
        (x / shift).round() * shift
    }
}

// ── abs ───────────────────────────────────────────────────────────────────

pub struct AbsFunc;

impl FunctionClass for AbsFunc {
    fn name(&self) -> &str {
        "abs"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        match args.get(0) {
            Datum::Null => Ok(Datum::Null),
            Datum::Uint64(u) => Ok(Datum::Uint64(*u)),
            // i64::MIN has no positive counterpart and comes back unchanged.
            Datum::Int64(i) => Ok(Datum::Int64(if *i < 0 { i.wrapping_neg() } else { *i })),
            Datum::Float64(f) => Ok(Datum::Float64(f.abs())),
            Datum::Text(_) | Datum::Bytes(_) => {
                Ok(args.float(0)?.map_or(Datum::Null, |x| Datum::Float64(x.abs())))
            }
        }
    }
}

// ── Rounding ──────────────────────────────────────────────────────────────

pub struct CeilFunc;

impl FunctionClass for CeilFunc {
    fn name(&self) -> &str {
        "ceil"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        integral_or_float(args, f64::ceil)
    }
}

pub struct FloorFunc;

impl FunctionClass for FloorFunc {
    fn name(&self) -> &str {
        "floor"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        integral_or_float(args, f64::floor)
    }
}

pub struct RoundFunc;

impl FunctionClass for RoundFunc {
    fn name(&self) -> &str {
        "round"
    }

    fn arity(&self) -> Arity {
        Arity::range(1, 2)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        let x = args.float(0)?;
        let dec = if args.len() == 2 { args.int(1)? } else { Some(0) };
        let (Some(x), Some(dec)) = (x, dec) else {
            return Ok(Datum::Null);
        };
        Ok(Datum::Float64(round_to(x, dec)))
    }
}

// ── Logarithmic / Exponential ─────────────────────────────────────────────

/// `log(x)` is the natural logarithm; `log(b, x)` is log base `b`.
pub struct LogFunc;

impl FunctionClass for LogFunc {
    fn name(&self) -> &str {
        "log"
    }

    fn arity(&self) -> Arity {
        Arity::range(1, 2)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        if args.len() == 1 {
            return unary_domain(args, positive, f64::ln);
        }
        let base = args.float(0)?;
        let x = args.float(1)?;
        let (Some(base), Some(x)) = (base, x) else {
            return Ok(Datum::Null);
        };
        if base <= 1.0 || x <= 0.0 {
            return Ok(Datum::Null);
        }
        Ok(Datum::Float64(x.ln() / base.ln()))
    }
}

pub struct Log2Func;

impl FunctionClass for Log2Func {
    fn name(&self) -> &str {
        "log2"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        unary_domain(args, positive, f64::log2)
    }
}

pub struct Log10Func;

impl FunctionClass for Log10Func {
    fn name(&self) -> &str {
        "log10"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        unary_domain(args, positive, f64::log10)
    }
}

pub struct PowFunc;

impl FunctionClass for PowFunc {
    fn name(&self) -> &str {
        "pow"
    }

    fn arity(&self) -> Arity {
        Arity::exact(2)
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        let x = args.float(0)?;
        let y = args.float(1)?;
        let (Some(x), Some(y)) = (x, y) else {
            return Ok(Datum::Null);
        };
        Ok(Datum::Float64(x.powf(y)))
    }
}

// ── Random ────────────────────────────────────────────────────────────────

/// `rand()` draws from the execution's random source; `rand(n)` reseeds
/// that source with `n` first. A NULL seed draws without reseeding.
pub struct RandFunc;

impl FunctionClass for RandFunc {
    fn name(&self) -> &str {
        "rand"
    }

    fn arity(&self) -> Arity {
        Arity::range(0, 1)
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
        if args.len() == 1 {
            if let Some(seed) = args.int(0)? {
                args.ctx().reseed(seed as u64);
            }
        }
        Ok(Datum::Float64(args.ctx().next_f64()))
    }
}

// ── Registration ──────────────────────────────────────────────────────────

/// Register the numeric built-ins and their aliases.
pub fn register_math_builtins(registry: &mut FunctionRegistry) {
    registry.register(AbsFunc);
    registry.register(CeilFunc);
    registry.register(FloorFunc);
    registry.register(RoundFunc);
    registry.register(LogFunc);
    registry.register(Log2Func);
    registry.register(Log10Func);
    registry.register(PowFunc);
    registry.register(RandFunc);

    // "ceiling" → same as "ceil"
    struct CeilingFunc;
    impl FunctionClass for CeilingFunc {
        fn name(&self) -> &str {
            "ceiling"
        }

        fn arity(&self) -> Arity {
            CeilFunc.arity()
        }

        fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
            CeilFunc.invoke(args)
        }
    }
    registry.register(CeilingFunc);

    // "power" → same as "pow"
    struct PowerFunc;
    impl FunctionClass for PowerFunc {
        fn name(&self) -> &str {
            "power"
        }

        fn arity(&self) -> Arity {
            PowFunc.arity()
        }

        fn invoke(&self, args: &Args<'_>) -> Result<Datum> {
            PowFunc.invoke(args)
        }
    }
    registry.register(PowerFunc);
}

// ── Tests ─────────────────────────────────────────────────────────────────
