//! Named-lock stubs.
//!
//! `lock`, `get_lock` and `release_lock` always answer 1 (success). No lock
//! table exists; the functions only demonstrate the call protocol for
//! side-effecting built-ins. They report themselves non-deterministic so the
//! folder leaves them in place for execution time.
#![allow(clippy::unnecessary_literal_bound, clippy::unnecessary_wraps)]

use evalkit_error::Result;
use evalkit_types::Datum;

use crate::{Args, Arity, FunctionClass, FunctionRegistry};

fn granted() -> Result<Datum> {
    Ok(Datum::Int64(1))
}

pub struct LockFunc;

impl FunctionClass for LockFunc {
    fn name(&self) -> &str {
        "lock"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn invoke(&self, _args: &Args<'_>) -> Result<Datum> {
        granted()
    }
}

/// `get_lock(name[, timeout])`. The timeout is accepted and ignored.
pub struct GetLockFunc;

impl FunctionClass for GetLockFunc {
    fn name(&self) -> &str {
        "get_lock"
    }

    fn arity(&self) -> Arity {
        Arity::range(1, 2)
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn invoke(&self, _args: &Args<'_>) -> Result<Datum> {
        granted()
    }
}

pub struct ReleaseLockFunc;

impl FunctionClass for ReleaseLockFunc {
    fn name(&self) -> &str {
        "release_lock"
    }

    fn arity(&self) -> Arity {
        Arity::exact(1)
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn invoke(&self, _args: &Args<'_>) -> Result<Datum> {
        granted()
    }
}

pub fn register_lock_builtins(registry: &mut FunctionRegistry) {
    registry.register(LockFunc);
    registry.register(GetLockFunc);
    registry.register(ReleaseLockFunc);
}
