//! Core value and context types for scalar expression evaluation.
//!
//! - [`Datum`]: the dynamically-typed scalar carried between expression nodes.
//! - [`EvalContext`]: per-execution state (conversion policy, random source,
//!   warnings) consumed by every coercion.

pub mod context;
pub mod datum;

pub use context::{ConversionPolicy, EvalContext, OverflowPolicy, StatementConfig};
pub use datum::{Datum, DatumKind, float_cmp};
