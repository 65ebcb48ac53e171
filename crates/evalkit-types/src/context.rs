//! Per-execution evaluation context.
//!
//! An [`EvalContext`] is created once per statement execution and handed to
//! every call site bound for that execution. It carries:
//! - the statement's numeric conversion and overflow policies
//! - a private random source, so reseeding in one execution never disturbs
//!   another
//! - the warnings recorded by lenient conversions
//!
//! Contexts are never shared between concurrent executions; the interior
//! locks exist so a context can sit behind an `Arc` inside bound functions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How malformed numeric text is treated when a number is required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPolicy {
    /// Any text that is not entirely a numeric literal is a conversion error.
    #[default]
    Strict,
    /// The longest numeric prefix is used (empty prefix = 0) and a warning
    /// is recorded on the context.
    TruncateAsWarning,
}

/// How out-of-range numeric conversions are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Out-of-range values are an error.
    #[default]
    Error,
    /// Values clamp to the target's bounds and a warning is recorded.
    Saturate,
}

/// Statement-level configuration consumed by an [`EvalContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementConfig {
    /// Text-to-number conversion policy.
    pub conversion: ConversionPolicy,
    /// Out-of-range conversion policy.
    pub overflow: OverflowPolicy,
    /// Initial seed of the random source. `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
}

impl StatementConfig {
    /// Replace the conversion policy.
    #[must_use]
    pub const fn with_conversion(mut self, conversion: ConversionPolicy) -> Self {
        self.conversion = conversion;
        self
    }

    /// Replace the overflow policy.
    #[must_use]
    pub const fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Seed the random source deterministically.
    #[must_use]
    pub const fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

static NEXT_EXECUTION_ID: AtomicU64 = AtomicU64::new(1);

/// State for one statement execution.
pub struct EvalContext {
    execution_id: u64,
    config: StatementConfig,
    rng: Mutex<StdRng>,
    warnings: Mutex<Vec<String>>,
}

impl EvalContext {
    /// Create a context for a new execution.
    pub fn new(config: StatementConfig) -> Self {
        let rng = config
            .rng_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            execution_id: NEXT_EXECUTION_ID.fetch_add(1, Ordering::Relaxed),
            config,
            rng: Mutex::new(rng),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Process-unique identity of this execution.
    pub const fn execution_id(&self) -> u64 {
        self.execution_id
    }

    /// The statement configuration this context was built from.
    pub const fn config(&self) -> &StatementConfig {
        &self.config
    }

    pub const fn conversion_policy(&self) -> ConversionPolicy {
        self.config.conversion
    }

    pub const fn overflow_policy(&self) -> OverflowPolicy {
        self.config.overflow
    }

    /// Reset this execution's random source to a fixed seed.
    pub fn reseed(&self, seed: u64) {
        debug!(execution_id = self.execution_id, seed, "random source reseeded");
        *self.rng.lock() = StdRng::seed_from_u64(seed);
    }

    /// Draw a uniform value in `[0, 1)` from this execution's random source.
    pub fn next_f64(&self) -> f64 {
        self.rng.lock().r#gen::<f64>()
    }

    /// Record a non-fatal diagnostic produced during evaluation.
    pub fn append_warning(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(execution_id = self.execution_id, %message, "evaluation warning");
        self.warnings.lock().push(message);
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.lock().len()
    }

    /// Snapshot of the warnings recorded so far.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }

    /// Drain the recorded warnings.
    pub fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.warnings.lock())
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new(StatementConfig::default())
    }
}

impl fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalContext")
            .field("execution_id", &self.execution_id)
            .field("config", &self.config)
            .field("warnings", &self.warning_count())
            .finish_non_exhaustive()
    }
}
