//! Built-in SQL scalar function evaluation.
//!
//! This crate binds named functions to argument expressions and evaluates
//! them against rows of [`Datum`] values:
//! - [`FunctionClass`]: the immutable, shareable description of one function
//! - [`BuiltinFunction`]: one call site, bound to its arguments and to the
//!   [`EvalContext`] of a single execution
//! - [`fold_constants`]: the plan-time rewrite that replaces all-literal
//!   deterministic calls with their result
//!
//! It also provides a [`FunctionRegistry`] for resolving functions by
//! case-insensitive name, and [`registry()`], a process-wide read-only
//! registry holding every built-in.
#![allow(clippy::unnecessary_literal_bound)]

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use evalkit_error::{EvalError, Result};
use evalkit_types::{Datum, EvalContext};
use tracing::debug;

pub mod args;
pub mod builtin;
pub mod builtins;
pub mod class;
pub mod expr;
pub mod fold;
pub mod lock;
pub mod math;

pub use args::{Args, evaluate_args};
pub use builtin::BuiltinFunction;
pub use builtins::register_builtins;
pub use class::{Arity, FunctionClass};
pub use expr::Expression;
pub use fold::{FoldOutcome, fold_constants};
pub use lock::register_lock_builtins;
pub use math::register_math_builtins;

/// Function classes keyed by canonical (trimmed, lowercase) name.
#[derive(Default)]
pub struct FunctionRegistry {
    classes: HashMap<String, Arc<dyn FunctionClass>>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in function.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Register a function class under its name.
    ///
    /// Overwrites any existing function with the same name. Returns the
    /// previous function if one existed.
    pub fn register<F>(&mut self, function: F) -> Option<Arc<dyn FunctionClass>>
    where
        F: FunctionClass + 'static,
    {
        let key = canonical_name(function.name());
        self.classes.insert(key, Arc::new(function))
    }

    /// Look up a function class by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<dyn FunctionClass>> {
        let canon = canonical_name(name);
        let result = self.classes.get(&canon).map(Arc::clone);
        debug!(
            name = %canon,
            hit = if result.is_some() { "exact" } else { "miss" },
            "registry lookup"
        );
        result
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(&canonical_name(name))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Resolve `name`, validate `args` against it, and build a call site
    /// bound to `ctx`.
    pub fn bind(
        &self,
        name: &str,
        args: Vec<Expression>,
        ctx: &Arc<EvalContext>,
    ) -> Result<BuiltinFunction> {
        let class = self.find(name).ok_or_else(|| EvalError::NoSuchFunction {
            name: name.trim().to_owned(),
        })?;
        class.validate(&args)?;
        debug!(
            function = class.name(),
            args = args.len(),
            execution_id = ctx.execution_id(),
            "bound call"
        );
        Ok(BuiltinFunction::construct(class, args, Arc::clone(ctx)))
    }
}

fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

static REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::with_builtins);

/// The process-wide registry of built-in functions.
pub fn registry() -> &'static FunctionRegistry {
    &REGISTRY
}

/// Bind `name` against the built-in registry and evaluate it once over
/// literal arguments.
pub fn call_builtin(name: &str, literals: Vec<Datum>, ctx: &Arc<EvalContext>) -> Result<Datum> {
    let args = literals.into_iter().map(Expression::Constant).collect();
    registry().bind(name, args, ctx)?.eval(&[])
}
