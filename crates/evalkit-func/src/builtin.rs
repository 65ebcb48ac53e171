//! Bound call sites.
//!
//! A [`BuiltinFunction`] pairs a [`FunctionClass`] with the argument
//! expressions of one call and the context of the execution it belongs to.
//! It is immutable after construction: rewriting the arguments (as constant
//! folding does) produces a new call site via [`BuiltinFunction::with_args`].

use std::fmt;
use std::sync::Arc;

use evalkit_error::Result;
use evalkit_types::{Datum, EvalContext};

use crate::args::{Args, evaluate_args};
use crate::class::FunctionClass;
use crate::expr::Expression;

/// One call of a function with concrete argument expressions.
#[derive(Clone)]
pub struct BuiltinFunction {
    class: Arc<dyn FunctionClass>,
    args: Vec<Expression>,
    ctx: Arc<EvalContext>,
    deterministic: bool,
}

impl BuiltinFunction {
    /// Build a call site without validating `args`.
    ///
    /// Use [`FunctionRegistry::bind`](crate::FunctionRegistry::bind) to
    /// resolve by name and validate in one step.
    pub fn construct(
        class: Arc<dyn FunctionClass>,
        args: Vec<Expression>,
        ctx: Arc<EvalContext>,
    ) -> Self {
        let deterministic = class.is_deterministic();
        Self {
            class,
            args,
            ctx,
            deterministic,
        }
    }

    pub fn name(&self) -> &str {
        self.class.name()
    }

    pub fn class(&self) -> &Arc<dyn FunctionClass> {
        &self.class
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    pub const fn context(&self) -> &Arc<EvalContext> {
        &self.ctx
    }

    /// Whether repeated evaluation over the same inputs yields the same
    /// result. Fixed at construction from the class.
    pub const fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Same class and context, different arguments.
    #[must_use]
    pub fn with_args(&self, args: Vec<Expression>) -> Self {
        Self {
            class: Arc::clone(&self.class),
            args,
            ctx: Arc::clone(&self.ctx),
            deterministic: self.deterministic,
        }
    }

    /// Evaluate the arguments against `row`, then apply the function.
    pub fn eval(&self, row: &[Datum]) -> Result<Datum> {
        let values = evaluate_args(&self.args, row)?;
        self.apply(&values)
    }

    /// Apply the function to already-evaluated literal arguments.
    ///
    /// This is the folding hook: the planner calls it once with the literal
    /// values of a call whose arguments are all constants. Any failure is
    /// returned as-is; the caller decides whether to keep the call unfolded.
    pub fn constant_fold(&self, literals: &[Datum]) -> Result<Datum> {
        self.apply(literals)
    }

    fn apply(&self, values: &[Datum]) -> Result<Datum> {
        self.class.arity().check(self.name(), values.len())?;
        self.class
            .invoke(&Args::new(self.class.name(), values, &self.ctx))
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name())
            .field("args", &self.args)
            .field("deterministic", &self.deterministic)
            .field("execution_id", &self.ctx.execution_id())
            .finish()
    }
}
