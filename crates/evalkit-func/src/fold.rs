//! Plan-time constant folding.
//!
//! Children fold before their parent, so `abs(log2(8))` collapses in one
//! pass: `log2(8)` becomes the literal `3`, which makes the `abs` call
//! all-literal in turn. A call is replaced by its result only when it is
//! deterministic, every argument is a literal, and evaluation succeeds. A
//! call whose evaluation fails is kept, so the error surfaces at execution
//! time instead of aborting planning.
//!
//! Folding evaluates through the call's own [`EvalContext`]. Warnings from a
//! lenient conversion are therefore recorded once, at fold time; the literal
//! left in the tree records none when the plan runs.
//!
//! [`EvalContext`]: evalkit_types::EvalContext

use evalkit_types::Datum;
use tracing::debug;

use crate::builtin::BuiltinFunction;
use crate::expr::Expression;

/// Counts of the folding decisions taken over one tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldOutcome {
    /// Calls replaced by a literal.
    pub folded: usize,
    /// Calls kept because their function is non-deterministic.
    pub skipped_nondeterministic: usize,
    /// All-literal calls kept because evaluation failed.
    pub failed: usize,
}

/// Fold every foldable call in `expr`.
pub fn fold_constants(expr: &Expression) -> (Expression, FoldOutcome) {
    let mut folder = ConstantFolder::default();
    let folded = folder.fold(expr);
    (folded, folder.outcome)
}

#[derive(Default)]
struct ConstantFolder {
    outcome: FoldOutcome,
}

impl ConstantFolder {
    fn fold(&mut self, expr: &Expression) -> Expression {
        match expr {
            Expression::Constant(_) | Expression::Column(_) => expr.clone(),
            Expression::Call(call) => self.fold_call(call),
        }
    }

    fn fold_call(&mut self, call: &BuiltinFunction) -> Expression {
        let args: Vec<Expression> = call.args().iter().map(|arg| self.fold(arg)).collect();
        let call = call.with_args(args);

        if !call.is_deterministic() {
            debug!(function = call.name(), "fold skipped: non-deterministic");
            self.outcome.skipped_nondeterministic += 1;
            return Expression::from(call);
        }

        let Some(literals) = call
            .args()
            .iter()
            .map(|arg| arg.as_constant().cloned())
            .collect::<Option<Vec<Datum>>>()
        else {
            return Expression::from(call);
        };

        match call.constant_fold(&literals) {
            Ok(value) => {
                debug!(function = call.name(), result = %value, "folded call");
                self.outcome.folded += 1;
                Expression::Constant(value)
            }
            Err(err) => {
                debug!(function = call.name(), error = %err, "fold failed, call kept");
                self.outcome.failed += 1;
                Expression::from(call)
            }
        }
    }
}
