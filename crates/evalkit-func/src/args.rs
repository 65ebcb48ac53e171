//! Argument pipeline.
//!
//! A call evaluates its argument expressions left to right against the input
//! row, then hands the resulting values to the function body as [`Args`].
//! Coercions go through the execution's [`EvalContext`] so the statement's
//! conversion policy applies uniformly, and every coercion failure is tagged
//! with the calling function's name.

use evalkit_error::Result;
use evalkit_types::{Datum, EvalContext};

use crate::expr::Expression;

/// Evaluate each argument expression against `row`, in order.
///
/// The first failing argument aborts the call; later arguments are not
/// evaluated.
pub fn evaluate_args(args: &[Expression], row: &[Datum]) -> Result<Vec<Datum>> {
    args.iter().map(|arg| arg.eval(row)).collect()
}

/// The evaluated arguments of one call, plus the execution context.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    function: &'a str,
    values: &'a [Datum],
    ctx: &'a EvalContext,
}

impl<'a> Args<'a> {
    pub const fn new(function: &'a str, values: &'a [Datum], ctx: &'a EvalContext) -> Self {
        Self {
            function,
            values,
            ctx,
        }
    }

    /// Name of the function being invoked.
    pub const fn function(&self) -> &'a str {
        self.function
    }

    pub const fn values(&self) -> &'a [Datum] {
        self.values
    }

    pub const fn ctx(&self) -> &'a EvalContext {
        self.ctx
    }

    pub const fn len(&self) -> usize {
        self.values.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `i`-th argument value.
    ///
    /// # Panics
    ///
    /// Panics if `i` is outside the function's checked arity.
    pub fn get(&self, i: usize) -> &'a Datum {
        &self.values[i]
    }

    /// Whether any argument is NULL.
    pub fn any_null(&self) -> bool {
        self.values.iter().any(Datum::is_null)
    }

    /// The `i`-th argument as a DOUBLE; `None` for NULL.
    pub fn float(&self, i: usize) -> Result<Option<f64>> {
        let value = self.get(i);
        if value.is_null() {
            return Ok(None);
        }
        value
            .to_f64(self.ctx)
            .map(Some)
            .map_err(|err| err.in_function(self.function))
    }

    /// The `i`-th argument as a BIGINT; `None` for NULL.
    pub fn int(&self, i: usize) -> Result<Option<i64>> {
        let value = self.get(i);
        if value.is_null() {
            return Ok(None);
        }
        value
            .to_i64(self.ctx)
            .map(Some)
            .map_err(|err| err.in_function(self.function))
    }
}

#[cfg(test)]
mod tests {
    use evalkit_error::EvalError;
    use evalkit_types::{ConversionPolicy, StatementConfig};

    use super::*;

    #[test]
    fn null_coerces_to_none() {
        let ctx = EvalContext::default();
        let values = [Datum::Null];
        let args = Args::new("abs", &values, &ctx);
        assert_eq!(args.float(0).unwrap(), None);
        assert_eq!(args.int(0).unwrap(), None);
        assert!(args.any_null());
    }

    #[test]
    fn text_coercion_failure_names_function() {
        let ctx = EvalContext::default();
        let values = [Datum::from("abc")];
        let args = Args::new("log2", &values, &ctx);
        let err = args.float(0).unwrap_err();
        assert!(matches!(
            err,
            EvalError::Conversion { function: Some(ref f), .. } if f == "log2"
        ));
    }

    #[test]
    fn lenient_policy_truncates_with_warning() {
        let ctx = EvalContext::new(
            StatementConfig::default().with_conversion(ConversionPolicy::TruncateAsWarning),
        );
        let values = [Datum::from("12abc")];
        let args = Args::new("abs", &values, &ctx);
        assert_eq!(args.float(0).unwrap(), Some(12.0));
        assert_eq!(ctx.warning_count(), 1);
    }

    #[test]
    fn evaluate_args_in_order() {
        let row = [Datum::Int64(7), Datum::from("x")];
        let exprs = [
            Expression::Column(1),
            Expression::constant(1.5),
            Expression::Column(0),
        ];
        let values = evaluate_args(&exprs, &row).unwrap();
        assert_eq!(
            values,
            vec![Datum::from("x"), Datum::Float64(1.5), Datum::Int64(7)]
        );
    }

    #[test]
    fn evaluate_args_stops_at_first_failure() {
        let row = [Datum::Int64(7)];
        let exprs = [Expression::Column(3), Expression::Column(0)];
        let err = evaluate_args(&exprs, &row).unwrap_err();
        assert_eq!(err, EvalError::ColumnOutOfRange { index: 3, width: 1 });
    }

    #[test]
    fn accessors() {
        let ctx = EvalContext::default();
        let values = [Datum::Int64(1), Datum::Int64(2)];
        let args = Args::new("greatest", &values, &ctx);
        assert_eq!(args.len(), 2);
        assert!(!args.is_empty());
        assert_eq!(args.function(), "greatest");
        assert_eq!(args.get(1), &Datum::Int64(2));
        assert_eq!(args.int(1).unwrap(), Some(2));
        assert!(!args.any_null());
    }
}
