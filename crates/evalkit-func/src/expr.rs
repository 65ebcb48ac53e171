//! Argument expressions.

use std::fmt;

use evalkit_error::{EvalError, Result};
use evalkit_types::Datum;

use crate::builtin::BuiltinFunction;

/// A node that produces one [`Datum`] per input row.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A literal.
    Constant(Datum),
    /// The value at this index of the input row.
    Column(usize),
    /// A nested function call.
    Call(Box<BuiltinFunction>),
}

impl Expression {
    pub fn constant(value: impl Into<Datum>) -> Self {
        Self::Constant(value.into())
    }

    pub const fn as_constant(&self) -> Option<&Datum> {
        match self {
            Self::Constant(d) => Some(d),
            _ => None,
        }
    }

    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Evaluate against one input row.
    pub fn eval(&self, row: &[Datum]) -> Result<Datum> {
        match self {
            Self::Constant(d) => Ok(d.clone()),
            Self::Column(index) => {
                row.get(*index)
                    .cloned()
                    .ok_or(EvalError::ColumnOutOfRange {
                        index: *index,
                        width: row.len(),
                    })
            }
            Self::Call(call) => call.eval(row),
        }
    }
}

impl From<Datum> for Expression {
    fn from(value: Datum) -> Self {
        Self::Constant(value)
    }
}

impl From<BuiltinFunction> for Expression {
    fn from(call: BuiltinFunction) -> Self {
        Self::Call(Box::new(call))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(d) => write!(f, "{d}"),
            Self::Column(index) => write!(f, "#{index}"),
            Self::Call(call) => {
                write!(f, "{}(", call.name())?;
                for (i, arg) in call.args().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_eval_ignores_row() {
        let e = Expression::constant(5);
        assert_eq!(e.eval(&[]).unwrap(), Datum::Int64(5));
        assert!(e.is_constant());
        assert_eq!(e.as_constant(), Some(&Datum::Int64(5)));
    }

    #[test]
    fn column_eval() {
        let row = [Datum::Null, Datum::from("b")];
        assert_eq!(Expression::Column(1).eval(&row).unwrap(), Datum::from("b"));
        assert_eq!(Expression::Column(0).eval(&row).unwrap(), Datum::Null);
        assert!(!Expression::Column(0).is_constant());
    }

    #[test]
    fn column_out_of_range() {
        let err = Expression::Column(2).eval(&[Datum::Int64(1)]).unwrap_err();
        assert_eq!(err, EvalError::ColumnOutOfRange { index: 2, width: 1 });
    }

    #[test]
    fn display() {
        assert_eq!(Expression::Column(3).to_string(), "#3");
        assert_eq!(Expression::constant("a").to_string(), "'a'");
        assert_eq!(Expression::from(Datum::Null).to_string(), "NULL");
    }
}
