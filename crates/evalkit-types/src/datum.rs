use std::cmp::Ordering;
use std::fmt;

use evalkit_error::{EvalError, Result};
use serde::{Deserialize, Serialize};

use crate::context::{ConversionPolicy, EvalContext, OverflowPolicy};

/// The active tag of a [`Datum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatumKind {
    Null,
    Int64,
    Uint64,
    Float64,
    Text,
    Bytes,
}

impl DatumKind {
    /// SQL type name used in diagnostics.
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Int64 => "BIGINT",
            Self::Uint64 => "BIGINT UNSIGNED",
            Self::Float64 => "DOUBLE",
            Self::Text => "VARCHAR",
            Self::Bytes => "BLOB",
        }
    }

    /// Whether values of this kind are numbers.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Uint64 | Self::Float64)
    }
}

impl fmt::Display for DatumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A dynamically-typed scalar value.
///
/// NULL is a tag of its own. No conversion treats it as zero: numeric
/// coercions of NULL fail, and every function decides explicitly what a NULL
/// argument means.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    /// SQL NULL.
    Null,
    /// A 64-bit signed integer.
    Int64(i64),
    /// A 64-bit unsigned integer.
    Uint64(u64),
    /// A 64-bit IEEE 754 floating-point number.
    Float64(f64),
    /// A UTF-8 string.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Datum {
    /// Returns the active tag.
    pub const fn kind(&self) -> DatumKind {
        match self {
            Self::Null => DatumKind::Null,
            Self::Int64(_) => DatumKind::Int64,
            Self::Uint64(_) => DatumKind::Uint64,
            Self::Float64(_) => DatumKind::Float64,
            Self::Text(_) => DatumKind::Text,
            Self::Bytes(_) => DatumKind::Bytes,
        }
    }

    /// Returns true if this is a NULL value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint64(u) => Some(*u),
            _ => None,
        }
    }

    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Convert to a float under the context's conversion policy.
    ///
    /// - Integers widen (large values lose precision).
    /// - Text and bytes must hold a numeric literal; otherwise the result is a
    ///   conversion error under [`ConversionPolicy::Strict`], or the longest
    ///   numeric prefix plus a warning under
    ///   [`ConversionPolicy::TruncateAsWarning`].
    /// - NULL is a conversion error.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self, ctx: &EvalContext) -> Result<f64> {
        let target = DatumKind::Float64.sql_name();
        match self {
            Self::Null => Err(EvalError::conversion("NULL", target)),
            Self::Int64(i) => Ok(*i as f64),
            Self::Uint64(u) => Ok(*u as f64),
            Self::Float64(f) => Ok(*f),
            Self::Text(s) => text_to_f64(s, ctx, target),
            Self::Bytes(b) => text_to_f64(&String::from_utf8_lossy(b), ctx, target),
        }
    }

    /// Convert to a signed integer under the context's conversion and
    /// overflow policies.
    ///
    /// Floats round half away from zero. Text that is not an integer literal
    /// goes through the float path first, so `'2.5'` becomes 3.
    pub fn to_i64(&self, ctx: &EvalContext) -> Result<i64> {
        let target = DatumKind::Int64.sql_name();
        match self {
            Self::Null => Err(EvalError::conversion("NULL", target)),
            Self::Int64(i) => Ok(*i),
            Self::Uint64(u) => {
                i64::try_from(*u).or_else(|_| saturate(ctx, &u.to_string(), i64::MAX))
            }
            Self::Float64(f) => float_to_i64(*f, ctx),
            Self::Text(s) => text_to_i64(s, ctx),
            Self::Bytes(b) => text_to_i64(&String::from_utf8_lossy(b), ctx),
        }
    }

    /// Compare two values for ordering functions such as `greatest`.
    ///
    /// Numbers compare numerically across integer and float kinds. Text and
    /// bytes compare lexically by byte. A number against text converts the
    /// text to DOUBLE through `ctx`, which may fail. NULL sorts first, and
    /// `-0.0` equals `0.0`.
    pub fn compare(&self, other: &Self, ctx: &EvalContext) -> Result<Ordering> {
        let ord = match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Less,
            (_, Self::Null) => Ordering::Greater,
            (Self::Int64(a), Self::Int64(b)) => a.cmp(b),
            (Self::Uint64(a), Self::Uint64(b)) => a.cmp(b),
            (Self::Float64(a), Self::Float64(b)) => float_cmp(*a, *b),
            (Self::Int64(a), Self::Uint64(b)) => int_uint_cmp(*a, *b),
            (Self::Uint64(a), Self::Int64(b)) => int_uint_cmp(*b, *a).reverse(),
            (Self::Int64(a), Self::Float64(b)) => int_float_cmp(*a, *b),
            (Self::Float64(a), Self::Int64(b)) => int_float_cmp(*b, *a).reverse(),
            (Self::Uint64(a), Self::Float64(b)) => uint_float_cmp(*a, *b),
            (Self::Float64(a), Self::Uint64(b)) => uint_float_cmp(*b, *a).reverse(),
            (Self::Text(a), Self::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            (Self::Text(a), Self::Bytes(b)) => a.as_bytes().cmp(b.as_slice()),
            (Self::Bytes(a), Self::Text(b)) => a.as_slice().cmp(b.as_bytes()),
            (Self::Text(_) | Self::Bytes(_), _) | (_, Self::Text(_) | Self::Bytes(_)) => {
                float_cmp(self.to_f64(ctx)?, other.to_f64(ctx)?)
            }
        };
        Ok(ord)
    }
}

// ── Conversion helpers ────────────────────────────────────────────────────

const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;
const U64_UPPER: f64 = 18_446_744_073_709_551_616.0;

/// Parse a complete numeric literal. Rejects the `inf`/`nan` spellings that
/// `f64::from_str` would otherwise accept.
fn parse_float_literal(s: &str) -> Option<f64> {
    if s.is_empty()
        || !s
            .bytes()
            .all(|c| c.is_ascii_digit() || matches!(c, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Longest prefix of `s` that forms a numeric literal (possibly empty).
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return "";
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    &s[..end]
}

fn text_to_f64(raw: &str, ctx: &EvalContext, target: &'static str) -> Result<f64> {
    let trimmed = raw.trim();
    if let Some(f) = parse_float_literal(trimmed) {
        return Ok(f);
    }
    match ctx.conversion_policy() {
        ConversionPolicy::Strict => Err(EvalError::conversion(format!("'{raw}'"), target)),
        ConversionPolicy::TruncateAsWarning => {
            ctx.append_warning(format!("truncated incorrect {target} value: '{raw}'"));
            Ok(numeric_prefix(trimmed).parse::<f64>().unwrap_or(0.0))
        }
    }
}

fn text_to_i64(raw: &str, ctx: &EvalContext) -> Result<i64> {
    if let Ok(i) = raw.trim().parse::<i64>() {
        return Ok(i);
    }
    let f = text_to_f64(raw, ctx, DatumKind::Int64.sql_name())?;
    float_to_i64(f, ctx)
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_i64(f: f64, ctx: &EvalContext) -> Result<i64> {
    if f.is_nan() {
        return Err(EvalError::conversion("NaN", DatumKind::Int64.sql_name()));
    }
    let rounded = f.round();
    if rounded < I64_LOWER {
        return saturate(ctx, &f.to_string(), i64::MIN);
    }
    if rounded >= I64_UPPER {
        return saturate(ctx, &f.to_string(), i64::MAX);
    }
    Ok(rounded as i64)
}

fn saturate(ctx: &EvalContext, value: &str, bound: i64) -> Result<i64> {
    let target = DatumKind::Int64.sql_name();
    match ctx.overflow_policy() {
        OverflowPolicy::Error => Err(EvalError::overflow(value, target)),
        OverflowPolicy::Saturate => {
            ctx.append_warning(format!("{target} value is out of range: {value}"));
            Ok(bound)
        }
    }
}

// ── Ordering helpers ──────────────────────────────────────────────────────

/// SQL ordering of two doubles: `-0.0 == 0.0`, and NaN falls back to
/// `f64::total_cmp` so the order stays total.
pub fn float_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

fn int_uint_cmp(i: i64, u: u64) -> Ordering {
    u64::try_from(i).map_or(Ordering::Less, |i| i.cmp(&u))
}

/// Compare an integer with a float without losing precision above 2^53.
///
/// NaN sorts above every number, matching `f64::total_cmp` for positive NaN.
#[allow(clippy::cast_possible_truncation)]
fn int_float_cmp(i: i64, r: f64) -> Ordering {
    if r.is_nan() {
        return Ordering::Less;
    }
    if r < I64_LOWER {
        return Ordering::Greater;
    }
    if r >= I64_UPPER {
        return Ordering::Less;
    }
    let t = r.trunc();
    match i.cmp(&(t as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(r - t)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn uint_float_cmp(u: u64, r: f64) -> Ordering {
    if r.is_nan() {
        return Ordering::Less;
    }
    if r < 0.0 {
        return Ordering::Greater;
    }
    if r >= U64_UPPER {
        return Ordering::Less;
    }
    let t = r.trunc();
    match u.cmp(&(t as u64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(r - t)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

// ── Trait impls ───────────────────────────────────────────────────────────

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Uint64(u) => write!(f, "{u}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Bytes(b) => {
                f.write_str("X'")?;
                for byte in b {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
        }
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<i32> for Datum {
    fn from(i: i32) -> Self {
        Self::Int64(i64::from(i))
    }
}

impl From<u64> for Datum {
    fn from(u: u64) -> Self {
        Self::Uint64(u)
    }
}

impl From<f64> for Datum {
    fn from(f: f64) -> Self {
        Self::Float64(f)
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for Datum {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<T: Into<Self>> From<Option<T>> for Datum {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::context::StatementConfig;

    fn strict() -> EvalContext {
        EvalContext::default()
    }

    fn lenient() -> EvalContext {
        EvalContext::new(
            StatementConfig::default()
                .with_conversion(ConversionPolicy::TruncateAsWarning)
                .with_overflow(OverflowPolicy::Saturate),
        )
    }

    #[test]
    fn kind_matches_tag() {
        assert_eq!(Datum::Null.kind(), DatumKind::Null);
        assert_eq!(Datum::Int64(1).kind(), DatumKind::Int64);
        assert_eq!(Datum::Uint64(1).kind(), DatumKind::Uint64);
        assert_eq!(Datum::Float64(1.0).kind(), DatumKind::Float64);
        assert_eq!(Datum::from("a").kind(), DatumKind::Text);
        assert_eq!(Datum::from(vec![1_u8]).kind(), DatumKind::Bytes);
        assert!(DatumKind::Uint64.is_numeric());
        assert!(!DatumKind::Text.is_numeric());
    }

    #[test]
    fn accessors_only_answer_matching_tag() {
        let d = Datum::Int64(7);
        assert_eq!(d.as_i64(), Some(7));
        assert_eq!(d.as_u64(), None);
        assert_eq!(d.as_f64(), None);
        assert_eq!(d.as_text(), None);
        assert_eq!(Datum::from("x").as_text(), Some("x"));
        assert_eq!(Datum::from(vec![9_u8]).as_bytes(), Some(&[9_u8][..]));
    }

    #[test]
    fn option_into_datum() {
        assert_eq!(Datum::from(None::<i64>), Datum::Null);
        assert_eq!(Datum::from(Some(3_i64)), Datum::Int64(3));
    }

    #[test]
    fn to_f64_numeric_kinds() {
        let ctx = strict();
        assert_eq!(Datum::Int64(-3).to_f64(&ctx).unwrap(), -3.0);
        assert_eq!(Datum::Uint64(5).to_f64(&ctx).unwrap(), 5.0);
        assert_eq!(Datum::Float64(2.5).to_f64(&ctx).unwrap(), 2.5);
        assert_eq!(Datum::from("  1.5e2 ").to_f64(&ctx).unwrap(), 150.0);
        assert_eq!(Datum::from(b"42".to_vec()).to_f64(&ctx).unwrap(), 42.0);
    }

    #[test]
    fn to_f64_null_is_error() {
        let err = Datum::Null.to_f64(&strict()).unwrap_err();
        assert!(matches!(err, EvalError::Conversion { target: "DOUBLE", .. }));
    }

    #[test]
    fn to_f64_strict_rejects_garbage() {
        let ctx = strict();
        for text in ["abc", "12abc", "", "inf", "NaN", "1..2"] {
            let err = Datum::from(text).to_f64(&ctx).unwrap_err();
            assert!(
                matches!(err, EvalError::Conversion { ref value, .. } if value == &format!("'{text}'")),
                "text={text:?} err={err:?}"
            );
        }
        assert_eq!(ctx.warning_count(), 0);
    }

    #[test]
    fn to_f64_lenient_uses_prefix_and_warns() {
        let ctx = lenient();
        assert_eq!(Datum::from("12abc").to_f64(&ctx).unwrap(), 12.0);
        assert_eq!(Datum::from("-3.5x").to_f64(&ctx).unwrap(), -3.5);
        assert_eq!(Datum::from("2e3e").to_f64(&ctx).unwrap(), 2000.0);
        assert_eq!(Datum::from("7e").to_f64(&ctx).unwrap(), 7.0);
        assert_eq!(Datum::from("abc").to_f64(&ctx).unwrap(), 0.0);
        assert_eq!(ctx.warning_count(), 5);
        assert!(ctx.warnings()[0].contains("'12abc'"));
    }

    #[test]
    fn numeric_prefix_edges() {
        assert_eq!(numeric_prefix("123"), "123");
        assert_eq!(numeric_prefix("+.5z"), "+.5");
        assert_eq!(numeric_prefix("1.z"), "1.");
        assert_eq!(numeric_prefix("."), "");
        assert_eq!(numeric_prefix("-"), "");
        assert_eq!(numeric_prefix("1e+"), "1");
        assert_eq!(numeric_prefix("1e-2x"), "1e-2");
    }

    #[test]
    fn to_i64_rounds_floats_and_text() {
        let ctx = strict();
        assert_eq!(Datum::Float64(2.5).to_i64(&ctx).unwrap(), 3);
        assert_eq!(Datum::Float64(-2.5).to_i64(&ctx).unwrap(), -3);
        assert_eq!(Datum::from("2.4").to_i64(&ctx).unwrap(), 2);
        assert_eq!(Datum::from(" -17 ").to_i64(&ctx).unwrap(), -17);
        assert_eq!(Datum::Uint64(9).to_i64(&ctx).unwrap(), 9);
    }

    #[test]
    fn to_i64_strict_text_error_names_bigint() {
        let err = Datum::from("seven").to_i64(&strict()).unwrap_err();
        assert!(matches!(err, EvalError::Conversion { target: "BIGINT", .. }));
    }

    #[test]
    fn to_i64_overflow_policies() {
        let err = Datum::Uint64(u64::MAX).to_i64(&strict()).unwrap_err();
        assert!(matches!(err, EvalError::IntegerOverflow { .. }));
        let err = Datum::Float64(1e30).to_i64(&strict()).unwrap_err();
        assert!(matches!(err, EvalError::IntegerOverflow { .. }));

        let ctx = lenient();
        assert_eq!(Datum::Uint64(u64::MAX).to_i64(&ctx).unwrap(), i64::MAX);
        assert_eq!(Datum::Float64(-1e30).to_i64(&ctx).unwrap(), i64::MIN);
        assert_eq!(ctx.warning_count(), 2);
    }

    #[test]
    fn to_i64_nan_is_error() {
        let err = Datum::Float64(f64::NAN).to_i64(&lenient()).unwrap_err();
        assert!(matches!(err, EvalError::Conversion { .. }));
    }

    #[test]
    fn compare_mixed_numeric() {
        let ctx = strict();
        let cmp = |a: Datum, b: Datum| a.compare(&b, &ctx).unwrap();
        assert_eq!(cmp(Datum::Int64(2), Datum::Int64(0)), Ordering::Greater);
        assert_eq!(cmp(Datum::Int64(-1), Datum::Uint64(0)), Ordering::Less);
        assert_eq!(cmp(Datum::Uint64(u64::MAX), Datum::Int64(i64::MAX)), Ordering::Greater);
        assert_eq!(cmp(Datum::Int64(2), Datum::Float64(2.5)), Ordering::Less);
        assert_eq!(cmp(Datum::Int64(-2), Datum::Float64(-2.5)), Ordering::Greater);
        assert_eq!(cmp(Datum::Float64(3.0), Datum::Int64(3)), Ordering::Equal);
        assert_eq!(cmp(Datum::Uint64(4), Datum::Float64(-1.0)), Ordering::Greater);
        assert_eq!(
            cmp(Datum::Int64(i64::MAX), Datum::Float64(9.3e18)),
            Ordering::Less
        );
    }

    #[test]
    fn compare_text_is_lexical() {
        let ctx = strict();
        assert_eq!(
            Datum::from("B").compare(&Datum::from("A"), &ctx).unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            Datum::from("abc")
                .compare(&Datum::from(b"abd".to_vec()), &ctx)
                .unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn compare_number_with_text_converts() {
        let ctx = strict();
        assert_eq!(
            Datum::Int64(10).compare(&Datum::from("9"), &ctx).unwrap(),
            Ordering::Greater
        );
        assert!(Datum::Int64(10).compare(&Datum::from("x"), &ctx).is_err());
    }

    #[test]
    fn compare_null_sorts_first() {
        let ctx = strict();
        assert_eq!(
            Datum::Null.compare(&Datum::Int64(i64::MIN), &ctx).unwrap(),
            Ordering::Less
        );
        assert_eq!(Datum::Null.compare(&Datum::Null, &ctx).unwrap(), Ordering::Equal);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Datum::Null.to_string(), "NULL");
        assert_eq!(Datum::Int64(-4).to_string(), "-4");
        assert_eq!(Datum::Float64(767.0).to_string(), "767");
        assert_eq!(Datum::from("hi").to_string(), "'hi'");
        assert_eq!(Datum::from(vec![0xAB_u8, 0x01]).to_string(), "X'AB01'");
    }

    #[test]
    fn compare_signed_zeros_equal() {
        let ctx = strict();
        let zero = Datum::Float64(0.0);
        let neg_zero = Datum::Float64(-0.0);
        assert_eq!(zero.compare(&neg_zero, &ctx).unwrap(), Ordering::Equal);
        assert_eq!(
            Datum::Int64(0).compare(&neg_zero, &ctx).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            Datum::from("-0").compare(&zero, &ctx).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn float_cmp_nan_is_total() {
        assert_eq!(float_cmp(f64::NAN, 1.0), Ordering::Greater);
        assert_eq!(float_cmp(1.0, f64::NAN), Ordering::Less);
        assert_eq!(float_cmp(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(float_cmp(-0.0, 0.0), Ordering::Equal);
    }

    proptest! {
        #[test]
        fn prop_int_float_compare_matches_f64(a in -1_000_000_i64..1_000_000, b in -1.0e6_f64..1.0e6) {
            let ctx = strict();
            #[allow(clippy::cast_precision_loss)]
            let expected = (a as f64).partial_cmp(&b).unwrap();
            prop_assert_eq!(Datum::Int64(a).compare(&Datum::Float64(b), &ctx).unwrap(), expected);
        }

        #[test]
        fn prop_integer_text_roundtrips_through_to_i64(i in any::<i64>()) {
            let ctx = strict();
            prop_assert_eq!(Datum::Text(i.to_string()).to_i64(&ctx).unwrap(), i);
        }
    }
}
