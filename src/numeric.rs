//! Typed arithmetic over heterogeneous numeric kinds.
//!
//! Operator nodes delegate all numeric computation here: widening between
//! integers and floats, integer-preserving decimal arithmetic, NaN-aware
//! comparison, bitwise operations, the `~=` regex match, and argument
//! coercion for host function calls. Unsupported type combinations come
//! back as typed [`EvalError::Coercion`] errors; the nodes themselves only
//! handle operand resolution and nil policy.
//!
//! Mixed integer/float arithmetic goes through [`rust_decimal`] so results
//! that land on a whole number stay integers (`100 + 0.5 - 0.5` is the
//! integer `100`, not `100.0`).

use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::evaluator::EvalError;
use crate::value::{Kind, Value};

/// Narrows an exact decimal result back to a runtime value, preferring
/// `Integer` when the result is whole.
fn narrow(rd: Decimal) -> Option<Value> {
    if rd.is_integer()
        && let Some(r) = rd.to_i64()
    {
        Some(Value::Integer(r))
    } else {
        rd.to_f64().map(Value::Float)
    }
}

pub fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a + b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
        (Value::Integer(a), Value::Float(b)) => {
            if let Some(ad) = Decimal::from_i64(*a)
                && let Some(bd) = Decimal::from_f64(*b)
                && let Some(v) = ad.checked_add(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a as f64 + b))
        }
        (Value::Float(a), Value::Integer(b)) => {
            if let Some(ad) = Decimal::from_f64(*a)
                && let Some(bd) = Decimal::from_i64(*b)
                && let Some(v) = ad.checked_add(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a + *b as f64))
        }
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (a, b) => Err(EvalError::Coercion(format!(
            "Cannot add {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub fn sub(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a - b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
        (Value::Integer(a), Value::Float(b)) => {
            if let Some(ad) = Decimal::from_i64(*a)
                && let Some(bd) = Decimal::from_f64(*b)
                && let Some(v) = ad.checked_sub(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a as f64 - b))
        }
        (Value::Float(a), Value::Integer(b)) => {
            if let Some(ad) = Decimal::from_f64(*a)
                && let Some(bd) = Decimal::from_i64(*b)
                && let Some(v) = ad.checked_sub(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a - *b as f64))
        }
        (a, b) => Err(EvalError::Coercion(format!(
            "Cannot subtract {} from {}",
            b.type_name(),
            a.type_name()
        ))),
    }
}

pub fn mul(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a * b)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a * b)),
        (Value::Integer(a), Value::Float(b)) => {
            if let Some(ad) = Decimal::from_i64(*a)
                && let Some(bd) = Decimal::from_f64(*b)
                && let Some(v) = ad.checked_mul(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a as f64 * b))
        }
        (Value::Float(a), Value::Integer(b)) => {
            if let Some(ad) = Decimal::from_f64(*a)
                && let Some(bd) = Decimal::from_i64(*b)
                && let Some(v) = ad.checked_mul(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a * *b as f64))
        }
        (a, b) => Err(EvalError::Coercion(format!(
            "Cannot multiply {} by {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub fn div(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            if *b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            // exact division stays an integer
            if a % b == 0 {
                Ok(Value::Integer(a / b))
            } else {
                Ok(Value::Float(*a as f64 / *b as f64))
            }
        }
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
        (Value::Integer(a), Value::Float(b)) => {
            if let Some(ad) = Decimal::from_i64(*a)
                && let Some(bd) = Decimal::from_f64(*b)
                && let Some(v) = ad.checked_div(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a as f64 / b))
        }
        (Value::Float(a), Value::Integer(b)) => {
            if *b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            if let Some(ad) = Decimal::from_f64(*a)
                && let Some(bd) = Decimal::from_i64(*b)
                && let Some(v) = ad.checked_div(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a / *b as f64))
        }
        (a, b) => Err(EvalError::Coercion(format!(
            "Cannot divide {} by {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub fn rem(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            if *b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Integer(a % b))
        }
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a % b)),
        (Value::Integer(a), Value::Float(b)) => {
            if let Some(ad) = Decimal::from_i64(*a)
                && let Some(bd) = Decimal::from_f64(*b)
                && let Some(v) = ad.checked_rem(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a as f64 % b))
        }
        (Value::Float(a), Value::Integer(b)) => {
            if *b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            if let Some(ad) = Decimal::from_f64(*a)
                && let Some(bd) = Decimal::from_i64(*b)
                && let Some(v) = ad.checked_rem(bd).and_then(narrow)
            {
                return Ok(v);
            }
            Ok(Value::Float(*a % *b as f64))
        }
        (a, b) => Err(EvalError::Coercion(format!(
            "Cannot compute modulo of {} by {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

pub fn neg(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Integer(n) => Ok(Value::Integer(-n)),
        Value::Float(n) => Ok(Value::Float(-n)),
        v => Err(EvalError::Coercion(format!(
            "Cannot negate {}",
            v.type_name()
        ))),
    }
}

pub fn pos(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Integer(_) | Value::Float(_) => Ok(value.clone()),
        v => Err(EvalError::Coercion(format!(
            "Cannot apply unary '+' to {}",
            v.type_name()
        ))),
    }
}

/// Integer operand for the bitwise family. Whole floats widen in.
fn int_operand(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(*n),
        Value::Float(n) if n.fract() == 0.0 => Some(*n as i64),
        _ => None,
    }
}

fn bitwise(
    op: &str,
    left: &Value,
    right: &Value,
    f: impl Fn(i64, i64) -> i64,
) -> Result<Value, EvalError> {
    match (int_operand(left), int_operand(right)) {
        (Some(a), Some(b)) => Ok(Value::Integer(f(a, b))),
        _ => Err(EvalError::Coercion(format!(
            "Cannot apply '{}' to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

pub fn bit_and(left: &Value, right: &Value) -> Result<Value, EvalError> {
    bitwise("&", left, right, |a, b| a & b)
}

pub fn bit_or(left: &Value, right: &Value) -> Result<Value, EvalError> {
    bitwise("|", left, right, |a, b| a | b)
}

pub fn bit_xor(left: &Value, right: &Value) -> Result<Value, EvalError> {
    bitwise("^", left, right, |a, b| a ^ b)
}

pub fn bit_not(value: &Value) -> Result<Value, EvalError> {
    match int_operand(value) {
        Some(a) => Ok(Value::Integer(!a)),
        None => Err(EvalError::Coercion(format!(
            "Cannot apply '~' to {}",
            value.type_name()
        ))),
    }
}

pub fn shift_left(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (int_operand(left), int_operand(right)) {
        (Some(a), Some(b)) => {
            if b < 0 {
                return Err(EvalError::Coercion("Negative shift count".to_string()));
            }
            if b >= 64 {
                return Ok(Value::Integer(0));
            }
            Ok(Value::Integer(a << b))
        }
        _ => Err(EvalError::Coercion(format!(
            "Cannot apply '<<' to {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

pub fn shift_right(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (int_operand(left), int_operand(right)) {
        (Some(a), Some(b)) => {
            if b < 0 {
                return Err(EvalError::Coercion("Negative shift count".to_string()));
            }
            if b >= 64 {
                // arithmetic shift saturates to the sign
                return Ok(Value::Integer(if a < 0 { -1 } else { 0 }));
            }
            Ok(Value::Integer(a >> b))
        }
        _ => Err(EvalError::Coercion(format!(
            "Cannot apply '>>' to {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Widening numeric comparison. `Ok(None)` means the operands don't order
/// (NaN involved); non-numeric operands are a [`EvalError::Coercion`].
pub fn compare(left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
        (Value::Float(a), Value::Float(b)) => Ok(a.partial_cmp(b)),
        (Value::Integer(a), Value::Float(b)) => Ok((*a as f64).partial_cmp(b)),
        (Value::Float(a), Value::Integer(b)) => Ok(a.partial_cmp(&(*b as f64))),
        (a, b) => Err(EvalError::Coercion(format!(
            "Cannot compare {} and {} (comparison requires numeric types)",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Equality with numeric widening, so `1 == 1.0` holds. Non-numeric
/// operands fall back to structural equality.
pub fn equals(left: &Value, right: &Value) -> bool {
    match compare(left, right) {
        Ok(ord) => ord == Some(Ordering::Equal),
        Err(_) => left == right,
    }
}

/// The `~=` regex-match comparison: left string tested against the right
/// pattern.
pub fn matches(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Value::String(s), Value::String(pattern)) = (left, right) else {
        return Err(EvalError::Coercion(format!(
            "Cannot match {} against {} ('~=' requires strings)",
            left.type_name(),
            right.type_name()
        )));
    };
    let re = regex::Regex::new(pattern)
        .map_err(|e| EvalError::Coercion(format!("invalid regex: {e}")))?;
    Ok(Value::Boolean(re.is_match(s)))
}

/// Coerces a call argument to a declared parameter kind. Nil passes
/// through untouched; the callee sees it as-is.
pub fn coerce(value: Value, kind: Kind) -> Result<Value, EvalError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match kind {
        Kind::Bool => Ok(Value::Boolean(value.as_bool())),
        Kind::Int => match &value {
            Value::Integer(_) => Ok(value),
            Value::Float(n) => Ok(Value::Integer(n.round() as i64)),
            Value::Boolean(b) => Ok(Value::Integer(*b as i64)),
            Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
                EvalError::Coercion(format!("Cannot convert '{}' to integer", s))
            }),
            v => Err(EvalError::Coercion(format!(
                "Cannot convert {} to integer",
                v.type_name()
            ))),
        },
        Kind::Float => match &value {
            Value::Float(_) => Ok(value),
            Value::Integer(n) => Ok(Value::Float(*n as f64)),
            Value::Boolean(b) => Ok(Value::Float(*b as i64 as f64)),
            Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                EvalError::Coercion(format!("Cannot convert '{}' to float", s))
            }),
            v => Err(EvalError::Coercion(format!(
                "Cannot convert {} to float",
                v.type_name()
            ))),
        },
        Kind::Str => Ok(Value::String(value.as_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_arithmetic_preserves_integers() {
        let result = add(&Value::Integer(100), &Value::Float(0.5)).unwrap();
        assert_eq!(result, Value::Float(100.5));

        let result = sub(&Value::Float(100.5), &Value::Float(0.5)).unwrap();
        assert_eq!(result, Value::Float(100.0));

        let result = mul(&Value::Integer(3), &Value::Float(0.5)).unwrap();
        assert_eq!(result, Value::Float(1.5));

        let result = mul(&Value::Integer(4), &Value::Float(0.5)).unwrap();
        assert_eq!(result, Value::Integer(2));
    }

    #[test]
    fn test_exact_integer_division() {
        assert_eq!(
            div(&Value::Integer(10), &Value::Integer(2)).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            div(&Value::Integer(7), &Value::Integer(2)).unwrap(),
            Value::Float(3.5)
        );
        assert!(matches!(
            div(&Value::Integer(1), &Value::Integer(0)),
            Err(EvalError::DivisionByZero)
        ));
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(
            bit_not(&Value::Integer(5)).unwrap(),
            Value::Integer(-6)
        );
        assert_eq!(
            bit_xor(&Value::Integer(6), &Value::Integer(3)).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            shift_left(&Value::Integer(1), &Value::Integer(4)).unwrap(),
            Value::Integer(16)
        );
        assert_eq!(
            shift_right(&Value::Integer(-8), &Value::Integer(1)).unwrap(),
            Value::Integer(-4)
        );
    }

    #[test]
    fn test_nan_comparisons() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(compare(&nan, &Value::Integer(1)).unwrap(), None);
        assert!(!equals(&nan, &nan));
    }

    #[test]
    fn test_regex_match() {
        assert_eq!(
            matches(
                &Value::String("abc".into()),
                &Value::String("^a.*$".into())
            )
            .unwrap(),
            Value::Boolean(true)
        );
        assert!(matches(&Value::Integer(1), &Value::String(".*".into())).is_err());
    }
}
