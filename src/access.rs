//! Property, index, and function resolution against runtime values.
//!
//! The engine core never names a concrete host type: member access, index
//! access, and calls all go through this module, which resolves them
//! against [`Value`]s. Missing object keys and out-of-bounds array reads
//! resolve to nil; nil receivers also resolve to nil here, with the
//! caller applying strict-mode policy before the lookup.

use crate::evaluator::EvalError;
use crate::numeric;
use crate::value::{NativeFn, Value};

/// Property lookup by key. Scalars can't carry properties.
pub fn get_property(object: &Value, key: &str) -> Result<Value, EvalError> {
    match object {
        Value::Object(map) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
        Value::Null => Ok(Value::Null),
        v => Err(EvalError::Access(format!(
            "Cannot access property '{}' on {}",
            key,
            v.type_name()
        ))),
    }
}

/// Index lookup. Arrays take integer indices (negative counts from the
/// end, out of bounds is nil); objects are keyed by the index's string
/// form, so `obj[0]` reads the `"0"` key.
pub fn get_index(object: &Value, index: &Value) -> Result<Value, EvalError> {
    match (object, index) {
        (Value::Array(arr), Value::Integer(n)) => {
            let idx = if *n < 0 {
                let abs = n.unsigned_abs() as usize;
                if abs > arr.len() {
                    return Ok(Value::Null);
                }
                arr.len() - abs
            } else {
                *n as usize
            };
            Ok(arr.get(idx).cloned().unwrap_or(Value::Null))
        }
        (Value::Array(_), v) => Err(EvalError::Access(format!(
            "Cannot index array with {}; use an integer index",
            v.type_name()
        ))),
        (Value::Object(map), key) => match key {
            Value::String(_) | Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => {
                Ok(map.get(&key.as_string()).cloned().unwrap_or(Value::Null))
            }
            v => Err(EvalError::Access(format!(
                "Cannot index object with {} key",
                v.type_name()
            ))),
        },
        (Value::Null, _) => Ok(Value::Null),
        (v, _) => Err(EvalError::Access(format!(
            "Cannot index {}",
            v.type_name()
        ))),
    }
}

/// Calls a host function, checking the declared arity and coercing each
/// argument to its declared kind first. Undeclared parameters pass the
/// arguments through untouched.
pub fn invoke(func: &NativeFn, args: Vec<Value>) -> Result<Value, EvalError> {
    match func.params() {
        Some(kinds) => {
            if kinds.len() != args.len() {
                return Err(EvalError::Coercion(format!(
                    "Function expects {} arguments, got {}",
                    kinds.len(),
                    args.len()
                )));
            }
            let mut coerced = Vec::with_capacity(args.len());
            for (arg, kind) in args.into_iter().zip(kinds.iter()) {
                coerced.push(numeric::coerce(arg, *kind)?);
            }
            func.call(&coerced)
        }
        None => func.call(&args),
    }
}
