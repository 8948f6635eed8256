use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::evaluator::EvalError;

/// A runtime value used throughout the GEL expression language.
///
/// This type represents every value an expression can produce or consume,
/// with a distinction between integers and floats (unlike JSON which only
/// has "number"), plus a `Function` variant so a context can expose host
/// functions to expressions.
///
/// # Type Preservation
///
/// The language preserves the distinction between integers and floats:
/// - Arithmetic operations maintain integer types when results are whole
/// - Mixed operations intelligently preserve integers when mathematically valid
/// - High-precision decimal arithmetic prevents floating-point errors
///
/// # Examples
///
/// ```
/// use gel_lang::Value;
/// use std::collections::HashMap;
///
/// // Scalar values
/// let nil = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let float = Value::Float(3.14);
/// let string = Value::String("hello".to_string());
///
/// // Collections
/// let array = Value::Array(vec![Value::Integer(1), Value::Integer(2)]);
///
/// let mut obj = HashMap::new();
/// obj.insert("key".to_string(), Value::String("value".to_string()));
/// let object = Value::Object(obj);
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Nil
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values (homogeneous or heterogeneous)
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),

    /// Host function callable from expressions
    Function(NativeFn),
}

/// Declared parameter kind for host functions.
///
/// Arguments are coerced to the declared kind before the function is called,
/// standing in for the argument conversion a reflective host would perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Str,
}

/// A host function exposed to expressions through the context.
///
/// Wraps a callable plus an optional declared parameter list. When parameter
/// kinds are declared, the evaluator checks arity and coerces each argument
/// before the call; with `None` the arguments are passed through untouched.
///
/// # Examples
///
/// ```
/// use gel_lang::{Kind, NativeFn, Value};
///
/// let double = NativeFn::with_params(vec![Kind::Int], |args: &[Value]| {
///     match &args[0] {
///         Value::Integer(n) => Ok(Value::Integer(n * 2)),
///         _ => unreachable!(),
///     }
/// });
/// let f = Value::Function(double);
/// ```
#[derive(Clone)]
pub struct NativeFn {
    params: Option<Vec<Kind>>,
    func: Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>,
}

impl NativeFn {
    /// Creates a function with no declared parameters (arguments pass through).
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        NativeFn {
            params: None,
            func: Arc::new(func),
        }
    }

    /// Creates a function with a declared parameter list.
    pub fn with_params<F>(params: Vec<Kind>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        NativeFn {
            params: Some(params),
            func: Arc::new(func),
        }
    }

    /// Declared parameter kinds, if any.
    pub fn params(&self) -> Option<&[Kind]> {
        self.params.as_deref()
    }

    /// Invokes the underlying callable without coercion.
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Function(a), Function(b)) => Arc::ptr_eq(&a.func, &b.func),
            _ => false,
        }
    }
}

impl Value {
    /// Check if the value is truthy (for conditions)
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n > 0.0,
            Integer(n) => *n > 0,
            String(s) => !s.is_empty(),
            Array(arr) => !arr.is_empty(),
            Object(obj) => !obj.is_empty(),
            Function(_) => true,
        }
    }

    /// Convert to boolean for conditions
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            _ => self.is_truthy(),
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) => Some(n.round() as i64),
            _ => None,
        }
    }

    /// Get as string (concatenation, member keys)
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(n) => n.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Function(_) => "<function>".to_string(),
            _ => format!("{:?}", self),
        }
    }

    /// Human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// True when the value is nil
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
