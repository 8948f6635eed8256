//! Compiled programs and the public entry points.
//!
//! Compilation fails fast: no partial program is ever produced. A
//! compiled [`Program`] is immutable and holds no external resources, so
//! it can be kept around and evaluated repeatedly - including from many
//! threads at once against distinct contexts.

use std::fmt;

use crate::{
    ast::Node,
    evaluator::{self, Context, EvalError},
    lexer::{LexError, Lexer},
    parser::{self, ParseError},
    value::Value,
};

/// Any error a public entry point can return.
#[derive(Debug)]
pub enum Error {
    /// Malformed source text
    Lex(LexError),
    /// Structurally invalid expression
    Parse(ParseError),
    /// Evaluation failure
    Eval(EvalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => write!(f, "Lex error: {}", e),
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::Eval(e) => write!(f, "Evaluation error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::Eval(e) => Some(e),
        }
    }
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

/// A compiled expression: the original source plus its operator tree.
///
/// # Examples
///
/// ```
/// use gel_lang::{compile, Value};
///
/// let program = compile("1 + 2 * 3").unwrap();
/// assert_eq!(program.calculate(&Value::Null).unwrap(), Value::Integer(7));
///
/// // the source round-trips exactly
/// assert_eq!(program.to_string(), "1 + 2 * 3");
/// ```
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    root: Node,
}

/// Compiles an expression into a reusable [`Program`].
pub fn compile(expression: &str) -> Result<Program, Error> {
    let tokens = Lexer::new(expression).tokenize()?;
    let root = parser::parse(tokens)?;
    Ok(Program {
        source: expression.to_string(),
        root,
    })
}

impl Program {
    /// Evaluates against a context object in loose (nil-tolerant) mode.
    pub fn calculate(&self, object: &Value) -> Result<Value, EvalError> {
        evaluator::calculate(&self.root, Context::new(object))
    }

    /// Evaluates in strict mode: nil where a value is required is an
    /// error instead of propagating silently.
    pub fn calculate_strict(&self, object: &Value) -> Result<Value, EvalError> {
        evaluator::calculate(&self.root, Context::strict(object))
    }

    /// The original source text, exactly as given to [`compile`].
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled operator tree.
    pub fn root(&self) -> &Node {
        &self.root
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One-shot compile-and-evaluate in loose mode.
pub fn calculate(expression: &str, object: &Value) -> Result<Value, Error> {
    Ok(compile(expression)?.calculate(object)?)
}

/// One-shot compile-and-evaluate in strict mode.
pub fn calculate_strict(expression: &str, object: &Value) -> Result<Value, Error> {
    Ok(compile(expression)?.calculate_strict(object)?)
}
