//! Execute gel expressions against JSON input

use super::{CliError, gel_to_json, json_to_gel};
use crate::{Value, compile};

/// Options for evaluating an expression
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON context string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Evaluate in strict (nil-intolerant) mode
    pub strict: bool,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of an evaluation
#[derive(Debug)]
pub enum EvalResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated successfully with JSON output
    Success(serde_json::Value),
}

/// Compile and evaluate an expression against the given JSON context.
/// With no input the expression runs against a nil context.
pub fn execute(options: &EvalOptions) -> Result<EvalResult, CliError> {
    let program = compile(&options.expression).map_err(CliError::Compile)?;

    if options.syntax_only {
        return Ok(EvalResult::SyntaxValid);
    }

    let context = match &options.input {
        Some(json_str) => {
            let json_value: serde_json::Value =
                serde_json::from_str(json_str).map_err(CliError::Json)?;
            json_to_gel(json_value)
        }
        None => Value::Null,
    };

    let result = if options.strict {
        program.calculate_strict(&context)
    } else {
        program.calculate(&context)
    }
    .map_err(CliError::Eval)?;

    Ok(EvalResult::Success(gel_to_json(result)))
}
