pub mod access;
pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod numeric;
pub mod parser;
pub mod program;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Bracket, Node, OpKind, OpNode, Token};
pub use evaluator::{Context, EvalError};
pub use lexer::{LexError, Lexer};
pub use parser::ParseError;
pub use program::{Error, Program, calculate, calculate_strict, compile};
pub use value::{Kind, NativeFn, Value};
