//! Token stream to operator tree.
//!
//! Parsing runs in three passes:
//!
//! 1. [`resolve`] - a lookback pass that settles context-sensitive tokens:
//!    unary vs binary `+`/`-`/`^`, call-paren vs grouping-paren, index
//!    brackets, array-literal braces, and comma argument counting.
//! 2. [`to_rpn`] - Dijkstra's shunting-yard conversion to Reverse Polish
//!    Notation, driven by each operator's fixed priority.
//! 3. [`build`] - a single pass over the RPN stream in which every
//!    operator claims its operands from the front of a working list,
//!    leaving exactly one root node.

use std::collections::VecDeque;

use crate::{
    ast::{Bracket, Node, OpKind, OpNode, Token},
    value::Value,
};

/// Errors produced while turning tokens into an operator tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Source contained no tokens
    EmptyExpression,
    /// Comma outside a call or array literal
    UnexpectedComma,
    /// Closing bracket with no matching opener
    UnexpectedClose(char),
    /// Opening bracket never closed
    MissingClose,
    /// `:` with no pending `?` to pair with
    UnmatchedColon,
    /// Operator/operand counts don't line up
    InvalidSequence,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyExpression => write!(f, "Empty expression"),
            ParseError::UnexpectedComma => {
                write!(f, "Unexpected ',' outside a call or array literal")
            }
            ParseError::UnexpectedClose(ch) => {
                write!(f, "Unexpected '{}' with no matching opening bracket", ch)
            }
            ParseError::MissingClose => write!(f, "Missing closing bracket"),
            ParseError::UnmatchedColon => write!(f, "Unmatched ':' with no pending '?'"),
            ParseError::InvalidSequence => write!(f, "Invalid operator sequence"),
        }
    }
}

impl std::error::Error for ParseError {}

fn close_char(bracket: Bracket) -> char {
    match bracket {
        Bracket::Paren => ')',
        Bracket::Square => ']',
        Bracket::Curly => '}',
    }
}

/// Open bracket the disambiguator is waiting to see closed.
enum Pending {
    /// Grouping paren
    Group,
    /// Call paren; `invoke_at`/`open_at` index into the output so the
    /// argument count can be patched at close
    Call {
        invoke_at: usize,
        open_at: usize,
        commas: usize,
    },
    /// Array literal brace
    Array {
        start_at: usize,
        open_at: usize,
        commas: usize,
    },
    /// Index bracket
    Index,
}

/// Resolves tokens whose meaning depends on the preceding token.
///
/// `+`/`-`/`^` become their unary forms at operand positions, `(` after a
/// reference opens a call, `[` always opens index access, and `{`/`}`
/// delimit an array literal (a synthetic call with no receiver). A `.` at
/// an operand position takes the whole context as its implicit receiver.
/// Close tokens patch the matching opener's argument count and emit the
/// corresponding end marker.
pub fn resolve(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut pending: Vec<Pending> = Vec::new();

    for token in tokens {
        match token {
            Token::Op(op @ (OpKind::Add | OpKind::Sub | OpKind::BitXor))
                if unary_position(&out) =>
            {
                let unary = match op {
                    OpKind::Add => OpKind::Plus,
                    OpKind::Sub => OpKind::Minus,
                    _ => OpKind::BitNot,
                };
                out.push(Token::Op(unary));
            }
            Token::Op(OpKind::Dot) if unary_position(&out) => {
                // `.Display()` reads from the whole context
                out.push(Token::Root);
                out.push(Token::Op(OpKind::Dot));
            }
            Token::Op(OpKind::Comma) => {
                match pending.last_mut() {
                    Some(Pending::Call { commas, .. }) | Some(Pending::Array { commas, .. }) => {
                        *commas += 1;
                    }
                    _ => return Err(ParseError::UnexpectedComma),
                }
                out.push(Token::Op(OpKind::Comma));
            }
            Token::Open(Bracket::Paren) => {
                if matches!(out.last(), Some(Token::Ref(_))) {
                    // call; the argument count is patched at close
                    let invoke_at = out.len();
                    out.push(Token::Op(OpKind::Invoke(0)));
                    out.push(Token::Open(Bracket::Paren));
                    pending.push(Pending::Call {
                        invoke_at,
                        open_at: invoke_at + 1,
                        commas: 0,
                    });
                } else {
                    out.push(Token::Open(Bracket::Paren));
                    pending.push(Pending::Group);
                }
            }
            Token::Close(Bracket::Paren) => match pending.pop() {
                Some(Pending::Group) => out.push(Token::Close(Bracket::Paren)),
                Some(Pending::Call {
                    invoke_at,
                    open_at,
                    commas,
                }) => {
                    let argc = if out.len() > open_at + 1 { commas + 1 } else { 0 };
                    out[invoke_at] = Token::Op(OpKind::Invoke(argc));
                    out.push(Token::Close(Bracket::Paren));
                    out.push(Token::Op(OpKind::InvokeEnd));
                }
                _ => return Err(ParseError::UnexpectedClose(')')),
            },
            Token::Open(Bracket::Square) => {
                out.push(Token::Op(OpKind::IndexStart));
                out.push(Token::Open(Bracket::Square));
                pending.push(Pending::Index);
            }
            Token::Close(Bracket::Square) => match pending.pop() {
                Some(Pending::Index) => {
                    out.push(Token::Close(Bracket::Square));
                    out.push(Token::Op(OpKind::IndexEnd));
                }
                _ => return Err(ParseError::UnexpectedClose(']')),
            },
            Token::Open(Bracket::Curly) => {
                let start_at = out.len();
                out.push(Token::Op(OpKind::ArrayStart(0)));
                out.push(Token::Open(Bracket::Curly));
                pending.push(Pending::Array {
                    start_at,
                    open_at: start_at + 1,
                    commas: 0,
                });
            }
            Token::Close(Bracket::Curly) => match pending.pop() {
                Some(Pending::Array {
                    start_at,
                    open_at,
                    commas,
                }) => {
                    let count = if out.len() > open_at + 1 { commas + 1 } else { 0 };
                    out[start_at] = Token::Op(OpKind::ArrayStart(count));
                    out.push(Token::Close(Bracket::Curly));
                    out.push(Token::Op(OpKind::ArrayEnd));
                }
                _ => return Err(ParseError::UnexpectedClose('}')),
            },
            token => out.push(token),
        }
    }

    if !pending.is_empty() {
        return Err(ParseError::MissingClose);
    }

    Ok(out)
}

/// True when the next operator would sit at an operand position: stream
/// start, after an opening bracket, or after any operator other than an
/// end marker.
fn unary_position(out: &[Token]) -> bool {
    match out.last() {
        None => true,
        Some(token) => !token.ends_operand(),
    }
}

/// Converts the disambiguated token stream to Reverse Polish Notation.
///
/// Classic shunting-yard with two grammar-specific exceptions: two prefix
/// unary operators never pop each other (an operand has yet to appear
/// between them), and an incoming `?` never pops a pending `?` or `:`
/// (the inner ternary must complete first). An incoming `:` pops to the
/// output until it has emitted exactly the innermost pending `?`.
pub fn to_rpn(tokens: Vec<Token>) -> Result<VecDeque<Token>, ParseError> {
    let mut output: VecDeque<Token> = VecDeque::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Open(bracket) => stack.push(Token::Open(bracket)),
            Token::Close(kind) => loop {
                match stack.pop() {
                    Some(Token::Open(bracket)) if bracket == kind => break,
                    Some(Token::Open(bracket)) => {
                        return Err(ParseError::UnexpectedClose(close_char(bracket)));
                    }
                    Some(op) => output.push_back(op),
                    None => return Err(ParseError::UnexpectedClose(close_char(kind))),
                }
            },
            Token::Op(OpKind::Colon) => {
                loop {
                    match stack.pop() {
                        Some(Token::Op(op)) => {
                            let paired = op == OpKind::Question;
                            output.push_back(Token::Op(op));
                            if paired {
                                break;
                            }
                        }
                        _ => return Err(ParseError::UnmatchedColon),
                    }
                }
                stack.push(Token::Op(OpKind::Colon));
            }
            Token::Op(op) => {
                loop {
                    let Some(Token::Op(top)) = stack.last() else {
                        break;
                    };
                    let top = *top;
                    if top.priority() > op.priority() {
                        break;
                    }
                    if op.is_unary() && top.is_unary() {
                        break;
                    }
                    if op == OpKind::Question
                        && matches!(top, OpKind::Question | OpKind::Colon)
                    {
                        break;
                    }
                    stack.pop();
                    output.push_back(Token::Op(top));
                }
                stack.push(Token::Op(op));
            }
            operand => output.push_back(operand),
        }
    }

    while let Some(token) = stack.pop() {
        match token {
            Token::Open(_) => return Err(ParseError::MissingClose),
            op => output.push_back(op),
        }
    }

    Ok(output)
}

/// Builds the operator tree from the RPN stream.
///
/// Single pass in original order over a working list addressed from the
/// front: operands push, each operator pops its arity's worth of items
/// (binary: right then left) into its slots and pushes itself back.
/// Exactly one item remains at the end - the root.
pub fn build(mut rpn: VecDeque<Token>) -> Result<Node, ParseError> {
    let mut list: VecDeque<Node> = VecDeque::new();

    while let Some(token) = rpn.pop_front() {
        let node = match token {
            Token::Integer(n) => Node::Literal(Value::Integer(n)),
            Token::Float(n) => Node::Literal(Value::Float(n)),
            Token::String(s) => Node::Literal(Value::String(s)),
            Token::Boolean(b) => Node::Literal(Value::Boolean(b)),
            Token::Nil => Node::Literal(Value::Null),
            Token::Ref(name) => Node::Ref(name),
            Token::Root => Node::Root,
            Token::Op(kind) => {
                let mut op = OpNode::new(kind);
                match kind.arity() {
                    0 => {}
                    1 => {
                        op.left = Some(list.pop_front().ok_or(ParseError::InvalidSequence)?);
                    }
                    _ => {
                        op.right = Some(list.pop_front().ok_or(ParseError::InvalidSequence)?);
                        op.left = Some(list.pop_front().ok_or(ParseError::InvalidSequence)?);
                    }
                }
                Node::Op(Box::new(op))
            }
            Token::Open(_) | Token::Close(_) | Token::Eof => {
                return Err(ParseError::InvalidSequence);
            }
        };
        list.push_front(node);
    }

    let root = list.pop_front().ok_or(ParseError::EmptyExpression)?;
    if !list.is_empty() {
        return Err(ParseError::InvalidSequence);
    }
    Ok(root)
}

/// Runs all three passes over a lexed token stream.
pub fn parse(tokens: Vec<Token>) -> Result<Node, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    build(to_rpn(resolve(tokens)?)?)
}
