//! Recursive evaluation of compiled operator trees.
//!
//! Every call is a pure function of `(node, context)`: no node mutates
//! shared state, so the same compiled tree may be evaluated concurrently
//! from many threads with different contexts. Typed arithmetic delegates
//! to [`numeric`](crate::numeric), property and call resolution to
//! [`access`](crate::access); the nodes here only resolve operands,
//! apply nil policy, and pass results and errors through.
//!
//! Nil policy: in loose mode most binary operators short-circuit to nil
//! when either operand is nil; strict mode raises a nil-operand error
//! instead. The logical operators treat nil as falsy and never error,
//! `!!` swallows any resolution error as nil, and `|||` returns its left
//! operand when truthy without touching the right.

use std::cmp::Ordering;

use crate::{
    access,
    ast::{Node, OpKind, OpNode},
    numeric,
    value::Value,
};

/// Evaluation context, passed by value through every recursive call and
/// never mutated by the engine.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// The data object references resolve against (`$`)
    pub object: &'a Value,
    /// Nil-intolerant mode: operators error on nil operands instead of
    /// propagating nil
    pub strict: bool,
}

impl<'a> Context<'a> {
    pub fn new(object: &'a Value) -> Self {
        Context {
            object,
            strict: false,
        }
    }

    pub fn strict(object: &'a Value) -> Self {
        Context {
            object,
            strict: true,
        }
    }
}

/// Errors that can occur during evaluation.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// Broken tree shape at evaluation time (bare ternary operator,
    /// non-function callee)
    Structural(String),

    /// Strict-mode nil where a value was required
    NilOperand(String),

    /// Unsupported type combination or conversion failure
    Coercion(String),

    /// Invalid property or index target
    Access(String),

    /// Division or modulo by integer zero
    DivisionByZero,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::Structural(msg) => write!(f, "Structural error: {}", msg),
            EvalError::NilOperand(msg) => write!(f, "Nil error: {}", msg),
            EvalError::Coercion(msg) => write!(f, "Type error: {}", msg),
            EvalError::Access(msg) => write!(f, "Access error: {}", msg),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Computes a value from a compiled node against the given context.
pub fn calculate(node: &Node, ctx: Context<'_>) -> Result<Value, EvalError> {
    match node {
        Node::Literal(v) => Ok(v.clone()),
        Node::Root => Ok(ctx.object.clone()),
        Node::Ref(name) => resolve_ref(name, ctx),
        Node::Op(op) => calculate_op(op, ctx),
    }
}

fn resolve_ref(name: &str, ctx: Context<'_>) -> Result<Value, EvalError> {
    if ctx.object.is_null() {
        if ctx.strict {
            return Err(EvalError::NilOperand(format!("can't get nil.{}", name)));
        }
        return Ok(Value::Null);
    }
    access::get_property(ctx.object, name)
}

// Operand slots are populated by the tree builder before a node ever
// reaches evaluation; a missing slot is an internal invariant violation.
fn left(op: &OpNode) -> &Node {
    op.left.as_ref().expect("operator node missing left operand")
}

fn right(op: &OpNode) -> &Node {
    op.right.as_ref().expect("operator node missing right operand")
}

/// Resolves both operands of a nil-propagating binary operator.
/// `None` means a nil operand short-circuited in loose mode.
fn binary_operands(op: &OpNode, ctx: Context<'_>) -> Result<Option<(Value, Value)>, EvalError> {
    let lhs = calculate(left(op), ctx)?;
    if lhs.is_null() {
        if ctx.strict {
            return Err(EvalError::NilOperand("left object is nil".to_string()));
        }
        return Ok(None);
    }
    let rhs = calculate(right(op), ctx)?;
    if rhs.is_null() {
        if ctx.strict {
            return Err(EvalError::NilOperand("right object is nil".to_string()));
        }
        return Ok(None);
    }
    Ok(Some((lhs, rhs)))
}

fn unary_operand(op: &OpNode, ctx: Context<'_>) -> Result<Option<Value>, EvalError> {
    let v = calculate(left(op), ctx)?;
    if v.is_null() {
        if ctx.strict {
            return Err(EvalError::NilOperand("operand is nil".to_string()));
        }
        return Ok(None);
    }
    Ok(Some(v))
}

fn calculate_op(op: &OpNode, ctx: Context<'_>) -> Result<Value, EvalError> {
    use OpKind::*;

    match op.kind {
        Add | Sub | Mul | Div | Mod | BitAnd | BitOr | BitXor | ShiftLeft | ShiftRight
        | Match => {
            let Some((lhs, rhs)) = binary_operands(op, ctx)? else {
                return Ok(Value::Null);
            };
            match op.kind {
                Add => numeric::add(&lhs, &rhs),
                Sub => numeric::sub(&lhs, &rhs),
                Mul => numeric::mul(&lhs, &rhs),
                Div => numeric::div(&lhs, &rhs),
                Mod => numeric::rem(&lhs, &rhs),
                BitAnd => numeric::bit_and(&lhs, &rhs),
                BitOr => numeric::bit_or(&lhs, &rhs),
                BitXor => numeric::bit_xor(&lhs, &rhs),
                ShiftLeft => numeric::shift_left(&lhs, &rhs),
                ShiftRight => numeric::shift_right(&lhs, &rhs),
                Match => numeric::matches(&lhs, &rhs),
                _ => unreachable!(),
            }
        }

        Eq | Ne | Gt | Ge | Lt | Le => {
            let Some((lhs, rhs)) = binary_operands(op, ctx)? else {
                return Ok(Value::Null);
            };
            compare_op(op.kind, &lhs, &rhs)
        }

        Plus | Minus | BitNot => {
            let Some(v) = unary_operand(op, ctx)? else {
                return Ok(Value::Null);
            };
            match op.kind {
                Plus => numeric::pos(&v),
                Minus => numeric::neg(&v),
                _ => numeric::bit_not(&v),
            }
        }

        // logical operators treat nil as falsy and never nil-error
        Not => {
            let v = calculate(left(op), ctx)?;
            Ok(Value::Boolean(!v.as_bool()))
        }
        And => {
            let lhs = calculate(left(op), ctx)?;
            if !lhs.as_bool() {
                return Ok(Value::Boolean(false));
            }
            let rhs = calculate(right(op), ctx)?;
            Ok(Value::Boolean(rhs.as_bool()))
        }
        Or => {
            let lhs = calculate(left(op), ctx)?;
            if lhs.as_bool() {
                return Ok(Value::Boolean(true));
            }
            let rhs = calculate(right(op), ctx)?;
            Ok(Value::Boolean(rhs.as_bool()))
        }

        Nilable => match calculate(left(op), ctx) {
            Ok(v) => Ok(v),
            Err(_) => Ok(Value::Null),
        },
        Orable => {
            let lhs = calculate(left(op), ctx)?;
            if lhs.as_bool() {
                return Ok(lhs);
            }
            calculate(right(op), ctx)
        }

        Question => Err(EvalError::Structural(
            "Ternary '?' without a matching ':'".to_string(),
        )),
        Colon => eval_ternary(op, ctx),

        Dot => eval_member(op, ctx),
        IndexEnd => eval_index(op, ctx),
        InvokeEnd => eval_invoke(op, ctx),
        ArrayEnd => eval_array(op, ctx),

        IndexStart | ArrayStart(_) | Invoke(_) | Comma => Err(EvalError::Structural(format!(
            "Operator '{}' cannot be evaluated directly",
            op.kind.symbol()
        ))),
    }
}

fn compare_op(kind: OpKind, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match kind {
        OpKind::Eq => Ok(Value::Boolean(numeric::equals(lhs, rhs))),
        OpKind::Ne => Ok(Value::Boolean(!numeric::equals(lhs, rhs))),
        _ => {
            let result = match numeric::compare(lhs, rhs)? {
                // NaN never orders
                None => false,
                Some(ord) => match kind {
                    OpKind::Gt => ord == Ordering::Greater,
                    OpKind::Ge => ord != Ordering::Less,
                    OpKind::Lt => ord == Ordering::Less,
                    OpKind::Le => ord != Ordering::Greater,
                    _ => unreachable!(),
                },
            };
            Ok(Value::Boolean(result))
        }
    }
}

/// A `:` node selects a branch of its paired `?`, which must literally be
/// its left tree-neighbor. Only the winning branch is evaluated.
fn eval_ternary(op: &OpNode, ctx: Context<'_>) -> Result<Value, EvalError> {
    let Node::Op(question) = left(op) else {
        return Err(EvalError::Structural(
            "Ternary ':' without a matching '?'".to_string(),
        ));
    };
    if question.kind != OpKind::Question {
        return Err(EvalError::Structural(
            "Ternary ':' without a matching '?'".to_string(),
        ));
    }

    let cond = calculate(left(question), ctx)?;
    if cond.as_bool() {
        calculate(right(question), ctx)
    } else {
        calculate(right(op), ctx)
    }
}

fn eval_member(op: &OpNode, ctx: Context<'_>) -> Result<Value, EvalError> {
    let receiver = calculate(left(op), ctx)?;
    let key = member_key(right(op), ctx)?;
    if receiver.is_null() {
        if ctx.strict {
            return Err(EvalError::NilOperand(format!("can't get nil.{}", key)));
        }
        return Ok(Value::Null);
    }
    access::get_property(&receiver, &key)
}

/// The right operand of `.` is cast to a key string; a reference is used
/// by name rather than resolved against the context.
fn member_key(node: &Node, ctx: Context<'_>) -> Result<String, EvalError> {
    match node {
        Node::Ref(name) => Ok(name.clone()),
        node => Ok(calculate(node, ctx)?.as_string()),
    }
}

fn eval_index(op: &OpNode, ctx: Context<'_>) -> Result<Value, EvalError> {
    let start = match left(op) {
        Node::Op(start) if start.kind == OpKind::IndexStart => start,
        _ => {
            return Err(EvalError::Structural(
                "Index access without its opening '['".to_string(),
            ));
        }
    };

    let receiver = calculate(left(start), ctx)?;
    if receiver.is_null() {
        if ctx.strict {
            return Err(EvalError::NilOperand("can't index nil".to_string()));
        }
        return Ok(Value::Null);
    }
    let index = calculate(right(start), ctx)?;
    if index.is_null() {
        if ctx.strict {
            return Err(EvalError::NilOperand("index is nil".to_string()));
        }
        return Ok(Value::Null);
    }
    access::get_index(&receiver, &index)
}

fn eval_invoke(op: &OpNode, ctx: Context<'_>) -> Result<Value, EvalError> {
    let invoke = match left(op) {
        Node::Op(invoke) if matches!(invoke.kind, OpKind::Invoke(_)) => invoke,
        _ => {
            return Err(EvalError::Structural(
                "Call without its opening '('".to_string(),
            ));
        }
    };
    let OpKind::Invoke(argc) = invoke.kind else {
        unreachable!()
    };

    let callee = calculate(left(invoke), ctx)?;
    let func = match callee {
        Value::Function(f) => f,
        Value::Null => {
            if ctx.strict {
                return Err(EvalError::NilOperand("can't call nil".to_string()));
            }
            return Ok(Value::Null);
        }
        v => {
            return Err(EvalError::Structural(format!(
                "Callee is not a function, got {}",
                v.type_name()
            )));
        }
    };

    let mut args = Vec::with_capacity(argc);
    if argc > 0 {
        collect_args(right(invoke), ctx, &mut args)?;
    }
    access::invoke(&func, args)
}

/// Flattens a comma chain into an ordered argument list. The chain is
/// left-deep, so recursing left then right preserves source order.
fn collect_args(node: &Node, ctx: Context<'_>, out: &mut Vec<Value>) -> Result<(), EvalError> {
    if let Node::Op(op) = node
        && op.kind == OpKind::Comma
    {
        collect_args(left(op), ctx, out)?;
        collect_args(right(op), ctx, out)?;
        return Ok(());
    }
    out.push(calculate(node, ctx)?);
    Ok(())
}

fn eval_array(op: &OpNode, ctx: Context<'_>) -> Result<Value, EvalError> {
    let start = match left(op) {
        Node::Op(start) if matches!(start.kind, OpKind::ArrayStart(_)) => start,
        _ => {
            return Err(EvalError::Structural(
                "Array literal without its opening '{'".to_string(),
            ));
        }
    };
    let OpKind::ArrayStart(count) = start.kind else {
        unreachable!()
    };

    let mut items = Vec::with_capacity(count);
    if count > 0 {
        collect_args(left(start), ctx, &mut items)?;
    }
    Ok(Value::Array(items))
}
