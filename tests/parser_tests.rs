use gel_lang::ast::{Node, OpKind, Token};
use gel_lang::lexer::Lexer;
use gel_lang::parser::{self, ParseError};
use gel_lang::value::Value;

fn rpn(src: &str) -> Vec<Token> {
    let tokens = Lexer::new(src).tokenize().unwrap();
    parser::to_rpn(parser::resolve(tokens).unwrap())
        .unwrap()
        .into_iter()
        .collect()
}

fn parse(src: &str) -> Node {
    parser::parse(Lexer::new(src).tokenize().unwrap()).unwrap()
}

fn parse_err(src: &str) -> ParseError {
    parser::parse(Lexer::new(src).tokenize().unwrap()).unwrap_err()
}

#[test]
fn test_precedence_rpn() {
    assert_eq!(
        rpn("1+2*3"),
        vec![
            Token::Integer(1),
            Token::Integer(2),
            Token::Integer(3),
            Token::Op(OpKind::Mul),
            Token::Op(OpKind::Add),
        ]
    );
}

#[test]
fn test_grouping_paren_rpn() {
    assert_eq!(
        rpn("(1+2)*3"),
        vec![
            Token::Integer(1),
            Token::Integer(2),
            Token::Op(OpKind::Add),
            Token::Integer(3),
            Token::Op(OpKind::Mul),
        ]
    );
}

#[test]
fn test_left_associativity() {
    assert_eq!(
        rpn("1-1-1"),
        vec![
            Token::Integer(1),
            Token::Integer(1),
            Token::Op(OpKind::Sub),
            Token::Integer(1),
            Token::Op(OpKind::Sub),
        ]
    );
}

#[test]
fn test_unary_minus_after_operator() {
    assert_eq!(
        rpn("2*-3"),
        vec![
            Token::Integer(2),
            Token::Integer(3),
            Token::Op(OpKind::Minus),
            Token::Op(OpKind::Mul),
        ]
    );
}

#[test]
fn test_unary_chain_preserved() {
    // equal-priority unary operators must not pop each other
    assert_eq!(
        rpn("- -5"),
        vec![
            Token::Integer(5),
            Token::Op(OpKind::Minus),
            Token::Op(OpKind::Minus),
        ]
    );
    assert_eq!(
        rpn("!~5"),
        vec![
            Token::Integer(5),
            Token::Op(OpKind::BitNot),
            Token::Op(OpKind::Not),
        ]
    );
}

#[test]
fn test_caret_unary_becomes_bitwise_not() {
    assert_eq!(
        rpn("^5"),
        vec![Token::Integer(5), Token::Op(OpKind::BitNot)]
    );
    assert_eq!(
        rpn("1^5"),
        vec![
            Token::Integer(1),
            Token::Integer(5),
            Token::Op(OpKind::BitXor),
        ]
    );
}

#[test]
fn test_call_markers() {
    assert_eq!(
        rpn("f(1,2)"),
        vec![
            Token::Ref("f".to_string()),
            Token::Integer(1),
            Token::Integer(2),
            Token::Op(OpKind::Comma),
            Token::Op(OpKind::Invoke(2)),
            Token::Op(OpKind::InvokeEnd),
        ]
    );
}

#[test]
fn test_zero_argument_call() {
    assert_eq!(
        rpn("f()"),
        vec![
            Token::Ref("f".to_string()),
            Token::Op(OpKind::Invoke(0)),
            Token::Op(OpKind::InvokeEnd),
        ]
    );
}

#[test]
fn test_single_argument_call() {
    assert_eq!(
        rpn("f(9)"),
        vec![
            Token::Ref("f".to_string()),
            Token::Integer(9),
            Token::Op(OpKind::Invoke(1)),
            Token::Op(OpKind::InvokeEnd),
        ]
    );
}

#[test]
fn test_array_literal_markers() {
    assert_eq!(
        rpn("{1,2,3}"),
        vec![
            Token::Integer(1),
            Token::Integer(2),
            Token::Op(OpKind::Comma),
            Token::Integer(3),
            Token::Op(OpKind::Comma),
            Token::Op(OpKind::ArrayStart(3)),
            Token::Op(OpKind::ArrayEnd),
        ]
    );
}

#[test]
fn test_empty_array_literal() {
    assert_eq!(
        rpn("{}"),
        vec![
            Token::Op(OpKind::ArrayStart(0)),
            Token::Op(OpKind::ArrayEnd),
        ]
    );
}

#[test]
fn test_index_markers() {
    assert_eq!(
        rpn("items[0]"),
        vec![
            Token::Ref("items".to_string()),
            Token::Integer(0),
            Token::Op(OpKind::IndexStart),
            Token::Op(OpKind::IndexEnd),
        ]
    );
}

#[test]
fn test_implicit_receiver_dot() {
    // a leading `.` reads from the whole context
    assert_eq!(
        rpn(".f()"),
        vec![
            Token::Root,
            Token::Ref("f".to_string()),
            Token::Op(OpKind::Dot),
            Token::Op(OpKind::Invoke(0)),
            Token::Op(OpKind::InvokeEnd),
        ]
    );
}

#[test]
fn test_ternary_rpn() {
    assert_eq!(
        rpn("a?1:2"),
        vec![
            Token::Ref("a".to_string()),
            Token::Integer(1),
            Token::Op(OpKind::Question),
            Token::Integer(2),
            Token::Op(OpKind::Colon),
        ]
    );
}

#[test]
fn test_nested_ternary_rpn() {
    // the outer `:` must pop through the completed inner pair before
    // emitting its own `?`
    assert_eq!(
        rpn("a ? b ? 1 : 2 : 3"),
        vec![
            Token::Ref("a".to_string()),
            Token::Ref("b".to_string()),
            Token::Integer(1),
            Token::Op(OpKind::Question),
            Token::Integer(2),
            Token::Op(OpKind::Colon),
            Token::Op(OpKind::Question),
            Token::Integer(3),
            Token::Op(OpKind::Colon),
        ]
    );
}

#[test]
fn test_missing_close_paren() {
    assert_eq!(parse_err("(1+2"), ParseError::MissingClose);
}

#[test]
fn test_stray_close_paren() {
    assert_eq!(parse_err("1+2)"), ParseError::UnexpectedClose(')'));
}

#[test]
fn test_mismatched_brackets() {
    assert_eq!(parse_err("(1+2]"), ParseError::UnexpectedClose(']'));
    assert_eq!(parse_err("{1,2)"), ParseError::UnexpectedClose(')'));
    assert_eq!(parse_err("a[1}"), ParseError::UnexpectedClose('}'));
}

#[test]
fn test_comma_outside_call() {
    assert_eq!(parse_err("1,2"), ParseError::UnexpectedComma);
    assert_eq!(parse_err("(1,2)"), ParseError::UnexpectedComma);
}

#[test]
fn test_unmatched_colon() {
    assert_eq!(parse_err("1:2"), ParseError::UnmatchedColon);
    assert_eq!(parse_err("(a?1):2"), ParseError::UnmatchedColon);
}

#[test]
fn test_adjacent_operands_rejected() {
    assert_eq!(parse_err("1 2"), ParseError::InvalidSequence);
}

#[test]
fn test_empty_expression() {
    assert_eq!(parse_err(""), ParseError::EmptyExpression);
    assert_eq!(parse_err("   "), ParseError::EmptyExpression);
}

#[test]
fn test_tree_shape() {
    let root = parse("1+2");
    let Node::Op(op) = root else {
        panic!("expected operator root, got {:?}", root)
    };
    assert_eq!(op.kind, OpKind::Add);
    assert_eq!(op.left, Some(Node::Literal(Value::Integer(1))));
    assert_eq!(op.right, Some(Node::Literal(Value::Integer(2))));
}

#[test]
fn test_tree_binary_pops_right_then_left() {
    let root = parse("10-4");
    let Node::Op(op) = root else {
        panic!("expected operator root")
    };
    assert_eq!(op.kind, OpKind::Sub);
    assert_eq!(op.left, Some(Node::Literal(Value::Integer(10))));
    assert_eq!(op.right, Some(Node::Literal(Value::Integer(4))));
}

#[test]
fn test_member_access_chain_tree() {
    let root = parse("a.b.c");
    let Node::Op(outer) = root else {
        panic!("expected operator root")
    };
    assert_eq!(outer.kind, OpKind::Dot);
    assert_eq!(outer.right, Some(Node::Ref("c".to_string())));
    let Some(Node::Op(inner)) = outer.left else {
        panic!("expected inner dot")
    };
    assert_eq!(inner.kind, OpKind::Dot);
    assert_eq!(inner.left, Some(Node::Ref("a".to_string())));
    assert_eq!(inner.right, Some(Node::Ref("b".to_string())));
}
