use gel_lang::ast::{Bracket, OpKind, Token};
use gel_lang::lexer::{LexError, Lexer};

fn tokenize(src: &str) -> Vec<Token> {
    Lexer::new(src).tokenize().unwrap()
}

fn tokenize_err(src: &str) -> LexError {
    Lexer::new(src).tokenize().unwrap_err()
}

#[test]
fn test_integer_literals() {
    assert_eq!(tokenize("42"), vec![Token::Integer(42)]);
    assert_eq!(tokenize("1_000_000"), vec![Token::Integer(1_000_000)]);
    assert_eq!(tokenize("0"), vec![Token::Integer(0)]);
}

#[test]
fn test_float_literals() {
    assert_eq!(tokenize("3.14"), vec![Token::Float(3.14)]);
    assert_eq!(tokenize(".5"), vec![Token::Float(0.5)]);
    assert_eq!(tokenize("1."), vec![Token::Float(1.0)]);
}

#[test]
fn test_number_suffixes() {
    assert_eq!(tokenize("10l"), vec![Token::Integer(10)]);
    assert_eq!(tokenize("10L"), vec![Token::Integer(10)]);
    assert_eq!(tokenize("2.5f"), vec![Token::Float(2.5)]);
    assert_eq!(tokenize("2.5F"), vec![Token::Float(2.5)]);
    assert_eq!(tokenize("3d"), vec![Token::Float(3.0)]);
    assert_eq!(tokenize("3.25D"), vec![Token::Float(3.25)]);
}

#[test]
fn test_second_decimal_point_is_error() {
    assert!(matches!(
        tokenize_err("1.2.3"),
        LexError::SecondDecimalPoint { .. }
    ));
}

#[test]
fn test_member_access_vs_decimal_point() {
    // dot followed by an identifier is member access, not a decimal
    assert_eq!(
        tokenize("a.b"),
        vec![
            Token::Ref("a".to_string()),
            Token::Op(OpKind::Dot),
            Token::Ref("b".to_string()),
        ]
    );
    assert_eq!(
        tokenize("1.x"),
        vec![
            Token::Integer(1),
            Token::Op(OpKind::Dot),
            Token::Ref("x".to_string()),
        ]
    );
}

#[test]
fn test_keywords_fold_to_literals() {
    assert_eq!(
        tokenize("true false nil"),
        vec![Token::Boolean(true), Token::Boolean(false), Token::Nil]
    );
}

#[test]
fn test_references() {
    assert_eq!(tokenize("user_name"), vec![Token::Ref("user_name".to_string())]);
    assert_eq!(tokenize("$"), vec![Token::Root]);
    // a leading `$` on a name is stripped: `$threshold` == `threshold`
    assert_eq!(tokenize("$threshold"), vec![Token::Ref("threshold".to_string())]);
}

#[test]
fn test_double_quoted_string() {
    assert_eq!(
        tokenize("\"hello\""),
        vec![Token::String("hello".to_string())]
    );
}

#[test]
fn test_single_quoted_string() {
    assert_eq!(
        tokenize("'item #1'"),
        vec![Token::String("item #1".to_string())]
    );
}

#[test]
fn test_simple_escapes() {
    assert_eq!(
        tokenize(r#""a\nb\tc\rd\\e\'f\"g""#),
        vec![Token::String("a\nb\tc\rd\\e'f\"g".to_string())]
    );
    assert_eq!(
        tokenize(r#""\b\f\v""#),
        vec![Token::String("\u{0008}\u{000C}\u{000B}".to_string())]
    );
}

#[test]
fn test_hex_and_unicode_escapes() {
    assert_eq!(
        tokenize(r#""\x20\x41""#),
        vec![Token::String(" A".to_string())]
    );
    assert_eq!(
        tokenize("\"\\u3000\""),
        vec![Token::String("\u{3000}".to_string())]
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(tokenize_err("\"abc"), LexError::UnterminatedString);
    assert_eq!(tokenize_err("'abc"), LexError::UnterminatedString);
}

#[test]
fn test_invalid_escape() {
    assert!(matches!(
        tokenize_err(r#""\q""#),
        LexError::InvalidEscape { .. }
    ));
    assert!(matches!(
        tokenize_err(r#""\x2z""#),
        LexError::InvalidEscape { .. }
    ));
}

#[test]
fn test_comparison_operators() {
    assert_eq!(
        tokenize("== != > >= < <="),
        vec![
            Token::Op(OpKind::Eq),
            Token::Op(OpKind::Ne),
            Token::Op(OpKind::Gt),
            Token::Op(OpKind::Ge),
            Token::Op(OpKind::Lt),
            Token::Op(OpKind::Le),
        ]
    );
}

#[test]
fn test_shift_operators() {
    assert_eq!(
        tokenize("<< >>"),
        vec![Token::Op(OpKind::ShiftLeft), Token::Op(OpKind::ShiftRight)]
    );
}

#[test]
fn test_logical_and_bitwise_operators() {
    assert_eq!(
        tokenize("& && | || |||"),
        vec![
            Token::Op(OpKind::BitAnd),
            Token::Op(OpKind::And),
            Token::Op(OpKind::BitOr),
            Token::Op(OpKind::Or),
            Token::Op(OpKind::Orable),
        ]
    );
}

#[test]
fn test_tilde_operators() {
    assert_eq!(
        tokenize("~ ~="),
        vec![Token::Op(OpKind::BitNot), Token::Op(OpKind::Match)]
    );
}

#[test]
fn test_bang_operators() {
    assert_eq!(
        tokenize("! != !!"),
        vec![
            Token::Op(OpKind::Not),
            Token::Op(OpKind::Ne),
            Token::Op(OpKind::Nilable),
        ]
    );
}

#[test]
fn test_bare_equals_is_error() {
    assert!(matches!(
        tokenize_err("a = 1"),
        LexError::UnexpectedEquals { .. }
    ));
}

#[test]
fn test_unexpected_character() {
    assert!(matches!(
        tokenize_err("1 # 2"),
        LexError::UnexpectedChar { ch: '#', .. }
    ));
}

#[test]
fn test_structural_tokens() {
    assert_eq!(
        tokenize("( ) [ ] { } ,"),
        vec![
            Token::Open(Bracket::Paren),
            Token::Close(Bracket::Paren),
            Token::Open(Bracket::Square),
            Token::Close(Bracket::Square),
            Token::Open(Bracket::Curly),
            Token::Close(Bracket::Curly),
            Token::Op(OpKind::Comma),
        ]
    );
}

#[test]
fn test_xor_lexes_as_binary() {
    // the disambiguator turns it into bitwise not at unary positions
    assert_eq!(tokenize("^"), vec![Token::Op(OpKind::BitXor)]);
}

#[test]
fn test_whitespace_is_skipped() {
    assert_eq!(
        tokenize("  1\t+\n2  "),
        vec![Token::Integer(1), Token::Op(OpKind::Add), Token::Integer(2)]
    );
}

#[test]
fn test_full_expression() {
    assert_eq!(
        tokenize("obj.pet.name == 'rex'"),
        vec![
            Token::Ref("obj".to_string()),
            Token::Op(OpKind::Dot),
            Token::Ref("pet".to_string()),
            Token::Op(OpKind::Dot),
            Token::Ref("name".to_string()),
            Token::Op(OpKind::Eq),
            Token::String("rex".to_string()),
        ]
    );
}
