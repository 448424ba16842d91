use super::{tokenize, tokenize_with_locale, LexError, SourceRange, TokenKind};
use crate::locale::ZH_CN;

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .expect("tokenize")
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn tokenizes_composite_expression() {
    assert_eq!(
        kinds("a?.b[0] >= 10 && f(...xs, 'x')"),
        vec![
            TokenKind::Identifier,
            TokenKind::QuestionDot,
            TokenKind::Identifier,
            TokenKind::LBracket,
            TokenKind::Number,
            TokenKind::RBracket,
            TokenKind::Ge,
            TokenKind::Number,
            TokenKind::AmpAmp,
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::Ellipsis,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::String,
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn prefers_longest_operator() {
    assert_eq!(
        kinds("a >>> b >> c > d"),
        vec![
            TokenKind::Identifier,
            TokenKind::UShr,
            TokenKind::Identifier,
            TokenKind::Shr,
            TokenKind::Identifier,
            TokenKind::Gt,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("=== == = !== != ! ** * ?? ?. ? =>"),
        vec![
            TokenKind::EqEqEq,
            TokenKind::EqEq,
            TokenKind::Assign,
            TokenKind::NotEqEq,
            TokenKind::NotEq,
            TokenKind::Bang,
            TokenKind::StarStar,
            TokenKind::Star,
            TokenKind::QuestionQuestion,
            TokenKind::QuestionDot,
            TokenKind::Question,
            TokenKind::Arrow,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn question_dot_before_digit_is_conditional() {
    assert_eq!(
        kinds("a?.5:1"),
        vec![
            TokenKind::Identifier,
            TokenKind::Question,
            TokenKind::Number,
            TokenKind::Colon,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn records_byte_ranges() {
    let tokens = tokenize("é + 'ü'").expect("tokenize");
    assert_eq!(tokens[0].range, SourceRange::new(0, 2));
    assert_eq!(tokens[1].range, SourceRange::new(3, 4));
    assert_eq!(tokens[2].range, SourceRange::new(5, 9));
    assert_eq!(tokens[2].value, "ü");
    assert_eq!(tokens[3].range, SourceRange::new(9, 9));
}

#[test]
fn scans_number_forms() {
    let values = tokenize("12 3.25 .5 1e3 2E-4 7.")
        .expect("tokenize")
        .into_iter()
        .filter(|token| token.kind == TokenKind::Number)
        .map(|token| token.value)
        .collect::<Vec<_>>();
    assert_eq!(values, vec!["12", "3.25", ".5", "1e3", "2E-4", "7"]);
}

#[test]
fn classifies_keywords() {
    assert_eq!(
        kinds("true false null this undefined"),
        vec![
            TokenKind::Boolean,
            TokenKind::Boolean,
            TokenKind::Null,
            TokenKind::This,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn decodes_string_escapes() {
    let tokens = tokenize(r#"'it\'s' "a\tb\u0041""#).expect("tokenize");
    assert_eq!(tokens[0].value, "it's");
    assert_eq!(tokens[1].value, "a\tbA");
}

#[test]
fn rejects_bad_input_with_offsets() {
    assert!(matches!(
        tokenize("a # b"),
        Err(LexError::UnexpectedCharacter { ch: '#', pos: 2, .. })
    ));
    assert!(matches!(
        tokenize("x + 'abc"),
        Err(LexError::UnterminatedString { pos: 4, .. })
    ));
    assert!(matches!(
        tokenize(r"'\q'"),
        Err(LexError::InvalidEscape { pos: 1, .. })
    ));
    assert!(matches!(
        tokenize("1.2.3"),
        Err(LexError::MultipleDecimalPoint { pos: 3, .. })
    ));
}

#[test]
fn error_messages_follow_locale() {
    let error = tokenize("a # b").expect_err("must fail");
    assert_eq!(error.to_string(), "Unexpected token: # 2");
    assert_eq!(error.pos(), 2);

    let error = tokenize_with_locale("1.2.3", &ZH_CN).expect_err("must fail");
    assert_eq!(error.to_string(), "多个小数点: 3");
}
