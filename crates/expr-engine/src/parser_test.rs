use super::{parse, parse_expression, ParseError, MAX_DEPTH};
use crate::ast::{
    BinaryOperator, Expression, ExpressionOrSpread, LogicalOperator, Param, PropertyOrSpread, UnaryOperator,
};
use crate::lexer::{tokenize, SourceRange};

fn binary(expression: &Expression) -> (BinaryOperator, &Expression, &Expression) {
    let Expression::BinaryExpression(node) = expression else {
        panic!("expected binary, got {expression:?}");
    };
    (node.operator, &node.left, &node.right)
}

fn number(expression: &Expression) -> f64 {
    let Expression::NumericLiteral(node) = expression else {
        panic!("expected number, got {expression:?}");
    };
    node.value
}

#[test]
fn parses_operator_precedence() {
    let ast = parse_expression("1 + 2 * 3").expect("parse");
    let (op, left, right) = binary(&ast);
    assert_eq!(op, BinaryOperator::Add);
    assert_eq!(number(left), 1.0);
    let (op, _, _) = binary(right);
    assert_eq!(op, BinaryOperator::Mul);
}

#[test]
fn exponent_is_right_associative() {
    let ast = parse_expression("2 ** 3 ** 2").expect("parse");
    let (op, left, right) = binary(&ast);
    assert_eq!(op, BinaryOperator::Pow);
    assert_eq!(number(left), 2.0);
    assert_eq!(binary(right).0, BinaryOperator::Pow);
}

#[test]
fn subtraction_is_left_associative() {
    let ast = parse_expression("8 - 4 - 2").expect("parse");
    let (_, left, right) = binary(&ast);
    assert_eq!(binary(left).0, BinaryOperator::Sub);
    assert_eq!(number(right), 2.0);
}

#[test]
fn logical_operators_build_logical_nodes() {
    let ast = parse_expression("a || b && c ?? d").expect("parse");
    let (op, left, _) = binary(&ast);
    assert_eq!(op, BinaryOperator::NullishCoalescing);
    let Expression::LogicalExpression(or) = left else {
        panic!("expected logical or");
    };
    assert_eq!(or.operator, LogicalOperator::Or);
    let Expression::LogicalExpression(and) = or.right.as_ref() else {
        panic!("expected logical and");
    };
    assert_eq!(and.operator, LogicalOperator::And);
}

#[test]
fn bitwise_tiers_bind_tighter_than_logical() {
    let ast = parse_expression("a | b ^ c & d == e").expect("parse");
    let (op, _, right) = binary(&ast);
    assert_eq!(op, BinaryOperator::BitOr);
    let (op, _, right) = binary(right);
    assert_eq!(op, BinaryOperator::BitXor);
    let (op, _, right) = binary(right);
    assert_eq!(op, BinaryOperator::BitAnd);
    assert_eq!(binary(right).0, BinaryOperator::Eq);
}

#[test]
fn conditional_is_right_associative() {
    let ast = parse_expression("a ? b : c ? d : e").expect("parse");
    let Expression::ConditionalExpression(node) = ast else {
        panic!("expected conditional");
    };
    assert!(matches!(*node.alternate, Expression::ConditionalExpression(_)));
}

#[test]
fn distinguishes_postfix_percent_from_remainder() {
    let ast = parse_expression("50%").expect("parse");
    let Expression::UnaryExpression(node) = &ast else {
        panic!("expected unary");
    };
    assert_eq!(node.operator, UnaryOperator::Percent);

    let ast = parse_expression("7 % 3").expect("parse");
    assert_eq!(binary(&ast).0, BinaryOperator::Rem);

    let ast = parse_expression("50% * 2").expect("parse");
    let (op, left, _) = binary(&ast);
    assert_eq!(op, BinaryOperator::Mul);
    assert!(matches!(left, Expression::UnaryExpression(_)));

    let ast = parse_expression("-10%").expect("parse");
    let Expression::UnaryExpression(node) = &ast else {
        panic!("expected unary");
    };
    assert_eq!(node.operator, UnaryOperator::Minus);
}

#[test]
fn parses_member_call_and_index() {
    let ast = parse_expression("foo.bar(1, ...rest)[0]").expect("parse");
    let Expression::MemberExpression(index) = ast else {
        panic!("expected member");
    };
    assert!(index.computed);
    let Expression::CallExpression(call) = *index.object else {
        panic!("expected call");
    };
    assert_eq!(call.arguments.len(), 2);
    assert!(matches!(call.arguments[1], ExpressionOrSpread::Spread(_)));
    let Expression::MemberExpression(member) = *call.callee else {
        panic!("expected member");
    };
    assert!(!member.computed);
    assert!(matches!(*member.property, Expression::Identifier(ref id) if id.name == "bar"));
}

#[test]
fn parses_optional_chains() {
    let ast = parse_expression("a?.b.c").expect("parse");
    let Expression::MemberExpression(outer) = ast else {
        panic!("expected member");
    };
    assert!(!outer.optional);
    let Expression::MemberExpression(inner) = *outer.object else {
        panic!("expected member");
    };
    assert!(inner.optional);

    let ast = parse_expression("f?.(1)?.[k]").expect("parse");
    let Expression::MemberExpression(member) = ast else {
        panic!("expected member");
    };
    assert!(member.optional && member.computed);
    let Expression::CallExpression(call) = *member.object else {
        panic!("expected call");
    };
    assert!(call.optional);
}

#[test]
fn keywords_are_allowed_as_property_names() {
    let ast = parse_expression("a.null + a.this").expect("parse");
    assert_eq!(binary(&ast).0, BinaryOperator::Add);
}

#[test]
fn parses_object_literal_forms() {
    let ast = parse_expression("{ a, b: 1, 'c d': 2, 3: x, [k]: y, ...rest, }").expect("parse");
    let Expression::ObjectExpression(object) = ast else {
        panic!("expected object");
    };
    assert_eq!(object.properties.len(), 6);
    let PropertyOrSpread::Property(shorthand) = &object.properties[0] else {
        panic!("expected property");
    };
    assert!(shorthand.shorthand);
    assert_eq!(shorthand.key, shorthand.value);
    let PropertyOrSpread::Property(computed) = &object.properties[4] else {
        panic!("expected property");
    };
    assert!(computed.computed);
    assert!(matches!(object.properties[5], PropertyOrSpread::Spread(_)));
}

#[test]
fn parses_arrow_functions() {
    let ast = parse_expression("x => x + 1").expect("parse");
    let Expression::ArrowFunctionExpression(arrow) = ast else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.params.len(), 1);
    assert_eq!(binary(&arrow.body).0, BinaryOperator::Add);

    let ast = parse_expression("(a, b = a + 1, ...rest) => b").expect("parse");
    let Expression::ArrowFunctionExpression(arrow) = ast else {
        panic!("expected arrow");
    };
    assert!(matches!(arrow.params[0], Param::Identifier(_)));
    assert!(matches!(arrow.params[1], Param::AssignmentPattern(_)));
    assert!(matches!(arrow.params[2], Param::RestElement(_)));

    let ast = parse_expression("() => 1").expect("parse");
    assert!(matches!(ast, Expression::ArrowFunctionExpression(ref arrow) if arrow.params.is_empty()));
}

#[test]
fn parenthesized_expression_is_not_arrow() {
    let ast = parse_expression("(a + b) * c").expect("parse");
    let (op, left, _) = binary(&ast);
    assert_eq!(op, BinaryOperator::Mul);
    assert_eq!(binary(left).0, BinaryOperator::Add);
    assert_eq!(ast.range(), SourceRange::new(0, 11));
    assert_eq!(left.range(), SourceRange::new(1, 6));
}

#[test]
fn arrow_as_call_argument() {
    let ast = parse_expression("map(xs, (x) => x * 2)").expect("parse");
    let Expression::CallExpression(call) = ast else {
        panic!("expected call");
    };
    assert!(matches!(
        call.arguments[1],
        ExpressionOrSpread::Expression(Expression::ArrowFunctionExpression(_))
    ));
}

#[test]
fn ranges_cover_consumed_tokens() {
    let ast = parse_expression("a[0].b").expect("parse");
    assert_eq!(ast.range(), SourceRange::new(0, 6));
    let Expression::MemberExpression(member) = &ast else {
        panic!("expected member");
    };
    assert_eq!(member.object.range(), SourceRange::new(0, 4));
    assert_eq!(member.property.range(), SourceRange::new(5, 6));

    let ast = parse_expression("1 + true").expect("parse");
    assert_eq!(binary(&ast).2.range(), SourceRange::new(4, 8));
}

#[test]
fn parse_accepts_token_stream() {
    let tokens = tokenize("[1, 2]").expect("tokenize");
    let ast = parse(tokens).expect("parse");
    assert!(matches!(ast, Expression::ArrayExpression(ref array) if array.elements.len() == 2));
}

#[test]
fn rejects_malformed_input() {
    assert!(matches!(
        parse_expression("1 +"),
        Err(ParseError::UnexpectedToken { pos: 3, .. })
    ));
    assert!(matches!(
        parse_expression("(a b)"),
        Err(ParseError::UnexpectedToken { pos: 3, .. })
    ));
    assert!(matches!(
        parse_expression("1 2"),
        Err(ParseError::UnexpectedToken { pos: 2, .. })
    ));
    assert!(matches!(
        parse_expression("(1) => 2"),
        Err(ParseError::InvalidArrowParameters { pos: 1, .. })
    ));
    assert!(matches!(
        parse_expression("(...a, b) => 2"),
        Err(ParseError::InvalidArrowParameters { pos: 5, .. })
    ));
    assert!(matches!(parse_expression("a # b"), Err(ParseError::Lex(_))));
}

#[test]
fn error_message_is_localized() {
    let error = parse_expression("1 +").expect_err("must fail");
    assert_eq!(error.to_string(), "Unexpected token: EOF 3");
    assert_eq!(error.pos(), 3);

    let error = super::parse_expression_with_locale("a ? b", &crate::locale::ZH_CN).expect_err("must fail");
    assert_eq!(error.to_string(), "意外的 token: EOF 5");
}

/// Runs `check` on a thread with room for parsing right up to `MAX_DEPTH`
/// in unoptimized builds.
fn with_large_stack(check: impl FnOnce() + Send + 'static) {
    std::thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(check)
        .expect("spawn")
        .join()
        .expect("join");
}

#[test]
fn rejects_nesting_past_the_limit() {
    with_large_stack(|| {
        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let error = parse_expression(&parens).expect_err("too deep");
        assert!(matches!(error, ParseError::TooDeep { .. }), "{error:?}");
        assert_eq!(error.pos(), MAX_DEPTH);
        assert_eq!(error.to_string(), format!("Expression nested deeper than {MAX_DEPTH} levels: {MAX_DEPTH}"));

        let signs = format!("{}1", "-".repeat(10_000));
        assert!(matches!(parse_expression(&signs), Err(ParseError::TooDeep { .. })));

        let chain = vec!["1"; 10_000].join(" + ");
        assert!(matches!(parse_expression(&chain), Err(ParseError::TooDeep { .. })));

        let members = format!("a{}", ".b".repeat(10_000));
        assert!(matches!(parse_expression(&members), Err(ParseError::TooDeep { .. })));

        let powers = vec!["2"; 10_000].join(" ** ");
        assert!(matches!(parse_expression(&powers), Err(ParseError::TooDeep { .. })));
    });
}

#[test]
fn accepts_nesting_within_the_limit() {
    with_large_stack(|| {
        let depth = MAX_DEPTH / 2;
        let parens = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(parse_expression(&parens), Ok(Expression::Identifier(_))));

        let signs = format!("{}1", "-".repeat(depth));
        assert!(parse_expression(&signs).is_ok());
    });
}
