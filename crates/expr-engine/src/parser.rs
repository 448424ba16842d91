use crate::ast::{
    ArrayExpression, ArrowFunctionExpression, AssignmentPattern, BinaryExpression, BinaryOperator,
    BooleanLiteral, CallExpression, ConditionalExpression, Expression, ExpressionOrSpread, Identifier,
    LogicalExpression, LogicalOperator, MemberExpression, NullLiteral, NumericLiteral, ObjectExpression,
    Param, Property, PropertyOrSpread, RestElement, SpreadElement, StringLiteral, ThisExpression,
    UnaryExpression, UnaryOperator,
};
use crate::lexer::{tokenize_with_locale, LexError, SourceRange, Token, TokenKind};
use crate::locale::{format_message, resolve_locale, LocaleTable};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{message}")]
    UnexpectedToken {
        expected: String,
        found: String,
        pos: usize,
        message: String,
    },
    #[error("{message}")]
    InvalidNumber {
        literal: String,
        pos: usize,
        message: String,
    },
    #[error("{message}")]
    InvalidArrowParameters { pos: usize, message: String },
    #[error("{message}")]
    TooDeep { pos: usize, message: String },
}

impl ParseError {
    pub fn pos(&self) -> usize {
        match self {
            ParseError::Lex(error) => error.pos(),
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::InvalidNumber { pos, .. }
            | ParseError::InvalidArrowParameters { pos, .. }
            | ParseError::TooDeep { pos, .. } => *pos,
        }
    }
}

type BinaryTier<'t> = &'t [(TokenKind, BinaryOperator)];

const EQUALITY: BinaryTier<'static> = &[
    (TokenKind::EqEq, BinaryOperator::Eq),
    (TokenKind::EqEqEq, BinaryOperator::StrictEq),
    (TokenKind::NotEq, BinaryOperator::Ne),
    (TokenKind::NotEqEq, BinaryOperator::StrictNe),
];
const RELATIONAL: BinaryTier<'static> = &[
    (TokenKind::Lt, BinaryOperator::Lt),
    (TokenKind::Le, BinaryOperator::Le),
    (TokenKind::Gt, BinaryOperator::Gt),
    (TokenKind::Ge, BinaryOperator::Ge),
];
const SHIFT: BinaryTier<'static> = &[
    (TokenKind::Shl, BinaryOperator::Shl),
    (TokenKind::Shr, BinaryOperator::Shr),
    (TokenKind::UShr, BinaryOperator::UShr),
];
const ADDITIVE: BinaryTier<'static> = &[
    (TokenKind::Plus, BinaryOperator::Add),
    (TokenKind::Minus, BinaryOperator::Sub),
];
const MULTIPLICATIVE: BinaryTier<'static> = &[
    (TokenKind::Star, BinaryOperator::Mul),
    (TokenKind::Slash, BinaryOperator::Div),
    (TokenKind::Percent, BinaryOperator::Rem),
];

/// Deepest nesting the parser accepts. Each nested sub-expression and each
/// link of an operator or member chain counts one level, so every tree it
/// returns is at most this deep.
pub const MAX_DEPTH: usize = 128;

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    previous_end: usize,
    depth: usize,
    locale: LocaleTable,
}

pub fn parse_expression(input: &str) -> Result<Expression, ParseError> {
    parse_expression_with_locale(input, resolve_locale(None))
}

pub fn parse_expression_with_locale(input: &str, locale: &LocaleTable) -> Result<Expression, ParseError> {
    let tokens = tokenize_with_locale(input, locale)?;
    Parser::with_locale(tokens, locale).parse()
}

pub fn parse(tokens: Vec<Token>) -> Result<Expression, ParseError> {
    Parser::new(tokens).parse()
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_locale(tokens, resolve_locale(None))
    }

    pub fn with_locale(mut tokens: Vec<Token>, locale: &LocaleTable) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map_or(0, |token| token.range.end);
            tokens.push(Token {
                kind: TokenKind::Eof,
                value: String::new(),
                range: SourceRange::new(end, end),
            });
        }
        Self {
            tokens,
            index: 0,
            previous_end: 0,
            depth: 0,
            locale: *locale,
        }
    }

    pub fn parse(mut self) -> Result<Expression, ParseError> {
        let expression = self.parse_conditional()?;
        self.expect(TokenKind::Eof, "end of input")?;
        tracing::debug!(range = ?expression.range(), "parsed expression");
        Ok(expression)
    }

    fn parse_conditional(&mut self) -> Result<Expression, ParseError> {
        self.nested(Self::parse_ternary)
    }

    fn parse_ternary(&mut self) -> Result<Expression, ParseError> {
        let start = self.start();
        let test = self.parse_nullish()?;
        if !self.match_kind(TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.parse_conditional()?;
        self.expect(TokenKind::Colon, ":")?;
        let alternate = self.parse_conditional()?;
        Ok(Expression::ConditionalExpression(ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            range: self.range_from(start),
        }))
    }

    fn parse_nullish(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(
            &[(TokenKind::QuestionQuestion, BinaryOperator::NullishCoalescing)],
            Self::parse_or,
        )
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        self.parse_logical_chain(TokenKind::PipePipe, LogicalOperator::Or, Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        self.parse_logical_chain(TokenKind::AmpAmp, LogicalOperator::And, Self::parse_bit_or)
    }

    fn parse_bit_or(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(&[(TokenKind::Pipe, BinaryOperator::BitOr)], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(&[(TokenKind::Caret, BinaryOperator::BitXor)], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(&[(TokenKind::Amp, BinaryOperator::BitAnd)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(EQUALITY, Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(RELATIONAL, Self::parse_shift)
    }

    fn parse_shift(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(SHIFT, Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(ADDITIVE, Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_tier(MULTIPLICATIVE, Self::parse_exponent)
    }

    fn parse_exponent(&mut self) -> Result<Expression, ParseError> {
        let start = self.start();
        let base = self.parse_unary()?;
        if !self.match_kind(TokenKind::StarStar) {
            return Ok(base);
        }
        let exponent = self.nested(Self::parse_exponent)?;
        Ok(Expression::BinaryExpression(BinaryExpression {
            operator: BinaryOperator::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
            range: self.range_from(start),
        }))
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let operator = match self.peek().kind {
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::Minus => UnaryOperator::Minus,
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Tilde => UnaryOperator::BitNot,
            _ => return self.parse_postfix(),
        };
        let start = self.start();
        self.advance();
        let argument = self.nested(Self::parse_unary)?;
        Ok(Expression::UnaryExpression(UnaryExpression {
            operator,
            argument: Box::new(argument),
            range: self.range_from(start),
        }))
    }

    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let start = self.start();
        let depth = self.depth;
        let mut node = self.parse_call_member()?;
        // `50%` is a percentage; `50 % x` is a remainder.
        while self.check(TokenKind::Percent) && !can_begin_operand(self.peek_at(1).kind) {
            self.descend()?;
            self.advance();
            node = Expression::UnaryExpression(UnaryExpression {
                operator: UnaryOperator::Percent,
                argument: Box::new(node),
                range: self.range_from(start),
            });
        }
        self.depth = depth;
        Ok(node)
    }

    fn parse_call_member(&mut self) -> Result<Expression, ParseError> {
        let start = self.start();
        let depth = self.depth;
        let mut node = self.parse_primary()?;

        while self.check_at(0, &[TokenKind::Dot, TokenKind::QuestionDot, TokenKind::LBracket, TokenKind::LParen]) {
            self.descend()?;
            if self.match_kind(TokenKind::Dot) {
                let property = self.expect_property_name()?;
                node = self.member(start, node, Expression::Identifier(property), false, false);
            } else if self.match_kind(TokenKind::QuestionDot) {
                node = match self.peek().kind {
                    TokenKind::LBracket => self.parse_computed_member(start, node, true)?,
                    TokenKind::LParen => self.parse_call(start, node, true)?,
                    _ => {
                        let property = self.expect_property_name()?;
                        self.member(start, node, Expression::Identifier(property), false, true)
                    }
                };
            } else if self.check(TokenKind::LBracket) {
                node = self.parse_computed_member(start, node, false)?;
            } else {
                node = self.parse_call(start, node, false)?;
            }
        }

        self.depth = depth;
        Ok(node)
    }

    fn parse_computed_member(&mut self, start: usize, object: Expression, optional: bool) -> Result<Expression, ParseError> {
        self.expect(TokenKind::LBracket, "[")?;
        let property = self.parse_conditional()?;
        self.expect(TokenKind::RBracket, "]")?;
        Ok(self.member(start, object, property, true, optional))
    }

    fn parse_call(&mut self, start: usize, callee: Expression, optional: bool) -> Result<Expression, ParseError> {
        self.expect(TokenKind::LParen, "(")?;
        let arguments = self.parse_element_list(TokenKind::RParen, ")")?;
        Ok(Expression::CallExpression(CallExpression {
            callee: Box::new(callee),
            arguments,
            optional,
            range: self.range_from(start),
        }))
    }

    fn member(
        &self,
        start: usize,
        object: Expression,
        property: Expression,
        computed: bool,
        optional: bool,
    ) -> Expression {
        Expression::MemberExpression(MemberExpression {
            object: Box::new(object),
            property: Box::new(property),
            computed,
            optional,
            range: self.range_from(start),
        })
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        if self.check(TokenKind::LParen) && self.is_arrow_ahead() {
            return self.parse_arrow_function();
        }
        if self.check(TokenKind::Identifier) && self.peek_at(1).kind == TokenKind::Arrow {
            return self.parse_arrow_function();
        }

        let token = self.advance();
        let range = token.range;
        match token.kind {
            TokenKind::Identifier => Ok(Expression::Identifier(Identifier {
                name: token.value,
                range,
            })),
            TokenKind::Number => Ok(Expression::NumericLiteral(self.numeric_literal(token)?)),
            TokenKind::String => Ok(Expression::StringLiteral(StringLiteral {
                value: token.value,
                range,
            })),
            TokenKind::Boolean => Ok(Expression::BooleanLiteral(BooleanLiteral {
                value: token.value == "true",
                range,
            })),
            TokenKind::Null => Ok(Expression::NullLiteral(NullLiteral { range })),
            TokenKind::This => Ok(Expression::ThisExpression(ThisExpression { range })),
            TokenKind::LParen => {
                let expression = self.parse_conditional()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(expression)
            }
            TokenKind::LBracket => {
                let elements = self.parse_element_list(TokenKind::RBracket, "]")?;
                Ok(Expression::ArrayExpression(ArrayExpression {
                    elements,
                    range: self.range_from(range.start),
                }))
            }
            TokenKind::LBrace => self.parse_object(range.start),
            _ => Err(self.unexpected(&token, "primary expression")),
        }
    }

    fn numeric_literal(&self, token: Token) -> Result<NumericLiteral, ParseError> {
        match token.value.parse::<f64>() {
            Ok(value) => Ok(NumericLiteral {
                value,
                range: token.range,
            }),
            Err(_) => Err(ParseError::InvalidNumber {
                message: format_message(self.locale.unexpected_token, &[&token.value, &token.range.start]),
                literal: token.value,
                pos: token.range.start,
            }),
        }
    }

    /// Comma separated expressions and spreads up to `close`, which is consumed.
    /// A trailing comma is accepted.
    fn parse_element_list(
        &mut self,
        close: TokenKind,
        close_text: &str,
    ) -> Result<Vec<ExpressionOrSpread>, ParseError> {
        let mut items = Vec::new();
        while !self.check(close) {
            if self.check(TokenKind::Ellipsis) {
                items.push(ExpressionOrSpread::Spread(self.parse_spread()?));
            } else {
                items.push(ExpressionOrSpread::Expression(self.parse_conditional()?));
            }
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close, close_text)?;
        Ok(items)
    }

    fn parse_spread(&mut self) -> Result<SpreadElement, ParseError> {
        let start = self.start();
        self.expect(TokenKind::Ellipsis, "...")?;
        let argument = self.parse_conditional()?;
        Ok(SpreadElement {
            argument: Box::new(argument),
            range: self.range_from(start),
        })
    }

    // Called with `{` already consumed.
    fn parse_object(&mut self, start: usize) -> Result<Expression, ParseError> {
        let mut properties = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Ellipsis) {
                properties.push(PropertyOrSpread::Spread(self.parse_spread()?));
            } else {
                properties.push(PropertyOrSpread::Property(self.parse_property()?));
            }
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "}")?;
        Ok(Expression::ObjectExpression(ObjectExpression {
            properties,
            range: self.range_from(start),
        }))
    }

    fn parse_property(&mut self) -> Result<Property, ParseError> {
        let start = self.start();
        let token = self.peek().clone();
        let (key, computed) = match token.kind {
            TokenKind::LBracket => {
                self.advance();
                let key = self.parse_conditional()?;
                self.expect(TokenKind::RBracket, "]")?;
                (key, true)
            }
            TokenKind::String => {
                self.advance();
                let key = Expression::StringLiteral(StringLiteral {
                    value: token.value,
                    range: token.range,
                });
                (key, false)
            }
            TokenKind::Number => {
                self.advance();
                (Expression::NumericLiteral(self.numeric_literal(token)?), false)
            }
            TokenKind::Identifier
                if self.check_at(1, &[TokenKind::Comma, TokenKind::RBrace]) =>
            {
                self.advance();
                let key = Expression::Identifier(Identifier {
                    name: token.value,
                    range: token.range,
                });
                return Ok(Property {
                    value: Box::new(key.clone()),
                    key: Box::new(key),
                    shorthand: true,
                    computed: false,
                    range: token.range,
                });
            }
            _ => (Expression::Identifier(self.expect_property_name()?), false),
        };

        self.expect(TokenKind::Colon, ":")?;
        let value = self.parse_conditional()?;
        Ok(Property {
            key: Box::new(key),
            value: Box::new(value),
            shorthand: false,
            computed,
            range: self.range_from(start),
        })
    }

    fn parse_arrow_function(&mut self) -> Result<Expression, ParseError> {
        let start = self.start();
        let params = if self.check(TokenKind::Identifier) {
            let token = self.advance();
            vec![Param::Identifier(Identifier {
                name: token.value,
                range: token.range,
            })]
        } else {
            self.expect(TokenKind::LParen, "(")?;
            self.parse_arrow_params()?
        };
        self.expect(TokenKind::Arrow, "=>")?;
        let body = self.parse_conditional()?;
        Ok(Expression::ArrowFunctionExpression(ArrowFunctionExpression {
            params,
            body: Box::new(body),
            range: self.range_from(start),
        }))
    }

    // Called with `(` consumed; consumes the closing `)`.
    fn parse_arrow_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            let start = self.start();
            if self.match_kind(TokenKind::Ellipsis) {
                let argument = self.expect_binding_identifier()?;
                params.push(Param::RestElement(RestElement {
                    argument,
                    range: self.range_from(start),
                }));
                if !self.check(TokenKind::RParen) {
                    return Err(self.invalid_arrow_params());
                }
                break;
            }

            let left = self.expect_binding_identifier()?;
            if self.match_kind(TokenKind::Assign) {
                let right = self.parse_conditional()?;
                params.push(Param::AssignmentPattern(AssignmentPattern {
                    left,
                    right: Box::new(right),
                    range: self.range_from(start),
                }));
            } else {
                params.push(Param::Identifier(left));
            }

            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        Ok(params)
    }

    /// Looks past the balanced parenthesis at the cursor for `=>`.
    fn is_arrow_ahead(&self) -> bool {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[self.index..].iter().enumerate() {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return token.kind == TokenKind::RParen
                            && self.peek_at(offset + 1).kind == TokenKind::Arrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    fn expect_binding_identifier(&mut self) -> Result<Identifier, ParseError> {
        if !self.check(TokenKind::Identifier) {
            return Err(self.invalid_arrow_params());
        }
        let token = self.advance();
        Ok(Identifier {
            name: token.value,
            range: token.range,
        })
    }

    /// Identifier-like token after `.` or as an object key; keywords are allowed.
    fn expect_property_name(&mut self) -> Result<Identifier, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Identifier | TokenKind::Boolean | TokenKind::Null | TokenKind::This => Ok(Identifier {
                name: token.value,
                range: token.range,
            }),
            _ => Err(self.unexpected(&token, "property name")),
        }
    }

    fn parse_binary_tier<G>(&mut self, tier: BinaryTier<'_>, mut parse_operand: G) -> Result<Expression, ParseError>
    where
        G: FnMut(&mut Self) -> Result<Expression, ParseError>,
    {
        let start = self.start();
        let depth = self.depth;
        let mut node = parse_operand(self)?;
        while let Some(operator) = self.match_operator(tier) {
            self.descend()?;
            let right = parse_operand(self)?;
            node = Expression::BinaryExpression(BinaryExpression {
                operator,
                left: Box::new(node),
                right: Box::new(right),
                range: self.range_from(start),
            });
        }
        self.depth = depth;
        Ok(node)
    }

    fn parse_logical_chain<G>(
        &mut self,
        kind: TokenKind,
        operator: LogicalOperator,
        mut parse_operand: G,
    ) -> Result<Expression, ParseError>
    where
        G: FnMut(&mut Self) -> Result<Expression, ParseError>,
    {
        let start = self.start();
        let depth = self.depth;
        let mut node = parse_operand(self)?;
        while self.match_kind(kind) {
            self.descend()?;
            let right = parse_operand(self)?;
            node = Expression::LogicalExpression(LogicalExpression {
                operator,
                left: Box::new(node),
                right: Box::new(right),
                range: self.range_from(start),
            });
        }
        self.depth = depth;
        Ok(node)
    }

    /// Runs `parse` one nesting level down.
    fn nested<G>(&mut self, parse: G) -> Result<Expression, ParseError>
    where
        G: FnOnce(&mut Self) -> Result<Expression, ParseError>,
    {
        let depth = self.depth;
        self.descend()?;
        let result = parse(self);
        self.depth = depth;
        result
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            let pos = self.start();
            return Err(ParseError::TooDeep {
                pos,
                message: format_message(self.locale.too_deep, &[&MAX_DEPTH, &pos]),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn match_operator(&mut self, tier: BinaryTier<'_>) -> Option<BinaryOperator> {
        let kind = self.peek().kind;
        let (_, operator) = tier.iter().find(|(candidate, _)| *candidate == kind)?;
        self.advance();
        Some(*operator)
    }

    fn start(&self) -> usize {
        self.peek().range.start
    }

    fn range_from(&self, start: usize) -> SourceRange {
        SourceRange::new(start, self.previous_end.max(start))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_at(&self, ahead: usize, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek_at(ahead).kind)
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.unexpected(&token, expected))
        }
    }

    fn unexpected(&self, token: &Token, expected: &str) -> ParseError {
        let found = describe(token);
        ParseError::UnexpectedToken {
            message: format_message(self.locale.unexpected_token, &[&found, &token.range.start]),
            expected: expected.to_string(),
            found,
            pos: token.range.start,
        }
    }

    fn invalid_arrow_params(&self) -> ParseError {
        let token = self.peek();
        ParseError::InvalidArrowParameters {
            pos: token.range.start,
            message: format_message(self.locale.unexpected_token, &[&describe(token), &token.range.start]),
        }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + ahead).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
            self.previous_end = token.range.end;
        }
        token
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "EOF".to_string(),
        TokenKind::String => format!("'{}'", token.value),
        _ => token.value.clone(),
    }
}

fn can_begin_operand(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Boolean
            | TokenKind::Null
            | TokenKind::This
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Bang
            | TokenKind::Tilde
    )
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
