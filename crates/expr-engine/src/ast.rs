//! Expression tree produced by the parser.
//!
//! Every node carries the [`SourceRange`] it was parsed from. Nodes serialize
//! to JSON tagged by `type`, which is handy for debugging but is not a stable
//! format.

use crate::lexer::SourceRange;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    NumericLiteral(NumericLiteral),
    StringLiteral(StringLiteral),
    BooleanLiteral(BooleanLiteral),
    NullLiteral(NullLiteral),
    Identifier(Identifier),
    ThisExpression(ThisExpression),
    UnaryExpression(UnaryExpression),
    BinaryExpression(BinaryExpression),
    LogicalExpression(LogicalExpression),
    ConditionalExpression(ConditionalExpression),
    MemberExpression(MemberExpression),
    CallExpression(CallExpression),
    ArrayExpression(ArrayExpression),
    ObjectExpression(ObjectExpression),
    ArrowFunctionExpression(ArrowFunctionExpression),
}

impl Expression {
    pub fn range(&self) -> SourceRange {
        match self {
            Expression::NumericLiteral(node) => node.range,
            Expression::StringLiteral(node) => node.range,
            Expression::BooleanLiteral(node) => node.range,
            Expression::NullLiteral(node) => node.range,
            Expression::Identifier(node) => node.range,
            Expression::ThisExpression(node) => node.range,
            Expression::UnaryExpression(node) => node.range,
            Expression::BinaryExpression(node) => node.range,
            Expression::LogicalExpression(node) => node.range,
            Expression::ConditionalExpression(node) => node.range,
            Expression::MemberExpression(node) => node.range,
            Expression::CallExpression(node) => node.range,
            Expression::ArrayExpression(node) => node.range,
            Expression::ObjectExpression(node) => node.range,
            Expression::ArrowFunctionExpression(node) => node.range,
        }
    }

    /// Start offset of the node, used to point errors at an operand.
    pub fn pos(&self) -> usize {
        self.range().start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericLiteral {
    pub value: f64,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    pub value: String,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanLiteral {
    pub value: bool,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullLiteral {
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThisExpression {
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub argument: Box<Expression>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalExpression {
    pub operator: LogicalOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    pub computed: bool,
    pub optional: bool,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<ExpressionOrSpread>,
    pub optional: bool,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayExpression {
    pub elements: Vec<ExpressionOrSpread>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectExpression {
    pub properties: Vec<PropertyOrSpread>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrowFunctionExpression {
    pub params: Vec<Param>,
    pub body: Box<Expression>,
    pub range: SourceRange,
}

/// Array element or call argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExpressionOrSpread {
    Expression(Expression),
    Spread(SpreadElement),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyOrSpread {
    Property(Property),
    Spread(SpreadElement),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct SpreadElement {
    pub argument: Box<Expression>,
    pub range: SourceRange,
}

/// `key: value`, `[key]: value`, or shorthand `key`.
///
/// For shorthand properties `key` and `value` are the same identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Property {
    pub key: Box<Expression>,
    pub value: Box<Expression>,
    pub shorthand: bool,
    pub computed: bool,
    pub range: SourceRange,
}

/// Arrow function parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Param {
    Identifier(Identifier),
    AssignmentPattern(AssignmentPattern),
    RestElement(RestElement),
}

/// Parameter with a default value: `left = right`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentPattern {
    pub left: Identifier,
    pub right: Box<Expression>,
    pub range: SourceRange,
}

/// Trailing `...name` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestElement {
    pub argument: Identifier,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "%")]
    Percent,
}

impl UnaryOperator {
    pub const POSTFIX: &'static [UnaryOperator] = &[UnaryOperator::Percent];

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::BitNot => "~",
            UnaryOperator::Percent => "%",
        }
    }

    pub fn is_postfix(self) -> bool {
        Self::POSTFIX.contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "**")]
    Pow,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = ">>>")]
    UShr,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "!==")]
    StrictNe,
    #[serde(rename = "??")]
    NullishCoalescing,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::UShr => ">>>",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::StrictEq => "===",
            BinaryOperator::Ne => "!=",
            BinaryOperator::StrictNe => "!==",
            BinaryOperator::NullishCoalescing => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOperator {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }
}
