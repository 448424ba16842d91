use crate::ast::{
    ArrowFunctionExpression, BinaryExpression, BinaryOperator, CallExpression, Expression, ExpressionOrSpread,
    LogicalExpression, LogicalOperator, MemberExpression, Param, Property, PropertyOrSpread, UnaryExpression,
    UnaryOperator,
};
use crate::locale::{format_message, resolve_locale, LocaleTable};
use crate::parser::{parse_expression_with_locale, ParseError};
use crate::printer::print;
use crate::value::{number_to_string, Context, Object, Value, ValueKind};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{message}")]
    Type {
        expected: ValueKind,
        found: ValueKind,
        pos: usize,
        message: String,
    },
    #[error("{message}")]
    NotCallable { pos: usize, message: String },
    #[error("{message}")]
    NotIndexable {
        kind: ValueKind,
        pos: usize,
        message: String,
    },
    #[error("{message}")]
    UnexpectedNode { pos: usize, message: String },
    #[error("{0}")]
    Host(String),
}

impl EvalError {
    /// Error raised by a host function.
    pub fn host(message: impl Into<String>) -> Self {
        EvalError::Host(message.into())
    }

    /// Source offset the error points at. Host errors carry none.
    pub fn pos(&self) -> Option<usize> {
        match self {
            EvalError::Parse(error) => Some(error.pos()),
            EvalError::Type { pos, .. }
            | EvalError::NotCallable { pos, .. }
            | EvalError::NotIndexable { pos, .. }
            | EvalError::UnexpectedNode { pos, .. } => Some(*pos),
            EvalError::Host(_) => None,
        }
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, EvalError::Type { .. })
    }

    pub fn is_runtime_error(&self) -> bool {
        matches!(
            self,
            EvalError::NotCallable { .. }
                | EvalError::NotIndexable { .. }
                | EvalError::UnexpectedNode { .. }
                | EvalError::Host(_)
        )
    }
}

pub fn evaluate(expression: &Expression, context: &Context) -> Result<Value, EvalError> {
    evaluate_with_locale(expression, context, resolve_locale(None))
}

pub fn evaluate_with_locale(
    expression: &Expression,
    context: &Context,
    locale: &LocaleTable,
) -> Result<Value, EvalError> {
    tracing::debug!(range = ?expression.range(), bindings = context.len(), "evaluating expression");
    Evaluator { locale: *locale }.evaluate(expression, context, true)
}

pub fn evaluate_expression(source: &str, context: &Context) -> Result<Value, EvalError> {
    let locale = resolve_locale(None);
    let ast = parse_expression_with_locale(source, locale)?;
    evaluate_with_locale(&ast, context, locale)
}

/// Evaluates source strings, parsing each distinct source once.
#[derive(Debug)]
pub struct ExpressionEvaluator {
    cache: HashMap<String, Expression>,
    locale: LocaleTable,
}

impl Default for ExpressionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self::with_locale(resolve_locale(None))
    }

    pub fn with_locale(locale: &LocaleTable) -> Self {
        Self {
            cache: HashMap::new(),
            locale: *locale,
        }
    }

    pub fn locale(&self) -> &LocaleTable {
        &self.locale
    }

    pub fn parse(&mut self, source: &str) -> Result<&Expression, ParseError> {
        match self.cache.entry(source.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(source, "expression cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let parsed = parse_expression_with_locale(source, &self.locale)?;
                tracing::debug!(source, "expression cache miss");
                Ok(entry.insert(parsed))
            }
        }
    }

    pub fn evaluate(&mut self, source: &str, context: &Context) -> Result<Value, EvalError> {
        let locale = self.locale;
        let ast = self.parse(source)?;
        evaluate_with_locale(ast, context, &locale)
    }

    pub fn cached_expressions(&self) -> usize {
        self.cache.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Evaluator {
    locale: LocaleTable,
}

impl Evaluator {
    /// `is_first_identifier` is false only for the property of a non-computed
    /// member, where an identifier stands for its own name.
    fn evaluate(&self, expression: &Expression, context: &Context, is_first_identifier: bool) -> Result<Value, EvalError> {
        match expression {
            Expression::NumericLiteral(node) => Ok(Value::Number(node.value)),
            Expression::StringLiteral(node) => Ok(Value::String(node.value.clone())),
            Expression::BooleanLiteral(node) => Ok(Value::Bool(node.value)),
            Expression::NullLiteral(_) => Ok(Value::Null),
            Expression::Identifier(node) => Ok(if is_first_identifier {
                context.lookup(&node.name)
            } else {
                Value::String(node.name.clone())
            }),
            Expression::ThisExpression(_) => Ok(if is_first_identifier {
                context.lookup("this")
            } else {
                Value::from("this")
            }),
            Expression::UnaryExpression(node) => self.evaluate_unary(node, context),
            Expression::BinaryExpression(node) => self.evaluate_binary(node, context),
            Expression::LogicalExpression(node) => self.evaluate_logical(node, context),
            Expression::ConditionalExpression(node) => {
                if self.evaluate(&node.test, context, true)?.is_truthy() {
                    self.evaluate(&node.consequent, context, true)
                } else {
                    self.evaluate(&node.alternate, context, true)
                }
            }
            Expression::MemberExpression(_) | Expression::CallExpression(_) => {
                Ok(self.evaluate_chain(expression, context)?.unwrap_or(Value::Undefined))
            }
            Expression::ArrayExpression(node) => {
                Ok(Value::Array(self.evaluate_elements(&node.elements, context)?))
            }
            Expression::ObjectExpression(node) => {
                let mut object = Object::new();
                for property in &node.properties {
                    match property {
                        PropertyOrSpread::Property(property) => {
                            let key = self.property_key(property, context)?;
                            let value = self.evaluate(&property.value, context, true)?;
                            object.insert(key, value);
                        }
                        PropertyOrSpread::Spread(spread) => {
                            spread_into_object(&mut object, self.evaluate(&spread.argument, context, true)?);
                        }
                    }
                }
                Ok(Value::Object(object))
            }
            Expression::ArrowFunctionExpression(node) => Ok(self.closure(node, context)),
        }
    }

    /// Walks a member/call chain. `None` means an optional link met a
    /// nullish base and the rest of the chain was skipped.
    fn evaluate_chain(&self, expression: &Expression, context: &Context) -> Result<Option<Value>, EvalError> {
        match expression {
            Expression::MemberExpression(member) => {
                let Some(object) = self.evaluate_chain(&member.object, context)? else {
                    return Ok(None);
                };
                if member.optional && object.is_nullish() {
                    return Ok(None);
                }
                let key = self.member_key(member, context)?;
                self.get_member(&object, &key, member.object.pos()).map(Some)
            }
            Expression::CallExpression(call) => {
                let Some(callee) = self.evaluate_chain(&call.callee, context)? else {
                    return Ok(None);
                };
                if call.optional && callee.is_nullish() {
                    return Ok(None);
                }
                self.call(&callee, call, context).map(Some)
            }
            other => self.evaluate(other, context, true).map(Some),
        }
    }

    fn call(&self, callee: &Value, call: &CallExpression, context: &Context) -> Result<Value, EvalError> {
        let args = self.evaluate_elements(&call.arguments, context)?;
        callee
            .call(&args)
            .unwrap_or_else(|| Err(self.not_callable(call.callee.pos())))
    }

    fn member_key(&self, member: &MemberExpression, context: &Context) -> Result<Value, EvalError> {
        if member.computed {
            return self.evaluate(&member.property, context, true);
        }
        match member.property.as_ref() {
            Expression::Identifier(_)
            | Expression::ThisExpression(_)
            | Expression::StringLiteral(_)
            | Expression::NumericLiteral(_) => self.evaluate(&member.property, context, false),
            other => Err(self.unexpected_node(other)),
        }
    }

    fn get_member(&self, object: &Value, key: &Value, pos: usize) -> Result<Value, EvalError> {
        match object {
            Value::Object(object) => Ok(key_to_string(key)
                .and_then(|key| object.get(&key).cloned())
                .unwrap_or(Value::Undefined)),
            Value::Array(items) => {
                if key.as_str() == Some("length") {
                    return Ok(Value::Number(items.len() as f64));
                }
                Ok(key_to_index(key)
                    .and_then(|index| items.get(index).cloned())
                    .unwrap_or(Value::Undefined))
            }
            Value::String(text) => {
                if key.as_str() == Some("length") {
                    return Ok(Value::Number(text.chars().count() as f64));
                }
                Ok(key_to_index(key)
                    .and_then(|index| text.chars().nth(index))
                    .map_or(Value::Undefined, |ch| Value::String(ch.to_string())))
            }
            other => Err(EvalError::NotIndexable {
                kind: other.kind(),
                pos,
                message: format_message(self.locale.not_indexable, &[&other.kind(), &pos]),
            }),
        }
    }

    fn property_key(&self, property: &Property, context: &Context) -> Result<String, EvalError> {
        if property.computed {
            let key = self.evaluate(&property.key, context, true)?;
            return key_to_string(&key).ok_or_else(|| self.type_error(ValueKind::String, &key, property.key.pos()));
        }
        match property.key.as_ref() {
            Expression::Identifier(node) => Ok(node.name.clone()),
            Expression::StringLiteral(node) => Ok(node.value.clone()),
            Expression::NumericLiteral(node) => Ok(number_to_string(node.value)),
            other => Err(self.unexpected_node(other)),
        }
    }

    /// Evaluates array elements or call arguments, expanding spreads.
    fn evaluate_elements(&self, elements: &[ExpressionOrSpread], context: &Context) -> Result<Vec<Value>, EvalError> {
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                ExpressionOrSpread::Expression(expression) => out.push(self.evaluate(expression, context, true)?),
                ExpressionOrSpread::Spread(spread) => match self.evaluate(&spread.argument, context, true)? {
                    Value::Array(items) => out.extend(items),
                    other => return Err(self.type_error(ValueKind::Array, &other, spread.argument.pos())),
                },
            }
        }
        Ok(out)
    }

    fn evaluate_unary(&self, node: &UnaryExpression, context: &Context) -> Result<Value, EvalError> {
        let value = self.evaluate(&node.argument, context, true)?;
        let pos = node.argument.pos();
        let result = match node.operator {
            UnaryOperator::Not => {
                return match value {
                    Value::Bool(value) => Ok(Value::Bool(!value)),
                    other => Err(self.type_error(ValueKind::Boolean, &other, pos)),
                };
            }
            UnaryOperator::Minus => -self.number_operand(&value, pos, false)?,
            UnaryOperator::Plus => self.number_operand(&value, pos, false)?,
            UnaryOperator::BitNot => f64::from(!to_int32(self.number_operand(&value, pos, false)?)),
            UnaryOperator::Percent => self.number_operand(&value, pos, false)? / 100.0,
        };
        Ok(Value::Number(result))
    }

    fn evaluate_binary(&self, node: &BinaryExpression, context: &Context) -> Result<Value, EvalError> {
        let left = self.evaluate(&node.left, context, true)?;
        if node.operator == BinaryOperator::NullishCoalescing {
            return if left.is_nullish() {
                self.evaluate(&node.right, context, true)
            } else {
                Ok(left)
            };
        }
        let right = self.evaluate(&node.right, context, true)?;
        let (left_pos, right_pos) = (node.left.pos(), node.right.pos());

        match node.operator {
            BinaryOperator::Add => {
                if let Value::String(text) = &left {
                    return match right {
                        Value::String(other) => Ok(Value::String(format!("{text}{other}"))),
                        other => Err(self.type_error(ValueKind::String, &other, right_pos)),
                    };
                }
                let left = self.number_operand(&left, left_pos, false)?;
                let right = self.number_operand(&right, right_pos, false)?;
                Ok(Value::Number(left + right))
            }
            BinaryOperator::Eq | BinaryOperator::StrictEq | BinaryOperator::Ne | BinaryOperator::StrictNe => {
                let equal = match (&left, &right) {
                    (Value::String(a), Value::String(b)) => a == b,
                    (Value::Bool(a), Value::Bool(b)) => a == b,
                    (Value::Number(a), Value::Number(b)) => a == b,
                    (Value::String(_) | Value::Bool(_) | Value::Number(_), other) => {
                        return Err(self.type_error(left.kind(), other, right_pos));
                    }
                    (other, _) => return Err(self.type_error(ValueKind::Number, other, left_pos)),
                };
                let negate = matches!(node.operator, BinaryOperator::Ne | BinaryOperator::StrictNe);
                Ok(Value::Bool(equal != negate))
            }
            operator => {
                let a = self.number_operand(&left, left_pos, true)?;
                let b = self.number_operand(&right, right_pos, true)?;
                Ok(numeric_binary(operator, a, b))
            }
        }
    }

    fn evaluate_logical(&self, node: &LogicalExpression, context: &Context) -> Result<Value, EvalError> {
        let left = match self.evaluate(&node.left, context, true)? {
            Value::Bool(value) => value,
            other => return Err(self.type_error(ValueKind::Boolean, &other, node.left.pos())),
        };
        let short_circuit = match node.operator {
            LogicalOperator::And => !left,
            LogicalOperator::Or => left,
        };
        if short_circuit {
            return Ok(Value::Bool(left));
        }
        match self.evaluate(&node.right, context, true)? {
            Value::Bool(value) => Ok(Value::Bool(value)),
            other => Err(self.type_error(ValueKind::Boolean, &other, node.right.pos())),
        }
    }

    fn closure(&self, arrow: &ArrowFunctionExpression, context: &Context) -> Value {
        let evaluator = *self;
        let params = arrow.params.clone();
        let body = arrow.body.clone();
        let captured = context.clone();
        Value::function(move |args| evaluator.call_arrow(&params, &body, &captured, args))
    }

    fn call_arrow(&self, params: &[Param], body: &Expression, captured: &Context, args: &[Value]) -> Result<Value, EvalError> {
        if args.is_empty() {
            return self.evaluate(body, captured, true);
        }
        let mut scope = captured.clone();
        for (index, param) in params.iter().enumerate() {
            match param {
                Param::Identifier(id) => {
                    scope.insert(id.name.clone(), args.get(index).cloned().unwrap_or(Value::Undefined));
                }
                Param::AssignmentPattern(pattern) => {
                    let value = match args.get(index) {
                        Some(value) if !matches!(value, Value::Undefined) => value.clone(),
                        _ => self.evaluate(&pattern.right, &scope, true)?,
                    };
                    scope.insert(pattern.left.name.clone(), value);
                }
                Param::RestElement(rest) => {
                    let remaining = args.get(index..).map(<[Value]>::to_vec).unwrap_or_default();
                    scope.insert(rest.argument.name.clone(), Value::Array(remaining));
                }
            }
        }
        self.evaluate(body, &scope, true)
    }

    /// `allow_nan` is false for the operators that reject `NaN` operands.
    fn number_operand(&self, value: &Value, pos: usize, allow_nan: bool) -> Result<f64, EvalError> {
        match value {
            Value::Number(number) if allow_nan || !number.is_nan() => Ok(*number),
            other => Err(self.type_error(ValueKind::Number, other, pos)),
        }
    }

    fn type_error(&self, expected: ValueKind, found: &Value, pos: usize) -> EvalError {
        EvalError::Type {
            expected,
            found: found.kind(),
            pos,
            message: format_message(self.locale.expect, &[&expected, &pos]),
        }
    }

    fn not_callable(&self, pos: usize) -> EvalError {
        EvalError::NotCallable {
            pos,
            message: format_message(self.locale.not_callable, &[&pos]),
        }
    }

    fn unexpected_node(&self, node: &Expression) -> EvalError {
        let pos = node.pos();
        EvalError::UnexpectedNode {
            pos,
            message: format_message(self.locale.unexpected_token, &[&print(node), &pos]),
        }
    }
}

/// Arithmetic, bitwise, and comparison operators on two numbers.
fn numeric_binary(operator: BinaryOperator, a: f64, b: f64) -> Value {
    let number = match operator {
        BinaryOperator::Sub => a - b,
        BinaryOperator::Mul => a * b,
        BinaryOperator::Div => a / b,
        BinaryOperator::Rem => a % b,
        BinaryOperator::Pow => js_pow(a, b),
        BinaryOperator::Shl => f64::from(to_int32(a).wrapping_shl(to_uint32(b) & 31)),
        BinaryOperator::Shr => f64::from(to_int32(a) >> (to_uint32(b) & 31)),
        BinaryOperator::UShr => f64::from(to_uint32(a) >> (to_uint32(b) & 31)),
        BinaryOperator::BitAnd => f64::from(to_int32(a) & to_int32(b)),
        BinaryOperator::BitOr => f64::from(to_int32(a) | to_int32(b)),
        BinaryOperator::BitXor => f64::from(to_int32(a) ^ to_int32(b)),
        BinaryOperator::Lt => return Value::Bool(a < b),
        BinaryOperator::Le => return Value::Bool(a <= b),
        BinaryOperator::Gt => return Value::Bool(a > b),
        BinaryOperator::Ge => return Value::Bool(a >= b),
        BinaryOperator::Add => a + b,
        BinaryOperator::Eq | BinaryOperator::StrictEq => return Value::Bool(a == b),
        BinaryOperator::Ne | BinaryOperator::StrictNe => return Value::Bool(a != b),
        BinaryOperator::NullishCoalescing => a,
    };
    Value::Number(number)
}

fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

fn to_uint32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(4_294_967_296.0) as u32
}

fn to_int32(value: f64) -> i32 {
    to_uint32(value) as i32
}

/// Property name for a primitive key; arrays, objects, and functions have none.
fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_to_string(*number)),
        Value::Bool(value) => Some(value.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Undefined => Some("undefined".to_string()),
        Value::Array(_) | Value::Object(_) | Value::Function(_) => None,
    }
}

/// Strings index only in canonical form, so `'01'` and `'+1'` are plain keys.
fn key_to_index(key: &Value) -> Option<usize> {
    match key {
        Value::Number(number) if *number >= 0.0 && number.fract() == 0.0 => Some(*number as usize),
        Value::String(text) => text
            .parse::<usize>()
            .ok()
            .filter(|index| index.to_string() == *text),
        _ => None,
    }
}

fn spread_into_object(object: &mut Object, value: Value) {
    match value {
        Value::Object(source) => {
            for (key, value) in source {
                object.insert(key, value);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                object.insert(index.to_string(), item);
            }
        }
        Value::String(text) => {
            for (index, ch) in text.chars().enumerate() {
                object.insert(index.to_string(), Value::String(ch.to_string()));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "evaluator_test.rs"]
mod tests;
