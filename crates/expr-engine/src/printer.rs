//! Canonical source rendering of an [`Expression`].
//!
//! Binary, logical, and conditional expressions are always parenthesized, so
//! the output re-parses to the same tree regardless of precedence.

use crate::ast::{
    ArrowFunctionExpression, BinaryOperator, Expression, ExpressionOrSpread, Param, Property, PropertyOrSpread,
    UnaryExpression, UnaryOperator,
};
use crate::value::number_to_string;

pub fn print(expression: &Expression) -> String {
    let mut out = String::new();
    write_expression(&mut out, expression);
    out
}

fn write_expression(out: &mut String, expression: &Expression) {
    match expression {
        Expression::NumericLiteral(node) => write_number(out, node.value),
        Expression::StringLiteral(node) => write_string(out, &node.value),
        Expression::BooleanLiteral(node) => out.push_str(if node.value { "true" } else { "false" }),
        Expression::NullLiteral(_) => out.push_str("null"),
        Expression::Identifier(node) => out.push_str(&node.name),
        Expression::ThisExpression(_) => out.push_str("this"),
        Expression::UnaryExpression(node) => write_unary(out, node),
        Expression::BinaryExpression(node) => {
            out.push('(');
            write_operand(out, &node.left);
            out.push(' ');
            out.push_str(node.operator.as_str());
            out.push(' ');
            // `a % -b` would read back as a postfix percent.
            if node.operator == BinaryOperator::Rem && starts_with_sign(&node.right) {
                write_wrapped(out, &node.right);
            } else {
                write_operand(out, &node.right);
            }
            out.push(')');
        }
        Expression::LogicalExpression(node) => {
            out.push('(');
            write_operand(out, &node.left);
            out.push(' ');
            out.push_str(node.operator.as_str());
            out.push(' ');
            write_operand(out, &node.right);
            out.push(')');
        }
        Expression::ConditionalExpression(node) => {
            out.push('(');
            write_operand(out, &node.test);
            out.push_str(" ? ");
            write_expression(out, &node.consequent);
            out.push_str(" : ");
            write_expression(out, &node.alternate);
            out.push(')');
        }
        Expression::MemberExpression(node) => {
            write_chain_base(out, &node.object);
            match (node.computed, node.optional) {
                (true, true) => out.push_str("?.["),
                (true, false) => out.push('['),
                (false, true) => out.push_str("?."),
                (false, false) => out.push('.'),
            }
            write_expression(out, &node.property);
            if node.computed {
                out.push(']');
            }
        }
        Expression::CallExpression(node) => {
            write_chain_base(out, &node.callee);
            if node.optional {
                out.push_str("?.");
            }
            out.push('(');
            write_elements(out, &node.arguments);
            out.push(')');
        }
        Expression::ArrayExpression(node) => {
            out.push('[');
            write_elements(out, &node.elements);
            out.push(']');
        }
        Expression::ObjectExpression(node) => {
            if node.properties.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (index, property) in node.properties.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                match property {
                    PropertyOrSpread::Property(property) => write_property(out, property),
                    PropertyOrSpread::Spread(spread) => {
                        out.push_str("...");
                        write_expression(out, &spread.argument);
                    }
                }
            }
            out.push_str(" }");
        }
        Expression::ArrowFunctionExpression(node) => write_arrow(out, node),
    }
}

fn write_unary(out: &mut String, node: &UnaryExpression) {
    if node.operator.is_postfix() {
        if matches!(node.argument.as_ref(), Expression::UnaryExpression(inner) if !inner.operator.is_postfix()) {
            write_wrapped(out, &node.argument);
        } else {
            write_operand(out, &node.argument);
        }
        out.push_str(node.operator.as_str());
        return;
    }
    out.push_str(node.operator.as_str());
    write_operand(out, &node.argument);
}

fn write_property(out: &mut String, property: &Property) {
    if property.shorthand {
        write_expression(out, &property.key);
        return;
    }
    if property.computed {
        out.push('[');
        write_expression(out, &property.key);
        out.push(']');
    } else {
        write_expression(out, &property.key);
    }
    out.push_str(": ");
    write_expression(out, &property.value);
}

fn write_arrow(out: &mut String, node: &ArrowFunctionExpression) {
    match node.params.as_slice() {
        [Param::Identifier(param)] => out.push_str(&param.name),
        params => {
            out.push('(');
            for (index, param) in params.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                match param {
                    Param::Identifier(param) => out.push_str(&param.name),
                    Param::AssignmentPattern(param) => {
                        out.push_str(&param.left.name);
                        out.push_str(" = ");
                        write_expression(out, &param.right);
                    }
                    Param::RestElement(param) => {
                        out.push_str("...");
                        out.push_str(&param.argument.name);
                    }
                }
            }
            out.push(')');
        }
    }
    out.push_str(" => ");
    write_expression(out, &node.body);
}

fn write_elements(out: &mut String, elements: &[ExpressionOrSpread]) {
    for (index, element) in elements.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        match element {
            ExpressionOrSpread::Expression(expression) => write_expression(out, expression),
            ExpressionOrSpread::Spread(spread) => {
                out.push_str("...");
                write_expression(out, &spread.argument);
            }
        }
    }
}

/// Operand of an operator; arrow functions need parens to stay operands.
fn write_operand(out: &mut String, expression: &Expression) {
    if matches!(expression, Expression::ArrowFunctionExpression(_)) {
        write_wrapped(out, expression);
    } else {
        write_expression(out, expression);
    }
}

/// Object of a member access or callee of a call.
fn write_chain_base(out: &mut String, expression: &Expression) {
    match expression {
        Expression::ArrowFunctionExpression(_)
        | Expression::UnaryExpression(_)
        | Expression::NumericLiteral(_) => write_wrapped(out, expression),
        _ => write_expression(out, expression),
    }
}

fn write_wrapped(out: &mut String, expression: &Expression) {
    out.push('(');
    write_expression(out, expression);
    out.push(')');
}

fn starts_with_sign(expression: &Expression) -> bool {
    matches!(
        expression,
        Expression::UnaryExpression(node)
            if matches!(node.operator, UnaryOperator::Minus | UnaryOperator::Plus)
    )
}

/// `Infinity` would read back as an identifier, so infinite literals print
/// as an overflowing literal instead.
fn write_number(out: &mut String, value: f64) {
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "1e999" } else { "(-1e999)" });
    } else if value < 0.0 {
        out.push('(');
        out.push_str(&number_to_string(value));
        out.push(')');
    } else {
        out.push_str(&number_to_string(value));
    }
}

fn write_string(out: &mut String, value: &str) {
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out.push('\'');
}

#[cfg(test)]
#[path = "printer_test.rs"]
mod tests;
