pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod locale;
pub mod parser;
pub mod printer;
pub mod value;

pub use ast::Expression;
pub use evaluator::{evaluate, evaluate_expression, evaluate_with_locale, EvalError, ExpressionEvaluator};
pub use lexer::{tokenize, tokenize_with_locale, LexError, SourceRange, Token, TokenKind};
pub use locale::{format_message, resolve_locale, LocaleTable};
pub use parser::{parse, parse_expression, parse_expression_with_locale, ParseError, Parser};
pub use printer::print;
pub use value::{Context, Function, Object, Value, ValueKind};
