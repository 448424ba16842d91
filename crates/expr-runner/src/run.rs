use crate::cli::{EvalCommand, OutputFormat, ParseCommand, PrintCommand, TokenizeCommand};
use crate::config::{is_identifier, load_runner_config, RunnerConfig, RunnerConfigError};
use crate::io::{load_context_file, ContextFileError};
use expr_engine::locale::{find_locale, supported_locales, LocaleTable, EN_US};
use expr_engine::{
    parse_expression_with_locale, print, tokenize_with_locale, Context, EvalError, ExpressionEvaluator, LexError,
    ParseError, Token, TokenKind, Value,
};
use std::fmt::Write;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("runner config load failed: {0}")]
    ConfigLoad(#[from] RunnerConfigError),
    #[error(transparent)]
    ContextFile(#[from] ContextFileError),
    #[error("invalid binding `{binding}`: {reason}")]
    InvalidBinding { binding: String, reason: String },
    #[error("unknown locale `{locale}` (supported: {supported})")]
    UnknownLocale { locale: String, supported: String },
    #[error("tokenize failed: {0}")]
    Lex(#[from] LexError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),
    #[error("json encode failed: {0}")]
    JsonEncode(#[from] serde_json::Error),
}

pub fn execute_tokenize(command: &TokenizeCommand) -> Result<String, RunnerError> {
    let locale = select_locale(command.locale.as_deref())?;
    let tokens = tokenize_with_locale(&command.expression, locale)?;
    match command.format {
        OutputFormat::Text => Ok(tokens_text(&tokens)),
        OutputFormat::Json => serde_json::to_string_pretty(&tokens).map_err(RunnerError::from),
    }
}

pub fn execute_parse(command: &ParseCommand) -> Result<String, RunnerError> {
    let locale = select_locale(command.locale.as_deref())?;
    let ast = parse_expression_with_locale(&command.expression, locale)?;
    serde_json::to_string_pretty(&ast).map_err(RunnerError::from)
}

pub fn execute_print(command: &PrintCommand) -> Result<String, RunnerError> {
    let locale = select_locale(command.locale.as_deref())?;
    let ast = parse_expression_with_locale(&command.expression, locale)?;
    Ok(print(&ast))
}

pub fn execute_eval(command: &EvalCommand) -> Result<String, RunnerError> {
    let config = match &command.config {
        Some(path) => load_runner_config(path)?,
        None => RunnerConfig::default(),
    };
    let locale = select_locale(command.locale.as_deref().or(config.locale.as_deref()))?;
    let format = command.format.or(config.format).unwrap_or(OutputFormat::Text);

    let mut context = Context::new();
    context.extend(config.context.into_iter().map(|(name, value)| (name, Value::from(value))));
    if let Some(path) = &command.context {
        context.extend(
            load_context_file(path)?
                .into_iter()
                .map(|(name, value)| (name, Value::from(value))),
        );
    }
    for binding in &command.bindings {
        let (name, value) = parse_binding(binding)?;
        context.insert(name, value);
    }
    tracing::debug!(bindings = context.len(), locale = locale.id, "evaluating from command line");

    let value = ExpressionEvaluator::with_locale(locale).evaluate(&command.expression, &context)?;
    match format {
        OutputFormat::Text => Ok(value.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(&value.to_json()).map_err(RunnerError::from),
    }
}

/// Splits `name=value`. The value is read as JSON and falls back to a
/// plain string when it is not valid JSON.
pub(crate) fn parse_binding(binding: &str) -> Result<(String, Value), RunnerError> {
    let invalid = |reason: &str| RunnerError::InvalidBinding {
        binding: binding.to_string(),
        reason: reason.to_string(),
    };
    let (name, raw) = binding.split_once('=').ok_or_else(|| invalid("expected `name=value`"))?;
    let name = name.trim();
    if !is_identifier(name) {
        return Err(invalid("name is not an identifier"));
    }
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw));
    Ok((name.to_string(), value))
}

fn select_locale(id: Option<&str>) -> Result<&'static LocaleTable, RunnerError> {
    match id {
        None => Ok(&EN_US),
        Some(id) => find_locale(id).ok_or_else(|| RunnerError::UnknownLocale {
            locale: id.to_string(),
            supported: supported_locales().collect::<Vec<_>>().join(", "),
        }),
    }
}

fn tokens_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if token.kind == TokenKind::Eof {
            continue;
        }
        let _ = writeln!(
            out,
            "{:<16} {:<12} {}..{}",
            format!("{:?}", token.kind),
            token.value,
            token.range.start,
            token.range.end
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
