use crate::cli::OutputFormat;
use expr_engine::locale::{find_locale, supported_locales};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_runner_schema")]
    pub schema: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    /// Default bindings for `eval`.
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            schema: default_runner_schema(),
            locale: None,
            format: None,
            context: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub reference: String,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.reference, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerConfigError {
    #[error("read runner config failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("runner config parse failed: {0}")]
    Parse(String),
    #[error("runner config validation failed: {}", join_issues(.0))]
    Validation(Vec<ConfigIssue>),
}

pub fn load_runner_config(path: &Path) -> Result<RunnerConfig, RunnerConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| RunnerConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let expanded = expand_env_placeholders(raw.as_str()).map_err(RunnerConfigError::Parse)?;
    let config: RunnerConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(expanded.as_str())
            .map_err(|error| RunnerConfigError::Parse(format!("json decode error: {error}")))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(expanded.as_str())
            .map_err(|error| RunnerConfigError::Parse(format!("yaml decode error: {error}")))?,
        _ => serde_yaml::from_str(expanded.as_str())
            .or_else(|_| serde_json::from_str(expanded.as_str()))
            .map_err(|error| RunnerConfigError::Parse(error.to_string()))?,
    };

    let issues = validate_runner_config(&config);
    if !issues.is_empty() {
        return Err(RunnerConfigError::Validation(issues));
    }
    tracing::debug!(path = %path.display(), bindings = config.context.len(), "loaded runner config");
    Ok(config)
}

/// Reports every problem at once, ordered by field.
pub fn validate_runner_config(config: &RunnerConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::<ConfigIssue>::new();
    if config.schema != default_runner_schema() {
        issues.push(config_issue(
            "runner.config.schema",
            "schema",
            format!(
                "unsupported runner config schema `{}` (expected `{}`)",
                config.schema,
                default_runner_schema()
            ),
        ));
    }
    if let Some(locale) = &config.locale {
        if find_locale(locale).is_none() {
            issues.push(config_issue(
                "runner.config.locale",
                "locale",
                format!(
                    "unknown locale `{locale}` (supported: {})",
                    supported_locales().collect::<Vec<_>>().join(", ")
                ),
            ));
        }
    }
    for name in config.context.keys() {
        if !is_identifier(name) {
            issues.push(config_issue(
                "runner.config.context.name",
                &format!("context.{name}"),
                format!("binding name `{name}` is not an identifier"),
            ));
        }
    }
    issues.sort_by(|a, b| a.field.cmp(&b.field));
    issues
}

/// Identifier the lexer would accept: letter, `_`, or `$`, then those or ASCII digits.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|ch| ch.is_alphabetic() || ch == '_' || ch == '$')
        && chars.all(|ch| ch.is_alphabetic() || ch.is_ascii_digit() || ch == '_' || ch == '$')
}

fn config_issue(reference: &str, field: &str, message: String) -> ConfigIssue {
    ConfigIssue {
        reference: reference.to_string(),
        field: field.to_string(),
        message,
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn default_runner_schema() -> String {
    "expr-runner/0.0.1".to_string()
}

pub(crate) fn expand_env_placeholders(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    while let Some(start_offset) = input[cursor..].find("${") {
        let start = cursor + start_offset;
        out.push_str(&input[cursor..start]);
        let var_start = start + 2;
        let Some(end_offset) = input[var_start..].find('}') else {
            return Err("unterminated env placeholder `${...`".to_string());
        };
        let end = var_start + end_offset;
        let key = &input[var_start..end];
        if key.is_empty() {
            return Err("empty env placeholder `${}`".to_string());
        }
        let value = std::env::var(key).map_err(|_| format!("missing env var for placeholder `${{{key}}}`"))?;
        out.push_str(value.as_str());
        cursor = end + 1;
    }
    out.push_str(&input[cursor..]);
    Ok(out)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
