use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "expr-runner")]
#[command(about = "Tokenize, parse, print, and evaluate expressions")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Tokenize(TokenizeCommand),
    Parse(ParseCommand),
    Print(PrintCommand),
    Eval(EvalCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub struct TokenizeCommand {
    #[arg(allow_hyphen_values = true)]
    pub expression: String,
    #[arg(long)]
    pub locale: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ParseCommand {
    #[arg(allow_hyphen_values = true)]
    pub expression: String,
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct PrintCommand {
    #[arg(allow_hyphen_values = true)]
    pub expression: String,
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct EvalCommand {
    #[arg(allow_hyphen_values = true)]
    pub expression: String,
    /// JSON or YAML object of bindings.
    #[arg(long)]
    pub context: Option<PathBuf>,
    /// `name=<json>`; a value that is not valid JSON binds as a string.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub bindings: Vec<String>,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub locale: Option<String>,
    /// Defaults to the config's `format`, then text.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
