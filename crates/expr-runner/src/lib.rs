mod cli;
mod config;
mod io;
mod run;

pub use cli::{Cli, Commands, EvalCommand, OutputFormat, ParseCommand, PrintCommand, TokenizeCommand};
pub use config::{load_runner_config, validate_runner_config, ConfigIssue, RunnerConfig, RunnerConfigError};
pub use io::{load_context_file, ContextFileError};
pub use run::{execute_eval, execute_parse, execute_print, execute_tokenize, RunnerError};
