use clap::Parser;
use expr_runner::{execute_eval, execute_parse, execute_print, execute_tokenize, Cli, Commands};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Tokenize(command) => execute_tokenize(command),
        Commands::Parse(command) => execute_parse(command),
        Commands::Print(command) => execute_print(command),
        Commands::Eval(command) => execute_eval(command),
    };

    match result {
        Ok(output) => {
            println!("{output}");
        }
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
