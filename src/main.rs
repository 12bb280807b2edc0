//! GM Console - Entry Point
//!
//! Runs command expressions against the demo handler set, either from
//! `--exec` arguments or interactively from stdin, and prints one JSON
//! envelope per command on stdout. Logs go to stderr.

use gm_command::command::{Dispatcher, Response};
use gm_command::core::config::{ConfigError, ConsoleConfig};
use gm_command::demo;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// GM Console - issue administrative commands like `Hello("true")`
#[derive(Parser, Debug)]
#[command(name = "gm-console")]
#[command(about = "Execute call-expression commands and print JSON envelopes")]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command to execute (repeatable); skips the interactive prompt
    #[arg(long, short = 'e')]
    exec: Vec<String>,

    /// Pretty-print envelopes
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), ConfigError> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if args.pretty {
        config.pretty = true;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let dispatcher = Dispatcher::new(demo::handlers());

    if !args.exec.is_empty() {
        for exp in &args.exec {
            print_response(&run_command(&dispatcher, &config, exp), &config)?;
        }
        return Ok(());
    }

    println!(
        "GM console ready. Commands: {}",
        dispatcher.handlers().names().join(", ")
    );
    println!("Type quit to exit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", config.prompt);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        print_response(&run_command(&dispatcher, &config, input), &config)?;
    }

    Ok(())
}

fn run_command(dispatcher: &Dispatcher, config: &ConsoleConfig, exp: &str) -> Response {
    if config.exceeds_limit(exp) {
        tracing::warn!(
            "Rejected command of {} bytes (limit {})",
            exp.len(),
            config.max_command_len
        );
        return Response::invalid_expression();
    }
    dispatcher.execute(exp)
}

fn print_response(response: &Response, config: &ConsoleConfig) -> io::Result<()> {
    let json = response.to_json(config.pretty).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)
}
