use std::env;
use std::io;
use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod command;
mod config;
mod editor;
mod error;
mod history;
mod jobs;
mod launch;
mod pipeline;
mod pipes;
mod redirects;
mod shell;
mod validate;

use config::{Action, Config};

fn print_help() {
    println!("sshell - simple pipeline shell");
    println!();
    println!("Usage: sshell [OPTIONS]");
    println!("  -p, --prompt <TEXT>  Prompt to print before each line");
    println!("      --no-echo        Don't echo lines read from a non-terminal stdin");
    println!("  -h, --help           Print this help");
    println!("  -v, --version        Print version");
    println!();
    println!("Set RUST_LOG=debug to trace pipes, forks and waits on stderr.");
}

fn print_version() {
    println!("sshell v{}", env!("CARGO_PKG_VERSION"));
}

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = match Config::from_args(env::args().skip(1)) {
        Ok(Action::Run(config)) => config,
        Ok(Action::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Action::Version) => {
            print_version();
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("sshell: {}", msg);
            eprintln!("Try 'sshell --help' for more information.");
            return ExitCode::from(2);
        }
    };

    let mut shell = shell::Shell::new(config);
    match shell.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error::report(&e);
            ExitCode::FAILURE
        }
    }
}
