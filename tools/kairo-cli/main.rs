use clap::{Parser, Subcommand};
use kairo::prelude::*;
use std::fs;
use std::io::{self, Read};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Inspect literal input snippets the way the graph debugger reads them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Deepest literal nesting accepted before reporting a syntax error
    #[arg(long, global = true, default_value_t = kairo::literal::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a snippet and report the first syntax error, if any
    Check {
        /// Path to the snippet, or `-` for stdin
        path: String,
    },
    /// Print the lowered, shape-agnostic value of a snippet as JSON
    Lower {
        /// Path to the snippet, or `-` for stdin
        path: String,
        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("KAIRO_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let converter = LiteralConverter::builder().max_depth(cli.max_depth).build();

    match cli.command {
        Command::Check { path } => {
            let code = read_snippet(&path);
            match converter.intermediate(&code) {
                Ok(value) => println!("{}: ok ({})", path, value.kind_name()),
                Err(e) => exit_with_error(&format!("{}: {}", path, e)),
            }
        }
        Command::Lower { path, pretty } => {
            let code = read_snippet(&path);
            let value = converter
                .lower(&code)
                .unwrap_or_else(|e| exit_with_error(&format!("{}: {}", path, e)));
            let rendered = if pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            };
            match rendered {
                Ok(json) => println!("{}", json),
                Err(e) => exit_with_error(&format!("Failed to render JSON: {}", e)),
            }
        }
    }
}

fn read_snippet(path: &str) -> String {
    if path == "-" {
        let mut code = String::new();
        io::stdin()
            .read_to_string(&mut code)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read stdin: {}", e)));
        code
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read snippet file '{}': {}", path, e)))
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
