#![doc = include_str!("../README.md")]

use std::process::ExitCode;

use bpaf::{Bpaf, ShellComp};
use tracing_subscriber::prelude::*;

mod commands;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    #[default]
    None,
    Debug,
    Info,
    Warn,
    Error,
}

impl core::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "expected 'none', 'debug', 'info', 'warn', or 'error', got '{s}'"
            )),
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Options applied to all commands
#[derive(Debug, Clone, Bpaf)]
#[bpaf(generate(global_options))]
pub struct GlobalOptions {
    /// The level of logging. In order, from the most verbose to the
    /// least verbose: debug, info, warn, error.
    #[bpaf(
        long("log-level"),
        argument("none|debug|info|warn|error"),
        fallback(LogLevel::None),
        display_fallback
    )]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Bpaf)]
#[bpaf(generate(target_args))]
pub struct TargetArgs {
    /// Indentation width for Gherkin steps and examples
    #[bpaf(short('i'), long("indent"), argument("N"), fallback(2), display_fallback)]
    pub indent: usize,

    /// Feature file, or directory to scan for .feature files
    #[bpaf(positional("PATH"), complete_shell(ShellComp::File { mask: None }))]
    pub path: String,
}

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage, generate(cli))]
/// Format and check Gherkin feature files
struct Cli {
    #[bpaf(external(commands))]
    command: Commands,
}

#[derive(Debug, Clone, Bpaf)]
enum Commands {
    #[bpaf(command("format"), long("fmt"))]
    /// Format Gherkin feature file(s) in place
    Format(
        #[bpaf(external(global_options), hide_usage)] GlobalOptions,
        #[bpaf(external(target_args))] TargetArgs,
    ),

    #[bpaf(command("check"))]
    /// Check formatting of Gherkin feature file(s)
    Check(
        #[bpaf(external(global_options), hide_usage)] GlobalOptions,
        #[bpaf(external(target_args))] TargetArgs,
    ),

    #[bpaf(command("version"))]
    /// Print version information
    Version,
}

/// Set up tracing from the `--log-level` flag, falling back to the
/// `FERKIN_LOG` env var.
fn setup_tracing(global: &GlobalOptions) {
    let filter = match global.log_level {
        LogLevel::None => match tracing_subscriber::EnvFilter::try_from_env("FERKIN_LOG") {
            Ok(filter) => filter,
            Err(_) => return,
        },
        LogLevel::Debug => tracing_subscriber::EnvFilter::new("debug"),
        LogLevel::Info => tracing_subscriber::EnvFilter::new("info"),
        LogLevel::Warn => tracing_subscriber::EnvFilter::new("warn"),
        LogLevel::Error => tracing_subscriber::EnvFilter::new("error"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts = cli().run();

    let had_errors = match opts.command {
        Commands::Format(global, args) => {
            setup_tracing(&global);
            commands::format::run(&args).await
        }
        Commands::Check(global, args) => {
            setup_tracing(&global);
            commands::check::run(&args).await
        }
        Commands::Version => {
            println!("ferkin {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
    };

    if had_errors {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
