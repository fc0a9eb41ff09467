//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for vfilter.

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for vfilter.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The filter expression to compile, e.g. `.year > 1980 and .genre in ["drama"]`.
    #[arg(index = 1)]
    pub expr: String,

    /// Path to a JSON record to evaluate the expression against, or `-` for stdin.
    #[arg(index = 2)]
    pub json: std::path::PathBuf,

    /// Whether to dump the compiled postfix program (for debugging).
    #[arg(long)]
    pub dump_program: bool,

    /// Specify the log level of the engine.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of vfilter.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,

    #[value(alias("1"))]
    Warn,

    #[value(alias("2"))]
    Info,

    #[value(alias("3"))]
    Debug,

    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
