use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "irloom", version, about = "Restore IR graphs and their shapes")]
pub struct Cli {
    /// Log level (RUST_LOG syntax)
    #[arg(long, global = true, default_value = "warn")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read an IR file, run shape inference and print every node's output shapes
    Inspect {
        /// Path to the IR document (YAML)
        ir: PathBuf,

        /// Reader config (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Reuse IR shapes for nodes without a shape inference strategy
        #[arg(long)]
        fallback: bool,
    },
    /// List the operator types that have an extender
    Extenders,
}
