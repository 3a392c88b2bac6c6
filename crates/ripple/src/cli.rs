use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ripple: a type-keyed, priority-ordered event dispatcher
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Application config file (.json, .yaml or .toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a scripted window/input session through the dispatcher
    Demo,
    /// Subscribe concurrently from many threads, then dispatch once
    Stress {
        /// Number of subscribing threads
        #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
        threads: u32,
        /// Subscriptions registered by each thread
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
        subscriptions: u32,
    },
}
