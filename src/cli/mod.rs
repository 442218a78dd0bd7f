//! CLI module for the agent workflow gateway

pub mod serve;

use clap::{Parser, Subcommand};

/// Agent Workflow Gateway - LLM orchestration patterns as a service
#[derive(Parser)]
#[command(name = "agent-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
