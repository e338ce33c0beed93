//! Command-line entry points
//!
//! - `serve`: run the HTTP service
//! - `extract`: validate, OCR and parse a local document without persisting it

pub mod extract;
pub mod serve;

use clap::{Parser, Subcommand};

/// Claim document intake service
#[derive(Parser)]
#[command(name = "claim-intake")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve,

    /// Extract text and claim fields from a local document
    Extract(extract::ExtractArgs),
}
