//! CLI module - Command-line interface for Votarr
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

/// Votarr - Movie search proxy with a vote overlay
#[derive(Parser)]
#[command(name = "votarr")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "daemon")]
    Serve,

    /// Search for movies and print the enriched results
    #[command(alias = "s")]
    Search {
        /// Search term
        #[arg(required = true)]
        query: Vec<String>,

        /// Result page to request from upstream
        #[arg(long)]
        page: Option<u32>,
    },

    /// Look up a single title by its IMDb identifier
    #[command(alias = "l")]
    Lookup {
        /// IMDb-style identifier, e.g. tt3896198
        imdb_id: String,
    },

    /// Cast a vote for a title
    #[command(alias = "v")]
    Vote {
        /// IMDb-style identifier to vote on
        imdb_id: String,

        /// Vote direction
        #[arg(value_enum)]
        direction: VoteDirection,
    },

    /// Create default config file
    Init,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}
