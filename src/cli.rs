use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Render listing pages and pagers from the command line
#[derive(Parser)]
#[command(name = "newsroom-cards")]
#[command(about = "Fetch and render news listing pages", long_about = None)]
pub struct Cli {
    /// Settings file (TOML); defaults to the user config directory
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one page from the search endpoint and print its regions
    Page {
        /// Search endpoint, e.g. https://search.example.edu/s/search.json
        #[arg(long)]
        endpoint: String,
        /// Query string appended to the endpoint, e.g. ?collection=news&query=!null
        #[arg(long)]
        query: String,
        /// Display variant selecting the card layout
        #[arg(long, default_value = "")]
        display: String,
        /// 1-based start rank
        #[arg(long, default_value_t = 1)]
        offset: u32,
    },
    /// Print pager markup for the given position
    Pager {
        #[arg(long, default_value_t = 1)]
        current: u32,
        #[arg(long)]
        total: u32,
        #[arg(long)]
        per_page: Option<u32>,
        #[arg(long)]
        range: Option<u32>,
    },
}
