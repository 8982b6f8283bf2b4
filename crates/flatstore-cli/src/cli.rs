use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "flatstore", about = "Query and edit the app and review catalog", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// App listing file (overrides config and CSV_FILE_PATH)
    #[arg(long, global = true)]
    pub app_file: Option<PathBuf>,

    /// Review file (overrides config and REVIEW_FILE_PATH)
    #[arg(long, global = true)]
    pub review_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load both files and report what was kept and skipped
    Load,

    /// Work with app listings
    #[command(subcommand)]
    Apps(AppsCommand),

    /// Work with user reviews
    #[command(subcommand)]
    Reviews(ReviewsCommand),
}

#[derive(Debug, Subcommand)]
pub enum AppsCommand {
    /// Print one page of app names
    List(AppListArgs),

    /// Append an app given as JSON
    Add {
        /// App record, e.g. '{"name":"Notes","price":"1.99"}'
        #[arg(long)]
        json: String,
    },

    /// Remove an app by name
    Delete {
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct AppListArgs {
    /// Page size
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    pub limit: i64,

    /// 1-based page number
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub page: i64,

    /// Only apps with exactly this price
    #[arg(long, default_value = "")]
    pub price: String,

    /// Print whole records instead of names
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Subcommand)]
pub enum ReviewsCommand {
    /// Print reviews matching every given filter
    List(ReviewListArgs),

    /// Append a review given as JSON
    Add {
        /// Review record
        #[arg(long)]
        json: String,
    },

    /// Remove every review of an app
    Delete {
        app: String,
    },
}

#[derive(Debug, Args)]
pub struct ReviewListArgs {
    /// App name, compared case-insensitively
    #[arg(long)]
    pub app: Option<String>,

    /// Sentiment label, compared case-insensitively
    #[arg(long)]
    pub sentiment: Option<String>,

    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub polarity_min: f64,

    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub polarity_max: f64,
}
