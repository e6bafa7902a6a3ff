use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the statements that would create a schema's tables
    Ddl {
        /// Schema definition file (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Target driver (mysql or pgsql)
        #[arg(short, long, default_value = "mysql")]
        driver: String,

        /// Collation for MySQL tables
        #[arg(long)]
        collation: Option<String>,

        /// Suffix of the content table for localized schemas
        #[arg(long, default_value = "_content")]
        content_suffix: String,

        /// AUTO_INCREMENT start for MySQL tables
        #[arg(long, default_value_t = 1)]
        auto_increment_start: u64,
    },

    /// Validate a schema file and print it normalized
    Check {
        /// Schema definition file (JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },
}
