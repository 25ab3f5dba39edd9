//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use clap_complete::Shell;

/// Natal chart generator: resolves upstream chart data into positions,
/// houses and aspects, plus the rendered wheel
#[derive(Parser, Debug)]
#[command(name = "natalis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Generate shell completions
    #[arg(long = "generate", value_enum)]
    pub generator: Option<Shell>,

    /// Show author and version
    #[arg(long)]
    pub info: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a natal chart for one subject
    Generate {
        /// Subject name
        #[arg(short, long)]
        name: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Birth time, 24h (HH:MM)
        #[arg(long)]
        time: String,

        /// Birth city
        #[arg(long)]
        city: String,

        /// Birth country, as a name or ISO-2 code
        #[arg(long)]
        country: Option<String>,

        /// Label language (ES or EN)
        #[arg(long)]
        lang: Option<String>,

        /// Wheel rendering theme
        #[arg(long)]
        theme: Option<String>,

        /// Write the wheel SVG to this file
        #[arg(long, value_hint = ValueHint::FilePath)]
        svg_out: Option<PathBuf>,

        /// Chart service base URL (overrides config)
        #[arg(long)]
        api_base: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print the global config file path
    Path,
}
