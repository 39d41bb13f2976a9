//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pro Banana - product preview bot
#[derive(Parser)]
#[command(
    name = "pb",
    about = "Chat bot that turns product photos into generated preview images",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/probanana/logs/probanana.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    pub log_stderr: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the bot in the foreground (default)
    Run,

    /// Print the synthesized generation document for preview arguments
    Prompt {
        /// Free-text arguments, e.g. "v3 beauty style=gold 4:5 matte finish"
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Start from cover defaults instead of preview defaults
        #[arg(long)]
        cover: bool,

        /// Explicit frame template ids
        #[arg(long, value_delimiter = ',')]
        frames: Vec<String>,
    },

    /// List categories, styles, and frame templates
    Catalog,

    /// Run one preview generation against the backend
    Generate {
        /// Product photo to send as reference
        #[arg(short, long)]
        image: PathBuf,

        /// Free-text preview arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Start from cover defaults instead of preview defaults
        #[arg(long)]
        cover: bool,

        /// Directory the returned images are written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

/// Location of the log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("probanana")
        .join("logs")
        .join("probanana.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["pb"]);
        assert!(cli.command.is_none());
        assert!(!cli.log_stderr);
    }

    #[test]
    fn test_cli_parse_run_with_globals() {
        let cli = Cli::parse_from(["pb", "run", "--log-level", "debug", "--log-stderr"]);
        assert!(matches!(cli.command, Some(Command::Run)));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.log_stderr);
    }

    #[test]
    fn test_cli_parse_prompt() {
        let cli = Cli::parse_from(["pb", "prompt", "--frames", "hero_still_life,extreme_macro", "v3", "beauty"]);
        if let Some(Command::Prompt { args, cover, frames }) = cli.command {
            assert_eq!(args, vec!["v3", "beauty"]);
            assert!(!cover);
            assert_eq!(frames, vec!["hero_still_life", "extreme_macro"]);
        } else {
            panic!("Expected Prompt command");
        }
    }

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::parse_from(["pb", "generate", "--image", "shoe.jpg", "--out", "/tmp/out", "--cover", "gold"]);
        if let Some(Command::Generate { image, args, cover, out }) = cli.command {
            assert_eq!(image, PathBuf::from("shoe.jpg"));
            assert_eq!(args, vec!["gold"]);
            assert!(cover);
            assert_eq!(out, PathBuf::from("/tmp/out"));
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["pb", "-c", "/path/to/config.yml", "catalog"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert!(matches!(cli.command, Some(Command::Catalog)));
    }

    #[test]
    fn test_log_path_ends_with_file_name() {
        assert!(get_log_path().ends_with("probanana/logs/probanana.log"));
    }
}
