use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nordflytt-api", version, about = "Nordflytt quote and support API")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", env = "NORDFLYTT_CONFIG", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server (default)
    Start,

    /// Test configuration file validity
    Test,

    /// Price a move without starting the server
    Quote(QuoteArgs),

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    /// Volume to move in cubic metres
    #[arg(short, long)]
    pub volume: f64,

    /// Floor at the pickup address
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub floors_from: i32,

    /// Floor at the delivery address
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub floors_to: i32,

    /// Elevator at the pickup address: yes, small, none, broken
    #[arg(long, default_value = "yes")]
    pub elevator_from: String,

    /// Elevator at the delivery address: yes, small, none, broken
    #[arg(long, default_value = "yes")]
    pub elevator_to: String,

    /// Additional service, repeatable (packning, städning, piano, magasinering)
    #[arg(short, long = "service")]
    pub services: Vec<String>,

    /// Distance in kilometres (not priced)
    #[arg(long, default_value_t = 0.0)]
    pub distance: f64,

    /// Message locale: sv or en
    #[arg(long, default_value = "sv")]
    pub locale: String,

    /// Print the API response body as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_start() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };
        assert!(matches!(cli.get_command(), Commands::Start));
    }

    #[test]
    fn test_cli_parsing_quote() {
        let args = vec![
            "nordflytt-api",
            "quote",
            "--volume",
            "30",
            "--floors-from",
            "4",
            "--elevator-from",
            "none",
            "-s",
            "piano",
            "-s",
            "packning",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Quote(quote) => {
                assert_eq!(quote.volume, 30.0);
                assert_eq!(quote.floors_from, 4);
                assert_eq!(quote.floors_to, 0);
                assert_eq!(quote.elevator_from, "none");
                assert_eq!(quote.elevator_to, "yes");
                assert_eq!(quote.services, vec!["piano", "packning"]);
                assert_eq!(quote.locale, "sv");
                assert!(!quote.json);
            }
            _ => panic!("Expected Quote command"),
        }
    }

    #[test]
    fn test_cli_quote_requires_volume() {
        assert!(Cli::try_parse_from(["nordflytt-api", "quote"]).is_err());
    }

    #[test]
    fn test_cli_global_config_path() {
        let cli = Cli::try_parse_from(["nordflytt-api", "test", "--config", "/etc/nordflytt.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/nordflytt.toml"));
        assert!(matches!(cli.get_command(), Commands::Test));
    }
}
