//! Command-line interface definitions using clap

use clap::{ArgGroup, Parser, Subcommand};

/// Headcounts - course enrollment scraper and report server
#[derive(Parser, Debug)]
#[command(name = "headcounts")]
#[command(version)]
#[command(about = "Scrapes course enrollment headcounts and serves searchable reports", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the web server (default)
    Serve,

    /// Scrape the course search site
    ///
    /// Usage: scrape --year-term 20263 | --cid-list ids.csv
    #[command(group(ArgGroup::new("source").required(true).args(["year_term", "cid_list"])))]
    Scrape {
        /// Year/term code, e.g. 20263 for Fall 2025
        #[arg(long)]
        year_term: Option<String>,

        /// CSV with `ID #` and `year_term` columns
        #[arg(long)]
        cid_list: Option<String>,

        /// Campus to scrape instead of the configured one
        #[arg(long)]
        campus_id: Option<u32>,
    },

    /// Merge a scrape result into the cumulative table and republish
    Update {
        /// The `all_enrollments.csv` produced by a scrape
        file: String,
    },

    /// Scrape one year/term, then update with the result
    Refresh {
        #[arg(long)]
        year_term: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Write a sample configuration file
    Generate {
        /// Output path (default: headcounts.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["headcounts"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_scrape_needs_exactly_one_source() {
        assert!(Cli::try_parse_from(["headcounts", "scrape"]).is_err());
        assert!(
            Cli::try_parse_from([
                "headcounts",
                "scrape",
                "--year-term",
                "20263",
                "--cid-list",
                "ids.csv"
            ])
            .is_err()
        );

        let cli = Cli::try_parse_from(["headcounts", "scrape", "--year-term", "20263"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Scrape {
                year_term: Some("20263".to_string()),
                cid_list: None,
                campus_id: None,
            })
        );
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["headcounts", "update", "new.csv", "-c", "prod.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
        assert_eq!(
            cli.command,
            Some(Commands::Update {
                file: "new.csv".to_string()
            })
        );
    }

    #[test]
    fn test_config_generate() {
        let cli = Cli::try_parse_from(["headcounts", "config", "generate", "out.toml", "--force"])
            .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Generate {
                    output_path: Some("out.toml".to_string()),
                    force: true,
                }
            })
        );
    }
}
