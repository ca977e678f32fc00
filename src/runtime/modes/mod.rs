//! Mode routing
//!
//! - Server mode (HTTP server)
//! - CLI mode (scrape, update, refresh, config)
//!
//! No subcommand, or `serve`, selects the server.

pub mod cli;
pub mod server;

pub use cli::run_cli;
pub use server::{build_app, run_server};

use crate::cli::Commands;

/// Mode detection result
#[derive(Debug, PartialEq)]
pub enum Mode {
    Server,
    Cli,
}

pub fn detect_mode(command: Option<&Commands>) -> Mode {
    match command {
        None | Some(Commands::Serve) => Mode::Server,
        Some(_) => Mode::Cli,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode() {
        assert_eq!(detect_mode(None), Mode::Server);
        assert_eq!(detect_mode(Some(&Commands::Serve)), Mode::Server);
        assert_eq!(
            detect_mode(Some(&Commands::Update {
                file: "x.csv".to_string()
            })),
            Mode::Cli
        );
    }
}
