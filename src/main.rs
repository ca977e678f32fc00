use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::error;

use headcounts::cli::Cli;
use headcounts::config::{get_config, init_config};
use headcounts::runtime::modes::{Mode, detect_mode, run_cli, run_server};
use headcounts::system::init_logging;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_config(cli.config.as_deref());
    let config = get_config();

    // guard 必须存活到进程结束，否则日志不会刷新
    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "Failed to initialize logging:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match detect_mode(cli.command.as_ref()) {
        Mode::Server => {
            if let Err(e) = actix_web::rt::System::new().block_on(run_server(&config)) {
                error!("Server exited with error: {:#}", e);
                eprintln!("{} {:#}", "Server error:".red().bold(), e);
                return ExitCode::FAILURE;
            }
        }
        Mode::Cli => {
            let Some(command) = cli.command else {
                return ExitCode::FAILURE;
            };
            if let Err(e) = run_cli(command, &config) {
                error!("{}", e);
                eprintln!("{}", e.format_colored());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
