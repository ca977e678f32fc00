//! CLI mode
//!
//! Batch commands: scraping, table updates and config generation. These
//! run to completion on the calling thread; the scraper is blocking.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;
use tracing::info;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::{HeadcountError, Result};
use crate::model::YearTerm;
use crate::scrape::{
    HttpFetcher, PageFetcher, ScrapeReport, ScrapeRunner, ScrapeSource, Urls, load_cid_list,
};
use crate::update::{TableUpdater, UpdateReport};

/// Run one batch command. `Serve` is handled by the server mode.
pub fn run_cli(cmd: Commands, config: &StaticConfig) -> Result<()> {
    match cmd {
        Commands::Serve => Err(HeadcountError::config(
            "serve is not a batch command".to_string(),
        )),
        Commands::Scrape {
            year_term,
            cid_list,
            campus_id,
        } => {
            let source = match (year_term, cid_list) {
                (Some(yt), None) => ScrapeSource::YearTerm(yt.parse()?),
                (None, Some(path)) => ScrapeSource::CourseIds(load_cid_list(path)?),
                _ => {
                    return Err(HeadcountError::validation(
                        "Give exactly one of --year-term or --cid-list",
                    ));
                }
            };
            scrape(config, source, campus_id).map(|_| ())
        }
        Commands::Update { file } => update(config, &file).map(|_| ()),
        Commands::Refresh { year_term } => refresh(config, year_term.parse()?),
        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => config_generate(output_path, force),
        },
    }
}

fn runner(config: &StaticConfig, campus_id: Option<u32>) -> ScrapeRunner<HttpFetcher> {
    let mut scraper = config.scraper.clone();
    if let Some(id) = campus_id {
        scraper.campus_id = id;
    }
    ScrapeRunner::new(
        HttpFetcher::new(&scraper),
        Urls::from_config(&scraper),
        &config.data.data_dir,
    )
}

fn print_scrape_report(report: &ScrapeReport) {
    println!(
        "{} {} sources, {} courses",
        "Scrape finished:".green().bold(),
        report.processed,
        report.rows
    );
    if !report.bad_sources.is_empty() {
        println!(
            "  {} {}",
            "No data for:".yellow(),
            report.bad_sources.join(", ")
        );
    }
    println!("  {} {}", "Output:".dimmed(), report.output_file.display());
}

fn scrape_with<F: PageFetcher>(runner: &ScrapeRunner<F>, source: ScrapeSource) -> Result<ScrapeReport> {
    let report = runner.run(source)?;
    print_scrape_report(&report);
    Ok(report)
}

pub fn scrape(
    config: &StaticConfig,
    source: ScrapeSource,
    campus_id: Option<u32>,
) -> Result<ScrapeReport> {
    println!("{}", "Scraping course search...".yellow());
    scrape_with(&runner(config, campus_id), source)
}

pub fn update(config: &StaticConfig, file: impl AsRef<Path>) -> Result<UpdateReport> {
    let file = file.as_ref();
    if !file.exists() {
        return Err(HeadcountError::not_found(format!(
            "Input file {} does not exist",
            file.display()
        )));
    }

    println!(
        "{} {}",
        "Updating table with".yellow(),
        file.display().to_string().blue()
    );
    let report = TableUpdater::new(&config.data).run(file)?;

    println!(
        "{} {} updated, {} added, {} total",
        "Update finished:".green().bold(),
        report.updated,
        report.appended,
        report.total
    );
    if let Some(backup) = &report.backup {
        println!("  {} {}", "Backup:".dimmed(), backup.display());
    }
    println!(
        "  {} {}",
        "Published:".dimmed(),
        config.data.published_file.blue()
    );
    Ok(report)
}

/// Scrape one term and feed the result straight into the table update.
/// A running server picks the new table up on its next request.
pub fn refresh(config: &StaticConfig, year_term: YearTerm) -> Result<()> {
    info!("Refreshing {} ({})", year_term, year_term.name());
    let report = scrape(config, ScrapeSource::YearTerm(year_term), None)?;
    update(config, &report.output_file)?;
    Ok(())
}

/// Ask before replacing an existing file.
fn confirm_overwrite(path: &Path) -> Result<bool> {
    print!(
        "{} {} {}",
        "File already exists:".yellow(),
        path.display().to_string().blue(),
        "Overwrite? [y/N] ".yellow()
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Generate example configuration file
pub fn config_generate(output_path: Option<String>, force: bool) -> Result<()> {
    let path = PathBuf::from(output_path.unwrap_or_else(|| "headcounts.example.toml".to_string()));

    // 非 --force 模式下交互确认
    if !force && path.exists() && !confirm_overwrite(&path)? {
        println!("{}", "Aborted.".red());
        return Ok(());
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.display().to_string().blue()
    );

    StaticConfig::default().save_to_file(&path)?;
    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.display().to_string().blue()
    );
    println!(
        "  {}",
        "Values can also be set with HC__SECTION__KEY environment variables".dimmed()
    );
    Ok(())
}
