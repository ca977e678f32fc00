//! Full scrape of one year/term or of a list of course ids

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::detail::{self, CourseDetail};
use super::fetcher::PageFetcher;
use super::parse::{self, PageKind, RawTable};
use super::urls::Urls;
use crate::errors::{HeadcountError, Result};
use crate::model::{ScrapedCourse, YearTerm};
use crate::utils::csv_handler;

pub const COMPOSITE_FILE: &str = "all_enrollments.csv";
const DEFAULT_CAMPUS_ID: u32 = 72;

/// What to scrape.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeSource {
    /// Every subject offered in a term
    YearTerm(YearTerm),
    /// `(course_id, year_term)` pairs, ids already zero-padded
    CourseIds(Vec<(String, String)>),
}

/// One unit of work: a subject listing or a single course.
#[derive(Debug, Clone)]
enum Source {
    Subject { subject: String, year_term: String },
    Course { course_id: String, year_term: String },
}

impl Source {
    fn name(&self) -> String {
        match self {
            Source::Subject { subject, .. } => subject.clone(),
            Source::Course {
                course_id,
                year_term,
            } => format!("{}-{}", course_id, year_term),
        }
    }

    fn year_term(&self) -> &str {
        match self {
            Source::Subject { year_term, .. } | Source::Course { year_term, .. } => year_term,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CidEntry {
    #[serde(rename = "ID #")]
    id: String,
    year_term: String,
}

/// Read a CSV with `ID #` and `year_term` columns.
pub fn load_cid_list<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>> {
    let entries: Vec<CidEntry> = csv_handler::read_csv(path)?;
    entries
        .into_iter()
        .map(|e| {
            let id: u64 = e.id.trim().parse().map_err(|_| {
                HeadcountError::validation(format!("Invalid course id \"{}\"", e.id))
            })?;
            Ok((format!("{:06}", id), e.year_term.trim().to_string()))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub output_dir: PathBuf,
    /// `all_enrollments.csv` inside `output_dir`
    pub output_file: PathBuf,
    pub processed: usize,
    pub bad_sources: Vec<String>,
    pub rows: usize,
}

pub struct ScrapeRunner<F: PageFetcher> {
    fetcher: F,
    urls: Urls,
    data_dir: PathBuf,
}

impl<F: PageFetcher> ScrapeRunner<F> {
    pub fn new(fetcher: F, urls: Urls, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            urls,
            data_dir: data_dir.into(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// `results_v2-<local time>` under the data directory. Campuses other
    /// than the default get their own subdirectory.
    pub fn output_dir(&self, now: DateTime<Local>) -> PathBuf {
        let name = format!("results_v2-{}", now.format("%Y-%m-%dT%H-%M-%S"));
        let campus = self.urls.campus_id();
        if campus == DEFAULT_CAMPUS_ID {
            self.data_dir.join(name)
        } else {
            self.data_dir.join(campus.to_string()).join(name)
        }
    }

    fn sources(&self, source: ScrapeSource) -> Result<Vec<Source>> {
        let sources: Vec<Source> = match source {
            ScrapeSource::YearTerm(yt) => {
                let year_term = yt.code().to_string();
                let landing = self.fetcher.fetch(&self.urls.basic())?;
                parse::subject_list(&landing, &year_term)?
                    .into_iter()
                    .map(|subject| Source::Subject {
                        subject,
                        year_term: year_term.clone(),
                    })
                    .collect()
            }
            ScrapeSource::CourseIds(ids) => {
                // 重复的课程只抓取一次
                let mut seen = HashSet::new();
                ids.into_iter()
                    .filter(|pair| seen.insert(pair.clone()))
                    .map(|(course_id, year_term)| Source::Course {
                        course_id,
                        year_term,
                    })
                    .collect()
            }
        };
        if sources.is_empty() {
            return Err(HeadcountError::scrape("No data found to scrape"));
        }
        Ok(sources)
    }

    fn course_list(&self, source: &Source) -> Result<RawTable> {
        match source {
            Source::Subject {
                subject,
                year_term,
            } => {
                let page = self
                    .fetcher
                    .fetch(&self.urls.subject_search(year_term, subject))?;
                parse::results_table(&page, PageKind::Search)
            }
            Source::Course {
                course_id,
                year_term,
            } => {
                let page = self
                    .fetcher
                    .fetch(&self.urls.course_detail(course_id, year_term))?;
                parse::results_table(&page, PageKind::Detail)
            }
        }
    }

    fn detail(&self, course_id: &str, year_term: &str) -> Result<CourseDetail> {
        let url = self.urls.course_detail(course_id, year_term);
        let page = self.fetcher.fetch(&url)?;
        detail::course_detail(&page, &url)
    }

    pub fn run(&self, source: ScrapeSource) -> Result<ScrapeReport> {
        let sources = self.sources(source)?;

        let output_dir = self.output_dir(Local::now());
        if output_dir.exists() {
            return Err(HeadcountError::file_operation(format!(
                "Destination folder {} already exists",
                output_dir.display()
            )));
        }
        fs::create_dir_all(&output_dir)?;

        info!("Processing {} sources into {}", sources.len(), output_dir.display());

        let mut composite: Vec<ScrapedCourse> = Vec::new();
        let mut temp_paths = Vec::new();
        let mut bad_sources = Vec::new();

        for source in &sources {
            let name = source.name();
            let table = match self.course_list(source) {
                Ok(table) if table.is_empty() => {
                    info!("{}: no courses", name);
                    bad_sources.push(name);
                    continue;
                }
                Ok(table) => table,
                Err(e) => {
                    warn!("{}: failed to read course list: {}", name, e);
                    bad_sources.push(name);
                    continue;
                }
            };

            let mut rows = Vec::with_capacity(table.len());
            for row in &table.rows {
                let id = table.cell(row, "ID #").unwrap_or_default();
                let detail = self.detail(id, source.year_term())?;
                rows.push(build_row(&table, row, detail, source.year_term(), Utc::now()));
            }

            let temp_path = output_dir.join(format!("{}.csv", name));
            csv_handler::write_csv(&temp_path, &rows)?;
            temp_paths.push(temp_path);

            debug!("{}: {} courses", name, rows.len());
            composite.extend(rows);
        }

        let processed = sources.len() - bad_sources.len();
        info!(
            "Processed {} sources, failed on {}. A total of {} courses were processed.",
            processed,
            bad_sources.len(),
            composite.len()
        );

        let output_file = output_dir.join(COMPOSITE_FILE);
        csv_handler::write_csv(&output_file, &composite)?;

        let on_disk = csv_handler::count_rows(&output_file)?;
        if on_disk != composite.len() {
            return Err(HeadcountError::data_integrity(format!(
                "Enrollment data did not properly write to disk: wrote {}, read back {}",
                composite.len(),
                on_disk
            )));
        }

        for path in &temp_paths {
            fs::remove_file(path)?;
        }

        info!("Results saved to: {}", output_file.display());

        Ok(ScrapeReport {
            output_dir,
            output_file,
            processed,
            bad_sources,
            rows: composite.len(),
        })
    }
}

fn opt(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Merge a listing row with its detail page into one scraped course.
fn build_row(
    table: &RawTable,
    row: &[String],
    detail: CourseDetail,
    year_term: &str,
    fetched_at: DateTime<Utc>,
) -> ScrapedCourse {
    let cell = |h: &str| table.cell(row, h).map(str::to_string);
    ScrapedCourse {
        id: cell("ID #").unwrap_or_default(),
        subj: cell("Subj").unwrap_or_default(),
        number: cell("#").unwrap_or_default(),
        sec: cell("Sec"),
        title: cell("Title"),
        dates: cell("Dates"),
        days: cell("Days"),
        time: cell("Time"),
        size: detail.size,
        enrolled: detail.enrolled,
        credits: cell("Cr/Hr"),
        status: cell("Status"),
        instructor: cell("Instructor"),
        delivery_method: cell("Delivery Method"),
        book_cost: cell("Book Cost"),
        loc: cell("Loc"),
        lasc_wi: opt(&detail.lasc_wi),
        online_18: detail.online_18,
        tuition_resident: opt(&detail.tuition_resident),
        tuition_unit: opt(&detail.tuition_unit),
        tuition_nonresident: opt(&detail.tuition_nonresident),
        course_level: opt(&detail.course_level),
        course_fees: opt(&detail.course_fees),
        timestamp: fetched_at.timestamp_micros() as f64 / 1_000_000.0,
        year_term: year_term.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::StaticFetcher;
    use tempfile::TempDir;

    #[test]
    fn test_output_dir_naming() {
        let urls = Urls::new("https://example.edu/search/", 72, 250);
        let runner = ScrapeRunner::new(StaticFetcher::new(), urls, "data");
        let now = Local::now();
        let dir = runner.output_dir(now);
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("results_v2-"));
        assert!(!name.contains(':'));
        assert_eq!(dir.parent().unwrap(), Path::new("data"));

        let urls = Urls::new("https://example.edu/search/", 205, 250);
        let runner = ScrapeRunner::new(StaticFetcher::new(), urls, "data");
        assert!(runner.output_dir(now).starts_with("data/205"));
    }

    #[test]
    fn test_load_cid_list_pads_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cids.csv");
        fs::write(&path, "ID #,year_term,extra\n1234,20263,x\n000777,20265,y\n").unwrap();
        let ids = load_cid_list(&path).unwrap();
        assert_eq!(
            ids,
            vec![
                ("001234".to_string(), "20263".to_string()),
                ("000777".to_string(), "20265".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_source_list_is_error() {
        let dir = TempDir::new().unwrap();
        let urls = Urls::new("https://example.edu/search/", 72, 250);
        let runner = ScrapeRunner::new(StaticFetcher::new(), urls, dir.path());
        assert!(runner.run(ScrapeSource::CourseIds(vec![])).is_err());
        // nothing created for an empty run
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
