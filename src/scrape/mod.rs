//! Scraper for the public course-search site
//!
//! The landing page lists the subjects offered per term, each subject search
//! lists its courses, and each course's detail page carries the enrollment
//! numbers. [`ScrapeRunner`] walks all three and writes one CSV per run.

pub mod detail;
pub mod fetcher;
pub mod html;
pub mod parse;
pub mod runner;
pub mod urls;

pub use detail::{CourseDetail, LASC_AREAS, course_detail, lasc_area_label};
pub use fetcher::{HttpFetcher, PageFetcher, StaticFetcher};
pub use parse::{PageKind, RawTable, clean_text, results_table, subject_list};
pub use runner::{COMPOSITE_FILE, ScrapeReport, ScrapeRunner, ScrapeSource, load_cid_list};
pub use urls::Urls;
