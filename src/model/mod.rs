//! Enrollment data model
//!
//! Typed rows for the scrape, cumulative and published tables, plus the
//! fiscal year/term code every row is keyed by.

pub mod records;
pub mod year_term;

pub use records::{CourseRow, EnrollmentRecord, ScrapedCourse};
pub use year_term::{FIRST_YEAR_TERM, Term, YearTerm};
