//! Filtering and statistics over the published table

pub mod cache;
pub mod filter;
pub mod query;
pub mod stats;

pub use cache::{cache_file_name, write_cached_view};
pub use filter::{Spec, Subject, filter_rows, lasc_area_matches};
pub use query::CourseQuery;
pub use stats::{Seats, Summary, filled_credits, seats, student_credit_hours, tuition_revenue};
