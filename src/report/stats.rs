//! Summary statistics shown above each report

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{CourseRow, YearTerm};

/// Credits assumed for variable-credit ("Vari.") courses.
pub const VARIABLE_CREDITS: i64 = 1;

/// Credits as an integer. `Vari.` counts as `variable`; anything else that
/// isn't a number counts as 0.
pub fn filled_credits(credits: Option<&str>, variable: i64) -> i64 {
    match credits.map(str::trim) {
        Some("Vari.") => variable,
        Some(c) => c.parse::<f64>().map(|f| f.round() as i64).unwrap_or(0),
        None => 0,
    }
}

// Failed detail lookups leave -1 sizes behind; they count as empty.
fn enrolled(row: &CourseRow) -> i64 {
    row.enrolled.max(0)
}

fn size(row: &CourseRow) -> i64 {
    row.size.max(0)
}

pub fn student_credit_hours(rows: &[&CourseRow]) -> i64 {
    rows.iter()
        .map(|r| enrolled(r) * filled_credits(r.credits.as_deref(), VARIABLE_CREDITS))
        .sum()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Seats {
    pub empty: i64,
    pub filled: i64,
    pub available: i64,
}

/// Seat counts over courses that are not cancelled.
pub fn seats(rows: &[&CourseRow]) -> Seats {
    rows.iter()
        .filter(|r| !r.is_cancelled())
        .fold(Seats::default(), |acc, r| Seats {
            empty: acc.empty + (size(r) - enrolled(r)).max(0),
            filled: acc.filled + enrolled(r),
            available: acc.available + size(r),
        })
}

/// Resident tuition times enrollment (times credits for per-credit tuition).
pub fn tuition_revenue(rows: &[&CourseRow]) -> f64 {
    rows.iter()
        .map(|r| {
            let per_student = if r.tuition_unit.as_deref() == Some("credit") {
                r.tuition_resident * filled_credits(r.credits.as_deref(), VARIABLE_CREDITS) as f64
            } else {
                r.tuition_resident
            };
            per_student * enrolled(r) as f64
        })
        .sum()
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub courses: usize,
    /// e.g. "Fall 2024, Spring 2025"
    pub year_terms: String,
    /// Mean `Last Updated`, Unix seconds
    pub mean_timestamp: i64,
    pub most_recent: DateTime<Utc>,
    pub student_credit_hours: i64,
    pub seats: Seats,
    pub tuition_revenue: f64,
}

impl Summary {
    /// `None` for an empty selection.
    pub fn from_rows(rows: &[&CourseRow]) -> Option<Self> {
        let most_recent = rows.iter().map(|r| r.last_updated).max()?;

        let terms: BTreeSet<u32> = rows.iter().map(|r| r.fiscal_yrtr).collect();
        let year_terms = terms
            .into_iter()
            .map(|code| YearTerm::new(code).map_or_else(|_| code.to_string(), YearTerm::name))
            .collect::<Vec<_>>()
            .join(", ");

        let total: i128 = rows.iter().map(|r| r.last_updated.timestamp() as i128).sum();
        let mean_timestamp = (total / rows.len() as i128) as i64;

        Some(Self {
            courses: rows.len(),
            year_terms,
            mean_timestamp,
            most_recent,
            student_credit_hours: student_credit_hours(rows),
            seats: seats(rows),
            tuition_revenue: tuition_revenue(rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::filter::tests::row;
    use chrono::TimeZone;

    #[test]
    fn test_filled_credits() {
        assert_eq!(filled_credits(Some("3"), 1), 3);
        assert_eq!(filled_credits(Some("2.5"), 1), 3);
        assert_eq!(filled_credits(Some("Vari."), 1), 1);
        assert_eq!(filled_credits(Some("Vari."), 4), 4);
        assert_eq!(filled_credits(Some("1-3"), 1), 0);
        assert_eq!(filled_credits(None, 1), 0);
    }

    #[test]
    fn test_seats_skip_cancelled() {
        let mut full = row(20263, "PHYS", "160", None);
        full.enrolled = 30;
        full.size = 25;
        let open = row(20263, "PHYS", "200", None);
        let mut cancelled = row(20263, "PHYS", "300", None);
        cancelled.status = Some("Cancelled".to_string());
        let rows = vec![&full, &open, &cancelled];

        let s = seats(&rows);
        assert_eq!(s.available, 50);
        assert_eq!(s.filled, 50);
        assert_eq!(s.empty, 5);
    }

    #[test]
    fn test_sch_and_revenue() {
        let per_credit = row(20263, "PHYS", "160", None);
        let mut per_course = row(20263, "PHYS", "200", None);
        per_course.tuition_unit = Some("course".to_string());
        per_course.tuition_resident = 900.0;
        let mut failed = row(20263, "PHYS", "300", None);
        failed.enrolled = -1;
        failed.size = -1;
        let rows = vec![&per_credit, &per_course, &failed];

        assert_eq!(student_credit_hours(&rows), 120);
        // 100 * 3 credits * 20 + 900 * 20
        assert_eq!(tuition_revenue(&rows), 24_000.0);
    }

    #[test]
    fn test_summary() {
        let mut a = row(20263, "PHYS", "160", None);
        a.last_updated = Utc.timestamp_opt(1_000, 0).unwrap();
        let mut b = row(20255, "PHYS", "160", None);
        b.last_updated = Utc.timestamp_opt(3_000, 0).unwrap();
        let rows = vec![&a, &b];

        let s = Summary::from_rows(&rows).unwrap();
        assert_eq!(s.courses, 2);
        assert_eq!(s.year_terms, "Spring 2025, Fall 2025");
        assert_eq!(s.mean_timestamp, 2_000);
        assert_eq!(s.most_recent.timestamp(), 3_000);

        assert!(Summary::from_rows(&[]).is_none());
    }
}
