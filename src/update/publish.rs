//! Published table: the cumulative table reshaped for the web app

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{HeadcountError, Result};
use crate::model::{CourseRow, EnrollmentRecord, YearTerm};
use crate::utils::csv_handler;

pub const DEFAULT_DELIVERY_METHOD: &str = "On Campus";

/// Subject rubric -> college code.
#[derive(Debug, Clone, Default)]
pub struct CollegeMap(HashMap<String, String>);

#[derive(Debug, Deserialize)]
struct CollegeEntry {
    #[serde(rename = "Rubric")]
    rubric: String,
    #[serde(rename = "CollegeCode")]
    college_code: String,
}

impl CollegeMap {
    /// Load `Rubric,CollegeCode` pairs. A missing file gives an empty map.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("College map {} not found, colleges will be blank", path.display());
            return Ok(Self::default());
        }
        let entries: Vec<CollegeEntry> = csv_handler::read_csv(path)?;
        Ok(entries
            .into_iter()
            .map(|e| (e.rubric.trim().to_string(), e.college_code.trim().to_string()))
            .collect())
    }

    pub fn college(&self, rubric: &str) -> Option<&str> {
        self.0.get(rubric).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for CollegeMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// `"$1,020.50"` -> 1020.5; anything unparseable is 0.
pub fn parse_money(value: Option<&str>) -> f64 {
    value
        .map(|v| v.replace(['$', ','], ""))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0.0)
}

fn timestamp_to_utc(ts: f64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros((ts * 1_000_000.0).round() as i64)
        .ok_or_else(|| HeadcountError::data_integrity(format!("Invalid timestamp {}", ts)))
}

pub fn publish(rows: &[EnrollmentRecord], colleges: &CollegeMap) -> Result<Vec<CourseRow>> {
    rows.iter()
        .map(|r| {
            let year_term: YearTerm = r.year_term.parse().map_err(|_| {
                HeadcountError::data_integrity(format!(
                    "Row {} has invalid year_term \"{}\"",
                    r.id, r.year_term
                ))
            })?;
            Ok(CourseRow {
                term: year_term.name(),
                fiscal_yrtr: year_term.code(),
                id: r.id.clone(),
                subj: r.subj.clone(),
                number: r.number.clone(),
                sec: r.sec.clone(),
                title: r.title.clone(),
                credits: r.credits.clone(),
                enrolled: r.enrolled,
                size: r.size,
                status: r.status.clone(),
                dates: r.dates.clone(),
                days: r.days.clone(),
                time: r.time.clone(),
                instructor: r.instructor.clone(),
                delivery_method: r
                    .delivery_method
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DELIVERY_METHOD.to_string()),
                loc: r.loc.clone(),
                lasc_wi: r.lasc_wi.clone(),
                online_18: r.online_18,
                course_level: r.course_level.clone(),
                college: colleges.college(&r.subj).map(str::to_string),
                tuition_unit: r.tuition_unit.clone(),
                tuition_resident: parse_money(r.tuition_resident.as_deref()),
                tuition_nonresident: parse_money(r.tuition_nonresident.as_deref()),
                course_fees: parse_money(r.course_fees.as_deref()),
                book_cost: parse_money(r.book_cost.as_deref()),
                last_updated: timestamp_to_utc(r.timestamp)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub year_term: u32,
    pub term: String,
}

/// Distinct terms present in the table, newest first.
pub fn semesters(rows: &[CourseRow]) -> Vec<Semester> {
    let unique: BTreeMap<u32, &str> = rows
        .iter()
        .map(|r| (r.fiscal_yrtr, r.term.as_str()))
        .collect();
    unique
        .into_iter()
        .rev()
        .map(|(year_term, term)| Semester {
            year_term,
            term: term.to_string(),
        })
        .collect()
}

pub fn write_semesters<P: AsRef<Path>>(path: P, semesters: &[Semester]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(semesters)?)?;
    Ok(())
}

pub fn read_semesters<P: AsRef<Path>>(path: P) -> Result<Vec<Semester>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
