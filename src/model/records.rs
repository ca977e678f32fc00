//! Row types for the three enrollment tables
//!
//! - [`ScrapedCourse`]: one row of a fresh scrape (`all_enrollments.csv` in a
//!   `results_v2-*` directory)
//! - [`EnrollmentRecord`]: one row of the cumulative table every scrape is
//!   merged into
//! - [`CourseRow`]: one row of the published table the web server reads
//!
//! Field order is the CSV column order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `True`/`False` the way the historical CSV files spell booleans.
pub(crate) mod title_bool {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *value { "True" } else { "False" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(matches!(
            raw.as_deref().map(|s| s.trim().to_ascii_lowercase()).as_deref(),
            Some("true") | Some("1") | Some("yes")
        ))
    }
}

/// Enrollment sizes; the cumulative table occasionally carries them as `25.0`.
mod lenient_int {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
            return Ok(-1);
        };
        raw.parse::<i64>()
            .or_else(|_| raw.parse::<f64>().map(|f| f.round() as i64))
            .map_err(serde::de::Error::custom)
    }
}

/// Text cells: surrounding whitespace trimmed, blank cells become `None`.
mod blank_as_none {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }
}

/// Numeric value of a cell that might be a plain string or a number.
mod any_string {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.map(|s| s.trim().to_string()).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedCourse {
    #[serde(rename = "ID #", deserialize_with = "any_string::deserialize")]
    pub id: String,
    #[serde(rename = "Subj", deserialize_with = "any_string::deserialize")]
    pub subj: String,
    #[serde(rename = "#", deserialize_with = "any_string::deserialize")]
    pub number: String,
    #[serde(rename = "Sec", default, deserialize_with = "blank_as_none::deserialize")]
    pub sec: Option<String>,
    #[serde(rename = "Title", default, deserialize_with = "blank_as_none::deserialize")]
    pub title: Option<String>,
    #[serde(rename = "Dates", default, deserialize_with = "blank_as_none::deserialize")]
    pub dates: Option<String>,
    #[serde(rename = "Days", default, deserialize_with = "blank_as_none::deserialize")]
    pub days: Option<String>,
    #[serde(rename = "Time", default, deserialize_with = "blank_as_none::deserialize")]
    pub time: Option<String>,
    #[serde(rename = "Size:", deserialize_with = "lenient_int::deserialize")]
    pub size: i64,
    #[serde(rename = "Enrolled:", deserialize_with = "lenient_int::deserialize")]
    pub enrolled: i64,
    #[serde(rename = "Cr/Hr", default, deserialize_with = "blank_as_none::deserialize")]
    pub credits: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "blank_as_none::deserialize")]
    pub status: Option<String>,
    #[serde(rename = "Instructor", default, deserialize_with = "blank_as_none::deserialize")]
    pub instructor: Option<String>,
    #[serde(rename = "Delivery Method", default, deserialize_with = "blank_as_none::deserialize")]
    pub delivery_method: Option<String>,
    #[serde(rename = "Book Cost", default, deserialize_with = "blank_as_none::deserialize")]
    pub book_cost: Option<String>,
    #[serde(rename = "Loc", default, deserialize_with = "blank_as_none::deserialize")]
    pub loc: Option<String>,
    #[serde(rename = "LASC/WI", default, deserialize_with = "blank_as_none::deserialize")]
    pub lasc_wi: Option<String>,
    #[serde(rename = "18online", default, with = "title_bool")]
    pub online_18: bool,
    #[serde(rename = "Tuition -resident", default, deserialize_with = "blank_as_none::deserialize")]
    pub tuition_resident: Option<String>,
    #[serde(rename = "Tuition unit", default, deserialize_with = "blank_as_none::deserialize")]
    pub tuition_unit: Option<String>,
    #[serde(rename = "Tuition -nonresident", default, deserialize_with = "blank_as_none::deserialize")]
    pub tuition_nonresident: Option<String>,
    #[serde(rename = "Course level", default, deserialize_with = "blank_as_none::deserialize")]
    pub course_level: Option<String>,
    #[serde(rename = "Approximate Course Fees", default, deserialize_with = "blank_as_none::deserialize")]
    pub course_fees: Option<String>,
    pub timestamp: f64,
    #[serde(deserialize_with = "any_string::deserialize")]
    pub year_term: String,
}

/// Cumulative table row. Same columns as [`ScrapedCourse`] but with
/// `Enrolled:` and `Cr/Hr` renamed to `Enrolled` and `Crds`; either
/// spelling is accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    #[serde(rename = "ID #", deserialize_with = "any_string::deserialize")]
    pub id: String,
    #[serde(rename = "Subj", deserialize_with = "any_string::deserialize")]
    pub subj: String,
    #[serde(rename = "#", deserialize_with = "any_string::deserialize")]
    pub number: String,
    #[serde(rename = "Sec", default, deserialize_with = "blank_as_none::deserialize")]
    pub sec: Option<String>,
    #[serde(rename = "Title", default, deserialize_with = "blank_as_none::deserialize")]
    pub title: Option<String>,
    #[serde(rename = "Dates", default, deserialize_with = "blank_as_none::deserialize")]
    pub dates: Option<String>,
    #[serde(rename = "Days", default, deserialize_with = "blank_as_none::deserialize")]
    pub days: Option<String>,
    #[serde(rename = "Time", default, deserialize_with = "blank_as_none::deserialize")]
    pub time: Option<String>,
    #[serde(rename = "Size:", alias = "Size", deserialize_with = "lenient_int::deserialize")]
    pub size: i64,
    #[serde(rename = "Enrolled", alias = "Enrolled:", deserialize_with = "lenient_int::deserialize")]
    pub enrolled: i64,
    #[serde(rename = "Crds", alias = "Cr/Hr", default, deserialize_with = "blank_as_none::deserialize")]
    pub credits: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "blank_as_none::deserialize")]
    pub status: Option<String>,
    #[serde(rename = "Instructor", default, deserialize_with = "blank_as_none::deserialize")]
    pub instructor: Option<String>,
    #[serde(rename = "Delivery Method", default, deserialize_with = "blank_as_none::deserialize")]
    pub delivery_method: Option<String>,
    #[serde(rename = "Book Cost", default, deserialize_with = "blank_as_none::deserialize")]
    pub book_cost: Option<String>,
    #[serde(rename = "Loc", default, deserialize_with = "blank_as_none::deserialize")]
    pub loc: Option<String>,
    #[serde(rename = "LASC/WI", default, deserialize_with = "blank_as_none::deserialize")]
    pub lasc_wi: Option<String>,
    #[serde(rename = "18online", default, with = "title_bool")]
    pub online_18: bool,
    #[serde(rename = "Tuition -resident", default, deserialize_with = "blank_as_none::deserialize")]
    pub tuition_resident: Option<String>,
    #[serde(rename = "Tuition unit", default, deserialize_with = "blank_as_none::deserialize")]
    pub tuition_unit: Option<String>,
    #[serde(rename = "Tuition -nonresident", default, deserialize_with = "blank_as_none::deserialize")]
    pub tuition_nonresident: Option<String>,
    #[serde(rename = "Course level", default, deserialize_with = "blank_as_none::deserialize")]
    pub course_level: Option<String>,
    #[serde(rename = "Approximate Course Fees", default, deserialize_with = "blank_as_none::deserialize")]
    pub course_fees: Option<String>,
    pub timestamp: f64,
    #[serde(deserialize_with = "any_string::deserialize")]
    pub year_term: String,
}

impl From<ScrapedCourse> for EnrollmentRecord {
    fn from(c: ScrapedCourse) -> Self {
        Self {
            id: c.id,
            subj: c.subj,
            number: c.number,
            sec: c.sec,
            title: c.title,
            dates: c.dates,
            days: c.days,
            time: c.time,
            size: c.size,
            enrolled: c.enrolled,
            credits: c.credits,
            status: c.status,
            instructor: c.instructor,
            delivery_method: c.delivery_method,
            book_cost: c.book_cost,
            loc: c.loc,
            lasc_wi: c.lasc_wi,
            online_18: c.online_18,
            tuition_resident: c.tuition_resident,
            tuition_unit: c.tuition_unit,
            tuition_nonresident: c.tuition_nonresident,
            course_level: c.course_level,
            course_fees: c.course_fees,
            timestamp: c.timestamp,
            year_term: c.year_term,
        }
    }
}

/// Published table row, read by the web server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRow {
    #[serde(rename = "Term")]
    pub term: String,
    #[serde(rename = "Fiscal yrtr")]
    pub fiscal_yrtr: u32,
    #[serde(rename = "ID #", deserialize_with = "any_string::deserialize")]
    pub id: String,
    #[serde(rename = "Subj", deserialize_with = "any_string::deserialize")]
    pub subj: String,
    #[serde(rename = "#", deserialize_with = "any_string::deserialize")]
    pub number: String,
    #[serde(rename = "Sec", default, deserialize_with = "blank_as_none::deserialize")]
    pub sec: Option<String>,
    #[serde(rename = "Title", default, deserialize_with = "blank_as_none::deserialize")]
    pub title: Option<String>,
    #[serde(rename = "Credits", default, deserialize_with = "blank_as_none::deserialize")]
    pub credits: Option<String>,
    #[serde(rename = "Enrolled", deserialize_with = "lenient_int::deserialize")]
    pub enrolled: i64,
    #[serde(rename = "Size", deserialize_with = "lenient_int::deserialize")]
    pub size: i64,
    #[serde(rename = "Status", default, deserialize_with = "blank_as_none::deserialize")]
    pub status: Option<String>,
    #[serde(rename = "Dates", default, deserialize_with = "blank_as_none::deserialize")]
    pub dates: Option<String>,
    #[serde(rename = "Days", default, deserialize_with = "blank_as_none::deserialize")]
    pub days: Option<String>,
    #[serde(rename = "Time", default, deserialize_with = "blank_as_none::deserialize")]
    pub time: Option<String>,
    #[serde(rename = "Instructor", default, deserialize_with = "blank_as_none::deserialize")]
    pub instructor: Option<String>,
    #[serde(rename = "Delivery Method", deserialize_with = "any_string::deserialize")]
    pub delivery_method: String,
    #[serde(rename = "Loc", default, deserialize_with = "blank_as_none::deserialize")]
    pub loc: Option<String>,
    #[serde(rename = "LASC/WI", default, deserialize_with = "blank_as_none::deserialize")]
    pub lasc_wi: Option<String>,
    #[serde(rename = "18online", default, with = "title_bool")]
    pub online_18: bool,
    #[serde(rename = "Course level", default, deserialize_with = "blank_as_none::deserialize")]
    pub course_level: Option<String>,
    #[serde(rename = "College", default, deserialize_with = "blank_as_none::deserialize")]
    pub college: Option<String>,
    #[serde(rename = "Tuition unit", default, deserialize_with = "blank_as_none::deserialize")]
    pub tuition_unit: Option<String>,
    #[serde(rename = "Tuition Resident", default)]
    pub tuition_resident: f64,
    #[serde(rename = "Tuition Non-Resident", default)]
    pub tuition_nonresident: f64,
    #[serde(rename = "Approximate Course Fees", default)]
    pub course_fees: f64,
    #[serde(rename = "Book Cost", default)]
    pub book_cost: f64,
    #[serde(rename = "Last Updated")]
    pub last_updated: DateTime<Utc>,
}

impl CourseRow {
    /// LASC area labels (`1A`, `WI`, ...) this course satisfies.
    pub fn lasc_areas(&self) -> impl Iterator<Item = &str> {
        self.lasc_wi
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_writing_intensive(&self) -> bool {
        self.lasc_areas().any(|a| a.eq_ignore_ascii_case("WI"))
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("Cancelled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUMULATIVE_CSV: &str = "\
ID #,Subj,#,Sec,Title,Dates,Days,Time,Size:,Enrolled,Crds,Status,Instructor,Delivery Method,Book Cost,Loc,LASC/WI,18online,Tuition -resident,Tuition unit,Tuition -nonresident,Course level,Approximate Course Fees,timestamp,year_term
001234,PHYS,160,01,Physics I,08/25/2025 - 12/12/2025,MWF,09:00am - 09:50am,40,38,4,Open,Craig,,$0.00,Hagen 101,3L,False,$283.13,credit,$283.13,Undergraduate,$0.00,1756700000.5,20261
";

    #[test]
    fn test_reads_renamed_columns() {
        let mut reader = csv::Reader::from_reader(CUMULATIVE_CSV.as_bytes());
        let rows: Vec<EnrollmentRecord> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("parse");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, "001234");
        assert_eq!(row.enrolled, 38);
        assert_eq!(row.credits.as_deref(), Some("4"));
        assert_eq!(row.delivery_method, None);
        assert!(!row.online_18);
    }

    #[test]
    fn test_scrape_headers_are_accepted() {
        let scrape_csv = CUMULATIVE_CSV
            .replace(",Enrolled,Crds,", ",Enrolled:,Cr/Hr,")
            .replace("False", "True");
        let mut reader = csv::Reader::from_reader(scrape_csv.as_bytes());
        let rows: Vec<EnrollmentRecord> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("parse");
        assert_eq!(rows[0].enrolled, 38);
        assert!(rows[0].online_18);
    }

    #[test]
    fn test_bool_written_title_case() {
        let mut reader = csv::Reader::from_reader(CUMULATIVE_CSV.as_bytes());
        let row: EnrollmentRecord = reader.deserialize().next().unwrap().unwrap();
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&row).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(out.contains(",False,"));
        assert!(out.starts_with("ID #,Subj,#,Sec"));
    }
}
