//! Search form query (`/search?...`)

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::filter::{has_lasc_area, most_recent_term};
use crate::errors::{HeadcountError, Result};
use crate::model::{CourseRow, FIRST_YEAR_TERM, Term, YearTerm};

/// HTML checkboxes send `y`/`on` when ticked and nothing otherwise.
fn checkbox<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.is_some_and(|v| {
        !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "off" | "n"
        )
    }))
}

/// Select boxes send an empty string for "no choice".
fn blank_as_none<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseQuery {
    #[serde(deserialize_with = "checkbox")]
    pub writing_intensive: bool,
    #[serde(deserialize_with = "checkbox")]
    pub online_18: bool,
    #[serde(deserialize_with = "blank_as_none")]
    pub college: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub class_code: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub lasc_area: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub semester: Option<Term>,
    /// Calendar year
    #[serde(deserialize_with = "blank_as_none")]
    pub year: Option<u32>,
}

impl CourseQuery {
    /// Year/term code when both semester and year are chosen.
    pub fn year_term(&self) -> Option<YearTerm> {
        YearTerm::from_calendar(self.semester?, self.year?).ok()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(code) = &self.class_code {
            if !(3..=4).contains(&code.chars().count()) {
                return Err(HeadcountError::validation("Class code must be 3-4 characters"));
            }
            if self.subject.is_none() {
                return Err(HeadcountError::validation(
                    "Select a subject when using class codes",
                ));
            }
        }
        if let (Some(term), Some(year)) = (self.semester, self.year) {
            let yt = YearTerm::from_calendar(term, year)
                .map_err(|_| HeadcountError::validation(format!("{} is not a valid year.", year)))?;
            if yt < FIRST_YEAR_TERM {
                return Err(HeadcountError::validation(format!(
                    "{} {} data is not available. Data starts from {}.",
                    term,
                    year,
                    FIRST_YEAR_TERM.name()
                )));
            }
        }
        Ok(())
    }

    pub fn has_filters(&self) -> bool {
        self.writing_intensive
            || self.online_18
            || self.college.is_some()
            || self.subject.is_some()
            || self.class_code.is_some()
            || self.lasc_area.is_some()
            || self.semester.is_some()
            || self.year.is_some()
    }

    pub fn is_special_mode(&self) -> bool {
        self.writing_intensive || self.online_18
    }

    /// Pseudo request path naming this search, used for the CSV snapshot.
    pub fn cache_key(&self) -> String {
        let mut parts = vec!["search".to_string()];
        if self.writing_intensive {
            parts.push("wi".to_string());
        }
        if self.online_18 {
            parts.push("18online".to_string());
        }
        parts.extend(self.college.iter().cloned());
        parts.extend(self.subject.iter().map(|s| s.to_ascii_lowercase()));
        parts.extend(self.class_code.iter().cloned());
        parts.extend(self.lasc_area.iter().map(|a| format!("lasc{}", a)));
        parts.extend(self.semester.iter().map(|t| t.to_string().to_ascii_lowercase()));
        parts.extend(self.year.iter().map(u32::to_string));
        format!("/{}", parts.join("/"))
    }

    fn matches(&self, row: &CourseRow) -> bool {
        if self.writing_intensive && !row.is_writing_intensive() {
            return false;
        }
        if self.online_18 && !row.online_18 {
            return false;
        }
        if let Some(college) = &self.college
            && row.college.as_deref() != Some(college.as_str())
        {
            return false;
        }
        if let Some(subject) = &self.subject
            && !row.subj.eq_ignore_ascii_case(subject)
        {
            return false;
        }
        if let Some(code) = &self.class_code
            && !row.number.eq_ignore_ascii_case(code.trim())
        {
            return false;
        }
        if let Some(area) = &self.lasc_area
            && !has_lasc_area(row, area)
        {
            return false;
        }
        match (self.semester, self.year) {
            (Some(term), Some(year)) => YearTerm::from_calendar(term, year)
                .is_ok_and(|yt| row.fiscal_yrtr == yt.code()),
            (Some(term), None) => row.fiscal_yrtr % 10 == term.code(),
            (None, Some(year)) => YearTerm::new(row.fiscal_yrtr).is_ok_and(|yt| yt.calendar_year() == year),
            (None, None) => true,
        }
    }

    /// Rows matching every populated field. Without a semester or a year
    /// only the newest term is kept.
    pub fn apply<'a>(&self, rows: &'a [CourseRow]) -> Vec<&'a CourseRow> {
        let selected: Vec<&CourseRow> = rows.iter().filter(|r| self.matches(r)).collect();
        if self.semester.is_none() && self.year.is_none() {
            most_recent_term(selected)
        } else {
            selected
        }
    }
}
