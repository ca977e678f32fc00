//! Fiscal year/term codes
//!
//! The course search identifies a term by a five digit `YYYYT` code where
//! `YYYY` is the fiscal year and `T` is 1 (Summer), 3 (Fall) or 5 (Spring).
//! Fall and Summer belong to the fiscal year that starts with them, so
//! Fall 2024 is `20253` while Spring 2025 is `20255`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

use crate::errors::HeadcountError;

/// First term with data on record (Fall 2014).
pub const FIRST_YEAR_TERM: YearTerm = YearTerm(20153);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, AsRefStr,
)]
pub enum Term {
    Summer,
    Fall,
    Spring,
}

impl Term {
    pub fn code(self) -> u32 {
        match self {
            Term::Summer => 1,
            Term::Fall => 3,
            Term::Spring => 5,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Term::Summer),
            3 => Some(Term::Fall),
            5 => Some(Term::Spring),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for Term {
    type Err = HeadcountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summer" => Ok(Term::Summer),
            "fall" => Ok(Term::Fall),
            "spring" => Ok(Term::Spring),
            other => Err(HeadcountError::validation(format!(
                "Invalid semester: '{}'. Valid: Fall, Spring, Summer",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct YearTerm(u32);

impl YearTerm {
    pub fn new(code: u32) -> Result<Self, HeadcountError> {
        if !(10_000..100_000).contains(&code) || Term::from_code(code % 10).is_none() {
            return Err(HeadcountError::validation(format!(
                "Invalid year/term code '{}': expected YYYYT with T in 1, 3, 5",
                code
            )));
        }
        Ok(Self(code))
    }

    /// Build the code for a term in a calendar year. Years that do not fit
    /// a four digit fiscal year are rejected.
    pub fn from_calendar(term: Term, year: u32) -> Result<Self, HeadcountError> {
        let fiscal_year = match term {
            Term::Spring => Some(year),
            Term::Summer | Term::Fall => year.checked_add(1),
        };
        fiscal_year
            .and_then(|y| y.checked_mul(10))
            .and_then(|y| y.checked_add(term.code()))
            .ok_or_else(|| HeadcountError::validation(format!("Invalid year: {}", year)))
            .and_then(Self::new)
    }

    pub fn code(self) -> u32 {
        self.0
    }

    pub fn fiscal_year(self) -> u32 {
        self.0 / 10
    }

    pub fn term(self) -> Term {
        // 构造时已校验末位
        Term::from_code(self.0 % 10).unwrap_or(Term::Fall)
    }

    pub fn calendar_year(self) -> u32 {
        match self.term() {
            Term::Spring => self.fiscal_year(),
            Term::Summer | Term::Fall => self.fiscal_year() - 1,
        }
    }

    /// Human readable name, e.g. "Fall 2024".
    pub fn name(self) -> String {
        format!("{} {}", self.term(), self.calendar_year())
    }
}

impl fmt::Display for YearTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for YearTerm {
    type Err = HeadcountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 5 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HeadcountError::validation(format!(
                "Invalid year/term code '{}': expected five digits like 20253",
                s
            )));
        }
        let code: u32 = s
            .parse()
            .map_err(|_| HeadcountError::validation(format!("Invalid year/term code '{}'", s)))?;
        Self::new(code)
    }
}

impl TryFrom<u32> for YearTerm {
    type Error = HeadcountError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<YearTerm> for u32 {
    fn from(value: YearTerm) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!("20253".parse::<YearTerm>().unwrap().name(), "Fall 2024");
        assert_eq!("20255".parse::<YearTerm>().unwrap().name(), "Spring 2025");
        assert_eq!("20251".parse::<YearTerm>().unwrap().name(), "Summer 2024");
    }

    #[test]
    fn test_rejects_bad_codes() {
        assert!("20252".parse::<YearTerm>().is_err());
        assert!("2025".parse::<YearTerm>().is_err());
        assert!("abcd5".parse::<YearTerm>().is_err());
    }

    #[test]
    fn test_from_calendar() {
        assert_eq!(YearTerm::from_calendar(Term::Fall, 2014).unwrap(), FIRST_YEAR_TERM);
        assert_eq!(YearTerm::from_calendar(Term::Spring, 2014).unwrap().code(), 20145);
        assert_eq!(YearTerm::from_calendar(Term::Summer, 2024).unwrap().code(), 20251);
    }

    #[test]
    fn test_from_calendar_rejects_out_of_range_years() {
        assert!(YearTerm::from_calendar(Term::Fall, 999_999_999).is_err());
        assert!(YearTerm::from_calendar(Term::Spring, u32::MAX).is_err());
        assert!(YearTerm::from_calendar(Term::Fall, 9999).is_err());
        assert!(YearTerm::from_calendar(Term::Spring, 9999).is_ok());
        assert!(YearTerm::from_calendar(Term::Spring, 999).is_err());
    }

    #[test]
    fn test_chronological_order() {
        let summer = YearTerm::from_calendar(Term::Summer, 2024).unwrap();
        let fall = YearTerm::from_calendar(Term::Fall, 2024).unwrap();
        let spring = YearTerm::from_calendar(Term::Spring, 2025).unwrap();
        assert!(summer < fall && fall < spring);
    }
}
