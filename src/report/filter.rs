//! Path-driven filters: `/{subject}/{spec1}/{spec2}`

use std::fmt;

use crate::model::CourseRow;

/// First path segment of a report URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Courses in any LASC area other than only WI
    Lasc,
    /// Writing intensive courses
    Wi,
    /// Courses flagged 18 online
    Online18,
    All,
    /// A course rubric, uppercased
    Rubric(String),
}

impl Subject {
    pub fn parse(segment: &str) -> Self {
        match segment.to_ascii_lowercase().as_str() {
            "lasc" => Subject::Lasc,
            "wi" => Subject::Wi,
            "18online" => Subject::Online18,
            "all" => Subject::All,
            _ => Subject::Rubric(segment.to_ascii_uppercase()),
        }
    }

    pub fn matches(&self, row: &CourseRow) -> bool {
        match self {
            Subject::Lasc => row.lasc_wi.as_deref().is_some_and(|l| l != "WI"),
            Subject::Wi => row.is_writing_intensive(),
            Subject::Online18 => row.online_18,
            Subject::All => true,
            Subject::Rubric(rubric) => row.subj == *rubric,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Lasc => write!(f, "LASC"),
            Subject::Wi => write!(f, "WI"),
            Subject::Online18 => write!(f, "18 Online"),
            Subject::All => write!(f, "All"),
            Subject::Rubric(r) => write!(f, "{}", r),
        }
    }
}

/// A path specifier after the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spec {
    /// Five-digit year/term code
    Term(u32),
    /// Course rubric, uppercased
    Rubric(String),
    /// Course number, or LASC area when the subject is `lasc`
    Number(String),
}

impl Spec {
    /// Classify a raw path segment. `all` (and blanks) carry no filter.
    pub fn classify(raw: &str) -> Option<Self> {
        let spec = raw.trim().to_ascii_lowercase();
        if spec.is_empty() || spec == "all" {
            return None;
        }

        if spec.len() == 5
            && spec.bytes().all(|b| b.is_ascii_digit())
            && matches!(spec.as_bytes()[4], b'1' | b'3' | b'5')
            && let Ok(code) = spec.parse()
        {
            return Some(Spec::Term(code));
        }

        let leading_letters = spec.bytes().take_while(u8::is_ascii_alphabetic).count();
        if leading_letters >= 2 && spec != "lasc" && spec != "wi" {
            return Some(Spec::Rubric(spec.to_ascii_uppercase()));
        }

        Some(Spec::Number(spec))
    }

    fn matches(&self, subject: &Subject, row: &CourseRow) -> bool {
        match self {
            Spec::Term(code) => row.fiscal_yrtr == *code,
            Spec::Rubric(rubric) => row.subj == *rubric,
            Spec::Number(area) if *subject == Subject::Lasc => has_lasc_area(row, area),
            Spec::Number(number) => row.number.eq_ignore_ascii_case(number),
        }
    }
}

/// Whether `label` (e.g. `1A`) belongs to the requested area.
///
/// The exact label matches. A bare number also matches its lettered
/// sub-areas, so `1` selects `1A` and `1B` and `3` selects `3L`, while `1`
/// never selects `10` or `11`.
pub fn lasc_area_matches(label: &str, area: &str) -> bool {
    if label.eq_ignore_ascii_case(area) {
        return true;
    }
    if area.is_empty() || !area.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    label
        .strip_prefix(area)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphabetic()))
}

pub fn has_lasc_area(row: &CourseRow, area: &str) -> bool {
    row.lasc_areas().any(|label| lasc_area_matches(label, area))
}

/// Rows from the newest fiscal year/term present.
pub fn most_recent_term<'a>(rows: Vec<&'a CourseRow>) -> Vec<&'a CourseRow> {
    let Some(newest) = rows.iter().map(|r| r.fiscal_yrtr).max() else {
        return rows;
    };
    rows.into_iter().filter(|r| r.fiscal_yrtr == newest).collect()
}

/// Apply a subject and its specifiers.
///
/// Without specifiers only the newest term is shown, except for `all`.
pub fn filter_rows<'a>(rows: &'a [CourseRow], subject: &Subject, specs: &[Spec]) -> Vec<&'a CourseRow> {
    let selected: Vec<&CourseRow> = rows.iter().filter(|r| subject.matches(r)).collect();

    if specs.is_empty() {
        return if *subject == Subject::All {
            selected
        } else {
            most_recent_term(selected)
        };
    }

    specs.iter().fold(selected, |acc, spec| {
        acc.into_iter().filter(|r| spec.matches(subject, r)).collect()
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub(crate) fn row(yrtr: u32, subj: &str, number: &str, lasc: Option<&str>) -> CourseRow {
        CourseRow {
            term: String::new(),
            fiscal_yrtr: yrtr,
            id: format!("{}{}", subj, number),
            subj: subj.to_string(),
            number: number.to_string(),
            sec: Some("01".to_string()),
            title: Some("Course".to_string()),
            credits: Some("3".to_string()),
            enrolled: 20,
            size: 25,
            status: Some("Open".to_string()),
            dates: None,
            days: None,
            time: None,
            instructor: None,
            delivery_method: "On Campus".to_string(),
            loc: None,
            lasc_wi: lasc.map(str::to_string),
            online_18: false,
            course_level: Some("Undergraduate".to_string()),
            college: Some("CSHE".to_string()),
            tuition_unit: Some("credit".to_string()),
            tuition_resident: 100.0,
            tuition_nonresident: 100.0,
            course_fees: 0.0,
            book_cost: 0.0,
            last_updated: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn table() -> Vec<CourseRow> {
        vec![
            row(20263, "PHYS", "160", Some("3L")),
            row(20255, "PHYS", "160", Some("3L")),
            row(20263, "PHYS", "200", None),
            row(20263, "ENGL", "101", Some("1B,WI")),
            row(20263, "MATH", "127", Some("4")),
            row(20263, "HIST", "104", Some("10")),
            row(20263, "COMM", "100", Some("1A")),
            row(20263, "ENGL", "386", Some("WI")),
        ]
    }

    #[test]
    fn test_spec_classification() {
        assert_eq!(Spec::classify("20263"), Some(Spec::Term(20263)));
        assert_eq!(Spec::classify("phys"), Some(Spec::Rubric("PHYS".into())));
        assert_eq!(Spec::classify("160"), Some(Spec::Number("160".into())));
        assert_eq!(Spec::classify("1A"), Some(Spec::Number("1a".into())));
        assert_eq!(Spec::classify("wi"), Some(Spec::Number("wi".into())));
        assert_eq!(Spec::classify("20262"), Some(Spec::Number("20262".into())));
        assert_eq!(Spec::classify("ALL"), None);
    }

    #[test]
    fn test_subject_defaults_to_newest_term() {
        let rows = table();
        let out = filter_rows(&rows, &Subject::parse("phys"), &[]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.fiscal_yrtr == 20263));

        let all = filter_rows(&rows, &Subject::All, &[]);
        assert_eq!(all.len(), rows.len());
    }

    #[test]
    fn test_specs_narrow_in_turn() {
        let rows = table();
        let specs = vec![Spec::Term(20255), Spec::Number("160".into())];
        let out = filter_rows(&rows, &Subject::parse("PHYS"), &specs);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].fiscal_yrtr, 20255);

        let out = filter_rows(&rows, &Subject::All, &[Spec::Rubric("ENGL".into())]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_lasc_and_wi_subjects() {
        let rows = table();
        let lasc = filter_rows(&rows, &Subject::Lasc, &[Spec::Term(20263)]);
        // WI-only course is excluded, course without areas is excluded
        assert_eq!(lasc.len(), 5);

        let wi = filter_rows(&rows, &Subject::Wi, &[Spec::Term(20263)]);
        let ids: Vec<_> = wi.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ENGL101", "ENGL386"]);
    }

    #[test]
    fn test_lasc_area_spec_matches_whole_labels() {
        let rows = table();
        let ones = filter_rows(&rows, &Subject::Lasc, &[Spec::Number("1".into())]);
        let ids: Vec<_> = ones.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ENGL101", "COMM100"]);

        let three = filter_rows(&rows, &Subject::Lasc, &[Spec::Number("3".into())]);
        assert_eq!(three.len(), 2);

        let ten = filter_rows(&rows, &Subject::Lasc, &[Spec::Number("10".into())]);
        assert_eq!(ten.len(), 1);
    }

    #[test]
    fn test_lasc_area_matches() {
        assert!(lasc_area_matches("1A", "1"));
        assert!(lasc_area_matches("1A", "1a"));
        assert!(lasc_area_matches("3L", "3"));
        assert!(!lasc_area_matches("10", "1"));
        assert!(!lasc_area_matches("1A", "1b"));
        assert!(lasc_area_matches("WI", "wi"));
    }
}
