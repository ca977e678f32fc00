//! Course detail page: enrollment, capacity, tuition and LASC areas

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::html;
use crate::errors::{HeadcountError, Result};

/// Full names of the LASC (general education) areas as they appear on the
/// detail page. The label is the part before the first `-`.
pub const LASC_AREAS: &[&str] = &[
    "10-People and the Environment",
    "11-Information Literacy",
    "1A-Oral Communication",
    "1B-Written Communication",
    "2-Critical Thinking",
    "3-Natural Sciences",
    "3L-Natural Sciences with Lab",
    "4-Math/Logical Reasoning",
    "5-History and the Social Sciences",
    "6-Humanities and Fine Arts",
    "7-Human Diversity",
    "8-Global Perspective",
    "9-Ethical and Civic Responsibility",
    "WI-Writing Intensive",
];

// "Enrolled:" and "Size:" keep their colons: plain "Size" matches an
// instructor named Sizer.
const ENROLLED_KEY: &str = "Enrolled:";
const SIZE_KEY: &str = "Size:";

const PER_CREDIT_MARKER: &str = "Tuition per credit -resident";
/// (per-course key, per-credit key)
const TUITION_KEYS: [(&str, &str); 3] = [
    ("Tuition -resident", "Tuition per credit -resident"),
    ("Tuition -nonresident", "Tuition per credit -nonresident"),
    ("Approximate Course Fees", "Approximate Course Fees"),
];

static COURSE_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Course Level\s+(\w+)\s+(?:Description|General/Liberal|Lectures/Labs|Corequisites|Add To Wait List|Minnesota Transfer Curriculum Goal|Non-Course Prerequisites)",
    )
    .expect("Invalid course level regex")
});

/// Label of a LASC area, `"3L-Natural Sciences with Lab"` -> `"3L"`.
pub fn lasc_area_label(full_name: &str) -> &str {
    full_name.split('-').next().unwrap_or(full_name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetail {
    pub enrolled: i64,
    pub size: i64,
    pub tuition_resident: String,
    pub tuition_nonresident: String,
    pub course_fees: String,
    /// `credit` or `course`
    pub tuition_unit: String,
    /// Comma-joined LASC area labels
    pub lasc_wi: String,
    pub online_18: bool,
    pub course_level: String,
}

impl CourseDetail {
    /// Placeholder for a course the site reported a system error on.
    pub fn failed() -> Self {
        Self {
            enrolled: -1,
            size: -1,
            tuition_resident: String::new(),
            tuition_nonresident: String::new(),
            course_fees: String::new(),
            tuition_unit: String::new(),
            lasc_wi: String::new(),
            online_18: false,
            course_level: String::new(),
        }
    }
}

fn size_pattern(key: &str) -> Regex {
    Regex::new(&format!(r"{}\s*(-?\d+)", regex::escape(key))).expect("Invalid size regex")
}

fn money_pattern(key: &str) -> Regex {
    Regex::new(&format!(r"{}\s*:?\s*(\$[\d,]+(?:\.\d+)?|n/a)", regex::escape(key)))
        .expect("Invalid tuition regex")
}

static ENROLLED: LazyLock<Regex> = LazyLock::new(|| size_pattern(ENROLLED_KEY));
static SIZE: LazyLock<Regex> = LazyLock::new(|| size_pattern(SIZE_KEY));

/// Compiled `TUITION_KEYS`, same order.
static TUITION: LazyLock<[(Regex, Regex); 3]> = LazyLock::new(|| {
    TUITION_KEYS.map(|(per_course, per_credit)| (money_pattern(per_course), money_pattern(per_credit)))
});

/// Integer captured by a size pattern.
fn size_value(text: &str, re: &Regex) -> Option<i64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Dollar amount (or `n/a`) captured by a money pattern; empty when the
/// key is absent.
fn money_value(text: &str, re: &Regex) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Parse a course detail page fetched from `url`.
pub fn course_detail(page: &str, url: &str) -> Result<CourseDetail> {
    if page.contains("System Error") {
        warn!("System error page for {}", url);
        return Ok(CourseDetail::failed());
    }

    let per_credit = page.contains(PER_CREDIT_MARKER);
    // Tags become spaces so adjacent cells don't run together.
    let text = html::decode_entities(&html::strip_tags(page, " "));

    let enrolled = size_value(&text, &ENROLLED).ok_or_else(|| {
        HeadcountError::scrape(format!("No \"{}\" value in {}", ENROLLED_KEY, url))
    })?;
    let size = size_value(&text, &SIZE)
        .ok_or_else(|| HeadcountError::scrape(format!("No \"{}\" value in {}", SIZE_KEY, url)))?;

    let [resident, nonresident, fees] = TUITION.each_ref().map(|(per_course, per_credit_re)| {
        money_value(&text, if per_credit { per_credit_re } else { per_course })
    });

    let lasc_wi = LASC_AREAS
        .iter()
        .filter(|area| page.contains(*area))
        .map(|area| lasc_area_label(area))
        .collect::<Vec<_>>()
        .join(",");

    let course_level = COURSE_LEVEL
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            HeadcountError::scrape(format!("Failed to find \"Course Level\" in URL {}", url))
        })?;

    Ok(CourseDetail {
        enrolled,
        size,
        tuition_resident: resident,
        tuition_nonresident: nonresident,
        course_fees: fees,
        tuition_unit: if per_credit { "credit" } else { "course" }.to_string(),
        lasc_wi,
        online_18: page.contains("18 On-Line"),
        course_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.edu/detail.html?courseid=001234";

    const DETAIL: &str = r#"
<div class="detail">
  <table class="meta"><tr><td><strong>Enrolled:</strong> 38</td><td><strong>Size:</strong> 40</td></tr></table>
  <div>Tuition per credit -resident: $283.13</div>
  <div>Tuition per credit -nonresident: $283.13</div>
  <div>Approximate Course Fees: $1,020.50</div>
  <div>Instructor: Sizer, Pat</div>
  <h3>Course Level</h3>
  Undergraduate
  <h3>Description</h3>
  <ul>
    <li>3L-Natural Sciences with Lab</li>
    <li>WI-Writing Intensive</li>
  </ul>
  <p>18 On-Line</p>
</div>"#;

    #[test]
    fn test_parses_detail_page() {
        let detail = course_detail(DETAIL, URL).unwrap();
        assert_eq!(detail.enrolled, 38);
        assert_eq!(detail.size, 40);
        assert_eq!(detail.tuition_unit, "credit");
        assert_eq!(detail.tuition_resident, "$283.13");
        assert_eq!(detail.tuition_nonresident, "$283.13");
        assert_eq!(detail.course_fees, "$1,020.50");
        assert_eq!(detail.lasc_wi, "3L,WI");
        assert!(detail.online_18);
        assert_eq!(detail.course_level, "Undergraduate");
    }

    #[test]
    fn test_per_course_tuition() {
        let page = DETAIL
            .replace("Tuition per credit -resident: $283.13", "Tuition -resident: $849.39")
            .replace("Tuition per credit -nonresident: $283.13", "Tuition -nonresident: n/a");
        let detail = course_detail(&page, URL).unwrap();
        assert_eq!(detail.tuition_unit, "course");
        assert_eq!(detail.tuition_resident, "$849.39");
        assert_eq!(detail.tuition_nonresident, "n/a");
    }

    #[test]
    fn test_system_error_page() {
        let detail = course_detail("<h1>System Error</h1>", URL).unwrap();
        assert_eq!(detail, CourseDetail::failed());
        assert_eq!(detail.size, -1);
    }

    #[test]
    fn test_missing_course_level_names_url() {
        let page = DETAIL.replace("Course Level", "Level");
        let err = course_detail(&page, URL).unwrap_err();
        assert!(err.message().contains(URL));
    }

    #[test]
    fn test_missing_size_is_error() {
        let page = DETAIL.replace("Size:", "Capacity");
        assert!(course_detail(&page, URL).is_err());
    }

    #[test]
    fn test_lasc_label() {
        assert_eq!(lasc_area_label("1A-Oral Communication"), "1A");
        assert_eq!(lasc_area_label("WI-Writing Intensive"), "WI");
    }
}
