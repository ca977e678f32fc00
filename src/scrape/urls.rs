//! Course search URLs
//!
//! The search site wants the campus id zero-padded to three digits in
//! `campusid` and to four digits in the `rcid` style parameters.

use crate::config::ScraperConfig;

#[derive(Debug, Clone)]
pub struct Urls {
    base: String,
    campus_id: u32,
    result_number: u32,
}

impl Urls {
    pub fn new(base_url: &str, campus_id: u32, result_number: u32) -> Self {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base,
            campus_id,
            result_number,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(&config.base_url, config.campus_id, config.result_number)
    }

    pub fn campus_id(&self) -> u32 {
        self.campus_id
    }

    /// Landing page carrying the subject selector for every term.
    pub fn basic(&self) -> String {
        format!("{}basic.html?campusid={:03}", self.base, self.campus_id)
    }

    /// All sections of one subject in one term.
    pub fn subject_search(&self, year_term: &str, subject: &str) -> String {
        format!(
            "{base}advancedSubmit.html?campusid={c:03}&searchrcid={c:04}&searchcampusid={c:03}\
             &yrtr={yt}&subject={subj}&courseNumber=&courseId=&openValue=ALL&showAdvanced=\
             &delivery=ALL&starttime=&endtime=&mntransfer=&gened=&credittype=ALL&credits=\
             &instructor=&keyword=&begindate=&site=&resultNumber={n}",
            base = self.base,
            c = self.campus_id,
            yt = urlencoding::encode(year_term),
            subj = urlencoding::encode(subject),
            n = self.result_number,
        )
    }

    /// Detail page of one section.
    pub fn course_detail(&self, course_id: &str, year_term: &str) -> String {
        format!(
            "{base}detail.html?campusid={c:03}&courseid={id}&yrtr={yt}&rcid={c:04}\
             &localrcid={c:04}&partnered=false&parent=search",
            base = self.base,
            c = self.campus_id,
            id = urlencoding::encode(course_id),
            yt = urlencoding::encode(year_term),
        )
    }
}
