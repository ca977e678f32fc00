use std::collections::BTreeSet;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Datelike;
use strum::IntoEnumIterator;
use tracing::trace;

use super::report::{blocking_page, report_fragment};
use crate::api::data::Snapshot;
use crate::api::render::{self, escape_html, options};
use crate::api::state::AppState;
use crate::errors::Result;
use crate::model::{FIRST_YEAR_TERM, Term, YearTerm};
use crate::report::CourseQuery;

/// Display names for the college codes the rubric map uses.
const COLLEGE_NAMES: &[(&str, &str)] = &[
    ("CBAC", "College of Business, Analytics, & Communication"),
    ("COAH", "College of Arts and Humanities"),
    ("CSHE", "College of Science, Health, & the Environment"),
    ("CEHS", "College of Education and Human Services"),
];

/// `GET /`
pub async fn handle_index(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    trace!("Serving instructions page");
    let base_url = state.base_url(&req);
    match render::page("instructions.html", "Instructions", &base_url, &[]) {
        Ok(body) => render::html(StatusCode::OK, body),
        Err(e) => render::error_response(&e, &base_url),
    }
}

fn college_choices(snapshot: &Snapshot) -> Vec<(String, String)> {
    let codes: BTreeSet<&str> = snapshot
        .rows
        .iter()
        .filter_map(|r| r.college.as_deref())
        .collect();
    codes
        .into_iter()
        .map(|code| {
            let name = COLLEGE_NAMES
                .iter()
                .find(|(c, _)| *c == code)
                .map_or(code, |(_, name)| *name);
            (code.to_string(), name.to_string())
        })
        .collect()
}

fn subject_choices(snapshot: &Snapshot) -> Vec<(String, String)> {
    let subjects: BTreeSet<&str> = snapshot.rows.iter().map(|r| r.subj.as_str()).collect();
    subjects
        .into_iter()
        .map(|s| (s.to_string(), s.to_string()))
        .collect()
}

/// Calendar years from the first term on record to the newest term loaded,
/// newest first.
fn year_choices(snapshot: &Snapshot) -> Vec<(String, String)> {
    let newest = snapshot
        .newest_term()
        .and_then(|s| YearTerm::new(s.year_term).ok())
        .map(YearTerm::calendar_year)
        .unwrap_or_else(|| chrono::Local::now().year() as u32);
    (FIRST_YEAR_TERM.calendar_year()..=newest)
        .rev()
        .map(|y| (y.to_string(), y.to_string()))
        .collect()
}

fn search_page(state: &AppState, base_url: &str, query_string: &str) -> Result<String> {
    let snapshot = state.data.snapshot();

    let (query, parse_error) = match web::Query::<CourseQuery>::from_query(query_string) {
        Ok(q) => (q.into_inner(), None),
        Err(e) => (CourseQuery::default(), Some(e.to_string())),
    };

    let mut errors = String::new();
    let mut results = String::new();
    let problem = parse_error.or_else(|| query.validate().err().map(|e| e.message().to_string()));
    if let Some(problem) = problem {
        errors = format!(
            "<div class=\"alert alert-warning\">{}</div>",
            escape_html(&problem)
        );
    } else if query.has_filters() {
        let rows = query.apply(&snapshot.rows);
        results = report_fragment(state, base_url, "Search results", &query.cache_key(), &rows)?;
    }

    let lasc: Vec<(String, String)> = (1..=10).map(|i| (i.to_string(), i.to_string())).collect();
    let semesters: Vec<(String, String)> = Term::iter()
        .map(|t| (t.to_string(), t.to_string()))
        .collect();
    let semester = query.semester.map(|t| t.to_string());
    let year = query.year.map(|y| y.to_string());

    let college_options = options(
        "Select a College",
        &college_choices(&snapshot),
        query.college.as_deref(),
    );
    let subject_options = options(
        "Select a Subject",
        &subject_choices(&snapshot),
        query.subject.as_deref().map(str::to_ascii_uppercase).as_deref(),
    );
    let lasc_options = options("Select LASC Area", &lasc, query.lasc_area.as_deref());
    let semester_options = options("All", &semesters, semester.as_deref());
    let year_options = options("All Years", &year_choices(&snapshot), year.as_deref());
    let class_code = escape_html(query.class_code.as_deref().unwrap_or(""));
    let checked = |on: bool| if on { " checked" } else { "" };

    let content = render::fragment(
        "search.html",
        base_url,
        &[
            ("wi_checked", checked(query.writing_intensive)),
            ("online_checked", checked(query.online_18)),
            ("college_options", college_options.as_str()),
            ("subject_options", subject_options.as_str()),
            ("class_code", class_code.as_str()),
            ("lasc_options", lasc_options.as_str()),
            ("semester_options", semester_options.as_str()),
            ("year_options", year_options.as_str()),
            ("errors", errors.as_str()),
            ("results", results.as_str()),
        ],
    )?;
    render::layout("Search", base_url, &content)
}

/// `GET /search`
pub async fn handle_search(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let base_url = state.base_url(&req);
    let query_string = req.query_string().to_string();
    blocking_page(base_url, move |base_url| {
        search_page(&state, base_url, &query_string)
    })
    .await
}
