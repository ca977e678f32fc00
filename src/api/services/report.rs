use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, trace};

use crate::api::render::{self, escape_html, format_money};
use crate::api::state::AppState;
use crate::errors::{HeadcountError, Result};
use crate::model::CourseRow;
use crate::report::{Spec, Subject, Summary, filter_rows, write_cached_view};

/// Summary block plus course table for a non-empty selection.
///
/// The rows are also written to the download cache under a name derived
/// from `cache_path`.
pub fn report_fragment(
    state: &AppState,
    base_url: &str,
    heading: &str,
    cache_path: &str,
    rows: &[&CourseRow],
) -> Result<String> {
    let heading = escape_html(heading);
    let Some(summary) = Summary::from_rows(rows) else {
        return render::fragment("no_results.html", base_url, &[("heading", heading.as_str())]);
    };

    let filename = write_cached_view(&state.cache_dir, cache_path, summary.mean_timestamp, rows)?;
    debug!("{} courses for {}, cached as {}", rows.len(), cache_path, filename);

    let year_terms = escape_html(&summary.year_terms);
    let courses = summary.courses.to_string();
    let most_recent = summary
        .most_recent
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();
    let sch = summary.student_credit_hours.to_string();
    let filled = summary.seats.filled.to_string();
    let available = summary.seats.available.to_string();
    let empty = summary.seats.empty.to_string();
    let revenue = format_money(summary.tuition_revenue);
    let filename = escape_html(&urlencoding::encode(&filename));
    let table = render::course_table(rows, &state.urls);

    render::fragment(
        "course_info.html",
        base_url,
        &[
            ("heading", heading.as_str()),
            ("year_terms", year_terms.as_str()),
            ("courses", courses.as_str()),
            ("most_recent", most_recent.as_str()),
            ("sch", sch.as_str()),
            ("seats_filled", filled.as_str()),
            ("seats_available", available.as_str()),
            ("seats_empty", empty.as_str()),
            ("revenue", revenue.as_str()),
            ("filename", filename.as_str()),
            ("table", table.as_str()),
        ],
    )
}

/// Build a page on the blocking pool. Page building may reload the table
/// and writes the download cache.
pub(super) async fn blocking_page<F>(base_url: String, build: F) -> HttpResponse
where
    F: FnOnce(&str) -> Result<String> + Send + 'static,
{
    let url = base_url.clone();
    match web::block(move || build(&url)).await {
        Ok(Ok(body)) => render::html(StatusCode::OK, body),
        Ok(Err(e)) => render::error_response(&e, &base_url),
        Err(e) => render::error_response(&HeadcountError::file_operation(e.to_string()), &base_url),
    }
}

fn course_info(
    state: &AppState,
    base_url: &str,
    segment: &str,
    raw_specs: &[String],
    path: &str,
) -> Result<String> {
    let subject = Subject::parse(segment);
    let specs: Vec<Spec> = raw_specs.iter().filter_map(|s| Spec::classify(s)).collect();
    trace!("Report for {:?} with {:?}", subject, specs);

    let snapshot = state.data.snapshot();
    let rows = filter_rows(&snapshot.rows, &subject, &specs);

    let heading = std::iter::once(subject.to_string())
        .chain(raw_specs.iter().map(|s| s.to_ascii_uppercase()))
        .collect::<Vec<_>>()
        .join(" ");

    let content = report_fragment(state, base_url, &heading, path, &rows)?;
    render::layout(&heading, base_url, &content)
}

/// `GET /{subject}[/{spec1}[/{spec2}]]`
pub async fn handle_course_info(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let base_url = state.base_url(&req);
    let info = req.match_info();
    let segment = info.get("subject").unwrap_or("all").to_string();
    let raw_specs: Vec<String> = ["spec1", "spec2"]
        .iter()
        .filter_map(|k| info.get(k))
        .map(str::to_string)
        .collect();
    let path = req.path().to_string();

    blocking_page(base_url, move |base_url| {
        course_info(&state, base_url, &segment, &raw_specs, &path)
    })
    .await
}

/// Browsers ask for this on every page.
pub async fn handle_favicon() -> HttpResponse {
    HttpResponse::Ok().finish()
}
