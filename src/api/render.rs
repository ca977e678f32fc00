//! HTML rendering
//!
//! Pages are embedded templates with `{{name}}` placeholders. Every value
//! that came from a request or the data file goes through [`escape_html`]
//! before it is placed into a page.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use chrono::Local;
use rust_embed::Embed;
use tracing::error;

use crate::errors::{HeadcountError, Result};
use crate::model::CourseRow;
use crate::scrape::Urls;

#[derive(Embed)]
#[folder = "templates/"]
struct Templates;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace `{{key}}` placeholders in a single pass, so substituted values
/// are never scanned again. Unknown keys are left as is.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.iter().find(|(k, _)| *k == key) {
                    Some((_, v)) => out.push_str(v),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn template(name: &str) -> Result<String> {
    Templates::get(name)
        .map(|file| String::from_utf8_lossy(&file.data).into_owned())
        .ok_or_else(|| HeadcountError::not_found(format!("Template {} is missing", name)))
}

/// Render one template without the site layout.
pub fn fragment(name: &str, base_url: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut all = vars.to_vec();
    all.push(("base_url", base_url));
    Ok(fill(&template(name)?, &all))
}

/// Wrap already rendered content in the site layout.
pub fn layout(title: &str, base_url: &str, content: &str) -> Result<String> {
    let title = escape_html(title);
    Ok(fill(
        &template("layout.html")?,
        &[
            ("title", title.as_str()),
            ("base_url", base_url),
            ("content", content),
            ("version", env!("CARGO_PKG_VERSION")),
        ],
    ))
}

/// Render `name` with `vars`, then wrap it in the site layout.
pub fn page(name: &str, title: &str, base_url: &str, vars: &[(&str, &str)]) -> Result<String> {
    layout(title, base_url, &fragment(name, base_url, vars)?)
}

pub fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Map an error to a page. Internal details stay in the log.
pub fn error_response(err: &HeadcountError, base_url: &str) -> HttpResponse {
    let (status, message) = match err {
        HeadcountError::NotFound(_) => (StatusCode::NOT_FOUND, "Page not found.".to_string()),
        HeadcountError::Validation(msg) => (StatusCode::BAD_REQUEST, escape_html(msg)),
        other => {
            error!("Request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong while building this page.".to_string(),
            )
        }
    };
    let heading = status.canonical_reason().unwrap_or("Error");
    match page(
        "error.html",
        heading,
        base_url,
        &[("heading", heading), ("message", message.as_str())],
    ) {
        Ok(body) => html(status, body),
        Err(_) => HttpResponse::build(status).body(message),
    }
}

/// `<option>` list; the first entry is the blank "no choice" option.
pub fn options(placeholder: &str, choices: &[(String, String)], selected: Option<&str>) -> String {
    let mut out = format!("<option value=\"\">{}</option>", escape_html(placeholder));
    for (value, label) in choices {
        let sel = if selected == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            escape_html(value),
            sel,
            escape_html(label)
        ));
    }
    out
}

/// `1234567.891` -> `$1,234,567.89`
pub fn format_money(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (sign, cents) = if cents < 0 { ("-", -cents) } else { ("", cents) };
    let dollars = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

fn opt(value: &Option<String>) -> String {
    value.as_deref().map(escape_html).unwrap_or_default()
}

const COLUMNS: &[&str] = &[
    "Term",
    "ID #",
    "Subj",
    "#",
    "Sec",
    "Title",
    "Credits",
    "Enrolled",
    "Size",
    "Status",
    "Dates",
    "Days",
    "Time",
    "Instructor",
    "Delivery Method",
    "Loc",
    "LASC/WI",
    "18online",
    "College",
    "Last Updated",
];

/// Course table; each id links to the course's page on the search site.
pub fn course_table(rows: &[&CourseRow], urls: &Urls) -> String {
    let mut out = String::from(
        "<div class=\"table-responsive\"><table class=\"table table-sm table-striped table-hover\"><thead><tr>",
    );
    for col in COLUMNS {
        out.push_str(&format!("<th>{}</th>", escape_html(col)));
    }
    out.push_str("</tr></thead><tbody>");

    for r in rows {
        let detail = urls.course_detail(&r.id, &r.fiscal_yrtr.to_string());
        let updated = r.last_updated.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        let cells = [
            escape_html(&r.term),
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
                escape_html(&detail),
                escape_html(&r.id)
            ),
            escape_html(&r.subj),
            escape_html(&r.number),
            opt(&r.sec),
            opt(&r.title),
            opt(&r.credits),
            r.enrolled.to_string(),
            r.size.to_string(),
            opt(&r.status),
            opt(&r.dates),
            opt(&r.days),
            opt(&r.time),
            opt(&r.instructor),
            escape_html(&r.delivery_method),
            opt(&r.loc),
            opt(&r.lasc_wi),
            if r.online_18 { "Yes" } else { "" }.to_string(),
            opt(&r.college),
            updated.to_string(),
        ];
        out.push_str("<tr>");
        for (i, cell) in cells.iter().enumerate() {
            if COLUMNS[i] == "Loc" {
                out.push_str(&format!("<td class=\"loc\">{}</td>", cell));
            } else {
                out.push_str(&format!("<td>{}</td>", cell));
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></div>");
    out
}
