//! Parsers for the subject selector and the course result tables

use std::sync::LazyLock;

use regex::Regex;

use super::html::{self, Element};
use crate::errors::{HeadcountError, Result};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Which page a result table comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// `advancedSubmit.html`, table `#resultsTable`
    Search,
    /// `detail.html`, table `.myplantable`
    Detail,
}

/// Header row plus text cells of a results table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell of `row` under `header`; missing and blank cells are `None`.
    pub fn cell<'a>(&'a self, row: &'a [String], header: &str) -> Option<&'a str> {
        self.column_index(header)
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Strip everything that makes scraped cells hard to compare: non-ASCII
/// characters go, line breaks and tabs are removed outright, runs of
/// whitespace collapse to one space, and the ends are trimmed.
pub fn clean_text(item: &str) -> String {
    let ascii: String = item
        .chars()
        .filter(|c| c.is_ascii() && !matches!(c, '\n' | '\r' | '\t'))
        .collect();
    WHITESPACE.replace_all(&ascii, " ").trim().to_string()
}

/// Subjects (course rubrics) offered in `year_term`, read from the
/// `<select id="subject">` on the landing page. Each option carries the
/// year/term codes it applies to as CSS classes.
pub fn subject_list(page: &str, year_term: &str) -> Result<Vec<String>> {
    let select = html::find_by_attr(page, "select", "id", "subject")
        .ok_or_else(|| HeadcountError::scrape("Subject selector not found on search page"))?;

    Ok(select
        .find_all("option")
        .iter()
        .filter(|opt| opt.has_class(year_term))
        .filter_map(|opt| opt.attr("value"))
        .filter(|v| !v.is_empty())
        .collect())
}

/// Locations are only present as the alt text of a little map icon, one
/// room per line after a campus line.
pub fn location(cell: &Element<'_>) -> String {
    let Some(alt) = cell.find_first("img").and_then(|img| img.attr("alt")) else {
        return String::new();
    };
    alt.lines()
        .filter(|l| l.starts_with("Building"))
        .map(|l| l.split_once("Building/Room: ").map_or("", |(_, room)| room))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scrape the results table of a search or detail page.
///
/// The first cell of each row holds action buttons and is skipped; the last
/// cell is the location icon. A page without rows yields an empty table
/// (subjects with no courses are still listed by the site).
pub fn results_table(page: &str, kind: PageKind) -> Result<RawTable> {
    let table = match kind {
        PageKind::Search => html::find_by_attr(page, "table", "id", "resultsTable"),
        PageKind::Detail => html::find_by_class(page, "table", "myplantable"),
    }
    .ok_or_else(|| HeadcountError::scrape(format!("No results table on {:?} page", kind)))?;

    let mut headers: Vec<String> = table
        .find_all("th")
        .iter()
        .map(|h| clean_text(&h.text()))
        .collect();

    let mut rows = Vec::new();
    for body in table.find_all("tbody") {
        for tr in body.find_all("tr") {
            let cells = tr.find_all("td");
            if cells.len() < 2 {
                continue;
            }
            let last = cells.len() - 1;
            let mut row: Vec<String> = cells[1..last]
                .iter()
                .map(|c| clean_text(&c.text()))
                .collect();
            row.push(location(&cells[last]));
            rows.push(row);
        }
    }

    // Some page versions include the button column's header, some don't.
    if let Some(width) = rows.first().map(Vec::len)
        && headers.len() == width + 1
    {
        headers.remove(0);
    }

    Ok(RawTable { headers, rows })
}
