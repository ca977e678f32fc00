//! Merging a fresh scrape into the cumulative table

use std::collections::{HashMap, HashSet};

use crate::model::EnrollmentRecord;

/// Money columns that must always carry a dollar value.
const MONEY_PLACEHOLDER: &str = "$0.00";

/// Identity of a row across scrapes.
pub fn index_key(year_term: &str, id: &str, subj: &str, number: &str) -> String {
    format!("{}{}{}{}", year_term, id, subj, number)
}

fn key_of(r: &EnrollmentRecord) -> String {
    index_key(&r.year_term, &r.id, &r.subj, &r.number)
}

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub rows: Vec<EnrollmentRecord>,
    pub updated: usize,
    pub appended: usize,
}

/// Rows of `new` replace rows of `current` with the same key.
///
/// Result order: untouched `current` rows in their original order, then the
/// replacing rows, then rows that were not present before (both in `new`
/// order).
pub fn merge(current: Vec<EnrollmentRecord>, new: Vec<EnrollmentRecord>) -> MergeOutcome {
    let current_keys: HashSet<String> = current.iter().map(key_of).collect();

    let mut updated = Vec::new();
    let mut appended = Vec::new();
    for row in new {
        if current_keys.contains(&key_of(&row)) {
            updated.push(row);
        } else {
            appended.push(row);
        }
    }

    let replaced: HashSet<String> = updated.iter().map(key_of).collect();
    let (n_updated, n_appended) = (updated.len(), appended.len());

    let mut rows: Vec<EnrollmentRecord> = current
        .into_iter()
        .filter(|r| !replaced.contains(&key_of(r)))
        .collect();
    rows.extend(updated);
    rows.extend(appended);

    MergeOutcome {
        rows,
        updated: n_updated,
        appended: n_appended,
    }
}

fn money_or_zero(value: &mut Option<String>) {
    let blank = value
        .as_deref()
        .is_none_or(|v| v.trim().is_empty() || v.trim().eq_ignore_ascii_case("n/a"));
    if blank {
        *value = Some(MONEY_PLACEHOLDER.to_string());
    }
}

/// Fill missing money columns and strip the stray `zz` the site
/// sometimes injects into room names.
pub fn normalize_raw(rows: &mut [EnrollmentRecord]) {
    for row in rows {
        money_or_zero(&mut row.tuition_resident);
        money_or_zero(&mut row.tuition_nonresident);
        money_or_zero(&mut row.course_fees);
        money_or_zero(&mut row.book_cost);
        if let Some(loc) = row.loc.as_mut() {
            *loc = loc.replace("zz", "");
        }
    }
}

/// Count of rows per year/term, for logging.
pub fn rows_per_term(rows: &[EnrollmentRecord]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(row.year_term.as_str()).or_insert(0) += 1;
    }
    counts
}
