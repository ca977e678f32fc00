//! Shared handle to the published course table
//!
//! The table is loaded once and swapped atomically when the file on disk
//! changes, so requests never block on each other and a `refresh` run is
//! picked up by the next request.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::model::CourseRow;
use crate::update::{Semester, semesters};
use crate::utils::csv_handler;

/// One loaded version of the table.
#[derive(Debug)]
pub struct Snapshot {
    pub rows: Vec<CourseRow>,
    /// Distinct terms, newest first
    pub semesters: Vec<Semester>,
    /// Modification time of the file this was read from
    pub modified: Option<SystemTime>,
    pub loaded_at: DateTime<Utc>,
    /// Why the table is empty, when loading failed
    pub error: Option<String>,
}

impl Snapshot {
    fn load(path: &Path) -> Self {
        let modified = file_mtime(path);
        match csv_handler::read_csv::<CourseRow, _>(path) {
            Ok(rows) => {
                info!("Loaded {} courses from {}", rows.len(), path.display());
                Self {
                    semesters: semesters(&rows),
                    rows,
                    modified,
                    loaded_at: Utc::now(),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Course table unavailable: {}", e);
                Self {
                    rows: Vec::new(),
                    semesters: Vec::new(),
                    modified,
                    loaded_at: Utc::now(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn newest_term(&self) -> Option<&Semester> {
        self.semesters.first()
    }
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

pub struct CourseData {
    path: PathBuf,
    current: ArcSwap<Snapshot>,
    reload: Mutex<()>,
}

impl CourseData {
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let snapshot = Snapshot::load(&path);
        Self {
            path,
            current: ArcSwap::from_pointee(snapshot),
            reload: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current table, reloaded first if the file changed since it was read.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let current = self.current.load_full();
        if file_mtime(&self.path) == current.modified {
            return current;
        }

        // Another request is already reloading; serve what we have.
        let Some(_guard) = self.reload.try_lock() else {
            return current;
        };
        let latest = self.current.load_full();
        if file_mtime(&self.path) == latest.modified {
            return latest;
        }

        debug!("{} changed on disk, reloading", self.path.display());
        let fresh = Arc::new(Snapshot::load(&self.path));
        self.current.store(fresh.clone());
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    const HEADER: &str = "Term,Fiscal yrtr,ID #,Subj,#,Sec,Title,Credits,Enrolled,Size,Status,Dates,Days,Time,Instructor,Delivery Method,Loc,LASC/WI,18online,Course level,College,Tuition unit,Tuition Resident,Tuition Non-Resident,Approximate Course Fees,Book Cost,Last Updated\n";
    const ROW: &str = "Fall 2025,20263,001234,PHYS,160,01,Physics I,4,38,40,Open,,,,Craig,On Campus,Hagen 101,3L,False,Undergraduate,CSHE,credit,283.13,283.13,0.0,0.0,2025-09-01T04:13:20Z\n";

    #[test]
    fn test_missing_file_gives_empty_table() {
        let data = CourseData::open("/nonexistent/published.csv");
        let snap = data.snapshot();
        assert!(snap.rows.is_empty());
        assert!(snap.error.is_some());
    }

    #[test]
    fn test_reload_on_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("published.csv");
        std::fs::write(&path, format!("{}{}", HEADER, ROW)).unwrap();

        let data = CourseData::open(&path);
        let first = data.snapshot();
        assert_eq!(first.rows.len(), 1);
        assert_eq!(first.newest_term().unwrap().term, "Fall 2025");

        // unchanged file keeps the same snapshot
        assert!(Arc::ptr_eq(&first, &data.snapshot()));

        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&path, format!("{}{}{}", HEADER, ROW, ROW.replace("001234", "001235"))).unwrap();
        let file = std::fs::File::options().append(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();

        assert_eq!(data.snapshot().rows.len(), 2);
    }
}
