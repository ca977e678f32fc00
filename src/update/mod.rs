//! Merge a scrape into the cumulative table and republish it
//!
//! Files touched by one run, in order:
//! 1. backup of the cumulative table
//! 2. the cumulative table itself
//! 3. the published table and the semesters list

pub mod merge;
pub mod publish;

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use crate::config::DataConfig;
use crate::errors::{HeadcountError, Result};
use crate::model::{EnrollmentRecord, YearTerm};
use crate::utils::csv_handler;

pub use merge::{MergeOutcome, index_key, merge, normalize_raw};
pub use publish::{
    CollegeMap, DEFAULT_DELIVERY_METHOD, Semester, parse_money, publish, read_semesters,
    semesters, write_semesters,
};

#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub updated: usize,
    pub appended: usize,
    pub total: usize,
    /// `None` on the first run, when there was nothing to back up
    pub backup: Option<PathBuf>,
}

pub struct TableUpdater {
    raw_file: PathBuf,
    published_file: PathBuf,
    backup_dir: PathBuf,
    college_map: PathBuf,
    semesters_file: PathBuf,
}

impl TableUpdater {
    pub fn new(config: &DataConfig) -> Self {
        Self {
            raw_file: PathBuf::from(&config.raw_file),
            published_file: PathBuf::from(&config.published_file),
            backup_dir: PathBuf::from(&config.backup_dir),
            college_map: PathBuf::from(&config.college_map),
            semesters_file: PathBuf::from(&config.semesters_file),
        }
    }

    fn backup(&self, rows: &[EnrollmentRecord]) -> Result<PathBuf> {
        let name = format!(
            "all_enrollments_backup_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.backup_dir.join(name);
        csv_handler::write_csv(&path, rows)?;
        info!("Backup created: {}", path.display());
        Ok(path)
    }

    /// Every incoming row needs a usable year/term; a single bad row would
    /// otherwise be merged and break every later publish.
    fn check_new_rows(rows: &[EnrollmentRecord], source: &Path) -> Result<()> {
        for (i, r) in rows.iter().enumerate() {
            if r.year_term.parse::<YearTerm>().is_err() {
                return Err(HeadcountError::data_integrity(format!(
                    "{} row {} (ID # {}) has invalid year_term \"{}\"",
                    source.display(),
                    i + 1,
                    r.id,
                    r.year_term
                )));
            }
        }
        Ok(())
    }

    /// Nothing is written unless the merged table publishes cleanly.
    pub fn run<P: AsRef<Path>>(&self, new_file: P) -> Result<UpdateReport> {
        let new_file = new_file.as_ref();
        let new: Vec<EnrollmentRecord> = csv_handler::read_csv(new_file)?;
        info!("Loaded {} entries from {}", new.len(), new_file.display());
        Self::check_new_rows(&new, new_file)?;

        let current: Vec<EnrollmentRecord> = if self.raw_file.exists() {
            csv_handler::read_csv(&self.raw_file)?
        } else {
            info!("No cumulative table at {}, starting fresh", self.raw_file.display());
            Vec::new()
        };
        info!("Loaded {} entries of current data", current.len());

        let MergeOutcome {
            mut rows,
            updated,
            appended,
        } = merge(current.clone(), new);
        info!("Updated {} common entries, added {} new entries", updated, appended);
        normalize_raw(&mut rows);
        for (term, count) in merge::rows_per_term(&rows) {
            debug!("{}: {} rows", term, count);
        }

        let colleges = CollegeMap::load(&self.college_map)?;
        let published = publish(&rows, &colleges)?;
        let sems = semesters(&published);

        let backup = if self.raw_file.exists() {
            Some(self.backup(&current)?)
        } else {
            None
        };
        csv_handler::write_csv(&self.raw_file, &rows)?;
        csv_handler::write_csv(&self.published_file, &published)?;
        write_semesters(&self.semesters_file, &sems)?;
        info!(
            "Updated data saved to {} and {} ({} semesters)",
            self.raw_file.display(),
            self.published_file.display(),
            sems.len()
        );

        Ok(UpdateReport {
            updated,
            appended,
            total: rows.len(),
            backup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::merge::tests::record;
    use tempfile::TempDir;

    fn data_config(root: &Path) -> DataConfig {
        let s = |p: &str| root.join(p).to_string_lossy().into_owned();
        DataConfig {
            data_dir: s("data"),
            raw_file: s("data/all_enrollments.csv"),
            published_file: s("data/published.csv"),
            backup_dir: s("data/backups"),
            cache_dir: s("cache"),
            college_map: s("setup/Rubric2College.csv"),
            semesters_file: s("data/semesters.json"),
        }
    }

    #[test]
    fn test_bad_year_term_leaves_table_untouched() {
        let dir = TempDir::new().unwrap();
        let config = data_config(dir.path());
        let updater = TableUpdater::new(&config);

        let bad = dir.path().join("bad.csv");
        csv_handler::write_csv(&bad, &[record("20263", "001234", 38), record("2026", "001235", 10)])
            .unwrap();
        let err = updater.run(&bad).unwrap_err();
        assert!(matches!(err, HeadcountError::DataIntegrity(_)));
        assert!(err.message().contains("001235"));
        assert!(!Path::new(&config.raw_file).exists());
        assert!(!Path::new(&config.published_file).exists());

        let good = dir.path().join("good.csv");
        csv_handler::write_csv(&good, &[record("20263", "001234", 38)]).unwrap();
        let report = updater.run(&good).unwrap();
        assert_eq!(report.total, 1);
        assert!(report.backup.is_none());

        // a later bad file does not disturb the published table either
        let before = std::fs::read_to_string(&config.raw_file).unwrap();
        assert!(updater.run(&bad).is_err());
        assert_eq!(std::fs::read_to_string(&config.raw_file).unwrap(), before);
        assert_eq!(updater.run(&good).unwrap().updated, 1);
    }
}
