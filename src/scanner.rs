use std::path::PathBuf;
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::BuddyError;

const SECS_PER_DAY: u64 = 86_400;

/// A file old enough to be offered for deletion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub age_days: i64,
    pub size_bytes: u64,
}

/// Output of one scan: what was found plus everything that was skipped
/// because it could not be read.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub candidates: Vec<Candidate>,
    pub warnings: Vec<BuddyError>,
}

/// Whole days from `modified` to `now`, rounded toward the earlier instant.
/// A timestamp in the future gives a negative age.
pub fn age_in_days(modified: SystemTime, now: SystemTime) -> i64 {
    match now.duration_since(modified) {
        Ok(elapsed) => (elapsed.as_secs() / SECS_PER_DAY) as i64,
        Err(ahead) => {
            let ahead = ahead.duration();
            let days = ahead.as_secs().div_ceil(SECS_PER_DAY)
                + u64::from(ahead.as_secs() % SECS_PER_DAY == 0 && ahead.subsec_nanos() > 0);
            -(days as i64)
        }
    }
}

/// Walk every root and collect regular files at least
/// `config.age_threshold_days` old. Nothing here aborts the scan: bad roots
/// and unreadable entries become warnings.
pub fn scan(config: &ScanConfig, now: SystemTime) -> ScanReport {
    let mut report = ScanReport::default();

    for root in &config.roots {
        if !root.is_dir() {
            log::warn!("Monitor path does not exist: {}", root.display());
            report
                .warnings
                .push(BuddyError::RootNotDirectory(root.clone()));
            continue;
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let err = BuddyError::walk(e);
                    log::warn!("{err}. Skipping.");
                    report.warnings.push(err);
                    continue;
                }
            };

            if entry.path_is_symlink() || !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if config.is_ignored(&name) {
                log::debug!("Ignoring {}", entry.path().display());
                continue;
            }

            // walkdir does not follow links, so this is the file's own lstat
            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    let err = BuddyError::entry(entry.path().to_path_buf(), e);
                    log::warn!("{err}. Skipping.");
                    report.warnings.push(err);
                    continue;
                }
            };

            let modified = match meta.modified() {
                Ok(t) => t,
                Err(e) => {
                    let err = BuddyError::metadata(entry.path().to_path_buf(), e);
                    log::warn!("{err}. Skipping.");
                    report.warnings.push(err);
                    continue;
                }
            };

            let age_days = age_in_days(modified, now);
            if age_days < i64::from(config.age_threshold_days) {
                continue;
            }

            report.candidates.push(Candidate {
                path: entry.into_path(),
                modified,
                age_days,
                size_bytes: meta.len(),
            });
        }
    }

    log::info!(
        "Scan finished: {} old files, {} warnings",
        report.candidates.len(),
        report.warnings.len()
    );
    report
}
