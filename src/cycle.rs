use std::path::PathBuf;
use std::sync::mpsc;
use std::time::SystemTime;

use crate::config::ScanConfig;
use crate::deleter::{self, DeletionResult};
use crate::error::{BuddyError, CycleError};
use crate::scanner::{self, Candidate, ScanReport};
use crate::utils;

/// Where the current cycle stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    AwaitingConfirmation,
    Deleting,
}

/// The user's all-or-nothing answer to the candidate list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    DeleteAll,
    KeepAll,
}

/// Something the host should react to, returned from `Cycle::poll`.
#[derive(Debug, PartialEq, Eq)]
pub enum CycleEvent {
    NoneFound,
    AwaitingConfirmation(usize),
    AutoDeleting(usize),
    Deleted(DeletionResult),
}

/// Messages sent from the worker thread to the owner of the cycle.
enum WorkerMessage {
    ScanComplete(ScanReport),
    DeleteComplete(DeletionResult),
}

/// One scan followed by an optional deletion, run on a background thread.
/// Only one worker exists at a time.
pub struct Cycle {
    phase: Phase,
    auto_delete: bool,
    receiver: Option<mpsc::Receiver<WorkerMessage>>,
    candidates: Vec<Candidate>,
    warnings: Vec<BuddyError>,
}

impl Default for Cycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Cycle {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            auto_delete: false,
            receiver: None,
            candidates: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Files found by the last scan. Emptied once they have been deleted
    /// or kept.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Non-fatal problems met by the last scan.
    pub fn warnings(&self) -> &[BuddyError] {
        &self.warnings
    }

    /// Begin a scan with a private copy of `config`. Refused unless idle.
    pub fn start(&mut self, config: ScanConfig) -> Result<(), CycleError> {
        if self.phase != Phase::Idle {
            return Err(CycleError::Busy);
        }

        log::info!("Checking for old files...");
        self.phase = Phase::Scanning;
        self.auto_delete = config.auto_delete;
        self.candidates.clear();
        self.warnings.clear();

        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        self.receiver = Some(rx);

        std::thread::spawn(move || {
            let report = scanner::scan(&config, SystemTime::now());
            let _ = tx.send(WorkerMessage::ScanComplete(report));
        });
        Ok(())
    }

    /// Answer a pending confirmation.
    pub fn confirm(&mut self, decision: Decision) -> Result<(), CycleError> {
        if self.phase != Phase::AwaitingConfirmation {
            return Err(CycleError::NotAwaitingConfirmation);
        }

        match decision {
            Decision::DeleteAll => self.spawn_delete(),
            Decision::KeepAll => {
                log::info!("Keeping {} old files", self.candidates.len());
                self.candidates.clear();
                self.phase = Phase::Idle;
            }
        }
        Ok(())
    }

    /// Check the worker without blocking.
    pub fn poll(&mut self) -> Option<CycleEvent> {
        let rx = self.receiver.as_ref()?;
        let msg = match rx.try_recv() {
            Ok(msg) => msg,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => {
                log::error!("Background worker stopped during {:?}", self.phase);
                self.receiver = None;
                self.candidates.clear();
                self.phase = Phase::Idle;
                return None;
            }
        };
        self.receiver = None;

        match msg {
            WorkerMessage::ScanComplete(report) => Some(self.finish_scan(report)),
            WorkerMessage::DeleteComplete(result) => {
                log::info!(
                    "Deleted {} of {} files ({} freed), {} failures",
                    result.succeeded,
                    result.attempted,
                    utils::format_size(result.bytes_freed),
                    result.failures.len()
                );
                self.candidates.clear();
                self.phase = Phase::Idle;
                Some(CycleEvent::Deleted(result))
            }
        }
    }

    fn finish_scan(&mut self, report: ScanReport) -> CycleEvent {
        self.candidates = report.candidates;
        self.warnings = report.warnings;

        let count = self.candidates.len();
        if count == 0 {
            self.phase = Phase::Idle;
            CycleEvent::NoneFound
        } else if self.auto_delete {
            log::info!("Automatically deleting {count} old files");
            self.spawn_delete();
            CycleEvent::AutoDeleting(count)
        } else {
            self.phase = Phase::AwaitingConfirmation;
            CycleEvent::AwaitingConfirmation(count)
        }
    }

    fn spawn_delete(&mut self) {
        self.phase = Phase::Deleting;
        let paths: Vec<PathBuf> = self.candidates.iter().map(|c| c.path.clone()).collect();

        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        self.receiver = Some(rx);

        std::thread::spawn(move || {
            let result = deleter::delete(&paths);
            let _ = tx.send(WorkerMessage::DeleteComplete(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tests::{days, write_aged};
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn wait_for_event(cycle: &mut Cycle) -> CycleEvent {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(event) = cycle.poll() {
                return event;
            }
            assert!(Instant::now() < deadline, "worker did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let now = SystemTime::now();
        write_aged(&tmp.path().join("old.txt"), now, days(40));
        write_aged(&tmp.path().join("skip.dll"), now, days(40));
        write_aged(&tmp.path().join("new.txt"), now, days(2));
        tmp
    }

    fn config(root: &Path, auto_delete: bool) -> ScanConfig {
        ScanConfig::new(vec![root.to_path_buf()], 30, [".dll"], auto_delete)
    }

    #[test]
    fn test_auto_delete_goes_straight_to_deletion() {
        let tmp = fixture();
        let mut cycle = Cycle::new();
        cycle.start(config(tmp.path(), true)).unwrap();

        assert_eq!(wait_for_event(&mut cycle), CycleEvent::AutoDeleting(1));
        assert_eq!(cycle.phase(), Phase::Deleting);

        match wait_for_event(&mut cycle) {
            CycleEvent::Deleted(result) => {
                assert_eq!(result.attempted, 1);
                assert_eq!(result.succeeded, 1);
                assert!(result.failures.is_empty());
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(cycle.is_idle());
        assert!(!tmp.path().join("old.txt").exists());
        assert!(tmp.path().join("skip.dll").exists());
        assert!(tmp.path().join("new.txt").exists());
    }

    #[test]
    fn test_interactive_accept_deletes() {
        let tmp = fixture();
        let mut cycle = Cycle::new();
        cycle.start(config(tmp.path(), false)).unwrap();

        assert_eq!(wait_for_event(&mut cycle), CycleEvent::AwaitingConfirmation(1));
        assert_eq!(cycle.phase(), Phase::AwaitingConfirmation);
        assert_eq!(cycle.candidates()[0].path, tmp.path().join("old.txt"));
        assert!(tmp.path().join("old.txt").exists());

        cycle.confirm(Decision::DeleteAll).unwrap();
        assert!(matches!(wait_for_event(&mut cycle), CycleEvent::Deleted(r) if r.succeeded == 1));
        assert!(!tmp.path().join("old.txt").exists());
        assert!(cycle.candidates().is_empty());
    }

    #[test]
    fn test_interactive_decline_keeps_files() {
        let tmp = fixture();
        let mut cycle = Cycle::new();
        cycle.start(config(tmp.path(), false)).unwrap();
        wait_for_event(&mut cycle);

        cycle.confirm(Decision::KeepAll).unwrap();
        assert!(cycle.is_idle());
        assert!(cycle.poll().is_none());
        assert!(tmp.path().join("old.txt").exists());
    }

    #[test]
    fn test_none_found_returns_to_idle() {
        let tmp = TempDir::new().unwrap();
        write_aged(&tmp.path().join("new.txt"), SystemTime::now(), days(1));
        let mut cycle = Cycle::new();
        cycle.start(config(tmp.path(), true)).unwrap();

        assert_eq!(wait_for_event(&mut cycle), CycleEvent::NoneFound);
        assert!(cycle.is_idle());
    }

    #[test]
    fn test_single_flight() {
        let tmp = fixture();
        let mut cycle = Cycle::new();
        cycle.start(config(tmp.path(), false)).unwrap();
        assert_eq!(cycle.start(config(tmp.path(), false)), Err(CycleError::Busy));

        wait_for_event(&mut cycle);
        assert_eq!(cycle.start(config(tmp.path(), false)), Err(CycleError::Busy));

        cycle.confirm(Decision::DeleteAll).unwrap();
        assert_eq!(cycle.start(config(tmp.path(), false)), Err(CycleError::Busy));
        wait_for_event(&mut cycle);
        assert!(cycle.start(config(tmp.path(), false)).is_ok());
    }

    #[test]
    fn test_confirm_outside_confirmation_is_rejected() {
        let mut cycle = Cycle::new();
        assert_eq!(
            cycle.confirm(Decision::DeleteAll),
            Err(CycleError::NotAwaitingConfirmation)
        );
    }

    #[test]
    fn test_warnings_from_missing_root_are_kept() {
        let tmp = TempDir::new().unwrap();
        let mut cycle = Cycle::new();
        cycle.start(config(&tmp.path().join("missing"), false)).unwrap();

        assert_eq!(wait_for_event(&mut cycle), CycleEvent::NoneFound);
        assert_eq!(cycle.warnings().len(), 1);
    }
}
