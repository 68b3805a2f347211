//! File lifecycle manager
//!
//! Moves the input file between the incoming, in-flight, archived and error
//! locations, and rotates the export output. Every move is a single
//! `rename`; a crash leaves the file at exactly one of the two endpoints.

use super::lock::RunLock;
use super::state::{FileState, LifecycleSnapshot, OutputDisposition};
use crate::config::schema::PathsConfig;
use crate::domain::{FerryError, Result};
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Suffix format appended to archived, quarantined and rotated files
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Owns the configured file locations and every move between them
#[derive(Debug, Clone)]
pub struct FileLifecycle {
    incoming: PathBuf,
    in_flight: PathBuf,
    error_dir: PathBuf,
    error_file_name: OsString,
    output: PathBuf,
    run_lock: PathBuf,
}

impl FileLifecycle {
    /// Create a lifecycle manager over the configured paths
    ///
    /// # Errors
    ///
    /// Returns an error if the in-flight path has no file name.
    pub fn new(paths: &PathsConfig) -> Result<Self> {
        let in_flight_name = paths.in_flight_file.file_name().ok_or_else(|| {
            FerryError::Configuration(format!(
                "In-flight path '{}' does not name a file",
                paths.in_flight_file.display()
            ))
        })?;

        let error_file_name = match paths.error_file_name {
            Some(ref name) => OsString::from(name),
            None => OsString::from(in_flight_name),
        };

        let mut lock_name = OsString::from(".");
        lock_name.push(in_flight_name);
        lock_name.push(".lock");

        Ok(Self {
            incoming: paths.incoming_file.clone(),
            in_flight: paths.in_flight_file.clone(),
            error_dir: paths.error_dir.clone(),
            error_file_name,
            output: paths.output_file.clone(),
            run_lock: paths.in_flight_file.with_file_name(lock_name),
        })
    }

    pub fn incoming_path(&self) -> &Path {
        &self.incoming
    }

    pub fn in_flight_path(&self) -> &Path {
        &self.in_flight
    }

    pub fn error_dir(&self) -> &Path {
        &self.error_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Hidden lock file next to the in-flight location
    pub fn run_lock_path(&self) -> &Path {
        &self.run_lock
    }

    /// Take the cross-process run lock without blocking
    ///
    /// `Ok(None)` means another process (or another scheduler in this one)
    /// is running a job over the same files.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created or locked.
    pub fn try_lock_run(&self) -> Result<Option<RunLock>> {
        RunLock::try_acquire(&self.run_lock)
    }

    /// A file waits at the incoming location
    pub fn incoming_present(&self) -> bool {
        self.incoming.is_file()
    }

    /// A file occupies the in-flight location
    pub fn in_flight_present(&self) -> bool {
        self.in_flight.is_file()
    }

    /// Whether the error directory holds no entries
    ///
    /// A missing directory counts as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn error_dir_is_empty(&self) -> Result<bool> {
        match fs::read_dir(&self.error_dir) {
            Ok(mut entries) => Ok(entries.next().is_none()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(FerryError::Lifecycle(format!(
                "Cannot read error directory '{}': {e}",
                self.error_dir.display()
            ))),
        }
    }

    /// INCOMING → IN_FLIGHT
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to claim, the in-flight location
    /// is occupied, or the rename fails.
    pub fn claim_incoming(&self) -> Result<PathBuf> {
        move_file(&self.incoming, &self.in_flight)?;
        tracing::info!(
            from = %self.incoming.display(),
            to = %self.in_flight.display(),
            "Claimed incoming file"
        );
        Ok(self.in_flight.clone())
    }

    /// IN_FLIGHT → ARCHIVED, renamed in place with a timestamp suffix
    ///
    /// # Errors
    ///
    /// Returns an error if there is no in-flight file or the rename fails.
    pub fn archive_in_flight(&self, at: DateTime<Local>) -> Result<PathBuf> {
        let target = with_suffix(&self.in_flight, at);
        move_file(&self.in_flight, &target)?;
        tracing::info!(archived = %target.display(), "Archived in-flight file");
        Ok(target)
    }

    /// IN_FLIGHT → ERRORED, moved into the error directory with a timestamp suffix
    ///
    /// # Errors
    ///
    /// Returns an error if there is no in-flight file or the move fails.
    pub fn quarantine_in_flight(&self, at: DateTime<Local>) -> Result<PathBuf> {
        let target = with_suffix(&self.error_dir.join(&self.error_file_name), at);
        move_file(&self.in_flight, &target)?;
        tracing::warn!(
            errored = %target.display(),
            "Moved in-flight file to the error directory; ingest is blocked until it is cleared"
        );
        Ok(target)
    }

    /// Rotate a non-empty output file, delete an empty one
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be inspected, removed or renamed.
    pub fn finalize_output(&self, at: DateTime<Local>) -> Result<OutputDisposition> {
        let metadata = match fs::metadata(&self.output) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(output = %self.output.display(), "No output file to rotate");
                return Ok(OutputDisposition::Absent);
            }
            Err(e) => {
                return Err(FerryError::Lifecycle(format!(
                    "Cannot inspect output '{}': {e}",
                    self.output.display()
                )))
            }
        };

        if metadata.len() == 0 {
            fs::remove_file(&self.output).map_err(|e| {
                FerryError::Lifecycle(format!(
                    "Cannot remove empty output '{}': {e}",
                    self.output.display()
                ))
            })?;
            tracing::info!(output = %self.output.display(), "Removed empty output file");
            return Ok(OutputDisposition::RemovedEmpty);
        }

        let target = with_suffix(&self.output, at);
        move_file(&self.output, &target)?;
        tracing::info!(rotated = %target.display(), "Rotated output file");
        Ok(OutputDisposition::Rotated(target))
    }

    /// Create the parent directories of every location plus the error directory
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn ensure_directories(&self) -> Result<()> {
        let parents = [&self.incoming, &self.in_flight, &self.output]
            .into_iter()
            .filter_map(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty());

        for dir in parents.chain(std::iter::once(self.error_dir.as_path())) {
            fs::create_dir_all(dir).map_err(|e| {
                FerryError::Lifecycle(format!("Cannot create '{}': {e}", dir.display()))
            })?;
        }
        Ok(())
    }

    /// Inspect the file system
    pub fn observe(&self) -> LifecycleSnapshot {
        let incoming_present = self.incoming_present();
        let in_flight_present = self.in_flight_present();
        let error_entries = fs::read_dir(&self.error_dir)
            .map(|entries| entries.count())
            .or_else(|e| if e.kind() == ErrorKind::NotFound { Ok(0) } else { Err(e) })
            .ok();
        let archived_files = self.count_archived();

        let state = if in_flight_present {
            FileState::InFlight
        } else if error_entries.is_some_and(|n| n > 0) {
            FileState::Errored
        } else if incoming_present {
            FileState::Incoming
        } else if archived_files > 0 {
            FileState::Archived
        } else {
            FileState::Absent
        };

        LifecycleSnapshot {
            state,
            incoming_present,
            in_flight_present,
            error_entries,
            archived_files,
            output_present: self.output.is_file(),
        }
    }

    fn count_archived(&self) -> usize {
        let (Some(dir), Some(name)) = (self.in_flight.parent(), self.in_flight.file_name()) else {
            return 0;
        };
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let prefix = format!("{}_", name.to_string_lossy());

        fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
                    .count()
            })
            .unwrap_or(0)
    }
}

/// `path` with `_<timestamp>` appended to its file name
fn with_suffix(path: &Path, at: DateTime<Local>) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(format!("_{}", at.format(TIMESTAMP_FORMAT)));
    path.with_file_name(name)
}

/// Rename `from` to `to` without overwriting
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(FerryError::Lifecycle(format!(
            "Nothing to move at '{}'",
            from.display()
        )));
    }
    if to.exists() {
        return Err(FerryError::Lifecycle(format!(
            "Cannot move '{}': '{}' already exists",
            from.display(),
            to.display()
        )));
    }
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            FerryError::Lifecycle(format!("Cannot create '{}': {e}", parent.display()))
        })?;
    }
    fs::rename(from, to).map_err(|e| {
        FerryError::Lifecycle(format!(
            "Cannot move '{}' to '{}': {e}",
            from.display(),
            to.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    fn lifecycle(root: &Path) -> FileLifecycle {
        FileLifecycle::new(&PathsConfig {
            incoming_file: root.join("in").join("input.csv"),
            in_flight_file: root.join("work").join("input.csv"),
            error_dir: root.join("error"),
            error_file_name: None,
            output_file: root.join("out").join("output.txt"),
        })
        .unwrap()
    }

    fn drop_incoming(lc: &FileLifecycle, content: &str) {
        fs::create_dir_all(lc.incoming_path().parent().unwrap()).unwrap();
        fs::write(lc.incoming_path(), content).unwrap();
    }

    #[test]
    fn test_claim_moves_incoming_to_in_flight() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());
        drop_incoming(&lc, "data");

        lc.claim_incoming().unwrap();

        assert!(!lc.incoming_present());
        assert!(lc.in_flight_present());
        assert_eq!(fs::read_to_string(lc.in_flight_path()).unwrap(), "data");
    }

    #[test]
    fn test_claim_refuses_to_clobber_in_flight() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());
        drop_incoming(&lc, "new");
        fs::create_dir_all(lc.in_flight_path().parent().unwrap()).unwrap();
        fs::write(lc.in_flight_path(), "old").unwrap();

        let err = lc.claim_incoming().unwrap_err();
        assert!(matches!(err, FerryError::Lifecycle(_)));
        assert_eq!(fs::read_to_string(lc.in_flight_path()).unwrap(), "old");
        assert!(lc.incoming_present());
    }

    #[test]
    fn test_archive_appends_timestamp() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());
        drop_incoming(&lc, "data");
        lc.claim_incoming().unwrap();

        let archived = lc.archive_in_flight(at()).unwrap();

        assert_eq!(archived, dir.path().join("work").join("input.csv_20250102030405"));
        assert!(archived.is_file());
        assert!(!lc.in_flight_present());
        assert_eq!(lc.observe().state, FileState::Archived);
    }

    #[test]
    fn test_quarantine_moves_into_error_dir() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());
        drop_incoming(&lc, "data");
        lc.claim_incoming().unwrap();

        let errored = lc.quarantine_in_flight(at()).unwrap();

        assert_eq!(errored, dir.path().join("error").join("input.csv_20250102030405"));
        assert!(!lc.error_dir_is_empty().unwrap());
        assert_eq!(lc.observe().state, FileState::Errored);
    }

    #[test]
    fn test_custom_error_file_name() {
        let dir = TempDir::new().unwrap();
        let lc = FileLifecycle::new(&PathsConfig {
            incoming_file: dir.path().join("in.csv"),
            in_flight_file: dir.path().join("work.csv"),
            error_dir: dir.path().join("error"),
            error_file_name: Some("rejected".to_string()),
            output_file: dir.path().join("out.txt"),
        })
        .unwrap();
        fs::write(lc.in_flight_path(), "x").unwrap();

        let errored = lc.quarantine_in_flight(at()).unwrap();
        assert_eq!(errored.file_name().unwrap(), "rejected_20250102030405");
    }

    #[test]
    fn test_missing_error_dir_counts_as_empty() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());
        assert!(lc.error_dir_is_empty().unwrap());
    }

    #[test]
    fn test_archive_without_in_flight_fails() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());
        assert!(matches!(
            lc.archive_in_flight(at()),
            Err(FerryError::Lifecycle(_))
        ));
    }

    #[test]
    fn test_finalize_output_dispositions() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());
        assert_eq!(lc.finalize_output(at()).unwrap(), OutputDisposition::Absent);

        fs::create_dir_all(lc.output_path().parent().unwrap()).unwrap();
        fs::write(lc.output_path(), "").unwrap();
        assert_eq!(
            lc.finalize_output(at()).unwrap(),
            OutputDisposition::RemovedEmpty
        );
        assert!(!lc.output_path().exists());

        fs::write(lc.output_path(), "line\n").unwrap();
        let rotated = dir.path().join("out").join("output.txt_20250102030405");
        assert_eq!(
            lc.finalize_output(at()).unwrap(),
            OutputDisposition::Rotated(rotated.clone())
        );
        assert_eq!(fs::read_to_string(rotated).unwrap(), "line\n");
    }

    #[test]
    fn test_ensure_directories_and_observe_absent() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());
        lc.ensure_directories().unwrap();

        assert!(dir.path().join("in").is_dir());
        assert!(dir.path().join("work").is_dir());
        assert!(dir.path().join("out").is_dir());
        assert!(dir.path().join("error").is_dir());

        let snapshot = lc.observe();
        assert_eq!(snapshot.state, FileState::Absent);
        assert_eq!(snapshot.error_entries, Some(0));
        assert!(!snapshot.output_present);
    }

    #[test]
    fn test_run_lock_sits_next_to_in_flight_and_is_not_archived() {
        let dir = TempDir::new().unwrap();
        let lc = lifecycle(dir.path());

        assert_eq!(
            lc.run_lock_path(),
            dir.path().join("work").join(".input.csv.lock")
        );

        let lock = lc.try_lock_run().unwrap().expect("lock");
        #[cfg(unix)]
        assert!(lc.clone().try_lock_run().unwrap().is_none());
        drop(lock);

        assert_eq!(lc.observe().archived_files, 0);
    }
}
