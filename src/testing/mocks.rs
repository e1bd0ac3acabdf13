use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use crate::core::{PlaybackError, PlaybackResult, WaitOutcome, Waiter};
use crate::player::{PlayOutcome, Player};

#[derive(Debug, Default)]
pub struct PlayLog {
    pub played: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub released: bool,
}

impl PlayLog {
    pub fn played_names(&self) -> Vec<String> {
        self.played
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }
}

/// Records every call instead of touching a device. Files whose name is in
/// the failing set return a decode error; files in the abandoning set act as
/// if shutdown arrived mid-playback.
pub struct RecordingPlayer {
    log: Arc<Mutex<PlayLog>>,
    failing: HashSet<String>,
    abandoning: HashSet<String>,
}

impl RecordingPlayer {
    pub fn new_with_shared() -> (Self, Arc<Mutex<PlayLog>>) {
        let log = Arc::new(Mutex::new(PlayLog::default()));
        (
            Self {
                log: log.clone(),
                failing: HashSet::new(),
                abandoning: HashSet::new(),
            },
            log,
        )
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn abandoning_on(mut self, name: &str) -> Self {
        self.abandoning.insert(name.to_string());
        self
    }
}

impl Player for RecordingPlayer {
    fn play(&mut self, path: &Path) -> PlaybackResult<PlayOutcome> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);

        if self.failing.contains(&name) {
            log.failed.push(path.to_path_buf());
            return Err(PlaybackError::Decode {
                path: path.to_path_buf(),
                message: "mock decode failure".to_string(),
            });
        }

        if self.abandoning.contains(&name) {
            return Ok(PlayOutcome::Abandoned);
        }

        log.played.push(path.to_path_buf());
        Ok(PlayOutcome::Finished)
    }

    fn release(&mut self) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .released = true;
    }
}

type WaitHook = Box<dyn Fn(usize) + Send>;

/// Returns immediately from every wait, remembers the requested durations
/// and reports shutdown on the `stop_on`-th wait.
pub struct ScriptedWaiter {
    stop_on: usize,
    waits: Arc<Mutex<Vec<Duration>>>,
    hook: Option<WaitHook>,
}

impl ScriptedWaiter {
    pub fn stop_on(stop_on: usize) -> Self {
        Self::new_with_shared(stop_on).0
    }

    pub fn new_with_shared(stop_on: usize) -> (Self, Arc<Mutex<Vec<Duration>>>) {
        let waits = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                stop_on,
                waits: waits.clone(),
                hook: None,
            },
            waits,
        )
    }

    /// Runs `hook` with the 1-based wait number during every wait, e.g. to
    /// change the input directory between cycles.
    pub fn on_wait(mut self, hook: impl Fn(usize) + Send + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    fn wait_count(&self) -> usize {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Waiter for ScriptedWaiter {
    fn wait(&self, duration: Duration) -> WaitOutcome {
        let count = {
            let mut waits = self.waits.lock().unwrap_or_else(PoisonError::into_inner);
            waits.push(duration);
            waits.len()
        };

        if let Some(hook) = &self.hook {
            hook(count);
        }

        if count >= self.stop_on {
            WaitOutcome::Shutdown
        } else {
            WaitOutcome::Elapsed
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.wait_count() >= self.stop_on
    }
}

/// Process-wide `log` backend that keeps every record in memory. Tests share
/// it, so filter on something unique to the test (e.g. the instance id of
/// the `LogContext`).
pub struct CapturedLogs {
    records: Mutex<Vec<(log::Level, String)>>,
}

static CAPTURED: OnceLock<CapturedLogs> = OnceLock::new();

/// Installs the capturing logger on first call. Later calls return the same
/// instance.
pub fn capture_logs() -> &'static CapturedLogs {
    let logs = CAPTURED.get_or_init(|| CapturedLogs {
        records: Mutex::new(Vec::new()),
    });
    // fails harmlessly when already installed
    let _ = log::set_logger(logs);
    log::set_max_level(log::LevelFilter::Trace);
    logs
}

impl CapturedLogs {
    /// Messages at `level` containing every needle.
    pub fn matching(&self, level: log::Level, needles: &[&str]) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(l, msg)| *l == level && needles.iter().all(|n| msg.contains(n)))
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl log::Log for CapturedLogs {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}
