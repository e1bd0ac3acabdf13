use std::path::Path;
use std::time::Duration;

use crate::core::{ComponentLogger, LogContext, WaitOutcome, Waiter};
use crate::library::AudioLibrary;
use crate::player::{PlayOutcome, Player};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub attempted: usize,
    pub played: usize,
    pub failed: usize,
}

/// Scan, play everything, sleep, repeat. Runs on the caller's thread until
/// the waiter reports shutdown.
pub struct Scheduler<P: Player, W: Waiter> {
    library: AudioLibrary,
    player: P,
    waiter: W,
    interval: Duration,
    ctx: LogContext,
    cycle: u64,
}

impl<P: Player, W: Waiter> Scheduler<P, W> {
    pub fn new(
        library: AudioLibrary,
        player: P,
        waiter: W,
        interval: Duration,
        ctx: LogContext,
    ) -> Self {
        Self {
            library,
            player,
            waiter,
            interval,
            ctx,
            cycle: 0,
        }
    }

    /// Returns the number of cycles started before shutdown.
    pub fn run(mut self) -> u64 {
        self.info(&format!(
            "starting: interval {:.0}s, input {}",
            self.interval.as_secs_f64(),
            self.library.dir().display()
        ));

        while !self.waiter.shutdown_requested() {
            self.run_cycle();

            if self.waiter.shutdown_requested() {
                break;
            }

            self.debug(&format!("sleeping {:.0}s", self.interval.as_secs_f64()));
            if self.waiter.wait(self.interval) == WaitOutcome::Shutdown {
                break;
            }
        }

        self.info(&format!("stopping after {} cycle(s)", self.cycle));
        self.player.release();
        self.cycle
    }

    /// One pass over the directory as it looks right now.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        let mut report = CycleReport::default();

        let files = match self.library.scan() {
            Ok(files) => files,
            Err(e) => {
                // the directory was fine at startup; try again next cycle
                self.error(&e.to_string());
                return report;
            }
        };

        if files.is_empty() {
            self.warn("no audio files found to play");
            return report;
        }

        self.info(&format!("playing {} audio file(s)", files.len()));

        for path in &files {
            if self.waiter.shutdown_requested() {
                break;
            }

            report.attempted += 1;
            match self.player.play(path) {
                Ok(PlayOutcome::Finished) => {
                    report.played += 1;
                    self.debug(&format!("finished {}", file_name(path)));
                }
                Ok(PlayOutcome::Abandoned) => {
                    self.info(&format!("abandoned {}", file_name(path)));
                    break;
                }
                Err(e) => {
                    report.failed += 1;
                    self.error(&format!("failed to play {}: {}", file_name(path), e));
                }
            }
        }

        self.info(&format!("played {}/{}", report.played, report.attempted));
        report
    }
}

impl<P: Player, W: Waiter> ComponentLogger for Scheduler<P, W> {
    fn log_context(&self) -> LogContext {
        self.ctx.clone().with_cycle(self.cycle)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mocks::{RecordingPlayer, ScriptedWaiter};

    fn scheduler(
        dir: &Path,
        player: RecordingPlayer,
        waiter: ScriptedWaiter,
    ) -> Scheduler<RecordingPlayer, ScriptedWaiter> {
        Scheduler::new(
            AudioLibrary::new(dir, LogContext::new("Library", "test")),
            player,
            waiter,
            Duration::from_secs(60),
            LogContext::new("Scheduler", "test"),
        )
    }

    #[test]
    fn test_cycle_plays_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.wav", "a.ogg", "skip.txt", "c.MP3"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let (player, log) = RecordingPlayer::new_with_shared();

        let report = scheduler(dir.path(), player, ScriptedWaiter::stop_on(1)).run_cycle();

        assert_eq!(report, CycleReport { attempted: 3, played: 3, failed: 0 });
        assert_eq!(log.lock().unwrap().played_names(), vec!["a.ogg", "b.wav", "c.MP3"]);
    }

    #[test]
    fn test_missing_dir_mid_run_is_empty_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let (player, log) = RecordingPlayer::new_with_shared();

        let mut s = scheduler(&dir.path().join("gone"), player, ScriptedWaiter::stop_on(1));

        assert_eq!(s.run_cycle(), CycleReport::default());
        assert!(log.lock().unwrap().played.is_empty());
    }

    #[test]
    fn test_abandoned_file_is_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.wav", "b.wav", "c.wav"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let (player, log) = RecordingPlayer::new_with_shared();
        let player = player.abandoning_on("b.wav");

        let report = scheduler(dir.path(), player, ScriptedWaiter::stop_on(1)).run_cycle();

        assert_eq!(report, CycleReport { attempted: 2, played: 1, failed: 0 });
        assert_eq!(log.lock().unwrap().played_names(), vec!["a.wav"]);
    }

    #[test]
    fn test_run_releases_player() {
        let dir = tempfile::tempdir().unwrap();
        let (player, log) = RecordingPlayer::new_with_shared();

        let cycles = scheduler(dir.path(), player, ScriptedWaiter::stop_on(2)).run();

        assert_eq!(cycles, 2);
        assert!(log.lock().unwrap().released);
    }

    #[test]
    fn test_log_context_tracks_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let (player, _log) = RecordingPlayer::new_with_shared();
        let mut s = scheduler(dir.path(), player, ScriptedWaiter::stop_on(1));

        s.run_cycle();
        s.run_cycle();

        assert_eq!(s.log_context().cycle, Some(2));
    }
}
