use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::core::{ComponentLogger, LogContext, PlaybackError, PlaybackResult, Shutdown};
use crate::library::probe_file;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Finished,
    /// Shutdown was requested while the file was still playing.
    Abandoned,
}

/// "Play this file to completion or fail." Implementations block the caller.
pub trait Player {
    fn play(&mut self, path: &Path) -> PlaybackResult<PlayOutcome>;

    /// Drops the output handle. Called once on shutdown.
    fn release(&mut self) {}
}

/// Plays through the default output device with rodio.
///
/// The stream is opened on first use and kept for the following files; after
/// a failed open the next file tries again, so a device that appears late is
/// still picked up.
pub struct RodioPlayer {
    stream: Option<rodio::OutputStream>,
    shutdown: Shutdown,
    ctx: LogContext,
}

impl RodioPlayer {
    pub fn new(shutdown: Shutdown, ctx: LogContext) -> Self {
        Self {
            stream: None,
            shutdown,
            ctx,
        }
    }

    fn stream(&mut self) -> PlaybackResult<&rodio::OutputStream> {
        if self.stream.is_none() {
            let mut stream = rodio::OutputStreamBuilder::open_default_stream()
                .map_err(PlaybackError::device)?;
            stream.log_on_drop(false);
            self.info("audio output opened");
            self.stream = Some(stream);
        }

        self.stream
            .as_ref()
            .ok_or_else(|| PlaybackError::device("output stream missing"))
    }
}

impl Player for RodioPlayer {
    fn play(&mut self, path: &Path) -> PlaybackResult<PlayOutcome> {
        let info = probe_file(path)?;
        match info.duration {
            Some(d) => self.debug(&format!("{} ({:.1}s)", path.display(), d.as_secs_f64())),
            None => self.debug(&format!("{} (unknown length)", path.display())),
        }

        let file = File::open(path).map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = rodio::Decoder::new(BufReader::new(file)).map_err(|e| {
            PlaybackError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let sink = rodio::Sink::connect_new(self.stream()?.mixer());
        sink.append(source);

        while !sink.empty() {
            if self.shutdown.wait_timeout(POLL_INTERVAL) {
                sink.stop();
                return Ok(PlayOutcome::Abandoned);
            }
        }

        Ok(PlayOutcome::Finished)
    }

    fn release(&mut self) {
        if self.stream.take().is_some() {
            self.info("audio output released");
        }
    }
}

impl ComponentLogger for RodioPlayer {
    fn log_context(&self) -> LogContext {
        self.ctx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only paths that fail before a device is needed; CI has no speakers.

    #[test]
    fn test_corrupt_file_fails_before_device_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, "definitely not a riff header").unwrap();

        let mut player = RodioPlayer::new(Shutdown::new(), LogContext::new("Player", "test"));

        assert!(matches!(
            player.play(&path),
            Err(PlaybackError::Unsupported { .. })
        ));
        assert!(player.stream.is_none());
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut player = RodioPlayer::new(Shutdown::new(), LogContext::new("Player", "test"));

        assert!(matches!(
            player.play(&dir.path().join("gone.mp3")),
            Err(PlaybackError::Open { .. })
        ));
    }

    #[test]
    fn test_release_without_stream_is_noop() {
        let mut player = RodioPlayer::new(Shutdown::new(), LogContext::new("Player", "test"));
        player.release();
        assert!(player.stream.is_none());
    }
}
