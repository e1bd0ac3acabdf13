use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use chrono::Local;

use crate::config::LoggingConfig;

const LOG_TARGET: &str = "keep_speaker_on";

/// Identifies the component a log line comes from. Built once by the caller
/// and handed to the component; nothing here is global.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub component: String,
    pub instance_id: String,
    pub cycle: Option<u64>,
}

impl LogContext {
    pub fn new(component: &str, instance_id: &str) -> Self {
        Self {
            component: component.to_string(),
            instance_id: instance_id.to_string(),
            cycle: None,
        }
    }

    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }

    pub fn format(&self, message: &str) -> String {
        let cycle_info = match self.cycle {
            Some(cycle) => format!(" cycle={}", cycle),
            None => String::new(),
        };

        format!(
            "[{}:{}{}] {}",
            self.component, self.instance_id, cycle_info, message
        )
    }
}

pub trait ComponentLogger {
    fn log_context(&self) -> LogContext;

    fn debug(&self, message: &str) {
        log::debug!(target: LOG_TARGET, "{}", self.log_context().format(message));
    }

    fn info(&self, message: &str) {
        log::info!(target: LOG_TARGET, "{}", self.log_context().format(message));
    }

    fn warn(&self, message: &str) {
        log::warn!(target: LOG_TARGET, "{}", self.log_context().format(message));
    }

    fn error(&self, message: &str) {
        log::error!(target: LOG_TARGET, "{}", self.log_context().format(message));
    }
}

/// Appends every line to the log file and mirrors it to stdout when enabled.
pub struct LogSink {
    file: File,
    console: bool,
}

impl LogSink {
    pub fn open(path: &Path, console: bool) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file, console })
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        if self.console {
            // a closed stdout must not take the file log down with it
            let _ = io::stdout().write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.console {
            let _ = io::stdout().flush();
        }
        Ok(())
    }
}

/// Installs the process logger. `RUST_LOG` still wins over the configured
/// level when it is set.
pub fn init(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let sink = LogSink::open(&cfg.log_file, cfg.console)
        .with_context(|| format!("failed to open log file {}", cfg.log_file.display()))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cfg.log_level.filter_directive()),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            record.target(),
            record.level(),
            record.args()
        )
    })
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Pipe(Box::new(sink)))
    .try_init()
    .context("logger already initialized")?;

    Ok(())
}
