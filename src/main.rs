// src/main.rs

use std::path::PathBuf;

use anyhow::Context;
use log::{error, info, warn};

use keep_speaker_on::config::{self, Config, ConfigSource, LoadedConfig, LoggingConfig};
use keep_speaker_on::core::logging;
use keep_speaker_on::{AudioLibrary, LogContext, RodioPlayer, Scheduler, Shutdown};

fn main() -> anyhow::Result<()> {
    // ------------------------------------------------------------
    // Config
    // ------------------------------------------------------------
    let cfg_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_PATH));

    let loaded = match Config::load_or_init(&cfg_path)
        .with_context(|| format!("failed to load {}", cfg_path.display()))
    {
        Ok(loaded) => loaded,
        Err(e) => {
            // no usable logging section; report through the default log file
            logging::init(&LoggingConfig::default())?;
            error!("[keep-speaker-on] fatal: {:#}", e);
            return Err(e);
        }
    };

    // ------------------------------------------------------------
    // Logging
    // ------------------------------------------------------------
    logging::init(&loaded.config.logging)?;
    info!("[keep-speaker-on] logging initialized");

    if let Err(e) = run(loaded) {
        error!("[keep-speaker-on] fatal: {:#}", e);
        return Err(e);
    }

    info!("[keep-speaker-on] shutdown complete");
    Ok(())
}

fn run(loaded: LoadedConfig) -> anyhow::Result<()> {
    let LoadedConfig {
        config: cfg,
        source,
        persist_error,
    } = loaded;

    match &source {
        ConfigSource::File(path) => info!("[keep-speaker-on] loaded {}", path.display()),
        ConfigSource::Example(path) => {
            info!("[keep-speaker-on] settings created from {}", path.display())
        }
        ConfigSource::Defaults => info!("[keep-speaker-on] using default settings"),
    }
    if let Some(e) = persist_error {
        warn!("[keep-speaker-on] {}", e);
    }

    // ------------------------------------------------------------
    // Graceful shutdown
    // ------------------------------------------------------------
    let shutdown = Shutdown::new();
    {
        let s = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("[keep-speaker-on] shutdown requested");
            s.request();
        })
        .context("failed to install signal handler")?;
    }

    // ------------------------------------------------------------
    // Input directory
    // ------------------------------------------------------------
    let input_dir = cfg.settings.input_dir.clone();
    let instance = input_dir.display().to_string();

    let library = AudioLibrary::new(&input_dir, LogContext::new("Library", &instance));
    library.check()?;

    // ------------------------------------------------------------
    // Playback loop
    // ------------------------------------------------------------
    let player = RodioPlayer::new(shutdown.clone(), LogContext::new("Player", "default"));
    let scheduler = Scheduler::new(
        library,
        player,
        shutdown,
        cfg.interval(),
        LogContext::new("Scheduler", &instance),
    );

    info!(
        "[keep-speaker-on] running every {} minute(s), level {} – Ctrl+C to stop",
        cfg.settings.interval_minutes, cfg.logging.log_level
    );
    scheduler.run();

    Ok(())
}
