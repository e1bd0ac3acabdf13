//! Container/codec sniffing so unplayable files are rejected before the
//! output device is touched.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::core::{PlaybackError, PlaybackResult};

#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    pub sample_rate: Option<u32>,
    pub channels: Option<usize>,
    pub duration: Option<Duration>,
}

pub fn probe_file(path: &Path) -> PlaybackResult<AudioInfo> {
    let file = File::open(path).map_err(|source| PlaybackError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let unsupported = |message: String| PlaybackError::Unsupported {
        path: path.to_path_buf(),
        message,
    };

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| unsupported(e.to_string()))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| unsupported("no audio track".to_string()))?;
    let params = &track.codec_params;

    symphonia::default::get_codecs()
        .make(params, &DecoderOptions::default())
        .map_err(|e| unsupported(e.to_string()))?;

    let duration = match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => {
            Some(Duration::from_secs_f64(frames as f64 / rate as f64))
        }
        _ => None,
    };

    Ok(AudioInfo {
        sample_rate: params.sample_rate,
        channels: params.channels.map(|c| c.count()),
        duration,
    })
}
