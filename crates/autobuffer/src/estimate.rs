use std::time::Duration;

use crate::sample::Bandwidth;

/// How long the whole file is expected to take, and how long to wait before playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferEstimate {
    pub download_time: Duration,
    pub buffer_time: Duration,
}

/// Estimates the wait before playback can start without catching up with the download.
///
/// `download_time = total_size / bandwidth * fudge_factor`, and the buffer time is
/// whatever part of it exceeds the playback duration.
pub fn estimate_buffer_time(
    total_size: u64,
    bandwidth: Bandwidth,
    duration: Duration,
    fudge_factor: f64,
) -> BufferEstimate {
    let download_time = if total_size == 0 {
        Duration::ZERO
    } else {
        let seconds = total_size as f64 / bandwidth.bytes_per_second() * fudge_factor;
        if seconds.is_nan() || seconds <= 0. {
            Duration::ZERO
        } else {
            // zero bandwidth saturates
            Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
        }
    };

    BufferEstimate {
        download_time,
        buffer_time: download_time.saturating_sub(duration),
    }
}
