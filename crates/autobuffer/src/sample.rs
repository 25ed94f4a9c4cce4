use std::{fmt, time::Duration};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time::Instant,
};

use crate::error::{AutobufferError, AutobufferResult};

/// Throughput measured while reading a sample, in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Bandwidth(f64);

impl Bandwidth {
    pub fn new(bytes_per_second: f64) -> Self {
        Self(bytes_per_second)
    }

    /// A sample read in no measurable time is infinitely fast.
    pub fn from_sample(bytes: u64, elapsed: Duration) -> Self {
        let seconds = elapsed.as_secs_f64();
        if bytes == 0 {
            Self(0.)
        } else if seconds == 0. {
            Self(f64::INFINITY)
        } else {
            Self(bytes as f64 / seconds)
        }
    }

    pub fn bytes_per_second(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [&str; 4] = ["B/s", "KiB/s", "MiB/s", "GiB/s"];

        if !self.0.is_finite() {
            return write!(f, "∞ B/s");
        }

        let mut value = self.0;
        let mut unit = 0;
        while value >= 1024. && unit < UNITS.len() - 1 {
            value /= 1024.;
            unit += 1;
        }
        write!(f, "{value:.2} {}", UNITS[unit])
    }
}

/// Leading part of a body, read only to measure throughput.
#[derive(Debug)]
pub struct Sample {
    pub data: Vec<u8>,
    pub elapsed: Duration,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bandwidth(&self) -> Bandwidth {
        Bandwidth::from_sample(self.data.len() as u64, self.elapsed)
    }
}

/// Reads at most `limit` bytes from `reader` and times how long it took.
///
/// A body that ends before `limit` yields a shorter sample rather than an error.
pub async fn read_sample<R>(
    reader: &mut R,
    limit: usize,
    size_hint: u64,
) -> AutobufferResult<Sample>
where
    R: AsyncRead + Unpin,
{
    let capacity = (limit as u64).min(size_hint) as usize;
    let mut data = Vec::with_capacity(capacity);

    let started_at = Instant::now();
    reader
        .take(limit as u64)
        .read_to_end(&mut data)
        .await
        .map_err(AutobufferError::NetworkReadError)?;
    let elapsed = started_at.elapsed();

    if data.len() < limit {
        log::debug!(
            "Body ended after {} bytes, sampling with partial data",
            data.len()
        );
    }

    Ok(Sample { data, elapsed })
}
