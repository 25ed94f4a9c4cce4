/// Tunables of a transfer.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Number of bytes read up front to measure the available bandwidth.
    pub sample_size: usize,
    /// Multiplier applied to the estimated download time.
    pub fudge_factor: f64,
    /// Buffer size used while copying the rest of the body.
    pub chunk_size: usize,
}

impl StreamConfig {
    pub const DEFAULT_SAMPLE_SIZE: usize = 30_000_000;
    pub const DEFAULT_FUDGE_FACTOR: f64 = 1.2;
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    pub fn with_fudge_factor(mut self, fudge_factor: f64) -> Self {
        self.fudge_factor = fudge_factor;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_size: Self::DEFAULT_SAMPLE_SIZE,
            fudge_factor: Self::DEFAULT_FUDGE_FACTOR,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }
}
