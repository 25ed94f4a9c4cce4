//! Downloads a remote video into a local file and tells when it is safe to
//! start playing it while the download is still running.
//!
//! ```text
//! ┌──────────┐  sample   ┌───────────┐  estimate  ┌────────────────────────┐
//! │  HTTP    ├──────────►│ Bandwidth ├───────────►│ copy ──► output file   │
//! │  body    │           └───────────┘            │ timer ──► ReadyToPlay  │
//! └──────────┘                                    └────────────────────────┘
//! ```

pub mod config;
pub mod duration;
pub mod error;
pub mod estimate;
pub mod sample;
pub mod session;
pub mod stream;

pub use config::StreamConfig;
pub use duration::parse_duration;
pub use error::{AutobufferError, AutobufferResult};
pub use estimate::{estimate_buffer_time, BufferEstimate};
pub use sample::Bandwidth;
pub use session::{Credentials, HttpTransferSession, TransferSession};
pub use stream::{StreamEvent, StreamReport};
