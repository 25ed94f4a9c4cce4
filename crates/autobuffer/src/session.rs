use std::{path::Path, time::Duration};

use bytes::Bytes;
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use reqwest::{
    header::{HeaderMap, CONTENT_LENGTH},
    Client,
};
use tokio::{fs::File, io::BufWriter, sync::mpsc};
use tokio_util::io::StreamReader;

use crate::{
    config::StreamConfig,
    error::{AutobufferError, AutobufferResult},
    stream::StreamEvent,
};

pub type HttpBody = StreamReader<BoxStream<'static, std::io::Result<Bytes>>, Bytes>;
pub type HttpTransferSession = TransferSession<HttpBody, BufWriter<File>>;

/// HTTP basic auth credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct EventSender(Option<mpsc::UnboundedSender<StreamEvent>>);

impl EventSender {
    pub(crate) fn emit(&self, event: StreamEvent) {
        if let Some(sender) = &self.0 {
            // the receiver may have been dropped, nobody is listening then
            _ = sender.send(event);
        }
    }
}

/// One transfer of a remote body into a local sink.
///
/// The session owns both ends and releases them together once
/// [`TransferSession::stream`] returns, whatever the outcome.
pub struct TransferSession<R, W> {
    pub(crate) size: u64,
    pub(crate) duration: Duration,
    pub(crate) reader: R,
    pub(crate) writer: W,
    pub(crate) config: StreamConfig,
    pub(crate) events: EventSender,
}

impl<R, W> TransferSession<R, W> {
    pub fn new(size: u64, duration: Duration, reader: R, writer: W) -> Self {
        Self {
            size,
            duration,
            reader,
            writer,
            config: StreamConfig::default(),
            events: EventSender::default(),
        }
    }

    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<StreamEvent>) -> Self {
        self.events = EventSender(Some(events));
        self
    }

    /// Expected body size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Playback duration of the remote video.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl HttpTransferSession {
    /// Requests `url` and opens `output` for writing.
    ///
    /// The output file is only created once the response carried a usable
    /// `Content-Length`, so a failed connect leaves nothing behind.
    pub async fn connect(
        client: &Client,
        url: &str,
        duration: Duration,
        output: impl AsRef<Path>,
        credentials: Option<&Credentials>,
    ) -> AutobufferResult<Self> {
        let mut request = client.get(url);
        if let Some(credentials) = credentials {
            request = request.basic_auth(&credentials.username, credentials.password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|source| AutobufferError::ConnectionError {
                url: url.to_string(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(AutobufferError::HttpError(response.status()));
        }

        let size = content_length(response.headers()).ok_or(AutobufferError::MissingContentLength)?;

        let output = output.as_ref();
        let file = File::create(output)
            .await
            .map_err(|source| AutobufferError::FileCreateError {
                path: output.to_path_buf(),
                source,
            })?;
        log::debug!("Writing {size} bytes from {url} to {}", output.display());

        let body = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();

        Ok(Self::new(
            size,
            duration,
            StreamReader::new(body),
            BufWriter::new(file),
        ))
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        // `u64::from_str` would also take a leading `+`
        .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|v| v.parse::<u64>().ok())
}
