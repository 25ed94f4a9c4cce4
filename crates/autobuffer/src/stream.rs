use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    config::StreamConfig,
    error::{AutobufferError, AutobufferResult},
    estimate::{estimate_buffer_time, BufferEstimate},
    sample::{read_sample, Bandwidth},
    session::{EventSender, TransferSession},
};

/// Progress notifications of a transfer, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Bandwidth sampling has started.
    Sampling,
    Sampled {
        bandwidth: Bandwidth,
        estimate: BufferEstimate,
    },
    /// The rest of the body is being copied.
    Buffering { buffer_time: Duration },
    /// Enough of the file is on disk to start playing it. Sent exactly once.
    ReadyToPlay,
    Finished { bytes: u64 },
}

#[derive(Debug, Clone)]
pub struct StreamReport {
    /// Bytes written to the output, sample included.
    pub bytes: u64,
    pub sampled: u64,
    pub bandwidth: Bandwidth,
    pub estimate: BufferEstimate,
}

impl<R, W> TransferSession<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Samples the bandwidth, then copies the whole body to the output and
    /// announces when playback can start.
    ///
    /// Whatever was received before a failure is flushed to the output.
    pub async fn stream(self) -> AutobufferResult<StreamReport> {
        let Self {
            size,
            duration,
            mut reader,
            mut writer,
            config,
            events,
        } = self;

        let result = transfer(&mut reader, &mut writer, size, duration, &config, &events).await;
        if result.is_err() {
            if let Err(e) = writer.flush().await {
                log::warn!("Failed to flush partial output: {e}");
            }
        }
        result
    }
}

async fn transfer<R, W>(
    reader: &mut R,
    writer: &mut W,
    size: u64,
    duration: Duration,
    config: &StreamConfig,
    events: &EventSender,
) -> AutobufferResult<StreamReport>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    events.emit(StreamEvent::Sampling);
    let sample = read_sample(reader, config.sample_size, size).await?;
    let bandwidth = sample.bandwidth();
    let estimate = estimate_buffer_time(size, bandwidth, duration, config.fudge_factor);
    log::info!(
        "Sampled {} bytes in {:?} ({bandwidth}), download time {:?}, buffer time {:?}",
        sample.len(),
        sample.elapsed,
        estimate.download_time,
        estimate.buffer_time
    );
    events.emit(StreamEvent::Sampled {
        bandwidth,
        estimate,
    });

    writer
        .write_all(&sample.data)
        .await
        .map_err(AutobufferError::FileWriteError)?;
    let sampled = sample.len() as u64;
    drop(sample);

    events.emit(StreamEvent::Buffering {
        buffer_time: estimate.buffer_time,
    });

    let ready = tokio::time::sleep(estimate.buffer_time);
    tokio::pin!(ready);
    let copy = copy_body(reader, writer, config.chunk_size);
    tokio::pin!(copy);

    let mut notified = false;
    let copied = loop {
        tokio::select! {
            result = &mut copy => break result?,
            _ = &mut ready, if !notified => {
                notified = true;
                log::debug!("Buffer time elapsed");
                events.emit(StreamEvent::ReadyToPlay);
            }
        }
    };
    // the copy beat the timer, the file is complete
    if !notified {
        events.emit(StreamEvent::ReadyToPlay);
    }

    let bytes = sampled + copied;
    if bytes != size {
        log::warn!("Expected {size} bytes but received {bytes}");
    }
    events.emit(StreamEvent::Finished { bytes });

    Ok(StreamReport {
        bytes,
        sampled,
        bandwidth,
        estimate,
    })
}

async fn copy_body<R, W>(
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
) -> AutobufferResult<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut copied = 0u64;

    loop {
        let read = reader
            .read(&mut buffer)
            .await
            .map_err(AutobufferError::NetworkReadError)?;
        if read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..read])
            .await
            .map_err(AutobufferError::FileWriteError)?;
        copied += read as u64;
    }

    writer
        .flush()
        .await
        .map_err(AutobufferError::FileWriteError)?;
    Ok(copied)
}
