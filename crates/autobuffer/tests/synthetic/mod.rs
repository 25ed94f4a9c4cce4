use std::time::Duration;

use autobuffer::{AutobufferError, StreamConfig, StreamEvent, TransferSession};
use tokio::{io::BufWriter, sync::mpsc};

use crate::common::{
    broken, collect_events, fixed_rate, init_test_logger, ready_count, test_data, FailingWriter,
};

#[tokio::test(start_paused = true)]
async fn test_output_matches_body() -> anyhow::Result<()> {
    init_test_logger();
    let data = test_data(50_000);
    let reader = fixed_rate(&data, 1000, Duration::from_millis(10));
    let mut output = Vec::new();

    let size = data.len() as u64;
    let report = TransferSession::new(size, Duration::from_secs(1), reader, &mut output)
        .with_config(
            StreamConfig::default()
                .with_sample_size(8000)
                .with_chunk_size(333),
        )
        .stream()
        .await?;

    assert_eq!(output, data);
    assert_eq!(report.bytes, data.len() as u64);
    assert_eq!(report.sampled, 8000);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_bandwidth_matches_sample_rate() -> anyhow::Result<()> {
    init_test_logger();
    // 10 chunks of 100 bytes, one every 100ms: 1000 bytes in 1s
    let data = test_data(2000);
    let reader = fixed_rate(&data, 100, Duration::from_millis(100));

    let report = TransferSession::new(data.len() as u64, Duration::from_secs(1), reader, Vec::new())
        .with_config(StreamConfig::default().with_sample_size(1000))
        .stream()
        .await?;

    let bandwidth = report.bandwidth.bytes_per_second();
    assert!(
        (bandwidth - 1000.).abs() / 1000. < 0.01,
        "unexpected bandwidth {bandwidth}"
    );
    // 2000 bytes at 1000 B/s with the default fudge factor, minus 1s of playback
    let buffer_time = report.estimate.buffer_time.as_secs_f64();
    assert!((buffer_time - 1.4).abs() < 0.05, "unexpected buffer time {buffer_time}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_ready_fires_once_during_copy() -> anyhow::Result<()> {
    init_test_logger();
    // buffer time is ~1.4s while the remaining 1500 bytes take 1.5s
    let data = test_data(2000);
    let reader = fixed_rate(&data, 100, Duration::from_millis(100));
    let (tx, rx) = mpsc::unbounded_channel();

    TransferSession::new(data.len() as u64, Duration::from_secs(1), reader, Vec::new())
        .with_config(StreamConfig::default().with_sample_size(500))
        .with_events(tx)
        .stream()
        .await?;

    let events = collect_events(rx).await;
    assert_eq!(ready_count(&events), 1);
    assert!(matches!(events[0], StreamEvent::Sampling));
    assert!(matches!(events[1], StreamEvent::Sampled { .. }));
    assert!(matches!(events[2], StreamEvent::Buffering { .. }));
    assert!(matches!(events[3], StreamEvent::ReadyToPlay));
    assert_eq!(events[4], StreamEvent::Finished { bytes: 2000 });
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_ready_fires_on_completion_when_copy_is_faster() -> anyhow::Result<()> {
    init_test_logger();
    // the estimate assumes a huge file, but the body ends right after the sample
    let data = test_data(300);
    let reader = fixed_rate(&data, 100, Duration::from_secs(1));
    let (tx, rx) = mpsc::unbounded_channel();

    let report = TransferSession::new(1_000_000, Duration::ZERO, reader, Vec::new())
        .with_config(StreamConfig::default().with_sample_size(100))
        .with_events(tx)
        .stream()
        .await?;
    assert!(report.estimate.buffer_time > Duration::from_secs(3600));

    let events = collect_events(rx).await;
    assert_eq!(ready_count(&events), 1);
    assert_eq!(events.last(), Some(&StreamEvent::Finished { bytes: 300 }));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_no_buffer_for_fast_download() -> anyhow::Result<()> {
    init_test_logger();
    let data = test_data(4000);
    let reader = fixed_rate(&data, 1000, Duration::from_millis(1));

    let size = data.len() as u64;
    let report = TransferSession::new(size, Duration::from_secs(60), reader, Vec::new())
        .with_config(StreamConfig::default().with_sample_size(1000))
        .stream()
        .await?;

    assert_eq!(report.estimate.buffer_time, Duration::ZERO);
    assert!(report.estimate.download_time < Duration::from_secs(60));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_tiny_body_uses_partial_sample() -> anyhow::Result<()> {
    init_test_logger();
    let data = test_data(10);
    let reader = fixed_rate(&data, 10, Duration::from_millis(5));
    let mut output = Vec::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let report = TransferSession::new(10, Duration::from_secs(1), reader, &mut output)
        .with_events(tx)
        .stream()
        .await?;

    assert_eq!(output, data);
    assert_eq!(report.sampled, 10);
    assert!(report.bandwidth.bytes_per_second() > 0.);
    assert_eq!(ready_count(&collect_events(rx).await), 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_body() -> anyhow::Result<()> {
    init_test_logger();
    let mut output = Vec::new();

    let report = TransferSession::new(0, Duration::from_secs(1), &b""[..], &mut output)
        .stream()
        .await?;

    assert!(output.is_empty());
    assert_eq!(report.bytes, 0);
    assert_eq!(report.estimate.buffer_time, Duration::ZERO);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_read_error_aborts_transfer() {
    init_test_logger();
    let data = test_data(200);
    let reader = broken(&data, Duration::from_secs(1));
    let (tx, rx) = mpsc::unbounded_channel();

    let result = TransferSession::new(1_000_000, Duration::from_secs(1), reader, Vec::new())
        .with_config(StreamConfig::default().with_sample_size(100))
        .with_events(tx)
        .stream()
        .await;

    assert!(matches!(result, Err(AutobufferError::NetworkReadError(_))));
    assert_eq!(ready_count(&collect_events(rx).await), 0);
}

#[tokio::test(start_paused = true)]
async fn test_read_error_during_sample() {
    init_test_logger();
    let data = test_data(50);
    let reader = broken(&data, Duration::from_millis(10));

    let result = TransferSession::new(1000, Duration::from_secs(1), reader, Vec::new())
        .with_config(StreamConfig::default().with_sample_size(100))
        .stream()
        .await;

    assert!(matches!(result, Err(AutobufferError::NetworkReadError(_))));
}

#[tokio::test]
async fn test_write_error_aborts_transfer() {
    init_test_logger();
    let data = test_data(100);

    let result = TransferSession::new(100, Duration::from_secs(1), data.as_slice(), FailingWriter)
        .with_config(StreamConfig::default().with_sample_size(10))
        .stream()
        .await;

    assert!(matches!(result, Err(AutobufferError::FileWriteError(_))));
}

#[tokio::test(start_paused = true)]
async fn test_read_error_flushes_received_data() {
    init_test_logger();
    let data = test_data(200);
    let reader = broken(&data, Duration::from_millis(10));
    let mut output = Vec::new();

    let writer = BufWriter::new(&mut output);
    let result = TransferSession::new(1000, Duration::from_secs(1), reader, writer)
        .with_config(StreamConfig::default().with_sample_size(50))
        .stream()
        .await;

    assert!(matches!(result, Err(AutobufferError::NetworkReadError(_))));
    assert_eq!(output, data);
}
