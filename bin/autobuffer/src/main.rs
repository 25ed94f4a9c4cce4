mod args;

use args::AutobufferArgs;
use autobuffer::{HttpTransferSession, StreamEvent};
use clap::CommandFactory;
use tokio::sync::mpsc;

fn init_logger(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else {
        builder.filter_level(log::LevelFilter::Warn);
    }
    builder.init();
}

async fn print_events(mut events: mpsc::UnboundedReceiver<StreamEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::Sampling => println!("Calculating available downstream bandwidth..."),
            StreamEvent::Sampled {
                bandwidth,
                estimate,
            } => log::info!(
                "Available bandwidth {bandwidth}, estimated download time {:?}",
                estimate.download_time
            ),
            StreamEvent::Buffering { buffer_time } => {
                println!("Buffering your video...");
                log::info!("Playback can start in {buffer_time:?}");
            }
            StreamEvent::ReadyToPlay => println!("This video is ready to play."),
            StreamEvent::Finished { bytes } => log::info!("Downloaded {bytes} bytes"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AutobufferArgs::parse_args(std::env::args_os());
    init_logger(args.verbose);

    let (Some(url), Some(duration)) = (args.url.clone(), args.duration) else {
        println!("A video url and duration is required for autobuffer. Usage:");
        AutobufferArgs::command().print_help()?;
        return Ok(());
    };

    let client = args.client()?;
    let credentials = args.credentials();
    let session = match HttpTransferSession::connect(
        &client,
        &url,
        duration,
        &args.out,
        credentials.as_ref(),
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            println!("Error creating video stream: {e}");
            return Ok(());
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(rx));
    let result = session
        .with_config(args.config())
        .with_events(tx)
        .stream()
        .await;
    printer.await?;

    if let Err(e) = result {
        println!("Error streaming {url}: {e}");
    }

    Ok(())
}
