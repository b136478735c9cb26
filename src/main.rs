use anyhow::{bail, Context};
use clap::Parser;
use img_squeeze_session::cli::{Args, Commands, SessionArgs};
use img_squeeze_session::constants::{COMPRESSED_SIZE_PREFIX, ORIGINAL_SIZE_PREFIX, SAVED_FILE_PREFIX};
use img_squeeze_session::utils::create_progress_spinner;
use img_squeeze_session::{
    format_file_size, logger, ConsoleNotifier, DirectoryDownloadSink, Host,
    ImageCompressionSession, ImageCompressor, ImageFile, SessionConfig,
};
use img_squeeze_session::logger::LogLevel;
use img_squeeze_session::{error, info, warn};
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::set_level(LogLevel::from_flags(args.quiet, args.verbose));

    match args.command {
        Commands::Compress { input, session } => compress_once(&input, &session).await,
        Commands::Interactive { session } => run_interactive(&session).await,
    }
}

fn setup_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .unwrap_or_else(|e| {
                warn!("Failed to set thread pool size: {}", e);
            });
    }
}

fn new_session(args: &SessionArgs) -> anyhow::Result<ImageCompressionSession<ImageCompressor, ConsoleNotifier>> {
    setup_thread_pool(args.threads);
    let config = SessionConfig::new(args.quality, !args.no_worker)?;
    Ok(ImageCompressionSession::with_config(
        ImageCompressor::new(),
        ConsoleNotifier,
        config,
    ))
}

async fn compress_once(input: &Path, args: &SessionArgs) -> anyhow::Result<()> {
    let mut session = new_session(args)?;
    let output_dir = args.output.clone().unwrap_or_else(|| default_output_dir(input));

    info!("🗜️  Compressing image: {:?}", input);
    let file = ImageFile::from_path(input).with_context(|| format!("cannot read {:?}", input))?;
    info!("{} {}", ORIGINAL_SIZE_PREFIX, format_file_size(file.size()));

    let pb = create_progress_spinner("Compressing...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    let submitted = session.submit_image(file).await;
    pb.finish_and_clear();
    submitted?;

    let Some(summary) = session.summary() else {
        bail!("no compressed result was produced");
    };
    info!(
        "{} {} (saved {})",
        COMPRESSED_SIZE_PREFIX,
        format_file_size(summary.compressed_size),
        summary.savings
    );
    if !summary.savings.is_reduction() {
        warn!("Compressed output is not smaller than the original");
    }

    let sink = DirectoryDownloadSink::new(&output_dir);
    match session.download_compressed_result(&sink)? {
        Some(file_name) => info!("{} {:?}", SAVED_FILE_PREFIX, sink.dir().join(file_name)),
        None => {
            error!("Nothing to save");
        }
    }

    Ok(())
}

async fn run_interactive(args: &SessionArgs) -> anyhow::Result<()> {
    let session = new_session(args)?;
    let output_dir = args.output.clone().unwrap_or_else(|| PathBuf::from("."));

    info!("🖼️  Interactive session, saving to {:?}. Type `help` for commands.", output_dir);
    let mut host = Host::new(session, DirectoryDownloadSink::new(output_dir));
    host.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}

fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
