//! Line-oriented host that binds text commands to session operations.
//!
//! Each input line is one UI event. Compressions run as background tasks and
//! their completions are fed back into the session as they arrive, so a new
//! `open` or `commit` issued while a compression is outstanding supersedes it.

use crate::compressor::Compressor;
use crate::constants::{
    COMPRESSED_SIZE_PREFIX, ORIGINAL_SIZE_PREFIX, QUALITY_PREFIX, SAVED_FILE_PREFIX,
    SAVINGS_PREFIX,
};
use crate::error::{Result, SessionError};
use crate::file::ImageFile;
use crate::session::{
    ApplyOutcome, CompressionResponse, CompressionSummary, ImageCompressionSession,
};
use crate::sinks::{DownloadSink, NotificationSink};
use crate::utils::format_file_size;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};

pub const HELP_TEXT: &str = "\
Commands:
  open <path>     load a JPEG/PNG image and compress it
  quality <0-100> set the quality (applied on commit)
  commit          recompress with the current quality
  download        save the compressed image
  status          show sizes and savings
  reset           forget the current image
  help            show this help
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Only the first path of a multi-path drop is used
    Open(PathBuf),
    Quality(u8),
    Commit,
    Download,
    Status,
    Reset,
    Help,
    Quit,
}

impl FromStr for HostCommand {
    type Err = SessionError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Err(SessionError::InvalidCommand(line.to_string()));
        };

        match verb.to_lowercase().as_str() {
            "open" | "drop" => parts
                .next()
                .map(|path| HostCommand::Open(PathBuf::from(path)))
                .ok_or_else(|| SessionError::InvalidCommand(line.to_string())),
            "quality" | "q" => parts
                .next()
                .and_then(|value| value.parse::<u32>().ok())
                // The input surface clamps to the slider range
                .map(|value| HostCommand::Quality(value.min(100) as u8))
                .ok_or_else(|| SessionError::InvalidCommand(line.to_string())),
            "commit" => Ok(HostCommand::Commit),
            "download" | "save" => Ok(HostCommand::Download),
            "status" => Ok(HostCommand::Status),
            "reset" => Ok(HostCommand::Reset),
            "help" | "?" => Ok(HostCommand::Help),
            "quit" | "exit" => Ok(HostCommand::Quit),
            _ => Err(SessionError::InvalidCommand(line.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Host<C, N, D> {
    session: ImageCompressionSession<C, N>,
    downloads: D,
    in_flight: JoinSet<CompressionResponse>,
}

impl<C, N, D> Host<C, N, D>
where
    C: Compressor + 'static,
    N: NotificationSink,
    D: DownloadSink,
{
    pub fn new(session: ImageCompressionSession<C, N>, downloads: D) -> Self {
        Self {
            session,
            downloads,
            in_flight: JoinSet::new(),
        }
    }

    pub fn session(&self) -> &ImageCompressionSession<C, N> {
        &self.session
    }

    pub fn into_session(self) -> ImageCompressionSession<C, N> {
        self.session
    }

    /// Processes commands until `quit` or end of input, then waits for
    /// outstanding compressions.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if self.handle_line(&line).await == Flow::Quit {
                        break;
                    }
                }
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.apply_joined(joined);
                }
            }
        }

        self.settle().await;
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Flow::Continue;
        }

        match line.parse::<HostCommand>() {
            Ok(command) => self.handle(command).await,
            Err(err) => {
                crate::warn!("{} (type `help` for commands)", err);
                Flow::Continue
            }
        }
    }

    async fn handle(&mut self, command: HostCommand) -> Flow {
        match command {
            HostCommand::Open(path) => self.open(path),
            HostCommand::Quality(value) => {
                self.session.set_quality(value);
                crate::info!("{} {}%", QUALITY_PREFIX, value);
            }
            HostCommand::Commit => self.spawn_compression(),
            HostCommand::Download => {
                self.settle().await;
                match self.session.download_compressed_result(&self.downloads) {
                    Ok(Some(file_name)) => crate::info!("{} {}", SAVED_FILE_PREFIX, file_name),
                    Ok(None) => crate::verbose!("Nothing to download yet"),
                    Err(err) => crate::verbose!("Download failed: {}", err),
                }
            }
            HostCommand::Status => {
                self.settle().await;
                self.render_status();
            }
            HostCommand::Reset => {
                self.in_flight.abort_all();
                self.session.reset();
                crate::info!("🧹 Session cleared");
            }
            HostCommand::Help => crate::info!("{}", HELP_TEXT),
            HostCommand::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    fn open(&mut self, path: PathBuf) {
        let file = match ImageFile::from_path(&path) {
            Ok(file) => file,
            Err(err) => {
                self.session.notifier().notify(&err.notification());
                return;
            }
        };

        let size = file.size();
        if self.session.accept_image(file).is_ok() {
            crate::info!("📁 Loaded: {:?}", path);
            crate::info!("{} {}", ORIGINAL_SIZE_PREFIX, format_file_size(size));
            self.spawn_compression();
        }
    }

    fn spawn_compression(&mut self) {
        let Some(request) = self.session.begin_compression() else {
            crate::verbose!("No image loaded, nothing to compress");
            return;
        };

        let compressor = self.session.compressor();
        self.in_flight
            .spawn(async move { request.run(compressor.as_ref()).await });
    }

    async fn settle(&mut self) {
        while let Some(joined) = self.in_flight.join_next().await {
            self.apply_joined(joined);
        }
    }

    fn apply_joined(&mut self, joined: std::result::Result<CompressionResponse, JoinError>) {
        let response = match joined {
            Ok(response) => response,
            Err(err) if err.is_cancelled() => {
                crate::verbose!("Compression task cancelled");
                return;
            }
            Err(err) => {
                crate::error!("Compression task panicked: {}", err);
                return;
            }
        };

        match self.session.apply(response) {
            Ok(ApplyOutcome::Updated(summary)) => render_summary(&summary),
            Ok(ApplyOutcome::Stale { .. }) => {}
            // Already surfaced through the notifier
            Err(_) => {}
        }
    }

    fn render_status(&self) {
        let Some(original) = self.session.original() else {
            crate::info!("📭 No image loaded");
            return;
        };

        crate::info!("📁 {} ({})", original.name(), original.media_type());
        crate::info!(
            "{} {:.0}%",
            QUALITY_PREFIX,
            self.session.quality() * 100.0
        );

        match self.session.summary() {
            Some(summary) => {
                if let Some(result) = self.session.compressed() {
                    crate::info!("🔁 Result #{}", result.generation());
                }
                render_summary(&summary);
                if !self.session.is_result_current() {
                    crate::info!("⏳ Quality changed since last compression, `commit` to refresh");
                }
            }
            None => crate::info!("{} {}", ORIGINAL_SIZE_PREFIX, format_file_size(original.size())),
        }
    }
}

fn render_summary(summary: &CompressionSummary) {
    crate::info!(
        "{} {}",
        ORIGINAL_SIZE_PREFIX,
        format_file_size(summary.original_size)
    );
    crate::info!(
        "{} {} ({} {})",
        COMPRESSED_SIZE_PREFIX,
        format_file_size(summary.compressed_size),
        SAVINGS_PREFIX,
        summary.savings
    );
}
