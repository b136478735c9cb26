pub mod logger;

pub mod cli;
pub mod compressor;
pub mod config;
pub mod constants;
pub mod error;
pub mod file;
pub mod formats;
pub mod host;
pub mod processing;
pub mod session;
pub mod sinks;
pub mod utils;
pub mod validation;

pub use compressor::{CompressOptions, Compressor};
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use file::{CompressedBlob, ImageFile};
pub use formats::MediaType;
pub use host::{Host, HostCommand};
pub use processing::ImageCompressor;
pub use session::{
    ApplyOutcome, CompressionRequest, CompressionResponse, CompressionSummary,
    ImageCompressionSession, SessionPhase,
};
pub use sinks::{
    ConsoleNotifier, DirectoryDownloadSink, DownloadSink, NotificationSink, RecordingNotifier,
};
pub use utils::{compressed_file_name, format_file_size, Savings};
