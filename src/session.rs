//! The single-image compression session.
//!
//! A session holds at most one original image and the latest compressed
//! result derived from it. Compression is modelled as a request/response pair
//! tagged with a generation number: every submission and every new request
//! bumps the generation, and a response is only applied while its generation
//! is still the latest. Hosts that run requests concurrently can therefore
//! feed completions back in any order without an older result overwriting a
//! newer one.

use crate::compressor::{CompressOptions, Compressor};
use crate::config::SessionConfig;
use crate::constants::MAX_QUALITY;
use crate::error::{Result, SessionError};
use crate::file::{CompressedBlob, ImageFile};
use crate::formats::MediaType;
use crate::sinks::{DownloadSink, NotificationSink};
use crate::utils::{compressed_file_name, Savings};
use std::sync::Arc;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    HasOriginal,
    HasCompressed,
}

/// A compressed result together with the inputs it was produced from
#[derive(Debug, Clone)]
pub struct CompressedResult {
    blob: CompressedBlob,
    quality: f32,
    generation: u64,
}

impl CompressedResult {
    pub fn blob(&self) -> &CompressedBlob {
        &self.blob
    }

    pub fn size(&self) -> u64 {
        self.blob.size()
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Before/after sizes of the current result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionSummary {
    pub original_size: u64,
    pub compressed_size: u64,
    pub savings: Savings,
}

impl CompressionSummary {
    pub fn new(original_size: u64, compressed_size: u64) -> Self {
        Self {
            original_size,
            compressed_size,
            savings: Savings::between(original_size, compressed_size),
        }
    }
}

/// A snapshot of everything a compressor needs, detached from the session
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    generation: u64,
    file: ImageFile,
    options: CompressOptions,
}

impl CompressionRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file(&self) -> &ImageFile {
        &self.file
    }

    pub fn options(&self) -> &CompressOptions {
        &self.options
    }

    pub async fn run<C: Compressor + ?Sized>(self, compressor: &C) -> CompressionResponse {
        let result = compressor.compress(&self.file, &self.options).await;
        CompressionResponse {
            generation: self.generation,
            quality: self.options.quality,
            result,
        }
    }
}

/// The single outcome of a `CompressionRequest`
#[derive(Debug)]
pub struct CompressionResponse {
    generation: u64,
    quality: f32,
    result: Result<CompressedBlob>,
}

impl CompressionResponse {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What `apply` did with a response
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The response was the latest one and is now the session's result
    Updated(CompressionSummary),
    /// A newer request superseded this response; it was discarded
    Stale { generation: u64, latest: u64 },
}

pub struct ImageCompressionSession<C, N> {
    compressor: Arc<C>,
    notifier: N,
    config: SessionConfig,
    original: Option<ImageFile>,
    compressed: Option<CompressedResult>,
    quality: f32,
    generation: u64,
}

impl<C: Compressor, N: NotificationSink> ImageCompressionSession<C, N> {
    pub fn new(compressor: C, notifier: N) -> Self {
        Self::with_config(compressor, notifier, SessionConfig::default())
    }

    pub fn with_config(compressor: C, notifier: N, config: SessionConfig) -> Self {
        let quality = quality_fraction(config.quality);
        Self {
            compressor: Arc::new(compressor),
            notifier,
            config,
            original: None,
            compressed: None,
            quality,
            generation: 0,
        }
    }

    /// Accepts a new original and compresses it.
    ///
    /// Fails only when the declared media type is not accepted, in which case
    /// the session is left exactly as it was. A compression failure is
    /// reported through the notifier and leaves the new original in place.
    pub async fn submit_image(&mut self, file: ImageFile) -> Result<()> {
        self.accept_image(file)?;

        if let Err(err) = self.recompress().await {
            crate::verbose!("Submission kept without a compressed result: {}", err);
        }

        Ok(())
    }

    /// Validates and stores a new original without compressing it.
    ///
    /// Clears the previous result and invalidates any request still in flight.
    pub fn accept_image(&mut self, file: ImageFile) -> Result<()> {
        if let Err(err) = MediaType::from_declared(file.media_type()) {
            crate::verbose!("Rejected {:?}: {}", file.name(), err);
            self.notifier.notify(&err.notification());
            return Err(err);
        }

        crate::verbose!(
            "Accepted {:?} ({}, {} bytes)",
            file.name(),
            file.media_type(),
            file.size()
        );
        self.original = Some(file);
        self.compressed = None;
        self.generation += 1;
        Ok(())
    }

    /// Sets quality from the 0-100 input scale. Does not recompress.
    pub fn set_quality(&mut self, value: u8) {
        self.quality = quality_fraction(value.min(MAX_QUALITY));
    }

    /// Recompresses with the quality in effect once the input has settled.
    pub async fn commit_quality(&mut self) -> Result<Option<CompressionSummary>> {
        self.recompress().await
    }

    /// Compresses the current original with the current quality.
    ///
    /// Returns `Ok(None)` when there is no original. On failure the previous
    /// result is kept and the user is notified.
    pub async fn recompress(&mut self) -> Result<Option<CompressionSummary>> {
        let Some(request) = self.begin_compression() else {
            return Ok(None);
        };

        let response = request.run(self.compressor.as_ref()).await;
        match self.apply(response)? {
            ApplyOutcome::Updated(summary) => Ok(Some(summary)),
            ApplyOutcome::Stale { .. } => Ok(None),
        }
    }

    /// Starts a compression request for the current original, if any.
    ///
    /// Any request issued before this one becomes stale.
    pub fn begin_compression(&mut self) -> Option<CompressionRequest> {
        let file = self.original.clone()?;
        self.generation += 1;

        crate::verbose!(
            "Compression request #{} for {:?} at quality {:.2}",
            self.generation,
            file.name(),
            self.quality
        );

        Some(CompressionRequest {
            generation: self.generation,
            file,
            options: self.config.compress_options(self.quality),
        })
    }

    /// Applies a finished request if it is still the latest one.
    ///
    /// Stale responses are discarded without touching state or notifying.
    /// A failed latest response notifies the user and returns the error.
    pub fn apply(&mut self, response: CompressionResponse) -> Result<ApplyOutcome> {
        if response.generation != self.generation {
            crate::verbose!(
                "Discarding stale compression #{} (latest is #{})",
                response.generation,
                self.generation
            );
            return Ok(ApplyOutcome::Stale {
                generation: response.generation,
                latest: self.generation,
            });
        }

        let blob = match response.result {
            Ok(blob) => blob,
            Err(err) => {
                let err = if matches!(err, SessionError::CompressionFailure(_)) {
                    err
                } else {
                    SessionError::CompressionFailure(err.to_string())
                };
                crate::verbose!("Compression #{} failed: {}", response.generation, err);
                self.notifier.notify(&err.notification());
                return Err(err);
            }
        };

        let original_size = self.original.as_ref().map_or(0, ImageFile::size);
        let summary = CompressionSummary::new(original_size, blob.size());

        self.compressed = Some(CompressedResult {
            blob,
            quality: response.quality,
            generation: response.generation,
        });

        Ok(ApplyOutcome::Updated(summary))
    }

    /// Hands the current result to `sink` under the derived file name.
    ///
    /// Returns the file name used, or `None` without side effects when there
    /// is nothing to download.
    pub fn download_compressed_result<D: DownloadSink + ?Sized>(
        &self,
        sink: &D,
    ) -> Result<Option<String>> {
        let (Some(original), Some(result)) = (&self.original, &self.compressed) else {
            return Ok(None);
        };

        let file_name = compressed_file_name(original.name());
        if let Err(err) = sink.save(&result.blob, &file_name) {
            self.notifier.notify(&err.notification());
            return Err(err);
        }

        Ok(Some(file_name))
    }

    /// Drops the original and the result. Quality is kept.
    pub fn reset(&mut self) {
        self.original = None;
        self.compressed = None;
        self.generation += 1;
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.original, &self.compressed) {
            (None, _) => SessionPhase::Empty,
            (Some(_), None) => SessionPhase::HasOriginal,
            (Some(_), Some(_)) => SessionPhase::HasCompressed,
        }
    }

    pub fn original(&self) -> Option<&ImageFile> {
        self.original.as_ref()
    }

    pub fn compressed(&self) -> Option<&CompressedResult> {
        self.compressed.as_ref()
    }

    /// Quality in `[0.0, 1.0]`
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// True when the result was produced with the current quality.
    pub fn is_result_current(&self) -> bool {
        self.compressed
            .as_ref()
            .is_some_and(|result| result.quality == self.quality)
    }

    pub fn summary(&self) -> Option<CompressionSummary> {
        let original = self.original.as_ref()?;
        let result = self.compressed.as_ref()?;
        Some(CompressionSummary::new(original.size(), result.size()))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn compressor(&self) -> Arc<C> {
        Arc::clone(&self.compressor)
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

fn quality_fraction(value: u8) -> f32 {
    f32::from(value) / 100.0
}
