//! Upload orchestration: one file or a batch, in order, with progress.
//!
//! For each file the uploader decodes the blob, resolves the target size,
//! walks the quality ladder (see [`imaging::compress`](crate::imaging::compress))
//! and returns an [`EncodedResult`] whose data URI the caller stores in a
//! document.
//!
//! ## Batches
//!
//! Files are processed strictly one after another, so at most one decoded
//! image and one surface are alive at a time. After each file the progress
//! value becomes `round(100 * completed / total)` and an
//! [`UploadEvent::FileUploaded`] is sent to the optional event channel.
//!
//! The first failure aborts the batch: later files are never decoded and
//! the progress value keeps whatever it last reported. Callers are expected
//! to drop non-image files before submitting a batch.
//!
//! ## Decode timeout
//!
//! When a timeout is configured, decoding runs on a helper thread and the
//! upload fails with [`UploadError::DecodeTimeout`] if it does not finish in
//! time. The helper thread is abandoned, not killed; its result is dropped
//! whenever it completes.
//!
//! Until that abandoned decode finishes, every new decode fails with
//! [`UploadError::DecodeStalled`], so there is never more than one decoded
//! image in memory.
//!
//! ## One upload at a time
//!
//! An `Uploader` runs one upload or batch at a time. A call made while
//! another is running fails with [`UploadError::Busy`] and leaves the
//! running upload's progress alone.

use crate::config::CompressionConfig;
use crate::imaging::{CodecError, CompressionParams, ImageCodec, compress};
use crate::naming::logical_path;
use crate::types::{EncodedResult, Folder, SourceFile};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{name}: {source}")]
    Codec {
        name: String,
        #[source]
        source: CodecError,
    },
    #[error("{name}: decoding did not finish within {after:?}")]
    DecodeTimeout { name: String, after: Duration },
    #[error("{name}: a previous decode timed out and is still running")]
    DecodeStalled { name: String },
    #[error("{name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("another upload is already running")]
    Busy,
}

impl UploadError {
    /// Name of the file that failed, if the error belongs to one.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            UploadError::Codec { name, .. }
            | UploadError::DecodeTimeout { name, .. }
            | UploadError::DecodeStalled { name }
            | UploadError::Read { name, .. } => Some(name),
            UploadError::Busy => None,
        }
    }
}

/// Progress events emitted during a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    BatchStarted {
        folder: Folder,
        total: usize,
    },
    FileUploaded {
        /// 1-based position in the batch.
        index: usize,
        total: usize,
        name: String,
        logical_path: String,
        width: u32,
        height: u32,
        quality_percent: u8,
        estimated_bytes: usize,
        within_budget: bool,
        /// Batch progress after this file, 0-100.
        progress: u8,
    },
    FileFailed {
        index: usize,
        total: usize,
        name: String,
        error: String,
    },
}

/// `round(100 * completed / total)`; 0 for an empty batch.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (100.0 * completed as f64 / total as f64).round() as u8
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Holds the uploading flag; clears it however the upload ends.
struct UploadingGuard<'a>(&'a AtomicBool);

impl<'a> UploadingGuard<'a> {
    /// Claim the flag, or fail with [`UploadError::Busy`] if it is taken.
    fn start(flag: &'a AtomicBool) -> Result<Self, UploadError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| UploadError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for UploadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Set while a helper thread is decoding; cleared when it finishes or panics.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Compresses admin uploads into data URIs.
pub struct Uploader<C: ImageCodec> {
    codec: Arc<C>,
    params: CompressionParams,
    decode_timeout: Option<Duration>,
    clock: fn() -> u64,
    progress: AtomicU8,
    uploading: AtomicBool,
    decode_in_flight: Arc<AtomicBool>,
}

impl<C: ImageCodec + 'static> Uploader<C> {
    pub fn new(codec: C, config: &CompressionConfig) -> Self {
        Self::with_shared_codec(Arc::new(codec), config)
    }

    pub fn with_shared_codec(codec: Arc<C>, config: &CompressionConfig) -> Self {
        Self {
            codec,
            params: config.to_params(),
            decode_timeout: config.decode_timeout(),
            clock: unix_millis,
            progress: AtomicU8::new(0),
            uploading: AtomicBool::new(false),
            decode_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the wall clock used for logical path timestamps.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn params(&self) -> &CompressionParams {
        &self.params
    }

    /// Progress of the current or last batch, 0-100.
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    /// Whether a timed-out decode is still running on its helper thread.
    pub fn is_decode_stalled(&self) -> bool {
        self.decode_in_flight.load(Ordering::SeqCst)
    }

    /// Compress a single file.
    pub fn upload_file(&self, file: SourceFile, folder: Folder) -> Result<EncodedResult, UploadError> {
        let _guard = UploadingGuard::start(&self.uploading)?;
        self.progress.store(0, Ordering::SeqCst);

        let (result, _) = self.compress_file(file, folder)?;
        self.progress.store(100, Ordering::SeqCst);
        Ok(result)
    }

    /// Compress files one at a time, in order. Fails on the first error.
    pub fn upload_many(
        &self,
        files: Vec<SourceFile>,
        folder: Folder,
        events: Option<Sender<UploadEvent>>,
    ) -> Result<Vec<EncodedResult>, UploadError> {
        self.run_batch(files.into_iter().map(Ok), folder, events)
    }

    /// Like [`upload_many`](Self::upload_many), but each file is read from
    /// disk only when the batch reaches it. A file that cannot be read
    /// aborts the batch with [`UploadError::Read`].
    pub fn upload_paths(
        &self,
        paths: &[PathBuf],
        folder: Folder,
        events: Option<Sender<UploadEvent>>,
    ) -> Result<Vec<EncodedResult>, UploadError> {
        let files = paths.iter().map(|path| {
            SourceFile::read(path).map_err(|source| UploadError::Read {
                name: path.display().to_string(),
                source,
            })
        });
        self.run_batch(files, folder, events)
    }

    fn run_batch<I>(
        &self,
        files: I,
        folder: Folder,
        events: Option<Sender<UploadEvent>>,
    ) -> Result<Vec<EncodedResult>, UploadError>
    where
        I: ExactSizeIterator<Item = Result<SourceFile, UploadError>>,
    {
        let _guard = UploadingGuard::start(&self.uploading)?;
        self.progress.store(0, Ordering::SeqCst);

        let total = files.len();
        let send = |event: UploadEvent| {
            if let Some(tx) = &events {
                tx.send(event).ok();
            }
        };
        send(UploadEvent::BatchStarted { folder, total });

        let mut results = Vec::with_capacity(total);
        for (i, file) in files.enumerate() {
            let index = i + 1;
            let outcome = file.and_then(|file| {
                let name = file.name.clone();
                self.compress_file(file, folder).map(|done| (name, done))
            });

            let (name, (result, summary)) = match outcome {
                Ok(done) => done,
                Err(e) => {
                    let name = e.file_name().unwrap_or_default().to_string();
                    tracing::error!(file = %name, error = %e, "batch aborted");
                    send(UploadEvent::FileFailed {
                        index,
                        total,
                        name,
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            };

            let progress = progress_percent(index, total);
            self.progress.store(progress, Ordering::SeqCst);
            send(UploadEvent::FileUploaded {
                index,
                total,
                name,
                logical_path: result.logical_path.clone(),
                width: summary.width,
                height: summary.height,
                quality_percent: summary.quality_percent,
                estimated_bytes: summary.estimated_bytes,
                within_budget: summary.within_budget,
                progress,
            });
            results.push(result);
        }

        Ok(results)
    }

    /// Does nothing: uploads live inside documents, so removing one means
    /// removing its data URI from the owning document
    /// (see [`documents::remove_image`](crate::documents::remove_image)).
    pub fn delete_file(&self, path: &str) {
        tracing::debug!(path, "delete_file is a no-op; remove the url from its document");
    }

    fn compress_file(
        &self,
        file: SourceFile,
        folder: Folder,
    ) -> Result<(EncodedResult, Summary), UploadError> {
        let SourceFile { name, data } = file;
        let raster = self.decode(&name, data)?;

        let compressed = compress(self.codec.as_ref(), &raster, &self.params).map_err(|source| {
            UploadError::Codec {
                name: name.clone(),
                source,
            }
        })?;
        drop(raster);

        let path = logical_path(folder, (self.clock)(), &name);
        if compressed.within_budget {
            tracing::info!(
                path = %path,
                quality = %compressed.quality,
                estimated_bytes = compressed.estimated_bytes,
                "uploaded"
            );
        } else {
            tracing::warn!(
                path = %path,
                quality = %compressed.quality,
                estimated_bytes = compressed.estimated_bytes,
                budget_bytes = self.params.budget_bytes,
                "lowest quality step still exceeds the size budget; keeping it"
            );
        }

        let summary = Summary {
            width: compressed.dimensions.width,
            height: compressed.dimensions.height,
            quality_percent: compressed.quality.as_percent(),
            estimated_bytes: compressed.estimated_bytes,
            within_budget: compressed.within_budget,
        };
        Ok((
            EncodedResult {
                encoded_data: compressed.data_uri,
                logical_path: path,
            },
            summary,
        ))
    }

    fn decode(&self, name: &str, data: Vec<u8>) -> Result<C::Raster, UploadError> {
        let codec_error = |source| UploadError::Codec {
            name: name.to_string(),
            source,
        };

        if self.is_decode_stalled() {
            return Err(UploadError::DecodeStalled {
                name: name.to_string(),
            });
        }

        let Some(limit) = self.decode_timeout else {
            return self.codec.decode(&data).map_err(codec_error);
        };

        let codec = Arc::clone(&self.codec);
        self.decode_in_flight.store(true, Ordering::SeqCst);
        let in_flight = InFlight(Arc::clone(&self.decode_in_flight));
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let decoded = codec.decode(&data);
            drop(data);
            drop(in_flight);
            tx.send(decoded).ok();
        });

        match rx.recv_timeout(limit) {
            Ok(decoded) => decoded.map_err(codec_error),
            Err(RecvTimeoutError::Timeout) => Err(UploadError::DecodeTimeout {
                name: name.to_string(),
                after: limit,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(codec_error(CodecError::Decode(
                "decoder thread panicked".into(),
            ))),
        }
    }
}

/// Per-file numbers reported in [`UploadEvent::FileUploaded`].
struct Summary {
    width: u32,
    height: u32,
    quality_percent: u8,
    estimated_bytes: usize,
    within_budget: bool,
}
