#![warn(missing_docs)]
//! # dashgate-upload
//!
//! ## Purpose
//! Implements the media upload form: per-slot file validation, preview
//! handles, and a cancellable submission task.
//!
//! ## Responsibilities
//! - Validate file names against slot-specific extension sets.
//! - Track the video, image and subtitle selections and their previews.
//! - Drive submission through an injectable [`UploadBackend`], with the
//!   fixed-delay [`SimulatedBackend`] as the default.
//!
//! ## Data flow
//! File picker -> [`FileHandle`] -> [`UploadController::select`] builds a
//! [`SelectedFile`] -> [`UploadController::submit`] starts a task ->
//! [`UploadController::on_tick`] advances it until success, failure, or
//! [`UploadController::cancel`].
//!
//! ## Ownership and lifetimes
//! The controller owns its selections and preview registry. It lives for one
//! visit of the upload page and must be torn down when the page is left.
//!
//! ## Error model
//! Invalid file types are not errors: they are recorded on the selection.
//! Backend and filesystem failures are [`UploadError`] values.
//!
//! ## Example
//! ```rust
//! use dashgate_upload::{validate_file_type, VIDEO_EXTENSIONS};
//!
//! assert!(validate_file_type("clip.MP4", VIDEO_EXTENSIONS).is_valid);
//! assert!(!validate_file_type("clip.mkv", VIDEO_EXTENSIONS).is_valid);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Accepted video extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "webm"];

/// Accepted image extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Accepted subtitle extensions.
pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "vtt"];

/// Delay before the simulated upload completes.
pub const SIMULATED_UPLOAD_DELAY_MS: u64 = 2_000;

/// How long the success banner stays up after completion.
pub const SUCCESS_BANNER_MS: u64 = 3_000;

/// One upload category with independent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Main video file. Required for submission.
    Video,
    /// Thumbnail image.
    Image,
    /// Subtitle track.
    Subtitle,
}

impl Slot {
    /// Every slot, in form order.
    pub const ALL: [Slot; 3] = [Slot::Video, Slot::Image, Slot::Subtitle];

    /// Extensions accepted by this slot.
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Slot::Video => VIDEO_EXTENSIONS,
            Slot::Image => IMAGE_EXTENSIONS,
            Slot::Subtitle => SUBTITLE_EXTENSIONS,
        }
    }

    /// Whether a selection in this slot gets a preview handle.
    pub fn has_preview(self) -> bool {
        matches!(self, Slot::Video | Slot::Image)
    }

    /// Lower-case slot name.
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Video => "video",
            Slot::Image => "image",
            Slot::Subtitle => "subtitle",
        }
    }

    /// Parses a slot name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of [`validate_file_type`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValidation {
    /// Whether the extension is accepted.
    pub is_valid: bool,
    /// Human-readable reason when invalid.
    pub message: Option<String>,
}

/// Checks a file name's extension against an allowed set.
///
/// The extension is the text after the last `.`, compared case-insensitively.
/// Names without a dot, or ending in one, are invalid.
pub fn validate_file_type(file_name: &str, allowed: &[&str]) -> FileValidation {
    let accepted = file_extension(file_name).is_some_and(|extension| {
        allowed
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(&extension))
    });

    if accepted {
        FileValidation {
            is_valid: true,
            message: None,
        }
    } else {
        FileValidation {
            is_valid: false,
            message: Some(format!(
                "Invalid file type. Allowed types: {}",
                allowed.join(", ")
            )),
        }
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Formats a byte count as `"0 Bytes"`, `"1.5 KB"`, `"2 MB"`, ...
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{scaled:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Raw file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// File name including extension.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type, empty when unknown.
    pub mime_type: String,
    /// Local path when the file came from disk.
    pub path: Option<PathBuf>,
}

impl FileHandle {
    /// Creates a handle that is not backed by a path.
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
            path: None,
        }
    }

    /// Builds a handle from a file on disk, guessing the MIME type from the
    /// extension.
    ///
    /// # Errors
    /// Returns [`UploadError::Io`] when metadata cannot be read, and
    /// [`UploadError::NotAFile`] for directories.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(UploadError::NotAFile(path.display().to_string()));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(path).first_raw().unwrap_or("");

        Ok(Self {
            name,
            size_bytes: metadata.len(),
            mime_type: mime_type.to_string(),
            path: Some(path.to_path_buf()),
        })
    }
}

/// Local, revocable preview handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewUri(String);

impl PreviewUri {
    /// Returns the URI text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and revokes preview handles.
#[derive(Debug)]
pub struct PreviewRegistry {
    rng: StdRng,
    live: BTreeSet<PreviewUri>,
}

impl PreviewRegistry {
    /// Creates an empty registry with a seeded id generator.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            live: BTreeSet::new(),
        }
    }

    /// Issues a fresh handle.
    pub fn create(&mut self) -> PreviewUri {
        loop {
            let nonce: [u8; 16] = self.rng.random();
            let uri = PreviewUri(format!("preview:{}", hex::encode(nonce)));
            if self.live.insert(uri.clone()) {
                return uri;
            }
        }
    }

    /// Releases a handle. Returns `false` if it was not live.
    pub fn revoke(&mut self, uri: &PreviewUri) -> bool {
        self.live.remove(uri)
    }

    /// Returns `true` if the handle has not been revoked.
    pub fn is_live(&self, uri: &PreviewUri) -> bool {
        self.live.contains(uri)
    }

    /// Number of unreleased handles.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// One slot's current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// The picked file.
    pub handle: FileHandle,
    /// Preview handle, video and image slots only.
    pub preview: Option<PreviewUri>,
    /// File name.
    pub name: String,
    /// Formatted size, see [`format_file_size`].
    pub size_label: String,
    /// MIME type reported for the file.
    pub mime_type: String,
    /// Whether the extension is accepted for the slot.
    pub is_valid: bool,
    /// Reason the file was rejected.
    pub error_message: Option<String>,
}

/// Files handed to a backend for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Required video file.
    pub video: FileHandle,
    /// Optional thumbnail.
    pub image: Option<FileHandle>,
    /// Optional subtitle track.
    pub subtitle: Option<FileHandle>,
    /// Stable key derived from the selected files.
    pub idempotency_key: String,
}

/// Computes a SHA-256 hex key over file names and sizes.
pub fn idempotency_key_for_files<'a>(files: impl IntoIterator<Item = &'a FileHandle>) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.name.as_bytes());
        hasher.update([0]);
        hasher.update(file.size_bytes.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Backend-side handle for one in-flight upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    /// Request key the ticket was issued for.
    pub idempotency_key: String,
    /// When the upload started.
    pub started_at_ms: u64,
    /// When the backend expects completion, if known.
    pub ready_at_ms: Option<u64>,
}

/// Result of polling an in-flight upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPoll {
    /// Still transferring.
    Pending,
    /// Finished successfully.
    Complete,
}

/// Transfer collaborator used by [`UploadController`].
pub trait UploadBackend: Send + Sync {
    /// Starts an upload.
    ///
    /// # Errors
    /// Returns [`UploadError::Backend`] when the upload cannot start.
    fn begin(&self, request: &UploadRequest, now_ms: u64) -> Result<UploadTicket, UploadError>;

    /// Checks progress of an upload.
    ///
    /// # Errors
    /// Returns [`UploadError::Backend`] when the transfer failed.
    fn poll(&self, ticket: &UploadTicket, now_ms: u64) -> Result<UploadPoll, UploadError>;

    /// Abandons an upload. The default does nothing.
    fn cancel(&self, _ticket: &UploadTicket) {}
}

/// Backend that performs no transfer and completes after a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedBackend {
    delay_ms: u64,
}

impl SimulatedBackend {
    /// Creates a backend with a custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::with_delay(SIMULATED_UPLOAD_DELAY_MS)
    }
}

impl UploadBackend for SimulatedBackend {
    fn begin(&self, request: &UploadRequest, now_ms: u64) -> Result<UploadTicket, UploadError> {
        Ok(UploadTicket {
            idempotency_key: request.idempotency_key.clone(),
            started_at_ms: now_ms,
            ready_at_ms: Some(now_ms.saturating_add(self.delay_ms)),
        })
    }

    fn poll(&self, ticket: &UploadTicket, now_ms: u64) -> Result<UploadPoll, UploadError> {
        match ticket.ready_at_ms {
            Some(ready_at_ms) if now_ms >= ready_at_ms => Ok(UploadPoll::Complete),
            _ => Ok(UploadPoll::Pending),
        }
    }
}

/// Submission task state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskState {
    /// Nothing submitted, or the success banner has expired.
    #[default]
    Idle,
    /// Upload in flight.
    Running(UploadTicket),
    /// Upload finished; the banner shows until `banner_until_ms`.
    Succeeded {
        /// When the success banner resets.
        banner_until_ms: u64,
    },
    /// Upload failed with a backend message.
    Failed(String),
    /// Upload was abandoned before completion.
    Cancelled,
}

/// Outcome of [`UploadController::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new upload started.
    Started,
    /// No valid video is selected; nothing happened.
    NotReady,
    /// An upload is already in flight; nothing happened.
    AlreadySubmitting,
}

/// State of the upload form for one page visit.
pub struct UploadController {
    video: Option<SelectedFile>,
    image: Option<SelectedFile>,
    subtitle: Option<SelectedFile>,
    previews: PreviewRegistry,
    task: TaskState,
    backend: Arc<dyn UploadBackend>,
}

impl UploadController {
    /// Creates an empty form.
    pub fn new(backend: Arc<dyn UploadBackend>, preview_seed: u64) -> Self {
        Self {
            video: None,
            image: None,
            subtitle: None,
            previews: PreviewRegistry::new(preview_seed),
            task: TaskState::Idle,
            backend,
        }
    }

    /// Creates an empty form backed by [`SimulatedBackend`].
    pub fn simulated(preview_seed: u64) -> Self {
        Self::new(Arc::new(SimulatedBackend::default()), preview_seed)
    }

    /// Selects a file for a slot, replacing and releasing any previous one.
    pub fn select(&mut self, slot: Slot, handle: FileHandle) -> &SelectedFile {
        self.release(slot);

        let validation = validate_file_type(&handle.name, slot.allowed_extensions());
        let preview = slot.has_preview().then(|| self.previews.create());
        if !validation.is_valid {
            tracing::debug!(%slot, name = %handle.name, "rejected file type");
        }

        let selected = SelectedFile {
            preview,
            name: handle.name.clone(),
            size_label: format_file_size(handle.size_bytes),
            mime_type: handle.mime_type.clone(),
            is_valid: validation.is_valid,
            error_message: validation.message,
            handle,
        };
        self.slot_mut(slot).insert(selected)
    }

    /// Clears a slot and releases its preview.
    pub fn remove(&mut self, slot: Slot) {
        self.release(slot);
    }

    /// Returns a slot's selection.
    pub fn selection(&self, slot: Slot) -> Option<&SelectedFile> {
        match slot {
            Slot::Video => self.video.as_ref(),
            Slot::Image => self.image.as_ref(),
            Slot::Subtitle => self.subtitle.as_ref(),
        }
    }

    /// Returns `true` when a valid video is selected.
    pub fn is_ready(&self) -> bool {
        self.video.as_ref().is_some_and(|video| video.is_valid)
    }

    /// Starts an upload when the form is ready and idle.
    ///
    /// # Errors
    /// Returns the backend's [`UploadError`] when the upload cannot start; the
    /// task is then [`TaskState::Failed`].
    pub fn submit(&mut self, now_ms: u64) -> Result<SubmitOutcome, UploadError> {
        if self.is_submitting() {
            return Ok(SubmitOutcome::AlreadySubmitting);
        }
        let Some(video) = self.video.as_ref().filter(|video| video.is_valid) else {
            return Ok(SubmitOutcome::NotReady);
        };

        let image = self.image.as_ref().map(|selected| selected.handle.clone());
        let subtitle = self.subtitle.as_ref().map(|selected| selected.handle.clone());
        let idempotency_key = idempotency_key_for_files(
            std::iter::once(&video.handle)
                .chain(image.as_ref())
                .chain(subtitle.as_ref()),
        );
        let request = UploadRequest {
            video: video.handle.clone(),
            image,
            subtitle,
            idempotency_key,
        };

        match self.backend.begin(&request, now_ms) {
            Ok(ticket) => {
                tracing::info!(key = %ticket.idempotency_key, "upload started");
                self.task = TaskState::Running(ticket);
                Ok(SubmitOutcome::Started)
            }
            Err(error) => {
                tracing::warn!(%error, "upload failed to start");
                self.task = TaskState::Failed(error.to_string());
                Err(error)
            }
        }
    }

    /// Advances the task to `now_ms`.
    pub fn on_tick(&mut self, now_ms: u64) {
        if let TaskState::Running(ticket) = &self.task {
            match self.backend.poll(ticket, now_ms) {
                Ok(UploadPoll::Pending) => {}
                Ok(UploadPoll::Complete) => {
                    let completed_at_ms = ticket.ready_at_ms.unwrap_or(now_ms).min(now_ms);
                    tracing::info!(key = %ticket.idempotency_key, "upload completed");
                    self.task = TaskState::Succeeded {
                        banner_until_ms: completed_at_ms.saturating_add(SUCCESS_BANNER_MS),
                    };
                }
                Err(error) => {
                    tracing::warn!(%error, "upload failed");
                    self.task = TaskState::Failed(error.to_string());
                }
            }
        }

        if let TaskState::Succeeded { banner_until_ms } = self.task
            && now_ms >= banner_until_ms
        {
            self.task = TaskState::Idle;
        }
    }

    /// Abandons an in-flight upload. Has no effect otherwise.
    pub fn cancel(&mut self) {
        if let TaskState::Running(ticket) = &self.task {
            self.backend.cancel(ticket);
            tracing::info!(key = %ticket.idempotency_key, "upload cancelled");
            self.task = TaskState::Cancelled;
        }
    }

    /// Cancels any upload and releases every preview. Call when the page is
    /// left.
    pub fn teardown(&mut self) {
        self.cancel();
        for slot in Slot::ALL {
            self.release(slot);
        }
    }

    /// Returns `true` while an upload is in flight.
    pub fn is_submitting(&self) -> bool {
        matches!(self.task, TaskState::Running(_))
    }

    /// Returns `true` while the success banner is showing.
    pub fn did_succeed(&self) -> bool {
        matches!(self.task, TaskState::Succeeded { .. })
    }

    /// Returns the task state.
    pub fn task(&self) -> &TaskState {
        &self.task
    }

    /// Returns the preview registry.
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<SelectedFile> {
        match slot {
            Slot::Video => &mut self.video,
            Slot::Image => &mut self.image,
            Slot::Subtitle => &mut self.subtitle,
        }
    }

    fn release(&mut self, slot: Slot) {
        if let Some(selected) = self.slot_mut(slot).take()
            && let Some(preview) = &selected.preview
        {
            self.previews.revoke(preview);
        }
    }
}

impl fmt::Debug for UploadController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadController")
            .field("video", &self.video)
            .field("image", &self.image)
            .field("subtitle", &self.subtitle)
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Selected path could not be read.
    #[error("file io failure: {0}")]
    Io(#[from] std::io::Error),
    /// Selected path is not a regular file.
    #[error("not a file: {0}")]
    NotAFile(String),
    /// Backend refused or failed the transfer.
    #[error("upload backend failure: {0}")]
    Backend(String),
}
