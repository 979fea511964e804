//! Image attachments for the content editor.
//!
//! A selected file moves through `Idle -> Reading -> Previewing -> Uploading`
//! and back to `Idle`, at which point the completion callback receives a
//! `data:` URL the editor can reference from an `[image=...]` tag. The upload
//! itself is simulated with a fixed delay.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::config::UploadConfig;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read `path` and detect its type from the leading bytes.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("파일을 읽을 수 없습니다: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = sniff_mime(&bytes);
        log::debug!("Selected {} ({}, {} bytes)", name, mime_type, bytes.len());
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// MIME type guessed from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Reading { file_name: String },
    Previewing { data_url: String },
    Uploading { data_url: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RejectReason {
    #[error("이미지 파일만 업로드할 수 있습니다 ({0})")]
    NotAnImage(String),
    #[error("파일이 너무 큽니다 ({size} 바이트, 최대 {limit} 바이트)")]
    TooLarge { size: u64, limit: u64 },
    #[error("이미 다른 이미지를 처리하고 있습니다")]
    Busy,
}

#[derive(Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(String),
    Rejected(RejectReason),
}

pub struct ImageUploader {
    state: UploadState,
    delay: Duration,
    max_bytes: u64,
    dragging: bool,
}

impl ImageUploader {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            state: UploadState::Idle,
            delay: Duration::from_millis(config.delay_ms),
            max_bytes: config.max_bytes,
            dragging: false,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == UploadState::Idle
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, UploadState::Uploading { .. })
    }

    /// URL of the image currently shown as a preview.
    pub fn preview_url(&self) -> Option<&str> {
        match &self.state {
            UploadState::Previewing { data_url } | UploadState::Uploading { data_url } => {
                Some(data_url.as_str())
            }
            _ => None,
        }
    }

    pub fn drag_over(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// `Idle -> Reading`. Non-image or oversized files leave the state untouched.
    pub fn begin_read(&mut self, file: &SelectedFile) -> Result<(), RejectReason> {
        self.dragging = false;
        if !self.is_idle() {
            return Err(RejectReason::Busy);
        }
        if !file.is_image() {
            return Err(RejectReason::NotAnImage(file.mime_type.clone()));
        }
        let size = file.bytes.len() as u64;
        if size > self.max_bytes {
            return Err(RejectReason::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        self.state = UploadState::Reading {
            file_name: file.name.clone(),
        };
        Ok(())
    }

    /// `Reading -> Previewing`.
    pub fn finish_read(&mut self, data_url: String) -> bool {
        if !matches!(self.state, UploadState::Reading { .. }) {
            return false;
        }
        self.state = UploadState::Previewing { data_url };
        true
    }

    /// `Previewing -> Uploading`, yielding the URL being uploaded.
    pub fn begin_upload(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, UploadState::Idle) {
            UploadState::Previewing { data_url } => {
                self.state = UploadState::Uploading {
                    data_url: data_url.clone(),
                };
                Some(data_url)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// `Uploading -> Idle`, yielding the final URL.
    pub fn complete_upload(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, UploadState::Idle) {
            UploadState::Uploading { data_url } => Some(data_url),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drop the preview without uploading. Only valid while previewing.
    pub fn clear(&mut self) -> bool {
        if matches!(self.state, UploadState::Previewing { .. }) {
            self.state = UploadState::Idle;
            true
        } else {
            false
        }
    }

    /// Run a file through the whole cycle, calling `on_upload` once the
    /// simulated upload finishes.
    pub async fn upload<F>(&mut self, file: SelectedFile, on_upload: F) -> UploadOutcome
    where
        F: FnOnce(&str),
    {
        if let Err(reason) = self.begin_read(&file) {
            log::info!("Rejected '{}': {}", file.name, reason);
            return UploadOutcome::Rejected(reason);
        }

        let data_url = file.to_data_url();
        self.finish_read(data_url);

        let Some(url) = self.begin_upload() else {
            return UploadOutcome::Rejected(RejectReason::Busy);
        };
        log::debug!("Uploading '{}' ({} bytes)", file.name, file.bytes.len());
        tokio::time::sleep(self.delay).await;

        let url = self.complete_upload().unwrap_or(url);
        on_upload(&url);
        log::info!("Uploaded '{}'", file.name);
        UploadOutcome::Uploaded(url)
    }
}
