//! What this process is sharing: one mode, one payload, fixed at startup.

use crate::text::slot::TextSlot;
use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The four portal modes. Exactly one is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SingleFile,
    Directory,
    SendText,
    ReceiveText,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::SingleFile => write!(f, "send-file"),
            Mode::Directory => write!(f, "receive-files"),
            Mode::SendText => write!(f, "send-text"),
            Mode::ReceiveText => write!(f, "receive-text"),
        }
    }
}

/// Mode plus its payload. Paths are canonicalized here so the path guard can
/// rely on a canonical root, and missing/unreadable payloads fail before the
/// server ever binds.
pub enum Portal {
    SendFile { path: PathBuf, filename: String },
    RecvFiles { root: PathBuf },
    SendText { text: String },
    RecvText { slot: Arc<TextSlot> },
}

impl Portal {
    pub fn send_file(path: &Path) -> Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("file not found: {}", path.display()))?;
        if !path.is_file() {
            bail!("not a regular file: {}", path.display());
        }
        // Fail fast on permissions instead of 404ing every download
        std::fs::File::open(&path)
            .with_context(|| format!("cannot read file: {}", path.display()))?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download")
            .to_string();

        Ok(Self::SendFile { path, filename })
    }

    pub fn recv_files(dir: &Path) -> Result<Self> {
        let root = dir
            .canonicalize()
            .with_context(|| format!("directory not found: {}", dir.display()))?;
        if !root.is_dir() {
            bail!("not a directory: {}", root.display());
        }
        Ok(Self::RecvFiles { root })
    }

    pub fn send_text(text: String) -> Self {
        Self::SendText { text }
    }

    pub fn recv_text() -> Self {
        Self::RecvText {
            slot: Arc::new(TextSlot::new()),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Portal::SendFile { .. } => Mode::SingleFile,
            Portal::RecvFiles { .. } => Mode::Directory,
            Portal::SendText { .. } => Mode::SendText,
            Portal::RecvText { .. } => Mode::ReceiveText,
        }
    }

    /// The text slot, present only in receive-text mode. The CLI polls this
    /// to know when to print the received value and stop serving.
    pub fn text_slot(&self) -> Option<Arc<TextSlot>> {
        match self {
            Portal::RecvText { slot } => Some(slot.clone()),
            _ => None,
        }
    }
}
