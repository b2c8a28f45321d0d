//! User-visible notices emitted by clipboard operations.
//!
//! The engine decides when a notice fires; hosts decide how it looks.

use std::fmt;
use std::sync::Mutex;

/// Outcome notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Copy stored a new envelope.
    Copied,
    /// Copy failed while processing binary resources.
    CopyFailed(String),
    /// Paste found no envelope.
    ClipboardEmpty,
    /// Envelope type differs from the requested one.
    TypeMismatch { clipboard: String, requested: String },
    /// Paste merged `merged` fields and auto-added `added` entities.
    Pasted { merged: usize, added: usize },
    /// Paste completed without bringing in anything.
    NothingPasted,
    /// Paste failed for any other reason.
    PasteFailed(String),
}

impl Notice {
    /// Whether the notice reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::CopyFailed(_)
                | Notice::ClipboardEmpty
                | Notice::TypeMismatch { .. }
                | Notice::PasteFailed(_)
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Copied => write!(f, "Copied to clipboard"),
            Notice::CopyFailed(reason) => write!(f, "Failed to copy (File processing error): {}", reason),
            Notice::ClipboardEmpty => write!(f, "Clipboard is empty"),
            Notice::TypeMismatch { clipboard, requested } => {
                write!(f, "Type mismatch\nClipboard: {}\nTarget: {}", clipboard, requested)
            }
            Notice::Pasted { merged, added } if *added > 0 => write!(
                f,
                "Pasted {} fields from clipboard ({} items auto-added)",
                merged, added
            ),
            Notice::Pasted { merged, .. } => write!(f, "Pasted {} fields from clipboard", merged),
            Notice::NothingPasted => write!(f, "Nothing new pasted"),
            Notice::PasteFailed(reason) => write!(f, "Failed to paste: {}", reason),
        }
    }
}

/// Receives notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            log::warn!("{}", notice);
        } else {
            log::info!("{}", notice);
        }
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    /// The most recent notice.
    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().ok().and_then(|n| n.last().cloned())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
