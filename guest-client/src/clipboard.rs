use thiserror::Error;
use tokio::time::{Duration, Instant};

/// How long the "copied" acknowledgement stays visible.
pub const COPIED_ACK_DURATION: Duration = Duration::from_secs(2);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// The system clipboard.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// A copy button: writes a fixed string to the clipboard and acknowledges
/// it for a short while. Used for the venue address and bank accounts.
#[derive(Debug, Clone)]
pub struct CopyFeedback {
    text: String,
    copied_at: Option<Instant>,
}

impl CopyFeedback {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            copied_at: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Copies the text. The acknowledgement only starts when the write
    /// succeeded.
    pub fn copy<C>(&mut self, clipboard: &mut C) -> Result<(), ClipboardError>
    where
        C: Clipboard + ?Sized,
    {
        clipboard.write_text(&self.text)?;
        self.copied_at = Some(Instant::now());
        Ok(())
    }

    pub fn is_copied(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPIED_ACK_DURATION)
    }

    pub fn label(&self) -> &'static str {
        if self.is_copied() {
            "복사완료"
        } else {
            "복사하기"
        }
    }
}
