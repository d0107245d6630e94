use log::debug;
use thiserror::Error;

/// Minimum horizontal travel, in CSS pixels, for a touch gesture to count
/// as a swipe. Travel must strictly exceed it.
pub const SWIPE_THRESHOLD: f64 = 50.0;

/// The page the lightbox is mounted in.
pub trait LightboxHost {
    /// Stop the document behind the overlay from scrolling.
    fn suspend_scroll(&mut self);

    /// Undo `suspend_scroll`.
    fn restore_scroll(&mut self);

    /// Bring the thumbnail at `index` into view in the thumbnail strip.
    fn reveal_thumbnail(&mut self, index: usize);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LightboxError {
    #[error("Cannot open the lightbox with an empty image set")]
    EmptyImageSet,

    #[error("Image index {index} is out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

/// Full-screen photo viewer shared by every photo grid on the page.
///
/// Scrolling of the host document is suspended while the lightbox is open
/// and restored on `close`, or on drop if it is torn down while still open.
pub struct Lightbox<H: LightboxHost> {
    host: H,
    images: Vec<String>,
    current: usize,
    open: bool,
    touch_start: Option<f64>,
    touch_end: Option<f64>,
}

impl<H: LightboxHost> Lightbox<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            images: Vec::new(),
            current: 0,
            open: false,
            touch_start: None,
            touch_end: None,
        }
    }

    /// Replaces the image set and shows the image at `index`.
    pub fn open(&mut self, index: usize, images: Vec<String>) -> Result<(), LightboxError> {
        if images.is_empty() {
            return Err(LightboxError::EmptyImageSet);
        }
        if index >= images.len() {
            return Err(LightboxError::IndexOutOfRange {
                index,
                len: images.len(),
            });
        }

        debug!("Opening lightbox at {} of {} images", index, images.len());
        self.images = images;
        self.clear_touch();

        if !self.open {
            self.open = true;
            self.host.suspend_scroll();
        }
        self.set_index(index);
        Ok(())
    }

    pub fn close(&mut self) {
        self.clear_touch();
        if !self.open {
            return;
        }
        debug!("Closing lightbox");
        self.open = false;
        self.host.restore_scroll();
    }

    /// Shows the following image, wrapping to the first. No-op while closed.
    pub fn next(&mut self) -> Option<usize> {
        if !self.open {
            return None;
        }
        let n = self.images.len();
        Some(self.set_index((self.current + 1) % n))
    }

    /// Shows the preceding image, wrapping to the last. No-op while closed.
    pub fn prev(&mut self) -> Option<usize> {
        if !self.open {
            return None;
        }
        let n = self.images.len();
        Some(self.set_index((self.current + n - 1) % n))
    }

    /// Selects an image directly, as the thumbnail strip does.
    pub fn jump_to(&mut self, index: usize) -> Result<(), LightboxError> {
        let len = self.images.len();
        if index >= len {
            return Err(LightboxError::IndexOutOfRange { index, len });
        }
        self.set_index(index);
        Ok(())
    }

    pub fn touch_start(&mut self, x: f64) {
        self.touch_end = None;
        self.touch_start = Some(x);
    }

    pub fn touch_move(&mut self, x: f64) {
        self.touch_end = Some(x);
    }

    /// Finishes a gesture. A leftward swipe shows the next image, a
    /// rightward one the previous. Returns the new index if it moved.
    pub fn touch_end(&mut self) -> Option<usize> {
        let (start, end) = match (self.touch_start.take(), self.touch_end.take()) {
            (Some(start), Some(end)) => (start, end),
            _ => return None,
        };

        let distance = start - end;
        if distance > SWIPE_THRESHOLD {
            self.next()
        } else if distance < -SWIPE_THRESHOLD {
            self.prev()
        } else {
            None
        }
    }

    /// Returns true when the key was handled.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if !self.open {
            return false;
        }
        match key {
            Key::ArrowRight => self.next().is_some(),
            Key::ArrowLeft => self.prev().is_some(),
            Key::Escape => {
                self.close();
                true
            }
            Key::Other => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn current_image(&self) -> Option<&str> {
        if !self.open {
            return None;
        }
        self.images.get(self.current).map(String::as_str)
    }

    /// "3 / 10" style position label.
    pub fn counter_label(&self) -> String {
        format!("{} / {}", self.current + 1, self.images.len())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn set_index(&mut self, index: usize) -> usize {
        self.current = index;
        if self.open {
            self.host.reveal_thumbnail(index);
        }
        index
    }

    fn clear_touch(&mut self) {
        self.touch_start = None;
        self.touch_end = None;
    }
}

impl<H: LightboxHost> Drop for Lightbox<H> {
    fn drop(&mut self) {
        if self.open {
            self.host.restore_scroll();
        }
    }
}
