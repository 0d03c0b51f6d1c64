use std::time::Duration;

use crate::contrast_fill::fill_color::DEFAULT_BRIGHTNESS_THRESHOLD;
use crate::contrast_fill::transparency::DEFAULT_TRANSPARENCY_THRESHOLD;
use crate::error::ConfigError;

/// Default working canvas (width, height).
pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (64, 64);

/// Parameters of the fill pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOptions {
    /// Size of the working canvas the source is fitted into
    pub canvas_size: (u32, u32),
    /// Alpha values below this are overwritten with the fill color
    pub transparency_threshold: u8,
    /// Brightness above this selects a black fill
    pub brightness_threshold: u32,
    /// Upper bound on waiting for the source image, if any
    pub load_timeout: Option<Duration>,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            transparency_threshold: DEFAULT_TRANSPARENCY_THRESHOLD,
            brightness_threshold: DEFAULT_BRIGHTNESS_THRESHOLD,
            load_timeout: None,
        }
    }
}

impl FillOptions {
    #[must_use]
    pub const fn with_canvas_size(mut self, width: u32, height: u32) -> Self {
        self.canvas_size = (width, height);
        self
    }

    #[must_use]
    pub const fn with_transparency_threshold(mut self, threshold: u8) -> Self {
        self.transparency_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_brightness_threshold(mut self, threshold: u32) -> Self {
        self.brightness_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Checks that the options describe a usable pipeline.
    ///
    /// # Errors
    ///
    /// * `ConfigError::InvalidCanvasSize` - When either canvas dimension is zero
    /// * `ConfigError::InvalidTransparencyThreshold` - When the threshold is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = self.canvas_size;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidCanvasSize { width, height });
        }

        if self.transparency_threshold == 0 {
            return Err(ConfigError::InvalidTransparencyThreshold);
        }

        Ok(())
    }
}
