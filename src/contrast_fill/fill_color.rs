use image::Rgba;

use crate::contrast_fill::channel::CHANNEL_COUNT;

/// Brightness above this selects a black fill, otherwise white.
///
/// Deliberately low: most images end up with a black backdrop.
pub const DEFAULT_BRIGHTNESS_THRESHOLD: u32 = 50;

/// Opaque color written over transparent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillColor {
    /// (0, 0, 0, 255)
    Black,
    /// (255, 255, 255, 255)
    White,
}

impl FillColor {
    /// Picks the fill that contrasts with an image of the given brightness.
    ///
    /// # Examples
    ///
    /// ```
    /// use contrast_fill::FillColor;
    ///
    /// assert_eq!(FillColor::contrasting(50, 50), FillColor::White);
    /// assert_eq!(FillColor::contrasting(51, 50), FillColor::Black);
    /// ```
    pub const fn contrasting(brightness: u32, threshold: u32) -> Self {
        if brightness > threshold {
            Self::Black
        } else {
            Self::White
        }
    }

    /// Channel values in red, green, blue, alpha order.
    pub const fn channels(self) -> [u8; CHANNEL_COUNT] {
        match self {
            Self::Black => [0, 0, 0, 255],
            Self::White => [255, 255, 255, 255],
        }
    }

    pub const fn to_rgba(self) -> Rgba<u8> {
        Rgba(self.channels())
    }
}
