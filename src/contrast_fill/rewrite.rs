use image::{Pixel, Rgba};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::contrast_fill::brightness::average_brightness;
use crate::contrast_fill::channel::{ChannelMask, CHANNEL_COUNT, CHANNEL_MASK};
use crate::contrast_fill::fill_color::FillColor;
use crate::contrast_fill::options::FillOptions;
use crate::contrast_fill::pixel_buffer::PixelBuffer;
use crate::contrast_fill::transparency::is_transparent;
use crate::error::BufferError;
use crate::Image;

/// Summary of one rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    /// Average channel-sum brightness of the buffer before the rewrite
    pub brightness: u32,
    /// Fill color chosen from the brightness
    pub fill: FillColor,
    /// Number of pixels that were overwritten
    pub rewritten: usize,
}

/// Overwrites every transparent pixel of a raw RGBA slice with a contrasting fill.
///
/// Brightness is measured over the whole slice, transparent pixels included.
/// The fill is black when the brightness exceeds
/// `options.brightness_threshold`, white otherwise. Pixels whose alpha is at or
/// above `options.transparency_threshold` are left byte-for-byte unchanged.
///
/// # Errors
///
/// * `BufferError::Empty` - When the slice holds no pixels
/// * `BufferError::MalformedLength` - When the length is not a multiple of 4
pub fn rewrite_transparent_pixels(
    data: &mut [u8],
    options: &FillOptions,
) -> Result<FillOutcome, BufferError> {
    let brightness = average_brightness(data)?;
    let fill = FillColor::contrasting(brightness, options.brightness_threshold);
    let rewritten = fill_transparent(
        data,
        options.transparency_threshold,
        fill.channels(),
        &CHANNEL_MASK,
    );

    tracing::debug!(
        brightness,
        fill = ?fill,
        rewritten,
        "Rewrote transparent pixels"
    );

    Ok(FillOutcome {
        brightness,
        fill,
        rewritten,
    })
}

/// Rewrites a [`PixelBuffer`] in place; see [`rewrite_transparent_pixels`].
pub fn rewrite_transparent(
    buffer: &mut PixelBuffer,
    options: &FillOptions,
) -> Result<FillOutcome, BufferError> {
    rewrite_transparent_pixels(buffer.as_bytes_mut(), options)
}

#[cfg(not(feature = "rayon"))]
fn fill_transparent(
    data: &mut [u8],
    threshold: u8,
    color: [u8; CHANNEL_COUNT],
    mask: &ChannelMask,
) -> usize {
    let mut rewritten = 0;
    for chunk in data.chunks_exact_mut(CHANNEL_COUNT) {
        let pixel = &mut Rgba::<u8>::from_slice_mut(chunk).0;
        if is_transparent(pixel, threshold) {
            mask.write(pixel, color);
            rewritten += 1;
        }
    }
    rewritten
}

#[cfg(feature = "rayon")]
fn fill_transparent(
    data: &mut [u8],
    threshold: u8,
    color: [u8; CHANNEL_COUNT],
    mask: &ChannelMask,
) -> usize {
    data.par_chunks_exact_mut(CHANNEL_COUNT)
        .map(|chunk| {
            let pixel = &mut Rgba::<u8>::from_slice_mut(chunk).0;
            if is_transparent(pixel, threshold) {
                mask.write(pixel, color);
                1
            } else {
                0
            }
        })
        .sum()
}

/// Trait providing contrast-aware background fill for RGBA images
///
/// Transparent pixels are replaced with black or white depending on the
/// average brightness of the image, leaving a fully opaque result wherever
/// alpha fell below the threshold.
pub trait ContrastFillExt {
    /// Fills transparent pixels and returns the image with the pass summary.
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `BufferError::Empty` - When the image has no pixels
    ///
    /// # Examples
    ///
    /// ```
    /// use contrast_fill::{ContrastFillExt, FillColor, FillOptions, Image};
    /// use image::Rgba;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgba<u8>> = Image::from_pixel(2, 2, Rgba([200, 200, 200, 0]));
    /// let (filled, outcome) = image.contrast_fill(&FillOptions::default())?;
    ///
    /// assert_eq!(outcome.fill, FillColor::Black);
    /// assert!(filled.pixels().all(|pixel| pixel.0 == [0, 0, 0, 255]));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    fn contrast_fill(self, options: &FillOptions) -> Result<(Self, FillOutcome), BufferError>
    where
        Self: Sized;

    /// Fills transparent pixels in-place.
    ///
    /// # Errors
    ///
    /// * `BufferError::Empty` - When the image has no pixels
    fn contrast_fill_mut(&mut self, options: &FillOptions) -> Result<FillOutcome, BufferError>;
}

impl ContrastFillExt for Image<Rgba<u8>> {
    fn contrast_fill(mut self, options: &FillOptions) -> Result<(Self, FillOutcome), BufferError> {
        let outcome = self.contrast_fill_mut(options)?;
        Ok((self, outcome))
    }

    fn contrast_fill_mut(&mut self, options: &FillOptions) -> Result<FillOutcome, BufferError> {
        rewrite_transparent_pixels(self, options)
    }
}
