use image::Rgba;

use crate::contrast_fill::channel::{CHANNEL_COUNT, CHANNEL_MASK};
use crate::contrast_fill::pixel_buffer::validate_pixel_data;
use crate::error::BufferError;
use crate::Image;

/// Computes the average channel-sum brightness of an RGBA buffer.
///
/// Red, green and blue are summed separately over every pixel, alpha is
/// ignored, and the combined sum is divided by the pixel count with
/// truncating integer division. Transparent pixels contribute like any other
/// pixel. The result lies in `0..=765`.
///
/// # Errors
///
/// * `BufferError::Empty` - When the buffer holds no pixels
/// * `BufferError::MalformedLength` - When the length is not a multiple of 4
///
/// # Examples
///
/// ```
/// use contrast_fill::average_brightness;
///
/// let data = [200, 200, 200, 0, 200, 200, 200, 255];
/// assert_eq!(average_brightness(&data).unwrap(), 600);
/// ```
pub fn average_brightness(data: &[u8]) -> Result<u32, BufferError> {
    let pixel_count = validate_pixel_data(data)?;

    let (red, green, blue) = data
        .chunks_exact(CHANNEL_COUNT)
        .fold((0u64, 0u64, 0u64), |(red, green, blue), pixel| {
            (
                red + u64::from(pixel[CHANNEL_MASK.red()]),
                green + u64::from(pixel[CHANNEL_MASK.green()]),
                blue + u64::from(pixel[CHANNEL_MASK.blue()]),
            )
        });

    Ok(((red + green + blue) / pixel_count as u64) as u32)
}

/// Trait providing the brightness estimate for RGBA images
pub trait AverageBrightness {
    /// Returns the truncated average of `r + g + b` over all pixels.
    ///
    /// # Errors
    ///
    /// * `BufferError::Empty` - When the image has no pixels
    fn average_brightness(&self) -> Result<u32, BufferError>;
}

impl AverageBrightness for Image<Rgba<u8>> {
    fn average_brightness(&self) -> Result<u32, BufferError> {
        average_brightness(self.as_raw())
    }
}
