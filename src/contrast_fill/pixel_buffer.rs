use image::Rgba;

use crate::contrast_fill::channel::CHANNEL_COUNT;
use crate::error::BufferError;
use crate::Image;

/// Raw RGBA pixel buffer paired with its dimensions.
///
/// Pixels are stored row-major, four bytes each, in red, green, blue, alpha
/// order. The buffer is uniquely owned: the color rewriter borrows it mutably
/// and hands it back to the surface afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA bytes.
    ///
    /// # Errors
    ///
    /// * `BufferError::Empty` - When the buffer holds no pixels
    /// * `BufferError::MalformedLength` - When the length is not a multiple of 4
    /// * `BufferError::LengthMismatch` - When the length disagrees with `width * height * 4`
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        validate_pixel_data(&data)?;
        let expected_len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(CHANNEL_COUNT);
        if data.len() != expected_len {
            return Err(BufferError::LengthMismatch {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Takes the bytes of a non-empty image. Callers guarantee both dimensions are non-zero.
    pub(crate) fn from_image_unchecked(image: Image<Rgba<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of bytes in one row.
    pub const fn stride(&self) -> usize {
        self.width as usize * CHANNEL_COUNT
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNEL_COUNT
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y as usize * self.stride() + x as usize * CHANNEL_COUNT;
        self.data.get(start..start + CHANNEL_COUNT)
    }

    /// Checks that this buffer can be committed to a surface of the given size.
    pub fn ensure_dimensions(&self, width: u32, height: u32) -> Result<(), BufferError> {
        if (width, height) != self.dimensions() {
            return Err(BufferError::DimensionMismatch {
                expected: (width, height),
                actual: self.dimensions(),
            });
        }
        Ok(())
    }

    /// Converts the buffer into an RGBA image without copying.
    ///
    /// # Errors
    ///
    /// * `BufferError::LengthMismatch` - When the bytes no longer fill `width * height` pixels
    pub fn into_image(self) -> Result<Image<Rgba<u8>>, BufferError> {
        let Self {
            width,
            height,
            data,
        } = self;
        let actual_len = data.len();
        Image::from_raw(width, height, data).ok_or(BufferError::LengthMismatch {
            expected_len: (width as usize)
                .saturating_mul(height as usize)
                .saturating_mul(CHANNEL_COUNT),
            actual_len,
        })
    }
}

impl TryFrom<Image<Rgba<u8>>> for PixelBuffer {
    type Error = BufferError;

    fn try_from(image: Image<Rgba<u8>>) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}

/// Validates a raw RGBA slice and returns its pixel count.
pub(crate) fn validate_pixel_data(data: &[u8]) -> Result<usize, BufferError> {
    if data.is_empty() {
        return Err(BufferError::Empty);
    }
    if data.len() % CHANNEL_COUNT != 0 {
        return Err(BufferError::MalformedLength { length: data.len() });
    }
    Ok(data.len() / CHANNEL_COUNT)
}
