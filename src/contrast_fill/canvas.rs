use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba};

use crate::contrast_fill::inter_area::InterAreaResize;
use crate::contrast_fill::pixel_buffer::PixelBuffer;
use crate::error::{BufferError, EncodeError, ResizeError, ScaleError};
use crate::Image;

/// A fixed-size RGBA raster target that can be drawn on, read back and encoded.
pub trait RasterSurface {
    /// Surface size (width, height) in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Multiplies the current uniform scale transform by `factor`.
    fn scale(&mut self, factor: f64);

    /// Draws `image` at the origin under the current transform.
    ///
    /// Parts that fall outside the surface are clipped. A non-finite or
    /// non-positive transform draws nothing.
    ///
    /// # Errors
    ///
    /// * `ScaleError::ImageNotReady` - When the image has a zero dimension
    /// * `ScaleError::Resize` - When resampling to the transformed size fails
    fn draw_image(&mut self, image: &Image<Rgba<u8>>) -> Result<(), ScaleError>;

    /// Copies the surface contents into a fresh pixel buffer.
    fn read_pixels(&self) -> PixelBuffer;

    /// Commits a buffer back to the surface.
    ///
    /// # Errors
    ///
    /// * `BufferError::DimensionMismatch` - When the buffer size differs from the surface
    fn write_pixels(&mut self, buffer: PixelBuffer) -> Result<(), BufferError>;

    /// Encodes the surface contents as a self-contained `data:` URI.
    fn serialize(&self) -> Result<String, EncodeError>;
}

/// In-memory raster surface backed by an RGBA image.
///
/// A new canvas is fully transparent black.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: Image<Rgba<u8>>,
    transform: f64,
}

impl Canvas {
    /// Creates a transparent canvas.
    ///
    /// # Errors
    ///
    /// * `ScaleError::EmptyCanvas` - When either dimension is zero
    pub fn new(width: u32, height: u32) -> Result<Self, ScaleError> {
        if width == 0 || height == 0 {
            return Err(ScaleError::EmptyCanvas);
        }
        Ok(Self {
            pixels: Image::new(width, height),
            transform: 1.0,
        })
    }

    /// Current uniform scale transform.
    pub const fn transform(&self) -> f64 {
        self.transform
    }

    pub fn as_image(&self) -> &Image<Rgba<u8>> {
        &self.pixels
    }

    pub fn into_image(self) -> Image<Rgba<u8>> {
        self.pixels
    }

    /// Encodes the canvas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, EncodeError> {
        let (width, height) = self.pixels.dimensions();
        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            self.pixels.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        )?;
        Ok(png)
    }

    /// Encodes the canvas as a `data:image/png;base64,` URI.
    pub fn to_data_url(&self) -> Result<String, EncodeError> {
        let png = self.to_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

/// Source pixels along one axis that land on the canvas, and their size once scaled.
///
/// The scaled size is `round(size * factor)` clamped to `[1, bound]`. When the
/// scaled image would overflow the canvas, only the leading
/// `ceil(bound / factor)` source pixels are kept so nothing larger than the
/// canvas is ever resampled.
fn visible_extent(size: u32, factor: f64, bound: u32) -> (u32, u32) {
    let scaled = (f64::from(size) * factor).round();
    if scaled <= f64::from(bound) {
        return (size, (scaled as u32).max(1));
    }

    let source = (f64::from(bound) / factor).ceil();
    if source >= f64::from(size) {
        (size, bound)
    } else {
        ((source as u32).max(1), bound)
    }
}

/// Resizes `image` to exactly `width` x `height`.
///
/// Shrinking uses area averaging, growing uses bilinear filtering.
fn resample(
    image: &Image<Rgba<u8>>,
    width: u32,
    height: u32,
) -> Result<Image<Rgba<u8>>, ResizeError> {
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let (src_width, src_height) = image.dimensions();
    if width <= src_width && height <= src_height {
        return InterAreaResize::new(width, height)?.resize(image);
    }

    Ok(imageops::resize(image, width, height, FilterType::Triangle))
}

impl RasterSurface for Canvas {
    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn scale(&mut self, factor: f64) {
        self.transform *= factor;
    }

    fn draw_image(&mut self, image: &Image<Rgba<u8>>) -> Result<(), ScaleError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ScaleError::ImageNotReady { width, height });
        }
        if !self.transform.is_finite() || self.transform <= 0.0 {
            return Ok(());
        }

        let (canvas_width, canvas_height) = self.pixels.dimensions();
        let (crop_width, target_width) = visible_extent(width, self.transform, canvas_width);
        let (crop_height, target_height) = visible_extent(height, self.transform, canvas_height);

        let scaled = if (crop_width, crop_height) == (width, height) {
            resample(image, target_width, target_height)?
        } else {
            let visible = imageops::crop_imm(image, 0, 0, crop_width, crop_height).to_image();
            resample(&visible, target_width, target_height)?
        };

        imageops::replace(&mut self.pixels, &scaled, 0, 0);
        Ok(())
    }

    fn read_pixels(&self) -> PixelBuffer {
        PixelBuffer::from_image_unchecked(self.pixels.clone())
    }

    fn write_pixels(&mut self, buffer: PixelBuffer) -> Result<(), BufferError> {
        let (width, height) = self.pixels.dimensions();
        buffer.ensure_dimensions(width, height)?;
        self.pixels = buffer.into_image()?;
        Ok(())
    }

    fn serialize(&self) -> Result<String, EncodeError> {
        self.to_data_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_transparent_black() {
        let canvas = Canvas::new(3, 2).unwrap();
        let pixels = canvas.read_pixels();
        assert_eq!(pixels.dimensions(), (3, 2));
        assert!(pixels.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn new_canvas_with_zero_dimension_fails() {
        assert!(matches!(Canvas::new(0, 4), Err(ScaleError::EmptyCanvas)));
    }

    #[test]
    fn scale_composes_multiplicatively() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.scale(2.0);
        canvas.scale(0.25);
        assert_eq!(canvas.transform(), 0.5);
    }

    #[test]
    fn draw_image_copies_pixels_without_blending() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let image = Image::from_pixel(2, 2, Rgba([200u8, 200, 200, 0]));
        canvas.draw_image(&image).unwrap();

        let pixels = canvas.read_pixels();
        assert_eq!(pixels.pixel(1, 1), Some(&[200u8, 200, 200, 0][..]));
        assert_eq!(pixels.pixel(2, 2), Some(&[0u8, 0, 0, 0][..]));
    }

    #[test]
    fn draw_image_clips_to_canvas() {
        let mut canvas = Canvas::new(2, 2).unwrap();
        let image = Image::from_pixel(5, 5, Rgba([1u8, 2, 3, 4]));
        canvas.draw_image(&image).unwrap();

        assert!(canvas
            .as_image()
            .pixels()
            .all(|pixel| *pixel == Rgba([1, 2, 3, 4])));
    }

    #[test]
    fn draw_image_upscales_under_transform() {
        let mut canvas = Canvas::new(8, 8).unwrap();
        canvas.scale(4.0);
        canvas
            .draw_image(&Image::from_pixel(2, 1, Rgba([50u8, 60, 70, 255])))
            .unwrap();

        let pixels = canvas.read_pixels();
        assert_eq!(pixels.pixel(7, 3), Some(&[50u8, 60, 70, 255][..]));
        assert_eq!(pixels.pixel(7, 4), Some(&[0u8, 0, 0, 0][..]));
    }

    #[test]
    fn write_pixels_round_trips_buffer() {
        let mut canvas = Canvas::new(1, 2).unwrap();
        let buffer = PixelBuffer::new(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        canvas.write_pixels(buffer.clone()).unwrap();
        assert_eq!(canvas.read_pixels(), buffer);
    }

    #[test]
    fn write_pixels_with_wrong_size_fails() {
        let mut canvas = Canvas::new(2, 2).unwrap();
        let buffer = PixelBuffer::new(1, 1, vec![0; 4]).unwrap();
        assert!(matches!(
            canvas.write_pixels(buffer),
            Err(BufferError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn serialize_produces_decodable_png_data_url() {
        let mut canvas = Canvas::new(2, 2).unwrap();
        canvas
            .draw_image(&Image::from_pixel(2, 2, Rgba([9u8, 8, 7, 255])))
            .unwrap();

        let url = canvas.serialize().unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let png = STANDARD.decode(payload).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), canvas.as_image().as_raw());
    }

    #[test]
    fn visible_extent_never_collapses_to_zero() {
        assert_eq!(visible_extent(1000, 0.0001, 64), (1000, 1));
        assert_eq!(visible_extent(100, 0.64, 64), (100, 64));
        assert_eq!(visible_extent(7, 64.0 / 7.0, 64), (7, 64));
    }

    #[test]
    fn visible_extent_clamps_to_canvas() {
        assert_eq!(visible_extent(4, 2048.0, 4), (1, 4));
        assert_eq!(visible_extent(5, 1.0, 2), (2, 2));
        assert_eq!(visible_extent(100, 1.5, 64), (43, 64));
        assert_eq!(visible_extent(3, 1e300, 8), (1, 8));
    }

    #[test]
    fn draw_image_with_huge_transform_only_resamples_visible_part() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let mut image = Image::from_pixel(4, 4, Rgba([0u8, 0, 255, 255]));
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));

        canvas.scale(2048.0);
        canvas.draw_image(&image).unwrap();

        // The whole canvas lies inside the first source pixel.
        assert!(canvas
            .as_image()
            .pixels()
            .all(|pixel| *pixel == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn draw_image_crops_before_upscaling() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let image = Image::from_fn(8, 8, |x, _| {
            if x < 2 {
                Rgba([10u8, 20, 30, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        });

        canvas.scale(2.0);
        canvas.draw_image(&image).unwrap();

        assert!(canvas
            .as_image()
            .pixels()
            .all(|pixel| *pixel == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn draw_image_rejects_empty_image() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let empty: Image<Rgba<u8>> = Image::new(0, 3);
        assert_eq!(
            canvas.draw_image(&empty),
            Err(ScaleError::ImageNotReady {
                width: 0,
                height: 3
            })
        );
    }
}
