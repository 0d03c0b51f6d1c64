//! Test utilities for contrast-fill
//!
//! This module provides fixtures shared by the unit tests.
//! It is only compiled when running tests.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba};
use itertools::iproduct;

use crate::contrast_fill::loader::{ImageLoader, ImageSource};
use crate::error::LoadError;
use crate::Image;

/// Creates a test RGBA image with predefined pixel values for testing.
///
/// This function creates a 2x2 test image with known pixel values including alpha:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent, still above the cutoff)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Creates an image with an opaque disc on a transparent background.
pub fn create_disc_image(size: u32, color: Rgba<u8>) -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(size, size);
    let center = size as f32 / 2.0;
    let radius = center * 0.8;

    iproduct!(0..size, 0..size).for_each(|(y, x)| {
        let distance = (x as f32 + 0.5 - center).hypot(y as f32 + 0.5 - center);
        if distance <= radius {
            image.put_pixel(x, y, color);
        }
    });

    image
}

/// Encodes an RGBA image as PNG bytes.
pub fn encode_png(image: &Image<Rgba<u8>>) -> Vec<u8> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .expect("png encoding");
    png
}

/// Loader returning a fixed image, with switches for failure and stalling.
#[derive(Debug)]
pub struct RecordingLoader {
    image: Image<Rgba<u8>>,
    calls: AtomicUsize,
    fail_next: AtomicBool,
    stalled: bool,
}

impl RecordingLoader {
    pub fn new(image: Image<Rgba<u8>>) -> Self {
        Self {
            image,
            calls: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            stalled: false,
        }
    }

    /// Makes every load wait forever.
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageLoader for RecordingLoader {
    async fn load(&self, _source: &ImageSource) -> Result<DynamicImage, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.stalled {
            std::future::pending::<()>().await;
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(LoadError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "source unreachable",
            )));
        }

        Ok(DynamicImage::ImageRgba8(self.image.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgba_image_has_known_pixels() {
        let image = create_test_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
    }

    #[test]
    fn create_disc_image_has_transparent_corners() {
        let image = create_disc_image(16, Rgba([1, 2, 3, 255]));
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(15, 15)[3], 0);
        assert_eq!(*image.get_pixel(8, 8), Rgba([1, 2, 3, 255]));
    }
}
