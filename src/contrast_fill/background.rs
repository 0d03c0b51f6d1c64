use image::DynamicImage;
use tokio::sync::RwLock;

use crate::contrast_fill::canvas::{Canvas, RasterSurface};
use crate::contrast_fill::loader::{DefaultLoader, ImageLoader, ImageSource};
use crate::contrast_fill::options::FillOptions;
use crate::contrast_fill::pixel_buffer::PixelBuffer;
use crate::contrast_fill::rewrite::{rewrite_transparent, FillOutcome};
use crate::contrast_fill::scale::draw_scaled;
use crate::error::{Error, LoadError};

/// Result of running the fill over one decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// Rewritten canvas contents
    pub pixels: PixelBuffer,
    /// Brightness, fill color and rewrite count of the pass
    pub outcome: FillOutcome,
    /// PNG `data:` URI of the result
    pub data_url: String,
}

/// Fits images into a small canvas and fills their transparent regions with a
/// contrasting color, keeping the most recent encoded result.
///
/// # Examples
///
/// ```
/// use contrast_fill::{BackgroundFiller, ImageSource};
///
/// # async fn example(png: Vec<u8>) -> Result<(), contrast_fill::Error> {
/// let filler = BackgroundFiller::new();
/// filler.process(ImageSource::Bytes(png)).await?;
/// let data_url = filler.get().await;
/// assert!(data_url.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BackgroundFiller<L = DefaultLoader> {
    loader: L,
    options: FillOptions,
    result: RwLock<Option<String>>,
}

impl BackgroundFiller<DefaultLoader> {
    pub fn new() -> Self {
        Self::with_loader(DefaultLoader, FillOptions::default())
    }

    /// Uses the default loader with custom options.
    pub fn with_options(options: FillOptions) -> Self {
        Self::with_loader(DefaultLoader, options)
    }
}

impl Default for BackgroundFiller<DefaultLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ImageLoader> BackgroundFiller<L> {
    pub fn with_loader(loader: L, options: FillOptions) -> Self {
        Self {
            loader,
            options,
            result: RwLock::new(None),
        }
    }

    pub const fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Loads `source`, fits it into the canvas, fills its transparent pixels
    /// and stores the encoded result.
    ///
    /// The only await is on the loader; no pixel is touched before the image
    /// is ready. On failure the previously stored result is kept.
    ///
    /// # Errors
    ///
    /// * `Error::Config` - When the options are invalid
    /// * `Error::Load` - When the source cannot be read, decoded, or times out
    /// * `Error::Scale` - When the decoded image reports zero dimensions
    /// * `Error::Buffer` - When the canvas buffer is unusable
    /// * `Error::Encode` - When PNG encoding fails
    pub async fn process(&self, source: impl Into<ImageSource>) -> Result<(), Error> {
        let source = source.into();
        let outcome = self.load_and_fill(&source).await;

        match outcome {
            Ok(processed) => {
                *self.result.write().await = Some(processed.data_url);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(source = %source_kind(&source), error = %e, "Background fill failed");
                Err(e)
            }
        }
    }

    /// Returns the data URI produced by the last successful [`process`](Self::process).
    pub async fn get(&self) -> Option<String> {
        self.result.read().await.clone()
    }

    /// Runs the synchronous part of the pipeline on an already decoded image.
    ///
    /// Nothing is stored.
    pub fn process_image(&self, image: &DynamicImage) -> Result<ProcessedImage, Error> {
        self.options.validate()?;

        let (width, height) = self.options.canvas_size;
        let mut canvas = Canvas::new(width, height)?;
        draw_scaled(&mut canvas, &image.to_rgba8())?;

        let mut pixels = canvas.read_pixels();
        let outcome = rewrite_transparent(&mut pixels, &self.options)?;
        canvas.write_pixels(pixels.clone())?;
        let data_url = canvas.serialize()?;

        Ok(ProcessedImage {
            pixels,
            outcome,
            data_url,
        })
    }

    async fn load_and_fill(&self, source: &ImageSource) -> Result<ProcessedImage, Error> {
        self.options.validate()?;

        let image = match self.options.load_timeout {
            Some(limit) => tokio::time::timeout(limit, self.loader.load(source))
                .await
                .map_err(|_| LoadError::TimedOut(limit))??,
            None => self.loader.load(source).await?,
        };

        self.process_image(&image)
    }
}

/// Short description of a source for log lines, without dumping payloads.
fn source_kind(source: &ImageSource) -> String {
    match source {
        ImageSource::Path(path) => path.display().to_string(),
        ImageSource::Bytes(bytes) => format!("{} bytes", bytes.len()),
        ImageSource::DataUrl(url) => format!("data URL ({} chars)", url.len()),
        ImageSource::Url(url) => url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contrast_fill::fill_color::FillColor;
    use crate::test_utils::{encode_png, RecordingLoader};
    use crate::Image;
    use image::Rgba;

    #[tokio::test]
    async fn get_before_process_returns_none() {
        let filler = BackgroundFiller::new();
        assert_eq!(filler.get().await, None);
    }

    #[tokio::test]
    async fn process_stores_opaque_result() {
        let mut image = Image::from_pixel(32, 16, Rgba([240u8, 240, 240, 255]));
        image.put_pixel(0, 0, Rgba([240, 240, 240, 0]));
        let filler = BackgroundFiller::new();

        filler
            .process(ImageSource::Bytes(encode_png(&image)))
            .await
            .unwrap();

        let url = filler.get().await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn process_image_letterboxes_and_fills() {
        // 32x16 bright image -> 64x32 band, bottom half of the canvas is empty.
        let image = DynamicImage::ImageRgba8(Image::from_pixel(
            32,
            16,
            Rgba([240u8, 240, 240, 255]),
        ));
        let filler = BackgroundFiller::new();

        let processed = filler.process_image(&image).unwrap();
        // (2048 * 720) / 4096 = 360
        assert_eq!(processed.outcome.brightness, 360);
        assert_eq!(processed.outcome.fill, FillColor::Black);
        assert_eq!(processed.outcome.rewritten, 64 * 32);
        assert_eq!(processed.pixels.pixel(0, 0), Some(&[240u8, 240, 240, 255][..]));
        assert_eq!(processed.pixels.pixel(0, 32), Some(&[0u8, 0, 0, 255][..]));
        assert!(processed
            .pixels
            .as_bytes()
            .chunks_exact(4)
            .all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn process_image_with_dark_content_fills_white() {
        let image = DynamicImage::ImageRgba8(Image::from_pixel(8, 8, Rgba([5u8, 5, 5, 255])));
        let filler = BackgroundFiller::with_options(FillOptions::default().with_canvas_size(8, 16));

        let processed = filler.process_image(&image).unwrap();
        assert_eq!(processed.outcome.fill, FillColor::White);
        assert_eq!(processed.pixels.pixel(7, 15), Some(&[255u8, 255, 255, 255][..]));
    }

    #[test]
    fn process_image_with_invalid_options_fails() {
        let image = DynamicImage::ImageRgba8(Image::from_pixel(1, 1, Rgba([0u8, 0, 0, 0])));
        let filler = BackgroundFiller::with_options(FillOptions::default().with_canvas_size(0, 0));
        assert!(matches!(
            filler.process_image(&image),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn process_image_with_empty_image_is_not_ready() {
        let image = DynamicImage::ImageRgba8(Image::new(0, 0));
        let filler = BackgroundFiller::new();
        assert!(matches!(
            filler.process_image(&image),
            Err(Error::Scale(crate::ScaleError::ImageNotReady { .. }))
        ));
    }

    #[tokio::test]
    async fn failed_process_keeps_previous_result() {
        let image = Image::from_pixel(4, 4, Rgba([100u8, 100, 100, 255]));
        let filler = BackgroundFiller::with_loader(RecordingLoader::new(image), FillOptions::default());

        filler.process(ImageSource::Bytes(Vec::new())).await.unwrap();
        let first = filler.get().await;
        assert!(first.is_some());

        filler.loader.fail_next();
        assert!(matches!(
            filler.process(ImageSource::Bytes(Vec::new())).await,
            Err(Error::Load(_))
        ));
        assert_eq!(filler.get().await, first);
        assert_eq!(filler.loader.calls(), 2);
    }

    #[tokio::test]
    async fn process_times_out_when_loader_never_resolves() {
        let image = Image::from_pixel(1, 1, Rgba([0u8, 0, 0, 255]));
        let loader = RecordingLoader::new(image).stalled();
        let options = FillOptions::default().with_load_timeout(std::time::Duration::from_millis(20));
        let filler = BackgroundFiller::with_loader(loader, options);

        let result = filler.process(ImageSource::Bytes(Vec::new())).await;
        assert!(matches!(result, Err(Error::Load(LoadError::TimedOut(_)))));
        assert_eq!(filler.get().await, None);
    }
}
