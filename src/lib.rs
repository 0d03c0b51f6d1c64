mod contrast_fill;
mod error;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use contrast_fill::background::{BackgroundFiller, ProcessedImage};
pub use contrast_fill::brightness::{average_brightness, AverageBrightness};
pub use contrast_fill::canvas::{Canvas, RasterSurface};
pub use contrast_fill::channel::{ChannelMask, CHANNEL_COUNT, CHANNEL_MASK};
pub use contrast_fill::fill_color::{FillColor, DEFAULT_BRIGHTNESS_THRESHOLD};
pub use contrast_fill::inter_area::{InterAreaResize, InterAreaResizeExt};
pub use contrast_fill::loader::{DefaultLoader, ImageLoader, ImageSource};
pub use contrast_fill::options::{FillOptions, DEFAULT_CANVAS_SIZE};
pub use contrast_fill::pixel_buffer::PixelBuffer;
pub use contrast_fill::rewrite::{
    rewrite_transparent, rewrite_transparent_pixels, ContrastFillExt, FillOutcome,
};
pub use contrast_fill::scale::{draw_scaled, fit_scale_factor};
pub use contrast_fill::transparency::{is_transparent, DEFAULT_TRANSPARENCY_THRESHOLD};
pub use error::{
    BufferError, ConfigError, EncodeError, Error, LoadError, ResizeError, ScaleError,
};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
