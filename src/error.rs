use std::time::Duration;

use thiserror::Error;

/// Error type for scale factor computation
///
/// A scale factor is only meaningful once the source image has been fully
/// decoded and reports positive dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
    /// The source image reported zero or unknown dimensions
    ///
    /// Fitting such an image into a canvas yields an infinite or NaN factor,
    /// which is rejected instead of being used for drawing.
    #[error("Image is not ready: source dimensions {width}x{height} give no finite scale factor")]
    ImageNotReady { width: u32, height: u32 },

    /// The target canvas has a zero dimension
    #[error("Target canvas must have non-zero dimensions")]
    EmptyCanvas,

    /// Resampling the image for the current transform failed
    #[error(transparent)]
    Resize(#[from] ResizeError),
}

/// Error type for pixel buffer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The buffer holds no pixels, so no average can be taken
    #[error("Pixel buffer is empty: cannot average over zero pixels")]
    Empty,

    /// The buffer length is not a multiple of the RGBA pixel stride
    #[error("Pixel buffer length {length} is not a positive multiple of 4")]
    MalformedLength { length: usize },

    /// The buffer length disagrees with the dimensions it is paired with
    #[error("Pixel buffer holds {actual_len} bytes, expected {expected_len}")]
    LengthMismatch {
        /// Byte length implied by `width * height * 4`
        expected_len: usize,
        /// Byte length actually supplied
        actual_len: usize,
    },

    /// The buffer does not match the dimensions it is paired with
    #[error("Pixel buffer dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}

/// Error type for area resizing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResizeError {
    /// Target dimensions must be non-zero
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidTargetDimensions { width: u32, height: u32 },

    /// Source image has a zero dimension
    #[error("Cannot resize empty image: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// Area averaging only shrinks images
    #[error("Area resize cannot upscale {src_width}x{src_height} to {target_width}x{target_height}")]
    UpscalingNotSupported {
        src_width: u32,
        src_height: u32,
        target_width: u32,
        target_height: u32,
    },
}

/// Error type for loading and decoding source images
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the source failed
    #[error("Failed to read image source: {0}")]
    Io(#[from] std::io::Error),

    /// The source bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The source identifier uses a scheme the loader cannot read
    #[error("Unsupported image source: {0}")]
    InvalidSource(String),

    /// The `data:` URI is not a base64 encoded payload
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The base64 payload of a `data:` URI is malformed
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The image did not become ready within the configured timeout
    #[error("Image did not load within {0:?}")]
    TimedOut(Duration),

    /// The blocking decode task was cancelled or panicked
    #[error("Decode task failed: {0}")]
    Task(String),
}

/// Error type for serializing a surface
#[derive(Debug, Error)]
pub enum EncodeError {
    /// PNG encoding failed
    #[error("Failed to encode PNG: {0}")]
    Png(#[from] image::ImageError),
}

/// Error type for invalid fill options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The working canvas has a zero dimension
    #[error("Canvas size must be non-zero, got {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },

    /// A transparency threshold of zero never matches any pixel
    #[error("Transparency threshold must be greater than zero")]
    InvalidTransparencyThreshold,
}

/// Top-level error returned by the processing pipeline
///
/// Every stage error is a precondition violation at the boundary where it
/// occurs. None of them are retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
