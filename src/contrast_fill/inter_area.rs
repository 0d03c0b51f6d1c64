use image::{GenericImageView, ImageBuffer, Pixel};
use imageproc::definitions::{Clamp, Image};

use crate::error::ResizeError;

/// Contribution of one source index to one destination index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaWeight {
    /// Destination index
    pub destination_index: u32,
    /// Source index
    pub source_index: u32,
    /// Fraction of the destination cell covered by the source pixel
    pub weight: f32,
}

/// Area-averaging downscaler.
///
/// Every destination pixel is the area-weighted mean of the source pixels its
/// footprint covers, which avoids the aliasing of point sampling when a large
/// image is squeezed into a small canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterAreaResize {
    /// New width
    pub new_width: u32,
    /// New height
    pub new_height: u32,
}

impl InterAreaResize {
    /// Create a new area resizer.
    pub const fn new(new_width: u32, new_height: u32) -> Result<Self, ResizeError> {
        if new_width == 0 || new_height == 0 {
            return Err(ResizeError::InvalidTargetDimensions {
                width: new_width,
                height: new_height,
            });
        }
        Ok(Self {
            new_width,
            new_height,
        })
    }

    /// Resize an image by area averaging.
    ///
    /// # Errors
    ///
    /// * `ResizeError::EmptyImage` - When the source has a zero dimension
    /// * `ResizeError::UpscalingNotSupported` - When the target exceeds the source on either axis
    pub fn resize<I, P>(&self, src: &I) -> Result<Image<P>, ResizeError>
    where
        I: GenericImageView<Pixel = P>,
        P: Pixel<Subpixel = u8>,
    {
        let (src_width, src_height) = src.dimensions();

        if src_width == 0 || src_height == 0 {
            return Err(ResizeError::EmptyImage {
                width: src_width,
                height: src_height,
            });
        }

        if self.new_width > src_width || self.new_height > src_height {
            return Err(ResizeError::UpscalingNotSupported {
                src_width,
                src_height,
                target_width: self.new_width,
                target_height: self.new_height,
            });
        }

        if is_integer_ratio(src_width, self.new_width)
            && is_integer_ratio(src_height, self.new_height)
        {
            Ok(resize_integer_ratio(src, self.new_width, self.new_height))
        } else {
            Ok(resize_fractional(src, self.new_width, self.new_height))
        }
    }
}

/// Builds the weight table mapping `src_size` samples onto `dst_size` cells.
///
/// Weights of each destination cell sum to one.
fn area_weights(src_size: u32, dst_size: u32) -> Vec<AreaWeight> {
    let scale = f64::from(src_size) / f64::from(dst_size);
    let mut table = Vec::new();

    for destination_index in 0..dst_size {
        let start = f64::from(destination_index) * scale;
        let end = (start + scale).min(f64::from(src_size));
        let first = start.floor() as u32;
        let last = (end.ceil() as u32).min(src_size);

        for source_index in first..last {
            let lo = start.max(f64::from(source_index));
            let hi = end.min(f64::from(source_index + 1));
            let overlap = hi - lo;
            if overlap > 1e-9 {
                table.push(AreaWeight {
                    destination_index,
                    source_index,
                    weight: (overlap / scale) as f32,
                });
            }
        }
    }

    table
}

/// Whether `src_size` is an exact multiple of `dst_size`.
fn is_integer_ratio(src_size: u32, dst_size: u32) -> bool {
    dst_size <= src_size && src_size % dst_size == 0
}

#[inline]
fn to_subpixel(value: f32) -> u8 {
    <u8 as Clamp<f32>>::clamp(value.round())
}

/// Box average for exact integer ratios.
fn resize_integer_ratio<I, P>(src: &I, dst_width: u32, dst_height: u32) -> Image<P>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = u8>,
{
    let (src_width, src_height) = src.dimensions();
    let block_x = src_width / dst_width;
    let block_y = src_height / dst_height;
    let inv_area = 1.0 / (block_x * block_y) as f32;
    let channels = usize::from(P::CHANNEL_COUNT);

    ImageBuffer::from_fn(dst_width, dst_height, |dx, dy| {
        let mut sum = vec![0.0f32; channels];

        for sy in dy * block_y..(dy + 1) * block_y {
            for sx in dx * block_x..(dx + 1) * block_x {
                let pixel = src.get_pixel(sx, sy);
                for (acc, &value) in sum.iter_mut().zip(pixel.channels()) {
                    *acc += f32::from(value);
                }
            }
        }

        let out: Vec<u8> = sum.iter().map(|&v| to_subpixel(v * inv_area)).collect();
        *P::from_slice(&out)
    })
}

/// Separable area resize for arbitrary ratios: horizontal pass, then vertical.
fn resize_fractional<I, P>(src: &I, dst_width: u32, dst_height: u32) -> Image<P>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = u8>,
{
    let (src_width, src_height) = src.dimensions();
    let x_weights = area_weights(src_width, dst_width);
    let y_weights = area_weights(src_height, dst_height);
    let channels = usize::from(P::CHANNEL_COUNT);
    let row_len = dst_width as usize * channels;

    // One horizontally resized row per source row.
    let mut rows = vec![0.0f32; src_height as usize * row_len];
    for sy in 0..src_height {
        let row = &mut rows[sy as usize * row_len..(sy as usize + 1) * row_len];
        for entry in &x_weights {
            let pixel = src.get_pixel(entry.source_index, sy);
            let base = entry.destination_index as usize * channels;
            for (c, &value) in pixel.channels().iter().enumerate() {
                row[base + c] += f32::from(value) * entry.weight;
            }
        }
    }

    let mut columns = vec![0.0f32; dst_height as usize * row_len];
    for entry in &y_weights {
        let src_row = entry.source_index as usize * row_len;
        let dst_row = entry.destination_index as usize * row_len;
        for i in 0..row_len {
            columns[dst_row + i] += rows[src_row + i] * entry.weight;
        }
    }

    ImageBuffer::from_fn(dst_width, dst_height, |dx, dy| {
        let base = dy as usize * row_len + dx as usize * channels;
        let out: Vec<u8> = columns[base..base + channels]
            .iter()
            .map(|&v| to_subpixel(v))
            .collect();
        *P::from_slice(&out)
    })
}

/// Extension trait for ImageBuffer to provide area resize methods.
pub trait InterAreaResizeExt {
    /// Resize image using area averaging.
    fn resize_area(&self, new_width: u32, new_height: u32) -> Result<Self, ResizeError>
    where
        Self: Sized;
}

impl<P> InterAreaResizeExt for Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    fn resize_area(&self, new_width: u32, new_height: u32) -> Result<Self, ResizeError> {
        InterAreaResize::new(new_width, new_height)?.resize(self)
    }
}
