use image::Rgba;

use crate::contrast_fill::canvas::RasterSurface;
use crate::error::ScaleError;
use crate::Image;

/// Computes the uniform factor that fits `source` inside `canvas`.
///
/// The factor is `min(canvas_w / source_w, canvas_h / source_h)`, so the
/// scaled image touches at least one canvas edge and never exceeds either.
///
/// # Errors
///
/// * `ScaleError::EmptyCanvas` - When the canvas has a zero dimension
/// * `ScaleError::ImageNotReady` - When the source has a zero dimension, which
///   would otherwise produce an infinite or NaN factor
///
/// # Examples
///
/// ```
/// use contrast_fill::fit_scale_factor;
///
/// let factor = fit_scale_factor((128, 32), (64, 64)).unwrap();
/// assert_eq!(factor, 0.5);
/// ```
pub fn fit_scale_factor(source: (u32, u32), canvas: (u32, u32)) -> Result<f64, ScaleError> {
    let (canvas_width, canvas_height) = canvas;
    if canvas_width == 0 || canvas_height == 0 {
        return Err(ScaleError::EmptyCanvas);
    }

    let (width, height) = source;
    let not_ready = ScaleError::ImageNotReady { width, height };
    if width == 0 || height == 0 {
        return Err(not_ready);
    }

    let factor = (f64::from(canvas_width) / f64::from(width))
        .min(f64::from(canvas_height) / f64::from(height));

    if !factor.is_finite() || factor <= 0.0 {
        return Err(not_ready);
    }

    Ok(factor)
}

/// Draws `image` onto `surface` scaled to fit, anchored at the origin.
///
/// The fit factor is pushed onto the surface transform for the duration of
/// the draw and undone right after, so later operations on the surface see
/// the transform they started with. Returns the factor used.
pub fn draw_scaled<S>(surface: &mut S, image: &Image<Rgba<u8>>) -> Result<f64, ScaleError>
where
    S: RasterSurface + ?Sized,
{
    let factor = fit_scale_factor(image.dimensions(), surface.dimensions())?;

    tracing::debug!(
        source = ?image.dimensions(),
        canvas = ?surface.dimensions(),
        factor,
        "Scaling image to fit canvas"
    );

    surface.scale(factor);
    let drawn = surface.draw_image(image);
    surface.scale(1.0 / factor);
    drawn?;

    Ok(factor)
}
