use crate::contrast_fill::channel::{CHANNEL_COUNT, CHANNEL_MASK};

/// Alpha values strictly below this are treated as transparent.
pub const DEFAULT_TRANSPARENCY_THRESHOLD: u8 = 32;

/// Returns `true` if the pixel's alpha is strictly below `threshold`.
///
/// Only the alpha channel is inspected. This is a hard cutoff: there is no
/// partial transparency.
#[inline]
pub fn is_transparent(pixel: &[u8; CHANNEL_COUNT], threshold: u8) -> bool {
    pixel[CHANNEL_MASK.alpha()] < threshold
}
