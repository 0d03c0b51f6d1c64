/// Number of bytes per RGBA pixel.
pub const CHANNEL_COUNT: usize = 4;

/// Byte offset of each color channel within one RGBA pixel.
///
/// Offsets are always below [`CHANNEL_COUNT`] and pairwise distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask {
    red: usize,
    green: usize,
    blue: usize,
    alpha: usize,
}

/// Channel layout of every pixel buffer handled by this crate.
pub const CHANNEL_MASK: ChannelMask = ChannelMask {
    red: 0,
    green: 1,
    blue: 2,
    alpha: 3,
};

impl ChannelMask {
    /// Creates a mask from channel offsets.
    ///
    /// Returns `None` when an offset falls outside one pixel or two channels
    /// share an offset.
    pub const fn new(red: usize, green: usize, blue: usize, alpha: usize) -> Option<Self> {
        let offsets = [red, green, blue, alpha];
        let mut seen = [false; CHANNEL_COUNT];
        let mut i = 0;
        while i < CHANNEL_COUNT {
            let offset = offsets[i];
            if offset >= CHANNEL_COUNT || seen[offset] {
                return None;
            }
            seen[offset] = true;
            i += 1;
        }
        Some(Self {
            red,
            green,
            blue,
            alpha,
        })
    }

    pub const fn red(&self) -> usize {
        self.red
    }

    pub const fn green(&self) -> usize {
        self.green
    }

    pub const fn blue(&self) -> usize {
        self.blue
    }

    pub const fn alpha(&self) -> usize {
        self.alpha
    }

    /// Writes `color` into `pixel`, placing each channel at its masked offset.
    ///
    /// `color` is given in red, green, blue, alpha order.
    #[inline]
    pub fn write(&self, pixel: &mut [u8; CHANNEL_COUNT], color: [u8; CHANNEL_COUNT]) {
        let [red, green, blue, alpha] = color;
        pixel[self.red] = red;
        pixel[self.green] = green;
        pixel[self.blue] = blue;
        pixel[self.alpha] = alpha;
    }
}
