pub mod background;
pub mod brightness;
pub mod canvas;
pub mod channel;
pub mod fill_color;
pub mod inter_area;
pub mod loader;
pub mod options;
pub mod pixel_buffer;
pub mod rewrite;
pub mod scale;
pub mod transparency;
