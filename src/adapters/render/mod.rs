pub mod annotator;
pub mod bitmap_font;
pub mod font;
