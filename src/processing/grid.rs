//! # Pixel Grid
//!
//! The in-memory carrier: a rectangular grid of RGBA8 pixels held in one
//! contiguous `image::RgbaImage` buffer. Whatever the source color model
//! (palette, gray, RGB, 16-bit), pixels are canonicalized to four 8-bit
//! channels when the grid is built.
//!
//! ### Capacity
//! Only the R, G and B channels carry data, one bit each, so a grid holds
//! `width * height * 3` bits. An 800x600 image holds 1 440 000 bits (~180 KB).

use image::{DynamicImage, Rgba, RgbaImage};

/// Number of channels per pixel that carry payload bits (R, G, B).
pub const DATA_CHANNELS: u64 = 3;

/// Position of a single payload bit inside the grid.
///
/// Derived purely from the global bit index and the grid width:
/// pixel `p = i / 3`, channel `i % 3`, row `p / width`, col `p % width`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitCursor {
    pub row: u32,
    pub col: u32,
    pub channel: usize,
}

impl BitCursor {
    pub fn at(index: u64, width: u32) -> Self {
        if width == 0 {
            return Self::default();
        }

        let pixel = index / DATA_CHANNELS;
        let width = u64::from(width);
        Self {
            row: (pixel / width) as u32,
            col: (pixel % width) as u32,
            channel: (index % DATA_CHANNELS) as usize,
        }
    }
}

/// Rectangular RGBA8 pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    image: RgbaImage,
}

impl PixelGrid {
    /// Grid of the given size with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(pixel)),
        }
    }

    /// Convert any decoded image to the canonical RGBA8 form.
    ///
    /// Sources without alpha get a fully opaque (0xFF) fourth channel.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Total number of payload bits the grid can hold.
    pub fn capacity_bits(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height()) * DATA_CHANNELS
    }

    /// Whole bytes that fit, before any framing overhead.
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bits() / 8
    }

    pub fn pixel(&self, col: u32, row: u32) -> [u8; 4] {
        self.image.get_pixel(col, row).0
    }

    /// Channel value addressed by `cursor`. Panics if the cursor lies outside the grid.
    pub fn channel(&self, cursor: BitCursor) -> u8 {
        self.image.get_pixel(cursor.col, cursor.row).0[cursor.channel]
    }

    pub fn channel_mut(&mut self, cursor: BitCursor) -> &mut u8 {
        &mut self.image.get_pixel_mut(cursor.col, cursor.row).0[cursor.channel]
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }
}
