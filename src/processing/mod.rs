//! # Image Processing and Steganography
//!
//! This module hides byte payloads in images using LSB (Least Significant Bit)
//! steganography.
//!
//! - [`grid`]: RGBA8 pixel grid and bit addressing
//! - [`bitstream`]: bit-level reader and writer over the grid
//! - [`codec`]: payload framing, capacity policy, embed/extract
//! - [`steganography`]: image and payload file I/O around the codec
//! - [`error`]: error kinds shared by all of the above

pub mod bitstream;
pub mod codec;
pub mod error;
pub mod grid;
pub mod steganography;

// Re-export main types for convenience
pub use codec::{EmbedReport, ExtractReport, Framing, MessageCodec, OverflowPolicy};
pub use error::StegoError;
pub use grid::{BitCursor, PixelGrid};
pub use steganography::{embed_image_bytes, extract_image_bytes};
