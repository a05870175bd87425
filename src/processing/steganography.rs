//! # LSB Steganography Implementation
//!
//! File and in-memory entry points around [`MessageCodec`]: decoding the
//! cover image into a [`PixelGrid`], reading the payload, and writing the
//! result back out as PNG.
//!
//! ## Algorithm
//!
//! The LSB steganography technique hides data within an image by modifying the least
//! significant bit of each color channel (R, G, B) in the image pixels.
//!
//! ### Encoding Process
//! 1. Decode the cover image and convert it to RGBA8
//! 2. Frame the payload (length prefix or zero terminator)
//! 3. For each bit of the framed payload, MSB first:
//!    - Clear the LSB of the next channel and set it to the data bit
//!    - Move to next channel (R → G → B → next pixel, row by row)
//! 4. Save the modified image as a lossless 8-bit RGBA PNG
//!
//! ### Decoding Process
//! 1. Decode the image and convert it to RGBA8
//! 2. Read bits in the same order and rebuild the framed payload
//!
//! Output is always PNG: a lossy format would destroy the embedded bits.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;
use log::{debug, info};

use super::codec::{EmbedReport, ExtractReport, MessageCodec};
use super::error::StegoError;
use super::grid::PixelGrid;

/// Read and decode an image file into an RGBA8 grid.
///
/// # Errors
/// - [`StegoError::ResourceUnreadable`] if the file cannot be read
/// - [`StegoError::InvalidImage`] if its contents are not a supported image
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<PixelGrid, StegoError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| StegoError::ResourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let grid = decode_grid(&bytes, &path.display().to_string())?;
    debug!(
        "Loaded {} ({}x{}, {} bits of capacity)",
        path.display(),
        grid.width(),
        grid.height(),
        grid.capacity_bits()
    );
    Ok(grid)
}

fn decode_grid(bytes: &[u8], origin: &str) -> Result<PixelGrid, StegoError> {
    let img = image::load_from_memory(bytes).map_err(|source| StegoError::InvalidImage {
        origin: origin.to_string(),
        source,
    })?;
    Ok(PixelGrid::from_image(img))
}

/// Encode the grid as a non-interlaced 8-bit RGBA PNG.
pub fn encode_png(grid: &PixelGrid) -> Result<Vec<u8>, StegoError> {
    let mut output_bytes = Vec::new();
    grid.as_rgba()
        .write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)
        .map_err(StegoError::ImageEncoding)?;
    Ok(output_bytes)
}

/// Write the grid to `path` as PNG.
///
/// The PNG is fully encoded in memory before the file is created, so an
/// encoding failure never leaves a partial file behind.
pub fn save_grid<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> Result<(), StegoError> {
    let path = path.as_ref();
    let png = encode_png(grid)?;
    fs::write(path, png).map_err(|source| StegoError::ResourceUnwritable {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole payload file into memory.
pub fn read_payload<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, StegoError> {
    let path = path.as_ref();
    fs::read(path).map_err(|source| StegoError::ResourceUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_payload<P: AsRef<Path>>(path: P, payload: &[u8]) -> Result<(), StegoError> {
    let path = path.as_ref();
    fs::write(path, payload).map_err(|source| StegoError::ResourceUnwritable {
        path: path.to_path_buf(),
        source,
    })
}

/// Embed `payload` into an in-memory image.
///
/// # Arguments
/// - `image_bytes`: Raw bytes of the cover image (any format supported by `image` crate)
/// - `payload`: Bytes to hide
///
/// # Returns
/// PNG image bytes carrying the payload.
///
/// # Example
/// ```ignore
/// let cover = std::fs::read("input.jpg")?;
/// let stego = embed_image_bytes(&cover, b"Secret message", &MessageCodec::default())?;
/// std::fs::write("output.png", stego)?;
/// ```
pub fn embed_image_bytes(
    image_bytes: &[u8],
    payload: &[u8],
    codec: &MessageCodec,
) -> Result<Vec<u8>, StegoError> {
    let mut grid = decode_grid(image_bytes, "<memory>")?;
    codec.embed(&mut grid, payload)?;
    encode_png(&grid)
}

/// Extract the payload hidden in an in-memory image.
pub fn extract_image_bytes(image_bytes: &[u8], codec: &MessageCodec) -> Result<Vec<u8>, StegoError> {
    let grid = decode_grid(image_bytes, "<memory>")?;
    codec.extract(&grid)
}

/// Embed the contents of `message_path` into `input` and write the PNG to `output`.
///
/// Nothing is written to `output` unless embedding succeeded.
pub fn encode_file(
    input: &Path,
    message_path: &Path,
    output: &Path,
    codec: &MessageCodec,
) -> Result<EmbedReport, StegoError> {
    let mut grid = load_grid(input)?;
    let payload = read_payload(message_path)?;

    let report = codec.embed(&mut grid, &payload)?;
    save_grid(&grid, output)?;

    info!(
        "Message encoded successfully: {} bytes into {}",
        report.payload_bytes,
        output.display()
    );
    Ok(report)
}

/// Extract the payload hidden in `input` and write it to `output`.
///
/// Nothing is written to `output` unless extraction succeeded.
pub fn decode_file(
    input: &Path,
    output: &Path,
    codec: &MessageCodec,
) -> Result<ExtractReport, StegoError> {
    let grid = load_grid(input)?;
    let report = codec.extract_with_report(&grid)?;
    write_payload(output, &report.payload)?;

    info!(
        "Message decoded successfully: {} bytes into {}",
        report.payload.len(),
        output.display()
    );
    Ok(report)
}
