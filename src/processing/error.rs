//! # Steganography Errors
//!
//! Every failure an encode or decode run can hit, as one typed enum. All of
//! them are terminal for the run; the binary turns them into a non-zero exit.

use std::io;
use std::path::PathBuf;

/// Errors produced while embedding into or extracting from a pixel grid.
#[derive(Debug, thiserror::Error)]
pub enum StegoError {
    /// A source file (cover image or message) could not be read.
    #[error("cannot read {}: {}", .path.display(), .source)]
    ResourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bytes were read but are not a decodable image.
    #[error("unsupported or corrupt image ({origin}): {source}")]
    InvalidImage {
        origin: String,
        #[source]
        source: image::ImageError,
    },

    /// A destination file could not be created or written.
    #[error("cannot write {}: {}", .path.display(), .source)]
    ResourceUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The grid could not be encoded as PNG.
    #[error("failed to encode PNG: {0}")]
    ImageEncoding(#[source] image::ImageError),

    /// The payload (with its framing) does not fit in the grid.
    #[error("message too large for this image: need {required_bits} bits but only {available_bits} are available")]
    CapacityExceeded {
        required_bits: u64,
        available_bits: u64,
    },

    /// There is nothing to embed.
    #[error("message is empty; an empty message cannot be recovered")]
    EmptyPayload,

    /// Decoding produced no bytes.
    #[error("no hidden message found in the image")]
    NoMessageFound,

    /// The grid ran out before the terminator byte was found.
    #[error("hidden message is not terminated: image exhausted after {} bytes", .partial.len())]
    UnterminatedMessage { partial: Vec<u8> },
}
