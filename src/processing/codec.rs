//! # Message Codec
//!
//! Maps a byte payload onto a [`PixelGrid`] through the bitstream, and back.
//!
//! ## Framing
//!
//! Two framings are supported:
//!
//! - [`Framing::LengthPrefixed`] (default): `[u32 BE byte count][payload]`.
//!   Decode reads the count first and then exactly that many bytes, so the
//!   payload may contain any byte value.
//! - [`Framing::Sentinel`]: `[payload][0x00]`. Decode stops at the first zero
//!   byte. Bit-compatible with images produced by the legacy C tool, which
//!   means a zero byte inside the payload ends the message early.
//!
//! ## Overflow
//!
//! With [`OverflowPolicy::Fail`] an oversized payload is rejected before the
//! grid is touched. [`OverflowPolicy::Truncate`] keeps as many whole payload
//! bytes as fit next to the framing.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::bitstream::{BitReader, BitWriter};
use super::error::StegoError;
use super::grid::{BitCursor, PixelGrid};

/// Terminator byte used by [`Framing::Sentinel`].
pub const SENTINEL: u8 = 0x00;

/// Width of the length field used by [`Framing::LengthPrefixed`].
pub const LENGTH_PREFIX_BITS: u32 = 32;

/// Upper bound on the size of a decoded message.
pub const DEFAULT_MAX_MESSAGE_BYTES: u64 = 1_000_000_000;

/// How the end of the message is marked inside the bitstream.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    #[default]
    LengthPrefixed,
    Sentinel,
}

impl Framing {
    /// Bytes the framing adds around the payload.
    pub fn overhead_bytes(self) -> u64 {
        match self {
            Framing::LengthPrefixed => u64::from(LENGTH_PREFIX_BITS / 8),
            Framing::Sentinel => 1,
        }
    }

    /// Bits occupied by a framed payload of `payload_len` bytes.
    pub fn framed_bits(self, payload_len: usize) -> u64 {
        (payload_len as u64 + self.overhead_bytes()) * 8
    }
}

/// What to do when the payload does not fit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    #[default]
    Fail,
    Truncate,
}

/// Outcome of a successful embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedReport {
    /// Payload bytes actually embedded.
    pub payload_bytes: usize,
    /// Payload bytes the caller asked to embed.
    pub requested_bytes: usize,
    /// Bits written, framing included.
    pub bits_written: u64,
    pub capacity_bits: u64,
    /// Cursor of the first bit after the message.
    pub end: BitCursor,
    pub truncated: bool,
}

/// Outcome of a successful extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    pub payload: Vec<u8>,
    /// Bits consumed from the grid, framing included.
    pub bits_read: u64,
    pub capacity_bits: u64,
    /// Cursor of the first bit after the last one read.
    pub end: BitCursor,
}

/// Embeds and extracts framed payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCodec {
    framing: Framing,
    overflow: OverflowPolicy,
    max_message_bytes: u64,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(Framing::default())
    }
}

impl MessageCodec {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            overflow: OverflowPolicy::default(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_max_message_bytes(mut self, max_message_bytes: u64) -> Self {
        self.max_message_bytes = max_message_bytes;
        self
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    pub fn max_message_bytes(&self) -> u64 {
        self.max_message_bytes
    }

    /// Largest payload (in bytes) that fits in `grid` with this codec's framing.
    pub fn usable_bytes(&self, grid: &PixelGrid) -> u64 {
        let usable = grid
            .capacity_bytes()
            .saturating_sub(self.framing.overhead_bytes());
        match self.framing {
            Framing::LengthPrefixed => usable.min(u64::from(u32::MAX)),
            Framing::Sentinel => usable,
        }
    }

    /// Embed `payload` into the low bits of `grid`.
    ///
    /// Bits past the end of the message and every alpha channel keep their
    /// original values. An empty payload, or one truncated to nothing, is
    /// rejected with the grid untouched: it would not decode.
    pub fn embed(&self, grid: &mut PixelGrid, payload: &[u8]) -> Result<EmbedReport, StegoError> {
        let requested_bytes = payload.len();
        if payload.is_empty() {
            return Err(StegoError::EmptyPayload);
        }

        let usable = self.usable_bytes(grid);
        let capacity_bits = grid.capacity_bits();

        let payload = if requested_bytes as u64 > usable {
            match self.overflow {
                OverflowPolicy::Fail => {
                    return Err(StegoError::CapacityExceeded {
                        required_bits: self.framing.framed_bits(requested_bytes),
                        available_bits: capacity_bits,
                    });
                }
                OverflowPolicy::Truncate => {
                    warn!(
                        "Message truncated: {} of {} bytes fit in a {}x{} image",
                        usable,
                        requested_bytes,
                        grid.width(),
                        grid.height()
                    );
                    &payload[..usable as usize]
                }
            }
        } else {
            payload
        };

        if payload.is_empty() {
            return Err(StegoError::CapacityExceeded {
                required_bits: self.framing.framed_bits(1),
                available_bits: capacity_bits,
            });
        }

        if self.framing == Framing::Sentinel {
            if let Some(offset) = payload.iter().position(|&b| b == SENTINEL) {
                warn!(
                    "Payload contains a zero byte at offset {}; decoding will stop there",
                    offset
                );
            }
        }

        let mut writer = BitWriter::new(grid);
        match self.framing {
            Framing::LengthPrefixed => {
                writer.write_u32(payload.len() as u32)?;
                writer.write_bytes(payload)?;
            }
            Framing::Sentinel => {
                writer.write_bytes(payload)?;
                writer.write_byte(SENTINEL)?;
            }
        }

        let end = writer.cursor();
        debug!(
            "Embedded {} bytes ({} bits, ends at row {} col {})",
            payload.len(),
            writer.position(),
            end.row,
            end.col
        );

        Ok(EmbedReport {
            payload_bytes: payload.len(),
            requested_bytes,
            bits_written: writer.position(),
            capacity_bits,
            end,
            truncated: payload.len() < requested_bytes,
        })
    }

    /// Recover the payload embedded in `grid`.
    pub fn extract(&self, grid: &PixelGrid) -> Result<Vec<u8>, StegoError> {
        Ok(self.extract_with_report(grid)?.payload)
    }

    /// Like [`extract`](Self::extract), also reporting where reading stopped.
    pub fn extract_with_report(&self, grid: &PixelGrid) -> Result<ExtractReport, StegoError> {
        let mut reader = BitReader::new(grid);
        let payload = match self.framing {
            Framing::LengthPrefixed => self.extract_length_prefixed(&mut reader)?,
            Framing::Sentinel => self.extract_sentinel(&mut reader)?,
        };

        let end = reader.cursor();
        debug!(
            "Extracted {} bytes (stopped at row {} col {})",
            payload.len(),
            end.row,
            end.col
        );

        Ok(ExtractReport {
            payload,
            bits_read: reader.position(),
            capacity_bits: grid.capacity_bits(),
            end,
        })
    }

    fn extract_length_prefixed(&self, reader: &mut BitReader<'_>) -> Result<Vec<u8>, StegoError> {
        if reader.remaining() < u64::from(LENGTH_PREFIX_BITS) {
            return Err(StegoError::NoMessageFound);
        }

        let declared = u64::from(reader.read_u32()?);
        if declared == 0 || declared * 8 > reader.remaining() {
            debug!(
                "Declared length {} does not fit the remaining {} bits",
                declared,
                reader.remaining()
            );
            return Err(StegoError::NoMessageFound);
        }

        let length = if declared > self.max_message_bytes {
            warn!(
                "Message of {} bytes exceeds the {} byte limit; output is cut at the limit",
                declared, self.max_message_bytes
            );
            self.max_message_bytes
        } else {
            declared
        };

        if length == 0 {
            return Err(StegoError::NoMessageFound);
        }

        let mut message = Vec::with_capacity(length as usize);
        for _ in 0..length {
            message.push(reader.read_byte()?);
        }

        Ok(message)
    }

    fn extract_sentinel(&self, reader: &mut BitReader<'_>) -> Result<Vec<u8>, StegoError> {
        let mut message = Vec::new();

        while reader.remaining() >= 8 {
            if message.len() as u64 >= self.max_message_bytes {
                warn!(
                    "No terminator within the {} byte limit; output is cut at the limit",
                    self.max_message_bytes
                );
                break;
            }

            let byte = reader.read_byte()?;
            if byte == SENTINEL {
                return if message.is_empty() {
                    Err(StegoError::NoMessageFound)
                } else {
                    Ok(message)
                };
            }
            message.push(byte);
        }

        if message.is_empty() {
            Err(StegoError::NoMessageFound)
        } else if (message.len() as u64) < self.max_message_bytes {
            Err(StegoError::UnterminatedMessage { partial: message })
        } else {
            Ok(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black(width: u32, height: u32) -> PixelGrid {
        PixelGrid::filled(width, height, [0, 0, 0, 255])
    }

    #[test]
    fn test_sentinel_single_letter_scenario() {
        let mut grid = black(8, 1);
        let codec = MessageCodec::new(Framing::Sentinel);

        let report = codec.embed(&mut grid, b"A").unwrap();
        assert_eq!(report.bits_written, 16);
        assert!(!report.truncated);

        assert_eq!(codec.extract(&grid).unwrap(), b"A");
    }

    #[test]
    fn test_length_prefixed_roundtrip_with_zero_bytes() {
        let mut grid = black(32, 32);
        let codec = MessageCodec::default();
        let payload = [0u8, 1, 0, 255, 0, 42];

        codec.embed(&mut grid, &payload).unwrap();
        assert_eq!(codec.extract(&grid).unwrap(), payload);
    }

    #[test]
    fn test_length_prefix_layout() {
        let mut grid = black(16, 1);
        MessageCodec::default().embed(&mut grid, b"hi").unwrap();

        let mut reader = BitReader::new(&grid);
        assert_eq!(reader.read_u32().unwrap(), 2);
        assert_eq!(reader.read_byte().unwrap(), b'h');
        assert_eq!(reader.read_byte().unwrap(), b'i');
    }

    #[test]
    fn test_sentinel_embedded_zero_stops_early() {
        let mut grid = black(16, 16);
        let codec = MessageCodec::new(Framing::Sentinel);

        codec.embed(&mut grid, b"abc\0def").unwrap();
        assert_eq!(codec.extract(&grid).unwrap(), b"abc");
    }

    #[test]
    fn test_capacity_boundary_fail() {
        // 8x4 = 96 bits = 12 bytes; 4 go to the length prefix
        let codec = MessageCodec::default();
        let mut grid = black(8, 4);
        assert_eq!(codec.usable_bytes(&grid), 8);

        codec.embed(&mut grid, &[0xAA; 8]).unwrap();
        assert_eq!(codec.extract(&grid).unwrap(), vec![0xAA; 8]);

        let mut grid = black(8, 4);
        let original = grid.clone();
        let err = codec.embed(&mut grid, &[0xAA; 9]).unwrap_err();
        assert!(matches!(
            err,
            StegoError::CapacityExceeded {
                required_bits: 104,
                available_bits: 96
            }
        ));
        assert_eq!(grid, original);
    }

    #[test]
    fn test_capacity_boundary_truncate() {
        let codec = MessageCodec::new(Framing::Sentinel).with_overflow(OverflowPolicy::Truncate);
        let mut grid = black(8, 4);

        let report = codec.embed(&mut grid, b"0123456789abcdef").unwrap();
        assert!(report.truncated);
        assert_eq!(report.payload_bytes, 11);
        assert_eq!(report.requested_bytes, 16);
        assert_eq!(report.bits_written, 96);

        assert_eq!(codec.extract(&grid).unwrap(), b"0123456789a");
    }

    #[test]
    fn test_empty_payload_rejected() {
        for framing in [Framing::LengthPrefixed, Framing::Sentinel] {
            let mut grid = black(8, 8);
            let original = grid.clone();
            let codec = MessageCodec::new(framing);

            assert!(matches!(
                codec.embed(&mut grid, b""),
                Err(StegoError::EmptyPayload)
            ));
            assert_eq!(grid, original);
        }
    }

    #[test]
    fn test_truncated_to_nothing_rejected() {
        // 11x1 = 33 bits: room for the length prefix and nothing else.
        // 3x1 = 9 bits: room for the terminator and nothing else.
        for (framing, width) in [(Framing::LengthPrefixed, 11), (Framing::Sentinel, 3)] {
            let mut grid = black(width, 1);
            let original = grid.clone();
            let codec = MessageCodec::new(framing).with_overflow(OverflowPolicy::Truncate);

            let err = codec.embed(&mut grid, b"hi").unwrap_err();
            assert!(matches!(err, StegoError::CapacityExceeded { .. }));
            assert_eq!(grid, original);
        }
    }

    #[test]
    fn test_smallest_truncated_embed_decodes() {
        // 8x2 = 48 bits: prefix plus two bytes.
        let codec = MessageCodec::default().with_overflow(OverflowPolicy::Truncate);
        let mut grid = black(8, 2);

        let report = codec.embed(&mut grid, b"hello").unwrap();
        assert_eq!(report.payload_bytes, 2);
        assert_eq!(codec.extract(&grid).unwrap(), b"he");
    }

    #[test]
    fn test_extract_report_position() {
        let mut grid = black(10, 1);
        let codec = MessageCodec::new(Framing::Sentinel);
        codec.embed(&mut grid, b"A").unwrap();

        let report = codec.extract_with_report(&grid).unwrap();
        assert_eq!(report.payload, b"A");
        assert_eq!(report.bits_read, 16);
        assert_eq!(report.capacity_bits, 30);
        assert_eq!(report.end, BitCursor { row: 0, col: 5, channel: 1 });
    }

    #[test]
    fn test_extract_report_at_ceiling() {
        let mut grid = black(32, 32);
        MessageCodec::default()
            .embed(&mut grid, b"a long hidden message")
            .unwrap();

        let capped = MessageCodec::default().with_max_message_bytes(6);
        let report = capped.extract_with_report(&grid).unwrap();
        assert_eq!(report.payload, b"a long");
        assert_eq!(report.bits_read, 32 + 6 * 8);

        // No terminator is read when the limit stops a sentinel decode.
        let grid = PixelGrid::filled(8, 2, [1, 1, 1, 255]);
        let capped = MessageCodec::new(Framing::Sentinel).with_max_message_bytes(4);
        let report = capped.extract_with_report(&grid).unwrap();
        assert_eq!(report.bits_read, 32);
        // Bit 32 is pixel 10: row 1, col 2, channel 2.
        assert_eq!(report.end, BitCursor { row: 1, col: 2, channel: 2 });
    }

    #[test]
    fn test_alpha_preserved() {
        let mut grid = PixelGrid::filled(10, 10, [200, 100, 50, 13]);
        MessageCodec::default()
            .embed(&mut grid, b"alpha stays put")
            .unwrap();

        for row in 0..10 {
            for col in 0..10 {
                assert_eq!(grid.pixel(col, row)[3], 13);
            }
        }
    }

    #[test]
    fn test_untouched_bits_keep_values() {
        let mut grid = PixelGrid::filled(10, 1, [255, 255, 255, 255]);
        let report = MessageCodec::new(Framing::Sentinel)
            .embed(&mut grid, b"\xff")
            .unwrap();

        assert_eq!(report.end, BitCursor { row: 0, col: 5, channel: 1 });
        // Bit 16 onwards was never written.
        assert_eq!(grid.pixel(5, 0), [254, 255, 255, 255]);
        assert_eq!(grid.pixel(9, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_no_message_in_blank_grid() {
        let grid = black(8, 8);
        assert!(matches!(
            MessageCodec::default().extract(&grid),
            Err(StegoError::NoMessageFound)
        ));
        assert!(matches!(
            MessageCodec::new(Framing::Sentinel).extract(&grid),
            Err(StegoError::NoMessageFound)
        ));
    }

    #[test]
    fn test_grid_too_small_for_anything() {
        let grid = black(2, 1);
        assert!(matches!(
            MessageCodec::default().extract(&grid),
            Err(StegoError::NoMessageFound)
        ));
        assert!(matches!(
            MessageCodec::new(Framing::Sentinel).extract(&grid),
            Err(StegoError::NoMessageFound)
        ));
    }

    #[test]
    fn test_unterminated_message() {
        // Every low bit set: each byte reads as 0xFF, never a terminator.
        let grid = PixelGrid::filled(8, 2, [1, 1, 1, 255]);
        match MessageCodec::new(Framing::Sentinel).extract(&grid) {
            Err(StegoError::UnterminatedMessage { partial }) => {
                assert_eq!(partial, vec![0xFF; 6]);
            }
            other => panic!("expected UnterminatedMessage, got {:?}", other),
        }
    }

    #[test]
    fn test_ceiling_stops_decoding() {
        let mut grid = black(32, 32);
        MessageCodec::default()
            .embed(&mut grid, b"a long hidden message")
            .unwrap();

        let capped = MessageCodec::default().with_max_message_bytes(6);
        assert_eq!(capped.extract(&grid).unwrap(), b"a long");

        let grid = PixelGrid::filled(8, 2, [1, 1, 1, 255]);
        let capped = MessageCodec::new(Framing::Sentinel).with_max_message_bytes(4);
        assert_eq!(capped.extract(&grid).unwrap(), vec![0xFF; 4]);
    }

    #[test]
    fn test_redecode_is_idempotent() {
        let mut grid = PixelGrid::filled(20, 20, [90, 91, 92, 93]);
        let codec = MessageCodec::default();
        codec.embed(&mut grid, b"same every time").unwrap();

        let first = codec.extract(&grid).unwrap();
        let second = codec.extract(&grid).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_framing_config_names() {
        let framing: Framing = serde_json::from_str("\"length-prefixed\"").unwrap();
        assert_eq!(framing, Framing::LengthPrefixed);
        let overflow: OverflowPolicy = serde_json::from_str("\"truncate\"").unwrap();
        assert_eq!(overflow, OverflowPolicy::Truncate);

        use clap::ValueEnum;
        assert_eq!(OverflowPolicy::from_str("fail", false), Ok(OverflowPolicy::Fail));
        assert_eq!(Framing::from_str("sentinel", false), Ok(Framing::Sentinel));
    }
}
