//! # Pixel Bitstream
//!
//! Sequential bit-level access to the low bits of a [`PixelGrid`].
//!
//! Bits are laid out row by row, pixel by pixel, and R → G → B within a
//! pixel. The alpha channel is never read or written. Multi-bit values are
//! written MSB first.
//!
//! [`BitWriter`] borrows the grid mutably for the duration of an embed,
//! [`BitReader`] borrows it immutably for an extract.

use super::error::StegoError;
use super::grid::{BitCursor, PixelGrid};

/// Sequential bit writer over a grid's RGB low bits.
#[derive(Debug)]
pub struct BitWriter<'a> {
    grid: &'a mut PixelGrid,
    capacity: u64,
    pos: u64,
}

impl<'a> BitWriter<'a> {
    pub fn new(grid: &'a mut PixelGrid) -> Self {
        let capacity = grid.capacity_bits();
        Self {
            grid,
            capacity,
            pos: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.capacity - self.pos
    }

    /// Cursor of the next bit to be written.
    pub fn cursor(&self) -> BitCursor {
        BitCursor::at(self.pos, self.grid.width())
    }

    /// Move to an absolute bit index. `pos == capacity` is allowed (end of stream).
    pub fn seek(&mut self, pos: u64) -> Result<(), StegoError> {
        if pos > self.capacity {
            return Err(self.overflow(pos));
        }
        self.pos = pos;
        Ok(())
    }

    /// Replace the low bit of the current channel with `bit` and advance.
    #[inline]
    pub fn write_bit(&mut self, bit: u8) -> Result<(), StegoError> {
        if self.pos >= self.capacity {
            return Err(self.overflow(self.pos + 1));
        }

        let channel = self.grid.channel_mut(BitCursor::at(self.pos, self.grid.width()));
        *channel = (*channel & 0xFE) | (bit & 1);
        self.pos += 1;

        Ok(())
    }

    /// Write the low `count` bits of `value`, MSB first.
    ///
    /// Nothing is written unless all `count` bits fit.
    pub fn write_bits(&mut self, value: u64, count: u32) -> Result<(), StegoError> {
        debug_assert!(count <= 64);
        if self.remaining() < u64::from(count) {
            return Err(self.overflow(self.pos + u64::from(count)));
        }

        for shift in (0..count).rev() {
            self.write_bit(((value >> shift) & 1) as u8)?;
        }

        Ok(())
    }

    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> Result<(), StegoError> {
        self.write_bits(u64::from(byte), 8)
    }

    /// Big-endian, MSB first.
    pub fn write_u32(&mut self, value: u32) -> Result<(), StegoError> {
        self.write_bits(u64::from(value), 32)
    }

    /// Write every byte of `bytes`, or nothing if they do not all fit.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), StegoError> {
        let needed = bytes.len() as u64 * 8;
        if self.remaining() < needed {
            return Err(self.overflow(self.pos + needed));
        }

        for &byte in bytes {
            self.write_byte(byte)?;
        }

        Ok(())
    }

    fn overflow(&self, required_bits: u64) -> StegoError {
        StegoError::CapacityExceeded {
            required_bits,
            available_bits: self.capacity,
        }
    }
}

/// Sequential bit reader over a grid's RGB low bits.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    grid: &'a PixelGrid,
    capacity: u64,
    pos: u64,
}

impl<'a> BitReader<'a> {
    pub fn new(grid: &'a PixelGrid) -> Self {
        Self {
            grid,
            capacity: grid.capacity_bits(),
            pos: 0,
        }
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.capacity - self.pos
    }

    #[inline]
    pub fn has_bits(&self) -> bool {
        self.pos < self.capacity
    }

    pub fn cursor(&self) -> BitCursor {
        BitCursor::at(self.pos, self.grid.width())
    }

    pub fn seek(&mut self, pos: u64) -> Result<(), StegoError> {
        if pos > self.capacity {
            return Err(self.overflow(pos));
        }
        self.pos = pos;
        Ok(())
    }

    /// Low bit of the current channel. Advances by one.
    #[inline]
    pub fn read_bit(&mut self) -> Result<u8, StegoError> {
        if self.pos >= self.capacity {
            return Err(self.overflow(self.pos + 1));
        }

        let bit = self.grid.channel(BitCursor::at(self.pos, self.grid.width())) & 1;
        self.pos += 1;

        Ok(bit)
    }

    /// Read `count` bits (1-64), MSB first, right-justified in the result.
    pub fn read_bits(&mut self, count: u32) -> Result<u64, StegoError> {
        debug_assert!(count <= 64);
        if self.remaining() < u64::from(count) {
            return Err(self.overflow(self.pos + u64::from(count)));
        }

        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | u64::from(self.read_bit()?);
        }

        Ok(value)
    }

    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, StegoError> {
        Ok(self.read_bits(8)? as u8)
    }

    pub fn read_u32(&mut self) -> Result<u32, StegoError> {
        Ok(self.read_bits(32)? as u32)
    }

    fn overflow(&self, required_bits: u64) -> StegoError {
        StegoError::CapacityExceeded {
            required_bits,
            available_bits: self.capacity,
        }
    }
}
