pub mod common;
pub mod processing;

pub use processing::{Framing, MessageCodec, OverflowPolicy, PixelGrid, StegoError};
