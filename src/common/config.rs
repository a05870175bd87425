//! # Configuration
//!
//! TOML configuration for the codec and for output file naming. Every field
//! has a default, so an empty file (or no file at all) is a valid config.
//!
//! ```toml
//! [codec]
//! framing = "length-prefixed"   # or "sentinel"
//! overflow = "fail"             # or "truncate"
//! max_message_bytes = 1000000000
//!
//! [output]
//! encoded_suffix = "_out.png"
//! decoded_suffix = "_decoded.txt"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::processing::codec::{Framing, MessageCodec, OverflowPolicy, DEFAULT_MAX_MESSAGE_BYTES};

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: StegoConfig = load_config("config/default.toml")?;
/// ```
pub fn load_config<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    pub codec: CodecConfig,
    pub output: OutputConfig,
}

/// Framing and capacity settings for [`MessageCodec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub framing: Framing,
    /// What to do when the message does not fit in the image
    pub overflow: OverflowPolicy,
    /// Decoding stops after this many bytes
    pub max_message_bytes: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            overflow: OverflowPolicy::default(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl CodecConfig {
    pub fn build(&self) -> MessageCodec {
        MessageCodec::new(self.framing)
            .with_overflow(self.overflow)
            .with_max_message_bytes(self.max_message_bytes)
    }
}

/// Naming of the files written next to the input image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Replaces the input's extension: `cover.png` -> `cover_out.png`
    pub encoded_suffix: String,
    /// Appended to the full input name: `cover_out.png` -> `cover_out.png_decoded.txt`
    pub decoded_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            encoded_suffix: "_out.png".to_string(),
            decoded_suffix: "_decoded.txt".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn encoded_path(&self, input: &Path) -> PathBuf {
        let mut name = input
            .file_stem()
            .map(OsString::from)
            .unwrap_or_else(|| input.as_os_str().to_os_string());
        name.push(&self.encoded_suffix);
        input.with_file_name(name)
    }

    pub fn decoded_path(&self, input: &Path) -> PathBuf {
        let mut name = input.as_os_str().to_os_string();
        name.push(&self.decoded_suffix);
        PathBuf::from(name)
    }
}
