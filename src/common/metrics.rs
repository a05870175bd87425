use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::processing::codec::{EmbedReport, ExtractReport, Framing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encode,
    Decode,
}

/// Summary of one encode or decode run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub operation: Operation,
    pub input: PathBuf,
    pub output: PathBuf,
    pub framing: Framing,
    pub payload_bytes: usize,
    pub requested_bytes: usize,
    pub bits_used: u64,
    pub capacity_bits: u64,
    pub end_row: u32,
    pub end_col: u32,
    pub truncated: bool,
    pub started_at: String, // RFC 3339, local time
    pub elapsed_ms: u64,
}

/// Wall-clock timer for a single run.
#[derive(Debug)]
pub struct RunMetrics {
    operation: Operation,
    started_at: DateTime<Local>,
    start: Instant,
}

impl RunMetrics {
    pub fn start(operation: Operation) -> Self {
        Self {
            operation,
            started_at: Local::now(),
            start: Instant::now(),
        }
    }

    pub fn finish_encode(
        self,
        input: &Path,
        output: &Path,
        framing: Framing,
        embed: &EmbedReport,
    ) -> RunReport {
        RunReport {
            operation: self.operation,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            framing,
            payload_bytes: embed.payload_bytes,
            requested_bytes: embed.requested_bytes,
            bits_used: embed.bits_written,
            capacity_bits: embed.capacity_bits,
            end_row: embed.end.row,
            end_col: embed.end.col,
            truncated: embed.truncated,
            started_at: self.started_at.to_rfc3339(),
            elapsed_ms: self.start.elapsed().as_millis() as u64,
        }
    }

    pub fn finish_decode(
        self,
        input: &Path,
        output: &Path,
        framing: Framing,
        decoded: &ExtractReport,
    ) -> RunReport {
        let payload_bytes = decoded.payload.len();
        RunReport {
            operation: self.operation,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            framing,
            payload_bytes,
            requested_bytes: payload_bytes,
            bits_used: decoded.bits_read,
            capacity_bits: decoded.capacity_bits,
            end_row: decoded.end.row,
            end_col: decoded.end.col,
            truncated: false,
            started_at: self.started_at.to_rfc3339(),
            elapsed_ms: self.start.elapsed().as_millis() as u64,
        }
    }
}

impl RunReport {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms as f64 / 1000.0
    }

    pub fn log_summary(&self) {
        info!("MESSAGE LEN: {}", self.payload_bytes);
        info!("BIT COUNT: {} of {}", self.bits_used, self.capacity_bits);
        info!("H: {}  W: {}", self.end_row, self.end_col);
    }

    pub fn export_to_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::grid::BitCursor;

    fn embed_report() -> EmbedReport {
        EmbedReport {
            payload_bytes: 5,
            requested_bytes: 8,
            bits_written: 72,
            capacity_bits: 72,
            end: BitCursor { row: 2, col: 4, channel: 0 },
            truncated: true,
        }
    }

    #[test]
    fn test_encode_report() {
        let report = RunMetrics::start(Operation::Encode).finish_encode(
            Path::new("in.png"),
            Path::new("in_out.png"),
            Framing::LengthPrefixed,
            &embed_report(),
        );

        assert_eq!(report.operation, Operation::Encode);
        assert_eq!(report.payload_bytes, 5);
        assert_eq!(report.requested_bytes, 8);
        assert_eq!((report.end_row, report.end_col), (2, 4));
        assert!(report.truncated);
    }

    #[test]
    fn test_decode_report_bits() {
        let report = RunMetrics::start(Operation::Decode).finish_decode(
            Path::new("in_out.png"),
            Path::new("in_out.png_decoded.txt"),
            Framing::Sentinel,
            &ExtractReport {
                payload: b"A".to_vec(),
                bits_read: 16,
                capacity_bits: 24,
                end: BitCursor { row: 0, col: 5, channel: 1 },
            },
        );

        assert_eq!(report.payload_bytes, 1);
        assert_eq!(report.bits_used, 16);
        assert_eq!((report.end_row, report.end_col), (0, 5));
        assert!(!report.truncated);
    }

    #[test]
    fn test_export_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let report = RunMetrics::start(Operation::Encode).finish_encode(
            Path::new("in.png"),
            Path::new("in_out.png"),
            Framing::Sentinel,
            &embed_report(),
        );
        report.export_to_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["operation"], "encode");
        assert_eq!(value["framing"], "sentinel");
        assert_eq!(value["bits_used"], 72);
        assert_eq!(value["truncated"], true);
    }
}
