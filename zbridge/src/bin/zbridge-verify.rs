//! Compress a fixed sample through the native shim, decompress it with
//! flate2 and check the bytes match.

use std::process::ExitCode;

use log::error;
use zbridge::verify::{self, SAMPLE_INPUT};
use zbridge::ErrorKind;

fn failure_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Compression => "compression failed",
        ErrorKind::Decompression => "decompression failed",
        ErrorKind::Mismatch => "content mismatch",
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match verify::round_trip(SAMPLE_INPUT.as_bytes()) {
        Ok(report) => {
            println!(
                "compressed and decompressed strings are identical ({} -> {} bytes)",
                report.original_len, report.compressed_len
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}: {e}", failure_label(e.kind()));
            ExitCode::from(e.kind().exit_code())
        }
    }
}
