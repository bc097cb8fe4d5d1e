//! Round-trip self-check: compress through the shim, decompress with an
//! independent zlib implementation, compare.

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::{debug, info};

use crate::bridge::compress_with;
use crate::foreign::{ForeignCompressor, NativeCompressor};
use crate::Error;

/// Fixed payload the `zbridge-verify` binary checks.
pub const SAMPLE_INPUT: &str =
    "You talkin' to me? You talkin' to me? Well I don't see anyone else here...";

/// Where a [`Verifier`] is in `Start -> Compressed -> Decompressed -> Verified | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Compressed,
    Decompressed,
    Verified,
    Failed,
}

/// Sizes from a verified round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub original_len: usize,
    pub compressed_len: usize,
}

/// One-shot verifier. Any error moves it to [`Stage::Failed`]; there is no retry.
pub struct Verifier<'f, F: ForeignCompressor + ?Sized> {
    foreign: &'f F,
    stage: Stage,
}

impl<'f, F: ForeignCompressor + ?Sized> Verifier<'f, F> {
    /// A verifier in [`Stage::Start`] that compresses through `foreign`.
    pub fn new(foreign: &'f F) -> Self {
        Verifier {
            foreign,
            stage: Stage::Start,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Compress, decompress and compare `payload`, stopping at the first error.
    pub fn run(&mut self, payload: &[u8]) -> Result<Report, Error> {
        let outcome = self.steps(payload);
        if outcome.is_err() {
            self.stage = Stage::Failed;
        }
        outcome
    }

    fn steps(&mut self, payload: &[u8]) -> Result<Report, Error> {
        let compressed = compress_with(self.foreign, payload)?;
        self.advance(Stage::Compressed);

        let decompressed = decompress(&compressed)?;
        self.advance(Stage::Decompressed);

        if decompressed != payload {
            return Err(Error::VerificationMismatch {
                expected_len: payload.len(),
                actual_len: decompressed.len(),
                first_difference: first_difference(payload, &decompressed),
            });
        }
        self.advance(Stage::Verified);

        Ok(Report {
            original_len: payload.len(),
            compressed_len: compressed.len(),
        })
    }

    fn advance(&mut self, next: Stage) {
        debug!("verifier {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }
}

/// Run the full round trip against the native shim.
pub fn round_trip(payload: &[u8]) -> Result<Report, Error> {
    let report = Verifier::new(&NativeCompressor).run(payload)?;
    info!(
        "round trip verified: {} bytes compressed to {}",
        report.original_len, report.compressed_len
    );
    Ok(report)
}

/// Inflate a zlib stream with flate2.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut out)
        .map_err(Error::Decompression)?;
    Ok(out)
}

fn first_difference(expected: &[u8], actual: &[u8]) -> Option<usize> {
    expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))
}
