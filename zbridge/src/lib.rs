//! # zbridge
//!
//! A safe bridge over a small C compression shim. The shim takes a
//! NUL-terminated buffer, compresses it with zlib and hands back a
//! heap-allocated result; this crate marshals bytes in and out of that call
//! and makes sure every foreign allocation is released exactly once.
//!
//! ## Quick Start
//!
//! ```
//! use zbridge::{compress, verify::decompress};
//!
//! let data = b"You talkin' to me?";
//! let compressed = compress(data)?;
//! let decompressed = decompress(&compressed)?;
//! assert_eq!(data.as_slice(), decompressed.as_slice());
//! # Ok::<(), zbridge::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! verify::round_trip        (flate2 decompresses, compares)
//!        ↓
//! compress / compress_with  (marshalling, error and length checks)
//!        ↓
//! ForeignCompressor         (NativeCompressor, or a test double)
//!        ↓
//! zbridge_compress          (C shim over zlib, via zbridge-sys)
//! ```
//!
//! ## Safety
//!
//! - Foreign memory is held in [`ForeignBuffer`], which releases it in `Drop`
//! - The reported output length is range-checked before any slice is built
//! - Foreign failures come back as [`Error`] values, never panics
//!
//! ## Limitations
//!
//! The shim's contract is a NUL-terminated buffer, so payloads containing a
//! zero byte are rejected with [`Error::InteriorNul`] rather than truncated.

mod bridge;
mod error;
pub mod foreign;
pub mod verify;

#[cfg(test)]
mod testing;

pub use bridge::{compress, compress_with};
pub use error::{describe_zlib_code, Error, ErrorKind};
pub use foreign::{ForeignBuffer, ForeignCompressor, NativeCompressor};
