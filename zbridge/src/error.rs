use std::io;

use zbridge_sys as sys;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The shim returned a nonzero zlib code.
    #[error("zlib compression failed: {code} ({name})")]
    Compression { code: i32, name: &'static str },

    #[error("foreign length {length} does not fit in a host buffer")]
    IntegerOverflow { length: u64 },

    #[error("payload contains a NUL byte at offset {position}; the shim takes NUL-terminated input")]
    InteriorNul { position: usize },

    #[error("foreign allocation of {size} bytes failed")]
    AllocationFailed { size: usize },

    #[error("shim reported success with a null buffer of length {length}")]
    NullOutput { length: usize },

    #[error("zlib decompression failed: {0}")]
    Decompression(#[source] io::Error),

    #[error(
        "round-trip mismatch: expected {expected_len} bytes, got {actual_len}{}",
        difference_suffix(.first_difference)
    )]
    VerificationMismatch {
        expected_len: usize,
        actual_len: usize,
        first_difference: Option<usize>,
    },
}

/// Which side of the round trip an [`Error`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Compression,
    Decompression,
    Mismatch,
}

impl ErrorKind {
    /// Process exit status for a failure of this kind; success is 0.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Compression => 2,
            ErrorKind::Decompression => 3,
            ErrorKind::Mismatch => 4,
        }
    }
}

impl Error {
    pub(crate) fn compression(code: i32) -> Self {
        Error::Compression {
            code,
            name: describe_zlib_code(code),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Compression { .. }
            | Error::IntegerOverflow { .. }
            | Error::InteriorNul { .. }
            | Error::AllocationFailed { .. }
            | Error::NullOutput { .. } => ErrorKind::Compression,
            Error::Decompression(_) => ErrorKind::Decompression,
            Error::VerificationMismatch { .. } => ErrorKind::Mismatch,
        }
    }

    /// The zlib return code, for errors reported by the shim.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Compression { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn difference_suffix(first_difference: &Option<usize>) -> String {
    match first_difference {
        Some(offset) => format!(", first difference at offset {offset}"),
        None => String::new(),
    }
}

/// Name of a zlib return code.
pub fn describe_zlib_code(code: i32) -> &'static str {
    match code {
        sys::Z_OK => "Z_OK",
        sys::Z_ERRNO => "Z_ERRNO",
        sys::Z_STREAM_ERROR => "Z_STREAM_ERROR",
        sys::Z_DATA_ERROR => "Z_DATA_ERROR",
        sys::Z_MEM_ERROR => "Z_MEM_ERROR",
        sys::Z_BUF_ERROR => "Z_BUF_ERROR",
        sys::Z_VERSION_ERROR => "Z_VERSION_ERROR",
        _ => "unknown zlib error",
    }
}
