use log::{debug, warn};
use zbridge_sys as sys;

use crate::foreign::{ForeignBuffer, ForeignCompressor, NativeCompressor};
use crate::Error;

/// Compress `payload` with the native zlib shim.
///
/// The result is a zlib stream (RFC 1950). `payload` must not contain NUL
/// bytes, since the shim takes a NUL-terminated buffer.
pub fn compress(payload: &[u8]) -> Result<Vec<u8>, Error> {
    compress_with(&NativeCompressor, payload)
}

/// Compress `payload` through any [`ForeignCompressor`].
///
/// Every foreign allocation made on behalf of the call (the encoded input and
/// the compressed output) is released exactly once before this returns, on
/// success and on every error path.
pub fn compress_with<F>(foreign: &F, payload: &[u8]) -> Result<Vec<u8>, Error>
where
    F: ForeignCompressor + ?Sized,
{
    let input = ForeignBuffer::c_string(foreign, payload)?;
    let result = unsafe { foreign.compress(input.as_c_ptr()) };
    drop(input);

    // Only lengths a slice can describe; anything else is never read.
    let length = usize::try_from(result.length)
        .ok()
        .filter(|&n| n <= isize::MAX as usize);

    // Owned from here on, so every exit below releases it.
    let output = unsafe { ForeignBuffer::adopt(foreign, result.output, length.unwrap_or(0)) };

    if sys::result_is_error(&result) {
        if output.is_some() {
            warn!(
                "shim returned a buffer alongside error code {}; releasing it",
                result.error_code
            );
        }
        debug!("compression of {} bytes failed with code {}", payload.len(), result.error_code);
        return Err(Error::compression(result.error_code));
    }

    let length = length.ok_or(Error::IntegerOverflow {
        length: result.length,
    })?;

    let compressed = match output {
        Some(buf) => buf.as_bytes().to_vec(),
        None if length == 0 => Vec::new(),
        None => return Err(Error::NullOutput { length }),
    };

    debug!("compressed {} bytes into {}", payload.len(), compressed.len());
    Ok(compressed)
}
