//! The foreign side of the bridge: the shim's calling surface and an owning
//! wrapper for memory the shim's allocator hands out.

use std::fmt;
use std::os::raw::c_char;
use std::ptr::NonNull;

use log::trace;
use zbridge_sys as sys;

use crate::Error;

/// Calling surface of the native compressor.
///
/// [`NativeCompressor`] forwards to the C shim. Tests substitute an
/// implementation that counts allocations and releases.
///
/// # Safety
///
/// Safe code in this crate writes through and reads from the pointers an
/// implementation hands back, so implementors must guarantee that:
///
/// - [`allocate`](Self::allocate) returns null or a pointer writable for at
///   least `len` bytes, which [`release`](Self::release) accepts;
/// - [`compress`](Self::compress), when it reports success, returns an
///   `output` that is either null with `length == 0` or valid for `length`
///   reads and accepted by [`release`](Self::release); on failure `output`
///   is null or accepted by [`release`](Self::release).
///
/// Implementors take these on with `unsafe impl`:
///
/// ```
/// use std::os::raw::c_char;
/// use zbridge::ForeignCompressor;
///
/// struct Refusing;
///
/// unsafe impl ForeignCompressor for Refusing {
///     fn allocate(&self, _len: usize) -> *mut u8 {
///         std::ptr::null_mut()
///     }
///
///     unsafe fn release(&self, _ptr: *mut u8) {}
///
///     unsafe fn compress(&self, _input: *const c_char) -> zbridge_sys::compress_result {
///         zbridge_sys::compress_result::default()
///     }
/// }
///
/// let err = zbridge::compress_with(&Refusing, b"hello").unwrap_err();
/// assert!(matches!(err, zbridge::Error::AllocationFailed { size: 6 }));
/// ```
///
/// and a plain `impl` is rejected:
///
/// ```compile_fail
/// use std::os::raw::c_char;
/// use zbridge::ForeignCompressor;
///
/// struct Bogus;
///
/// impl ForeignCompressor for Bogus {
///     fn allocate(&self, _len: usize) -> *mut u8 {
///         16 as *mut u8
///     }
///
///     unsafe fn release(&self, _ptr: *mut u8) {}
///
///     unsafe fn compress(&self, _input: *const c_char) -> zbridge_sys::compress_result {
///         zbridge_sys::compress_result::default()
///     }
/// }
/// ```
pub unsafe trait ForeignCompressor {
    /// Allocate `len` bytes with the foreign allocator. Returns null on failure.
    fn allocate(&self, len: usize) -> *mut u8;

    /// Release memory obtained from [`allocate`](Self::allocate) or returned
    /// in a [`compress`](Self::compress) result.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, come from this compressor, and not have been
    /// released already.
    unsafe fn release(&self, ptr: *mut u8);

    /// Compress a NUL-terminated buffer.
    ///
    /// # Safety
    ///
    /// `input` must point to a NUL-terminated buffer that stays valid for the
    /// duration of the call.
    unsafe fn compress(&self, input: *const c_char) -> sys::compress_result;
}

/// The C shim compiled by `zbridge-sys`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCompressor;

// The shim pairs zbridge_malloc/zbridge_free and returns NULL output on every failure.
unsafe impl ForeignCompressor for NativeCompressor {
    fn allocate(&self, len: usize) -> *mut u8 {
        unsafe { sys::zbridge_malloc(len) as *mut u8 }
    }

    unsafe fn release(&self, ptr: *mut u8) {
        sys::zbridge_free(ptr as *mut _)
    }

    unsafe fn compress(&self, input: *const c_char) -> sys::compress_result {
        sys::zbridge_compress(input)
    }
}

/// An owned foreign allocation, released through its compressor on drop.
///
/// This is the only place foreign memory is released, so every buffer is
/// freed exactly once regardless of how the owning scope exits. The raw
/// pointer keeps it `!Send` and `!Sync`.
pub struct ForeignBuffer<'f, F: ForeignCompressor + ?Sized> {
    foreign: &'f F,
    ptr: NonNull<u8>,
    len: usize,
}

impl<'f, F: ForeignCompressor + ?Sized> ForeignBuffer<'f, F> {
    /// Copy `payload` into a fresh foreign allocation and NUL-terminate it.
    pub fn c_string(foreign: &'f F, payload: &[u8]) -> Result<Self, Error> {
        if let Some(position) = payload.iter().position(|&b| b == 0) {
            return Err(Error::InteriorNul { position });
        }
        let size = payload
            .len()
            .checked_add(1)
            .ok_or(Error::AllocationFailed { size: usize::MAX })?;
        let ptr = NonNull::new(foreign.allocate(size)).ok_or(Error::AllocationFailed { size })?;
        trace!("allocated {size} byte foreign input buffer at {ptr:p}");

        unsafe {
            std::ptr::copy_nonoverlapping(payload.as_ptr(), ptr.as_ptr(), payload.len());
            ptr.as_ptr().add(payload.len()).write(0);
        }

        Ok(ForeignBuffer {
            foreign,
            ptr,
            len: payload.len(),
        })
    }

    /// Take ownership of a pointer produced by `foreign`. Returns `None` for
    /// null, in which case there is nothing to release.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must come from `foreign`, must not be owned by
    /// anything else, and must be valid for reads of `len` bytes if
    /// [`as_bytes`](Self::as_bytes) is ever called.
    pub unsafe fn adopt(foreign: &'f F, ptr: *mut u8, len: usize) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        trace!("adopted foreign buffer at {ptr:p} ({len} bytes)");
        Some(ForeignBuffer { foreign, ptr, len })
    }

    /// Pointer to the first byte, for passing to the shim.
    pub fn as_c_ptr(&self) -> *const c_char {
        self.ptr.as_ptr() as *const c_char
    }

    /// Number of valid bytes, excluding any terminator.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes, excluding any terminator.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<F: ForeignCompressor + ?Sized> Drop for ForeignBuffer<'_, F> {
    fn drop(&mut self) {
        trace!("releasing foreign buffer at {:p}", self.ptr);
        unsafe { self.foreign.release(self.ptr.as_ptr()) }
    }
}

impl<F: ForeignCompressor + ?Sized> fmt::Debug for ForeignBuffer<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}
