//! A [`ForeignCompressor`] double that tracks every allocation it hands out.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::ffi::CStr;
use std::io::Write;
use std::os::raw::c_char;

use flate2::{write::ZlibEncoder, Compression};
use zbridge_sys::{self as sys, libc};

use crate::foreign::ForeignCompressor;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    /// Compress with flate2 into a foreign allocation.
    Deflate,
    /// Report `code`; optionally hand back a buffer the caller must still release.
    Fail { code: i32, leave_buffer: bool },
    /// Report success with a two-byte buffer that is not a zlib stream, claiming `length`.
    ReportLength(u64),
    /// Report success with a null buffer and this `length`.
    NullOutput(u64),
}

pub(crate) struct CountingCompressor {
    behavior: Behavior,
    refuse_allocations: bool,
    allocations: Cell<usize>,
    releases: Cell<usize>,
    live: RefCell<HashSet<usize>>,
}

impl CountingCompressor {
    pub(crate) fn new(behavior: Behavior) -> Self {
        CountingCompressor {
            behavior,
            refuse_allocations: false,
            allocations: Cell::new(0),
            releases: Cell::new(0),
            live: RefCell::new(HashSet::new()),
        }
    }

    pub(crate) fn deflate() -> Self {
        Self::new(Behavior::Deflate)
    }

    pub(crate) fn refuse_allocations(mut self) -> Self {
        self.refuse_allocations = true;
        self
    }

    pub(crate) fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.get()
    }

    pub(crate) fn live(&self) -> usize {
        self.live.borrow().len()
    }

    fn output(&self, bytes: &[u8]) -> *mut u8 {
        let ptr = self.allocate(bytes.len().max(1));
        assert!(!ptr.is_null(), "test allocation failed");
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len()) };
        ptr
    }
}

unsafe impl ForeignCompressor for CountingCompressor {
    fn allocate(&self, len: usize) -> *mut u8 {
        if self.refuse_allocations {
            return std::ptr::null_mut();
        }
        let ptr = unsafe { libc::malloc(len) as *mut u8 };
        if !ptr.is_null() {
            self.allocations.set(self.allocations.get() + 1);
            self.live.borrow_mut().insert(ptr as usize);
        }
        ptr
    }

    unsafe fn release(&self, ptr: *mut u8) {
        assert!(!ptr.is_null(), "release of a null pointer");
        assert!(
            self.live.borrow_mut().remove(&(ptr as usize)),
            "release of {ptr:p}, which is not a live allocation (double free?)"
        );
        self.releases.set(self.releases.get() + 1);
        libc::free(ptr as *mut _);
    }

    unsafe fn compress(&self, input: *const c_char) -> sys::compress_result {
        assert!(
            self.live.borrow().contains(&(input as usize)),
            "input buffer was released before the call"
        );
        let input = CStr::from_ptr(input).to_bytes();

        match self.behavior {
            Behavior::Deflate => {
                let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
                enc.write_all(input).expect("deflate write");
                let compressed = enc.finish().expect("deflate finish");
                sys::compress_result {
                    output: self.output(&compressed),
                    length: compressed.len() as u64,
                    error_code: sys::Z_OK,
                }
            }
            Behavior::Fail { code, leave_buffer } => sys::compress_result {
                output: if leave_buffer {
                    self.output(b"partial")
                } else {
                    std::ptr::null_mut()
                },
                length: 0,
                error_code: code,
            },
            Behavior::ReportLength(length) => {
                assert!(
                    length <= 2 || length > isize::MAX as u64,
                    "ReportLength({length}) would read past the two-byte buffer"
                );
                sys::compress_result {
                    output: self.output(b"\xff\xff"),
                    length,
                    error_code: sys::Z_OK,
                }
            }
            Behavior::NullOutput(length) => sys::compress_result {
                output: std::ptr::null_mut(),
                length,
                error_code: sys::Z_OK,
            },
        }
    }
}
