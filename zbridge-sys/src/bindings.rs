//! Declarations for `csrc/compressor.h`, kept in sync with what the `bindgen`
//! feature generates.

use libc::{c_char, c_int, c_void, size_t};

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct compress_result {
    pub output: *mut u8,
    pub length: u64,
    pub error_code: c_int,
}

impl Default for compress_result {
    fn default() -> Self {
        compress_result {
            output: std::ptr::null_mut(),
            length: 0,
            error_code: 0,
        }
    }
}

extern "C" {
    pub fn zbridge_compress(input: *const c_char) -> compress_result;
    pub fn zbridge_malloc(size: size_t) -> *mut c_void;
    pub fn zbridge_free(ptr: *mut c_void);
}
