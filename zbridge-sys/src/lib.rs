#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals, clippy::all)]

pub use libc;

// Also pulls zlib into the link line for the shim's `compress`/`compressBound`.
pub use libz_sys::{
    Z_BUF_ERROR, Z_DATA_ERROR, Z_ERRNO, Z_MEM_ERROR, Z_OK, Z_STREAM_ERROR, Z_VERSION_ERROR,
};

#[cfg(feature = "bindgen")]
include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

#[cfg(not(feature = "bindgen"))]
mod bindings;
#[cfg(not(feature = "bindgen"))]
pub use bindings::*;

#[inline]
pub fn result_is_error(r: &compress_result) -> bool { r.error_code != Z_OK }
