use std::{env, path::PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let csrc = manifest_dir.join("csrc");
    assert!(csrc.join("compressor.h").exists(), "csrc/compressor.h missing");

    // libz-sys builds zlib from source with the `static` feature and exports its headers here
    let zlib_include = env::var_os("DEP_Z_INCLUDE").map(PathBuf::from);

    let mut cc_build = cc::Build::new();
    cc_build.file(csrc.join("compressor.c"));
    cc_build.include(&csrc);
    if let Some(dir) = &zlib_include {
        cc_build.include(dir);
    }
    cc_build.flag_if_supported("-Wno-unused-parameter");
    cc_build.flag_if_supported("-Wno-unused-function");
    cc_build.compile("zbridge_compressor");

    #[cfg(feature = "bindgen")]
    generate_bindings(&csrc);

    // Rerun hints
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", csrc.join("compressor.c").display());
    println!("cargo:rerun-if-changed={}", csrc.join("compressor.h").display());
    println!("cargo:rerun-if-env-changed=DEP_Z_INCLUDE");
}

#[cfg(feature = "bindgen")]
fn generate_bindings(csrc: &std::path::Path) {
    let bindings = bindgen::Builder::default()
        .header(csrc.join("compressor.h").to_string_lossy())
        .clang_arg(format!("-I{}", csrc.display()))
        // Only the shim's own surface; zlib symbols come from libz-sys
        .allowlist_type("^compress_result$")
        .allowlist_function("^zbridge_.*")
        .derive_debug(true)
        .derive_default(true)
        .derive_copy(true)
        .layout_tests(true)
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("bindgen generate");

    let out = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out.join("bindings.rs"))
        .expect("write bindings");
}
