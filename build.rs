//! Exports the modification times of the embedded web assets so the asset
//! handler can derive its cache validators (ETag, Last-Modified) from the
//! build inputs.

use std::fs;
use std::time::UNIX_EPOCH;

fn asset_mtime(path: &str) -> u64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn main() {
    println!("cargo:rerun-if-changed=assets/style.css.gz");
    println!("cargo:rerun-if-changed=assets/script.js.gz");
    println!(
        "cargo:rustc-env=VTU_ASSET_MTIME_STYLE_CSS={}",
        asset_mtime("assets/style.css.gz")
    );
    println!(
        "cargo:rustc-env=VTU_ASSET_MTIME_SCRIPT_JS={}",
        asset_mtime("assets/script.js.gz")
    );
}
