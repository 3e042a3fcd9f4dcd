//! Build script for mapedit-server
//!
//! Ensures the dist/ folder exists for rust-embed.
//! The client should be built separately via `trunk build` before building
//! the server; without it the server embeds a placeholder page.

use std::env;
use std::path::Path;

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let dist_dir = Path::new(&manifest_dir).join("../..").join("dist");

    println!("cargo:rerun-if-changed={}", dist_dir.display());

    if !dist_dir.join("index.html").exists() {
        println!("cargo:warning=dist/index.html not found, embedding a placeholder");
        println!("cargo:warning=Run `trunk build --release` in crates/mapedit-client for the real UI");
        std::fs::create_dir_all(&dist_dir).ok();
        std::fs::write(
            dist_dir.join("index.html"),
            "<!doctype html><title>mapedit</title><p>Client not built.</p>",
        )
        .ok();
    }
}
