use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Rerun when the bundled jersey model or kit textures change.
    println!("cargo:rerun-if-changed=assets");

    let out_dir = env::var("OUT_DIR")?;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if !assets_src.exists() {
        return Ok(());
    }

    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[assets_src], &out_dir, &copy_options)?;

    // Lets the native binary find the assets when started outside the crate root.
    let bundled = PathBuf::from(out_dir).join("assets");
    println!("cargo:rustc-env=JERSEY_BUNDLED_ASSETS={}", bundled.display());

    Ok(())
}
