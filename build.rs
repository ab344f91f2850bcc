use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

/// Files the demo asks for at startup. Missing ones only degrade the scene.
const DEMO_ASSETS: &[&str] = &[
    "font/helvetiker_regular.typeface.json",
    "textures/matcaps/2.png",
    "textures/matcaps/5.png",
];

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if !assets_src.exists() {
        println!("cargo:warning=no assets/ directory, the demo will run without font and matcaps");
        return Ok(());
    }

    for missing in DEMO_ASSETS.iter().filter(|f| !assets_src.join(f).exists()) {
        println!("cargo:warning=assets/{} is missing", missing);
    }

    // Keep a copy next to the build output for packaging the web build.
    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[assets_src], out_dir, &copy_options)?;

    Ok(())
}
