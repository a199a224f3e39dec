#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let config = jersey_viewer::ViewerConfig::from_env()?;
    jersey_viewer::run(config)
}

// The web build starts through `#[wasm_bindgen(start)]` in the library.
#[cfg(target_arch = "wasm32")]
fn main() {}
