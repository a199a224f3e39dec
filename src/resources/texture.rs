use anyhow::*;

pub fn diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Kit texture_bind_group_layout"),
    })
}

#[cfg(target_arch = "wasm32")]
fn format_url(path: &str) -> Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow!("No window available."))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow!("Page origin unavailable: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/", origin))?;
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Reads an asset. `path` is a file path natively and a path below the page
/// origin on the web.
pub async fn load_binary(path: &str) -> Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(path)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Could not read {}", path))?;

    Ok(data)
}

/// Fetches and decodes a kit texture.
pub async fn load_image(path: &str) -> Result<image::DynamicImage> {
    let data = load_binary(path).await?;
    decode_image(&data).with_context(|| format!("Could not decode {}", path))
}

pub fn decode_image(bytes: &[u8]) -> Result<image::DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}
