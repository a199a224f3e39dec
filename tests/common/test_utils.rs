use jersey_viewer::{
    ViewerConfig,
    controls::OrbitSettings,
    resources::{ModelData, model_from_gltf},
};

/// Builds a binary glTF with a "Body" mesh and two "Sleeve" nodes sharing a
/// second mesh. Both meshes reuse one triangle without normals or UVs.
pub fn jersey_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    for position in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in position {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for index in [0u16, 1, 2] {
        bin.extend_from_slice(&index.to_le_bytes());
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let json = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0, 1, 2] }}],
  "nodes": [
    {{ "name": "Body", "mesh": 0 }},
    {{ "name": "SleeveLeft", "mesh": 1, "translation": [-1.0, 0.0, 0.0] }},
    {{ "name": "SleeveRight", "mesh": 1, "translation": [1.0, 0.0, 0.0] }}
  ],
  "meshes": [
    {{ "name": "Body", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}] }},
    {{ "name": "Sleeve", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}] }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "buffers": [{{ "byteLength": {} }}]
}}"#,
        bin.len()
    );
    let mut json = json.into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

#[allow(dead_code)]
pub fn jersey_model() -> ModelData {
    let gltf = gltf::Gltf::from_slice(&jersey_glb()).expect("valid glb");
    let blob = gltf.blob.clone().expect("binary chunk");
    model_from_gltf(&gltf, &[blob]).expect("convertible scene")
}

/// Default preset with a camera that only moves on input.
#[allow(dead_code)]
pub fn still_config() -> ViewerConfig {
    ViewerConfig {
        controls: OrbitSettings {
            auto_rotate: false,
            enable_damping: false,
            ..Default::default()
        },
        ..Default::default()
    }
}
