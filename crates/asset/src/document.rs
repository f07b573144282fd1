//! Typed subset of the glTF JSON document the decoder consumes.
//!
//! Only the fields the mesh/material/image walk touches are modelled;
//! everything else in the document is ignored by serde.

use serde::Deserialize;

use crate::error::FormatError;

/// glTF componentType for 32-bit floats.
pub const COMPONENT_FLOAT: u32 = 5126;
/// glTF accessor type for 3-component vectors.
pub const TYPE_VEC3: &str = "VEC3";

/// Root of the parsed JSON chunk.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub asset: Asset,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self, FormatError> {
        serde_json::from_str(text).map_err(|e| FormatError::InvalidJson(e.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Asset {
    pub version: Option<String>,
    pub generator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Mesh {
    pub name: Option<String>,
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Deserialize)]
pub struct Primitive {
    #[serde(default)]
    pub attributes: Attributes,
    /// Index accessor. Only consulted for face statistics; wireframe edges
    /// are derived from vertex order instead.
    pub indices: Option<usize>,
    pub material: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Attributes {
    #[serde(rename = "POSITION")]
    pub position: Option<usize>,
}

/// Typed view into the binary buffer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Byte range (plus optional stride) into the BIN chunk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    #[serde(default)]
    pub byte_offset: usize,
    #[serde(default)]
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub name: Option<String>,
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    /// RGBA factors in `[0, 1]`. Kept as a loose list: exporters emit 3 or
    /// 4 components and the resolver fills the missing alpha.
    pub base_color_factor: Option<Vec<f32>>,
    pub base_color_texture: Option<TextureInfo>,
}

#[derive(Debug, Deserialize)]
pub struct TextureInfo {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct Image {
    pub uri: Option<String>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_document() {
        let doc = Document::from_json(
            r#"{
                "asset": {"version": "2.0", "generator": "test"},
                "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "material": 1}]}],
                "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}],
                "bufferViews": [{"byteOffset": 0, "byteLength": 36}],
                "materials": [{}, {"name": "steel"}]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.asset.version.as_deref(), Some("2.0"));
        assert_eq!(doc.meshes.len(), 1);
        assert_eq!(doc.meshes[0].primitives[0].attributes.position, Some(0));
        assert_eq!(doc.meshes[0].primitives[0].material, Some(1));
        assert_eq!(doc.accessors[0].component_type, COMPONENT_FLOAT);
        assert_eq!(doc.accessors[0].ty, TYPE_VEC3);
        // byteOffset defaults to zero when omitted.
        assert_eq!(doc.accessors[0].byte_offset, 0);
        assert_eq!(doc.materials[1].name.as_deref(), Some("steel"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let doc = Document::from_json(
            r#"{"scenes": [{"nodes": [0]}], "nodes": [{"mesh": 0}], "extensionsUsed": ["X"]}"#,
        )
        .unwrap();
        assert!(doc.meshes.is_empty());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(Document::from_json("{\"meshes\": [").is_err());
    }

    #[test]
    fn base_color_factor_accepts_three_components() {
        let doc = Document::from_json(
            r#"{"materials": [{"pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.5, 0.0]}}]}"#,
        )
        .unwrap();
        let pbr = doc.materials[0].pbr_metallic_roughness.as_ref().unwrap();
        assert_eq!(pbr.base_color_factor.as_deref(), Some(&[1.0, 0.5, 0.0][..]));
    }
}
