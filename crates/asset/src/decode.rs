//! End-to-end GLB decode: container -> document -> mesh groups -> scene.
//!
//! Only the four container-level failures abort a decode. Everything else
//! (bad accessors, missing textures, capped primitives) degrades to a
//! smaller scene with the problem recorded in the warning list.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use corelib::bounds::Aabb;

use crate::accessor;
use crate::document::Document;
use crate::error::{FormatError, Warning};
use crate::glb::{self, BinChunk};
use crate::material;
use crate::mesh::{MeshGroup, Scene, SceneStats, Texture, wireframe_edges};
use crate::texture::TextureData;

/// Decode result: the scene plus every recoverable issue hit on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub scene: Scene,
    pub warnings: Vec<Warning>,
}

/// Decode a GLB container from raw bytes.
///
/// `model_dir` anchors relative texture URIs; pass the model file's parent
/// directory when known, or `None` to resolve them against the working
/// directory.
pub fn decode(buf: &[u8], model_dir: Option<&Path>) -> Result<Decoded, FormatError> {
    let header = glb::read_header(buf)?;
    log::debug!(
        "glb header: version={} declared_length={}",
        header.version,
        header.declared_length
    );

    let json_chunk = glb::read_chunk(buf, glb::HEADER_LEN)?;
    if json_chunk.kind != glb::CHUNK_JSON {
        return Err(FormatError::MissingJsonChunk);
    }
    let text = glb::extract_json(buf)?;
    let doc = Document::from_json(text)?;
    if let Some(version) = &doc.asset.version {
        log::debug!("gltf asset version {version}");
    }

    let bin = glb::locate_bin_chunk(buf, json_chunk.end());
    let mut warnings = Vec::new();
    let groups = build_mesh_groups(&doc, bin, buf, model_dir, &mut warnings);

    let bounds = Aabb::from_points(groups.iter().flat_map(|g| g.vertices.iter().copied()))
        .unwrap_or(Aabb::UNIT);
    let stats = SceneStats::from_document(&doc);

    log::info!(
        "decoded scene: {} groups, {} vertices declared, {} warnings",
        groups.len(),
        stats.vertex_count,
        warnings.len()
    );

    Ok(Decoded {
        scene: Scene {
            groups,
            bounds,
            stats,
        },
        warnings,
    })
}

/// Read and decode a `.glb` file. Texture URIs resolve relative to the
/// file's directory.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Decoded, FormatError> {
    let path = path.as_ref();
    let buf = fs::read(path)?;
    decode(&buf, path.parent())
}

/// Walk meshes, then primitives, in document order and assemble one
/// [`MeshGroup`] per primitive that resolves to at least one vertex.
///
/// The iteration order is an output-stability contract: group order always
/// matches document order.
pub fn build_mesh_groups(
    doc: &Document,
    bin: Option<BinChunk>,
    buf: &[u8],
    model_dir: Option<&Path>,
    warnings: &mut Vec<Warning>,
) -> Vec<MeshGroup> {
    let textures = load_textures(doc, model_dir, warnings);

    let mut groups = Vec::new();
    for (mesh_index, mesh) in doc.meshes.iter().enumerate() {
        for (prim_index, primitive) in mesh.primitives.iter().enumerate() {
            let Some(pos_accessor) = primitive.attributes.position else {
                continue;
            };

            let resolved = match accessor::resolve_positions(doc, pos_accessor, bin, buf) {
                Ok(resolved) => resolved,
                Err(source) => {
                    warnings.push(Warning::Primitive {
                        mesh: mesh_index,
                        primitive: prim_index,
                        source,
                    });
                    continue;
                }
            };
            if resolved.truncated {
                warnings.push(Warning::TruncatedPrimitive {
                    mesh: mesh_index,
                    primitive: prim_index,
                    kept: resolved.positions.len(),
                    declared: resolved.declared,
                });
            }
            if resolved.positions.is_empty() {
                continue;
            }

            let mat = match primitive.material {
                Some(index) => match material::resolve_material(doc, index) {
                    Some(mat) => mat,
                    None => {
                        warnings.push(Warning::MaterialOutOfRange {
                            mesh: mesh_index,
                            primitive: prim_index,
                            index,
                        });
                        material::fallback(mesh_index)
                    }
                },
                None => material::fallback(mesh_index),
            };

            let texture = mat.texture.and_then(|image| {
                textures.get(&image).map(|data| Texture {
                    image,
                    data: data.clone(),
                })
            });

            let edges = wireframe_edges(resolved.positions.len());
            log::debug!(
                "mesh {} primitive {}: {} vertices, {} edges, material '{}'",
                mesh_index,
                prim_index,
                resolved.positions.len(),
                edges.len(),
                mat.name
            );

            groups.push(MeshGroup {
                vertices: resolved.positions,
                edges,
                color: mat.color,
                texture,
                material_name: mat.name,
            });
        }
    }
    groups
}

/// Decode every document image up front, keyed by image index. Failures
/// become warnings and leave the slot empty; the mesh walk then simply
/// finds no texture to attach.
fn load_textures(
    doc: &Document,
    model_dir: Option<&Path>,
    warnings: &mut Vec<Warning>,
) -> HashMap<usize, TextureData> {
    let mut textures = HashMap::new();
    for index in 0..doc.images.len() {
        let bytes = match crate::image::resolve_image(doc, index, model_dir) {
            Ok(bytes) => bytes,
            Err(source) => {
                warnings.push(Warning::Image { image: index, source });
                continue;
            }
        };
        match TextureData::from_encoded(&bytes) {
            Ok(data) => {
                textures.insert(index, data);
            }
            Err(source) => warnings.push(Warning::Image { image: index, source }),
        }
    }
    textures
}

#[cfg(test)]
mod tests {
    use super::*;

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use corelib::color::Rgba;
    use corelib::vec3;

    use crate::error::AccessorError;
    use crate::material::PALETTE;

    /// Assemble a GLB container from a JSON chunk and an optional BIN
    /// chunk, padding both to 4-byte alignment.
    fn glb(json: &str, bin: Option<&[u8]>) -> Vec<u8> {
        let mut json_bytes = json.as_bytes().to_vec();
        while json_bytes.len() % 4 != 0 {
            json_bytes.push(b' ');
        }

        let mut buf = Vec::new();
        buf.extend_from_slice(&glb::MAGIC.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes()); // declared length patched below
        buf.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(&glb::CHUNK_JSON.to_le_bytes());
        buf.extend_from_slice(&json_bytes);

        if let Some(bin) = bin {
            let mut bin_bytes = bin.to_vec();
            while bin_bytes.len() % 4 != 0 {
                bin_bytes.push(0);
            }
            buf.extend_from_slice(&(bin_bytes.len() as u32).to_le_bytes());
            buf.extend_from_slice(&glb::CHUNK_BIN.to_le_bytes());
            buf.extend_from_slice(&bin_bytes);
        }

        let total = buf.len() as u32;
        buf[8..12].copy_from_slice(&total.to_le_bytes());
        buf
    }

    fn vertex_bytes(vertices: &[[f32; 3]]) -> Vec<u8> {
        let mut out = Vec::new();
        for v in vertices {
            for c in v {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out
    }

    const QUAD_JSON: &str = r#"{
        "asset": {"version": "2.0"},
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
        "accessors": [{"bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3"}],
        "bufferViews": [{"byteOffset": 0, "byteLength": 48}]
    }"#;

    fn quad_vertices() -> Vec<[f32; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ]
    }

    #[test]
    fn one_primitive_no_material_gets_first_palette_color() {
        let buf = glb(QUAD_JSON, Some(&vertex_bytes(&quad_vertices())));
        let decoded = decode(&buf, None).unwrap();

        assert!(decoded.warnings.is_empty());
        let scene = &decoded.scene;
        assert_eq!(scene.groups.len(), 1);

        let group = &scene.groups[0];
        assert_eq!(group.vertices, quad_vertices());
        assert_eq!(group.color, Rgba::from_hex("#FF4444").unwrap());
        assert_eq!(group.color, PALETTE[0]);
        // Vertex 3 is an incomplete trailing triple and contributes no edges.
        assert_eq!(group.edges, vec![[0, 1], [1, 2], [2, 0]]);
        assert_eq!(group.material_name, "default");
        assert!(group.is_valid());
    }

    #[test]
    fn tiny_buffers_fail_without_panicking() {
        let full = glb(QUAD_JSON, None);
        for len in 0..20.min(full.len()) {
            let result = decode(&full[..len], None);
            assert!(
                matches!(
                    result,
                    Err(FormatError::Truncated { .. }) | Err(FormatError::BadMagic)
                ),
                "unexpected result for length {len}"
            );
        }
    }

    #[test]
    fn json_chunk_nul_padding_is_equivalent() {
        // Hand-build a container whose JSON chunk is NUL-padded instead of
        // space-padded.
        let json = r#"{"meshes": []}"#;
        let mut json_bytes = json.as_bytes().to_vec();
        while json_bytes.len() % 4 != 0 {
            json_bytes.push(0);
        }
        let mut buf = Vec::new();
        buf.extend_from_slice(&glb::MAGIC.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(&glb::CHUNK_JSON.to_le_bytes());
        buf.extend_from_slice(&json_bytes);

        let padded = decode(&buf, None).unwrap();
        let unpadded = decode(&glb(json, None), None).unwrap();
        assert_eq!(padded, unpadded);
    }

    #[test]
    fn base_color_factor_overrides_palette() {
        let json = r#"{
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "material": 0}]}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}],
            "bufferViews": [{"byteLength": 36}],
            "materials": [{"pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.0, 0.0, 1.0]}}]
        }"#;
        let buf = glb(json, Some(&vertex_bytes(&quad_vertices()[..3])));
        let decoded = decode(&buf, None).unwrap();
        assert_eq!(decoded.scene.groups[0].color, Rgba::opaque(1.0, 0.0, 0.0));
    }

    #[test]
    fn accessor_out_of_range_skips_primitive_with_warning() {
        let json = r#"{
            "meshes": [{"primitives": [{"attributes": {"POSITION": 5}}]}],
            "accessors": [],
            "bufferViews": []
        }"#;
        let buf = glb(json, Some(&[0u8; 12]));
        let decoded = decode(&buf, None).unwrap();
        assert!(decoded.scene.groups.is_empty());
        assert_eq!(
            decoded.warnings,
            vec![Warning::Primitive {
                mesh: 0,
                primitive: 0,
                source: AccessorError::AccessorOutOfRange { index: 5, len: 0 },
            }]
        );
    }

    #[test]
    fn out_of_range_material_falls_back_to_mesh_palette() {
        let json = r#"{
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "material": 9}]}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}],
            "bufferViews": [{"byteLength": 36}]
        }"#;
        let buf = glb(json, Some(&vertex_bytes(&quad_vertices()[..3])));
        let decoded = decode(&buf, None).unwrap();

        assert_eq!(decoded.scene.groups.len(), 1);
        assert_eq!(decoded.scene.groups[0].color, PALETTE[0]);
        assert!(matches!(
            decoded.warnings[0],
            Warning::MaterialOutOfRange { index: 9, .. }
        ));
    }

    #[test]
    fn missing_bin_chunk_yields_stats_but_no_groups() {
        let buf = glb(QUAD_JSON, None);
        let decoded = decode(&buf, None).unwrap();

        assert!(decoded.scene.groups.is_empty());
        assert_eq!(decoded.scene.stats.mesh_count, 1);
        assert_eq!(decoded.scene.stats.vertex_count, 4);
        assert_eq!(decoded.scene.bounds, Aabb::UNIT);
    }

    #[test]
    fn bounds_span_all_group_vertices() {
        let verts = vec![[-2.0, 0.0, 1.0], [3.0, -1.0, 0.0], [0.0, 4.0, -5.0]];
        let json = r#"{
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}],
            "bufferViews": [{"byteLength": 36}]
        }"#;
        let buf = glb(json, Some(&vertex_bytes(&verts)));
        let decoded = decode(&buf, None).unwrap();

        let bounds = decoded.scene.bounds;
        assert_eq!(bounds.min, vec3(-2.0, -1.0, -5.0));
        assert_eq!(bounds.max, vec3(3.0, 4.0, 1.0));
    }

    #[test]
    fn groups_follow_document_order() {
        let json = r#"{
            "meshes": [
                {"primitives": [
                    {"attributes": {"POSITION": 0}},
                    {"attributes": {"POSITION": 1}}
                ]},
                {"primitives": [{"attributes": {"POSITION": 2}}]}
            ],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 1, "type": "VEC3"},
                {"bufferView": 0, "byteOffset": 12, "componentType": 5126, "count": 1, "type": "VEC3"},
                {"bufferView": 0, "byteOffset": 24, "componentType": 5126, "count": 1, "type": "VEC3"}
            ],
            "bufferViews": [{"byteLength": 36}]
        }"#;
        let verts = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]];
        let buf = glb(json, Some(&vertex_bytes(&verts)));
        let decoded = decode(&buf, None).unwrap();

        let xs: Vec<f32> = decoded
            .scene
            .groups
            .iter()
            .map(|g| g.vertices[0][0])
            .collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        // Second mesh falls back to the second palette entry.
        assert_eq!(decoded.scene.groups[2].color, PALETTE[1]);
    }

    #[test]
    fn embedded_png_texture_is_attached() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 255, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let json = format!(
            r#"{{
                "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}, "material": 0}}]}}],
                "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}}],
                "bufferViews": [{{"byteLength": 36}}],
                "materials": [{{"pbrMetallicRoughness": {{"baseColorTexture": {{"index": 0}}}}}}],
                "images": [{{"uri": "{uri}"}}]
            }}"#
        );
        let buf = glb(&json, Some(&vertex_bytes(&quad_vertices()[..3])));
        let decoded = decode(&buf, None).unwrap();

        assert!(decoded.warnings.is_empty());
        let texture = decoded.scene.groups[0].texture.as_ref().unwrap();
        assert_eq!(texture.image, 0);
        assert_eq!(texture.data.data, vec![0, 255, 0, 255]);
    }

    #[test]
    fn broken_texture_keeps_mesh_and_warns() {
        let json = r#"{
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "material": 0}]}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}],
            "bufferViews": [{"byteLength": 36}],
            "materials": [{"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}}],
            "images": [{"uri": "missing-texture.png"}]
        }"#;
        let buf = glb(json, Some(&vertex_bytes(&quad_vertices()[..3])));
        let decoded = decode(&buf, Some(Path::new("/nonexistent-dir"))).unwrap();

        assert_eq!(decoded.scene.groups.len(), 1);
        assert!(decoded.scene.groups[0].texture.is_none());
        assert!(matches!(
            decoded.warnings[0],
            Warning::Image { image: 0, .. }
        ));
    }

    #[test]
    fn capped_primitive_warns_with_counts() {
        let count = accessor::MAX_VERTICES_PER_PRIMITIVE + 10;
        let json = format!(
            r#"{{
                "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
                "accessors": [{{"bufferView": 0, "componentType": 5126, "count": {count}, "type": "VEC3"}}],
                "bufferViews": [{{"byteLength": {}}}]
            }}"#,
            count * 12
        );
        let buf = glb(&json, Some(&vec![0u8; count * 12]));
        let decoded = decode(&buf, None).unwrap();

        assert_eq!(
            decoded.scene.groups[0].vertices.len(),
            accessor::MAX_VERTICES_PER_PRIMITIVE
        );
        assert_eq!(
            decoded.warnings,
            vec![Warning::TruncatedPrimitive {
                mesh: 0,
                primitive: 0,
                kept: accessor::MAX_VERTICES_PER_PRIMITIVE,
                declared: count,
            }]
        );
    }

    #[test]
    fn decoding_twice_is_deterministic() {
        let buf = glb(QUAD_JSON, Some(&vertex_bytes(&quad_vertices())));
        let first = decode(&buf, None).unwrap();
        let second = decode(&buf, None).unwrap();
        assert_eq!(first, second);
    }
}
