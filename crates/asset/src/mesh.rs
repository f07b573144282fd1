//! CPU-side scene representation produced by the decoder.

use corelib::bounds::Aabb;
use corelib::color::Rgba;

use crate::document::Document;
use crate::texture::TextureData;

/// One decoded primitive: owned vertices, derived wireframe edges and the
/// resolved material.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGroup {
    pub vertices: Vec<[f32; 3]>,
    /// Wireframe edge index pairs. Derived from consecutive vertex triples,
    /// not from the primitive's real index buffer; see [`wireframe_edges`].
    pub edges: Vec<[u32; 2]>,
    pub color: Rgba,
    pub texture: Option<Texture>,
    pub material_name: String,
}

impl MeshGroup {
    /// Returns `true` when the group has vertices and every edge endpoint
    /// indexes one of them.
    pub fn is_valid(&self) -> bool {
        let n = self.vertices.len() as u32;
        !self.vertices.is_empty() && self.edges.iter().all(|e| e[0] < n && e[1] < n)
    }
}

/// Decoded texture attached to a mesh group.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    /// Index into the document's image table.
    pub image: usize,
    pub data: TextureData,
}

/// Approximate wireframe topology from implicit sequential triangles.
///
/// Consecutive vertex triples `(i, i+1, i+2)` become the three edges
/// `(i,i+1), (i+1,i+2), (i+2,i)`, advancing by 3. The primitive's real
/// index buffer is never consulted, so shared vertices and trailing
/// partial triples produce no edges. Approximation kept deliberately;
/// downstream consumers depend on this exact edge pattern.
pub fn wireframe_edges(vertex_count: usize) -> Vec<[u32; 2]> {
    let mut edges = Vec::new();
    if vertex_count > 2 {
        let mut i = 0;
        while i < vertex_count - 2 {
            let a = i as u32;
            edges.push([a, a + 1]);
            edges.push([a + 1, a + 2]);
            edges.push([a + 2, a]);
            i += 3;
        }
    }
    edges
}

/// Whole decoded model: mesh groups in document order plus summary data.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub groups: Vec<MeshGroup>,
    pub bounds: Aabb,
    pub stats: SceneStats,
}

/// Model-level counts tallied from the document as declared. Independent
/// of the per-primitive read cap on purpose: these describe the file, not
/// what was loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneStats {
    pub mesh_count: usize,
    pub vertex_count: usize,
    pub face_count: usize,
    pub material_count: usize,
}

impl SceneStats {
    /// Tally declared counts from the document graph. Out-of-range
    /// accessor references contribute zero.
    pub fn from_document(doc: &Document) -> Self {
        let mut stats = Self {
            mesh_count: doc.meshes.len(),
            material_count: doc.materials.len(),
            ..Self::default()
        };
        for mesh in &doc.meshes {
            for primitive in &mesh.primitives {
                if let Some(index) = primitive.attributes.position {
                    if let Some(accessor) = doc.accessors.get(index) {
                        stats.vertex_count += accessor.count;
                    }
                }
                if let Some(index) = primitive.indices {
                    if let Some(accessor) = doc.accessors.get(index) {
                        stats.face_count += accessor.count / 3;
                    }
                }
            }
        }
        stats
    }
}
