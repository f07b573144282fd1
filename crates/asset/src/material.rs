//! Material resolution: base colors, texture references and the fallback
//! palette.

use corelib::color::Rgba;

use crate::document::Document;

/// Fallback colors cycled by index when a material declares no base color
/// or a primitive has none at all. The order is load-bearing: existing
/// tooling keys off these exact values.
pub const PALETTE: [Rgba; 10] = [
    Rgba::from_rgb8(0xFF, 0x44, 0x44),
    Rgba::from_rgb8(0x44, 0xFF, 0x44),
    Rgba::from_rgb8(0x44, 0x44, 0xFF),
    Rgba::from_rgb8(0xFF, 0xFF, 0x44),
    Rgba::from_rgb8(0xFF, 0x44, 0xFF),
    Rgba::from_rgb8(0x44, 0xFF, 0xFF),
    Rgba::from_rgb8(0xFF, 0x88, 0x44),
    Rgba::from_rgb8(0x88, 0xFF, 0x44),
    Rgba::from_rgb8(0x44, 0x88, 0xFF),
    Rgba::from_rgb8(0xFF, 0x44, 0x88),
];

/// Palette color for an arbitrary index, cycling past the end.
#[inline]
pub fn palette_color(index: usize) -> Rgba {
    PALETTE[index % PALETTE.len()]
}

/// Material data resolved for one primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMaterial {
    pub color: Rgba,
    /// Index into the document's image table, to be resolved separately.
    pub texture: Option<usize>,
    pub name: String,
}

/// Resolve `materials[material_index]`, or `None` when out of range.
///
/// The color seeds from the palette keyed by the material index and is
/// overridden by `pbrMetallicRoughness.baseColorFactor` when it carries at
/// least three components (alpha defaults to opaque).
pub fn resolve_material(doc: &Document, material_index: usize) -> Option<ResolvedMaterial> {
    let material = doc.materials.get(material_index)?;

    let mut color = palette_color(material_index);
    let mut texture = None;

    if let Some(pbr) = &material.pbr_metallic_roughness {
        if let Some(info) = &pbr.base_color_texture {
            texture = Some(info.index);
        }
        if let Some(factor) = &pbr.base_color_factor {
            if factor.len() >= 3 {
                color = Rgba::new(
                    factor[0],
                    factor[1],
                    factor[2],
                    factor.get(3).copied().unwrap_or(1.0),
                );
            }
        }
    }

    Some(ResolvedMaterial {
        color,
        texture,
        name: material
            .name
            .clone()
            .unwrap_or_else(|| "default".to_string()),
    })
}

/// Material for a primitive with no material assignment: palette color
/// keyed by the owning mesh index.
pub fn fallback(mesh_index: usize) -> ResolvedMaterial {
    ResolvedMaterial {
        color: palette_color(mesh_index),
        texture: None,
        name: "default".to_string(),
    }
}
