//! Command-line GLB inspector: decode models and print their summaries.

use std::fs;
use std::path::Path;

use anyhow::{Result, bail};

fn parse_groups_arg() -> bool {
    // Accept: --groups[=on|off], default off
    for arg in std::env::args() {
        if arg == "--groups" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--groups=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_paths() -> Vec<String> {
    std::env::args()
        .skip(1)
        .filter(|arg| !arg.starts_with("--"))
        .collect()
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn inspect(path: &Path, show_groups: bool) -> Result<()> {
    let decoded = asset::decode::decode_file(path)?;
    let scene = &decoded.scene;
    let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    println!(
        "model: {} (glTF Binary, {})",
        path.display(),
        human_size(file_size)
    );
    println!(
        "meshes: {} | vertices: {} | faces: {} | materials: {}",
        scene.stats.mesh_count,
        scene.stats.vertex_count,
        scene.stats.face_count,
        scene.stats.material_count
    );
    let b = &scene.bounds;
    println!(
        "bounds: min=({:.3}, {:.3}, {:.3}) max=({:.3}, {:.3}, {:.3})",
        b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
    );
    println!("groups: {}", scene.groups.len());

    if show_groups {
        for (i, group) in scene.groups.iter().enumerate() {
            let texture = match &group.texture {
                Some(t) => format!(", texture #{} ({}x{})", t.image, t.data.width, t.data.height),
                None => String::new(),
            };
            println!(
                "  group {i}: {} vertices, {} edges, material '{}'{}",
                group.vertices.len(),
                group.edges.len(),
                group.material_name,
                texture
            );
        }
    }

    for warning in &decoded.warnings {
        log::warn!("{}: {warning}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let show_groups = parse_groups_arg();
    let paths = parse_paths();
    if paths.is_empty() {
        bail!("usage: app [--groups] <model.glb> [more.glb ...]");
    }

    let mut failed = 0usize;
    for path in &paths {
        if let Err(e) = inspect(Path::new(path), show_groups) {
            log::error!("{path}: {e:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} models failed to decode", paths.len());
    }
    log::info!("Inspected {} model(s). Bye!", paths.len());
    Ok(())
}
