//! Wavefront OBJ export.
//!
//! One shared material maps the atlas PNG onto every cube. Voxels are either
//! kept as separate groups or combined into a single object.

use crate::error::{AtlasError, Result};
use crate::scene::{VoxelScene, CUBE_TRIANGLES};
use std::fmt::Write;

/// How voxel cubes are grouped in the OBJ file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjLayout {
    /// One object holding every cube.
    #[default]
    Combined,
    /// One `g` group per voxel, named `{name}_voxel_{i}`.
    PerVoxel,
}

/// Export a scene to OBJ format.
/// Returns (obj_content, mtl_content) as strings.
pub fn export_obj(scene: &VoxelScene, layout: ObjLayout) -> Result<(String, String)> {
    let mesh = &scene.mesh;

    // ~60 bytes per v/vt/vn line and ~40 per face
    let mut obj = String::with_capacity(256 + mesh.vertex_count() * 180 + mesh.triangle_count() * 40);
    let mut mtl = String::with_capacity(256);

    write_obj(&mut obj, scene, layout).map_err(|e| AtlasError::Export(e.to_string()))?;
    write_mtl(&mut mtl, scene).map_err(|e| AtlasError::Export(e.to_string()))?;

    Ok((obj, mtl))
}

fn write_obj(obj: &mut String, scene: &VoxelScene, layout: ObjLayout) -> std::fmt::Result {
    let mesh = &scene.mesh;

    writeln!(obj, "# Voxel Atlas OBJ Export")?;
    writeln!(obj, "# Voxels: {}", scene.voxel_count)?;
    writeln!(obj, "# Vertices: {}", mesh.vertex_count())?;
    writeln!(obj, "# Triangles: {}", mesh.triangle_count())?;
    writeln!(obj)?;
    writeln!(obj, "mtllib {}.mtl", scene.name)?;
    writeln!(obj)?;
    writeln!(obj, "o {}", scene.name)?;
    writeln!(obj)?;

    // Vertex colors follow the position, as several tools read them
    for vertex in &mesh.vertices {
        writeln!(
            obj,
            "v {} {} {} {} {} {}",
            vertex.position[0],
            vertex.position[1],
            vertex.position[2],
            vertex.color[0],
            vertex.color[1],
            vertex.color[2]
        )?;
    }
    writeln!(obj)?;

    for vertex in &mesh.vertices {
        writeln!(obj, "vt {} {}", vertex.uv[0], vertex.uv[1])?;
    }
    writeln!(obj)?;

    for vertex in &mesh.vertices {
        writeln!(obj, "vn {} {} {}", vertex.normal[0], vertex.normal[1], vertex.normal[2])?;
    }
    writeln!(obj)?;

    writeln!(obj, "usemtl {}", scene.material_name())?;
    for (t, triangle) in mesh.indices.chunks_exact(3).enumerate() {
        if layout == ObjLayout::PerVoxel && t % CUBE_TRIANGLES == 0 {
            writeln!(obj, "g {}", scene.voxel_name(t / CUBE_TRIANGLES))?;
        }
        let i0 = triangle[0] as usize + 1;
        let i1 = triangle[1] as usize + 1;
        let i2 = triangle[2] as usize + 1;
        writeln!(obj, "f {}/{}/{} {}/{}/{} {}/{}/{}", i0, i0, i0, i1, i1, i1, i2, i2, i2)?;
    }

    Ok(())
}

fn write_mtl(mtl: &mut String, scene: &VoxelScene) -> std::fmt::Result {
    writeln!(mtl, "# Voxel Atlas Material")?;
    writeln!(mtl)?;
    writeln!(mtl, "newmtl {}", scene.material_name())?;
    writeln!(mtl, "Ka 1.0 1.0 1.0")?;
    writeln!(mtl, "Kd 1.0 1.0 1.0")?;
    writeln!(mtl, "Ks 0.0 0.0 0.0")?;
    writeln!(mtl, "Ns 10.0")?;
    writeln!(mtl, "d 1.0")?;
    writeln!(mtl, "illum 1")?;
    writeln!(mtl, "map_Kd {}", scene.atlas_file_name)?;
    Ok(())
}

/// OBJ, MTL and atlas bytes ready to be written side by side.
pub struct ObjExport {
    pub obj: String,
    pub mtl: String,
    /// File name the MTL expects the atlas under.
    pub texture_file_name: String,
    pub texture_png: Vec<u8>,
}

impl ObjExport {
    pub fn from_scene(scene: &VoxelScene, layout: ObjLayout) -> Result<Self> {
        let (obj, mtl) = export_obj(scene, layout)?;
        let texture_png = scene.atlas.to_png()?;
        Ok(Self {
            obj,
            mtl,
            texture_file_name: scene.atlas_file_name.clone(),
            texture_png,
        })
    }
}
