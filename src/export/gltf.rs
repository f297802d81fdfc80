//! glTF/GLB export.
//!
//! A scene becomes one node holding one primitive. All cubes share a single
//! material whose base color texture is the atlas PNG, embedded in the BIN
//! chunk. The texture alone carries the voxel colors; no COLOR_0 is written.
//!
//! glTF puts UV (0, 0) at the top-left of the image while scene UVs have
//! v = 1 at the top, so v is flipped on the way out.

use crate::error::{AtlasError, Result};
use crate::scene::{Mesh, VoxelScene};
use gltf_json as json;
use json::accessor::{ComponentType, GenericComponentType, Type};
use json::buffer::Target;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::collections::BTreeMap;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Export a voxel scene to GLB format (binary glTF) with the atlas embedded.
///
/// The sampler uses nearest filtering and clamps at the edges so tiles never
/// blend into their neighbours.
pub fn export_glb(scene: &VoxelScene) -> Result<Vec<u8>> {
    let mesh = &scene.mesh;
    if mesh.is_empty() {
        return Err(AtlasError::Export("Cannot export empty mesh".to_string()));
    }
    let texture_png = scene.atlas.to_png()?;

    let mut bin = BinBuffer::default();
    let mut accessors = Vec::with_capacity(4);
    let count = mesh.vertex_count();

    let positions = bin.push_f32s(mesh.vertices.iter().flat_map(|v| v.position), Some(Target::ArrayBuffer));
    accessors.push(accessor(positions, count, Type::Vec3, ComponentType::F32, Some((scene.bounds.min, scene.bounds.max))));
    let normals = bin.push_f32s(mesh.vertices.iter().flat_map(|v| v.normal), Some(Target::ArrayBuffer));
    accessors.push(accessor(normals, count, Type::Vec3, ComponentType::F32, None));
    let uvs = bin.push_f32s(mesh.vertices.iter().flat_map(|v| gltf_uv(v.uv)), Some(Target::ArrayBuffer));
    accessors.push(accessor(uvs, count, Type::Vec2, ComponentType::F32, None));
    let indices = bin.push_u32s(mesh.indices.iter().copied(), Some(Target::ElementArrayBuffer));
    accessors.push(accessor(indices, mesh.indices.len(), Type::Scalar, ComponentType::U32, None));
    let image = bin.push_bytes(&texture_png, None);

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(bin.data.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views: bin.views,
        images: vec![json::Image {
            buffer_view: Some(json::Index::new(image)),
            mime_type: Some(json::image::MimeType("image/png".to_string())),
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        }],
        samplers: vec![json::texture::Sampler {
            mag_filter: Some(Valid(json::texture::MagFilter::Nearest)),
            min_filter: Some(Valid(json::texture::MinFilter::Nearest)),
            wrap_s: Valid(json::texture::WrappingMode::ClampToEdge),
            wrap_t: Valid(json::texture::WrappingMode::ClampToEdge),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        textures: vec![json::Texture {
            sampler: Some(json::Index::new(0)),
            source: json::Index::new(0),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        materials: vec![atlas_material()],
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives: vec![primitive(mesh)],
            weights: None,
        }],
        nodes: vec![json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        }],
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| AtlasError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    log::debug!(
        "GLB for '{}': {} vertices, {} byte buffer",
        scene.name,
        count,
        bin.data.len()
    );

    Ok(write_glb(json_string.as_bytes(), &bin.data))
}

/// The BIN chunk under construction, one 4-byte aligned view per section.
#[derive(Default)]
struct BinBuffer {
    data: Vec<u8>,
    views: Vec<json::buffer::View>,
}

impl BinBuffer {
    fn push_f32s(&mut self, values: impl Iterator<Item = f32>, target: Option<Target>) -> u32 {
        let start = self.begin();
        for value in values {
            self.data.extend_from_slice(&value.to_le_bytes());
        }
        self.finish(start, target)
    }

    fn push_u32s(&mut self, values: impl Iterator<Item = u32>, target: Option<Target>) -> u32 {
        let start = self.begin();
        for value in values {
            self.data.extend_from_slice(&value.to_le_bytes());
        }
        self.finish(start, target)
    }

    fn push_bytes(&mut self, bytes: &[u8], target: Option<Target>) -> u32 {
        let start = self.begin();
        self.data.extend_from_slice(bytes);
        self.finish(start, target)
    }

    fn begin(&mut self) -> usize {
        self.data.resize(align4(self.data.len()), 0);
        self.data.len()
    }

    /// Record the view for bytes written since `start` and return its index.
    fn finish(&mut self, start: usize, target: Option<Target>) -> u32 {
        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: USize64((self.data.len() - start) as u64),
            byte_offset: Some(USize64(start as u64)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            target: target.map(Valid),
        });
        (self.views.len() - 1) as u32
    }
}

/// Scene UV (v = 1 at the top row) to glTF UV (v = 0 at the top row).
fn gltf_uv(uv: [f32; 2]) -> [f32; 2] {
    [uv[0], 1.0 - uv[1]]
}

fn align4(len: usize) -> usize {
    (len + 3) & !3
}

fn accessor(
    view: u32,
    count: usize,
    type_: Type,
    component_type: ComponentType,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: bounds.map(|(min, _)| json::Value::from(min.to_vec())),
        max: bounds.map(|(_, max)| json::Value::from(max.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// The single primitive; accessors 0-3 hold positions, normals, UVs and
/// indices in that order.
fn primitive(mesh: &Mesh) -> json::mesh::Primitive {
    debug_assert!(!mesh.is_empty());
    let attributes = BTreeMap::from([
        (Valid(json::mesh::Semantic::Positions), json::Index::new(0)),
        (Valid(json::mesh::Semantic::Normals), json::Index::new(1)),
        (Valid(json::mesh::Semantic::TexCoords(0)), json::Index::new(2)),
    ]);

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(3)),
        material: Some(json::Index::new(0)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Opaque material sampling the atlas with a white base color factor, so
/// texels come through unchanged.
fn atlas_material() -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: Some(json::texture::Info {
                index: json::Index::new(0),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            base_color_factor: json::material::PbrBaseColorFactor([1.0; 4]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Opaque),
        alpha_cutoff: None,
        double_sided: false,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0; 3]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Wrap JSON and binary chunks in a GLB container.
fn write_glb(json_bytes: &[u8], bin: &[u8]) -> Vec<u8> {
    let json_len = align4(json_bytes.len());
    let bin_len = align4(bin.len());
    let total = 12 + 8 + json_len + 8 + bin_len;

    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());

    // JSON chunk pads with spaces, BIN with zeros
    glb.extend_from_slice(&(json_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.resize(20 + json_len, b' ');

    glb.extend_from_slice(&(bin_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(bin);
    glb.resize(total, 0);

    glb
}
