//! Scene export formats.
//!
//! This module provides exporters for voxel scenes.

pub mod gltf;
pub mod obj;
pub mod raw;

pub use gltf::export_glb;
pub use obj::{export_obj, ObjExport, ObjLayout};
pub use raw::{export_raw, RawMeshData};
