//! Cube mesh assembly.

use crate::types::Direction;

/// One corner of a cube face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Atlas UV, v = 1 at the top edge.
    pub uv: [f32; 2],
    /// Palette color: the sRGB bytes divided by 255, alpha 1. Not linearized.
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: [1.0; 4],
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

/// Indexed triangle list built one face at a time.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Counter-clockwise triangles, 3 indices each.
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Append a face from four corners wound clockwise seen from outside.
    /// `uvs[k]` goes with `corners[k]`.
    pub fn add_face(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3], uvs: [[f32; 2]; 4], color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(
            corners
                .iter()
                .zip(uvs)
                .map(|(&corner, uv)| Vertex::new(corner, normal, uv).with_color(color)),
        );
        self.indices
            .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }

    /// Append an axis-aligned cube of edge `size` centred on `center`, every
    /// face sharing the same four UVs.
    pub fn add_cube(&mut self, center: [f32; 3], size: f32, uvs: [[f32; 2]; 4], color: [f32; 4]) {
        for dir in Direction::ALL {
            self.add_face(dir.face_corners(center, size), dir.normal(), uvs, color);
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_triangles_face_outward() {
        let mut mesh = Mesh::new();
        assert!(mesh.is_empty());

        mesh.add_face(
            Direction::Up.face_corners([0.0; 3], 1.0),
            Direction::Up.normal(),
            [[0.5, 0.5]; 4],
            [1.0, 0.0, 0.0, 1.0],
        );

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 2, 1, 0, 3, 2]);

        // Right-handed normal of the first triangle matches the face normal
        let p = |i: u32| glam::Vec3::from(mesh.vertices[i as usize].position);
        let (a, b, c) = (p(mesh.indices[0]), p(mesh.indices[1]), p(mesh.indices[2]));
        let n = (b - a).cross(c - a).normalize();
        assert!((n - glam::Vec3::from(Direction::Up.normal())).length() < 1e-5);
    }

    #[test]
    fn test_cube_counts() {
        let mut mesh = Mesh::new();
        mesh.add_cube([1.0, 2.0, 3.0], 2.0, [[0.0, 1.0]; 4], [0.5; 4]);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.vertices.iter().all(|v| v.color == [0.5; 4]));
        assert!(mesh
            .vertices
            .iter()
            .all(|v| (0..3).all(|i| (v.position[i] - [1.0, 2.0, 3.0][i]).abs() <= 1.0)));
    }
}
