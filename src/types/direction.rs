//! Cube face directions.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The six faces of an axis-aligned voxel cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All six directions in order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Get the normal vector for this direction.
    pub fn normal(&self) -> [f32; 3] {
        match self {
            Direction::Down => [0.0, -1.0, 0.0],
            Direction::Up => [0.0, 1.0, 0.0],
            Direction::North => [0.0, 0.0, -1.0],
            Direction::South => [0.0, 0.0, 1.0],
            Direction::West => [-1.0, 0.0, 0.0],
            Direction::East => [1.0, 0.0, 0.0],
        }
    }

    /// Two unit edge vectors spanning the face, with `a × b` pointing inwards.
    ///
    /// Corners built from them run clockwise seen from outside, which is what
    /// [`Mesh::add_face`](crate::scene::Mesh::add_face) expects.
    fn tangents(&self) -> (Vec3, Vec3) {
        match self {
            Direction::Down => (Vec3::Z, Vec3::X),
            Direction::Up => (Vec3::X, Vec3::Z),
            Direction::North => (Vec3::X, Vec3::Y),
            Direction::South => (Vec3::Y, Vec3::X),
            Direction::West => (Vec3::Y, Vec3::Z),
            Direction::East => (Vec3::Z, Vec3::Y),
        }
    }

    /// Corners of this face for a cube of edge `size` centered on `center`.
    pub fn face_corners(&self, center: [f32; 3], size: f32) -> [[f32; 3]; 4] {
        let half = size * 0.5;
        let (a, b) = self.tangents();
        let origin = Vec3::from(center) + Vec3::from(self.normal()) * half - (a + b) * half;
        let a = a * size;
        let b = b * size;
        [
            origin.to_array(),
            (origin + a).to_array(),
            (origin + a + b).to_array(),
            (origin + b).to_array(),
        ]
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Down => write!(f, "down"),
            Direction::Up => write!(f, "up"),
            Direction::North => write!(f, "north"),
            Direction::South => write!(f, "south"),
            Direction::West => write!(f, "west"),
            Direction::East => write!(f, "east"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_corners_lie_on_face() {
        for dir in Direction::ALL {
            let n = Vec3::from(dir.normal());
            for corner in dir.face_corners([1.0, 2.0, 3.0], 2.0) {
                let offset = Vec3::from(corner) - Vec3::new(1.0, 2.0, 3.0);
                assert!((offset.dot(n) - 1.0).abs() < 1e-6, "{} corner off face", dir);
            }
        }
    }

    #[test]
    fn test_winding_matches_normal() {
        // add_face emits (0, 2, 1): its geometric normal must match the face normal
        for dir in Direction::ALL {
            let [c0, c1, c2, _] = dir.face_corners([0.0; 3], 1.0);
            let (c0, c1, c2) = (Vec3::from(c0), Vec3::from(c1), Vec3::from(c2));
            let n = (c2 - c0).cross(c1 - c0).normalize();
            assert!(n.abs_diff_eq(Vec3::from(dir.normal()), 1e-6), "{} wound backwards", dir);
        }
    }
}
