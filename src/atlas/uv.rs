//! Palette index to atlas UV mapping.
//!
//! UVs use `v = 1` for the top edge of the image, while tiles are laid out in
//! raster order with row 0 at the top, so `v` is flipped.

use super::AtlasGrid;
use crate::error::{AtlasError, Result};

/// A region within the texture atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    /// U coordinate of the left edge (0-1).
    pub u_min: f32,
    /// V coordinate of the bottom edge (0-1).
    pub v_min: f32,
    /// U coordinate of the right edge (0-1).
    pub u_max: f32,
    /// V coordinate of the top edge (0-1).
    pub v_max: f32,
}

impl AtlasRegion {
    /// Get the width of this region in UV space.
    pub fn width(&self) -> f32 {
        self.u_max - self.u_min
    }

    /// Get the height of this region in UV space.
    pub fn height(&self) -> f32 {
        self.v_max - self.v_min
    }

    /// Transform a local UV coordinate (0-1) to atlas coordinate.
    pub fn transform_uv(&self, u: f32, v: f32) -> [f32; 2] {
        [
            self.u_min + u * self.width(),
            self.v_min + v * self.height(),
        ]
    }

    pub fn center(&self) -> [f32; 2] {
        self.transform_uv(0.5, 0.5)
    }
}

/// Maps palette indices onto the tiles of an atlas grid.
#[derive(Debug, Clone, Copy)]
pub struct UvMapper {
    grid: AtlasGrid,
}

impl UvMapper {
    pub fn new(grid: AtlasGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &AtlasGrid {
        &self.grid
    }

    fn check(&self, index: usize) -> Result<(usize, usize)> {
        self.grid.cell(index).ok_or(AtlasError::ContractViolation {
            index,
            tile_count: self.grid.tile_count(),
        })
    }

    /// UV of the center of the tile for `index`.
    ///
    /// Fails with [`AtlasError::ContractViolation`] when `index` is not a tile
    /// of the grid; indices are never clamped.
    pub fn tile_center(&self, index: usize) -> Result<[f32; 2]> {
        let (col, row) = self.check(index)?;
        let tile_size = 1.0 / self.grid.dimension() as f32;
        let u = col as f32 * tile_size + tile_size / 2.0;
        let v = 1.0 - (row as f32 * tile_size + tile_size / 2.0);
        Ok([u, v])
    }

    /// UV rectangle of the tile for `index`, shrunk by `inset` tiles on every side.
    ///
    /// `inset` must lie in `[0, 0.5)`.
    pub fn tile_region(&self, index: usize, inset: f32) -> Result<AtlasRegion> {
        if !(0.0..0.5).contains(&inset) {
            return Err(AtlasError::InvalidConfiguration(format!(
                "UV inset must be in [0, 0.5), got {}",
                inset
            )));
        }
        let (col, row) = self.check(index)?;
        let tile_size = 1.0 / self.grid.dimension() as f32;
        let margin = inset * tile_size;
        let top = 1.0 - row as f32 * tile_size;

        Ok(AtlasRegion {
            u_min: col as f32 * tile_size + margin,
            v_min: top - tile_size + margin,
            u_max: (col + 1) as f32 * tile_size - margin,
            v_max: top - margin,
        })
    }

    /// Recover the `(col, row)` tile cell containing a UV coordinate.
    pub fn tile_of_uv(&self, uv: [f32; 2]) -> Option<(usize, usize)> {
        let dimension = self.grid.dimension();
        if dimension == 0 || !(0.0..=1.0).contains(&uv[0]) || !(0.0..=1.0).contains(&uv[1]) {
            return None;
        }
        let col = ((uv[0] * dimension as f32).floor() as usize).min(dimension - 1);
        let row = (((1.0 - uv[1]) * dimension as f32).floor() as usize).min(dimension - 1);
        Some((col, row))
    }
}

/// Tile-center UV for `index` on a grid `dimension` tiles wide.
pub fn tile_center_uv(index: usize, dimension: usize) -> Result<[f32; 2]> {
    let grid = AtlasGrid::for_palette_len(dimension * dimension);
    UvMapper::new(grid).tile_center(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6
    }

    #[test]
    fn test_tile_centers_on_two_by_two() {
        let mapper = UvMapper::new(AtlasGrid::for_palette_len(3));
        assert!(approx(mapper.tile_center(0).unwrap(), [0.25, 0.75]));
        assert!(approx(mapper.tile_center(1).unwrap(), [0.75, 0.75]));
        assert!(approx(mapper.tile_center(2).unwrap(), [0.25, 0.25]));
        // padding tile is still a valid target
        assert!(approx(mapper.tile_center(3).unwrap(), [0.75, 0.25]));
    }

    #[test]
    fn test_single_tile_is_image_center() {
        assert!(approx(tile_center_uv(0, 1).unwrap(), [0.5, 0.5]));
    }

    #[test]
    fn test_out_of_range_index_fails_fast() {
        let mapper = UvMapper::new(AtlasGrid::for_palette_len(3));
        match mapper.tile_center(4) {
            Err(AtlasError::ContractViolation { index, tile_count }) => {
                assert_eq!(index, 4);
                assert_eq!(tile_count, 4);
            }
            other => panic!("expected ContractViolation, got {:?}", other),
        }
        assert!(mapper.tile_region(100, 0.0).is_err());
    }

    #[test]
    fn test_empty_grid_rejects_every_index() {
        let mapper = UvMapper::new(AtlasGrid::for_palette_len(0));
        assert!(mapper.tile_center(0).is_err());
        assert_eq!(mapper.tile_of_uv([0.5, 0.5]), None);
    }

    #[test]
    fn test_uv_round_trip() {
        for dimension in 1..=9 {
            let mapper = UvMapper::new(AtlasGrid::for_palette_len(dimension * dimension));
            for i in 0..dimension * dimension {
                let uv = mapper.tile_center(i).unwrap();
                assert!((0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1]));
                assert_eq!(
                    mapper.tile_of_uv(uv),
                    Some((i % dimension, i / dimension)),
                    "index {} on {}x{}",
                    i,
                    dimension,
                    dimension
                );
            }
        }
    }

    #[test]
    fn test_region_center_matches_tile_center() {
        let mapper = UvMapper::new(AtlasGrid::for_palette_len(10));
        for i in 0..16 {
            let region = mapper.tile_region(i, 0.25).unwrap();
            assert!(approx(region.center(), mapper.tile_center(i).unwrap()));
            assert!((region.width() - 0.125).abs() < 1e-6);
            assert!((region.height() - 0.125).abs() < 1e-6);
        }
    }

    #[test]
    fn test_region_without_inset_covers_tile() {
        let mapper = UvMapper::new(AtlasGrid::for_palette_len(4));
        let region = mapper.tile_region(2, 0.0).unwrap();
        assert!(approx([region.u_min, region.v_min], [0.0, 0.0]));
        assert!(approx([region.u_max, region.v_max], [0.5, 0.5]));
    }

    #[test]
    fn test_invalid_inset_rejected() {
        let mapper = UvMapper::new(AtlasGrid::for_palette_len(4));
        assert!(mapper.tile_region(0, 0.5).is_err());
        assert!(mapper.tile_region(0, -0.1).is_err());
    }
}
