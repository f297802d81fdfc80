//! Square grid sizing for the atlas.

/// The smallest square grid of tiles that holds every palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasGrid {
    dimension: usize,
    used_tiles: usize,
}

impl AtlasGrid {
    /// Size the grid for `palette_len` entries: `dimension = ceil(sqrt(palette_len))`.
    ///
    /// An empty palette yields a 0×0 grid with no tiles.
    pub fn for_palette_len(palette_len: usize) -> Self {
        Self {
            dimension: ceil_sqrt(palette_len),
            used_tiles: palette_len,
        }
    }

    /// Tiles along one edge.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Total tiles, `dimension²`.
    pub fn tile_count(&self) -> usize {
        self.dimension * self.dimension
    }

    /// Tiles holding a palette color.
    pub fn used_tiles(&self) -> usize {
        self.used_tiles
    }

    /// Unused trailing tiles, painted black.
    pub fn padding_tiles(&self) -> usize {
        self.tile_count() - self.used_tiles
    }

    pub fn is_empty(&self) -> bool {
        self.dimension == 0
    }

    /// Whether `index` names a tile of this grid (used or padding).
    pub fn contains(&self, index: usize) -> bool {
        index < self.tile_count()
    }

    /// Row-major `(col, row)` cell of a tile index.
    pub fn cell(&self, index: usize) -> Option<(usize, usize)> {
        if self.contains(index) {
            Some((index % self.dimension, index / self.dimension))
        } else {
            None
        }
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    // float sqrt can be off by one for large n
    while root * root < n {
        root += 1;
    }
    while root > 0 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_for_palette_sizes() {
        let cases = [
            (0, 0),
            (1, 1),
            (2, 2),
            (3, 2),
            (4, 2),
            (5, 3),
            (10, 4),
            (16, 4),
            (17, 5),
        ];
        for (len, dimension) in cases {
            let grid = AtlasGrid::for_palette_len(len);
            assert_eq!(grid.dimension(), dimension, "palette of {}", len);
            assert_eq!(grid.padding_tiles(), dimension * dimension - len);
        }
    }

    #[test]
    fn test_empty_grid() {
        let grid = AtlasGrid::for_palette_len(0);
        assert!(grid.is_empty());
        assert_eq!(grid.tile_count(), 0);
        assert_eq!(grid.padding_tiles(), 0);
        assert!(!grid.contains(0));
        assert_eq!(grid.cell(0), None);
    }

    #[test]
    fn test_three_colors_leave_one_padding_tile() {
        let grid = AtlasGrid::for_palette_len(3);
        assert_eq!(grid.tile_count(), 4);
        assert_eq!(grid.used_tiles(), 3);
        assert_eq!(grid.padding_tiles(), 1);
    }

    #[test]
    fn test_cells_are_row_major() {
        let grid = AtlasGrid::for_palette_len(7);
        assert_eq!(grid.dimension(), 3);
        assert_eq!(grid.cell(0), Some((0, 0)));
        assert_eq!(grid.cell(2), Some((2, 0)));
        assert_eq!(grid.cell(3), Some((0, 1)));
        assert_eq!(grid.cell(8), Some((2, 2)));
        assert_eq!(grid.cell(9), None);
    }

    #[test]
    fn test_ceil_sqrt_exhaustive_small() {
        for n in 0..10_000usize {
            let r = ceil_sqrt(n);
            assert!(r * r >= n);
            assert!(r == 0 || (r - 1) * (r - 1) < n);
        }
    }
}
