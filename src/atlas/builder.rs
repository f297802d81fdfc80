//! Atlas compositing: one flat-colored square tile per palette entry.

use super::AtlasGrid;
use crate::error::{AtlasError, Result};
use crate::palette::Palette;
use crate::types::Rgb8;
use image::ImageEncoder;
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;

/// Largest atlas edge in pixels. Bigger atlases are refused before any
/// pixel buffer is allocated.
pub const MAX_ATLAS_SIDE: u32 = 16384;

/// A composited RGB atlas image.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasImage {
    /// Width of the atlas in pixels.
    pub width: u32,
    /// Height of the atlas in pixels.
    pub height: u32,
    /// Edge length of one tile in pixels.
    pub tile_scale: u32,
    /// RGB pixel data, row 0 at the top.
    pub pixels: Vec<u8>,
}

impl AtlasImage {
    /// An image with no pixels, produced for an empty palette.
    pub fn empty(tile_scale: u32) -> Self {
        Self {
            width: 0,
            height: 0,
            tile_scale,
            pixels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 3;
        Some(Rgb8::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
        ))
    }

    /// Pixel at the center of tile `(col, row)`.
    pub fn tile_center_pixel(&self, col: u32, row: u32) -> Option<Rgb8> {
        let half = self.tile_scale / 2;
        self.get_pixel(col * self.tile_scale + half, row * self.tile_scale + half)
    }

    /// Export the atlas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(AtlasError::EmptyAtlas);
        }

        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder.write_image(
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgb8,
        )?;

        Ok(bytes)
    }

    /// Write the atlas as a PNG file.
    ///
    /// The bytes go to a temporary file next to `path` which is then renamed
    /// over it, so readers never observe a truncated image.
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let png = self.to_png()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&png)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| AtlasError::Io(e.error))?;

        log::info!(
            "wrote {}x{} atlas ({} bytes) to {}",
            self.width,
            self.height,
            png.len(),
            path.display()
        );
        Ok(())
    }
}

/// Paints palettes into atlas images.
#[derive(Debug, Clone, Copy)]
pub struct AtlasCompositor {
    tile_scale: u32,
}

impl AtlasCompositor {
    /// Create a compositor painting `tile_scale`×`tile_scale` pixels per tile.
    pub fn new(tile_scale: u32) -> Result<Self> {
        if tile_scale == 0 {
            return Err(AtlasError::InvalidConfiguration(
                "tile scale must be at least 1".to_string(),
            ));
        }
        Ok(Self { tile_scale })
    }

    pub fn tile_scale(&self) -> u32 {
        self.tile_scale
    }

    /// Paint `palette` into a square image laid out on `grid`.
    ///
    /// Tile `i` sits at `(i % dimension, i / dimension)`; tiles past the end of
    /// the palette are black. Tile rows are painted in parallel.
    pub fn composite(&self, palette: &Palette, grid: &AtlasGrid) -> Result<AtlasImage> {
        if grid.used_tiles() != palette.len() {
            return Err(AtlasError::InvalidConfiguration(format!(
                "grid sized for {} tiles but palette has {} entries",
                grid.used_tiles(),
                palette.len()
            )));
        }
        if grid.is_empty() {
            return Ok(AtlasImage::empty(self.tile_scale));
        }

        let dimension = grid.dimension();
        let scale = self.tile_scale as usize;
        let side = u32::try_from(dimension)
            .ok()
            .and_then(|d| d.checked_mul(self.tile_scale))
            .filter(|&side| side <= MAX_ATLAS_SIDE)
            .ok_or_else(|| {
                AtlasError::InvalidConfiguration(format!(
                    "{}x{} tiles at scale {} exceed the {}px atlas side limit",
                    dimension, dimension, self.tile_scale, MAX_ATLAS_SIDE
                ))
            })?;
        let row_bytes = side as usize * 3;
        let mut pixels = vec![0u8; row_bytes * side as usize];

        pixels
            .par_chunks_mut(row_bytes * scale)
            .enumerate()
            .for_each(|(tile_row, band)| {
                let mut line = Vec::with_capacity(row_bytes);
                for col in 0..dimension {
                    let color = palette
                        .get(tile_row * dimension + col)
                        .unwrap_or(Rgb8::BLACK)
                        .to_array();
                    for _ in 0..scale {
                        line.extend_from_slice(&color);
                    }
                }
                for pixel_row in band.chunks_mut(row_bytes) {
                    pixel_row.copy_from_slice(&line);
                }
            });

        Ok(AtlasImage {
            width: side,
            height: side,
            tile_scale: self.tile_scale,
            pixels,
        })
    }
}
