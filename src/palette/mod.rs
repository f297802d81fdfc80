//! Palette deduplication.
//!
//! Voxel colors are folded, in voxelization order, into an append-only palette.
//! Each color joins the first existing entry closer than the threshold, or
//! founds a new entry. Palette indices double as atlas tile indices, so the
//! palette is never reordered.

mod builder;

pub use builder::{build_palette, build_palette_cancellable, PaletteAssignment, PaletteBuilder};

use crate::types::Rgb8;

/// An insertion-ordered list of distinct colors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Rgb8>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the color at `index`.
    pub fn get(&self, index: usize) -> Option<Rgb8> {
        self.entries.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Rgb8> + '_ {
        self.entries.iter().copied()
    }

    pub fn as_slice(&self) -> &[Rgb8] {
        &self.entries
    }

    /// Append a color and return its index.
    pub(crate) fn push(&mut self, color: Rgb8) -> usize {
        self.entries.push(color);
        self.entries.len() - 1
    }
}

impl From<Vec<Rgb8>> for Palette {
    fn from(entries: Vec<Rgb8>) -> Self {
        Self { entries }
    }
}
