//! Greedy first-fit palette builder.

use super::Palette;
use crate::cancel::{CancellationToken, Progress, Stage};
use crate::error::Completion;
use crate::types::{chebyshev_distance, Rgb8};

/// A built palette plus the palette index of every input color, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteAssignment {
    pub palette: Palette,
    pub indices: Vec<usize>,
}

/// Accumulator for palette construction.
///
/// Each pushed color is compared against the existing entries in insertion
/// order; the first entry whose Chebyshev distance is strictly below the
/// threshold wins, even if a later entry is closer. With a threshold of 0
/// nothing ever merges.
#[derive(Debug, Clone)]
pub struct PaletteBuilder {
    threshold: u32,
    palette: Palette,
    indices: Vec<usize>,
}

impl PaletteBuilder {
    /// Create a new builder with the given merge tolerance (0–255 scale).
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            palette: Palette::new(),
            indices: Vec::new(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Classify one color and return its palette index.
    pub fn push(&mut self, color: Rgb8) -> usize {
        let index = match self.find_match(color) {
            Some(index) => index,
            None => self.palette.push(color),
        };
        self.indices.push(index);
        index
    }

    fn find_match(&self, color: Rgb8) -> Option<usize> {
        self.palette
            .iter()
            .position(|entry| (chebyshev_distance(entry, color) as u32) < self.threshold)
    }

    /// Number of palette entries created so far.
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    pub fn finish(self) -> PaletteAssignment {
        PaletteAssignment {
            palette: self.palette,
            indices: self.indices,
        }
    }
}

/// Build a palette from colors in order.
pub fn build_palette(colors: impl IntoIterator<Item = Rgb8>, threshold: u32) -> PaletteAssignment {
    colors
        .into_iter()
        .fold(PaletteBuilder::new(threshold), |mut builder, color| {
            builder.push(color);
            builder
        })
        .finish()
}

/// Build a palette, polling `token` once per color and reporting progress.
///
/// On cancellation the partial palette is discarded.
pub fn build_palette_cancellable(
    colors: &[Rgb8],
    threshold: u32,
    token: &CancellationToken,
    mut progress: impl FnMut(Progress),
) -> Completion<PaletteAssignment> {
    let total = colors.len();
    let mut builder = PaletteBuilder::new(threshold);

    for (i, &color) in colors.iter().enumerate() {
        if token.is_cancelled() {
            log::debug!("palette build cancelled after {} of {} voxels", i, total);
            return Completion::Cancelled;
        }
        builder.push(color);
        progress(Progress { stage: Stage::Palette, done: i + 1, total });
    }

    Completion::Completed(builder.finish())
}
