//! End-to-end atlas generation.
//!
//! [`AtlasPipeline`] runs palette building, grid sizing, compositing and UV
//! assignment in order for one [`Session`], polling the session's cancellation
//! token once per voxel.

use crate::atlas::{AtlasCompositor, AtlasGrid, AtlasImage, UvMapper};
use crate::cancel::{CancellationToken, Progress, Stage};
use crate::error::{AtlasError, Completion, Result};
use crate::palette::{build_palette_cancellable, Palette};
use crate::types::{sample_colors, Voxel, VoxelSample, VoxelSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted merge threshold.
pub const MAX_THRESHOLD: u32 = 255;
/// Largest accepted tile edge in pixels.
pub const MAX_TILE_SCALE: u32 = 1024;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Colors closer than this (Chebyshev, 0-255 scale) share a palette entry.
    pub threshold: u32,
    /// Pixels per atlas tile edge.
    pub tile_scale: u32,
    /// Fraction of a tile trimmed from each side of exported face UVs.
    /// 0 collapses every face onto the tile center.
    pub uv_inset: f32,
    /// Edge length of exported voxel cubes.
    pub voxel_size: f32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            tile_scale: 10,
            uv_inset: 0.0,
            voxel_size: 1.0,
        }
    }
}

impl AtlasConfig {
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_tile_scale(mut self, tile_scale: u32) -> Self {
        self.tile_scale = tile_scale;
        self
    }

    pub fn with_uv_inset(mut self, uv_inset: f32) -> Self {
        self.uv_inset = uv_inset;
        self
    }

    pub fn with_voxel_size(mut self, voxel_size: f32) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AtlasConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value is in range. Nothing is corrected silently.
    pub fn validate(&self) -> Result<()> {
        if self.threshold > MAX_THRESHOLD {
            return Err(AtlasError::InvalidConfiguration(format!(
                "threshold must be in 0..={}, got {}",
                MAX_THRESHOLD, self.threshold
            )));
        }
        if self.tile_scale == 0 || self.tile_scale > MAX_TILE_SCALE {
            return Err(AtlasError::InvalidConfiguration(format!(
                "tile scale must be in 1..={}, got {}",
                MAX_TILE_SCALE, self.tile_scale
            )));
        }
        if !(0.0..0.5).contains(&self.uv_inset) {
            return Err(AtlasError::InvalidConfiguration(format!(
                "UV inset must be in [0, 0.5), got {}",
                self.uv_inset
            )));
        }
        if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
            return Err(AtlasError::InvalidConfiguration(format!(
                "voxel size must be positive, got {}",
                self.voxel_size
            )));
        }
        Ok(())
    }
}

/// Per-run inputs that are not configuration: the source name, where to put
/// the atlas, and the cancellation token.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    output_dir: Option<PathBuf>,
    token: CancellationToken,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_dir: None,
            token: CancellationToken::new(),
        }
    }

    /// Write the atlas PNG into `dir` at the end of the run.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Name of the atlas file: `{name}_{threshold}.png`, so runs with different
    /// thresholds do not overwrite each other.
    pub fn atlas_file_name(&self, threshold: u32) -> String {
        atlas_file_name(&self.name, threshold)
    }
}

/// Atlas file name for an object and threshold.
pub fn atlas_file_name(name: &str, threshold: u32) -> String {
    format!("{}_{}.png", file_stem(name), threshold)
}

/// Make an object name safe to use as a file stem.
pub(crate) fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim_matches(|c: char| c == '|' || c == '/' || c == '\\')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "voxels".to_string()
    } else {
        stem
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct VoxelAtlas {
    /// Source object name.
    pub name: String,
    /// Threshold the palette was built with.
    pub threshold: u32,
    /// Voxels in input order, each with its palette index set.
    pub voxels: Vec<Voxel>,
    /// Deduplicated colors; index `i` is atlas tile `i`.
    pub palette: Palette,
    pub grid: AtlasGrid,
    pub image: AtlasImage,
    /// Tile-center UV per voxel, in input order.
    pub uvs: Vec<[f32; 2]>,
    /// Where the atlas PNG was written, if it was.
    pub atlas_path: Option<PathBuf>,
}

impl VoxelAtlas {
    pub fn voxel_count(&self) -> usize {
        self.voxels.len()
    }

    pub fn uv_mapper(&self) -> UvMapper {
        UvMapper::new(self.grid)
    }

    /// `(position, palette index)` pairs for scene authoring.
    pub fn placements(&self) -> impl Iterator<Item = ([f32; 3], usize)> + '_ {
        self.voxels
            .iter()
            .filter_map(|v| v.palette_index.map(|index| (v.position, index)))
    }
}

/// Runs the palette and atlas stages with a validated configuration.
#[derive(Debug, Clone)]
pub struct AtlasPipeline {
    config: AtlasConfig,
}

impl AtlasPipeline {
    /// Create a pipeline, rejecting out-of-range configuration up front.
    pub fn new(config: AtlasConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Run on samples from any voxel source.
    pub fn run_source<S: VoxelSource + ?Sized>(
        &self,
        session: &Session,
        source: &S,
    ) -> Result<Completion<VoxelAtlas>> {
        let samples: Vec<VoxelSample> = source.iter_samples().collect();
        self.run(session, &samples)
    }

    pub fn run(&self, session: &Session, samples: &[VoxelSample]) -> Result<Completion<VoxelAtlas>> {
        self.run_with_progress(session, samples, |_| {})
    }

    /// Run the full pipeline, reporting progress through `progress`.
    ///
    /// Invalid sample colors fail before any work starts. Cancellation returns
    /// [`Completion::Cancelled`] and leaves no file behind.
    pub fn run_with_progress(
        &self,
        session: &Session,
        samples: &[VoxelSample],
        mut progress: impl FnMut(Progress),
    ) -> Result<Completion<VoxelAtlas>> {
        let token = session.token();
        let threshold = self.config.threshold;
        let colors = sample_colors(samples)?;

        log::debug!(
            "building palette for '{}' from {} voxels (threshold {})",
            session.name(),
            samples.len(),
            threshold
        );
        let assignment = match build_palette_cancellable(&colors, threshold, token, &mut progress) {
            Completion::Completed(assignment) => assignment,
            Completion::Cancelled => return Ok(Completion::Cancelled),
        };

        let grid = AtlasGrid::for_palette_len(assignment.palette.len());
        log::debug!(
            "{} palette entries on a {}x{} grid ({} padding tiles)",
            grid.used_tiles(),
            grid.dimension(),
            grid.dimension(),
            grid.padding_tiles()
        );

        if token.is_cancelled() {
            return Ok(Completion::Cancelled);
        }
        let image = AtlasCompositor::new(self.config.tile_scale)?.composite(&assignment.palette, &grid)?;
        progress(Progress { stage: Stage::Composite, done: 1, total: 1 });

        let mapper = UvMapper::new(grid);
        let total = samples.len();
        let mut voxels = Vec::with_capacity(total);
        let mut uvs = Vec::with_capacity(total);
        for (i, (sample, &index)) in samples.iter().zip(&assignment.indices).enumerate() {
            if token.is_cancelled() {
                return Ok(Completion::Cancelled);
            }
            uvs.push(mapper.tile_center(index)?);
            voxels.push(Voxel {
                palette_index: Some(index),
                ..Voxel::from(*sample)
            });
            progress(Progress { stage: Stage::Uv, done: i + 1, total });
        }

        if token.is_cancelled() {
            return Ok(Completion::Cancelled);
        }
        let atlas_path = match session.output_dir() {
            Some(_) if image.is_empty() => {
                log::warn!("'{}' has no voxels; no atlas written", session.name());
                None
            }
            Some(dir) => {
                let path = dir.join(session.atlas_file_name(threshold));
                image.write_png(&path)?;
                progress(Progress { stage: Stage::Write, done: 1, total: 1 });
                Some(path)
            }
            None => None,
        };

        Ok(Completion::Completed(VoxelAtlas {
            name: session.name().to_string(),
            threshold,
            voxels,
            palette: assignment.palette,
            grid,
            image,
            uvs,
            atlas_path,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgb8;

    fn example_samples() -> Vec<VoxelSample> {
        [
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.99, 0.01, 0.0],
            [0.0, 0.0, 1.0],
        ]
        .iter()
        .enumerate()
        .map(|(i, &color)| VoxelSample::new([i as f32, 0.0, 0.0], color))
        .collect()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AtlasConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad = [
            AtlasConfig::default().with_threshold(256),
            AtlasConfig::default().with_tile_scale(0),
            AtlasConfig::default().with_tile_scale(MAX_TILE_SCALE + 1),
            AtlasConfig::default().with_uv_inset(0.5),
            AtlasConfig::default().with_uv_inset(f32::NAN),
            AtlasConfig::default().with_voxel_size(0.0),
            AtlasConfig::default().with_voxel_size(f32::INFINITY),
        ];
        for config in bad {
            assert!(
                matches!(AtlasPipeline::new(config.clone()), Err(AtlasError::InvalidConfiguration(_))),
                "{:?} accepted",
                config
            );
        }
    }

    #[test]
    fn test_config_json_defaults() {
        let config: AtlasConfig = serde_json::from_str(r#"{ "threshold": 12 }"#).unwrap();
        assert_eq!(config.threshold, 12);
        assert_eq!(config.tile_scale, 10);
    }

    #[test]
    fn test_negative_threshold_in_json_rejected() {
        let result: std::result::Result<AtlasConfig, _> = serde_json::from_str(r#"{ "threshold": -1 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_file_name_encodes_threshold() {
        let session = Session::new("|group1|pSphere1");
        assert_eq!(session.atlas_file_name(5), "group1_pSphere1_5.png");
        assert_eq!(Session::new("").atlas_file_name(0), "voxels_0.png");
    }

    #[test]
    fn test_end_to_end_example() {
        let pipeline = AtlasPipeline::new(AtlasConfig::default().with_threshold(10)).unwrap();
        let atlas = pipeline
            .run(&Session::new("example"), &example_samples())
            .unwrap()
            .completed()
            .unwrap();

        assert_eq!(
            atlas.palette.as_slice(),
            &[Rgb8::new(255, 0, 0), Rgb8::new(0, 255, 0), Rgb8::new(0, 0, 255)]
        );
        let indices: Vec<_> = atlas.voxels.iter().map(|v| v.palette_index).collect();
        assert_eq!(indices, vec![Some(0), Some(0), Some(1), Some(0), Some(2)]);
        assert_eq!(atlas.grid.dimension(), 2);
        assert_eq!(atlas.grid.padding_tiles(), 1);
        assert_eq!(atlas.image.width, 20);
        assert_eq!(atlas.image.tile_center_pixel(1, 1), Some(Rgb8::BLACK));
        assert_eq!(atlas.uvs[3], atlas.uvs[0]);
        assert_eq!(atlas.atlas_path, None);

        let placements: Vec<_> = atlas.placements().map(|(_, i)| i).collect();
        assert_eq!(placements, vec![0, 0, 1, 0, 2]);
    }

    #[test]
    fn test_empty_input_completes_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new("empty").with_output_dir(dir.path());
        let atlas = AtlasPipeline::new(AtlasConfig::default())
            .unwrap()
            .run(&session, &[])
            .unwrap()
            .completed()
            .unwrap();
        assert!(atlas.palette.is_empty());
        assert!(atlas.grid.is_empty());
        assert!(atlas.image.is_empty());
        assert_eq!(atlas.atlas_path, None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_sample_fails_before_work() {
        let samples = vec![VoxelSample::new([0.0; 3], [0.0, 1.2, 0.0])];
        let mut calls = 0;
        let result = AtlasPipeline::new(AtlasConfig::default())
            .unwrap()
            .run_with_progress(&Session::new("bad"), &samples, |_| calls += 1);
        assert!(matches!(result, Err(AtlasError::InvalidSample { index: 0, .. })));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_progress_reports_every_stage() {
        let mut stages = Vec::new();
        AtlasPipeline::new(AtlasConfig::default())
            .unwrap()
            .run_with_progress(&Session::new("p"), &example_samples(), |p| {
                if stages.last() != Some(&p.stage) {
                    stages.push(p.stage);
                }
            })
            .unwrap();
        assert_eq!(stages, vec![Stage::Palette, Stage::Composite, Stage::Uv]);
    }

    #[test]
    fn test_cancel_during_uv_stage_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let session = Session::new("cancel")
            .with_output_dir(dir.path())
            .with_cancellation(token.clone());

        let result = AtlasPipeline::new(AtlasConfig::default())
            .unwrap()
            .run_with_progress(&session, &example_samples(), |p| {
                if p.stage == Stage::Uv {
                    token.cancel();
                }
            })
            .unwrap();

        assert!(result.is_cancelled());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let session = Session::new("early").with_cancellation(token);
        let result = AtlasPipeline::new(AtlasConfig::default())
            .unwrap()
            .run(&session, &example_samples())
            .unwrap();
        assert!(result.is_cancelled());
    }
}
