//! Cooperative cancellation and progress reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag a caller can raise to stop a long run early.
///
/// Work loops poll it once per unit of work (one voxel); nothing is
/// interrupted preemptively.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone of this token observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Pipeline stage being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Deduplicating voxel colors.
    Palette,
    /// Painting atlas tiles.
    Composite,
    /// Assigning tile UVs to voxels.
    Uv,
    /// Encoding and persisting the atlas.
    Write,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Palette => write!(f, "palette"),
            Stage::Composite => write!(f, "composite"),
            Stage::Uv => write!(f, "uv"),
            Stage::Write => write!(f, "write"),
        }
    }
}

/// A progress notification: `done` of `total` units finished in `stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub stage: Stage,
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// Completion ratio in `[0, 1]`; an empty stage counts as finished.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.done as f32 / self.total as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_progress_fraction() {
        let p = Progress { stage: Stage::Palette, done: 1, total: 4 };
        assert!((p.fraction() - 0.25).abs() < 1e-6);
        let empty = Progress { stage: Stage::Uv, done: 0, total: 0 };
        assert_eq!(empty.fraction(), 1.0);
    }
}
