//! Whole-stack analysis pipeline.
//!
//! A sequence of whole-stack transforms: mask -> EDM -> velocity, ratio ->
//! profile table -> features. Per-frame stages fan out over the rayon pool
//! with one output slot per frame index; the stack-wide max-distance pass
//! finishes before any distance-indexed reduction starts. The run is
//! synchronous and bounded: it returns or fails as a unit.

use rayon::prelude::*;
use tracing::debug;

use ra_core::{Error, Frame, Stack, divide};
use ra_mask::{build_mask_frame, distance_map, max_distance};
use ra_motion::{VelocitySeries, estimate_velocity};
use ra_profile::{
    FeatureSet, find_extrema, find_extrema_table, find_max_and_sides, reduce_by_distance,
    reduce_columns, smooth, smooth_table,
};

use crate::config::{AnalysisConfig, ReductionMode};

/// Everything one `analyse` invocation produces; nothing outlives it except
/// what the caller persists.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Elementwise `stack1 / stack2`, present when `emit_stacks` is set.
    pub ratio: Option<Stack<f32>>,
    /// Distance map of the segmented first channel, present when
    /// `emit_stacks` is set.
    pub edm: Option<Stack<u16>>,
    /// One profile per time step, all rows equal length.
    pub profiles: Vec<Vec<f32>>,
    /// One entry per time step; `None` when a profile had no finite sample.
    pub features: Vec<Option<FeatureSet>>,
    pub velocity: VelocitySeries,
}

/// Runs the full pipeline over two paired stacks.
pub fn analyse(
    stack1: &Stack<f32>,
    stack2: &Stack<f32>,
    cfg: &AnalysisConfig,
) -> Result<Analysis, Error> {
    cfg.validate()?;
    stack1.check_paired(stack2)?;
    if stack1.is_empty() {
        return Err(Error::EmptyStack);
    }

    debug!(frames = stack1.len(), "segmenting mask stack");
    let mask_cfg = cfg.mask_config();
    let masks: Vec<Frame<u8>> = stack1
        .frames()
        .par_iter()
        .map(|frame| build_mask_frame(frame, &mask_cfg))
        .collect();
    let masks = Stack::from_frames(masks)?;

    debug!("computing distance maps");
    let edm: Vec<Frame<u16>> = masks.frames().par_iter().map(distance_map).collect();
    let edm = Stack::from_frames(edm)?;

    let velocity = estimate_velocity(&edm, cfg.spatial_res, cfg.time_res);

    debug!("computing ratio stack");
    let ratio: Vec<Frame<f32>> = stack1
        .frames()
        .par_iter()
        .zip(stack2.frames())
        .map(|(a, b)| divide(a, b))
        .collect::<Result<_, _>>()?;
    let ratio = Stack::from_frames(ratio)?;

    debug!(mode = ?cfg.reduction, "reducing frames to profiles");
    let profiles: Vec<Vec<f32>> = match cfg.reduction {
        ReductionMode::DistanceIndexed => {
            // Stack-wide statistics pass; fixes the bucket count before any
            // per-frame reduction runs.
            let max_dist = max_distance(&edm);
            ratio
                .frames()
                .par_iter()
                .zip(edm.frames())
                .map(|(frame, dist)| reduce_by_distance(frame, dist, max_dist, cfg.binning))
                .collect()
        }
        ReductionMode::ColumnMean => ratio.frames().par_iter().map(reduce_columns).collect(),
    };

    debug!("locating profile features");
    let features = find_features(&profiles, cfg);

    Ok(Analysis {
        ratio: cfg.emit_stacks.then_some(ratio),
        edm: cfg.emit_stacks.then_some(edm),
        profiles,
        features,
        velocity,
    })
}

fn find_features(profiles: &[Vec<f32>], cfg: &AnalysisConfig) -> Vec<Option<FeatureSet>> {
    match cfg.reduction {
        ReductionMode::DistanceIndexed => {
            let smoothed = smooth_table(profiles, cfg.signal_blur_radius);
            // Table-wide extrema give a stable reference range across the
            // whole series.
            let Some((min, max)) = find_extrema_table(&smoothed) else {
                return vec![None; profiles.len()];
            };
            smoothed
                .iter()
                .map(|row| FeatureSet::compute(row, cfg.active_threshold, min, max))
                .collect()
        }
        ReductionMode::ColumnMean => profiles
            .iter()
            .map(|row| {
                let (_, left, right) = find_max_and_sides(row, cfg.signal_blur_radius)?;
                let smoothed = smooth(row, cfg.signal_blur_radius);
                let extrema = find_extrema(&smoothed)?;
                Some(FeatureSet {
                    min_idx: extrema.min_idx,
                    min_value: extrema.min_value,
                    max_idx: extrema.max_idx,
                    max_value: extrema.max_value,
                    left,
                    right,
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::analyse;
    use crate::config::{AnalysisConfig, ReductionMode};
    use ra_core::{Error, Frame, Stack};

    fn constant_stack(width: usize, height: usize, frames: usize, value: f32) -> Stack<f32> {
        Stack::from_frames(vec![Frame::new_fill(width, height, value); frames]).expect("stack")
    }

    /// Left half bright (cell sheet), right half dark (wound).
    fn wound_stack(width: usize, height: usize, frames: usize) -> Stack<f32> {
        let mut data = vec![10.0f32; width * height];
        for y in 0..height {
            for x in 0..width / 2 {
                data[y * width + x] = 200.0;
            }
        }
        let frame = Frame::from_vec(width, height, data).expect("frame");
        Stack::from_frames(vec![frame; frames]).expect("stack")
    }

    #[test]
    fn constant_ratio_and_column_profile() {
        let stack1 = constant_stack(4, 4, 3, 2.0);
        let stack2 = constant_stack(4, 4, 3, 1.0);
        let cfg = AnalysisConfig {
            reduction: ReductionMode::ColumnMean,
            emit_stacks: true,
            ..AnalysisConfig::default()
        };

        let out = analyse(&stack1, &stack2, &cfg).expect("paired stacks");

        let ratio = out.ratio.expect("emit_stacks set");
        for frame in ratio.iter() {
            assert!(frame.data().iter().all(|&v| v == 2.0));
        }
        assert_eq!(out.profiles.len(), 3);
        for profile in &out.profiles {
            assert_eq!(profile, &vec![2.0, 2.0, 2.0, 2.0]);
        }
    }

    #[test]
    fn distance_indexed_profiles_share_length() {
        let stack1 = wound_stack(16, 8, 4);
        let stack2 = constant_stack(16, 8, 4, 1.0);
        let cfg = AnalysisConfig {
            emit_stacks: true,
            signal_blur_radius: 1.0,
            ..AnalysisConfig::default()
        };

        let out = analyse(&stack1, &stack2, &cfg).expect("paired stacks");

        let edm = out.edm.expect("emit_stacks set");
        let buckets = out.profiles[0].len();
        assert!(buckets > 1);
        for profile in &out.profiles {
            assert_eq!(profile.len(), buckets);
        }
        assert_eq!(out.features.len(), 4);
        assert_eq!(out.velocity.values.len(), 4);
        // Static geometry: every interior velocity is zero.
        assert_eq!(out.velocity.values[1], 0.0);
        assert_eq!(out.velocity.values[2], 0.0);
        assert!(edm.iter().any(|f| f.data().iter().any(|&v| v == 1)));
    }

    #[test]
    fn shape_mismatch_aborts_before_computation() {
        let stack1 = constant_stack(4, 4, 3, 1.0);
        let short = constant_stack(4, 4, 2, 1.0);
        let narrow = constant_stack(3, 4, 3, 1.0);

        assert!(matches!(
            analyse(&stack1, &short, &AnalysisConfig::default()),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            analyse(&stack1, &narrow, &AnalysisConfig::default()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let stack = constant_stack(4, 4, 3, 1.0);
        let cfg = AnalysisConfig {
            active_threshold: 2.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            analyse(&stack, &stack, &cfg),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn zero_denominator_does_not_crash_the_pipeline() {
        let stack1 = wound_stack(12, 6, 3);
        let stack2 = constant_stack(12, 6, 3, 0.0);
        let cfg = AnalysisConfig {
            signal_blur_radius: 1.0,
            ..AnalysisConfig::default()
        };

        let out = analyse(&stack1, &stack2, &cfg).expect("singularities propagate");
        assert!(
            out.profiles
                .iter()
                .flatten()
                .any(|v| !v.is_finite() || *v != 0.0)
        );
    }

    #[test]
    fn stacks_are_withheld_unless_requested() {
        let stack1 = wound_stack(12, 6, 3);
        let stack2 = constant_stack(12, 6, 3, 1.0);
        let out = analyse(&stack1, &stack2, &AnalysisConfig::default()).expect("paired stacks");
        assert!(out.ratio.is_none());
        assert!(out.edm.is_none());
    }
}
