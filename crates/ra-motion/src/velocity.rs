//! Front-velocity estimation from an evolving distance-map stack.
//!
//! Masks are rebuilt from the EDM (distance >= 1), so the estimator needs
//! no access to the original segmentation. Each interior time step compares
//! the masks one step behind and one step ahead; the changed-pixel area,
//! normalized by the boundary length of the current frame, gives the
//! instantaneous front advance.

use rayon::prelude::*;

use ra_core::{BACKGROUND, FOREGROUND, Frame, Stack, foreground_area, symmetric_difference};
use ra_mask::boundary_count;
use ra_profile::smooth;
use tracing::info;

/// Sigma for the smoothed plotting series.
const SMOOTH_SIGMA: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct VelocitySeries {
    /// One value per time step. The first is 0 by definition; the last is a
    /// copy of the second-to-last (the two-frame window has no data there).
    pub values: Vec<f32>,
    /// Gaussian-smoothed copy for downstream plotting.
    pub smoothed: Vec<f32>,
    /// Arithmetic mean of the interior values, excluding non-finite entries.
    pub mean: f32,
}

/// Instantaneous front velocity per time step.
///
/// `velocity[i] = spatial_res * area_i / (2 * perim_i * time_res)` where
/// `area_i` is the foreground count of `mask[i-1] XOR mask[i+1]` and
/// `perim_i` the boundary-pixel count of EDM frame `i`. The factor 2
/// accounts for the window spanning two frame intervals. A zero perimeter
/// produces a non-finite value that propagates but never enters the mean.
pub fn estimate_velocity(edm: &Stack<u16>, spatial_res: f32, time_res: f32) -> VelocitySeries {
    let n = edm.len();
    if n == 0 {
        return VelocitySeries {
            values: Vec::new(),
            smoothed: Vec::new(),
            mean: 0.0,
        };
    }

    let masks: Vec<Frame<u8>> = edm
        .iter()
        .map(|frame| frame.map(|d| if d >= 1 { FOREGROUND } else { BACKGROUND }))
        .collect();

    let mut values = vec![0.0f32; n];
    if n > 2 {
        let interior: Vec<f32> = (1..n - 1)
            .into_par_iter()
            .map(|i| {
                let diff = symmetric_difference(&masks[i - 1], &masks[i + 1])
                    .expect("frames in a stack share shape");
                let area = foreground_area(&diff) as f32;
                let perim = boundary_count(edm.frame(i)) as f32;
                (spatial_res * area) / (2.0 * perim * time_res)
            })
            .collect();
        values[1..n - 1].copy_from_slice(&interior);
    }
    if n > 1 {
        values[n - 1] = values[n - 2];
    }

    let interior = if n > 2 { &values[1..n - 1] } else { &[][..] };
    let finite: Vec<f32> = interior
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    let mean = if finite.is_empty() {
        0.0
    } else {
        (finite.iter().map(|&v| f64::from(v)).sum::<f64>() / finite.len() as f64) as f32
    };

    info!(mean, frames = n, "estimated mean front velocity");

    VelocitySeries {
        smoothed: smooth(&values, SMOOTH_SIGMA),
        values,
        mean,
    }
}
