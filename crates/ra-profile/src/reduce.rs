//! Collapse of 2D frames into 1D profiles.
//!
//! Two reductions: per-column means for scratch-assay geometry, and
//! distance-indexed binning against an EDM frame. Distance binning keeps
//! the legacy last-write-wins rule by default (each bucket holds the value
//! of the last pixel visited at that distance in row-major raster order,
//! scaled by `1 / (width * height)`), with per-bucket averaging available
//! as an explicit alternate mode.

use ra_core::{Frame, Stack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum DistanceBinning {
    #[default]
    LastWriteWins,
    Mean,
}

/// Mean of all row values in each column; profile length = frame width.
pub fn reduce_columns(frame: &Frame<f32>) -> Vec<f32> {
    let width = frame.width();
    let height = frame.height();
    let mut sums = vec![0.0f64; width];
    for y in 0..height {
        for (sum, &v) in sums.iter_mut().zip(frame.row(y)) {
            *sum += f64::from(v);
        }
    }

    sums.iter()
        .map(|&s| {
            if height == 0 {
                0.0
            } else {
                (s / height as f64) as f32
            }
        })
        .collect()
}

/// Distance-bucket profile of length `max_dist + 1`.
///
/// `max_dist` comes from a whole-stack statistics pass so the profile
/// length is identical for every time step of a series.
pub fn reduce_by_distance(
    frame: &Frame<f32>,
    edm: &Frame<u16>,
    max_dist: u16,
    binning: DistanceBinning,
) -> Vec<f32> {
    assert!(
        frame.same_shape(edm),
        "frame and distance map must share dimensions"
    );

    let buckets = usize::from(max_dist) + 1;
    let area = (frame.width() * frame.height()) as f32;
    match binning {
        DistanceBinning::LastWriteWins => {
            let mut profile = vec![0.0f32; buckets];
            for (&v, &d) in frame.data().iter().zip(edm.data()) {
                profile[usize::from(d)] = v / area;
            }
            profile
        }
        DistanceBinning::Mean => {
            let mut sums = vec![0.0f64; buckets];
            let mut counts = vec![0u32; buckets];
            for (&v, &d) in frame.data().iter().zip(edm.data()) {
                let d = usize::from(d);
                sums[d] += f64::from(v / area);
                counts[d] += 1;
            }
            sums.iter()
                .zip(&counts)
                .map(|(&s, &c)| if c == 0 { 0.0 } else { (s / f64::from(c)) as f32 })
                .collect()
        }
    }
}

/// One profile per time step; all rows share the stack-wide bucket count.
pub fn reduce_stack_by_distance(
    stack: &Stack<f32>,
    edm_stack: &Stack<u16>,
    max_dist: u16,
    binning: DistanceBinning,
) -> Vec<Vec<f32>> {
    stack
        .iter()
        .zip(edm_stack.iter())
        .map(|(frame, edm)| reduce_by_distance(frame, edm, max_dist, binning))
        .collect()
}
