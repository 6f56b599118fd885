//! Extrema, threshold crossings and peak brackets over smoothed profiles.
//!
//! "Not found" is a valid output state, carried as `None` and written as a
//! literal marker downstream; it is never an error. Non-finite samples
//! (ratio singularities upstream) are skipped when locating extrema and
//! never count as a crossing.

use crate::smooth::smooth;

/// Fixed fractional drop used by [`find_max_and_sides`] to bracket a peak.
const PEAK_DROP_FRACTION: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrema {
    pub min_idx: usize,
    pub min_value: f32,
    pub max_idx: usize,
    pub max_value: f32,
}

/// Per-profile feature record: extrema plus the threshold-crossing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSet {
    pub min_idx: usize,
    pub min_value: f32,
    pub max_idx: usize,
    pub max_value: f32,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl FeatureSet {
    pub fn width(&self) -> Option<usize> {
        match (self.left, self.right) {
            (Some(l), Some(r)) => Some(r - l),
            _ => None,
        }
    }

    /// Extrema of `profile` plus the crossing window at the absolute level
    /// derived from the supplied reference range.
    pub fn compute(
        profile: &[f32],
        threshold_fraction: f32,
        min_value: f32,
        max_value: f32,
    ) -> Option<Self> {
        let extrema = find_extrema(profile)?;
        let (left, right) = find_region_width(profile, threshold_fraction, min_value, max_value);
        Some(Self {
            min_idx: extrema.min_idx,
            min_value: extrema.min_value,
            max_idx: extrema.max_idx,
            max_value: extrema.max_value,
            left,
            right,
        })
    }
}

/// Global extrema of one profile, skipping non-finite samples. `None` when
/// no finite sample exists.
pub fn find_extrema(profile: &[f32]) -> Option<Extrema> {
    let mut out: Option<Extrema> = None;
    for (i, &v) in profile.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match out.as_mut() {
            None => {
                out = Some(Extrema {
                    min_idx: i,
                    min_value: v,
                    max_idx: i,
                    max_value: v,
                });
            }
            Some(e) => {
                if v < e.min_value {
                    e.min_idx = i;
                    e.min_value = v;
                }
                if v > e.max_value {
                    e.max_idx = i;
                    e.max_value = v;
                }
            }
        }
    }
    out
}

/// Global min/max values across a whole table: the stable reference range
/// for thresholding every time step of a series.
pub fn find_extrema_table(table: &[Vec<f32>]) -> Option<(f32, f32)> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for row in table {
        for &v in row {
            if !v.is_finite() {
                continue;
            }
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
    }
    if min > max { None } else { Some((min, max)) }
}

/// First crossings below `min + fraction * (max - min)` scanning strictly
/// outward from the profile's own argmax; `None` for a side that reaches
/// the array boundary without crossing.
pub fn find_region_width(
    profile: &[f32],
    threshold_fraction: f32,
    min_value: f32,
    max_value: f32,
) -> (Option<usize>, Option<usize>) {
    let Some(extrema) = find_extrema(profile) else {
        return (None, None);
    };
    let level = min_value + threshold_fraction * (max_value - min_value);
    scan_outward(profile, extrema.max_idx, level)
}

/// Smooths, locates the argmax, and walks outward until the value falls to
/// or below half the peak. Returns `(center, left, right)`.
pub fn find_max_and_sides(
    profile: &[f32],
    sigma: f32,
) -> Option<(usize, Option<usize>, Option<usize>)> {
    let smoothed = smooth(profile, sigma);
    let extrema = find_extrema(&smoothed)?;
    let level = PEAK_DROP_FRACTION * extrema.max_value;
    let center = extrema.max_idx;

    let mut left = None;
    for i in (0..center).rev() {
        if smoothed[i] <= level {
            left = Some(i);
            break;
        }
    }

    let mut right = None;
    for (i, &v) in smoothed.iter().enumerate().skip(center + 1) {
        if v <= level {
            right = Some(i);
            break;
        }
    }

    Some((center, left, right))
}

/// First index on each side of `center` whose value drops below `level`.
/// NaN comparisons are false, so non-finite samples never cross.
fn scan_outward(profile: &[f32], center: usize, level: f32) -> (Option<usize>, Option<usize>) {
    let mut left = None;
    for i in (0..center).rev() {
        if profile[i] < level {
            left = Some(i);
            break;
        }
    }

    let mut right = None;
    for (i, &v) in profile.iter().enumerate().skip(center + 1) {
        if v < level {
            right = Some(i);
            break;
        }
    }

    (left, right)
}

#[cfg(test)]
mod tests {
    use super::{
        FeatureSet, find_extrema, find_extrema_table, find_max_and_sides, find_region_width,
    };
    use crate::smooth::smooth;

    fn triangle_profile(len: usize, peak: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let d = peak.abs_diff(i) as f32;
                (10.0 - d).max(0.0)
            })
            .collect()
    }

    #[test]
    fn extrema_skip_nonfinite_samples() {
        let profile = [f32::NAN, 2.0, f32::INFINITY, -1.0, 5.0];
        let e = find_extrema(&profile).expect("finite samples exist");
        assert_eq!(e.min_idx, 3);
        assert_eq!(e.min_value, -1.0);
        assert_eq!(e.max_idx, 4);
        assert_eq!(e.max_value, 5.0);

        assert!(find_extrema(&[f32::NAN, f32::NAN]).is_none());
    }

    #[test]
    fn table_extrema_span_all_rows() {
        let table = vec![vec![1.0f32, 2.0], vec![f32::NAN, 7.0], vec![-3.0, 0.0]];
        assert_eq!(find_extrema_table(&table), Some((-3.0, 7.0)));
    }

    #[test]
    fn symmetric_peak_width_matches_expectation() {
        // Triangle peaking at 10.0 over a zero floor: level at fraction 0.5
        // is 5.0, crossed 6 samples either side of the peak.
        let profile = smooth(&triangle_profile(41, 20), 1.0);
        let (min, max) = find_extrema_table(&[profile.clone()]).expect("finite");

        let (left, right) = find_region_width(&profile, 0.5, min, max);
        let left = left.expect("left crossing");
        let right = right.expect("right crossing");
        let expected = 12;
        assert!(
            (right - left).abs_diff(expected) <= 1,
            "width {} vs {expected}",
            right - left
        );
    }

    #[test]
    fn flat_profile_at_peak_level_has_no_crossings() {
        let profile = vec![4.0f32; 30];
        let (left, right) = find_region_width(&profile, 0.5, 0.0, 4.0);
        assert_eq!(left, None);
        assert_eq!(right, None);
    }

    #[test]
    fn one_sided_crossing_reports_only_that_side() {
        // Monotonically rising: values left of the argmax cross, the right
        // side ends at the boundary.
        let profile: Vec<f32> = (0..20).map(|i| i as f32).collect();
        let (left, right) = find_region_width(&profile, 0.5, 0.0, 19.0);
        assert!(left.is_some());
        assert_eq!(right, None);
    }

    #[test]
    fn max_and_sides_brackets_a_peak_at_half_height() {
        let profile = triangle_profile(41, 20);
        let (center, left, right) = find_max_and_sides(&profile, 0.0).expect("finite profile");
        assert_eq!(center, 20);
        // Half peak = 5.0, reached (inclusively) 5 samples out.
        assert_eq!(left, Some(15));
        assert_eq!(right, Some(25));
    }

    #[test]
    fn feature_set_width_requires_both_sides() {
        let profile = smooth(&triangle_profile(41, 20), 1.0);
        let (min, max) = find_extrema_table(&[profile.clone()]).expect("finite");
        let features = FeatureSet::compute(&profile, 0.5, min, max).expect("finite profile");
        assert!(features.width().is_some());

        let flat = vec![1.0f32; 10];
        let features = FeatureSet::compute(&flat, 0.5, 0.0, 1.0).expect("finite profile");
        assert_eq!(features.width(), None);
    }
}
