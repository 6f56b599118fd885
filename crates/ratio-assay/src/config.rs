use ra_core::Error;
use ra_mask::{MaskConfig, ThresholdMethod, ThresholdPolicy};
use ra_profile::DistanceBinning;
use serde::{Deserialize, Serialize};

/// Which 1D reduction drives the profile table.
///
/// The two legacy pipeline variants differed only here: plain scratch
/// assays average each column, ratiometric assays index by distance from
/// the wound edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReductionMode {
    #[default]
    DistanceIndexed,
    ColumnMean,
}

/// Caller-supplied configuration for one `analyse` invocation.
///
/// Every field is explicit; there is no ambient or static parameter state,
/// so concurrent analyses cannot interfere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Physical length per pixel.
    pub spatial_res: f32,
    /// Seconds per frame.
    pub time_res: f32,
    /// Threshold fraction of the profile range for region-width search.
    pub active_threshold: f32,
    /// Gaussian sigma for mask segmentation blur.
    pub mask_blur_radius: f32,
    /// Gaussian sigma for profile smoothing before feature search.
    pub signal_blur_radius: f32,
    /// Minimum connected-component area kept during mask cleanup.
    pub hole_size: usize,
    pub threshold_method: ThresholdMethod,
    pub reduction: ReductionMode,
    pub binning: DistanceBinning,
    /// When false the ratio and EDM stacks are dropped from the result
    /// instead of being handed to the writer.
    pub emit_stacks: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            spatial_res: 1.0,
            time_res: 1.0,
            active_threshold: 0.5,
            mask_blur_radius: 1.0,
            signal_blur_radius: 20.0,
            hole_size: 10,
            threshold_method: ThresholdMethod::default(),
            reduction: ReductionMode::default(),
            binning: DistanceBinning::default(),
            emit_stacks: false,
        }
    }
}

impl AnalysisConfig {
    /// Range checks applied once at the pipeline boundary.
    pub fn validate(&self) -> Result<(), Error> {
        check(
            "spatial_res",
            self.spatial_res,
            self.spatial_res.is_finite() && self.spatial_res > 0.0,
        )?;
        check(
            "time_res",
            self.time_res,
            self.time_res.is_finite() && self.time_res > 0.0,
        )?;
        check(
            "active_threshold",
            self.active_threshold,
            (0.0..=1.0).contains(&self.active_threshold),
        )?;
        check(
            "mask_blur_radius",
            self.mask_blur_radius,
            self.mask_blur_radius.is_finite() && self.mask_blur_radius >= 0.0,
        )?;
        check(
            "signal_blur_radius",
            self.signal_blur_radius,
            self.signal_blur_radius.is_finite() && self.signal_blur_radius >= 0.0,
        )?;
        Ok(())
    }

    pub fn mask_config(&self) -> MaskConfig {
        MaskConfig {
            blur_sigma: self.mask_blur_radius,
            policy: ThresholdPolicy::Auto(self.threshold_method),
            min_region: self.hole_size,
        }
    }
}

fn check(name: &'static str, value: f32, ok: bool) -> Result<(), Error> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            name,
            value: f64::from(value),
        })
    }
}
