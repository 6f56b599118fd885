use ra_core::{Error, Frame, Stack};

use crate::blur::gaussian_blur;
use crate::regions::remove_small_regions;
use crate::threshold::{ThresholdMethod, apply_threshold, auto_threshold};

/// Whether the threshold level is re-detected for every frame or supplied
/// once and reused verbatim.
///
/// `Fixed` is what turns an already-quantized source (such as a distance
/// map rendered back to intensities) into a mask without per-frame
/// re-detection; `Auto` is the normal segmentation path.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ThresholdPolicy {
    Auto(ThresholdMethod),
    Fixed(f32),
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::Auto(ThresholdMethod::default())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaskConfig {
    /// Gaussian sigma applied before thresholding; 0 disables the blur.
    pub blur_sigma: f32,
    pub policy: ThresholdPolicy,
    /// Minimum connected-component area; smaller islands and holes flip.
    pub min_region: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            policy: ThresholdPolicy::default(),
            min_region: 10,
        }
    }
}

/// blur -> threshold -> small-region cleanup for a single frame.
pub fn build_mask_frame(frame: &Frame<f32>, cfg: &MaskConfig) -> Frame<u8> {
    let blurred = gaussian_blur(frame, cfg.blur_sigma);
    let level = match cfg.policy {
        ThresholdPolicy::Auto(method) => auto_threshold(&blurred, method),
        ThresholdPolicy::Fixed(level) => level,
    };
    let mask = apply_threshold(&blurred, level);
    remove_small_regions(&mask, cfg.min_region)
}

/// Per-frame mask construction over a whole stack.
pub fn build_mask(stack: &Stack<f32>, cfg: &MaskConfig) -> Result<Stack<u8>, Error> {
    if stack.is_empty() {
        return Err(Error::EmptyStack);
    }

    let mut out = Stack::new(stack.width(), stack.height());
    for frame in stack.iter() {
        out.push(build_mask_frame(frame, cfg))?;
    }
    Ok(out)
}
