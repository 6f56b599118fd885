//! Binary mask construction and distance mapping.
//!
//! A grayscale stack becomes a cleaned binary stack via blur -> histogram
//! threshold -> symmetric small-region removal, and a binary stack becomes
//! a Euclidean distance map used both as a spatial index and as a perimeter
//! estimator.

mod blur;
mod edm;
mod mask;
mod regions;
mod threshold;

pub use blur::gaussian_blur;
pub use edm::{boundary_count, distance_map, distance_map_stack, max_distance};
pub use mask::{MaskConfig, ThresholdPolicy, build_mask, build_mask_frame};
pub use regions::remove_small_regions;
pub use threshold::{HIST_BINS, ThresholdMethod, apply_threshold, auto_threshold, histogram256};
