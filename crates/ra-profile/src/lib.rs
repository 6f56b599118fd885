//! 1D profile reduction, smoothing and feature detection.
//!
//! Profiles index sample means either by spatial column or by distance
//! bucket. Feature search runs on smoothed copies; every "not found" is an
//! expected result carried as `None`, never an error.

mod features;
mod reduce;
mod smooth;

pub use features::{
    Extrema, FeatureSet, find_extrema, find_extrema_table, find_max_and_sides, find_region_width,
};
pub use reduce::{DistanceBinning, reduce_by_distance, reduce_columns, reduce_stack_by_distance};
pub use smooth::{smooth, smooth_table};
