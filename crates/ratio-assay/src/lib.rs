//! Umbrella crate for the `ratio-assay` workspace.
//!
//! Re-exports the foundational crates and layers the orchestrated analysis
//! pipeline and its validated configuration on top. External collaborators
//! (stack decoding, CSV/TIFF persistence, plotting) live outside; this
//! crate only ever sees numeric arrays.

pub use ra_core::*;
pub use ra_mask::*;
pub use ra_motion::*;
pub use ra_profile::*;

mod config;
mod pipeline;

pub use config::{AnalysisConfig, ReductionMode};
pub use pipeline::{Analysis, analyse};
