//! Foundational primitives for ratiometric time-lapse analysis.
//!
//! ## Frames and Stacks
//! Frames are owned, contiguous, row-major grids. Stacks are ordered frame
//! sequences with enforced uniform dimensions; the stack index is the
//! discrete time step. Physical calibration (pixel pitch, frame interval)
//! is never stored on the data; it travels in the analysis configuration.
//!
//! ## Border Modes
//! 1D convolution supports clamp, constant fill, and reflect-101 behavior.
//! The pipeline uses clamp (edge extension) everywhere it smooths.
//!
//! ## Binary Convention
//! Binary frames use `u8` with 255 = foreground, 0 = background.

mod algebra;
mod border;
mod conv;
mod error;
mod frame;
mod kernel;

pub use algebra::{
    BACKGROUND, FOREGROUND, divide, divide_stacks, foreground_area, symmetric_difference,
};
pub use border::{BorderMode, map_index};
pub use conv::convolve_f32;
pub use error::Error;
pub use frame::{Frame, Stack};
pub use kernel::GaussKernel1D;
