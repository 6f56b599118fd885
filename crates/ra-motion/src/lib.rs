//! Kinematics of an advancing mask front.

mod velocity;

pub use velocity::{VelocitySeries, estimate_velocity};
