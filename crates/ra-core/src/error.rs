use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Buffer length does not match the requested frame dimensions.
    SizeMismatch { expected: usize, actual: usize },
    /// Paired frames or stacks differ in pixel dimensions or frame count.
    ShapeMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
    /// An operation that needs at least one frame received none.
    EmptyStack,
    /// A configuration field failed its range check at the pipeline boundary.
    InvalidConfig { name: &'static str, value: f64 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::ShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "shape mismatch: expected {}x{}x{} frames, got {}x{}x{}",
                    expected.0, expected.1, expected.2, actual.0, actual.1, actual.2
                )
            }
            Self::EmptyStack => write!(f, "stack contains no frames"),
            Self::InvalidConfig { name, value } => {
                write!(f, "invalid configuration: {name} = {value}")
            }
        }
    }
}

impl std::error::Error for Error {}
