use ra_core::{BorderMode, GaussKernel1D, convolve_f32};

/// Gaussian-smoothed copy of a profile.
///
/// Boundary samples use clamp (edge extension), the one border policy for
/// every smoothing call site in the pipeline. `sigma <= 0` returns an
/// unmodified copy; the input is never mutated.
pub fn smooth(profile: &[f32], sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 || profile.is_empty() {
        return profile.to_vec();
    }

    let kernel = GaussKernel1D::new(sigma);
    let mut out = vec![0.0f32; profile.len()];
    convolve_f32(profile, &kernel.g, kernel.radius, BorderMode::Clamp, &mut out);
    out
}

/// Smooths every time step of a profile table with the same sigma.
pub fn smooth_table(table: &[Vec<f32>], sigma: f32) -> Vec<Vec<f32>> {
    table.iter().map(|row| smooth(row, sigma)).collect()
}
