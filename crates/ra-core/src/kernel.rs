/// 1D Gaussian smoothing kernel.
///
/// Conventions:
/// - `radius = ceil(3*sigma)`, minimum 1.
/// - `g` is normalized such that `sum(g) ~= 1`, so smoothing a constant
///   signal returns the same constant (within floating tolerance).
#[derive(Debug, Clone)]
pub struct GaussKernel1D {
    pub sigma: f32,
    pub radius: usize,
    pub g: Vec<f32>,
}

impl GaussKernel1D {
    pub fn new(sigma: f32) -> Self {
        assert!(
            sigma.is_finite() && sigma > 0.0,
            "sigma must be > 0 and finite"
        );

        let radius = ((3.0 * sigma).ceil() as usize).max(1);
        let len = 2 * radius + 1;

        let sigma2 = sigma * sigma;
        let mut g = vec![0.0f32; len];
        for (i, gi) in g.iter_mut().enumerate() {
            let x = i as isize - radius as isize;
            let xf = x as f32;
            *gi = (-(xf * xf) / (2.0 * sigma2)).exp();
        }

        let sum_g: f32 = g.iter().sum();
        for gi in &mut g {
            *gi /= sum_g;
        }

        Self { sigma, radius, g }
    }
}
