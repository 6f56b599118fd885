use ra_core::{BorderMode, Frame, GaussKernel1D, convolve_f32};

/// Separable Gaussian blur with clamp borders.
///
/// `sigma <= 0` returns an unmodified copy. Each frame is blurred
/// independently; the input is never mutated.
pub fn gaussian_blur(frame: &Frame<f32>, sigma: f32) -> Frame<f32> {
    if sigma <= 0.0 {
        return frame.clone();
    }

    let kernel = GaussKernel1D::new(sigma);
    let width = frame.width();
    let height = frame.height();
    if width == 0 || height == 0 {
        return frame.clone();
    }

    let mut horizontal = Frame::new_fill(width, height, 0.0f32);
    for y in 0..height {
        convolve_f32(
            frame.row(y),
            &kernel.g,
            kernel.radius,
            BorderMode::Clamp,
            horizontal.row_mut(y),
        );
    }

    let mut out = horizontal.clone();
    let mut col = vec![0.0f32; height];
    let mut col_out = vec![0.0f32; height];
    for x in 0..width {
        for (y, dst) in col.iter_mut().enumerate() {
            *dst = *horizontal.get(x, y).expect("in-bounds column gather");
        }
        convolve_f32(&col, &kernel.g, kernel.radius, BorderMode::Clamp, &mut col_out);
        for (y, &v) in col_out.iter().enumerate() {
            *out.get_mut(x, y).expect("in-bounds column scatter") = v;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::gaussian_blur;
    use ra_core::Frame;

    #[test]
    fn constant_frame_is_invariant() {
        let frame = Frame::new_fill(8, 6, 3.5f32);
        let out = gaussian_blur(&frame, 2.0);
        for &v in out.data() {
            assert!((v - 3.5).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_sigma_is_identity() {
        let frame = Frame::from_vec(3, 1, vec![1.0f32, 5.0, 9.0]).expect("frame");
        assert_eq!(gaussian_blur(&frame, 0.0), frame);
    }

    #[test]
    fn blur_spreads_an_impulse_symmetrically() {
        let mut data = vec![0.0f32; 49];
        data[24] = 1.0;
        let frame = Frame::from_vec(7, 7, data).expect("frame");

        let out = gaussian_blur(&frame, 1.0);
        let center = *out.get(3, 3).expect("center");
        assert!(center > 0.0 && center < 1.0);
        let left = *out.get(2, 3).expect("left");
        let right = *out.get(4, 3).expect("right");
        let up = *out.get(3, 2).expect("up");
        assert!((left - right).abs() < 1e-6);
        assert!((left - up).abs() < 1e-6);
        assert!(center > left);
    }
}
