//! Elementwise arithmetic between equal-shaped frames.
//!
//! `divide` does not special-case zero denominators: the IEEE infinity or
//! NaN propagates to downstream consumers, which skip non-finite samples
//! when summarizing. Binary frames use 0/255 with 255 = foreground.

use crate::{Error, Frame, Stack};

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Elementwise `a[p] / b[p]` into a fresh frame.
pub fn divide(a: &Frame<f32>, b: &Frame<f32>) -> Result<Frame<f32>, Error> {
    check_frames(a, b)?;

    let data = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| x / y)
        .collect();
    Frame::from_vec(a.width(), a.height(), data)
}

/// Per-frame ratio of two paired stacks after a single whole-stack shape
/// check.
pub fn divide_stacks(a: &Stack<f32>, b: &Stack<f32>) -> Result<Stack<f32>, Error> {
    a.check_paired(b)?;

    let mut out = Stack::new(a.width(), a.height());
    for (fa, fb) in a.iter().zip(b.iter()) {
        out.push(divide(fa, fb)?)?;
    }
    Ok(out)
}

/// Foreground where exactly one of the two binary inputs is foreground.
pub fn symmetric_difference(a: &Frame<u8>, b: &Frame<u8>) -> Result<Frame<u8>, Error> {
    check_frames(a, b)?;

    let data = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| {
            if (x != BACKGROUND) != (y != BACKGROUND) {
                FOREGROUND
            } else {
                BACKGROUND
            }
        })
        .collect();
    Frame::from_vec(a.width(), a.height(), data)
}

/// Number of foreground pixels in a binary frame.
pub fn foreground_area(mask: &Frame<u8>) -> usize {
    mask.data().iter().filter(|&&v| v != BACKGROUND).count()
}

fn check_frames<T, U>(a: &Frame<T>, b: &Frame<U>) -> Result<(), Error> {
    if !a.same_shape(b) {
        return Err(Error::ShapeMismatch {
            expected: (a.width(), a.height(), 1),
            actual: (b.width(), b.height(), 1),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{BACKGROUND, FOREGROUND, divide, divide_stacks, symmetric_difference};
    use crate::{Frame, Stack};

    #[test]
    fn divide_matches_pixelwise_quotient() {
        let a = Frame::from_vec(2, 2, vec![2.0f32, 4.0, 6.0, 8.0]).expect("frame");
        let b = Frame::from_vec(2, 2, vec![2.0f32, 2.0, 3.0, 4.0]).expect("frame");

        let out = divide(&a, &b).expect("same shape");
        assert_eq!(out.data(), &[1.0, 2.0, 2.0, 2.0]);
        assert_eq!(out.width(), 2);
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn divide_by_zero_propagates_nonfinite() {
        let a = Frame::from_vec(2, 1, vec![1.0f32, 0.0]).expect("frame");
        let b = Frame::from_vec(2, 1, vec![0.0f32, 0.0]).expect("frame");

        let out = divide(&a, &b).expect("same shape");
        assert!(out.data()[0].is_infinite());
        assert!(out.data()[1].is_nan());
    }

    #[test]
    fn divide_rejects_shape_mismatch() {
        let a = Frame::new_fill(2, 2, 1.0f32);
        let b = Frame::new_fill(3, 2, 1.0f32);
        assert!(divide(&a, &b).is_err());
    }

    #[test]
    fn self_difference_is_all_background() {
        let mask = Frame::from_vec(2, 2, vec![FOREGROUND, BACKGROUND, FOREGROUND, BACKGROUND])
            .expect("frame");

        let out = symmetric_difference(&mask, &mask).expect("same shape");
        assert!(out.data().iter().all(|&v| v == BACKGROUND));
    }

    #[test]
    fn difference_marks_disagreement_only() {
        let a = Frame::from_vec(2, 1, vec![FOREGROUND, BACKGROUND]).expect("frame");
        let b = Frame::from_vec(2, 1, vec![FOREGROUND, FOREGROUND]).expect("frame");

        let out = symmetric_difference(&a, &b).expect("same shape");
        assert_eq!(out.data(), &[BACKGROUND, FOREGROUND]);
    }

    #[test]
    fn stack_division_checks_shape_once() {
        let a = Stack::from_frames(vec![Frame::new_fill(4, 4, 2.0f32); 3]).expect("stack");
        let b = Stack::from_frames(vec![Frame::new_fill(4, 4, 1.0f32); 3]).expect("stack");

        let ratio = divide_stacks(&a, &b).expect("paired stacks");
        assert_eq!(ratio.len(), 3);
        assert!(
            ratio
                .iter()
                .all(|f| f.data().iter().all(|&v| v == 2.0))
        );

        let short = Stack::from_frames(vec![Frame::new_fill(4, 4, 1.0f32); 2]).expect("stack");
        assert!(divide_stacks(&a, &short).is_err());
    }
}
