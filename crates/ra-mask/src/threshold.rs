//! Histogram-based automatic threshold selection.
//!
//! Levels are computed on a 256-bin histogram spanning the frame's own
//! finite min..max range, then mapped back to sample units. A degenerate
//! frame (zero intensity variance) thresholds at the uniform value itself
//! instead of failing, so every pixel lands in the foreground.

use ra_core::{BACKGROUND, FOREGROUND, Frame};

pub const HIST_BINS: usize = 256;

/// Fixed set of classical histogram threshold algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ThresholdMethod {
    #[default]
    Triangle,
    Otsu,
    IsoData,
    Mean,
}

impl ThresholdMethod {
    pub fn name(self) -> &'static str {
        match self {
            Self::Triangle => "triangle",
            Self::Otsu => "otsu",
            Self::IsoData => "isodata",
            Self::Mean => "mean",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "triangle" => Some(Self::Triangle),
            "otsu" => Some(Self::Otsu),
            "isodata" => Some(Self::IsoData),
            "mean" => Some(Self::Mean),
            _ => None,
        }
    }
}

/// Selects a threshold level in sample units for one frame.
///
/// The chosen bin belongs to the background class, so the returned level is
/// that bin's upper edge: foreground starts strictly above it.
pub fn auto_threshold(frame: &Frame<f32>, method: ThresholdMethod) -> f32 {
    let Some((hist, min, max)) = histogram256(frame) else {
        return 0.0;
    };
    if max <= min {
        // Degenerate frame: threshold at the uniform value.
        return min;
    }

    let bin = threshold_bin(&hist, method);
    min + ((bin + 1) as f32 / HIST_BINS as f32) * (max - min)
}

/// `value >= level` becomes foreground; non-finite samples stay background.
pub fn apply_threshold(frame: &Frame<f32>, level: f32) -> Frame<u8> {
    frame.map(|v| {
        if v.is_finite() && v >= level {
            FOREGROUND
        } else {
            BACKGROUND
        }
    })
}

/// 256-bin histogram over the finite samples; `None` when no finite sample
/// exists.
pub fn histogram256(frame: &Frame<f32>) -> Option<([u32; HIST_BINS], f32, f32)> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in frame.data() {
        if !v.is_finite() {
            continue;
        }
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if min > max {
        return None;
    }

    let mut hist = [0u32; HIST_BINS];
    let range = max - min;
    for &v in frame.data() {
        if !v.is_finite() {
            continue;
        }
        let bin = if range > 0.0 {
            (((v - min) / range) * (HIST_BINS - 1) as f32).round() as usize
        } else {
            0
        };
        hist[bin.min(HIST_BINS - 1)] += 1;
    }

    Some((hist, min, max))
}

fn threshold_bin(hist: &[u32; HIST_BINS], method: ThresholdMethod) -> usize {
    match method {
        ThresholdMethod::Triangle => triangle_bin(hist),
        ThresholdMethod::Otsu => otsu_bin(hist),
        ThresholdMethod::IsoData => isodata_bin(hist),
        ThresholdMethod::Mean => mean_bin(hist),
    }
}

/// Triangle method: maximize the distance between the histogram and the
/// line joining the peak with the far end of the longer tail.
fn triangle_bin(hist: &[u32; HIST_BINS]) -> usize {
    let mut first = None;
    let mut last = 0usize;
    let mut peak = 0usize;
    for (i, &h) in hist.iter().enumerate() {
        if h > 0 {
            if first.is_none() {
                first = Some(i);
            }
            last = i;
        }
        if h > hist[peak] {
            peak = i;
        }
    }
    let first = first.unwrap_or(0);
    if first == last {
        return first;
    }

    // Work on the longer tail; mirror when it lies to the left of the peak.
    let flipped = peak - first > last - peak;
    let (start, end) = if flipped { (first, peak) } else { (peak, last) };
    if start == end {
        return start;
    }

    let peak_h = hist[peak] as f64;
    let span = (end - start) as f64;
    let mut best = start;
    let mut best_dist = 0.0f64;
    for i in (start + 1)..end {
        // Perpendicular distance from (i, h[i]) to the peak-to-tail line,
        // up to a constant factor.
        let along = (i - start) as f64 / span;
        let line_h = if flipped {
            peak_h * along
        } else {
            peak_h * (1.0 - along)
        };
        let dist = line_h - hist[i] as f64;
        if dist > best_dist {
            best_dist = dist;
            best = i;
        }
    }

    best
}

/// Otsu: maximize between-class variance.
fn otsu_bin(hist: &[u32; HIST_BINS]) -> usize {
    let total: u64 = hist.iter().map(|&h| h as u64).sum();
    if total == 0 {
        return 0;
    }

    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_bg = 0.0f64;
    let mut w_bg = 0u64;
    let mut best = 0usize;
    let mut best_var = -1.0f64;
    for (i, &h) in hist.iter().enumerate() {
        w_bg += h as u64;
        if w_bg == 0 {
            continue;
        }
        let w_fg = total - w_bg;
        if w_fg == 0 {
            break;
        }

        sum_bg += i as f64 * h as f64;
        let mean_bg = sum_bg / w_bg as f64;
        let mean_fg = (sum_all - sum_bg) / w_fg as f64;
        let between = w_bg as f64 * w_fg as f64 * (mean_bg - mean_fg) * (mean_bg - mean_fg);
        if between > best_var {
            best_var = between;
            best = i;
        }
    }

    best
}

/// Iterative intermeans: repeat `t = (mean_below + mean_above) / 2`.
/// Bounded by the bin count so a non-converging histogram cannot spin.
fn isodata_bin(hist: &[u32; HIST_BINS]) -> usize {
    let mut t = HIST_BINS / 2;
    for _ in 0..HIST_BINS {
        let (mut n_lo, mut s_lo, mut n_hi, mut s_hi) = (0u64, 0.0f64, 0u64, 0.0f64);
        for (i, &h) in hist.iter().enumerate() {
            if i <= t {
                n_lo += h as u64;
                s_lo += i as f64 * h as f64;
            } else {
                n_hi += h as u64;
                s_hi += i as f64 * h as f64;
            }
        }
        if n_lo == 0 || n_hi == 0 {
            return t;
        }

        let next = ((s_lo / n_lo as f64 + s_hi / n_hi as f64) / 2.0).round() as usize;
        let next = next.min(HIST_BINS - 1);
        if next == t {
            return t;
        }
        t = next;
    }
    t
}

fn mean_bin(hist: &[u32; HIST_BINS]) -> usize {
    let total: u64 = hist.iter().map(|&h| h as u64).sum();
    if total == 0 {
        return 0;
    }
    let sum: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();
    ((sum / total as f64).floor() as usize).min(HIST_BINS - 1)
}
