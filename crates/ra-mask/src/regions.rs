//! Connected-component cleanup of binary frames.
//!
//! The filter is symmetric: foreground islands and background holes below
//! the minimum area are both flipped. Components are labeled on a snapshot
//! of the input (4-connectivity), so one flip never cascades into another
//! within the same pass.

use ra_core::{BACKGROUND, FOREGROUND, Frame};

const DX: [isize; 4] = [1, -1, 0, 0];
const DY: [isize; 4] = [0, 0, 1, -1];

/// Flips every connected component (either polarity) smaller than
/// `min_size` pixels.
pub fn remove_small_regions(mask: &Frame<u8>, min_size: usize) -> Frame<u8> {
    let width = mask.width();
    let height = mask.height();
    let mut out = mask.clone();
    if min_size < 2 || width == 0 || height == 0 {
        return out;
    }

    let n = width * height;
    let mut visited = vec![false; n];
    let mut component = Vec::new();
    let mut queue = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }

        let value = mask.data()[start];
        component.clear();
        queue.clear();
        visited[start] = true;
        queue.push(start);

        while let Some(p) = queue.pop() {
            component.push(p);
            let x = (p % width) as isize;
            let y = (p / width) as isize;
            for k in 0..4 {
                let nx = x + DX[k];
                let ny = y + DY[k];
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let np = ny as usize * width + nx as usize;
                if !visited[np] && mask.data()[np] == value {
                    visited[np] = true;
                    queue.push(np);
                }
            }
        }

        if component.len() < min_size {
            let flipped = if value == BACKGROUND {
                FOREGROUND
            } else {
                BACKGROUND
            };
            for &p in &component {
                out.data_mut()[p] = flipped;
            }
        }
    }

    out
}
