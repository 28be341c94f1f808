/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Spectrum decompression.
//!
//! The sentiment spectrum is sent as three anchors: `x` at bar 0, `y` at bar
//! `i` and `z` at bar `j`, with the curve falling to zero at the last bar.
//! [`interpolate`] rebuilds all bars with Catmull-Rom segments over
//! `[0, i]`, `[i, j]` and `[j, 54]`, extrapolating the outer control points
//! linearly from the neighbouring anchors.

use crate::utils::DecodeError;

/// Number of bars in a decompressed spectrum.
pub const SPECTRUM_LEN: usize = 55;

/// Magnitude of bar 0 above which the spectrum is considered peaking.
pub const PEAKING_THRESHOLD: f64 = 0.95;

const LAST: usize = SPECTRUM_LEN - 1;

/// Expands a three-point spectrum into [`SPECTRUM_LEN`] bars.
///
/// The result passes exactly through the anchors: bar `i` is `y` and bar `j`
/// is `z`. When `i == j` the middle segment is empty and bar `j` holds `z`.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidSpectrumIndices`] unless `i <= j <= 54`.
pub fn interpolate(
    i: u8,
    j: u8,
    x: f64,
    y: f64,
    z: f64,
) -> Result<[f64; SPECTRUM_LEN], DecodeError> {
    let (i, j) = (usize::from(i), usize::from(j));
    if i > j || j > LAST {
        return Err(DecodeError::InvalidSpectrumIndices { i, j });
    }

    let mut bars = [0.0; SPECTRUM_LEN];
    let (head, middle, tail) = (i, j - i, LAST - j);

    fill_segment(
        &mut bars,
        0,
        head,
        [2.0 * x - y, x, y, extrapolate(y, z, middle, head)],
    );
    fill_segment(
        &mut bars,
        i,
        middle,
        [
            extrapolate(y, x, head, middle),
            y,
            z,
            extrapolate(z, 0.0, tail, middle),
        ],
    );
    fill_segment(
        &mut bars,
        j,
        tail,
        [extrapolate(z, y, middle, tail), z, 0.0, -z],
    );
    bars[LAST] = if tail == 0 { z } else { 0.0 };

    Ok(bars)
}

/// Display hint derived from bar 0: `1` when peaking up, `-1` when peaking
/// down, `0` otherwise.
pub fn peaking(lengths: &[f64; SPECTRUM_LEN]) -> i8 {
    if lengths[0] > PEAKING_THRESHOLD {
        1
    } else if lengths[0] < -PEAKING_THRESHOLD {
        -1
    } else {
        0
    }
}

fn fill_segment(bars: &mut [f64; SPECTRUM_LEN], start: usize, len: usize, points: [f64; 4]) {
    for offset in 0..len {
        let t = offset as f64 / len as f64;
        bars[start + offset] = catmull_rom(points, t);
    }
}

fn catmull_rom([p0, p1, p2, p3]: [f64; 4], t: f64) -> f64 {
    p1 + 0.5
        * t
        * (p2 - p0
            + t * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3 + t * (3.0 * (p1 - p2) + p3 - p0)))
}

/// Value `step` bars from `from` heading to `toward`, which lies `span` bars
/// away. A zero span has no slope; the midpoint is used.
fn extrapolate(from: f64, toward: f64, span: usize, step: usize) -> f64 {
    if span == 0 {
        return (from + toward) / 2.0;
    }
    from + (toward - from) * step as f64 / span as f64
}
