//! Headroom adjustment of cave noise columns.
//!
//! Where the noise barely clears the threshold, carved spaces are often a single voxel
//! tall. This pass blends the tuple of the voxels just above such a space toward the
//! tuple of its floor, so that the space grows up to one voxel above the maximum
//! extended height when the blended noise clears the threshold. Only values whose
//! outcome flips are rewritten, which makes the pass idempotent.

use super::column::NoiseColumn;
use super::params::HeadroomSettings;
use super::threshold::ThresholdTable;


/// Return true if every noise value of the tuple reaches the threshold.
#[inline]
pub fn passes(tuple: &[f64], threshold: f64) -> bool {
    tuple.iter().all(|&noise| noise >= threshold)
}

/// Check if the voxel at the given altitude would be carved with its current tuple.
#[inline]
fn passes_at(noises: &NoiseColumn, thresholds: &ThresholdTable, y: i32) -> bool {
    match (noises.get(y), thresholds.get(y)) {
        (Some(tuple), Some(threshold)) => passes(tuple, threshold),
        _ => false,
    }
}

/// Adjust the noise of the given column in place for all altitudes in `bottom..=top`.
pub fn adjust_headroom(
    noises: &mut NoiseColumn,
    thresholds: &ThresholdTable,
    settings: &HeadroomSettings,
    bottom: i32,
    top: i32,
) {

    let mut candidate = vec![0.0; noises.width()];
    let mut y = bottom;

    while y <= top {

        if !passes_at(noises, thresholds, y) {
            y += 1;
            continue;
        }

        let floor = y;

        loop {

            // Walk to the ceiling of the carved space.
            while y < top && passes_at(noises, thresholds, y + 1) {
                y += 1;
            }

            let height = y - floor + 1;
            if height > settings.max_height || y >= top {
                break;
            }

            let target = y + 1;
            let factor = if height == 1 { settings.first_factor } else { settings.second_factor };

            let Some(threshold) = thresholds.get(target) else { break };
            let Some((above, floor_tuple)) = noises.get_mut_and_ref(target, floor) else { break };

            for ((value, &above_value), &floor_value) in candidate.iter_mut().zip(above.iter()).zip(floor_tuple) {
                *value = (1.0 - factor) * above_value + factor * floor_value;
            }

            if !passes(&candidate, threshold) {
                break;
            }

            above.copy_from_slice(&candidate);
            y = target;

        }

        y += 1;

    }

}
