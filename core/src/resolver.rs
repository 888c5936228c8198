//! Final angle to winning slice.

use spinwheel_abi::Entry;
use spinwheel_lib::klog_warn;

use crate::angle::{arc_contains, circular_distance, pointer_angle, slice_center, slice_end, slice_start};
use crate::batch::CommittedBatch;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub entry: Entry,
    pub index_in_batch: usize,
}

/// Index of the slice under the pointer for `rotation` on a wheel of `count`
/// slices. `count` must be non-zero.
pub fn slice_at_pointer(rotation: f64, count: usize) -> usize {
    if count <= 1 {
        return 0;
    }
    let pointer = pointer_angle(rotation);

    let hit = (0..count).find(|&i| arc_contains(slice_start(i, count), slice_end(i, count), pointer));
    let index = hit.unwrap_or_else(|| {
        klog_warn!("resolver: no slice contains {:.6}, using nearest center", pointer);
        (0..count)
            .min_by(|&a, &b| {
                circular_distance(pointer, slice_center(a, count))
                    .total_cmp(&circular_distance(pointer, slice_center(b, count)))
            })
            .unwrap_or(0)
    });
    index % count
}

/// Winner for a frozen rotation over the batch that was on screen.
///
/// Recomputed from the angle every time; the planner's prediction is never
/// consulted. Returns `None` for an empty batch.
pub fn resolve(final_rotation: f64, batch: &CommittedBatch) -> Option<Resolution> {
    if batch.is_empty() {
        return None;
    }
    let index = slice_at_pointer(final_rotation, batch.len());
    batch.get(index).map(|entry| Resolution {
        entry: entry.clone(),
        index_in_batch: index,
    })
}
