//! Hit-testing against partition hulls.

use crate::model::{PartitionId, SegmentId};
use crate::partition::PartitionKind;
use crate::Diagram;

/// Find the crossing under (x, y), zooming into composite sections as long
/// as the point stays inside their hulls.
///
/// Children are scanned in reverse insertion order, so where hulls overlap
/// the last-added child wins. Pins are skipped; a containing composite is
/// entered and its answer is final. Visibility does not filter hits.
pub(crate) fn switch_at_impl(
    d: &Diagram,
    root: PartitionId,
    x: f32,
    y: f32,
) -> Option<PartitionId> {
    let comp = d.partition(root)?.as_composite()?;
    for &child in comp.children.iter().rev() {
        let Some(bounds) = d.bounds(child) else {
            continue;
        };
        if !bounds.contains(x, y) {
            continue;
        }
        match &d.node(child).kind {
            PartitionKind::Switch(_) => return Some(child),
            PartitionKind::Composite(_) => return switch_at_impl(d, child, x, y),
            PartitionKind::Pin(_) => {}
        }
    }
    None
}

/// Front thread segment of the crossing under (x, y).
pub(crate) fn thread_at_impl(
    d: &Diagram,
    root: PartitionId,
    x: f32,
    y: f32,
) -> Option<SegmentId> {
    let hit = switch_at_impl(d, root, x, y)?;
    d.node(hit).as_switch().map(|sw| sw.front)
}
