//! Visibility-filtered iteration over drawable primitives.
//!
//! Each call hands out a fresh lazy iterator walking the tree depth-first,
//! left to right. A partition with `visible == false` contributes nothing
//! at all, its descendants included; the structure itself stays intact.

use crate::model::{Curve, PartitionId, Point, SegmentId, SegmentStyle};
use crate::partition::PartitionKind;
use crate::Diagram;

/// One curve with the paint its run currently carries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drawable {
    pub curve: Curve,
    pub style: SegmentStyle,
}

/// Depth-first pre-order walk that prunes invisible subtrees.
pub(crate) struct VisibleWalk<'a> {
    diagram: &'a Diagram,
    stack: Vec<PartitionId>,
}

impl<'a> VisibleWalk<'a> {
    pub(crate) fn new(diagram: &'a Diagram, root: PartitionId) -> Self {
        VisibleWalk {
            diagram,
            stack: vec![root],
        }
    }
}

impl<'a> Iterator for VisibleWalk<'a> {
    type Item = PartitionId;

    fn next(&mut self) -> Option<PartitionId> {
        while let Some(id) = self.stack.pop() {
            let Some(node) = self.diagram.partition(id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if let PartitionKind::Composite(comp) = &node.kind {
                for &child in comp.children.iter().rev() {
                    self.stack.push(child);
                }
            }
            return Some(id);
        }
        None
    }
}

impl Diagram {
    fn drawable_of(&self, segment: SegmentId) -> Drawable {
        let seg = self.seg(segment);
        Drawable {
            curve: seg.curve,
            style: *self.style_slot(seg.style),
        }
    }

    /// Thread segments of every visible crossing, back before front so the
    /// front paints on top.
    pub fn threads(&self, root: PartitionId) -> impl Iterator<Item = Drawable> + '_ {
        VisibleWalk::new(self, root)
            .flat_map(move |id| match &self.node(id).kind {
                PartitionKind::Switch(sw) => [Some(sw.back), Some(sw.front)],
                _ => [None, None],
            })
            .flatten()
            .map(move |sid| self.drawable_of(sid))
    }

    /// Pair-level curves of every visible section, in drawing order.
    pub fn pairs(&self, root: PartitionId) -> impl Iterator<Item = Drawable> + '_ {
        VisibleWalk::new(self, root)
            .flat_map(move |id| match &self.node(id).kind {
                PartitionKind::Composite(comp) => comp
                    .pair_chains
                    .iter()
                    .flat_map(|chain| chain.segments.iter().copied())
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .map(move |sid| self.drawable_of(sid))
    }

    /// Positions of every visible pin.
    pub fn pins(&self, root: PartitionId) -> impl Iterator<Item = Point> + '_ {
        VisibleWalk::new(self, root).filter_map(move |id| match &self.node(id).kind {
            PartitionKind::Pin(pin) => Some(pin.position),
            _ => None,
        })
    }
}
