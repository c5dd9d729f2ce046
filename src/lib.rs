//! In-memory model of bobbin-lace working diagrams.
//!
//! A diagram is a tree of partitions: atomic thread crossings and pins at
//! the leaves, groups and stitches above them, connected edge to edge into
//! continuous pair and thread curves. The crate owns the topology (chains,
//! shared styles, boundary connectors, bounds, structural edits) and hands
//! renderers plain drawable primitives; parsing, painting and UI live
//! outside.

pub mod connectors;
pub mod model;
pub mod partition;
pub mod geometry {
    pub mod bounds;
    pub mod cubic;
}
pub mod algorithms {
    pub mod picking;
    pub mod traversal;
}
mod chain;
pub mod definition;
mod edits;

pub use algorithms::traversal::Drawable;
pub use chain::ThreadCurves;
pub use definition::{
    DiagramDef, GroupDef, PairChainDef, PartitionDef, PinDef, StitchDef, SwitchDef,
};
pub use edits::{EditError, EditOp};
pub use geometry::bounds::Bounds;
pub use model::{
    Color, Curve, PairRange, PartitionId, Point, Segment, SegmentId, SegmentKind, SegmentStyle,
    Style, StyleId, ThreadStyle,
};
pub use partition::{
    CompositeKind, CompositePart, PairChain, PartitionKind, PartitionNode, PinPart, SwitchKind,
    SwitchPart,
};

use std::cell::RefCell;
use std::collections::HashMap;

/// The diagram: segment, style and partition pools plus the tree root.
///
/// Single-threaded; one caller serializes reads and edits. The only
/// interior mutability is the bounds cache.
pub struct Diagram {
    pub(crate) segments: Vec<Option<model::Segment>>,
    pub(crate) styles: Vec<Option<SegmentStyle>>,
    pub(crate) partitions: Vec<Option<PartitionNode>>,
    pub(crate) root: PartitionId,
    pub(crate) bounds_cache: RefCell<HashMap<PartitionId, Bounds>>,
}

impl Diagram {
    pub(crate) fn empty() -> Self {
        Diagram {
            segments: Vec::new(),
            styles: Vec::new(),
            partitions: Vec::new(),
            root: 0,
            bounds_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> PartitionId {
        self.root
    }

    pub fn partition(&self, id: PartitionId) -> Option<&PartitionNode> {
        self.partitions.get(id as usize).and_then(|n| n.as_ref())
    }

    pub fn nr_of_pairs(&self, id: PartitionId) -> usize {
        self.partition(id).map(|n| n.nr_of_pairs()).unwrap_or(0)
    }

    pub fn is_visible(&self, id: PartitionId) -> bool {
        self.partition(id).map(|n| n.visible).unwrap_or(false)
    }

    /// Show or hide a section. Hiding filters it (and everything below it)
    /// out of iteration; the structure stays.
    pub fn set_visible(&mut self, id: PartitionId, visible: bool) -> bool {
        match self.partitions.get_mut(id as usize).and_then(|n| n.as_mut()) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn caption(&self, id: PartitionId) -> Option<&str> {
        self.partition(id).and_then(|n| n.caption.as_deref())
    }

    pub fn source_id(&self, id: PartitionId) -> Option<&str> {
        self.partition(id).and_then(|n| n.source_id.as_deref())
    }

    /// Current thread styles at the partition's boundary, one entry per
    /// incoming thread slot. Empty for partitions without thread ends.
    pub fn thread_styles(&self, id: PartitionId) -> Vec<Option<ThreadStyle>> {
        let Some(conn) = self.partition(id).and_then(|n| n.thread_connectors()) else {
            return Vec::new();
        };
        conn.ins()
            .iter()
            .map(|slot| slot.and_then(|seg| self.thread_style(seg)))
            .collect()
    }

    /// Hull enclosing everything the partition draws, computed lazily and
    /// cached until a structural edit touches the partition or an
    /// ancestor. `None` for unknown ids and empty composites.
    pub fn bounds(&self, id: PartitionId) -> Option<Bounds> {
        let node = self.partition(id)?;
        if let Some(b) = self.bounds_cache.borrow().get(&id).copied() {
            return Some(b);
        }
        let computed = match &node.kind {
            PartitionKind::Switch(sw) => Some(
                Bounds::of_curve(&self.seg(sw.front).curve)
                    .merge(Bounds::of_curve(&self.seg(sw.back).curve)),
            ),
            PartitionKind::Pin(pin) => Some(Bounds::point(pin.position)),
            PartitionKind::Composite(comp) => {
                let mut acc: Option<Bounds> = None;
                for chain in &comp.pair_chains {
                    for &seg in &chain.segments {
                        acc = Bounds::union(acc, Some(Bounds::of_curve(&self.seg(seg).curve)));
                    }
                }
                for &child in &comp.children {
                    acc = Bounds::union(acc, self.bounds(child));
                }
                acc
            }
        };
        if let Some(b) = computed {
            self.bounds_cache.borrow_mut().insert(id, b);
        }
        computed
    }

    /// The crossing under (x, y), or `None` outside every hull.
    pub fn switch_at(&self, root: PartitionId, x: f32, y: f32) -> Option<PartitionId> {
        algorithms::picking::switch_at_impl(self, root, x, y)
    }

    /// Front thread segment of the crossing under (x, y).
    pub fn thread_at(&self, root: PartitionId, x: f32, y: f32) -> Option<SegmentId> {
        algorithms::picking::thread_at_impl(self, root, x, y)
    }

    /// Debug aid: panic if any chain, style or connector invariant is
    /// broken. Cheap enough for tests after every edit.
    pub fn check_invariants(&self) {
        for (i, slot) in self.segments.iter().enumerate() {
            let Some(seg) = slot else { continue };
            let id = i as SegmentId;
            if let Some(next) = seg.next {
                assert_eq!(
                    self.seg(next).prev,
                    Some(id),
                    "segment {id}: next link not mirrored"
                );
            }
            if let Some(prev) = seg.prev {
                assert_eq!(
                    self.seg(prev).next,
                    Some(id),
                    "segment {id}: prev link not mirrored"
                );
            }
            let head = self.chain_head(id);
            assert_eq!(
                seg.style,
                self.seg(head).style,
                "segment {id} strays from its run's style"
            );
            assert_eq!(
                self.style_slot(seg.style).kind(),
                seg.kind,
                "segment {id} carries a style of the wrong kind"
            );
        }
        for (i, slot) in self.partitions.iter().enumerate() {
            let Some(node) = slot else { continue };
            let id = i as PartitionId;
            if let Some(comp) = node.as_composite() {
                for &child in &comp.children {
                    assert_eq!(
                        self.node(child).parent,
                        Some(id),
                        "child {child} does not point back at {id}"
                    );
                }
                assert_eq!(
                    node.pair_range.count,
                    self.span_of(id),
                    "composite {id} has a stale pair count"
                );
                let (pairs, threads) = self.derive_connectors(id);
                assert_eq!(&pairs, &comp.pairs, "composite {id}: stale pair connectors");
                assert_eq!(
                    &threads, &comp.threads,
                    "composite {id}: stale thread connectors"
                );
            }
        }
    }
}
