//! The partition tree: leaf crossings, pins and composite sections.
//!
//! A diagram is a tree of partitions. Leaves are the atomic crossings
//! (cross, twist) and pins; composites own an ordered child list plus the
//! boundary connector tables derived from it. Children sit at declared
//! pair offsets inside the parent: children sharing slots chain their
//! segments end to end, children on disjoint slots sit side by side.

use crate::connectors::Connectors;
use crate::model::{Curve, PairRange, PartitionId, Point, SegmentId, SegmentStyle, ThreadStyle};
use crate::Diagram;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchKind {
    Cross,
    Twist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeKind {
    Group,
    Stitch,
    Diagram,
}

/// An atomic crossing of the two threads in one pair slot.
///
/// Front and back are the segment drawn over resp. under; which of the two
/// receives the left incoming thread is what distinguishes a cross from a
/// twist.
#[derive(Clone, Debug)]
pub struct SwitchPart {
    pub kind: SwitchKind,
    pub front: SegmentId,
    pub back: SegmentId,
    pub(crate) threads: Connectors,
}

/// Zero-width terminal anchor; threads and pairs route around it.
#[derive(Clone, Debug)]
pub struct PinPart {
    pub position: Point,
}

/// One pair-level curve chain a stitch draws, claiming one slot.
#[derive(Clone, Debug)]
pub struct PairChain {
    pub slot: usize,
    pub segments: Vec<SegmentId>,
}

#[derive(Clone, Debug)]
pub struct CompositePart {
    pub kind: CompositeKind,
    pub(crate) children: Vec<PartitionId>,
    pub(crate) pair_chains: Vec<PairChain>,
    pub(crate) pairs: Connectors,
    pub(crate) threads: Connectors,
}

impl CompositePart {
    pub fn children(&self) -> &[PartitionId] {
        &self.children
    }
}

#[derive(Clone, Debug)]
pub enum PartitionKind {
    Switch(SwitchPart),
    Pin(PinPart),
    Composite(CompositePart),
}

/// A section of the diagram, leaf or composite.
#[derive(Clone, Debug)]
pub struct PartitionNode {
    pub visible: bool,
    pub source_id: Option<String>,
    pub caption: Option<String>,
    pub(crate) pair_range: PairRange,
    pub(crate) parent: Option<PartitionId>,
    pub kind: PartitionKind,
}

impl PartitionNode {
    pub fn nr_of_pairs(&self) -> usize {
        self.pair_range.count
    }

    pub fn pair_range(&self) -> PairRange {
        self.pair_range
    }

    pub fn parent(&self) -> Option<PartitionId> {
        self.parent
    }

    pub fn as_composite(&self) -> Option<&CompositePart> {
        match &self.kind {
            PartitionKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_switch(&self) -> Option<&SwitchPart> {
        match &self.kind {
            PartitionKind::Switch(s) => Some(s),
            _ => None,
        }
    }

    /// Boundary table of open pair ends, if this partition has one.
    pub fn pair_connectors(&self) -> Option<&Connectors> {
        match &self.kind {
            PartitionKind::Composite(c) => Some(&c.pairs),
            _ => None,
        }
    }

    /// Boundary table of open thread ends, if this partition has one.
    pub fn thread_connectors(&self) -> Option<&Connectors> {
        match &self.kind {
            PartitionKind::Switch(s) => Some(&s.threads),
            PartitionKind::Composite(c) => Some(&c.threads),
            PartitionKind::Pin(_) => None,
        }
    }
}

impl Diagram {
    pub(crate) fn node(&self, id: PartitionId) -> &PartitionNode {
        self.partitions[id as usize]
            .as_ref()
            .expect("dangling partition handle")
    }

    pub(crate) fn node_mut(&mut self, id: PartitionId) -> &mut PartitionNode {
        self.partitions[id as usize]
            .as_mut()
            .expect("dangling partition handle")
    }

    fn push_node(&mut self, node: PartitionNode) -> PartitionId {
        let id = self.partitions.len() as PartitionId;
        self.partitions.push(Some(node));
        id
    }

    /// Create a crossing at pair slot `pair`, with two fresh thread
    /// segments carrying default thread styles.
    pub(crate) fn new_switch(
        &mut self,
        kind: SwitchKind,
        pair: usize,
        front_curve: Curve,
        back_curve: Curve,
        visible: bool,
        source_id: Option<String>,
        caption: Option<String>,
    ) -> PartitionId {
        let front = self.new_segment(front_curve, SegmentStyle::Thread(ThreadStyle::default()));
        let back = self.new_segment(back_curve, SegmentStyle::Thread(ThreadStyle::default()));
        let mut threads = Connectors::new(2);
        // Both threads change sides; a cross leads the left thread over
        // the right, a twist the right over the left.
        let (left_in, right_in) = match kind {
            SwitchKind::Cross => (front, back),
            SwitchKind::Twist => (back, front),
        };
        threads.set_in(0, Some(left_in));
        threads.set_in(1, Some(right_in));
        threads.set_out(0, Some(right_in));
        threads.set_out(1, Some(left_in));
        self.push_node(PartitionNode {
            visible,
            source_id,
            caption,
            pair_range: PairRange::new(pair, 1),
            parent: None,
            kind: PartitionKind::Switch(SwitchPart {
                kind,
                front,
                back,
                threads,
            }),
        })
    }

    pub(crate) fn new_pin(
        &mut self,
        position: Point,
        visible: bool,
        source_id: Option<String>,
        caption: Option<String>,
    ) -> PartitionId {
        self.push_node(PartitionNode {
            visible,
            source_id,
            caption,
            pair_range: PairRange::new(0, 0),
            parent: None,
            kind: PartitionKind::Pin(PinPart { position }),
        })
    }

    pub(crate) fn new_composite(
        &mut self,
        kind: CompositeKind,
        pair: usize,
        visible: bool,
        source_id: Option<String>,
        caption: Option<String>,
    ) -> PartitionId {
        self.push_node(PartitionNode {
            visible,
            source_id,
            caption,
            pair_range: PairRange::new(pair, 0),
            parent: None,
            kind: PartitionKind::Composite(CompositePart {
                kind,
                children: Vec::new(),
                pair_chains: Vec::new(),
                pairs: Connectors::new(0),
                threads: Connectors::new(0),
            }),
        })
    }

    /// Splice `child`'s boundary tables into the accumulated parent tables
    /// at the child's declared offset, chain-joining every pair of ends
    /// that meet.
    pub(crate) fn splice_child(
        &mut self,
        acc_pairs: &mut Connectors,
        acc_threads: &mut Connectors,
        child: PartitionId,
    ) {
        let node = self.node(child);
        let offset = node.pair_range.start;
        let pc = node.pair_connectors().cloned();
        let tc = node.thread_connectors().cloned();
        if let Some(pc) = pc {
            for (up, down) in acc_pairs.splice(&pc, offset) {
                self.connect_segments(up, down);
            }
        }
        if let Some(tc) = tc {
            for (up, down) in acc_threads.splice(&tc, offset * 2) {
                self.connect_segments(up, down);
            }
        }
    }

    /// Recompute a composite's boundary tables from its current chains and
    /// children without touching any segment link.
    pub(crate) fn derive_connectors(&self, parent: PartitionId) -> (Connectors, Connectors) {
        let node = self.node(parent);
        let comp = node
            .as_composite()
            .expect("connector derivation on a leaf");
        let total = node.pair_range.count;
        let mut pairs = Connectors::new(total);
        let mut threads = Connectors::new(total * 2);
        for chain in &comp.pair_chains {
            pairs.set_in(chain.slot, chain.segments.first().copied());
            pairs.set_out(chain.slot, chain.segments.last().copied());
        }
        for &child in &comp.children {
            let cn = self.node(child);
            let offset = cn.pair_range.start;
            if let Some(pc) = cn.pair_connectors() {
                let _ = pairs.splice(pc, offset);
            }
            if let Some(tc) = cn.thread_connectors() {
                let _ = threads.splice(tc, offset * 2);
            }
        }
        (pairs, threads)
    }

    /// Pair-index span actually claimed by a composite's chains and
    /// children.
    pub(crate) fn span_of(&self, parent: PartitionId) -> usize {
        let comp = self
            .node(parent)
            .as_composite()
            .expect("span of a leaf");
        let chains = comp
            .pair_chains
            .iter()
            .map(|c| c.slot + 1)
            .max()
            .unwrap_or(0);
        let children = comp
            .children
            .iter()
            .map(|&c| self.node(c).pair_range.end())
            .max()
            .unwrap_or(0);
        chains.max(children)
    }
}
