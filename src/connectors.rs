//! Boundary slot tables.
//!
//! A partition exposes its open segment ends to siblings through a fixed
//! number of ordered slots: `ins[i]` is the open start at slot `i`, `outs[i]`
//! the downstream-most open end. A composite derives its own table by
//! folding the tables of its children end to end; ends that meet a
//! neighbor become interior and leave the boundary.

use crate::model::SegmentId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connectors {
    ins: Vec<Option<SegmentId>>,
    outs: Vec<Option<SegmentId>>,
}

impl Connectors {
    pub fn new(size: usize) -> Self {
        Connectors {
            ins: vec![None; size],
            outs: vec![None; size],
        }
    }

    pub fn len(&self) -> usize {
        self.ins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ins.is_empty()
    }

    pub fn in_at(&self, slot: usize) -> Option<SegmentId> {
        self.ins.get(slot).copied().flatten()
    }

    pub fn out_at(&self, slot: usize) -> Option<SegmentId> {
        self.outs.get(slot).copied().flatten()
    }

    pub fn ins(&self) -> &[Option<SegmentId>] {
        &self.ins
    }

    pub fn outs(&self) -> &[Option<SegmentId>] {
        &self.outs
    }

    /// Number of occupied boundary slots (ins + outs).
    pub fn open_ends(&self) -> usize {
        self.ins.iter().flatten().count() + self.outs.iter().flatten().count()
    }

    pub(crate) fn set_in(&mut self, slot: usize, seg: Option<SegmentId>) {
        self.ins[slot] = seg;
    }

    pub(crate) fn set_out(&mut self, slot: usize, seg: Option<SegmentId>) {
        self.outs[slot] = seg;
    }

    /// Fold `other` into this accumulator at `slot` offset `offset`.
    ///
    /// Returns the (upstream, downstream) segment pairs whose ends met and
    /// must be chain-joined by the caller; slot bookkeeping happens here,
    /// segment links stay untouched. Where no upstream end is waiting, the
    /// incoming start becomes part of this boundary; every touched slot's
    /// out end is replaced by `other`'s so that a later sibling continues
    /// the chain at the downstream-most end.
    ///
    /// Panics when `other` does not fit at `offset`; a tree producing that
    /// call is structurally inconsistent.
    pub(crate) fn splice(
        &mut self,
        other: &Connectors,
        offset: usize,
    ) -> Vec<(SegmentId, SegmentId)> {
        assert!(
            offset + other.len() <= self.len(),
            "connector splice out of range: offset {} + size {} exceeds {}",
            offset,
            other.len(),
            self.len()
        );
        let mut joins = Vec::new();
        for i in 0..other.len() {
            let slot = offset + i;
            match (self.outs[slot], other.ins[i]) {
                (Some(up), Some(down)) => joins.push((up, down)),
                (None, Some(down)) => {
                    if self.ins[slot].is_none() {
                        self.ins[slot] = Some(down);
                    }
                }
                _ => {}
            }
            if other.ins[i].is_some() || other.outs[i].is_some() {
                self.outs[slot] = other.outs[i];
            }
        }
        joins
    }
}
