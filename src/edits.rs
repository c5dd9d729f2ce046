//! Structural edit operations.
//!
//! `apply_edit` is the only mutation entry point into a built tree. Every
//! operation validates fully before touching anything, so a rejected edit
//! leaves the tree unchanged. A successful edit re-splices the segment
//! chains around the edited child, re-derives the boundary tables of the
//! target and all its ancestors, and drops their cached bounds.

use crate::connectors::Connectors;
use crate::definition::PartitionDef;
use crate::model::{PartitionId, SegmentId};
use crate::partition::PartitionKind;
use crate::Diagram;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("partition {0} does not exist")]
    UnknownPartition(PartitionId),
    #[error("partition {0} is not a composite")]
    NotComposite(PartitionId),
    #[error("child index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("replacement covers {got} pairs, the removed section covers {expected}")]
    PairCountMismatch { expected: usize, got: usize },
}

#[derive(Clone, Debug)]
pub enum EditOp {
    Insert { index: usize, def: PartitionDef },
    Delete { index: usize },
    Replace { index: usize, def: PartitionDef },
}

impl Diagram {
    /// Apply one structural edit to the children of `target`.
    ///
    /// All-or-nothing: on `Err` the tree, its connector tables and its
    /// cached bounds are exactly as before the call.
    pub fn apply_edit(&mut self, target: PartitionId, op: EditOp) -> Result<(), EditError> {
        let node = self
            .partition(target)
            .ok_or(EditError::UnknownPartition(target))?;
        let comp = node
            .as_composite()
            .ok_or(EditError::NotComposite(target))?;
        let len = comp.children.len();
        match op {
            EditOp::Insert { index, def } => {
                if index > len {
                    return Err(EditError::IndexOutOfRange { index, len });
                }
                log::debug!("insert child at {index} of partition {target}");
                self.insert_child(target, index, &def);
            }
            EditOp::Delete { index } => {
                if index >= len {
                    return Err(EditError::IndexOutOfRange { index, len });
                }
                log::debug!("delete child {index} of partition {target}");
                self.delete_child(target, index);
            }
            EditOp::Replace { index, def } => {
                if index >= len {
                    return Err(EditError::IndexOutOfRange { index, len });
                }
                let old = comp.children[index];
                let expected = self.node(old).pair_range.count;
                let got = def.pair_count();
                if got != expected {
                    return Err(EditError::PairCountMismatch { expected, got });
                }
                log::debug!("replace child {index} of partition {target}");
                self.replace_child(target, index, &def);
            }
        }
        Ok(())
    }

    fn insert_child(&mut self, parent: PartitionId, index: usize, def: &PartitionDef) {
        let child = self.build_partition(def);
        self.node_mut(child).parent = Some(parent);
        self.weave_in(parent, index, child);
        let PartitionKind::Composite(comp) = &mut self.node_mut(parent).kind else {
            unreachable!()
        };
        comp.children.insert(index, child);
        self.refresh_upward(parent);
    }

    fn delete_child(&mut self, parent: PartitionId, index: usize) {
        let child = {
            let comp = self.node(parent).as_composite().expect("validated");
            comp.children[index]
        };
        let removed = self.node(child).pair_range;
        let pc = self.node(child).pair_connectors().cloned();
        let tc = self.node(child).thread_connectors().cloned();

        // cut the child out of its chains and close the gaps it leaves
        for conn in [pc, tc].into_iter().flatten() {
            let (ups, dns) = self.detach_child_edges(&conn);
            for (up, down) in ups.into_iter().zip(dns) {
                if let (Some(up), Some(down)) = (up, down) {
                    self.connect_segments(up, down);
                }
            }
        }

        let PartitionKind::Composite(comp) = &mut self.node_mut(parent).kind else {
            unreachable!()
        };
        comp.children.remove(index);
        let followers: Vec<PartitionId> = comp.children[index..].to_vec();
        // sections laid out past the removed slice move down; chained
        // sections sharing its slots keep their place
        for sib in followers {
            let range = &mut self.node_mut(sib).pair_range;
            if range.start >= removed.end() {
                range.start -= removed.count;
            }
        }
        self.free_subtree(child);
        self.refresh_upward(parent);
    }

    fn replace_child(&mut self, parent: PartitionId, index: usize, def: &PartitionDef) {
        let old = {
            let comp = self.node(parent).as_composite().expect("validated");
            comp.children[index]
        };
        let offset = self.node(old).pair_range.start;
        let pc = self.node(old).pair_connectors().cloned();
        let tc = self.node(old).thread_connectors().cloned();
        let pair_edges = pc.map(|c| self.detach_child_edges(&c));
        let thread_edges = tc.map(|c| self.detach_child_edges(&c));
        self.free_subtree(old);

        let child = self.build_partition(def);
        self.node_mut(child).parent = Some(parent);
        // the replacement takes over the removed section's slice
        self.node_mut(child).pair_range.start = offset;
        let new_pc = self.node(child).pair_connectors().cloned();
        let new_tc = self.node(child).thread_connectors().cloned();
        if let (Some(conn), Some((ups, dns))) = (new_pc, pair_edges) {
            self.attach_edges(&conn, &ups, &dns);
        }
        if let (Some(conn), Some((ups, dns))) = (new_tc, thread_edges) {
            self.attach_edges(&conn, &ups, &dns);
        }

        let PartitionKind::Composite(comp) = &mut self.node_mut(parent).kind else {
            unreachable!()
        };
        comp.children[index] = child;
        self.refresh_upward(parent);
    }

    /// Splice a freshly built child into the chains crossing its slots:
    /// links between the surrounding siblings are cut where the child
    /// interposes, then rejoined through it.
    fn weave_in(&mut self, parent: PartitionId, index: usize, child: PartitionId) {
        let len = self.node(parent).as_composite().expect("validated").children.len();
        let (pre_pairs, pre_threads) = self.assemble_slice(parent, 0, index, true);
        let (suf_pairs, suf_threads) = self.assemble_slice(parent, index, len, false);
        let offset = self.node(child).pair_range.start;
        let pc = self.node(child).pair_connectors().cloned();
        let tc = self.node(child).thread_connectors().cloned();
        if let Some(conn) = pc {
            self.weave_space(&pre_pairs, &suf_pairs, &conn, offset);
        }
        if let Some(conn) = tc {
            self.weave_space(&pre_threads, &suf_threads, &conn, offset * 2);
        }
    }

    fn weave_space(
        &mut self,
        prefix: &Connectors,
        suffix: &Connectors,
        child: &Connectors,
        base: usize,
    ) {
        for i in 0..child.len() {
            let slot = base + i;
            if let (Some(up), Some(cin)) = (prefix.out_at(slot), child.in_at(i)) {
                if self.seg(up).next.is_some() {
                    self.disconnect_end(up);
                }
                self.connect_segments(up, cin);
            }
            if let (Some(cout), Some(down)) = (child.out_at(i), suffix.in_at(slot)) {
                if self.seg(down).prev.is_none() {
                    self.connect_segments(cout, down);
                }
            }
        }
    }

    /// Boundary tables of a contiguous run of children (optionally seeded
    /// with the composite's own pair chains), derived without touching
    /// segment links.
    fn assemble_slice(
        &self,
        parent: PartitionId,
        from: usize,
        to: usize,
        with_chains: bool,
    ) -> (Connectors, Connectors) {
        let node = self.node(parent);
        let comp = node.as_composite().expect("validated");
        let total = node.pair_range.count;
        let mut pairs = Connectors::new(total);
        let mut threads = Connectors::new(total * 2);
        if with_chains {
            for chain in &comp.pair_chains {
                pairs.set_in(chain.slot, chain.segments.first().copied());
                pairs.set_out(chain.slot, chain.segments.last().copied());
            }
        }
        for &child in &comp.children[from..to] {
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

    /// Record the external neighbor at every boundary end of a child, then
    /// cut all of those links. Out ends are cut first so each detached
    /// downstream run takes its style copy before the child's own runs do.
    fn detach_child_edges(
        &mut self,
        conn: &Connectors,
    ) -> (Vec<Option<SegmentId>>, Vec<Option<SegmentId>>) {
        let n = conn.len();
        let mut ups = vec![None; n];
        let mut dns = vec![None; n];
        for i in 0..n {
            if let Some(cout) = conn.out_at(i) {
                dns[i] = self.seg(cout).next;
            }
            if let Some(cin) = conn.in_at(i) {
                ups[i] = self.seg(cin).prev;
            }
        }
        for i in 0..n {
            if let Some(cout) = conn.out_at(i) {
                self.disconnect_end(cout);
            }
        }
        for i in 0..n {
            if let Some(cin) = conn.in_at(i) {
                self.disconnect_start(cin);
            }
        }
        (ups, dns)
    }

    fn attach_edges(
        &mut self,
        conn: &Connectors,
        ups: &[Option<SegmentId>],
        dns: &[Option<SegmentId>],
    ) {
        for i in 0..conn.len() {
            if let (Some(up), Some(cin)) = (ups.get(i).copied().flatten(), conn.in_at(i)) {
                self.connect_segments(up, cin);
            }
            if let (Some(cout), Some(down)) = (conn.out_at(i), dns.get(i).copied().flatten()) {
                if self.seg(down).prev.is_none() {
                    self.connect_segments(cout, down);
                }
            }
        }
    }

    /// Free a detached subtree: its partitions, their segments, and the
    /// style slots that are exclusively theirs after detaching.
    fn free_subtree(&mut self, root: PartitionId) {
        let mut stack = vec![root];
        let mut styles = HashSet::new();
        while let Some(id) = stack.pop() {
            self.bounds_cache.get_mut().remove(&id);
            let node = self.partitions[id as usize]
                .take()
                .expect("freeing a partition twice");
            match node.kind {
                PartitionKind::Switch(sw) => {
                    styles.insert(self.free_segment(sw.front));
                    styles.insert(self.free_segment(sw.back));
                }
                PartitionKind::Pin(_) => {}
                PartitionKind::Composite(comp) => {
                    for chain in comp.pair_chains {
                        for seg in chain.segments {
                            styles.insert(self.free_segment(seg));
                        }
                    }
                    stack.extend(comp.children);
                }
            }
        }
        for style in styles {
            self.free_style(style);
        }
    }

    /// After a structural change below `from`: recompute pair spans and
    /// boundary tables for the edited composite and every ancestor, and
    /// drop their cached bounds. Descendants keep theirs.
    fn refresh_upward(&mut self, from: PartitionId) {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let span = self.span_of(id);
            self.node_mut(id).pair_range.count = span;
            let (pairs, threads) = self.derive_connectors(id);
            let PartitionKind::Composite(comp) = &mut self.node_mut(id).kind else {
                unreachable!()
            };
            comp.pairs = pairs;
            comp.threads = threads;
            self.bounds_cache.get_mut().remove(&id);
            cur = self.node(id).parent;
        }
    }
}
