//! Segment chains and style propagation.
//!
//! All segments of one maximal chain share a single style slot, so painting
//! a whole thread is one write. Joining chains rebinds the downstream run
//! to the upstream style; splitting gives the detached downstream run an
//! independent copy, so the fragments stop influencing each other.

use crate::model::{
    Curve, Segment, SegmentId, SegmentKind, SegmentStyle, Style, StyleId, ThreadStyle,
};
use crate::Diagram;

impl Diagram {
    pub(crate) fn alloc_style(&mut self, style: SegmentStyle) -> StyleId {
        let id = self.styles.len() as StyleId;
        self.styles.push(Some(style));
        id
    }

    pub(crate) fn free_style(&mut self, id: StyleId) {
        self.styles[id as usize] = None;
    }

    fn clone_style(&mut self, id: StyleId) -> StyleId {
        let copy = *self.style_slot(id);
        self.alloc_style(copy)
    }

    pub(crate) fn style_slot(&self, id: StyleId) -> &SegmentStyle {
        self.styles[id as usize]
            .as_ref()
            .expect("style slot freed while referenced")
    }

    pub(crate) fn new_segment(&mut self, curve: Curve, style: SegmentStyle) -> SegmentId {
        let sid = self.alloc_style(style);
        self.new_segment_sharing(curve, style.kind(), sid)
    }

    pub(crate) fn new_segment_sharing(
        &mut self,
        curve: Curve,
        kind: SegmentKind,
        style: StyleId,
    ) -> SegmentId {
        let id = self.segments.len() as SegmentId;
        self.segments.push(Some(Segment {
            curve,
            kind,
            style,
            prev: None,
            next: None,
        }));
        id
    }

    pub(crate) fn free_segment(&mut self, id: SegmentId) -> StyleId {
        let seg = self.segments[id as usize]
            .take()
            .expect("segment freed twice");
        seg.style
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id as usize).and_then(|s| s.as_ref())
    }

    pub(crate) fn seg(&self, id: SegmentId) -> &Segment {
        self.segments[id as usize]
            .as_ref()
            .expect("dangling segment handle")
    }

    fn seg_mut(&mut self, id: SegmentId) -> &mut Segment {
        self.segments[id as usize]
            .as_mut()
            .expect("dangling segment handle")
    }

    /// Join two open chain ends; the entire downstream run takes on the
    /// upstream run's style instance.
    ///
    /// Panics when either named end is already connected or the segment
    /// kinds differ; both indicate a structurally inconsistent tree.
    pub(crate) fn connect_segments(&mut self, upstream: SegmentId, downstream: SegmentId) {
        assert_eq!(
            self.seg(upstream).kind,
            self.seg(downstream).kind,
            "cannot chain a pair segment to a thread segment"
        );
        assert!(
            self.seg(upstream).next.is_none(),
            "upstream segment {upstream} already has a successor"
        );
        assert!(
            self.seg(downstream).prev.is_none(),
            "downstream segment {downstream} already has a predecessor"
        );
        let style = self.seg(upstream).style;
        let old = self.seg(downstream).style;
        self.seg_mut(upstream).next = Some(downstream);
        self.seg_mut(downstream).prev = Some(upstream);
        self.restyle_forward(downstream, style);
        if old != style {
            self.free_style(old);
        }
    }

    /// Break the link entering `segment`; the detached run from `segment`
    /// onward gets an independent copy of the shared style. No-op when the
    /// start is already open.
    pub(crate) fn disconnect_start(&mut self, segment: SegmentId) {
        let Some(prev) = self.seg(segment).prev else {
            return;
        };
        let copy = self.clone_style(self.seg(segment).style);
        self.seg_mut(prev).next = None;
        self.seg_mut(segment).prev = None;
        self.restyle_forward(segment, copy);
        log::trace!("split chain before segment {segment}, cloned style {copy}");
    }

    /// Break the link leaving `segment`; the detached run after it gets an
    /// independent copy of the shared style. No-op when the end is open.
    pub(crate) fn disconnect_end(&mut self, segment: SegmentId) {
        let Some(next) = self.seg(segment).next else {
            return;
        };
        let copy = self.clone_style(self.seg(segment).style);
        self.seg_mut(segment).next = None;
        self.seg_mut(next).prev = None;
        self.restyle_forward(next, copy);
        log::trace!("split chain after segment {segment}, cloned style {copy}");
    }

    fn restyle_forward(&mut self, from: SegmentId, style: StyleId) {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let seg = self.seg_mut(id);
            seg.style = style;
            // a chain may close into a loop; stop after one lap
            cur = seg.next.filter(|&n| n != from);
        }
    }

    pub(crate) fn chain_head(&self, id: SegmentId) -> SegmentId {
        let mut cur = id;
        while let Some(prev) = self.seg(cur).prev {
            if prev == id {
                // closed loop, any segment serves as the head
                return id;
            }
            cur = prev;
        }
        cur
    }

    /// Every curve of the maximal chain containing `segment`, walked from
    /// the chain's head to its tail (one lap for a closed loop). Empty for
    /// a dangling handle.
    pub fn thread_curves(&self, segment: SegmentId) -> ThreadCurves<'_> {
        let head = self
            .segment(segment)
            .map(|_| self.chain_head(segment));
        ThreadCurves {
            diagram: self,
            head,
            cursor: head,
        }
    }

    /// Style pool handle a segment currently shares; equal handles mean
    /// one painted appearance.
    pub fn style_id(&self, segment: SegmentId) -> Option<StyleId> {
        self.segment(segment).map(|s| s.style)
    }

    pub fn thread_style(&self, segment: SegmentId) -> Option<ThreadStyle> {
        match self.segment(segment).map(|s| *self.style_slot(s.style)) {
            Some(SegmentStyle::Thread(t)) => Some(t),
            _ => None,
        }
    }

    /// Repaint the whole thread run containing `segment`. One write: the
    /// run shares its style slot.
    pub fn set_thread_style(&mut self, segment: SegmentId, style: ThreadStyle) -> bool {
        let Some(seg) = self.segment(segment) else {
            return false;
        };
        if seg.kind != SegmentKind::Thread {
            return false;
        }
        let sid = seg.style;
        self.styles[sid as usize] = Some(SegmentStyle::Thread(style));
        true
    }

    pub fn pair_style(&self, segment: SegmentId) -> Option<Style> {
        match self.segment(segment).map(|s| *self.style_slot(s.style)) {
            Some(SegmentStyle::Pair(s)) => Some(s),
            _ => None,
        }
    }

    pub fn set_pair_style(&mut self, segment: SegmentId, style: Style) -> bool {
        let Some(seg) = self.segment(segment) else {
            return false;
        };
        if seg.kind != SegmentKind::Pair {
            return false;
        }
        let sid = seg.style;
        self.styles[sid as usize] = Some(SegmentStyle::Pair(style));
        true
    }
}

pub struct ThreadCurves<'a> {
    diagram: &'a Diagram,
    head: Option<SegmentId>,
    cursor: Option<SegmentId>,
}

impl<'a> Iterator for ThreadCurves<'a> {
    type Item = Curve;

    fn next(&mut self) -> Option<Curve> {
        let id = self.cursor?;
        let seg = self.diagram.seg(id);
        self.cursor = seg.next.filter(|n| Some(*n) != self.head);
        Some(seg.curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, Point};

    fn thread_seg(d: &mut Diagram, x0: f32, x1: f32) -> SegmentId {
        d.new_segment(
            Curve::line(Point::new(x0, 0.0), Point::new(x1, 0.0)),
            SegmentStyle::Thread(ThreadStyle::default()),
        )
    }

    #[test]
    fn test_connect_shares_one_style() {
        let mut d = Diagram::empty();
        let a = thread_seg(&mut d, 0.0, 1.0);
        let b = thread_seg(&mut d, 1.0, 2.0);
        let c = thread_seg(&mut d, 2.0, 3.0);
        d.connect_segments(b, c);
        d.connect_segments(a, b);
        assert_eq!(d.style_id(a), d.style_id(b));
        assert_eq!(d.style_id(b), d.style_id(c));
        // one write repaints the run
        let mut red = ThreadStyle::default();
        red.core.color = Color::rgb(255, 0, 0);
        assert!(d.set_thread_style(c, red));
        assert_eq!(d.thread_style(a), Some(red));
    }

    #[test]
    fn test_disconnect_clones_for_detached_run() {
        let mut d = Diagram::empty();
        let a = thread_seg(&mut d, 0.0, 1.0);
        let b = thread_seg(&mut d, 1.0, 2.0);
        d.connect_segments(a, b);
        let shared = d.style_id(a).unwrap();
        d.disconnect_start(b);
        assert_eq!(d.style_id(a), Some(shared));
        assert_ne!(d.style_id(b), Some(shared));
        // equal values at the moment of the split, independent afterwards
        assert_eq!(d.thread_style(a), d.thread_style(b));
        let mut blue = ThreadStyle::default();
        blue.core.color = Color::rgb(0, 0, 255);
        d.set_thread_style(a, blue);
        assert_ne!(d.thread_style(b), Some(blue));
    }

    #[test]
    fn test_disconnect_open_end_is_noop() {
        let mut d = Diagram::empty();
        let a = thread_seg(&mut d, 0.0, 1.0);
        let before = d.style_id(a);
        d.disconnect_start(a);
        d.disconnect_end(a);
        assert_eq!(d.style_id(a), before);
    }

    #[test]
    fn test_thread_curves_walks_head_to_tail() {
        let mut d = Diagram::empty();
        let a = thread_seg(&mut d, 0.0, 1.0);
        let b = thread_seg(&mut d, 1.0, 2.0);
        let c = thread_seg(&mut d, 2.0, 3.0);
        d.connect_segments(a, b);
        d.connect_segments(b, c);
        // restartable, same result from any segment of the run
        for probe in [a, b, c] {
            let xs: Vec<f32> = d.thread_curves(probe).map(|c| c.start.x).collect();
            assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        }
    }

    #[test]
    #[should_panic(expected = "already has a predecessor")]
    fn test_connecting_an_occupied_end_is_fatal() {
        let mut d = Diagram::empty();
        let a = thread_seg(&mut d, 0.0, 1.0);
        let b = thread_seg(&mut d, 1.0, 2.0);
        let c = thread_seg(&mut d, 2.0, 3.0);
        d.connect_segments(a, b);
        d.connect_segments(c, b);
    }

    #[test]
    fn test_links_stay_mutual() {
        let mut d = Diagram::empty();
        let a = thread_seg(&mut d, 0.0, 1.0);
        let b = thread_seg(&mut d, 1.0, 2.0);
        d.connect_segments(a, b);
        assert_eq!(d.segment(a).unwrap().next(), Some(b));
        assert_eq!(d.segment(b).unwrap().prev(), Some(a));
        d.disconnect_end(a);
        assert_eq!(d.segment(a).unwrap().next(), None);
        assert_eq!(d.segment(b).unwrap().prev(), None);
    }
}
