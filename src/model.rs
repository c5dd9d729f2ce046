use serde::{Deserialize, Serialize};

/// Handle into the segment pool of a [`crate::Diagram`]; the id is the index.
pub type SegmentId = u32;
/// Handle into the style pool. Segments of one connected run share one id.
pub type StyleId = u32;
/// Handle into the partition pool.
pub type PartitionId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// One curve piece of a pair or thread.
///
/// With both control points present this is a cubic bezier; with both absent
/// it is a straight line. A single present control point is duplicated when
/// the curve is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub start: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c1: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c2: Option<Point>,
    pub end: Point,
}

impl Curve {
    pub fn line(start: Point, end: Point) -> Self {
        Curve {
            start,
            c1: None,
            c2: None,
            end,
        }
    }

    pub fn cubic(start: Point, c1: Point, c2: Point, end: Point) -> Self {
        Curve {
            start,
            c1: Some(c1),
            c2: Some(c2),
            end,
        }
    }

    pub fn is_line(&self) -> bool {
        self.c1.is_none() && self.c2.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }
}

/// Painting instructions for one run of segments. Width zero means the
/// curve is filled instead of stroked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    pub width: u32,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            color: Color::BLACK,
            width: 1,
        }
    }
}

/// Paint for a thread: the core line plus the wider shadow drawn under it.
///
/// The editing layer keeps the shadow at least two wider than the core; the
/// model stores whatever is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadStyle {
    pub core: Style,
    pub shadow: Style,
}

impl Default for ThreadStyle {
    fn default() -> Self {
        ThreadStyle {
            core: Style::default(),
            shadow: Style {
                color: Color::WHITE,
                width: 3,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Pair,
    Thread,
}

/// Value stored in one style pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStyle {
    Pair(Style),
    Thread(ThreadStyle),
}

impl SegmentStyle {
    pub fn kind(&self) -> SegmentKind {
        match self {
            SegmentStyle::Pair(_) => SegmentKind::Pair,
            SegmentStyle::Thread(_) => SegmentKind::Thread,
        }
    }
}

/// Node of a doubly linked curve chain. The chain itself is owned by the
/// partition tree; `prev`/`next` are pool handles, kept mutual inverses.
#[derive(Clone, Debug)]
pub struct Segment {
    pub curve: Curve,
    pub kind: SegmentKind,
    pub(crate) style: StyleId,
    pub(crate) prev: Option<SegmentId>,
    pub(crate) next: Option<SegmentId>,
}

impl Segment {
    pub fn prev(&self) -> Option<SegmentId> {
        self.prev
    }

    pub fn next(&self) -> Option<SegmentId> {
        self.next
    }
}

/// Slice of the parent's pair-index space a partition covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRange {
    pub start: usize,
    pub count: usize,
}

impl PairRange {
    pub fn new(start: usize, count: usize) -> Self {
        PairRange { start, count }
    }

    pub fn end(&self) -> usize {
        self.start + self.count
    }
}
