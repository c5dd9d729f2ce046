use torchon::{
    Color, Curve, Diagram, DiagramDef, GroupDef, PairChainDef, PartitionDef, PartitionId, PinDef,
    Point, StitchDef, SwitchDef,
};

/// Twist occupying pair slot `pair`, drawn in a 20x20 box at x = 20 * pair.
fn twist(pair: usize) -> PartitionDef {
    let x = pair as f32 * 20.0;
    PartitionDef::Twist(SwitchDef {
        pair,
        front: Curve::line(Point::new(x + 20.0, 0.0), Point::new(x, 20.0)),
        back: Curve::line(Point::new(x, 0.0), Point::new(x + 20.0, 20.0)),
        visible: true,
        id: None,
        caption: None,
    })
}

fn twist_in_box(pair: usize, x0: f32, x1: f32) -> PartitionDef {
    PartitionDef::Twist(SwitchDef {
        pair,
        front: Curve::line(Point::new(x1, 0.0), Point::new(x0, 20.0)),
        back: Curve::line(Point::new(x0, 0.0), Point::new(x1, 20.0)),
        visible: true,
        id: None,
        caption: None,
    })
}

fn group(children: Vec<PartitionDef>) -> PartitionDef {
    PartitionDef::Group(GroupDef {
        children,
        ..GroupDef::default()
    })
}

fn build(children: Vec<PartitionDef>) -> Diagram {
    Diagram::build(&DiagramDef {
        title: None,
        children,
    })
}

fn child(d: &Diagram, parent: PartitionId, index: usize) -> PartitionId {
    d.partition(parent).unwrap().as_composite().unwrap().children()[index]
}

#[test]
fn group_of_two_twists_end_to_end() {
    let mut d = build(vec![group(vec![twist(0), twist(1)])]);
    let g = child(&d, d.root(), 0);
    d.check_invariants();

    assert_eq!(d.nr_of_pairs(g), 2);
    let conn = d.partition(g).unwrap().thread_connectors().unwrap();
    assert_eq!(conn.len(), 4);

    let drawn: Vec<_> = d.threads(d.root()).collect();
    assert_eq!(drawn.len(), 4);

    // repainting the first twist's front run stays in that run
    let first = child(&d, g, 0);
    let second = child(&d, g, 1);
    let front1 = d.partition(first).unwrap().as_switch().unwrap().front;
    let front2 = d.partition(second).unwrap().as_switch().unwrap().front;
    let mut style = d.thread_style(front1).unwrap();
    style.core.color = Color::rgb(200, 0, 0);
    assert!(d.set_thread_style(front1, style));
    assert_eq!(d.thread_style(front1).unwrap().core.color, Color::rgb(200, 0, 0));
    assert_eq!(d.thread_style(front2).unwrap().core.color, Color::BLACK);
}

#[test]
fn chained_twists_share_their_runs() {
    let mut d = build(vec![group(vec![twist(0), twist(0)])]);
    let g = child(&d, d.root(), 0);
    d.check_invariants();

    assert_eq!(d.nr_of_pairs(g), 1);
    assert_eq!(d.partition(g).unwrap().thread_connectors().unwrap().len(), 2);
    assert_eq!(d.thread_styles(g).len(), 2);

    let a = child(&d, g, 0);
    let b = child(&d, g, 1);
    let (front_a, back_a) = {
        let sw = d.partition(a).unwrap().as_switch().unwrap();
        (sw.front, sw.back)
    };
    let (front_b, back_b) = {
        let sw = d.partition(b).unwrap().as_switch().unwrap();
        (sw.front, sw.back)
    };

    // a twist swaps sides: the first twist's front continues into the
    // second twist's back, and vice versa
    assert_eq!(d.style_id(front_a), d.style_id(back_b));
    assert_eq!(d.style_id(back_a), d.style_id(front_b));
    assert_ne!(d.style_id(front_a), d.style_id(back_a));

    let run: Vec<f32> = d.thread_curves(back_b).map(|c| c.start.x).collect();
    assert_eq!(run.len(), 2);
    // the walk starts at the run's head, which is the first twist's front
    assert_eq!(run[0], d.segment(front_a).unwrap().curve.start.x);

    // one write repaints the whole run, the crossing run keeps its paint
    let mut style = d.thread_style(front_a).unwrap();
    style.core.color = Color::rgb(0, 120, 0);
    d.set_thread_style(front_a, style);
    assert_eq!(d.thread_style(back_b).unwrap().core.color, Color::rgb(0, 120, 0));
    assert_eq!(d.thread_style(front_b).unwrap().core.color, Color::BLACK);
}

fn one_pair_stitch(pair: usize, x0: f32, x1: f32) -> PartitionDef {
    PartitionDef::Stitch(StitchDef {
        pair,
        pairs: vec![PairChainDef {
            slot: 0,
            curves: vec![Curve::line(Point::new(x0, 0.0), Point::new(x1, 0.0))],
            style: None,
        }],
        ..StitchDef::default()
    })
}

#[test]
fn chained_stitches_hide_matched_ends_from_the_boundary() {
    let d = build(vec![group(vec![
        one_pair_stitch(0, 0.0, 10.0),
        one_pair_stitch(0, 10.0, 20.0),
    ])]);
    let g = child(&d, d.root(), 0);
    d.check_invariants();

    let a = child(&d, g, 0);
    let b = child(&d, g, 1);
    let a_conn = d.partition(a).unwrap().pair_connectors().unwrap();
    let b_conn = d.partition(b).unwrap().pair_connectors().unwrap();
    let g_conn = d.partition(g).unwrap().pair_connectors().unwrap();

    // each stitch alone exposes two open ends; chained, the junction ends
    // are interior and only the outer two remain on the group boundary
    assert_eq!(a_conn.open_ends(), 2);
    assert_eq!(b_conn.open_ends(), 2);
    assert_eq!(g_conn.open_ends(), 2);
    assert_eq!(g_conn.in_at(0), a_conn.in_at(0));
    assert_eq!(g_conn.out_at(0), b_conn.out_at(0));

    // the two chains joined into one run with one shared pair style
    let head = g_conn.in_at(0).unwrap();
    let tail = g_conn.out_at(0).unwrap();
    assert_eq!(d.style_id(head), d.style_id(tail));
    assert_eq!(d.thread_curves(head).count(), 2);
    assert_eq!(d.pairs(d.root()).count(), 2);
}

#[test]
fn invisible_sections_contribute_nothing_and_come_back_intact() {
    let mut d = build(vec![group(vec![
        twist(0),
        group(vec![twist(1)]),
        PartitionDef::Pin(PinDef {
            at: Point::new(5.0, 5.0),
            visible: true,
            id: None,
            caption: None,
        }),
    ])]);
    let g = child(&d, d.root(), 0);
    let inner = child(&d, g, 1);

    let before: Vec<_> = d.threads(d.root()).collect();
    assert_eq!(before.len(), 4);
    assert_eq!(d.pins(d.root()).count(), 1);

    // hiding the inner group removes its threads, nested ones included
    assert!(d.set_visible(inner, false));
    assert_eq!(d.threads(d.root()).count(), 2);
    assert!(d.partition(inner).is_some());

    // hiding the outer group silences every iteration below it
    assert!(d.set_visible(g, false));
    assert_eq!(d.threads(d.root()).count(), 0);
    assert_eq!(d.pairs(d.root()).count(), 0);
    assert_eq!(d.pins(d.root()).count(), 0);

    // showing everything again restores the exact original order
    assert!(d.set_visible(g, true));
    assert!(d.set_visible(inner, true));
    let after: Vec<_> = d.threads(d.root()).collect();
    assert_eq!(after, before);
}

#[test]
fn overlapping_switches_pick_the_last_added() {
    let d = build(vec![group(vec![
        twist_in_box(0, 0.0, 20.0),
        twist_in_box(0, 10.0, 30.0),
    ])]);
    let g = child(&d, d.root(), 0);
    let a = child(&d, g, 0);
    let b = child(&d, g, 1);

    // in the overlap the child added last wins
    assert_eq!(d.switch_at(d.root(), 15.0, 10.0), Some(b));
    // outside the overlap each is hit on its own
    assert_eq!(d.switch_at(d.root(), 5.0, 10.0), Some(a));
    assert_eq!(d.switch_at(d.root(), 25.0, 10.0), Some(b));
    // outside every hull there is no hit
    assert_eq!(d.switch_at(d.root(), 100.0, 100.0), None);

    let front_b = d.partition(b).unwrap().as_switch().unwrap().front;
    assert_eq!(d.thread_at(d.root(), 15.0, 10.0), Some(front_b));
    assert_eq!(d.thread_at(d.root(), 100.0, 100.0), None);
}

#[test]
fn hit_testing_recurses_into_nested_groups() {
    let d = build(vec![group(vec![group(vec![twist(0)]), twist(1)])]);
    let outer = child(&d, d.root(), 0);
    let inner = child(&d, outer, 0);
    let nested_twist = child(&d, inner, 0);

    assert_eq!(d.switch_at(d.root(), 10.0, 10.0), Some(nested_twist));
    // hidden sections still hit; visibility only filters iteration
    let mut d = d;
    d.set_visible(inner, false);
    assert_eq!(d.switch_at(d.root(), 10.0, 10.0), Some(nested_twist));
}

#[test]
fn bounds_cover_children_and_touching_hulls_meet() {
    let d = build(vec![group(vec![twist(0), twist(1)])]);
    let g = child(&d, d.root(), 0);
    let b = d.bounds(g).unwrap();
    assert_eq!(b.min_x, 0.0);
    assert_eq!(b.max_x, 40.0);
    assert_eq!(b.min_y, 0.0);
    assert_eq!(b.max_y, 20.0);
    // the twins touch at x = 20; an exact border point hits both hulls
    let a = child(&d, g, 0);
    assert!(d.bounds(a).unwrap().contains(20.0, 10.0));
    assert!(d.bounds(child(&d, g, 1)).unwrap().contains(20.0, 10.0));
}

#[test]
fn thread_styles_report_boundary_ins() {
    let d = build(vec![group(vec![twist(0), twist(1)])]);
    let g = child(&d, d.root(), 0);
    let styles = d.thread_styles(g);
    assert_eq!(styles.len(), 4);
    assert!(styles.iter().all(|s| s.is_some()));
    // a pin exposes no thread ends
    let d2 = build(vec![PartitionDef::Pin(PinDef {
        at: Point::new(0.0, 0.0),
        visible: true,
        id: None,
        caption: None,
    })]);
    let pin = child(&d2, d2.root(), 0);
    assert!(d2.thread_styles(pin).is_empty());
}

#[test]
fn lookup_misses_degrade_to_none() {
    let d = build(vec![group(vec![twist(0)])]);
    assert!(d.partition(999).is_none());
    assert_eq!(d.bounds(999), None);
    assert_eq!(d.nr_of_pairs(999), 0);
    assert!(!d.is_visible(999));
    assert!(d.thread_styles(999).is_empty());
    assert_eq!(d.thread_curves(999).count(), 0);
    assert_eq!(d.thread_style(999), None);
}
