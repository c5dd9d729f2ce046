use proptest::prelude::*;
use torchon::{
    Color, Curve, Diagram, DiagramDef, EditOp, GroupDef, PartitionDef, Point, SwitchDef,
};

#[derive(Clone, Debug)]
enum Op {
    InsertSwitch { index: u8, pair: u8, twist: bool },
    InsertGroup { index: u8, pair: u8 },
    Delete { index: u8 },
    Replace { index: u8, twist: bool },
    ToggleVisible { index: u8 },
    Repaint { index: u8, color: (u8, u8, u8) },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), 0u8..4, any::<bool>()).prop_map(|(index, pair, twist)| Op::InsertSwitch {
            index,
            pair,
            twist,
        }),
        (any::<u8>(), 0u8..3).prop_map(|(index, pair)| Op::InsertGroup { index, pair }),
        any::<u8>().prop_map(|index| Op::Delete { index }),
        (any::<u8>(), any::<bool>()).prop_map(|(index, twist)| Op::Replace { index, twist }),
        any::<u8>().prop_map(|index| Op::ToggleVisible { index }),
        (any::<u8>(), any::<(u8, u8, u8)>()).prop_map(|(index, color)| Op::Repaint {
            index,
            color,
        }),
    ]
}

fn switch_def(pair: usize, twist: bool) -> PartitionDef {
    let x = pair as f32 * 20.0;
    let def = SwitchDef {
        pair,
        front: Curve::line(Point::new(x + 20.0, 0.0), Point::new(x, 20.0)),
        back: Curve::line(Point::new(x, 0.0), Point::new(x + 20.0, 20.0)),
        visible: true,
        id: None,
        caption: None,
    };
    if twist {
        PartitionDef::Twist(def)
    } else {
        PartitionDef::Cross(def)
    }
}

fn seed() -> Diagram {
    Diagram::build(&DiagramDef {
        title: None,
        children: vec![PartitionDef::Group(GroupDef {
            children: vec![switch_def(0, true), switch_def(0, true), switch_def(1, false)],
            ..GroupDef::default()
        })],
    })
}

fn apply_op(d: &mut Diagram, group: u32, op: Op) {
    let len = d
        .partition(group)
        .map(|n| n.as_composite().unwrap().children().len())
        .unwrap_or(0);
    match op {
        Op::InsertSwitch { index, pair, twist } => {
            let index = (index as usize) % (len + 1);
            let _ = d.apply_edit(
                group,
                EditOp::Insert {
                    index,
                    def: switch_def(pair as usize, twist),
                },
            );
        }
        Op::InsertGroup { index, pair } => {
            let index = (index as usize) % (len + 1);
            let def = PartitionDef::Group(GroupDef {
                pair: pair as usize,
                children: vec![switch_def(0, true), switch_def(1, false)],
                ..GroupDef::default()
            });
            let _ = d.apply_edit(group, EditOp::Insert { index, def });
        }
        Op::Delete { index } => {
            if len == 0 {
                return;
            }
            let _ = d.apply_edit(
                group,
                EditOp::Delete {
                    index: (index as usize) % len,
                },
            );
        }
        Op::Replace { index, twist } => {
            if len == 0 {
                return;
            }
            let index = (index as usize) % len;
            let target = d.partition(group).unwrap().as_composite().unwrap().children()[index];
            let pair = d.partition(target).unwrap().pair_range().start;
            // a one-pair payload only lands on one-pair children; a
            // mismatch must be rejected without touching the tree
            let _ = d.apply_edit(
                group,
                EditOp::Replace {
                    index,
                    def: switch_def(pair, twist),
                },
            );
        }
        Op::ToggleVisible { index } => {
            if len == 0 {
                return;
            }
            let child =
                d.partition(group).unwrap().as_composite().unwrap().children()[(index as usize) % len];
            let visible = d.is_visible(child);
            d.set_visible(child, !visible);
        }
        Op::Repaint { index, color } => {
            if len == 0 {
                return;
            }
            let child =
                d.partition(group).unwrap().as_composite().unwrap().children()[(index as usize) % len];
            if let Some(sw) = d.partition(child).and_then(|n| n.as_switch()) {
                let front = sw.front;
                let mut style = d.thread_style(front).unwrap();
                style.core.color = Color::rgb(color.0, color.1, color.2);
                d.set_thread_style(front, style);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 512, .. ProptestConfig::default() })]
    #[test]
    fn random_edits_preserve_the_invariants(seq in prop::collection::vec(op_strategy(), 1..24)) {
        let mut d = seed();
        let group = d.partition(d.root()).unwrap().as_composite().unwrap().children()[0];
        for op in seq {
            apply_op(&mut d, group, op);
            d.check_invariants();
        }
        // the walkers terminate, and thread drawables come in
        // back-and-front pairs
        let drawn = d.threads(d.root()).count();
        prop_assert_eq!(drawn % 2, 0);
        let _ = d.pairs(d.root()).count();
        let _ = d.pins(d.root()).count();
        let _ = d.switch_at(d.root(), 10.0, 10.0);
        // exporting the edited tree and rebuilding it round-trips
        let rebuilt = Diagram::from_json(d.to_json().unwrap()).unwrap();
        rebuilt.check_invariants();
        prop_assert_eq!(rebuilt.nr_of_pairs(rebuilt.root()), d.nr_of_pairs(d.root()));
    }
}
