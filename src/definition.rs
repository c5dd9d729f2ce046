//! Definition documents and the one-shot builder.
//!
//! A definition is the validated, serializable description a diagram is
//! built from; parsing and schema validation of whatever markup produced
//! it live outside this crate. The same shapes serialize back out through
//! [`Diagram::to_definition`].

use crate::model::{Curve, PartitionId, Point, SegmentKind, SegmentStyle, Style};
use crate::partition::{CompositeKind, PairChain, PartitionKind, SwitchKind};
use crate::Diagram;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiagramDef {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<PartitionDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PartitionDef {
    Cross(SwitchDef),
    Twist(SwitchDef),
    Pin(PinDef),
    Group(GroupDef),
    Stitch(StitchDef),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwitchDef {
    /// Pair slot inside the parent this crossing occupies.
    #[serde(default)]
    pub pair: usize,
    pub front: Curve,
    pub back: Curve,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PinDef {
    pub at: Point,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupDef {
    /// First pair slot inside the parent this group covers.
    #[serde(default)]
    pub pair: usize,
    #[serde(default)]
    pub children: Vec<PartitionDef>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl Default for GroupDef {
    fn default() -> Self {
        GroupDef {
            pair: 0,
            children: Vec::new(),
            visible: true,
            id: None,
            caption: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StitchDef {
    #[serde(default)]
    pub pair: usize,
    /// Pair-level curve chains, one per claimed slot.
    #[serde(default)]
    pub pairs: Vec<PairChainDef>,
    #[serde(default)]
    pub children: Vec<PartitionDef>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl Default for StitchDef {
    fn default() -> Self {
        StitchDef {
            pair: 0,
            pairs: Vec::new(),
            children: Vec::new(),
            visible: true,
            id: None,
            caption: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PairChainDef {
    #[serde(default)]
    pub slot: usize,
    pub curves: Vec<Curve>,
    #[serde(default)]
    pub style: Option<Style>,
}

impl PartitionDef {
    /// First pair slot this partition claims inside its parent.
    pub fn pair_offset(&self) -> usize {
        match self {
            PartitionDef::Cross(s) | PartitionDef::Twist(s) => s.pair,
            PartitionDef::Pin(_) => 0,
            PartitionDef::Group(g) => g.pair,
            PartitionDef::Stitch(s) => s.pair,
        }
    }

    /// Number of pair slots this partition covers, computed without
    /// building anything (edits validate against this before mutating).
    pub fn pair_count(&self) -> usize {
        match self {
            PartitionDef::Cross(_) | PartitionDef::Twist(_) => 1,
            PartitionDef::Pin(_) => 0,
            PartitionDef::Group(g) => span_of_defs(&g.children),
            PartitionDef::Stitch(s) => {
                let chains = s.pairs.iter().map(|c| c.slot + 1).max().unwrap_or(0);
                chains.max(span_of_defs(&s.children))
            }
        }
    }
}

fn span_of_defs(defs: &[PartitionDef]) -> usize {
    defs.iter()
        .map(|d| d.pair_offset() + d.pair_count())
        .max()
        .unwrap_or(0)
}

impl Diagram {
    /// One-shot construction from an already-validated definition.
    pub fn build(def: &DiagramDef) -> Diagram {
        let mut d = Diagram::empty();
        let root = d.build_composite(
            CompositeKind::Diagram,
            0,
            &[],
            &def.children,
            true,
            None,
            def.title.clone(),
        );
        d.root = root;
        d
    }

    /// Convenience ingest of a definition held as a JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Diagram, serde_json::Error> {
        let def: DiagramDef = serde_json::from_value(value)?;
        Ok(Diagram::build(&def))
    }

    /// Export the current model back to definition form.
    pub fn to_definition(&self) -> DiagramDef {
        let root = self.node(self.root);
        let children = root
            .as_composite()
            .map(|c| c.children.iter().map(|&c| self.export(c)).collect())
            .unwrap_or_default();
        DiagramDef {
            title: root.caption.clone(),
            children,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.to_definition())
    }

    pub(crate) fn build_partition(&mut self, def: &PartitionDef) -> PartitionId {
        match def {
            PartitionDef::Cross(s) => self.new_switch(
                SwitchKind::Cross,
                s.pair,
                s.front,
                s.back,
                s.visible,
                s.id.clone(),
                s.caption.clone(),
            ),
            PartitionDef::Twist(s) => self.new_switch(
                SwitchKind::Twist,
                s.pair,
                s.front,
                s.back,
                s.visible,
                s.id.clone(),
                s.caption.clone(),
            ),
            PartitionDef::Pin(p) => {
                self.new_pin(p.at, p.visible, p.id.clone(), p.caption.clone())
            }
            PartitionDef::Group(g) => self.build_composite(
                CompositeKind::Group,
                g.pair,
                &[],
                &g.children,
                g.visible,
                g.id.clone(),
                g.caption.clone(),
            ),
            PartitionDef::Stitch(s) => self.build_composite(
                CompositeKind::Stitch,
                s.pair,
                &s.pairs,
                &s.children,
                s.visible,
                s.id.clone(),
                s.caption.clone(),
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_composite(
        &mut self,
        kind: CompositeKind,
        pair: usize,
        chain_defs: &[PairChainDef],
        child_defs: &[PartitionDef],
        visible: bool,
        source_id: Option<String>,
        caption: Option<String>,
    ) -> PartitionId {
        let pid = self.new_composite(kind, pair, visible, source_id, caption);

        // own pair chains first; each chain is one run sharing one style
        let mut chains = Vec::with_capacity(chain_defs.len());
        for cdef in chain_defs {
            let style = self.alloc_style(SegmentStyle::Pair(cdef.style.unwrap_or_default()));
            let mut segments = Vec::with_capacity(cdef.curves.len());
            for &curve in &cdef.curves {
                let sid = self.new_segment_sharing(curve, SegmentKind::Pair, style);
                if let Some(&prev) = segments.last() {
                    self.connect_segments(prev, sid);
                }
                segments.push(sid);
            }
            chains.push(PairChain {
                slot: cdef.slot,
                segments,
            });
        }

        let mut children = Vec::with_capacity(child_defs.len());
        for cdef in child_defs {
            let cid = self.build_partition(cdef);
            self.node_mut(cid).parent = Some(pid);
            children.push(cid);
        }

        // store structure, then assemble the boundary tables
        {
            let PartitionKind::Composite(comp) = &mut self.node_mut(pid).kind else {
                unreachable!()
            };
            comp.pair_chains = chains;
            comp.children = children.clone();
        }
        let span = self.span_of(pid);
        self.node_mut(pid).pair_range.count = span;

        let mut pairs = crate::connectors::Connectors::new(span);
        let mut threads = crate::connectors::Connectors::new(span * 2);
        {
            let node = self.node(pid);
            let comp = node.as_composite().expect("just built");
            for chain in &comp.pair_chains {
                pairs.set_in(chain.slot, chain.segments.first().copied());
                pairs.set_out(chain.slot, chain.segments.last().copied());
            }
        }
        for cid in children {
            self.splice_child(&mut pairs, &mut threads, cid);
        }
        {
            let node = self.node_mut(pid);
            let PartitionKind::Composite(comp) = &mut node.kind else {
                unreachable!()
            };
            comp.pairs = pairs;
            comp.threads = threads;
        }
        pid
    }

    fn export(&self, id: PartitionId) -> PartitionDef {
        let node = self.node(id);
        let pair = node.pair_range.start;
        match &node.kind {
            PartitionKind::Switch(sw) => {
                let def = SwitchDef {
                    pair,
                    front: self.seg(sw.front).curve,
                    back: self.seg(sw.back).curve,
                    visible: node.visible,
                    id: node.source_id.clone(),
                    caption: node.caption.clone(),
                };
                match sw.kind {
                    SwitchKind::Cross => PartitionDef::Cross(def),
                    SwitchKind::Twist => PartitionDef::Twist(def),
                }
            }
            PartitionKind::Pin(p) => PartitionDef::Pin(PinDef {
                at: p.position,
                visible: node.visible,
                id: node.source_id.clone(),
                caption: node.caption.clone(),
            }),
            PartitionKind::Composite(comp) => {
                let children: Vec<PartitionDef> =
                    comp.children.iter().map(|&c| self.export(c)).collect();
                match comp.kind {
                    CompositeKind::Stitch => PartitionDef::Stitch(StitchDef {
                        pair,
                        pairs: comp
                            .pair_chains
                            .iter()
                            .map(|ch| PairChainDef {
                                slot: ch.slot,
                                curves: ch
                                    .segments
                                    .iter()
                                    .map(|&s| self.seg(s).curve)
                                    .collect(),
                                style: ch
                                    .segments
                                    .first()
                                    .and_then(|&s| self.pair_style(s)),
                            })
                            .collect(),
                        children,
                        visible: node.visible,
                        id: node.source_id.clone(),
                        caption: node.caption.clone(),
                    }),
                    _ => PartitionDef::Group(GroupDef {
                        pair,
                        children,
                        visible: node.visible,
                        id: node.source_id.clone(),
                        caption: node.caption.clone(),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twist(pair: usize) -> PartitionDef {
        let x = pair as f32 * 10.0;
        PartitionDef::Twist(SwitchDef {
            pair,
            front: Curve::line(Point::new(x, 0.0), Point::new(x + 10.0, 10.0)),
            back: Curve::line(Point::new(x + 10.0, 0.0), Point::new(x, 10.0)),
            visible: true,
            id: None,
            caption: None,
        })
    }

    #[test]
    fn test_pair_count_of_defs() {
        assert_eq!(twist(3).pair_count(), 1);
        let group = PartitionDef::Group(GroupDef {
            children: vec![twist(0), twist(2)],
            ..GroupDef::default()
        });
        assert_eq!(group.pair_count(), 3);
        let pin = PartitionDef::Pin(PinDef {
            at: Point::new(0.0, 0.0),
            visible: true,
            id: None,
            caption: None,
        });
        assert_eq!(pin.pair_count(), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let def = DiagramDef {
            title: Some("demo".into()),
            children: vec![PartitionDef::Group(GroupDef {
                children: vec![twist(0), twist(1)],
                ..GroupDef::default()
            })],
        };
        let d = Diagram::build(&def);
        let value = d.to_json().unwrap();
        let rebuilt = Diagram::from_json(value).unwrap();
        assert_eq!(rebuilt.nr_of_pairs(rebuilt.root()), 2);
        assert_eq!(
            rebuilt.to_json().unwrap(),
            Diagram::build(&def).to_json().unwrap()
        );
    }
}
