use super::{
    accumulate_distances, assign_spread, Bracket, Connector, EdgePoint, LabelAnchor, NodeGeom,
    Projection, Region,
};
use crate::error::{LayoutError, TreeError};
use crate::geom::{lerp, Point};
use crate::scene::Anchor;
use crate::style::TreeStyle;
use crate::tree::{NodeId, Tree};

/// Cartesian projection: depth maps to x (left to right), spread to
/// evenly spaced leaf rows on y. Branches render as elbows: a vertical
/// connector at the parent's depth followed by a horizontal segment at
/// the child's row.
#[derive(Debug, Clone)]
pub struct VerticalLayout {
    geom: Vec<NodeGeom>,
    max_dist: f64,
    scale: f64,
    root_x: f64,
    slot_step: f64,
    root_stub_length: f64,
    leaf_span: (f64, f64),
}

impl VerticalLayout {
    pub fn compute(tree: &Tree, style: &TreeStyle) -> Result<Self, TreeError> {
        Self::compute_with_width(tree, style, style.width)
    }

    /// Lay out against a reduced drawable width, reserving the rest of
    /// the canvas for heatmap columns or labels. Every derived field is
    /// recomputed from scratch.
    pub fn compute_with_width(
        tree: &Tree,
        style: &TreeStyle,
        target_width: f64,
    ) -> Result<Self, TreeError> {
        let (distances, max_dist) = accumulate_distances(tree)?;
        let pad = style.margin;
        let scale = if max_dist > 0.0 {
            (target_width - pad * 2.0) / max_dist
        } else {
            1.0
        };
        let root_x = -style.width / 2.0 + pad;

        let leaf_count = tree.leaf_count().max(1);
        let slot_step = (style.height - pad * 2.0) / (leaf_count - 1).max(1) as f64;
        let start_y = -style.height / 2.0 + pad;
        let spread = assign_spread(tree, start_y, slot_step);

        let geom: Vec<NodeGeom> = (0..tree.nodes.len())
            .map(|id| {
                let depth = root_x + distances[id] * scale;
                NodeGeom {
                    dist_to_root: distances[id],
                    spread: spread[id],
                    depth,
                    position: Point::new(depth, spread[id]),
                }
            })
            .collect();

        log::debug!(
            "vertical layout: {leaf_count} leaves, max distance {max_dist}, scale {scale}"
        );

        Ok(Self {
            geom,
            max_dist,
            scale,
            root_x,
            slot_step,
            root_stub_length: style.root_stub_length,
            leaf_span: (start_y, start_y + (leaf_count - 1) as f64 * slot_step),
        })
    }

    /// Height of one leaf row.
    pub fn slot_step(&self) -> f64 {
        self.slot_step
    }

    /// X coordinate of the deepest node.
    fn max_x(&self) -> f64 {
        self.root_x + self.max_dist * self.scale
    }

    fn time_to_x(&self, time: f64) -> f64 {
        self.root_x + time * self.scale
    }
}

impl Projection for VerticalLayout {
    fn geom(&self, node: NodeId) -> &NodeGeom {
        &self.geom[node]
    }

    fn max_distance(&self) -> f64 {
        self.max_dist
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    /// Points land on the horizontal leg of the elbow: fraction 0 is at
    /// the elbow corner below/above the parent, not at the parent's own
    /// row.
    fn edge_point(
        &self,
        tree: &Tree,
        node: NodeId,
        fraction: f64,
    ) -> Result<EdgePoint, LayoutError> {
        let parent = tree.nodes[node]
            .parent
            .ok_or(LayoutError::EdgeNotFound(node))?;
        let t = fraction.clamp(0.0, 1.0);
        let x0 = self.geom[parent].depth;
        let x1 = self.geom[node].depth;
        let tangent = if x1 >= x0 { 0.0 } else { 180.0 };
        Ok(EdgePoint {
            point: Point::new(lerp(x0, x1, t), self.geom[node].spread),
            tangent,
        })
    }

    fn child_connector(&self, tree: &Tree, node: NodeId) -> Option<Connector> {
        let children = &tree.nodes[node].children;
        if children.len() < 2 {
            return None;
        }
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &child in children {
            min_y = min_y.min(self.geom[child].spread);
            max_y = max_y.max(self.geom[child].spread);
        }
        let x = self.geom[node].depth;
        Some(Connector::Line {
            from: Point::new(x, min_y),
            to: Point::new(x, max_y),
        })
    }

    fn root_stub(&self, tree: &Tree) -> Option<(Point, Point)> {
        let root = tree.root?;
        let geom = &self.geom[root];
        let stem = geom.dist_to_root * self.scale;
        let stub = if stem > f64::EPSILON {
            stem
        } else {
            self.root_stub_length
        };
        Some((
            Point::new(geom.depth - stub, geom.spread),
            geom.position,
        ))
    }

    fn clade_region(&self, tree: &Tree, node: NodeId, padding: f64) -> Option<Region> {
        if tree.nodes[node].is_leaf() {
            return None;
        }
        let leaves = tree.leaves_of(node);
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for leaf in leaves {
            min_y = min_y.min(self.geom[leaf].spread);
            max_y = max_y.max(self.geom[leaf].spread);
        }
        let x = self.geom[node].depth;
        Some(Region::Rect {
            min: Point::new(x - padding / 2.0, min_y - padding),
            width: (self.max_x() - x) + padding,
            height: (max_y - min_y) + padding * 2.0,
        })
    }

    fn leaf_cell(&self, tree: &Tree, leaf: NodeId, offset: f64, width: f64) -> Option<Region> {
        if !tree.nodes[leaf].is_leaf() {
            return None;
        }
        let y = self.geom[leaf].spread;
        Some(Region::Rect {
            min: Point::new(self.max_x() + offset, y - self.slot_step / 2.0),
            width,
            height: self.slot_step,
        })
    }

    fn leaf_anchor(&self, _tree: &Tree, leaf: NodeId, padding: f64) -> LabelAnchor {
        let geom = &self.geom[leaf];
        LabelAnchor {
            position: Point::new(geom.depth + padding, geom.spread),
            angle: 0.0,
            align: Anchor::Start,
        }
    }

    fn clade_bracket(&self, tree: &Tree, node: NodeId, offset: f64) -> Option<Bracket> {
        let leaves = tree.leaves_of(node);
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for leaf in &leaves {
            min_y = min_y.min(self.geom[*leaf].spread);
            max_y = max_y.max(self.geom[*leaf].spread);
        }
        let x = self.max_x() + offset;
        let tick = 5.0;
        let segments = vec![
            Connector::Line {
                from: Point::new(x - tick, min_y),
                to: Point::new(x, min_y),
            },
            Connector::Line {
                from: Point::new(x, min_y),
                to: Point::new(x, max_y),
            },
            Connector::Line {
                from: Point::new(x, max_y),
                to: Point::new(x - tick, max_y),
            },
        ];
        Some(Bracket {
            segments,
            label: LabelAnchor {
                position: Point::new(x + 8.0, (min_y + max_y) / 2.0),
                angle: 0.0,
                align: Anchor::Start,
            },
        })
    }

    fn depth_gridline(&self, _tree: &Tree, time: f64) -> Option<Connector> {
        let x = self.time_to_x(time);
        Some(Connector::Line {
            from: Point::new(x, self.leaf_span.0),
            to: Point::new(x, self.leaf_span.1),
        })
    }

    fn axis_anchor(&self, _tree: &Tree, time: f64, padding: f64) -> LabelAnchor {
        LabelAnchor {
            position: Point::new(self.time_to_x(time), self.leaf_span.1 + padding),
            angle: 0.0,
            align: Anchor::Middle,
        }
    }

    fn axis_baseline(&self, _tree: &Tree, max_time: f64, padding: f64) -> Option<(Point, Point)> {
        let y = self.leaf_span.1 + padding;
        Some((
            Point::new(self.root_x - self.root_stub_length, y),
            Point::new(self.time_to_x(max_time), y),
        ))
    }

    fn curve_control(&self, point: Point, amount: f64) -> Point {
        Point::new(point.x - amount, point.y)
    }
}
