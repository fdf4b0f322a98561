use super::{NodeId, Tree};
use crate::error::{LayoutError, TreeError};
use crate::geom::Point;
use crate::scene::Anchor;

mod radial;
mod vertical;

pub use radial::RadialLayout;
pub use vertical::VerticalLayout;

/// Branch length assumed for non-root nodes whose edge carries none.
pub(super) const DEFAULT_BRANCH_LENGTH: f64 = 1.0;

/// Edges shorter than this cannot anchor a time: time-based placement
/// falls back to the branch midpoint.
const ZERO_EDGE_EPSILON: f64 = 1e-12;

/// Fallback fraction for events on near-zero-length edges and for
/// records that carry no time at all.
pub const MIDPOINT_FRACTION: f64 = 0.5;

/// Per-node geometry derived by a layout pass. Kept in a table parallel
/// to the tree's node arena, never on the nodes themselves; recomputing
/// a layout rebuilds the whole table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGeom {
    /// Cumulative branch length from the root, inclusive of the stem.
    pub dist_to_root: f64,
    /// Spread-axis value: angle in degrees (radial) or y (vertical).
    pub spread: f64,
    /// Depth-axis value: radius (radial) or x (vertical).
    pub depth: f64,
    pub position: Point,
}

/// A point on a rendered edge plus the edge direction at that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub point: Point,
    /// Direction along the branch, degrees, pointing from the parent
    /// end toward the child end.
    pub tangent: f64,
}

/// A stroked connector piece of the tree skeleton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Connector {
    Line {
        from: Point,
        to: Point,
    },
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

/// A filled region aligned with the layout's axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    Rect {
        min: Point,
        width: f64,
        height: f64,
    },
    Sector {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

/// Placement for a piece of text attached to the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    pub position: Point,
    /// Rotation around the anchor, degrees.
    pub angle: f64,
    pub align: Anchor,
}

/// A clade grouping bracket: spine segments plus a label placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Bracket {
    pub segments: Vec<Connector>,
    pub label: LabelAnchor,
}

/// Geometry capability shared by the two projections. Every overlay is
/// written once against this interface; the projections only differ in
/// how they realize it.
pub trait Projection {
    fn geom(&self, node: NodeId) -> &NodeGeom;

    /// Largest cumulative distance in the tree.
    fn max_distance(&self) -> f64;

    /// Canvas units per branch-length unit.
    fn scale(&self) -> f64;

    /// Point and tangent at `fraction` along the rendered edge into
    /// `node`: 0 at the parent end of the drawn segment, 1 at the node.
    /// Out-of-range fractions are clamped. The root has no incoming
    /// edge and yields [`LayoutError::EdgeNotFound`].
    fn edge_point(
        &self,
        tree: &Tree,
        node: NodeId,
        fraction: f64,
    ) -> Result<EdgePoint, LayoutError>;

    /// The connector spanning `node`'s children on the spread axis
    /// (vertical bar or polar arc). `None` for leaves and for
    /// connectors collapsed to a point.
    fn child_connector(&self, tree: &Tree, node: NodeId) -> Option<Connector>;

    /// The stub drawn at the root: the stem when the root carries one,
    /// otherwise a short fixed-length lead-in (vertical only).
    fn root_stub(&self, tree: &Tree) -> Option<(Point, Point)>;

    /// Region spanning `node`'s leaves from the node's own depth out to
    /// the tree's maximum depth. `None` for leaves.
    fn clade_region(&self, tree: &Tree, node: NodeId, padding: f64) -> Option<Region>;

    /// One band cell for `leaf`, placed `offset` beyond the maximum
    /// depth and `width` thick, filling the leaf's spread slot.
    fn leaf_cell(&self, tree: &Tree, leaf: NodeId, offset: f64, width: f64) -> Option<Region>;

    /// Label placement for a leaf name, `padding` beyond the leaf tip.
    fn leaf_anchor(&self, tree: &Tree, leaf: NodeId, padding: f64) -> LabelAnchor;

    /// Grouping bracket for the clade under `node`, `offset` beyond the
    /// maximum depth.
    fn clade_bracket(&self, tree: &Tree, node: NodeId, offset: f64) -> Option<Bracket>;

    /// Gridline across the spread axis at an absolute time value.
    fn depth_gridline(&self, tree: &Tree, time: f64) -> Option<Connector>;

    /// Anchor for an axis tick label at an absolute time value.
    fn axis_anchor(&self, tree: &Tree, time: f64, padding: f64) -> LabelAnchor;

    /// Axis baseline from time zero to `max_time`, where the projection
    /// has a meaningful one.
    fn axis_baseline(&self, tree: &Tree, max_time: f64, padding: f64) -> Option<(Point, Point)>;

    /// Pull a curve control point rootward by `amount` canvas units
    /// (negative amounts push away from the root).
    fn curve_control(&self, point: Point, amount: f64) -> Point;

    fn position(&self, node: NodeId) -> Point {
        self.geom(node).position
    }

    fn cumulative_distance(&self, node: NodeId) -> f64 {
        self.geom(node).dist_to_root
    }

    /// Map an absolute time to a fraction along the incoming edge of
    /// `node`. This is the single mechanism positioning every
    /// time-aware overlay; near-zero edges fall back to the midpoint.
    fn fraction_from_time(
        &self,
        tree: &Tree,
        node: NodeId,
        time: f64,
    ) -> Result<f64, LayoutError> {
        let parent = tree.nodes[node]
            .parent
            .ok_or(LayoutError::EdgeNotFound(node))?;
        let t0 = self.cumulative_distance(parent);
        let t1 = self.cumulative_distance(node);
        if (t1 - t0).abs() <= ZERO_EDGE_EPSILON {
            return Ok(MIDPOINT_FRACTION);
        }
        Ok(((time - t0) / (t1 - t0)).clamp(0.0, 1.0))
    }
}

/// Pre-order depth pass: cumulative distance per node and the maximum.
/// The root's own length is honored as a stem (default 0); negative
/// branch lengths are fatal.
pub(crate) fn accumulate_distances(tree: &Tree) -> Result<(Vec<f64>, f64), TreeError> {
    if tree.root.is_none() {
        return Err(TreeError::Empty);
    }
    let mut distances = vec![0.0; tree.nodes.len()];
    let mut max_dist = 0.0f64;
    for id in tree.preorder() {
        let node = &tree.nodes[id];
        let length = match node.parent {
            Some(_) => node.length.unwrap_or(DEFAULT_BRANCH_LENGTH),
            None => node.length.unwrap_or(0.0),
        };
        if length < 0.0 {
            return Err(TreeError::NegativeBranchLength { node: id, length });
        }
        distances[id] = match node.parent {
            Some(parent) => distances[parent] + length,
            None => length,
        };
        max_dist = max_dist.max(distances[id]);
    }
    Ok((distances, max_dist))
}

/// Spread pass: leaves evenly spaced in traversal order starting at
/// `start` with `step` between them; internal nodes take the arithmetic
/// mean of their children's spread values, in post-order.
pub(crate) fn assign_spread(tree: &Tree, start: f64, step: f64) -> Vec<f64> {
    let mut spread = vec![0.0; tree.nodes.len()];
    for (index, leaf) in tree.leaves().into_iter().enumerate() {
        spread[leaf] = start + index as f64 * step;
    }
    for id in tree.postorder() {
        let node = &tree.nodes[id];
        if !node.children.is_empty() {
            let sum: f64 = node.children.iter().map(|&child| spread[child]).sum();
            spread[id] = sum / node.children.len() as f64;
        }
    }
    spread
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_monotonicity() {
        let tree = Tree::from_newick("((A:1,B:0):1,C:2);").unwrap();
        let (dist, max_dist) = accumulate_distances(&tree).unwrap();
        for id in tree.preorder() {
            if let Some(parent) = tree.nodes[id].parent {
                assert!(dist[id] >= dist[parent]);
                if tree.nodes[id].length.unwrap_or(1.0) > 0.0 {
                    assert!(dist[id] > dist[parent]);
                }
            }
        }
        assert_eq!(max_dist, 2.0);
    }

    #[test]
    fn test_root_stem_included() {
        let tree = Tree::from_newick("((A:1,B:1):1,C:2)r:0.5;").unwrap();
        let (dist, max_dist) = accumulate_distances(&tree).unwrap();
        let root = tree.root.unwrap();
        assert_eq!(dist[root], 0.5);
        assert_eq!(max_dist, 2.5);
    }

    #[test]
    fn test_negative_length_is_fatal() {
        let tree = Tree::from_newick("(A:1,B:-0.5);").unwrap();
        assert!(matches!(
            accumulate_distances(&tree),
            Err(TreeError::NegativeBranchLength { .. })
        ));
    }

    #[test]
    fn test_spread_mean_of_children_not_leaves() {
        // Root has children A (leaf) and (C,D); the root spread must be
        // the mean of its two children, not of the three leaves.
        let tree = Tree::from_newick("(A:1,(C:1,D:1)b:1)r;").unwrap();
        let spread = assign_spread(&tree, 0.0, 10.0);
        let index = tree.name_index();
        let b = spread[index["b"]];
        let root = spread[index["r"]];
        assert_eq!(spread[index["A"]], 0.0);
        assert_eq!(b, 15.0);
        assert_eq!(root, (0.0 + b) / 2.0);
        let leaf_mean = (0.0 + 10.0 + 20.0) / 3.0;
        assert!((root - leaf_mean).abs() > 1e-9);
    }

    #[test]
    fn test_spread_polytomy_mean() {
        let tree = Tree::from_newick("(A:1,B:1,C:1)r;").unwrap();
        let spread = assign_spread(&tree, 0.0, 10.0);
        let root = tree.root.unwrap();
        assert_eq!(spread[root], 10.0);
    }
}
