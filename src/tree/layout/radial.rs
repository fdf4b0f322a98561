use super::{
    accumulate_distances, assign_spread, Bracket, Connector, EdgePoint, LabelAnchor, NodeGeom,
    Projection, Region,
};
use crate::error::{LayoutError, TreeError};
use crate::geom::{lerp, normalize_degrees, polar_point, Point};
use crate::scene::Anchor;
use crate::style::TreeStyle;
use crate::tree::{NodeId, Tree};

/// Polar projection: depth maps to radius, spread to angle. The canvas
/// origin is the tree center; all angles already include the style
/// rotation when converted to points.
#[derive(Debug, Clone)]
pub struct RadialLayout {
    geom: Vec<NodeGeom>,
    max_dist: f64,
    scale: f64,
    rotation: f64,
    degrees: f64,
    angle_step: f64,
}

impl RadialLayout {
    pub fn compute(tree: &Tree, style: &TreeStyle) -> Result<Self, TreeError> {
        let (distances, max_dist) = accumulate_distances(tree)?;
        let scale = if max_dist > 0.0 {
            style.radius / max_dist
        } else {
            1.0
        };

        // Dividing the span by the leaf count (not count - 1) keeps the
        // first and last leaves of a full circle from colliding.
        let leaf_count = tree.leaf_count().max(1);
        let angle_step = style.degrees / leaf_count as f64;
        let spread = assign_spread(tree, 0.0, angle_step);

        let geom = (0..tree.nodes.len())
            .map(|id| {
                let depth = distances[id] * scale;
                NodeGeom {
                    dist_to_root: distances[id],
                    spread: spread[id],
                    depth,
                    position: polar_point(spread[id], depth, style.rotation),
                }
            })
            .collect();

        log::debug!(
            "radial layout: {} leaves, max distance {max_dist}, scale {scale}",
            leaf_count
        );

        Ok(Self {
            geom,
            max_dist,
            scale,
            rotation: style.rotation,
            degrees: style.degrees,
            angle_step,
        })
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Angular width of one leaf slot, degrees.
    pub fn angle_step(&self) -> f64 {
        self.angle_step
    }

    /// Radius of the deepest node.
    fn max_depth(&self) -> f64 {
        self.max_dist * self.scale
    }
}

impl Projection for RadialLayout {
    fn geom(&self, node: NodeId) -> &NodeGeom {
        &self.geom[node]
    }

    fn max_distance(&self) -> f64 {
        self.max_dist
    }

    fn scale(&self) -> f64 {
        self.scale
    }

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
        let r0 = self.geom[parent].depth;
        let r1 = self.geom[node].depth;
        let radius = lerp(r0, r1, t);
        let angle = self.geom[node].spread;
        let tangent = if r1 >= r0 {
            angle + self.rotation
        } else {
            angle + self.rotation + 180.0
        };
        Ok(EdgePoint {
            point: polar_point(angle, radius, self.rotation),
            tangent,
        })
    }

    fn child_connector(&self, tree: &Tree, node: NodeId) -> Option<Connector> {
        let children = &tree.nodes[node].children;
        if children.len() < 2 {
            return None;
        }
        let radius = self.geom[node].depth;
        if radius <= f64::EPSILON {
            return None;
        }
        let first = self.geom[children[0]].spread;
        let last = self.geom[*children.last()?].spread;
        Some(Connector::Arc {
            center: Point::ZERO,
            radius,
            start_angle: first + self.rotation,
            end_angle: last + self.rotation,
        })
    }

    fn root_stub(&self, tree: &Tree) -> Option<(Point, Point)> {
        let root = tree.root?;
        let stem = self.geom[root].dist_to_root;
        if stem * self.scale <= f64::EPSILON {
            return None;
        }
        let angle = self.geom[root].spread;
        let inner = polar_point(angle, self.geom[root].depth - stem * self.scale, self.rotation);
        Some((inner, self.geom[root].position))
    }

    fn clade_region(&self, tree: &Tree, node: NodeId, padding: f64) -> Option<Region> {
        if tree.nodes[node].is_leaf() {
            return None;
        }
        let leaves = tree.leaves_of(node);
        let mut min_angle = f64::INFINITY;
        let mut max_angle = f64::NEG_INFINITY;
        for leaf in leaves {
            min_angle = min_angle.min(self.geom[leaf].spread);
            max_angle = max_angle.max(self.geom[leaf].spread);
        }
        Some(Region::Sector {
            center: Point::ZERO,
            inner_radius: (self.geom[node].depth - padding / 2.0).max(0.0),
            outer_radius: self.max_depth() + padding / 2.0,
            start_angle: min_angle - self.angle_step / 2.0 + self.rotation,
            end_angle: max_angle + self.angle_step / 2.0 + self.rotation,
        })
    }

    fn leaf_cell(&self, tree: &Tree, leaf: NodeId, offset: f64, width: f64) -> Option<Region> {
        if !tree.nodes[leaf].is_leaf() {
            return None;
        }
        let inner = self.max_depth() + offset;
        let angle = self.geom[leaf].spread;
        Some(Region::Sector {
            center: Point::ZERO,
            inner_radius: inner,
            outer_radius: inner + width,
            start_angle: angle - self.angle_step / 2.0 + self.rotation,
            end_angle: angle + self.angle_step / 2.0 + self.rotation,
        })
    }

    fn leaf_anchor(&self, _tree: &Tree, leaf: NodeId, padding: f64) -> LabelAnchor {
        let geom = &self.geom[leaf];
        let total = geom.spread + self.rotation;
        let position = polar_point(geom.spread, geom.depth + padding, self.rotation);
        let normalized = normalize_degrees(total);
        if normalized > 90.0 && normalized < 270.0 {
            // Flip labels on the left half so they read left-to-right.
            LabelAnchor {
                position,
                angle: total + 180.0,
                align: Anchor::End,
            }
        } else {
            LabelAnchor {
                position,
                angle: total,
                align: Anchor::Start,
            }
        }
    }

    fn clade_bracket(&self, tree: &Tree, node: NodeId, offset: f64) -> Option<Bracket> {
        let leaves = tree.leaves_of(node);
        let mut min_angle = f64::INFINITY;
        let mut max_angle = f64::NEG_INFINITY;
        for leaf in &leaves {
            min_angle = min_angle.min(self.geom[*leaf].spread);
            max_angle = max_angle.max(self.geom[*leaf].spread);
        }
        let radius = self.max_depth() + offset;
        let tick = 5.0;
        let segments = vec![
            Connector::Line {
                from: polar_point(min_angle, radius - tick, self.rotation),
                to: polar_point(min_angle, radius, self.rotation),
            },
            Connector::Arc {
                center: Point::ZERO,
                radius,
                start_angle: min_angle + self.rotation,
                end_angle: max_angle + self.rotation,
            },
            Connector::Line {
                from: polar_point(max_angle, radius, self.rotation),
                to: polar_point(max_angle, radius - tick, self.rotation),
            },
        ];
        let mid = (min_angle + max_angle) / 2.0;
        let total = mid + self.rotation;
        let normalized = normalize_degrees(total);
        let (angle, align) = if normalized > 90.0 && normalized < 270.0 {
            (total + 180.0, Anchor::End)
        } else {
            (total, Anchor::Start)
        };
        Some(Bracket {
            segments,
            label: LabelAnchor {
                position: polar_point(mid, radius + 8.0, self.rotation),
                angle,
                align,
            },
        })
    }

    fn depth_gridline(&self, _tree: &Tree, time: f64) -> Option<Connector> {
        let radius = time * self.scale;
        if radius <= f64::EPSILON {
            return None;
        }
        Some(Connector::Arc {
            center: Point::ZERO,
            radius,
            start_angle: self.rotation,
            end_angle: self.degrees + self.rotation,
        })
    }

    fn axis_anchor(&self, _tree: &Tree, time: f64, padding: f64) -> LabelAnchor {
        LabelAnchor {
            position: polar_point(0.0, time * self.scale + padding, self.rotation),
            angle: 0.0,
            align: Anchor::Middle,
        }
    }

    fn axis_baseline(&self, _tree: &Tree, _max_time: f64, _padding: f64) -> Option<(Point, Point)> {
        None
    }

    fn curve_control(&self, point: Point, amount: f64) -> Point {
        let radius = point.radius();
        if radius <= f64::EPSILON {
            return point;
        }
        let factor = (radius - amount) / radius;
        Point::new(point.x * factor, point.y * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_with_radius(radius: f64) -> TreeStyle {
        TreeStyle {
            radius,
            rotation: 0.0,
            ..TreeStyle::default()
        }
    }

    #[test]
    fn test_angular_partition() {
        let tree = Tree::from_newick("((A:1,B:1):1,C:2);").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(120.0)).unwrap();
        let angles: Vec<f64> = tree
            .leaves()
            .into_iter()
            .map(|id| layout.geom(id).spread)
            .collect();
        assert_eq!(angles, vec![0.0, 120.0, 240.0]);
    }

    #[test]
    fn test_scale_and_deepest_leaf() {
        let tree = Tree::from_newick("((A:1,B:1):1,C:2);").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(120.0)).unwrap();
        assert_eq!(layout.max_distance(), 2.0);
        assert_eq!(layout.scale(), 60.0);
        let index = tree.name_index();
        for name in ["A", "B", "C"] {
            assert!((layout.geom(index[name]).depth - 120.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_internal_angle_is_mean_of_children() {
        let tree = Tree::from_newick("(A:1,(C:1,D:1)b:1)r;").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(100.0)).unwrap();
        let index = tree.name_index();
        let step = 360.0 / 3.0;
        let a = layout.geom(index["A"]).spread;
        let b = layout.geom(index["b"]).spread;
        assert_eq!(a, 0.0);
        assert_eq!(b, (step + 2.0 * step) / 2.0);
        let root = layout.geom(index["r"]).spread;
        assert_eq!(root, (a + b) / 2.0);
        // Explicitly not the mean of the three descendant leaves.
        let leaf_mean = (0.0 + step + 2.0 * step) / 3.0;
        assert!((root - leaf_mean).abs() > 1.0);
    }

    #[test]
    fn test_full_circle_has_no_angle_collision() {
        let tree = Tree::from_newick("(A:1,B:1,C:1,D:1);").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(100.0)).unwrap();
        let leaves = tree.leaves();
        let first = layout.geom(leaves[0]).spread;
        let last = layout.geom(*leaves.last().unwrap()).spread;
        assert_eq!(first, 0.0);
        assert_eq!(last, 270.0);
    }

    #[test]
    fn test_single_node_tree_is_finite() {
        let tree = Tree::from_newick("A;").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(100.0)).unwrap();
        let root = tree.root.unwrap();
        let pos = layout.position(root);
        assert!(pos.x.is_finite() && pos.y.is_finite());
        assert_eq!(layout.scale(), 1.0);
    }

    #[test]
    fn test_zero_length_tree_collapses_to_origin() {
        let tree = Tree::from_newick("(A:0,B:0):0;").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(100.0)).unwrap();
        assert_eq!(layout.scale(), 1.0);
        for id in tree.preorder() {
            assert!(layout.position(id).radius() < 1e-9);
        }
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let tree = Tree::from_newick("((A:1,B:3):1,(C:2,D:1):2);").unwrap();
        let style = style_with_radius(200.0);
        let first = RadialLayout::compute(&tree, &style).unwrap();
        let second = RadialLayout::compute(&tree, &style).unwrap();
        for id in tree.preorder() {
            assert_eq!(first.position(id), second.position(id));
            assert_eq!(first.geom(id), second.geom(id));
        }
    }

    #[test]
    fn test_edge_point_round_trip() {
        let tree = Tree::from_newick("((A:1,B:1)ab:1,C:2);").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(120.0)).unwrap();
        let index = tree.name_index();
        let a = index["A"];
        let ab = index["ab"];

        let start = layout.edge_point(&tree, a, 0.0).unwrap();
        assert!((start.point.radius() - layout.geom(ab).depth).abs() < 1e-9);

        let end = layout.edge_point(&tree, a, 1.0).unwrap();
        assert!(end.point.distance(layout.position(a)) < 1e-9);
    }

    #[test]
    fn test_edge_point_on_root_fails() {
        let tree = Tree::from_newick("(A:1,B:1);").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(100.0)).unwrap();
        let root = tree.root.unwrap();
        assert_eq!(
            layout.edge_point(&tree, root, 0.5),
            Err(LayoutError::EdgeNotFound(root))
        );
    }

    #[test]
    fn test_fraction_clamped_not_rejected() {
        let tree = Tree::from_newick("(A:1,B:1);").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(100.0)).unwrap();
        let a = tree.name_index()["A"];
        let below = layout.edge_point(&tree, a, -0.5).unwrap();
        let at_zero = layout.edge_point(&tree, a, 0.0).unwrap();
        assert_eq!(below.point, at_zero.point);
    }

    #[test]
    fn test_fraction_from_time_inverts_linear_map() {
        let tree = Tree::from_newick("((A:1,B:1)ab:1,C:2);").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(120.0)).unwrap();
        let a = tree.name_index()["A"];
        // A's edge spans cumulative time [1, 2].
        let fraction = layout.fraction_from_time(&tree, a, 1.25).unwrap();
        assert!((fraction - 0.25).abs() < 1e-9);
        let recovered = 1.0 + fraction * (2.0 - 1.0);
        assert!((recovered - 1.25).abs() < 1e-9);
        // Out-of-range times clamp.
        assert_eq!(layout.fraction_from_time(&tree, a, -5.0).unwrap(), 0.0);
        assert_eq!(layout.fraction_from_time(&tree, a, 99.0).unwrap(), 1.0);
    }

    #[test]
    fn test_zero_length_edge_time_falls_back_to_midpoint() {
        let tree = Tree::from_newick("((A:0,B:1)ab:1,C:2);").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(120.0)).unwrap();
        let a = tree.name_index()["A"];
        assert_eq!(layout.fraction_from_time(&tree, a, 1.0).unwrap(), 0.5);
    }

    #[test]
    fn test_root_stem_draws_stub() {
        let tree = Tree::from_newick("((A:1,B:1):1,C:2)r:0.5;").unwrap();
        let layout = RadialLayout::compute(&tree, &style_with_radius(100.0)).unwrap();
        let (from, to) = layout.root_stub(&tree).unwrap();
        assert!(from.radius() < 1e-9);
        assert!((to.radius() - 0.5 * layout.scale()).abs() < 1e-9);
    }
}
