use std::collections::HashMap;

use log::warn;

use crate::color::{Color, ColorScale, CATEGORICAL};
use crate::events::{EventRecord, TransferRecord};
use crate::geom::Point;
use crate::scene::{Paint, Scene, ScenePrimitive, Stroke};
use crate::style::TreeStyle;
use crate::tree::layout::{Connector, Projection, Region, MIDPOINT_FRACTION};
use crate::tree::{NodeId, Tree};

/// Curve family used for transfer arcs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveShape {
    /// Both control points pulled toward the root.
    C,
    /// Source control pushed away from the root, destination pulled in.
    S,
}

#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Records with `freq` below this are skipped entirely.
    pub filter_below: f64,
    pub curve: CurveShape,
    /// Source and destination endpoint colors; `None` uses `color`.
    pub gradient: Option<(Color, Color)>,
    pub color: Color,
    pub scale_width_by_freq: bool,
    pub stroke_width: f64,
    /// How far the control points pull the curve off the tree.
    pub arc_intensity: f64,
    pub opacity: f64,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            filter_below: 0.1,
            curve: CurveShape::C,
            gradient: Some((Color::rgb(0x80, 0x00, 0x80), Color::rgb(0xff, 0xa5, 0x00))),
            color: Color::rgb(0xff, 0xa5, 0x00),
            scale_width_by_freq: true,
            stroke_width: 5.0,
            arc_intensity: 40.0,
            opacity: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
}

/// Orientation policy for markers placed on edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerOrient {
    /// Fixed rotation in degrees.
    Fixed(f64),
    /// Rotated along the edge direction.
    Along,
    /// Rotated perpendicular to the edge direction.
    Perpendicular,
}

#[derive(Debug, Clone)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub size: f64,
    pub fill: Color,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub orient: MarkerOrient,
    /// Perpendicular offset off the edge centerline, canvas units.
    pub offset: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            shape: MarkerShape::Circle,
            size: 10.0,
            fill: Color::rgb(0, 0, 255),
            stroke: None,
            stroke_width: 1.0,
            opacity: 1.0,
            orient: MarkerOrient::Fixed(0.0),
            offset: 0.0,
        }
    }
}

/// Stateless drawing operations over a laid-out tree.
///
/// Every method only reads node geometry through the [`Projection`]
/// interface and appends primitives to the scene; none of them touch
/// layout state, so overlays can be stacked in any order and the draw
/// order on the sink is the z-order.
#[derive(Debug, Clone)]
pub struct TreePainter {
    pub(crate) style: TreeStyle,
}

impl TreePainter {
    pub fn new(style: &TreeStyle) -> Self {
        Self {
            style: style.clone(),
        }
    }

    fn branch_stroke(&self, color: Color) -> Stroke {
        Stroke::solid(self.style.branch_width, color)
    }

    pub(crate) fn push_connector(scene: &mut Scene, connector: Connector, stroke: Stroke) {
        match connector {
            Connector::Line { from, to } => scene.push(ScenePrimitive::Line { from, to, stroke }),
            Connector::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => scene.push(ScenePrimitive::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                stroke,
            }),
        }
    }

    fn push_region(scene: &mut Scene, region: Region, color: Color, opacity: f64) {
        match region {
            Region::Rect { min, width, height } => scene.push(ScenePrimitive::Rect {
                min,
                width,
                height,
                fill: Paint::Solid(color),
                opacity,
                stroke: None,
            }),
            Region::Sector {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
            } => scene.push(ScenePrimitive::Sector {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
                fill: Paint::Solid(color),
                opacity,
            }),
        }
    }

    /// Draw the tree skeleton: one edge per non-root node, the child
    /// connector at every internal node, the root stub, and leaf and
    /// internal-node markers. `branch_colors` overrides the style color
    /// per branch (keyed by the child node of the branch).
    pub fn draw_skeleton(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        branch_colors: Option<&HashMap<NodeId, Color>>,
    ) {
        for id in tree.postorder() {
            let node = &tree.nodes[id];
            let color = branch_colors
                .and_then(|map| map.get(&id).copied())
                .unwrap_or(self.style.branch_color);

            if node.parent.is_some() {
                if let (Ok(start), Ok(end)) = (
                    layout.edge_point(tree, id, 0.0),
                    layout.edge_point(tree, id, 1.0),
                ) {
                    scene.push(ScenePrimitive::Line {
                        from: start.point,
                        to: end.point,
                        stroke: self.branch_stroke(color),
                    });
                }
            } else if let Some((from, to)) = layout.root_stub(tree) {
                scene.push(ScenePrimitive::Line {
                    from,
                    to,
                    stroke: self.branch_stroke(color),
                });
            }

            if !node.is_leaf() {
                if let Some(connector) = layout.child_connector(tree, id) {
                    Self::push_connector(scene, connector, self.branch_stroke(color));
                }
                if !node.is_root() && self.style.node_size > 0.0 {
                    scene.push(ScenePrimitive::Circle {
                        center: layout.position(id),
                        radius: self.style.node_size,
                        fill: Paint::Solid(color),
                        opacity: 1.0,
                        stroke: None,
                    });
                }
            } else if self.style.leaf_size > 0.0 {
                scene.push(ScenePrimitive::Circle {
                    center: layout.position(id),
                    radius: self.style.leaf_size,
                    fill: Paint::Solid(self.style.leaf_color),
                    opacity: 1.0,
                    stroke: None,
                });
            }
        }
    }

    /// Shade the region behind a clade, from the clade root's depth out
    /// to the tree's maximum depth. Nothing is drawn for a leaf.
    pub fn highlight_clade(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        node: NodeId,
        color: Color,
        opacity: f64,
        padding: f64,
    ) {
        if let Some(region) = layout.clade_region(tree, node, padding) {
            Self::push_region(scene, region, color, opacity);
        }
    }

    /// Re-stroke one branch in a solid color, typically thicker than
    /// the skeleton. No-op on the root.
    pub fn highlight_branch(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        node: NodeId,
        color: Color,
        width: Option<f64>,
    ) {
        let width = width.unwrap_or(self.style.branch_width * 2.0);
        if let (Ok(start), Ok(end)) = (
            layout.edge_point(tree, node, 0.0),
            layout.edge_point(tree, node, 1.0),
        ) {
            scene.push(ScenePrimitive::Line {
                from: start.point,
                to: end.point,
                stroke: Stroke::solid(width, color),
            });
        }
    }

    /// Re-stroke one branch with a linear gradient running from the
    /// parent end to the child end. No-op on the root.
    pub fn gradient_branch(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        node: NodeId,
        colors: (Color, Color),
        width: Option<f64>,
    ) {
        let width = width.unwrap_or(self.style.branch_width);
        if let (Ok(start), Ok(end)) = (
            layout.edge_point(tree, node, 0.0),
            layout.edge_point(tree, node, 1.0),
        ) {
            let paint = scene.add_gradient(
                start.point,
                end.point,
                vec![(0.0, colors.0), (1.0, colors.1)],
            );
            scene.push(ScenePrimitive::Line {
                from: start.point,
                to: end.point,
                stroke: Stroke {
                    width,
                    paint,
                    opacity: 1.0,
                    dash: None,
                },
            });
        }
    }

    /// Resolve the draw position for a record on the incoming edge of
    /// `node`: by absolute time when one is given, at the branch
    /// midpoint otherwise. `None` when the node is the root.
    fn record_fraction(
        layout: &impl Projection,
        tree: &Tree,
        node: NodeId,
        time: Option<f64>,
    ) -> Option<f64> {
        match time {
            Some(time) => layout.fraction_from_time(tree, node, time).ok(),
            None => tree.nodes[node].parent.map(|_| MIDPOINT_FRACTION),
        }
    }

    /// Draw one curved arc per transfer record. Endpoints land on the
    /// source and destination branches at the record's time, or at the
    /// branch midpoints when the record carries none. Records whose
    /// endpoints cannot be resolved are skipped, never fatal.
    pub fn plot_transfers(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        records: &[TransferRecord],
        options: &TransferOptions,
    ) {
        let index = tree.name_index();
        for record in records {
            if record.freq < options.filter_below {
                continue;
            }
            let (Some(&src), Some(&dst)) = (
                index.get(record.from.as_str()),
                index.get(record.to.as_str()),
            ) else {
                warn!(
                    "transfer {} -> {} names a node missing from the tree; skipped",
                    record.from, record.to
                );
                continue;
            };

            let endpoint = |node: NodeId| -> Option<Point> {
                let fraction = Self::record_fraction(layout, tree, node, record.time)?;
                Some(layout.edge_point(tree, node, fraction).ok()?.point)
            };
            let (Some(from), Some(to)) = (endpoint(src), endpoint(dst)) else {
                warn!(
                    "transfer {} -> {} touches the root branch; skipped",
                    record.from, record.to
                );
                continue;
            };

            let (c1, c2) = match options.curve {
                CurveShape::C => (
                    layout.curve_control(from, options.arc_intensity),
                    layout.curve_control(to, options.arc_intensity),
                ),
                CurveShape::S => (
                    layout.curve_control(from, -options.arc_intensity),
                    layout.curve_control(to, options.arc_intensity),
                ),
            };

            let width = if options.scale_width_by_freq {
                options.stroke_width * record.freq
            } else {
                options.stroke_width
            };
            let paint = match options.gradient {
                Some((source, arrival)) => {
                    scene.add_gradient(from, to, vec![(0.0, source), (1.0, arrival)])
                }
                None => Paint::Solid(options.color),
            };

            scene.push(ScenePrimitive::Cubic {
                from,
                c1,
                c2,
                to,
                stroke: Stroke {
                    width,
                    paint,
                    opacity: options.opacity,
                    dash: None,
                },
            });
        }
    }

    /// Place one marker per event record, positioned on the named
    /// node's branch exactly like transfer endpoints. `kinds` filters
    /// by event type; `None` accepts every record.
    pub fn mark_events(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        records: &[EventRecord],
        kinds: Option<&[&str]>,
        marker: &MarkerStyle,
    ) {
        let index = tree.name_index();
        for record in records {
            if let Some(kinds) = kinds {
                if !kinds.contains(&record.kind.as_str()) {
                    continue;
                }
            }
            let Some(&node) = index.get(record.node.as_str()) else {
                warn!(
                    "event '{}' names node '{}' missing from the tree; skipped",
                    record.kind, record.node
                );
                continue;
            };
            let Some(fraction) = Self::record_fraction(layout, tree, node, record.time) else {
                warn!(
                    "event '{}' targets the root branch of '{}'; skipped",
                    record.kind, record.node
                );
                continue;
            };
            if let Ok(edge) = layout.edge_point(tree, node, fraction) {
                self.place_marker(scene, edge.point, edge.tangent, marker);
            }
        }
    }

    /// Place markers on arbitrary branches at a fixed fraction.
    pub fn add_branch_markers(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        names: &[&str],
        fraction: f64,
        marker: &MarkerStyle,
    ) {
        let index = tree.name_index();
        for name in names {
            let Some(&node) = index.get(*name) else {
                warn!("branch marker names unknown node '{name}'; skipped");
                continue;
            };
            if let Ok(edge) = layout.edge_point(tree, node, fraction) {
                self.place_marker(scene, edge.point, edge.tangent, marker);
            }
        }
    }

    /// Place markers just beyond the named leaf tips.
    pub fn add_leaf_markers(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        names: &[&str],
        tip_offset: f64,
        marker: &MarkerStyle,
    ) {
        let index = tree.name_index();
        for name in names {
            let Some(&node) = index.get(*name) else {
                warn!("leaf marker names unknown node '{name}'; skipped");
                continue;
            };
            let anchor = layout.leaf_anchor(tree, node, tip_offset);
            self.place_marker(scene, anchor.position, anchor.angle, marker);
        }
    }

    /// Place markers at the named nodes' own positions.
    pub fn add_node_markers(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        names: &[&str],
        marker: &MarkerStyle,
    ) {
        let index = tree.name_index();
        for name in names {
            let Some(&node) = index.get(*name) else {
                warn!("node marker names unknown node '{name}'; skipped");
                continue;
            };
            self.place_marker(scene, layout.position(node), 0.0, marker);
        }
    }

    fn place_marker(&self, scene: &mut Scene, center: Point, edge_angle: f64, marker: &MarkerStyle) {
        let rotation = match marker.orient {
            MarkerOrient::Fixed(angle) => angle,
            MarkerOrient::Along => edge_angle,
            MarkerOrient::Perpendicular => edge_angle + 90.0,
        };
        let center = if marker.offset != 0.0 {
            let perp = (edge_angle + 90.0).to_radians();
            Point::new(
                center.x + marker.offset * perp.cos(),
                center.y + marker.offset * perp.sin(),
            )
        } else {
            center
        };
        let stroke = marker
            .stroke
            .map(|color| Stroke::solid(marker.stroke_width, color));

        match marker.shape {
            MarkerShape::Circle => scene.push(ScenePrimitive::Circle {
                center,
                radius: marker.size / 2.0,
                fill: Paint::Solid(marker.fill),
                opacity: marker.opacity,
                stroke,
            }),
            MarkerShape::Square => {
                let half = marker.size / 2.0;
                let corners = [
                    Point::new(center.x - half, center.y - half),
                    Point::new(center.x + half, center.y - half),
                    Point::new(center.x + half, center.y + half),
                    Point::new(center.x - half, center.y + half),
                ];
                scene.push(ScenePrimitive::Polygon {
                    points: corners
                        .iter()
                        .map(|&p| rotate_around(p, center, rotation))
                        .collect(),
                    fill: Paint::Solid(marker.fill),
                    opacity: marker.opacity,
                    stroke,
                });
            }
            MarkerShape::Triangle => {
                let size = marker.size;
                let height = size * 3f64.sqrt() / 2.0;
                let corners = [
                    Point::new(center.x, center.y - height * 2.0 / 3.0),
                    Point::new(center.x - size / 2.0, center.y + height / 3.0),
                    Point::new(center.x + size / 2.0, center.y + height / 3.0),
                ];
                scene.push(ScenePrimitive::Polygon {
                    points: corners
                        .iter()
                        .map(|&p| rotate_around(p, center, rotation))
                        .collect(),
                    fill: Paint::Solid(marker.fill),
                    opacity: marker.opacity,
                    stroke,
                });
            }
        }
    }

    /// One filled cell per leaf present in `colors`, placed just beyond
    /// the tree's maximum depth. Leaves without an entry are skipped.
    pub fn add_ring(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        colors: &HashMap<String, Color>,
        width: f64,
        padding: f64,
    ) {
        for leaf in tree.leaves() {
            let Some(name) = tree.nodes[leaf].name.as_deref() else {
                continue;
            };
            let Some(&color) = colors.get(name) else {
                continue;
            };
            if let Some(region) = layout.leaf_cell(tree, leaf, padding, width) {
                Self::push_region(scene, region, color, 1.0);
            }
        }
    }

    /// A heatmap band: one cell per leaf present in `values`, colored
    /// along the scale between the observed min and max. Leaves with no
    /// value are skipped, not zero-filled.
    pub fn add_heatmap(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        values: &HashMap<String, f64>,
        scale: &ColorScale,
        width: f64,
        offset: f64,
    ) {
        let finite: Vec<f64> = values.values().copied().filter(|v| v.is_finite()).collect();
        let Some(min) = finite.iter().copied().reduce(f64::min) else {
            return;
        };
        let max = finite.iter().copied().reduce(f64::max).unwrap_or(min);
        let span = (max - min).max(1e-12);

        for leaf in tree.leaves() {
            let Some(name) = tree.nodes[leaf].name.as_deref() else {
                continue;
            };
            let Some(&value) = values.get(name) else {
                continue;
            };
            if !value.is_finite() {
                continue;
            }
            if let Some(region) = layout.leaf_cell(tree, leaf, offset, width) {
                Self::push_region(scene, region, scale.sample((value - min) / span), 1.0);
            }
        }
    }

    /// Color every branch by a continuous per-node color assignment,
    /// blending parent color into child color along each branch. Nodes
    /// without a color keep the default branch color.
    pub fn plot_continuous_variable(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        colors: &HashMap<String, Color>,
        width: Option<f64>,
    ) {
        let lookup = |id: NodeId| -> Option<Color> {
            tree.nodes[id]
                .name
                .as_deref()
                .and_then(|name| colors.get(name).copied())
        };
        let width = width.unwrap_or(self.style.branch_width);

        for id in tree.preorder() {
            let Some(parent) = tree.nodes[id].parent else {
                continue;
            };
            match (lookup(parent), lookup(id)) {
                (Some(parent_color), Some(child_color)) => {
                    self.gradient_branch(
                        scene,
                        tree,
                        layout,
                        id,
                        (parent_color, child_color),
                        Some(width),
                    );
                }
                _ => {
                    self.highlight_branch(
                        scene,
                        tree,
                        layout,
                        id,
                        self.style.branch_color,
                        Some(width),
                    );
                }
            }
        }

        // Restroke internal connectors and node markers in their own color.
        for id in tree.postorder() {
            if tree.nodes[id].is_leaf() {
                continue;
            }
            let Some(color) = lookup(id) else {
                continue;
            };
            if let Some(connector) = layout.child_connector(tree, id) {
                Self::push_connector(scene, connector, Stroke::solid(width, color));
            }
            if self.style.node_size > 0.0 {
                scene.push(ScenePrimitive::Circle {
                    center: layout.position(id),
                    radius: self.style.node_size,
                    fill: Paint::Solid(color),
                    opacity: 1.0,
                    stroke: None,
                });
            }
        }
    }

    /// Color branches by a categorical trait. Branches crossing a
    /// category boundary are stroked with a parent-to-child gradient.
    /// Returns the palette used so a legend can be drawn from it.
    pub fn plot_categorical_trait(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        mapping: &HashMap<String, String>,
        palette: Option<&HashMap<String, Color>>,
    ) -> Vec<(String, Color)> {
        let palette: Vec<(String, Color)> = match palette {
            Some(given) => {
                let mut entries: Vec<_> =
                    given.iter().map(|(k, v)| (k.clone(), *v)).collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                entries
            }
            None => {
                let mut values: Vec<&String> = mapping.values().collect();
                values.sort();
                values.dedup();
                values
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| (value.clone(), CATEGORICAL[i % CATEGORICAL.len()]))
                    .collect()
            }
        };
        let color_of = |id: NodeId| -> Color {
            tree.nodes[id]
                .name
                .as_deref()
                .and_then(|name| mapping.get(name))
                .and_then(|value| {
                    palette
                        .iter()
                        .find(|(key, _)| key == value)
                        .map(|(_, color)| *color)
                })
                .unwrap_or(self.style.branch_color)
        };

        for id in tree.preorder() {
            let Some(parent) = tree.nodes[id].parent else {
                continue;
            };
            let child_color = color_of(id);
            let parent_color = color_of(parent);
            if child_color != parent_color {
                self.gradient_branch(scene, tree, layout, id, (parent_color, child_color), None);
            } else {
                self.highlight_branch(
                    scene,
                    tree,
                    layout,
                    id,
                    child_color,
                    Some(self.style.branch_width),
                );
            }
        }
        for id in tree.postorder() {
            if tree.nodes[id].is_leaf() {
                continue;
            }
            let color = color_of(id);
            if let Some(connector) = layout.child_connector(tree, id) {
                Self::push_connector(
                    scene,
                    connector,
                    Stroke::solid(self.style.branch_width, color),
                );
            }
            if self.style.node_size > 0.0 {
                scene.push(ScenePrimitive::Circle {
                    center: layout.position(id),
                    radius: self.style.node_size,
                    fill: Paint::Solid(color),
                    opacity: 1.0,
                    stroke: None,
                });
            }
        }
        palette
    }
}

fn rotate_around(point: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}
