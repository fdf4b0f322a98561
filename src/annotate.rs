//! Annotation overlays: names, brackets, axes, legends, bars, titles.
//!
//! Like the overlays in `painter`, everything here is stateless over
//! the laid-out tree; legends and bars place themselves in canvas
//! corners using only the style dimensions.

use log::warn;

use crate::color::{Color, ColorScale};
use crate::geom::Point;
use crate::scene::{Anchor, Paint, Scene, ScenePrimitive, Stroke};
use crate::tree::layout::Projection;
use crate::tree::Tree;
use crate::TreePainter;

#[derive(Debug, Clone)]
pub struct AxisOptions {
    pub label: String,
    /// Draw a gridline across the spread axis at every tick.
    pub grid: bool,
    /// Distance between the leaf tips and the axis.
    pub padding: f64,
    pub tick_size: f64,
    pub stroke_width: f64,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            label: "Time".to_string(),
            grid: false,
            padding: 20.0,
            tick_size: 6.0,
            stroke_width: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitlePosition {
    Top,
    Bottom,
    Left,
    Right,
}

impl TreePainter {
    fn text(&self, text: &str, anchor: Point, angle: f64, align: Anchor, size: f64) -> ScenePrimitive {
        ScenePrimitive::Text {
            text: text.to_string(),
            anchor,
            angle,
            align,
            size,
            color: self.style.label_color,
            bold: false,
        }
    }

    /// Label every named leaf, `padding` beyond its tip. Radial labels
    /// rotate with their branch and flip on the left half for
    /// readability.
    pub fn add_leaf_names(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        padding: f64,
    ) {
        for leaf in tree.leaves() {
            let Some(name) = tree.nodes[leaf].name.clone() else {
                continue;
            };
            let anchor = layout.leaf_anchor(tree, leaf, padding);
            scene.push(self.text(
                &name,
                anchor.position,
                anchor.angle,
                anchor.align,
                self.style.font_size,
            ));
        }
    }

    /// Label named internal nodes near their positions.
    pub fn add_node_names(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        dx: f64,
        dy: f64,
    ) {
        for id in tree.preorder() {
            let node = &tree.nodes[id];
            if node.is_leaf() {
                continue;
            }
            let Some(name) = node.name.clone() else {
                continue;
            };
            let position = layout.position(id);
            scene.push(self.text(
                &name,
                Point::new(position.x + dx, position.y + dy),
                0.0,
                Anchor::Middle,
                self.style.font_size * 0.8,
            ));
        }
    }

    /// Group clades with brackets and text labels, placed beyond the
    /// deepest tip. `labels` maps node names to label text; unknown
    /// names are skipped.
    pub fn add_clade_labels(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        labels: &[(String, String)],
        offset: f64,
    ) {
        let index = tree.name_index();
        for (target, text) in labels {
            let Some(&node) = index.get(target.as_str()) else {
                warn!("clade label targets unknown node '{target}'; skipped");
                continue;
            };
            let Some(bracket) = layout.clade_bracket(tree, node, offset) else {
                continue;
            };
            let stroke = Stroke::solid(1.5, self.style.label_color);
            for segment in bracket.segments {
                Self::push_connector(scene, segment, stroke);
            }
            scene.push(self.text(
                text,
                bracket.label.position,
                bracket.label.angle,
                bracket.label.align,
                self.style.font_size,
            ));
        }
    }

    /// A time/distance axis with ticks at absolute time values.
    /// Vertical layouts get a baseline below the leaf rows; both
    /// projections support gridlines at `tick × scale`.
    pub fn add_time_axis(
        &self,
        scene: &mut Scene,
        tree: &Tree,
        layout: &impl Projection,
        ticks: &[f64],
        tick_labels: Option<&[String]>,
        options: &AxisOptions,
    ) {
        if ticks.is_empty() {
            return;
        }
        let max_tick = ticks.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let stroke = Stroke::solid(options.stroke_width, self.style.label_color);
        let grid_stroke = Stroke {
            width: 1.0,
            paint: Paint::Solid(Color::rgb(0xcc, 0xcc, 0xcc)),
            opacity: 0.5,
            dash: None,
        };

        let baseline = layout.axis_baseline(tree, max_tick, options.padding);
        if let Some((from, to)) = baseline {
            scene.push(ScenePrimitive::Line { from, to, stroke });
        }

        for (i, &tick) in ticks.iter().enumerate() {
            if options.grid {
                if let Some(gridline) = layout.depth_gridline(tree, tick) {
                    Self::push_connector(scene, gridline, grid_stroke);
                }
            }

            let label = match tick_labels.and_then(|labels| labels.get(i)) {
                Some(label) => label.clone(),
                None => format!("{tick}"),
            };
            let anchor = layout.axis_anchor(tree, tick, options.padding);
            if baseline.is_some() {
                scene.push(ScenePrimitive::Line {
                    from: anchor.position,
                    to: Point::new(anchor.position.x, anchor.position.y + options.tick_size),
                    stroke,
                });
                scene.push(self.text(
                    &label,
                    Point::new(
                        anchor.position.x,
                        anchor.position.y + options.tick_size + self.style.font_size,
                    ),
                    0.0,
                    Anchor::Middle,
                    self.style.font_size,
                ));
            } else {
                scene.push(self.text(
                    &label,
                    anchor.position,
                    anchor.angle,
                    anchor.align,
                    self.style.font_size,
                ));
            }
        }

        if let Some((from, to)) = baseline {
            scene.push(self.text(
                &options.label,
                Point::new(
                    (from.x + to.x) / 2.0,
                    from.y + options.tick_size + self.style.font_size * 2.5,
                ),
                0.0,
                Anchor::Middle,
                self.style.font_size,
            ));
        }
    }

    /// A bar spanning `length` tree units, with end ticks and a label.
    /// Placed near the bottom-left corner.
    pub fn add_scale_bar(
        &self,
        scene: &mut Scene,
        layout: &impl Projection,
        length: f64,
        label: Option<&str>,
    ) {
        let pixels = length * layout.scale();
        let x = -self.style.width / 2.0 + 20.0;
        let y = self.style.height / 2.0 - 20.0;
        let stroke = Stroke::solid(2.0, self.style.label_color);
        let tick = 6.0;

        scene.push(ScenePrimitive::Line {
            from: Point::new(x, y),
            to: Point::new(x + pixels, y),
            stroke,
        });
        for end_x in [x, x + pixels] {
            scene.push(ScenePrimitive::Line {
                from: Point::new(end_x, y - tick / 2.0),
                to: Point::new(end_x, y + tick / 2.0),
                stroke,
            });
        }
        let label = label.map(str::to_string).unwrap_or_else(|| format!("{length}"));
        scene.push(self.text(
            &label,
            Point::new(x + pixels / 2.0, y - tick - 2.0),
            0.0,
            Anchor::Middle,
            self.style.font_size,
        ));
    }

    pub fn add_title(&self, scene: &mut Scene, text: &str, position: TitlePosition, pad: f64) {
        let (x, y) = match position {
            TitlePosition::Top => (0.0, -self.style.height / 2.0 + pad),
            TitlePosition::Bottom => (0.0, self.style.height / 2.0 - pad),
            TitlePosition::Left => (-self.style.width / 2.0 + pad, 0.0),
            TitlePosition::Right => (self.style.width / 2.0 - pad, 0.0),
        };
        scene.push(ScenePrimitive::Text {
            text: text.to_string(),
            anchor: Point::new(x, y),
            angle: 0.0,
            align: Anchor::Middle,
            size: self.style.font_size * 2.0,
            color: self.style.label_color,
            bold: true,
        });
    }

    /// Colored-circle legend for categorical data. `position` overrides
    /// the default top-left placement.
    pub fn add_categorical_legend(
        &self,
        scene: &mut Scene,
        entries: &[(String, Color)],
        title: &str,
        position: Option<Point>,
    ) {
        if entries.is_empty() {
            return;
        }
        let origin = position.unwrap_or_else(|| {
            Point::new(
                -self.style.width / 2.0 + 30.0,
                -self.style.height / 2.0 + 30.0,
            )
        });
        let font = self.style.font_size;
        let radius = 6.0;

        scene.push(ScenePrimitive::Text {
            text: title.to_string(),
            anchor: origin,
            angle: 0.0,
            align: Anchor::Start,
            size: font + 2.0,
            color: self.style.label_color,
            bold: true,
        });

        let mut y = origin.y + font * 1.5;
        for (label, color) in entries {
            scene.push(ScenePrimitive::Circle {
                center: Point::new(origin.x + radius, y),
                radius,
                fill: Paint::Solid(*color),
                opacity: 1.0,
                stroke: None,
            });
            scene.push(self.text(
                label,
                Point::new(origin.x + radius * 2.5, y),
                0.0,
                Anchor::Start,
                font,
            ));
            y += font * 1.4;
        }
    }

    /// Legend naming the two gradient endpoints of transfer arcs.
    pub fn add_transfer_legend(
        &self,
        scene: &mut Scene,
        colors: (Color, Color),
        labels: (&str, &str),
        position: Option<Point>,
    ) {
        let entries = vec![
            (labels.0.to_string(), colors.0),
            (labels.1.to_string(), colors.1),
        ];
        self.add_categorical_legend(scene, &entries, "Transfer Event", position);
    }

    /// Continuous color-scale legend with min/max value labels.
    pub fn add_color_bar(
        &self,
        scene: &mut Scene,
        scale: &ColorScale,
        vmin: f64,
        vmax: f64,
        title: &str,
        position: Option<Point>,
    ) {
        let origin = position.unwrap_or_else(|| {
            Point::new(
                -self.style.width / 2.0 + 30.0,
                self.style.height / 2.0 - 60.0,
            )
        });
        let width = 100.0;
        let height = 15.0;
        let font = self.style.font_size;

        let paint = scene.add_gradient(
            origin,
            Point::new(origin.x + width, origin.y),
            vec![(0.0, scale.low), (1.0, scale.high)],
        );
        if !title.is_empty() {
            scene.push(ScenePrimitive::Text {
                text: title.to_string(),
                anchor: Point::new(origin.x, origin.y - 10.0),
                angle: 0.0,
                align: Anchor::Start,
                size: font,
                color: self.style.label_color,
                bold: true,
            });
        }
        scene.push(ScenePrimitive::Rect {
            min: origin,
            width,
            height,
            fill: paint,
            opacity: 1.0,
            stroke: Some(Stroke::solid(0.5, self.style.label_color)),
        });
        scene.push(self.text(
            &format!("{vmin:.2}"),
            Point::new(origin.x, origin.y + height + 12.0),
            0.0,
            Anchor::Start,
            font - 2.0,
        ));
        scene.push(self.text(
            &format!("{vmax:.2}"),
            Point::new(origin.x + width, origin.y + height + 12.0),
            0.0,
            Anchor::End,
            font - 2.0,
        ));
    }
}
