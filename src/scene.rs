use crate::color::Color;
use crate::geom::Point;
use crate::style::TreeStyle;

/// Identifier of a gradient definition registered on a [`Scene`].
pub type GradientId = u32;

/// Stroke or fill source: a flat color or a registered gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    Gradient(GradientId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub paint: Paint,
    pub opacity: f64,
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(width: f64, color: Color) -> Self {
        Self {
            width,
            paint: Paint::Solid(color),
            opacity: 1.0,
            dash: None,
        }
    }
}

/// Horizontal text anchoring relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// The primitive vocabulary emitted by layout overlays. Angles are in
/// degrees, already including any style rotation; coordinates are
/// center-origin canvas space.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenePrimitive {
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Stroke,
    },
    /// Circular arc swept from `start_angle` to `end_angle`.
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        stroke: Stroke,
    },
    Cubic {
        from: Point,
        c1: Point,
        c2: Point,
        to: Point,
        stroke: Stroke,
    },
    Rect {
        min: Point,
        width: f64,
        height: f64,
        fill: Paint,
        opacity: f64,
        stroke: Option<Stroke>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Paint,
        opacity: f64,
        stroke: Option<Stroke>,
    },
    Polygon {
        points: Vec<Point>,
        fill: Paint,
        opacity: f64,
        stroke: Option<Stroke>,
    },
    /// Annular wedge between two radii.
    Sector {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
        fill: Paint,
        opacity: f64,
    },
    Text {
        text: String,
        anchor: Point,
        /// Rotation around the anchor, degrees.
        angle: f64,
        align: Anchor,
        size: f64,
        color: Color,
        bold: bool,
    },
}

/// A linear gradient definition in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub id: GradientId,
    pub from: Point,
    pub to: Point,
    pub stops: Vec<(f64, Color)>,
}

/// Append-only sink for drawing commands. Draw order is z-order.
///
/// Gradient identifiers come from a per-scene monotone counter, so two
/// renders of the same input produce identical output.
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub font_family: String,
    primitives: Vec<ScenePrimitive>,
    gradients: Vec<Gradient>,
    next_gradient: GradientId,
}

impl Scene {
    /// An empty scene with a background rectangle covering the canvas.
    pub fn new(style: &TreeStyle) -> Self {
        let mut scene = Self {
            width: style.width,
            height: style.height,
            font_family: style.font_family.clone(),
            primitives: Vec::new(),
            gradients: Vec::new(),
            next_gradient: 0,
        };
        scene.push(ScenePrimitive::Rect {
            min: Point::new(-style.width / 2.0, -style.height / 2.0),
            width: style.width,
            height: style.height,
            fill: Paint::Solid(style.background),
            opacity: 1.0,
            stroke: None,
        });
        scene
    }

    pub fn push(&mut self, primitive: ScenePrimitive) {
        self.primitives.push(primitive);
    }

    /// Register a linear gradient and return a paint referencing it.
    pub fn add_gradient(&mut self, from: Point, to: Point, stops: Vec<(f64, Color)>) -> Paint {
        let id = self.next_gradient;
        self.next_gradient += 1;
        self.gradients.push(Gradient { id, from, to, stops });
        Paint::Gradient(id)
    }

    pub fn primitives(&self) -> &[ScenePrimitive] {
        &self.primitives
    }

    pub fn gradients(&self) -> &[Gradient] {
        &self.gradients
    }
}
