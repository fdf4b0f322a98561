//! Serialize a [`Scene`] into an SVG document.
//!
//! The document viewBox is centered on the origin, matching the
//! center-origin canvas coordinates the layouts produce.

use std::io;
use std::path::Path;

use svg::node::element::{
    Circle, Definitions, Line, LinearGradient, Path as SvgPath, Polygon, Rectangle, Stop, Text,
};
use svg::Document;
use svg::Node;

use crate::geom::Point;
use crate::scene::{Anchor, Gradient, Paint, Scene, ScenePrimitive, Stroke};

pub fn render(scene: &Scene) -> Document {
    let mut document = Document::new()
        .set("width", scene.width)
        .set("height", scene.height)
        .set(
            "viewBox",
            (
                -scene.width / 2.0,
                -scene.height / 2.0,
                scene.width,
                scene.height,
            ),
        )
        .set("font-family", scene.font_family.clone());

    if !scene.gradients().is_empty() {
        let mut defs = Definitions::new();
        for gradient in scene.gradients() {
            defs = defs.add(gradient_element(gradient));
        }
        document = document.add(defs);
    }

    for primitive in scene.primitives() {
        document = add_primitive(document, primitive);
    }
    document
}

pub fn save<P: AsRef<Path>>(path: P, scene: &Scene) -> io::Result<()> {
    svg::save(path, &render(scene))
}

fn gradient_ref(id: u32) -> String {
    format!("url(#grad{id})")
}

fn paint_value(paint: Paint) -> String {
    match paint {
        Paint::Solid(color) => color.to_hex(),
        Paint::Gradient(id) => gradient_ref(id),
    }
}

fn gradient_element(gradient: &Gradient) -> LinearGradient {
    let mut element = LinearGradient::new()
        .set("id", format!("grad{}", gradient.id))
        .set("gradientUnits", "userSpaceOnUse")
        .set("x1", gradient.from.x)
        .set("y1", gradient.from.y)
        .set("x2", gradient.to.x)
        .set("y2", gradient.to.y);
    for (offset, color) in &gradient.stops {
        element = element.add(
            Stop::new()
                .set("offset", *offset)
                .set("stop-color", color.to_hex()),
        );
    }
    element
}

fn apply_stroke<T: Node>(element: &mut T, stroke: &Stroke) {
    element.assign("stroke", paint_value(stroke.paint));
    element.assign("stroke-width", stroke.width);
    if stroke.opacity < 1.0 {
        element.assign("stroke-opacity", stroke.opacity);
    }
    if let Some((dash, gap)) = stroke.dash {
        element.assign("stroke-dasharray", format!("{dash},{gap}"));
    }
}

fn apply_fill<T: Node>(element: &mut T, fill: Paint, opacity: f64, stroke: &Option<Stroke>) {
    element.assign("fill", paint_value(fill));
    if opacity < 1.0 {
        element.assign("fill-opacity", opacity);
    }
    match stroke {
        Some(stroke) => apply_stroke(element, stroke),
        None => element.assign("stroke", "none"),
    }
}

fn arc_to(path: &mut String, radius: f64, span: f64, end: Point) {
    let large_arc = i32::from(span.abs() > 180.0);
    let sweep = i32::from(span >= 0.0);
    path.push_str(&format!(
        "A {radius} {radius} 0 {large_arc} {sweep} {} {} ",
        end.x, end.y
    ));
}

fn on_circle(center: Point, radius: f64, angle_deg: f64) -> Point {
    let theta = angle_deg.to_radians();
    Point::new(
        center.x + radius * theta.cos(),
        center.y + radius * theta.sin(),
    )
}

fn align_value(align: Anchor) -> &'static str {
    match align {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    }
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn add_primitive(document: Document, primitive: &ScenePrimitive) -> Document {
    match primitive {
        ScenePrimitive::Line { from, to, stroke } => {
            let mut line = Line::new()
                .set("x1", from.x)
                .set("y1", from.y)
                .set("x2", to.x)
                .set("y2", to.y);
            apply_stroke(&mut line, stroke);
            document.add(line)
        }
        ScenePrimitive::Polyline { points, stroke } => {
            let mut data = String::new();
            for (i, point) in points.iter().enumerate() {
                let command = if i == 0 { 'M' } else { 'L' };
                data.push_str(&format!("{command} {} {} ", point.x, point.y));
            }
            let mut path = SvgPath::new().set("d", data.trim_end()).set("fill", "none");
            apply_stroke(&mut path, stroke);
            document.add(path)
        }
        ScenePrimitive::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            stroke,
        } => {
            let start = on_circle(*center, *radius, *start_angle);
            let end = on_circle(*center, *radius, *end_angle);
            let mut data = format!("M {} {} ", start.x, start.y);
            arc_to(&mut data, *radius, end_angle - start_angle, end);
            let mut path = SvgPath::new().set("d", data.trim_end()).set("fill", "none");
            apply_stroke(&mut path, stroke);
            document.add(path)
        }
        ScenePrimitive::Cubic {
            from,
            c1,
            c2,
            to,
            stroke,
        } => {
            let data = format!(
                "M {} {} C {} {}, {} {}, {} {}",
                from.x, from.y, c1.x, c1.y, c2.x, c2.y, to.x, to.y
            );
            let mut path = SvgPath::new().set("d", data).set("fill", "none");
            apply_stroke(&mut path, stroke);
            document.add(path)
        }
        ScenePrimitive::Rect {
            min,
            width,
            height,
            fill,
            opacity,
            stroke,
        } => {
            let mut rect = Rectangle::new()
                .set("x", min.x)
                .set("y", min.y)
                .set("width", *width)
                .set("height", *height);
            apply_fill(&mut rect, *fill, *opacity, stroke);
            document.add(rect)
        }
        ScenePrimitive::Circle {
            center,
            radius,
            fill,
            opacity,
            stroke,
        } => {
            let mut circle = Circle::new()
                .set("cx", center.x)
                .set("cy", center.y)
                .set("r", *radius);
            apply_fill(&mut circle, *fill, *opacity, stroke);
            document.add(circle)
        }
        ScenePrimitive::Polygon {
            points,
            fill,
            opacity,
            stroke,
        } => {
            let mut polygon = Polygon::new().set("points", points_attr(points));
            apply_fill(&mut polygon, *fill, *opacity, stroke);
            document.add(polygon)
        }
        ScenePrimitive::Sector {
            center,
            inner_radius,
            outer_radius,
            start_angle,
            end_angle,
            fill,
            opacity,
        } => {
            let span = end_angle - start_angle;
            let outer_start = on_circle(*center, *outer_radius, *start_angle);
            let outer_end = on_circle(*center, *outer_radius, *end_angle);
            let mut data = format!("M {} {} ", outer_start.x, outer_start.y);
            arc_to(&mut data, *outer_radius, span, outer_end);
            if *inner_radius > f64::EPSILON {
                let inner_end = on_circle(*center, *inner_radius, *end_angle);
                let inner_start = on_circle(*center, *inner_radius, *start_angle);
                data.push_str(&format!("L {} {} ", inner_end.x, inner_end.y));
                arc_to(&mut data, *inner_radius, -span, inner_start);
            } else {
                data.push_str(&format!("L {} {} ", center.x, center.y));
            }
            data.push('Z');
            let mut path = SvgPath::new().set("d", data);
            path.assign("fill", paint_value(*fill));
            if *opacity < 1.0 {
                path.assign("fill-opacity", *opacity);
            }
            path.assign("stroke", "none");
            document.add(path)
        }
        ScenePrimitive::Text {
            text,
            anchor,
            angle,
            align,
            size,
            color,
            bold,
        } => {
            let mut element = Text::new(text.clone())
                .set("x", anchor.x)
                .set("y", anchor.y)
                .set("font-size", *size)
                .set("fill", color.to_hex())
                .set("text-anchor", align_value(*align))
                .set("dominant-baseline", "middle");
            if *bold {
                element = element.set("font-weight", "bold");
            }
            if angle.abs() > 0.1 {
                element = element.set(
                    "transform",
                    format!("rotate({} {} {})", angle, anchor.x, anchor.y),
                );
            }
            document.add(element)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::style::TreeStyle;

    fn empty_scene() -> Scene {
        Scene::new(&TreeStyle::default())
    }

    #[test]
    fn test_document_has_centered_viewbox() {
        let markup = render(&empty_scene()).to_string();
        assert!(markup.contains("viewBox=\"-500 -500 1000 1000\""));
    }

    #[test]
    fn test_gradient_defs_and_reference() {
        let mut scene = empty_scene();
        let paint = scene.add_gradient(
            Point::ZERO,
            Point::new(10.0, 0.0),
            vec![(0.0, Color::BLACK), (1.0, Color::WHITE)],
        );
        scene.push(ScenePrimitive::Line {
            from: Point::ZERO,
            to: Point::new(10.0, 0.0),
            stroke: Stroke {
                width: 2.0,
                paint,
                opacity: 1.0,
                dash: None,
            },
        });
        let markup = render(&scene).to_string();
        assert!(markup.contains("id=\"grad0\""));
        assert!(markup.contains("url(#grad0)"));
        assert!(markup.contains("stop-color=\"#ffffff\""));
    }

    #[test]
    fn test_arc_emits_path_command() {
        let mut scene = empty_scene();
        scene.push(ScenePrimitive::Arc {
            center: Point::ZERO,
            radius: 50.0,
            start_angle: 0.0,
            end_angle: 90.0,
            stroke: Stroke::solid(1.0, Color::BLACK),
        });
        let markup = render(&scene).to_string();
        assert!(markup.contains("A 50 50 0 0 1"));
    }

    #[test]
    fn test_rotated_text_gets_transform() {
        let mut scene = empty_scene();
        scene.push(ScenePrimitive::Text {
            text: "leaf".to_string(),
            anchor: Point::new(10.0, 20.0),
            angle: 45.0,
            align: Anchor::Start,
            size: 12.0,
            color: Color::BLACK,
            bold: false,
        });
        let markup = render(&scene).to_string();
        assert!(markup.contains("rotate(45 10 20)"));
        assert!(markup.contains("text-anchor=\"start\""));
    }

    #[test]
    fn test_dashed_stroke() {
        let mut scene = empty_scene();
        scene.push(ScenePrimitive::Line {
            from: Point::ZERO,
            to: Point::new(5.0, 5.0),
            stroke: Stroke {
                width: 1.0,
                paint: Paint::Solid(Color::GRAY),
                opacity: 1.0,
                dash: Some((6.0, 4.0)),
            },
        });
        let markup = render(&scene).to_string();
        assert!(markup.contains("stroke-dasharray=\"6,4\""));
    }
}
