use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Render parameters shared by both projections.
///
/// A style is immutable for the duration of a render; overlay calls that
/// need local overrides clone it rather than mutate it. Canvas
/// coordinates are center-origin, so a 1000x1000 canvas spans
/// [-500, 500] on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeStyle {
    pub width: f64,
    pub height: f64,
    /// Drawable radial extent (radius the deepest leaf reaches).
    pub radius: f64,
    /// Angular span of the radial leaf fan, in degrees.
    pub degrees: f64,
    /// Rotation offset applied to every radial angle, in degrees.
    pub rotation: f64,
    /// Margin reserved on every canvas edge in the vertical projection.
    pub margin: f64,
    /// Length of the root stub drawn when the tree carries no stem.
    pub root_stub_length: f64,
    pub branch_width: f64,
    pub branch_color: Color,
    /// Leaf marker radius; zero suppresses leaf markers.
    pub leaf_size: f64,
    pub leaf_color: Color,
    /// Internal-node marker radius; zero suppresses node markers.
    pub node_size: f64,
    pub label_color: Color,
    pub font_size: f64,
    pub font_family: String,
    pub background: Color,
}

impl Default for TreeStyle {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            radius: 400.0,
            degrees: 360.0,
            rotation: -90.0,
            margin: 40.0,
            root_stub_length: 10.0,
            branch_width: 2.0,
            branch_color: Color::BLACK,
            leaf_size: 5.0,
            leaf_color: Color::BLACK,
            node_size: 2.0,
            label_color: Color::BLACK,
            font_size: 12.0,
            font_family: "Arial".to_string(),
            background: Color::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = TreeStyle::default();
        assert_eq!(style.width, 1000.0);
        assert_eq!(style.degrees, 360.0);
        assert_eq!(style.rotation, -90.0);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let style: TreeStyle = serde_json::from_str(r#"{"radius": 120.0}"#).unwrap();
        assert_eq!(style.radius, 120.0);
        assert_eq!(style.height, 1000.0);
    }
}
