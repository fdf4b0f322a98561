//! Phylogenetic tree rendering: layout, time-anchored overlays, SVG.
//!
//! The crate turns a rooted tree with branch lengths into vector
//! drawing commands in one of two projections — radial (fan) or
//! vertical (rectangular elbows) — and overlays biological annotations
//! on the resulting geometry: clade highlights, gene-transfer arcs,
//! per-branch event markers, heatmap bands, legends and axes.
//!
//! Layout and drawing are separate steps. A [`RadialLayout`] or
//! [`VerticalLayout`] computes per-node geometry once; the stateless
//! [`TreePainter`] reads it through the [`Projection`] interface and
//! appends primitives to a [`Scene`], which serializes to SVG.
//!
//! ```
//! use phylodraw::{
//!     RadialLayout, Scene, TransferOptions, TransferRecord, Tree, TreePainter, TreeStyle,
//! };
//!
//! let tree = Tree::from_newick("((A:1,B:1):1,C:2);").unwrap();
//! let style = TreeStyle { radius: 120.0, ..TreeStyle::default() };
//! let layout = RadialLayout::compute(&tree, &style).unwrap();
//!
//! let painter = TreePainter::new(&style);
//! let mut scene = Scene::new(&style);
//! painter.draw_skeleton(&mut scene, &tree, &layout, None);
//! painter.add_leaf_names(&mut scene, &tree, &layout, 10.0);
//!
//! let transfers = vec![TransferRecord {
//!     family: None,
//!     from: "A".into(),
//!     to: "C".into(),
//!     freq: 0.5,
//!     time: None,
//! }];
//! painter.plot_transfers(&mut scene, &tree, &layout, &transfers, &TransferOptions::default());
//!
//! let markup = phylodraw::export::svg::render(&scene).to_string();
//! assert!(markup.starts_with("<svg"));
//! ```

pub mod annotate;
pub mod color;
pub mod error;
pub mod events;
pub mod export;
pub mod geom;
pub mod painter;
pub mod scene;
pub mod style;
pub mod tree;

pub use annotate::{AxisOptions, TitlePosition};
pub use color::{Color, ColorScale, CATEGORICAL};
pub use error::{LayoutError, TreeError};
pub use events::{EventRecord, TransferRecord};
pub use geom::Point;
pub use painter::{
    CurveShape, MarkerOrient, MarkerShape, MarkerStyle, TransferOptions, TreePainter,
};
pub use scene::{Anchor, Gradient, GradientId, Paint, Scene, ScenePrimitive, Stroke};
pub use style::TreeStyle;
pub use tree::layout::{
    Bracket, Connector, EdgePoint, LabelAnchor, NodeGeom, Projection, RadialLayout, Region,
    VerticalLayout, MIDPOINT_FRACTION,
};
pub use tree::{NodeId, Tree, TreeNode};
