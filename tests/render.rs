use std::collections::HashMap;

use phylodraw::{
    AxisOptions, Color, ColorScale, EventRecord, MarkerStyle, Paint, Projection, RadialLayout,
    Scene, ScenePrimitive, TransferOptions, TransferRecord, Tree, TreePainter, TreeStyle,
    VerticalLayout,
};

fn scenario_style() -> TreeStyle {
    TreeStyle {
        radius: 120.0,
        rotation: 0.0,
        ..TreeStyle::default()
    }
}

#[test]
fn radial_scenario_end_to_end() {
    let tree = Tree::from_newick("((A:1,B:1):1,C:2);").unwrap();
    let style = scenario_style();
    let layout = RadialLayout::compute(&tree, &style).unwrap();

    // Root has no stem, both cherries and C end at cumulative distance 2.
    assert_eq!(layout.max_distance(), 2.0);
    assert_eq!(layout.scale(), 60.0);

    let index = tree.name_index();
    let angles: Vec<f64> = ["A", "B", "C"]
        .iter()
        .map(|name| layout.geom(index[name]).spread)
        .collect();
    assert_eq!(angles, vec![0.0, 120.0, 240.0]);

    // The cherry's angle is the mean of its two children.
    let cherry = tree.nodes[index["A"]].parent.unwrap();
    assert_eq!(layout.geom(cherry).spread, 60.0);

    // One midpoint-anchored transfer emits exactly one curve.
    let painter = TreePainter::new(&style);
    let mut scene = Scene::new(&style);
    painter.draw_skeleton(&mut scene, &tree, &layout, None);
    let before = scene
        .primitives()
        .iter()
        .filter(|p| matches!(p, ScenePrimitive::Cubic { .. }))
        .count();
    assert_eq!(before, 0);

    let transfers = vec![TransferRecord {
        family: None,
        from: "A".into(),
        to: "C".into(),
        freq: 0.5,
        time: None,
    }];
    painter.plot_transfers(&mut scene, &tree, &layout, &transfers, &TransferOptions::default());
    let curves = scene
        .primitives()
        .iter()
        .filter(|p| matches!(p, ScenePrimitive::Cubic { .. }))
        .count();
    assert_eq!(curves, 1);
}

#[test]
fn vertical_pipeline_renders_svg() {
    let tree = Tree::from_newick("((A:1,B:1)ab:1,C:2)r;").unwrap();
    let style = TreeStyle::default();
    // Reserve a right margin for the heatmap band.
    let layout = VerticalLayout::compute_with_width(&tree, &style, style.width - 120.0).unwrap();
    let painter = TreePainter::new(&style);
    let mut scene = Scene::new(&style);

    let ab = tree.name_index()["ab"];
    painter.highlight_clade(&mut scene, &tree, &layout, ab, Color::GRAY, 0.3, 10.0);
    painter.draw_skeleton(&mut scene, &tree, &layout, None);
    painter.add_leaf_names(&mut scene, &tree, &layout, 10.0);

    let mut values = HashMap::new();
    values.insert("A".to_string(), 1.0);
    values.insert("B".to_string(), 2.0);
    values.insert("C".to_string(), 3.0);
    painter.add_heatmap(
        &mut scene,
        &tree,
        &layout,
        &values,
        &ColorScale::default(),
        15.0,
        10.0,
    );

    let events = vec![EventRecord {
        family: None,
        kind: "D".into(),
        node: "C".into(),
        time: Some(1.0),
    }];
    painter.mark_events(&mut scene, &tree, &layout, &events, None, &MarkerStyle::default());
    painter.add_time_axis(
        &mut scene,
        &tree,
        &layout,
        &[0.0, 1.0, 2.0],
        None,
        &AxisOptions::default(),
    );
    painter.add_scale_bar(&mut scene, &layout, 0.5, None);

    let markup = phylodraw::export::svg::render(&scene).to_string();
    assert!(markup.starts_with("<svg"));
    // Leaf label content sits on its own line between the text tags.
    assert!(markup.contains("\nA\n</text>"));
    assert!(markup.contains("Time"));
    // Three heatmap cells plus markers made it into the document.
    assert!(markup.matches("<rect").count() >= 4);
}

#[test]
fn overlays_leave_layout_untouched() {
    let tree = Tree::from_newick("((A:1,B:1):1,C:2);").unwrap();
    let style = scenario_style();
    let layout = RadialLayout::compute(&tree, &style).unwrap();
    let reference = RadialLayout::compute(&tree, &style).unwrap();

    let painter = TreePainter::new(&style);
    let mut scene = Scene::new(&style);
    painter.draw_skeleton(&mut scene, &tree, &layout, None);
    let mut ring = HashMap::new();
    ring.insert("A".to_string(), Color::BLACK);
    painter.add_ring(&mut scene, &tree, &layout, &ring, 20.0, 10.0);
    painter.add_leaf_names(&mut scene, &tree, &layout, 10.0);

    for id in tree.preorder() {
        assert_eq!(layout.geom(id), reference.geom(id));
    }
}

#[test]
fn transfer_gradients_are_deterministic_per_render() {
    let tree = Tree::from_newick("((A:1,B:1):1,C:2);").unwrap();
    let style = scenario_style();
    let layout = RadialLayout::compute(&tree, &style).unwrap();
    let painter = TreePainter::new(&style);

    let transfers = vec![
        TransferRecord {
            family: None,
            from: "A".into(),
            to: "C".into(),
            freq: 1.0,
            time: None,
        },
        TransferRecord {
            family: None,
            from: "B".into(),
            to: "C".into(),
            freq: 1.0,
            time: None,
        },
    ];

    let render_ids = || {
        let mut scene = Scene::new(&style);
        painter.plot_transfers(&mut scene, &tree, &layout, &transfers, &TransferOptions::default());
        scene
            .gradients()
            .iter()
            .map(|g| g.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(render_ids(), vec![0, 1]);
    assert_eq!(render_ids(), render_ids());
}

#[test]
fn solid_transfer_uses_no_gradient() {
    let tree = Tree::from_newick("((A:1,B:1):1,C:2);").unwrap();
    let style = scenario_style();
    let layout = RadialLayout::compute(&tree, &style).unwrap();
    let painter = TreePainter::new(&style);
    let mut scene = Scene::new(&style);

    let transfers = vec![TransferRecord {
        family: None,
        from: "A".into(),
        to: "C".into(),
        freq: 1.0,
        time: None,
    }];
    let options = TransferOptions {
        gradient: None,
        ..TransferOptions::default()
    };
    painter.plot_transfers(&mut scene, &tree, &layout, &transfers, &options);
    assert!(scene.gradients().is_empty());
    let solid = scene.primitives().iter().any(|p| {
        matches!(
            p,
            ScenePrimitive::Cubic { stroke, .. }
                if matches!(stroke.paint, Paint::Solid(_))
        )
    });
    assert!(solid);
}
