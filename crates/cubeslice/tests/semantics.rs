//! Cross-cutting retrieval properties: unions, pruning, determinism.

mod common;

use common::{edr_slicer, leaf_rows, on_first_date};
use cubeslice::api::ValidationError;
use cubeslice::prelude::*;

#[test]
fn union_of_overlapping_boxes_keeps_each_point_once() {
    let left = Shape::bbox(&["lat", "long"], &[0.0, 0.0], &[2.0, 0.0]);
    let right = Shape::bbox(&["lat", "long"], &[1.0, 0.0], &[3.0, 0.0]);
    let tree = edr_slicer().retrieve(&on_first_date(Shape::union(left, right))).unwrap();
    let mut lats: Vec<f64> = tree
        .leaves()
        .filter_map(|l| tree.flatten(l).get("lat").and_then(Coord::as_f64))
        .collect();
    lats.sort_by(f64::total_cmp);
    assert_eq!(lats, vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn union_leaves_are_the_union_of_parts() {
    let a = Shape::bbox(&["lat", "long"], &[5.0, 5.0], &[7.0, 6.0]);
    let b = Shape::disk(&["lat", "long"], &[20.0, 20.0], &[2.0, 2.0]);
    let slicer = edr_slicer();
    let na = slicer.retrieve(&on_first_date(a.clone())).unwrap().leaf_count();
    let nb = slicer.retrieve(&on_first_date(b.clone())).unwrap().leaf_count();
    let both = slicer.retrieve(&on_first_date(Shape::union(a, b))).unwrap().leaf_count();
    assert_eq!(both, na + nb);
}

#[test]
fn selected_values_missing_from_the_cube_are_dropped() {
    let req = Request::new(vec![
        Shape::select("date", ["2000-01-02", "1999-12-31"]),
        Shape::select("lat", [3.0, 3.5, 500.0]),
        Shape::select("long", [5.0]),
    ]);
    let tree = edr_slicer().retrieve(&req).unwrap();
    let rows = leaf_rows(&tree);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1, (200 * 200 + 3 * 200 + 5) as f64);
}

#[test]
fn categorical_axis_matches_labels() {
    let cube = GridCube::new()
        .with_axis(
            "step",
            AxisKind::Categorical,
            AxisValues::Explicit(vec!["0".into(), "6".into(), "12".into()]),
        )
        .with_axis("x", AxisKind::Numeric, AxisValues::regular(0.0, 1.0, 4));
    let slicer = Slicer::new(cube, &AxisOptions::new()).unwrap();
    let req = Request::new(vec![Shape::select("step", ["6", "24"]), Shape::span("x", 0.0, 1.0)]);
    let tree = slicer.retrieve(&req).unwrap();
    let mut results: Vec<f64> = tree.leaves().filter_map(|l| tree.result(l)).collect();
    results.sort_by(f64::total_cmp);
    assert_eq!(results, vec![4.0, 5.0]);
    for leaf in tree.leaves() {
        assert_eq!(tree.flatten(leaf).get("step"), Some(&Coord::from("6")));
    }
}

#[test]
fn retrieval_is_deterministic() {
    let slicer = edr_slicer();
    let poly = Shape::polygon(&["lat", "long"], &[[1.0, 3.0], [4.0, 7.0], [5.0, 8.0], [6.0, 4.0]]);
    let req = on_first_date(poly);
    let a = slicer.retrieve(&req).unwrap();
    let b = slicer.retrieve(&req).unwrap();
    assert_eq!(a.pretty(), b.pretty());
}

#[test]
fn parallel_union_matches_sequential() {
    let slicer = edr_slicer();
    let shape = Shape::union(
        Shape::bbox(&["lat", "long"], &[0.0, 0.0], &[4.0, 4.0]),
        Shape::union(
            Shape::disk(&["lat", "long"], &[30.0, 30.0], &[3.0, 2.0]),
            Shape::bbox(&["lat", "long"], &[3.0, 3.0], &[8.0, 5.0]),
        ),
    );
    let req = on_first_date(shape);
    let seq = slicer.retrieve(&req).unwrap();
    let par = slicer.retrieve_par(&req).unwrap();
    assert_eq!(seq.leaf_count(), par.leaf_count());
    assert_eq!(seq.pretty(), par.pretty());
}

#[test]
fn engine_types_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AxisRegistry>();
    assert_send_sync::<Slicer<GridCube>>();
    assert_send_sync::<IndexTree>();
    assert_send_sync::<Request>();
}

#[test]
fn non_convex_polygon_is_rejected() {
    let dart = Shape::polygon(&["lat", "long"], &[[0.0, 0.0], [4.0, 2.0], [0.0, 4.0], [1.0, 2.0]]);
    let err = edr_slicer().retrieve(&on_first_date(dart)).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::NonConvex)));
}

#[test]
fn box_outside_the_cube_yields_an_empty_tree() {
    let far = Shape::bbox(&["lat", "long"], &[500.0, 500.0], &[510.0, 510.0]);
    let tree = edr_slicer().retrieve(&on_first_date(far)).unwrap();
    assert_eq!(tree.leaf_count(), 0);
    assert!(tree.children(tree.root()).is_empty());
}
