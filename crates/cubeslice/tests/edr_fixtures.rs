//! Leaf counts on the 200×200 lat/long fixture with one selected date.

mod common;

use common::{edr_slicer, on_first_date};
use cubeslice::prelude::*;

fn leaves(shape: Shape) -> usize {
    edr_slicer().retrieve(&on_first_date(shape)).unwrap().leaf_count()
}

#[test]
fn small_box() {
    assert_eq!(leaves(Shape::bbox(&["lat", "long"], &[3.0, 10.0], &[6.0, 11.0])), 8);
}

#[test]
fn disk_around_point() {
    assert_eq!(leaves(Shape::disk(&["lat", "long"], &[0.0, 51.0], &[3.0, 3.0])), 18);
}

#[test]
fn convex_polygon() {
    let poly = Shape::polygon(&["lat", "long"], &[[1.0, 3.0], [4.0, 7.0], [5.0, 8.0], [6.0, 4.0], [1.0, 3.0]]);
    assert_eq!(leaves(poly), 14);
}

#[test]
fn large_box() {
    assert_eq!(leaves(Shape::bbox(&["lat", "long"], &[10.0, 30.0], &[40.0, 40.0])), 341);
}

#[test]
fn point_trajectory() {
    let point = Shape::bbox(&["lat", "long"], &[0.0, 0.0], &[0.0, 0.0]);
    let path = Shape::path(
        &["lat", "long"],
        point,
        &[&[10.0, 10.0], &[15.0, 15.0], &[20.0, 20.0], &[70.0, 80.0]],
    );
    assert_eq!(leaves(path), 21);
}

#[test]
fn box_corridor() {
    let unit = Shape::bbox(&["lat", "long"], &[0.0, 0.0], &[1.0, 1.0]);
    let path = Shape::path(
        &["lat", "long"],
        unit,
        &[&[10.0, 10.0], &[15.0, 15.0], &[20.0, 20.0], &[70.0, 80.0]],
    );
    assert_eq!(leaves(path), 154);
}

#[test]
fn single_point_selection() {
    let req = Request::new(vec![
        Shape::select("date", ["2000-01-03"]),
        Shape::select("lat", [0.0]),
        Shape::select("long", [51.0]),
    ]);
    let tree = edr_slicer().retrieve(&req).unwrap();
    assert_eq!(tree.leaf_count(), 1);
    let leaf = tree.leaves().next().unwrap();
    assert_eq!(tree.result(leaf), Some((2 * 200 * 200 + 51) as f64));
}

#[test]
fn requests_parse_from_json() {
    let js = r#"[
        {"shape": "box", "axes": ["lat", "long"], "lower": [3, 10], "upper": [6, 11]},
        {"shape": "select", "axis": "date", "values": ["2000-01-01T00:00:00"]}
    ]"#;
    let req = Request::from_json(js).unwrap();
    assert_eq!(edr_slicer().retrieve(&req).unwrap().leaf_count(), 8);
}
