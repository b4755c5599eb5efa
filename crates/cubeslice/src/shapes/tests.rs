use super::*;
use crate::config::{AxisOptions, TransformSpec};
use crate::datacube::{AxisValues, GridCube};
use crate::error::Error;
use crate::geom::Body;
use crate::axis::AxisKind;

fn registry() -> AxisRegistry {
    let cube = GridCube::new()
        .with_axis("date", AxisKind::Datetime, AxisValues::Explicit(vec!["2000-01-01".into()]))
        .with_axis("step", AxisKind::Categorical, AxisValues::Explicit(vec!["0".into()]))
        .with_axis("lat", AxisKind::Numeric, AxisValues::regular(0.0, 1.0, 200))
        .with_axis("lon", AxisKind::Numeric, AxisValues::regular(0.0, 1.0, 360));
    let opts = AxisOptions::new().with("lon", TransformSpec::cyclic(0.0, 360.0));
    AxisRegistry::new(&cube, &opts).unwrap()
}

fn validation(err: Error) -> ValidationError {
    match err {
        Error::Validation(v) => v,
        other => panic!("expected a validation error, got {other}"),
    }
}

#[test]
fn box_has_all_corners() {
    let reg = registry();
    let p = Shape::bbox(&["lat", "lon"], &[3.0, 10.0], &[6.0, 11.0]).to_polytopes(&reg).unwrap();
    assert_eq!(p.len(), 1);
    assert_eq!(p[0].vertex_count(), 4);
    assert_eq!(p[0].extents(0), Some((3.0, 6.0)));
    // A degenerate box collapses to its distinct corners.
    let q = Shape::bbox(&["lat", "lon"], &[3.0, 10.0], &[3.0, 11.0]).to_polytopes(&reg).unwrap();
    assert_eq!(q[0].vertex_count(), 2);
}

#[test]
fn inverted_bounds_wrap_only_on_cyclic_axes() {
    let reg = registry();
    let p = Shape::bbox(&["lat", "lon"], &[0.0, 350.0], &[1.0, 10.0]).to_polytopes(&reg).unwrap();
    assert_eq!(p[0].extents(1), Some((350.0, 370.0)));
    let err = Shape::bbox(&["lat", "lon"], &[5.0, 0.0], &[1.0, 10.0]).to_polytopes(&reg).unwrap_err();
    assert!(matches!(validation(err), ValidationError::InvertedBounds { axis, .. } if axis == "lat"));
    let span = Shape::span("lon", 300.0, 20.0).to_polytopes(&reg).unwrap();
    assert_eq!(span[0].extents(0), Some((300.0, 380.0)));
}

#[test]
fn disk_is_an_ellipsoid_body() {
    let reg = registry();
    let p = Shape::disk(&["lat", "lon"], &[0.0, 51.0], &[3.0, 3.0]).to_polytopes(&reg).unwrap();
    assert!(matches!(p[0].body(), Body::Ellipsoid { .. }));
    let err = Shape::disk(&["lat", "lon"], &[0.0, 51.0], &[3.0, 0.0]).validate().unwrap_err();
    assert_eq!(validation(err), ValidationError::NonPositiveRadius(0.0));
}

#[test]
fn polygon_drops_closing_vertex_and_rejects_dents() {
    let reg = registry();
    let poly = Shape::polygon(&["lat", "lon"], &[[1.0, 3.0], [4.0, 7.0], [5.0, 8.0], [6.0, 4.0], [1.0, 3.0]]);
    let p = poly.to_polytopes(&reg).unwrap();
    assert_eq!(p[0].vertex_count(), 4);
    let dent = Shape::polygon(&["lat", "lon"], &[[0.0, 0.0], [2.0, 0.0], [1.0, 0.5], [2.0, 2.0], [0.0, 2.0]]);
    assert_eq!(validation(dent.validate().unwrap_err()), ValidationError::NonConvex);
    let three = Shape::Polygon {
        axes: vec!["lat".into(), "lon".into(), "date".into()],
        vertices: vec![vec![0.0, 0.0, 0.0]],
    };
    assert_eq!(validation(three.validate().unwrap_err()), ValidationError::PolygonAxes(3));
}

#[test]
fn path_yields_one_polytope_per_segment() {
    let reg = registry();
    let unit = Shape::bbox(&["lat", "lon"], &[0.0, 0.0], &[1.0, 1.0]);
    let path = Shape::path(&["lat", "lon"], unit.clone(), &[&[10.0, 10.0], &[15.0, 15.0], &[20.0, 20.0]]);
    let p = path.to_polytopes(&reg).unwrap();
    assert_eq!(p.len(), 2);
    assert_eq!(p[0].vertex_count(), 8);
    assert_eq!(p[0].extents(0), Some((10.0, 16.0)));
    let single = Shape::path(&["lat", "lon"], unit, &[&[5.0, 6.0]]).to_polytopes(&reg).unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].extents(1), Some((6.0, 7.0)));
    let bad = Shape::path(&["lat", "lon"], Shape::disk(&["lat", "lon"], &[0.0, 0.0], &[1.0, 1.0]), &[&[1.0, 1.0]]);
    assert_eq!(validation(bad.validate().unwrap_err()), ValidationError::UnsupportedPathBase);
}

#[test]
fn select_makes_points_or_labels() {
    let reg = registry();
    let dates = Shape::select("date", ["2000-01-01"]).to_polytopes(&reg).unwrap();
    assert_eq!(dates[0].extents(0), Some((946_684_800.0, 946_684_800.0)));
    let steps = Shape::select("step", ["0", "6"]).to_polytopes(&reg).unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].as_label(), Some(&Coord::from("6")));
    let bad = Shape::select("lat", ["north"]).to_polytopes(&reg).unwrap_err();
    assert!(matches!(validation(bad), ValidationError::BadValue { .. }));
}

#[test]
fn registry_errors_surface_as_config_errors() {
    let reg = registry();
    let unknown = Shape::bbox(&["lat", "height"], &[0.0, 0.0], &[1.0, 1.0]).to_polytopes(&reg);
    assert!(matches!(unknown, Err(Error::Config(ConfigError::UnknownAxis(a))) if a == "height"));
    let sliced = Shape::span("step", 0.0, 6.0).to_polytopes(&reg);
    assert!(matches!(sliced, Err(Error::Config(ConfigError::Unsliceable { .. }))));
}

#[test]
fn validation_catches_malformed_parameters() {
    let e = Shape::bbox(&["lat", "lon"], &[0.0], &[1.0, 1.0]).validate().unwrap_err();
    assert!(matches!(validation(e), ValidationError::DimensionMismatch { expected: 2, got: 1, .. }));
    let e = Shape::bbox(&["lat", "lat"], &[0.0, 0.0], &[1.0, 1.0]).validate().unwrap_err();
    assert!(matches!(validation(e), ValidationError::RepeatedAxis { .. }));
    let e = Shape::bbox(&["lat"], &[f64::NAN], &[1.0]).validate().unwrap_err();
    assert!(matches!(validation(e), ValidationError::NonFinite { .. }));
    let e = Shape::Select { axis: "lat".into(), values: vec![] }.validate().unwrap_err();
    assert!(matches!(validation(e), ValidationError::Empty { .. }));
    let e = Shape::union(Shape::span("lat", 0.0, 1.0), Shape::span("lon", 0.0, 1.0)).validate().unwrap_err();
    assert_eq!(validation(e), ValidationError::UnionAxesMismatch);
}

#[test]
fn union_alternatives_flatten() {
    let u = Shape::union(
        Shape::span("lat", 0.0, 1.0),
        Shape::union(Shape::span("lat", 5.0, 6.0), Shape::select("lat", [9.0])),
    );
    assert_eq!(u.alternatives().len(), 3);
    assert_eq!(u.axes(), vec!["lat".to_string()]);
}

#[test]
fn json_is_tagged_by_shape() {
    let js = r#"[
        {"shape": "box", "axes": ["lat", "lon"], "lower": [3, 10], "upper": [6, 11]},
        {"shape": "select", "axis": "date", "values": ["2000-01-01T00:00:00"]},
        {"shape": "path", "axes": ["lat", "lon"],
         "base": {"shape": "box", "axes": ["lat", "lon"], "lower": [0, 0], "upper": [1, 1]},
         "waypoints": [[10, 10], [15, 15]]},
        {"shape": "union", "left": {"shape": "span", "axis": "lat", "lower": 0, "upper": 1},
                           "right": {"shape": "span", "axis": "lat", "lower": 5, "upper": 6}}
    ]"#;
    let shapes: Vec<Shape> = serde_json::from_str(js).unwrap();
    assert_eq!(shapes[0], Shape::bbox(&["lat", "lon"], &[3.0, 10.0], &[6.0, 11.0]));
    assert!(matches!(shapes[2], Shape::Path { .. }));
    assert_eq!(shapes[3].alternatives().len(), 2);
}
