//! Shared fixtures for integration tests.
#![allow(dead_code)]

use cubeslice::prelude::*;

/// Three dates × 200 latitudes × 200 longitudes, integer-spaced from 0.
pub fn edr_cube() -> GridCube {
    GridCube::new()
        .with_axis(
            "date",
            AxisKind::Datetime,
            AxisValues::Explicit(vec!["2000-01-01".into(), "2000-01-02".into(), "2000-01-03".into()]),
        )
        .with_axis("lat", AxisKind::Numeric, AxisValues::regular(0.0, 1.0, 200))
        .with_axis("long", AxisKind::Numeric, AxisValues::regular(0.0, 1.0, 200))
}

pub fn edr_slicer() -> Slicer<GridCube> {
    Slicer::new(edr_cube(), &AxisOptions::new()).expect("fixture registry")
}

/// Request over the fixture restricted to the first date.
pub fn on_first_date(shape: Shape) -> Request {
    Request::new(vec![shape, Shape::select("date", ["2000-01-01"])])
}

/// `(axis values as f64..., result)` per leaf, in leaf order.
pub fn leaf_rows(tree: &IndexTree) -> Vec<(Vec<f64>, f64)> {
    tree.leaves()
        .map(|l| {
            let coords = tree.flatten(l).iter().filter_map(|(_, v)| v.as_f64()).collect();
            (coords, tree.result(l).expect("fetched leaf"))
        })
        .collect()
}
