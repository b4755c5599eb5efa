//! Registry construction and path rewriting against small grid cubes.

use super::*;
use crate::config::{AxisOptions, GridKind, TransformSpec};
use crate::datacube::{AxisValues, GridCube};
use crate::error::{ConfigError, Error};

fn lonlat_cube() -> GridCube {
    GridCube::new()
        .with_axis("lat", AxisKind::Numeric, AxisValues::regular(-90.0, 1.0, 181))
        .with_axis("lon", AxisKind::Numeric, AxisValues::regular(-180.0, 1.0, 360))
}

fn path(entries: &[(&str, Coord)]) -> CubePath {
    entries.iter().map(|(a, v)| (a.to_string(), v.clone())).collect()
}

#[test]
fn plain_registry_follows_raw_order() {
    let cube = GridCube::new()
        .with_axis("date", AxisKind::Datetime, AxisValues::Explicit(vec!["2000-01-01".into()]))
        .with_axis("step", AxisKind::Categorical, AxisValues::Explicit(vec!["0".into()]))
        .with_axis("lat", AxisKind::Numeric, AxisValues::regular(0.0, 1.0, 4));
    let reg = AxisRegistry::from_cube(&cube).unwrap();
    assert_eq!(reg.names().collect::<Vec<_>>(), ["date", "step", "lat"]);
    assert_eq!(reg.axis("date").unwrap().tolerance, 1e-6);
    assert_eq!(reg.axis("lat").unwrap().tolerance, 1e-12);
    assert!(reg.axis("step").unwrap().is_categorical());
    assert!(matches!(reg.axis_or_err("nope"), Err(Error::Config(ConfigError::UnknownAxis(_)))));
}

#[test]
fn cyclic_anchors_raw_window_and_roundtrips() {
    let opts = AxisOptions::new().with("lon", TransformSpec::cyclic(0.0, 360.0));
    let reg = AxisRegistry::new(&lonlat_cube(), &opts).unwrap();
    let lon = reg.axis("lon").unwrap();
    assert_eq!(lon.cyclic().unwrap().raw_lower, -180.0);
    assert_eq!(lon.period(), Some(360.0));

    let canon = path(&[("lat", Coord::Num(10.0)), ("lon", Coord::Num(350.0))]);
    let (raw, first) = reg.adjust_path(&canon);
    assert_eq!(raw.get("lon"), Some(&Coord::Num(-10.0)));
    assert!(first.is_none());
    assert_eq!(reg.raw_to_canonical(&raw), canon);
}

#[test]
fn cyclic_lookup_straddles_seam() {
    let opts = AxisOptions::new().with("lon", TransformSpec::cyclic(0.0, 360.0));
    let cube = lonlat_cube();
    let reg = AxisRegistry::new(&cube, &opts).unwrap();
    let lon = reg.axis("lon").unwrap();
    let mut callers = Vec::new();
    let mut keys = Vec::new();
    for sub in lon.remap_range(355.5, 362.5) {
        for v in lon.find_values(&cube, &sub, None).unwrap() {
            callers.push(v + sub.offset);
            keys.push(lon.canonical(v));
        }
    }
    // 360 is reached from both sides of the seam; both land on canonical 0.
    assert_eq!(callers, vec![356.0, 357.0, 358.0, 359.0, 360.0, 360.0, 361.0, 362.0]);
    assert_eq!(keys, vec![356.0, 357.0, 358.0, 359.0, 0.0, 0.0, 1.0, 2.0]);
}

#[test]
fn mapper_replaces_base_axis() {
    let mapper = TransformSpec::mapper(GridKind::Octahedral, 4, "latitude", "longitude");
    let opts = AxisOptions::new()
        .with("values", mapper)
        .with("longitude", TransformSpec::cyclic(0.0, 360.0));
    let points = (4 * (0 + 1 + 2 + 3) * 2 + 20 * 8) as usize;
    let cube = GridCube::new()
        .with_axis("step", AxisKind::Categorical, AxisValues::Explicit(vec!["0".into()]))
        .with_axis("values", AxisKind::Numeric, AxisValues::regular(0.0, 1.0, points));
    let reg = AxisRegistry::new(&cube, &opts).unwrap();
    assert_eq!(reg.names().collect::<Vec<_>>(), ["step", "latitude", "longitude"]);
    assert!(reg.axis("longitude").unwrap().is_mapper_inner());
    assert!(!reg.axis("latitude").unwrap().is_mapper_inner());

    let Some(Transformation::Mapper(m)) = reg.axis("latitude").unwrap().structural() else {
        panic!("latitude should carry the mapper");
    };
    let lat = m.outer_values()[2];
    let lon = 360.0 / 28.0 * 3.0;
    let canon = path(&[
        ("step", Coord::from("0")),
        ("latitude", Coord::Num(lat)),
        ("longitude", Coord::Num(lon)),
    ]);
    let (raw, first) = reg.adjust_path(&canon);
    assert_eq!(first, Some(lat));
    assert_eq!(raw.axes().collect::<Vec<_>>(), ["step", "values"]);
    assert_eq!(raw.get("values"), Some(&Coord::Num((20 + 24 + 3) as f64)));
    let back = reg.raw_to_canonical(&raw);
    assert_eq!(back.get("latitude").and_then(Coord::as_f64).map(|x| (x - lat).abs() < 1e-9), Some(true));
    assert_eq!(back.get("longitude").and_then(Coord::as_f64).map(|x| (x - lon).abs() < 1e-9), Some(true));

    // Partial path: outer only reports first_val and leaves the path alone.
    let partial = path(&[("latitude", Coord::Num(lat))]);
    let (raw, first) = reg.adjust_path(&partial);
    assert_eq!(first, Some(lat));
    assert_eq!(raw, partial);
}

#[test]
fn merge_consumes_second_axis() {
    let cube = GridCube::new()
        .with_axis(
            "date",
            AxisKind::Categorical,
            AxisValues::Explicit(vec!["20170101".into(), "20170102".into()]),
        )
        .with_axis(
            "time",
            AxisKind::Categorical,
            AxisValues::Explicit(vec!["0000".into(), "1200".into()]),
        )
        .with_axis("lat", AxisKind::Numeric, AxisValues::regular(0.0, 1.0, 3));
    let opts = AxisOptions::new().with("date", TransformSpec::merge("time", "T", "00"));
    let reg = AxisRegistry::new(&cube, &opts).unwrap();
    assert_eq!(reg.names().collect::<Vec<_>>(), ["date", "lat"]);
    assert_eq!(reg.axis("date").unwrap().kind, AxisKind::Datetime);

    let t = parse_datetime("2017-01-02T12:00:00").unwrap();
    let canon = path(&[("date", Coord::Time(t)), ("lat", Coord::Num(1.0))]);
    let raw = reg.canonical_to_raw(&canon);
    assert_eq!(raw.get("date"), Some(&Coord::from("20170102")));
    assert_eq!(raw.get("time"), Some(&Coord::from("1200")));
    assert_eq!(raw.position("time"), Some(1));
    assert_eq!(reg.raw_to_canonical(&raw), canon);
}

#[test]
fn reverse_reflects_over_raw_extent() {
    let cube = GridCube::new().with_axis("level", AxisKind::Numeric, AxisValues::regular(1000.0, -100.0, 10));
    let opts = AxisOptions::new().with("level", TransformSpec::reverse());
    let reg = AxisRegistry::new(&cube, &opts).unwrap();
    let raw = reg.canonical_to_raw(&path(&[("level", Coord::Num(200.0))]));
    assert_eq!(raw.get("level"), Some(&Coord::Num(900.0)));
}

#[test]
fn misconfigurations_are_rejected() {
    let cube = lonlat_cube();
    let unknown = AxisOptions::new().with("longitude", TransformSpec::cyclic(0.0, 360.0));
    assert!(matches!(
        AxisRegistry::new(&cube, &unknown),
        Err(Error::Config(ConfigError::UnknownAxis(a))) if a == "longitude"
    ));
    let twice = AxisOptions::new()
        .with("lon", TransformSpec::cyclic(0.0, 360.0))
        .with("lon", TransformSpec::cyclic(-180.0, 180.0));
    assert!(matches!(
        AxisRegistry::new(&cube, &twice),
        Err(Error::Config(ConfigError::InvalidTransformation { .. }))
    ));
    let bad_period = AxisOptions::new().with("lon", TransformSpec::cyclic(10.0, 10.0));
    assert!(AxisRegistry::new(&cube, &bad_period).is_err());
    let merge_missing = AxisOptions::new().with("lat", TransformSpec::merge("time", "T", ""));
    assert!(matches!(
        AxisRegistry::new(&cube, &merge_missing),
        Err(Error::Config(ConfigError::UnknownAxis(_)))
    ));
    let cat = GridCube::new().with_axis("step", AxisKind::Categorical, AxisValues::Explicit(vec!["0".into()]));
    let cyc = AxisOptions::new().with("step", TransformSpec::cyclic(0.0, 24.0));
    assert!(matches!(
        AxisRegistry::new(&cat, &cyc),
        Err(Error::Config(ConfigError::InvalidTransformation { .. }))
    ));
}
