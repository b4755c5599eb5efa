//! Leaf table: one row per fetched leaf, one column per axis plus `value`.

use anyhow::{bail, Context, Result};
use cubeslice::api::{Coord, IndexTree};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Build the leaf table for `tree` with columns in `axes` order.
///
/// Axes whose values are all numeric become `f64` columns; anything else
/// (datetimes, labels) is rendered as text. Leaves missing an axis get nulls.
pub fn leaf_table(tree: &IndexTree, axes: &[String]) -> Result<DataFrame> {
    let paths: Vec<_> = tree.leaves().map(|l| (tree.flatten(l), tree.result(l))).collect();
    let mut columns = Vec::with_capacity(axes.len() + 1);
    for axis in axes {
        let coords: Vec<Option<&Coord>> = paths.iter().map(|(p, _)| p.get(axis)).collect();
        let numeric = coords.iter().flatten().all(|c| matches!(c, Coord::Num(_)));
        let series = if numeric {
            let vals: Vec<Option<f64>> = coords.iter().map(|c| c.and_then(Coord::as_f64)).collect();
            Series::new(axis.as_str().into(), vals)
        } else {
            let vals: Vec<Option<String>> = coords.iter().map(|c| c.map(|c| c.to_string())).collect();
            Series::new(axis.as_str().into(), vals)
        };
        columns.push(series);
    }
    let values: Vec<Option<f64>> = paths.iter().map(|(_, v)| *v).collect();
    columns.push(Series::new("value".into(), values));
    DataFrame::new(columns).context("assembling leaf table")
}

/// Write `df` as CSV or Parquet depending on the extension of `out`.
pub fn write_table(df: &mut DataFrame, out: &Path) -> Result<()> {
    let ext = out.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if !matches!(ext, "csv" | "parquet") {
        bail!("unsupported output extension `{ext}` (use .csv or .parquet)");
    }
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    if ext == "csv" {
        CsvWriter::new(&mut file).finish(df)?;
    } else {
        ParquetWriter::new(&mut file).finish(df)?;
    }
    Ok(())
}
