use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cubeslice::api::{AxisOptions, DatasetSpec, GridCube, Request, Slicer, SlicerCfg};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod provenance;
mod table;

#[derive(Parser)]
#[command(name = "cubeslice")]
#[command(about = "Slice feasibility regions out of grid datacubes")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Resolve a request against a dataset and write the leaf table
    Retrieve {
        /// Dataset description (JSON: {"axes": [...]})
        #[arg(long)]
        dataset: PathBuf,
        /// Request (JSON array of shapes)
        #[arg(long)]
        request: PathBuf,
        /// Axis transformation options (JSON: axis -> [transform])
        #[arg(long)]
        options: Option<PathBuf>,
        /// Output table; `.csv` or `.parquet`
        #[arg(long)]
        out: PathBuf,
        /// Tolerance for numeric axes
        #[arg(long)]
        tolerance: Option<f64>,
        /// Fetch leaves one by one instead of in batches
        #[arg(long)]
        no_batch: bool,
        /// Resolve union alternatives in parallel
        #[arg(long)]
        par: bool,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Retrieve {
            dataset,
            request,
            options,
            out,
            tolerance,
            no_batch,
            par,
        } => {
            let cfg = SlicerCfg {
                numeric_tolerance: tolerance,
                batch_fetch: !no_batch,
                ..SlicerCfg::default()
            };
            retrieve(&dataset, &request, options.as_deref(), &out, cfg, par)
        }
        Action::Report => report(),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn retrieve(
    dataset: &Path,
    request: &Path,
    options: Option<&Path>,
    out: &Path,
    cfg: SlicerCfg,
    par: bool,
) -> Result<()> {
    let spec: DatasetSpec = serde_json::from_str(&read(dataset)?)
        .with_context(|| format!("parsing dataset {}", dataset.display()))?;
    let cube = GridCube::from_spec(spec).context("building grid cube")?;
    let opts = match options {
        Some(p) => AxisOptions::from_json(&read(p)?).with_context(|| format!("parsing options {}", p.display()))?,
        None => AxisOptions::new(),
    };
    let req = Request::from_json(&read(request)?)
        .with_context(|| format!("parsing request {}", request.display()))?;

    let slicer = Slicer::with_cfg(cube, &opts, cfg).context("building axis registry")?;
    tracing::info!(shape = ?slicer.cube().shape(), shapes = req.shapes().len(), "retrieve");
    let tree = if par {
        slicer.retrieve_par(&req)
    } else {
        slicer.retrieve(&req)
    }
    .context("resolving request")?;
    let leaves = tree.leaf_count();
    tracing::info!(leaves, "retrieved");

    let axes: Vec<String> = slicer.registry().names().map(str::to_string).collect();
    let mut df = table::leaf_table(&tree, &axes)?;
    table::write_table(&mut df, out)?;

    let mut inputs = vec![dataset.display().to_string(), request.display().to_string()];
    if let Some(p) = options {
        inputs.push(p.display().to_string());
    }
    let payload = provenance::Payload::new(json!({
        "numeric_tolerance": cfg.numeric_tolerance,
        "batch_fetch": cfg.batch_fetch,
        "fetch_batch_size": cfg.fetch_batch_size,
        "parallel": par,
    }))
    .with_inputs(inputs)
    .with_leaves(leaves);
    let sidecar = provenance::write_sidecar(out, payload)?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "written");
    Ok(())
}

fn report() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&provenance::report_block())?);
    Ok(())
}
