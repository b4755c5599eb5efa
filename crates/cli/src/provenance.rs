use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsStr;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata recorded next to a retrieval artifact.
pub struct Payload {
    pub params: Value,
    /// Dataset, request and option files the artifact was derived from.
    pub inputs: Vec<String>,
    pub leaves: usize,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            inputs: Vec::new(),
            leaves: 0,
        }
    }

    pub fn with_inputs<I: IntoIterator<Item = S>, S: Into<String>>(mut self, inputs: I) -> Self {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_leaves(mut self, leaves: usize) -> Self {
        self.leaves = leaves;
        self
    }
}

/// Provenance block without a callsite, as printed by `report`.
pub fn report_block() -> Value {
    json!({
        "code_rev": current_git_rev(),
        "crate_version": cubeslice::VERSION,
        "inputs": [],
        "params": {},
        "outputs": []
    })
}

/// Write `<artifact>.provenance.json` next to an already written artifact.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let callsite = Location::caller();
    let doc = json!({
        "code_rev": current_git_rev(),
        "callsite": format!("{}:{}", callsite.file(), callsite.line()),
        "crate_version": cubeslice::VERSION,
        "inputs": payload.inputs,
        "leaves": payload.leaves,
        "params": payload.params,
        "outputs": [artifact.to_string_lossy()]
    });
    let path = sidecar_path(artifact);
    fs::write(&path, serde_json::to_vec_pretty(&doc)?).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.file_stem().map(OsStr::to_os_string).unwrap_or_else(|| "leaves".into());
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`, else `unknown`.
pub fn current_git_rev() -> String {
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .filter(|r| !r.is_empty())
        .or_else(|| std::env::var("GIT_COMMIT").ok().filter(|r| !r.is_empty()))
        .or_else(git_head)
        .unwrap_or_else(|| "unknown".to_string())
}

fn git_head() -> Option<String> {
    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sidecar_path_replaces_extension() {
        let base = Path::new("/tmp/output/leaves.parquet");
        let derived = sidecar_path(base);
        assert_eq!(derived, Path::new("/tmp/output/leaves.provenance.json"));
    }

    #[test]
    fn write_sidecar_creates_file() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("leaves.csv");
        fs::write(&artifact, "lat,value\n").unwrap();
        let payload = Payload::new(json!({"batch_fetch": true}))
            .with_inputs(["dataset.json", "request.json"])
            .with_leaves(8);
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        assert!(prov_path.exists());
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["inputs"][1], "request.json");
        assert_eq!(parsed["leaves"], 8);
    }

    #[test]
    fn code_rev_is_never_empty() {
        assert!(!current_git_rev().is_empty());
    }

    #[test]
    fn report_block_has_no_outputs() {
        let block = report_block();
        assert!(block["outputs"].as_array().unwrap().is_empty());
        assert_eq!(block["crate_version"], cubeslice::VERSION);
    }
}
