//! JSON artifacts for a fit and its selections.
//!
//! | File | Contents |
//! |------|----------|
//! | [`ASSIGNMENTS_FILE`] | `{profile_id: label}` |
//! | [`ANALYSIS_FILE`] | [`ClusterAnalysis`] |
//! | [`SELECTION_FILE`] | `{label: [profile_id, ...]}` |
//!
//! Each artifact is written to a temporary file in the target directory
//! and then renamed over the destination, so readers see either the old
//! or the new file, never a partial one. Concurrent writers are not
//! serialized here.

use std::fs;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::analysis::ClusterAnalysis;
use crate::error::{Error, Result};
use crate::pipeline::FittedModel;
use crate::profile::Profile;
use crate::select::SelectionResult;

/// Profile id to label table.
pub const ASSIGNMENTS_FILE: &str = "cluster_assignments.json";
/// Serialized [`ClusterAnalysis`].
pub const ANALYSIS_FILE: &str = "cluster_analysis.json";
/// Serialized [`SelectionResult`].
pub const SELECTION_FILE: &str = "cluster_selection.json";

/// Paths written by [`save_fit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitArtifacts {
    /// Assignment table.
    pub assignments: PathBuf,
    /// Cluster analysis.
    pub analysis: PathBuf,
}

/// Write the assignment table and analysis of `model` into `dir`.
pub fn save_fit(dir: impl AsRef<Path>, model: &FittedModel) -> Result<FitArtifacts> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let artifacts = FitArtifacts {
        assignments: dir.join(ASSIGNMENTS_FILE),
        analysis: dir.join(ANALYSIS_FILE),
    };
    write_json(&artifacts.assignments, &model.assignments())?;
    write_json(&artifacts.analysis, model.analysis())?;
    info!(dir = %dir.display(), profiles = model.len(), "saved fit artifacts");
    Ok(artifacts)
}

/// Write a selection result into `dir`.
pub fn save_selection(dir: impl AsRef<Path>, selection: &SelectionResult) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(SELECTION_FILE);
    write_json(&path, selection)?;
    info!(
        path = %path.display(),
        labels = selection.len(),
        selected = selection.values().map(Vec::len).sum::<usize>(),
        "saved selection"
    );
    Ok(path)
}

/// Read a previously saved analysis.
pub fn load_analysis(path: impl AsRef<Path>) -> Result<ClusterAnalysis> {
    read_json(path.as_ref())
}

/// Read a JSON array of profiles.
pub fn load_profiles(path: impl AsRef<Path>) -> Result<Vec<Profile>> {
    read_json(path.as_ref())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
