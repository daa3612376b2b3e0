mod provision;

pub use provision::{LocalCopyFetcher, NullFetcher, WeightFetcher, WeightProvisioner};

use std::fs;
use std::path::{Path, PathBuf};

/// The exported Stable-Makeup model.
pub const MODEL_ARTIFACT: &str = "stable_makeup.onnx";

/// Every file the model backend needs before it may declare readiness.
pub const REQUIRED_ARTIFACTS: [&str; 1] = [MODEL_ARTIFACT];

/// Anything smaller than this is a placeholder left behind by an
/// interrupted or stubbed-out provisioning run, not a real model file.
pub const MIN_VALID_ARTIFACT_BYTES: u64 = 1024;

/// Validity of one weight artifact. Ordered worst-first so the aggregate
/// state of a set is simply the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactState {
    Absent,
    Placeholder,
    PresentValid,
}

/// The required weight files of one artifact directory, with the state each
/// was observed in. States change only during setup, never during a
/// request.
#[derive(Debug, Clone)]
pub struct WeightArtifactSet {
    dir: PathBuf,
    states: Vec<(&'static str, ArtifactState)>,
}

impl WeightArtifactSet {
    /// Classify every required artifact under `dir`.
    pub fn inspect(dir: &Path) -> Self {
        let states = REQUIRED_ARTIFACTS
            .iter()
            .map(|name| (*name, classify(&dir.join(name))))
            .collect();
        Self {
            dir: dir.to_path_buf(),
            states,
        }
    }

    /// Aggregate state: the worst per-file state. A single placeholder or
    /// missing file makes the whole set unusable.
    pub fn state(&self) -> ArtifactState {
        self.states
            .iter()
            .map(|(_, state)| *state)
            .min()
            .unwrap_or(ArtifactState::Absent)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = (&'static str, ArtifactState)> + '_ {
        self.states.iter().copied()
    }
}

fn classify(path: &Path) -> ArtifactState {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() >= MIN_VALID_ARTIFACT_BYTES => {
            ArtifactState::PresentValid
        }
        Ok(meta) if meta.is_file() => ArtifactState::Placeholder,
        _ => ArtifactState::Absent,
    }
}
