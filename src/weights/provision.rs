use super::{ArtifactState, WeightArtifactSet};
use crate::error::WeightProvisionError;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of weight artifacts. This is the collaborator boundary: the core
/// never fetches from the network itself, it only asks a fetcher to place a
/// named artifact at a destination path.
pub trait WeightFetcher {
    fn fetch(&self, name: &str, dest: &Path) -> Result<(), WeightProvisionError>;
}

/// Copies artifacts from a local staging directory, typically populated by
/// the environment bootstrap before this process started.
pub struct LocalCopyFetcher {
    source_dir: PathBuf,
}

impl LocalCopyFetcher {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }
}

impl WeightFetcher for LocalCopyFetcher {
    fn fetch(&self, name: &str, dest: &Path) -> Result<(), WeightProvisionError> {
        let source = self.source_dir.join(name);
        tracing::debug!("Copying {} to {}", source.display(), dest.display());
        fs::copy(&source, dest)
            .map(|_| ())
            .map_err(|err| WeightProvisionError::Fetch {
                name: name.to_string(),
                source: err,
            })
    }
}

/// No source configured. Every fetch fails, leaving artifacts absent.
pub struct NullFetcher;

impl WeightFetcher for NullFetcher {
    fn fetch(&self, name: &str, _dest: &Path) -> Result<(), WeightProvisionError> {
        Err(WeightProvisionError::NoSource(name.to_string()))
    }
}

/// Idempotently materializes the weight artifact set before the model
/// backend loads.
///
/// Artifacts already present and valid are left alone; repeated `ensure`
/// calls never re-fetch them. An unobtainable artifact is not an error
/// here: it stays absent and the model backend simply reports unavailable.
pub struct WeightProvisioner {
    artifact_dir: PathBuf,
    fetcher: Box<dyn WeightFetcher>,
}

impl WeightProvisioner {
    pub fn new(artifact_dir: impl Into<PathBuf>, fetcher: Box<dyn WeightFetcher>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            fetcher,
        }
    }

    /// Fetch whatever is missing or placeholder, then report the resulting
    /// artifact states.
    pub fn ensure(&self) -> WeightArtifactSet {
        let current = WeightArtifactSet::inspect(&self.artifact_dir);

        for (name, state) in current.artifacts() {
            if state == ArtifactState::PresentValid {
                tracing::debug!("Weight artifact {name} already present, skipping fetch");
                continue;
            }
            if let Err(err) = self.materialize(name) {
                tracing::warn!("Could not provision weight artifact {name}: {err}");
            }
        }

        let set = WeightArtifactSet::inspect(&self.artifact_dir);
        tracing::info!(
            "Weight artifact set at {} is {:?}",
            set.dir().display(),
            set.state()
        );
        set
    }

    fn materialize(&self, name: &str) -> Result<(), WeightProvisionError> {
        fs::create_dir_all(&self.artifact_dir).map_err(|source| WeightProvisionError::Fetch {
            name: name.to_string(),
            source,
        })?;
        self.fetcher.fetch(name, &self.artifact_dir.join(name))
    }
}
