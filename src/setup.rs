use crate::normalize::Normalizer;
use crate::transfer::{
    ModelTransfer, StatisticalTransfer, TransferBackend, TransferPipeline, DEFAULT_DAMPING,
    DEFAULT_MODEL_TIMEOUT,
};
use crate::weights::{LocalCopyFetcher, NullFetcher, WeightFetcher, WeightProvisioner};
use std::path::PathBuf;
use std::time::Duration;

/// Everything setup needs, passed in explicitly. No working-directory or
/// process-global state is consulted.
pub struct SetupConfig {
    /// Directory holding the weight artifact set.
    pub weights_dir: PathBuf,
    /// Optional staging directory to copy missing artifacts from. `None`
    /// means no source is available and the model backend stays off.
    pub weights_source: Option<PathBuf>,
    /// Per-request cap on the model backend invocation.
    pub model_timeout: Duration,
    /// Damping applied by the statistical fallback.
    pub damping: f32,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            weights_dir: PathBuf::from("models/stablemakeup"),
            weights_source: None,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            damping: DEFAULT_DAMPING,
        }
    }
}

/// One-time setup: provision weights, probe the model backend, build the
/// pipeline.
///
/// Never fails. Absent or invalid weights produce a statistical-only
/// pipeline, and calling this again is safe: provisioning is idempotent and
/// loading is re-attempted from whatever artifacts exist.
pub fn initialize(config: &SetupConfig) -> TransferPipeline {
    let fetcher: Box<dyn WeightFetcher> = match &config.weights_source {
        Some(dir) => Box::new(LocalCopyFetcher::new(dir)),
        None => Box::new(NullFetcher),
    };

    let provisioner = WeightProvisioner::new(&config.weights_dir, fetcher);
    let artifacts = provisioner.ensure();

    let model = ModelTransfer::load(&artifacts, config.model_timeout)
        .map(|backend| Box::new(backend) as Box<dyn TransferBackend>);

    if model.is_some() {
        tracing::info!("Transfer pipeline ready (model + statistical fallback)");
    } else {
        tracing::info!("Transfer pipeline ready (statistical only)");
    }

    TransferPipeline::new(
        Normalizer::default(),
        model,
        Box::new(StatisticalTransfer::new(config.damping)),
    )
}
