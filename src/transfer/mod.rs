mod model;
mod pipeline;
mod statistical;

pub use model::{ModelTransfer, DEFAULT_MODEL_TIMEOUT};
pub use pipeline::TransferPipeline;
pub use statistical::{StatisticalTransfer, DEFAULT_DAMPING};

use crate::error::TransferError;
use image::{DynamicImage, RgbImage};
use std::fmt;

/// Accepted bounds for the caller-supplied transfer intensity.
/// Out-of-range values are rejected, never clamped.
pub const INTENSITY_MIN: f32 = 0.1;
pub const INTENSITY_MAX: f32 = 2.0;

/// A makeup transfer capability.
///
/// Both the model-based and the statistical backend implement this one
/// operation. Backends are stateless per request: inputs are already
/// normalized to the canonical size and channel order, and the only
/// long-lived state is the model backend's read-only loaded weights.
pub trait TransferBackend {
    /// Transfer the reference image's makeup appearance onto the source,
    /// scaled by `intensity`.
    ///
    /// A backend reports its own faults as `TransferError` and never
    /// substitutes a fallback result; fallback policy lives in the
    /// pipeline.
    fn transfer(
        &self,
        source: &RgbImage,
        reference: &RgbImage,
        intensity: f32,
    ) -> Result<RgbImage, TransferError>;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}

/// One transfer request: a source face, a reference makeup image and the
/// intensity scalar.
pub struct TransferRequest {
    pub source: DynamicImage,
    pub reference: DynamicImage,
    pub intensity: f32,
}

/// Which tier of the fallback chain produced the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendUsed {
    Model,
    Statistical,
    Passthrough,
}

impl fmt::Display for BackendUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendUsed::Model => "model",
            BackendUsed::Statistical => "statistical",
            BackendUsed::Passthrough => "passthrough",
        };
        f.write_str(name)
    }
}

/// The per-request output. Created per request and handed straight back to
/// the caller; the pipeline keeps nothing.
pub struct TransferResult {
    pub output: RgbImage,
    pub backend_used: BackendUsed,
}
