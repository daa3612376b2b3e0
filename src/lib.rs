//! Makeup transfer inference pipeline.
//!
//! Takes a source face image and a reference makeup image and produces an
//! output image with the reference's makeup appearance applied to the
//! source, scaled by an intensity parameter. Transfer runs through a
//! three-tier degradation chain: the generative model backend when its
//! weights are available, a deterministic statistical approximation when
//! the model is unavailable or faults, and as a last resort the normalized
//! source image unchanged. A valid request therefore always produces an
//! image.

pub mod error;
pub mod normalize;
pub mod setup;
pub mod transfer;
pub mod weights;

pub use error::{TransferError, ValidationError, WeightProvisionError};
pub use normalize::Normalizer;
pub use setup::{initialize, SetupConfig};
pub use transfer::{
    BackendUsed, ModelTransfer, StatisticalTransfer, TransferBackend, TransferPipeline,
    TransferRequest, TransferResult,
};
pub use weights::{ArtifactState, WeightArtifactSet, WeightProvisioner};
