use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors reported back to the caller. A request that fails validation is
/// aborted before any backend runs and produces no output image.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("intensity {value} is outside the accepted range [{min}, {max}]")]
    IntensityOutOfRange { value: f32, min: f32, max: f32 },

    #[error("could not decode {path} as an image: {source}")]
    UndecodableImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Internal model-backend faults. These never cross the pipeline boundary;
/// the pipeline converts them into a fallback-tier result.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("model produced a tensor with unexpected shape {0:?}")]
    OutputShape(Vec<usize>),

    #[error("model inference exceeded the {0:?} timeout")]
    Timeout(Duration),

    #[error("model worker exited before producing a result")]
    WorkerGone,
}

/// Faults while materializing weight artifacts. Absorbed by the
/// provisioner: the affected artifact stays absent and the model backend
/// reports unavailable, the process keeps running.
#[derive(Error, Debug)]
pub enum WeightProvisionError {
    #[error("failed to materialize weight artifact {name}: {source}")]
    Fetch {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no source configured for weight artifact {0}")]
    NoSource(String),
}
