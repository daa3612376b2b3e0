use super::TransferBackend;
use crate::error::TransferError;
use crate::weights::{ArtifactState, WeightArtifactSet, MODEL_ARTIFACT};
use anyhow::Context;
use image::RgbImage;
use ndarray::{Array1, Array4, Ix4, IxDyn};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// How long a single model invocation may run before the pipeline falls
/// through to the statistical tier.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Makeup transfer through the exported Stable-Makeup ONNX model.
///
/// The session is loaded once from a validated weight artifact set and is
/// read-only afterwards, so it can be shared with the inference worker
/// thread without locking.
pub struct ModelTransfer {
    session: Arc<Session>,
    timeout: Duration,
}

impl ModelTransfer {
    /// Load the model from a weight artifact set.
    ///
    /// Returns `None` (backend unavailable) unless every required artifact
    /// is present and valid. A placeholder or partial set never loads in a
    /// degraded mode, and a session build failure is logged rather than
    /// propagated: missing model capability is a legitimate state the
    /// pipeline handles, not a crash.
    pub fn load(artifacts: &WeightArtifactSet, timeout: Duration) -> Option<Self> {
        match artifacts.state() {
            ArtifactState::PresentValid => {}
            state => {
                tracing::warn!(
                    "weight artifact set at {} is {:?}; model backend unavailable",
                    artifacts.dir().display(),
                    state
                );
                return None;
            }
        }

        let path = artifacts.artifact_path(MODEL_ARTIFACT);
        match Self::build_session(&path) {
            Ok(session) => {
                tracing::info!("Model backend ready ({})", path.display());
                Some(Self {
                    session: Arc::new(session),
                    timeout,
                })
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to load model from {}: {:#}; model backend unavailable",
                    path.display(),
                    err
                );
                None
            }
        }
    }

    fn build_session(path: &Path) -> anyhow::Result<Session> {
        tracing::info!("Loading makeup transfer model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        Ok(session)
    }
}

/// Convert a canonical RGB image into a [0, 1] NCHW tensor of shape
/// [1, 3, height, width].
fn image_to_tensor(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

    for y in 0..height {
        for x in 0..width {
            let pixel = image.get_pixel(x, y);
            tensor[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            tensor[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            tensor[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }
    }

    tensor
}

/// Convert a [1, 3, height, width] tensor in [0, 1] back to an RGB image.
fn tensor_to_image(tensor: &Array4<f32>) -> RgbImage {
    let height = tensor.shape()[2] as u32;
    let width = tensor.shape()[3] as u32;

    RgbImage::from_fn(width, height, |x, y| {
        let mut pixel = [0u8; 3];
        for (c, value) in pixel.iter_mut().enumerate() {
            let v = tensor[[0, c, y as usize, x as usize]];
            *value = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        image::Rgb(pixel)
    })
}

fn run_session(
    session: &Session,
    source: Array4<f32>,
    reference: Array4<f32>,
    intensity: Array1<f32>,
) -> Result<Array4<f32>, TransferError> {
    let expected = vec![
        1usize,
        3,
        source.shape()[2],
        source.shape()[3],
    ];

    let inputs = ort::inputs![source.view(), reference.view(), intensity.view()]
        .map_err(|err| TransferError::Inference(err.to_string()))?;

    let outputs = session
        .run(inputs)
        .map_err(|err| TransferError::Inference(err.to_string()))?;

    let output = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|err| TransferError::Inference(err.to_string()))?
        .view()
        .to_owned()
        .into_dimensionality::<IxDyn>()
        .map_err(|err| TransferError::Inference(err.to_string()))?;

    if output.shape() != expected.as_slice() {
        return Err(TransferError::OutputShape(output.shape().to_vec()));
    }

    output
        .into_dimensionality::<Ix4>()
        .map_err(|err| TransferError::Inference(err.to_string()))
}

impl TransferBackend for ModelTransfer {
    fn transfer(
        &self,
        source: &RgbImage,
        reference: &RgbImage,
        intensity: f32,
    ) -> Result<RgbImage, TransferError> {
        let _span = tracing::debug_span!("model_transfer").entered();

        let source_tensor = image_to_tensor(source);
        let reference_tensor = image_to_tensor(reference);
        let intensity_tensor = Array1::from(vec![intensity]);

        // Run inference on a worker thread so a hung external call cannot
        // stall the fallback path. On timeout the worker is abandoned; it
        // owns its own session handle and tensor copies.
        let session = Arc::clone(&self.session);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = run_session(&session, source_tensor, reference_tensor, intensity_tensor);
            let _ = tx.send(result);
        });

        let output = match rx.recv_timeout(self.timeout) {
            Ok(result) => result?,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                return Err(TransferError::Timeout(self.timeout));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(TransferError::WorkerGone);
            }
        };

        Ok(tensor_to_image(&output))
    }

    fn name(&self) -> &'static str {
        "model"
    }
}
