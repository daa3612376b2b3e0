use super::{
    BackendUsed, TransferBackend, TransferRequest, TransferResult, INTENSITY_MAX, INTENSITY_MIN,
};
use crate::error::ValidationError;
use crate::normalize::Normalizer;
use std::path::Path;

/// Orchestrates one transfer request end to end: validation, normalization,
/// backend selection and the three-tier degradation chain.
///
/// For a valid request `run` always produces an image. The model tier is
/// tried when a model backend was loaded at setup; any model fault falls
/// through to the statistical tier; and if even that faults, the normalized
/// source image is returned unchanged. Only validation failures reach the
/// caller, because at that point no image exists to fall back to.
pub struct TransferPipeline {
    normalizer: Normalizer,
    model: Option<Box<dyn TransferBackend>>,
    fallback: Box<dyn TransferBackend>,
}

impl TransferPipeline {
    /// Backends are probed once, before the first request; `run` never
    /// re-probes them.
    pub fn new(
        normalizer: Normalizer,
        model: Option<Box<dyn TransferBackend>>,
        fallback: Box<dyn TransferBackend>,
    ) -> Self {
        Self {
            normalizer,
            model,
            fallback,
        }
    }

    pub fn model_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn canonical_size(&self) -> (u32, u32) {
        self.normalizer.canonical_size()
    }

    /// Run one transfer request.
    pub fn run(&self, request: &TransferRequest) -> Result<TransferResult, ValidationError> {
        validate_intensity(request.intensity)?;

        let source = self.normalizer.canonicalize(&request.source);
        let reference = self.normalizer.canonicalize(&request.reference);

        if let Some(model) = &self.model {
            match model.transfer(&source, &reference, request.intensity) {
                Ok(output) => {
                    return Ok(TransferResult {
                        output,
                        backend_used: BackendUsed::Model,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        "{} backend failed ({err}), falling back to {}",
                        model.name(),
                        self.fallback.name()
                    );
                }
            }
        }

        match self.fallback.transfer(&source, &reference, request.intensity) {
            Ok(output) => Ok(TransferResult {
                output,
                backend_used: BackendUsed::Statistical,
            }),
            Err(err) => {
                tracing::error!(
                    "{} backend failed ({err}), returning the source unchanged",
                    self.fallback.name()
                );
                Ok(TransferResult {
                    output: source,
                    backend_used: BackendUsed::Passthrough,
                })
            }
        }
    }

    /// Decode two image files and run the request.
    ///
    /// An undecodable input surfaces as `ValidationError` before any
    /// backend is touched.
    pub fn run_files(
        &self,
        source: &Path,
        reference: &Path,
        intensity: f32,
    ) -> Result<TransferResult, ValidationError> {
        // Reject a bad intensity before decoding anything.
        validate_intensity(intensity)?;

        let request = TransferRequest {
            source: self.normalizer.decode(source)?,
            reference: self.normalizer.decode(reference)?,
            intensity,
        };
        self.run(&request)
    }
}

fn validate_intensity(intensity: f32) -> Result<(), ValidationError> {
    // A NaN intensity fails the range check and is rejected like any other
    // out-of-range value.
    if (INTENSITY_MIN..=INTENSITY_MAX).contains(&intensity) {
        Ok(())
    } else {
        Err(ValidationError::IntensityOutOfRange {
            value: intensity,
            min: INTENSITY_MIN,
            max: INTENSITY_MAX,
        })
    }
}
