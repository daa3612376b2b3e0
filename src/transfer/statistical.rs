use super::TransferBackend;
use crate::error::TransferError;
use image::RgbImage;

/// Damping applied on top of the caller's intensity so that intensity 1.0
/// yields a moderate, non-destructive color shift. A tunable default, not
/// a contract.
pub const DEFAULT_DAMPING: f32 = 0.3;

/// Deterministic makeup transfer approximation.
///
/// Shifts every source pixel by the per-channel mean difference between
/// the reference and the source, scaled by `intensity * damping` and
/// clamped to the valid channel range. A pure function of its inputs with
/// no failure mode, which is what makes it the always-available fallback
/// tier.
pub struct StatisticalTransfer {
    damping: f32,
}

impl Default for StatisticalTransfer {
    fn default() -> Self {
        Self::new(DEFAULT_DAMPING)
    }
}

impl StatisticalTransfer {
    pub fn new(damping: f32) -> Self {
        Self { damping }
    }
}

/// Per-channel mean pixel value, accumulated in f64 so large images do not
/// lose precision.
fn channel_means(image: &RgbImage) -> [f64; 3] {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return [0.0; 3];
    }

    let mut sums = [0.0f64; 3];
    for pixel in image.pixels() {
        sums[0] += pixel[0] as f64;
        sums[1] += pixel[1] as f64;
        sums[2] += pixel[2] as f64;
    }
    sums.map(|sum| sum / count as f64)
}

impl TransferBackend for StatisticalTransfer {
    fn transfer(
        &self,
        source: &RgbImage,
        reference: &RgbImage,
        intensity: f32,
    ) -> Result<RgbImage, TransferError> {
        let source_means = channel_means(source);
        let reference_means = channel_means(reference);

        let mut shift = [0.0f32; 3];
        for c in 0..3 {
            shift[c] = ((reference_means[c] - source_means[c])
                * intensity as f64
                * self.damping as f64) as f32;
        }

        tracing::debug!(
            "statistical transfer: channel shift [{:.2}, {:.2}, {:.2}]",
            shift[0],
            shift[1],
            shift[2]
        );

        let mut output = source.clone();
        for pixel in output.pixels_mut() {
            for c in 0..3 {
                pixel[c] = (pixel[c] as f32 + shift[c]).round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(output)
    }

    fn name(&self) -> &'static str {
        "statistical"
    }
}
