use crate::error::ValidationError;
use image::{imageops, DynamicImage, RgbImage};
use std::path::Path;

/// Canonical resolution all pipeline-internal operations assume.
/// 512x512 is the working resolution of the makeup transfer model.
pub const CANONICAL_WIDTH: u32 = 512;
pub const CANONICAL_HEIGHT: u32 = 512;

/// Decodes and resamples arbitrary input images into the canonical
/// in-memory representation: 8-bit RGB at a fixed resolution.
///
/// Source and reference images go through the same resampling method so
/// their pixel grids stay geometrically comparable for the statistical
/// backend.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    width: u32,
    height: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(CANONICAL_WIDTH, CANONICAL_HEIGHT)
    }
}

impl Normalizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn canonical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Convert a decoded image to canonical RGB8 at the canonical size.
    ///
    /// Resampling uses Lanczos3. Images already at the canonical size skip
    /// the resize.
    pub fn canonicalize(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        if rgb.dimensions() == (self.width, self.height) {
            rgb
        } else {
            imageops::resize(
                &rgb,
                self.width,
                self.height,
                imageops::FilterType::Lanczos3,
            )
        }
    }

    /// Decode an image file without normalizing it.
    pub fn decode(&self, path: &Path) -> Result<DynamicImage, ValidationError> {
        image::open(path).map_err(|source| ValidationError::UndecodableImage {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Decode an image file and convert it to the canonical representation.
    pub fn open(&self, path: &Path) -> Result<RgbImage, ValidationError> {
        let decoded = self.decode(path)?;
        Ok(self.canonicalize(&decoded))
    }
}
