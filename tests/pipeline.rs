//! Integration tests for the transfer pipeline's degradation chain and
//! validation boundary.

use blush::error::{TransferError, ValidationError};
use blush::normalize::{Normalizer, CANONICAL_HEIGHT, CANONICAL_WIDTH};
use blush::transfer::{
    BackendUsed, StatisticalTransfer, TransferBackend, TransferPipeline, TransferRequest,
};
use image::{DynamicImage, Rgb, RgbImage};

fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

fn statistical_pipeline() -> TransferPipeline {
    TransferPipeline::new(
        Normalizer::default(),
        None,
        Box::new(StatisticalTransfer::default()),
    )
}

/// A backend that always faults, standing in for a broken model or a
/// broken fallback tier.
struct FaultyBackend;

impl TransferBackend for FaultyBackend {
    fn transfer(
        &self,
        _source: &RgbImage,
        _reference: &RgbImage,
        _intensity: f32,
    ) -> Result<RgbImage, TransferError> {
        Err(TransferError::Inference("injected fault".to_string()))
    }

    fn name(&self) -> &'static str {
        "faulty"
    }
}

/// A backend that reports success with a fixed marker image, standing in
/// for a working model.
struct MarkerBackend;

impl TransferBackend for MarkerBackend {
    fn transfer(
        &self,
        source: &RgbImage,
        _reference: &RgbImage,
        _intensity: f32,
    ) -> Result<RgbImage, TransferError> {
        Ok(RgbImage::from_pixel(
            source.width(),
            source.height(),
            Rgb([1, 2, 3]),
        ))
    }

    fn name(&self) -> &'static str {
        "marker"
    }
}

#[test]
fn valid_requests_produce_canonical_output() {
    let pipeline = statistical_pipeline();
    let request = TransferRequest {
        source: solid(300, 177, [90, 120, 40]),
        reference: solid(64, 800, [200, 10, 10]),
        intensity: 0.7,
    };

    let result = pipeline.run(&request).unwrap();

    assert_eq!(
        result.output.dimensions(),
        (CANONICAL_WIDTH, CANONICAL_HEIGHT)
    );
    assert_eq!(result.backend_used, BackendUsed::Statistical);
}

#[test]
fn boundary_intensities_are_accepted() {
    let pipeline = statistical_pipeline();

    for intensity in [0.1, 2.0] {
        let request = TransferRequest {
            source: solid(32, 32, [50, 50, 50]),
            reference: solid(32, 32, [60, 60, 60]),
            intensity,
        };
        assert!(pipeline.run(&request).is_ok(), "intensity {intensity}");
    }
}

#[test]
fn out_of_range_intensity_is_rejected() {
    let pipeline = statistical_pipeline();

    for intensity in [0.0, 0.09, 2.01, -1.0, f32::NAN] {
        let request = TransferRequest {
            source: solid(32, 32, [50, 50, 50]),
            reference: solid(32, 32, [60, 60, 60]),
            intensity,
        };
        match pipeline.run(&request) {
            Err(ValidationError::IntensityOutOfRange { .. }) => {}
            Err(other) => panic!("intensity {intensity}: unexpected error {other:?}"),
            Ok(_) => panic!("intensity {intensity} was accepted"),
        }
    }
}

#[test]
fn model_tier_wins_when_it_succeeds() {
    let pipeline = TransferPipeline::new(
        Normalizer::default(),
        Some(Box::new(MarkerBackend)),
        Box::new(StatisticalTransfer::default()),
    );
    let request = TransferRequest {
        source: solid(512, 512, [90, 120, 40]),
        reference: solid(512, 512, [200, 10, 10]),
        intensity: 1.0,
    };

    let result = pipeline.run(&request).unwrap();

    assert_eq!(result.backend_used, BackendUsed::Model);
    assert_eq!(result.output.get_pixel(0, 0), &Rgb([1, 2, 3]));
}

#[test]
fn model_fault_degrades_to_statistical() {
    let pipeline = TransferPipeline::new(
        Normalizer::default(),
        Some(Box::new(FaultyBackend)),
        Box::new(StatisticalTransfer::default()),
    );
    let request = TransferRequest {
        source: solid(512, 512, [200, 100, 50]),
        reference: solid(512, 512, [100, 150, 250]),
        intensity: 1.0,
    };

    let result = pipeline.run(&request).unwrap();

    assert_eq!(result.backend_used, BackendUsed::Statistical);
    // 0.3 * (reference - source) = (-30, +15, +60)
    assert_eq!(result.output.get_pixel(256, 256), &Rgb([170, 115, 110]));
}

#[test]
fn unavailable_model_degrades_to_statistical() {
    let pipeline = statistical_pipeline();
    let request = TransferRequest {
        source: solid(512, 512, [200, 100, 50]),
        reference: solid(512, 512, [100, 150, 250]),
        intensity: 1.0,
    };

    let result = pipeline.run(&request).unwrap();

    assert_eq!(result.backend_used, BackendUsed::Statistical);
    assert_eq!(result.output.get_pixel(0, 0), &Rgb([170, 115, 110]));
}

#[test]
fn double_fault_degrades_to_passthrough() {
    let pipeline = TransferPipeline::new(
        Normalizer::default(),
        Some(Box::new(FaultyBackend)),
        Box::new(FaultyBackend),
    );
    let source = solid(300, 300, [90, 120, 40]);
    let expected = Normalizer::default().canonicalize(&source);
    let request = TransferRequest {
        source,
        reference: solid(300, 300, [10, 10, 10]),
        intensity: 1.5,
    };

    let result = pipeline.run(&request).unwrap();

    assert_eq!(result.backend_used, BackendUsed::Passthrough);
    assert_eq!(result.output.as_raw(), expected.as_raw());
}

#[test]
fn run_files_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("source.png");
    let reference_path = dir.path().join("reference.png");
    solid(640, 480, [200, 100, 50])
        .save(&source_path)
        .unwrap();
    solid(100, 100, [100, 150, 250])
        .save(&reference_path)
        .unwrap();

    let pipeline = statistical_pipeline();
    let result = pipeline
        .run_files(&source_path, &reference_path, 1.0)
        .unwrap();

    assert_eq!(
        result.output.dimensions(),
        (CANONICAL_WIDTH, CANONICAL_HEIGHT)
    );
    assert_eq!(result.backend_used, BackendUsed::Statistical);
}

#[test]
fn undecodable_input_is_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.png");
    let bad = dir.path().join("bad.png");
    solid(32, 32, [1, 2, 3]).save(&good).unwrap();
    std::fs::write(&bad, b"not a png at all").unwrap();

    let pipeline = statistical_pipeline();

    for (source, reference) in [(&bad, &good), (&good, &bad)] {
        match pipeline.run_files(source, reference, 1.0) {
            Err(ValidationError::UndecodableImage { .. }) => {}
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("undecodable input was accepted"),
        }
    }
}

#[test]
fn bad_intensity_is_rejected_before_decoding() {
    let pipeline = statistical_pipeline();

    // Paths are never touched: validation runs first.
    match pipeline.run_files(
        std::path::Path::new("/nonexistent/a.png"),
        std::path::Path::new("/nonexistent/b.png"),
        5.0,
    ) {
        Err(ValidationError::IntensityOutOfRange { .. }) => {}
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("invalid intensity was accepted"),
    }
}
