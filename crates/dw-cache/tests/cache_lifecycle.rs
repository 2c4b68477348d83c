use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use dw_cache::{sidecar_path, ErrorRecord, ResultCache};
use dw_core::codec::{decode, encode, CanonicalName, PartialConfig};
use dw_core::config::{ExperimentConfig, SelectionMode};
use dw_core::context::SweepContext;
use dw_core::errors::DwError;
use dw_core::measure::{ErrorKind, Field, VariantFlags};
use dw_core::metadata::{metadata_path, store_metadata, RunMetadata};
use dw_frames::{write_exr, Frame, FrameTemplate};
use tempfile::TempDir;

const FRAMES: usize = 10;
const EPS: f32 = 0.01;

fn config(alpha: f64) -> ExperimentConfig {
    ExperimentConfig::builder("Scene", SelectionMode::Unweighted)
        .iters(1, 0)
        .alpha(alpha)
        .build()
        .unwrap()
}

fn expected(alpha: f64) -> PartialConfig {
    PartialConfig::from(&config(alpha))
}

fn stamp(path: &Path, time: SystemTime) {
    File::options().write(true).open(path).unwrap().set_modified(time).unwrap();
}

fn record_run(dir: &Path, config: ExperimentConfig, value: f32, frames: usize) {
    fs::create_dir_all(dir).unwrap();
    let template = FrameTemplate::renderer(10, "SVGFPass", "Filtered image");
    for index in 1..=frames {
        write_exr(&template.path(dir, index), &Frame::filled(16, 16, [value; 3])).unwrap();
    }
    store_metadata(dir, &RunMetadata::new(config)).unwrap();
    stamp(&metadata_path(dir), SystemTime::now() - Duration::from_secs(60));
}

struct Fixture {
    root: TempDir,
    candidate: CanonicalName,
}

impl Fixture {
    fn new(candidate_frames: usize) -> Self {
        let root = tempfile::tempdir().unwrap();
        record_run(&root.path().join("Scene_reference"), config(0.05), 1.0, FRAMES);
        let candidate = encode(&config(0.1));
        record_run(&root.path().join(candidate.as_str()), config(0.1), 1.0 + EPS, candidate_frames);
        Self { root, candidate }
    }

    fn context(&self) -> SweepContext {
        let mut context = SweepContext::new("Scene", self.root.path(), "Scene_reference");
        context.fps = 10;
        context.duration = 1.0;
        context.fields = vec![Field::Mean, Field::P99, Field::Ssim];
        context
    }

    fn candidate_dir(&self) -> std::path::PathBuf {
        self.root.path().join(self.candidate.as_str())
    }
}

fn expected_rel_mse() -> f64 {
    let diff = f64::from(1.0 + EPS) - 1.0;
    3.0 * diff * diff / (3.0 + 0.01)
}

#[test]
fn second_call_reads_identical_sidecars() {
    let fixture = Fixture::new(FRAMES);
    let cache = ResultCache::new(fixture.context()).unwrap();

    let first = cache.get_or_compute_all(&fixture.candidate, None).unwrap();
    assert!(first.recomputed);
    assert_eq!(first.values[&Field::Mean].len(), FRAMES);
    for value in &first.values[&Field::Mean] {
        assert!((value - expected_rel_mse()).abs() < 1e-12);
    }

    let sidecar = sidecar_path(&fixture.candidate_dir(), Field::Mean, ErrorKind::RelMse, &VariantFlags::default());
    let bytes = fs::read(&sidecar).unwrap();
    let second = cache.get_or_compute_all(&fixture.candidate, None).unwrap();
    assert!(!second.recomputed);
    assert_eq!(second.values, first.values);
    assert_eq!(fs::read(&sidecar).unwrap(), bytes);

    let single = cache.get_or_compute(&fixture.candidate, Field::Ssim, None).unwrap();
    assert_eq!(single, first.values[&Field::Ssim]);
}

#[test]
fn touching_metadata_invalidates() {
    let fixture = Fixture::new(FRAMES);
    let context = fixture.context();
    let cache = ResultCache::new(context.clone()).unwrap();
    assert!(cache.get_or_compute_all(&fixture.candidate, None).unwrap().recomputed);

    stamp(&metadata_path(&context.reference_dir()), SystemTime::now() + Duration::from_secs(60));
    assert!(cache.get_or_compute_all(&fixture.candidate, None).unwrap().recomputed);
}

#[test]
fn force_always_recomputes() {
    let fixture = Fixture::new(FRAMES);
    let mut context = fixture.context();
    ResultCache::new(context.clone()).unwrap().get_or_compute_all(&fixture.candidate, None).unwrap();
    context.force = true;
    let cache = ResultCache::new(context).unwrap();
    assert!(cache.get_or_compute_all(&fixture.candidate, None).unwrap().recomputed);
}

#[test]
fn short_candidate_names_missing_frames() {
    let fixture = Fixture::new(7);
    let cache = ResultCache::new(fixture.context()).unwrap();
    let err = cache.get_or_compute_all(&fixture.candidate, None).unwrap_err();
    assert!(matches!(err, DwError::InsufficientFrames(_)));
    let info = err.info();
    assert_eq!(info.context["found"], "7");
    assert_eq!(info.context["required"], "10");
    assert_eq!(info.context["missing"], "3");
}

#[test]
fn absent_directories_are_distinguished() {
    let fixture = Fixture::new(FRAMES);
    let cache = ResultCache::new(fixture.context()).unwrap();
    let ghost = encode(&config(0.2));
    assert!(matches!(
        cache.get_or_compute_all(&ghost, None),
        Err(DwError::MissingCandidate(_))
    ));

    let mut context = fixture.context();
    context.reference = "Scene_missing".into();
    let cache = ResultCache::new(context).unwrap();
    assert!(matches!(
        cache.get_or_compute_all(&fixture.candidate, None),
        Err(DwError::MissingReference(_))
    ));
}

#[test]
fn metadata_disagreement_is_not_trusted() {
    let fixture = Fixture::new(FRAMES);
    let cache = ResultCache::new(fixture.context()).unwrap();
    let err = cache
        .get_or_compute_all(&fixture.candidate, Some(&expected(0.3)))
        .unwrap_err();
    assert!(matches!(err, DwError::Metadata(_)));
    assert!(cache
        .get_or_compute_all(&fixture.candidate, Some(&expected(0.1)))
        .is_ok());
}

#[test]
fn single_field_lookup_checks_metadata() {
    let fixture = Fixture::new(FRAMES);
    let cache = ResultCache::new(fixture.context()).unwrap();
    cache.get_or_compute_all(&fixture.candidate, None).unwrap();

    let err = cache
        .get_or_compute(&fixture.candidate, Field::Mean, Some(&expected(0.3)))
        .unwrap_err();
    assert!(matches!(err, DwError::Metadata(_)));

    let decoded = decode(fixture.candidate.as_str(), "Scene").unwrap();
    let series = cache
        .get_or_compute(&fixture.candidate, Field::Mean, Some(&decoded))
        .unwrap();
    assert_eq!(series.len(), FRAMES);
}

#[test]
fn cached_series_of_another_duration_is_recomputed() {
    let fixture = Fixture::new(FRAMES);
    let mut context = fixture.context();
    context.duration = 0.5;
    let short = ResultCache::new(context.clone()).unwrap();
    let first = short.get_or_compute_all(&fixture.candidate, None).unwrap();
    assert_eq!(first.values[&Field::Mean].len(), 5);
    assert!(!short.get_or_compute_all(&fixture.candidate, None).unwrap().recomputed);

    context.duration = 1.0;
    let full = ResultCache::new(context).unwrap();
    let second = full.get_or_compute_all(&fixture.candidate, None).unwrap();
    assert!(second.recomputed);
    assert_eq!(second.values[&Field::Mean].len(), FRAMES);
    assert!(!full.get_or_compute_all(&fixture.candidate, None).unwrap().recomputed);
}

#[test]
fn truncated_sidecar_is_recomputed() {
    let fixture = Fixture::new(FRAMES);
    let cache = ResultCache::new(fixture.context()).unwrap();
    cache.get_or_compute_all(&fixture.candidate, None).unwrap();

    let sidecar = sidecar_path(&fixture.candidate_dir(), Field::P99, ErrorKind::RelMse, &VariantFlags::default());
    fs::write(&sidecar, "1.0e-4\n2.0e-4\n").unwrap();
    let outcome = cache.get_or_compute_all(&fixture.candidate, None).unwrap();
    assert!(outcome.recomputed);
    assert_eq!(outcome.values[&Field::P99].len(), FRAMES);
}

#[test]
fn fovea_variant_uses_its_own_sidecars() {
    let fixture = Fixture::new(FRAMES);
    let mut context = fixture.context();
    context.variant.fovea = true;
    context.fovea_radius = Some(4.0);
    let cache = ResultCache::new(context).unwrap();
    let outcome = cache.get_or_compute_all(&fixture.candidate, None).unwrap();
    assert!(outcome.recomputed);
    let variant = VariantFlags {
        fovea: true,
        ..VariantFlags::default()
    };
    assert!(sidecar_path(&fixture.candidate_dir(), Field::Mean, ErrorKind::RelMse, &variant).is_file());
    assert!(!sidecar_path(&fixture.candidate_dir(), Field::Mean, ErrorKind::RelMse, &VariantFlags::default()).is_file());
}

#[test]
fn record_averages_frames() {
    let fixture = Fixture::new(FRAMES);
    let cache = ResultCache::new(fixture.context()).unwrap();
    let outcome = cache.get_or_compute_all(&fixture.candidate, None).unwrap();
    let config = decode(fixture.candidate.as_str(), "Scene").unwrap();
    let record = ErrorRecord::from_outcome(fixture.candidate.clone(), config, &outcome);
    assert!((record.mean(Field::Mean) - expected_rel_mse()).abs() < 1e-12);
    assert!(record.mean(Field::Ssim) > 0.99);
    assert!(record.mean(Field::P25).is_nan());
}
