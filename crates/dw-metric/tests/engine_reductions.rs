use dw_core::config::FoveaMovement;
use dw_core::measure::{Device, ErrorKind, Field};
use dw_frames::Frame;
use dw_metric::{fovea_mask, CpuBackend, MetricEngine, ParallelBackend, SsimWindow, REL_MSE_EPSILON};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_frame(seed: u64, width: usize, height: usize) -> Frame {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height * 3).map(|_| rng.gen_range(0.0f32..2.0)).collect();
    Frame::from_rgb(width, height, data).unwrap()
}

#[test]
fn rel_mse_against_black_reference_uses_epsilon() {
    let reference = Frame::filled(3, 3, [0.0; 3]);
    let candidate = Frame::filled(3, 3, [REL_MSE_EPSILON as f32; 3]);
    let engine = MetricEngine::new(Device::Cpu);
    let map = engine
        .compute_frame(&reference, &candidate, ErrorKind::RelMse, None)
        .unwrap();
    let eps = f64::from(REL_MSE_EPSILON as f32);
    let expected = 3.0 * eps * eps / REL_MSE_EPSILON;
    for value in map.values() {
        assert!((value - expected).abs() < 1e-12, "{value} vs {expected}");
    }
}

#[test]
fn rel_mse_of_small_bright_error() {
    let reference = Frame::filled(2, 2, [1.0; 3]);
    let candidate = Frame::filled(2, 2, [1.01; 3]);
    let engine = MetricEngine::new(Device::Cpu);
    let report = engine
        .evaluate_frame(&reference, &candidate, ErrorKind::RelMse, &[Field::Mean], None)
        .unwrap();
    let diff = f64::from(1.01f32) - 1.0;
    let expected = 3.0 * diff * diff / (3.0 + REL_MSE_EPSILON);
    assert!((report.get(Field::Mean).unwrap() - expected).abs() < 1e-15);
}

#[test]
fn reductions_on_known_map() {
    // L1 of a grey ramp: pixel i differs by i/3 per channel, so error is i.
    let width = 10;
    let reference = Frame::filled(width, 1, [0.0; 3]);
    let data = (0..width).flat_map(|i| [i as f32 / 3.0; 3]).collect();
    let candidate = Frame::from_rgb(width, 1, data).unwrap();
    let engine = MetricEngine::new(Device::Cpu);
    let report = engine
        .evaluate_frame(&reference, &candidate, ErrorKind::L1, &Field::ALL[..6], None)
        .unwrap();
    let close = |field: Field, expected: f64| {
        let value = report.get(field).unwrap();
        assert!((value - expected).abs() < 1e-5, "{field}: {value} vs {expected}");
    };
    close(Field::Mean, 4.5);
    close(Field::P25, 2.25);
    close(Field::P50, 4.5);
    close(Field::P75, 6.75);
    close(Field::P99, 8.91);
    close(Field::Top1Percent, 9.0);
    assert_eq!(report.get(Field::Ssim), None);
}

#[test]
fn ssim_of_identical_frames_is_one() {
    let frame = random_frame(3, 24, 24);
    for window in [SsimWindow::default(), SsimWindow::fast()] {
        let engine = MetricEngine::new(Device::Cpu).with_window(window);
        let report = engine
            .evaluate_frame(&frame, &frame, ErrorKind::L2, &[Field::Ssim], None)
            .unwrap();
        assert!((report.get(Field::Ssim).unwrap() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn ssim_drops_for_noisy_candidate() {
    let reference = random_frame(1, 24, 24);
    let candidate = random_frame(2, 24, 24);
    let engine = MetricEngine::new(Device::Cpu);
    let report = engine
        .evaluate_frame(&reference, &candidate, ErrorKind::L2, &[Field::Ssim], None)
        .unwrap();
    assert!(report.get(Field::Ssim).unwrap() < 0.5);
}

#[test]
fn masked_reduction_ignores_outside_pixels() {
    let reference = Frame::filled(20, 20, [0.0; 3]);
    let mut candidate = Frame::filled(20, 20, [0.0; 3]);
    // A large error in the corner lies outside the centred fovea.
    candidate.data_mut()[..3].copy_from_slice(&[5.0; 3]);
    let movement = FoveaMovement::Lissajous {
        freq: [0.0, 0.0],
        radius: [0.0, 0.0],
        phase: [0.0, 0.0],
    };
    let mask = fovea_mask(20, 20, 4.0, &movement, 0, 30).unwrap();
    assert!(mask.count() > 0);
    let engine = MetricEngine::new(Device::Cpu);
    let masked = engine
        .evaluate_frame(&reference, &candidate, ErrorKind::L1, &[Field::Mean], Some(&mask))
        .unwrap();
    let unmasked = engine
        .evaluate_frame(&reference, &candidate, ErrorKind::L1, &[Field::Mean], None)
        .unwrap();
    assert_eq!(masked.get(Field::Mean), Some(0.0));
    assert!(unmasked.get(Field::Mean).unwrap() > 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 16, .. ProptestConfig::default() })]

    #[test]
    fn parallel_backend_matches_cpu_bitwise(seed in any::<u64>(), kind in 0usize..3) {
        let kind = ErrorKind::ALL[kind];
        let reference = random_frame(seed, 33, 17);
        let candidate = random_frame(seed.wrapping_add(1), 33, 17);
        let cpu = MetricEngine::with_backend(Box::new(CpuBackend));
        let parallel = MetricEngine::with_backend(Box::new(ParallelBackend::with_threads(4).unwrap()));
        let a = cpu.evaluate_frame(&reference, &candidate, kind, &Field::ALL, None).unwrap();
        let b = parallel.evaluate_frame(&reference, &candidate, kind, &Field::ALL, None).unwrap();
        prop_assert!(a.bitwise_eq(&b), "{:?} vs {:?}", a, b);
    }
}
