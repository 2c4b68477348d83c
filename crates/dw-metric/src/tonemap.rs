//! HDR to display mapping applied before SSIM.

/// Exposure applied before the ACES curve.
pub const EXPOSURE: f64 = 0.6;

/// Display gamma.
pub const GAMMA: f64 = 2.2;

/// Narkowicz ACES filmic approximation, clamped to `[0, 1]`.
pub fn aces(x: f64) -> f64 {
    const A: f64 = 2.51;
    const B: f64 = 0.03;
    const C: f64 = 2.43;
    const D: f64 = 0.59;
    const E: f64 = 0.14;
    let x = x.max(0.0) * EXPOSURE;
    ((x * (A * x + B)) / (x * (C * x + D) + E)).clamp(0.0, 1.0)
}

/// Linear radiance to gamma-encoded LDR in `[0, 1]`.
pub fn to_ldr(x: f32) -> f64 {
    aces(f64::from(x)).powf(1.0 / GAMMA)
}
