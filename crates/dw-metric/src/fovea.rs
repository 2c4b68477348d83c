//! Foveal region masks.

use std::f64::consts::TAU;

use dw_core::config::FoveaMovement;
use dw_core::errors::{DwError, ErrorInfo};

/// Binary per-pixel mask in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    /// Filled circle of `radius` pixels centred at `(cx, cy)`.
    pub fn circle(width: usize, height: usize, cx: f64, cy: f64, radius: f64) -> Self {
        let r2 = radius * radius;
        let bits = (0..width * height)
            .map(|index| {
                let dx = (index % width) as f64 - cx;
                let dy = (index / width) as f64 - cy;
                dx * dx + dy * dy <= r2
            })
            .collect();
        Self {
            width,
            height,
            bits,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether pixel `index` is inside the mask.
    pub fn contains(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// Number of pixels inside the mask.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }
}

/// Mask of the fovea at `frame_index` (0-based) of a run recorded at `fps`.
///
/// The centre follows `(w/2, h/2) + radius * sin(2*pi*freq*t + phase)` with
/// `t = frame_index / fps`. Only Lissajous trajectories can be evaluated.
pub fn fovea_mask(
    width: usize,
    height: usize,
    radius: f64,
    movement: &FoveaMovement,
    frame_index: usize,
    fps: u32,
) -> Result<Mask, DwError> {
    let FoveaMovement::Lissajous {
        freq,
        radius: amplitude,
        phase,
    } = movement
    else {
        return Err(DwError::Config(
            ErrorInfo::new("fovea-movement", "only Lissajous fovea trajectories can be masked")
                .with_context("pattern", movement.pattern().name()),
        ));
    };
    if fps == 0 {
        return Err(DwError::config("fovea-fps", "fps must be positive"));
    }
    let t = frame_index as f64 / f64::from(fps);
    let cx = width as f64 / 2.0 + amplitude[0] * (TAU * freq[0] * t + phase[0]).sin();
    let cy = height as f64 / 2.0 + amplitude[1] * (TAU * freq[1] * t + phase[1]).sin();
    Ok(Mask::circle(width, height, cx, cy, radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_at_time_zero_without_phase() {
        let movement = FoveaMovement::Lissajous {
            freq: [0.4, 0.5],
            radius: [10.0, 5.0],
            phase: [0.0, 0.0],
        };
        let mask = fovea_mask(20, 20, 2.0, &movement, 0, 30).unwrap();
        assert!(mask.contains(10 * 20 + 10));
        assert!(!mask.contains(0));
        assert_eq!(mask.count(), 13);
    }

    #[test]
    fn move_and_stay_is_rejected() {
        let movement = FoveaMovement::MoveAndStay {
            speed: 100.0,
            stay_duration: 1.0,
        };
        assert!(fovea_mask(8, 8, 2.0, &movement, 0, 30).is_err());
    }
}
