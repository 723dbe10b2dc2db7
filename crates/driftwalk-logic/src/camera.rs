//! Viewport camera — exponential smoothing toward a tracked position.
//!
//! Same framerate-independent retention form as the steering friction:
//! the follow coefficient is "fraction of the gap closed per 1/60 s
//! tick", so the camera converges identically at 30, 60, or 144 Hz and
//! never overshoots for coefficients in (0,1).

use serde::{Deserialize, Serialize};

/// Default fraction of the gap closed per 1/60 s tick.
pub const DEFAULT_FOLLOW: f32 = 0.09;

/// Smoothed viewport center. Always a separate copy of the tracked
/// position, never the entity pose itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraFollow {
    pub x: f32,
    pub y: f32,
    /// Gap fraction closed per 1/60 s tick, in (0,1).
    pub follow: f32,
}

impl CameraFollow {
    /// Camera starting centered on a position.
    pub fn centered_on(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            follow: DEFAULT_FOLLOW,
        }
    }

    /// Close a framerate-corrected fraction of the gap to the target.
    pub fn update(&mut self, dt: f32, target_x: f32, target_y: f32) {
        let smooth = 1.0 - (1.0 - self.follow).powf(dt * 60.0);
        self.x += (target_x - self.x) * smooth;
        self.y += (target_y - self.y) * smooth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn approaches_target_without_overshoot() {
        let mut cam = CameraFollow::centered_on(0.0, 0.0);
        let mut last_gap = 500.0_f32;
        for _ in 0..600 {
            cam.update(DT, 500.0, 0.0);
            let gap = 500.0 - cam.x;
            assert!(gap >= -1e-3, "overshot: gap {gap}");
            assert!(gap <= last_gap + 1e-4, "gap widened from {last_gap} to {gap}");
            last_gap = gap;
        }
        assert!(last_gap < 2.0, "still {last_gap} units away after 10 s");
    }

    #[test]
    fn smoothing_is_framerate_independent() {
        let mut coarse = CameraFollow::centered_on(0.0, 0.0);
        let mut fine = CameraFollow::centered_on(0.0, 0.0);
        for _ in 0..30 {
            coarse.update(1.0 / 30.0, 300.0, -120.0);
        }
        for _ in 0..120 {
            fine.update(1.0 / 120.0, 300.0, -120.0);
        }
        assert!((coarse.x - fine.x).abs() < 0.5);
        assert!((coarse.y - fine.y).abs() < 0.5);
    }

    #[test]
    fn stationary_when_on_target() {
        let mut cam = CameraFollow::centered_on(42.0, -7.0);
        cam.update(DT, 42.0, -7.0);
        assert_eq!((cam.x, cam.y), (42.0, -7.0));
    }
}
