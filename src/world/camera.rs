use glam::{Vec2, Vec3};

use crate::engine::types::ViewSetup;
use crate::fixed::{angle_from_radians, fixed_from_f32};

/// Player view-point in world space, float-side.
///
/// * Only **yaw** (heading) is simulated — the classic renderer never tilts.
/// * `z` holds absolute eye altitude in map units.
///
/// The engine itself runs on fixed point; [`Camera::view_setup`] performs the
/// conversion once per frame.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pos: Vec3, // x,y in map-units; z = eye altitude
    yaw: f32,  // radians (0 = east, counter-clockwise)
}

impl Camera {
    pub fn new(pos: Vec3, yaw: f32) -> Self {
        Self { pos, yaw }
    }

    #[inline]
    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Unit vector pointing where the camera looks on the X-Y plane.
    #[inline(always)]
    pub fn forward(self) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c, s)
    }

    /// Unit vector pointing to the camera's right on the X-Y plane.
    #[inline(always)]
    pub fn right(self) -> Vec2 {
        // Perpendicular to forward: (x, y) -> (y, -x)
        Vec2::new(self.forward().y, -self.forward().x)
    }

    /// Move by `forward` units and `side` (strafe), preserving altitude.
    pub fn step(&mut self, forward: f32, side: f32) {
        let f = self.forward();
        let r = self.right();
        self.pos.x += f.x * forward + r.x * side;
        self.pos.y += f.y * forward + r.y * side;
    }

    /// Rotate around Z-axis (positive = turn left).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
    }

    pub fn rise(&mut self, dz: f32) {
        self.pos.z += dz;
    }

    /// Snapshot this viewpoint as the fixed-point frame parameters.
    pub fn view_setup(&self, width: usize, height: usize) -> ViewSetup {
        ViewSetup {
            x: fixed_from_f32(self.pos.x),
            y: fixed_from_f32(self.pos.y),
            z: fixed_from_f32(self.pos.z),
            angle: angle_from_radians(self.yaw),
            width,
            height,
            center_x: width / 2,
            detail_shift: 0,
            extra_light: 0,
            fixed_colormap: None,
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{ANG90, ANGLETOFINESHIFT, FRACUNIT};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn forward_and_right_are_orthonormal() {
        let cam = Camera::new(Vec3::ZERO, 0.3);
        let f = cam.forward();
        let r = cam.right();
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!(f.dot(r).abs() < 1e-5);
    }

    #[test]
    fn view_setup_converts_to_fixed() {
        let cam = Camera::new(Vec3::new(64.0, -32.0, 41.0), FRAC_PI_2);
        let v = cam.view_setup(320, 200);
        assert_eq!(v.x, 64 * FRACUNIT);
        assert_eq!(v.y, -32 * FRACUNIT);
        assert_eq!(v.z, 41 * FRACUNIT);
        assert_eq!(v.center_x, 160);
        assert_eq!(v.center_y(), 100);
        assert!((v.angle as i64 - ANG90 as i64).abs() < (1 << ANGLETOFINESHIFT));
    }

    #[test]
    fn step_moves_along_heading() {
        let mut cam = Camera::new(Vec3::ZERO, 0.0);
        cam.step(10.0, 0.0);
        assert!((cam.pos().x - 10.0).abs() < 1e-4);
        cam.turn(FRAC_PI_2);
        cam.step(5.0, 0.0);
        assert!((cam.pos().y - 5.0).abs() < 1e-4);
    }
}
