//! Tick layout along the dial arc.

use glam::{Mat4, Quat, Vec3};

use crate::config::DialLayout;

/// Position and scale of a tick quad, copied by value between snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    /// Component-wise interpolation; `t` may leave [0, 1] for overshooting curves.
    pub fn lerp(self, target: Transform, t: f32) -> Transform {
        Transform {
            position: self.position + (target.position - self.position) * t,
            scale: self.scale + (target.scale - self.scale) * t,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tick {
    pub index: usize,
    /// Angle on the arc, before group rotation
    pub angle: f32,
    /// Z rotation of the quad so it points away from the dial center
    pub rotation: f32,
    pub initial: Transform,
    pub current: Transform,
}

impl Tick {
    /// Local-to-group matrix built from the current transform.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.current.scale,
            Quat::from_rotation_z(self.rotation),
            self.current.position,
        )
    }
}

/// The rotatable parent of every tick.
#[derive(Debug, Clone, Copy)]
pub struct TickGroup {
    pub position: Vec3,
    pub rotation: f32,
}

impl TickGroup {
    pub fn new(layout: &DialLayout) -> Self {
        Self {
            position: Vec3::new(layout.center.x, layout.center.y, 0.0),
            rotation: 0.0,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_rotation_z(self.rotation)
    }
}

pub fn build_ticks(tick_count: usize, layout: &DialLayout) -> Vec<Tick> {
    (0..tick_count)
        .map(|i| {
            let angle = i as f32 / tick_count as f32 * layout.arc_span + layout.base_offset;
            let x = -angle.cos() * layout.radius;
            let y = angle.sin() * layout.radius;
            let resting = Transform::new(Vec3::new(x, y, layout.tick_depth), Vec3::ONE);
            Tick {
                index: i,
                angle,
                rotation: y.atan2(x) - std::f32::consts::FRAC_PI_2,
                initial: resting,
                current: resting,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn first_tick_sits_straight_above_center() {
        let layout = DialLayout::default();
        let ticks = build_ticks(10, &layout);
        let first = &ticks[0];
        assert!((first.angle - FRAC_PI_2).abs() < 1e-6);
        assert!(first.initial.position.x.abs() < 1e-4);
        assert!((first.initial.position.y - layout.radius).abs() < 1e-4);
        assert!(first.rotation.abs() < 1e-5);
    }

    #[test]
    fn ticks_are_spread_over_the_arc() {
        let layout = DialLayout::default();
        let ticks = build_ticks(10, &layout);
        assert_eq!(ticks.len(), 10);
        let step = ticks[1].angle - ticks[0].angle;
        assert!((step - 0.026 * PI).abs() < 1e-5);
        for tick in &ticks {
            assert!((tick.initial.position.truncate().length() - layout.radius).abs() < 1e-3);
            assert_eq!(tick.initial, tick.current);
            assert_eq!(tick.initial.scale, Vec3::ONE);
        }
        // Later ticks move to the right of the center line
        assert!(ticks[9].initial.position.x > 0.0);
    }

    #[test]
    fn tick_quads_point_radially() {
        let layout = DialLayout::default();
        for tick in build_ticks(7, &layout) {
            // The quad's local +Y axis must be parallel to the radius vector.
            let up = Quat::from_rotation_z(tick.rotation) * Vec3::Y;
            let radial = tick.initial.position.truncate().normalize().extend(0.0);
            assert!(up.cross(radial).length() < 1e-4);
        }
    }

    #[test]
    fn transform_lerp_reaches_both_ends() {
        let a = Transform::new(Vec3::ZERO, Vec3::ONE);
        let b = Transform::new(Vec3::new(2.0, 4.0, -24.0), Vec3::new(2.2, 2.2, 1.0));
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert!((mid.position.z + 12.0).abs() < 1e-5);
    }
}
