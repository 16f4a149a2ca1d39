//! Fragment programs evaluated per sample by the software renderer.

use glam::{Vec2, Vec4};

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if x <= edge0 {
        return 0.0;
    }
    if x >= edge1 {
        return 1.0;
    }
    let t = (x - edge0) / (edge1 - edge0);
    t * t * (3.0 - 2.0 * t)
}

/// Radial falloff of a tick quad: brightest at the quad center and fading
/// toward the edges, which gives a tapered, anti-aliased mark.
pub fn tick_fragment(uv: Vec2) -> Vec4 {
    let d = 1.0 - uv.distance(Vec2::splat(0.5));
    Vec4::splat(smoothstep(0.2, 0.8, d))
}

/// Final dial color: straight per-channel product, alpha included.
pub fn composite_fragment(shadow: Vec4, color: Vec4, buffer: Vec4) -> Vec4 {
    shadow * color * buffer
}
