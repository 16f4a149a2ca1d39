//! Two-pass software renderer: ticks into an offscreen buffer, then the
//! buffer composited with the shadow and color masks into the visible frame.

use std::path::Path;

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use log::debug;

use crate::config::{DialLayout, JogDialConfig};
use crate::geometry::{Tick, TickGroup};
use crate::shader::{composite_fragment, smoothstep, tick_fragment};
use crate::JogDialError;

// ============================================================================
// CAMERA
// ============================================================================

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(layout: &DialLayout, aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, layout.camera_distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy: layout.fov_y,
            znear: layout.near,
            zfar: layout.far,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

/// Projects a world point to pixel coordinates (origin top-left). The `z` of
/// the result is the distance along the view axis; points behind the camera
/// yield `None`.
fn project(view_proj: &Mat4, world: Vec3, width: u32, height: u32) -> Option<Vec3> {
    let clip = *view_proj * world.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.xyz() / clip.w;
    Some(Vec3::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
        clip.w,
    ))
}

// ============================================================================
// TEXTURES
// ============================================================================

/// Offscreen RGBA buffer in linear `f32` channels.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    pub fn clear(&mut self, color: Vec4) {
        self.texels.fill(color);
    }

    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.texels[(y * self.width + x) as usize]
    }

    /// Replaces the texel with `color`, weighted by the covered fraction of the pixel.
    fn write(&mut self, x: u32, y: u32, color: Vec4, coverage: f32) {
        let idx = (y * self.width + x) as usize;
        let dst = self.texels[idx];
        self.texels[idx] = dst.lerp(color, coverage);
    }
}

/// Read-only texture sampled with bilinear filtering in normalized
/// coordinates (origin top-left, clamped at the edges).
#[derive(Debug, Clone)]
pub struct MaskTexture {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
}

impl MaskTexture {
    pub fn from_texels(width: u32, height: u32, texels: Vec<Vec4>) -> Result<Self, JogDialError> {
        if width == 0 || height == 0 || texels.len() != width as usize * height as usize {
            return Err(JogDialError::InvalidConfig(format!(
                "mask of {}x{} with {} texels",
                width,
                height,
                texels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn from_image(image: &image::DynamicImage) -> Result<Self, JogDialError> {
        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let texels = rgba.pixels().map(|p| Vec4::from_array(p.0)).collect();
        Self::from_texels(width, height, texels)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, JogDialError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| JogDialError::MaskLoad {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "loaded mask {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Self::from_image(&image)
    }

    pub fn solid(color: Vec4) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![color],
        }
    }

    /// Soft vignette darkening the face away from the tick arc.
    pub fn default_shadow(width: u32, height: u32) -> Self {
        Self::generate(width, height, |uv| {
            let d = uv.distance(Vec2::new(0.5, 0.75));
            let shade = 1.0 - 0.85 * smoothstep(0.15, 0.7, d);
            Vec4::new(shade, shade, shade, 1.0)
        })
    }

    /// Warm amber tint, slightly cooler toward the top.
    pub fn default_color(width: u32, height: u32) -> Self {
        Self::generate(width, height, |uv| {
            let warm = Vec4::new(1.0, 0.72, 0.38, 1.0);
            let cool = Vec4::new(0.85, 0.55, 0.35, 1.0);
            cool.lerp(warm, uv.y)
        })
    }

    fn generate(width: u32, height: u32, f: impl Fn(Vec2) -> Vec4) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let texels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                f(Vec2::new(
                    (x as f32 + 0.5) / width as f32,
                    (y as f32 + 0.5) / height as f32,
                ))
            })
            .collect();
        Self {
            width,
            height,
            texels,
        }
    }

    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let fx = uv.x * self.width as f32 - 0.5;
        let fy = uv.y * self.height as f32 - 0.5;
        let (x0, y0) = (fx.floor(), fy.floor());
        let (tx, ty) = (fx - x0, fy - y0);

        let texel = |x: f32, y: f32| {
            let x = (x.max(0.0) as u32).min(self.width - 1);
            let y = (y.max(0.0) as u32).min(self.height - 1);
            self.texels[(y * self.width + x) as usize]
        };

        let top = texel(x0, y0).lerp(texel(x0 + 1.0, y0), tx);
        let bottom = texel(x0, y0 + 1.0).lerp(texel(x0 + 1.0, y0 + 1.0), tx);
        top.lerp(bottom, ty)
    }
}

/// The two static masks multiplied into every composited pixel.
#[derive(Debug, Clone)]
pub struct Masks {
    pub shadow: MaskTexture,
    pub color: MaskTexture,
}

impl Masks {
    pub fn procedural(width: u32, height: u32) -> Self {
        Self {
            shadow: MaskTexture::default_shadow(width, height),
            color: MaskTexture::default_color(width, height),
        }
    }

    pub fn open(shadow: impl AsRef<Path>, color: impl AsRef<Path>) -> Result<Self, JogDialError> {
        Ok(Self {
            shadow: MaskTexture::open(shadow)?,
            color: MaskTexture::open(color)?,
        })
    }
}

// ============================================================================
// CANVAS
// ============================================================================

/// Visible RGBA8 framebuffer.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Vec4) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            if let Some(px) = self.frame.get_mut(idx..idx + 4) {
                let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
                px.copy_from_slice(&[c.x as u8, c.y as u8, c.z as u8, c.w as u8]);
            }
        }
    }
}

// ============================================================================
// RENDERER
// ============================================================================

const BUFFER_CLEAR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

// 2x2 ordered-grid supersampling offsets within a pixel.
const SAMPLE_OFFSETS: [(f32, f32); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];

pub struct Renderer {
    camera: Camera,
    buffer: RenderTarget,
    masks: Masks,
    tick_size: Vec2,
}

impl Renderer {
    pub fn new(config: &JogDialConfig, masks: Masks) -> Self {
        Self {
            camera: Camera::new(&config.layout, config.aspect()),
            buffer: RenderTarget::new(config.width, config.height),
            masks,
            tick_size: config.layout.tick_size,
        }
    }

    pub fn buffer(&self) -> &RenderTarget {
        &self.buffer
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Buffer pass: every tick of the group, far to near.
    pub fn render_buffer(&mut self, ticks: &[Tick], group: &TickGroup) {
        self.buffer.clear(BUFFER_CLEAR);
        let view_proj = self.camera.view_proj();
        let group_matrix = group.matrix();

        let mut quads: Vec<(f32, Mat4)> = ticks
            .iter()
            .map(|tick| {
                let world = group_matrix * tick.model_matrix();
                let depth = (self.camera.eye - world.w_axis.xyz()).length();
                (depth, world)
            })
            .collect();
        quads.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, world) in quads {
            self.draw_quad(&view_proj, &world);
        }
    }

    fn draw_quad(&mut self, view_proj: &Mat4, world: &Mat4) {
        let (w, h) = (self.buffer.width, self.buffer.height);
        let half = self.tick_size * 0.5;
        let corner = |local: Vec2| project(view_proj, world.transform_point3(local.extend(0.0)), w, h);

        let (Some(s0), Some(s1), Some(s2), Some(s3)) = (
            corner(Vec2::new(-half.x, -half.y)),
            corner(Vec2::new(half.x, -half.y)),
            corner(Vec2::new(-half.x, half.y)),
            corner(Vec2::new(half.x, half.y)),
        ) else {
            return;
        };

        // The quad stays parallel to the image plane, so screen space maps
        // affinely onto its uv square.
        let origin = s0.truncate();
        let axis_u = s1.truncate() - origin;
        let axis_v = s2.truncate() - origin;
        let det = axis_u.perp_dot(axis_v);
        if det.abs() < f32::EPSILON {
            return;
        }

        let xs = [s0.x, s1.x, s2.x, s3.x];
        let ys = [s0.y, s1.y, s2.y, s3.y];
        let min_x = xs.iter().copied().fold(f32::MAX, f32::min).floor().max(0.0) as u32;
        let min_y = ys.iter().copied().fold(f32::MAX, f32::min).floor().max(0.0) as u32;
        let max_x = xs.iter().copied().fold(f32::MIN, f32::max).ceil();
        let max_y = ys.iter().copied().fold(f32::MIN, f32::max).ceil();
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let max_x = (max_x as u32).min(w.saturating_sub(1));
        let max_y = (max_y as u32).min(h.saturating_sub(1));

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let mut acc = Vec4::ZERO;
                let mut covered = 0u32;
                for (ox, oy) in SAMPLE_OFFSETS {
                    let p = Vec2::new(x as f32 + ox, y as f32 + oy) - origin;
                    let uv = Vec2::new(p.perp_dot(axis_v), axis_u.perp_dot(p)) / det;
                    if (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y) {
                        acc += tick_fragment(uv);
                        covered += 1;
                    }
                }
                if covered > 0 {
                    let coverage = covered as f32 / SAMPLE_OFFSETS.len() as f32;
                    self.buffer.write(x, y, acc / covered as f32, coverage);
                }
            }
        }
    }

    /// Composite pass: `shadow * color * buffer` into the visible frame.
    pub fn composite(&self, canvas: &mut Canvas) {
        let (w, h) = (self.buffer.width, self.buffer.height);
        for y in 0..h.min(canvas.height as u32) {
            for x in 0..w.min(canvas.width as u32) {
                let uv = Vec2::new(
                    (x as f32 + 0.5) / w as f32,
                    (y as f32 + 0.5) / h as f32,
                );
                let out = composite_fragment(
                    self.masks.shadow.sample(uv),
                    self.masks.color.sample(uv),
                    self.buffer.get(x, y),
                );
                canvas.set_pixel(x as usize, y as usize, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::SelectionAnimator;
    use crate::geometry::build_ticks;
    use std::ops::RangeInclusive;

    fn white_masks() -> Masks {
        Masks {
            shadow: MaskTexture::solid(Vec4::ONE),
            color: MaskTexture::solid(Vec4::ONE),
        }
    }

    #[test]
    fn camera_projects_origin_to_center() {
        let layout = DialLayout::default();
        let camera = Camera::new(&layout, 2.0);
        let p = project(&camera.view_proj(), Vec3::ZERO, 200, 100).unwrap();
        assert!((p.x - 100.0).abs() < 1e-3);
        assert!((p.y - 50.0).abs() < 1e-3);
        assert!((p.z - 100.0).abs() < 1e-3);
    }

    #[test]
    fn mask_sampling_interpolates() {
        let mask = MaskTexture::from_texels(2, 1, vec![Vec4::ZERO, Vec4::ONE]).unwrap();
        assert_eq!(mask.sample(Vec2::new(0.0, 0.5)), Vec4::ZERO);
        assert_eq!(mask.sample(Vec2::new(1.0, 0.5)), Vec4::ONE);
        let mid = mask.sample(Vec2::new(0.5, 0.5));
        assert!((mid.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn mask_rejects_mismatched_texels() {
        assert!(MaskTexture::from_texels(2, 2, vec![Vec4::ONE]).is_err());
        assert!(MaskTexture::from_texels(0, 0, Vec::new()).is_err());
    }

    fn config(width: u32, height: u32) -> JogDialConfig {
        JogDialConfig::builder()
            .width(width)
            .height(height)
            .tick_count(10)
            .build()
    }

    fn lit_pixels(
        target: &RenderTarget,
        xs: RangeInclusive<u32>,
        ys: RangeInclusive<u32>,
    ) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| target.get(x, y).x > 0.0)
            .count()
    }

    #[test]
    fn buffer_pass_lights_the_resting_arc() {
        let config = config(240, 160);
        let layout = config.layout;
        let mut renderer = Renderer::new(&config, white_masks());
        let ticks = build_ticks(10, &layout);
        let group = TickGroup::new(&layout);
        renderer.render_buffer(&ticks, &group);

        // Tick zero sits on the vertical center line at world y = -20.
        let view_proj = renderer.camera().view_proj();
        let top = project(&view_proj, Vec3::new(0.0, -20.0, layout.tick_depth), 240, 160).unwrap();
        let lit = renderer.buffer().get(top.x as u32, top.y as u32);
        assert!(lit.x > 0.0);

        // Far from any tick the buffer keeps its clear color.
        assert_eq!(renderer.buffer().get(5, 5), BUFFER_CLEAR);
    }

    #[test]
    fn buffer_follows_selection_and_pop() {
        let config = config(240, 160);
        let layout = config.layout;
        let mut renderer = Renderer::new(&config, white_masks());
        let mut ticks = build_ticks(10, &layout);
        let mut group = TickGroup::new(&layout);
        let mut anim = SelectionAnimator::new(10, 0, &layout);

        renderer.render_buffer(&ticks, &group);
        let resting = lit_pixels(renderer.buffer(), 115..=125, 95..=135);

        assert!(anim.advance(1, 0.0, false, &mut ticks, &mut group));
        renderer.render_buffer(&ticks, &group);

        // Tick one is now rotated onto the center line and pushed back by the pop.
        let view_proj = renderer.camera().view_proj();
        let popped_center = Vec3::new(0.0, -20.0, layout.tick_depth - layout.pop_depth);
        let top = project(&view_proj, popped_center, 240, 160).unwrap();
        assert!((top.x - 120.0).abs() < 1.0);
        assert!(renderer.buffer().get(top.x as u32, top.y as u32).x > 0.0);

        let popped = lit_pixels(renderer.buffer(), 115..=125, 95..=135);
        assert!(popped > resting, "popped footprint {popped} <= resting {resting}");
    }

    #[test]
    fn composite_multiplies_masks_into_frame() {
        let masks = Masks {
            shadow: MaskTexture::solid(Vec4::new(0.5, 0.5, 0.5, 1.0)),
            color: MaskTexture::solid(Vec4::new(1.0, 0.0, 1.0, 1.0)),
        };
        let mut renderer = Renderer::new(&config(4, 4), masks);
        renderer.buffer.clear(Vec4::ONE);

        let mut frame = vec![0u8; 4 * 4 * 4];
        renderer.composite(&mut Canvas::new(&mut frame, 4, 4));
        assert_eq!(&frame[0..4], &[128, 0, 128, 255]);
    }
}
