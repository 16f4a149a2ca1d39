use bon::Builder;
use glam::Vec2;

/// Geometric and timing constants of the dial face
#[derive(Debug, Clone, Copy)]
pub struct DialLayout {
    /// Radius of the tick arc in world units
    pub radius: f32,
    /// Dial center relative to the camera target
    pub center: Vec2,
    /// Size of a single tick quad (width, height)
    pub tick_size: Vec2,
    /// Resting depth of every tick
    pub tick_depth: f32,
    /// Total angular range the ticks are spread over
    pub arc_span: f32,
    /// Angle of tick zero
    pub base_offset: f32,

    // Camera
    pub fov_y: f32,
    pub camera_distance: f32,
    pub near: f32,
    pub far: f32,

    // Animation
    pub pop_depth: f32,
    pub pop_scale: f32,
    pub decay_duration: f32,
    pub overshoot: f32,
}

impl Default for DialLayout {
    fn default() -> Self {
        Self {
            radius: 120.0,
            center: Vec2::new(0.0, -140.0),
            tick_size: Vec2::new(0.32, 6.6),
            tick_depth: 0.1,
            arc_span: std::f32::consts::PI * 0.26,
            base_offset: std::f32::consts::FRAC_PI_2,
            fov_y: 45f32.to_radians(),
            camera_distance: 100.0,
            near: 0.001,
            far: 1000.0,
            pop_depth: 24.0,
            pop_scale: 1.2,
            decay_duration: 0.8,
            overshoot: 1.1,
        }
    }
}

#[derive(Debug, Clone, Builder)]
pub struct JogDialConfig {
    #[builder(default = "Jog Dial".to_string())]
    pub title: String,

    // Canvas
    #[builder(default = 480)]
    pub width: u32,
    #[builder(default = 320)]
    pub height: u32,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Dial
    #[builder(default = 40)]
    pub tick_count: usize,
    /// Accepted for compatibility with host configurations; layout ignores it.
    #[builder(default = 1.0)]
    pub tick_length_ratio: f32,
    /// Fraction of the half-width used as the interaction radius
    #[builder(default = 0.8)]
    pub radius_ratio: f32,
    #[builder(default = 0)]
    pub initial_index: usize,

    /// Duration of a keyboard or `Step` command, in seconds
    #[builder(default = 0.6)]
    pub step_duration: f32,

    #[builder(default)]
    pub layout: DialLayout,
}

impl Default for JogDialConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl JogDialConfig {
    /// Radius (in pixels) inside which pointer interaction would be captured.
    pub fn interaction_radius(&self) -> f32 {
        self.width as f32 * 0.5 * self.radius_ratio
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
