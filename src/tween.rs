/// Back-out easing: overshoots the target by an amount set by `overshoot`
/// before settling on 1.
pub fn ease_out_back(t: f32, overshoot: f32) -> f32 {
    let t = t - 1.0;
    t * t * ((overshoot + 1.0) * t + overshoot) + 1.0
}

/// A progress clock from 0 to 1 over `duration` seconds, advanced by the frame loop.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    elapsed: f32,
    duration: f32,
    overshoot: f32,
}

impl Tween {
    pub fn new(duration: f32, overshoot: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
            overshoot,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
    }

    /// Linear time fraction in [0, 1].
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Eased progress; exactly 0 at the start and 1 once finished.
    pub fn progress(&self) -> f32 {
        match self.fraction() {
            f if f <= 0.0 => 0.0,
            f if f >= 1.0 => 1.0,
            f => ease_out_back(f, self.overshoot),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.fraction() >= 1.0
    }
}
