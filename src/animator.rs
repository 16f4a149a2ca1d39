//! Selection state machine: rotates the tick group toward the selected tick
//! and pops the selected tick (depth offset plus growth).

use log::debug;

use crate::config::DialLayout;
use crate::geometry::{Tick, TickGroup, Transform};
use crate::tween::Tween;

/// Main animation started by a selection change.
#[derive(Debug, Clone, Copy)]
struct PopTween {
    tween: Tween,
    tick: usize,
    start_angle: f32,
    diff: f32,
}

/// Returns a previously selected tick to its resting transform.
#[derive(Debug, Clone, Copy)]
struct DecayTween {
    tween: Tween,
    tick: usize,
    from: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Animating,
}

#[derive(Debug)]
pub struct SelectionAnimator {
    current_index: usize,
    tick_count: usize,
    arc_span: f32,
    pop_depth: f32,
    pop_scale: f32,
    decay_duration: f32,
    overshoot: f32,
    pop: Option<PopTween>,
    decays: Vec<DecayTween>,
}

impl SelectionAnimator {
    /// `initial_index` is clamped into range; `tick_count` must be positive.
    pub fn new(tick_count: usize, initial_index: usize, layout: &DialLayout) -> Self {
        Self {
            current_index: initial_index.min(tick_count.saturating_sub(1)),
            tick_count,
            arc_span: layout.arc_span,
            pop_depth: layout.pop_depth,
            pop_scale: layout.pop_scale,
            decay_duration: layout.decay_duration,
            overshoot: layout.overshoot,
            pop: None,
            decays: Vec::new(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Group rotation that centers `index` on the dial.
    pub fn target_rotation(&self, index: usize) -> f32 {
        index as f32 / self.tick_count as f32 * self.arc_span
    }

    pub fn state(&self) -> AnimatorState {
        let popping = self.pop.is_some_and(|p| !p.tween.is_finished());
        if popping || !self.decays.is_empty() {
            AnimatorState::Animating
        } else {
            AnimatorState::Idle
        }
    }

    pub fn is_animating(&self) -> bool {
        self.state() == AnimatorState::Animating
    }

    /// Number of decay tweens still running.
    pub fn pending_decays(&self) -> usize {
        self.decays.len()
    }

    /// Moves the selection by `direction` ticks and starts the pop animation.
    ///
    /// Returns `false` when the clamped index is unchanged and `force` is not set;
    /// nothing is mutated in that case. A zero `duration` lands on the end state
    /// before returning.
    pub fn advance(
        &mut self,
        direction: i32,
        duration: f32,
        force: bool,
        ticks: &mut [Tick],
        group: &mut TickGroup,
    ) -> bool {
        let last = self.tick_count as i64 - 1;
        let new_index = (self.current_index as i64 + direction as i64).clamp(0, last) as usize;
        if new_index == self.current_index && !force {
            return false;
        }

        let prev_index = self.current_index;
        self.current_index = new_index;

        let start_angle = group.rotation;
        let diff = self.target_rotation(new_index) - start_angle;

        // The previous pop stays referenced after it finishes, so the old
        // selection always decays back to rest once a new one is made.
        if let Some(previous) = self.pop.take() {
            debug!(
                "cancelling pop on tick {} (progress {:.2}), decaying tick {}",
                previous.tick,
                previous.tween.progress(),
                prev_index
            );
            self.start_decay(prev_index, ticks);
        }

        // The newly selected tick belongs to the pop tween from now on.
        self.decays.retain(|d| d.tick != new_index);

        let pop = PopTween {
            tween: Tween::new(duration, self.overshoot),
            tick: new_index,
            start_angle,
            diff,
        };
        debug!(
            "selection {} -> {} (rotation {:.4} -> {:.4} over {:.2}s)",
            prev_index,
            new_index,
            start_angle,
            start_angle + diff,
            duration
        );
        self.pop = Some(pop);
        self.apply_pop(ticks, group);
        true
    }

    /// Advances every running tween by `dt` seconds and writes the results into
    /// the tick transforms and group rotation.
    pub fn update(&mut self, dt: f32, ticks: &mut [Tick], group: &mut TickGroup) {
        for decay in &mut self.decays {
            decay.tween.advance(dt);
            if let Some(tick) = ticks.get_mut(decay.tick) {
                tick.current = if decay.tween.is_finished() {
                    tick.initial
                } else {
                    decay.from.lerp(tick.initial, decay.tween.progress())
                };
            }
        }
        self.decays.retain(|d| !d.tween.is_finished());

        if let Some(pop) = &mut self.pop {
            if pop.tween.is_finished() {
                return;
            }
            pop.tween.advance(dt);
        }
        self.apply_pop(ticks, group);
    }

    fn start_decay(&mut self, tick_index: usize, ticks: &[Tick]) {
        let Some(tick) = ticks.get(tick_index) else {
            return;
        };
        self.decays.retain(|d| d.tick != tick_index);
        self.decays.push(DecayTween {
            tween: Tween::new(self.decay_duration, self.overshoot),
            tick: tick_index,
            from: tick.current,
        });
    }

    fn apply_pop(&self, ticks: &mut [Tick], group: &mut TickGroup) {
        let Some(pop) = &self.pop else {
            return;
        };
        let progress = pop.tween.progress();
        group.rotation = pop.start_angle + pop.diff * progress;

        if let Some(tick) = ticks.get_mut(pop.tick) {
            let initial = tick.initial;
            tick.current.position.z = initial.position.z - self.pop_depth * progress;
            tick.current.scale.x = initial.scale.x + self.pop_scale * progress;
            tick.current.scale.y = initial.scale.y + self.pop_scale * progress;
        }
    }
}
