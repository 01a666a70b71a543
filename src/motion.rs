// Scroll accumulator and damped approach of the timeline depth toward it.
// Rule: depth only ever moves a fixed fraction of the remaining distance per frame.

use serde::Serialize;

use crate::types::MotionSettings;

/// Scroll and camera-depth state for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrollState {
    /// Accumulated input, clamped to `[0, limit]`.
    pub target: f32,
    /// Actual timeline depth, chasing `target`.
    pub depth: f32,
    pub scrolling: bool,
    pub locked: bool,
    pub pointer_held: bool,
    pub auto_speed: f32,
}

/// Owns `ScrollState` and advances it once per frame.
#[derive(Debug, Clone)]
pub struct MotionController {
    settings: MotionSettings,
    state: ScrollState,
    limit: f32,
}

impl MotionController {
    /// `end_offset` is the (negative) depth offset of the terminal section.
    pub fn new(settings: MotionSettings, end_offset: f32) -> Self {
        MotionController {
            settings,
            state: ScrollState::default(),
            limit: (-end_offset).max(0.0),
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }

    /// Upper bound of the scroll target.
    pub fn limit(&self) -> f32 {
        self.limit
    }

    pub fn depth(&self) -> f32 {
        self.state.depth
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.state.depth = depth;
    }

    pub fn target(&self) -> f32 {
        self.state.target
    }

    pub fn auto_speed(&self) -> f32 {
        self.state.auto_speed
    }

    pub fn set_auto_speed(&mut self, speed: f32) {
        self.state.auto_speed = speed.max(0.0);
    }

    pub fn is_scrolling(&self) -> bool {
        self.state.scrolling
    }

    pub fn is_locked(&self) -> bool {
        self.state.locked
    }

    pub fn lock(&mut self) {
        self.state.locked = true;
    }

    pub fn unlock(&mut self) {
        self.state.locked = false;
    }

    pub fn pointer_held(&self) -> bool {
        self.state.pointer_held
    }

    pub fn set_pointer_held(&mut self, held: bool) {
        self.state.pointer_held = held;
    }

    /// Add an input delta to the target. Ignored while locked.
    pub fn apply_delta(&mut self, delta: f32) -> bool {
        if self.state.locked || !delta.is_finite() {
            return false;
        }
        self.state.target = (self.state.target + delta).clamp(0.0, self.limit);
        self.state.scrolling = true;
        true
    }

    /// Advance one frame. Returns the depth step taken, if any.
    pub fn tick(&mut self) -> Option<f32> {
        if self.state.locked {
            return None;
        }

        if self.state.auto_speed > 0.0 {
            self.state.scrolling = true;
            self.state.target += self.state.auto_speed;
        }

        if !self.state.scrolling {
            return None;
        }

        self.state.target = self.state.target.clamp(0.0, self.limit);
        let delta = (self.state.target - self.state.depth) / self.settings.damping;
        self.state.depth += delta;
        self.state.scrolling = delta.abs() > self.settings.settle_threshold;

        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller() -> MotionController {
        MotionController::new(MotionSettings::default(), -5000.0)
    }

    #[test]
    fn first_step_is_one_twelfth() {
        let mut motion = controller();
        motion.apply_delta(1200.0);
        let delta = motion.tick().unwrap();
        assert!((delta - 100.0).abs() < 1e-3);
        assert!((motion.depth() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn settles_and_clears_scrolling() {
        let mut motion = controller();
        motion.apply_delta(300.0);
        let mut frames = 0;
        while motion.tick().is_some() {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(!motion.is_scrolling());
        assert!((motion.target() - motion.depth()).abs() <= 0.1 * 12.0 + 1e-3);
    }

    #[test]
    fn target_clamps_at_both_ends() {
        let mut motion = controller();
        motion.apply_delta(-50.0);
        assert_eq!(motion.target(), 0.0);
        motion.apply_delta(1e6);
        assert_eq!(motion.target(), 5000.0);
    }

    #[test]
    fn locked_ignores_input_and_frames() {
        let mut motion = controller();
        motion.lock();
        assert!(!motion.apply_delta(500.0));
        assert_eq!(motion.target(), 0.0);
        motion.set_depth(321.0);
        assert!(motion.tick().is_none());
        assert_eq!(motion.depth(), 321.0);
    }

    #[test]
    fn auto_scroll_keeps_moving_until_released() {
        let mut motion = controller();
        motion.set_auto_speed(20.0);
        for _ in 0..10 {
            motion.tick();
        }
        assert_eq!(motion.target(), 200.0);
        assert!(motion.depth() > 0.0);

        motion.set_auto_speed(0.0);
        let target = motion.target();
        motion.tick();
        assert_eq!(motion.target(), target);
    }

    #[test]
    fn auto_scroll_stops_at_the_end() {
        let mut motion = controller();
        motion.set_auto_speed(1000.0);
        for _ in 0..20 {
            motion.tick();
        }
        assert_eq!(motion.target(), 5000.0);
    }

    proptest! {
        #[test]
        fn target_stays_in_bounds(deltas in prop::collection::vec(-5000.0f32..5000.0, 0..64)) {
            let mut motion = controller();
            for delta in deltas {
                motion.apply_delta(delta);
                motion.tick();
                prop_assert!(motion.target() >= 0.0);
                prop_assert!(motion.target() <= motion.limit());
            }
        }

        #[test]
        fn depth_never_overshoots(start in 0.0f32..5000.0, delta in -5000.0f32..5000.0) {
            let mut motion = controller();
            motion.set_depth(start);
            motion.apply_delta(start);
            motion.apply_delta(delta);
            let before = (motion.target() - motion.depth()).abs();
            motion.tick();
            let after = (motion.target() - motion.depth()).abs();
            prop_assert!(after <= before + 1e-3);
            prop_assert!(before - after <= before / 12.0 + 1e-2);
        }
    }
}
