// Eased interpolation scheduler. Tweens are keyed by a target field; starting a tween on a
// field that already has one in flight cancels the old one without firing its callbacks.
// Callbacks are plain signal values returned from `tick`, routed by the owner.

use std::fmt::Debug;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::Rgb;

/// Easing curve applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    EaseOut,
    EaseInOut,
    ExpoInOut,
    Power4Out,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::EaseOut => 1.0 - (1.0 - t).powi(3),
            Ease::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Ease::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            // Quintic, matching the "Power4" naming of tween libraries.
            Ease::Power4Out => 1.0 - (1.0 - t).powi(5),
        }
    }
}

/// A value a tween can drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimValue {
    Scalar(f32),
    Vec2(Vec2),
    Color(Rgb),
}

impl AnimValue {
    pub fn lerp(self, to: AnimValue, t: f32) -> AnimValue {
        match (self, to) {
            (AnimValue::Scalar(a), AnimValue::Scalar(b)) => AnimValue::Scalar(a + (b - a) * t),
            (AnimValue::Vec2(a), AnimValue::Vec2(b)) => AnimValue::Vec2(a.lerp(b, t)),
            (AnimValue::Color(a), AnimValue::Color(b)) => AnimValue::Color(a.lerp(b, t)),
            // Mismatched kinds snap.
            (_, to) => to,
        }
    }

    pub fn as_scalar(self) -> Option<f32> {
        match self {
            AnimValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec2(self) -> Option<Vec2> {
        match self {
            AnimValue::Vec2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(self) -> Option<Rgb> {
        match self {
            AnimValue::Color(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f32> for AnimValue {
    fn from(v: f32) -> Self {
        AnimValue::Scalar(v)
    }
}

impl From<Vec2> for AnimValue {
    fn from(v: Vec2) -> Self {
        AnimValue::Vec2(v)
    }
}

impl From<Rgb> for AnimValue {
    fn from(v: Rgb) -> Self {
        AnimValue::Color(v)
    }
}

/// State a tween reads its start value from and writes into every tick.
pub trait Animatable<F> {
    fn read(&self, field: F) -> Option<AnimValue>;
    fn write(&mut self, field: F, value: AnimValue);
}

/// Opaque identifier of a registered tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimHandle(u64);

/// One eased interpolation of a single field.
#[derive(Debug, Clone)]
pub struct Tween<F, S> {
    field: F,
    to: AnimValue,
    from: Option<AnimValue>,
    duration: f32,
    delay: f32,
    ease: Ease,
    on_start: Option<S>,
    on_complete: Option<S>,
    elapsed: f32,
    origin: Option<AnimValue>,
    finished: bool,
    handle: AnimHandle,
}

impl<F: Copy, S: Clone> Tween<F, S> {
    pub fn to(field: F, value: impl Into<AnimValue>, duration: f32) -> Self {
        Tween {
            field,
            to: value.into(),
            from: None,
            duration,
            delay: 0.0,
            ease: Ease::ExpoInOut,
            on_start: None,
            on_complete: None,
            elapsed: 0.0,
            origin: None,
            finished: false,
            handle: AnimHandle(0),
        }
    }

    /// Jump the field to `value` when the tween starts instead of reading it.
    pub fn starting_at(mut self, value: impl Into<AnimValue>) -> Self {
        self.from = Some(value.into());
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, secs: f32) -> Self {
        self.delay = secs.max(0.0);
        self
    }

    pub fn on_start(mut self, signal: S) -> Self {
        self.on_start = Some(signal);
        self
    }

    pub fn on_complete(mut self, signal: S) -> Self {
        self.on_complete = Some(signal);
        self
    }

    pub fn field(&self) -> F {
        self.field
    }

    fn advance<T: Animatable<F>>(&mut self, dt: f32, target: &mut T, signals: &mut Vec<S>) {
        self.elapsed += dt;
        if self.elapsed < self.delay {
            return;
        }

        let origin = match self.origin {
            Some(origin) => origin,
            None => {
                let origin = match self.from {
                    Some(from) => {
                        target.write(self.field, from);
                        from
                    }
                    None => match target.read(self.field) {
                        Some(current) => current,
                        None => {
                            // Field no longer exists; drop silently.
                            self.finished = true;
                            return;
                        }
                    },
                };
                self.origin = Some(origin);
                if let Some(signal) = &self.on_start {
                    signals.push(signal.clone());
                }
                origin
            }
        };

        let progress = if self.duration <= 0.0 {
            1.0
        } else {
            ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
        };
        if progress < 1.0 {
            target.write(self.field, origin.lerp(self.to, self.ease.apply(progress)));
        } else {
            // Land exactly on the target.
            target.write(self.field, self.to);
            self.finished = true;
            if let Some(signal) = &self.on_complete {
                signals.push(signal.clone());
            }
        }
    }
}

/// Registry of in-flight tweens, advanced once per frame.
#[derive(Debug)]
pub struct Animator<F, S> {
    tweens: Vec<Tween<F, S>>,
    next_handle: u64,
}

impl<F, S> Default for Animator<F, S> {
    fn default() -> Self {
        Animator {
            tweens: Vec::new(),
            next_handle: 1,
        }
    }
}

impl<F: Copy + PartialEq + Debug, S: Clone> Animator<F, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tween. Any tween already driving the same field is cancelled.
    pub fn start(&mut self, mut tween: Tween<F, S>) -> AnimHandle {
        self.cancel(tween.field);
        let handle = AnimHandle(self.next_handle);
        self.next_handle += 1;
        tween.handle = handle;
        self.tweens.push(tween);
        handle
    }

    /// Cancel whatever drives `field`. Returns whether something was cancelled.
    pub fn cancel(&mut self, field: F) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.field != field);
        if self.tweens.len() != before {
            tracing::trace!(?field, "tween overwritten");
            true
        } else {
            false
        }
    }

    pub fn is_running(&self, handle: AnimHandle) -> bool {
        self.tweens.iter().any(|t| t.handle == handle)
    }

    pub fn is_animating(&self, field: F) -> bool {
        self.tweens.iter().any(|t| t.field == field)
    }

    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }

    /// Advance every tween by `dt` seconds, writing into `target`.
    /// Returns start and completion signals in registration order.
    pub fn tick<T: Animatable<F>>(&mut self, dt: f32, target: &mut T) -> Vec<S> {
        let mut signals = Vec::new();
        for tween in self.tweens.iter_mut() {
            tween.advance(dt, target, &mut signals);
        }
        self.tweens.retain(|t| !t.finished);
        signals
    }
}
