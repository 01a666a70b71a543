// One running timeline. Owns every component and drives them from a single per-frame tick;
// input handlers mutate the same state synchronously between frames.

use glam::Vec2;
use serde::Serialize;

use crate::anim::{Animator, Ease, Tween};
use crate::assets::AssetBundle;
use crate::camera::Camera;
use crate::error::EngineResult;
use crate::focus::{FocusContext, FocusMachine, Mode, Signal};
use crate::input::{Dispatcher, InputView, PressAction, WheelInput};
use crate::layout::build_layout;
use crate::motion::MotionController;
use crate::scene::{Field, InterfaceColors, Material, Playback, Scene, Stage};
use crate::theme::ThemeEngine;
use crate::types::{CursorStyle, EngineConfig, HostCommand, ItemId, Rgb};
use crate::video::VideoGate;

/// Badge spin per unit of scroll while the intro is on screen.
const BADGE_SPIN: f32 = 0.005;
/// Depth past which the intro badge stops spinning.
const BADGE_DEPTH: f32 = 700.0;
/// Longest frame step accepted, in seconds. Longer gaps (hidden tab) are clipped.
const MAX_FRAME_STEP: f32 = 0.1;

pub struct Session {
    config: EngineConfig,
    scene: Scene,
    motion: MotionController,
    focus: FocusMachine,
    theme: ThemeEngine,
    video: VideoGate,
    input: Dispatcher,
    animator: Animator<Field, Signal>,
    commands: Vec<HostCommand>,
    last_frame_ms: Option<f64>,
}

impl Session {
    pub fn new(config: EngineConfig, bundle: &AssetBundle) -> EngineResult<Self> {
        let layout = build_layout(&config, bundle)?;

        let camera = Camera::new(config.camera.clone(), config.viewport);
        let mut scene = Scene::new(layout.sections, layout.items, camera);
        let motion = MotionController::new(config.motion.clone(), layout.end_offset);
        let theme = ThemeEngine::new(config.theme.clone(), layout.boundaries, &config.months);
        theme.apply_now(theme.active(), &mut scene);

        let input = Dispatcher::new(
            config.motion.clone(),
            config.layout.clone(),
            config.focus.clone(),
            config.contact_url.clone(),
            config.viewport.touch_enabled,
        );

        tracing::info!(
            items = scene.items.len(),
            limit = motion.limit(),
            month = theme.active(),
            "session started"
        );

        Ok(Session {
            focus: FocusMachine::new(config.focus.clone()),
            config,
            scene,
            motion,
            theme,
            video: VideoGate::new(),
            input,
            animator: Animator::new(),
            commands: Vec::new(),
            last_frame_ms: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Scene and motion borrowed together, for callers that drive both.
    pub fn parts_mut(&mut self) -> (&mut Scene, &mut MotionController) {
        (&mut self.scene, &mut self.motion)
    }

    pub fn mode(&self) -> Mode {
        self.focus.mode()
    }

    pub fn depth(&self) -> f32 {
        self.motion.depth()
    }

    pub fn scroll_target(&self) -> f32 {
        self.motion.target()
    }

    pub fn auto_speed(&self) -> f32 {
        self.motion.auto_speed()
    }

    pub fn active_month(&self) -> &str {
        self.theme.active()
    }

    /// No tween running, no scroll settling and no auto-scroll.
    pub fn is_idle(&self) -> bool {
        self.animator.is_idle() && !self.motion.is_scrolling() && self.motion.auto_speed() == 0.0
    }

    /// Advance to the display timestamp `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        self.step(dt.clamp(0.0, MAX_FRAME_STEP));
    }

    /// Advance by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let signals = self.animator.tick(
            dt,
            &mut Stage {
                scene: &mut self.scene,
                motion: &mut self.motion,
            },
        );
        for signal in signals {
            let (focus, mut cx) = self.focus_parts();
            focus.on_signal(signal, &mut cx);
        }

        if let Some(pointer) = self.input.take_perspective() {
            let strength = self.config.camera.tilt_strength;
            self.animator.start(
                Tween::to(
                    Field::CameraTilt,
                    Vec2::new(-pointer.y * strength, -pointer.x * strength),
                    self.config.camera.tilt_duration,
                )
                .ease(Ease::Power4Out),
            );
        }

        if let Some(delta) = self.motion.tick() {
            let depth = self.motion.depth();
            if depth < BADGE_DEPTH {
                self.scene.badge_rotation += delta * BADGE_SPIN;
            }
            if let Some(month) = self.theme.evaluate(depth) {
                self.theme.apply(&month, &self.scene, &mut self.animator);
            }
        }

        let frustum = self.scene.camera.frustum();
        let depth = self.motion.depth();
        let commands = self.video.evaluate(&frustum, &mut self.scene, depth);
        self.commands.extend(commands);
    }

    fn focus_parts(&mut self) -> (&mut FocusMachine, FocusContext<'_>) {
        (
            &mut self.focus,
            FocusContext {
                scene: &mut self.scene,
                motion: &mut self.motion,
                animator: &mut self.animator,
            },
        )
    }

    fn input_parts(&mut self) -> (&mut Dispatcher, InputView<'_>) {
        (
            &mut self.input,
            InputView {
                scene: &self.scene,
                depth: self.motion.depth(),
                mode: self.focus.mode(),
                pointer_held: self.motion.pointer_held(),
            },
        )
    }

    pub fn open_item(&mut self, id: ItemId) -> bool {
        let (focus, mut cx) = self.focus_parts();
        focus.open(id, &mut cx)
    }

    pub fn close_item(&mut self) -> bool {
        let (focus, mut cx) = self.focus_parts();
        focus.close(&mut cx)
    }

    pub fn toggle_contact(&mut self) -> bool {
        let (focus, mut cx) = self.focus_parts();
        let toggled = focus.toggle_contact(&mut cx);
        if toggled && self.focus.mode() == Mode::ContactOpen && !self.focus.is_contact_leaving() {
            self.input.set_cursor(CursorStyle::Cross);
        }
        toggled
    }

    /// Switch the palette to `month` regardless of depth, with the usual cross-fade.
    pub fn force_month(&mut self, month: &str) -> bool {
        if !self.theme.force(month) {
            tracing::debug!(month, "unknown month, override ignored");
            return false;
        }
        self.theme.apply(month, &self.scene, &mut self.animator);
        true
    }

    pub fn wheel(&mut self, input: WheelInput) -> bool {
        let delta = self.input.wheel_delta(&input);
        self.motion.apply_delta(delta)
    }

    pub fn pan_move(&mut self, velocity_y: f32) -> bool {
        let delta = self.input.pan_delta(velocity_y);
        self.motion.apply_delta(delta)
    }

    pub fn pan_end(&mut self) {
        self.stop_auto_scroll();
    }

    pub fn long_press(&mut self) -> bool {
        if self.motion.is_locked() {
            return false;
        }
        self.animator.cancel(Field::AutoScrollSpeed);
        self.motion.set_auto_speed(self.input.long_press_speed());
        true
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let (input, view) = self.input_parts();
        input.pointer_move(x, y, &view);
    }

    /// Returns whether the press did anything.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.motion.set_pointer_held(true);
        let (input, view) = self.input_parts();
        let action = input.pointer_down(x, y, &view);
        match action {
            PressAction::OpenUrl(url) => {
                tracing::debug!(%url, "link opened");
                self.commands.push(HostCommand::OpenUrl { url });
                true
            }
            PressAction::CloseActive => {
                let (focus, mut cx) = self.focus_parts();
                focus.close_active(&mut cx)
            }
            PressAction::OpenItem(id) => self.open_item(id),
            PressAction::StartAutoScroll => {
                if self.motion.is_locked() {
                    return false;
                }
                let ramp = self.input.auto_scroll_ramp();
                self.animator.start(ramp);
                true
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.motion.set_pointer_held(false);
        self.stop_auto_scroll();
        self.input.pointer_up(self.focus.mode());
    }

    fn stop_auto_scroll(&mut self) {
        self.animator.cancel(Field::AutoScrollSpeed);
        self.motion.set_auto_speed(0.0);
    }

    /// Viewport change. Only the camera projection is affected.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.scene.camera.resize(width, height);
    }

    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Stop playback and drop in-flight animations before the host disposes the scene.
    pub fn teardown(&mut self) -> Vec<HostCommand> {
        self.animator.clear();
        self.motion.set_auto_speed(0.0);
        let mut commands = self.drain_commands();
        commands.extend(self.video.pause_all(&mut self.scene));
        tracing::info!("session torn down");
        commands
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let scene = &self.scene;
        let camera = &scene.camera;
        FrameSnapshot {
            depth: self.motion.depth(),
            scroll_target: self.motion.target(),
            mode: self.focus.mode(),
            active_month: self.theme.active().to_string(),
            cursor: self.input.cursor(),
            camera: CameraState {
                y: camera.y,
                tilt: camera.tilt,
                fov: camera.fov(),
                aspect: camera.aspect(),
            },
            background: scene.background,
            fog: scene.fog,
            text: scene.text,
            caption: scene.caption,
            link_underline: scene.link_underline,
            outline: scene.outline,
            interface: scene.interface,
            underline_accent: scene
                .interface
                .underline_accent
                .to_css_rgba(self.theme.settings().accent_alpha),
            timeline_visible: scene.timeline_visible,
            contact_visible: scene.contact_visible,
            badge_rotation: scene.badge_rotation,
            items: scene
                .items
                .iter()
                .map(|item| ItemState {
                    id: item.id,
                    position: item.position,
                    reveal: item.reveal,
                    opacity: item.opacity,
                    tint: item.tint,
                    caption_depth: item.caption.as_ref().map(|c| c.depth),
                    caption_visible: item.caption.as_ref().is_some_and(|c| c.visible),
                    link_depth: item.link.as_ref().map(|l| l.depth),
                    link_visible: item.link.as_ref().is_some_and(|l| l.visible),
                    playing: item.playback == Playback::Playing,
                })
                .collect(),
        }
    }
}

/// Everything the host applies to its scene graph after a frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub depth: f32,
    pub scroll_target: f32,
    pub mode: Mode,
    pub active_month: String,
    pub cursor: CursorStyle,
    pub camera: CameraState,
    pub background: Rgb,
    pub fog: Rgb,
    pub text: Material,
    pub caption: Material,
    pub link_underline: Material,
    pub outline: Material,
    pub interface: InterfaceColors,
    /// `rgba()` form of the accent underline, with the theme's alpha.
    pub underline_accent: String,
    pub timeline_visible: bool,
    pub contact_visible: bool,
    pub badge_rotation: f32,
    pub items: Vec<ItemState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraState {
    pub y: f32,
    pub tilt: Vec2,
    pub fov: f32,
    pub aspect: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemState {
    pub id: ItemId,
    pub position: Vec2,
    pub reveal: f32,
    pub opacity: f32,
    pub tint: Rgb,
    pub caption_depth: Option<f32>,
    pub caption_visible: bool,
    pub link_depth: Option<f32>,
    pub link_visible: bool,
    pub playing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::test_support::{run_frames, sample_bundle, sample_config, sample_session, settle};

    #[test]
    fn starts_on_the_first_palette() {
        let session = sample_session();
        let intro = sample_config().months[0].clone();
        assert_eq!(session.active_month(), "intro");
        assert_eq!(session.scene().background, intro.bg_color);
        assert_eq!(session.scene().text.color, intro.text_color);
        assert_eq!(session.mode(), Mode::Browsing);
        assert!(session.is_idle());
    }

    #[test]
    fn missing_font_fails_startup() {
        let mut bundle = sample_bundle();
        bundle.fonts.retain(|f| f != "SuisseIntl-Bold");
        let err = Session::new(sample_config(), &bundle).err().unwrap();
        assert!(matches!(err, EngineError::AssetResolution { .. }));
    }

    #[test]
    fn frame_derives_dt_from_timestamps() {
        let mut session = sample_session();
        session.toggle_contact();
        session.frame(1000.0);
        // First frame only records the clock.
        assert_eq!(session.scene().camera.y, 0.0);
        session.frame(2000.0);
        // A one second gap is clipped to a single short step.
        let y = session.scene().camera.y;
        assert!(y > 0.0 && y < 2000.0);
    }

    #[test]
    fn wheel_scroll_changes_month_and_fades_colours() {
        let mut session = sample_session();
        let down = WheelInput {
            delta_y: Some(120.0),
            ..Default::default()
        };
        for _ in 0..25 {
            assert!(session.wheel(down));
        }
        assert_eq!(session.scroll_target(), 1000.0);
        settle(&mut session);

        assert_eq!(session.active_month(), "jan");
        let jan = sample_config().months[1].clone();
        assert_eq!(session.scene().background, jan.bg_color);
        assert_eq!(session.scene().items[0].tint, jan.tint_color);
    }

    #[test]
    fn forced_month_fades_to_its_palette() {
        let mut session = sample_session();
        assert!(session.force_month("feb"));
        assert_eq!(session.active_month(), "feb");
        assert!(!session.is_idle());
        settle(&mut session);

        let feb = sample_config().months[2].clone();
        let scene = session.scene();
        assert_eq!(scene.background, feb.bg_color);
        assert_eq!(scene.fog, feb.bg_color);
        assert_eq!(scene.text.color, feb.text_color);
        assert_eq!(scene.items[0].tint, feb.tint_color);
        assert_eq!(Some(scene.outline.color), feb.outline_color);

        assert!(!session.force_month("nope"));
        assert_eq!(session.active_month(), "feb");
    }

    #[test]
    fn badge_spins_only_near_the_intro() {
        let mut session = sample_session();
        session.parts_mut().1.apply_delta(300.0);
        session.step(1.0 / 60.0);
        let spun = session.scene().badge_rotation;
        assert!((spun - 25.0 * BADGE_SPIN).abs() < 1e-4);

        {
            let (_, motion) = session.parts_mut();
            motion.set_depth(900.0);
            motion.apply_delta(1000.0);
        }
        session.step(1.0 / 60.0);
        assert_eq!(session.scene().badge_rotation, spun);
    }

    #[test]
    fn resize_touches_only_the_camera() {
        let mut session = sample_session();
        let before = session.snapshot();
        session.resize(800.0, 400.0);
        let after = session.snapshot();
        assert_eq!(after.camera.aspect, 2.0);
        assert_ne!(after.camera.fov, before.camera.fov);
        assert_eq!(after.depth, before.depth);
        assert_eq!(after.mode, before.mode);
        assert!(session.is_idle());
    }

    #[test]
    fn videos_follow_the_camera() {
        let mut session = sample_session();
        session.parts_mut().1.apply_delta(1800.0);
        settle(&mut session);
        let commands = session.drain_commands();
        assert!(commands.contains(&HostCommand::PlayVideo { item: ItemId::new(1) }));
        assert!(session.drain_commands().is_empty());

        let paused = session.teardown();
        assert!(paused.contains(&HostCommand::PauseVideo { item: ItemId::new(1) }));
        assert!(session.snapshot().items.iter().all(|i| !i.playing));
    }

    #[test]
    fn pointer_tilt_eases_the_camera() {
        let mut session = sample_session();
        session.pointer_move(1600.0, 900.0);
        run_frames(&mut session, 2);
        let tilt = session.scene().camera.tilt;
        assert!(tilt.x < 0.0 && tilt.y < 0.0);
        settle(&mut session);
        let tilt = session.scene().camera.tilt;
        assert!((tilt.x + 0.25).abs() < 1e-4);
        assert!((tilt.y + 0.25).abs() < 1e-4);
    }

    #[test]
    fn snapshot_serializes_for_the_host() {
        let mut session = sample_session();
        session.open_item(ItemId::new(0));
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["mode"]["mode"], "item_open");
        assert_eq!(json["mode"]["item"], 0);
        assert_eq!(json["cursor"], "pointer");
        assert_eq!(json["background"], "#aec7c3");
        assert!(json["underline_accent"].as_str().unwrap().starts_with("rgba("));
        assert_eq!(json["items"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn contact_locks_scrolling() {
        let mut session = sample_session();
        session.toggle_contact();
        assert!(!session.wheel(WheelInput {
            delta_y: Some(120.0),
            ..Default::default()
        }));
        assert!(!session.long_press());

        // A press off the mail link closes the overlay; scrolling stays locked until the
        // camera is back.
        assert!(session.pointer_down(10.0, 10.0));
        session.pointer_up();
        assert_eq!(session.mode(), Mode::ContactOpen);
        assert!(!session.pan_move(-3.0));
        // A second press while the camera returns does not turn it around.
        assert!(!session.pointer_down(10.0, 10.0));
        session.pointer_up();
        settle(&mut session);
        assert_eq!(session.mode(), Mode::Browsing);
        assert!(session.pan_move(-3.0));
    }
}
