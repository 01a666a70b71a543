// Pointer, wheel and touch dispatch. Wheel and pan become scroll deltas; pointer positions are
// ray-cast against exactly one pool per mode and presses resolve to a single action.

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::anim::{Ease, Tween};
use crate::camera::Ray;
use crate::focus::Mode;
use crate::scene::{Field, Scene};
use crate::types::{CursorStyle, FocusSettings, ItemId, LayoutSettings, MotionSettings};

/// Raw wheel event fields. Browsers disagree on which ones they fill in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WheelInput {
    pub delta_y: Option<f32>,
    pub wheel_delta: Option<f32>,
    pub detail: Option<f32>,
}

/// Collapse a wheel event to notches, positive meaning "up".
pub fn normalize_wheel(input: &WheelInput) -> f32 {
    let nonzero = |v: Option<f32>| v.filter(|v| *v != 0.0 && v.is_finite());
    match (nonzero(input.detail), nonzero(input.wheel_delta), nonzero(input.delta_y)) {
        (Some(detail), Some(wheel), _) => wheel / detail / 40.0 * detail.signum(),
        (_, _, Some(delta_y)) => -delta_y / 60.0,
        _ => input.wheel_delta.unwrap_or(0.0) / 120.0,
    }
}

/// What sits under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    Item(ItemId),
    Link(String),
}

/// Outcome of a press, carried out by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PressAction {
    OpenUrl(String),
    CloseActive,
    OpenItem(ItemId),
    StartAutoScroll,
}

/// Read-only view the dispatcher hit-tests against.
pub struct InputView<'a> {
    pub scene: &'a Scene,
    pub depth: f32,
    pub mode: Mode,
    pub pointer_held: bool,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    motion: MotionSettings,
    layout: LayoutSettings,
    focus: FocusSettings,
    contact_url: String,
    touch_enabled: bool,
    cursor: CursorStyle,
    hover: Option<Hit>,
    perspective: Option<Vec2>,
}

impl Dispatcher {
    pub fn new(
        motion: MotionSettings,
        layout: LayoutSettings,
        focus: FocusSettings,
        contact_url: String,
        touch_enabled: bool,
    ) -> Self {
        Dispatcher {
            motion,
            layout,
            focus,
            contact_url,
            touch_enabled,
            cursor: CursorStyle::Pointer,
            hover: None,
            perspective: None,
        }
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursor = cursor;
    }

    pub fn hover(&self) -> Option<&Hit> {
        self.hover.as_ref()
    }

    /// Scroll delta for a wheel event.
    pub fn wheel_delta(&self, input: &WheelInput) -> f32 {
        -normalize_wheel(input) * self.motion.wheel_multiplier
    }

    /// Scroll delta for a touch pan with vertical velocity `velocity_y`.
    pub fn pan_delta(&self, velocity_y: f32) -> f32 {
        -velocity_y * self.motion.pan_multiplier
    }

    pub fn long_press_speed(&self) -> f32 {
        self.motion.long_press_speed
    }

    /// Take the pending tilt target recorded by the last pointer move.
    pub fn take_perspective(&mut self) -> Option<Vec2> {
        self.perspective.take()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, view: &InputView<'_>) {
        let viewport = view.scene.camera.viewport();
        if !self.touch_enabled {
            self.perspective = Some(Vec2::new(
                x / viewport.width - 0.5,
                y / viewport.height - 0.5,
            ));
        }

        // Browsing picks are frozen while the pointer is held down.
        if view.mode == Mode::Browsing && view.pointer_held {
            return;
        }
        self.hover = self.hit_test(x, y, view);
        self.cursor = match (view.mode, self.hover.is_some()) {
            (_, true) => CursorStyle::Eye,
            (Mode::Browsing, false) => CursorStyle::Pointer,
            (_, false) => CursorStyle::Cross,
        };
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, view: &InputView<'_>) -> PressAction {
        let hit = self.hit_test(x, y, view);
        let action = match (view.mode, hit) {
            (Mode::Browsing, Some(Hit::Item(id))) => {
                self.cursor = CursorStyle::Cross;
                PressAction::OpenItem(id)
            }
            (Mode::Browsing, _) => {
                self.cursor = CursorStyle::Move;
                PressAction::StartAutoScroll
            }
            (_, Some(Hit::Link(url))) => PressAction::OpenUrl(url),
            (_, _) => {
                if matches!(view.mode, Mode::ItemOpen(_)) {
                    self.cursor = CursorStyle::Pointer;
                }
                PressAction::CloseActive
            }
        };
        tracing::trace!(?action, "pointer down");
        action
    }

    pub fn pointer_up(&mut self, mode: Mode) {
        if !matches!(mode, Mode::ItemOpen(_)) {
            self.cursor = CursorStyle::Pointer;
        }
    }

    /// Delayed ramp of the auto-scroll speed while the pointer stays down.
    pub fn auto_scroll_ramp<S: Clone>(&self) -> Tween<Field, S> {
        Tween::to(
            Field::AutoScrollSpeed,
            self.motion.auto_scroll_speed,
            self.motion.auto_scroll_ramp,
        )
        .delay(self.motion.auto_scroll_delay)
        .ease(Ease::EaseOut)
    }

    /// Ray-cast the pointer against the pool that is live in `view.mode`.
    pub fn hit_test(&self, x: f32, y: f32, view: &InputView<'_>) -> Option<Hit> {
        let camera = &view.scene.camera;
        let ray = camera.ray_from_ndc(camera.to_ndc(x, y));
        match view.mode {
            Mode::Browsing => {
                if !view.scene.timeline_visible {
                    return None;
                }
                view.scene
                    .items
                    .iter()
                    .filter_map(|item| {
                        let center = view.scene.item_world(item.id, view.depth)?;
                        ray.intersect_quad(center, item.size).map(|t| (t, item.id))
                    })
                    .min_by(|a, b| a.0.total_cmp(&b.0))
                    .map(|(_, id)| Hit::Item(id))
            }
            Mode::ItemOpen(id) => {
                let (center, url) = self.link_box(view, id)?;
                hit_box(&ray, center, self.layout.link_box, url)
            }
            Mode::ContactOpen => {
                let center = Vec3::new(0.0, self.focus.contact_offset + self.focus.contact_link_y, 1.0);
                hit_box(&ray, center, self.focus.contact_link_box, self.contact_url.clone())
            }
        }
    }

    /// Invisible picking box centred under the open item's link text.
    fn link_box(&self, view: &InputView<'_>, id: ItemId) -> Option<(Vec3, String)> {
        let item = view.scene.item(id)?;
        let link = item.link.as_ref()?;
        let world = view.scene.item_world(id, view.depth)?;
        let center = Vec3::new(
            world.x,
            world.y - item.size.y / 2.0 - self.layout.link_gap,
            world.z + link.depth + 1.0,
        );
        Some((center, link.url.clone()))
    }
}

fn hit_box(ray: &Ray, center: Vec3, size: Vec2, url: String) -> Option<Hit> {
    ray.intersect_quad(center, size).map(|_| Hit::Link(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::test_support::{sample_config, sample_session, settle};
    use crate::types::HostCommand;

    /// Pixel position of a world point on screen.
    fn screen_of(camera: &Camera, world: Vec3) -> (f32, f32) {
        let ndc = camera.view_projection().project_point3(world);
        let viewport = camera.viewport();
        (
            (ndc.x + 1.0) / 2.0 * viewport.width,
            (1.0 - ndc.y) / 2.0 * viewport.height,
        )
    }

    fn dispatcher() -> Dispatcher {
        let config = sample_config();
        Dispatcher::new(
            config.motion,
            config.layout,
            config.focus,
            config.contact_url,
            false,
        )
    }

    #[test]
    fn wheel_normalization_per_browser() {
        // Opera style: detail and wheelDelta both set.
        let opera = WheelInput {
            wheel_delta: Some(120.0),
            detail: Some(3.0),
            ..Default::default()
        };
        assert!((normalize_wheel(&opera) - 1.0).abs() < 1e-6);

        // Firefox style: deltaY only.
        let firefox = WheelInput {
            delta_y: Some(60.0),
            ..Default::default()
        };
        assert_eq!(normalize_wheel(&firefox), -1.0);

        // Chrome and Safari: wheelDelta only.
        let chrome = WheelInput {
            wheel_delta: Some(-240.0),
            ..Default::default()
        };
        assert_eq!(normalize_wheel(&chrome), -2.0);

        assert_eq!(normalize_wheel(&WheelInput::default()), 0.0);
    }

    #[test]
    fn wheel_down_moves_forward() {
        let d = dispatcher();
        let down = WheelInput {
            delta_y: Some(120.0),
            ..Default::default()
        };
        assert_eq!(d.wheel_delta(&down), 40.0);
        assert_eq!(d.pan_delta(-2.0), 12.0);
    }

    #[test]
    fn hover_over_item_shows_eye_cursor() {
        let mut session = sample_session();
        let id = ItemId::new(0);
        // Bring jan's first item into view.
        let depth = 1800.0 + 200.0 - 300.0;
        session.parts_mut().1.set_depth(depth);

        let scene = session.scene();
        let center = scene.item_world(id, depth).unwrap();
        let (x, y) = screen_of(&scene.camera, center);
        let view = InputView {
            scene,
            depth,
            mode: Mode::Browsing,
            pointer_held: false,
        };

        let mut d = dispatcher();
        d.pointer_move(x, y, &view);
        assert_eq!(d.hover(), Some(&Hit::Item(id)));
        assert_eq!(d.cursor(), CursorStyle::Eye);

        d.pointer_move(1.0, 1.0, &view);
        assert_eq!(d.hover(), None);
        assert_eq!(d.cursor(), CursorStyle::Pointer);
        assert!(d.take_perspective().is_some());
        assert!(d.take_perspective().is_none());
    }

    #[test]
    fn held_pointer_freezes_browsing_picks() {
        let session = sample_session();
        let view = InputView {
            scene: session.scene(),
            depth: 0.0,
            mode: Mode::Browsing,
            pointer_held: true,
        };
        let mut d = dispatcher();
        d.set_cursor(CursorStyle::Move);
        d.pointer_move(10.0, 10.0, &view);
        assert_eq!(d.cursor(), CursorStyle::Move);
    }

    #[test]
    fn press_on_empty_space_starts_auto_scroll() {
        let session = sample_session();
        let view = InputView {
            scene: session.scene(),
            depth: 0.0,
            mode: Mode::Browsing,
            pointer_held: false,
        };
        let mut d = dispatcher();
        assert_eq!(d.pointer_down(5.0, 5.0, &view), PressAction::StartAutoScroll);
        assert_eq!(d.cursor(), CursorStyle::Move);
        d.pointer_up(Mode::Browsing);
        assert_eq!(d.cursor(), CursorStyle::Pointer);
    }

    #[test]
    fn overlay_press_off_target_closes() {
        let session = sample_session();
        let view = InputView {
            scene: session.scene(),
            depth: 0.0,
            mode: Mode::ContactOpen,
            pointer_held: false,
        };
        let mut d = dispatcher();
        assert_eq!(d.pointer_down(5.0, 5.0, &view), PressAction::CloseActive);
    }

    #[test]
    fn contact_link_opens_mail_client() {
        let mut session = sample_session();
        session.toggle_contact();
        settle(&mut session);
        let camera = &session.scene().camera;
        let (x, y) = screen_of(camera, Vec3::new(0.0, 2000.0 - 140.0, 1.0));

        assert!(session.pointer_down(x, y));
        assert_eq!(
            session.drain_commands(),
            vec![HostCommand::OpenUrl {
                url: "mailto:hello@craftedbygc.com".to_string()
            }]
        );
        assert_eq!(session.mode(), Mode::ContactOpen);
    }

    #[test]
    fn item_link_is_pickable_once_open() {
        let mut session = sample_session();
        let id = ItemId::new(0);
        session.open_item(id);
        settle(&mut session);
        // Playback changes from the transition are not part of this check.
        session.drain_commands();

        let scene = session.scene();
        let item = scene.item(id).unwrap();
        let world = scene.item_world(id, session.depth()).unwrap();
        let link_center = Vec3::new(world.x, world.y - item.size.y / 2.0 - 60.0, world.z + 1.0);
        let (x, y) = screen_of(&scene.camera, link_center);

        session.pointer_move(x, y);
        assert_eq!(session.snapshot().cursor, CursorStyle::Eye);
        session.pointer_down(x, y);
        session.pointer_up();
        assert_eq!(
            session.drain_commands(),
            vec![HostCommand::OpenUrl {
                url: "https://example.com/snow".to_string()
            }]
        );

        // Anywhere else closes the item.
        session.pointer_down(2.0, 2.0);
        session.pointer_up();
        settle(&mut session);
        assert_eq!(session.mode(), Mode::Browsing);
    }

    #[test]
    fn release_cancels_the_auto_scroll_ramp() {
        let mut session = sample_session();
        session.pointer_down(3.0, 3.0);
        crate::test_support::run_frames(&mut session, 60);
        assert!(session.auto_speed() > 0.0);
        session.pointer_up();
        assert_eq!(session.auto_speed(), 0.0);
        let target = session.scroll_target();
        crate::test_support::run_frames(&mut session, 5);
        assert_eq!(session.scroll_target(), target);
    }

    #[test]
    fn long_press_then_pan_end() {
        let mut session = sample_session();
        session.long_press();
        assert_eq!(session.auto_speed(), 10.0);
        session.pan_end();
        assert_eq!(session.auto_speed(), 0.0);
    }
}
