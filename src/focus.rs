// Browsing / item-open / contact-open transitions.
// A request that arrives while its mirror transition is still running is ignored.

use glam::Vec2;
use serde::Serialize;

use crate::anim::{Animator, Tween};
use crate::motion::MotionController;
use crate::scene::{Field, MaterialKind, Scene};
use crate::types::{FocusSettings, ItemId};

/// Which interaction mode the timeline is in. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", content = "item", rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Browsing,
    ItemOpen(ItemId),
    ContactOpen,
}

/// Tween start/complete notifications routed back into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    ItemSettled,
    TextHidden,
    TextShown,
    CaptionMaterialShown,
    UnderlineShown,
    CaptionShown(ItemId),
    LinkShown(ItemId),
    AffordancesHidden(ItemId),
    ItemClosed,
    ContactArrived,
    ContactLeft,
}

/// Mutable state a transition touches.
pub struct FocusContext<'a> {
    pub scene: &'a mut Scene,
    pub motion: &'a mut MotionController,
    pub animator: &'a mut Animator<Field, Signal>,
}

#[derive(Debug, Clone)]
pub struct FocusMachine {
    settings: FocusSettings,
    mode: Mode,
    /// Set while an item open or close is in flight.
    animating: bool,
    /// Set while the camera travels to or from the contact section.
    contact_animating: bool,
    /// Set while the camera returns from the contact section; the mode stays `ContactOpen`.
    contact_leaving: bool,
    origin_depth: f32,
}

impl FocusMachine {
    pub fn new(settings: FocusSettings) -> Self {
        FocusMachine {
            settings,
            mode: Mode::Browsing,
            animating: false,
            contact_animating: false,
            contact_leaving: false,
            origin_depth: 0.0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn settings(&self) -> &FocusSettings {
        &self.settings
    }

    pub fn open_item(&self) -> Option<ItemId> {
        match self.mode {
            Mode::ItemOpen(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_contact_animating(&self) -> bool {
        self.contact_animating
    }

    pub fn is_contact_leaving(&self) -> bool {
        self.contact_leaving
    }

    /// Depth recorded when the current item was opened.
    pub fn origin_depth(&self) -> f32 {
        self.origin_depth
    }

    /// Bring `id` to the centre of the screen.
    pub fn open(&mut self, id: ItemId, cx: &mut FocusContext<'_>) -> bool {
        if self.mode != Mode::Browsing || self.animating || self.contact_animating {
            tracing::debug!(?id, mode = ?self.mode, "open ignored");
            return false;
        }
        let (section_offset, item_depth, has_caption, has_link) = match cx.scene.item(id) {
            Some(item) => match cx.scene.sections.get(item.section) {
                Some(section) => (
                    section.offset,
                    item.depth,
                    item.caption.is_some(),
                    item.link.is_some(),
                ),
                None => return false,
            },
            None => return false,
        };

        self.animating = true;
        self.mode = Mode::ItemOpen(id);
        self.origin_depth = cx.motion.depth();
        cx.motion.lock();

        let s = &self.settings;
        let centering = -(section_offset + item_depth) + s.centering_offset;
        let animator = &mut *cx.animator;

        animator.start(
            Tween::to(Field::ItemPosition(id), Vec2::ZERO, s.open_duration)
                .on_complete(Signal::ItemSettled),
        );
        animator.start(Tween::to(Field::ItemReveal(id), 1.0_f32, s.open_duration));
        animator.start(Tween::to(Field::TimelineDepth, centering, s.open_duration));
        animator.start(
            Tween::to(Field::MaterialOpacity(MaterialKind::Text), 0.0_f32, s.text_fade)
                .on_complete(Signal::TextHidden),
        );
        animator.start(
            Tween::to(Field::MaterialOpacity(MaterialKind::Caption), 1.0_f32, s.caption_duration)
                .delay(s.link_delay)
                .on_start(Signal::CaptionMaterialShown),
        );
        animator.start(
            Tween::to(
                Field::MaterialOpacity(MaterialKind::LinkUnderline),
                s.underline_opacity,
                s.caption_duration,
            )
            .delay(s.link_delay)
            .on_start(Signal::UnderlineShown),
        );
        if has_caption {
            animator.start(
                Tween::to(Field::CaptionDepth(id), 0.0_f32, s.caption_duration)
                    .starting_at(-s.caption_slide)
                    .delay(s.caption_delay)
                    .on_start(Signal::CaptionShown(id)),
            );
        }
        if has_link {
            animator.start(
                Tween::to(Field::LinkDepth(id), 0.0_f32, s.caption_duration)
                    .starting_at(-s.caption_slide)
                    .delay(s.link_delay)
                    .on_start(Signal::LinkShown(id)),
            );
        }

        for other in cx.scene.items.iter().filter(|item| item.id != id) {
            let corner = other.align.sign() * s.offscreen_corner;
            animator.start(Tween::to(Field::ItemOpacity(other.id), 0.0_f32, s.others_duration));
            animator.start(Tween::to(Field::ItemPosition(other.id), corner, s.others_duration));
        }

        tracing::debug!(?id, centering, origin = self.origin_depth, "item opening");
        true
    }

    /// Return the open item and everything else to where it was.
    pub fn close(&mut self, cx: &mut FocusContext<'_>) -> bool {
        let id = match self.mode {
            Mode::ItemOpen(id) if !self.animating => id,
            _ => {
                tracing::debug!(mode = ?self.mode, animating = self.animating, "close ignored");
                return false;
            }
        };
        self.animating = true;

        let s = &self.settings;
        let animator = &mut *cx.animator;

        for item in &cx.scene.items {
            animator.start(Tween::to(Field::ItemPosition(item.id), item.origin, s.open_duration));
            if item.id != id {
                animator.start(Tween::to(Field::ItemOpacity(item.id), 1.0_f32, s.open_duration));
            }
        }
        animator.start(Tween::to(Field::ItemReveal(id), 0.0_f32, s.open_duration));
        animator.start(
            Tween::to(Field::TimelineDepth, self.origin_depth, s.open_duration)
                .on_complete(Signal::ItemClosed),
        );
        animator.start(
            Tween::to(Field::MaterialOpacity(MaterialKind::Text), 1.0_f32, s.open_duration)
                .on_start(Signal::TextShown),
        );
        animator.start(Tween::to(
            Field::MaterialOpacity(MaterialKind::Caption),
            0.0_f32,
            s.close_fade,
        ));
        animator.start(
            Tween::to(Field::MaterialOpacity(MaterialKind::LinkUnderline), 0.0_f32, s.close_fade)
                .on_complete(Signal::AffordancesHidden(id)),
        );

        tracing::debug!(?id, "item closing");
        true
    }

    /// Open the contact overlay, or close it when it is open.
    pub fn toggle_contact(&mut self, cx: &mut FocusContext<'_>) -> bool {
        match self.mode {
            Mode::ContactOpen if !self.contact_leaving => {
                self.contact_leaving = true;
                self.contact_animating = true;
                cx.scene.timeline_visible = true;
                cx.animator.start(
                    Tween::to(Field::CameraY, 0.0_f32, self.settings.contact_duration)
                        .on_complete(Signal::ContactLeft),
                );
                tracing::debug!("contact closing");
                true
            }
            Mode::ContactOpen => {
                // Turned around mid-return.
                self.contact_leaving = false;
                self.show_contact(cx);
                tracing::debug!("contact reopening");
                true
            }
            Mode::Browsing if !self.animating => {
                self.mode = Mode::ContactOpen;
                cx.motion.lock();
                self.show_contact(cx);
                tracing::debug!("contact opening");
                true
            }
            _ => {
                tracing::debug!(mode = ?self.mode, "contact toggle ignored");
                false
            }
        }
    }

    fn show_contact(&mut self, cx: &mut FocusContext<'_>) {
        self.contact_animating = true;
        cx.scene.contact_visible = true;
        let underline = cx.scene.material_mut(MaterialKind::LinkUnderline);
        underline.visible = true;
        underline.opacity = self.settings.contact_underline_opacity;
        cx.animator.start(
            Tween::to(
                Field::CameraY,
                self.settings.contact_offset,
                self.settings.contact_duration,
            )
            .on_complete(Signal::ContactArrived),
        );
    }

    /// Leave whichever overlay mode is active.
    pub fn close_active(&mut self, cx: &mut FocusContext<'_>) -> bool {
        match self.mode {
            Mode::ItemOpen(_) => self.close(cx),
            Mode::ContactOpen if !self.contact_leaving => self.toggle_contact(cx),
            _ => false,
        }
    }

    pub fn on_signal(&mut self, signal: Signal, cx: &mut FocusContext<'_>) {
        let scene = &mut *cx.scene;
        match signal {
            Signal::ItemSettled => self.animating = false,
            Signal::TextHidden => scene.text.visible = false,
            Signal::TextShown => scene.text.visible = true,
            Signal::CaptionMaterialShown => scene.caption.visible = true,
            Signal::UnderlineShown => scene.link_underline.visible = true,
            Signal::CaptionShown(id) => {
                if let Some(caption) = scene.item_mut(id).and_then(|i| i.caption.as_mut()) {
                    caption.visible = true;
                }
            }
            Signal::LinkShown(id) => {
                if let Some(link) = scene.item_mut(id).and_then(|i| i.link.as_mut()) {
                    link.visible = true;
                }
            }
            Signal::AffordancesHidden(id) => {
                scene.caption.visible = false;
                scene.link_underline.visible = false;
                if let Some(item) = scene.item_mut(id) {
                    if let Some(caption) = item.caption.as_mut() {
                        caption.visible = false;
                    }
                    if let Some(link) = item.link.as_mut() {
                        link.visible = false;
                    }
                }
            }
            Signal::ItemClosed => {
                cx.motion.unlock();
                self.mode = Mode::Browsing;
                self.animating = false;
                tracing::debug!("item closed");
            }
            Signal::ContactArrived => {
                scene.timeline_visible = false;
                self.contact_animating = false;
            }
            Signal::ContactLeft => {
                self.mode = Mode::Browsing;
                self.contact_leaving = false;
                scene.contact_visible = false;
                scene.link_underline.visible = false;
                scene.link_underline.opacity = 0.0;
                cx.motion.unlock();
                self.contact_animating = false;
                tracing::debug!("contact closed");
            }
        }
    }
}
