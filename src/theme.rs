// Month colour theming. The active month is the last one whose boundary the timeline has passed;
// a change cross-fades fog, background, materials, item tints and interface colours.

use std::fmt::Debug;

use crate::anim::{Animator, Ease, Tween};
use crate::layout::MonthBoundaries;
use crate::scene::{Field, InterfaceSlot, MaterialKind, Scene};
use crate::types::{MonthConfig, Rgb, ThemeSettings};

/// Colours a month fades toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgb,
    pub text: Rgb,
    pub tint: Rgb,
    pub outline: Option<Rgb>,
}

impl Palette {
    fn from_month(month: &MonthConfig) -> Self {
        Palette {
            background: month.bg_color,
            text: month.text_color,
            tint: month.tint_color,
            outline: month.outline_color,
        }
    }

    /// Colour used for interface glyphs: the outline colour when present, else text.
    pub fn interface(&self) -> Rgb {
        self.outline.unwrap_or(self.text)
    }
}

/// Tracks the active month and launches palette cross-fades.
#[derive(Debug, Clone)]
pub struct ThemeEngine {
    settings: ThemeSettings,
    boundaries: MonthBoundaries,
    palettes: Vec<(String, Palette)>,
    active: String,
}

impl ThemeEngine {
    pub fn new(settings: ThemeSettings, boundaries: MonthBoundaries, months: &[MonthConfig]) -> Self {
        let palettes: Vec<(String, Palette)> = months
            .iter()
            .map(|m| (m.id.clone(), Palette::from_month(m)))
            .collect();
        let active = palettes
            .first()
            .map(|(id, _)| id.clone())
            .unwrap_or_default();
        ThemeEngine {
            settings,
            boundaries,
            palettes,
            active,
        }
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn settings(&self) -> &ThemeSettings {
        &self.settings
    }

    pub fn palette(&self, month: &str) -> Option<&Palette> {
        self.palettes
            .iter()
            .find(|(id, _)| id == month)
            .map(|(_, p)| p)
    }

    /// Months whose boundary `depth` has passed, in layout order.
    pub fn passed(&self, depth: f32) -> Vec<&str> {
        self.boundaries
            .iter()
            .filter(|(_, threshold)| depth > -threshold)
            .map(|(id, _)| id)
            .collect()
    }

    /// Recompute the active month. Returns the new month only when it changed.
    pub fn evaluate(&mut self, depth: f32) -> Option<String> {
        let latest = self.passed(depth).last().map(|id| id.to_string())?;
        if latest == self.active {
            return None;
        }
        tracing::debug!(from = %self.active, to = %latest, depth, "month changed");
        self.active = latest.clone();
        Some(latest)
    }

    /// Make `month` active regardless of depth. Unknown months are ignored.
    pub fn force(&mut self, month: &str) -> bool {
        if self.palette(month).is_none() {
            return false;
        }
        self.active = month.to_string();
        true
    }

    /// Start cross-fades toward `month`'s palette. Earlier fades on the same fields are replaced.
    pub fn apply<S: Clone + Debug>(&self, month: &str, scene: &Scene, animator: &mut Animator<Field, S>) {
        let Some(palette) = self.palette(month).copied() else {
            return;
        };
        let duration = self.settings.duration;
        let fade = |field: Field, to: Rgb| Tween::to(field, to, duration).ease(Ease::Power4Out);

        animator.start(fade(Field::Fog, palette.background));
        animator.start(fade(Field::Background, palette.background));
        for kind in [MaterialKind::Text, MaterialKind::Caption, MaterialKind::LinkUnderline] {
            animator.start(fade(Field::MaterialColor(kind), palette.text));
        }
        for item in &scene.items {
            animator.start(fade(Field::ItemTint(item.id), palette.tint));
        }
        if let Some(outline) = palette.outline {
            animator.start(fade(Field::MaterialColor(MaterialKind::Outline), outline));
        }
        let interface = palette.interface();
        for slot in [
            InterfaceSlot::Fill,
            InterfaceSlot::CursorStroke,
            InterfaceSlot::UnderlineAccent,
        ] {
            animator.start(fade(Field::Interface(slot), interface));
        }
    }

    /// Set `month`'s palette without fading, used when a session starts.
    pub fn apply_now(&self, month: &str, scene: &mut Scene) {
        let Some(palette) = self.palette(month).copied() else {
            return;
        };
        scene.fog = palette.background;
        scene.background = palette.background;
        scene.text.color = palette.text;
        scene.caption.color = palette.text;
        scene.link_underline.color = palette.text;
        for item in scene.items.iter_mut() {
            item.tint = palette.tint;
        }
        if let Some(outline) = palette.outline {
            scene.outline.color = outline;
        }
        let interface = palette.interface();
        scene.interface.fill = interface;
        scene.interface.cursor_stroke = interface;
        scene.interface.underline_accent = interface;
    }
}
