// Mutable scene state mirrored to the host every frame: sections, items, shared materials,
// colours and camera. Also the field keys tweens use to address any of it.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::anim::{AnimValue, Animatable};
use crate::camera::Camera;
use crate::motion::MotionController;
use crate::types::{ContentKind, ItemId, Quadrant, Rgb};

/// Role of a section in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionSlot {
    Intro,
    Month,
    End,
}

/// Non-interactive mesh placed by the layout (titles, outlines, badges).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticMesh {
    pub name: String,
    pub depth: f32,
}

/// One navigable slot of the timeline.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: String,
    pub slot: SectionSlot,
    pub items: Vec<ItemId>,
    pub statics: Vec<StaticMesh>,
    /// Position along the depth axis; decreases as sections are appended.
    pub offset: f32,
    /// Most negative depth reached by the section's content.
    pub extent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caption {
    pub text: String,
    pub depth: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkAffordance {
    pub url: String,
    pub depth: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Playback {
    Paused,
    Playing,
}

/// One focusable image or video.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    /// `month/filename`.
    pub key: String,
    pub section: usize,
    pub month: String,
    pub kind: ContentKind,
    pub align: Quadrant,
    pub origin: Vec2,
    pub position: Vec2,
    /// Depth inside the section.
    pub depth: f32,
    pub size: Vec2,
    pub reveal: f32,
    pub opacity: f32,
    pub tint: Rgb,
    pub caption: Option<Caption>,
    pub link: Option<LinkAffordance>,
    pub playback: Playback,
}

impl Item {
    pub fn is_video(&self) -> bool {
        self.kind == ContentKind::Video
    }

    /// Radius of the sphere enclosing the quad.
    pub fn bounding_radius(&self) -> f32 {
        self.size.length() / 2.0
    }
}

/// Colour and fade state of a shared material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub color: Rgb,
    pub opacity: f32,
    pub visible: bool,
}

impl Material {
    pub fn new(color: Rgb, opacity: f32, visible: bool) -> Self {
        Material {
            color,
            opacity,
            visible,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaterialKind {
    Text,
    Caption,
    LinkUnderline,
    Outline,
}

/// Document-level colours outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterfaceSlot {
    Fill,
    CursorStroke,
    UnderlineAccent,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InterfaceColors {
    pub fill: Rgb,
    pub cursor_stroke: Rgb,
    pub underline_accent: Rgb,
}

/// Address of one tweenable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TimelineDepth,
    AutoScrollSpeed,
    CameraY,
    CameraTilt,
    ItemPosition(ItemId),
    ItemReveal(ItemId),
    ItemOpacity(ItemId),
    ItemTint(ItemId),
    CaptionDepth(ItemId),
    LinkDepth(ItemId),
    MaterialOpacity(MaterialKind),
    MaterialColor(MaterialKind),
    Background,
    Fog,
    Interface(InterfaceSlot),
}

/// Everything the renderer needs that is not scroll state.
#[derive(Debug, Clone)]
pub struct Scene {
    pub sections: Vec<Section>,
    pub items: Vec<Item>,
    pub text: Material,
    pub caption: Material,
    pub link_underline: Material,
    pub outline: Material,
    pub background: Rgb,
    pub fog: Rgb,
    pub interface: InterfaceColors,
    pub camera: Camera,
    pub timeline_visible: bool,
    pub contact_visible: bool,
    pub badge_rotation: f32,
}

impl Scene {
    pub fn new(sections: Vec<Section>, items: Vec<Item>, camera: Camera) -> Self {
        let ink = Rgb::from_hex(0x1b42d8);
        let paper = Rgb::from_hex(0xaec7c3);
        Scene {
            sections,
            items,
            text: Material::new(ink, 1.0, true),
            caption: Material::new(ink, 0.0, false),
            link_underline: Material::new(ink, 0.0, false),
            outline: Material::new(ink, 1.0, true),
            background: paper,
            fog: paper,
            interface: InterfaceColors {
                fill: ink,
                cursor_stroke: ink,
                underline_accent: ink,
            },
            camera,
            timeline_visible: true,
            contact_visible: false,
            badge_rotation: 0.0,
        }
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index())
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id.index())
    }

    pub fn section_of(&self, id: ItemId) -> Option<&Section> {
        self.item(id).and_then(|item| self.sections.get(item.section))
    }

    pub fn material(&self, kind: MaterialKind) -> &Material {
        match kind {
            MaterialKind::Text => &self.text,
            MaterialKind::Caption => &self.caption,
            MaterialKind::LinkUnderline => &self.link_underline,
            MaterialKind::Outline => &self.outline,
        }
    }

    pub fn material_mut(&mut self, kind: MaterialKind) -> &mut Material {
        match kind {
            MaterialKind::Text => &mut self.text,
            MaterialKind::Caption => &mut self.caption,
            MaterialKind::LinkUnderline => &mut self.link_underline,
            MaterialKind::Outline => &mut self.outline,
        }
    }

    /// World-space centre of an item with the timeline group at `timeline_depth`.
    pub fn item_world(&self, id: ItemId, timeline_depth: f32) -> Option<Vec3> {
        let item = self.item(id)?;
        let section = self.sections.get(item.section)?;
        Some(Vec3::new(
            item.position.x,
            item.position.y,
            section.offset + item.depth + timeline_depth,
        ))
    }
}

/// Borrowed view of everything a tween may write.
pub struct Stage<'a> {
    pub scene: &'a mut Scene,
    pub motion: &'a mut MotionController,
}

impl Animatable<Field> for Stage<'_> {
    fn read(&self, field: Field) -> Option<AnimValue> {
        let scene = &*self.scene;
        Some(match field {
            Field::TimelineDepth => self.motion.depth().into(),
            Field::AutoScrollSpeed => self.motion.auto_speed().into(),
            Field::CameraY => scene.camera.y.into(),
            Field::CameraTilt => scene.camera.tilt.into(),
            Field::ItemPosition(id) => scene.item(id)?.position.into(),
            Field::ItemReveal(id) => scene.item(id)?.reveal.into(),
            Field::ItemOpacity(id) => scene.item(id)?.opacity.into(),
            Field::ItemTint(id) => scene.item(id)?.tint.into(),
            Field::CaptionDepth(id) => scene.item(id)?.caption.as_ref()?.depth.into(),
            Field::LinkDepth(id) => scene.item(id)?.link.as_ref()?.depth.into(),
            Field::MaterialOpacity(kind) => scene.material(kind).opacity.into(),
            Field::MaterialColor(kind) => scene.material(kind).color.into(),
            Field::Background => scene.background.into(),
            Field::Fog => scene.fog.into(),
            Field::Interface(InterfaceSlot::Fill) => scene.interface.fill.into(),
            Field::Interface(InterfaceSlot::CursorStroke) => scene.interface.cursor_stroke.into(),
            Field::Interface(InterfaceSlot::UnderlineAccent) => {
                scene.interface.underline_accent.into()
            }
        })
    }

    fn write(&mut self, field: Field, value: AnimValue) {
        let scene = &mut *self.scene;
        match field {
            Field::TimelineDepth => {
                if let Some(v) = value.as_scalar() {
                    self.motion.set_depth(v);
                }
            }
            Field::AutoScrollSpeed => {
                if let Some(v) = value.as_scalar() {
                    self.motion.set_auto_speed(v);
                }
            }
            Field::CameraY => set_scalar(&mut scene.camera.y, value),
            Field::CameraTilt => set_vec2(&mut scene.camera.tilt, value),
            Field::ItemPosition(id) => {
                if let Some(item) = scene.item_mut(id) {
                    set_vec2(&mut item.position, value);
                }
            }
            Field::ItemReveal(id) => {
                if let Some(item) = scene.item_mut(id) {
                    set_scalar(&mut item.reveal, value);
                }
            }
            Field::ItemOpacity(id) => {
                if let Some(item) = scene.item_mut(id) {
                    set_scalar(&mut item.opacity, value);
                }
            }
            Field::ItemTint(id) => {
                if let Some(item) = scene.item_mut(id) {
                    set_color(&mut item.tint, value);
                }
            }
            Field::CaptionDepth(id) => {
                if let Some(caption) = scene.item_mut(id).and_then(|i| i.caption.as_mut()) {
                    set_scalar(&mut caption.depth, value);
                }
            }
            Field::LinkDepth(id) => {
                if let Some(link) = scene.item_mut(id).and_then(|i| i.link.as_mut()) {
                    set_scalar(&mut link.depth, value);
                }
            }
            Field::MaterialOpacity(kind) => set_scalar(&mut scene.material_mut(kind).opacity, value),
            Field::MaterialColor(kind) => set_color(&mut scene.material_mut(kind).color, value),
            Field::Background => set_color(&mut scene.background, value),
            Field::Fog => set_color(&mut scene.fog, value),
            Field::Interface(InterfaceSlot::Fill) => set_color(&mut scene.interface.fill, value),
            Field::Interface(InterfaceSlot::CursorStroke) => {
                set_color(&mut scene.interface.cursor_stroke, value)
            }
            Field::Interface(InterfaceSlot::UnderlineAccent) => {
                set_color(&mut scene.interface.underline_accent, value)
            }
        }
    }
}

fn set_scalar(slot: &mut f32, value: AnimValue) {
    if let Some(v) = value.as_scalar() {
        *slot = v;
    }
}

fn set_vec2(slot: &mut Vec2, value: AnimValue) {
    if let Some(v) = value.as_vec2() {
        *slot = v;
    }
}

fn set_color(slot: &mut Rgb, value: AnimValue) {
    if let Some(v) = value.as_color() {
        *slot = v;
    }
}
