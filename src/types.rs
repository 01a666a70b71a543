// Strong typing over strings. Newtypes for item ids and colours, plus the host-supplied config.
// Every tuning constant lives in a settings struct so the host can override it.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Index of an item across the whole timeline (running total, never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(usize);

impl ItemId {
    pub const fn new(index: usize) -> Self {
        ItemId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Linear RGB colour with components in 0-1. Serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Rgb {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb`, `rrggbb` or `0xrrggbb`.
    pub fn parse(value: &str) -> EngineResult<Self> {
        let digits = value
            .trim()
            .trim_start_matches('#')
            .trim_start_matches("0x");
        if digits.len() != 6 {
            return Err(EngineError::InvalidConfig(format!("bad colour {value:?}")));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::from_hex)
            .map_err(|_| EngineError::InvalidConfig(format!("bad colour {value:?}")))
    }

    pub fn to_hex_string(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    /// CSS `rgba()` form, used for the translucent underline accent.
    pub fn to_css_rgba(&self, alpha: f32) -> String {
        format!(
            "rgba({},{},{},{})",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            alpha
        )
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

fn channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl TryFrom<String> for Rgb {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex_string()
    }
}

/// Alignment quadrant of an item inside its section. Cycles per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    BottomLeft,
    BottomRight,
    TopRight,
    TopLeft,
}

impl Quadrant {
    pub fn from_index(index: usize) -> Self {
        match index % 4 {
            0 => Quadrant::BottomLeft,
            1 => Quadrant::BottomRight,
            2 => Quadrant::TopRight,
            _ => Quadrant::TopLeft,
        }
    }

    /// Unit direction of the quadrant's corner.
    pub fn sign(&self) -> Vec2 {
        match self {
            Quadrant::BottomLeft => Vec2::new(-1.0, 1.0),
            Quadrant::BottomRight => Vec2::new(1.0, 1.0),
            Quadrant::TopRight => Vec2::new(1.0, -1.0),
            Quadrant::TopLeft => Vec2::new(-1.0, -1.0),
        }
    }
}

/// What backs an item's texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Video,
}

/// Cursor hint the host reflects onto its custom cursor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    #[default]
    Pointer,
    Eye,
    Cross,
    Move,
}

/// Side effects the engine asks the host to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostCommand {
    OpenUrl { url: String },
    PlayVideo { item: ItemId },
    PauseVideo { item: ItemId },
}

/// Engine configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ordered slots: `intro`, the months, then `end`. Defines layout order and palettes.
    pub months: Vec<MonthConfig>,
    #[serde(default)]
    pub viewport: Viewport,
    /// Month id to ordered content filenames.
    #[serde(default)]
    pub asset_order: HashMap<String, Vec<String>>,
    /// Month id to filename to presentation metadata.
    #[serde(default)]
    pub item_meta: HashMap<String, HashMap<String, ItemMeta>>,
    #[serde(default = "default_intro_assets")]
    pub intro_assets: Vec<String>,
    #[serde(default = "default_end_assets")]
    pub end_assets: Vec<String>,
    #[serde(default = "default_required_fonts")]
    pub required_fonts: Vec<String>,
    #[serde(default = "default_contact_url")]
    pub contact_url: String,
    #[serde(default)]
    pub motion: MotionSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub focus: FocusSettings,
    #[serde(default)]
    pub theme: ThemeSettings,
    #[serde(default)]
    pub camera: CameraSettings,
}

pub const INTRO_SLOT: &str = "intro";
pub const END_SLOT: &str = "end";

fn default_intro_assets() -> Vec<String> {
    vec!["ok.png".to_string()]
}

fn default_end_assets() -> Vec<String> {
    vec!["glit.mp4".to_string()]
}

fn default_required_fonts() -> Vec<String> {
    ["Schnyder L", "SuisseIntl-Bold", "Schnyder_Edit Outline"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

fn default_contact_url() -> String {
    "mailto:hello@craftedbygc.com".to_string()
}

impl EngineConfig {
    pub fn month(&self, id: &str) -> Option<&MonthConfig> {
        self.months.iter().find(|m| m.id == id)
    }

    /// Metadata for one content entry. Absent entries mean no caption and no link.
    pub fn meta_for(&self, month: &str, filename: &str) -> ItemMeta {
        self.item_meta
            .get(month)
            .and_then(|m| m.get(filename))
            .cloned()
            .unwrap_or_default()
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.months.is_empty() {
            return Err(EngineError::InvalidConfig("no months configured".into()));
        }
        if self.months.last().map(|m| m.id.as_str()) != Some(END_SLOT) {
            return Err(EngineError::InvalidConfig(
                "the last slot must be `end`".into(),
            ));
        }
        if self.motion.damping < 1.0 {
            return Err(EngineError::InvalidConfig(
                "motion.damping must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Palette and display name for one slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub bg_color: Rgb,
    pub text_color: Rgb,
    pub tint_color: Rgb,
    #[serde(default)]
    pub outline_color: Option<Rgb>,
}

/// Per-item presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMeta {
    pub caption: Option<String>,
    pub link: Option<String>,
    /// Width multiplier relative to `LayoutSettings::item_width`.
    pub scale: f32,
}

impl Default for ItemMeta {
    fn default() -> Self {
        ItemMeta {
            caption: None,
            link: None,
            scale: 1.0,
        }
    }
}

/// Drawable surface size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub touch_enabled: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 1280.0,
            height: 720.0,
            touch_enabled: false,
        }
    }
}

/// Scroll smoothing and input scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Divisor of the remaining distance applied each frame.
    pub damping: f32,
    /// Per-frame step below which scrolling counts as settled.
    pub settle_threshold: f32,
    pub wheel_multiplier: f32,
    pub pan_multiplier: f32,
    /// Speed reached by the held-pointer auto-scroll ramp.
    pub auto_scroll_speed: f32,
    pub auto_scroll_delay: f32,
    pub auto_scroll_ramp: f32,
    pub long_press_speed: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        MotionSettings {
            damping: 12.0,
            settle_threshold: 0.1,
            wheel_multiplier: 20.0,
            pan_multiplier: 6.0,
            auto_scroll_speed: 20.0,
            auto_scroll_delay: 0.7,
            auto_scroll_ramp: 0.5,
            long_press_speed: 10.0,
        }
    }
}

/// Spacing of sections and items along the depth axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub section_margin: f32,
    /// Margin after the intro slot.
    pub intro_margin: f32,
    /// Margin after the month directly before the end slot.
    pub pre_end_margin: f32,
    /// Distance ahead of a section at which its month becomes active.
    pub activation_lead: f32,
    pub first_item_depth: f32,
    pub item_depth_step: f32,
    /// Distance of an item's origin from the section centre, per axis.
    pub item_spread: Vec2,
    pub item_width: f32,
    pub link_box: Vec2,
    /// Gap between the bottom of an item and its link box.
    pub link_gap: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            section_margin: 800.0,
            intro_margin: 1300.0,
            pre_end_margin: 1800.0,
            activation_lead: 1100.0,
            first_item_depth: 200.0,
            item_depth_step: 200.0,
            item_spread: Vec2::new(250.0, 180.0),
            item_width: 400.0,
            link_box: Vec2::new(300.0, 50.0),
            link_gap: 60.0,
        }
    }
}

/// Timing of item and contact transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusSettings {
    pub open_duration: f32,
    pub others_duration: f32,
    pub text_fade: f32,
    pub caption_duration: f32,
    pub caption_delay: f32,
    pub link_delay: f32,
    pub close_fade: f32,
    pub underline_opacity: f32,
    /// Depth added so a centred item sits in front of the camera.
    pub centering_offset: f32,
    /// Off-screen corner distance for items pushed aside.
    pub offscreen_corner: f32,
    /// Depth the caption and link groups slide in from.
    pub caption_slide: f32,
    pub contact_offset: f32,
    pub contact_duration: f32,
    pub contact_underline_opacity: f32,
    pub contact_link_box: Vec2,
    pub contact_link_y: f32,
}

impl Default for FocusSettings {
    fn default() -> Self {
        FocusSettings {
            open_duration: 1.5,
            others_duration: 1.3,
            text_fade: 1.0,
            caption_duration: 2.0,
            caption_delay: 0.2,
            link_delay: 0.3,
            close_fade: 1.0,
            underline_opacity: 0.4,
            centering_offset: 300.0,
            offscreen_corner: 700.0,
            caption_slide: 100.0,
            contact_offset: 2000.0,
            contact_duration: 2.0,
            contact_underline_opacity: 0.3,
            contact_link_box: Vec2::new(490.0, 60.0),
            contact_link_y: -140.0,
        }
    }
}

/// Month colour cross-fades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub duration: f32,
    pub accent_alpha: f32,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        ThemeSettings {
            duration: 1.0,
            accent_alpha: 0.3,
        }
    }
}

/// Perspective camera placement and pointer tilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub distance: f32,
    pub near: f32,
    pub far: f32,
    pub tilt_strength: f32,
    pub tilt_duration: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            distance: 800.0,
            near: 1.0,
            far: 2000.0,
            tilt_strength: 0.5,
            tilt_duration: 4.0,
        }
    }
}
