// Builds the depth-ordered arrangement of sections and items from month config and resolved assets.
// Offsets are cumulative: each section starts past the previous one's extent plus a margin.

use glam::Vec2;
use serde::Serialize;

use crate::assets::{AssetBundle, AssetManifest};
use crate::error::{EngineError, EngineResult};
use crate::scene::{Caption, Item, LinkAffordance, Playback, Section, SectionSlot, StaticMesh};
use crate::types::{EngineConfig, ItemId, Quadrant, END_SLOT, INTRO_SLOT};

const INTRO_STATICS: &[(&str, f32)] = &[
    ("title", 0.0),
    ("badge", 50.0),
    ("hand", -250.0),
    ("year-outline", -500.0),
];

const MONTH_STATICS: &[(&str, f32)] = &[("title", 0.0)];

const END_STATICS: &[(&str, f32)] = &[
    ("title", 0.0),
    ("glitch-video", -200.0),
    ("end-outline", -300.0),
];

/// Ordered month id to activation threshold. A month is passed once `depth > -threshold`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthBoundaries {
    entries: Vec<(String, f32)>,
}

impl MonthBoundaries {
    pub fn new(entries: Vec<(String, f32)>) -> Self {
        MonthBoundaries { entries }
    }

    pub fn push(&mut self, month: impl Into<String>, threshold: f32) {
        self.entries.push((month.into(), threshold));
    }

    pub fn threshold(&self, month: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(id, _)| id == month)
            .map(|(_, t)| *t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(id, t)| (id.as_str(), *t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of the layout pass.
#[derive(Debug, Clone)]
pub struct Layout {
    pub sections: Vec<Section>,
    pub items: Vec<Item>,
    pub boundaries: MonthBoundaries,
    /// Offset of the end section; the scroll bound is its negation.
    pub end_offset: f32,
}

pub fn build_layout(config: &EngineConfig, bundle: &AssetBundle) -> EngineResult<Layout> {
    config.validate()?;
    let manifest = AssetManifest::from_config(config);
    manifest.resolve(bundle)?;

    let settings = &config.layout;
    let slot_count = config.months.len();
    let mut sections = Vec::with_capacity(slot_count);
    let mut items = Vec::new();
    let mut boundaries = MonthBoundaries::default();
    let mut next_offset = 0.0_f32;

    for (index, month) in config.months.iter().enumerate() {
        let slot = match month.id.as_str() {
            INTRO_SLOT => SectionSlot::Intro,
            END_SLOT => SectionSlot::End,
            _ => SectionSlot::Month,
        };
        let statics = match slot {
            SectionSlot::Intro => INTRO_STATICS,
            SectionSlot::Month => MONTH_STATICS,
            SectionSlot::End => END_STATICS,
        };

        let mut section = Section {
            id: month.id.clone(),
            slot,
            items: Vec::new(),
            statics: statics
                .iter()
                .map(|(name, depth)| StaticMesh {
                    name: name.to_string(),
                    depth: *depth,
                })
                .collect(),
            offset: next_offset,
            extent: 0.0,
        };

        if slot == SectionSlot::Month {
            for (local, filename) in manifest.files_for(&month.id).iter().enumerate() {
                let entry = bundle
                    .entry(&month.id, filename)
                    .ok_or_else(|| EngineError::missing_asset(month.id.as_str(), filename.as_str()))?;
                let meta = config.meta_for(&month.id, filename);
                let id = ItemId::new(items.len());
                let align = Quadrant::from_index(local);
                let origin = align.sign() * settings.item_spread;
                let scale = if meta.scale > 0.0 { meta.scale } else { 1.0 };
                let width = settings.item_width * scale;

                items.push(Item {
                    id,
                    key: format!("{}/{}", month.id, filename),
                    section: index,
                    month: month.id.clone(),
                    kind: entry.kind,
                    align,
                    origin,
                    position: origin,
                    depth: -(settings.first_item_depth + local as f32 * settings.item_depth_step),
                    size: Vec2::new(width, width * entry.aspect()),
                    reveal: 0.0,
                    opacity: 1.0,
                    tint: month.tint_color,
                    caption: meta.caption.map(|text| Caption {
                        text,
                        depth: 0.0,
                        visible: false,
                    }),
                    link: meta.link.map(|url| LinkAffordance {
                        url,
                        depth: 0.0,
                        visible: false,
                    }),
                    playback: Playback::Paused,
                });
                section.items.push(id);
            }
        }

        let deepest_item = section
            .items
            .iter()
            .map(|id| items[id.index()].depth)
            .fold(0.0_f32, f32::min);
        section.extent = section
            .statics
            .iter()
            .map(|s| s.depth)
            .fold(deepest_item, f32::min);

        boundaries.push(month.id.as_str(), next_offset + settings.activation_lead);

        let before_end = index + 2 == slot_count;
        let margin = match slot {
            SectionSlot::Intro => settings.intro_margin,
            SectionSlot::Month if before_end => settings.pre_end_margin,
            _ => settings.section_margin,
        };
        next_offset += section.extent - margin;
        sections.push(section);
    }

    let end_offset = sections.last().map(|s| s.offset).unwrap_or(0.0);

    tracing::info!(
        sections = sections.len(),
        items = items.len(),
        end_offset,
        "timeline laid out"
    );

    Ok(Layout {
        sections,
        items,
        boundaries,
        end_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_bundle, sample_config};
    use crate::types::ContentKind;

    fn layout() -> Layout {
        build_layout(&sample_config(), &sample_bundle()).unwrap()
    }

    #[test]
    fn sections_follow_month_order() {
        let layout = layout();
        let ids: Vec<&str> = layout.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "jan", "feb", "dec", "end"]);
        assert_eq!(layout.sections[0].slot, SectionSlot::Intro);
        assert_eq!(layout.sections[4].slot, SectionSlot::End);
    }

    #[test]
    fn offsets_are_cumulative_with_special_margins() {
        let layout = layout();
        let offsets: Vec<f32> = layout.sections.iter().map(|s| s.offset).collect();
        // intro extent -500, margin 1300.
        // jan: three items down to -600, margin 800.
        // feb: two items down to -400, margin 800.
        // dec: one item at -200, directly before end so margin 1800.
        assert_eq!(offsets, vec![0.0, -1800.0, -3200.0, -4400.0, -6400.0]);
        assert_eq!(layout.end_offset, -6400.0);
        assert!(offsets.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn boundaries_lead_their_sections() {
        let layout = layout();
        assert_eq!(layout.boundaries.len(), 5);
        assert_eq!(layout.boundaries.threshold("intro"), Some(1100.0));
        assert_eq!(layout.boundaries.threshold("jan"), Some(-700.0));
        assert_eq!(layout.boundaries.threshold("end"), Some(-5300.0));
    }

    #[test]
    fn items_get_cycling_quadrants_and_running_ids() {
        let layout = layout();
        assert_eq!(layout.items.len(), 6);
        let jan = &layout.sections[1];
        let aligns: Vec<Quadrant> = jan.items.iter().map(|id| layout.items[id.index()].align).collect();
        assert_eq!(
            aligns,
            vec![Quadrant::BottomLeft, Quadrant::BottomRight, Quadrant::TopRight]
        );
        // feb restarts the quadrant cycle but continues the running index.
        let feb = &layout.sections[2];
        assert_eq!(feb.items[0], ItemId::new(3));
        assert_eq!(layout.items[3].align, Quadrant::BottomLeft);
        assert_eq!(layout.items[3].key, "feb/kite.jpg");
    }

    #[test]
    fn item_geometry_uses_metadata() {
        let layout = layout();
        let snow = &layout.items[0];
        assert_eq!(snow.origin, Vec2::new(-250.0, 180.0));
        assert_eq!(snow.position, snow.origin);
        assert_eq!(snow.size, Vec2::new(400.0, 300.0));
        assert_eq!(snow.caption.as_ref().unwrap().text, "First snow");
        assert_eq!(snow.link.as_ref().unwrap().url, "https://example.com/snow");

        let party = &layout.items[1];
        assert_eq!(party.kind, ContentKind::Video);
        assert_eq!(party.size.x, 600.0);
        assert!(party.link.is_none());

        let cake = &layout.items[2];
        assert!(cake.caption.is_none());
        assert!(cake.link.is_none());
        assert_eq!(cake.depth, -600.0);
    }

    #[test]
    fn missing_asset_is_fatal() {
        let mut bundle = sample_bundle();
        bundle.content.remove("intro");
        let err = build_layout(&sample_config(), &bundle).unwrap_err();
        assert_eq!(err, EngineError::missing_asset("intro", "ok.png"));
    }
}
