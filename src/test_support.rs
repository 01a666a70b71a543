// Shared fixture: a short year with intro, three months and the end slot.

use serde_json::json;

use crate::assets::AssetBundle;
use crate::session::Session;
use crate::types::EngineConfig;

pub fn sample_config() -> EngineConfig {
    let value = json!({
        "months": [
            {"id": "intro", "bg_color": "#aec7c3", "text_color": "#1b42d8", "tint_color": "#aec7c3"},
            {"id": "jan", "name": "January", "bg_color": "#f7c8c8", "text_color": "#d81b1b", "tint_color": "#f7c8c8"},
            {"id": "feb", "name": "February", "bg_color": "#c8d7f7", "text_color": "#1b3ad8", "tint_color": "#c8d7f7",
             "outline_color": "#ffffff"},
            {"id": "dec", "name": "December", "bg_color": "#111111", "text_color": "#eeeeee", "tint_color": "#333333"},
            {"id": "end", "bg_color": "#000000", "text_color": "#ffffff", "tint_color": "#000000"}
        ],
        "viewport": {"width": 1600.0, "height": 900.0, "touch_enabled": false},
        "asset_order": {
            "jan": ["snow.jpg", "party.mp4", "cake.png"],
            "feb": ["kite.jpg", "waves.mp4"],
            "dec": ["tree.jpg"]
        },
        "item_meta": {
            "jan": {
                "snow.jpg": {"caption": "First snow", "link": "https://example.com/snow"},
                "party.mp4": {"caption": "New year", "scale": 1.5}
            }
        }
    });
    serde_json::from_value(value).expect("fixture config")
}

pub fn sample_bundle() -> AssetBundle {
    let value = json!({
        "fonts": ["Schnyder L", "SuisseIntl-Bold", "Schnyder_Edit Outline"],
        "content": {
            "intro": [{"filename": "ok.png", "kind": "image", "width": 1000.0, "height": 1000.0}],
            "jan": [
                {"filename": "snow.jpg", "kind": "image", "width": 800.0, "height": 600.0},
                {"filename": "party.mp4", "kind": "video", "width": 1920.0, "height": 1080.0},
                {"filename": "cake.png", "kind": "image", "width": 500.0, "height": 500.0}
            ],
            "feb": [
                {"filename": "kite.jpg", "kind": "image", "width": 600.0, "height": 800.0},
                {"filename": "waves.mp4", "kind": "video", "width": 1280.0, "height": 720.0}
            ],
            "dec": [{"filename": "tree.jpg", "kind": "image", "width": 700.0, "height": 700.0}],
            "end": [{"filename": "glit.mp4", "kind": "video", "width": 700.0, "height": 700.0}]
        }
    });
    serde_json::from_value(value).expect("fixture bundle")
}

pub fn sample_session() -> Session {
    Session::new(sample_config(), &sample_bundle()).expect("fixture session")
}

/// Run frames at 60 Hz until every animation has finished, with a hard cap.
pub fn settle(session: &mut Session) {
    for _ in 0..600 {
        session.step(1.0 / 60.0);
        if session.is_idle() {
            return;
        }
    }
    panic!("session did not settle");
}

/// Run a fixed number of 60 Hz frames.
pub fn run_frames(session: &mut Session, frames: usize) {
    for _ in 0..frames {
        session.step(1.0 / 60.0);
    }
}
