// review_core: year-in-review Rust/WASM motion engine.
// All interaction and motion logic lives here; JS owns the scene graph and is plumbing.

mod anim;
mod assets;
mod camera;
mod error;
mod focus;
mod input;
mod layout;
mod motion;
mod scene;
mod session;
mod theme;
mod types;
mod video;

#[cfg(test)]
mod test_support;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub use anim::{AnimHandle, AnimValue, Animatable, Animator, Ease, Tween};
pub use assets::{AssetBundle, AssetCache, AssetManifest, ContentEntry};
pub use camera::{Camera, Frustum, Ray};
pub use error::{EngineError, EngineResult};
pub use focus::{FocusMachine, Mode, Signal};
pub use input::{normalize_wheel, Dispatcher, Hit, PressAction, WheelInput};
pub use layout::{build_layout, Layout, MonthBoundaries};
pub use motion::{MotionController, ScrollState};
pub use scene::{Field, Item, Scene, Section, SectionSlot};
pub use session::{FrameSnapshot, Session};
pub use theme::{Palette, ThemeEngine};
pub use types::*;
pub use video::VideoGate;

thread_local! {
    static ASSET_CACHE: RefCell<AssetCache> = RefCell::new(AssetCache::new());
}

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_config(config_json: &str) -> Result<EngineConfig, JsValue> {
    serde_json::from_str(config_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))
}

/// Main engine interface exposed to JavaScript.
/// One `frame` call per animation frame returns the whole snapshot to keep JS↔WASM crossings low.
#[wasm_bindgen]
pub struct Engine {
    session: Session,
}

#[wasm_bindgen]
impl Engine {
    /// Build from config and an already resolved asset bundle, both JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, bundle_json: &str) -> Result<Engine, JsValue> {
        let config = parse_config(config_json)?;
        let bundle: AssetBundle = serde_json::from_str(bundle_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid asset bundle: {}", e)))?;
        Engine::from_parts(config, &bundle)
    }

    /// Advance to `now_ms` and return the frame snapshot as JSON.
    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.session.frame(now_ms);
        self.snapshot()
    }

    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(to_js)
    }

    /// Pending host commands (open URL, play or pause video) as a JSON array.
    pub fn drain_commands(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.drain_commands()).map_err(to_js)
    }

    /// Raw wheel event fields; pass `undefined` for the ones the browser left out.
    pub fn wheel(
        &mut self,
        delta_y: Option<f32>,
        wheel_delta: Option<f32>,
        detail: Option<f32>,
    ) -> bool {
        self.session.wheel(WheelInput {
            delta_y,
            wheel_delta,
            detail,
        })
    }

    pub fn pan_move(&mut self, velocity_y: f32) -> bool {
        self.session.pan_move(velocity_y)
    }

    pub fn pan_end(&mut self) {
        self.session.pan_end();
    }

    pub fn long_press(&mut self) -> bool {
        self.session.long_press()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.session.pointer_move(x, y);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.session.pointer_down(x, y)
    }

    pub fn pointer_up(&mut self) {
        self.session.pointer_up();
    }

    pub fn toggle_contact(&mut self) -> bool {
        self.session.toggle_contact()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session.resize(width, height);
    }

    /// Cross-fade to `month`'s palette regardless of scroll depth.
    pub fn force_month(&mut self, month: &str) -> bool {
        self.session.force_month(month)
    }

    /// Pause videos and drop animations. Returns the final commands as JSON.
    pub fn teardown(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.teardown()).map_err(to_js)
    }
}

impl Engine {
    fn from_parts(config: EngineConfig, bundle: &AssetBundle) -> Result<Engine, JsValue> {
        let session = Session::new(config, bundle).map_err(to_js)?;
        Ok(Engine { session })
    }

    #[cfg(test)]
    fn session(&self) -> &Session {
        &self.session
    }
}

/// Build an engine, asking `loader` for assets unless the cache already holds them.
/// `loader` receives the manifest JSON and returns (a promise of) the bundle JSON.
#[wasm_bindgen]
pub async fn create_engine(
    config_json: String,
    loader: js_sys::Function,
) -> Result<Engine, JsValue> {
    let config = parse_config(&config_json)?;
    let manifest = AssetManifest::from_config(&config);

    let cached = ASSET_CACHE.with(|cache| cache.borrow().lookup(&manifest).cloned());
    let bundle = match cached {
        Some(bundle) => bundle,
        None => {
            let manifest_json = serde_json::to_string(&manifest).map_err(to_js)?;
            let returned = loader.call1(&JsValue::NULL, &JsValue::from_str(&manifest_json))?;
            let resolved = JsFuture::from(js_sys::Promise::resolve(&returned)).await?;
            let bundle_json = resolved
                .as_string()
                .ok_or_else(|| JsValue::from_str("asset loader must resolve to a JSON string"))?;
            let bundle: AssetBundle = serde_json::from_str(&bundle_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid asset bundle: {}", e)))?;
            tracing::debug!("asset cache miss, bundle loaded");
            bundle
        }
    };

    let engine = Engine::from_parts(config, &bundle)?;
    ASSET_CACHE.with(|cache| cache.borrow_mut().store(bundle));
    Ok(engine)
}

/// Forget the cached bundle so the next `create_engine` reloads.
#[wasm_bindgen]
pub fn clear_asset_cache() {
    ASSET_CACHE.with(|cache| cache.borrow_mut().clear());
}
