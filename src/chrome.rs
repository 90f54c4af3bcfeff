/// Chrome extension APIs, reached through the JS bridge module
use crate::background::Browser;
use crate::error::{Error, LoadError};
use crate::indicator::Indicator;
use crate::settings::{SETTINGS_KEYS, Settings};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn readLocalFile(url: &str, timeout_ms: u32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setIndicator(tab_id: i32, icon: &str, title: &str) -> Result<(), JsValue>;
}

/// Rejection value produced by bridge.js
#[derive(Debug, Deserialize)]
struct BridgeFailure {
    #[serde(default)]
    kind: String,
    message: String,
}

const TIMEOUT_KIND: &str = "timeout";

fn describe(err: JsValue) -> BridgeFailure {
    serde_wasm_bindgen::from_value(err.clone()).unwrap_or_else(|_| BridgeFailure {
        kind: String::new(),
        message: format!("{:?}", err),
    })
}

pub async fn load_settings() -> Result<Settings, String> {
    let keys = serde_wasm_bindgen::to_value(&SETTINGS_KEYS)
        .map_err(|e| format!("Failed to serialize keys: {:?}", e))?;

    let settings_js = getStorage(keys)
        .await
        .map_err(|e| format!("Failed to get storage: {}", describe(e).message))?;

    if settings_js.is_null() || settings_js.is_undefined() {
        return Ok(Settings::default());
    }
    serde_wasm_bindgen::from_value(settings_js)
        .map_err(|e| format!("Failed to parse settings: {:?}", e))
}

pub async fn read_local_file(url: &str, timeout_ms: u32) -> Result<String, LoadError> {
    let text = readLocalFile(url, timeout_ms).await.map_err(|e| {
        let failure = describe(e);
        if failure.kind == TIMEOUT_KIND {
            LoadError::Timeout(timeout_ms)
        } else {
            LoadError::Read(failure.message)
        }
    })?;

    text.as_string()
        .ok_or_else(|| LoadError::Read("response is not text".to_string()))
}

/// Active tab as returned by chrome.tabs.query
#[derive(Debug, Deserialize)]
struct ActiveTab {
    #[serde(default)]
    url: Option<String>,
}

/// `Browser` backed by the real extension APIs
#[derive(Debug, Default)]
pub struct ChromeBrowser;

impl Browser for ChromeBrowser {
    async fn active_tab_url(&self) -> Result<Option<String>, Error> {
        let tab_js = getActiveTab()
            .await
            .map_err(|e| Error::Bridge(describe(e).message))?;

        if tab_js.is_null() || tab_js.is_undefined() {
            return Ok(None);
        }
        let tab: ActiveTab = serde_wasm_bindgen::from_value(tab_js)
            .map_err(|e| Error::Bridge(format!("Failed to parse tab: {:?}", e)))?;
        Ok(tab.url)
    }

    async fn show_indicator(&self, tab_id: i32, indicator: &Indicator) -> Result<(), Error> {
        setIndicator(tab_id, indicator.icon(), &indicator.title())
            .await
            .map_err(|e| Error::Bridge(describe(e).message))
    }
}
