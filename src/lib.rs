/// Were You Here - Chrome extension background script
/// Built with Rust + WASM
///
/// Looks up the active tab's URL in a locally generated browsing-history
/// export and flips the toolbar icon accordingly.

mod background;
mod cache;
mod chrome;
mod error;
mod filter;
mod indicator;
mod message;
mod settings;
mod source;
mod visit;

pub use background::{Background, Browser};
pub use cache::{CacheState, VisitCache};
pub use error::{Error, LoadError};
pub use filter::UrlFilter;
pub use indicator::Indicator;
pub use message::{Request, Response};
pub use settings::Settings;
pub use source::{HistorySource, history_file_url};
pub use visit::{Visit, VisitMap};

use chrome::ChromeBrowser;
use source::ExtensionHistorySource;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Background state owned by background.js, which forwards extension events
/// to it
#[wasm_bindgen]
pub struct WereYouHere {
    inner: Rc<Background<ExtensionHistorySource, ChromeBrowser>>,
}

#[wasm_bindgen]
impl WereYouHere {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WereYouHere {
        WereYouHere {
            inner: Rc::new(Background::new(ExtensionHistorySource, ChromeBrowser)),
        }
    }

    #[wasm_bindgen(js_name = onInstalled)]
    pub fn on_installed(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.on_installed().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = onTabUpdated)]
    pub fn on_tab_updated(&self, tab_id: i32) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner
                .on_tab_updated(tab_id)
                .await
                .map(|_| JsValue::UNDEFINED)
                .map_err(to_js_error)
        })
    }

    /// Returns `undefined` for messages this script doesn't handle, so the
    /// listener can tell the runtime no response is coming.
    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(&self, message: JsValue) -> Option<js_sys::Promise> {
        let message: serde_json::Value = serde_wasm_bindgen::from_value(message).ok()?;
        let request = Request::parse(&message)?;

        let inner = Rc::clone(&self.inner);
        Some(future_to_promise(async move {
            let response = inner.handle(request).await.map_err(to_js_error)?;
            // Goes through JSON text so visit numbers reach JS as JSON.parse reads them
            let json = response
                .to_json()
                .map_err(|e| JsValue::from_str(&format!("Failed to serialize response: {:?}", e)))?;
            js_sys::JSON::parse(&json)
        }))
    }
}

impl Default for WereYouHere {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js_error(err: Error) -> JsValue {
    log::error!("{}", err);
    JsValue::from_str(&err.to_string())
}
