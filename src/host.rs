/// Browser collaborators: the active tab, navigation, and the options page
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::SwitchError;

/// Where a converted URL should open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    ActiveTab,
    NewTab,
}

#[allow(async_fn_in_trait)]
pub trait Host {
    /// URL of the active tab in the current window, if it has one
    async fn active_url(&self) -> Result<Option<String>, SwitchError>;

    async fn navigate(&self, url: &str, placement: Placement) -> Result<(), SwitchError>;

    async fn open_settings(&self) -> Result<(), SwitchError>;

    /// Tear down the popup once its job is done
    fn close_popup(&self);
}

// chrome.tabs / chrome.runtime bridge
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    async fn tabs_query(query_info: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = update)]
    async fn tabs_update(update_properties: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = create)]
    async fn tabs_create(create_properties: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = openOptionsPage)]
    async fn open_options_page() -> Result<(), JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery {
    active: bool,
    current_window: bool,
}

#[derive(Serialize)]
struct TabProperties<'a> {
    url: &'a str,
}

/// The part of a `chrome.tabs.Tab` we care about
#[derive(Debug, Deserialize)]
struct ActiveTab {
    url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

impl Host for ChromeHost {
    async fn active_url(&self) -> Result<Option<String>, SwitchError> {
        let query = serde_wasm_bindgen::to_value(&TabQuery {
            active: true,
            current_window: true,
        })
        .map_err(|e| SwitchError::Host(format!("Failed to serialize tab query: {:?}", e)))?;

        let tabs_js = tabs_query(query)
            .await
            .map_err(|e| SwitchError::Host(format!("Failed to get tabs: {:?}", e)))?;

        let tabs: Vec<ActiveTab> = serde_wasm_bindgen::from_value(tabs_js)
            .map_err(|e| SwitchError::Host(format!("Failed to parse tabs: {:?}", e)))?;

        Ok(tabs
            .into_iter()
            .next()
            .and_then(|tab| tab.url)
            .filter(|url| !url.is_empty()))
    }

    async fn navigate(&self, url: &str, placement: Placement) -> Result<(), SwitchError> {
        let props = serde_wasm_bindgen::to_value(&TabProperties { url })
            .map_err(|e| SwitchError::Host(format!("Failed to serialize tab properties: {:?}", e)))?;

        let result = match placement {
            Placement::ActiveTab => tabs_update(props).await,
            Placement::NewTab => tabs_create(props).await,
        };

        result
            .map(|_| ())
            .map_err(|e| SwitchError::Host(format!("Navigation failed: {:?}", e)))
    }

    async fn open_settings(&self) -> Result<(), SwitchError> {
        open_options_page()
            .await
            .map_err(|e| SwitchError::Host(format!("Failed to open settings: {:?}", e)))
    }

    fn close_popup(&self) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.close() {
                log::warn!("Failed to close popup: {:?}", e);
            }
        }
    }
}
