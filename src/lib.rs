/// EDS Page Switcher - Chrome Extension for jumping between a site and its EDS mirror
/// Built with Rust + WASM

pub mod config;
pub mod converter;
pub mod domain;
pub mod error;
pub mod host;
pub mod mapping;
pub mod popup;
pub mod settings;
pub mod storage;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::SwitchError;
use crate::host::{ChromeHost, Placement};
use crate::storage::{ChromeSyncStorage, MappingStore};

// Set up panic hook and console logging once per page
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(config::log_config());
}

fn chrome_store() -> MappingStore<ChromeSyncStorage> {
    MappingStore::new(ChromeSyncStorage)
}

// Plain objects rather than Maps, so pages can read fields directly
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize: {:?}", e)))
}

// Page classification for the content script

#[wasm_bindgen]
pub fn is_eds_page(url: &str) -> bool {
    domain::is_eds_page(url)
}

#[wasm_bindgen]
pub fn page_info(url: &str) -> Result<JsValue, JsValue> {
    to_js(&domain::PageInfo::detect(url))
}

// Popup

/// Counterpart URL for `url`, or `null` when nothing is configured
#[wasm_bindgen]
pub async fn convert_url(url: String) -> Result<JsValue, JsValue> {
    let store = chrome_store();
    let mapping = store.load().await;

    match converter::convert(&url, &mapping, &store).await {
        Ok(target) => Ok(JsValue::from_str(&target)),
        Err(SwitchError::NoMappingConfigured { .. } | SwitchError::UnparseableUrl { .. }) => Ok(JsValue::NULL),
        Err(e) => Err(e.into()),
    }
}

#[wasm_bindgen]
pub async fn switch_active_tab() -> Result<JsValue, JsValue> {
    let outcome = popup::run(&ChromeHost, &chrome_store(), Placement::ActiveTab).await;
    to_js(&outcome)
}

#[wasm_bindgen]
pub async fn open_in_new_tab() -> Result<JsValue, JsValue> {
    let outcome = popup::run(&ChromeHost, &chrome_store(), Placement::NewTab).await;
    to_js(&outcome)
}

#[wasm_bindgen]
pub async fn open_settings() -> Result<(), JsValue> {
    popup::open_settings(&ChromeHost).await.map_err(Into::into)
}

// Settings page

/// Returns the status text to show
#[wasm_bindgen]
pub async fn auto_configure_mapping(original_url: String, eds_url: String) -> Result<String, JsValue> {
    let report = settings::auto_configure(&chrome_store(), &original_url, &eds_url).await?;
    Ok(report.summary())
}

#[wasm_bindgen]
pub async fn add_manual_mapping(original: String, eds: String) -> Result<JsValue, JsValue> {
    let pair = settings::add_manual(&chrome_store(), &original, &eds).await?;
    to_js(&pair)
}

/// Returns how many storage entries were removed
#[wasm_bindgen]
pub async fn delete_mapping(original: String) -> Result<u32, JsValue> {
    let removed = settings::delete_pair(&chrome_store(), &original).await?;
    Ok(removed.len() as u32)
}

#[wasm_bindgen]
pub async fn clear_all_mappings() -> Result<(), JsValue> {
    settings::clear_all(&chrome_store()).await.map_err(Into::into)
}

#[wasm_bindgen]
pub async fn list_mappings() -> Result<JsValue, JsValue> {
    to_js(&settings::list(&chrome_store()).await)
}

/// Export document as JSON text; the page takes care of the download
#[wasm_bindgen]
pub async fn export_mappings() -> Result<String, JsValue> {
    let timestamp = String::from(js_sys::Date::new_0().to_iso_string());
    Ok(settings::export(&chrome_store(), &timestamp).await?)
}

#[wasm_bindgen]
pub fn export_filename() -> String {
    config::EXPORT_FILENAME.to_string()
}

/// Returns how many entries the document held, before keys are lowercased
#[wasm_bindgen]
pub async fn import_mappings(text: String) -> Result<u32, JsValue> {
    let count = settings::import(&chrome_store(), &text).await?;
    Ok(count as u32)
}
