/// Storage access for the mapping table and per-pair extension preferences
///
/// Everything goes through a [`KeyValueStore`]. In the extension that is
/// `chrome.storage.sync`; tests use an in-memory store.
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::config::MAPPINGS_KEY;
use crate::error::SwitchError;
use crate::mapping::Mapping;

/// A batch of storage entries, keyed by storage key
pub type Record = serde_json::Map<String, Value>;

/// Minimal async key-value contract, shaped like `chrome.storage.*`
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Fetch the given keys. Missing keys are simply absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<Record, SwitchError>;

    async fn set(&self, items: Record) -> Result<(), SwitchError>;
}

impl<T: KeyValueStore> KeyValueStore for &T {
    async fn get(&self, keys: &[&str]) -> Result<Record, SwitchError> {
        (**self).get(keys).await
    }

    async fn set(&self, items: Record) -> Result<(), SwitchError> {
        (**self).set(items).await
    }
}

/// Storage key for the extension preference of one mapping direction
pub fn extension_key(source_domain: &str, target_domain: &str) -> String {
    format!("{}->{}-extension", source_domain, target_domain)
}

pub struct MappingStore<S> {
    backend: S,
}

impl<S: KeyValueStore> MappingStore<S> {
    pub fn new(backend: S) -> Self {
        MappingStore { backend }
    }

    /// Read the whole mapping table. Read failures give an empty table.
    pub async fn load(&self) -> Mapping {
        self.try_load().await.unwrap_or_else(|e| {
            log::error!("Error loading domain mappings: {}", e);
            Mapping::new()
        })
    }

    /// Read the whole mapping table, failing if the backend cannot be read.
    /// Anything that writes the table back must start from this.
    pub async fn try_load(&self) -> Result<Mapping, SwitchError> {
        let record = self.backend.get(&[MAPPINGS_KEY]).await?;

        let entries = match record.get(MAPPINGS_KEY) {
            Some(Value::Object(entries)) => entries,
            Some(other) => {
                log::warn!("Ignoring malformed domain mappings record: {}", other);
                return Ok(Mapping::new());
            }
            None => return Ok(Mapping::new()),
        };

        let mapping: Mapping = entries
            .iter()
            .filter_map(|(domain, value)| match value.as_str() {
                Some(value) => Some((domain.clone(), value.to_string())),
                None => {
                    log::warn!("Skipping non-string mapping for {}: {}", domain, value);
                    None
                }
            })
            .collect();

        log::debug!("Loaded {} domain mappings", mapping.len());
        Ok(mapping)
    }

    /// Write the whole mapping table back as one record
    pub async fn save(&self, mapping: &Mapping) -> Result<(), SwitchError> {
        let value = serde_json::to_value(mapping)
            .map_err(|e| SwitchError::Persistence(format!("Failed to serialize mappings: {}", e)))?;

        let mut record = Record::new();
        record.insert(MAPPINGS_KEY.to_string(), value);
        self.backend.set(record).await?;

        log::debug!("Saved {} domain mappings", mapping.len());
        Ok(())
    }

    /// Stored extension for `source -> target`, if any.
    /// Failures are logged and treated as "nothing stored".
    pub async fn extension_preference(&self, source_domain: &str, target_domain: &str) -> Option<String> {
        let key = extension_key(source_domain, target_domain);

        match self.backend.get(&[key.as_str()]).await {
            Ok(record) => match record.get(&key) {
                Some(Value::String(ext)) => Some(ext.clone()),
                Some(other) => {
                    log::warn!("Ignoring non-string extension preference {}: {}", key, other);
                    None
                }
                None => None,
            },
            Err(e) => {
                log::error!("Error loading extension preference: {}", e);
                None
            }
        }
    }

    pub async fn set_extension_preference(
        &self,
        source_domain: &str,
        target_domain: &str,
        extension: &str,
    ) -> Result<(), SwitchError> {
        let mut record = Record::new();
        record.insert(
            extension_key(source_domain, target_domain),
            Value::String(extension.to_string()),
        );
        self.backend.set(record).await
    }
}

// chrome.storage.sync bridge
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    async fn sync_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    async fn sync_set(items: JsValue) -> Result<(), JsValue>;
}

/// `chrome.storage.sync`, shared across the user's browsers
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeSyncStorage;

impl KeyValueStore for ChromeSyncStorage {
    async fn get(&self, keys: &[&str]) -> Result<Record, SwitchError> {
        let keys_js = serde_wasm_bindgen::to_value(keys)
            .map_err(|e| SwitchError::Persistence(format!("Failed to serialize keys: {:?}", e)))?;

        let result = sync_get(keys_js)
            .await
            .map_err(|e| SwitchError::Persistence(format!("Failed to get storage: {:?}", e)))?;

        if result.is_null() || result.is_undefined() {
            return Ok(Record::new());
        }

        serde_wasm_bindgen::from_value(result)
            .map_err(|e| SwitchError::Persistence(format!("Failed to parse storage: {:?}", e)))
    }

    async fn set(&self, items: Record) -> Result<(), SwitchError> {
        // Plain JS objects, not Maps, or chrome.storage drops the contents
        let items_js = items
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| SwitchError::Persistence(format!("Failed to serialize storage: {:?}", e)))?;

        sync_set(items_js)
            .await
            .map_err(|e| SwitchError::Persistence(format!("Failed to save storage: {:?}", e)))
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;
