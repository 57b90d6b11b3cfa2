/// Error type shared by the converter, the store and the settings actions

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("Unable to parse URL `{url}`")]
    UnparseableUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Lookup miss. Not a fault: the user just hasn't configured this domain yet.
    #[error("No mapping found for domain: {domain}")]
    NoMappingConfigured { domain: String },

    #[error("Storage error: {0}")]
    Persistence(String),

    /// Tabs, navigation or the options page refused a request
    #[error("Browser error: {0}")]
    Host(String),

    #[error("Invalid import document: {0}")]
    InvalidImportDocument(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl SwitchError {
    pub fn unparseable(url: &str, source: url::ParseError) -> Self {
        SwitchError::UnparseableUrl {
            url: url.to_string(),
            source,
        }
    }
}

// Pages show the message as status text
impl From<SwitchError> for JsValue {
    fn from(err: SwitchError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}
