/// Fixed configuration for EDS Page Switcher

/// chrome.storage.sync key holding the whole domain mapping table
pub const MAPPINGS_KEY: &str = "domainMappings";

/// Marker for the production (live) environment
pub const LIVE_MARKER: &str = ".aem.live";

/// Marker for the staging (page) environment
pub const PAGE_MARKER: &str = ".aem.page";

/// Extensions stripped when moving from an original site to EDS.
/// Order matters: the first match wins.
pub const RECOGNIZED_EXTENSIONS: [&str; 5] = [".html", ".htm", ".php", ".aspx", ".jsp"];

/// Appended when going back to an original site and no preference is stored
pub const DEFAULT_EXTENSION: &str = ".html";

pub const EXPORT_VERSION: &str = "1.0";
pub const EXPORT_FILENAME: &str = "eds-domain-mappings.json";

/// Logger settings: chatty in debug builds, quiet in release
pub fn log_config() -> wasm_logger::Config {
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::Config::new(level)
}
