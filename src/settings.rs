/// Settings page actions: configure, list, delete, export and import mappings
///
/// Each action loads a fresh snapshot, changes it, and writes the whole
/// table back. Concurrent settings pages race with last-write-wins.
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::EXPORT_VERSION;
use crate::domain::{Family, clean_domain, complementary_domain, detect_file_extension, is_valid_domain};
use crate::error::SwitchError;
use crate::mapping::{Mapping, MappingPair};
use crate::storage::{KeyValueStore, MappingStore};

/// Result of configuring a site from two sample URLs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigureReport {
    pub original: String,
    pub targets: Vec<String>,
    pub extension: Option<String>,
}

impl ConfigureReport {
    /// Status text for the settings page
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Successfully configured mapping: {}", self.original)];
        if self.targets.len() > 1 {
            lines.push("Auto-added both .page and .live domains".to_string());
        }
        lines.push(format!("EDS targets: {}", self.targets.join(", ")));
        if let Some(ext) = &self.extension {
            lines.push(format!("Auto-detected file extension: {}", ext));
        }
        lines.join("\n")
    }
}

/// Shape of an exported mapping file
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument<'a> {
    pub version: &'a str,
    pub timestamp: String,
    pub mappings: &'a Mapping,
}

/// Configure a site from one sample URL on each side.
///
/// Maps the original domain to the EDS domain plus its other environment
/// (`.page` <-> `.live`), maps each of those back, and remembers the
/// original's file extension for the way back.
pub async fn auto_configure<S: KeyValueStore>(
    store: &MappingStore<S>,
    original_url: &str,
    eds_url: &str,
) -> Result<ConfigureReport, SwitchError> {
    let original_url = original_url.trim();
    let eds_url = eds_url.trim();
    if original_url.is_empty() || eds_url.is_empty() {
        return Err(SwitchError::InvalidInput("Please enter both sample URLs".to_string()));
    }

    let original = Url::parse(original_url).map_err(|e| SwitchError::unparseable(original_url, e))?;
    let eds = Url::parse(eds_url).map_err(|e| SwitchError::unparseable(eds_url, e))?;

    let original_domain = original.host_str().unwrap_or_default().to_lowercase();
    let eds_domain = eds.host_str().unwrap_or_default().to_lowercase();
    if !is_valid_domain(&original_domain) || !is_valid_domain(&eds_domain) {
        return Err(SwitchError::InvalidInput("Invalid URLs provided".to_string()));
    }
    if Family::of(&original_domain) == Family::Published {
        return Err(SwitchError::InvalidInput(
            "The original URL must not be an EDS page".to_string(),
        ));
    }

    let extension = detect_file_extension(original.path());

    let mut targets = vec![eds_domain.clone()];
    if let Some(other) = complementary_domain(&eds_domain) {
        targets.push(other);
    }

    let mut mapping = store.try_load().await?;
    mapping.link(&original_domain, &targets);
    store.save(&mapping).await?;

    if let Some(ext) = &extension {
        for target in &targets {
            // Not fatal: conversion falls back to the default extension
            if let Err(e) = store.set_extension_preference(target, &original_domain, ext).await {
                log::error!("Error saving extension preference: {}", e);
            }
        }
    }

    log::info!("Configured {} -> {}", original_domain, targets.join(","));
    Ok(ConfigureReport {
        original: original_domain,
        targets,
        extension,
    })
}

/// Add one mapping from raw domain strings, keeping any existing targets
pub async fn add_manual<S: KeyValueStore>(
    store: &MappingStore<S>,
    original: &str,
    eds: &str,
) -> Result<MappingPair, SwitchError> {
    let original = clean_domain(original);
    let eds = clean_domain(eds);
    if !is_valid_domain(&original) || !is_valid_domain(&eds) {
        return Err(SwitchError::InvalidInput("Please enter valid domains".to_string()));
    }
    if Family::of(&original) == Family::Published {
        return Err(SwitchError::InvalidInput(
            "The original domain must not be an .aem.live or .aem.page domain".to_string(),
        ));
    }
    if original == eds {
        return Err(SwitchError::InvalidInput(
            "The original and EDS domains must differ".to_string(),
        ));
    }

    let mut mapping = store.try_load().await?;
    mapping.add_target(&original, &eds);
    store.save(&mapping).await?;

    Ok(MappingPair {
        targets: mapping
            .candidates(&original)
            .into_iter()
            .map(str::to_string)
            .collect(),
        original,
    })
}

/// Remove a configured site in both directions. Returns the removed keys.
///
/// Extension preferences for the pair stay in storage, unreferenced.
pub async fn delete_pair<S: KeyValueStore>(
    store: &MappingStore<S>,
    original: &str,
) -> Result<Vec<String>, SwitchError> {
    let mut mapping = store.try_load().await?;
    let removed = mapping.remove_pair(original);
    if removed.is_empty() {
        return Ok(removed);
    }
    store.save(&mapping).await?;
    Ok(removed)
}

pub async fn clear_all<S: KeyValueStore>(store: &MappingStore<S>) -> Result<(), SwitchError> {
    store.save(&Mapping::new()).await
}

pub async fn list<S: KeyValueStore>(store: &MappingStore<S>) -> Vec<MappingPair> {
    store.load().await.pairs()
}

/// Serialize the table as an export document (two-space indented JSON)
pub fn export_document(mapping: &Mapping, timestamp: &str) -> Result<String, SwitchError> {
    let document = ExportDocument {
        version: EXPORT_VERSION,
        timestamp: timestamp.to_string(),
        mappings: mapping,
    };
    serde_json::to_string_pretty(&document)
        .map_err(|e| SwitchError::Persistence(format!("Failed to serialize export: {}", e)))
}

pub async fn export<S: KeyValueStore>(store: &MappingStore<S>, timestamp: &str) -> Result<String, SwitchError> {
    export_document(&store.load().await, timestamp)
}

/// Validate an export document and pull out its entries as written.
/// Nothing is accepted unless every entry is well-formed.
pub fn parse_import(text: &str) -> Result<Vec<(String, String)>, SwitchError> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| SwitchError::InvalidImportDocument(format!("not valid JSON ({})", e)))?;

    let entries = match document.get("mappings") {
        Some(Value::Object(entries)) => entries,
        Some(_) => {
            return Err(SwitchError::InvalidImportDocument(
                "`mappings` must be an object".to_string(),
            ));
        }
        None => {
            return Err(SwitchError::InvalidImportDocument(
                "missing `mappings`".to_string(),
            ));
        }
    };

    entries
        .iter()
        .map(|(domain, value)| match value {
            Value::String(value) => Ok((domain.clone(), value.clone())),
            _ => Err(SwitchError::InvalidImportDocument(format!(
                "mapping for `{}` is not a string",
                domain
            ))),
        })
        .collect()
}

/// Merge an export document into the stored table. Returns how many entries
/// the document held, counting keys that differ only in case separately.
pub async fn import<S: KeyValueStore>(store: &MappingStore<S>, text: &str) -> Result<usize, SwitchError> {
    let entries = parse_import(text)?;
    let count = entries.len();

    let mut mapping = store.try_load().await?;
    mapping.merge(entries.into_iter().collect());
    store.save(&mapping).await?;

    log::info!("Imported {} mappings", count);
    Ok(count)
}
